// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Owned component bundles for spawning
//!
//! An [`EntityBuilder`] collects component values before an entity exists so
//! the store can place the entity directly in its final archetype. It is an
//! ordinary owned value: chain [`EntityBuilder::with`] or mutate it in place
//! through [`EntityBuilder::insert`].

use std::any::TypeId;
use std::fmt;

use crate::ecs::column::{self, Column, ErasedColumn};
use crate::ecs::Component;

/// A set of component values waiting to be spawned
///
/// # Examples
///
/// ```
/// use archetype_ecs::ecs::{Component, EntityBuilder, EntityStore};
///
/// struct Position(f32, f32);
/// impl Component for Position {}
/// struct Tag;
/// impl Component for Tag {}
///
/// let mut store = EntityStore::new();
/// let entity = store.spawn_with(EntityBuilder::new().with(Position(0.0, 1.0)).with(Tag));
/// assert!(store.has_component::<Tag>(entity));
/// ```
#[derive(Default)]
pub struct EntityBuilder {
    /// One single-row column per component type
    columns: Vec<Box<dyn ErasedColumn>>,
}

impl EntityBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value`, replacing an earlier value of the same type
    pub fn with<T: Component>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// In-place variant of [`EntityBuilder::with`]
    pub fn insert<T: Component>(&mut self, value: T) -> &mut Self {
        let existing = self
            .columns
            .iter_mut()
            .find_map(|column| column::downcast_mut::<T>(column.as_mut()));
        match existing {
            Some(column) => {
                column.replace(0, value);
            }
            None => {
                let mut column = Column::<T>::with_capacity(1);
                column.push(value);
                self.columns.push(Box::new(column));
            }
        }
        self
    }

    /// Whether a value of type `T` has been added
    pub fn contains<T: Component>(&self) -> bool {
        self.columns
            .iter()
            .any(|column| column.element_type_id() == TypeId::of::<T>())
    }

    /// Number of distinct component types
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no component has been added
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn into_columns(self) -> Vec<Box<dyn ErasedColumn>> {
        self.columns
    }
}

impl fmt::Debug for EntityBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.columns.iter().map(|c| c.element_type_name()))
            .finish()
    }
}
