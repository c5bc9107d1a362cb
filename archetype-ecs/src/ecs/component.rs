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
//! Component identity and registration
//!
//! Components are plain data attached to entities. Each component type is
//! assigned a small [`ComponentId`] the first time a store sees it; ids are
//! handed out in first-use order starting at 0 and are only meaningful within
//! the registry that assigned them.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::ecs::column::{Column, ErasedColumn};

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior.
/// Keep components small and focused for better cache performance.
pub trait Component: 'static + Send + Sync {}

/// Small integer identifying a component type within one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Create an id from its raw value
    pub fn new(raw: u32) -> Self {
        ComponentId(raw)
    }

    /// Raw value, usable as an array index
    pub fn raw(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.0)
    }
}

/// Metadata kept for every registered component type
struct ComponentInfo {
    name: &'static str,
    /// Empty column used to allocate archetype storage for this type
    prototype: Box<dyn ErasedColumn>,
}

/// Registration table mapping component types to [`ComponentId`]s
///
/// The registry is an explicit service owned by an `EntityStore` rather than
/// process-global state, so independent stores never share id spaces.
#[derive(Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentId>,
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `T`, registering it on first use
    pub fn register<T: Component>(&mut self) -> ComponentId {
        if let Some(&id) = self.by_type.get(&TypeId::of::<T>()) {
            return id;
        }
        self.insert(
            TypeId::of::<T>(),
            type_name::<T>(),
            Box::new(Column::<T>::new()),
        )
    }

    /// Id for the element type of an erased column, registering it on first use
    pub(crate) fn register_erased(&mut self, column: &dyn ErasedColumn) -> ComponentId {
        if let Some(&id) = self.by_type.get(&column.element_type_id()) {
            return id;
        }
        self.insert(
            column.element_type_id(),
            column.element_type_name(),
            column.empty_clone(0),
        )
    }

    fn insert(
        &mut self,
        type_id: TypeId,
        name: &'static str,
        prototype: Box<dyn ErasedColumn>,
    ) -> ComponentId {
        let id = ComponentId(self.infos.len() as u32);
        self.infos.push(ComponentInfo { name, prototype });
        self.by_type.insert(type_id, id);
        log::trace!("registered component {} as {}", name, id);
        id
    }

    /// Id for `T` if it has been registered
    pub fn id_of<T: Component>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Type name recorded for `id`
    pub fn name_of(&self, id: ComponentId) -> Option<&'static str> {
        self.infos.get(id.index()).map(|info| info.name)
    }

    /// Number of registered component types
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether no component type has been registered
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Allocate an empty column for `id`
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    pub(crate) fn new_column(&self, id: ComponentId, capacity: usize) -> Box<dyn ErasedColumn> {
        match self.infos.get(id.index()) {
            Some(info) => info.prototype.empty_clone(capacity),
            None => panic!("{} was not issued by this registry", id),
        }
    }
}
