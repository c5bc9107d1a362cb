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
//! Archetype tables
//!
//! An archetype groups every entity with exactly the same set of components.
//! It stores a dense entity list plus one [`ErasedColumn`] per component id
//! in its signature, all indexed by the same row numbers.
//!
//! # Row Invariant
//!
//! For every row `i`, `entities[i]` and the value at row `i` of each column
//! belong to the same entity. Row indices are not stable: removing any row
//! other than the last moves the last row into the hole, in every column and
//! in the entity list at once.

use std::fmt;

use crate::ecs::column::{self, Column, ErasedColumn};
use crate::ecs::{ArchetypeSignature, Component, ComponentId, ComponentRegistry, Entity};

/// Dense index of an archetype inside its store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// The empty-signature archetype every store creates first
    pub const EMPTY: ArchetypeId = ArchetypeId(0);

    pub(crate) fn new(index: usize) -> Self {
        ArchetypeId(index as u32)
    }

    /// Position in the store's archetype list
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Archetype({})", self.0)
    }
}

/// Entities sharing one signature, stored as parallel dense arrays
pub struct Archetype {
    id: ArchetypeId,
    signature: ArchetypeSignature,
    entities: Vec<Entity>,
    /// One column per id in `signature`, in the same (sorted) order
    columns: Vec<Box<dyn ErasedColumn>>,
}

/// Outcome of removing a row from an archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowRemoval {
    /// Entity that was moved into the vacated row, if any
    pub moved: Option<Entity>,
}

impl Archetype {
    pub(crate) fn new(
        id: ArchetypeId,
        signature: ArchetypeSignature,
        registry: &ComponentRegistry,
        capacity: usize,
    ) -> Self {
        let columns = signature
            .ids()
            .iter()
            .map(|&component| registry.new_column(component, capacity))
            .collect();
        Archetype {
            id,
            signature,
            entities: Vec::with_capacity(capacity),
            columns,
        }
    }

    /// Identifier of this archetype
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// Component signature shared by every row
    pub fn signature(&self) -> &ArchetypeSignature {
        &self.signature
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the archetype holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in row order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Current row of `entity`, found by scanning the entity list
    ///
    /// The store's location table answers the same question in O(1); this is
    /// the archetype-local view used to cross-check it.
    pub fn entity_index(&self, entity: Entity) -> Option<usize> {
        self.entities.iter().position(|&e| e == entity)
    }

    /// Whether the signature includes `component`
    pub fn has_component(&self, component: ComponentId) -> bool {
        self.signature.contains(component)
    }

    /// Typed view of the column for `component`
    pub fn column<T: Component>(&self, component: ComponentId) -> Option<&Column<T>> {
        let index = self.signature.position(component)?;
        column::downcast_ref::<T>(self.columns[index].as_ref())
    }

    /// Mutable typed view of the column for `component`
    pub fn column_mut<T: Component>(&mut self, component: ComponentId) -> Option<&mut Column<T>> {
        let index = self.signature.position(component)?;
        column::downcast_mut::<T>(self.columns[index].as_mut())
    }

    /// Value of `component` at `row`
    pub fn get<T: Component>(&self, component: ComponentId, row: usize) -> Option<&T> {
        self.column::<T>(component)?.get(row)
    }

    /// Mutable value of `component` at `row`
    pub fn get_mut<T: Component>(&mut self, component: ComponentId, row: usize) -> Option<&mut T> {
        self.column_mut::<T>(component)?.get_mut(row)
    }

    /// Append an entity to the entity list, returning its row
    ///
    /// Callers must push one value to every column to restore the row
    /// invariant.
    pub(crate) fn push_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Mutable access to the erased column at `index` within the signature
    pub(crate) fn column_at_mut(&mut self, index: usize) -> &mut dyn ErasedColumn {
        self.columns[index].as_mut()
    }

    /// Swap-remove `row` from every column and the entity list, dropping the
    /// component values
    pub(crate) fn swap_remove(&mut self, row: usize) -> RowRemoval {
        for column in &mut self.columns {
            column.swap_remove_drop(row);
        }
        self.entities.swap_remove(row);
        self.debug_check();
        RowRemoval {
            moved: self.entities.get(row).copied(),
        }
    }

    /// Move `row` into `target`
    ///
    /// Values for components present in both signatures are moved; values the
    /// target lacks are dropped. Target columns absent from this archetype get
    /// no value, so the caller must append them to complete the new row.
    /// Returns the new row in `target` and the removal outcome here.
    pub(crate) fn move_row_to(&mut self, row: usize, target: &mut Archetype) -> (usize, RowRemoval) {
        for (index, &component) in self.signature.ids().iter().enumerate() {
            let source = self.columns[index].as_mut();
            match target.signature.position(component) {
                Some(target_index) => source.swap_remove_into(row, target.columns[target_index].as_mut()),
                None => source.swap_remove_drop(row),
            }
        }
        let entity = self.entities.swap_remove(row);
        let new_row = target.push_entity(entity);
        self.debug_check();
        (
            new_row,
            RowRemoval {
                moved: self.entities.get(row).copied(),
            },
        )
    }

    /// Split borrows for query iteration
    ///
    /// Returns the entity list and one column per requested id, in request
    /// order, or `None` if some requested id has no column here.
    pub(crate) fn query_columns(
        &mut self,
        components: &[ComponentId],
    ) -> Option<(&[Entity], Vec<&mut Box<dyn ErasedColumn>>)> {
        let mut slots: Vec<Option<&mut Box<dyn ErasedColumn>>> =
            components.iter().map(|_| None).collect();
        for (&component, column) in self.signature.ids().iter().zip(self.columns.iter_mut()) {
            if let Some(slot) = components.iter().position(|&c| c == component) {
                slots[slot] = Some(column);
            }
        }
        let columns = slots.into_iter().collect::<Option<Vec<_>>>()?;
        Some((&self.entities, columns))
    }

    /// Drop every row, keeping column allocations
    pub(crate) fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.entities.clear();
    }

    /// Whether every column has exactly one value per entity
    pub fn is_consistent(&self) -> bool {
        self.columns.iter().all(|c| c.len() == self.entities.len())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.is_consistent(),
            "{} columns out of lockstep with {} entities",
            self.id,
            self.entities.len()
        );
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("signature", &self.signature.ids())
            .field("len", &self.entities.len())
            .finish()
    }
}
