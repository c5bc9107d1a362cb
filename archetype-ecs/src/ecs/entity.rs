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
//! Entity handles and location bookkeeping
//!
//! Entities are lightweight generational handles. The index part is recycled
//! after a despawn; the generation part is bumped on every reuse so that stale
//! handles can be detected without any extra per-handle storage.

use std::fmt;

use crate::ecs::archetype::ArchetypeId;

/// Generational handle identifying a logical record in an [`EntityStore`]
///
/// Identity is the `(index, generation)` pair. A handle with generation 0 is
/// never issued by a store and is used as the invalid/default value.
///
/// [`EntityStore`]: crate::ecs::EntityStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// The invalid handle (generation 0)
    pub const INVALID: Entity = Entity { index: 0, generation: 0 };

    /// Create an entity handle from its raw parts
    pub fn new(index: u32, generation: u32) -> Self {
        Entity { index, generation }
    }

    /// Slot index in the store's location table
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation the handle was issued with
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether this handle could have been issued by a store
    ///
    /// This says nothing about liveness; use `EntityStore::is_alive` for that.
    pub fn is_valid_handle(&self) -> bool {
        self.generation != 0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

/// Where an entity index currently lives
///
/// One record exists per index ever allocated. Free slots keep their last
/// generation and have no archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    /// Owning archetype, `None` while the slot is free
    pub archetype: Option<ArchetypeId>,
    /// Row inside the archetype; meaningless when `archetype` is `None`
    pub row: usize,
    /// Generation currently associated with the index
    pub generation: u32,
}

impl EntityLocation {
    pub(crate) fn free(generation: u32) -> Self {
        EntityLocation {
            archetype: None,
            row: 0,
            generation,
        }
    }

    /// Whether the slot is occupied by a live entity
    pub fn is_occupied(&self) -> bool {
        self.archetype.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_creation() {
        let entity = Entity::new(42, 1);
        assert_eq!(entity.index(), 42);
        assert_eq!(entity.generation(), 1);
        assert!(entity.is_valid_handle());
    }

    #[test]
    fn test_entity_equality() {
        let e1 = Entity::new(1, 1);
        let e2 = Entity::new(1, 1);
        let e3 = Entity::new(1, 2);
        assert_eq!(e1, e2);
        assert_ne!(e1, e3);
    }

    #[test]
    fn test_default_is_invalid() {
        assert_eq!(Entity::default(), Entity::INVALID);
        assert!(!Entity::default().is_valid_handle());
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::new(7, 3).to_string(), "Entity(7v3)");
    }

    #[test]
    fn test_free_location() {
        let location = EntityLocation::free(4);
        assert!(!location.is_occupied());
        assert_eq!(location.generation, 4);
    }
}
