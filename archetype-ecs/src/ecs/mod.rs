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
//! Entity Component System (ECS) core implementation
//!
//! This module provides the foundational ECS architecture including:
//! - Generational entity handles with index recycling
//! - Archetype storage: one dense column per component type, grouped by the
//!   exact set of components an entity carries
//! - Multi-component queries over every matching archetype
//! - A deferred command buffer for structural changes during iteration
//! - A phase-based system scheduler with Before/After ordering

mod archetype;
mod builder;
mod column;
mod commands;
mod component;
mod entity;
mod error;
mod graph;
mod query;
mod resources;
mod scheduler;
mod signature;
mod store;
mod system;
mod world;

pub use archetype::{Archetype, ArchetypeId};
pub use builder::EntityBuilder;
pub use column::{Column, ErasedColumn};
pub use commands::{Command, Commands, EntityAction};
pub use component::{Component, ComponentId, ComponentRegistry};
pub use entity::{Entity, EntityLocation};
pub use error::{PluginError, ScheduleError};
pub use query::{Query, QueryIter, QueryParams};
pub use resources::Resources;
pub use scheduler::{Phase, Scheduler};
pub use signature::ArchetypeSignature;
pub use store::{EntityStore, StoreConfig};
pub use system::{System, SystemDescriptor};
pub use world::{World, WorldConfig};

pub(crate) use graph::topological_order;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Marker;
    impl Component for Marker {}

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let mut world = World::new();
        let entity = world.spawn();
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_alive(entity));
        assert!(world.add_component(entity, Marker));
        assert_eq!(world.entities().archetypes().len(), 2);
    }
}
