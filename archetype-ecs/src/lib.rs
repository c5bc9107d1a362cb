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
//! # Archetype ECS
//!
//! An archetype-based Entity Component System: entities are grouped by the
//! exact set of components they carry, and each group stores every component
//! type in its own dense column.
//!
//! ## Features
//!
//! - **Generational Entities**: recycled indices never resurrect stale handles
//! - **Archetype Storage**: cache-friendly columns, O(1) swap-remove
//! - **Queries**: iterate one to four components across every matching archetype
//! - **Deferred Commands**: record structural changes while iterating
//! - **Phase Scheduler**: nine fixed phases with Before/After ordering
//! - **Extensibility**: plugin system for packaging setup
//!
//! ## Example
//!
//! ```rust
//! use archetype_ecs::ecs::{Component, World};
//!
//! #[derive(Debug, PartialEq)]
//! struct Position(f32, f32);
//! impl Component for Position {}
//!
//! #[derive(Debug, PartialEq)]
//! struct Velocity(f32, f32);
//! impl Component for Velocity {}
//!
//! let mut world = World::new();
//! let entity = world.spawn();
//! world.add_component(entity, Position(0.0, 0.0));
//! world.add_component(entity, Velocity(1.0, 2.0));
//!
//! let query = world.query::<(Position, Velocity)>();
//! for (_, (position, velocity)) in query.iter_mut(world.entities_mut()) {
//!     position.0 += velocity.0;
//!     position.1 += velocity.1;
//! }
//! assert_eq!(world.get_component::<Position>(entity), Some(&Position(1.0, 2.0)));
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Plugin system for extensibility
pub mod plugins;

pub use ecs::{Component, Entity, EntityStore, Phase, System, World};
