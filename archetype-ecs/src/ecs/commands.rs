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
//! Deferred structural mutation
//!
//! Structural changes (spawn, despawn, adding or removing components) move
//! rows between archetypes and would invalidate any query pass in progress.
//! [`Commands`] records them as plain [`Command`] values and replays them
//! against an [`EntityStore`] at an explicit synchronization point.
//!
//! ## Invariants
//! - Commands are applied in the order they were recorded.
//! - Each command tolerates stale handles independently: a command targeting
//!   a dead entity does nothing. There is no rollback.

use std::any::type_name;
use std::fmt;

use crate::ecs::{Component, Entity, EntityBuilder, EntityStore};

/// Deferred action run against the store with the target entity
pub type EntityAction = Box<dyn FnOnce(&mut EntityStore, Entity) + Send>;

/// A recorded structural change
pub enum Command {
    /// Spawn a new entity, optionally configuring it right after
    Spawn {
        /// Runs with the freshly spawned entity
        configure: Option<EntityAction>,
    },

    /// Spawn a new entity directly into the archetype of a builder
    SpawnBuilt {
        /// Components of the new entity
        builder: EntityBuilder,
    },

    /// Despawn an entity
    Despawn {
        /// Entity to remove
        entity: Entity,
    },

    /// Attach or overwrite a component
    Insert {
        /// Target entity
        entity: Entity,
        /// Component type name, for diagnostics
        component: &'static str,
        /// Performs the typed insertion
        apply: EntityAction,
    },

    /// Detach a component
    Remove {
        /// Target entity
        entity: Entity,
        /// Component type name, for diagnostics
        component: &'static str,
        /// Performs the typed removal
        apply: EntityAction,
    },
}

impl Command {
    /// Execute this command against `store`
    pub fn apply(self, store: &mut EntityStore) {
        match self {
            Command::Spawn { configure } => {
                let entity = store.spawn();
                if let Some(configure) = configure {
                    configure(store, entity);
                }
            }
            Command::SpawnBuilt { builder } => {
                store.spawn_with(builder);
            }
            Command::Despawn { entity } => {
                store.despawn(entity);
            }
            Command::Insert { entity, apply, .. } | Command::Remove { entity, apply, .. } => {
                apply(store, entity);
            }
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Spawn { configure } => f
                .debug_struct("Spawn")
                .field("configured", &configure.is_some())
                .finish(),
            Command::SpawnBuilt { builder } => {
                f.debug_struct("SpawnBuilt").field("builder", builder).finish()
            }
            Command::Despawn { entity } => f.debug_struct("Despawn").field("entity", entity).finish(),
            Command::Insert { entity, component, .. } => f
                .debug_struct("Insert")
                .field("entity", entity)
                .field("component", component)
                .finish(),
            Command::Remove { entity, component, .. } => f
                .debug_struct("Remove")
                .field("entity", entity)
                .field("component", component)
                .finish(),
        }
    }
}

/// Ordered buffer of deferred [`Command`]s
#[derive(Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw command
    pub fn push(&mut self, command: Command) {
        self.queue.push(command);
    }

    /// Record the spawn of an empty entity
    pub fn spawn(&mut self) {
        self.push(Command::Spawn { configure: None });
    }

    /// Record a spawn followed by `configure` on the new entity
    pub fn spawn_with<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut EntityStore, Entity) + Send + 'static,
    {
        self.push(Command::Spawn {
            configure: Some(Box::new(configure)),
        });
    }

    /// Record the spawn of an entity holding `builder`'s components
    pub fn spawn_built(&mut self, builder: EntityBuilder) {
        self.push(Command::SpawnBuilt { builder });
    }

    /// Record a despawn
    pub fn despawn(&mut self, entity: Entity) {
        self.push(Command::Despawn { entity });
    }

    /// Record the addition of `value` to `entity`
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) {
        self.push(Command::Insert {
            entity,
            component: type_name::<T>(),
            apply: Box::new(move |store: &mut EntityStore, entity| {
                store.add_component(entity, value);
            }),
        });
    }

    /// Record the removal of `T` from `entity`
    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        self.push(Command::Remove {
            entity,
            component: type_name::<T>(),
            apply: Box::new(|store: &mut EntityStore, entity| {
                store.remove_component::<T>(entity);
            }),
        });
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending commands in recording order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.queue.iter()
    }

    /// Drop every pending command without applying it
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Apply every pending command in order and empty the buffer
    ///
    /// Returns the number of commands applied. The buffer keeps its
    /// allocation for the next round of recording.
    pub fn apply(&mut self, store: &mut EntityStore) -> usize {
        let count = self.queue.len();
        for command in self.queue.drain(..) {
            log::trace!("applying {:?}", command);
            command.apply(store);
        }
        if count > 0 {
            log::debug!("applied {} deferred command(s)", count);
        }
        count
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.queue.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position(i32);
    impl Component for Position {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Frozen;
    impl Component for Frozen {}

    #[test]
    fn test_nothing_happens_until_apply() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        let mut commands = Commands::new();

        commands.add_component(entity, Position(1));
        commands.spawn();
        assert_eq!(commands.len(), 2);
        assert!(!store.has_component::<Position>(entity));
        assert_eq!(store.len(), 1);

        assert_eq!(commands.apply(&mut store), 2);
        assert!(commands.is_empty());
        assert_eq!(store.get_component::<Position>(entity), Some(&Position(1)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_commands_apply_in_order() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        let mut commands = Commands::new();

        commands.add_component(entity, Position(1));
        commands.add_component(entity, Position(2));
        commands.add_component(entity, Frozen);
        commands.remove_component::<Frozen>(entity);
        commands.apply(&mut store);

        assert_eq!(store.get_component::<Position>(entity), Some(&Position(2)));
        assert!(!store.has_component::<Frozen>(entity));
    }

    #[test]
    fn test_stale_targets_are_skipped() {
        let mut store = EntityStore::new();
        let doomed = store.spawn();
        let survivor = store.spawn();
        let mut commands = Commands::new();

        commands.despawn(doomed);
        commands.add_component(doomed, Position(1));
        commands.add_component(survivor, Position(2));
        commands.despawn(doomed);
        assert_eq!(commands.apply(&mut store), 4);

        assert!(!store.is_alive(doomed));
        assert_eq!(store.get_component::<Position>(survivor), Some(&Position(2)));
    }

    #[test]
    fn test_spawn_with_configure() {
        let mut store = EntityStore::new();
        let mut commands = Commands::new();
        commands.spawn_with(|store, entity| {
            store.add_component(entity, Position(7));
        });
        commands.spawn_built(EntityBuilder::new().with(Position(8)).with(Frozen));
        commands.apply(&mut store);

        let mut values: Vec<i32> = store
            .entities()
            .filter_map(|e| store.get_component::<Position>(e).map(|p| p.0))
            .collect();
        values.sort_unstable();
        assert_eq!(values, vec![7, 8]);
    }

    #[test]
    fn test_clear_discards() {
        let mut store = EntityStore::new();
        let mut commands = Commands::new();
        commands.spawn();
        commands.clear();
        assert_eq!(commands.apply(&mut store), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_debug_output_names_commands() {
        let mut commands = Commands::new();
        commands.despawn(Entity::new(1, 1));
        commands.add_component(Entity::new(1, 1), Frozen);
        let text = format!("{:?}", commands);
        assert!(text.contains("Despawn"));
        assert!(text.contains("Frozen"));
        assert_eq!(commands.iter().count(), 2);
    }
}
