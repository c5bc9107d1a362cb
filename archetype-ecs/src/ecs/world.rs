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
//! World: the top-level container
//!
//! A [`World`] owns one [`EntityStore`], a typed resource table, a deferred
//! command buffer and the system [`Scheduler`]. Setup happens in two steps:
//! systems are registered, then [`World::initialize`] fixes the execution
//! order of every phase. Running a phase executes its systems in that order;
//! applying the commands they recorded is a separate, explicit step.

use log::debug;

use crate::ecs::{
    Commands, Component, Entity, EntityBuilder, EntityStore, Phase, Query, QueryParams,
    Resources, ScheduleError, Scheduler, StoreConfig, SystemDescriptor,
};

/// Sizing hints for a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldConfig {
    /// Configuration of the entity store
    pub store: StoreConfig,
}

impl WorldConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `capacity` entities
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.store = self.store.with_entity_capacity(capacity);
        self
    }

    /// Start every new archetype column with room for `capacity` rows
    pub fn with_column_capacity(mut self, capacity: usize) -> Self {
        self.store = self.store.with_column_capacity(capacity);
        self
    }
}

/// The ECS world containing entities, resources and systems
///
/// # Examples
///
/// ```
/// use archetype_ecs::ecs::{Component, Phase, System, World};
///
/// struct Counter(u32);
/// impl Component for Counter {}
///
/// struct Tick;
/// impl System for Tick {
///     fn run(&mut self, world: &mut World) {
///         let (store, _commands) = world.parts_mut();
///         let query = store.query::<(Counter,)>();
///         for (_, (counter,)) in query.iter_mut(store) {
///             counter.0 += 1;
///         }
///     }
/// }
///
/// let mut world = World::new();
/// let entity = world.spawn();
/// world.add_component(entity, Counter(0));
/// world.add_system(Tick).unwrap();
/// world.initialize().unwrap();
///
/// world.run_schedule(Phase::Update).unwrap();
/// assert_eq!(world.get_component::<Counter>(entity).map(|c| c.0), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct World {
    store: EntityStore,
    resources: Resources,
    commands: Commands,
    scheduler: Scheduler,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with pre-sized storage
    pub fn with_config(config: WorldConfig) -> Self {
        World {
            store: EntityStore::with_config(config.store),
            ..Self::default()
        }
    }

    /// The entity store
    pub fn entities(&self) -> &EntityStore {
        &self.store
    }

    /// The entity store, mutably
    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// The resource table
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// The resource table, mutably
    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    /// Insert a resource, returning the one it replaces
    pub fn insert_resource<R: Send + Sync + 'static>(&mut self, value: R) -> Option<R> {
        self.resources.insert(value)
    }

    /// Borrow a resource
    pub fn resource<R: Send + Sync + 'static>(&self) -> Option<&R> {
        self.resources.get()
    }

    /// Mutably borrow a resource
    pub fn resource_mut<R: Send + Sync + 'static>(&mut self) -> Option<&mut R> {
        self.resources.get_mut()
    }

    /// Remove a resource
    pub fn remove_resource<R: Send + Sync + 'static>(&mut self) -> Option<R> {
        self.resources.remove()
    }

    /// The deferred command buffer
    pub fn commands(&mut self) -> &mut Commands {
        &mut self.commands
    }

    /// Split borrow of the store and the command buffer
    ///
    /// Lets a system iterate a query over the store while recording
    /// structural changes for later.
    pub fn parts_mut(&mut self) -> (&mut EntityStore, &mut Commands) {
        (&mut self.store, &mut self.commands)
    }

    /// Apply all recorded commands to the store
    ///
    /// Returns the number of commands applied.
    pub fn apply_commands(&mut self) -> usize {
        self.commands.apply(&mut self.store)
    }

    /// Register a system
    ///
    /// Accepts a bare system (placed in [`Phase::Update`]) or a configured
    /// [`SystemDescriptor`]. Fails once the world is initialized.
    pub fn add_system(&mut self, descriptor: impl Into<SystemDescriptor>) -> Result<(), ScheduleError> {
        self.scheduler.add_system(descriptor.into())
    }

    /// Build the execution order of every phase
    pub fn initialize(&mut self) -> Result<(), ScheduleError> {
        self.scheduler.initialize()
    }

    /// Whether the schedule has been built
    pub fn is_initialized(&self) -> bool {
        self.scheduler.is_initialized()
    }

    /// The system scheduler
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Names of the systems in `phase`, in execution order
    pub fn system_order(&self, phase: Phase) -> Vec<&str> {
        self.scheduler.system_names(phase)
    }

    /// Run every system of `phase` in schedule order
    ///
    /// Commands recorded by the systems stay pending until
    /// [`apply_commands`](Self::apply_commands). A phase with no systems is
    /// a no-op.
    pub fn run_schedule(&mut self, phase: Phase) -> Result<(), ScheduleError> {
        let mut systems = self.scheduler.take_phase(phase)?;
        for system in systems.iter_mut() {
            system.run(self);
        }
        self.scheduler.restore_phase(phase, systems);
        Ok(())
    }

    /// Run one frame: every phase in order, applying commands after each
    pub fn run_frame(&mut self) -> Result<(), ScheduleError> {
        for phase in Phase::ALL {
            self.run_schedule(phase)?;
            let applied = self.apply_commands();
            if applied > 0 {
                debug!("phase {} applied {} command(s)", phase, applied);
            }
        }
        Ok(())
    }

    /// Create an entity with no components
    pub fn spawn(&mut self) -> Entity {
        self.store.spawn()
    }

    /// Create an entity from a builder
    pub fn spawn_with(&mut self, builder: EntityBuilder) -> Entity {
        self.store.spawn_with(builder)
    }

    /// Destroy an entity; `false` if it was already dead
    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.store.despawn(entity)
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.store.is_alive(entity)
    }

    /// Add or overwrite a component
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> bool {
        self.store.add_component(entity, value)
    }

    /// Remove a component
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        self.store.remove_component::<T>(entity)
    }

    /// Get a component
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store.get_component(entity)
    }

    /// Get a component mutably
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store.get_component_mut(entity)
    }

    /// Check if an entity has a component
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.store.has_component::<T>(entity)
    }

    /// Build a query over this world's store
    pub fn query<Q: QueryParams>(&mut self) -> Query<Q> {
        self.store.query()
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.store.len()
    }
}
