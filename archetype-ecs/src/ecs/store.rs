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
//! Entity storage and structural mutation
//!
//! [`EntityStore`] owns every archetype, the signature → archetype index and
//! the generational location table. It is the single authority on which
//! handles are alive and where their components live.
//!
//! # Stale Handles
//!
//! Every operation taking an [`Entity`] checks liveness first and quietly does
//! nothing for dead or stale handles. Deferred command buffers routinely hold
//! handles that were despawned in the meantime, so this is not an error.
//!
//! # Migration
//!
//! Adding or removing a component moves the entity's row to the archetype
//! whose signature matches its new component set. Shared component values
//! are moved column by column, the source row is swap-removed, and the
//! location of whichever entity filled the hole is patched.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ecs::archetype::RowRemoval;
use crate::ecs::{
    Archetype, ArchetypeId, ArchetypeSignature, Component, ComponentId, ComponentRegistry,
    Entity, EntityBuilder, EntityLocation, Query, QueryParams,
};

/// Sizing hints for an [`EntityStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreConfig {
    /// Location table slots reserved up front
    pub entity_capacity: usize,
    /// Initial capacity of columns in newly created archetypes
    pub column_capacity: usize,
}

impl StoreConfig {
    /// Default configuration (no pre-allocation)
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `capacity` entities
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Start every new archetype column with room for `capacity` rows
    pub fn with_column_capacity(mut self, capacity: usize) -> Self {
        self.column_capacity = capacity;
        self
    }
}

/// Source of per-store identities
static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(0);

/// Archetype-based storage for entities and their components
///
/// # Examples
///
/// ```
/// use archetype_ecs::ecs::{Component, EntityStore};
///
/// struct Health(u32);
/// impl Component for Health {}
///
/// let mut store = EntityStore::new();
/// let entity = store.spawn();
/// store.add_component(entity, Health(10));
/// assert_eq!(store.get_component::<Health>(entity).map(|h| h.0), Some(10));
///
/// store.despawn(entity);
/// assert!(!store.is_alive(entity));
/// ```
pub struct EntityStore {
    /// Distinguishes stores so a [`Query`] is only used with its own
    id: u64,
    registry: ComponentRegistry,
    archetypes: Vec<Archetype>,
    archetype_index: HashMap<ArchetypeSignature, ArchetypeId>,
    locations: Vec<EntityLocation>,
    free_indices: VecDeque<u32>,
    live_count: usize,
    column_capacity: usize,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store using the given sizing hints
    pub fn with_config(config: StoreConfig) -> Self {
        let registry = ComponentRegistry::new();
        let empty = Archetype::new(
            ArchetypeId::EMPTY,
            ArchetypeSignature::empty(),
            &registry,
            config.column_capacity,
        );
        let mut archetype_index = HashMap::new();
        archetype_index.insert(ArchetypeSignature::empty(), ArchetypeId::EMPTY);

        EntityStore {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            registry,
            archetypes: vec![empty],
            archetype_index,
            locations: Vec::with_capacity(config.entity_capacity),
            free_indices: VecDeque::new(),
            live_count: 0,
            column_capacity: config.column_capacity,
        }
    }

    /// Create a new entity with no components
    pub fn spawn(&mut self) -> Entity {
        let entity = self.allocate();
        let row = self.archetypes[ArchetypeId::EMPTY.index()].push_entity(entity);
        self.place(entity, ArchetypeId::EMPTY, row);
        entity
    }

    /// Create a new entity holding every component in `builder`
    ///
    /// The entity is placed straight into the archetype for the builder's
    /// full signature, without intermediate migrations.
    pub fn spawn_with(&mut self, builder: EntityBuilder) -> Entity {
        let columns = builder.into_columns();
        let ids: Vec<ComponentId> = columns
            .iter()
            .map(|column| self.registry.register_erased(column.as_ref()))
            .collect();
        let target = self.find_or_create_archetype(ArchetypeSignature::new(ids.iter().copied()));

        let entity = self.allocate();
        let archetype = &mut self.archetypes[target.index()];
        let row = archetype.push_entity(entity);
        for (component, mut column) in ids.into_iter().zip(columns) {
            if let Some(index) = archetype.signature().position(component) {
                column.swap_remove_into(0, archetype.column_at_mut(index));
            }
        }
        debug_assert!(archetype.is_consistent());
        self.place(entity, target, row);
        entity
    }

    /// Destroy an entity and drop its components
    ///
    /// Returns `false` if the handle was already dead.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some((archetype, row)) = self.live_location(entity) else {
            return false;
        };

        let removal = self.archetypes[archetype.index()].swap_remove(row);
        self.patch_moved(removal, row);

        let slot = &mut self.locations[entity.index() as usize];
        *slot = EntityLocation::free(slot.generation);
        self.free_indices.push_back(entity.index());
        self.live_count -= 1;
        log::trace!("despawned {}", entity);
        true
    }

    /// Whether `entity` refers to a live entity of this store
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live_location(entity).is_some()
    }

    /// Current location of a live entity
    pub fn location(&self, entity: Entity) -> Option<EntityLocation> {
        self.live_location(entity)
            .map(|_| self.locations[entity.index() as usize])
    }

    /// Attach `value` to `entity`, overwriting any existing `T`
    ///
    /// Returns `false` (and drops `value`) if the entity is dead.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> bool {
        let Some((source, row)) = self.live_location(entity) else {
            return false;
        };
        let component = self.registry.register::<T>();

        let archetype = &mut self.archetypes[source.index()];
        if let Some(slot) = archetype.get_mut::<T>(component, row) {
            *slot = value;
            return true;
        }

        let signature = archetype.signature().with(component);
        let target = self.find_or_create_archetype(signature);
        let new_row = self.migrate(entity, source, row, target);

        let pushed = self.archetypes[target.index()]
            .column_mut::<T>(component)
            .map(|column| column.push(value));
        debug_assert_eq!(pushed, Some(new_row));
        debug_assert!(self.archetypes[target.index()].is_consistent());
        true
    }

    /// Detach `T` from `entity`, dropping the value
    ///
    /// Returns `false` if the entity is dead or has no `T`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        let Some((source, row)) = self.live_location(entity) else {
            return false;
        };
        let Some(component) = self.registry.id_of::<T>() else {
            return false;
        };

        let signature = self.archetypes[source.index()].signature();
        if !signature.contains(component) {
            return false;
        }
        let signature = signature.without(component);
        let target = self.find_or_create_archetype(signature);
        self.migrate(entity, source, row, target);
        true
    }

    /// Shared access to `entity`'s `T`
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let (archetype, row) = self.live_location(entity)?;
        let component = self.registry.id_of::<T>()?;
        self.archetypes[archetype.index()].get::<T>(component, row)
    }

    /// Mutable access to `entity`'s `T`
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let (archetype, row) = self.live_location(entity)?;
        let component = self.registry.id_of::<T>()?;
        self.archetypes[archetype.index()].get_mut::<T>(component, row)
    }

    /// Whether `entity` is alive and has a `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        match (self.live_location(entity), self.registry.id_of::<T>()) {
            (Some((archetype, _)), Some(component)) => {
                self.archetypes[archetype.index()].has_component(component)
            }
            _ => false,
        }
    }

    /// Build a query over this store
    pub fn query<Q: QueryParams>(&mut self) -> Query<Q> {
        Query::new(self)
    }

    /// Id for `T`, registering it if needed
    pub fn register_component<T: Component>(&mut self) -> ComponentId {
        self.registry.register::<T>()
    }

    /// Id for `T` if it has been seen by this store
    pub fn component_id<T: Component>(&self) -> Option<ComponentId> {
        self.registry.id_of::<T>()
    }

    /// Component registry of this store
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Identity of this store, unique within the process
    pub fn store_id(&self) -> u64 {
        self.id
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Archetype for `signature`, creating it on first use
    ///
    /// Every id in `signature` must come from this store's registry.
    pub(crate) fn find_or_create_archetype(
        &mut self,
        signature: ArchetypeSignature,
    ) -> ArchetypeId {
        if let Some(&id) = self.archetype_index.get(&signature) {
            return id;
        }
        let id = ArchetypeId::new(self.archetypes.len());
        log::debug!(
            "creating {} for {} component(s): {:?}",
            id,
            signature.len(),
            signature
                .ids()
                .iter()
                .filter_map(|&c| self.registry.name_of(c))
                .collect::<Vec<_>>()
        );
        self.archetypes.push(Archetype::new(
            id,
            signature.clone(),
            &self.registry,
            self.column_capacity,
        ));
        self.archetype_index.insert(signature, id);
        id
    }

    /// Archetype with the given id
    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id.index())
    }

    /// All archetypes in creation order
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub(crate) fn archetypes_mut(&mut self) -> &mut [Archetype] {
        &mut self.archetypes
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Whether no entity is alive
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Every live entity, archetype by archetype
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.archetypes
            .iter()
            .flat_map(|archetype| archetype.entities().iter().copied())
    }

    /// Despawn every entity
    ///
    /// Archetypes and registered components are kept; all outstanding handles
    /// become stale.
    pub fn clear(&mut self) {
        for archetype in &mut self.archetypes {
            for entity in archetype.entities() {
                let slot = &mut self.locations[entity.index() as usize];
                *slot = EntityLocation::free(slot.generation);
                self.free_indices.push_back(entity.index());
            }
            archetype.clear();
        }
        self.live_count = 0;
    }

    /// Take a free index (FIFO) or grow the location table
    fn allocate(&mut self) -> Entity {
        self.live_count += 1;
        match self.free_indices.pop_front() {
            Some(index) => {
                let slot = &mut self.locations[index as usize];
                slot.generation = match slot.generation.wrapping_add(1) {
                    0 => 1,
                    generation => generation,
                };
                Entity::new(index, slot.generation)
            }
            None => {
                let index = self.locations.len() as u32;
                self.locations.push(EntityLocation::free(1));
                Entity::new(index, 1)
            }
        }
    }

    fn place(&mut self, entity: Entity, archetype: ArchetypeId, row: usize) {
        let slot = &mut self.locations[entity.index() as usize];
        slot.archetype = Some(archetype);
        slot.row = row;
    }

    /// Archetype and row of a live entity
    fn live_location(&self, entity: Entity) -> Option<(ArchetypeId, usize)> {
        let slot = self.locations.get(entity.index() as usize)?;
        if slot.generation != entity.generation() {
            return None;
        }
        slot.archetype.map(|archetype| (archetype, slot.row))
    }

    /// Point the entity moved by a swap-remove at its new row
    fn patch_moved(&mut self, removal: RowRemoval, row: usize) {
        if let Some(moved) = removal.moved {
            self.locations[moved.index() as usize].row = row;
        }
    }

    /// Move `entity` from `source` to `target`, returning its new row
    fn migrate(
        &mut self,
        entity: Entity,
        source: ArchetypeId,
        row: usize,
        target: ArchetypeId,
    ) -> usize {
        let (from, to) = pair_mut(&mut self.archetypes, source.index(), target.index());
        let (new_row, removal) = from.move_row_to(row, to);
        self.patch_moved(removal, row);
        self.place(entity, target, new_row);
        log::trace!("migrated {} from {} to {} (row {})", entity, source, target, new_row);
        new_row
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("alive", &self.live_count)
            .field("archetypes", &self.archetypes.len())
            .field("components", &self.registry.len())
            .field("free", &self.free_indices.len())
            .finish()
    }
}

/// Two distinct archetypes borrowed mutably at once
fn pair_mut(archetypes: &mut [Archetype], a: usize, b: usize) -> (&mut Archetype, &mut Archetype) {
    assert_ne!(a, b, "migration source and target must differ");
    if a < b {
        let (low, high) = archetypes.split_at_mut(b);
        (&mut low[a], &mut high[0])
    } else {
        let (low, high) = archetypes.split_at_mut(a);
        (&mut high[0], &mut low[b])
    }
}
