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
//! Multi-archetype component queries
//!
//! A [`Query`] names one to four component types and walks every archetype
//! whose signature contains all of them, yielding each row's entity together
//! with mutable references to the requested components.
//!
//! # Iteration Contract
//!
//! Archetypes are visited in creation order and rows in row order. Empty
//! archetypes are skipped. Row order is only reproducible between structural
//! changes, since swap-removes reorder rows.
//!
//! The iterator holds a mutable borrow of the store, so spawning, despawning
//! or migrating entities while a pass is in progress does not compile. Record
//! such changes in [`Commands`](crate::ecs::Commands) and apply them after
//! the pass.
//!
//! # Example
//!
//! ```
//! use archetype_ecs::ecs::{Component, EntityStore};
//!
//! struct Position(f32);
//! impl Component for Position {}
//! struct Velocity(f32);
//! impl Component for Velocity {}
//!
//! let mut store = EntityStore::new();
//! let entity = store.spawn();
//! store.add_component(entity, Position(0.0));
//! store.add_component(entity, Velocity(2.0));
//!
//! let query = store.query::<(Position, Velocity)>();
//! for (_, (position, velocity)) in query.iter_mut(&mut store) {
//!     position.0 += velocity.0;
//! }
//! assert_eq!(store.get_component::<Position>(entity).map(|p| p.0), Some(2.0));
//! ```

use std::any::type_name;
use std::marker::PhantomData;
use std::slice::{Iter, IterMut};

use crate::ecs::column::{Column, ErasedColumn};
use crate::ecs::{Archetype, Component, ComponentId, ComponentRegistry, Entity, EntityStore};

/// A tuple of component types a [`Query`] can fetch
///
/// Implemented for `(A,)`, `(A, B)`, `(A, B, C)` and `(A, B, C, D)`.
pub trait QueryParams: 'static {
    /// Mutable references yielded for one row
    type Item<'a>;

    /// Per-archetype cursor over the requested columns
    type Columns<'a>;

    /// Resolve every requested type to its id, in tuple order
    fn component_ids(registry: &mut ComponentRegistry) -> Vec<ComponentId>;

    /// Build a cursor from erased columns given in tuple order
    fn columns<'a>(columns: Vec<&'a mut Box<dyn ErasedColumn>>) -> Option<Self::Columns<'a>>;

    /// Advance the cursor by one row
    fn next<'a>(columns: &mut Self::Columns<'a>) -> Option<Self::Item<'a>>;
}

fn typed_slice<T: Component>(column: &mut Box<dyn ErasedColumn>) -> Option<&mut [T]> {
    column
        .as_any_mut()
        .downcast_mut::<Column<T>>()
        .map(Column::as_mut_slice)
}

macro_rules! impl_query_params {
    ($($name:ident),+) => {
        impl<$($name: Component),+> QueryParams for ($($name,)+) {
            type Item<'a> = ($(&'a mut $name,)+);
            type Columns<'a> = ($(IterMut<'a, $name>,)+);

            fn component_ids(registry: &mut ComponentRegistry) -> Vec<ComponentId> {
                vec![$(registry.register::<$name>()),+]
            }

            #[allow(non_snake_case)]
            fn columns<'a>(columns: Vec<&'a mut Box<dyn ErasedColumn>>) -> Option<Self::Columns<'a>> {
                let mut columns = columns.into_iter();
                $(let $name = typed_slice::<$name>(columns.next()?)?;)+
                Some(($($name.iter_mut(),)+))
            }

            #[allow(non_snake_case)]
            fn next<'a>(columns: &mut Self::Columns<'a>) -> Option<Self::Item<'a>> {
                let ($($name,)+) = columns;
                Some(($($name.next()?,)+))
            }
        }
    };
}

impl_query_params!(A);
impl_query_params!(A, B);
impl_query_params!(A, B, C);
impl_query_params!(A, B, C, D);

/// Reusable description of a component query
///
/// Component ids are resolved once when the query is built, so a query is
/// bound to the store it was built from.
///
/// # Panics
///
/// Every method taking a store panics if given a different store.
pub struct Query<Q: QueryParams> {
    store: u64,
    components: Vec<ComponentId>,
    _marker: PhantomData<fn() -> Q>,
}

impl<Q: QueryParams> Query<Q> {
    /// Resolve `Q` against `store`, registering unseen component types
    ///
    /// # Panics
    ///
    /// Panics if `Q` names the same component type twice, since that would
    /// hand out two mutable references to one value.
    pub fn new(store: &mut EntityStore) -> Self {
        let components = Q::component_ids(store.registry_mut());
        let mut distinct = components.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(
            distinct.len(),
            components.len(),
            "query {} requests the same component more than once",
            type_name::<Q>()
        );
        Query {
            store: store.store_id(),
            components,
            _marker: PhantomData,
        }
    }

    /// Requested component ids in tuple order
    pub fn component_ids(&self) -> &[ComponentId] {
        &self.components
    }

    /// Whether rows of `archetype` would be yielded
    pub fn matches(&self, archetype: &Archetype) -> bool {
        !archetype.is_empty() && archetype.signature().contains_all(&self.components)
    }

    /// Iterate matching rows with mutable component access
    pub fn iter_mut<'q>(&'q self, store: &'q mut EntityStore) -> QueryIter<'q, Q> {
        self.check_store(store);
        QueryIter {
            components: &self.components,
            archetypes: store.archetypes_mut().iter_mut(),
            current: None,
        }
    }

    /// Run `f` for every matching row
    pub fn for_each<'q, F>(&'q self, store: &'q mut EntityStore, mut f: F)
    where
        F: FnMut(Entity, Q::Item<'q>),
    {
        for (entity, item) in self.iter_mut(store) {
            f(entity, item);
        }
    }

    /// Number of matching rows
    pub fn count(&self, store: &EntityStore) -> usize {
        self.matching(store).map(Archetype::len).sum()
    }

    /// Matching entities in iteration order
    pub fn entities(&self, store: &EntityStore) -> Vec<Entity> {
        self.matching(store)
            .flat_map(|archetype| archetype.entities().iter().copied())
            .collect()
    }

    /// Whether `entity` is alive and would be yielded
    pub fn contains(&self, store: &EntityStore, entity: Entity) -> bool {
        self.check_store(store);
        store
            .location(entity)
            .and_then(|location| location.archetype)
            .and_then(|archetype| store.archetype(archetype))
            .map_or(false, |archetype| self.matches(archetype))
    }

    fn check_store(&self, store: &EntityStore) {
        assert_eq!(
            self.store,
            store.store_id(),
            "query {} used with a store it was not built from",
            type_name::<Q>()
        );
    }

    fn matching<'s>(&'s self, store: &'s EntityStore) -> impl Iterator<Item = &'s Archetype> + 's {
        self.check_store(store);
        store
            .archetypes()
            .iter()
            .filter(move |archetype| self.matches(archetype))
    }
}

/// Iterator over the rows matched by a [`Query`]
pub struct QueryIter<'q, Q: QueryParams> {
    components: &'q [ComponentId],
    archetypes: IterMut<'q, Archetype>,
    current: Option<(Iter<'q, Entity>, Q::Columns<'q>)>,
}

impl<'q, Q: QueryParams> Iterator for QueryIter<'q, Q> {
    type Item = (Entity, Q::Item<'q>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((entities, columns)) = self.current.as_mut() {
                if let Some(&entity) = entities.next() {
                    if let Some(item) = Q::next(columns) {
                        return Some((entity, item));
                    }
                }
            }
            self.current = None;

            let archetype = self.archetypes.next()?;
            if archetype.is_empty() || !archetype.signature().contains_all(self.components) {
                continue;
            }
            if let Some((entities, columns)) = archetype.query_columns(self.components) {
                debug_assert!(columns.iter().all(|c| c.len() == entities.len()));
                self.current = Q::columns(columns).map(|columns| (entities.iter(), columns));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position(f32);
    impl Component for Position {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity(f32);
    impl Component for Velocity {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Mass(f32);
    impl Component for Mass {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Charge(f32);
    impl Component for Charge {}

    #[test]
    fn test_single_component_query() {
        let mut store = EntityStore::new();
        let a = store.spawn();
        let b = store.spawn();
        let _bare = store.spawn();
        store.add_component(a, Position(1.0));
        store.add_component(b, Position(2.0));
        store.add_component(b, Velocity(0.0));

        let query = store.query::<(Position,)>();
        let found: HashSet<Entity> = query.iter_mut(&mut store).map(|(e, _)| e).collect();
        assert_eq!(found, [a, b].into_iter().collect());
        assert_eq!(query.count(&store), 2);
    }

    #[test]
    fn test_mutation_through_query() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        store.add_component(entity, Position(0.0));
        store.add_component(entity, Velocity(1.5));

        let query = store.query::<(Position, Velocity)>();
        for _ in 0..2 {
            for (_, (position, velocity)) in query.iter_mut(&mut store) {
                position.0 += velocity.0;
            }
        }
        assert_eq!(store.get_component::<Position>(entity), Some(&Position(3.0)));
    }

    #[test]
    fn test_tuple_order_independent_of_signature_order() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        // Register Position first so it sorts first in the signature
        store.add_component(entity, Position(1.0));
        store.add_component(entity, Velocity(2.0));

        let query = store.query::<(Velocity, Position)>();
        let (_, (velocity, position)) = query.iter_mut(&mut store).next().unwrap();
        assert_eq!(*velocity, Velocity(2.0));
        assert_eq!(*position, Position(1.0));
    }

    #[test]
    fn test_four_component_query() {
        let mut store = EntityStore::new();
        let full = store.spawn();
        store.add_component(full, Position(1.0));
        store.add_component(full, Velocity(2.0));
        store.add_component(full, Mass(3.0));
        store.add_component(full, Charge(4.0));
        let partial = store.spawn();
        store.add_component(partial, Position(1.0));
        store.add_component(partial, Mass(3.0));

        let query = store.query::<(Charge, Mass, Velocity, Position)>();
        let rows: Vec<_> = query
            .iter_mut(&mut store)
            .map(|(e, (c, m, v, p))| (e, c.0, m.0, v.0, p.0))
            .collect();
        assert_eq!(rows, vec![(full, 4.0, 3.0, 2.0, 1.0)]);
    }

    #[test]
    fn test_empty_archetypes_skipped() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        store.add_component(entity, Position(1.0));
        store.despawn(entity);

        let query = store.query::<(Position,)>();
        assert_eq!(query.iter_mut(&mut store).count(), 0);
        assert!(query.entities(&store).is_empty());
    }

    #[test]
    fn test_unseen_component_matches_nothing() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        store.add_component(entity, Position(1.0));

        let query = store.query::<(Mass,)>();
        assert_eq!(query.iter_mut(&mut store).count(), 0);
        assert!(!query.contains(&store, entity));
    }

    #[test]
    fn test_for_each_and_contains() {
        let mut store = EntityStore::new();
        let entity = store.spawn();
        store.add_component(entity, Mass(2.0));

        let query = store.query::<(Mass,)>();
        assert!(query.contains(&store, entity));
        query.for_each(&mut store, |_, (mass,)| mass.0 *= 2.0);
        assert_eq!(store.get_component::<Mass>(entity), Some(&Mass(4.0)));
    }

    #[test]
    fn test_stores_have_distinct_ids() {
        let a = EntityStore::new();
        let b = EntityStore::new();
        assert_ne!(a.store_id(), b.store_id());
    }

    #[test]
    #[should_panic(expected = "requests the same component more than once")]
    fn test_duplicate_component_rejected() {
        let mut store = EntityStore::new();
        let _ = store.query::<(Position, Position)>();
    }
}
