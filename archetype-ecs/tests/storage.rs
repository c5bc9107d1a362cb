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
//! Storage invariants
//!
//! Generational handles, swap-remove bookkeeping and signature
//! canonicalization.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use archetype_ecs::ecs::{ArchetypeSignature, Component, ComponentId, Entity, EntityStore};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tag(u32);
impl Component for Tag {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Weight(f64);
impl Component for Weight {}

fn hash_of(signature: &ArchetypeSignature) -> u64 {
    let mut hasher = DefaultHasher::new();
    signature.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_generation_increases_on_every_reuse() {
    let mut store = EntityStore::new();
    let first = store.spawn();
    let mut previous = first;

    for _ in 0..5 {
        assert!(store.despawn(previous));
        assert!(!store.is_alive(previous));
        let next = store.spawn();
        assert_eq!(next.index(), first.index());
        assert!(next.generation() > previous.generation());
        assert!(!store.is_alive(previous));
        previous = next;
    }
}

#[test]
fn test_free_indices_recycled_fifo() {
    let mut store = EntityStore::new();
    let entities: Vec<Entity> = (0..4).map(|_| store.spawn()).collect();
    store.despawn(entities[2]);
    store.despawn(entities[0]);
    store.despawn(entities[3]);

    let reused: Vec<u32> = (0..3).map(|_| store.spawn().index()).collect();
    assert_eq!(reused, vec![2, 0, 3]);
    assert_eq!(store.spawn().index(), 4);
}

#[test]
fn test_generations_start_at_one() {
    let mut store = EntityStore::new();
    let e = store.spawn();
    assert_eq!(e.generation(), 1);
    assert!(e.is_valid_handle());
    assert!(!Entity::default().is_valid_handle());
}

#[test]
fn test_swap_remove_moves_last_row() {
    let mut store = EntityStore::new();
    let entities: Vec<Entity> = (0..5u32)
        .map(|i| {
            let e = store.spawn();
            store.add_component(e, Tag(i));
            e
        })
        .collect();

    let archetype_id = store.location(entities[0]).unwrap().archetype.unwrap();
    let rows_before: Vec<usize> = {
        let archetype = store.archetype(archetype_id).unwrap();
        entities
            .iter()
            .map(|&e| archetype.entity_index(e).unwrap())
            .collect()
    };
    assert_eq!(rows_before, vec![0, 1, 2, 3, 4]);

    let removed = entities[1];
    let last = entities[4];
    assert!(store.despawn(removed));

    let archetype = store.archetype(archetype_id).unwrap();
    assert_eq!(archetype.len(), 4);
    assert!(archetype.is_consistent());
    assert_eq!(archetype.entity_index(last), Some(1));
    assert_eq!(archetype.entity_index(removed), None);
    for &e in &[entities[0], entities[2], entities[3]] {
        assert_eq!(archetype.entity_index(e), Some(e.index() as usize));
    }

    assert_eq!(store.location(last).unwrap().row, 1);
    assert_eq!(store.get_component::<Tag>(last), Some(&Tag(4)));
}

#[test]
fn test_swap_remove_of_last_row() {
    let mut store = EntityStore::new();
    let a = store.spawn();
    store.add_component(a, Tag(0));
    let b = store.spawn();
    store.add_component(b, Tag(1));

    store.despawn(b);
    assert_eq!(store.location(a).unwrap().row, 0);
    assert_eq!(store.get_component::<Tag>(a), Some(&Tag(0)));
}

#[test]
fn test_migration_patches_displaced_entity() {
    let mut store = EntityStore::new();
    let entities: Vec<Entity> = (0..3u32)
        .map(|i| {
            let e = store.spawn();
            store.add_component(e, Tag(i));
            e
        })
        .collect();

    // Moving row 0 out pulls entity 2 into its place.
    store.add_component(entities[0], Weight(1.5));

    assert_eq!(store.location(entities[2]).unwrap().row, 0);
    assert_eq!(store.get_component::<Tag>(entities[2]), Some(&Tag(2)));
    assert_eq!(store.get_component::<Tag>(entities[0]), Some(&Tag(0)));
    assert_eq!(store.get_component::<Weight>(entities[0]), Some(&Weight(1.5)));
    assert!(store.archetypes().iter().all(|a| a.is_consistent()));
}

#[test]
fn test_signature_order_independent() {
    let ids = |raw: &[u32]| raw.iter().map(|&r| ComponentId::new(r)).collect::<Vec<_>>();
    let a = ArchetypeSignature::new(ids(&[3, 1, 2]));
    let b = ArchetypeSignature::new(ids(&[2, 3, 1, 1]));

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.ids(), ids(&[1, 2, 3]).as_slice());
}

#[test]
fn test_signature_with_without_idempotent() {
    let signature = ArchetypeSignature::new([ComponentId::new(4), ComponentId::new(9)]);

    let same = signature.with(ComponentId::new(4));
    assert_eq!(same, signature);
    assert_eq!(hash_of(&same), hash_of(&signature));

    let same = signature.without(ComponentId::new(5));
    assert_eq!(same, signature);

    let grown = signature.with(ComponentId::new(1));
    assert_eq!(grown.len(), 3);
    assert_eq!(grown.without(ComponentId::new(1)), signature);
}

#[test]
fn test_archetypes_shared_by_signature() {
    let mut store = EntityStore::new();
    let a = store.spawn();
    store.add_component(a, Tag(1));
    store.add_component(a, Weight(1.0));
    let b = store.spawn();
    store.add_component(b, Weight(2.0));
    store.add_component(b, Tag(2));

    assert_eq!(
        store.location(a).unwrap().archetype,
        store.location(b).unwrap().archetype
    );
    // empty, {Tag}, {Tag, Weight}, {Weight}
    assert_eq!(store.archetypes().len(), 4);
}

#[test]
fn test_clear_invalidates_handles() {
    let mut store = EntityStore::new();
    let handles: Vec<Entity> = (0..3).map(|_| store.spawn()).collect();
    store.add_component(handles[1], Tag(7));
    store.clear();

    assert!(store.is_empty());
    assert!(handles.iter().all(|&e| !store.is_alive(e)));
    let fresh = store.spawn();
    assert!(fresh.generation() > 1);
}
