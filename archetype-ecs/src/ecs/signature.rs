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
//! Canonical archetype signatures
//!
//! A signature is the sorted, duplicate-free set of component ids shared by
//! every entity of an archetype. The hash is computed once on construction so
//! that signature → archetype lookups never rehash the id list.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::ecs::ComponentId;

/// Immutable, canonical set of component ids
#[derive(Debug, Clone)]
pub struct ArchetypeSignature {
    ids: Box<[ComponentId]>,
    hash: u64,
}

impl ArchetypeSignature {
    /// The signature with no components
    pub fn empty() -> Self {
        Self::from_sorted(Vec::new())
    }

    /// Build a signature from ids in any order, duplicates allowed
    pub fn new(ids: impl IntoIterator<Item = ComponentId>) -> Self {
        let mut ids: Vec<ComponentId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self::from_sorted(ids)
    }

    fn from_sorted(ids: Vec<ComponentId>) -> Self {
        debug_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        let mut hasher = DefaultHasher::new();
        ids.hash(&mut hasher);
        ArchetypeSignature {
            ids: ids.into_boxed_slice(),
            hash: hasher.finish(),
        }
    }

    /// Sorted component ids
    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    /// Number of component ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether this is the empty signature
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Precomputed hash of the id sequence
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    /// Whether `id` is part of the signature
    pub fn contains(&self, id: ComponentId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Whether every id in `ids` is part of the signature
    pub fn contains_all(&self, ids: &[ComponentId]) -> bool {
        ids.iter().all(|&id| self.contains(id))
    }

    /// Position of `id` within the sorted ids
    pub fn position(&self, id: ComponentId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    /// A new signature that also contains `id`
    pub fn with(&self, id: ComponentId) -> Self {
        match self.ids.binary_search(&id) {
            Ok(_) => self.clone(),
            Err(at) => {
                let mut ids = Vec::with_capacity(self.ids.len() + 1);
                ids.extend_from_slice(&self.ids[..at]);
                ids.push(id);
                ids.extend_from_slice(&self.ids[at..]);
                Self::from_sorted(ids)
            }
        }
    }

    /// A new signature that does not contain `id`
    pub fn without(&self, id: ComponentId) -> Self {
        match self.ids.binary_search(&id) {
            Ok(at) => {
                let mut ids = self.ids.to_vec();
                ids.remove(at);
                Self::from_sorted(ids)
            }
            Err(_) => self.clone(),
        }
    }
}

impl PartialEq for ArchetypeSignature {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.ids == other.ids
    }
}

impl Eq for ArchetypeSignature {}

impl Hash for ArchetypeSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl Default for ArchetypeSignature {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<ComponentId> {
        raw.iter().copied().map(ComponentId::new).collect()
    }

    fn hash_of(signature: &ArchetypeSignature) -> u64 {
        let mut hasher = DefaultHasher::new();
        signature.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_canonical_ordering() {
        let a = ArchetypeSignature::new(ids(&[3, 1, 2]));
        let b = ArchetypeSignature::new(ids(&[2, 3, 1, 1]));
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.ids(), &ids(&[1, 2, 3])[..]);
    }

    #[test]
    fn test_with_inserts_sorted() {
        let base = ArchetypeSignature::new(ids(&[1, 5]));
        let grown = base.with(ComponentId::new(3));
        assert_eq!(grown.ids(), &ids(&[1, 3, 5])[..]);
        // Original untouched
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_with_is_idempotent() {
        let base = ArchetypeSignature::new(ids(&[1, 5]));
        assert_eq!(base.with(ComponentId::new(5)), base);
    }

    #[test]
    fn test_without_is_idempotent() {
        let base = ArchetypeSignature::new(ids(&[1, 5]));
        assert_eq!(base.without(ComponentId::new(4)), base);
        assert_eq!(base.without(ComponentId::new(5)).ids(), &ids(&[1])[..]);
    }

    #[test]
    fn test_with_then_without_round_trip() {
        let base = ArchetypeSignature::new(ids(&[0, 2]));
        let round = base.with(ComponentId::new(1)).without(ComponentId::new(1));
        assert_eq!(round, base);
        assert_eq!(hash_of(&round), hash_of(&base));
    }

    #[test]
    fn test_contains_all() {
        let signature = ArchetypeSignature::new(ids(&[0, 2, 4]));
        assert!(signature.contains_all(&ids(&[4, 0])));
        assert!(!signature.contains_all(&ids(&[0, 1])));
        assert!(signature.contains_all(&[]));
        assert_eq!(signature.position(ComponentId::new(4)), Some(2));
    }

    #[test]
    fn test_empty_signature() {
        let empty = ArchetypeSignature::empty();
        assert!(empty.is_empty());
        assert_eq!(empty, ArchetypeSignature::new(Vec::new()));
        assert_eq!(empty, ArchetypeSignature::default());
    }
}
