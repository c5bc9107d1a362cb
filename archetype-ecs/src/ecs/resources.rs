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
//! Singleton resources
//!
//! Resources are world-wide values looked up by type, at most one per type.
//! Inserting a second value of a type replaces the first. When the table is
//! dropped, resources are dropped in reverse registration order so later
//! resources can still rely on earlier ones during their own teardown.

use std::any::{type_name, Any, TypeId};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

struct ResourceEntry {
    /// Registration sequence number, used for teardown order
    sequence: u64,
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Type-keyed table of singleton values
#[derive(Default)]
pub struct Resources {
    entries: HashMap<TypeId, ResourceEntry>,
    next_sequence: u64,
}

impl Resources {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, returning the value it replaced
    ///
    /// A replacement counts as a fresh registration for teardown ordering.
    pub fn insert<R: Any + Send + Sync>(&mut self, value: R) -> Option<R> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let previous = self.entries.insert(
            TypeId::of::<R>(),
            ResourceEntry {
                sequence,
                name: type_name::<R>(),
                value: Box::new(value),
            },
        );
        if previous.is_some() {
            log::debug!("replaced resource {}", type_name::<R>());
        }
        previous.and_then(|entry| entry.value.downcast::<R>().ok().map(|boxed| *boxed))
    }

    /// Shared access to the resource of type `R`
    pub fn get<R: Any + Send + Sync>(&self) -> Option<&R> {
        self.entries
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.value.downcast_ref::<R>())
    }

    /// Mutable access to the resource of type `R`
    pub fn get_mut<R: Any + Send + Sync>(&mut self) -> Option<&mut R> {
        self.entries
            .get_mut(&TypeId::of::<R>())
            .and_then(|entry| entry.value.downcast_mut::<R>())
    }

    /// Take the resource of type `R` out of the table
    pub fn remove<R: Any + Send + Sync>(&mut self) -> Option<R> {
        self.entries
            .remove(&TypeId::of::<R>())
            .and_then(|entry| entry.value.downcast::<R>().ok().map(|boxed| *boxed))
    }

    /// Whether a resource of type `R` is present
    pub fn contains<R: Any + Send + Sync>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<R>())
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        let mut entries: Vec<&ResourceEntry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries.into_iter().map(|entry| entry.name).collect()
    }
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Drop for Resources {
    fn drop(&mut self) {
        let mut entries: Vec<ResourceEntry> = self.entries.drain().map(|(_, entry)| entry).collect();
        entries.sort_by_key(|entry| Reverse(entry.sequence));
        for entry in entries {
            log::trace!("dropping resource {}", entry.name);
            drop(entry);
        }
    }
}
