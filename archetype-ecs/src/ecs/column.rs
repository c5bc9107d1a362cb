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
//! Dense component columns
//!
//! A [`Column<T>`] is a packed, growable array holding one component type for
//! every row of an archetype. Archetypes own columns of different concrete
//! types, so they store them behind the object-safe [`ErasedColumn`] trait and
//! downcast back to `Column<T>` when typed access is needed.
//!
//! Every structural operation on a column mirrors the matching operation on
//! the archetype's entity list: appends go to the end, removals are
//! swap-removes. Callers must apply them in lockstep across all columns.

use std::any::{type_name, Any, TypeId};

use crate::ecs::Component;

/// Smallest capacity a column grows to on its first allocation
const MIN_GROWTH: usize = 4;

/// Densely packed storage for a single component type
pub struct Column<T: Component> {
    data: Vec<T>,
}

impl<T: Component> Column<T> {
    /// Create an empty column without allocating
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty column able to hold `capacity` values before growing
    pub fn with_capacity(capacity: usize) -> Self {
        Column {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column holds no values
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of values the column can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Ensure room for at least `required` values in total
    ///
    /// Capacity doubles, or jumps straight to `required` when that is larger.
    pub fn ensure_capacity(&mut self, required: usize) {
        let capacity = self.data.capacity();
        if required <= capacity {
            return;
        }
        let target = (capacity * 2).max(required).max(MIN_GROWTH);
        self.data.reserve_exact(target - self.data.len());
    }

    /// Append a value, returning its row
    pub fn push(&mut self, value: T) -> usize {
        let row = self.data.len();
        self.ensure_capacity(row + 1);
        self.data.push(value);
        row
    }

    /// Remove the value at `row` by moving the last value into its place
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn swap_remove(&mut self, row: usize) -> T {
        self.data.swap_remove(row)
    }

    /// Shared access to the value at `row`
    pub fn get(&self, row: usize) -> Option<&T> {
        self.data.get(row)
    }

    /// Mutable access to the value at `row`
    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.data.get_mut(row)
    }

    /// Overwrite the value at `row` in place
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn replace(&mut self, row: usize, value: T) -> T {
        std::mem::replace(&mut self.data[row], value)
    }

    /// All values in row order
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All values in row order, mutably
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Component> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased interface over a [`Column<T>`]
///
/// This is the closed set of operations an archetype needs to keep its
/// columns in lockstep without knowing their element types.
pub trait ErasedColumn: Send + Sync {
    /// Number of stored values
    fn len(&self) -> usize;

    /// Whether the column holds no values
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current capacity
    fn capacity(&self) -> usize;

    /// Swap-remove the value at `row` and drop it
    fn swap_remove_drop(&mut self, row: usize);

    /// Swap-remove the value at `row` and append it to `target`
    ///
    /// # Panics
    ///
    /// Panics if `target` stores a different element type.
    fn swap_remove_into(&mut self, row: usize, target: &mut dyn ErasedColumn);

    /// Drop every value, keeping the allocation
    fn clear(&mut self);

    /// A new empty column of the same element type
    fn empty_clone(&self, capacity: usize) -> Box<dyn ErasedColumn>;

    /// `TypeId` of the element type
    fn element_type_id(&self) -> TypeId;

    /// Readable name of the element type
    fn element_type_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete column
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete column
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedColumn for Column<T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn capacity(&self) -> usize {
        self.data.capacity()
    }

    fn swap_remove_drop(&mut self, row: usize) {
        self.data.swap_remove(row);
    }

    fn swap_remove_into(&mut self, row: usize, target: &mut dyn ErasedColumn) {
        let target_name = target.element_type_name();
        let target = target
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .unwrap_or_else(|| {
                panic!(
                    "column type mismatch: moving {} into {}",
                    type_name::<T>(),
                    target_name
                )
            });
        target.push(self.data.swap_remove(row));
    }

    fn clear(&mut self) {
        self.data.clear();
    }

    fn empty_clone(&self, capacity: usize) -> Box<dyn ErasedColumn> {
        Box::new(Column::<T>::with_capacity(capacity))
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Downcast an erased column to its concrete type
pub(crate) fn downcast_ref<T: Component>(column: &dyn ErasedColumn) -> Option<&Column<T>> {
    column.as_any().downcast_ref::<Column<T>>()
}

/// Mutable variant of [`downcast_ref`]
pub(crate) fn downcast_mut<T: Component>(
    column: &mut dyn ErasedColumn,
) -> Option<&mut Column<T>> {
    column.as_any_mut().downcast_mut::<Column<T>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct TestComponent {
        x: f32,
        y: f32,
    }

    impl Component for TestComponent {}

    #[derive(Debug, PartialEq)]
    struct Label(String);

    impl Component for Label {}

    #[test]
    fn test_push_and_get() {
        let mut column = Column::<TestComponent>::new();
        assert_eq!(column.push(TestComponent { x: 1.0, y: 2.0 }), 0);
        assert_eq!(column.push(TestComponent { x: 3.0, y: 4.0 }), 1);
        assert_eq!(column.len(), 2);
        assert_eq!(column.get(1).unwrap().x, 3.0);
        assert!(column.get(2).is_none());
    }

    #[test]
    fn test_capacity_doubles() {
        let mut column = Column::<TestComponent>::new();
        assert_eq!(column.capacity(), 0);
        column.push(TestComponent { x: 0.0, y: 0.0 });
        assert!(column.capacity() >= MIN_GROWTH);

        let before = column.capacity();
        while column.len() < before {
            column.push(TestComponent { x: 0.0, y: 0.0 });
        }
        column.push(TestComponent { x: 0.0, y: 0.0 });
        assert!(column.capacity() >= before * 2);
    }

    #[test]
    fn test_ensure_capacity_jumps_to_request() {
        let mut column = Column::<TestComponent>::with_capacity(4);
        column.ensure_capacity(100);
        assert!(column.capacity() >= 100);
    }

    #[test]
    fn test_swap_remove_moves_last() {
        let mut column = Column::<TestComponent>::new();
        for i in 0..4 {
            column.push(TestComponent { x: i as f32, y: 0.0 });
        }

        let removed = column.swap_remove(1);
        assert_eq!(removed.x, 1.0);
        assert_eq!(column.len(), 3);
        // Former last row now sits in the vacated slot
        assert_eq!(column.get(1).unwrap().x, 3.0);
        assert_eq!(column.get(0).unwrap().x, 0.0);
        assert_eq!(column.get(2).unwrap().x, 2.0);
    }

    #[test]
    fn test_erased_swap_remove_into() {
        let mut source: Box<dyn ErasedColumn> = Box::new(Column::<Label>::new());
        let mut target = source.empty_clone(0);

        downcast_mut::<Label>(source.as_mut())
            .unwrap()
            .push(Label("a".into()));
        downcast_mut::<Label>(source.as_mut())
            .unwrap()
            .push(Label("b".into()));

        source.swap_remove_into(0, target.as_mut());

        assert_eq!(source.len(), 1);
        assert_eq!(target.len(), 1);
        assert_eq!(
            downcast_ref::<Label>(target.as_ref()).unwrap().get(0),
            Some(&Label("a".into()))
        );
        assert_eq!(
            downcast_ref::<Label>(source.as_ref()).unwrap().get(0),
            Some(&Label("b".into()))
        );
    }

    #[test]
    #[should_panic(expected = "column type mismatch")]
    fn test_erased_type_mismatch_panics() {
        let mut source = Column::<Label>::new();
        source.push(Label("x".into()));
        let mut target = Column::<TestComponent>::new();
        source.swap_remove_into(0, &mut target);
    }

    #[test]
    fn test_erased_metadata() {
        let column: Box<dyn ErasedColumn> = Box::new(Column::<TestComponent>::new());
        assert_eq!(column.element_type_id(), TypeId::of::<TestComponent>());
        assert!(column.element_type_name().ends_with("TestComponent"));
        assert!(column.is_empty());
    }

    #[test]
    fn test_clear_keeps_allocation() {
        let mut column = Column::<TestComponent>::with_capacity(16);
        column.push(TestComponent { x: 1.0, y: 1.0 });
        ErasedColumn::clear(&mut column);
        assert!(column.is_empty());
        assert!(column.capacity() >= 16);
    }
}
