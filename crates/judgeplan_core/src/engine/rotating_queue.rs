//! Round-robin cursor over a fixed collection.
//!
//! # Invariants
//! - The collection is never empty.
//! - `cursor < items.len()` at all times.
//! - `enqueue` never moves the cursor.

use crate::engine::error::{PlanningError, PlanningResult};

/// Round-robin allocator spreading work across its items in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatingQueue<T> {
    items: Vec<T>,
    cursor: usize,
}

impl<T> RotatingQueue<T> {
    /// Creates a queue positioned at the first item.
    ///
    /// # Errors
    /// - `PlanningError::EmptyRotation` when `items` is empty.
    pub fn new(items: Vec<T>) -> PlanningResult<Self> {
        if items.is_empty() {
            return Err(PlanningError::EmptyRotation);
        }
        Ok(Self { items, cursor: 0 })
    }

    /// Returns the item under the cursor and advances it, wrapping at the end.
    pub fn next_item(&mut self) -> &T {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.items.len();
        &self.items[index]
    }

    /// Appends an item behind the current last one.
    pub fn enqueue(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false` for a constructed queue.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index the next `next_item` call will return.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::RotatingQueue;
    use crate::engine::error::{PlanningError, PlanningErrorKind};

    #[test]
    fn empty_queue_is_a_configuration_error() {
        let err = RotatingQueue::<u8>::new(Vec::new()).unwrap_err();
        assert_eq!(err, PlanningError::EmptyRotation);
        assert_eq!(err.kind(), PlanningErrorKind::Configuration);
    }

    #[test]
    fn next_item_visits_items_in_order_and_wraps() {
        let mut queue = RotatingQueue::new(vec!["a", "b", "c"]).unwrap();
        let visited: Vec<&str> = (0..7).map(|_| *queue.next_item()).collect();
        assert_eq!(visited, ["a", "b", "c", "a", "b", "c", "a"]);
        assert_eq!(queue.cursor(), 1);
    }

    #[test]
    fn single_item_queue_always_returns_it() {
        let mut queue = RotatingQueue::new(vec![42]).unwrap();
        for _ in 0..5 {
            assert_eq!(*queue.next_item(), 42);
        }
        assert_eq!(queue.cursor(), 0);
    }

    #[test]
    fn enqueue_keeps_cursor_and_joins_rotation() {
        let mut queue = RotatingQueue::new(vec![1, 2]).unwrap();
        assert_eq!(*queue.next_item(), 1);

        queue.enqueue(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.cursor(), 1);

        let visited: Vec<i32> = (0..4).map(|_| *queue.next_item()).collect();
        assert_eq!(visited, [2, 3, 1, 2]);
    }

    #[test]
    fn enqueue_after_wrap_is_reached_before_restart() {
        let mut queue = RotatingQueue::new(vec![1, 2]).unwrap();
        queue.next_item();
        queue.next_item();
        assert_eq!(queue.cursor(), 0);

        queue.enqueue(3);
        let visited: Vec<i32> = (0..3).map(|_| *queue.next_item()).collect();
        assert_eq!(visited, [1, 2, 3]);
    }
}
