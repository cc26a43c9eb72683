//! FIFO queue with amortized O(1) dequeue.
//!
//! Dequeued slots are left behind as `None` and reclaimed in bulk once they make
//! up more than half of the backing vector, so no single `remove` shifts the
//! whole queue.

/// Errors for [`Queue`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Nothing left to dequeue.
    #[error("queue is empty")]
    Empty,
}

/// First-in first-out queue.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    items: Vec<Option<T>>,
    start: usize,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            start: 0,
        }
    }

    /// Append `item` at the back.
    pub fn add(&mut self, item: T) {
        self.items.push(Some(item));
    }

    /// Take the item at the front.
    pub fn remove(&mut self) -> Result<T, QueueError> {
        let item = self
            .items
            .get_mut(self.start)
            .and_then(Option::take)
            .ok_or(QueueError::Empty)?;
        self.start += 1;

        if self.start > self.items.len() / 2 {
            self.compact();
        }
        Ok(item)
    }

    /// The item at the front, if any.
    pub fn peek(&self) -> Option<&T> {
        self.items.get(self.start).and_then(Option::as_ref)
    }

    /// True if at least one item is queued.
    pub fn any(&self) -> bool {
        self.len() > 0
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        !self.any()
    }

    fn compact(&mut self) {
        self.items.drain(..self.start);
        self.start = 0;
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Some).collect(),
            start: 0,
        }
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Some));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeues_in_insertion_order() {
        let mut q = Queue::new();
        for i in 0..10_000 {
            q.add(i);
        }
        for i in 0..10_000 {
            assert_eq!(q.remove(), Ok(i));
        }
        assert!(!q.any());
    }

    #[test]
    fn empty_remove_is_an_error() {
        let mut q: Queue<u8> = Queue::new();
        assert_eq!(q.remove(), Err(QueueError::Empty));

        q.add(1);
        assert_eq!(q.remove(), Ok(1));
        assert_eq!(q.remove(), Err(QueueError::Empty));
        assert_eq!(q.peek(), None);
    }

    #[test]
    fn peek_does_not_remove() {
        let mut q: Queue<&str> = ["a", "b"].into_iter().collect();
        assert_eq!(q.peek(), Some(&"a"));
        assert_eq!(q.len(), 2);
        assert_eq!(q.remove(), Ok("a"));
        assert_eq!(q.peek(), Some(&"b"));
    }

    #[test]
    fn compaction_bounds_backing_storage() {
        let mut q: Queue<usize> = (0..100).collect();
        for i in 0..60 {
            assert_eq!(q.remove(), Ok(i));
            // Consumed prefix never exceeds half the backing vector.
            assert!(q.start <= q.items.len() / 2);
        }
        assert_eq!(q.len(), 40);
        assert!(q.items.len() < 100);
    }

    #[test]
    fn interleaved_adds_and_removes_keep_order() {
        let mut q = Queue::new();
        let mut next_out = 0;
        for round in 0..50 {
            q.extend(round * 10..round * 10 + 10);
            for _ in 0..7 {
                assert_eq!(q.remove(), Ok(next_out));
                next_out += 1;
            }
        }
        while q.any() {
            assert_eq!(q.remove(), Ok(next_out));
            next_out += 1;
        }
        assert_eq!(next_out, 500);
        assert!(q.is_empty());
    }
}
