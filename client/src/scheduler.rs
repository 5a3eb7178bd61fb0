use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

/// Deadline ordered timer queue on a caller supplied clock.
///
/// Time is measured as the offset from when the session started, so the same
/// queue serves the tokio front end (wall clock) and tests (virtual clock).
/// Timers due at the same instant fire in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Entry<T>>,
    seq: u64,
}

#[derive(Debug)]
struct Entry<T> {
    deadline: Duration,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.seq).cmp(&(self.deadline, self.seq))
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Duration, item: T) {
        self.seq += 1;
        self.queue.push(Entry {
            deadline,
            seq: self.seq,
            item,
        });
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|entry| entry.deadline)
    }

    /// Pops the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        if self.next_deadline()? > now {
            return None;
        }

        self.queue.pop().map(|entry| (entry.deadline, entry.item))
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
