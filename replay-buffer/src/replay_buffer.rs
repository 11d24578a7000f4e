use std::collections::VecDeque;

use rand::seq::index;
use rand::Rng;

/// A FIFO store holding at most `capacity` entries. Enqueueing past capacity evicts the
/// oldest entries first.
#[derive(Clone, Debug)]
pub struct ReplayBuffer<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> ReplayBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a buffer from `entries` in order, keeping only the newest `capacity` of them.
    pub fn from_entries<I: IntoIterator<Item = T>>(capacity: usize, entries: I) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.extend(entries);
        buffer
    }

    pub fn enqueue(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }

        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(entry);
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, entries: I) {
        for entry in entries {
            self.enqueue(entry);
        }
    }

    /// A uniformly random subset without replacement. Returns fewer than `batch_size`
    /// entries when the buffer holds fewer.
    pub fn sample<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Vec<&T> {
        let amount = batch_size.min(self.entries.len());

        index::sample(rng, self.entries.len(), amount)
            .into_iter()
            .map(|i| &self.entries[i])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
