//! Tick-based delay queue
//!
//! Delayed work (effect slot release, ship respawn) is queued against a
//! future tick and polled once per fixed tick. Nothing blocks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::effects::EffectHandle;

/// Work the simulation can defer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Effect playback finished; return its slot
    ReleaseEffect(EffectHandle),
    /// Respawn delay elapsed; reset the round
    Respawn,
}

struct Entry<C> {
    at: u64,
    seq: u64,
    item: C,
}

impl<C> PartialEq for Entry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl<C> Eq for Entry<C> {}

impl<C> PartialOrd for Entry<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Entry<C> {
    // Reversed: BinaryHeap is a max-heap, earliest (tick, seq) must pop first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of `(due_tick, item)`; items due on the same tick run in insertion order
pub struct DelayQueue<C> {
    heap: BinaryHeap<Entry<C>>,
    seq: u64,
}

impl<C> Default for DelayQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DelayQueue<C> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queue `item` to run once the clock reaches `at`
    pub fn schedule(&mut self, at: u64, item: C) {
        self.seq += 1;
        self.heap.push(Entry {
            at,
            seq: self.seq,
            item,
        });
    }

    /// Tick of the earliest pending item
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.at)
    }

    /// Pop the next item due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<C> {
        if self.heap.peek()?.at > now {
            return None;
        }
        self.heap.pop().map(|e| e.item)
    }

    /// Drop every pending item (restart); returns how many were discarded
    pub fn invalidate_all(&mut self) -> usize {
        let dropped = self.heap.len();
        self.heap.clear();
        dropped
    }
}
