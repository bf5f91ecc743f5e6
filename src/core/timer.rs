//! One-shot timers fired by polling against a clock.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::core::repr::Ipv4Address;

/// Work scheduled by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Timer {
    /// Retry one packet from the pending queue.
    Drain,
    /// Age the cache entry produced by a particular insertion.
    Expire {
        ipv4_addr: Ipv4Address,
        generation: u64,
    },
}

/// A set of armed one-shot timers.
///
/// Timers with the same deadline fire in the order they were armed.
#[derive(Debug, Default)]
pub struct Timers {
    heap: BinaryHeap<Reverse<(Instant, u64, Timer)>>,
    seq: u64,
}

impl Timers {
    pub fn new() -> Timers {
        Timers::default()
    }

    /// Arms a timer to fire once deadline has passed.
    pub fn arm(&mut self, deadline: Instant, timer: Timer) {
        self.heap.push(Reverse((deadline, self.seq, timer)));
        self.seq += 1;
    }

    /// Disarms and returns the earliest timer due at or before now.
    pub fn expired(&mut self, now: Instant) -> Option<Timer> {
        match self.heap.peek() {
            Some(Reverse((deadline, _, _))) if *deadline <= now => {}
            _ => return None,
        }

        self.heap.pop().map(|Reverse((_, _, timer))| timer)
    }

    /// Returns when the next timer is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse((deadline, _, _))| *deadline)
    }

    /// Returns the number of armed timers.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
