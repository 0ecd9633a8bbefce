//! The queues handing operation indices between the submitter, the worker
//! pool and the updater thread.
//!
//! Both queues carry nothing but table indices: the table itself lives
//! behind the scheduler's own lock, so a handoff only needs to move enough
//! information for the receiver to go find the operation again. Using an
//! unbounded MPMC channel rather than a bespoke queue gets us the same
//! guarantee the original design relied on a blocking queue for: a
//! `recv()` establishes happens-before with everything the sender did
//! before its `send()`, so a worker that pulls an index off the runnable
//! handoff can trust that every predecessor it depends on is visibly
//! finished.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// One side of a queue moving operation-table indices between threads.
pub struct Handoff {
    tx: Sender<usize>,
    rx: Receiver<usize>,
}

impl Handoff {
    /// A fresh, unbounded handoff.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Handoff { tx, rx }
    }

    /// A sender clone; cheap, safe to hand to any number of threads.
    pub fn sender(&self) -> Sender<usize> {
        self.tx.clone()
    }

    /// A receiver clone; with multiple receivers, each index is still
    /// delivered to exactly one of them.
    pub fn receiver(&self) -> Receiver<usize> {
        self.rx.clone()
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}
