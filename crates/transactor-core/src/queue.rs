//! Request/response queue pipeline and idle-synchronization flag.

use std::collections::VecDeque;

use crate::{Direction, Transaction};

/// Level-triggered flag marking a transactor as out of work.
///
/// Producers clear it when new requests arrive; the state machine sets it
/// when both request queues are drained and no handshake is mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleFlag(bool);

impl IdleFlag {
    /// Creates the flag in its set (idle) state.
    #[must_use]
    pub const fn new() -> Self {
        Self(true)
    }

    /// Marks the transactor idle.
    pub fn set(&mut self) {
        self.0 = true;
    }

    /// Marks the transactor busy.
    pub fn clear(&mut self) {
        self.0 = false;
    }

    /// Returns `true` while the transactor is idle.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0
    }
}

impl Default for IdleFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Three-stage FIFO pipeline shared by every master driver.
///
/// A transaction lives in exactly one queue at a time: pending writes,
/// pending read requests, or completed reads. Dispatch order is strict FIFO
/// with writes drained before reads are considered.
#[derive(Debug, Clone)]
pub struct RequestPipeline<T: Transaction> {
    writes: VecDeque<T>,
    read_requests: VecDeque<T>,
    completed_reads: VecDeque<T>,
    idle: IdleFlag,
}

impl<T: Transaction> RequestPipeline<T> {
    /// Creates an empty, idle pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writes: VecDeque::new(),
            read_requests: VecDeque::new(),
            completed_reads: VecDeque::new(),
            idle: IdleFlag::new(),
        }
    }

    /// Queues a write request and marks the pipeline busy.
    pub fn push_write(&mut self, trans: T) {
        self.writes.push_back(trans);
        self.idle.clear();
    }

    /// Queues a read request and marks the pipeline busy.
    pub fn push_read_request(&mut self, trans: T) {
        self.read_requests.push_back(trans);
        self.idle.clear();
    }

    /// Pops the next request to service: writes strictly before reads.
    pub fn next_request(&mut self) -> Option<(T, Direction)> {
        if let Some(trans) = self.writes.pop_front() {
            return Some((trans, Direction::Write));
        }
        self.read_requests
            .pop_front()
            .map(|trans| (trans, Direction::Read))
    }

    /// Parks a completed read, data populated, for the caller to collect.
    pub fn push_completed(&mut self, trans: T) {
        self.completed_reads.push_back(trans);
    }

    /// Collects the oldest completed read.
    pub fn pop_completed(&mut self) -> Option<T> {
        self.completed_reads.pop_front()
    }

    /// Number of queued write requests.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Number of queued read requests.
    #[must_use]
    pub fn pending_reads(&self) -> usize {
        self.read_requests.len()
    }

    /// Number of completed reads awaiting collection.
    #[must_use]
    pub fn completed_reads(&self) -> usize {
        self.completed_reads.len()
    }

    /// Returns `true` when both request queues are empty.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.writes.is_empty() && self.read_requests.is_empty()
    }

    /// Discards queued writes without processing them.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Discards queued read requests and uncollected completed reads.
    pub fn clear_reads(&mut self) {
        self.read_requests.clear();
        self.completed_reads.clear();
    }

    /// Discards everything queued, in every stage.
    pub fn clear_all(&mut self) {
        self.clear_writes();
        self.clear_reads();
    }

    /// Returns `true` while the idle flag is set.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.idle.is_set()
    }

    /// Sets the idle flag; called by the state machine at its resting point.
    pub fn mark_idle(&mut self) {
        self.idle.set();
    }

    /// Clears the idle flag; called when work is pending.
    pub fn mark_busy(&mut self) {
        self.idle.clear();
    }
}

impl<T: Transaction> Default for RequestPipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
