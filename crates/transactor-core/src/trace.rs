//! Deterministic trace hooks emitted at transactor state boundaries.

/// Events emitted in execution order when a trace sink is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TraceEvent {
    /// A request entered the pipeline.
    RequestQueued {
        /// Target bus address.
        address: u64,
        /// True for writes, false for reads.
        is_write: bool,
    },
    /// A handshake completed and its transaction retired.
    TransferRetired {
        /// Target bus address.
        address: u64,
        /// Data written, or data sampled for a read.
        data: u64,
        /// True for writes, false for reads.
        is_write: bool,
    },
    /// The transactor observed reset asserted and returned to its defaults.
    ResetObserved,
    /// The state machine drained its queues and returned to rest.
    IdleEntered,
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}
