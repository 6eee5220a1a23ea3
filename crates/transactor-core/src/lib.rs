//! Cycle-accurate APB3 and Wishbone bus transactors over a shared signal set.

/// Error taxonomy for binding, protocol, and transfer failures.
pub mod error;
pub use error::{BindError, ProtocolViolation, RegisterFileError, TransactorError};

/// Named bit-vector signals with per-edge two-phase commit.
pub mod signal;
pub use signal::{ResetLine, ResetSense, SignalKey, SignalSet};

/// Per-protocol transaction value types.
pub mod transaction;
pub use transaction::{
    Apb3Transaction, BurstKind, CycleKind, Direction, Transaction, WishboneClassicTransaction,
    WishboneStandardTransaction,
};

/// Request pipeline queues and the idle flag.
pub mod queue;
pub use queue::{IdleFlag, RequestPipeline};

/// Word-addressed slave register file.
pub mod regfile;
pub use regfile::{RegisterFile, DEFAULT_REGISTER_WORDS};

/// Trace event stream for observing transactor activity.
pub mod trace;
pub use trace::{TraceEvent, TraceSink};

/// Edge scheduler and the blocking request API.
pub mod bench;
pub use bench::{Bench, BusTransactor, RequestPort, DEFAULT_WATCHDOG_EDGES};

/// APB3 two-phase setup/access transactors.
pub mod apb3;
pub use apb3::{
    Apb3EchoSlave, Apb3Master, Apb3Monitor, Apb3Signals, ApbPhase, APB3_OPTIONAL_SIGNALS,
    APB3_REQUIRED_SIGNALS,
};

/// Wishbone strobe/acknowledge transactors, classic and standard.
pub mod wishbone;
pub use wishbone::{
    WishboneClassicMaster, WishboneEchoSlave, WishboneMaster, WishbonePhase, WishboneSignals,
    WishboneStandardMaster, WishboneStandardMonitor, WISHBONE_CLASSIC_OPTIONAL_SIGNALS,
    WISHBONE_CLASSIC_REQUIRED_SIGNALS, WISHBONE_STANDARD_OPTIONAL_SIGNALS,
    WISHBONE_STANDARD_REQUIRED_SIGNALS,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
