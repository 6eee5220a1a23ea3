//! Error taxonomy for signal binding, request contracts, and protocol checks.

use thiserror::Error;

/// Failures raised while declaring signals or binding a transactor to them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A required roster signal was not found in the signal set.
    #[error("required signal `{0}` is not present in the signal set")]
    MissingSignal(String),
    /// A signal with the same name was already declared.
    #[error("signal `{0}` is already declared in the signal set")]
    DuplicateSignal(String),
}

/// Fatal protocol-compliance findings raised by monitors.
///
/// Each variant is a single boolean implication checked on every rising edge
/// and raised immediately; violations are never accumulated.
// Serialize only: the borrowed signal name cannot be deserialized into a
// static reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ProtocolViolation {
    /// A bus signal read as non-zero while reset was asserted.
    #[error("signal `{signal}` is not zero while reset is asserted")]
    ResetStateViolation {
        /// Unprefixed roster name of the offending signal.
        signal: &'static str,
    },
    /// `pready` was asserted with no live `psel` selection.
    #[error("pready asserted while psel is deasserted")]
    ReadyWithoutSelect,
    /// `penable` was asserted with no live `psel` selection.
    #[error("penable asserted while psel is deasserted")]
    EnableWithoutSelect,
    /// `ack` was asserted outside an open `cyc` cycle.
    #[error("ack asserted while cyc is deasserted")]
    AckWithoutCycle,
    /// `stb` was asserted outside an open `cyc` cycle.
    #[error("stb asserted while cyc is deasserted")]
    StrobeWithoutCycle,
}

/// Recoverable failures surfaced by the blocking request API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransactorError {
    /// A batched write was submitted with differing address and data counts.
    #[error("address batch has {addresses} entries but data batch has {data}")]
    BatchLengthMismatch {
        /// Number of submitted addresses.
        addresses: usize,
        /// Number of submitted data words.
        data: usize,
    },
    /// Queued work was discarded by a reset or `restart` before completion.
    #[error("request abandoned by a restart or reset before completion")]
    Aborted,
    /// A handshake consumed the full edge budget without completing.
    #[error("handshake made no progress within {edges} clock edges")]
    HandshakeStalled {
        /// Edge budget that was exhausted.
        edges: u64,
    },
    /// A monitor raised a fatal finding while the request was in flight.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
}

/// Out-of-range register file access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterFileError {
    /// The address does not name a word inside the register file.
    #[error("address {address:#x} is outside the {words}-word register file")]
    AddressOutOfRange {
        /// Offending word address.
        address: u64,
        /// Configured register file size in words.
        words: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::{ProtocolViolation, TransactorError};

    #[test]
    fn protocol_violation_converts_into_transactor_error() {
        let err = TransactorError::from(ProtocolViolation::ReadyWithoutSelect);
        assert_eq!(
            err,
            TransactorError::Protocol(ProtocolViolation::ReadyWithoutSelect)
        );
    }

    #[test]
    fn violation_messages_name_the_offending_signals() {
        let reset = ProtocolViolation::ResetStateViolation { signal: "psel" };
        assert!(reset.to_string().contains("psel"));
        assert!(ProtocolViolation::StrobeWithoutCycle
            .to_string()
            .contains("stb"));
    }
}
