//! APB3 two-phase setup/access bus transactors.
//!
//! Signals are bound by name as `<prefix>_<name>` against the shared
//! [`SignalSet`]. The `pslverr` line is optional; when absent it degrades to
//! a constant-zero stand-in on the read side and drives are swallowed.

mod master;
mod monitor;
mod slave;

pub use master::Apb3Master;
pub use monitor::Apb3Monitor;
pub use slave::Apb3EchoSlave;

use crate::{BindError, SignalKey, SignalSet};

/// Required APB3 signal roster.
pub const APB3_REQUIRED_SIGNALS: &[&str] = &[
    "paddr", "psel", "penable", "pwrite", "pwdata", "pready", "prdata",
];

/// Optional APB3 signal roster.
pub const APB3_OPTIONAL_SIGNALS: &[&str] = &["pslverr"];

/// Handshake phase of an APB3 transactor.
///
/// One instance per transactor; never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ApbPhase {
    /// At rest; no transfer selected.
    #[default]
    Idle,
    /// First transfer cycle: selection and address are live, enable pending.
    Setup,
    /// Second transfer cycle: enable is live, waiting on `pready`.
    Access,
}

/// Bound APB3 signal handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Apb3Signals {
    /// Address bus (`paddr`).
    pub paddr: SignalKey,
    /// Peripheral select (`psel`).
    pub psel: SignalKey,
    /// Second-cycle enable strobe (`penable`).
    pub penable: SignalKey,
    /// Transfer direction (`pwrite`).
    pub pwrite: SignalKey,
    /// Master write data (`pwdata`).
    pub pwdata: SignalKey,
    /// Slave transfer-complete strobe (`pready`).
    pub pready: SignalKey,
    /// Slave read data (`prdata`).
    pub prdata: SignalKey,
    /// Optional slave error strobe (`pslverr`).
    pub pslverr: Option<SignalKey>,
}

impl Apb3Signals {
    /// Binds the roster against `signals` under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when a required signal is not
    /// declared.
    pub fn bind(signals: &SignalSet, prefix: &str) -> Result<Self, BindError> {
        Ok(Self {
            paddr: signals.require(&format!("{prefix}_paddr"))?,
            psel: signals.require(&format!("{prefix}_psel"))?,
            penable: signals.require(&format!("{prefix}_penable"))?,
            pwrite: signals.require(&format!("{prefix}_pwrite"))?,
            pwdata: signals.require(&format!("{prefix}_pwdata"))?,
            pready: signals.require(&format!("{prefix}_pready"))?,
            prdata: signals.require(&format!("{prefix}_prdata"))?,
            pslverr: signals.key(&format!("{prefix}_pslverr")),
        })
    }
}

/// Declares a complete APB3 roster (required plus optional signals) under
/// `prefix` with the given address and data widths.
///
/// # Errors
///
/// Returns [`BindError::DuplicateSignal`] when any roster name is already
/// declared.
pub fn install_signals(
    signals: &mut SignalSet,
    prefix: &str,
    address_width: u32,
    data_width: u32,
) -> Result<(), BindError> {
    signals.add(&format!("{prefix}_paddr"), address_width)?;
    signals.add(&format!("{prefix}_psel"), 1)?;
    signals.add(&format!("{prefix}_penable"), 1)?;
    signals.add(&format!("{prefix}_pwrite"), 1)?;
    signals.add(&format!("{prefix}_pwdata"), data_width)?;
    signals.add(&format!("{prefix}_pready"), 1)?;
    signals.add(&format!("{prefix}_prdata"), data_width)?;
    signals.add(&format!("{prefix}_pslverr"), 1)?;
    Ok(())
}
