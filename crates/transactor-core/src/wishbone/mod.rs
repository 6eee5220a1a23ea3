//! Wishbone strobe/acknowledge bus transactors, classic and standard.
//!
//! Both flavors share one driver and one responder. The standard flavor
//! requires the `cyc` cycle-valid line; the classic flavor treats it as
//! optional and additionally drives the transaction's cycle/burst tags onto
//! `cti`/`bte` when those signals are bound. Data directions follow the
//! slave's view: `data_i` carries master write data, `data_o` carries slave
//! read data.

mod master;
mod monitor;
mod slave;

pub use master::WishboneMaster;
pub use monitor::WishboneStandardMonitor;
pub use slave::WishboneEchoSlave;

use crate::{
    BindError, SignalKey, SignalSet, WishboneClassicTransaction, WishboneStandardTransaction,
};

/// Required Wishbone classic signal roster.
pub const WISHBONE_CLASSIC_REQUIRED_SIGNALS: &[&str] =
    &["addr", "data_i", "data_o", "we", "stb", "sel", "ack"];

/// Optional Wishbone classic signal roster.
pub const WISHBONE_CLASSIC_OPTIONAL_SIGNALS: &[&str] = &["cyc", "cti", "bte", "err", "rty"];

/// Required Wishbone standard signal roster.
pub const WISHBONE_STANDARD_REQUIRED_SIGNALS: &[&str] =
    &["addr", "data_i", "data_o", "we", "stb", "sel", "ack", "cyc"];

/// Optional Wishbone standard signal roster.
pub const WISHBONE_STANDARD_OPTIONAL_SIGNALS: &[&str] = &["err", "rty"];

/// Wishbone classic master driver.
pub type WishboneClassicMaster = WishboneMaster<WishboneClassicTransaction>;

/// Wishbone standard master driver.
pub type WishboneStandardMaster = WishboneMaster<WishboneStandardTransaction>;

/// Handshake phase of a Wishbone transactor.
///
/// One instance per transactor; never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum WishbonePhase {
    /// At rest; no cycle open.
    #[default]
    Idle,
    /// Cycle open, waiting on `ack`.
    Active,
}

/// Bound Wishbone signal handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WishboneSignals {
    /// Address bus (`addr`).
    pub addr: SignalKey,
    /// Master write data (`data_i`).
    pub data_i: SignalKey,
    /// Slave read data (`data_o`).
    pub data_o: SignalKey,
    /// Write enable (`we`).
    pub we: SignalKey,
    /// Transfer strobe (`stb`).
    pub stb: SignalKey,
    /// Byte-lane select (`sel`).
    pub sel: SignalKey,
    /// Slave acknowledge (`ack`).
    pub ack: SignalKey,
    /// Cycle valid (`cyc`); required for standard, optional for classic.
    pub cyc: Option<SignalKey>,
    /// Optional cycle-type tag (`cti`), classic only.
    pub cti: Option<SignalKey>,
    /// Optional burst-extension tag (`bte`), classic only.
    pub bte: Option<SignalKey>,
    /// Optional slave error strobe (`err`).
    pub err: Option<SignalKey>,
    /// Optional slave retry strobe (`rty`).
    pub rty: Option<SignalKey>,
}

impl WishboneSignals {
    fn bind_required(signals: &SignalSet, prefix: &str) -> Result<Self, BindError> {
        Ok(Self {
            addr: signals.require(&format!("{prefix}_addr"))?,
            data_i: signals.require(&format!("{prefix}_data_i"))?,
            data_o: signals.require(&format!("{prefix}_data_o"))?,
            we: signals.require(&format!("{prefix}_we"))?,
            stb: signals.require(&format!("{prefix}_stb"))?,
            sel: signals.require(&format!("{prefix}_sel"))?,
            ack: signals.require(&format!("{prefix}_ack"))?,
            cyc: None,
            cti: None,
            bte: None,
            err: signals.key(&format!("{prefix}_err")),
            rty: signals.key(&format!("{prefix}_rty")),
        })
    }

    /// Binds the classic roster: `cyc`, `cti`, and `bte` degrade to absent
    /// handles when not declared.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when a required signal is not
    /// declared.
    pub fn bind_classic(signals: &SignalSet, prefix: &str) -> Result<Self, BindError> {
        let mut bus = Self::bind_required(signals, prefix)?;
        bus.cyc = signals.key(&format!("{prefix}_cyc"));
        bus.cti = signals.key(&format!("{prefix}_cti"));
        bus.bte = signals.key(&format!("{prefix}_bte"));
        Ok(bus)
    }

    /// Binds the standard roster: `cyc` is required, burst tags are absent.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when a required signal is not
    /// declared.
    pub fn bind_standard(signals: &SignalSet, prefix: &str) -> Result<Self, BindError> {
        let mut bus = Self::bind_required(signals, prefix)?;
        bus.cyc = Some(signals.require(&format!("{prefix}_cyc"))?);
        Ok(bus)
    }

    /// Returns `true` when the sampled signals select this slave: strobe
    /// high and, where `cyc` is bound, cycle-valid high as well.
    #[must_use]
    pub fn is_selected(&self, signals: &SignalSet) -> bool {
        signals.is_high(self.stb) && self.cyc.is_none_or(|cyc| signals.is_high(cyc))
    }
}

fn install_required(
    signals: &mut SignalSet,
    prefix: &str,
    address_width: u32,
    data_width: u32,
) -> Result<(), BindError> {
    signals.add(&format!("{prefix}_addr"), address_width)?;
    signals.add(&format!("{prefix}_data_i"), data_width)?;
    signals.add(&format!("{prefix}_data_o"), data_width)?;
    signals.add(&format!("{prefix}_we"), 1)?;
    signals.add(&format!("{prefix}_stb"), 1)?;
    signals.add(&format!("{prefix}_sel"), data_width.div_ceil(8))?;
    signals.add(&format!("{prefix}_ack"), 1)?;
    signals.add(&format!("{prefix}_err"), 1)?;
    signals.add(&format!("{prefix}_rty"), 1)?;
    Ok(())
}

/// Declares a complete classic roster (required plus optional signals,
/// including `cyc` and the burst tags) under `prefix`.
///
/// # Errors
///
/// Returns [`BindError::DuplicateSignal`] when any roster name is already
/// declared.
pub fn install_classic_signals(
    signals: &mut SignalSet,
    prefix: &str,
    address_width: u32,
    data_width: u32,
) -> Result<(), BindError> {
    install_required(signals, prefix, address_width, data_width)?;
    signals.add(&format!("{prefix}_cyc"), 1)?;
    signals.add(&format!("{prefix}_cti"), 3)?;
    signals.add(&format!("{prefix}_bte"), 2)?;
    Ok(())
}

/// Declares a complete standard roster (required plus optional signals)
/// under `prefix`.
///
/// # Errors
///
/// Returns [`BindError::DuplicateSignal`] when any roster name is already
/// declared.
pub fn install_standard_signals(
    signals: &mut SignalSet,
    prefix: &str,
    address_width: u32,
    data_width: u32,
) -> Result<(), BindError> {
    install_required(signals, prefix, address_width, data_width)?;
    signals.add(&format!("{prefix}_cyc"), 1)?;
    Ok(())
}
