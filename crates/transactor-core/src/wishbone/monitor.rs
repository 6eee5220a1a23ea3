//! Wishbone standard protocol-compliance monitor.

use super::WishboneSignals;
use crate::{BindError, BusTransactor, ProtocolViolation, ResetLine, SignalKey, SignalSet};

/// Passive per-edge assertion checks over the Wishbone standard signal set.
///
/// Drives nothing and owns no queues. The edge on which reset is first
/// observed is a grace edge: drivers zero their outputs on that same edge,
/// so the reset-state check applies from the following edge onward.
pub struct WishboneStandardMonitor {
    bus: WishboneSignals,
    cyc: SignalKey,
    was_in_reset: bool,
    reset: ResetLine,
}

impl WishboneStandardMonitor {
    /// Binds a monitor to the standard roster under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind(signals: &SignalSet, prefix: &str, reset: ResetLine) -> Result<Self, BindError> {
        let bus = WishboneSignals::bind_standard(signals, prefix)?;
        let cyc = bus.cyc.ok_or_else(|| {
            BindError::MissingSignal(format!("{prefix}_cyc"))
        })?;
        Ok(Self {
            bus,
            cyc,
            was_in_reset: false,
            reset,
        })
    }

    fn reset_roster(&self) -> [(SignalKey, &'static str); 7] {
        [
            (self.bus.stb, "stb"),
            (self.cyc, "cyc"),
            (self.bus.we, "we"),
            (self.bus.addr, "addr"),
            (self.bus.data_i, "data_i"),
            (self.bus.data_o, "data_o"),
            (self.bus.ack, "ack"),
        ]
    }
}

impl BusTransactor for WishboneStandardMonitor {
    fn on_rising_edge(&mut self, signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
        if self.reset.is_asserted(signals) {
            if !self.was_in_reset {
                self.was_in_reset = true;
                return Ok(());
            }
            for (key, signal) in self.reset_roster() {
                if signals.value(key) != 0 {
                    return Err(ProtocolViolation::ResetStateViolation { signal });
                }
            }
            return Ok(());
        }
        self.was_in_reset = false;

        if signals.is_high(self.bus.stb) && !signals.is_high(self.cyc) {
            return Err(ProtocolViolation::StrobeWithoutCycle);
        }
        if signals.is_high(self.bus.ack) && !signals.is_high(self.cyc) {
            return Err(ProtocolViolation::AckWithoutCycle);
        }
        Ok(())
    }
}
