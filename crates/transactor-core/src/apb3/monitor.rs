//! APB3 protocol-compliance monitor.

use super::Apb3Signals;
use crate::{BindError, BusTransactor, ProtocolViolation, ResetLine, SignalKey, SignalSet};

/// Passive per-edge assertion checks over the APB3 signal set.
///
/// Drives nothing and owns no queues. The edge on which reset is first
/// observed is a grace edge: drivers zero their outputs on that same edge,
/// so the reset-state check applies from the following edge onward.
pub struct Apb3Monitor {
    bus: Apb3Signals,
    reset: ResetLine,
    was_in_reset: bool,
}

impl Apb3Monitor {
    /// Binds a monitor to the roster under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind(signals: &SignalSet, prefix: &str, reset: ResetLine) -> Result<Self, BindError> {
        Ok(Self {
            bus: Apb3Signals::bind(signals, prefix)?,
            reset,
            was_in_reset: false,
        })
    }

    fn reset_roster(&self) -> [(SignalKey, &'static str); 7] {
        [
            (self.bus.psel, "psel"),
            (self.bus.paddr, "paddr"),
            (self.bus.penable, "penable"),
            (self.bus.pwrite, "pwrite"),
            (self.bus.pwdata, "pwdata"),
            (self.bus.prdata, "prdata"),
            (self.bus.pready, "pready"),
        ]
    }
}

impl BusTransactor for Apb3Monitor {
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

        if signals.is_high(self.bus.pready) && !signals.is_high(self.bus.psel) {
            return Err(ProtocolViolation::ReadyWithoutSelect);
        }
        if signals.is_high(self.bus.penable) && !signals.is_high(self.bus.psel) {
            return Err(ProtocolViolation::EnableWithoutSelect);
        }
        Ok(())
    }
}
