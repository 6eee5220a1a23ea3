//! Wishbone echo slave backed by a register file.

use super::{WishbonePhase, WishboneSignals};
use crate::{
    BindError, BusTransactor, IdleFlag, ProtocolViolation, RegisterFile, ResetLine, SignalSet,
    TraceEvent, TraceSink, DEFAULT_REGISTER_WORDS,
};

/// Responds to master reads and writes from a zero-initialized register
/// file, acknowledging every selected beat in one cycle.
///
/// Selection is `stb` high and, when a `cyc` line is bound, cycle-valid high
/// as well. Out-of-range addresses complete the handshake but pulse the
/// optional `err` line, skip the store, and return zero read data.
pub struct WishboneEchoSlave {
    bus: WishboneSignals,
    reset: ResetLine,
    registers: RegisterFile,
    phase: WishbonePhase,
    idle: IdleFlag,
    trace: Option<Box<dyn TraceSink>>,
}

impl WishboneEchoSlave {
    fn from_bus(
        signals: &mut SignalSet,
        bus: WishboneSignals,
        reset: ResetLine,
        words: usize,
    ) -> Self {
        signals.set_immediate(bus.ack, 0);
        signals.set_immediate(bus.data_o, 0);
        for key in [bus.err, bus.rty].into_iter().flatten() {
            signals.set_immediate(key, 0);
        }
        Self {
            bus,
            reset,
            registers: RegisterFile::new(words),
            phase: WishbonePhase::Idle,
            idle: IdleFlag::new(),
            trace: None,
        }
    }

    /// Binds a classic echo slave with a register file of `words` entries.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind_classic(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
        words: usize,
    ) -> Result<Self, BindError> {
        let bus = WishboneSignals::bind_classic(signals, prefix)?;
        Ok(Self::from_bus(signals, bus, reset, words))
    }

    /// Binds a standard echo slave with a register file of `words` entries.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind_standard(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
        words: usize,
    ) -> Result<Self, BindError> {
        let bus = WishboneSignals::bind_standard(signals, prefix)?;
        Ok(Self::from_bus(signals, bus, reset, words))
    }

    /// Binds a standard echo slave with the default 256-word register file.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind_standard_default(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
    ) -> Result<Self, BindError> {
        Self::bind_standard(signals, prefix, reset, DEFAULT_REGISTER_WORDS)
    }

    /// Installs a trace sink receiving this responder's events.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Read-only view of the backing register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Current handshake phase.
    #[must_use]
    pub const fn phase(&self) -> WishbonePhase {
        self.phase
    }

    /// Returns `true` while no handshake is mid-flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.idle.is_set()
    }

    fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_mut() {
            sink.on_event(event);
        }
    }

    /// Services the accepted beat: store on writes, fetch on reads, error
    /// strobe on out-of-range addresses.
    fn respond(&mut self, signals: &mut SignalSet) {
        let address = signals.value(self.bus.addr);
        if signals.is_high(self.bus.we) {
            let data = signals.value(self.bus.data_i);
            if self.registers.write(address, data).is_ok() {
                self.emit(TraceEvent::TransferRetired {
                    address,
                    data,
                    is_write: true,
                });
            } else {
                signals.drive_optional(self.bus.err, 1);
            }
        } else {
            match self.registers.read(address) {
                Ok(data) => {
                    signals.drive(self.bus.data_o, data);
                    self.emit(TraceEvent::TransferRetired {
                        address,
                        data,
                        is_write: false,
                    });
                }
                Err(_) => {
                    signals.drive(self.bus.data_o, 0);
                    signals.drive_optional(self.bus.err, 1);
                }
            }
        }
    }
}

impl BusTransactor for WishboneEchoSlave {
    fn on_rising_edge(&mut self, signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
        if self.reset.is_asserted(signals) {
            signals.drive(self.bus.ack, 0);
            signals.drive(self.bus.data_o, 0);
            signals.drive_optional(self.bus.err, 0);
            self.phase = WishbonePhase::Idle;
            self.idle.set();
            return Ok(());
        }

        match self.phase {
            WishbonePhase::Idle => {
                signals.drive_optional(self.bus.err, 0);
                if self.bus.is_selected(signals) {
                    signals.drive(self.bus.ack, 1);
                    self.respond(signals);
                    self.phase = WishbonePhase::Active;
                    self.idle.clear();
                } else {
                    signals.drive(self.bus.ack, 0);
                    signals.drive(self.bus.data_o, 0);
                    self.idle.set();
                }
            }
            WishbonePhase::Active => {
                // ack is a one-cycle pulse per beat.
                signals.drive(self.bus.ack, 0);
                signals.drive(self.bus.data_o, 0);
                signals.drive_optional(self.bus.err, 0);
                self.phase = WishbonePhase::Idle;
                self.idle.set();
            }
        }
        Ok(())
    }
}
