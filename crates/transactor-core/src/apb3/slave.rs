//! APB3 echo slave backed by a register file.

use super::{Apb3Signals, ApbPhase};
use crate::{
    BindError, BusTransactor, IdleFlag, ProtocolViolation, RegisterFile, ResetLine, SignalSet,
    TraceEvent, TraceSink, DEFAULT_REGISTER_WORDS,
};

/// Responds to master reads and writes from a zero-initialized register
/// file: data written to an address is echoed back on a matching read.
///
/// Out-of-range addresses complete the handshake but assert the optional
/// `pslverr` line, skip the store, and return zero read data.
pub struct Apb3EchoSlave {
    bus: Apb3Signals,
    reset: ResetLine,
    registers: RegisterFile,
    phase: ApbPhase,
    idle: IdleFlag,
    trace: Option<Box<dyn TraceSink>>,
}

impl Apb3EchoSlave {
    /// Binds an echo slave with a register file of `words` entries and
    /// zeroes every signal it drives.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
        words: usize,
    ) -> Result<Self, BindError> {
        let bus = Apb3Signals::bind(signals, prefix)?;
        signals.set_immediate(bus.pready, 0);
        signals.set_immediate(bus.prdata, 0);
        if let Some(pslverr) = bus.pslverr {
            signals.set_immediate(pslverr, 0);
        }
        Ok(Self {
            bus,
            reset,
            registers: RegisterFile::new(words),
            phase: ApbPhase::Idle,
            idle: IdleFlag::new(),
            trace: None,
        })
    }

    /// Binds an echo slave with the default 256-word register file.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind_default(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
    ) -> Result<Self, BindError> {
        Self::bind(signals, prefix, reset, DEFAULT_REGISTER_WORDS)
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
    pub const fn phase(&self) -> ApbPhase {
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

    /// Services the accepted transfer: store on writes, fetch on reads,
    /// error strobe on out-of-range addresses.
    fn respond(&mut self, signals: &mut SignalSet) {
        let address = signals.value(self.bus.paddr);
        if signals.is_high(self.bus.pwrite) {
            let data = signals.value(self.bus.pwdata);
            if self.registers.write(address, data).is_ok() {
                self.emit(TraceEvent::TransferRetired {
                    address,
                    data,
                    is_write: true,
                });
            } else {
                signals.drive_optional(self.bus.pslverr, 1);
            }
        } else {
            match self.registers.read(address) {
                Ok(data) => {
                    signals.drive(self.bus.prdata, data);
                    self.emit(TraceEvent::TransferRetired {
                        address,
                        data,
                        is_write: false,
                    });
                }
                Err(_) => {
                    signals.drive(self.bus.prdata, 0);
                    signals.drive_optional(self.bus.pslverr, 1);
                }
            }
        }
    }
}

impl BusTransactor for Apb3EchoSlave {
    fn on_rising_edge(&mut self, signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
        if self.reset.is_asserted(signals) {
            signals.drive(self.bus.pready, 0);
            signals.drive(self.bus.prdata, 0);
            signals.drive_optional(self.bus.pslverr, 0);
            self.phase = ApbPhase::Idle;
            self.idle.set();
            return Ok(());
        }

        match self.phase {
            ApbPhase::Idle => {
                signals.drive(self.bus.pready, 0);
                signals.drive_optional(self.bus.pslverr, 0);
                if signals.is_high(self.bus.psel) {
                    self.phase = ApbPhase::Setup;
                    self.idle.clear();
                } else {
                    signals.drive(self.bus.prdata, 0);
                    self.idle.set();
                }
            }
            ApbPhase::Setup => {
                if signals.is_high(self.bus.psel) && signals.is_high(self.bus.penable) {
                    signals.drive(self.bus.pready, 1);
                    self.respond(signals);
                    self.phase = ApbPhase::Access;
                } else {
                    signals.drive(self.bus.pready, 0);
                    self.phase = ApbPhase::Idle;
                    self.idle.set();
                }
            }
            ApbPhase::Access => {
                // pready is a one-cycle pulse per transfer.
                signals.drive(self.bus.pready, 0);
                signals.drive(self.bus.prdata, 0);
                if signals.is_high(self.bus.psel) && signals.is_high(self.bus.penable) {
                    self.phase = ApbPhase::Setup;
                } else {
                    self.phase = ApbPhase::Idle;
                }
                self.idle.set();
            }
        }
        Ok(())
    }
}
