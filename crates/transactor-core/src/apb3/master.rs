//! APB3 master driver.

use super::{Apb3Signals, ApbPhase};
use crate::{
    Apb3Transaction, BindError, BusTransactor, Direction, ProtocolViolation, RequestPipeline,
    RequestPort, ResetLine, SignalSet, TraceEvent, TraceSink, Transaction,
};

/// Drives slave devices over the APB3 bus.
///
/// Each rising edge advances the `IDLE -> SETUP -> ACCESS` handshake, popping
/// requests from the pipeline with writes drained strictly before reads.
pub struct Apb3Master {
    bus: Apb3Signals,
    reset: ResetLine,
    pipeline: RequestPipeline<Apb3Transaction>,
    phase: ApbPhase,
    in_flight: Option<(Apb3Transaction, Direction)>,
    was_in_reset: bool,
    trace: Option<Box<dyn TraceSink>>,
}

impl Apb3Master {
    /// Binds a master to the roster under `prefix` and zeroes every signal
    /// it drives.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
    ) -> Result<Self, BindError> {
        let bus = Apb3Signals::bind(signals, prefix)?;
        for key in [bus.paddr, bus.psel, bus.penable, bus.pwrite, bus.pwdata] {
            signals.set_immediate(key, 0);
        }
        Ok(Self {
            bus,
            reset,
            pipeline: RequestPipeline::new(),
            phase: ApbPhase::Idle,
            in_flight: None,
            was_in_reset: false,
            trace: None,
        })
    }

    /// Installs a trace sink receiving this driver's events.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Current handshake phase.
    #[must_use]
    pub const fn phase(&self) -> ApbPhase {
        self.phase
    }

    fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_mut() {
            sink.on_event(event);
        }
    }

    fn zero_outputs(&self, signals: &mut SignalSet) {
        for key in [
            self.bus.psel,
            self.bus.paddr,
            self.bus.penable,
            self.bus.pwrite,
            self.bus.pwdata,
        ] {
            signals.drive(key, 0);
        }
    }

    /// Drives selection, address, direction, and (for writes) data for a
    /// freshly popped request. `penable` is handled by the caller.
    fn drive_request(&self, signals: &mut SignalSet, trans: &Apb3Transaction, dir: Direction) {
        signals.drive(self.bus.psel, 1);
        signals.drive(self.bus.paddr, trans.address);
        match dir {
            Direction::Write => {
                signals.drive(self.bus.pwrite, 1);
                signals.drive(self.bus.pwdata, trans.data.unwrap_or(0));
            }
            Direction::Read => signals.drive(self.bus.pwrite, 0),
        }
    }

    fn retire(&mut self, signals: &SignalSet) {
        if let Some((mut trans, dir)) = self.in_flight.take() {
            let address = trans.address;
            let data = match dir {
                Direction::Read => {
                    let sampled = signals.value(self.bus.prdata);
                    trans.set_data(sampled);
                    self.pipeline.push_completed(trans);
                    sampled
                }
                Direction::Write => trans.data.unwrap_or(0),
            };
            self.emit(TraceEvent::TransferRetired {
                address,
                data,
                is_write: dir == Direction::Write,
            });
        }
    }
}

impl BusTransactor for Apb3Master {
    fn on_rising_edge(&mut self, signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
        if self.reset.is_asserted(signals) {
            self.zero_outputs(signals);
            self.phase = ApbPhase::Idle;
            self.in_flight = None;
            self.pipeline.clear_all();
            self.pipeline.mark_idle();
            if !self.was_in_reset {
                self.was_in_reset = true;
                self.emit(TraceEvent::ResetObserved);
            }
            return Ok(());
        }
        self.was_in_reset = false;

        match self.phase {
            ApbPhase::Idle => {
                if let Some((trans, dir)) = self.pipeline.next_request() {
                    self.drive_request(signals, &trans, dir);
                    self.in_flight = Some((trans, dir));
                    self.phase = ApbPhase::Setup;
                } else {
                    self.zero_outputs(signals);
                    self.pipeline.mark_idle();
                }
            }
            ApbPhase::Setup => {
                // Re-drive address and data against combinational drift.
                signals.drive(self.bus.penable, 1);
                if let Some((trans, dir)) = self.in_flight {
                    signals.drive(self.bus.paddr, trans.address);
                    if dir == Direction::Write {
                        signals.drive(self.bus.pwdata, trans.data.unwrap_or(0));
                    }
                }
                self.phase = ApbPhase::Access;
            }
            ApbPhase::Access => {
                if signals.is_high(self.bus.pready) {
                    self.retire(signals);
                    if let Some((trans, dir)) = self.pipeline.next_request() {
                        signals.drive(self.bus.penable, 0);
                        self.drive_request(signals, &trans, dir);
                        self.in_flight = Some((trans, dir));
                        self.phase = ApbPhase::Setup;
                    } else {
                        signals.drive(self.bus.psel, 0);
                        signals.drive(self.bus.penable, 0);
                        self.phase = ApbPhase::Idle;
                        self.pipeline.mark_idle();
                        self.emit(TraceEvent::IdleEntered);
                    }
                }
            }
        }
        Ok(())
    }
}

impl RequestPort for Apb3Master {
    fn enqueue_write(&mut self, address: u64, data: u64) {
        self.emit(TraceEvent::RequestQueued {
            address,
            is_write: true,
        });
        self.pipeline
            .push_write(Apb3Transaction::from_request(address, Some(data)));
    }

    fn enqueue_read(&mut self, address: u64) {
        self.emit(TraceEvent::RequestQueued {
            address,
            is_write: false,
        });
        self.pipeline
            .push_read_request(Apb3Transaction::from_request(address, None));
    }

    fn take_completed(&mut self) -> Option<u64> {
        self.pipeline.pop_completed().and_then(|trans| trans.data())
    }

    fn is_idle(&self) -> bool {
        self.pipeline.is_idle()
    }

    fn pending_writes(&self) -> usize {
        self.pipeline.pending_writes()
    }

    fn pending_reads(&self) -> usize {
        self.pipeline.pending_reads()
    }

    fn completed_reads(&self) -> usize {
        self.pipeline.completed_reads()
    }

    fn clear_writes(&mut self) {
        self.pipeline.clear_writes();
    }

    fn clear_reads(&mut self) {
        self.pipeline.clear_reads();
    }

    fn is_drained(&self) -> bool {
        self.pipeline.is_drained()
    }

    fn restart(&mut self) {
        self.pipeline.clear_all();
        self.in_flight = None;
        self.phase = ApbPhase::Idle;
        self.pipeline.mark_idle();
    }
}
