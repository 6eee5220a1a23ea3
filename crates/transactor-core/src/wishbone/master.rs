//! Wishbone master driver, generic over the transaction flavor.

use super::{WishbonePhase, WishboneSignals};
use crate::{
    BindError, BurstKind, BusTransactor, CycleKind, Direction, ProtocolViolation, RequestPipeline,
    RequestPort, ResetLine, SignalSet, TraceEvent, TraceSink, Transaction,
    WishboneClassicTransaction,
};

/// Drives slave devices over the Wishbone bus.
///
/// One type serves both flavors through the transaction parameter: the
/// classic flavor additionally drives its requests' cycle/burst tags onto
/// `cti`/`bte` when bound. Back-to-back requests re-assert the strobe on the
/// acknowledge edge, so a drained pipeline costs two edges per beat.
pub struct WishboneMaster<T: Transaction> {
    bus: WishboneSignals,
    reset: ResetLine,
    pipeline: RequestPipeline<T>,
    phase: WishbonePhase,
    in_flight: Option<(T, Direction)>,
    was_in_reset: bool,
    trace: Option<Box<dyn TraceSink>>,
}

impl<T: Transaction> WishboneMaster<T> {
    fn from_bus(signals: &mut SignalSet, bus: WishboneSignals, reset: ResetLine) -> Self {
        for key in [bus.addr, bus.data_i, bus.we, bus.stb, bus.sel] {
            signals.set_immediate(key, 0);
        }
        for key in [bus.cyc, bus.cti, bus.bte].into_iter().flatten() {
            signals.set_immediate(key, 0);
        }
        Self {
            bus,
            reset,
            pipeline: RequestPipeline::new(),
            phase: WishbonePhase::Idle,
            in_flight: None,
            was_in_reset: false,
            trace: None,
        }
    }

    /// Binds a classic master to the roster under `prefix` and zeroes every
    /// signal it drives.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind_classic(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
    ) -> Result<Self, BindError> {
        let bus = WishboneSignals::bind_classic(signals, prefix)?;
        Ok(Self::from_bus(signals, bus, reset))
    }

    /// Binds a standard master to the roster under `prefix` and zeroes every
    /// signal it drives.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when the required roster is
    /// incomplete.
    pub fn bind_standard(
        signals: &mut SignalSet,
        prefix: &str,
        reset: ResetLine,
    ) -> Result<Self, BindError> {
        let bus = WishboneSignals::bind_standard(signals, prefix)?;
        Ok(Self::from_bus(signals, bus, reset))
    }

    /// Installs a trace sink receiving this driver's events.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace = Some(sink);
    }

    /// Current handshake phase.
    #[must_use]
    pub const fn phase(&self) -> WishbonePhase {
        self.phase
    }

    fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_mut() {
            sink.on_event(event);
        }
    }

    fn zero_outputs(&self, signals: &mut SignalSet) {
        for key in [self.bus.addr, self.bus.data_i, self.bus.we, self.bus.stb, self.bus.sel] {
            signals.drive(key, 0);
        }
        for key in [self.bus.cyc, self.bus.cti, self.bus.bte].into_iter().flatten() {
            signals.drive(key, 0);
        }
    }

    /// Opens (or keeps open) a cycle for a freshly popped request. All byte
    /// lanes are selected; widths mask the drive down to the bus size.
    fn drive_request(&self, signals: &mut SignalSet, trans: &T, dir: Direction) {
        signals.drive(self.bus.addr, trans.address());
        signals.drive(self.bus.sel, u64::MAX);
        signals.drive(self.bus.stb, 1);
        signals.drive_optional(self.bus.cyc, 1);
        match dir {
            Direction::Write => {
                signals.drive(self.bus.we, 1);
                signals.drive(self.bus.data_i, trans.data().unwrap_or(0));
            }
            Direction::Read => {
                signals.drive(self.bus.we, 0);
                signals.drive(self.bus.data_i, 0);
            }
        }
        let (cycle, burst) = trans.cycle_tags().unwrap_or_default();
        signals.drive_optional(self.bus.cti, cycle.bits());
        signals.drive_optional(self.bus.bte, burst.bits());
    }

    fn retire(&mut self, signals: &SignalSet) {
        if let Some((mut trans, dir)) = self.in_flight.take() {
            let address = trans.address();
            let data = match dir {
                Direction::Read => {
                    let sampled = signals.value(self.bus.data_o);
                    trans.set_data(sampled);
                    self.pipeline.push_completed(trans);
                    sampled
                }
                Direction::Write => trans.data().unwrap_or(0),
            };
            self.emit(TraceEvent::TransferRetired {
                address,
                data,
                is_write: dir == Direction::Write,
            });
        }
    }
}

impl WishboneMaster<WishboneClassicTransaction> {
    /// Queues a write whose beat carries explicit cycle/burst tags.
    pub fn enqueue_write_tagged(
        &mut self,
        address: u64,
        data: u64,
        cycle: CycleKind,
        burst: BurstKind,
    ) {
        self.emit(TraceEvent::RequestQueued {
            address,
            is_write: true,
        });
        self.pipeline
            .push_write(WishboneClassicTransaction::with_tags(
                address,
                Some(data),
                cycle,
                burst,
            ));
    }

    /// Queues a read whose beat carries explicit cycle/burst tags.
    pub fn enqueue_read_tagged(&mut self, address: u64, cycle: CycleKind, burst: BurstKind) {
        self.emit(TraceEvent::RequestQueued {
            address,
            is_write: false,
        });
        self.pipeline
            .push_read_request(WishboneClassicTransaction::with_tags(
                address, None, cycle, burst,
            ));
    }
}

impl<T: Transaction> BusTransactor for WishboneMaster<T> {
    fn on_rising_edge(&mut self, signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
        if self.reset.is_asserted(signals) {
            self.zero_outputs(signals);
            self.phase = WishbonePhase::Idle;
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
            WishbonePhase::Idle => {
                if let Some((trans, dir)) = self.pipeline.next_request() {
                    self.drive_request(signals, &trans, dir);
                    self.in_flight = Some((trans, dir));
                    self.phase = WishbonePhase::Active;
                } else {
                    self.zero_outputs(signals);
                    self.pipeline.mark_idle();
                }
            }
            WishbonePhase::Active => {
                if signals.is_high(self.bus.ack) {
                    self.retire(signals);
                    if let Some((trans, dir)) = self.pipeline.next_request() {
                        self.drive_request(signals, &trans, dir);
                        self.in_flight = Some((trans, dir));
                    } else {
                        self.zero_outputs(signals);
                        self.phase = WishbonePhase::Idle;
                        self.pipeline.mark_idle();
                        self.emit(TraceEvent::IdleEntered);
                    }
                }
            }
        }
        Ok(())
    }
}

impl<T: Transaction> RequestPort for WishboneMaster<T> {
    fn enqueue_write(&mut self, address: u64, data: u64) {
        self.emit(TraceEvent::RequestQueued {
            address,
            is_write: true,
        });
        self.pipeline.push_write(T::from_request(address, Some(data)));
    }

    fn enqueue_read(&mut self, address: u64) {
        self.emit(TraceEvent::RequestQueued {
            address,
            is_write: false,
        });
        self.pipeline.push_read_request(T::from_request(address, None));
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
        self.phase = WishbonePhase::Idle;
        self.pipeline.mark_idle();
    }
}
