//! Cooperative edge scheduler and the blocking-style request API.
//!
//! One [`Bench`] owns the shared signal set and the reset line. Each rising
//! edge steps the caller's master, then every attached peer (slaves,
//! monitors), then commits the signal set so all parties observed the same
//! pre-edge values. The request calls loop over edges until the master's
//! idle flag is set, which stands in for the source model's suspension on an
//! idle event.

use crate::{ProtocolViolation, ResetLine, SignalSet, TransactorError};

/// Default number of rising edges one blocking request may consume before it
/// is reported as stalled.
pub const DEFAULT_WATCHDOG_EDGES: u64 = 65_536;

/// A clocked bus component evaluated once per rising edge.
pub trait BusTransactor {
    /// Evaluates one rising clock edge against the sampled signal values.
    ///
    /// Drives issued here become observable only after the edge commit.
    ///
    /// # Errors
    ///
    /// Monitors return their fatal [`ProtocolViolation`] findings here;
    /// drivers and responders never fail.
    fn on_rising_edge(&mut self, signals: &mut SignalSet) -> Result<(), ProtocolViolation>;
}

/// Queue surface shared by every master driver.
pub trait RequestPort: BusTransactor {
    /// Queues a single write request and marks the driver busy.
    fn enqueue_write(&mut self, address: u64, data: u64);

    /// Queues a single read request and marks the driver busy.
    fn enqueue_read(&mut self, address: u64);

    /// Collects the oldest completed read's data, if one is parked.
    fn take_completed(&mut self) -> Option<u64>;

    /// Returns `true` while the driver has no pending work and no handshake
    /// mid-flight. Idempotent: checking twice in a row has no side effects.
    fn is_idle(&self) -> bool;

    /// Number of queued write requests.
    fn pending_writes(&self) -> usize;

    /// Number of queued read requests.
    fn pending_reads(&self) -> usize;

    /// Number of completed reads awaiting collection.
    fn completed_reads(&self) -> usize;

    /// Discards queued writes without processing them.
    fn clear_writes(&mut self);

    /// Discards queued read requests and uncollected completed reads.
    fn clear_reads(&mut self);

    /// Returns `true` when both request queues are empty.
    fn is_drained(&self) -> bool;

    /// Cancels the in-flight handshake, discards all queued work, and
    /// returns the state machine to its initial state. Outputs driven for
    /// the abandoned handshake hold their committed values until the next
    /// edge steps the driver back to rest.
    fn restart(&mut self);
}

/// Cooperative scheduler owning the signal set, reset line, and peers.
pub struct Bench {
    signals: SignalSet,
    reset: ResetLine,
    peers: Vec<Box<dyn BusTransactor>>,
    watchdog_edges: u64,
    edges_driven: u64,
}

impl Bench {
    /// Creates a bench over a fully declared signal set.
    #[must_use]
    pub fn new(signals: SignalSet, reset: ResetLine) -> Self {
        Self {
            signals,
            reset,
            peers: Vec::new(),
            watchdog_edges: DEFAULT_WATCHDOG_EDGES,
            edges_driven: 0,
        }
    }

    /// Overrides the per-request edge watchdog budget.
    #[must_use]
    pub const fn with_watchdog(mut self, edges: u64) -> Self {
        self.watchdog_edges = edges;
        self
    }

    /// Attaches a peer transactor (slave, monitor) stepped on every edge.
    pub fn attach(&mut self, peer: Box<dyn BusTransactor>) {
        self.peers.push(peer);
    }

    /// Shared signal set.
    #[must_use]
    pub const fn signals(&self) -> &SignalSet {
        &self.signals
    }

    /// Mutable access to the shared signal set.
    pub fn signals_mut(&mut self) -> &mut SignalSet {
        &mut self.signals
    }

    /// Total rising edges driven since construction.
    #[must_use]
    pub const fn edges_driven(&self) -> u64 {
        self.edges_driven
    }

    /// Drives one rising edge through the attached peers only.
    ///
    /// # Errors
    ///
    /// Propagates the first monitor finding.
    pub fn rising_edge(&mut self) -> Result<(), ProtocolViolation> {
        self.edges_driven += 1;
        for peer in &mut self.peers {
            peer.on_rising_edge(&mut self.signals)?;
        }
        self.signals.commit_edge();
        Ok(())
    }

    /// Drives one rising edge through `master` and then the attached peers.
    ///
    /// # Errors
    ///
    /// Propagates the first monitor finding.
    pub fn rising_edge_with<M>(&mut self, master: &mut M) -> Result<(), ProtocolViolation>
    where
        M: BusTransactor + ?Sized,
    {
        self.edges_driven += 1;
        master.on_rising_edge(&mut self.signals)?;
        for peer in &mut self.peers {
            peer.on_rising_edge(&mut self.signals)?;
        }
        self.signals.commit_edge();
        Ok(())
    }

    /// Holds reset asserted for `edges` rising edges, then releases it.
    ///
    /// # Errors
    ///
    /// Propagates the first monitor finding observed while in reset.
    pub fn reset_pulse<M>(&mut self, edges: u64, master: &mut M) -> Result<(), ProtocolViolation>
    where
        M: BusTransactor + ?Sized,
    {
        self.reset.assert(&mut self.signals);
        for _ in 0..edges {
            self.rising_edge_with(master)?;
        }
        self.reset.deassert(&mut self.signals);
        Ok(())
    }

    /// Writes one data word to one address, returning once the driver has
    /// drained its queues.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`write`](Self::write).
    pub fn write_one<M>(
        &mut self,
        master: &mut M,
        address: u64,
        data: u64,
    ) -> Result<(), TransactorError>
    where
        M: RequestPort + ?Sized,
    {
        self.write(master, &[address], &[data])
    }

    /// Reads one data word from one address.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`read`](Self::read).
    pub fn read_one<M>(&mut self, master: &mut M, address: u64) -> Result<u64, TransactorError>
    where
        M: RequestPort + ?Sized,
    {
        self.read(master, &[address])
            .map(|data| data[0])
    }

    /// Queues a batch of writes in order and steps edges until the driver's
    /// idle flag is set.
    ///
    /// # Errors
    ///
    /// [`TransactorError::BatchLengthMismatch`] when the slices differ in
    /// length, [`TransactorError::HandshakeStalled`] when the watchdog budget
    /// is exhausted, or a wrapped monitor finding. On failure the driver is
    /// restarted: the in-flight handshake is cancelled and all queued work
    /// is discarded, so a later request cannot observe stale transactions.
    pub fn write<M>(
        &mut self,
        master: &mut M,
        addresses: &[u64],
        data: &[u64],
    ) -> Result<(), TransactorError>
    where
        M: RequestPort + ?Sized,
    {
        if addresses.len() != data.len() {
            return Err(TransactorError::BatchLengthMismatch {
                addresses: addresses.len(),
                data: data.len(),
            });
        }
        for (address, word) in addresses.iter().zip(data) {
            master.enqueue_write(*address, *word);
        }
        if let Err(err) = self.run_until_idle(master) {
            master.restart();
            return Err(err);
        }
        Ok(())
    }

    /// Queues a batch of reads in order, steps edges until the driver's idle
    /// flag is set, and returns the sampled data in submission order.
    ///
    /// # Errors
    ///
    /// [`TransactorError::Aborted`] when a reset or restart discarded the
    /// batch mid-flight, [`TransactorError::HandshakeStalled`] when the
    /// watchdog budget is exhausted, or a wrapped monitor finding. On
    /// failure the driver is restarted: the in-flight handshake is cancelled
    /// and all queued work is discarded, so a later read cannot collect a
    /// completion parked by the failed batch.
    pub fn read<M>(
        &mut self,
        master: &mut M,
        addresses: &[u64],
    ) -> Result<Vec<u64>, TransactorError>
    where
        M: RequestPort + ?Sized,
    {
        for address in addresses {
            master.enqueue_read(*address);
        }
        if let Err(err) = self.run_until_idle(master) {
            master.restart();
            return Err(err);
        }
        let mut data = Vec::with_capacity(addresses.len());
        for _ in addresses {
            data.push(master.take_completed().ok_or(TransactorError::Aborted)?);
        }
        Ok(data)
    }

    fn run_until_idle<M>(&mut self, master: &mut M) -> Result<(), TransactorError>
    where
        M: RequestPort + ?Sized,
    {
        let mut budget = self.watchdog_edges;
        while !master.is_idle() {
            if budget == 0 {
                return Err(TransactorError::HandshakeStalled {
                    edges: self.watchdog_edges,
                });
            }
            budget -= 1;
            self.rising_edge_with(master)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Bench, BusTransactor, DEFAULT_WATCHDOG_EDGES};
    use crate::{ProtocolViolation, ResetLine, ResetSense, SignalSet};

    struct CountingPeer {
        edges: u64,
    }

    impl BusTransactor for CountingPeer {
        fn on_rising_edge(&mut self, _signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
            self.edges += 1;
            Ok(())
        }
    }

    struct TrippingPeer;

    impl BusTransactor for TrippingPeer {
        fn on_rising_edge(&mut self, _signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
            Err(ProtocolViolation::ReadyWithoutSelect)
        }
    }

    fn bench() -> Bench {
        let mut signals = SignalSet::new();
        let rstn = signals.add("rstn", 1).expect("fresh name");
        let reset = ResetLine::new(rstn, ResetSense::ActiveLow);
        reset.deassert(&mut signals);
        Bench::new(signals, reset)
    }

    #[test]
    fn every_attached_peer_is_stepped_per_edge() {
        let mut bench = bench();
        bench.attach(Box::new(CountingPeer { edges: 0 }));
        for _ in 0..3 {
            bench.rising_edge().expect("no monitors attached");
        }
        assert_eq!(bench.edges_driven(), 3);
    }

    #[test]
    fn monitor_findings_stop_the_edge_immediately() {
        let mut bench = bench();
        bench.attach(Box::new(TrippingPeer));
        assert_eq!(
            bench.rising_edge(),
            Err(ProtocolViolation::ReadyWithoutSelect)
        );
    }

    #[test]
    fn default_watchdog_budget_matches_the_contract() {
        let bench = bench();
        assert_eq!(bench.watchdog_edges, DEFAULT_WATCHDOG_EDGES);
        let bench = bench.with_watchdog(16);
        assert_eq!(bench.watchdog_edges, 16);
    }
}
