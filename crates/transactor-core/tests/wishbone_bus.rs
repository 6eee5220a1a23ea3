//! End-to-end Wishbone coverage for both flavors on one bench.

use proptest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::cell::RefCell;
use std::rc::Rc;

use rstest::rstest;
use transactor_core::{
    wishbone::{install_classic_signals, install_standard_signals},
    Bench, BurstKind, BusTransactor, CycleKind, ProtocolViolation, RequestPort, ResetLine,
    ResetSense, SignalKey, SignalSet, TransactorError, WishboneClassicMaster, WishboneEchoSlave,
    WishboneStandardMaster, WishboneStandardMonitor,
};

struct StandardTb {
    bench: Bench,
    master: WishboneStandardMaster,
}

/// Standard-flavor bench: master plus echo slave plus compliance monitor.
fn standard_tb(words: usize) -> StandardTb {
    let mut signals = SignalSet::new();
    let rstn = signals.add("rstn", 1).expect("fresh name");
    let reset = ResetLine::new(rstn, ResetSense::ActiveLow);
    reset.deassert(&mut signals);
    install_standard_signals(&mut signals, "wb", 32, 32).expect("empty set");

    let master =
        WishboneStandardMaster::bind_standard(&mut signals, "wb", reset).expect("roster installed");
    let slave =
        WishboneEchoSlave::bind_standard(&mut signals, "wb", reset, words).expect("roster installed");
    let monitor = WishboneStandardMonitor::bind(&signals, "wb", reset).expect("roster installed");

    let mut bench = Bench::new(signals, reset);
    bench.attach(Box::new(slave));
    bench.attach(Box::new(monitor));
    StandardTb { bench, master }
}

struct ClassicTb {
    bench: Bench,
    master: WishboneClassicMaster,
}

/// Classic-flavor bench with the full optional roster and no monitor.
fn classic_tb(words: usize) -> ClassicTb {
    let mut signals = SignalSet::new();
    let rstn = signals.add("rstn", 1).expect("fresh name");
    let reset = ResetLine::new(rstn, ResetSense::ActiveLow);
    reset.deassert(&mut signals);
    install_classic_signals(&mut signals, "wb", 32, 32).expect("empty set");

    let master =
        WishboneClassicMaster::bind_classic(&mut signals, "wb", reset).expect("roster installed");
    let slave =
        WishboneEchoSlave::bind_classic(&mut signals, "wb", reset, words).expect("roster installed");

    let mut bench = Bench::new(signals, reset);
    bench.attach(Box::new(slave));
    ClassicTb { bench, master }
}

#[rstest]
#[case(0, 0)]
#[case(11, 0xCAFE)]
#[case(255, u64::from(u32::MAX))]
fn standard_single_write_reads_back(#[case] address: u64, #[case] data: u64) {
    let StandardTb { mut bench, mut master } = standard_tb(256);

    bench
        .write_one(&mut master, address, data)
        .expect("write completes");
    let read = bench.read_one(&mut master, address).expect("read completes");

    assert_eq!(read, data);
    assert!(master.is_idle());
}

#[rstest]
#[case(3, 0x33)]
#[case(7, 0x7777_7777)]
fn classic_single_write_reads_back(#[case] address: u64, #[case] data: u64) {
    let ClassicTb { mut bench, mut master } = classic_tb(8);

    bench
        .write_one(&mut master, address, data)
        .expect("write completes");
    let read = bench.read_one(&mut master, address).expect("read completes");

    assert_eq!(read, data);
}

#[test]
fn standard_batched_reads_return_in_submission_order() {
    let StandardTb { mut bench, mut master } = standard_tb(4);

    bench
        .write(&mut master, &[0, 1, 2, 3], &[10, 20, 30, 40])
        .expect("batch write completes");
    let data = bench
        .read(&mut master, &[3, 1, 0, 2])
        .expect("batch read completes");

    assert_eq!(data, vec![40, 20, 10, 30]);
}

#[test]
fn standard_writes_drain_before_reads() {
    let StandardTb { mut bench, mut master } = standard_tb(4);

    master.enqueue_read(1);
    master.enqueue_write(1, 0x99);
    while !master.is_idle() {
        bench
            .rising_edge_with(&mut master)
            .expect("compliant traffic");
    }

    assert_eq!(master.take_completed(), Some(0x99));
}

#[test]
fn classic_tags_are_observable_while_the_beat_is_live() {
    let ClassicTb { mut bench, mut master } = classic_tb(8);

    master.enqueue_write_tagged(4, 0xAB, CycleKind::EndOfBurst, BurstKind::SixteenBeat);
    bench
        .rising_edge_with(&mut master)
        .expect("compliant traffic");

    let cti = bench.signals().key("wb_cti").expect("installed");
    let bte = bench.signals().key("wb_bte").expect("installed");
    assert_eq!(bench.signals().value(cti), 0b111);
    assert_eq!(bench.signals().value(bte), 0b11);

    while !master.is_idle() {
        bench
            .rising_edge_with(&mut master)
            .expect("compliant traffic");
    }
    assert_eq!(bench.signals().value(cti), 0);
}

#[test]
fn monitor_rejects_a_strobe_outside_a_cycle() {
    let StandardTb { mut bench, mut master } = standard_tb(4);

    let stb = bench.signals().key("wb_stb").expect("installed");
    bench.signals_mut().set_immediate(stb, 1);

    let result = bench.write_one(&mut master, 0, 1);
    assert_eq!(
        result,
        Err(TransactorError::Protocol(
            ProtocolViolation::StrobeWithoutCycle
        ))
    );
}

#[test]
fn reset_pulse_discards_queued_work_and_keeps_registers() {
    let StandardTb { mut bench, mut master } = standard_tb(8);

    bench.write_one(&mut master, 2, 0x42).expect("write completes");

    master.enqueue_write(3, 0xFF);
    master.enqueue_read(2);
    bench
        .reset_pulse(4, &mut master)
        .expect("monitor stays quiet through reset");

    assert!(master.is_idle());
    assert_eq!(master.pending_writes(), 0);
    assert_eq!(master.pending_reads(), 0);

    // The discarded write never reached the slave.
    let data = bench
        .read(&mut master, &[2, 3])
        .expect("batch read completes");
    assert_eq!(data, vec![0x42, 0]);
}

#[test]
fn restart_rearms_the_driver_for_fresh_traffic() {
    // No monitor here: the slave's ack pulse for the abandoned beat
    // overhangs the closed cycle by one edge.
    let mut signals = SignalSet::new();
    let rstn = signals.add("rstn", 1).expect("fresh name");
    let reset = ResetLine::new(rstn, ResetSense::ActiveLow);
    reset.deassert(&mut signals);
    install_standard_signals(&mut signals, "wb", 32, 32).expect("empty set");
    let mut master =
        WishboneStandardMaster::bind_standard(&mut signals, "wb", reset).expect("roster installed");
    let slave =
        WishboneEchoSlave::bind_standard(&mut signals, "wb", reset, 8).expect("roster installed");
    let mut bench = Bench::new(signals, reset);
    bench.attach(Box::new(slave));

    master.enqueue_write(1, 0x11);
    bench
        .rising_edge_with(&mut master)
        .expect("compliant traffic");
    master.restart();
    assert!(master.is_idle());
    assert_eq!(master.pending_writes(), 0);

    // Two idle edges let the abandoned beat drain off the bus.
    for _ in 0..2 {
        bench
            .rising_edge_with(&mut master)
            .expect("compliant traffic");
    }

    bench.write_one(&mut master, 5, 0x55).expect("write completes");
    let read = bench.read_one(&mut master, 5).expect("read completes");
    assert_eq!(read, 0x55);
}

/// Acknowledges beats only while its shared budget lasts, answering each
/// read with `address + 0x100`.
struct BudgetedSlave {
    stb: SignalKey,
    cyc: SignalKey,
    addr: SignalKey,
    ack: SignalKey,
    data_o: SignalKey,
    acks_left: Rc<RefCell<u32>>,
}

impl BusTransactor for BudgetedSlave {
    fn on_rising_edge(&mut self, signals: &mut SignalSet) -> Result<(), ProtocolViolation> {
        let selected = signals.is_high(self.stb) && signals.is_high(self.cyc);
        let mut acks = self.acks_left.borrow_mut();
        if selected && *acks > 0 {
            *acks -= 1;
            signals.drive(self.ack, 1);
            signals.drive(self.data_o, signals.value(self.addr) + 0x100);
        } else {
            signals.drive(self.ack, 0);
            signals.drive(self.data_o, 0);
        }
        Ok(())
    }
}

#[test]
fn failed_read_leaves_no_stale_work_behind() {
    let mut signals = SignalSet::new();
    let rstn = signals.add("rstn", 1).expect("fresh name");
    let reset = ResetLine::new(rstn, ResetSense::ActiveLow);
    reset.deassert(&mut signals);
    install_standard_signals(&mut signals, "wb", 32, 32).expect("empty set");
    let mut master =
        WishboneStandardMaster::bind_standard(&mut signals, "wb", reset).expect("roster installed");

    let key = |name: &str| signals.key(name).expect("installed");
    let acks_left = Rc::new(RefCell::new(1));
    let slave = BudgetedSlave {
        stb: key("wb_stb"),
        cyc: key("wb_cyc"),
        addr: key("wb_addr"),
        ack: key("wb_ack"),
        data_o: key("wb_data_o"),
        acks_left: Rc::clone(&acks_left),
    };
    let mut bench = Bench::new(signals, reset).with_watchdog(32);
    bench.attach(Box::new(slave));

    // The slave acks the first beat and then wedges; the batch stalls.
    let result = bench.read(&mut master, &[0, 1]);
    assert_eq!(result, Err(TransactorError::HandshakeStalled { edges: 32 }));

    // Nothing from the failed batch survives, not even the completion the
    // first beat parked before the stall.
    assert!(master.is_idle());
    assert!(master.is_drained());
    assert_eq!(master.completed_reads(), 0);

    // Drain the abandoned beat off the bus, then heal the responder; a
    // fresh read must see the fresh address, not leftover data.
    for _ in 0..2 {
        bench
            .rising_edge_with(&mut master)
            .expect("compliant traffic");
    }
    *acks_left.borrow_mut() = 4;
    let data = bench.read_one(&mut master, 5).expect("read completes");
    assert_eq!(data, 0x105);
}

#[test]
fn missing_responder_trips_the_watchdog() {
    let mut signals = SignalSet::new();
    let rstn = signals.add("rstn", 1).expect("fresh name");
    let reset = ResetLine::new(rstn, ResetSense::ActiveLow);
    reset.deassert(&mut signals);
    install_standard_signals(&mut signals, "wb", 32, 32).expect("empty set");
    let mut master =
        WishboneStandardMaster::bind_standard(&mut signals, "wb", reset).expect("roster installed");
    let mut bench = Bench::new(signals, reset).with_watchdog(32);

    let result = bench.read_one(&mut master, 0);
    assert_eq!(result, Err(TransactorError::HandshakeStalled { edges: 32 }));
}
