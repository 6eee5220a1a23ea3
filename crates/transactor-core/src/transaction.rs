//! Per-protocol transaction value types behind one sealed contract.
//!
//! Each bus flavor owns its transaction type, so a driver can only ever be
//! handed requests of its own protocol; the compiler enforces what the source
//! model checked with runtime type tests.

mod sealed {
    pub trait Sealed {}
}

/// Direction of a bus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Master drives data toward the slave.
    Write,
    /// Master samples data from the slave.
    Read,
}

/// Wishbone classic cycle-type tag driven onto the optional `cti` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum CycleKind {
    /// Single classic cycle.
    #[default]
    Classic = 0b000,
    /// Constant-address burst beat.
    ConstantAddress = 0b001,
    /// Incrementing-address burst beat.
    IncrementingAddress = 0b010,
    /// End-of-burst beat.
    EndOfBurst = 0b111,
}

impl CycleKind {
    /// Wire encoding for the `cti` signal.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self as u64
    }
}

/// Wishbone classic burst-extension tag driven onto the optional `bte` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum BurstKind {
    /// Linear burst.
    #[default]
    Linear = 0b00,
    /// 4-beat wrap burst.
    FourBeat = 0b01,
    /// 8-beat wrap burst.
    EightBeat = 0b10,
    /// 16-beat wrap burst.
    SixteenBeat = 0b11,
}

impl BurstKind {
    /// Wire encoding for the `bte` signal.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self as u64
    }
}

/// Sealed contract shared by every protocol transaction type.
///
/// A transaction pairs an address with an optional data word. Writes carry
/// their payload from construction; reads start with no data and have it
/// recorded exactly once when the handshake samples the response.
pub trait Transaction: sealed::Sealed + Clone + std::fmt::Debug {
    /// Builds a request from an address and an optional write payload.
    fn from_request(address: u64, data: Option<u64>) -> Self;

    /// Target bus address.
    fn address(&self) -> u64;

    /// Write payload, or sampled read data once recorded.
    fn data(&self) -> Option<u64>;

    /// Records sampled read data.
    fn set_data(&mut self, value: u64);

    /// Cycle/burst tags, for the burst-capable flavor only.
    fn cycle_tags(&self) -> Option<(CycleKind, BurstKind)> {
        None
    }
}

/// APB3 register-access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Apb3Transaction {
    /// Target address driven onto `paddr`.
    pub address: u64,
    /// Write payload or sampled read data.
    pub data: Option<u64>,
}

impl Apb3Transaction {
    /// Creates an APB3 request.
    #[must_use]
    pub const fn new(address: u64, data: Option<u64>) -> Self {
        Self { address, data }
    }
}

impl sealed::Sealed for Apb3Transaction {}

impl Transaction for Apb3Transaction {
    fn from_request(address: u64, data: Option<u64>) -> Self {
        Self::new(address, data)
    }

    fn address(&self) -> u64 {
        self.address
    }

    fn data(&self) -> Option<u64> {
        self.data
    }

    fn set_data(&mut self, value: u64) {
        self.data = Some(value);
    }
}

/// Wishbone standard register-access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WishboneStandardTransaction {
    /// Target address driven onto `addr`.
    pub address: u64,
    /// Write payload or sampled read data.
    pub data: Option<u64>,
}

impl WishboneStandardTransaction {
    /// Creates a Wishbone standard request.
    #[must_use]
    pub const fn new(address: u64, data: Option<u64>) -> Self {
        Self { address, data }
    }
}

impl sealed::Sealed for WishboneStandardTransaction {}

impl Transaction for WishboneStandardTransaction {
    fn from_request(address: u64, data: Option<u64>) -> Self {
        Self::new(address, data)
    }

    fn address(&self) -> u64 {
        self.address
    }

    fn data(&self) -> Option<u64> {
        self.data
    }

    fn set_data(&mut self, value: u64) {
        self.data = Some(value);
    }
}

/// Wishbone classic register-access request with cycle/burst tags.
///
/// The tags travel with the request and are driven onto `cti`/`bte` when
/// those signals are bound; burst address sequencing itself is not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WishboneClassicTransaction {
    /// Target address driven onto `addr`.
    pub address: u64,
    /// Write payload or sampled read data.
    pub data: Option<u64>,
    /// Cycle-type tag for the `cti` signal.
    pub cycle: CycleKind,
    /// Burst-extension tag for the `bte` signal.
    pub burst: BurstKind,
}

impl WishboneClassicTransaction {
    /// Creates a classic request with default (single classic cycle) tags.
    #[must_use]
    pub const fn new(address: u64, data: Option<u64>) -> Self {
        Self {
            address,
            data,
            cycle: CycleKind::Classic,
            burst: BurstKind::Linear,
        }
    }

    /// Creates a classic request carrying explicit cycle/burst tags.
    #[must_use]
    pub const fn with_tags(
        address: u64,
        data: Option<u64>,
        cycle: CycleKind,
        burst: BurstKind,
    ) -> Self {
        Self {
            address,
            data,
            cycle,
            burst,
        }
    }
}

impl sealed::Sealed for WishboneClassicTransaction {}

impl Transaction for WishboneClassicTransaction {
    fn from_request(address: u64, data: Option<u64>) -> Self {
        Self::new(address, data)
    }

    fn address(&self) -> u64 {
        self.address
    }

    fn data(&self) -> Option<u64> {
        self.data
    }

    fn set_data(&mut self, value: u64) {
        self.data = Some(value);
    }

    fn cycle_tags(&self) -> Option<(CycleKind, BurstKind)> {
        Some((self.cycle, self.burst))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Apb3Transaction, BurstKind, CycleKind, Transaction, WishboneClassicTransaction,
        WishboneStandardTransaction,
    };

    #[test]
    fn read_request_starts_without_data_and_records_the_sample() {
        let mut trans = Apb3Transaction::from_request(0x40, None);
        assert_eq!(trans.data(), None);

        trans.set_data(0xDEAD_BEEF);
        assert_eq!(trans.data(), Some(0xDEAD_BEEF));
        assert_eq!(trans.address(), 0x40);
    }

    #[test]
    fn only_the_classic_flavor_carries_cycle_tags() {
        let apb = Apb3Transaction::from_request(0, None);
        let standard = WishboneStandardTransaction::from_request(0, None);
        let classic = WishboneClassicTransaction::from_request(0, None);

        assert_eq!(apb.cycle_tags(), None);
        assert_eq!(standard.cycle_tags(), None);
        assert_eq!(
            classic.cycle_tags(),
            Some((CycleKind::Classic, BurstKind::Linear))
        );
    }

    #[test]
    fn classic_tags_encode_their_wire_values() {
        let trans = WishboneClassicTransaction::with_tags(
            0x10,
            Some(1),
            CycleKind::IncrementingAddress,
            BurstKind::EightBeat,
        );
        let (cycle, burst) = trans.cycle_tags().expect("classic flavor has tags");
        assert_eq!(cycle.bits(), 0b010);
        assert_eq!(burst.bits(), 0b10);
        assert_eq!(CycleKind::EndOfBurst.bits(), 0b111);
        assert_eq!(BurstKind::SixteenBeat.bits(), 0b11);
    }
}
