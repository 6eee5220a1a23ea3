//! Named bit-vector signal set with per-edge two-phase commit.
//!
//! Every transactor wired to the same bus evaluates one rising edge against
//! the *sampled* values, while its own drives land in a shadow slot. The
//! shadow is committed once per edge, after every transactor has stepped, so
//! evaluation order within an edge cannot change what anyone observes.

use std::collections::HashMap;

use crate::BindError;

/// Opaque handle to one declared signal inside a [`SignalSet`].
///
/// Keys are only minted by [`SignalSet::add`] and are valid for the set that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalKey(usize);

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    mask: u64,
    sampled: u64,
    driven: u64,
}

/// The externally-owned collection of bus signals shared by all transactors.
#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    index: HashMap<String, SignalKey>,
    slots: Vec<Slot>,
}

const fn width_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1_u64 << width) - 1
    }
}

impl SignalSet {
    /// Creates an empty signal set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a signal with the given bit width, initialized to zero.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::DuplicateSignal`] when `name` is already declared.
    pub fn add(&mut self, name: &str, width: u32) -> Result<SignalKey, BindError> {
        if self.index.contains_key(name) {
            return Err(BindError::DuplicateSignal(name.to_owned()));
        }
        let key = SignalKey(self.slots.len());
        self.slots.push(Slot {
            name: name.to_owned(),
            mask: width_mask(width),
            sampled: 0,
            driven: 0,
        });
        self.index.insert(name.to_owned(), key);
        Ok(key)
    }

    /// Looks up a declared signal by name.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<SignalKey> {
        self.index.get(name).copied()
    }

    /// Looks up a signal that a roster requires.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::MissingSignal`] when `name` is not declared.
    pub fn require(&self, name: &str) -> Result<SignalKey, BindError> {
        self.key(name)
            .ok_or_else(|| BindError::MissingSignal(name.to_owned()))
    }

    /// Number of declared signals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no signals are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Declared name of a signal.
    ///
    /// # Panics
    ///
    /// Panics when `key` was minted by a different signal set.
    #[must_use]
    pub fn name(&self, key: SignalKey) -> &str {
        &self.slots[key.0].name
    }

    /// Sampled (pre-edge) value of a signal.
    ///
    /// # Panics
    ///
    /// Panics when `key` was minted by a different signal set.
    #[must_use]
    pub fn value(&self, key: SignalKey) -> u64 {
        self.slots[key.0].sampled
    }

    /// Returns `true` when the sampled value is non-zero.
    #[must_use]
    pub fn is_high(&self, key: SignalKey) -> bool {
        self.value(key) != 0
    }

    /// Drives a value, masked to the declared width, visible after the next
    /// [`commit_edge`](Self::commit_edge).
    ///
    /// # Panics
    ///
    /// Panics when `key` was minted by a different signal set.
    pub fn drive(&mut self, key: SignalKey, value: u64) {
        let slot = &mut self.slots[key.0];
        slot.driven = value & slot.mask;
    }

    /// Drives a value and makes it observable immediately, bypassing the
    /// edge commit. Used for construction-time defaults and reset lines.
    ///
    /// # Panics
    ///
    /// Panics when `key` was minted by a different signal set.
    pub fn set_immediate(&mut self, key: SignalKey, value: u64) {
        let slot = &mut self.slots[key.0];
        slot.driven = value & slot.mask;
        slot.sampled = slot.driven;
    }

    /// Commits all pending drives, making them the sampled values for the
    /// next rising edge.
    pub fn commit_edge(&mut self) {
        for slot in &mut self.slots {
            slot.sampled = slot.driven;
        }
    }

    /// Reads an optional signal, treating an absent handle as constant zero.
    #[must_use]
    pub fn read_or_zero(&self, key: Option<SignalKey>) -> u64 {
        key.map_or(0, |key| self.value(key))
    }

    /// Drives an optional signal; absent handles swallow the drive.
    pub fn drive_optional(&mut self, key: Option<SignalKey>, value: u64) {
        if let Some(key) = key {
            self.drive(key, value);
        }
    }
}

/// Polarity of a bound reset signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetSense {
    /// Reset is asserted while the signal reads non-zero (`rst`).
    ActiveHigh,
    /// Reset is asserted while the signal reads zero (`rstn`).
    ActiveLow,
}

/// Reset indicator bound to one signal in a set.
#[derive(Debug, Clone, Copy)]
pub struct ResetLine {
    key: SignalKey,
    sense: ResetSense,
}

impl ResetLine {
    /// Binds a reset line to a declared signal with the given polarity.
    #[must_use]
    pub const fn new(key: SignalKey, sense: ResetSense) -> Self {
        Self { key, sense }
    }

    /// Returns `true` when the sampled reset value means "in reset".
    #[must_use]
    pub fn is_asserted(&self, signals: &SignalSet) -> bool {
        match self.sense {
            ResetSense::ActiveHigh => signals.is_high(self.key),
            ResetSense::ActiveLow => !signals.is_high(self.key),
        }
    }

    /// Drives the reset signal to its asserted level, effective immediately.
    pub fn assert(&self, signals: &mut SignalSet) {
        let level = match self.sense {
            ResetSense::ActiveHigh => 1,
            ResetSense::ActiveLow => 0,
        };
        signals.set_immediate(self.key, level);
    }

    /// Drives the reset signal to its deasserted level, effective immediately.
    pub fn deassert(&self, signals: &mut SignalSet) {
        let level = match self.sense {
            ResetSense::ActiveHigh => 0,
            ResetSense::ActiveLow => 1,
        };
        signals.set_immediate(self.key, level);
    }
}

#[cfg(test)]
mod tests {
    use super::{ResetLine, ResetSense, SignalSet};
    use crate::BindError;

    #[test]
    fn drives_are_invisible_until_the_edge_commit() {
        let mut signals = SignalSet::new();
        let addr = signals.add("addr", 32).expect("fresh name");

        signals.drive(addr, 0x1234);
        assert_eq!(signals.value(addr), 0);

        signals.commit_edge();
        assert_eq!(signals.value(addr), 0x1234);
    }

    #[test]
    fn drives_are_masked_to_the_declared_width() {
        let mut signals = SignalSet::new();
        let narrow = signals.add("narrow", 4).expect("fresh name");
        let full = signals.add("full", 64).expect("fresh name");

        signals.set_immediate(narrow, 0xFF);
        signals.set_immediate(full, u64::MAX);

        assert_eq!(signals.value(narrow), 0xF);
        assert_eq!(signals.value(full), u64::MAX);
    }

    #[test]
    fn undriven_signals_hold_their_last_committed_value() {
        let mut signals = SignalSet::new();
        let stb = signals.add("stb", 1).expect("fresh name");

        signals.drive(stb, 1);
        signals.commit_edge();
        signals.commit_edge();

        assert_eq!(signals.value(stb), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut signals = SignalSet::new();
        signals.add("ack", 1).expect("fresh name");
        assert_eq!(
            signals.add("ack", 1),
            Err(BindError::DuplicateSignal("ack".to_owned()))
        );
    }

    #[test]
    fn require_reports_the_missing_name() {
        let signals = SignalSet::new();
        assert_eq!(
            signals.require("pready"),
            Err(BindError::MissingSignal("pready".to_owned()))
        );
    }

    #[test]
    fn absent_optional_signals_read_as_constant_zero() {
        let mut signals = SignalSet::new();
        let err = signals.add("err", 1).expect("fresh name");
        signals.set_immediate(err, 1);

        assert_eq!(signals.read_or_zero(Some(err)), 1);
        assert_eq!(signals.read_or_zero(None), 0);

        // Absent handles swallow drives without declaring anything.
        signals.drive_optional(None, 1);
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn reset_line_polarity_is_respected() {
        let mut signals = SignalSet::new();
        let rstn = signals.add("rstn", 1).expect("fresh name");
        let line = ResetLine::new(rstn, ResetSense::ActiveLow);

        assert!(line.is_asserted(&signals));
        line.deassert(&mut signals);
        assert!(!line.is_asserted(&signals));
        line.assert(&mut signals);
        assert!(line.is_asserted(&signals));

        let rst = signals.add("rst", 1).expect("fresh name");
        let line = ResetLine::new(rst, ResetSense::ActiveHigh);
        assert!(!line.is_asserted(&signals));
        line.assert(&mut signals);
        assert!(line.is_asserted(&signals));
    }
}
