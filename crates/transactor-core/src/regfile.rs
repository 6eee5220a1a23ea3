//! Addressable word store backing echo-slave responses.

use crate::RegisterFileError;

/// Default register file size in words.
pub const DEFAULT_REGISTER_WORDS: usize = 256;

/// Zero-initialized bounded word store.
///
/// Mutated only by the owning slave on a sampled write handshake; external
/// parties get read-only inspection access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    words: Vec<u64>,
}

impl RegisterFile {
    /// Creates a register file of `words` zeroed entries.
    #[must_use]
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0; words],
        }
    }

    /// Number of addressable words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` when the register file has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns `true` when `address` names a word inside the file.
    #[must_use]
    pub fn contains(&self, address: u64) -> bool {
        usize::try_from(address).is_ok_and(|index| index < self.words.len())
    }

    /// Reads the word at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterFileError::AddressOutOfRange`] when `address` is
    /// outside the configured bound.
    pub fn read(&self, address: u64) -> Result<u64, RegisterFileError> {
        self.index(address).map(|index| self.words[index])
    }

    /// Writes the word at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterFileError::AddressOutOfRange`] when `address` is
    /// outside the configured bound.
    pub fn write(&mut self, address: u64, value: u64) -> Result<(), RegisterFileError> {
        let index = self.index(address)?;
        self.words[index] = value;
        Ok(())
    }

    fn index(&self, address: u64) -> Result<usize, RegisterFileError> {
        usize::try_from(address)
            .ok()
            .filter(|index| *index < self.words.len())
            .ok_or(RegisterFileError::AddressOutOfRange {
                address,
                words: self.words.len(),
            })
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTER_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterFile, DEFAULT_REGISTER_WORDS};
    use crate::RegisterFileError;

    #[test]
    fn default_size_matches_the_contract() {
        let regs = RegisterFile::default();
        assert_eq!(regs.len(), DEFAULT_REGISTER_WORDS);
        assert_eq!(regs.read(0), Ok(0));
        assert_eq!(regs.read(255), Ok(0));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut regs = RegisterFile::new(4);
        regs.write(2, 0xCAFE).expect("in range");
        assert_eq!(regs.read(2), Ok(0xCAFE));
        assert_eq!(regs.read(3), Ok(0));
    }

    #[test]
    fn out_of_range_addresses_are_rejected_on_both_paths() {
        let mut regs = RegisterFile::new(4);
        let expected = RegisterFileError::AddressOutOfRange {
            address: 4,
            words: 4,
        };
        assert_eq!(regs.read(4), Err(expected));
        assert_eq!(regs.write(4, 1), Err(expected));
        assert!(!regs.contains(4));
        assert!(regs.contains(3));
        assert!(!regs.contains(u64::MAX));
    }
}
