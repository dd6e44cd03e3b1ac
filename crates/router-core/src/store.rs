//! Backing-store contract for the two downstream targets.

use std::collections::BTreeMap;

use crate::route::ADDRESS_MASK;
use crate::Target;

/// Byte-addressable storage behind the two downstream targets.
///
/// Addresses passed in are always within the 24-bit address space.
pub trait TargetStore {
    /// Reads one byte from `target`.
    fn get(&self, target: Target, address: u32) -> u8;

    /// Writes one byte to `target`.
    fn set(&mut self, target: Target, address: u32, value: u8);
}

/// Value of a never-written byte.
///
/// Main returns the low address byte; Secondary returns its complement.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn default_fill(target: Target, address: u32) -> u8 {
    let low = (address & 0xFF) as u8;
    match target {
        Target::Main => low,
        Target::Secondary => !low,
    }
}

/// Sparse flat store: only written bytes are kept, the rest read as
/// [`default_fill`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatStore {
    written: [BTreeMap<u32, u8>; 2],
}

impl FlatStore {
    /// Creates a store with no bytes written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct bytes written to `target`.
    #[must_use]
    pub fn written_len(&self, target: Target) -> usize {
        self.written[target.index()].len()
    }

    /// Returns `true` when nothing has been written to either target.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.written.iter().all(BTreeMap::is_empty)
    }

    /// Written bytes of `target` in ascending address order.
    pub fn written(&self, target: Target) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.written[target.index()]
            .iter()
            .map(|(address, value)| (*address, *value))
    }

    /// Reads `len` consecutive bytes starting at `address`, wrapping at the
    /// top of the address space.
    #[must_use]
    pub fn read_block(&self, target: Target, address: u32, len: usize) -> Vec<u8> {
        let mut cursor = address & ADDRESS_MASK;
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(self.get(target, cursor));
            cursor = cursor.wrapping_add(1) & ADDRESS_MASK;
        }
        bytes
    }
}

impl TargetStore for FlatStore {
    fn get(&self, target: Target, address: u32) -> u8 {
        let address = address & ADDRESS_MASK;
        self.written[target.index()]
            .get(&address)
            .copied()
            .unwrap_or_else(|| default_fill(target, address))
    }

    fn set(&mut self, target: Target, address: u32, value: u8) {
        self.written[target.index()].insert(address & ADDRESS_MASK, value);
    }
}
