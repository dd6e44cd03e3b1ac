//! MSB-first serial shift registers shared by the host and management ports.

use crate::timing::BITS_PER_BYTE;

/// Inbound shift register sampling one bit per clock rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftIn {
    value: u8,
    bits: u8,
}

impl ShiftIn {
    /// Creates an empty shift register.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: 0, bits: 0 }
    }

    /// Shifts in one bit; returns the byte when it completes.
    pub const fn push(&mut self, bit: bool) -> Option<u8> {
        self.value = (self.value << 1) | bit as u8;
        self.bits += 1;
        if self.bits == BITS_PER_BYTE {
            let byte = self.value;
            *self = Self::new();
            Some(byte)
        } else {
            None
        }
    }

    /// Bits collected toward the current byte.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Returns `true` when an incomplete byte is held.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.bits != 0
    }

    /// Discards any incomplete byte.
    pub const fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Outbound byte presented MSB first.
///
/// The most significant bit is driven as soon as the byte is loaded; each
/// clock falling edge advances to the next bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOut {
    byte: u8,
    shown: u8,
}

impl ShiftOut {
    /// Loads `byte` with its MSB on the line.
    #[must_use]
    pub const fn load(byte: u8) -> Self {
        Self { byte, shown: 0 }
    }

    /// Aligns the driven bit with the inbound bit count after a falling edge.
    pub const fn advance_to(&mut self, bits_clocked: u8) {
        if bits_clocked < BITS_PER_BYTE {
            self.shown = bits_clocked;
        }
    }

    /// Bit currently driven on the line.
    #[must_use]
    pub const fn bit(&self) -> bool {
        (self.byte << self.shown) & 0x80 != 0
    }

    /// Full byte being shifted out.
    #[must_use]
    pub const fn byte(&self) -> u8 {
        self.byte
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_accumulate_msb_first() {
        let mut shift = ShiftIn::new();
        let mut result = None;
        for bit in [true, false, true, false, false, true, false, true] {
            result = shift.push(bit);
        }
        assert_eq!(result, Some(0xA5));
        assert!(!shift.is_partial());
    }

    #[test]
    fn partial_byte_is_reported_and_cleared() {
        let mut shift = ShiftIn::new();
        assert_eq!(shift.push(true), None);
        assert_eq!(shift.push(true), None);
        assert!(shift.is_partial());
        assert_eq!(shift.bits(), 2);
        shift.clear();
        assert!(!shift.is_partial());
    }

    #[test]
    fn outbound_walks_from_msb() {
        let mut out = ShiftOut::load(0b1010_0001);
        let mut seen = Vec::new();
        for clocked in 0..8 {
            out.advance_to(clocked);
            seen.push(out.bit());
        }
        assert_eq!(
            seen,
            vec![true, false, true, false, false, false, false, true]
        );
        assert_eq!(out.byte(), 0xA1);
    }
}
