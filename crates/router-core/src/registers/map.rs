//! Fixed management register map and address decoding.

use crate::RouterError;

/// First byte (high) of range0 start.
pub const REG_RANGE0_START: u8 = 0x00;
/// First byte (high) of range0 end.
pub const REG_RANGE0_END: u8 = 0x03;
/// First byte (high) of range1 start.
pub const REG_RANGE1_START: u8 = 0x06;
/// First byte (high) of range1 end.
pub const REG_RANGE1_END: u8 = 0x09;
/// Control register address.
pub const REG_CONTROL: u8 = 0x0C;
/// Status register address.
pub const REG_STATUS: u8 = 0x0D;

/// Number of mapped one-byte registers.
pub const REGISTER_COUNT: usize = 14;
/// Number of range-boundary bytes (two ranges, start and end, three bytes each).
pub const RANGE_BYTE_COUNT: usize = 12;
/// Bytes per 24-bit range boundary.
pub const BOUNDARY_BYTES: u8 = 3;

/// Reset value of every range-boundary byte.
pub const RANGE_BYTE_RESET: u8 = 0xFF;
/// Reset value of the control register.
pub const CONTROL_RESET: u8 = 0x00;
/// Reset value of the status register.
pub const STATUS_RESET: u8 = 0x00;
/// Value returned for reads of unmapped addresses.
pub const UNMAPPED_READ_VALUE: u8 = 0xFF;

/// Which end of a range a boundary byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeBound {
    /// Inclusive lower bound.
    Start,
    /// Inclusive upper bound.
    End,
}

/// A decoded register address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId {
    /// One byte of a 24-bit range boundary.
    RangeByte {
        /// Range index, `0` (higher priority) or `1`.
        range: u8,
        /// Start or end boundary.
        bound: RangeBound,
        /// Byte lane, `0` = bits `[23:16]` through `2` = bits `[7:0]`.
        lane: u8,
    },
    /// Control register.
    Control,
    /// Read-only status register.
    Status,
}

impl RegisterId {
    /// Decodes a register address.
    #[must_use]
    pub const fn decode(addr: u8) -> Option<Self> {
        match addr {
            REG_RANGE0_START..=0x0B => {
                let boundary = addr / BOUNDARY_BYTES;
                let bound = if boundary % 2 == 0 {
                    RangeBound::Start
                } else {
                    RangeBound::End
                };
                Some(Self::RangeByte {
                    range: boundary / 2,
                    bound,
                    lane: addr % BOUNDARY_BYTES,
                })
            }
            REG_CONTROL => Some(Self::Control),
            REG_STATUS => Some(Self::Status),
            _ => None,
        }
    }

    /// Returns the register address.
    #[must_use]
    pub const fn address(self) -> u8 {
        match self {
            Self::RangeByte { range, bound, lane } => {
                let bound_offset = match bound {
                    RangeBound::Start => 0,
                    RangeBound::End => BOUNDARY_BYTES,
                };
                range
                    .wrapping_mul(2 * BOUNDARY_BYTES)
                    .wrapping_add(bound_offset)
                    .wrapping_add(lane)
            }
            Self::Control => REG_CONTROL,
            Self::Status => REG_STATUS,
        }
    }

    /// Documented reset value.
    #[must_use]
    pub const fn reset_value(self) -> u8 {
        match self {
            Self::RangeByte { .. } => RANGE_BYTE_RESET,
            Self::Control => CONTROL_RESET,
            Self::Status => STATUS_RESET,
        }
    }
}

impl TryFrom<u8> for RegisterId {
    type Error = RouterError;

    fn try_from(addr: u8) -> Result<Self, Self::Error> {
        Self::decode(addr).ok_or(RouterError::UnmappedRegister(addr))
    }
}

const fn range_byte(range: u8, bound: RangeBound, lane: u8) -> RegisterId {
    RegisterId::RangeByte { range, bound, lane }
}

/// Canonical register layout in ascending address order.
pub const REGISTER_MAP: [RegisterId; REGISTER_COUNT] = [
    range_byte(0, RangeBound::Start, 0),
    range_byte(0, RangeBound::Start, 1),
    range_byte(0, RangeBound::Start, 2),
    range_byte(0, RangeBound::End, 0),
    range_byte(0, RangeBound::End, 1),
    range_byte(0, RangeBound::End, 2),
    range_byte(1, RangeBound::Start, 0),
    range_byte(1, RangeBound::Start, 1),
    range_byte(1, RangeBound::Start, 2),
    range_byte(1, RangeBound::End, 0),
    range_byte(1, RangeBound::End, 1),
    range_byte(1, RangeBound::End, 2),
    RegisterId::Control,
    RegisterId::Status,
];

const _: () = assert_register_layout();

const fn assert_register_layout() {
    assert!(
        RANGE_BYTE_COUNT + 2 == REGISTER_COUNT,
        "twelve range bytes plus control and status"
    );

    let mut index = 0;
    while index < REGISTER_MAP.len() {
        let id = REGISTER_MAP[index];
        assert!(
            id.address() as usize == index,
            "register map must be contiguous from zero"
        );
        match RegisterId::decode(id.address()) {
            Some(decoded) => assert!(
                decoded.address() == id.address(),
                "decode must invert address"
            ),
            None => panic!("every mapped address must decode"),
        }
        index += 1;
    }

    assert!(
        RegisterId::decode(REG_STATUS + 1).is_none(),
        "first address past the map must be unmapped"
    );
}
