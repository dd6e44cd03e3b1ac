//! Control and status register field layouts.

use crate::RouterError;

/// Control bits `[1:0]`: routing mode.
pub const CONTROL_MODE_MASK: u8 = 0b0000_0011;
/// Control bit 2: range0 enabled.
pub const CONTROL_RANGE0_ENABLE: u8 = 1 << 2;
/// Control bit 3: range1 enabled.
pub const CONTROL_RANGE1_ENABLE: u8 = 1 << 3;
/// Control bit 4: range0 target (`1` = Secondary).
pub const CONTROL_RANGE0_TARGET: u8 = 1 << 4;
/// Control bit 5: range1 target (`1` = Secondary).
pub const CONTROL_RANGE1_TARGET: u8 = 1 << 5;
/// Control bit 6: active host (`1` = `HostB`).
pub const CONTROL_ACTIVE_HOST: u8 = 1 << 6;
/// Control bit 7 is reserved; it is never stored and reads back as zero.
pub const CONTROL_WRITABLE_MASK: u8 = 0x7F;

/// Status bit 0: host switch requested but waiting for idle.
pub const STATUS_HOST_SWITCH_PENDING: u8 = 1 << 0;
/// Status bit 1: target-select switch requested but waiting for idle.
pub const STATUS_TARGET_SWITCH_PENDING: u8 = 1 << 1;
/// Status bit 2: both hosts currently assert chip-select.
pub const STATUS_CONTENTION: u8 = 1 << 2;
/// Status bit 3: committed active host (`1` = `HostB`).
pub const STATUS_ACTIVE_HOST: u8 = 1 << 3;
/// Status bit 4: shared downstream bus has chip-select asserted.
pub const STATUS_SHARED_BUSY: u8 = 1 << 4;

/// Downstream byte-addressable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Target {
    /// Primary store.
    #[default]
    Main,
    /// Alternate store.
    Secondary,
}

impl Target {
    /// Both targets in index order.
    pub const ALL: [Self; 2] = [Self::Main, Self::Secondary];

    /// Decodes a one-bit target field.
    #[must_use]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Self::Secondary
        } else {
            Self::Main
        }
    }

    /// Encodes as a one-bit target field.
    #[must_use]
    pub const fn bit(self) -> bool {
        matches!(self, Self::Secondary)
    }

    /// Array index (`Main` = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Upstream bus master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HostId {
    /// First host port.
    #[default]
    A,
    /// Second host port.
    B,
}

impl HostId {
    /// Both hosts in port order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// Decodes a one-bit host field.
    #[must_use]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Self::B
        } else {
            Self::A
        }
    }

    /// Encodes as a one-bit host field.
    #[must_use]
    pub const fn bit(self) -> bool {
        matches!(self, Self::B)
    }

    /// Port index (`A` = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The other host.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl TryFrom<usize> for HostId {
    type Error = RouterError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::A),
            1 => Ok(Self::B),
            other => Err(RouterError::InvalidHostIndex(other)),
        }
    }
}

/// Global routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RouteMode {
    /// Everything goes to Main.
    #[default]
    Main = 0,
    /// Everything goes to Secondary.
    Secondary = 1,
    /// Reads are range-routed, writes go to Main.
    Share = 2,
    /// Undocumented encoding; behaves exactly as its bits fall through.
    Reserved = 3,
}

impl RouteMode {
    /// Decodes the two mode bits; higher bits are ignored.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & CONTROL_MODE_MASK {
            0 => Self::Main,
            1 => Self::Secondary,
            2 => Self::Share,
            _ => Self::Reserved,
        }
    }

    /// Encodes as the two mode bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Decoded control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControlState {
    /// Routing mode.
    pub mode: RouteMode,
    /// Range0 participates in read routing.
    pub range0_enabled: bool,
    /// Range1 participates in read routing.
    pub range1_enabled: bool,
    /// Range0 destination.
    pub range0_target: Target,
    /// Range1 destination.
    pub range1_target: Target,
    /// Requested active host.
    pub active_host: HostId,
}

impl ControlState {
    /// Decodes a raw control byte. Bit 7 is ignored.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            mode: RouteMode::from_bits(byte),
            range0_enabled: byte & CONTROL_RANGE0_ENABLE != 0,
            range1_enabled: byte & CONTROL_RANGE1_ENABLE != 0,
            range0_target: Target::from_bit(byte & CONTROL_RANGE0_TARGET != 0),
            range1_target: Target::from_bit(byte & CONTROL_RANGE1_TARGET != 0),
            active_host: HostId::from_bit(byte & CONTROL_ACTIVE_HOST != 0),
        }
    }

    /// Encodes into a raw control byte with bit 7 clear.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        let mut byte = self.mode.bits();
        if self.range0_enabled {
            byte |= CONTROL_RANGE0_ENABLE;
        }
        if self.range1_enabled {
            byte |= CONTROL_RANGE1_ENABLE;
        }
        if self.range0_target.bit() {
            byte |= CONTROL_RANGE0_TARGET;
        }
        if self.range1_target.bit() {
            byte |= CONTROL_RANGE1_TARGET;
        }
        if self.active_host.bit() {
            byte |= CONTROL_ACTIVE_HOST;
        }
        byte
    }
}
