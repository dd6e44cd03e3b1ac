//! Opcode tables for the host-facing and management channels.

/// Host/management write opcode (address, then payload).
pub const OPCODE_WRITE: u8 = 0x02;
/// Host/management standard read opcode.
pub const OPCODE_READ: u8 = 0x03;
/// Host fast read opcode (address, one dummy byte, then data).
pub const OPCODE_FAST_READ: u8 = 0x0B;

/// Classified host-channel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HostCommand {
    /// Standard read, data follows the address directly.
    Read,
    /// Fast read, one dummy byte between address and data.
    FastRead,
    /// Write, payload bytes follow the address.
    Write,
    /// Any other opcode; accepted, routed to the default target, no data effect.
    Other(u8),
}

/// Canonical host opcode table in ascending opcode order.
pub const HOST_OPCODE_TABLE: &[(u8, HostCommand)] = &[
    (OPCODE_WRITE, HostCommand::Write),
    (OPCODE_READ, HostCommand::Read),
    (OPCODE_FAST_READ, HostCommand::FastRead),
];

impl HostCommand {
    /// Classifies a raw command byte.
    #[must_use]
    pub const fn classify(opcode: u8) -> Self {
        match opcode {
            OPCODE_READ => Self::Read,
            OPCODE_FAST_READ => Self::FastRead,
            OPCODE_WRITE => Self::Write,
            other => Self::Other(other),
        }
    }

    /// Returns the raw command byte.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Read => OPCODE_READ,
            Self::FastRead => OPCODE_FAST_READ,
            Self::Write => OPCODE_WRITE,
            Self::Other(opcode) => opcode,
        }
    }

    /// Returns `true` for the two read forms; only these may be range-routed.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read | Self::FastRead)
    }

    /// Returns `true` when one dummy byte separates address and data.
    #[must_use]
    pub const fn has_dummy_byte(self) -> bool {
        matches!(self, Self::FastRead)
    }

    /// Returns `true` when data-phase bytes are committed to the target.
    #[must_use]
    pub const fn commits_data(self) -> bool {
        matches!(self, Self::Write)
    }

    /// Returns `true` for opcodes outside the recognized table.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Other(_))
    }
}

/// Classified management-channel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MgmtCommand {
    /// Register write: address byte, data byte.
    Write,
    /// Register read: address byte, dummy byte clocks the data out.
    Read,
    /// Any other opcode; the rest of the chip-select window is ignored.
    Other(u8),
}

impl MgmtCommand {
    /// Classifies a raw management command byte.
    #[must_use]
    pub const fn classify(opcode: u8) -> Self {
        match opcode {
            OPCODE_WRITE => Self::Write,
            OPCODE_READ => Self::Read,
            other => Self::Other(other),
        }
    }
}
