//! Reconstructed transaction records emitted to observers.

use std::fmt;

use crate::{HostCommand, HostId, Target};

/// Data direction of a host transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Standard or fast read.
    Read,
    /// Every non-read transaction, including unrecognized or truncated ones.
    #[default]
    Write,
}

impl Direction {
    /// Direction implied by a classified command, if one was received.
    #[must_use]
    pub fn of(command: Option<HostCommand>) -> Self {
        if command.is_some_and(HostCommand::is_read) {
            Self::Read
        } else {
            Self::Write
        }
    }
}

/// One host chip-select window, from assertion to release.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Transaction {
    /// Originating host port.
    pub host: HostId,
    /// Command byte, absent if released before it completed.
    pub opcode: Option<u8>,
    /// Start address, absent if released before all three bytes arrived.
    pub address: Option<u32>,
    /// Frozen route target, present whenever `address` is.
    pub target: Option<Target>,
    /// Data-phase bytes: returned bytes for reads, inbound bytes otherwise.
    pub payload: Vec<u8>,
    /// Read or non-read.
    pub direction: Direction,
    /// Step at which chip-select was first seen asserted.
    pub opened_at: u64,
    /// Step at which chip-select was first seen released.
    pub closed_at: u64,
}

impl Transaction {
    /// Classified command, if the opcode byte completed.
    #[must_use]
    pub fn command(&self) -> Option<HostCommand> {
        self.opcode.map(HostCommand::classify)
    }

    /// Returns `true` when the transaction reached its data phase address.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.address.is_some()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ", self.host)?;
        match self.command() {
            Some(HostCommand::Read) => f.write_str("READ")?,
            Some(HostCommand::FastRead) => f.write_str("FAST_READ")?,
            Some(HostCommand::Write) => f.write_str("WRITE")?,
            Some(HostCommand::Other(opcode)) => write!(f, "OP({opcode:#04x})")?,
            None => f.write_str("-")?,
        }
        if let Some(address) = self.address {
            write!(f, " {address:#08x}")?;
        }
        if let Some(target) = self.target {
            write!(f, " -> {target:?}")?;
        }
        write_payload(f, &self.payload)?;
        write!(f, " @{}..{}", self.opened_at, self.closed_at)
    }
}

/// Per-target observation of one routed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TargetRecord {
    /// Target that served the transaction.
    pub target: Target,
    /// Command byte.
    pub opcode: u8,
    /// Start address.
    pub address: u32,
    /// Bytes exchanged with the target.
    pub payload: Vec<u8>,
}

impl fmt::Display for TargetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} op={:#04x} {:#08x}",
            self.target, self.opcode, self.address
        )?;
        write_payload(f, &self.payload)
    }
}

fn write_payload(f: &mut fmt::Formatter<'_>, payload: &[u8]) -> fmt::Result {
    f.write_str(" [")?;
    for (index, byte) in payload.iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{byte:02X}")?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_transaction() -> Transaction {
        Transaction {
            host: HostId::A,
            opcode: Some(0x03),
            address: Some(0x00_0123),
            target: Some(Target::Main),
            payload: vec![0x23, 0x24],
            direction: Direction::Read,
            opened_at: 4,
            closed_at: 220,
        }
    }

    #[test]
    fn direction_follows_command() {
        assert_eq!(Direction::of(Some(HostCommand::Read)), Direction::Read);
        assert_eq!(Direction::of(Some(HostCommand::FastRead)), Direction::Read);
        assert_eq!(Direction::of(Some(HostCommand::Write)), Direction::Write);
        assert_eq!(Direction::of(Some(HostCommand::Other(0x9F))), Direction::Write);
        assert_eq!(Direction::of(None), Direction::Write);
    }

    #[test]
    fn display_renders_complete_read() {
        assert_eq!(
            read_transaction().to_string(),
            "A READ 0x000123 -> Main [23 24] @4..220"
        );
    }

    #[test]
    fn display_renders_truncated_window() {
        let transaction = Transaction {
            opcode: None,
            address: None,
            target: None,
            payload: Vec::new(),
            direction: Direction::Write,
            ..read_transaction()
        };
        assert!(!transaction.is_complete());
        assert_eq!(transaction.to_string(), "A - [] @4..220");
    }

    #[test]
    fn target_record_display() {
        let record = TargetRecord {
            target: Target::Secondary,
            opcode: 0x02,
            address: 0x00_1000,
            payload: vec![0xCA, 0xFE],
        };
        assert_eq!(record.to_string(), "Secondary op=0x02 0x001000 [CA FE]");
    }
}
