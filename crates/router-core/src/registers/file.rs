//! Configuration register file storage and byte-level access semantics.

use crate::registers::control::{ControlState, CONTROL_WRITABLE_MASK};
use crate::registers::map::{
    RangeBound, RegisterId, BOUNDARY_BYTES, CONTROL_RESET, RANGE_BYTE_COUNT, RANGE_BYTE_RESET,
    UNMAPPED_READ_VALUE,
};
use crate::route::{RangeConfig, RoutingConfig, RANGE_COUNT};
use crate::RouterError;

/// Result of one management write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterWrite {
    /// The register now holds `value`.
    Applied {
        /// Register that changed.
        register: RegisterId,
        /// Stored value after masking.
        value: u8,
    },
    /// Status or unmapped address; no state changed.
    Dropped,
}

/// Twelve range-boundary bytes and the control byte.
///
/// The status register is not stored here; it is a live view of the routing
/// domain supplied by the caller on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRegisterFile {
    range_bytes: [u8; RANGE_BYTE_COUNT],
    control: u8,
    commits: u64,
}

impl Default for ConfigRegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRegisterFile {
    /// Creates a register file holding documented reset values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            range_bytes: [RANGE_BYTE_RESET; RANGE_BYTE_COUNT],
            control: CONTROL_RESET,
            commits: 0,
        }
    }

    /// Restores every register to its reset value.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }

    /// Reads one register. Unmapped addresses return `0xFF`.
    #[must_use]
    pub const fn read(&self, addr: u8, status: u8) -> u8 {
        match RegisterId::decode(addr) {
            Some(RegisterId::RangeByte { .. }) => self.range_bytes[addr as usize],
            Some(RegisterId::Control) => self.control,
            Some(RegisterId::Status) => status,
            None => UNMAPPED_READ_VALUE,
        }
    }

    /// Writes one register.
    ///
    /// Writes to the status register or to unmapped addresses are accepted
    /// and discarded. The control byte is stored whole, with bit 7 cleared.
    pub fn write(&mut self, addr: u8, value: u8) -> RegisterWrite {
        let Some(register) = RegisterId::decode(addr) else {
            return RegisterWrite::Dropped;
        };

        let stored = match register {
            RegisterId::RangeByte { .. } => {
                self.range_bytes[usize::from(addr)] = value;
                value
            }
            RegisterId::Control => {
                self.control = value & CONTROL_WRITABLE_MASK;
                self.control
            }
            RegisterId::Status => return RegisterWrite::Dropped,
        };

        self.commits = self.commits.wrapping_add(1);
        RegisterWrite::Applied {
            register,
            value: stored,
        }
    }

    /// Raw control byte.
    #[must_use]
    pub const fn control_byte(&self) -> u8 {
        self.control
    }

    /// Decoded control register.
    #[must_use]
    pub const fn control_state(&self) -> ControlState {
        ControlState::from_byte(self.control)
    }

    /// Number of applied writes since reset.
    #[must_use]
    pub const fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Assembles one 24-bit boundary, high byte first.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRangeIndex`] when `range` is not below
    /// [`RANGE_COUNT`].
    pub fn boundary(&self, range: usize, bound: RangeBound) -> Result<u32, RouterError> {
        if range >= RANGE_COUNT {
            return Err(RouterError::InvalidRangeIndex(range));
        }
        Ok(self.boundary_at(range, bound))
    }

    /// `range` must already be below [`RANGE_COUNT`].
    fn boundary_at(&self, range: usize, bound: RangeBound) -> u32 {
        let width = usize::from(BOUNDARY_BYTES);
        let offset = match bound {
            RangeBound::Start => 0,
            RangeBound::End => width,
        };
        let base = range * 2 * width + offset;
        self.range_bytes[base..base + width]
            .iter()
            .fold(0_u32, |acc, &byte| (acc << 8) | u32::from(byte))
    }

    /// Both ranges as currently committed.
    #[must_use]
    pub fn ranges(&self) -> [RangeConfig; RANGE_COUNT] {
        let control = self.control_state();
        let flags = [
            (control.range0_enabled, control.range0_target),
            (control.range1_enabled, control.range1_target),
        ];
        let mut ranges = [RangeConfig::RESET; RANGE_COUNT];
        for (index, (slot, (enabled, target))) in ranges.iter_mut().zip(flags).enumerate() {
            *slot = RangeConfig {
                start: self.boundary_at(index, RangeBound::Start),
                end: self.boundary_at(index, RangeBound::End),
                enabled,
                target,
            };
        }
        ranges
    }

    /// Snapshot handed across to the routing domain.
    #[must_use]
    pub fn routing_config(&self) -> RoutingConfig {
        let control = self.control_state();
        RoutingConfig {
            mode: control.mode,
            active_host: control.active_host,
            ranges: self.ranges(),
        }
    }
}
