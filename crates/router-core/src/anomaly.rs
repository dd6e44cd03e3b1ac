use thiserror::Error;

/// Observable, non-fatal conditions surfaced to the verification layer.
///
/// None of these halt the engine. Each maps to a defined fallback and is
/// counted in [`crate::DiagCounters`] and emitted as a
/// [`crate::RouterEvent::Anomaly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Anomaly {
    /// Both hosts asserted chip-select in the same step.
    #[error("both hosts asserted chip-select")]
    Contention = 0x01,
    /// Host-select change requested while a host bus was active.
    #[error("host switch deferred until both hosts are idle")]
    HostSwitchDeferred = 0x02,
    /// Target-select change requested while the shared bus was active.
    #[error("target switch deferred until the shared bus is idle")]
    TargetSwitchDeferred = 0x03,
    /// Management write addressed the status register or an unmapped address.
    #[error("register write dropped")]
    RegisterWriteDropped = 0x04,
    /// Host opcode outside the read/fast-read/write set.
    #[error("unrecognized host opcode")]
    UnknownHostOpcode = 0x05,
    /// Management opcode outside the read/write set.
    #[error("unrecognized management opcode")]
    UnknownManagementOpcode = 0x06,
    /// Chip-select released before the 24-bit address was complete.
    #[error("transaction closed before its address was complete")]
    TransactionAborted = 0x07,
    /// Chip-select released with an incomplete byte in the shift register.
    #[error("partial byte discarded on chip-select release")]
    PartialByteDiscarded = 0x08,
}

impl Anomaly {
    /// Every anomaly kind in code order.
    pub const ALL: [Self; 8] = [
        Self::Contention,
        Self::HostSwitchDeferred,
        Self::TargetSwitchDeferred,
        Self::RegisterWriteDropped,
        Self::UnknownHostOpcode,
        Self::UnknownManagementOpcode,
        Self::TransactionAborted,
        Self::PartialByteDiscarded,
    ];

    /// Returns the stable one-byte code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable code back into an anomaly kind.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::Contention),
            0x02 => Some(Self::HostSwitchDeferred),
            0x03 => Some(Self::TargetSwitchDeferred),
            0x04 => Some(Self::RegisterWriteDropped),
            0x05 => Some(Self::UnknownHostOpcode),
            0x06 => Some(Self::UnknownManagementOpcode),
            0x07 => Some(Self::TransactionAborted),
            0x08 => Some(Self::PartialByteDiscarded),
            _ => None,
        }
    }

    /// Anomalies tied to the safe-switch logic rather than wire decoding.
    #[must_use]
    pub const fn is_switch_related(self) -> bool {
        matches!(
            self,
            Self::Contention | Self::HostSwitchDeferred | Self::TargetSwitchDeferred
        )
    }
}
