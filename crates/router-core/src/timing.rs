/// Steps between a raw pin change and its settled, edge-detectable level.
pub const SYNC_SETTLE_STEPS: u64 = 1;

/// Steps between a register-file commit and its visibility to routing.
pub const CONFIG_PROPAGATION_STEPS: u64 = 1;

/// Serial bits per byte on every channel.
pub const BITS_PER_BYTE: u8 = 8;

/// Host transaction decode phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DecodePhase {
    /// Chip-select deasserted.
    #[default]
    Idle,
    /// Collecting the command byte.
    Cmd,
    /// Collecting the 24-bit address, high byte first.
    Addr,
    /// Discarding the fast-read dummy byte.
    Dummy,
    /// Exchanging payload bytes.
    Data,
}

/// Single source-of-truth byte length for fixed-length decode phases.
pub const PHASE_BYTE_TABLE: &[(DecodePhase, u8)] = &[
    (DecodePhase::Cmd, 1),
    (DecodePhase::Addr, 3),
    (DecodePhase::Dummy, 1),
];

/// Looks up the fixed byte length of a decode phase.
///
/// `Idle` and `Data` are open-ended and return `None`.
#[must_use]
pub fn phase_bytes(phase: DecodePhase) -> Option<u8> {
    PHASE_BYTE_TABLE
        .iter()
        .find_map(|(entry_phase, bytes)| (*entry_phase == phase).then_some(*bytes))
}
