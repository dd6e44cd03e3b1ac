use thiserror::Error;

/// Errors returned by explicit-construction APIs.
///
/// The per-step decode/route path never produces these; malformed wire input
/// degrades to defined fallbacks and is reported through [`crate::Anomaly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum RouterError {
    /// Register address has no entry in the fixed register map.
    #[error("register address {0:#04x} is not mapped")]
    UnmappedRegister(u8),
    /// Target address does not fit in the 24-bit address space.
    #[error("address {0:#x} exceeds the 24-bit target address space")]
    AddressOutOfRange(u32),
    /// Host index is neither 0 (`HostA`) nor 1 (`HostB`).
    #[error("host index {0} is out of range")]
    InvalidHostIndex(usize),
    /// Range index is not below the number of configurable ranges.
    #[error("range index {0} is out of range")]
    InvalidRangeIndex(usize),
}
