//! Priority route resolution from the committed routing configuration.
//!
//! Ranges are consulted only for reads in `Share` mode. Writes, and every
//! transaction in any other mode, land on the mode-derived default target so
//! the two stores never diverge through a range-routed write.

use crate::{HostId, RouteMode, RouterError, Target};

/// Mask of the 24-bit target address space.
pub const ADDRESS_MASK: u32 = 0x00FF_FFFF;

/// Number of priority-ordered address ranges.
pub const RANGE_COUNT: usize = 2;

/// One inclusive address interval mapped to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RangeConfig {
    /// Inclusive lower bound.
    pub start: u32,
    /// Inclusive upper bound.
    pub end: u32,
    /// Range participates in read routing.
    pub enabled: bool,
    /// Destination of matching reads.
    pub target: Target,
}

impl RangeConfig {
    /// Reset state: both bounds `0xFFFFFF`, disabled, targeting Main.
    pub const RESET: Self = Self {
        start: ADDRESS_MASK,
        end: ADDRESS_MASK,
        enabled: false,
        target: Target::Main,
    };

    /// Builds a range, rejecting bounds outside the 24-bit address space.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::AddressOutOfRange`] when either bound exceeds
    /// `0xFFFFFF`.
    pub const fn try_new(
        start: u32,
        end: u32,
        enabled: bool,
        target: Target,
    ) -> Result<Self, RouterError> {
        if start > ADDRESS_MASK {
            return Err(RouterError::AddressOutOfRange(start));
        }
        if end > ADDRESS_MASK {
            return Err(RouterError::AddressOutOfRange(end));
        }
        Ok(Self {
            start,
            end,
            enabled,
            target,
        })
    }

    /// Inclusive unsigned containment; an inverted range contains nothing.
    #[must_use]
    pub const fn contains(&self, addr: u32) -> bool {
        self.start <= addr && addr <= self.end
    }

    /// Enabled and containing `addr`.
    #[must_use]
    pub const fn matches(&self, addr: u32) -> bool {
        self.enabled && self.contains(addr)
    }

    /// `start > end`.
    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self::RESET
    }
}

/// Routing-domain view of the committed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RoutingConfig {
    /// Global routing policy.
    pub mode: RouteMode,
    /// Requested active host.
    pub active_host: HostId,
    /// Ranges in priority order; index 0 wins on overlap.
    pub ranges: [RangeConfig; RANGE_COUNT],
}

impl RoutingConfig {
    /// Configuration implied by the documented register reset values.
    pub const RESET: Self = Self {
        mode: RouteMode::Main,
        active_host: HostId::A,
        ranges: [RangeConfig::RESET; RANGE_COUNT],
    };

    /// Target used whenever ranges are not consulted or none match.
    #[must_use]
    pub const fn default_target(&self) -> Target {
        default_target(self.mode)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self::RESET
    }
}

/// Frozen outcome of one route resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RouteDecision {
    /// Target selected for the whole transaction.
    pub target: Target,
    /// Index of the range that matched, `None` for default routing.
    pub matched_range: Option<u8>,
}

/// Mode-derived default target. Only `Secondary` mode defaults away from Main.
#[must_use]
pub const fn default_target(mode: RouteMode) -> Target {
    match mode {
        RouteMode::Secondary => Target::Secondary,
        RouteMode::Main | RouteMode::Share | RouteMode::Reserved => Target::Main,
    }
}

/// Resolves the target for one transaction.
#[must_use]
pub fn resolve(is_read: bool, addr: u32, config: &RoutingConfig) -> RouteDecision {
    let fallback = RouteDecision {
        target: config.default_target(),
        matched_range: None,
    };

    if config.mode != RouteMode::Share || !is_read {
        return fallback;
    }

    config
        .ranges
        .iter()
        .zip(0_u8..)
        .find(|(range, _)| range.matches(addr))
        .map_or(fallback, |(range, index)| RouteDecision {
            target: range.target,
            matched_range: Some(index),
        })
}

/// Resolves and returns only the target.
#[must_use]
pub fn resolve_target(is_read: bool, addr: u32, config: &RoutingConfig) -> Target {
    resolve(is_read, addr, config).target
}
