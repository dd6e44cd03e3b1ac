//! Saturating anomaly counters exposed to the verification layer.

use crate::Anomaly;

/// Per-kind anomaly counters; every field saturates at `u16::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiagCounters {
    /// Last anomaly recorded, if any.
    pub last_anomaly: Option<Anomaly>,
    /// Step index at which `last_anomaly` was recorded.
    pub last_anomaly_step: u64,
    /// Contention onsets.
    pub contention: u16,
    /// Host switches that had to wait for idle.
    pub host_switch_deferred: u16,
    /// Target-select switches that had to wait for idle.
    pub target_switch_deferred: u16,
    /// Management writes with no state effect.
    pub register_write_dropped: u16,
    /// Host transactions with an unrecognized opcode.
    pub unknown_host_opcode: u16,
    /// Management transactions with an unrecognized opcode.
    pub unknown_management_opcode: u16,
    /// Host transactions closed before the address was complete.
    pub transaction_aborted: u16,
    /// Chip-select releases that discarded a partial byte.
    pub partial_byte_discarded: u16,
}

impl DiagCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_anomaly: None,
            last_anomaly_step: 0,
            contention: 0,
            host_switch_deferred: 0,
            target_switch_deferred: 0,
            register_write_dropped: 0,
            unknown_host_opcode: 0,
            unknown_management_opcode: 0,
            transaction_aborted: 0,
            partial_byte_discarded: 0,
        }
    }

    /// Records one anomaly occurrence at `step`.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record(&mut self, anomaly: Anomaly, step: u64) {
        self.last_anomaly = Some(anomaly);
        self.last_anomaly_step = step;
        let counter = match anomaly {
            Anomaly::Contention => &mut self.contention,
            Anomaly::HostSwitchDeferred => &mut self.host_switch_deferred,
            Anomaly::TargetSwitchDeferred => &mut self.target_switch_deferred,
            Anomaly::RegisterWriteDropped => &mut self.register_write_dropped,
            Anomaly::UnknownHostOpcode => &mut self.unknown_host_opcode,
            Anomaly::UnknownManagementOpcode => &mut self.unknown_management_opcode,
            Anomaly::TransactionAborted => &mut self.transaction_aborted,
            Anomaly::PartialByteDiscarded => &mut self.partial_byte_discarded,
        };
        *counter = counter.saturating_add(1);
    }

    /// Returns the counter for one anomaly kind.
    #[must_use]
    pub const fn count(&self, anomaly: Anomaly) -> u16 {
        match anomaly {
            Anomaly::Contention => self.contention,
            Anomaly::HostSwitchDeferred => self.host_switch_deferred,
            Anomaly::TargetSwitchDeferred => self.target_switch_deferred,
            Anomaly::RegisterWriteDropped => self.register_write_dropped,
            Anomaly::UnknownHostOpcode => self.unknown_host_opcode,
            Anomaly::UnknownManagementOpcode => self.unknown_management_opcode,
            Anomaly::TransactionAborted => self.transaction_aborted,
            Anomaly::PartialByteDiscarded => self.partial_byte_discarded,
        }
    }

    /// Returns `true` when nothing has been recorded since reset.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.last_anomaly.is_none()
    }

    /// Resets all counters.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}
