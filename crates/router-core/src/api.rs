//! Public embedding contracts: configuration, per-step pins, status
//! snapshots, and the observation hook.

use crate::{
    Anomaly, HostId, RouteDecision, SpiPins, Target, TargetRecord, TargetSelect, Transaction,
};

/// Default level driven on an undriven response line (pulled up).
pub const DEFAULT_IDLE_RESPONSE_LEVEL: bool = true;

/// Top-level immutable configuration for a router instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RouterConfig {
    /// Level presented on every response line that is not shifting out a
    /// data bit, including the non-granted host's.
    pub idle_response_level: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            idle_response_level: DEFAULT_IDLE_RESPONSE_LEVEL,
        }
    }
}

/// Raw input levels presented for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RouterInputs {
    /// Host ports, indexed by [`HostId::index`].
    pub hosts: [SpiPins; 2],
    /// Management channel.
    pub management: SpiPins,
    /// Synchronous reset; when set, the step performs a total reset.
    pub reset: bool,
}

impl RouterInputs {
    /// All lines idle, reset deasserted.
    pub const IDLE: Self = Self {
        hosts: [SpiPins::IDLE; 2],
        management: SpiPins::IDLE,
        reset: false,
    };

    /// Idle inputs with one host port driven.
    #[must_use]
    pub const fn with_host(host: HostId, pins: SpiPins) -> Self {
        let mut inputs = Self::IDLE;
        inputs.hosts[host.index()] = pins;
        inputs
    }
}

/// Shared downstream bus as driven toward the targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DownstreamPins {
    /// Chip-selects indexed by [`Target::index`].
    pub chip_select: [bool; 2],
    /// Serial clock from the granted host.
    pub sclk: bool,
    /// Data from the granted host.
    pub mosi: bool,
}

impl DownstreamPins {
    /// Returns `true` when `target`'s chip-select is asserted.
    #[must_use]
    pub const fn selects(&self, target: Target) -> bool {
        self.chip_select[target.index()]
    }
}

/// Output levels produced by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouterOutputs {
    /// Response line per host port, indexed by [`HostId::index`].
    pub host_miso: [bool; 2],
    /// Management channel response line.
    pub management_miso: bool,
    /// Shared downstream bus.
    pub downstream: DownstreamPins,
    /// Both hosts assert chip-select.
    pub contention: bool,
    /// Host switch waiting for both hosts to go idle.
    pub host_switch_pending: bool,
    /// Target-select switch waiting for the shared bus to go idle.
    pub target_switch_pending: bool,
}

impl RouterOutputs {
    /// Outputs of a quiescent router.
    #[must_use]
    pub const fn idle(config: &RouterConfig) -> Self {
        Self {
            host_miso: [config.idle_response_level; 2],
            management_miso: config.idle_response_level,
            downstream: DownstreamPins {
                chip_select: [false; 2],
                sclk: false,
                mosi: false,
            },
            contention: false,
            host_switch_pending: false,
            target_switch_pending: false,
        }
    }

    /// Response line of one host.
    #[must_use]
    pub const fn miso(&self, host: HostId) -> bool {
        self.host_miso[host.index()]
    }
}

/// Point-in-time view of the routing domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RouterStatus {
    /// Steps executed since construction.
    pub step: u64,
    /// Host currently granted the shared bus.
    pub active_host: HostId,
    /// Host switch waiting for idle.
    pub host_switch_pending: bool,
    /// Target selection in effect.
    pub target_select: TargetSelect,
    /// Target-select switch waiting for idle.
    pub target_switch_pending: bool,
    /// Both hosts assert chip-select.
    pub contention: bool,
    /// Committed control register byte.
    pub control: u8,
    /// Status register byte as a management read would return it.
    pub status: u8,
}

/// Deterministic observation events emitted in step order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouterEvent {
    /// A host's chip-select window opened.
    TransactionOpened {
        /// Originating host.
        host: HostId,
        /// Step index.
        step: u64,
    },
    /// The route for an open transaction was resolved and frozen.
    RouteResolved {
        /// Originating host.
        host: HostId,
        /// 24-bit start address.
        address: u32,
        /// Frozen decision.
        decision: RouteDecision,
        /// Step index.
        step: u64,
    },
    /// A host's chip-select window closed.
    TransactionClosed(Transaction),
    /// Per-target record of a routed transaction, emitted at close.
    TargetAccess(TargetRecord),
    /// A management write changed a register.
    RegisterCommitted {
        /// Register address.
        address: u8,
        /// Stored value.
        value: u8,
        /// Step index.
        step: u64,
    },
    /// The host arbiter granted the bus to a different host.
    HostSwitched {
        /// Previously granted host.
        from: HostId,
        /// Newly granted host.
        to: HostId,
        /// Step index.
        step: u64,
    },
    /// The target multiplexer changed its selection.
    TargetSelectSwitched {
        /// Previous selection.
        from: TargetSelect,
        /// New selection.
        to: TargetSelect,
        /// Step index.
        step: u64,
    },
    /// A non-fatal anomaly was detected.
    Anomaly {
        /// Anomaly kind.
        kind: Anomaly,
        /// Step index.
        step: u64,
    },
    /// Synchronous reset was applied.
    Reset {
        /// Step index.
        step: u64,
    },
}

/// Sink trait for deterministic observation hooks.
pub trait ObservationSink {
    /// Records an event in emission order.
    fn on_event(&mut self, event: RouterEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullSink;

impl ObservationSink for NullSink {
    fn on_event(&mut self, _event: RouterEvent) {}
}

impl ObservationSink for Vec<RouterEvent> {
    fn on_event(&mut self, event: RouterEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_pulls_lines_high() {
        let config = RouterConfig::default();
        assert!(config.idle_response_level);

        let outputs = RouterOutputs::idle(&config);
        assert!(outputs.miso(HostId::A));
        assert!(outputs.miso(HostId::B));
        assert!(outputs.management_miso);
        assert!(!outputs.downstream.selects(Target::Main));
    }

    #[test]
    fn inputs_with_host_drive_only_that_port() {
        let pins = SpiPins {
            chip_select: true,
            sclk: false,
            mosi: true,
        };
        let inputs = RouterInputs::with_host(HostId::B, pins);
        assert_eq!(inputs.hosts[HostId::A.index()], SpiPins::IDLE);
        assert_eq!(inputs.hosts[HostId::B.index()], pins);
        assert!(!inputs.reset);
    }

    #[test]
    fn vec_sink_preserves_order() {
        let mut sink: Vec<RouterEvent> = Vec::new();
        sink.on_event(RouterEvent::Reset { step: 1 });
        sink.on_event(RouterEvent::Anomaly {
            kind: Anomaly::Contention,
            step: 2,
        });
        assert_eq!(
            sink,
            vec![
                RouterEvent::Reset { step: 1 },
                RouterEvent::Anomaly {
                    kind: Anomaly::Contention,
                    step: 2,
                },
            ]
        );
    }
}
