//! Top-level composition and the synchronous step.
//!
//! Every component advances once per [`Router::step`]. Gating decisions for a
//! step (granted host, routing configuration) come from state committed by
//! earlier steps. The target multiplexer commits first, against the shared
//! chip-select of the previous step, so a decoder opening this step sees the
//! same selection it routes with. Host switch commits and the configuration
//! crossing take effect at the end of the step.

use tracing::{debug, warn};

use crate::registers::{
    ConfigRegisterFile, STATUS_ACTIVE_HOST, STATUS_CONTENTION, STATUS_HOST_SWITCH_PENDING,
    STATUS_SHARED_BUSY, STATUS_TARGET_SWITCH_PENDING,
};
use crate::{
    Anomaly, ArbiterUpdate, CrossingRegister, DiagCounters, DownstreamPins, HostArbiter, HostId,
    ManagementPort, NullSink, ObservationSink, RouterConfig, RouterEvent, RouterInputs,
    RouterOutputs, RouterStatus, RoutingConfig, SampledPins, SwitchUpdate, Synchronizer,
    TargetMux, TargetSelect, TargetStore, TransactionDecoder,
};

/// Forwards events to the caller's sink and counts anomalies on the way.
struct Recorder<'a> {
    sink: &'a mut dyn ObservationSink,
    diag: &'a mut DiagCounters,
}

impl ObservationSink for Recorder<'_> {
    fn on_event(&mut self, event: RouterEvent) {
        if let RouterEvent::Anomaly { kind, step } = &event {
            self.diag.record(*kind, *step);
        }
        self.sink.on_event(event);
    }
}

/// Inline two-host, two-target serial-bus router.
#[derive(Debug, Clone)]
pub struct Router {
    config: RouterConfig,
    step: u64,
    host_sync: [Synchronizer; 2],
    decoders: [TransactionDecoder; 2],
    management: ManagementPort,
    registers: ConfigRegisterFile,
    routing: CrossingRegister<RoutingConfig>,
    arbiter: HostArbiter,
    mux: TargetMux,
    shared_busy: bool,
    diag: DiagCounters,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl Router {
    /// Creates a router in its reset state.
    #[must_use]
    pub const fn new(config: RouterConfig) -> Self {
        Self {
            config,
            step: 0,
            host_sync: [Synchronizer::new(); 2],
            decoders: [
                TransactionDecoder::new(HostId::A),
                TransactionDecoder::new(HostId::B),
            ],
            management: ManagementPort::new(),
            registers: ConfigRegisterFile::new(),
            routing: CrossingRegister::new(RoutingConfig::RESET),
            arbiter: HostArbiter::new(),
            mux: TargetMux::new(),
            shared_busy: false,
            diag: DiagCounters::new(),
        }
    }

    /// Synchronous total reset.
    ///
    /// Registers, routing view, arbiter, multiplexer, decoders, synchronizers,
    /// the management port, and diagnostics return to their reset state. Open
    /// transactions are dropped without a close record. The step counter and
    /// the backing stores are untouched.
    pub fn reset(&mut self) {
        for sync in &mut self.host_sync {
            sync.reset();
        }
        for decoder in &mut self.decoders {
            decoder.reset();
        }
        self.management.reset();
        self.registers.reset();
        self.routing = CrossingRegister::new(RoutingConfig::RESET);
        self.arbiter.reset();
        self.mux.reset();
        self.shared_busy = false;
        self.diag.reset();
        debug!(step = self.step, "router reset");
    }

    /// Advances every component by one step.
    pub fn step(
        &mut self,
        inputs: &RouterInputs,
        store: &mut dyn TargetStore,
        sink: &mut dyn ObservationSink,
    ) -> RouterOutputs {
        let now = self.step;
        self.step = self.step.wrapping_add(1);

        if inputs.reset {
            self.reset();
            sink.on_event(RouterEvent::Reset { step: now });
            return RouterOutputs::idle(&self.config);
        }

        let status = self.status_byte();
        let routing = self.routing.visible();
        let granted = self.arbiter.granted();
        let idle_level = self.config.idle_response_level;

        let sampled = [
            self.host_sync[0].sample(inputs.hosts[0]),
            self.host_sync[1].sample(inputs.hosts[1]),
        ];
        let shared = sampled[granted.index()];

        let mut recorder = Recorder {
            sink,
            diag: &mut self.diag,
        };

        let requested = TargetSelect::from_mode(routing.mode);
        report_target_switch(
            self.mux.update(requested, self.shared_busy),
            requested,
            now,
            &mut recorder,
        );

        let mut host_miso = [idle_level; 2];
        for (decoder, miso) in self.decoders.iter_mut().zip(host_miso.iter_mut()) {
            let pins = if decoder.host() == granted {
                shared
            } else {
                SampledPins::IDLE
            };
            if let Some(bit) = decoder.step(&pins, now, &routing, store, &mut recorder) {
                *miso = bit;
            }
        }

        let management_miso = self
            .management
            .step(
                inputs.management,
                now,
                status,
                &mut self.registers,
                &mut recorder,
            )
            .unwrap_or(idle_level);

        let downstream = DownstreamPins {
            chip_select: self.mux.chip_selects(shared.selected()),
            sclk: shared.level.sclk,
            mosi: shared.level.mosi,
        };

        report_host_switch(
            self.arbiter
                .update(routing.active_host, sampled.map(|pins| pins.selected())),
            routing.active_host,
            now,
            &mut recorder,
        );

        self.shared_busy = shared.selected();
        self.routing.load(self.registers.routing_config());

        RouterOutputs {
            host_miso,
            management_miso,
            downstream,
            contention: self.arbiter.contention(),
            host_switch_pending: self.arbiter.is_pending(),
            target_switch_pending: self.mux.is_pending(),
        }
    }

    /// Advances one step without an observer.
    pub fn step_unobserved(
        &mut self,
        inputs: &RouterInputs,
        store: &mut dyn TargetStore,
    ) -> RouterOutputs {
        self.step(inputs, store, &mut NullSink)
    }

    /// Status register value derived from committed routing-domain state.
    #[must_use]
    pub const fn status_byte(&self) -> u8 {
        let mut status = 0;
        if self.arbiter.is_pending() {
            status |= STATUS_HOST_SWITCH_PENDING;
        }
        if self.mux.is_pending() {
            status |= STATUS_TARGET_SWITCH_PENDING;
        }
        if self.arbiter.contention() {
            status |= STATUS_CONTENTION;
        }
        if self.arbiter.granted().bit() {
            status |= STATUS_ACTIVE_HOST;
        }
        if self.shared_busy {
            status |= STATUS_SHARED_BUSY;
        }
        status
    }

    /// Point-in-time status snapshot.
    #[must_use]
    pub const fn status(&self) -> RouterStatus {
        RouterStatus {
            step: self.step,
            active_host: self.arbiter.granted(),
            host_switch_pending: self.arbiter.is_pending(),
            target_select: self.mux.selection(),
            target_switch_pending: self.mux.is_pending(),
            contention: self.arbiter.contention(),
            control: self.registers.control_byte(),
            status: self.status_byte(),
        }
    }

    /// Immutable configuration.
    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Steps executed since construction; reset does not clear it.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step
    }

    /// Host currently granted the shared bus.
    #[must_use]
    pub const fn active_host(&self) -> HostId {
        self.arbiter.granted()
    }

    /// Target selection in effect.
    #[must_use]
    pub const fn target_select(&self) -> TargetSelect {
        self.mux.selection()
    }

    /// Register file as written over the management channel.
    #[must_use]
    pub const fn registers(&self) -> &ConfigRegisterFile {
        &self.registers
    }

    /// Routing configuration visible to decoders in the next step.
    #[must_use]
    pub const fn routing_config(&self) -> RoutingConfig {
        self.routing.visible()
    }

    /// Decoder serving one host port.
    #[must_use]
    pub const fn decoder(&self, host: HostId) -> &TransactionDecoder {
        &self.decoders[host.index()]
    }

    /// Anomaly counters since the last reset.
    #[must_use]
    pub const fn diag(&self) -> &DiagCounters {
        &self.diag
    }
}

fn report_host_switch(
    update: ArbiterUpdate,
    requested: HostId,
    now: u64,
    sink: &mut dyn ObservationSink,
) {
    if update.contention_onset {
        warn!(step = now, "both hosts asserted chip-select");
        sink.on_event(RouterEvent::Anomaly {
            kind: Anomaly::Contention,
            step: now,
        });
    }
    match update.switch {
        SwitchUpdate::Committed { from, to } => {
            debug!(step = now, ?from, ?to, "host switch committed");
            sink.on_event(RouterEvent::HostSwitched { from, to, step: now });
        }
        SwitchUpdate::Deferred => {
            debug!(step = now, ?requested, "host switch deferred");
            sink.on_event(RouterEvent::Anomaly {
                kind: Anomaly::HostSwitchDeferred,
                step: now,
            });
        }
        SwitchUpdate::Steady | SwitchUpdate::Waiting => {}
    }
}

fn report_target_switch(
    update: SwitchUpdate<TargetSelect>,
    requested: TargetSelect,
    now: u64,
    sink: &mut dyn ObservationSink,
) {
    match update {
        SwitchUpdate::Committed { from, to } => {
            debug!(step = now, ?from, ?to, "target select committed");
            sink.on_event(RouterEvent::TargetSelectSwitched { from, to, step: now });
        }
        SwitchUpdate::Deferred => {
            debug!(step = now, ?requested, "target select deferred");
            sink.on_event(RouterEvent::Anomaly {
                kind: Anomaly::TargetSwitchDeferred,
                step: now,
            });
        }
        SwitchUpdate::Steady | SwitchUpdate::Waiting => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlatStore, SpiPins, Target};

    const SELECT: SpiPins = SpiPins {
        chip_select: true,
        sclk: false,
        mosi: false,
    };

    #[test]
    fn fresh_router_is_idle() {
        let mut router = Router::default();
        let mut store = FlatStore::new();
        let outputs = router.step_unobserved(&RouterInputs::IDLE, &mut store);

        assert_eq!(outputs, RouterOutputs::idle(router.config()));
        assert_eq!(router.status_byte(), 0x00);
        assert_eq!(router.active_host(), HostId::A);
        assert_eq!(router.target_select(), TargetSelect::Main);
        assert_eq!(router.step_count(), 1);
    }

    #[test]
    fn granted_host_select_reaches_main_after_settle() {
        let mut router = Router::default();
        let mut store = FlatStore::new();
        let inputs = RouterInputs::with_host(HostId::A, SELECT);

        let first = router.step_unobserved(&inputs, &mut store);
        assert!(!first.downstream.selects(Target::Main));

        let second = router.step_unobserved(&inputs, &mut store);
        assert!(second.downstream.selects(Target::Main));
        assert!(!second.downstream.selects(Target::Secondary));
        assert!(router.decoder(HostId::A).is_active());
    }

    #[test]
    fn non_granted_host_is_ignored() {
        let mut router = Router::default();
        let mut store = FlatStore::new();
        let inputs = RouterInputs::with_host(HostId::B, SELECT);

        for _ in 0..4 {
            let outputs = router.step_unobserved(&inputs, &mut store);
            assert!(!outputs.downstream.selects(Target::Main));
            assert!(outputs.miso(HostId::B));
        }
        assert!(!router.decoder(HostId::B).is_active());
    }

    #[test]
    fn contention_is_reported_and_counted_once() {
        let mut router = Router::default();
        let mut store = FlatStore::new();
        let mut events: Vec<RouterEvent> = Vec::new();
        let inputs = RouterInputs {
            hosts: [SELECT; 2],
            ..RouterInputs::IDLE
        };

        router.step(&inputs, &mut store, &mut events);
        let outputs = router.step(&inputs, &mut store, &mut events);
        router.step(&inputs, &mut store, &mut events);

        assert!(outputs.contention);
        assert_eq!(router.diag().count(Anomaly::Contention), 1);
        assert_eq!(router.status_byte() & STATUS_CONTENTION, STATUS_CONTENTION);
        assert_eq!(router.active_host(), HostId::A);
    }

    #[test]
    fn reset_pin_clears_state_but_keeps_step_count() {
        let mut router = Router::default();
        let mut store = FlatStore::new();
        let mut events: Vec<RouterEvent> = Vec::new();
        let inputs = RouterInputs {
            hosts: [SELECT; 2],
            ..RouterInputs::IDLE
        };
        router.step(&inputs, &mut store, &mut events);
        router.step(&inputs, &mut store, &mut events);

        let reset = RouterInputs {
            reset: true,
            ..RouterInputs::IDLE
        };
        let outputs = router.step(&reset, &mut store, &mut events);

        assert_eq!(outputs, RouterOutputs::idle(router.config()));
        assert_eq!(events.last(), Some(&RouterEvent::Reset { step: 2 }));
        assert!(router.diag().is_clean());
        assert!(!router.decoder(HostId::A).is_active());
        assert_eq!(router.step_count(), 3);
        assert!(!events
            .iter()
            .any(|event| matches!(event, RouterEvent::TransactionClosed(_))));
    }
}
