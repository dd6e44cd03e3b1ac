//! Bit-level host transaction decoder.
//!
//! One decoder instance is owned per host port. It reconstructs the command,
//! the 24-bit address, and the payload from settled pin samples, resolves the
//! route exactly once when the address completes, and moves data to or from
//! the frozen target one byte at a time.
//!
//! The routing configuration is captured when the chip-select window opens,
//! the same instant the target multiplexer stops accepting switches, so the
//! resolved target always matches the chip-selects driven for the window.

use tracing::{debug, trace};

use crate::route::{resolve, RouteDecision, RoutingConfig, ADDRESS_MASK};
use crate::shift::{ShiftIn, ShiftOut};
use crate::timing::{phase_bytes, DecodePhase};
use crate::{
    Anomaly, Direction, HostCommand, HostId, ObservationSink, ReturnPath, RouterEvent,
    SampledPins, TargetRecord, TargetStore, Transaction,
};

/// Per-port transaction state machine `Idle -> Cmd -> Addr -> (Dummy) -> Data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDecoder {
    host: HostId,
    phase: DecodePhase,
    inbound: ShiftIn,
    phase_count: u8,
    command: Option<HostCommand>,
    address: u32,
    start_address: Option<u32>,
    routing: RoutingConfig,
    route: Option<RouteDecision>,
    return_path: ReturnPath,
    outbound: Option<ShiftOut>,
    payload: Vec<u8>,
    opened_at: u64,
}

impl TransactionDecoder {
    /// Creates an idle decoder for `host`'s port.
    #[must_use]
    pub const fn new(host: HostId) -> Self {
        Self {
            host,
            phase: DecodePhase::Idle,
            inbound: ShiftIn::new(),
            phase_count: 0,
            command: None,
            address: 0,
            start_address: None,
            routing: RoutingConfig::RESET,
            route: None,
            return_path: ReturnPath::new(),
            outbound: None,
            payload: Vec::new(),
            opened_at: 0,
        }
    }

    /// Port this decoder serves.
    #[must_use]
    pub const fn host(&self) -> HostId {
        self.host
    }

    /// Current decode phase.
    #[must_use]
    pub const fn phase(&self) -> DecodePhase {
        self.phase
    }

    /// Routing configuration captured when the open window began.
    #[must_use]
    pub const fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    /// Frozen route of the open transaction, once the address is complete.
    #[must_use]
    pub const fn route(&self) -> Option<RouteDecision> {
        self.route
    }

    /// Returns `true` while a chip-select window is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != DecodePhase::Idle
    }

    /// Advances one step.
    ///
    /// `routing` is only read on the step that opens a window.
    /// Returns the response bit while a read byte is being shifted out, or
    /// `None` when the line should sit at the idle level.
    pub fn step(
        &mut self,
        pins: &SampledPins,
        now: u64,
        routing: &RoutingConfig,
        store: &mut dyn TargetStore,
        sink: &mut dyn ObservationSink,
    ) -> Option<bool> {
        if !pins.selected() {
            if self.is_active() {
                self.close(now, sink);
            }
            return None;
        }

        if !self.is_active() {
            self.open(now, routing, sink);
        }

        if pins.sclk_rising() {
            if let Some(byte) = self.inbound.push(pins.mosi()) {
                self.accept_byte(byte, now, store, sink);
            }
        } else if pins.sclk_falling() {
            if let Some(outbound) = self.outbound.as_mut() {
                outbound.advance_to(self.inbound.bits());
            }
        }

        self.outbound.as_ref().map(ShiftOut::bit)
    }

    /// Drops any open transaction without emitting a record.
    pub fn reset(&mut self) {
        *self = Self::new(self.host);
    }

    fn open(&mut self, now: u64, routing: &RoutingConfig, sink: &mut dyn ObservationSink) {
        self.phase = DecodePhase::Cmd;
        self.routing = *routing;
        self.opened_at = now;
        trace!(step = now, host = ?self.host, "transaction opened");
        sink.on_event(RouterEvent::TransactionOpened {
            host: self.host,
            step: now,
        });
    }

    fn accept_byte(
        &mut self,
        byte: u8,
        now: u64,
        store: &mut dyn TargetStore,
        sink: &mut dyn ObservationSink,
    ) {
        match self.phase {
            DecodePhase::Data => {
                self.accept_data(byte, store);
                return;
            }
            DecodePhase::Cmd => self.accept_command(byte, now, sink),
            DecodePhase::Addr => {
                self.address = ((self.address << 8) | u32::from(byte)) & ADDRESS_MASK;
            }
            DecodePhase::Dummy | DecodePhase::Idle => {}
        }

        self.phase_count += 1;
        if phase_bytes(self.phase).is_some_and(|len| self.phase_count >= len) {
            self.phase_count = 0;
            self.advance_phase(now, store, sink);
        }
    }

    fn accept_command(&mut self, byte: u8, now: u64, sink: &mut dyn ObservationSink) {
        let command = HostCommand::classify(byte);
        self.command = Some(command);
        if command.is_unknown() {
            debug!(step = now, host = ?self.host, opcode = byte, "unrecognized host opcode");
            sink.on_event(RouterEvent::Anomaly {
                kind: Anomaly::UnknownHostOpcode,
                step: now,
            });
        }
    }

    fn advance_phase(
        &mut self,
        now: u64,
        store: &mut dyn TargetStore,
        sink: &mut dyn ObservationSink,
    ) {
        match self.phase {
            DecodePhase::Cmd => self.phase = DecodePhase::Addr,
            DecodePhase::Addr => {
                self.resolve_route(now, sink);
                if self.command.is_some_and(HostCommand::has_dummy_byte) {
                    self.phase = DecodePhase::Dummy;
                } else {
                    self.enter_data(store);
                }
            }
            DecodePhase::Dummy => self.enter_data(store),
            DecodePhase::Idle | DecodePhase::Data => {}
        }
    }

    fn resolve_route(&mut self, now: u64, sink: &mut dyn ObservationSink) {
        let is_read = self.command.is_some_and(HostCommand::is_read);
        let decision = resolve(is_read, self.address, &self.routing);
        self.route = Some(decision);
        self.start_address = Some(self.address);
        self.return_path.freeze(decision.target);

        debug!(
            step = now,
            host = ?self.host,
            address = self.address,
            target = ?decision.target,
            matched_range = ?decision.matched_range,
            "route resolved"
        );
        sink.on_event(RouterEvent::RouteResolved {
            host: self.host,
            address: self.address,
            decision,
            step: now,
        });
    }

    fn enter_data(&mut self, store: &dyn TargetStore) {
        self.phase = DecodePhase::Data;
        if self.command.is_some_and(HostCommand::is_read) {
            self.load_response(store);
        }
    }

    fn load_response(&mut self, store: &dyn TargetStore) {
        self.outbound = self
            .return_path
            .fetch(store, self.address)
            .map(ShiftOut::load);
    }

    fn accept_data(&mut self, byte: u8, store: &mut dyn TargetStore) {
        let (Some(command), Some(route)) = (self.command, self.route) else {
            return;
        };

        if command.is_read() {
            if let Some(outbound) = self.outbound {
                self.payload.push(outbound.byte());
            }
        } else {
            if command.commits_data() {
                store.set(route.target, self.address, byte);
            }
            self.payload.push(byte);
        }

        self.address = self.address.wrapping_add(1) & ADDRESS_MASK;
        if command.is_read() {
            self.load_response(store);
        }
    }

    fn close(&mut self, now: u64, sink: &mut dyn ObservationSink) {
        if self.inbound.is_partial() {
            sink.on_event(RouterEvent::Anomaly {
                kind: Anomaly::PartialByteDiscarded,
                step: now,
            });
        }
        if self.route.is_none() {
            sink.on_event(RouterEvent::Anomaly {
                kind: Anomaly::TransactionAborted,
                step: now,
            });
        }

        let transaction = Transaction {
            host: self.host,
            opcode: self.command.map(HostCommand::opcode),
            address: self.start_address,
            target: self.route.map(|route| route.target),
            payload: std::mem::take(&mut self.payload),
            direction: Direction::of(self.command),
            opened_at: self.opened_at,
            closed_at: now,
        };
        trace!(step = now, host = ?self.host, %transaction, "transaction closed");

        if let (Some(opcode), Some(address), Some(target)) =
            (transaction.opcode, transaction.address, transaction.target)
        {
            sink.on_event(RouterEvent::TargetAccess(TargetRecord {
                target,
                opcode,
                address,
                payload: transaction.payload.clone(),
            }));
        }
        sink.on_event(RouterEvent::TransactionClosed(transaction));

        self.reset();
    }
}
