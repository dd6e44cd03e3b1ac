//! Management channel protocol engine.
//!
//! Each chip-select window carries exactly one operation:
//! `0x02 addr data` writes a register, `0x03 addr dummy` reads one, with the
//! data byte shifted out while the dummy byte is clocked in. Bytes after the
//! operation completes are ignored until release.

use tracing::trace;

use crate::registers::{ConfigRegisterFile, RegisterWrite};
use crate::shift::{ShiftIn, ShiftOut};
use crate::{Anomaly, MgmtCommand, ObservationSink, RouterEvent, SpiPins, Synchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum MgmtPhase {
    #[default]
    Idle,
    Opcode,
    Address,
    Data,
    Response,
    Done,
}

/// Management port with its own input synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManagementPort {
    sync: Synchronizer,
    phase: MgmtPhase,
    inbound: ShiftIn,
    command: Option<MgmtCommand>,
    address: u8,
    outbound: Option<ShiftOut>,
}

impl ManagementPort {
    /// Creates an idle port.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sync: Synchronizer::new(),
            phase: MgmtPhase::Idle,
            inbound: ShiftIn::new(),
            command: None,
            address: 0,
            outbound: None,
        }
    }

    /// Returns `true` while a chip-select window is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != MgmtPhase::Idle
    }

    /// Advances one step with this step's raw management pins.
    ///
    /// `status` is the status register value a read in this step returns.
    /// Returns the response bit while a read byte is shifted out.
    pub fn step(
        &mut self,
        raw: SpiPins,
        now: u64,
        status: u8,
        registers: &mut ConfigRegisterFile,
        sink: &mut dyn ObservationSink,
    ) -> Option<bool> {
        let pins = self.sync.sample(raw);

        if !pins.selected() {
            if self.is_active() {
                self.end_window(now, sink);
            }
            return None;
        }

        if !self.is_active() {
            self.phase = MgmtPhase::Opcode;
        }

        if pins.sclk_rising() {
            if let Some(byte) = self.inbound.push(pins.mosi()) {
                self.accept_byte(byte, now, status, registers, sink);
            }
        } else if pins.sclk_falling() {
            if let Some(outbound) = self.outbound.as_mut() {
                outbound.advance_to(self.inbound.bits());
            }
        }

        self.outbound.as_ref().map(ShiftOut::bit)
    }

    /// Returns to idle, dropping any operation in flight.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }

    fn accept_byte(
        &mut self,
        byte: u8,
        now: u64,
        status: u8,
        registers: &mut ConfigRegisterFile,
        sink: &mut dyn ObservationSink,
    ) {
        match self.phase {
            MgmtPhase::Opcode => match MgmtCommand::classify(byte) {
                MgmtCommand::Other(opcode) => {
                    trace!(step = now, opcode, "unrecognized management opcode");
                    sink.on_event(RouterEvent::Anomaly {
                        kind: Anomaly::UnknownManagementOpcode,
                        step: now,
                    });
                    self.phase = MgmtPhase::Done;
                }
                command => {
                    self.command = Some(command);
                    self.phase = MgmtPhase::Address;
                }
            },
            MgmtPhase::Address => {
                self.address = byte;
                if self.command == Some(MgmtCommand::Read) {
                    self.outbound = Some(ShiftOut::load(registers.read(byte, status)));
                    self.phase = MgmtPhase::Response;
                } else {
                    self.phase = MgmtPhase::Data;
                }
            }
            MgmtPhase::Data => {
                self.commit_write(byte, now, registers, sink);
                self.phase = MgmtPhase::Done;
            }
            MgmtPhase::Response => {
                self.outbound = None;
                self.phase = MgmtPhase::Done;
            }
            MgmtPhase::Idle | MgmtPhase::Done => {}
        }
    }

    fn commit_write(
        &self,
        value: u8,
        now: u64,
        registers: &mut ConfigRegisterFile,
        sink: &mut dyn ObservationSink,
    ) {
        match registers.write(self.address, value) {
            RegisterWrite::Applied { value, .. } => {
                trace!(step = now, address = self.address, value, "register committed");
                sink.on_event(RouterEvent::RegisterCommitted {
                    address: self.address,
                    value,
                    step: now,
                });
            }
            RegisterWrite::Dropped => {
                trace!(step = now, address = self.address, value, "register write dropped");
                sink.on_event(RouterEvent::Anomaly {
                    kind: Anomaly::RegisterWriteDropped,
                    step: now,
                });
            }
        }
    }

    fn end_window(&mut self, now: u64, sink: &mut dyn ObservationSink) {
        if self.inbound.is_partial() {
            sink.on_event(RouterEvent::Anomaly {
                kind: Anomaly::PartialByteDiscarded,
                step: now,
            });
        }
        let sync = self.sync;
        *self = Self::new();
        self.sync = sync;
    }
}
