//! Bit-level SPI mode 0 controller bench shared by the integration suites.
//!
//! Every half clock period lasts [`HALF`] router steps. Response bits are
//! sampled from the last output of the low half, just before the rising edge.

#![allow(dead_code, clippy::pedantic, clippy::nursery)]

use router_core::{
    FlatStore, HostId, RouterEvent, Router, RouterInputs, RouterOutputs, SpiPins, TargetRecord,
    Transaction, OPCODE_WRITE, REGISTER_COUNT,
};

/// Router steps per SCLK half period.
pub const HALF: usize = 3;

/// Management opcode: register write.
pub const MGMT_WRITE: u8 = 0x02;
/// Management opcode: register read.
pub const MGMT_READ: u8 = 0x03;

/// Register addresses used by the suites.
pub const REG_CONTROL: u8 = 0x0C;
pub const REG_STATUS: u8 = 0x0D;

/// Control register field helpers.
pub const MODE_SECONDARY: u8 = 0b01;
pub const MODE_SHARE: u8 = 0b10;
pub const RANGE0_ENABLE: u8 = 1 << 2;
pub const RANGE1_ENABLE: u8 = 1 << 3;
pub const RANGE0_SECONDARY: u8 = 1 << 4;
pub const RANGE1_SECONDARY: u8 = 1 << 5;
pub const ACTIVE_HOST_B: u8 = 1 << 6;

#[derive(Clone, Copy)]
enum Port {
    Host(HostId),
    Management,
}

pub struct Bench {
    pub router: Router,
    pub store: FlatStore,
    pub events: Vec<RouterEvent>,
    pub inputs: RouterInputs,
    pub last: Option<RouterOutputs>,
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}

impl Bench {
    pub fn new() -> Self {
        Self {
            router: Router::default(),
            store: FlatStore::new(),
            events: Vec::new(),
            inputs: RouterInputs::IDLE,
            last: None,
        }
    }

    pub fn tick(&mut self) -> RouterOutputs {
        let outputs = self
            .router
            .step(&self.inputs, &mut self.store, &mut self.events);
        self.last = Some(outputs);
        outputs
    }

    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.tick();
        }
    }

    pub fn outputs(&self) -> RouterOutputs {
        self.last.expect("bench has stepped at least once")
    }

    fn pins(&mut self, port: Port) -> &mut SpiPins {
        match port {
            Port::Host(host) => &mut self.inputs.hosts[host.index()],
            Port::Management => &mut self.inputs.management,
        }
    }

    fn miso(&self, port: Port) -> bool {
        let outputs = self.outputs();
        match port {
            Port::Host(host) => outputs.miso(host),
            Port::Management => outputs.management_miso,
        }
    }

    fn begin(&mut self, port: Port) {
        *self.pins(port) = SpiPins {
            chip_select: true,
            sclk: false,
            mosi: false,
        };
        self.run(HALF * 2);
    }

    fn exchange(&mut self, port: Port, out: u8) -> u8 {
        let mut response = 0_u8;
        for bit in (0..8).rev() {
            let pins = self.pins(port);
            pins.sclk = false;
            pins.mosi = (out >> bit) & 1 != 0;
            self.run(HALF);
            response = (response << 1) | u8::from(self.miso(port));
            self.pins(port).sclk = true;
            self.run(HALF);
        }
        response
    }

    fn end(&mut self, port: Port) {
        self.pins(port).sclk = false;
        self.run(HALF);
        *self.pins(port) = SpiPins::IDLE;
        self.run(HALF * 2);
    }

    fn transfer(&mut self, port: Port, bytes: &[u8]) -> Vec<u8> {
        self.begin(port);
        let responses = bytes.iter().map(|&byte| self.exchange(port, byte)).collect();
        self.end(port);
        responses
    }

    /// Asserts a host's chip-select and lets it settle.
    pub fn host_begin(&mut self, host: HostId) {
        self.begin(Port::Host(host));
    }

    /// Clocks one byte on a host port and returns the response byte.
    pub fn host_byte(&mut self, host: HostId, out: u8) -> u8 {
        self.exchange(Port::Host(host), out)
    }

    /// Returns the clock low and releases a host's chip-select.
    pub fn host_end(&mut self, host: HostId) {
        self.end(Port::Host(host));
    }

    /// Runs one full host chip-select window.
    pub fn host_transfer(&mut self, host: HostId, bytes: &[u8]) -> Vec<u8> {
        self.transfer(Port::Host(host), bytes)
    }

    /// Opens a host window and clocks the command and address bytes.
    pub fn host_header(&mut self, host: HostId, opcode: u8, address: u32) {
        self.host_begin(host);
        for byte in address_bytes(opcode, address) {
            self.host_byte(host, byte);
        }
    }

    /// Reads `len` data bytes with `opcode`, adding the dummy byte for fast read.
    pub fn read(&mut self, host: HostId, opcode: u8, address: u32, len: usize) -> Vec<u8> {
        self.host_header(host, opcode, address);
        if opcode == router_core::OPCODE_FAST_READ {
            self.host_byte(host, 0x00);
        }
        let data = (0..len).map(|_| self.host_byte(host, 0x00)).collect();
        self.host_end(host);
        data
    }

    /// Writes `data` starting at `address`.
    pub fn write(&mut self, host: HostId, address: u32, data: &[u8]) {
        self.host_header(host, OPCODE_WRITE, address);
        for &byte in data {
            self.host_byte(host, byte);
        }
        self.host_end(host);
    }

    /// Asserts the management chip-select and lets it settle.
    pub fn mgmt_begin(&mut self) {
        self.begin(Port::Management);
    }

    /// Clocks one byte on the management port and returns the response byte.
    pub fn mgmt_byte(&mut self, out: u8) -> u8 {
        self.exchange(Port::Management, out)
    }

    /// Returns the clock low and releases the management chip-select.
    pub fn mgmt_end(&mut self) {
        self.end(Port::Management);
    }

    /// Runs one full management chip-select window.
    pub fn mgmt_transfer(&mut self, bytes: &[u8]) -> Vec<u8> {
        self.transfer(Port::Management, bytes)
    }

    pub fn write_register(&mut self, addr: u8, value: u8) {
        self.mgmt_transfer(&[MGMT_WRITE, addr, value]);
    }

    pub fn read_register(&mut self, addr: u8) -> u8 {
        self.mgmt_transfer(&[MGMT_READ, addr, 0x00])[2]
    }

    pub fn read_all_registers(&mut self) -> Vec<u8> {
        (0..REGISTER_COUNT as u8)
            .map(|addr| self.read_register(addr))
            .collect()
    }

    /// Programs both 24-bit boundaries of one range.
    pub fn set_range(&mut self, index: u8, start: u32, end: u32) {
        let base = index * 6;
        for (offset, value) in boundary_bytes(start)
            .into_iter()
            .chain(boundary_bytes(end))
            .enumerate()
        {
            self.write_register(base + offset as u8, value);
        }
    }

    pub fn closed(&self) -> Vec<Transaction> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RouterEvent::TransactionClosed(transaction) => Some(transaction.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn target_records(&self) -> Vec<TargetRecord> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RouterEvent::TargetAccess(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_closed(&self) -> Transaction {
        self.closed()
            .pop()
            .expect("at least one transaction has closed")
    }
}

pub fn boundary_bytes(value: u32) -> [u8; 3] {
    let [_, high, mid, low] = value.to_be_bytes();
    [high, mid, low]
}

pub fn address_bytes(opcode: u8, address: u32) -> [u8; 4] {
    let [high, mid, low] = boundary_bytes(address);
    [opcode, high, mid, low]
}
