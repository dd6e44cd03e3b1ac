//! Deterministic transcript fingerprint used for cross-host comparison.

use proptest as _;
use router_core::registers::REG_CONTROL;
use router_core::{
    FlatStore, HostId, Router, RouterEvent, RouterInputs, SpiPins, Target, OPCODE_FAST_READ,
    OPCODE_READ, OPCODE_WRITE,
};
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use serde_json as _;
use thiserror as _;
use tracing as _;

const HALF: usize = 2;
const MGMT_WRITE: u8 = 0x02;

#[derive(Clone, Copy)]
enum Port {
    Host(HostId),
    Management,
}

struct Driver {
    router: Router,
    store: FlatStore,
    events: Vec<RouterEvent>,
    inputs: RouterInputs,
    hash: u64,
}

impl Driver {
    fn new() -> Self {
        Self {
            router: Router::default(),
            store: FlatStore::new(),
            events: Vec::new(),
            inputs: RouterInputs::IDLE,
            hash: 0xcbf2_9ce4_8422_2325,
        }
    }

    fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            let outputs = self
                .router
                .step(&self.inputs, &mut self.store, &mut self.events);
            let levels = [
                outputs.host_miso[0],
                outputs.host_miso[1],
                outputs.management_miso,
                outputs.downstream.chip_select[0],
                outputs.downstream.chip_select[1],
            ];
            hash_bytes(&mut self.hash, &levels.map(u8::from));
        }
    }

    fn pins(&mut self, port: Port) -> &mut SpiPins {
        match port {
            Port::Host(host) => &mut self.inputs.hosts[host.index()],
            Port::Management => &mut self.inputs.management,
        }
    }

    fn transfer(&mut self, port: Port, bytes: &[u8]) {
        self.pins(port).chip_select = true;
        self.run(HALF * 2);
        for &byte in bytes {
            for bit in (0..8).rev() {
                let pins = self.pins(port);
                pins.sclk = false;
                pins.mosi = (byte >> bit) & 1 != 0;
                self.run(HALF);
                self.pins(port).sclk = true;
                self.run(HALF);
            }
        }
        self.pins(port).sclk = false;
        self.run(HALF);
        *self.pins(port) = SpiPins::IDLE;
        self.run(HALF * 2);
    }
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut driver = Driver::new();

    driver.transfer(Port::Host(HostId::A), &[OPCODE_WRITE, 0x00, 0x10, 0x00, 0xCA, 0xFE]);
    driver.transfer(Port::Management, &[MGMT_WRITE, 0x00, 0x00]);
    driver.transfer(Port::Management, &[MGMT_WRITE, 0x05, 0x20]);
    driver.transfer(Port::Management, &[MGMT_WRITE, REG_CONTROL, 0b0101_0110]);
    driver.transfer(Port::Host(HostId::B), &[OPCODE_READ, 0x00, 0x10, 0x00, 0x00, 0x00]);
    driver.transfer(Port::Host(HostId::B), &[OPCODE_FAST_READ, 0x00, 0x00, 0x20, 0x00, 0x00]);
    driver.transfer(Port::Host(HostId::B), &[0x9F, 0x00]);

    let mut hash = driver.hash;
    for event in &driver.events {
        match event {
            RouterEvent::TransactionClosed(transaction) => {
                hash_bytes(&mut hash, transaction.to_string().as_bytes());
            }
            RouterEvent::TargetAccess(record) => {
                hash_bytes(&mut hash, record.to_string().as_bytes());
            }
            other => hash_bytes(&mut hash, format!("{other:?}").as_bytes()),
        }
    }
    for (address, value) in driver.store.written(Target::Main) {
        hash_bytes(&mut hash, &address.to_le_bytes());
        hash_bytes(&mut hash, &[value]);
    }
    hash_bytes(&mut hash, &[driver.router.status_byte()]);

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
