#![no_main]

use libfuzzer_sys::fuzz_target;
use router_core::{FlatStore, Router, RouterEvent, RouterInputs, SpiPins};

const fn pins(bits: u8) -> SpiPins {
    SpiPins {
        chip_select: bits & 0b001 != 0,
        sclk: bits & 0b010 != 0,
        mosi: bits & 0b100 != 0,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut router = Router::default();
    let mut store = FlatStore::new();
    let mut events: Vec<RouterEvent> = Vec::new();

    for chunk in data.chunks_exact(2) {
        let inputs = RouterInputs {
            hosts: [pins(chunk[0]), pins(chunk[0] >> 3)],
            management: pins(chunk[1]),
            reset: chunk[1] == 0xFF,
        };
        let granted = router.active_host();
        let outputs = router.step(&inputs, &mut store, &mut events);

        assert_eq!(
            outputs.miso(granted.other()),
            router.config().idle_response_level
        );
        if inputs.reset {
            assert_eq!(outputs.downstream.chip_select, [false; 2]);
        }
    }

    for event in &events {
        if let RouterEvent::TransactionClosed(transaction) = event {
            assert!(transaction.closed_at >= transaction.opened_at);
            assert_eq!(transaction.target.is_some(), transaction.address.is_some());
        }
    }
});
