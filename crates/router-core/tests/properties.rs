//! Randomized checks of whole-router behavior over the pins.

#![allow(clippy::pedantic, clippy::nursery)]

mod common;

use common::{Bench, MODE_SHARE, REG_CONTROL};
use proptest::prelude::*;
use router_core::{
    default_fill, resolve_target, HostId, Target, TargetStore, ADDRESS_MASK, OPCODE_READ,
    REGISTER_COUNT,
};
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use serde_json as _;
use thiserror as _;
use tracing as _;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn written_bytes_read_back(
        address in 0..=ADDRESS_MASK,
        data in prop::collection::vec(any::<u8>(), 1..5),
    ) {
        let mut bench = Bench::new();
        bench.write(HostId::A, address, &data);
        prop_assert_eq!(
            bench.store.read_block(Target::Main, address, data.len()),
            data.clone()
        );
        prop_assert_eq!(bench.read(HostId::A, OPCODE_READ, address, data.len()), data);
    }

    #[test]
    fn control_writes_read_back_masked(value in any::<u8>()) {
        let mut bench = Bench::new();
        bench.write_register(REG_CONTROL, value);
        let first = bench.read_register(REG_CONTROL);
        bench.write_register(REG_CONTROL, value);
        prop_assert_eq!(first, value & 0x7F);
        prop_assert_eq!(bench.read_register(REG_CONTROL), first);
    }

    #[test]
    fn unmapped_registers_read_sentinel(addr in (REGISTER_COUNT as u8)..=u8::MAX) {
        let mut bench = Bench::new();
        prop_assert_eq!(bench.read_register(addr), 0xFF);
    }

    #[test]
    fn router_follows_route_model(
        control in 0_u8..0x40,
        starts in any::<[u16; 2]>(),
        lengths in any::<[u16; 2]>(),
        address in 0_u32..0x2_0000,
    ) {
        let mut bench = Bench::new();
        bench.write_register(REG_CONTROL, control | MODE_SHARE);
        for (index, (start, len)) in (0_u8..).zip(starts.into_iter().zip(lengths)) {
            let start = u32::from(start);
            bench.set_range(index, start, start + u32::from(len));
        }

        let expected = resolve_target(true, address, &bench.router.routing_config());
        let data = bench.read(HostId::A, OPCODE_READ, address, 1);

        prop_assert_eq!(bench.last_closed().target, Some(expected));
        prop_assert_eq!(bench.store.get(expected, address), data[0]);
        prop_assert_eq!(data, vec![default_fill(expected, address)]);
    }
}
