//! Inline serial-bus router core: two hosts, two storage targets, and a
//! runtime-configurable routing engine.

/// Error types for explicit-construction APIs.
pub mod error;
pub use error::RouterError;

/// Observable, non-fatal anomaly taxonomy.
pub mod anomaly;
pub use anomaly::Anomaly;

/// Saturating anomaly counters.
pub mod diag;
pub use diag::DiagCounters;

/// Host and management opcode tables.
pub mod opcode;
pub use opcode::{
    HostCommand, MgmtCommand, HOST_OPCODE_TABLE, OPCODE_FAST_READ, OPCODE_READ, OPCODE_WRITE,
};

/// Fixed step constants and decode-phase lengths.
pub mod timing;
pub use timing::{
    phase_bytes, DecodePhase, BITS_PER_BYTE, CONFIG_PROPAGATION_STEPS, PHASE_BYTE_TABLE,
    SYNC_SETTLE_STEPS,
};

/// Pin sampling, synchronizers, and the configuration crossing register.
pub mod sync;
pub use sync::{CrossingRegister, SampledPins, SpiPins, Synchronizer};

/// MSB-first serial shift registers.
pub mod shift;
pub use shift::{ShiftIn, ShiftOut};

/// Configuration register file, map, and field layouts.
pub mod registers;
pub use registers::{
    ConfigRegisterFile, ControlState, HostId, RegisterId, RegisterWrite, RouteMode, Target,
    REGISTER_COUNT,
};

/// Priority route resolution.
pub mod route;
pub use route::{
    default_target, resolve, resolve_target, RangeConfig, RouteDecision, RoutingConfig,
    ADDRESS_MASK, RANGE_COUNT,
};

/// Backing-store contract and a sparse reference store.
pub mod store;
pub use store::{default_fill, FlatStore, TargetStore};

/// Response sourcing from the frozen target.
pub mod return_path;
pub use return_path::ReturnPath;

/// Safe-switch latch, host arbiter, and target multiplexer.
pub mod switch;
pub use switch::{ArbiterUpdate, HostArbiter, SafeSwitch, SwitchUpdate, TargetMux, TargetSelect};

/// Reconstructed transaction records.
pub mod transaction;
pub use transaction::{Direction, TargetRecord, Transaction};

/// Public embedding contracts and observation hook.
pub mod api;
pub use api::{
    DownstreamPins, NullSink, ObservationSink, RouterConfig, RouterEvent, RouterInputs,
    RouterOutputs, RouterStatus, DEFAULT_IDLE_RESPONSE_LEVEL,
};

/// Per-port bit-level transaction decoder.
pub mod decoder;
pub use decoder::TransactionDecoder;

/// Management channel protocol engine.
pub mod mgmt;
pub use mgmt::ManagementPort;

/// Top-level router composition.
pub mod router;
pub use router::Router;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use serde_json as _;
