//! Configuration register file reached over the management channel.

/// Control and status register bit layouts.
pub mod control;
/// Register storage, reset, and read/write semantics.
pub mod file;
/// Fixed register address map.
pub mod map;

pub use control::{
    ControlState, HostId, RouteMode, Target, CONTROL_ACTIVE_HOST, CONTROL_MODE_MASK,
    CONTROL_RANGE0_ENABLE, CONTROL_RANGE0_TARGET, CONTROL_RANGE1_ENABLE, CONTROL_RANGE1_TARGET,
    CONTROL_WRITABLE_MASK, STATUS_ACTIVE_HOST, STATUS_CONTENTION, STATUS_HOST_SWITCH_PENDING,
    STATUS_SHARED_BUSY, STATUS_TARGET_SWITCH_PENDING,
};
pub use file::{ConfigRegisterFile, RegisterWrite};
pub use map::{
    RangeBound, RegisterId, REGISTER_COUNT, REGISTER_MAP, REG_CONTROL, REG_RANGE0_END,
    REG_RANGE0_START, REG_RANGE1_END, REG_RANGE1_START, REG_STATUS, UNMAPPED_READ_VALUE,
};
