//! Pin-level sampling: one-step synchronizers, edge detection, and the
//! register that carries committed configuration into the routing domain.

/// Raw levels of one serial port's inbound lines.
///
/// `chip_select` is `true` while the select line is asserted, independent of
/// the electrical polarity of the real line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpiPins {
    /// Select asserted.
    pub chip_select: bool,
    /// Serial clock level.
    pub sclk: bool,
    /// Controller-out data level.
    pub mosi: bool,
}

impl SpiPins {
    /// Deasserted, clock low, data low.
    pub const IDLE: Self = Self {
        chip_select: false,
        sclk: false,
        mosi: false,
    };
}

/// Settled levels for the current step together with the prior step's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SampledPins {
    /// Settled levels for this step.
    pub level: SpiPins,
    /// Settled levels from the previous step.
    pub previous: SpiPins,
}

impl SampledPins {
    /// Sample of a port whose lines have been idle for at least two steps.
    pub const IDLE: Self = Self {
        level: SpiPins::IDLE,
        previous: SpiPins::IDLE,
    };

    /// Select is asserted this step.
    #[must_use]
    pub const fn selected(&self) -> bool {
        self.level.chip_select
    }

    /// Select went from deasserted to asserted.
    #[must_use]
    pub const fn select_asserted(&self) -> bool {
        self.level.chip_select && !self.previous.chip_select
    }

    /// Select went from asserted to deasserted.
    #[must_use]
    pub const fn select_released(&self) -> bool {
        !self.level.chip_select && self.previous.chip_select
    }

    /// Clock rising edge; inbound bits are sampled here.
    #[must_use]
    pub const fn sclk_rising(&self) -> bool {
        self.level.sclk && !self.previous.sclk
    }

    /// Clock falling edge; outbound bits advance here.
    #[must_use]
    pub const fn sclk_falling(&self) -> bool {
        !self.level.sclk && self.previous.sclk
    }

    /// Settled data-in level.
    #[must_use]
    pub const fn mosi(&self) -> bool {
        self.level.mosi
    }
}

/// Metastability guard modeled as a fixed one-step settle delay.
///
/// A raw level presented at step `t` becomes the settled level at step `t + 1`;
/// edges are only ever detected between settled levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Synchronizer {
    stage: SpiPins,
    settled: SpiPins,
}

impl Synchronizer {
    /// Creates a synchronizer with all lines idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: SpiPins::IDLE,
            settled: SpiPins::IDLE,
        }
    }

    /// Advances one step with this step's raw levels.
    pub const fn sample(&mut self, raw: SpiPins) -> SampledPins {
        let previous = self.settled;
        self.settled = self.stage;
        self.stage = raw;
        SampledPins {
            level: self.settled,
            previous,
        }
    }

    /// Current settled levels.
    #[must_use]
    pub const fn settled(&self) -> SpiPins {
        self.settled
    }

    /// Returns all lines to idle.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Single-entry register carrying a value across the update-domain boundary.
///
/// A value loaded during step `t` is what [`CrossingRegister::visible`]
/// returns throughout step `t + 1`. Every load is observed; nothing is
/// coalesced because each step loads exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrossingRegister<T: Copy> {
    visible: T,
}

impl<T: Copy> CrossingRegister<T> {
    /// Creates the register holding `initial`.
    #[must_use]
    pub const fn new(initial: T) -> Self {
        Self { visible: initial }
    }

    /// Value committed by the previous step.
    #[must_use]
    pub const fn visible(&self) -> T {
        self.visible
    }

    /// Latches `value` for the next step.
    #[allow(clippy::missing_const_for_fn)]
    pub fn load(&mut self, value: T) {
        self.visible = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT: SpiPins = SpiPins {
        chip_select: true,
        sclk: false,
        mosi: false,
    };

    #[test]
    fn raw_levels_settle_after_one_step() {
        let mut sync = Synchronizer::new();

        let first = sync.sample(SELECT);
        assert!(!first.selected());

        let second = sync.sample(SELECT);
        assert!(second.selected());
        assert!(second.select_asserted());

        let third = sync.sample(SELECT);
        assert!(third.selected());
        assert!(!third.select_asserted());
    }

    #[test]
    fn clock_edges_are_detected_on_settled_levels() {
        let mut sync = Synchronizer::new();
        let high = SpiPins {
            sclk: true,
            ..SELECT
        };

        sync.sample(SELECT);
        sync.sample(high);
        let rising = sync.sample(high);
        assert!(rising.sclk_rising());
        assert!(!rising.sclk_falling());

        sync.sample(SELECT);
        let falling = sync.sample(SELECT);
        assert!(falling.sclk_falling());
    }

    #[test]
    fn release_is_reported_once() {
        let mut sync = Synchronizer::new();
        sync.sample(SELECT);
        sync.sample(SELECT);
        sync.sample(SpiPins::IDLE);
        let released = sync.sample(SpiPins::IDLE);
        assert!(released.select_released());
        assert!(!sync.sample(SpiPins::IDLE).select_released());
    }

    #[test]
    fn reset_drops_in_flight_levels() {
        let mut sync = Synchronizer::new();
        sync.sample(SELECT);
        sync.reset();
        assert_eq!(sync.settled(), SpiPins::IDLE);
        assert!(!sync.sample(SpiPins::IDLE).selected());
    }

    #[test]
    fn crossing_register_exposes_last_load() {
        let mut reg = CrossingRegister::new(0_u8);
        assert_eq!(reg.visible(), 0);
        reg.load(5);
        assert_eq!(reg.visible(), 5);
        reg.load(6);
        assert_eq!(reg.visible(), 6);
    }
}
