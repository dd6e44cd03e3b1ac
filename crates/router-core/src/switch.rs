//! Transaction-safe selection switching for the host arbiter and the target
//! multiplexer.

use crate::{HostId, RouteMode, SpiPins, Target};

/// Outcome of one [`SafeSwitch::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchUpdate<T> {
    /// Requested equals committed; nothing pending.
    Steady,
    /// The requested value took effect.
    Committed {
        /// Value in effect before this step.
        from: T,
        /// Value in effect from now on.
        to: T,
    },
    /// A new request arrived while busy; it is now pending.
    Deferred,
    /// A request is still waiting for idle.
    Waiting,
}

/// Requested/committed/pending latch that only changes at idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SafeSwitch<T> {
    committed: T,
    requested: T,
    pending: bool,
}

impl<T: Copy + PartialEq> SafeSwitch<T> {
    /// Creates a switch committed to `initial`.
    #[must_use]
    pub const fn new(initial: T) -> Self {
        Self {
            committed: initial,
            requested: initial,
            pending: false,
        }
    }

    /// Presents this step's requested value and idle predicate.
    ///
    /// A differing request commits immediately when `idle`, otherwise it is
    /// held pending and the committed value is retained. A request that
    /// returns to the committed value while pending cancels the switch.
    pub fn update(&mut self, requested: T, idle: bool) -> SwitchUpdate<T> {
        self.requested = requested;

        if requested == self.committed {
            self.pending = false;
            return SwitchUpdate::Steady;
        }

        if idle {
            let from = self.committed;
            self.committed = requested;
            self.pending = false;
            return SwitchUpdate::Committed {
                from,
                to: requested,
            };
        }

        if self.pending {
            SwitchUpdate::Waiting
        } else {
            self.pending = true;
            SwitchUpdate::Deferred
        }
    }

    /// Value currently in effect.
    #[must_use]
    pub const fn committed(&self) -> T {
        self.committed
    }

    /// Last requested value.
    #[must_use]
    pub const fn requested(&self) -> T {
        self.requested
    }

    /// A request is waiting for idle.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Result of one arbiter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArbiterUpdate {
    /// Host-select switch outcome.
    pub switch: SwitchUpdate<HostId>,
    /// Both chip-selects became asserted this step.
    pub contention_onset: bool,
}

/// Chooses which host drives the shared downstream bus.
///
/// The grant only changes while both hosts' chip-selects are deasserted.
/// Simultaneous assertion is reported as contention and left unresolved: the
/// granted host keeps the bus and the other continues to see the idle level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostArbiter {
    switch: SafeSwitch<HostId>,
    contention: bool,
}

impl Default for HostArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl HostArbiter {
    /// Creates an arbiter granting `HostA`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            switch: SafeSwitch::new(HostId::A),
            contention: false,
        }
    }

    /// Host currently granted the shared bus.
    #[must_use]
    pub const fn granted(&self) -> HostId {
        self.switch.committed()
    }

    /// Host-select switch waiting for idle.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.switch.is_pending()
    }

    /// Both chip-selects were asserted at the last update.
    #[must_use]
    pub const fn contention(&self) -> bool {
        self.contention
    }

    /// Shared-bus lines driven by the granted host.
    #[must_use]
    pub const fn gate(&self, ports: [SpiPins; 2]) -> SpiPins {
        ports[self.granted().index()]
    }

    /// Advances with the requested host and each host's settled chip-select.
    pub fn update(&mut self, requested: HostId, selects: [bool; 2]) -> ArbiterUpdate {
        let [a, b] = selects;
        let contention = a && b;
        let contention_onset = contention && !self.contention;
        self.contention = contention;

        ArbiterUpdate {
            switch: self.switch.update(requested, !a && !b),
            contention_onset,
        }
    }

    /// Returns to `HostA` with nothing pending.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Which downstream chip-selects the shared bus may drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TargetSelect {
    /// Main only.
    #[default]
    Main,
    /// Secondary only.
    Secondary,
    /// Both targets.
    Both,
}

impl TargetSelect {
    /// Selection implied by a routing mode.
    ///
    /// The reserved encoding selects what its default target would, Main only.
    #[must_use]
    pub const fn from_mode(mode: RouteMode) -> Self {
        match mode {
            RouteMode::Main | RouteMode::Reserved => Self::Main,
            RouteMode::Secondary => Self::Secondary,
            RouteMode::Share => Self::Both,
        }
    }

    /// Returns `true` when `target`'s chip-select is gated through.
    #[must_use]
    pub const fn enables(self, target: Target) -> bool {
        matches!(
            (self, target),
            (Self::Both, _) | (Self::Main, Target::Main) | (Self::Secondary, Target::Secondary)
        )
    }
}

/// Gates the shared bus onto one or both downstream targets.
///
/// The selection only changes while the shared chip-select is deasserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetMux {
    switch: SafeSwitch<TargetSelect>,
}

impl Default for TargetMux {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetMux {
    /// Creates a multiplexer selecting Main only.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            switch: SafeSwitch::new(TargetSelect::Main),
        }
    }

    /// Selection currently in effect.
    #[must_use]
    pub const fn selection(&self) -> TargetSelect {
        self.switch.committed()
    }

    /// Selection switch waiting for idle.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.switch.is_pending()
    }

    /// Downstream chip-selects, indexed by [`Target::index`].
    #[must_use]
    pub const fn chip_selects(&self, shared_select: bool) -> [bool; 2] {
        let selection = self.selection();
        [
            shared_select && selection.enables(Target::Main),
            shared_select && selection.enables(Target::Secondary),
        ]
    }

    /// Advances with the mode-derived selection and the shared chip-select.
    pub fn update(
        &mut self,
        requested: TargetSelect,
        shared_select: bool,
    ) -> SwitchUpdate<TargetSelect> {
        self.switch.update(requested, !shared_select)
    }

    /// Returns to Main only with nothing pending.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_request_commits_immediately() {
        let mut switch = SafeSwitch::new(1_u8);
        assert_eq!(
            switch.update(2, true),
            SwitchUpdate::Committed { from: 1, to: 2 }
        );
        assert_eq!(switch.committed(), 2);
        assert!(!switch.is_pending());
    }

    #[test]
    fn busy_request_waits_then_commits() {
        let mut switch = SafeSwitch::new(1_u8);
        assert_eq!(switch.update(2, false), SwitchUpdate::Deferred);
        assert_eq!(switch.update(2, false), SwitchUpdate::Waiting);
        assert_eq!(switch.committed(), 1);
        assert!(switch.is_pending());
        assert_eq!(switch.requested(), 2);

        assert_eq!(
            switch.update(2, true),
            SwitchUpdate::Committed { from: 1, to: 2 }
        );
        assert!(!switch.is_pending());
    }

    #[test]
    fn withdrawn_request_clears_pending() {
        let mut switch = SafeSwitch::new(1_u8);
        switch.update(2, false);
        assert_eq!(switch.update(1, false), SwitchUpdate::Steady);
        assert!(!switch.is_pending());
        assert_eq!(switch.committed(), 1);
    }

    #[test]
    fn arbiter_waits_for_both_hosts_idle() {
        let mut arbiter = HostArbiter::new();
        let update = arbiter.update(HostId::B, [true, false]);
        assert_eq!(update.switch, SwitchUpdate::Deferred);
        assert_eq!(arbiter.granted(), HostId::A);

        let update = arbiter.update(HostId::B, [false, true]);
        assert_eq!(update.switch, SwitchUpdate::Waiting);
        assert_eq!(arbiter.granted(), HostId::A);

        let update = arbiter.update(HostId::B, [false, false]);
        assert_eq!(
            update.switch,
            SwitchUpdate::Committed {
                from: HostId::A,
                to: HostId::B,
            }
        );
        assert_eq!(arbiter.granted(), HostId::B);
        assert!(!arbiter.is_pending());
    }

    #[test]
    fn contention_is_reported_on_onset_only() {
        let mut arbiter = HostArbiter::new();
        assert!(arbiter.update(HostId::A, [true, true]).contention_onset);
        assert!(arbiter.contention());
        assert!(!arbiter.update(HostId::A, [true, true]).contention_onset);
        assert!(!arbiter.update(HostId::A, [true, false]).contention_onset);
        assert!(!arbiter.contention());
        assert_eq!(arbiter.granted(), HostId::A);
    }

    #[test]
    fn gate_passes_granted_host_lines() {
        let arbiter = HostArbiter::new();
        let a = SpiPins {
            chip_select: true,
            sclk: true,
            mosi: false,
        };
        assert_eq!(arbiter.gate([a, SpiPins::IDLE]), a);
        assert_eq!(arbiter.gate([SpiPins::IDLE, a]), SpiPins::IDLE);
    }

    #[test]
    fn mode_selects_targets() {
        assert_eq!(TargetSelect::from_mode(RouteMode::Main), TargetSelect::Main);
        assert_eq!(
            TargetSelect::from_mode(RouteMode::Secondary),
            TargetSelect::Secondary
        );
        assert_eq!(TargetSelect::from_mode(RouteMode::Share), TargetSelect::Both);
        assert_eq!(TargetSelect::from_mode(RouteMode::Reserved), TargetSelect::Main);
        assert!(TargetSelect::Both.enables(Target::Secondary));
        assert!(!TargetSelect::Main.enables(Target::Secondary));
    }

    #[test]
    fn mux_holds_selection_while_shared_bus_busy() {
        let mut mux = TargetMux::new();
        assert_eq!(mux.chip_selects(true), [true, false]);

        assert_eq!(mux.update(TargetSelect::Both, true), SwitchUpdate::Deferred);
        assert_eq!(mux.chip_selects(true), [true, false]);
        assert!(mux.is_pending());

        mux.update(TargetSelect::Both, false);
        assert_eq!(mux.selection(), TargetSelect::Both);
        assert_eq!(mux.chip_selects(true), [true, true]);
        assert_eq!(mux.chip_selects(false), [false, false]);
    }
}
