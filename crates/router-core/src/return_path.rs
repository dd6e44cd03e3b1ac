//! Response sourcing for the active host.

use crate::{Target, TargetStore};

/// Selects which target's bytes are relayed back to the host.
///
/// The selection is frozen once per transaction, when the route is resolved.
/// Only the frozen target is ever read; the other target's output is never
/// consulted or merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReturnPath {
    selected: Option<Target>,
}

impl ReturnPath {
    /// Creates a return path with no target selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Freezes `target` as the response source for the open transaction.
    pub const fn freeze(&mut self, target: Target) {
        self.selected = Some(target);
    }

    /// Fetches one response byte from the frozen target.
    #[must_use]
    pub fn fetch(&self, store: &dyn TargetStore, address: u32) -> Option<u8> {
        self.selected.map(|target| store.get(target, address))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct ReadLog {
        reads: RefCell<Vec<Target>>,
    }

    impl TargetStore for ReadLog {
        fn get(&self, target: Target, address: u32) -> u8 {
            self.reads.borrow_mut().push(target);
            crate::default_fill(target, address)
        }

        fn set(&mut self, _target: Target, _address: u32, _value: u8) {}
    }

    #[test]
    fn nothing_is_read_before_freeze() {
        let store = ReadLog::default();
        let path = ReturnPath::new();
        assert_eq!(path.fetch(&store, 0x10), None);
        assert!(store.reads.borrow().is_empty());
    }

    #[test]
    fn only_frozen_target_is_read() {
        let store = ReadLog::default();
        let mut path = ReturnPath::new();
        path.freeze(Target::Secondary);

        assert_eq!(path.fetch(&store, 0x10), Some(0xEF));
        assert_eq!(path.fetch(&store, 0x11), Some(0xEE));
        assert_eq!(*store.reads.borrow(), vec![Target::Secondary; 2]);
    }
}
