use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// State of a framed link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LinkState {
    /// Initial and terminal state; no I/O is attempted.
    Stopped = 0,
    /// The device failed; no I/O until the owner restarts the link.
    Error = 1,
    /// Open and scanning for the next frame header.
    WaitingSync = 2,
    /// A header was accepted and an object body is in flight.
    Functional = 3,
}

impl LinkState {
    /// Whether I/O may be attempted in this state.
    pub fn is_running(self) -> bool {
        matches!(self, LinkState::WaitingSync | LinkState::Functional)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => LinkState::Error,
            2 => LinkState::WaitingSync,
            3 => LinkState::Functional,
            _ => LinkState::Stopped,
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkState::Stopped => "stopped",
            LinkState::Error => "error",
            LinkState::WaitingSync => "waiting-sync",
            LinkState::Functional => "functional",
        };
        f.write_str(name)
    }
}

/// Link state shared between the read and write side of one link.
#[derive(Clone)]
pub(crate) struct SharedLinkState(Arc<AtomicU8>);

impl SharedLinkState {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(LinkState::Stopped as u8)))
    }

    pub(crate) fn load(&self) -> LinkState {
        LinkState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn store(&self, state: LinkState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Move `from -> to` only if the link is still in `from`.
    pub(crate) fn transition(&self, from: LinkState, to: LinkState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Enter `Error` unless the owner already stopped the link.
    pub(crate) fn fail(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (LinkState::from_u8(current) != LinkState::Stopped)
                    .then_some(LinkState::Error as u8)
            });
    }
}

impl fmt::Debug for SharedLinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedLinkState").field(&self.load()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stopped() {
        let link = SharedLinkState::new();
        assert_eq!(link.load(), LinkState::Stopped);
        assert!(!link.load().is_running());
    }

    #[test]
    fn transition_requires_expected_state() {
        let link = SharedLinkState::new();
        link.store(LinkState::WaitingSync);
        assert!(link.transition(LinkState::WaitingSync, LinkState::Functional));
        assert!(!link.transition(LinkState::WaitingSync, LinkState::Functional));
        assert_eq!(link.load(), LinkState::Functional);
    }

    #[test]
    fn failure_does_not_override_stop() {
        let link = SharedLinkState::new();
        link.fail();
        assert_eq!(link.load(), LinkState::Stopped);

        link.store(LinkState::Functional);
        link.fail();
        assert_eq!(link.load(), LinkState::Error);
    }

    #[test]
    fn clones_share_state() {
        let reader = SharedLinkState::new();
        let writer = reader.clone();
        writer.store(LinkState::WaitingSync);
        assert_eq!(reader.load(), LinkState::WaitingSync);
    }

    #[test]
    fn display_names() {
        assert_eq!(LinkState::WaitingSync.to_string(), "waiting-sync");
        assert_eq!(LinkState::Error.to_string(), "error");
    }
}
