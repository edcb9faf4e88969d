//! Session lifecycle state machine.
//!
//! ```text
//!  Idle ──start──► Connecting ──videoInitialized──► VideoInitialized
//!                      │                                  │
//!                      └──────────webRtcConnected─────────┴──► Connected
//!
//!  any live state ──webRtcFailed──► Failed
//!  any state      ──stop─────────► Disposed
//! ```
//!
//! `Failed` and `Disposed` never lead back to `Connecting`. The
//! `autoplay_blocked` flag is orthogonal: `playStreamRejected` sets it in any
//! state short of `Disposed`, and only an explicit `play()` clears it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::protocol::LifecycleEvent;

// ============================================================================
// ConnectionState
// ============================================================================

/// Connection lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Not started; no transport exists.
    #[default]
    Idle,
    /// Transport created, waiting for the stream.
    Connecting,
    /// Video element initialized.
    VideoInitialized,
    /// Peer connection established.
    Connected,
    /// Peer connection failed. Terminal until stopped.
    Failed,
    /// Torn down. Terminal.
    Disposed,
}

impl ConnectionState {
    /// Returns a stable name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::VideoInitialized => "videoInitialized",
            Self::Connected => "connected",
            Self::Failed => "failed",
            Self::Disposed => "disposed",
        }
    }

    /// Returns `true` for states no event can leave.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Disposed)
    }

    /// Returns `true` while the connection is still progressing.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Connecting | Self::VideoInitialized)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Transition
// ============================================================================

/// A state change produced by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before.
    pub from: ConnectionState,
    /// State after.
    pub to: ConnectionState,
}

// ============================================================================
// SessionStatus
// ============================================================================

/// Snapshot of a session's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    /// Connection lifecycle state.
    pub state: ConnectionState,
    /// Autoplay was refused and awaits a user gesture.
    pub autoplay_blocked: bool,
}

impl SessionStatus {
    /// Returns `true` when the stream is connected and playing.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, ConnectionState::Connected) && !self.autoplay_blocked
    }
}

// ============================================================================
// StateMachine
// ============================================================================

/// Pure state holder driven by lifecycle events.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    status: SessionStatus,
}

impl StateMachine {
    /// Creates a machine in `Idle`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.status.state
    }

    /// Returns the autoplay flag.
    #[inline]
    #[must_use]
    pub const fn autoplay_blocked(&self) -> bool {
        self.status.autoplay_blocked
    }

    /// `Idle → Connecting`. Ignored in every other state.
    pub fn start(&mut self) -> Option<Transition> {
        match self.status.state {
            ConnectionState::Idle => self.move_to(ConnectionState::Connecting),
            _ => None,
        }
    }

    /// Applies a lifecycle event.
    ///
    /// Returns the resulting transition, if the event changed the
    /// connection state.
    pub fn apply(&mut self, event: &LifecycleEvent) -> Option<Transition> {
        use ConnectionState as S;

        let state = self.status.state;
        if state == S::Disposed {
            return None;
        }

        match event {
            LifecycleEvent::VideoInitialized if state == S::Connecting => {
                self.move_to(S::VideoInitialized)
            }
            LifecycleEvent::WebRtcConnected if state.is_pending() => self.move_to(S::Connected),
            LifecycleEvent::WebRtcFailed if !state.is_terminal() => self.move_to(S::Failed),
            LifecycleEvent::PlayStreamRejected => {
                self.status.autoplay_blocked = true;
                None
            }
            _ => None,
        }
    }

    /// Clears the autoplay flag after a user gesture.
    ///
    /// Returns `true` if the flag was set.
    pub fn play(&mut self) -> bool {
        std::mem::replace(&mut self.status.autoplay_blocked, false)
    }

    /// Moves to `Disposed` from any state.
    pub fn dispose(&mut self) -> Option<Transition> {
        self.move_to(ConnectionState::Disposed)
    }

    fn move_to(&mut self, to: ConnectionState) -> Option<Transition> {
        let from = self.status.state;
        if from == to {
            return None;
        }
        self.status.state = to;
        Some(Transition { from, to })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use ConnectionState as S;

    fn connecting() -> StateMachine {
        let mut machine = StateMachine::new();
        machine.start();
        machine
    }

    #[test]
    fn test_starts_idle() {
        let machine = StateMachine::new();
        assert_eq!(machine.state(), S::Idle);
        assert!(!machine.autoplay_blocked());
    }

    #[test]
    fn test_happy_path() {
        let mut machine = StateMachine::new();
        assert_eq!(
            machine.start(),
            Some(Transition {
                from: S::Idle,
                to: S::Connecting
            })
        );
        machine.apply(&LifecycleEvent::VideoInitialized);
        assert_eq!(machine.state(), S::VideoInitialized);
        machine.apply(&LifecycleEvent::WebRtcConnected);
        assert_eq!(machine.state(), S::Connected);
        assert!(machine.status().is_active());
    }

    #[test]
    fn test_connected_directly_from_connecting() {
        let mut machine = connecting();
        machine.apply(&LifecycleEvent::WebRtcConnected);
        assert_eq!(machine.state(), S::Connected);
    }

    #[test]
    fn test_video_initialized_after_connected_is_ignored() {
        let mut machine = connecting();
        machine.apply(&LifecycleEvent::WebRtcConnected);
        assert_eq!(machine.apply(&LifecycleEvent::VideoInitialized), None);
        assert_eq!(machine.state(), S::Connected);
    }

    #[test]
    fn test_events_before_start_do_not_progress() {
        let mut machine = StateMachine::new();
        machine.apply(&LifecycleEvent::VideoInitialized);
        machine.apply(&LifecycleEvent::WebRtcConnected);
        assert_eq!(machine.state(), S::Idle);
    }

    #[test]
    fn test_failed_from_any_live_state() {
        for setup in [
            vec![],
            vec![LifecycleEvent::VideoInitialized],
            vec![LifecycleEvent::VideoInitialized, LifecycleEvent::WebRtcConnected],
        ] {
            let mut machine = connecting();
            for event in &setup {
                machine.apply(event);
            }
            machine.apply(&LifecycleEvent::WebRtcFailed);
            assert_eq!(machine.state(), S::Failed, "after {setup:?}");
        }
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut machine = connecting();
        machine.apply(&LifecycleEvent::WebRtcFailed);
        machine.apply(&LifecycleEvent::VideoInitialized);
        machine.apply(&LifecycleEvent::WebRtcConnected);
        assert_eq!(machine.start(), None);
        assert_eq!(machine.state(), S::Failed);
    }

    #[test]
    fn test_dispose_from_failed() {
        let mut machine = connecting();
        machine.apply(&LifecycleEvent::WebRtcFailed);
        assert_eq!(
            machine.dispose(),
            Some(Transition {
                from: S::Failed,
                to: S::Disposed
            })
        );
    }

    #[test]
    fn test_dispose_is_terminal_and_idempotent() {
        let mut machine = connecting();
        assert!(machine.dispose().is_some());
        assert!(machine.dispose().is_none());
        machine.apply(&LifecycleEvent::WebRtcConnected);
        machine.apply(&LifecycleEvent::PlayStreamRejected);
        assert_eq!(machine.start(), None);
        assert_eq!(machine.state(), S::Disposed);
        assert!(!machine.autoplay_blocked());
    }

    #[test]
    fn test_autoplay_independent_of_connection() {
        let mut machine = connecting();
        machine.apply(&LifecycleEvent::VideoInitialized);
        machine.apply(&LifecycleEvent::PlayStreamRejected);

        assert!(machine.autoplay_blocked());
        assert_eq!(machine.state(), S::VideoInitialized);

        machine.apply(&LifecycleEvent::WebRtcConnected);
        assert!(machine.autoplay_blocked());
        assert!(!machine.status().is_active());

        assert!(machine.play());
        assert!(!machine.autoplay_blocked());
        assert_eq!(machine.state(), S::Connected);
        assert!(!machine.play());
    }

    #[test]
    fn test_autoplay_can_block_in_failed() {
        let mut machine = connecting();
        machine.apply(&LifecycleEvent::WebRtcFailed);
        machine.apply(&LifecycleEvent::PlayStreamRejected);
        assert!(machine.autoplay_blocked());
    }

    #[test]
    fn test_unknown_events_ignored() {
        let mut machine = connecting();
        assert_eq!(
            machine.apply(&LifecycleEvent::Other("dataChannelOpen".into())),
            None
        );
        assert_eq!(machine.state(), S::Connecting);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(S::VideoInitialized.to_string(), "videoInitialized");
        assert!(S::Failed.is_terminal());
        assert!(!S::Connected.is_terminal());
    }
}
