//! Transport capability layer.
//!
//! A [`Transport`] is the opaque handle through which a session reaches the
//! remote application: it emits commands, requests playback, disconnects,
//! and raises events. The session never looks inside it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  connect / emit / play / …  ┌──────────────────┐
//! │     Session      │────────────────────────────►│    Transport     │
//! │                  │                             │  (relay / mock)  │
//! │  EventQueue  ◄───┼──────── EventSender ────────┤                  │
//! └──────────────────┘    TransportEvent frames    └──────────────────┘
//! ```
//!
//! Events never call back into the session directly. They are queued and
//! dispatched when the host pumps the session, on the host's own thread.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket event loop for the relay transport |
//! | `mock` | Logging transport for protocol verification |
//! | `relay` | WebSocket relay transport and its factory |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// Logging stand-in transport.
pub mod mock;

/// WebSocket relay transport.
pub mod relay;

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;

use crate::error::Result;
use crate::protocol::{Descriptor, TransportEvent};
use crate::session::{RenderTarget, SessionConfig};

// ============================================================================
// Re-exports
// ============================================================================

pub use mock::{MockRemote, MockTransport, MockTransportFactory};
pub use relay::{RelayTransport, RelayTransportFactory};

// ============================================================================
// Transport
// ============================================================================

/// Command emission capability owned by a session.
///
/// All operations are fire-and-forget. An `Err` means the transport refused
/// the call locally; it says nothing about remote delivery.
pub trait Transport: Send {
    /// Forwards a UI-interaction descriptor unchanged.
    fn emit_ui_interaction(&mut self, descriptor: &Descriptor) -> Result<()>;

    /// Forwards a generic command descriptor unchanged.
    fn emit_command(&mut self, descriptor: &Descriptor) -> Result<()>;

    /// Sends an engine console command.
    ///
    /// The default wraps `command` as `{"ConsoleCommand": command}` and
    /// forwards it through [`Transport::emit_command`].
    fn emit_console_command(&mut self, command: &str) -> Result<()> {
        self.emit_command(&Descriptor::console_command(command))
    }

    /// Starts playback after a user gesture.
    fn play(&mut self) -> Result<()>;

    /// Opens the connection when the session was started without
    /// auto-connect. A transport that is already connecting or connected
    /// returns `Ok(())`.
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Tears down the connection.
    ///
    /// May fail when the connection is already gone.
    fn disconnect(&mut self) -> Result<()>;
}

// ============================================================================
// TransportFactory
// ============================================================================

/// Builds a transport bound to a render target.
pub trait TransportFactory {
    /// Creates the transport for a starting session.
    ///
    /// `events` is the only channel back to the session; the transport may
    /// start raising events immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be constructed.
    fn create(
        &self,
        config: &SessionConfig,
        target: &dyn RenderTarget,
        events: EventSender,
    ) -> Result<Box<dyn Transport>>;
}

// ============================================================================
// Event Channel
// ============================================================================

/// Creates a connected sender/queue pair.
#[must_use]
pub fn event_channel() -> (EventSender, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventQueue { rx })
}

/// Transport-side handle for raising events.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl EventSender {
    /// Raises an event.
    ///
    /// Returns `false` when the session is gone and the event was discarded.
    pub fn send(&self, event: impl Into<TransportEvent>) -> bool {
        self.tx.send(event.into()).is_ok()
    }

    /// Returns `true` if the receiving session has been dropped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Session-side queue of events awaiting dispatch.
#[derive(Debug)]
pub struct EventQueue {
    rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl EventQueue {
    /// Takes the next queued event without waiting.
    #[inline]
    pub fn try_next(&mut self) -> Option<TransportEvent> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once every sender is dropped and the queue is empty.
    pub async fn next(&mut self) -> Option<TransportEvent> {
        self.rx.recv().await
    }

    /// Stops accepting events and discards anything still queued.
    pub fn close(&mut self) {
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::LifecycleEvent;

    #[test]
    fn test_queue_preserves_order() {
        let (sender, mut queue) = event_channel();
        assert!(sender.send(LifecycleEvent::VideoInitialized));
        assert!(sender.send(LifecycleEvent::WebRtcConnected));

        assert_eq!(
            queue.try_next(),
            Some(TransportEvent::Lifecycle(LifecycleEvent::VideoInitialized))
        );
        assert_eq!(
            queue.try_next(),
            Some(TransportEvent::Lifecycle(LifecycleEvent::WebRtcConnected))
        );
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn test_close_discards_and_rejects() {
        let (sender, mut queue) = event_channel();
        sender.send(LifecycleEvent::VideoInitialized);
        queue.close();

        assert!(queue.try_next().is_none());
        assert!(!sender.send(LifecycleEvent::WebRtcConnected));
        assert!(sender.is_closed());
    }

    #[test]
    fn test_send_after_queue_dropped() {
        let (sender, queue) = event_channel();
        drop(queue);
        assert!(!sender.send(LifecycleEvent::WebRtcFailed));
    }

    #[tokio::test]
    async fn test_next_waits_for_event() {
        let (sender, mut queue) = event_channel();
        tokio::spawn(async move {
            sender.send(TransportEvent::response("logListener", "hi".into()));
        });
        assert_eq!(
            queue.next().await,
            Some(TransportEvent::response("logListener", "hi".into()))
        );
    }
}
