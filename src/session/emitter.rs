//! Command emission methods.
//!
//! Every emission is fire-and-forget. Instead of silently succeeding when
//! nothing can be sent, the methods report an [`Emission`] so callers and
//! tests can tell a forwarded command from a dropped one.

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::protocol::Descriptor;
use crate::transport::Transport;

use super::Session;
use super::state::ConnectionState;

// ============================================================================
// Emission
// ============================================================================

/// Outcome of an emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "an emission may have been dropped"]
pub enum Emission {
    /// Handed to the transport.
    Sent,
    /// Not handed to the transport.
    Dropped(DropReason),
}

/// Why an emission was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The session was never started.
    NotReady,
    /// The session was stopped.
    Disposed,
    /// The transport refused the call locally.
    Rejected,
}

impl Emission {
    /// Returns `true` if the transport received the call.
    #[inline]
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Returns `true` if the call was dropped.
    #[inline]
    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

// ============================================================================
// Session - Command Emission
// ============================================================================

impl Session<'_> {
    /// Forwards a UI interaction unchanged.
    ///
    /// Accepts structured descriptors and bare strings alike.
    ///
    /// # Example
    ///
    /// ```ignore
    /// session.emit_ui_interaction(Descriptor::body_paint("Red"));
    /// session.emit_ui_interaction("custom trigger");
    /// ```
    pub fn emit_ui_interaction(&mut self, descriptor: impl Into<Descriptor>) -> Emission {
        let descriptor = descriptor.into();
        self.forward("emitUIInteraction", |transport| {
            transport.emit_ui_interaction(&descriptor)
        })
    }

    /// Forwards a generic command unchanged.
    pub fn emit_command(&mut self, descriptor: impl Into<Descriptor>) -> Emission {
        let descriptor = descriptor.into();
        self.forward("emitCommand", |transport| transport.emit_command(&descriptor))
    }

    /// Sends an engine console command such as `stat fps`.
    pub fn emit_console_command(&mut self, command: &str) -> Emission {
        self.forward("emitConsoleCommand", |transport| {
            transport.emit_console_command(command)
        })
    }

    /// Resumes playback after a user gesture.
    ///
    /// Clears the autoplay flag without touching the connection state, then
    /// asks the transport to play.
    pub fn play(&mut self) -> Emission {
        if self.machine.play() {
            debug!(session_id = %self.id, "Autoplay gate cleared");
        }
        self.forward("play", |transport| transport.play())
    }

    /// Asks the transport to open its connection.
    ///
    /// Only needed when the session was started without `AutoConnect`; on a
    /// transport that is already connecting or connected it does nothing.
    pub fn connect(&mut self) -> Emission {
        self.forward("connect", |transport| transport.connect())
    }

    /// Runs `call` against the transport, or reports why it could not.
    fn forward<F>(&mut self, operation: &'static str, call: F) -> Emission
    where
        F: FnOnce(&mut dyn Transport) -> Result<()>,
    {
        let Some(transport) = self.transport.as_deref_mut() else {
            let reason = match self.machine.state() {
                ConnectionState::Disposed => DropReason::Disposed,
                _ => DropReason::NotReady,
            };
            trace!(session_id = %self.id, operation, ?reason, "Emission dropped");
            return Emission::Dropped(reason);
        };

        match call(transport) {
            Ok(()) => {
                trace!(session_id = %self.id, operation, "Emission sent");
                Emission::Sent
            }
            Err(e) => {
                warn!(session_id = %self.id, operation, error = %e, "Transport rejected emission");
                Emission::Dropped(DropReason::Rejected)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
