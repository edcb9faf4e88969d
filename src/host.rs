//! Host-shell side channel.
//!
//! When the control surface runs embedded in a host shell, it can ask the
//! shell to close it. The shell is reached through an injected
//! [`HostBridge`]; outside a shell, [`NoHostBridge`] stands in and the
//! request comes back as [`ExitOutcome::Unavailable`] so the caller can tell
//! the user instead of failing.
//!
//! Wire shape of the one message defined today:
//!
//! ```json
//! { "type": "exit" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// HostMessage
// ============================================================================

/// Message posted to the host shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Ask the shell to close the application.
    Exit,
}

// ============================================================================
// HostBridge
// ============================================================================

/// Capability for posting messages to the host shell.
pub trait HostBridge {
    /// Posts a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostBridgeUnavailable`] when no shell is listening.
    fn post_message(&self, message: &HostMessage) -> Result<()>;
}

/// Bridge for environments without a host shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostBridge;

impl HostBridge for NoHostBridge {
    fn post_message(&self, _message: &HostMessage) -> Result<()> {
        Err(Error::HostBridgeUnavailable)
    }
}

/// Bridge backed by a tokio channel; the shell holds the receiver.
#[derive(Debug, Clone)]
pub struct ChannelHostBridge {
    tx: mpsc::UnboundedSender<HostMessage>,
}

impl ChannelHostBridge {
    /// Creates a bridge and the receiver the shell listens on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl HostBridge for ChannelHostBridge {
    fn post_message(&self, message: &HostMessage) -> Result<()> {
        self.tx
            .send(*message)
            .map_err(|_| Error::HostBridgeUnavailable)
    }
}

// ============================================================================
// Exit Request
// ============================================================================

/// Result of [`request_exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The shell received the request.
    Posted,
    /// No shell is listening; tell the user.
    Unavailable,
}

/// Asks the host shell to close the application.
///
/// Never fails: a missing shell is an ordinary outcome.
pub fn request_exit(bridge: &dyn HostBridge) -> ExitOutcome {
    match bridge.post_message(&HostMessage::Exit) {
        Ok(()) => {
            info!("Exit requested from host shell");
            ExitOutcome::Posted
        }
        Err(e) => {
            debug!(error = %e, "Exit request not delivered");
            ExitOutcome::Unavailable
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_exit_message_shape() {
        assert_eq!(
            serde_json::to_value(HostMessage::Exit).expect("serialize"),
            json!({ "type": "exit" })
        );
    }

    #[test]
    fn test_no_bridge_is_unavailable() {
        assert_eq!(request_exit(&NoHostBridge), ExitOutcome::Unavailable);
    }

    #[test]
    fn test_channel_bridge_posts() {
        let (bridge, mut rx) = ChannelHostBridge::channel();
        assert_eq!(request_exit(&bridge), ExitOutcome::Posted);
        assert_eq!(rx.try_recv().ok(), Some(HostMessage::Exit));
    }

    #[test]
    fn test_channel_bridge_without_listener() {
        let (bridge, rx) = ChannelHostBridge::channel();
        drop(rx);
        assert_eq!(request_exit(&bridge), ExitOutcome::Unavailable);
    }
}
