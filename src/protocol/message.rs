//! Relay envelope exchanged over the signaling WebSocket.
//!
//! # Format
//!
//! Outbound (local → remote):
//! ```json
//! { "type": "settings", "settings": { "AutoPlayVideo": true, "StartVideoMuted": true, "HoveringMouse": true } }
//! { "type": "uiInteraction", "descriptor": { "CarConfig": { "Part": "Rims", "Value": "Rally" } } }
//! { "type": "command", "descriptor": { "ConsoleCommand": "stat fps" } }
//! { "type": "play" }
//! ```
//!
//! Inbound (remote → local):
//! ```json
//! { "type": "event", "event": "webRtcConnected" }
//! { "type": "response", "channel": "logListener", "data": "Level loaded" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Descriptor, LifecycleEvent, TransportEvent};

// ============================================================================
// OutboundMessage
// ============================================================================

/// A frame sent from the controller to the remote end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// UI interaction with an unmodified descriptor.
    UiInteraction {
        /// Payload forwarded as-is.
        descriptor: Descriptor,
    },

    /// Generic command (console commands travel here, wrapped).
    Command {
        /// Payload forwarded as-is.
        descriptor: Descriptor,
    },

    /// User-initiated playback request.
    Play,

    /// Player settings, sent once as the first frame after the handshake.
    Settings {
        /// Wire-keyed settings object.
        settings: Value,
    },
}

impl OutboundMessage {
    /// Returns the operation name used in logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::UiInteraction { .. } => "emitUIInteraction",
            Self::Command { .. } => "emitCommand",
            Self::Play => "play",
            Self::Settings { .. } => "settings",
        }
    }
}

// ============================================================================
// InboundMessage
// ============================================================================

/// A frame received from the remote end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Lifecycle signal.
    Event {
        /// Event tag.
        event: LifecycleEvent,
    },

    /// Application message on a named channel.
    Response {
        /// Channel name.
        channel: String,
        /// Payload, `null` when absent.
        #[serde(default)]
        data: Value,
    },
}

impl From<InboundMessage> for TransportEvent {
    fn from(message: InboundMessage) -> Self {
        match message {
            InboundMessage::Event { event } => Self::Lifecycle(event),
            InboundMessage::Response { channel, data } => Self::Response {
                channel,
                payload: data,
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
