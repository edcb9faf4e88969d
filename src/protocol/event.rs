//! Events raised by a transport toward the session.
//!
//! Two kinds of inbound traffic exist, with separate listener namespaces:
//!
//! | Kind | Keyed by | Example |
//! |------|----------|---------|
//! | Lifecycle | [`LifecycleEvent`] tag | `webRtcConnected` |
//! | Response | channel name | `logListener` |

// ============================================================================
// Imports
// ============================================================================

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// LifecycleEvent
// ============================================================================

/// Connection lifecycle signal raised by a transport.
///
/// Unknown tags are preserved in [`LifecycleEvent::Other`] so listeners can
/// still subscribe to events this crate does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleEvent {
    /// Video element initialized (`videoInitialized`).
    VideoInitialized,

    /// Peer connection established (`webRtcConnected`).
    WebRtcConnected,

    /// Peer connection failed (`webRtcFailed`). Terminal.
    WebRtcFailed,

    /// Autoplay refused by the host's media policy (`playStreamRejected`).
    PlayStreamRejected,

    /// Any other tag.
    Other(String),
}

impl LifecycleEvent {
    /// Returns the wire tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::VideoInitialized => "videoInitialized",
            Self::WebRtcConnected => "webRtcConnected",
            Self::WebRtcFailed => "webRtcFailed",
            Self::PlayStreamRejected => "playStreamRejected",
            Self::Other(tag) => tag,
        }
    }

    /// Parses a wire tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "videoInitialized" => Self::VideoInitialized,
            "webRtcConnected" => Self::WebRtcConnected,
            "webRtcFailed" => Self::WebRtcFailed,
            "playStreamRejected" => Self::PlayStreamRejected,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

impl From<&str> for LifecycleEvent {
    #[inline]
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

impl From<String> for LifecycleEvent {
    #[inline]
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<LifecycleEvent> for String {
    #[inline]
    fn from(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

// ============================================================================
// TransportEvent
// ============================================================================

/// Anything a transport delivers to its session.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection lifecycle signal.
    Lifecycle(LifecycleEvent),

    /// Application message pushed by the remote process on a named channel.
    Response {
        /// Channel name (e.g. `logListener`).
        channel: String,
        /// Arbitrary payload.
        payload: Value,
    },
}

impl TransportEvent {
    /// Creates a response event.
    #[inline]
    #[must_use]
    pub fn response(channel: impl Into<String>, payload: Value) -> Self {
        Self::Response {
            channel: channel.into(),
            payload,
        }
    }
}

impl From<LifecycleEvent> for TransportEvent {
    #[inline]
    fn from(event: LifecycleEvent) -> Self {
        Self::Lifecycle(event)
    }
}

// ============================================================================
// Tests
// ============================================================================
