//! Error types for the stream session controller.
//!
//! Most runtime conditions in a session are absorbed locally: teardown never
//! fails and commands without a live transport are dropped, not rejected.
//! Errors therefore surface mainly while configuring and starting a session,
//! and from the transports themselves.
//!
//! # Usage
//!
//! ```ignore
//! use pixelstream_control::{Result, SessionConfig};
//!
//! fn load(json: &str) -> Result<SessionConfig> {
//!     let config = SessionConfig::from_json(json)?;
//!     config.validate()?;
//!     Ok(config)
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Connection | [`Error::ConnectionClosed`], [`Error::NotConnected`], [`Error::WebSocket`] |
//! | Transport | [`Error::Transport`] |
//! | Host | [`Error::HostBridgeUnavailable`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a session configuration cannot be used.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Signaling server URL is malformed or uses an unsupported scheme.
    #[error("Invalid signaling URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection already closed.
    ///
    /// Returned by a transport asked to disconnect twice, or to send after
    /// its event loop stopped.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Transport exists but its connection is not open yet.
    ///
    /// Commands are never queued, so sending in this window is rejected.
    #[error("Not connected")]
    NotConnected,

    /// The relay WebSocket handshake or stream failed.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// A transport rejected an operation.
    #[error("Transport error in {operation}: {message}")]
    Transport {
        /// Name of the transport operation.
        operation: String,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// No host message channel is available.
    #[error("Host bridge unavailable")]
    HostBridgeUnavailable,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidUrl { .. })
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::NotConnected | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
