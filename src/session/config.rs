//! Session configuration.
//!
//! Mirrors the initial settings accepted by a pixel streaming frontend. Keys
//! use the wire names so a host can pass its settings object straight
//! through.
//!
//! # Example
//!
//! ```
//! use pixelstream_control::SessionConfig;
//!
//! let config = SessionConfig::from_json(
//!     r#"{ "AutoConnect": true, "ss": "ws://127.0.0.1:80", "StartVideoMuted": true }"#,
//! ).expect("valid json");
//!
//! assert!(config.auto_connect);
//! assert!(config.start_muted);
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Signaling endpoint used when `ss` is not given.
pub const DEFAULT_SIGNALING_URL: &str = "ws://127.0.0.1:80";

// ============================================================================
// SessionConfig
// ============================================================================

/// Immutable snapshot of the options a session was started with.
///
/// Every key is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Connect to the signaling server as soon as the transport exists.
    #[serde(rename = "AutoConnect")]
    pub auto_connect: bool,

    /// Start video playback without a user gesture, if the host allows it.
    #[serde(rename = "AutoPlayVideo")]
    pub auto_play_video: bool,

    /// Signaling server WebSocket URL.
    #[serde(rename = "ss")]
    pub signaling_server_url: String,

    /// Start with audio muted.
    #[serde(rename = "StartVideoMuted")]
    pub start_muted: bool,

    /// Mouse input in hovering mode rather than locked.
    #[serde(rename = "HoveringMouse")]
    pub hovering_mouse: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SessionConfig {
    /// Creates a configuration with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            auto_connect: false,
            auto_play_video: true,
            signaling_server_url: DEFAULT_SIGNALING_URL.to_string(),
            start_muted: false,
            hovering_mouse: false,
        }
    }

    /// Parses a settings object.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not a valid settings object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds from an already-parsed settings value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a known key has the wrong type.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SessionConfig {
    /// Sets auto-connect.
    #[inline]
    #[must_use]
    pub fn with_auto_connect(mut self, enabled: bool) -> Self {
        self.auto_connect = enabled;
        self
    }

    /// Sets video autoplay.
    #[inline]
    #[must_use]
    pub fn with_auto_play_video(mut self, enabled: bool) -> Self {
        self.auto_play_video = enabled;
        self
    }

    /// Sets the signaling server URL.
    #[inline]
    #[must_use]
    pub fn with_signaling_server(mut self, url: impl Into<String>) -> Self {
        self.signaling_server_url = url.into();
        self
    }

    /// Sets muted start.
    #[inline]
    #[must_use]
    pub fn with_start_muted(mut self, enabled: bool) -> Self {
        self.start_muted = enabled;
        self
    }

    /// Sets hovering mouse mode.
    #[inline]
    #[must_use]
    pub fn with_hovering_mouse(mut self, enabled: bool) -> Self {
        self.hovering_mouse = enabled;
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl SessionConfig {
    /// Parses and checks the signaling URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL does not parse, uses a
    /// scheme other than `ws`/`wss`, or has no host.
    pub fn signaling_url(&self) -> Result<Url> {
        let url = Url::parse(&self.signaling_server_url)
            .map_err(|e| Error::invalid_url(&self.signaling_server_url, e.to_string()))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::invalid_url(
                &self.signaling_server_url,
                "scheme must be ws or wss",
            ));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::invalid_url(&self.signaling_server_url, "missing host"));
        }

        Ok(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unusable signaling URL.
    pub fn validate(&self) -> Result<()> {
        self.signaling_url().map(|_| ())
    }

    /// Returns the settings object handed to a transport.
    #[must_use]
    pub fn initial_settings(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
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
    fn test_new_creates_default() {
        let config = SessionConfig::new();
        assert!(!config.auto_connect);
        assert!(config.auto_play_video);
        assert_eq!(config.signaling_server_url, DEFAULT_SIGNALING_URL);
        assert!(!config.start_muted);
        assert!(!config.hovering_mouse);
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let config = SessionConfig::new()
            .with_auto_connect(true)
            .with_auto_play_video(false)
            .with_signaling_server("wss://stream.example.com/signal")
            .with_start_muted(true)
            .with_hovering_mouse(true);

        assert!(config.auto_connect);
        assert!(!config.auto_play_video);
        assert_eq!(config.signaling_server_url, "wss://stream.example.com/signal");
        assert!(config.start_muted);
        assert!(config.hovering_mouse);
    }

    #[test]
    fn test_from_json_wire_keys() {
        let config = SessionConfig::from_json(
            r#"{
                "AutoConnect": true,
                "AutoPlayVideo": true,
                "ss": "ws://127.0.0.1:80",
                "StartVideoMuted": true,
                "HoveringMouse": true
            }"#,
        )
        .expect("parse");

        assert!(config.auto_connect);
        assert!(config.auto_play_video);
        assert_eq!(config.signaling_server_url, "ws://127.0.0.1:80");
        assert!(config.start_muted);
        assert!(config.hovering_mouse);
    }

    #[test]
    fn test_from_json_all_optional() {
        let config = SessionConfig::from_json("{}").expect("parse");
        assert_eq!(config, SessionConfig::new());
    }

    #[test]
    fn test_from_json_ignores_unknown_keys() {
        let config =
            SessionConfig::from_json(r#"{ "AutoConnect": true, "MatchViewportRes": true }"#)
                .expect("parse");
        assert!(config.auto_connect);
    }

    #[test]
    fn test_from_json_wrong_type() {
        let result = SessionConfig::from_json(r#"{ "AutoConnect": "yes" }"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_initial_settings_uses_wire_keys() {
        let settings = SessionConfig::new().with_auto_connect(true).initial_settings();
        assert_eq!(
            settings,
            json!({
                "AutoConnect": true,
                "AutoPlayVideo": true,
                "ss": "ws://127.0.0.1:80",
                "StartVideoMuted": false,
                "HoveringMouse": false
            })
        );
        assert_eq!(
            SessionConfig::from_value(settings).expect("parse"),
            SessionConfig::new().with_auto_connect(true)
        );
    }

    #[test]
    fn test_validate_accepts_ws_and_wss() {
        assert!(SessionConfig::new().validate().is_ok());
        assert!(
            SessionConfig::new()
                .with_signaling_server("wss://stream.example.com:8443/ws")
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_validate_rejects_http_scheme() {
        let err = SessionConfig::new()
            .with_signaling_server("http://127.0.0.1:80")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert!(err.to_string().contains("ws or wss"));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let result = SessionConfig::new()
            .with_signaling_server("not a url")
            .validate();
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }
}
