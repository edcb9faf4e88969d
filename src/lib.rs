//! Pixel Streaming Control - session controller for remote-controlled
//! streamed applications.
//!
//! A local control surface issues structured commands to a remote process,
//! observes its connection lifecycle, and receives its asynchronous
//! responses. This crate owns that exchange for one session at a time.
//!
//! # Architecture
//!
//! - **Session**: owns one transport, borrows one render target, runs the
//!   lifecycle state machine and the listener registry
//! - **Transport**: opaque capability that emits commands and raises events
//!   (a WebSocket relay, or a logging mock)
//!
//! Key design principles:
//!
//! - Transports never call into the session; their events are queued and
//!   dispatched when the host pumps the session
//! - Listeners registered during start see every event, including those the
//!   transport raised while being built
//! - Emissions report whether they reached the transport ([`Emission`])
//! - Teardown is idempotent and runs on drop
//!
//! # Quick Start
//!
//! ```
//! use pixelstream_control::{
//!     ConnectionState, Descriptor, LifecycleEvent, MockTransportFactory, Result,
//!     Session, SessionConfig, TracingSink, VideoSurface,
//! };
//!
//! fn main() -> Result<()> {
//!     let config = SessionConfig::from_json(r#"{ "AutoConnect": true, "ss": "ws://127.0.0.1:80" }"#)?;
//!     let surface = VideoSurface::new("streamingVideo");
//!     let factory = MockTransportFactory::new(TracingSink);
//!
//!     let mut session = Session::start(config, &surface, &factory, |session| {
//!         session.add_event_listener(LifecycleEvent::WebRtcFailed, |_| {
//!             eprintln!("stream failed");
//!         });
//!     })?;
//!
//!     if let Some(remote) = factory.remote() {
//!         remote.fire(LifecycleEvent::VideoInitialized);
//!         remote.fire(LifecycleEvent::WebRtcConnected);
//!     }
//!     session.pump_events();
//!     assert_eq!(session.state(), ConnectionState::Connected);
//!
//!     assert!(session.emit_ui_interaction(Descriptor::body_paint("Red")).is_sent());
//!     assert!(session.emit_console_command("stat fps").is_sent());
//!     session.stop();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Host-shell exit bridge |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`log`] | Log sinks and the event log |
//! | [`protocol`] | Descriptors, lifecycle events, relay envelope |
//! | [`session`] | [`Session`], its state machine and registry |
//! | [`transport`] | Transport contract, relay and mock transports |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host-shell side channel.
pub mod host;

/// Type-safe identifiers.
pub mod identifiers;

/// Log sinks for transport operations.
pub mod log;

/// Command descriptors, lifecycle events and the relay wire format.
pub mod protocol;

/// Session controller.
///
/// - [`Session`] - one controller instance
/// - [`SessionConfig`] - start-up settings
/// - [`ConnectionState`] - lifecycle state
pub mod session;

/// Transport contract and implementations.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Host bridge
pub use host::{ChannelHostBridge, ExitOutcome, HostBridge, HostMessage, NoHostBridge, request_exit};

// Identifier types
pub use identifiers::SessionId;

// Log types
pub use log::{EventLog, LogEntry, LogPayload, LogRecord, LogSink, RecordingSink, TracingSink};

// Protocol types
pub use protocol::{CarConfig, Descriptor, Interaction, LifecycleEvent, TransportEvent};

// Session types
pub use session::{
    ConnectionState, DropReason, Emission, RenderTarget, Session, SessionConfig, SessionStatus,
    VideoSurface,
};

// Transport types
pub use transport::{
    EventQueue, EventSender, MockRemote, MockTransport, MockTransportFactory, RelayTransport,
    RelayTransportFactory, Transport, TransportFactory, event_channel,
};
