//! Session controller.
//!
//! A [`Session`] binds one transport to one render target and mediates every
//! interaction between the host and the remote application.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`SessionConfig`] and the signaling URL |
//! | `core` | Construction, teardown, accessors |
//! | `emitter` | Command emission and playback |
//! | `events` | Listener registration and dispatch |
//! | `registry` | Listener storage |
//! | `state` | Lifecycle state machine |
//! | `target` | [`RenderTarget`] abstraction |

// ============================================================================
// Submodules
// ============================================================================

mod config;
mod core;
mod emitter;
mod events;
mod registry;
mod state;
mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{DEFAULT_SIGNALING_URL, SessionConfig};
pub use self::core::Session;
pub use emitter::{DropReason, Emission};
pub use registry::{LifecycleListener, ListenerRegistry, ResponseListener};
pub use state::{ConnectionState, SessionStatus, StateMachine, Transition};
pub use target::{RenderTarget, VideoSurface};
