//! Protocol message types.
//!
//! This module defines what travels between the local controller and the
//! remote application.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Descriptor`] | Local → Remote | UI interaction / command payload |
//! | [`LifecycleEvent`] | Remote → Local | Connection state signal |
//! | [`TransportEvent::Response`] | Remote → Local | Application message on a channel |
//! | [`OutboundMessage`] / [`InboundMessage`] | Both | Relay envelope over WebSocket |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `descriptor` | Command descriptor shapes and presets |
//! | `event` | Lifecycle and response events |
//! | `message` | Relay envelope |

// ============================================================================
// Submodules
// ============================================================================

/// Command descriptor shapes.
pub mod descriptor;

/// Inbound event types.
pub mod event;

/// Relay envelope types.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use descriptor::{CarConfig, Descriptor, Interaction};
pub use event::{LifecycleEvent, TransportEvent};
pub use message::{InboundMessage, OutboundMessage};
