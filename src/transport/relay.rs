//! WebSocket relay transport.
//!
//! Speaks the JSON envelope from [`crate::protocol::message`] to the
//! signaling endpoint named by the session configuration. The socket lives
//! in a tokio task, so the factory needs a runtime handle; the transport
//! itself stays synchronous and never blocks.
//!
//! With `AutoConnect` the socket is dialed when the transport is built;
//! without it the link stays idle until [`Transport::connect`]. The first
//! frame on every open socket carries the session's player settings.
//!
//! Emissions made before the handshake completes are rejected with
//! [`Error::NotConnected`]. They are never queued for later delivery.

// ============================================================================
// Imports
// ============================================================================

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::{Descriptor, OutboundMessage};
use crate::session::{RenderTarget, SessionConfig};

use super::connection::{Connection, LinkState};
use super::{EventSender, Transport, TransportFactory};

// ============================================================================
// RelayTransport
// ============================================================================

/// Transport backed by a relay WebSocket.
#[derive(Debug)]
pub struct RelayTransport {
    connection: Connection,
    surface: String,
}

impl RelayTransport {
    /// Spawns the relay link for `config` on `runtime`.
    ///
    /// Returns immediately. The socket is dialed at once when
    /// `config.auto_connect` is set, and on [`Transport::connect`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for an unusable signaling URL.
    pub fn new(
        runtime: &Handle,
        config: &SessionConfig,
        surface: impl Into<String>,
        events: EventSender,
    ) -> Result<Self> {
        let url = config.signaling_url()?;
        let surface = surface.into();
        let settings = config.initial_settings();

        if config.auto_connect {
            info!(url = %url, surface = %surface, "Dialing relay");
        } else {
            info!(url = %url, surface = %surface, "Relay idle until connect");
        }
        debug!(settings = %settings, "Relay settings");

        Ok(Self {
            connection: Connection::spawn(runtime, url, settings, config.auto_connect, events),
            surface,
        })
    }

    /// Returns the current link state.
    #[inline]
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.connection.state()
    }

    /// Returns `true` while the socket is open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.connection.is_open()
    }

    /// Returns the surface the transport renders into.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &str {
        &self.surface
    }
}

impl Transport for RelayTransport {
    fn emit_ui_interaction(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.connection.send(&OutboundMessage::UiInteraction {
            descriptor: descriptor.clone(),
        })
    }

    fn emit_command(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.connection.send(&OutboundMessage::Command {
            descriptor: descriptor.clone(),
        })
    }

    fn play(&mut self) -> Result<()> {
        self.connection.send(&OutboundMessage::Play)
    }

    fn connect(&mut self) -> Result<()> {
        self.connection.connect()
    }

    fn disconnect(&mut self) -> Result<()> {
        self.connection.shutdown()
    }
}

// ============================================================================
// RelayTransportFactory
// ============================================================================

/// Builds [`RelayTransport`]s on a tokio runtime.
#[derive(Debug, Clone)]
pub struct RelayTransportFactory {
    runtime: Handle,
}

impl RelayTransportFactory {
    /// Creates a factory bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when called outside a runtime.
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|_| Error::config("relay transport requires a tokio runtime"))?;
        Ok(Self { runtime })
    }

    /// Creates a factory bound to an explicit runtime.
    #[inline]
    #[must_use]
    pub fn with_handle(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl TransportFactory for RelayTransportFactory {
    fn create(
        &self,
        config: &SessionConfig,
        target: &dyn RenderTarget,
        events: EventSender,
    ) -> Result<Box<dyn Transport>> {
        Ok(Box::new(RelayTransport::new(
            &self.runtime,
            config,
            target.surface_id(),
            events,
        )?))
    }
}

// ============================================================================
// Tests
// ============================================================================
