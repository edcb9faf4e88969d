//! Logging stand-in transport.
//!
//! [`MockTransport`] honors the full [`Transport`] contract without any
//! network. Every call is reported synchronously to a [`LogSink`] as an
//! `(operation, payload)` pair:
//!
//! | Call | Operation | Payload |
//! |------|-----------|---------|
//! | construction | `System` | text |
//! | `emit_ui_interaction` | `emitUIInteraction` | descriptor, shape preserved |
//! | `emit_command` | `emitCommand` | descriptor, shape preserved |
//! | `emit_console_command` | `emitConsoleCommand` | `{"ConsoleCommand": text}` |
//! | `play` | `play` | text |
//! | `connect` | `connect` | text |
//! | `disconnect` | `disconnect` | text |
//!
//! Tests and demos drive the remote side through a [`MockRemote`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::log::{LogPayload, LogSink};
use crate::protocol::{Descriptor, LifecycleEvent, TransportEvent};
use crate::session::{RenderTarget, SessionConfig};

use super::{EventSender, Transport, TransportFactory};

// ============================================================================
// MockTransport
// ============================================================================

/// Transport that logs every call instead of sending it.
pub struct MockTransport {
    sink: Arc<dyn LogSink>,
    surface: String,
    connected: bool,
    fail_disconnect: bool,
    reject_emissions: bool,
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("surface", &self.surface)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}

impl MockTransport {
    /// Creates a transport bound to `surface` and announces it on the sink.
    pub fn new(sink: Arc<dyn LogSink>, surface: impl Into<String>) -> Self {
        sink.log("System", LogPayload::text("Pixel Streaming wrapper initialized"));
        Self {
            sink,
            surface: surface.into(),
            connected: true,
            fail_disconnect: false,
            reject_emissions: false,
        }
    }

    /// Returns the surface the transport is bound to.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &str {
        &self.surface
    }

    fn check(&self, operation: &str) -> Result<()> {
        if !self.connected {
            return Err(Error::ConnectionClosed);
        }
        if self.reject_emissions {
            return Err(Error::transport(operation, "rejected by mock"));
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn emit_ui_interaction(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.check("emitUIInteraction")?;
        self.sink.log("emitUIInteraction", descriptor.into());
        Ok(())
    }

    fn emit_command(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.check("emitCommand")?;
        self.sink.log("emitCommand", descriptor.into());
        Ok(())
    }

    fn emit_console_command(&mut self, command: &str) -> Result<()> {
        self.check("emitConsoleCommand")?;
        self.sink.log(
            "emitConsoleCommand",
            (&Descriptor::console_command(command)).into(),
        );
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.check("play")?;
        self.sink.log("play", LogPayload::text("Playback requested"));
        Ok(())
    }

    fn connect(&mut self) -> Result<()> {
        self.check("connect")?;
        self.sink.log("connect", LogPayload::text("Connection requested"));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Err(Error::ConnectionClosed);
        }
        self.connected = false;
        self.sink.log("disconnect", LogPayload::text("Stream disconnected"));

        if self.fail_disconnect {
            return Err(Error::transport("disconnect", "teardown failed"));
        }
        Ok(())
    }
}

// ============================================================================
// MockRemote
// ============================================================================

/// Remote side of a [`MockTransport`].
///
/// Raises events toward the session exactly as a real remote application
/// would. Every method returns `false` once the session is gone.
#[derive(Debug, Clone)]
pub struct MockRemote {
    events: EventSender,
}

impl MockRemote {
    /// Raises a lifecycle event.
    pub fn fire(&self, event: impl Into<LifecycleEvent>) -> bool {
        self.events.send(event.into())
    }

    /// Sends a message on a response channel.
    pub fn respond(&self, channel: impl Into<String>, payload: Value) -> bool {
        self.events.send(TransportEvent::response(channel, payload))
    }

    /// Raises an arbitrary transport event.
    pub fn send(&self, event: TransportEvent) -> bool {
        self.events.send(event)
    }
}

// ============================================================================
// MockTransportFactory
// ============================================================================

/// Builds [`MockTransport`]s that share one sink.
///
/// The factory keeps the event sender of the transport it built last, so the
/// caller can act as the remote application through [`Self::remote`].
pub struct MockTransportFactory {
    sink: Arc<dyn LogSink>,
    remote: Mutex<Option<EventSender>>,
    startup_events: Vec<TransportEvent>,
    fail_disconnect: bool,
    reject_emissions: bool,
}

impl fmt::Debug for MockTransportFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransportFactory")
            .field("startup_events", &self.startup_events)
            .field("fail_disconnect", &self.fail_disconnect)
            .field("reject_emissions", &self.reject_emissions)
            .finish_non_exhaustive()
    }
}

impl MockTransportFactory {
    /// Creates a factory logging to `sink`.
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
            remote: Mutex::new(None),
            startup_events: Vec::new(),
            fail_disconnect: false,
            reject_emissions: false,
        }
    }

    /// Events raised by each transport while it is being constructed.
    #[must_use]
    pub fn with_startup_events<I, E>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<TransportEvent>,
    {
        self.startup_events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Makes `disconnect` report an error after tearing down.
    #[must_use]
    pub fn fail_disconnect(mut self, fail: bool) -> Self {
        self.fail_disconnect = fail;
        self
    }

    /// Makes every emission fail locally.
    #[must_use]
    pub fn reject_emissions(mut self, reject: bool) -> Self {
        self.reject_emissions = reject;
        self
    }

    /// Returns the remote side of the most recently built transport.
    #[must_use]
    pub fn remote(&self) -> Option<MockRemote> {
        self.remote
            .lock()
            .clone()
            .map(|events| MockRemote { events })
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(
        &self,
        config: &SessionConfig,
        target: &dyn RenderTarget,
        events: EventSender,
    ) -> Result<Box<dyn Transport>> {
        debug!(
            surface = target.surface_id(),
            settings = %config.initial_settings(),
            "Creating mock transport"
        );

        let mut transport = MockTransport::new(Arc::clone(&self.sink), target.surface_id());
        transport.fail_disconnect = self.fail_disconnect;
        transport.reject_emissions = self.reject_emissions;

        for event in &self.startup_events {
            events.send(event.clone());
        }
        *self.remote.lock() = Some(events);

        Ok(Box::new(transport))
    }
}

// ============================================================================
// Tests
// ============================================================================
