//! Session struct, construction and teardown.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::{debug, info};

use crate::error::Result;
use crate::identifiers::SessionId;
use crate::transport::{EventQueue, Transport, TransportFactory, event_channel};

use super::config::SessionConfig;
use super::registry::ListenerRegistry;
use super::state::{ConnectionState, SessionStatus, StateMachine};
use super::target::RenderTarget;

// ============================================================================
// Session
// ============================================================================

/// One controller instance bound to one transport and one render target.
///
/// The session owns its transport exclusively and releases it exactly once,
/// on [`Session::stop`] or on drop. The render target is only borrowed, so
/// the compiler guarantees it outlives the session.
///
/// # Example
///
/// ```
/// use pixelstream_control::{
///     ConnectionState, Descriptor, LifecycleEvent, MockTransportFactory, RecordingSink,
///     Session, SessionConfig, VideoSurface,
/// };
///
/// let surface = VideoSurface::new("streamingVideo");
/// let sink = RecordingSink::new();
/// let factory = MockTransportFactory::new(sink.clone());
///
/// let mut session = Session::start(
///     SessionConfig::new().with_auto_connect(true),
///     &surface,
///     &factory,
///     |session| {
///         session.add_event_listener(LifecycleEvent::WebRtcConnected, |_| {
///             println!("connected");
///         });
///     },
/// )
/// .expect("session starts");
///
/// factory.remote().expect("transport created").fire(LifecycleEvent::WebRtcConnected);
/// session.pump_events();
/// assert_eq!(session.state(), ConnectionState::Connected);
///
/// assert!(session.emit_ui_interaction(Descriptor::body_paint("Red")).is_sent());
/// session.stop();
/// ```
pub struct Session<'t> {
    /// Identity of this session.
    pub(crate) id: SessionId,
    /// Configuration snapshot.
    pub(crate) config: SessionConfig,
    /// Lifecycle state.
    pub(crate) machine: StateMachine,
    /// Lifecycle and response listeners.
    pub(crate) registry: ListenerRegistry,
    /// Exclusively owned transport, `None` before start and after stop.
    pub(crate) transport: Option<Box<dyn Transport>>,
    /// Events raised by the transport, awaiting dispatch.
    pub(crate) events: Option<EventQueue>,
    /// Caller-owned surface.
    pub(crate) render_target: Option<&'t dyn RenderTarget>,
}

// ============================================================================
// Session - Display
// ============================================================================

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.machine.state())
            .field("autoplay_blocked", &self.machine.autoplay_blocked())
            .field("has_transport", &self.transport.is_some())
            .field("render_target", &self.render_target)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Session - Lifecycle
// ============================================================================

impl<'t> Session<'t> {
    /// Creates a session that has not been started.
    ///
    /// It stays in [`ConnectionState::Idle`] with no transport; every
    /// emission on it is dropped as not ready.
    #[must_use]
    pub fn idle(config: SessionConfig) -> Self {
        let id = SessionId::generate();
        debug!(session_id = %id, "Idle session created");

        Self {
            id,
            config,
            machine: StateMachine::new(),
            registry: ListenerRegistry::new(),
            transport: None,
            events: None,
            render_target: None,
        }
    }

    /// Starts a session.
    ///
    /// Builds the transport bound to `render_target`, enters
    /// [`ConnectionState::Connecting`], then runs `on_ready` before
    /// returning. Autoplay rejection is handled by the session itself ahead
    /// of any listener.
    ///
    /// Events the transport raises during construction stay queued until
    /// the session is pumped, so listeners registered in `on_ready` see
    /// every event.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`](crate::Error::InvalidUrl) if the signaling URL is unusable
    /// - any error returned by the factory
    pub fn start<F>(
        config: SessionConfig,
        render_target: &'t dyn RenderTarget,
        factory: &dyn TransportFactory,
        on_ready: F,
    ) -> Result<Self>
    where
        F: FnOnce(&mut Session<'t>),
    {
        config.validate()?;

        let mut session = Self::idle(config);
        let (sender, queue) = event_channel();
        let transport = factory.create(&session.config, render_target, sender)?;

        session.transport = Some(transport);
        session.events = Some(queue);
        session.render_target = Some(render_target);
        session.machine.start();

        info!(
            session_id = %session.id,
            surface = render_target.surface_id(),
            url = %session.config.signaling_server_url,
            "Session started"
        );

        on_ready(&mut session);
        Ok(session)
    }

    /// Tears the session down.
    ///
    /// Disconnects the transport exactly once and discards any error it
    /// reports, then drops every registered listener. Safe in every state,
    /// repeated calls are no-ops.
    pub fn stop(&mut self) {
        if self.machine.state() == ConnectionState::Disposed {
            return;
        }

        if let Some(mut transport) = self.transport.take()
            && let Err(e) = transport.disconnect()
        {
            debug!(session_id = %self.id, error = %e, "Disconnect error discarded");
        }

        if let Some(mut events) = self.events.take() {
            events.close();
        }

        self.registry.clear();
        self.render_target = None;
        self.machine.dispose();
        info!(session_id = %self.id, "Session stopped");
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Session - Accessors
// ============================================================================

impl<'t> Session<'t> {
    /// Returns the session ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the configuration snapshot.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    /// Returns `true` while autoplay awaits a user gesture.
    #[inline]
    #[must_use]
    pub fn autoplay_blocked(&self) -> bool {
        self.machine.autoplay_blocked()
    }

    /// Returns a snapshot of the observable state.
    #[inline]
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.machine.status()
    }

    /// Returns `true` while a transport is held.
    #[inline]
    #[must_use]
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Returns the borrowed render target, until the session stops.
    #[inline]
    #[must_use]
    pub fn render_target(&self) -> Option<&'t dyn RenderTarget> {
        self.render_target
    }
}

// ============================================================================
// Tests
// ============================================================================
