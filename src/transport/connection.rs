//! WebSocket connection and event loop.
//!
//! The relay transport dials the signaling endpoint from a tokio task. The
//! task owns the socket for its whole life and talks to the rest of the
//! crate through two channels:
//!
//! - commands in (`Connect`, `Send`, `Shutdown`) from the [`Connection`] handle
//! - [`TransportEvent`]s out, through the session's [`EventSender`]
//!
//! The first frame written after the handshake is always the player
//! settings object.
//!
//! # Link States
//!
//! | State | Entered when | `send` returns |
//! |-------|--------------|----------------|
//! | `Idle` | spawned without auto-connect | [`Error::NotConnected`] |
//! | `Connecting` | spawned with auto-connect, or [`Connection::connect`] | [`Error::NotConnected`] |
//! | `Open` | handshake completed | `Ok(())` |
//! | `Closed` | shutdown, remote close, or connect failure | [`Error::ConnectionClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, from_str, to_string};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{InboundMessage, LifecycleEvent, OutboundMessage, TransportEvent};

use super::EventSender;

// ============================================================================
// Constants
// ============================================================================

/// Time allowed for the WebSocket handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// LinkState
// ============================================================================

/// Lifecycle of the underlying socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    /// Not dialed yet; waiting for an explicit connect.
    Idle = 0,
    /// Handshake in progress.
    Connecting = 1,
    /// Socket open.
    Open = 2,
    /// Socket gone, for whatever reason.
    Closed = 3,
}

impl LinkState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Connecting,
            2 => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Link state shared between the handle and the event loop.
#[derive(Debug)]
struct SharedLink(AtomicU8);

impl SharedLink {
    fn new(initial: LinkState) -> Self {
        Self(AtomicU8::new(initial as u8))
    }

    fn get(&self) -> LinkState {
        LinkState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn advance(&self, from: LinkState, to: LinkState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Moves from `Idle` to `Connecting`. Returns `true` on success.
    fn dial(&self) -> bool {
        self.advance(LinkState::Idle, LinkState::Connecting)
    }

    /// Moves to `Open` unless already closed. Returns `true` on success.
    fn open(&self) -> bool {
        self.advance(LinkState::Connecting, LinkState::Open)
    }

    /// Moves to `Closed`. Returns the previous state.
    fn close(&self) -> LinkState {
        LinkState::from_u8(self.0.swap(LinkState::Closed as u8, Ordering::AcqRel))
    }
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Start dialing an idle link.
    Connect,
    /// Write a serialized frame.
    Send(String),
    /// Close the socket and stop.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to a relay WebSocket driven by a background task.
///
/// Dropping the handle closes the command channel, which also stops the
/// task.
#[derive(Debug)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Link state (shared with event loop).
    link: Arc<SharedLink>,
}

impl Connection {
    /// Spawns the event loop on `runtime`.
    ///
    /// With `auto_connect` the task dials `url` at once; otherwise the link
    /// stays `Idle` until [`Connection::connect`]. Returns immediately.
    /// `settings` is written as the first frame once the socket opens.
    /// Lifecycle and response frames are forwarded to `events`; a failed
    /// handshake raises `webRtcFailed`.
    pub fn spawn(
        runtime: &Handle,
        url: Url,
        settings: Value,
        auto_connect: bool,
        events: EventSender,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let initial = if auto_connect {
            LinkState::Connecting
        } else {
            LinkState::Idle
        };
        let link = Arc::new(SharedLink::new(initial));

        runtime.spawn(run_event_loop(
            url,
            settings,
            command_rx,
            Arc::clone(&link),
            events,
        ));

        Self { command_tx, link }
    }

    /// Returns the current link state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.link.get()
    }

    /// Returns `true` while the socket is open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == LinkState::Open
    }

    /// Queues a frame for the event loop.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] before the handshake completes
    /// - [`Error::ConnectionClosed`] after the socket is gone
    /// - [`Error::Json`] if the frame cannot be serialized
    pub fn send(&self, message: &OutboundMessage) -> Result<()> {
        match self.state() {
            LinkState::Idle | LinkState::Connecting => return Err(Error::NotConnected),
            LinkState::Closed => return Err(Error::ConnectionClosed),
            LinkState::Open => {}
        }

        let json = to_string(message)?;
        self.command_tx
            .send(ConnectionCommand::Send(json))
            .map_err(|_| Error::ConnectionClosed)?;

        trace!(operation = message.operation(), "Frame queued");
        Ok(())
    }

    /// Starts dialing an idle link. A link already dialing or open is left
    /// as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] after the socket is gone.
    pub fn connect(&self) -> Result<()> {
        if self.link.dial() {
            self.command_tx
                .send(ConnectionCommand::Connect)
                .map_err(|_| Error::ConnectionClosed)?;
            debug!("Connection dial requested");
            return Ok(());
        }

        match self.state() {
            LinkState::Closed => Err(Error::ConnectionClosed),
            _ => Ok(()),
        }
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if it was already closed.
    pub fn shutdown(&self) -> Result<()> {
        if self.link.close() == LinkState::Closed {
            return Err(Error::ConnectionClosed);
        }

        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
        debug!("Connection shutdown requested");
        Ok(())
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Dials the endpoint, then pumps frames until shutdown or remote close.
async fn run_event_loop(
    url: Url,
    settings: Value,
    mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    link: Arc<SharedLink>,
    events: EventSender,
) {
    let dial = match link.get() {
        LinkState::Idle => wait_for_dial(&mut command_rx).await,
        LinkState::Closed => false,
        LinkState::Connecting | LinkState::Open => true,
    };
    if !dial {
        debug!("Connection closed before dialing");
        return;
    }

    let ws_stream = match timeout(CONNECT_TIMEOUT, connect_async(url.as_str())).await {
        Ok(Ok((stream, _response))) => stream,
        Ok(Err(e)) => {
            let e = Error::from(e);
            warn!(url = %url, error = %e, "Relay connection failed");
            fail(&link, &events);
            return;
        }
        Err(_) => {
            warn!(url = %url, timeout_ms = CONNECT_TIMEOUT.as_millis() as u64, "Relay connection timed out");
            fail(&link, &events);
            return;
        }
    };

    if !link.open() {
        debug!("Connection closed during handshake");
        let (mut ws_write, _) = ws_stream.split();
        let _ = ws_write.close().await;
        return;
    }
    debug!(url = %url, "Relay connection open");

    let (mut ws_write, mut ws_read) = ws_stream.split();
    let mut remote_closed = false;

    match to_string(&OutboundMessage::Settings { settings }) {
        Ok(json) => {
            if let Err(e) = ws_write.send(Message::Text(json.into())).await {
                warn!(error = %e, "Failed to send settings");
            }
        }
        Err(e) => warn!(error = %e, "Failed to serialize settings"),
    }

    loop {
        tokio::select! {
            // Incoming frames from the relay
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        if !handle_incoming_message(&text, &events) {
                            debug!("Session gone, stopping event loop");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!("WebSocket closed by remote");
                        remote_closed = true;
                        break;
                    }

                    Some(Err(e)) => {
                        let e = Error::from(e);
                        error!(error = %e, "Relay stream failed");
                        remote_closed = true;
                        break;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        remote_closed = true;
                        break;
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            // Commands from the transport handle
            command = command_rx.recv() => {
                match command {
                    Some(ConnectionCommand::Send(json)) => {
                        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
                            warn!(error = %e, "Failed to send frame");
                        }
                    }

                    Some(ConnectionCommand::Connect) => {}

                    Some(ConnectionCommand::Shutdown) => {
                        debug!("Shutdown command received");
                        let _ = ws_write.close().await;
                        break;
                    }

                    None => {
                        debug!("Command channel closed");
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }

    // A drop the session did not ask for is a failed stream.
    if link.close() == LinkState::Open && remote_closed {
        events.send(LifecycleEvent::WebRtcFailed);
    }

    debug!("Event loop terminated");
}

/// Waits for `Connect`. Returns `false` on shutdown or a dropped handle.
async fn wait_for_dial(command_rx: &mut mpsc::UnboundedReceiver<ConnectionCommand>) -> bool {
    loop {
        match command_rx.recv().await {
            Some(ConnectionCommand::Connect) => return true,
            Some(ConnectionCommand::Send(_)) => {}
            Some(ConnectionCommand::Shutdown) | None => return false,
        }
    }
}

/// Forwards one text frame. Returns `false` once the session is gone.
fn handle_incoming_message(text: &str, events: &EventSender) -> bool {
    match from_str::<InboundMessage>(text) {
        Ok(message) => events.send(TransportEvent::from(message)),
        Err(e) => {
            warn!(text = %text, error = %e, "Failed to parse incoming frame");
            !events.is_closed()
        }
    }
}

fn fail(link: &SharedLink, events: &EventSender) {
    if link.close() != LinkState::Closed {
        events.send(LifecycleEvent::WebRtcFailed);
    }
}

// ============================================================================
// Tests
// ============================================================================
