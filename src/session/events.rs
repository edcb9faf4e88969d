//! Listener registration and event dispatch.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::protocol::{LifecycleEvent, TransportEvent};

use super::Session;
use super::state::ConnectionState;

// ============================================================================
// Session - Listeners
// ============================================================================

impl Session<'_> {
    /// Registers a listener for a lifecycle tag.
    ///
    /// Listeners accumulate and are never removed. Registering the same tag
    /// twice makes both listeners fire.
    ///
    /// # Example
    ///
    /// ```ignore
    /// session.add_event_listener(LifecycleEvent::WebRtcFailed, |_| {
    ///     eprintln!("stream failed");
    /// });
    /// session.add_event_listener("dataChannelOpen", |event| {
    ///     println!("{event}");
    /// });
    /// ```
    pub fn add_event_listener<F>(&mut self, tag: impl Into<LifecycleEvent>, listener: F)
    where
        F: FnMut(&LifecycleEvent) + Send + 'static,
    {
        self.registry.add_event_listener(tag, listener);
    }

    /// Registers a listener for messages the remote application sends on
    /// `channel`.
    ///
    /// Channels are independent of lifecycle tags.
    pub fn add_response_event_listener<F>(&mut self, channel: impl Into<String>, listener: F)
    where
        F: FnMut(&Value) + Send + 'static,
    {
        self.registry.add_response_event_listener(channel, listener);
    }

    /// Returns the number of listeners registered for a lifecycle tag.
    #[must_use]
    pub fn listener_count(&self, tag: &LifecycleEvent) -> usize {
        self.registry.listener_count(tag)
    }

    /// Returns the number of listeners registered for a response channel.
    #[must_use]
    pub fn response_listener_count(&self, channel: &str) -> usize {
        self.registry.response_listener_count(channel)
    }
}

// ============================================================================
// Session - Dispatch
// ============================================================================

impl Session<'_> {
    /// Dispatches one transport event.
    ///
    /// Lifecycle events update the state machine first, then reach the
    /// registered listeners in order. Response events go straight to their
    /// channel's listeners. Nothing is delivered once the session is
    /// disposed.
    ///
    /// Returns `true` if the event was delivered.
    pub fn dispatch(&mut self, event: TransportEvent) -> bool {
        if self.machine.state() == ConnectionState::Disposed {
            trace!(session_id = %self.id, "Event after dispose ignored");
            return false;
        }

        match event {
            TransportEvent::Lifecycle(event) => {
                let event = LifecycleEvent::from_tag(event.as_str());
                self.apply_lifecycle(&event);
                let fired = self.registry.fire_event(&event);
                trace!(session_id = %self.id, event = %event, listeners = fired, "Lifecycle event dispatched");
            }
            TransportEvent::Response { channel, payload } => {
                let fired = self.registry.fire_response(&channel, &payload);
                trace!(session_id = %self.id, channel = %channel, listeners = fired, "Response dispatched");
            }
        }

        true
    }

    /// Dispatches every event queued so far without waiting.
    ///
    /// Returns the number of events delivered.
    pub fn pump_events(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.events.as_mut().and_then(|queue| queue.try_next()) {
            if self.dispatch(event) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Waits for the next transport event and dispatches it.
    ///
    /// Returns `false` once the session has no queue left to wait on, either
    /// because it never started, was stopped, or its transport went away.
    pub async fn process_next_event(&mut self) -> bool {
        let Some(queue) = self.events.as_mut() else {
            return false;
        };

        match queue.next().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => {
                debug!(session_id = %self.id, "Event queue closed");
                self.events = None;
                false
            }
        }
    }

    /// Feeds a lifecycle event to the state machine and logs the outcome.
    fn apply_lifecycle(&mut self, event: &LifecycleEvent) {
        let was_blocked = self.machine.autoplay_blocked();

        if let Some(transition) = self.machine.apply(event) {
            match transition.to {
                ConnectionState::Failed => {
                    warn!(session_id = %self.id, from = %transition.from, "Stream connection failed");
                }
                to => {
                    info!(session_id = %self.id, from = %transition.from, to = %to, "Connection state changed");
                }
            }
        }

        if !was_blocked && self.machine.autoplay_blocked() {
            info!(session_id = %self.id, "Autoplay blocked, waiting for user gesture");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
