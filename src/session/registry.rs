//! Event and response listener registry.
//!
//! Two independent namespaces:
//!
//! | Namespace | Key | Callback |
//! |-----------|-----|----------|
//! | Lifecycle | [`LifecycleEvent`] tag | [`LifecycleListener`] |
//! | Response | channel name | [`ResponseListener`] |
//!
//! Listeners are append-only. Every registration is kept, duplicates
//! included, and dispatch runs them synchronously in registration order.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::protocol::LifecycleEvent;

// ============================================================================
// Types
// ============================================================================

/// Callback for a lifecycle tag.
pub type LifecycleListener = Box<dyn FnMut(&LifecycleEvent) + Send>;

/// Callback for a response channel.
pub type ResponseListener = Box<dyn FnMut(&Value) + Send>;

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Ordered listener lists keyed by lifecycle tag and by channel name.
#[derive(Default)]
pub struct ListenerRegistry {
    lifecycle: FxHashMap<LifecycleEvent, Vec<LifecycleListener>>,
    responses: FxHashMap<String, Vec<ResponseListener>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("lifecycle_tags", &self.lifecycle.len())
            .field("response_channels", &self.responses.len())
            .finish()
    }
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener for a lifecycle tag.
    pub fn add_event_listener<F>(&mut self, tag: impl Into<LifecycleEvent>, listener: F)
    where
        F: FnMut(&LifecycleEvent) + Send + 'static,
    {
        let tag = normalize(tag.into());
        trace!(tag = %tag, "Event listener added");
        self.lifecycle
            .entry(tag)
            .or_default()
            .push(Box::new(listener));
    }

    /// Appends a listener for a response channel.
    pub fn add_response_event_listener<F>(&mut self, channel: impl Into<String>, listener: F)
    where
        F: FnMut(&Value) + Send + 'static,
    {
        let channel = channel.into();
        trace!(channel = %channel, "Response listener added");
        self.responses
            .entry(channel)
            .or_default()
            .push(Box::new(listener));
    }

    /// Invokes every listener registered for the event's tag.
    ///
    /// Returns the number of listeners invoked.
    pub fn fire_event(&mut self, event: &LifecycleEvent) -> usize {
        let key = normalize(event.clone());
        let Some(listeners) = self.lifecycle.get_mut(&key) else {
            return 0;
        };

        for listener in listeners.iter_mut() {
            listener(&key);
        }
        listeners.len()
    }

    /// Invokes every listener registered for `channel`.
    ///
    /// Returns the number of listeners invoked.
    pub fn fire_response(&mut self, channel: &str, payload: &Value) -> usize {
        let Some(listeners) = self.responses.get_mut(channel) else {
            return 0;
        };

        for listener in listeners.iter_mut() {
            listener(payload);
        }
        listeners.len()
    }

    /// Returns the number of listeners for a lifecycle tag.
    #[must_use]
    pub fn listener_count(&self, tag: &LifecycleEvent) -> usize {
        self.lifecycle
            .get(&normalize(tag.clone()))
            .map_or(0, Vec::len)
    }

    /// Returns the number of listeners for a response channel.
    #[must_use]
    pub fn response_listener_count(&self, channel: &str) -> usize {
        self.responses.get(channel).map_or(0, Vec::len)
    }

    /// Drops every listener.
    pub fn clear(&mut self) {
        self.lifecycle.clear();
        self.responses.clear();
    }
}

/// Maps `Other("webRtcConnected")` and friends onto their typed variant.
fn normalize(tag: LifecycleEvent) -> LifecycleEvent {
    match tag {
        LifecycleEvent::Other(raw) => LifecycleEvent::from_tag(&raw),
        known => known,
    }
}

// ============================================================================
// Tests
// ============================================================================
