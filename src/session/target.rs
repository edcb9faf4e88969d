//! Render targets.
//!
//! A render target is the caller-owned surface the transport attaches its
//! video output to. Sessions only ever borrow it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// RenderTarget
// ============================================================================

/// A surface a transport can render into.
pub trait RenderTarget: fmt::Debug + Sync {
    /// Identifier the transport uses to locate the surface.
    fn surface_id(&self) -> &str;

    /// Current size in pixels, if known.
    fn dimensions(&self) -> Option<(u32, u32)> {
        None
    }
}

// ============================================================================
// VideoSurface
// ============================================================================

/// A plain named surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSurface {
    id: String,
    size: Option<(u32, u32)>,
}

impl VideoSurface {
    /// Creates a surface with the given identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size: None,
        }
    }

    /// Sets the surface size in pixels.
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }
}

impl RenderTarget for VideoSurface {
    fn surface_id(&self) -> &str {
        &self.id
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.size
    }
}

// ============================================================================
// Tests
// ============================================================================
