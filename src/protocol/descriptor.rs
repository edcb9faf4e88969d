//! Command descriptors carried by UI interactions.
//!
//! The remote application accepts any JSON value as a descriptor and performs
//! no schema validation, so neither do we. The shapes the configurator uses
//! are modelled as typed variants, everything else passes through untouched.
//!
//! # Wire Shapes
//!
//! | Variant | JSON |
//! |---------|------|
//! | [`Interaction::CarConfig`] | `{"CarConfig":{"Part":"BodyPaint","Value":"Red"}}` |
//! | [`Interaction::LoadLevel`] | `{"LoadLevel":"/Game/Maps/MainMap"}` |
//! | [`Interaction::ConsoleCommand`] | `{"ConsoleCommand":"stat fps"}` |
//! | [`Descriptor::Text`] | `"any string"` |
//! | [`Descriptor::Raw`] | any other JSON value |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Presets
// ============================================================================

/// Paint colors offered by the configurator.
pub const PAINT_COLORS: &[&str] = &["Red", "Blue", "White", "Black", "Silver", "Matte"];

/// Rim styles offered by the configurator.
pub const RIM_STYLES: &[&str] = &["Stock", "Sport V1", "Carbon Fiber", "Rally"];

/// Level reloaded by the "restart level" action.
pub const MAIN_MAP: &str = "/Game/Maps/MainMap";

/// Engine console command toggling the frame-rate overlay.
pub const STAT_FPS: &str = "stat fps";

/// Engine console command toggling the frame-timing overlay.
pub const STAT_UNIT: &str = "stat unit";

/// `CarConfig` part name for body paint.
pub const PART_BODY_PAINT: &str = "BodyPaint";

/// `CarConfig` part name for rims.
pub const PART_RIMS: &str = "Rims";

// ============================================================================
// CarConfig
// ============================================================================

/// A single configurator change: which part, which value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarConfig {
    /// Part being configured (e.g. `BodyPaint`).
    #[serde(rename = "Part")]
    pub part: String,

    /// Value applied to the part (e.g. `Red`).
    #[serde(rename = "Value")]
    pub value: String,
}

// ============================================================================
// Interaction
// ============================================================================

/// Structured descriptor shapes recognized by the configurator.
///
/// Serialized externally tagged, so each variant becomes a single-key object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    /// `{"CarConfig":{"Part":…,"Value":…}}`
    CarConfig(CarConfig),

    /// `{"LoadLevel":"/Game/…"}`
    LoadLevel(String),

    /// `{"ConsoleCommand":"…"}`
    ConsoleCommand(String),
}

// ============================================================================
// Descriptor
// ============================================================================

/// Payload of a UI-interaction or generic command.
///
/// Deserialization tries the structured shapes first, then a bare string,
/// and keeps anything else as raw JSON. Serializing a descriptor always
/// yields exactly the value it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    /// One of the recognized structured shapes.
    Structured(Interaction),

    /// An opaque string payload.
    Text(String),

    /// Any other JSON value.
    Raw(Value),
}

// ============================================================================
// Descriptor - Constructors
// ============================================================================

impl Descriptor {
    /// Creates a `CarConfig` descriptor.
    #[inline]
    #[must_use]
    pub fn car_config(part: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Structured(Interaction::CarConfig(CarConfig {
            part: part.into(),
            value: value.into(),
        }))
    }

    /// Creates a body paint change.
    #[inline]
    #[must_use]
    pub fn body_paint(color: impl Into<String>) -> Self {
        Self::car_config(PART_BODY_PAINT, color)
    }

    /// Creates a rim change.
    #[inline]
    #[must_use]
    pub fn rims(style: impl Into<String>) -> Self {
        Self::car_config(PART_RIMS, style)
    }

    /// Creates a level load request.
    #[inline]
    #[must_use]
    pub fn load_level(path: impl Into<String>) -> Self {
        Self::Structured(Interaction::LoadLevel(path.into()))
    }

    /// Wraps an engine console command.
    #[inline]
    #[must_use]
    pub fn console_command(command: impl Into<String>) -> Self {
        Self::Structured(Interaction::ConsoleCommand(command.into()))
    }

    /// Creates an opaque string descriptor.
    #[inline]
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Classifies an arbitrary JSON value.
    ///
    /// Recognized shapes become [`Descriptor::Structured`], strings become
    /// [`Descriptor::Text`], everything else is kept as [`Descriptor::Raw`].
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(Self::Raw(value))
    }
}

// ============================================================================
// Descriptor - Accessors
// ============================================================================

impl Descriptor {
    /// Returns `true` for anything that is not a bare string.
    #[inline]
    #[must_use]
    pub fn is_structured(&self) -> bool {
        match self {
            Self::Structured(_) => true,
            Self::Text(_) => false,
            Self::Raw(value) => !value.is_string(),
        }
    }

    /// Returns the typed interaction, if this is one.
    #[inline]
    #[must_use]
    pub fn interaction(&self) -> Option<&Interaction> {
        match self {
            Self::Structured(interaction) => Some(interaction),
            _ => None,
        }
    }

    /// Returns the wrapped console command text, if this is one.
    #[inline]
    #[must_use]
    pub fn console_text(&self) -> Option<&str> {
        match self {
            Self::Structured(Interaction::ConsoleCommand(text)) => Some(text),
            _ => None,
        }
    }

    /// Converts to the JSON value sent on the wire.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Raw(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
            Self::Structured(interaction) => {
                serde_json::to_value(interaction).unwrap_or(Value::Null)
            }
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<&str> for Descriptor {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Descriptor {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Interaction> for Descriptor {
    #[inline]
    fn from(interaction: Interaction) -> Self {
        Self::Structured(interaction)
    }
}

impl From<Value> for Descriptor {
    #[inline]
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
