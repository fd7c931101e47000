//! Design document: one editable print design.
//!
//! Documents are values. Edits build a whole new document and hand it to
//! the [`DesignStore`](crate::store::DesignStore); nothing patches a
//! document in place once it has been recorded.

use crate::formats::{DEFAULT_FORMAT_ID, FormatCategory};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Prefix of image references that embed the image bytes inline.
pub const EMBEDDED_DATA_PREFIX: &str = "data:";

/// Length of the random part of a generated identifier.
const ID_SUFFIX_LEN: usize = 9;

/// Generate a fresh design identifier.
///
/// A base-36 millisecond timestamp followed by a random base-36 suffix.
pub fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random = Uuid::new_v4().as_u128() % 36u128.pow(ID_SUFFIX_LEN as u32);

    let mut id = to_base36(millis);
    let suffix = to_base36(random);
    for _ in suffix.len()..ID_SUFFIX_LEN {
        id.push('0');
    }
    id.push_str(&suffix);
    id
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Image filter applied when rendering the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    Normal,
    Grayscale,
    Sepia,
    Invert,
    Blur,
    Brightness,
    Contrast,
    Saturate,
    Custom,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Normal => "normal",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Invert => "invert",
            FilterKind::Blur => "blur",
            FilterKind::Brightness => "brightness",
            FilterKind::Contrast => "contrast",
            FilterKind::Saturate => "saturate",
            FilterKind::Custom => "custom",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(FilterKind::Normal),
            "grayscale" => Ok(FilterKind::Grayscale),
            "sepia" => Ok(FilterKind::Sepia),
            "invert" => Ok(FilterKind::Invert),
            "blur" => Ok(FilterKind::Blur),
            "brightness" => Ok(FilterKind::Brightness),
            "contrast" => Ok(FilterKind::Contrast),
            "saturate" => Ok(FilterKind::Saturate),
            "custom" => Ok(FilterKind::Custom),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

/// Filter descriptor stored on a design.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    #[serde(rename = "type", default)]
    pub kind: FilterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    /// Raw effect definition for [`FilterKind::Custom`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
}

impl FilterSettings {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            intensity: None,
            custom_css: None,
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// A custom effect described by `css`.
    pub fn custom(css: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Custom,
            intensity: None,
            custom_css: Some(css.into()),
        }
    }
}

/// Product-specific options (apparel and mug variants).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mug_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_position: Option<String>,
}

/// A complete design snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignDocument {
    /// Unique identifier, also the correlation key for mockup rendering.
    pub id: String,
    /// Durable URL, embedded `data:` payload, or the storage placeholder.
    pub image_url: Option<String>,
    /// Print format identifier, see [`crate::formats`].
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_type: Option<FormatCategory>,
    pub scale: f64,
    /// Degrees, unnormalized.
    pub rotation: f64,
    pub position: Point,
    /// Unsaved changes since the last commit or export.
    pub has_changes: bool,
    pub filter: FilterSettings,
    pub flip_x: bool,
    pub flip_y: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_options: Option<ProductOptions>,
}

impl Default for DesignDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignDocument {
    /// A blank design on the default format with a fresh identifier.
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            image_url: None,
            format: Some(DEFAULT_FORMAT_ID.to_string()),
            format_type: Some(FormatCategory::Portrait),
            scale: 1.0,
            rotation: 0.0,
            position: Point::ZERO,
            has_changes: false,
            filter: FilterSettings::default(),
            flip_x: false,
            flip_y: false,
            product_options: None,
        }
    }

    /// Whether the image reference carries the image bytes inline.
    pub fn has_embedded_image(&self) -> bool {
        self.image_url
            .as_deref()
            .is_some_and(|url| url.starts_with(EMBEDDED_DATA_PREFIX))
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        self.rotation.rem_euclid(360.0)
    }
}
