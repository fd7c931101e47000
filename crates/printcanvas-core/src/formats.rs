//! Print formats and placement geometry.
//!
//! Physical sizes are in centimetres, margins in millimetres. Editing
//! surfaces map a format onto an on-screen rectangle and use the helpers
//! here to place the design image and draw the print guides.

use crate::design::DesignDocument;
use kurbo::{Affine, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format used when a design does not name one.
pub const DEFAULT_FORMAT_ID: &str = "30x40";

/// Orientation family of a print format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatCategory {
    Square,
    #[default]
    Portrait,
    Landscape,
}

impl FormatCategory {
    /// Stable lowercase name, as stored in design documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatCategory::Square => "square",
            FormatCategory::Portrait => "portrait",
            FormatCategory::Landscape => "landscape",
        }
    }

    /// All categories in display order.
    pub fn all() -> [FormatCategory; 3] {
        [FormatCategory::Square, FormatCategory::Portrait, FormatCategory::Landscape]
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "square" => Ok(FormatCategory::Square),
            "portrait" => Ok(FormatCategory::Portrait),
            "landscape" => Ok(FormatCategory::Landscape),
            other => Err(format!("unknown format category '{}'", other)),
        }
    }
}

/// A printable canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintFormat {
    pub id: &'static str,
    pub name: &'static str,
    /// Width in centimetres.
    pub width: f64,
    /// Height in centimetres.
    pub height: f64,
    pub category: FormatCategory,
    /// Distance from the trim line that must stay free of important content (mm).
    pub safety_margin: f64,
    /// Recommended inset for the main subject (mm).
    pub content_margin: f64,
    /// Extra printed area beyond the trim line (mm).
    pub bleed_margin: f64,
}

const fn format(
    id: &'static str,
    name: &'static str,
    width: f64,
    height: f64,
    category: FormatCategory,
    margins: [f64; 3],
) -> PrintFormat {
    PrintFormat {
        id,
        name,
        width,
        height,
        category,
        safety_margin: margins[0],
        content_margin: margins[1],
        bleed_margin: margins[2],
    }
}

static FORMATS: [PrintFormat; 9] = [
    format("30x30", "Square 30×30", 30.0, 30.0, FormatCategory::Square, [3.0, 5.0, 2.0]),
    format("40x40", "Square 40×40", 40.0, 40.0, FormatCategory::Square, [4.0, 7.0, 3.0]),
    format("50x50", "Square 50×50", 50.0, 50.0, FormatCategory::Square, [5.0, 8.0, 3.0]),
    format("30x40", "Portrait 30×40", 30.0, 40.0, FormatCategory::Portrait, [3.0, 5.0, 2.0]),
    format("50x70", "Portrait 50×70", 50.0, 70.0, FormatCategory::Portrait, [5.0, 10.0, 3.0]),
    format("60x90", "Portrait 60×90", 60.0, 90.0, FormatCategory::Portrait, [6.0, 12.0, 4.0]),
    format("40x30", "Landscape 40×30", 40.0, 30.0, FormatCategory::Landscape, [3.0, 5.0, 2.0]),
    format("70x50", "Landscape 70×50", 70.0, 50.0, FormatCategory::Landscape, [5.0, 10.0, 3.0]),
    format("90x60", "Landscape 90×60", 90.0, 60.0, FormatCategory::Landscape, [6.0, 12.0, 4.0]),
];

/// Look up a format by identifier (e.g. `"30x40"`).
pub fn lookup(id: &str) -> Option<&'static PrintFormat> {
    FORMATS.iter().find(|f| f.id == id)
}

/// All known formats, grouped square, portrait, landscape.
pub fn all() -> &'static [PrintFormat] {
    &FORMATS
}

/// Formats belonging to one category.
pub fn by_category(category: FormatCategory) -> impl Iterator<Item = &'static PrintFormat> {
    FORMATS.iter().filter(move |f| f.category == category)
}

/// The format a design targets, falling back to the default format.
pub fn for_design(design: &DesignDocument) -> &'static PrintFormat {
    design
        .format
        .as_deref()
        .and_then(lookup)
        .or_else(|| lookup(DEFAULT_FORMAT_ID))
        .unwrap_or(&FORMATS[3])
}

impl PrintFormat {
    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Largest size with this format's aspect ratio that fits in `bounds`.
    pub fn fit_size(&self, bounds: Size) -> Size {
        let ratio = self.aspect_ratio();
        if bounds.width / bounds.height > ratio {
            Size::new(bounds.height * ratio, bounds.height)
        } else {
            Size::new(bounds.width, bounds.width / ratio)
        }
    }

    /// On-screen units per millimetre when the trim area is drawn as `trim`.
    fn units_per_mm(&self, trim: Rect) -> f64 {
        trim.width() / (self.width * 10.0)
    }

    /// Region inside the safety margin.
    pub fn safe_area(&self, trim: Rect) -> Rect {
        trim.inset(-self.safety_margin * self.units_per_mm(trim))
    }

    /// Recommended region for the main subject.
    pub fn content_area(&self, trim: Rect) -> Rect {
        trim.inset(-self.content_margin * self.units_per_mm(trim))
    }

    /// Printed region including bleed.
    pub fn bleed_area(&self, trim: Rect) -> Rect {
        trim.inset(self.bleed_margin * self.units_per_mm(trim))
    }
}

/// Transform placing a design image, centred on `trim`, in on-screen space.
///
/// Applied right to left: flip and scale, then rotate, then move to the
/// trim centre offset by the design position.
pub fn placement_transform(design: &DesignDocument, trim: Rect) -> Affine {
    let sx = if design.flip_x { -design.scale } else { design.scale };
    let sy = if design.flip_y { -design.scale } else { design.scale };
    let origin = trim.center() + design.position.to_vec2();

    Affine::translate(origin.to_vec2())
        * Affine::rotate(design.normalized_rotation().to_radians())
        * Affine::scale_non_uniform(sx, sy)
}
