//! Paint model for node fills and strokes
//!
//! Mirrors what a design document stores per paint entry: solid colors that may
//! be bound to a color variable, linear/radial gradients, and image fills the
//! engine never touches.

use crate::ids::VariableId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point in normalized (0-1) object space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };
    pub const CENTER: Point = Point { x: 0.5, y: 0.5 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color with 0-1 channels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Paints
// ─────────────────────────────────────────────────────────────────────────────

/// Gradient stop (position in 0-1)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Solid color paint, optionally bound to a color variable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidPaint {
    pub color: Color,
    #[serde(default = "opaque")]
    pub opacity: f32,
    #[serde(default = "visible")]
    pub visible: bool,
    /// Variable bound to `color`, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_color: Option<VariableId>,
}

fn visible() -> bool {
    true
}

impl SolidPaint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            visible: true,
            bound_color: None,
        }
    }

    pub fn bound_to(mut self, variable: VariableId) -> Self {
        self.bound_color = Some(variable);
        self
    }
}

impl Default for SolidPaint {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

/// Linear or radial gradient paint
///
/// `start`/`end` are the gradient handles in object space. For radial
/// gradients `start` is the center and `end` a point on the radius.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientPaint {
    pub stops: Vec<GradientStop>,
    pub start: Point,
    pub end: Point,
    #[serde(default = "opaque")]
    pub opacity: f32,
}

/// Image paint (carried through untouched)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaint {
    pub image_hash: String,
    #[serde(default = "opaque")]
    pub opacity: f32,
}

/// One entry of a node's fill or stroke list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    Solid(SolidPaint),
    GradientLinear(GradientPaint),
    GradientRadial(GradientPaint),
    Image(ImagePaint),
}

impl Paint {
    pub fn is_gradient(&self) -> bool {
        matches!(self, Paint::GradientLinear(_) | Paint::GradientRadial(_))
    }

    /// Variable bound to this paint's color, if it is a bound solid paint
    pub fn bound_variable(&self) -> Option<&VariableId> {
        match self {
            Paint::Solid(solid) => solid.bound_color.as_ref(),
            _ => None,
        }
    }
}

impl From<SolidPaint> for Paint {
    fn from(solid: SolidPaint) -> Self {
        Paint::Solid(solid)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(SolidPaint::new(color))
    }
}

/// Contents of a paint property as reported by the host
#[derive(Clone, Debug, PartialEq)]
pub enum PaintSlot {
    Paints(Vec<Paint>),
    /// Mixed value (e.g. a text node with per-range fills)
    Mixed,
}

/// Paint-carrying properties a variable can be bound through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintField {
    Fills,
    Strokes,
}

impl PaintField {
    pub fn as_str(self) -> &'static str {
        match self {
            PaintField::Fills => "fills",
            PaintField::Strokes => "strokes",
        }
    }

    /// Map a bound-variable field name to a paint field
    pub fn from_field(field: &str) -> Option<Self> {
        field.parse().ok()
    }
}

impl fmt::Display for PaintField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaintField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fills" => Ok(PaintField::Fills),
            "strokes" => Ok(PaintField::Strokes),
            _ => Err(()),
        }
    }
}
