//! Reskin Core
//!
//! Foundational types shared by every Reskin crate:
//!
//! - **Identifiers**: opaque handles for nodes, variables, collections, modes and components
//! - **Paints**: colors, solid and gradient paints as stored on document nodes
//! - **Gradients**: a parser for the CSS gradient syntax used by gradient overlay tokens
//!
//! # Example
//!
//! ```rust
//! use reskin_core::{parse_css_gradient, Color};
//!
//! let gradient = parse_css_gradient("linear-gradient(90deg, #ff0000 0%, #00ff00 100%)").unwrap();
//! assert_eq!(gradient.stops.len(), 2);
//! assert_eq!(gradient.stops[0].color, Color::RED);
//! ```

pub mod gradient;
pub mod ids;
pub mod paint;

pub use gradient::{parse_color, parse_css_gradient, GradientParseError, GradientShape, ParsedGradient};
pub use ids::{CollectionId, ComponentId, ModeId, NodeId, VariableId};
pub use paint::{
    Color, GradientPaint, GradientStop, ImagePaint, Paint, PaintField, PaintSlot, Point, SolidPaint,
};
