//! CSS gradient parsing for gradient overlay tokens
//!
//! Supported syntax:
//! - `linear-gradient(135deg, #667eea 0%, #764ba2 100%)`
//! - `linear-gradient(to right, red, blue)`
//! - `radial-gradient(circle at center, rgba(0, 0, 0, 0.5) 0%, #000 100%)`
//! - Colors: hex (#rgb, #rgba, #rrggbb, #rrggbbaa), rgb(), rgba(), named colors
//!
//! Stops without an explicit percentage are spread evenly.

use crate::paint::{Color, GradientPaint, GradientStop, Paint, Point};
use nom::{
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0},
    error::ParseError as NomParseError,
    number::complete::float,
    IResult,
};
use thiserror::Error;

/// Gradient parse failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradientParseError {
    #[error("not a gradient: {0}")]
    UnknownFunction(String),

    #[error("unterminated gradient: {0}")]
    Unterminated(String),

    #[error("gradient needs at least two color stops, found {found}")]
    TooFewStops { found: usize },

    #[error("invalid color stop: {0}")]
    InvalidStop(String),
}

/// Gradient geometry as written in CSS
#[derive(Clone, Debug, PartialEq)]
pub enum GradientShape {
    /// CSS angle in degrees (0deg = to top, 90deg = to right)
    Linear { angle: f32 },
    /// Center in object space
    Radial { position: Point },
}

/// Result of parsing a CSS gradient string
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedGradient {
    pub shape: GradientShape,
    pub stops: Vec<GradientStop>,
}

impl ParsedGradient {
    /// Build the paint entry for this gradient
    pub fn to_paint(&self) -> Paint {
        match self.shape {
            GradientShape::Linear { angle } => {
                let (start, end) = angle_to_gradient_points(angle);
                Paint::GradientLinear(GradientPaint {
                    stops: self.stops.clone(),
                    start,
                    end,
                    opacity: 1.0,
                })
            }
            GradientShape::Radial { position } => Paint::GradientRadial(GradientPaint {
                stops: self.stops.clone(),
                start: position,
                end: Point::new(position.x + 0.5, position.y),
                opacity: 1.0,
            }),
        }
    }
}

/// Parse a `linear-gradient(...)` or `radial-gradient(...)` string
pub fn parse_css_gradient(input: &str) -> Result<ParsedGradient, GradientParseError> {
    let trimmed = input.trim().trim_end_matches(';').trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("linear-gradient(") {
        let inner = function_body(trimmed, "linear-gradient(")?;
        parse_linear_gradient(inner)
    } else if lower.starts_with("radial-gradient(") {
        let inner = function_body(trimmed, "radial-gradient(")?;
        parse_radial_gradient(inner)
    } else {
        Err(GradientParseError::UnknownFunction(trimmed.to_string()))
    }
}

fn function_body<'a>(input: &'a str, prefix: &str) -> Result<&'a str, GradientParseError> {
    input
        .get(prefix.len()..)
        .and_then(|s| s.strip_suffix(')'))
        .map(str::trim)
        .ok_or_else(|| GradientParseError::Unterminated(input.to_string()))
}

fn parse_linear_gradient(inner: &str) -> Result<ParsedGradient, GradientParseError> {
    let parts = split_gradient_parts(inner);
    let first = parts.first().map(String::as_str).unwrap_or_default();
    let (angle, color_start_idx) = parse_gradient_direction(first);
    let stops = parse_color_stops(&parts[color_start_idx.min(parts.len())..])?;

    Ok(ParsedGradient {
        shape: GradientShape::Linear { angle },
        stops,
    })
}

fn parse_radial_gradient(inner: &str) -> Result<ParsedGradient, GradientParseError> {
    let parts = split_gradient_parts(inner);

    let mut position = Point::CENTER;
    let mut color_start_idx = 0;

    if let Some(first) = parts.first().map(|p| p.trim().to_lowercase()) {
        if first.starts_with("circle") || first.starts_with("ellipse") || first.starts_with("closest") || first.starts_with("farthest") {
            if let Some(at_pos) = first.find(" at ") {
                if let Some(pos) = parse_position(&first[at_pos + 4..]) {
                    position = pos;
                }
            }
            color_start_idx = 1;
        } else if let Some(rest) = first.strip_prefix("at ") {
            if let Some(pos) = parse_position(rest) {
                position = pos;
            }
            color_start_idx = 1;
        }
    }

    let stops = parse_color_stops(&parts[color_start_idx.min(parts.len())..])?;

    Ok(ParsedGradient {
        shape: GradientShape::Radial { position },
        stops,
    })
}

/// Split gradient arguments by commas, respecting parentheses for rgb()/rgba()
fn split_gradient_parts(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut paren_depth: i32 = 0;

    for c in input.chars() {
        match c {
            '(' => {
                paren_depth += 1;
                current.push(c);
            }
            ')' => {
                paren_depth = (paren_depth - 1).max(0);
                current.push(c);
            }
            ',' if paren_depth == 0 => {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        parts.push(trimmed);
    }

    parts
}

/// Parse gradient direction (angle or "to <direction>")
/// Returns (angle_in_degrees, color_start_index)
fn parse_gradient_direction(first_part: &str) -> (f32, usize) {
    let part = first_part.trim().to_lowercase();

    if let Some(angle) = parse_angle_value(&part) {
        return (angle, 1);
    }

    if let Some(direction) = part.strip_prefix("to ") {
        let angle = match direction.trim() {
            "top" => 0.0,
            "right" => 90.0,
            "bottom" => 180.0,
            "left" => 270.0,
            "top right" | "right top" => 45.0,
            "bottom right" | "right bottom" => 135.0,
            "bottom left" | "left bottom" => 225.0,
            "top left" | "left top" => 315.0,
            _ => return (180.0, 0),
        };
        return (angle, 1);
    }

    // No direction: CSS default is "to bottom"
    (180.0, 0)
}

/// Parse angle value (e.g., "45deg", "0.5turn", "100grad")
fn parse_angle_value(input: &str) -> Option<f32> {
    let input = input.trim();

    if let Some(deg_str) = input.strip_suffix("deg") {
        return deg_str.trim().parse::<f32>().ok();
    }

    if let Some(turn_str) = input.strip_suffix("turn") {
        return turn_str.trim().parse::<f32>().ok().map(|t| t * 360.0);
    }

    if let Some(grad_str) = input.strip_suffix("grad") {
        return grad_str.trim().parse::<f32>().ok().map(|g| g * 0.9);
    }

    if let Some(rad_str) = input.strip_suffix("rad") {
        return rad_str
            .trim()
            .parse::<f32>()
            .ok()
            .map(|r| r.to_degrees());
    }

    None
}

/// Convert a CSS gradient angle to start/end handles in object space
/// CSS angles: 0deg = to top, 90deg = to right, 180deg = to bottom, 270deg = to left
fn angle_to_gradient_points(angle_deg: f32) -> (Point, Point) {
    let angle_rad = (90.0 - angle_deg).to_radians();

    let dx = angle_rad.cos();
    // Y grows downward in object space
    let dy = -angle_rad.sin();

    let len = if dx.abs() > dy.abs() {
        0.5 / dx.abs()
    } else if dy.abs() > 0.0 {
        0.5 / dy.abs()
    } else {
        0.5
    };

    let center = Point::CENTER;
    let start = Point::new(center.x - dx * len, center.y - dy * len);
    let end = Point::new(center.x + dx * len, center.y + dy * len);

    (start, end)
}

fn parse_color_stops(parts: &[String]) -> Result<Vec<GradientStop>, GradientParseError> {
    let total = parts.len();
    let mut stops = Vec::with_capacity(total);

    for (i, part) in parts.iter().enumerate() {
        let (color_str, position) = extract_color_and_position(part, i, total);
        let color = parse_color(color_str)
            .ok_or_else(|| GradientParseError::InvalidStop(part.clone()))?;
        stops.push(GradientStop::new(position, color));
    }

    if stops.len() < 2 {
        return Err(GradientParseError::TooFewStops { found: stops.len() });
    }

    Ok(stops)
}

/// Extract color and position from a color stop string
fn extract_color_and_position(part: &str, index: usize, total: usize) -> (&str, f32) {
    let part = part.trim();

    if let Some(pct_pos) = part.rfind('%') {
        let before_pct = &part[..pct_pos];
        // Split after the last non-numeric char, on a char boundary
        if let Some((idx, c)) = before_pct
            .char_indices()
            .rev()
            .find(|&(_, c)| !c.is_ascii_digit() && c != '.' && c != '-')
        {
            let split = idx + c.len_utf8();
            let num_str = &part[split..pct_pos];
            if let Ok(pct) = num_str.trim().parse::<f32>() {
                let color_str = part[..split].trim();
                return (color_str, pct / 100.0);
            }
        }
    }

    (part, default_position(index, total))
}

fn default_position(index: usize, total: usize) -> f32 {
    if total <= 1 {
        0.0
    } else {
        index as f32 / (total - 1) as f32
    }
}

/// Parse position keywords and percentages (for radial gradients)
fn parse_position(input: &str) -> Option<Point> {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "center" => return Some(Point::CENTER),
        "top" => return Some(Point::new(0.5, 0.0)),
        "bottom" => return Some(Point::new(0.5, 1.0)),
        "left" => return Some(Point::new(0.0, 0.5)),
        "right" => return Some(Point::new(1.0, 0.5)),
        "top left" | "left top" => return Some(Point::new(0.0, 0.0)),
        "top right" | "right top" => return Some(Point::new(1.0, 0.0)),
        "bottom left" | "left bottom" => return Some(Point::new(0.0, 1.0)),
        "bottom right" | "right bottom" => return Some(Point::new(1.0, 1.0)),
        _ => {}
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() >= 2 {
        let x = parse_position_value(parts[0])?;
        let y = parse_position_value(parts[1])?;
        return Some(Point::new(x, y));
    }

    None
}

fn parse_position_value(input: &str) -> Option<f32> {
    let input = input.trim();

    if let Some(pct_str) = input.strip_suffix('%') {
        return pct_str.trim().parse::<f32>().ok().map(|p| p / 100.0);
    }

    match input {
        "left" | "top" => Some(0.0),
        "center" => Some(0.5),
        "right" | "bottom" => Some(1.0),
        _ => None,
    }
}

// ============================================================================
// Color Parsing
// ============================================================================

/// Parse a CSS color: hex, rgb(), rgba() or a basic named color
pub fn parse_color(input: &str) -> Option<Color> {
    let input = input.trim();

    if let Ok(("", color)) = parse_hex_color::<nom::error::Error<&str>>(input) {
        return Some(color);
    }

    if let Ok((_, color)) = parse_rgba_color::<nom::error::Error<&str>>(input) {
        return Some(color);
    }

    if let Ok((_, color)) = parse_rgb_color::<nom::error::Error<&str>>(input) {
        return Some(color);
    }

    parse_named_color(input)
}

fn ws<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    multispace0(input)
}

fn hex_channel(digits: &str) -> Option<f32> {
    let expanded = if digits.len() == 1 {
        digits.repeat(2)
    } else {
        digits.to_string()
    };
    u8::from_str_radix(&expanded, 16)
        .ok()
        .map(|v| v as f32 / 255.0)
}

/// Parse hex color: #RGB, #RGBA, #RRGGBB, or #RRGGBBAA
fn parse_hex_color<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Color, E> {
    let (rest, _) = char('#')(input)?;
    let (rest, hex) = take_while1(|c: char| c.is_ascii_hexdigit())(rest)?;

    let width = match hex.len() {
        3 | 4 => 1,
        6 | 8 => 2,
        _ => {
            return Err(nom::Err::Error(E::from_error_kind(
                input,
                nom::error::ErrorKind::LengthValue,
            )))
        }
    };

    let channels: Option<Vec<f32>> = hex
        .as_bytes()
        .chunks(width)
        .map(|chunk| std::str::from_utf8(chunk).ok().and_then(hex_channel))
        .collect();
    let channels = channels.ok_or_else(|| {
        nom::Err::Error(E::from_error_kind(input, nom::error::ErrorKind::HexDigit))
    })?;

    let alpha = channels.get(3).copied().unwrap_or(1.0);
    Ok((rest, Color::rgba(channels[0], channels[1], channels[2], alpha)))
}

fn comma<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, (), E> {
    let (input, _) = ws(input)?;
    let (input, _) = char(',')(input)?;
    let (input, _) = ws(input)?;
    Ok((input, ()))
}

fn normalize_channels(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    if r > 1.0 || g > 1.0 || b > 1.0 {
        (r / 255.0, g / 255.0, b / 255.0)
    } else {
        (r, g, b)
    }
}

/// Parse rgba(r, g, b, a)
fn parse_rgba_color<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Color, E> {
    let (input, _) = tag_no_case("rgba")(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, r) = float(input)?;
    let (input, _) = comma(input)?;
    let (input, g) = float(input)?;
    let (input, _) = comma(input)?;
    let (input, b) = float(input)?;
    let (input, _) = comma(input)?;
    let (input, a) = float(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;

    let (r, g, b) = normalize_channels(r, g, b);
    Ok((input, Color::rgba(r, g, b, a)))
}

/// Parse rgb(r, g, b)
fn parse_rgb_color<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Color, E> {
    let (input, _) = tag_no_case("rgb")(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, r) = float(input)?;
    let (input, _) = comma(input)?;
    let (input, g) = float(input)?;
    let (input, _) = comma(input)?;
    let (input, b) = float(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;

    let (r, g, b) = normalize_channels(r, g, b);
    Ok((input, Color::rgb(r, g, b)))
}

fn parse_named_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "black" => Some(Color::BLACK),
        "white" => Some(Color::WHITE),
        "red" => Some(Color::RED),
        "green" => Some(Color::rgb(0.0, 0.5, 0.0)),
        "lime" => Some(Color::GREEN),
        "blue" => Some(Color::BLUE),
        "yellow" => Some(Color::YELLOW),
        "cyan" | "aqua" => Some(Color::CYAN),
        "magenta" | "fuchsia" => Some(Color::MAGENTA),
        "gray" | "grey" => Some(Color::GRAY),
        "transparent" => Some(Color::TRANSPARENT),
        _ => None,
    }
}
