use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strokes shorter than this are taps and never reach the history.
pub const MIN_STROKE_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eye {
    Right,
    Left,
}

impl Eye {
    pub const ALL: [Eye; 2] = [Eye::Right, Eye::Left];

    pub fn as_str(self) -> &'static str {
        match self {
            Eye::Right => "right",
            Eye::Left => "left",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Eye::Right => 0,
            Eye::Left => 1,
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const RED: Self = Self::rgba(255, 0, 0, 255);
    pub const BLUE: Self = Self::rgba(0, 0, 255, 255);
    pub const GREEN: Self = Self::rgba(0, 128, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba_array(color: [u8; 4]) -> Self {
        Self::rgba(color[0], color[1], color[2], color[3])
    }

    /// Parses `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| anyhow!("invalid hex color {value:?}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// A position in the surface's fixed logical pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(500, 400)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushConfig {
    pub color: Color,
    pub width: u32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            color: Color::RED,
            width: 2,
        }
    }
}

/// One freehand mark. Fields are private so a committed stroke cannot be
/// edited through the history.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    color: Color,
    width: u32,
}

impl Stroke {
    pub fn new(points: Vec<Point>, brush: BrushConfig) -> Self {
        Self {
            points,
            color: brush.color,
            width: brush.width.max(1),
        }
    }

    pub fn begin(start: Point, brush: BrushConfig) -> Self {
        Self::new(vec![start], brush)
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_committable(&self) -> bool {
        self.points.len() >= MIN_STROKE_POINTS
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_and_without_alpha() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("0000ff80"), Some(Color::rgba(0, 0, 255, 128)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn hex_formatting_drops_opaque_alpha() {
        assert_eq!(Color::rgb(1, 2, 3).to_hex(), "#010203");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn eye_serializes_as_lowercase_id() {
        assert_eq!(serde_json::to_string(&Eye::Right).expect("json"), "\"right\"");
        let left: Eye = serde_json::from_str("\"left\"").expect("parse");
        assert_eq!(left, Eye::Left);
        assert_eq!(Eye::Left.to_string(), "left");
    }

    #[test]
    fn stroke_keeps_brush_it_was_started_with() {
        let brush = BrushConfig {
            color: Color::BLUE,
            width: 0,
        };
        let mut stroke = Stroke::begin(Point::new(1.0, 1.0), brush);
        assert!(!stroke.is_committable());
        stroke.push(Point::new(2.0, 2.0));
        assert!(stroke.is_committable());
        assert_eq!(stroke.color(), Color::BLUE);
        assert_eq!(stroke.width(), 1);
    }
}
