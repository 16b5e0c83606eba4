//! Shape markers placed on the whiteboard.

mod list;
mod outline;

pub use list::ShapeList;
pub use outline::{ARROW_HEAD_LENGTH, label_anchor, outline};

use crate::geometry;
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for shapes (monotonic, never reused).
pub type ShapeId = u64;

/// Error parsing a `#RRGGBB` / `#RRGGBBAA` color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color '{0}': expected #RRGGBB or #RRGGBBAA")]
pub struct ColorParseError(pub String);

/// Stroke color as RGBA8, written as a hex string in config and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl StrokeColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn red() -> Self {
        Self::rgb(255, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Selection glow color.
    pub const fn highlight() -> Self {
        Self::rgb(0, 255, 255)
    }

    /// Hex form, `#RRGGBB` when opaque and `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::red()
    }
}

impl FromStr for StrokeColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrokeColor> for String {
    fn from(color: StrokeColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for StrokeColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<StrokeColor> for Color {
    fn from(color: StrokeColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The marker kinds a shape can take. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Arrow,
    Rectangle,
    Circle,
    Triangle,
    Diamond,
    Hexagon,
    Star,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Line,
        ShapeKind::Arrow,
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Diamond,
        ShapeKind::Hexagon,
        ShapeKind::Star,
    ];

    /// Display name, used for default labels.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Arrow => "Arrow",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Diamond => "Diamond",
            ShapeKind::Hexagon => "Hexagon",
            ShapeKind::Star => "Star",
        }
    }

    /// Kinds drawn by dragging from an anchor to the release point.
    pub fn is_draggable(self) -> bool {
        matches!(
            self,
            ShapeKind::Line | ShapeKind::Arrow | ShapeKind::Rectangle | ShapeKind::Circle
        )
    }

    /// Kinds whose hit test uses the bounding-box approximation.
    pub fn is_polygon(self) -> bool {
        matches!(
            self,
            ShapeKind::Triangle | ShapeKind::Diamond | ShapeKind::Hexagon | ShapeKind::Star
        )
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown shape kind: {s}"))
    }
}

/// A persistent marker with identity, extent, style and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: ShapeId,
    kind: ShapeKind,
    /// First anchor (line start, box corner, circle centre).
    pub start: Point,
    /// Second anchor (line end, opposite corner, point on the circle).
    pub end: Point,
    pub color: StrokeColor,
    /// Stroke width in canvas pixels.
    pub thickness: f64,
    pub label: String,
    /// Maintained by [`ShapeList`]; at most one shape has it set.
    #[serde(skip)]
    pub(crate) selected: bool,
    /// Signed extent that a 100% size-percent maps back to.
    #[serde(skip)]
    size_base: Vec2,
}

impl Shape {
    /// Create a shape with the default `"<Kind> <id>"` label.
    pub fn new(
        id: ShapeId,
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: StrokeColor,
        thickness: f64,
    ) -> Self {
        Self {
            id,
            kind,
            start,
            end,
            color,
            thickness,
            label: format!("{} {}", kind.name(), id),
            selected: false,
            size_base: end - start,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Axis-aligned box spanned by the two anchors.
    pub fn bounds(&self) -> Rect {
        geometry::anchor_box(self.start, self.end)
    }

    /// Centre of the anchor box.
    pub fn center(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Circle radius (distance between the anchors).
    pub fn radius(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Tolerance-banded proximity test for pointer selection.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let tolerance = tolerance.max(0.0);
        match self.kind {
            ShapeKind::Line | ShapeKind::Arrow => {
                geometry::near_segment(point, self.start, self.end, tolerance)
            }
            ShapeKind::Rectangle => {
                geometry::near_rect_border(point, self.start, self.end, tolerance)
            }
            ShapeKind::Circle => geometry::near_circle(point, self.start, self.end, tolerance),
            // Bounding-box approximation, not true edge distance.
            ShapeKind::Triangle | ShapeKind::Diamond | ShapeKind::Hexagon | ShapeKind::Star => {
                geometry::near_box(point, self.start, self.end, tolerance)
            }
        }
    }

    /// Translate both anchors by the same delta.
    pub fn move_by(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    /// Replace the end anchor, as during live creation.
    pub fn resize_to(&mut self, new_end: Point) {
        self.end = new_end;
        self.size_base = self.end - self.start;
    }

    /// Rescale around the anchor-box centre relative to the size baseline.
    ///
    /// The baseline is the extent at creation or at the last
    /// [`Shape::rebase_size`], so 100% always restores it.
    pub fn scale_around_center(&mut self, percent: f64) {
        let center = self.center();
        let half = self.size_base * (percent / 100.0) / 2.0;
        self.start = center - half;
        self.end = center + half;
    }

    /// Make the current extent the 100% baseline for size changes.
    pub fn rebase_size(&mut self) {
        self.size_base = self.end - self.start;
    }
}
