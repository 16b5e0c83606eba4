//! Tool selection and the pointer interaction state.

use crate::shapes::{ShapeId, ShapeKind};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Select,
    Line,
    Arrow,
    Rectangle,
    Circle,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Pen,
        ToolKind::Eraser,
        ToolKind::Select,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Rectangle,
        ToolKind::Circle,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
            ToolKind::Select => "select",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
        }
    }

    /// Pixel-only tools that write ink straight to the main layer.
    pub fn is_freehand(self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Eraser)
    }

    /// Whether pointer-down first tries to pick an existing shape.
    pub fn can_select(self) -> bool {
        !self.is_freehand()
    }

    /// Shape created by dragging with this tool, if any.
    pub fn drag_shape(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Arrow => Some(ShapeKind::Arrow),
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Pen | ToolKind::Eraser | ToolKind::Select => None,
        }
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ToolKind::ALL
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| format!("Unknown tool: {s}"))
    }
}

/// Pointer interaction state.
///
/// ```text
/// Idle -> Drawing(tool) -> Idle            pen / eraser
/// Idle -> ShapeDragging(anchor) -> Idle    line / arrow / rectangle / circle
/// Idle -> ShapeMoving(shape) -> Idle       picking an existing shape
/// Idle -> PlacementArmed(kind) -> Idle     one-shot click-to-place
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Freehand stroke in progress; `last` is the previous stroke point.
    Drawing { tool: ToolKind, last: Point },
    /// Shape creation drag from `anchor`; `current` is the live end point.
    ShapeDragging {
        kind: ShapeKind,
        anchor: Point,
        current: Point,
    },
    /// Dragging the selected shape; `offset` is pointer minus shape start.
    ShapeMoving { id: ShapeId, offset: Vec2 },
    /// Next pointer-down places one shape of `kind`.
    PlacementArmed(ShapeKind),
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn armed_kind(&self) -> Option<ShapeKind> {
        match self {
            Interaction::PlacementArmed(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Live preview extent while a creation drag is in progress.
    pub fn preview(&self) -> Option<(ShapeKind, Point, Point)> {
        match *self {
            Interaction::ShapeDragging {
                kind,
                anchor,
                current,
            } => Some((kind, anchor, current)),
            _ => None,
        }
    }
}
