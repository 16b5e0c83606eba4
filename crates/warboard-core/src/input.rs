//! Input events for mouse/touch/keyboard, and the host-to-canvas mapping.
//!
//! Hosts deliver pointer positions in their own coordinate space (CSS pixels
//! for a browser). [`DisplayTransform`] maps those into canvas pixels, and
//! touch input is folded into the same [`PointerEvent`] stream by
//! [`TouchAdapter`] so the interaction logic only ever sees one event type.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Margin kept around the canvas when fitting it into its container.
pub const CONTAINER_MARGIN: f64 = 40.0;

/// Unified pointer event, in whichever space the caller documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    /// Release. Hosts that lose the position on release send `None`.
    Up {
        #[serde(default)]
        position: Option<Point>,
    },
    /// Pointer left the surface; strokes end and drags are abandoned.
    Leave,
}

impl PointerEvent {
    pub fn down(p: Point) -> Self {
        PointerEvent::Down { x: p.x, y: p.y }
    }

    pub fn moved(p: Point) -> Self {
        PointerEvent::Move { x: p.x, y: p.y }
    }

    pub fn up(p: Point) -> Self {
        PointerEvent::Up { position: Some(p) }
    }

    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } => Some(Point::new(x, y)),
            PointerEvent::Up { position } => position,
            PointerEvent::Leave => None,
        }
    }

    /// Same event with its position mapped through `f`.
    pub fn map_position(self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            PointerEvent::Down { x, y } => PointerEvent::down(f(Point::new(x, y))),
            PointerEvent::Move { x, y } => PointerEvent::moved(f(Point::new(x, y))),
            PointerEvent::Up { position } => PointerEvent::Up {
                position: position.map(f),
            },
            PointerEvent::Leave => PointerEvent::Leave,
        }
    }
}

/// Raw touch event from a host. Only the first touch point is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TouchEvent {
    Start { touches: Vec<Point> },
    Move { touches: Vec<Point> },
    End,
    Cancel,
}

/// Translates touch input 1:1 into pointer events.
#[derive(Debug, Clone, Default)]
pub struct TouchAdapter {
    last: Option<Point>,
}

impl TouchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the equivalent pointer event, if the touch carries one.
    pub fn translate(&mut self, event: &TouchEvent) -> Option<PointerEvent> {
        match event {
            TouchEvent::Start { touches } => {
                let p = *touches.first()?;
                self.last = Some(p);
                Some(PointerEvent::down(p))
            }
            TouchEvent::Move { touches } => {
                let p = *touches.first()?;
                self.last = Some(p);
                Some(PointerEvent::moved(p))
            }
            // Touch end carries no position; release where the finger last was.
            TouchEvent::End => Some(PointerEvent::Up {
                position: self.last.take(),
            }),
            TouchEvent::Cancel => {
                self.last = None;
                Some(PointerEvent::Leave)
            }
        }
    }
}

/// Keys the whiteboard reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Other(String),
}

impl Key {
    /// Map a host key name (`KeyboardEvent.key` style) to a [`Key`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Maps host coordinates onto canvas pixels based on displayed vs. native size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    /// Native canvas size in pixels.
    pub native: Size,
    /// Top-left of the displayed canvas in host coordinates.
    pub origin: Point,
    /// Displayed canvas size in host coordinates.
    pub displayed: Size,
}

impl DisplayTransform {
    /// Canvas shown at native size at the host origin.
    pub fn identity(native: Size) -> Self {
        Self {
            native,
            origin: Point::ZERO,
            displayed: native,
        }
    }

    /// Fit `native` into `container`, never upscaling, centred.
    pub fn fit(native: Size, container: Size) -> Self {
        let scale_x = (container.width - CONTAINER_MARGIN) / native.width;
        let scale_y = (container.height - CONTAINER_MARGIN) / native.height;
        let mut scale = scale_x.min(scale_y).min(1.0);
        if !scale.is_finite() || scale <= 0.0 {
            log::debug!("Container {container:?} too small to fit canvas, using native size");
            scale = 1.0;
        }
        let displayed = Size::new(native.width * scale, native.height * scale);
        let origin = Point::new(
            (container.width - displayed.width) / 2.0,
            (container.height - displayed.height) / 2.0,
        );
        Self {
            native,
            origin,
            displayed,
        }
    }

    fn ratio(&self) -> Vec2 {
        Vec2::new(
            self.native.width / self.displayed.width,
            self.native.height / self.displayed.height,
        )
    }

    /// Host position to canvas pixel position.
    pub fn to_canvas(&self, host: Point) -> Point {
        let r = self.ratio();
        Point::new(
            (host.x - self.origin.x) * r.x,
            (host.y - self.origin.y) * r.y,
        )
    }

    /// Canvas pixel position to host position.
    pub fn to_host(&self, canvas: Point) -> Point {
        let r = self.ratio();
        Point::new(canvas.x / r.x + self.origin.x, canvas.y / r.y + self.origin.y)
    }

    /// Host-space delta to canvas-space delta.
    pub fn delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        let r = self.ratio();
        Vec2::new(delta.x * r.x, delta.y * r.y)
    }
}
