//! Placement parameters for the background layout and the floating overlay.
//!
//! Both images share one model: a scale in percent per axis, and a position
//! expressed as a percentage-of-canvas offset from centred placement. Keeping
//! position relative to the canvas lets it survive board-size changes.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default opacity of the background layer.
pub const DEFAULT_BACKGROUND_OPACITY: f64 = 0.7;

/// Which scale axis a control addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Width,
    Height,
}

/// Per-axis scale in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalePercent {
    pub width: f64,
    pub height: f64,
}

impl Default for ScalePercent {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// Offset from centred placement, in percent of the canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionPercent {
    pub x: f64,
    pub y: f64,
}

/// Scale, position and aspect lock for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageParams {
    pub scale: ScalePercent,
    pub position: PositionPercent,
    pub aspect_locked: bool,
    /// Native width / height of the image.
    pub native_ratio: f64,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            scale: ScalePercent::default(),
            position: PositionPercent::default(),
            aspect_locked: true,
            native_ratio: 1.0,
        }
    }
}

impl ImageParams {
    /// Reset scale and position for a freshly loaded image. The lock is kept.
    pub fn reset_for(&mut self, native: Size) {
        self.scale = ScalePercent::default();
        self.position = PositionPercent::default();
        self.native_ratio = if native.width > 0.0 && native.height > 0.0 {
            native.width / native.height
        } else {
            1.0
        };
    }

    /// Set one scale axis. With the aspect lock on, the other axis is derived
    /// from the native ratio and rounded to a whole percent.
    pub fn set_scale(&mut self, axis: Axis, value: f64) {
        let value = value.max(0.0);
        match axis {
            Axis::Width => {
                self.scale.width = value;
                if self.aspect_locked {
                    self.scale.height = (value / self.native_ratio).round();
                }
            }
            Axis::Height => {
                self.scale.height = value;
                if self.aspect_locked {
                    self.scale.width = (value * self.native_ratio).round();
                }
            }
        }
    }

    pub fn set_position(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Width => self.position.x = value,
            Axis::Height => self.position.y = value,
        }
    }

    /// Place a box of `size` in `canvas` according to the position offset.
    fn place(&self, canvas: Size, size: Size) -> Rect {
        let center = Point::new(canvas.width / 2.0, canvas.height / 2.0);
        let offset = Vec2::new(
            canvas.width * self.position.x / 100.0,
            canvas.height * self.position.y / 100.0,
        );
        let origin = center - size.to_vec2() / 2.0 + offset;
        Rect::from_origin_size(origin, size)
    }

    /// Target rect for the background: the scale is relative to the canvas.
    pub fn background_rect(&self, canvas: Size) -> Rect {
        let size = Size::new(
            canvas.width * self.scale.width / 100.0,
            canvas.height * self.scale.height / 100.0,
        );
        self.place(canvas, size)
    }

    /// Target rect for the overlay: the scale is relative to the image itself.
    pub fn overlay_rect(&self, canvas: Size, native: Size) -> Rect {
        let size = Size::new(
            native.width * self.scale.width / 100.0,
            native.height * self.scale.height / 100.0,
        );
        self.place(canvas, size)
    }
}

/// Background layout state. `native` is `None` until an image has loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundState {
    /// Name of the selected layout, or `None` for no background.
    pub layout: Option<String>,
    pub native: Option<Size>,
    pub params: ImageParams,
    opacity: f64,
}

impl Default for BackgroundState {
    fn default() -> Self {
        Self {
            layout: None,
            native: None,
            params: ImageParams::default(),
            opacity: DEFAULT_BACKGROUND_OPACITY,
        }
    }
}

impl BackgroundState {
    pub fn with_opacity(opacity: f64) -> Self {
        let mut state = Self::default();
        state.set_opacity(opacity);
        state
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_opacity(opacity);
    }

    pub fn has_image(&self) -> bool {
        self.native.is_some()
    }

    /// Replace the image wholesale and reset its placement.
    pub fn replace(&mut self, layout: Option<String>, native: Size) {
        self.layout = layout;
        self.native = Some(native);
        self.params.reset_for(native);
    }

    /// Drop the image; opacity and lock are kept.
    pub fn clear(&mut self) {
        self.layout = None;
        self.native = None;
        self.params.reset_for(Size::new(1.0, 1.0));
    }

    /// Where the image lands on a canvas of `canvas` size, if loaded.
    pub fn target_rect(&self, canvas: Size) -> Option<Rect> {
        self.native.map(|_| self.params.background_rect(canvas))
    }
}

/// Floating overlay image state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayState {
    pub native: Option<Size>,
    pub params: ImageParams,
    opacity: f64,
    /// Disables dragging entirely when set.
    pub locked: bool,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            native: None,
            params: ImageParams::default(),
            opacity: 1.0,
            locked: false,
        }
    }
}

impl OverlayState {
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_opacity(opacity);
    }

    pub fn has_image(&self) -> bool {
        self.native.is_some()
    }

    pub fn replace(&mut self, native: Size) {
        self.native = Some(native);
        self.params.reset_for(native);
    }

    /// Remove the image and restore full opacity with the lock off.
    pub fn remove(&mut self) {
        *self = Self {
            params: ImageParams {
                aspect_locked: self.params.aspect_locked,
                ..ImageParams::default()
            },
            ..Self::default()
        };
    }

    pub fn target_rect(&self, canvas: Size) -> Option<Rect> {
        self.native
            .map(|native| self.params.overlay_rect(canvas, native))
    }

    /// Move by a canvas-pixel delta. Returns false if locked or empty.
    pub fn drag_by(&mut self, delta: Vec2, canvas: Size) -> bool {
        if self.locked || self.native.is_none() {
            return false;
        }
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return false;
        }
        self.params.position.x += delta.x / canvas.width * 100.0;
        self.params.position.y += delta.y / canvas.height * 100.0;
        true
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return 1.0;
    }
    opacity.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_target_rect_centered() {
        let mut bg = BackgroundState::default();
        bg.replace(Some("dawn".into()), Size::new(800.0, 600.0));
        bg.params.aspect_locked = false;
        bg.params.set_scale(Axis::Width, 50.0);
        bg.params.set_scale(Axis::Height, 50.0);
        let rect = bg.target_rect(Size::new(400.0, 300.0)).unwrap();
        assert_eq!(rect, Rect::new(100.0, 75.0, 300.0, 225.0));
    }

    #[test]
    fn test_aspect_lock_derives_other_axis() {
        let mut params = ImageParams::default();
        params.reset_for(Size::new(200.0, 100.0));
        assert_eq!(params.native_ratio, 2.0);
        params.set_scale(Axis::Width, 80.0);
        assert_eq!(params.scale.height, 40.0);
        params.set_scale(Axis::Height, 33.0);
        assert_eq!(params.scale.width, 66.0);
    }

    #[test]
    fn test_aspect_lock_rounds() {
        let mut params = ImageParams::default();
        params.reset_for(Size::new(300.0, 200.0));
        params.set_scale(Axis::Width, 100.0);
        assert_eq!(params.scale.height, 67.0);
    }

    #[test]
    fn test_unlocked_axes_independent() {
        let mut params = ImageParams {
            aspect_locked: false,
            ..Default::default()
        };
        params.set_scale(Axis::Width, 150.0);
        assert_eq!(params.scale.height, 100.0);
    }

    #[test]
    fn test_position_is_percent_of_canvas() {
        let mut params = ImageParams::default();
        params.set_position(Axis::Width, 10.0);
        params.set_position(Axis::Height, -10.0);
        let rect = params.background_rect(Size::new(400.0, 300.0));
        assert_eq!(rect, Rect::new(40.0, -30.0, 440.0, 270.0));
    }

    #[test]
    fn test_overlay_scales_native_size() {
        let mut overlay = OverlayState::default();
        overlay.replace(Size::new(100.0, 50.0));
        let rect = overlay.target_rect(Size::new(400.0, 300.0)).unwrap();
        assert_eq!(rect, Rect::new(150.0, 125.0, 250.0, 175.0));
    }

    #[test]
    fn test_overlay_drag_respects_lock() {
        let canvas = Size::new(400.0, 200.0);
        let mut overlay = OverlayState::default();
        assert!(!overlay.drag_by(Vec2::new(40.0, 20.0), canvas));

        overlay.replace(Size::new(10.0, 10.0));
        assert!(overlay.drag_by(Vec2::new(40.0, 20.0), canvas));
        assert_eq!(overlay.params.position, PositionPercent { x: 10.0, y: 10.0 });

        overlay.locked = true;
        assert!(!overlay.drag_by(Vec2::new(40.0, 20.0), canvas));
        assert_eq!(overlay.params.position, PositionPercent { x: 10.0, y: 10.0 });
    }

    #[test]
    fn test_remove_overlay_resets() {
        let mut overlay = OverlayState::default();
        overlay.replace(Size::new(10.0, 10.0));
        overlay.set_opacity(0.3);
        overlay.locked = true;
        overlay.remove();
        assert!(!overlay.has_image());
        assert_eq!(overlay.opacity(), 1.0);
        assert!(!overlay.locked);
    }

    #[test]
    fn test_opacity_clamped() {
        let mut bg = BackgroundState::default();
        assert_eq!(bg.opacity(), DEFAULT_BACKGROUND_OPACITY);
        bg.set_opacity(1.5);
        assert_eq!(bg.opacity(), 1.0);
        bg.set_opacity(-0.2);
        assert_eq!(bg.opacity(), 0.0);
    }
}
