//! Whiteboard state and the pure update functions that drive it.
//!
//! [`WhiteboardState`] owns everything the interaction logic needs: tool,
//! interaction state machine, shape list, stroke defaults and the image
//! parameters. Updates never touch pixels; they return [`Effect`]s telling
//! the host which layers to redraw. That keeps the state machine testable
//! without a rendering surface.

use crate::board::{BoardPreset, BoardSize};
use crate::config::WhiteboardConfig;
use crate::input::{DisplayTransform, Key, PointerEvent};
use crate::overlay::{Axis, BackgroundState, OverlayState};
use crate::shapes::{ShapeId, ShapeKind, ShapeList, StrokeColor};
use crate::tools::{Interaction, ToolKind};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Slider range for the selected shape's size percent.
pub const SIZE_PERCENT_RANGE: (f64, f64) = (20.0, 200.0);

/// Pixel write into the freehand ink layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InkOp {
    /// Source-over segment with round caps and joins.
    Segment {
        from: Point,
        to: Point,
        color: StrokeColor,
        thickness: f64,
    },
    /// Destination-out disc.
    Erase { center: Point, diameter: f64 },
}

/// What a host must redraw after an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Apply to the ink buffer and the main layer.
    Ink(InkOp),
    /// Wipe the freehand ink buffer.
    ClearInk,
    /// Clear main, then replay ink and every shape in list order.
    Main,
    /// Re-render the preview layer from [`Interaction::preview`].
    Preview,
    /// Redraw the background layer from its image and parameters.
    Background,
    /// Reposition or restyle the floating overlay.
    Overlay,
    /// Resize every layer (destroying pixels and ink), then replay
    /// shapes, background and overlay in that order.
    Resize(BoardSize),
}

/// Style applied to new strokes and shapes when nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeDefaults {
    pub color: StrokeColor,
    pub thickness: f64,
    pub eraser_size: f64,
}

impl Default for StrokeDefaults {
    fn default() -> Self {
        Self {
            color: StrokeColor::red(),
            thickness: 2.0,
            eraser_size: 15.0,
        }
    }
}

/// Discrete control-changed events from the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Tool { tool: ToolKind },
    ArmPlacement { kind: ShapeKind },
    Color { color: StrokeColor },
    Thickness { value: f64 },
    EraserSize { value: f64 },
    Board { preset: BoardPreset },
    CustomBoard { width: u32, height: u32 },
    BackgroundOpacity { value: f64 },
    BackgroundScale { axis: Axis, value: f64 },
    BackgroundAspectLock { locked: bool },
    BackgroundPosition { axis: Axis, value: f64 },
    OverlayOpacity { value: f64 },
    OverlayScale { axis: Axis, value: f64 },
    OverlayAspectLock { locked: bool },
    OverlayPosition { axis: Axis, value: f64 },
    OverlayLock { locked: bool },
    ShapeName { name: String },
    ShapeSize { percent: f64 },
    DeleteSelected,
    Deselect,
    ClearWhiteboard,
    ClearBackground,
    RemoveOverlay,
}

/// The whole whiteboard model.
#[derive(Debug, Clone)]
pub struct WhiteboardState {
    board: BoardPreset,
    custom_board: BoardSize,
    tool: ToolKind,
    interaction: Interaction,
    shapes: ShapeList,
    pub defaults: StrokeDefaults,
    background: BackgroundState,
    overlay: OverlayState,
    default_shape_size: f64,
    hit_tolerance: f64,
    display: DisplayTransform,
    container: Option<Size>,
    /// Last canvas point seen during a drag, used when release has no position.
    last_pointer: Option<Point>,
    /// Whether any ink has been written since the last clear or resize.
    inked: bool,
}

impl Default for WhiteboardState {
    fn default() -> Self {
        Self::new(&WhiteboardConfig::default())
    }
}

impl WhiteboardState {
    pub fn new(config: &WhiteboardConfig) -> Self {
        let board = config.board;
        let custom_board = config.custom_board;
        let native = board.size(custom_board).as_size();
        Self {
            board,
            custom_board,
            tool: ToolKind::default(),
            interaction: Interaction::Idle,
            shapes: ShapeList::new(),
            defaults: StrokeDefaults {
                color: config.pen_color,
                thickness: config.pen_thickness.max(1.0),
                eraser_size: config.eraser_size.max(1.0),
            },
            background: BackgroundState::with_opacity(config.overlay_opacity),
            overlay: OverlayState::default(),
            default_shape_size: config.default_shape_size.max(1.0),
            hit_tolerance: config.hit_tolerance.max(0.0),
            display: DisplayTransform::identity(native),
            container: None,
            last_pointer: None,
            inked: false,
        }
    }

    pub fn board(&self) -> BoardPreset {
        self.board
    }

    /// Canvas size of the current board.
    pub fn board_size(&self) -> BoardSize {
        self.board.size(self.custom_board)
    }

    pub fn canvas_size(&self) -> Size {
        self.board_size().as_size()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn shapes(&self) -> &ShapeList {
        &self.shapes
    }

    pub fn background(&self) -> &BackgroundState {
        &self.background
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn display(&self) -> &DisplayTransform {
        &self.display
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.shapes.selected_id()
    }

    /// Whether freehand ink has been written since the last clear.
    ///
    /// Erasing does not reset this; the host checks real pixels.
    pub fn has_ink(&self) -> bool {
        self.inked
    }

    // --- display ---------------------------------------------------------

    /// Host-reported container size. `None` while the container is hidden,
    /// in which case the previous transform is kept.
    pub fn update_container(&mut self, container: Option<Size>) -> Vec<Effect> {
        let Some(container) = container else {
            log::debug!("Container hidden, keeping display transform");
            return Vec::new();
        };
        self.container = Some(container);
        self.refit();
        vec![Effect::Overlay]
    }

    fn refit(&mut self) {
        let native = self.canvas_size();
        self.display = match self.container {
            Some(container) => DisplayTransform::fit(native, container),
            None => DisplayTransform::identity(native),
        };
    }

    /// Host position to canvas position.
    pub fn to_canvas(&self, host: Point) -> Point {
        self.display.to_canvas(host)
    }

    // --- pointer ---------------------------------------------------------

    /// Feed a pointer event whose position is already in canvas pixels.
    pub fn pointer(&mut self, event: PointerEvent) -> Vec<Effect> {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(Point::new(x, y)),
            PointerEvent::Move { x, y } => self.pointer_move(Point::new(x, y)),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(&mut self, p: Point) -> Vec<Effect> {
        self.last_pointer = Some(p);

        if let Some(kind) = self.interaction.armed_kind() {
            let half = Vec2::new(self.default_shape_size, self.default_shape_size) / 2.0;
            let (color, thickness) = (self.defaults.color, self.defaults.thickness);
            let id = self.shapes.create(kind, p - half, p + half, color, thickness);
            self.interaction = Interaction::Idle;
            log::debug!("Placed {kind} {id}, placement disarmed");
            return vec![Effect::Main];
        }

        if self.tool.can_select() {
            if let Some(id) = self.shapes.hit(p, self.hit_tolerance) {
                self.shapes.select(id);
                let start = self.shapes.get(id).map_or(p, |s| s.start);
                self.interaction = Interaction::ShapeMoving {
                    id,
                    offset: p - start,
                };
                log::debug!("Selected shape {id}");
                return vec![Effect::Main];
            }
            let had_selection = self.shapes.selected_id().is_some();
            self.shapes.deselect();
            if let Some(kind) = self.tool.drag_shape() {
                self.interaction = Interaction::ShapeDragging {
                    kind,
                    anchor: p,
                    current: p,
                };
            }
            return if had_selection {
                vec![Effect::Main]
            } else {
                Vec::new()
            };
        }

        self.interaction = Interaction::Drawing {
            tool: self.tool,
            last: p,
        };
        match self.tool {
            ToolKind::Eraser => vec![self.erase_at(p)],
            _ => Vec::new(),
        }
    }

    pub fn pointer_move(&mut self, p: Point) -> Vec<Effect> {
        match self.interaction {
            Interaction::ShapeMoving { id, offset } => {
                self.last_pointer = Some(p);
                let Some(shape) = self.shapes.get_mut(id) else {
                    self.interaction = Interaction::Idle;
                    return Vec::new();
                };
                let delta = (p - offset) - shape.start;
                shape.move_by(delta);
                vec![Effect::Main]
            }
            Interaction::ShapeDragging { kind, anchor, .. } => {
                self.last_pointer = Some(p);
                self.interaction = Interaction::ShapeDragging {
                    kind,
                    anchor,
                    current: p,
                };
                vec![Effect::Preview]
            }
            Interaction::Drawing {
                tool: ToolKind::Eraser,
                ..
            } => {
                self.last_pointer = Some(p);
                self.interaction = Interaction::Drawing {
                    tool: ToolKind::Eraser,
                    last: p,
                };
                vec![self.erase_at(p)]
            }
            Interaction::Drawing { tool, last } => {
                self.last_pointer = Some(p);
                self.interaction = Interaction::Drawing { tool, last: p };
                self.inked = true;
                vec![Effect::Ink(InkOp::Segment {
                    from: last,
                    to: p,
                    color: self.defaults.color,
                    thickness: self.defaults.thickness,
                })]
            }
            Interaction::Idle | Interaction::PlacementArmed(_) => Vec::new(),
        }
    }

    /// Release. Without a position the drag commits at the last known point.
    pub fn pointer_up(&mut self, position: Option<Point>) -> Vec<Effect> {
        let p = position.or(self.last_pointer);
        self.last_pointer = None;
        match self.interaction {
            Interaction::ShapeDragging { kind, anchor, current } => {
                self.interaction = Interaction::Idle;
                let end = p.unwrap_or(current);
                let (color, thickness) = (self.defaults.color, self.defaults.thickness);
                self.shapes.create(kind, anchor, end, color, thickness);
                vec![Effect::Preview, Effect::Main]
            }
            Interaction::ShapeMoving { .. } | Interaction::Drawing { .. } => {
                self.interaction = Interaction::Idle;
                Vec::new()
            }
            Interaction::Idle | Interaction::PlacementArmed(_) => Vec::new(),
        }
    }

    /// Pointer left the surface: strokes and moves end, creation drags are
    /// abandoned without committing.
    pub fn pointer_leave(&mut self) -> Vec<Effect> {
        self.last_pointer = None;
        match self.interaction {
            Interaction::ShapeDragging { .. } => {
                self.interaction = Interaction::Idle;
                log::debug!("Shape drag abandoned");
                vec![Effect::Preview]
            }
            Interaction::ShapeMoving { .. } | Interaction::Drawing { .. } => {
                self.interaction = Interaction::Idle;
                Vec::new()
            }
            Interaction::Idle | Interaction::PlacementArmed(_) => Vec::new(),
        }
    }

    fn erase_at(&self, center: Point) -> Effect {
        Effect::Ink(InkOp::Erase {
            center,
            diameter: self.defaults.eraser_size,
        })
    }

    // --- keyboard --------------------------------------------------------

    pub fn key_down(&mut self, key: &Key) -> Vec<Effect> {
        match key {
            Key::Delete | Key::Backspace => self.delete_selected(),
            Key::Escape => self.deselect(),
            Key::Other(_) => Vec::new(),
        }
    }

    fn delete_selected(&mut self) -> Vec<Effect> {
        if self.shapes.delete_selected().is_none() {
            return Vec::new();
        }
        if matches!(self.interaction, Interaction::ShapeMoving { .. }) {
            self.interaction = Interaction::Idle;
        }
        vec![Effect::Main]
    }

    fn deselect(&mut self) -> Vec<Effect> {
        if self.shapes.selected_id().is_none() {
            return Vec::new();
        }
        self.shapes.deselect();
        vec![Effect::Main]
    }

    // --- controls --------------------------------------------------------

    pub fn apply(&mut self, control: Control) -> Vec<Effect> {
        match control {
            Control::Tool { tool } => self.select_tool(tool),
            Control::ArmPlacement { kind } => {
                let cancelled = self.cancel_drag();
                self.interaction = Interaction::PlacementArmed(kind);
                log::debug!("Placement armed for {kind}");
                cancelled
            }
            Control::Color { color } => match self.shapes.selected_mut() {
                Some(shape) => {
                    shape.color = color;
                    vec![Effect::Main]
                }
                None => {
                    self.defaults.color = color;
                    Vec::new()
                }
            },
            Control::Thickness { value } => {
                let value = value.max(1.0);
                match self.shapes.selected_mut() {
                    Some(shape) => {
                        shape.thickness = value;
                        vec![Effect::Main]
                    }
                    None => {
                        self.defaults.thickness = value;
                        Vec::new()
                    }
                }
            }
            Control::EraserSize { value } => {
                self.defaults.eraser_size = value.max(1.0);
                Vec::new()
            }
            Control::Board { preset } => self.set_board(preset),
            Control::CustomBoard { width, height } => {
                self.custom_board = BoardSize::new(width, height);
                if self.board == BoardPreset::Custom {
                    self.resize()
                } else {
                    Vec::new()
                }
            }
            Control::BackgroundOpacity { value } => {
                self.background.set_opacity(value);
                vec![Effect::Background]
            }
            Control::BackgroundScale { axis, value } => {
                self.background.params.set_scale(axis, value);
                self.background_effect()
            }
            Control::BackgroundAspectLock { locked } => {
                self.background.params.aspect_locked = locked;
                Vec::new()
            }
            Control::BackgroundPosition { axis, value } => {
                self.background.params.set_position(axis, value);
                self.background_effect()
            }
            Control::OverlayOpacity { value } => {
                self.overlay.set_opacity(value);
                self.overlay_effect()
            }
            Control::OverlayScale { axis, value } => {
                self.overlay.params.set_scale(axis, value);
                self.overlay_effect()
            }
            Control::OverlayAspectLock { locked } => {
                self.overlay.params.aspect_locked = locked;
                Vec::new()
            }
            Control::OverlayPosition { axis, value } => {
                self.overlay.params.set_position(axis, value);
                self.overlay_effect()
            }
            Control::OverlayLock { locked } => {
                self.overlay.locked = locked;
                Vec::new()
            }
            Control::ShapeName { name } => match self.shapes.selected_mut() {
                Some(shape) => {
                    shape.label = name;
                    vec![Effect::Main]
                }
                None => Vec::new(),
            },
            Control::ShapeSize { percent } if !percent.is_finite() => Vec::new(),
            Control::ShapeSize { percent } => {
                let (lo, hi) = SIZE_PERCENT_RANGE;
                match self.shapes.selected_mut() {
                    Some(shape) => {
                        shape.scale_around_center(percent.clamp(lo, hi));
                        vec![Effect::Main]
                    }
                    None => Vec::new(),
                }
            }
            Control::DeleteSelected => self.delete_selected(),
            Control::Deselect => self.deselect(),
            Control::ClearWhiteboard => self.clear_whiteboard(),
            Control::ClearBackground => self.clear_background(),
            Control::RemoveOverlay => {
                if !self.overlay.has_image() {
                    return Vec::new();
                }
                self.overlay.remove();
                log::info!("Overlay removed");
                vec![Effect::Overlay]
            }
        }
    }

    fn select_tool(&mut self, tool: ToolKind) -> Vec<Effect> {
        let effects = self.cancel_drag();
        self.tool = tool;
        if self.interaction.armed_kind().is_some() {
            self.interaction = Interaction::Idle;
        }
        log::debug!("Tool set to {}", tool.key());
        effects
    }

    /// End any in-flight pointer interaction without committing it.
    fn cancel_drag(&mut self) -> Vec<Effect> {
        let was_dragging = self.interaction.preview().is_some();
        if !matches!(self.interaction, Interaction::PlacementArmed(_)) {
            self.interaction = Interaction::Idle;
        }
        self.last_pointer = None;
        if was_dragging {
            vec![Effect::Preview]
        } else {
            Vec::new()
        }
    }

    fn set_board(&mut self, preset: BoardPreset) -> Vec<Effect> {
        if preset == self.board {
            return Vec::new();
        }
        self.board = preset;
        self.resize()
    }

    /// Destructive resize: ink is gone, shapes survive and are replayed.
    fn resize(&mut self) -> Vec<Effect> {
        let size = self.board_size();
        self.cancel_drag();
        self.inked = false;
        self.refit();
        log::info!(
            "Board set to {} ({}x{})",
            self.board.key(),
            size.width,
            size.height
        );
        vec![Effect::Resize(size)]
    }

    /// Re-run the full resize sequence for the current board, as when the
    /// container becomes visible again.
    pub fn recompute(&mut self, container: Option<Size>) -> Vec<Effect> {
        if let Some(container) = container {
            self.container = Some(container);
        }
        self.resize()
    }

    fn clear_whiteboard(&mut self) -> Vec<Effect> {
        self.shapes.clear();
        self.cancel_drag();
        self.inked = false;
        log::info!("Whiteboard cleared");
        vec![Effect::ClearInk, Effect::Preview, Effect::Main]
    }

    fn clear_background(&mut self) -> Vec<Effect> {
        if self.background.layout.is_none() && !self.background.has_image() {
            return Vec::new();
        }
        self.background.clear();
        log::info!("Background cleared");
        vec![Effect::Background]
    }

    fn background_effect(&self) -> Vec<Effect> {
        if self.background.has_image() {
            vec![Effect::Background]
        } else {
            Vec::new()
        }
    }

    fn overlay_effect(&self) -> Vec<Effect> {
        if self.overlay.has_image() {
            vec![Effect::Overlay]
        } else {
            Vec::new()
        }
    }

    // --- images ----------------------------------------------------------

    /// A background image finished loading. Replaces any previous one.
    pub fn background_loaded(&mut self, layout: Option<String>, native: Size) -> Vec<Effect> {
        log::info!(
            "Background {} loaded ({}x{})",
            layout.as_deref().unwrap_or("upload"),
            native.width,
            native.height
        );
        self.background.replace(layout, native);
        vec![Effect::Background]
    }

    /// An overlay image finished loading. Replaces any previous one.
    pub fn overlay_loaded(&mut self, native: Size) -> Vec<Effect> {
        log::info!("Overlay loaded ({}x{})", native.width, native.height);
        self.overlay.replace(native);
        vec![Effect::Overlay]
    }

    /// Drag the overlay by a host-space delta.
    pub fn drag_overlay(&mut self, host_delta: Vec2) -> Vec<Effect> {
        let delta = self.display.delta_to_canvas(host_delta);
        let canvas = self.canvas_size();
        if self.overlay.drag_by(delta, canvas) {
            vec![Effect::Overlay]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn state() -> WhiteboardState {
        WhiteboardState::default()
    }

    fn drag(state: &mut WhiteboardState, from: Point, to: Point) -> Vec<Effect> {
        state.pointer_down(from);
        state.pointer_move(from.midpoint(to));
        state.pointer_move(to);
        state.pointer_up(Some(to))
    }

    #[test]
    fn test_placement_scenario() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Hexagon,
        });
        let effects = s.pointer_down(Point::new(200.0, 200.0));
        assert_eq!(effects, vec![Effect::Main]);
        assert_eq!(s.shapes().len(), 1);
        let shape = s.shapes().iter().next().unwrap();
        assert_eq!(shape.kind(), ShapeKind::Hexagon);
        assert_eq!(shape.bounds(), Rect::new(175.0, 175.0, 225.0, 225.0));
        assert!(s.interaction().is_idle());

        // Second click with pen does not place again.
        s.pointer_up(Some(Point::new(200.0, 200.0)));
        s.pointer_down(Point::new(300.0, 300.0));
        assert_eq!(s.shapes().len(), 1);
    }

    #[test]
    fn test_shape_drag_commits_on_release() {
        let mut s = state();
        s.apply(Control::Tool {
            tool: ToolKind::Rectangle,
        });
        s.pointer_down(Point::new(10.0, 10.0));
        let preview = s.pointer_move(Point::new(60.0, 40.0));
        assert_eq!(preview, vec![Effect::Preview]);
        assert!(s.shapes().is_empty());
        assert_eq!(
            s.interaction().preview(),
            Some((ShapeKind::Rectangle, Point::new(10.0, 10.0), Point::new(60.0, 40.0)))
        );

        let effects = s.pointer_up(Some(Point::new(110.0, 60.0)));
        assert!(effects.contains(&Effect::Main));
        let shape = s.shapes().iter().next().unwrap();
        assert_eq!(shape.start, Point::new(10.0, 10.0));
        assert_eq!(shape.end, Point::new(110.0, 60.0));
        assert_eq!(shape.label, "Rectangle 0");
        assert!(s.interaction().is_idle());
    }

    #[test]
    fn test_release_without_position_uses_last_point() {
        let mut s = state();
        s.apply(Control::Tool {
            tool: ToolKind::Line,
        });
        s.pointer_down(Point::new(0.0, 0.0));
        s.pointer_move(Point::new(30.0, 40.0));
        s.pointer_up(None);
        let shape = s.shapes().iter().next().unwrap();
        assert_eq!(shape.end, Point::new(30.0, 40.0));
    }

    #[test]
    fn test_leave_abandons_shape_drag() {
        let mut s = state();
        s.apply(Control::Tool {
            tool: ToolKind::Circle,
        });
        s.pointer_down(Point::new(50.0, 50.0));
        s.pointer_move(Point::new(80.0, 50.0));
        assert_eq!(s.pointer_leave(), vec![Effect::Preview]);
        assert!(s.shapes().is_empty());
        assert!(s.interaction().is_idle());
    }

    #[test]
    fn test_select_and_move() {
        let mut s = state();
        s.apply(Control::Tool {
            tool: ToolKind::Line,
        });
        drag(&mut s, Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        s.apply(Control::Tool {
            tool: ToolKind::Select,
        });

        s.pointer_down(Point::new(50.0, 2.0));
        let id = s.selected_id().unwrap();
        assert!(matches!(
            s.interaction(),
            Interaction::ShapeMoving { offset, .. } if *offset == Vec2::new(50.0, 2.0)
        ));
        assert_eq!(s.pointer_move(Point::new(60.0, 22.0)), vec![Effect::Main]);
        s.pointer_up(Some(Point::new(60.0, 22.0)));

        let shape = s.shapes().get(id).unwrap();
        assert_eq!(shape.start, Point::new(10.0, 20.0));
        assert_eq!(shape.end, Point::new(110.0, 20.0));
        assert!(shape.is_selected());
        assert!(s.interaction().is_idle());
    }

    #[test]
    fn test_click_on_empty_space_deselects() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Star,
        });
        s.pointer_down(Point::new(100.0, 100.0));
        s.apply(Control::Tool {
            tool: ToolKind::Select,
        });
        s.pointer_down(Point::new(100.0, 100.0));
        s.pointer_up(None);
        assert!(s.selected_id().is_some());
        assert_eq!(s.pointer_down(Point::new(500.0, 500.0)), vec![Effect::Main]);
        assert!(s.selected_id().is_none());
    }

    #[test]
    fn test_pen_never_selects() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Diamond,
        });
        s.pointer_down(Point::new(100.0, 100.0));
        assert_eq!(s.tool(), ToolKind::Pen);
        s.pointer_down(Point::new(100.0, 100.0));
        assert!(s.selected_id().is_none());
        assert!(matches!(s.interaction(), Interaction::Drawing { .. }));
    }

    #[test]
    fn test_pen_emits_segments() {
        let mut s = state();
        s.pointer_down(Point::new(0.0, 0.0));
        let effects = s.pointer_move(Point::new(5.0, 5.0));
        assert_eq!(
            effects,
            vec![Effect::Ink(InkOp::Segment {
                from: Point::new(0.0, 0.0),
                to: Point::new(5.0, 5.0),
                color: StrokeColor::red(),
                thickness: 2.0,
            })]
        );
        assert!(s.has_ink());
        s.pointer_up(None);
        assert!(s.pointer_move(Point::new(9.0, 9.0)).is_empty());
    }

    #[test]
    fn test_eraser_emits_discs() {
        let mut s = state();
        s.apply(Control::Tool {
            tool: ToolKind::Eraser,
        });
        s.apply(Control::EraserSize { value: 30.0 });
        let down = s.pointer_down(Point::new(4.0, 4.0));
        assert_eq!(
            down,
            vec![Effect::Ink(InkOp::Erase {
                center: Point::new(4.0, 4.0),
                diameter: 30.0,
            })]
        );
    }

    #[test]
    fn test_keys_delete_and_escape() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Triangle,
        });
        s.pointer_down(Point::new(100.0, 100.0));
        let id = s.shapes().iter().next().unwrap().id();

        assert!(s.key_down(&Key::Delete).is_empty());
        assert_eq!(s.shapes().len(), 1);

        s.apply(Control::Tool {
            tool: ToolKind::Select,
        });
        s.pointer_down(Point::new(100.0, 100.0));
        assert_eq!(s.selected_id(), Some(id));
        assert_eq!(s.key_down(&Key::Escape), vec![Effect::Main]);
        assert_eq!(s.selected_id(), None);

        s.pointer_down(Point::new(100.0, 100.0));
        assert_eq!(s.key_down(&Key::Backspace), vec![Effect::Main]);
        assert!(s.shapes().is_empty());
        assert!(s.interaction().is_idle());
    }

    #[test]
    fn test_controls_target_selection_or_defaults() {
        let mut s = state();
        let blue: StrokeColor = "#0000FF".parse().unwrap();
        assert!(s.apply(Control::Color { color: blue }).is_empty());
        assert_eq!(s.defaults.color, blue);

        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Star,
        });
        s.pointer_down(Point::new(100.0, 100.0));
        s.apply(Control::Tool {
            tool: ToolKind::Select,
        });
        s.pointer_down(Point::new(100.0, 100.0));

        s.apply(Control::Thickness { value: 6.0 });
        s.apply(Control::ShapeName {
            name: "Objective".into(),
        });
        let shape = s.shapes().selected().unwrap();
        assert_eq!(shape.thickness, 6.0);
        assert_eq!(shape.color, blue);
        assert_eq!(shape.label, "Objective");
        assert_eq!(s.defaults.thickness, 2.0);

        s.apply(Control::Thickness { value: 0.0 });
        assert_eq!(s.shapes().selected().unwrap().thickness, 1.0);
    }

    #[test]
    fn test_size_percent_clamped_and_restorable() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Hexagon,
        });
        s.pointer_down(Point::new(200.0, 200.0));
        s.apply(Control::Tool {
            tool: ToolKind::Select,
        });
        s.pointer_down(Point::new(200.0, 200.0));
        s.pointer_up(None);

        s.apply(Control::ShapeSize { percent: 500.0 });
        let big = s.shapes().selected().unwrap().bounds();
        assert!((big.width() - 100.0).abs() < 1e-9);

        s.apply(Control::ShapeSize { percent: 100.0 });
        let restored = s.shapes().selected().unwrap().bounds();
        assert!((restored.x0 - 175.0).abs() < 1e-9);
        assert!((restored.x1 - 225.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_size_percent_ignored() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Hexagon,
        });
        s.pointer_down(Point::new(200.0, 200.0));
        s.apply(Control::Tool {
            tool: ToolKind::Select,
        });
        s.pointer_down(Point::new(200.0, 200.0));
        s.pointer_up(None);
        let before = s.shapes().selected().unwrap().clone();

        for percent in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(s.apply(Control::ShapeSize { percent }).is_empty());
        }
        let after = s.shapes().selected().unwrap();
        assert_eq!(after.start, before.start);
        assert_eq!(after.end, before.end);
        assert!(after.bounds().width().is_finite());
    }

    #[test]
    fn test_board_change_keeps_shapes() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Star,
        });
        s.pointer_down(Point::new(100.0, 100.0));
        s.pointer_up(None);
        s.pointer_down(Point::new(0.0, 0.0));
        s.pointer_move(Point::new(10.0, 0.0));
        assert!(s.has_ink());
        let before: Vec<_> = s.shapes().iter().cloned().collect();

        let effects = s.apply(Control::Board {
            preset: BoardPreset::Onslaught,
        });
        assert_eq!(effects, vec![Effect::Resize(BoardSize::new(1200, 900))]);
        let after: Vec<_> = s.shapes().iter().cloned().collect();
        assert_eq!(before, after);
        assert!(!s.has_ink());
        assert!(s.interaction().is_idle());
        assert_eq!(s.canvas_size(), Size::new(1200.0, 900.0));

        assert!(s.apply(Control::Board {
            preset: BoardPreset::Onslaught,
        })
        .is_empty());
    }

    #[test]
    fn test_tool_switch_disarms_placement() {
        let mut s = state();
        s.apply(Control::ArmPlacement {
            kind: ShapeKind::Star,
        });
        s.apply(Control::Tool {
            tool: ToolKind::Pen,
        });
        s.pointer_down(Point::new(10.0, 10.0));
        assert!(s.shapes().is_empty());
    }

    #[test]
    fn test_clear_whiteboard() {
        let mut s = state();
        s.apply(Control::Tool {
            tool: ToolKind::Arrow,
        });
        drag(&mut s, Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        s.pointer_down(Point::new(25.0, 25.0));
        assert!(s.selected_id().is_some());
        assert_eq!(
            s.apply(Control::ClearWhiteboard),
            vec![Effect::ClearInk, Effect::Preview, Effect::Main]
        );
        assert!(s.shapes().is_empty());
        assert!(s.selected_id().is_none());
    }

    #[test]
    fn test_background_controls() {
        let mut s = state();
        assert!(s
            .apply(Control::BackgroundScale {
                axis: Axis::Width,
                value: 50.0,
            })
            .is_empty());

        s.background_loaded(Some("dawn".into()), Size::new(800.0, 600.0));
        s.apply(Control::BackgroundAspectLock { locked: false });
        s.apply(Control::BackgroundScale {
            axis: Axis::Width,
            value: 50.0,
        });
        s.apply(Control::BackgroundScale {
            axis: Axis::Height,
            value: 50.0,
        });
        let rect = s.background().target_rect(Size::new(400.0, 300.0)).unwrap();
        assert_eq!(rect, Rect::new(100.0, 75.0, 300.0, 225.0));

        assert_eq!(s.apply(Control::ClearBackground), vec![Effect::Background]);
        assert!(!s.background().has_image());
    }

    #[test]
    fn test_overlay_drag_uses_display_scale() {
        let mut s = state();
        s.update_container(Some(Size::new(440.0, 340.0)));
        s.overlay_loaded(Size::new(100.0, 100.0));
        // Displayed at half size: 40 host px is 80 canvas px, 10% of 800.
        assert_eq!(s.drag_overlay(Vec2::new(40.0, 0.0)), vec![Effect::Overlay]);
        assert!((s.overlay().params.position.x - 10.0).abs() < 1e-9);

        s.apply(Control::OverlayLock { locked: true });
        assert!(s.drag_overlay(Vec2::new(40.0, 0.0)).is_empty());
    }

    #[test]
    fn test_hidden_container_keeps_transform() {
        let mut s = state();
        s.update_container(Some(Size::new(440.0, 340.0)));
        let fitted = *s.display();
        assert!(s.update_container(None).is_empty());
        assert_eq!(*s.display(), fitted);
        let host = Point::new(fitted.origin.x + 10.0, fitted.origin.y + 10.0);
        assert_eq!(s.to_canvas(host), Point::new(20.0, 20.0));
    }
}
