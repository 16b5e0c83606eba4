//! Host-facing whiteboard: state plus the surfaces it drives.

use kurbo::{Size, Vec2};
use std::path::{Path, PathBuf};
use thiserror::Error;
use warboard_core::whiteboard::InkOp;
use warboard_core::{
    ConfigError, Control, Effect, Key, PointerEvent, TouchAdapter, TouchEvent, WhiteboardConfig,
    WhiteboardPanel, WhiteboardState,
};
use warboard_render::{
    ExportError, Frame, ImageError, LabelFont, LayerStack, LoadedImage, RasterRenderer,
    RendererError, Surface, encode_png, export_file_name_today, flatten, write_png,
};

/// Layout name that clears the background.
pub const NO_LAYOUT: &str = "none";

/// Errors surfaced to the user. The message is the notice text.
#[derive(Debug, Error)]
pub enum WhiteboardError {
    #[error("Error loading image: {0}")]
    Image(#[from] ImageError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
}

pub type WhiteboardResult<T> = Result<T, WhiteboardError>;

/// Whiteboard controller. Every input goes through [`WhiteboardState`] and
/// the returned effects are applied to the layer stack.
pub struct Whiteboard {
    state: WhiteboardState,
    layers: LayerStack,
    renderer: RasterRenderer,
    background_image: Option<LoadedImage>,
    overlay_image: Option<LoadedImage>,
    touch: TouchAdapter,
    panel: WhiteboardPanel,
    layouts: std::collections::BTreeMap<String, PathBuf>,
}

impl Whiteboard {
    /// Build from a config. `label_font` overrides the built-in font; one
    /// that fails to load is logged and the built-in font is used.
    pub fn new(config: &WhiteboardConfig) -> WhiteboardResult<Self> {
        let renderer = match config.label_font.as_ref().map(LabelFont::load) {
            Some(Ok(font)) => RasterRenderer::new(Some(font)),
            Some(Err(e)) => {
                log::warn!("Using built-in label font: {e}");
                RasterRenderer::default()
            }
            None => RasterRenderer::default(),
        };
        let state = WhiteboardState::new(config);
        let layers = LayerStack::new(state.board_size())?;
        Ok(Self {
            state,
            layers,
            renderer,
            background_image: None,
            overlay_image: None,
            touch: TouchAdapter::new(),
            panel: WhiteboardPanel::default(),
            layouts: config.layouts.clone(),
        })
    }

    pub fn state(&self) -> &WhiteboardState {
        &self.state
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Pointer event in host coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> WhiteboardResult<()> {
        let event = event.map_position(|p| self.state.to_canvas(p));
        let effects = self.state.pointer(event);
        self.apply_effects(effects)
    }

    /// Touch event in host coordinates, treated as the equivalent pointer.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> WhiteboardResult<()> {
        match self.touch.translate(event) {
            Some(pointer) => self.handle_pointer(pointer),
            None => Ok(()),
        }
    }

    pub fn handle_key(&mut self, key: &Key) -> WhiteboardResult<()> {
        let effects = self.state.key_down(key);
        self.apply_effects(effects)
    }

    pub fn apply_control(&mut self, control: Control) -> WhiteboardResult<()> {
        let effects = self.state.apply(control);
        self.apply_effects(effects)
    }

    /// Recompute display fit and redraw everything, as when the container
    /// is shown. `None` means it is still hidden.
    pub fn update_canvas_size(&mut self, container: Option<Size>) -> WhiteboardResult<()> {
        let effects = self.state.recompute(container);
        self.apply_effects(effects)
    }

    pub fn panel_visible(&self) -> bool {
        self.panel.is_visible()
    }

    /// Show or hide the whiteboard panel. Showing it recomputes the canvas
    /// size for `container` and replays every layer. Returns visibility.
    pub fn toggle_panel(&mut self, container: Option<Size>) -> WhiteboardResult<bool> {
        let shown = self.panel.toggle();
        if shown {
            self.update_canvas_size(container)?;
        }
        log::debug!("Whiteboard panel {}", if shown { "shown" } else { "hidden" });
        Ok(shown)
    }

    // --- images ----------------------------------------------------------

    /// Decode and install a background. On failure nothing changes.
    pub fn load_background_bytes(
        &mut self,
        layout: Option<String>,
        bytes: &[u8],
    ) -> WhiteboardResult<()> {
        let image = LoadedImage::decode(bytes).inspect_err(|e| {
            log::warn!("Background not loaded: {e}");
        })?;
        let effects = self.state.background_loaded(layout, image.native_size());
        self.background_image = Some(image);
        self.apply_effects(effects)
    }

    pub fn load_background_file(&mut self, path: impl AsRef<Path>) -> WhiteboardResult<()> {
        let bytes = read_image(path.as_ref())?;
        self.load_background_bytes(None, &bytes)
    }

    /// Select a named layout from the config, or `none` to clear.
    pub fn select_layout(&mut self, name: &str) -> WhiteboardResult<()> {
        if name == NO_LAYOUT {
            self.background_image = None;
            return self.apply_control(Control::ClearBackground);
        }
        let path = self
            .layouts
            .get(name)
            .cloned()
            .ok_or_else(|| WhiteboardError::UnknownLayout(name.to_string()))?;
        let bytes = read_image(&path)?;
        self.load_background_bytes(Some(name.to_string()), &bytes)
    }

    /// Decode and install the floating overlay. On failure nothing changes.
    pub fn load_overlay_bytes(&mut self, bytes: &[u8]) -> WhiteboardResult<()> {
        let image = LoadedImage::decode(bytes).inspect_err(|e| {
            log::warn!("Overlay not loaded: {e}");
        })?;
        let effects = self.state.overlay_loaded(image.native_size());
        self.overlay_image = Some(image);
        self.apply_effects(effects)
    }

    pub fn load_overlay_file(&mut self, path: impl AsRef<Path>) -> WhiteboardResult<()> {
        let bytes = read_image(path.as_ref())?;
        self.load_overlay_bytes(&bytes)
    }

    pub fn remove_overlay(&mut self) -> WhiteboardResult<()> {
        self.overlay_image = None;
        self.apply_control(Control::RemoveOverlay)
    }

    /// Drag the overlay by a host-space delta.
    pub fn drag_overlay(&mut self, delta: Vec2) -> WhiteboardResult<()> {
        let effects = self.state.drag_overlay(delta);
        self.apply_effects(effects)
    }

    // --- output ----------------------------------------------------------

    /// What the host shows: every layer plus the live preview.
    pub fn display(&self) -> WhiteboardResult<Surface> {
        let surface = self.layers.compose(&Frame {
            base: None,
            background: self.state.background(),
            overlay: self.state.overlay(),
            overlay_image: self.overlay_image.as_ref(),
            with_preview: true,
        })?;
        Ok(surface)
    }

    /// Flatten and encode. Returns the download file name and PNG bytes.
    pub fn export_png(&self) -> WhiteboardResult<(String, Vec<u8>)> {
        let flat = flatten(
            &self.layers,
            self.state.background(),
            self.state.overlay(),
            self.overlay_image.as_ref(),
        )?;
        let bytes = encode_png(&flat)?;
        Ok((export_file_name_today(), bytes))
    }

    /// Export into `dir` under the dated file name.
    pub fn export_to(&self, dir: &Path) -> WhiteboardResult<PathBuf> {
        let (name, bytes) = self.export_png()?;
        Ok(write_png(dir, &name, &bytes)?)
    }

    /// Shapes exist or the main layer has any visible pixel.
    pub fn has_ink_or_shapes(&self) -> bool {
        !self.state.shapes().is_empty() || self.layers.main().has_content()
    }

    pub fn has_any_content(&self) -> bool {
        self.has_ink_or_shapes()
            || self.state.background().has_image()
            || self.state.overlay().has_image()
    }

    // --- effects ---------------------------------------------------------

    fn apply_effects(&mut self, effects: Vec<Effect>) -> WhiteboardResult<()> {
        for effect in effects {
            self.apply_effect(effect)?;
        }
        Ok(())
    }

    fn apply_effect(&mut self, effect: Effect) -> WhiteboardResult<()> {
        match effect {
            Effect::Ink(op) => self.apply_ink(op),
            Effect::ClearInk => self.layers.clear_ink(),
            Effect::Main => self.redraw_main(),
            Effect::Preview => self.layers.redraw_preview(
                self.state.interaction(),
                &self.state.defaults,
                &self.renderer,
            ),
            Effect::Background => self.redraw_background(),
            // The overlay is composited straight from state in `compose`.
            Effect::Overlay => {
                if let Some(rect) = self.state.overlay().target_rect(self.state.canvas_size()) {
                    log::debug!("Overlay at {rect:?}");
                }
            }
            Effect::Resize(size) => {
                self.layers.resize(size)?;
                self.redraw_main();
                self.redraw_background();
            }
        }
        Ok(())
    }

    fn apply_ink(&mut self, op: InkOp) {
        self.layers.apply_ink(op, self.state.shapes(), &self.renderer);
    }

    fn redraw_main(&mut self) {
        self.layers.redraw_main(self.state.shapes(), &self.renderer);
    }

    fn redraw_background(&mut self) {
        let image = self.background_image.as_ref().filter(|_| self.state.background().has_image());
        self.layers.redraw_background(self.state.background(), image);
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>, ImageError> {
    std::fs::read(path).map_err(|source| {
        log::warn!("Could not read image {}: {source}", path.display());
        ImageError::Read {
            path: path.to_path_buf(),
            source,
        }
    })
}

impl std::fmt::Debug for Whiteboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Whiteboard")
            .field("board", &self.state.board())
            .field("shapes", &self.state.shapes().len())
            .field("background", &self.background_image.is_some())
            .field("overlay", &self.overlay_image.is_some())
            .finish()
    }
}
