//! JSON scenario scripts replayed headlessly through [`Whiteboard`].
//!
//! ```json
//! {
//!   "config": "board.json",
//!   "board": "killteam",
//!   "container": [900, 700],
//!   "actions": [
//!     { "action": "control", "set": { "control": "tool", "tool": "rectangle" } },
//!     { "action": "pointer", "event": { "type": "down", "x": 10, "y": 10 } },
//!     { "action": "pointer", "event": { "type": "up", "position": { "x": 90, "y": 60 } } },
//!     { "action": "export" }
//!   ]
//! }
//! ```

use crate::battle::Battle;
use crate::whiteboard::{Whiteboard, WhiteboardError};
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use warboard_core::storage::StorageError;
use warboard_core::{
    BoardPreset, ConfigError, Control, HistoryEntry, Key, Phase, PointerEvent, Storage,
    TouchEvent, WhiteboardConfig,
};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Action {index} failed: {source}")]
    Action {
        index: usize,
        #[source]
        source: WhiteboardError,
    },
}

/// One host interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Pointer event in host coordinates.
    Pointer { event: PointerEvent },
    Touch { event: TouchEvent },
    /// Key name as a browser reports it, e.g. `"Delete"`.
    Key { key: String },
    Control { set: Control },
    LoadBackground { path: PathBuf },
    SelectLayout { name: String },
    LoadOverlay { path: PathBuf },
    RemoveOverlay,
    DragOverlay { dx: f64, dy: f64 },
    /// Container became visible at this size, or is hidden (`null`).
    ContainerSize { size: Option<[f64; 2]> },
    /// Export into the output directory.
    Export,
    /// Show or hide the whiteboard panel; showing it resizes to `container`.
    TogglePanel { container: Option<[f64; 2]> },
    Phase { phase: Phase },
    /// Notes for the current phase.
    Notes { text: String },
    NextTurn,
}

/// A scenario file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Config file, relative to the script.
    pub config: Option<PathBuf>,
    pub board: Option<BoardPreset>,
    pub container: Option<[f64; 2]>,
    pub actions: Vec<Action>,
}

/// What a replay produced.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub exports: Vec<PathBuf>,
    /// Phases logged by `next_turn` actions.
    pub history: Vec<HistoryEntry>,
    /// User notices for failed image loads.
    pub notices: Vec<String>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a script. Relative paths inside it resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut script = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            script.resolve_paths(dir);
        }
        Ok(script)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        if let Some(config) = self.config.as_mut() {
            resolve(config);
        }
        for action in &mut self.actions {
            match action {
                Action::LoadBackground { path } | Action::LoadOverlay { path } => resolve(path),
                _ => {}
            }
        }
    }

    /// The config this script runs with: `override_config`, else the
    /// script's own, else defaults. The script's board wins over either.
    pub fn config(&self, override_config: Option<&Path>) -> Result<WhiteboardConfig, ScriptError> {
        let mut config = match override_config.or(self.config.as_deref()) {
            Some(path) => WhiteboardConfig::load(path)?,
            None => WhiteboardConfig::default(),
        };
        if let Some(board) = self.board {
            config.board = board;
        }
        Ok(config)
    }

    /// Build the whiteboard this script starts from.
    pub fn whiteboard(&self, override_config: Option<&Path>) -> Result<Whiteboard, ScriptError> {
        self.whiteboard_with(&self.config(override_config)?)
    }

    pub fn whiteboard_with(&self, config: &WhiteboardConfig) -> Result<Whiteboard, ScriptError> {
        let mut whiteboard =
            Whiteboard::new(config).map_err(|source| ScriptError::Action { index: 0, source })?;
        if let Some([w, h]) = self.container {
            whiteboard
                .update_canvas_size(Some(Size::new(w, h)))
                .map_err(|source| ScriptError::Action { index: 0, source })?;
        }
        Ok(whiteboard)
    }

    /// Replay every action. Image load failures become notices and the
    /// replay continues; anything else stops it. The battle auto-saves
    /// between actions and once more at the end.
    pub fn run<S: Storage>(
        &self,
        whiteboard: &mut Whiteboard,
        battle: &mut Battle<S>,
        out_dir: &Path,
    ) -> Result<ScriptReport, ScriptError> {
        let mut report = ScriptReport::default();
        for (index, action) in self.actions.iter().enumerate() {
            log::debug!("Action {index}: {action:?}");
            match run_action(whiteboard, battle, action, out_dir) {
                Ok(Outcome::Exported(path)) => report.exports.push(path),
                Ok(Outcome::Logged(history)) => report.history.extend(history),
                Ok(Outcome::Done) => {}
                Err(e @ (WhiteboardError::Image(_) | WhiteboardError::UnknownLayout(_))) => {
                    log::warn!("{e}");
                    report.notices.push(e.to_string());
                }
                Err(source) => return Err(ScriptError::Action { index, source }),
            }
            battle.tick()?;
        }
        battle.save()?;
        Ok(report)
    }
}

enum Outcome {
    Done,
    Exported(PathBuf),
    Logged(Vec<HistoryEntry>),
}

fn run_action<S: Storage>(
    whiteboard: &mut Whiteboard,
    battle: &mut Battle<S>,
    action: &Action,
    out_dir: &Path,
) -> Result<Outcome, WhiteboardError> {
    let size = |s: &Option<[f64; 2]>| s.map(|[w, h]| Size::new(w, h));
    match action {
        Action::Pointer { event } => whiteboard.handle_pointer(*event)?,
        Action::Touch { event } => whiteboard.handle_touch(event)?,
        Action::Key { key } => whiteboard.handle_key(&Key::from_name(key))?,
        Action::Control { set } => whiteboard.apply_control(set.clone())?,
        Action::LoadBackground { path } => whiteboard.load_background_file(path)?,
        Action::SelectLayout { name } => whiteboard.select_layout(name)?,
        Action::LoadOverlay { path } => whiteboard.load_overlay_file(path)?,
        Action::RemoveOverlay => whiteboard.remove_overlay()?,
        Action::DragOverlay { dx, dy } => whiteboard.drag_overlay(Vec2::new(*dx, *dy))?,
        Action::ContainerSize { size: container } => {
            whiteboard.update_canvas_size(size(container))?
        }
        Action::Export => return whiteboard.export_to(out_dir).map(Outcome::Exported),
        Action::TogglePanel { container } => {
            whiteboard.toggle_panel(size(container))?;
        }
        Action::Phase { phase } => battle.switch_phase(*phase),
        Action::Notes { text } => battle.set_notes(text.clone()),
        Action::NextTurn => return Ok(Outcome::Logged(battle.next_turn())),
    }
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warboard_core::{MemoryStorage, ShapeKind, ToolKind};

    fn battle() -> Battle<MemoryStorage> {
        Battle::restore(MemoryStorage::new(), &WhiteboardConfig::default()).unwrap()
    }

    const SCRIPT: &str = r#"{
        "board": "killteam",
        "actions": [
            { "action": "control", "set": { "control": "arm_placement", "kind": "star" } },
            { "action": "pointer", "event": { "type": "down", "x": 100, "y": 100 } },
            { "action": "pointer", "event": { "type": "up", "position": { "x": 100, "y": 100 } } },
            { "action": "control", "set": { "control": "tool", "tool": "line" } },
            { "action": "touch", "event": { "type": "start", "touches": [{ "x": 10, "y": 200 }] } },
            { "action": "touch", "event": { "type": "move", "touches": [{ "x": 300, "y": 200 }] } },
            { "action": "touch", "event": { "type": "end" } },
            { "action": "key", "key": "Escape" },
            { "action": "load_overlay", "path": "missing.png" },
            { "action": "export" }
        ]
    }"#;

    #[test]
    fn test_parse_actions() {
        let script = Script::from_json(SCRIPT).unwrap();
        assert_eq!(script.board, Some(BoardPreset::KillTeam));
        assert_eq!(script.actions.len(), 10);
        assert_eq!(
            script.actions[0],
            Action::Control {
                set: Control::ArmPlacement {
                    kind: ShapeKind::Star
                }
            }
        );
        assert_eq!(
            script.actions[3],
            Action::Control {
                set: Control::Tool {
                    tool: ToolKind::Line
                }
            }
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = Script::from_json(r#"{ "actions": [{ "action": "undo" }] }"#).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn test_replay_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        std::fs::write(&path, SCRIPT).unwrap();

        let script = Script::load(&path).unwrap();
        assert_eq!(
            script.actions[8],
            Action::LoadOverlay {
                path: dir.path().join("missing.png")
            }
        );

        let mut whiteboard = script.whiteboard(None).unwrap();
        let mut battle = battle();
        let report = script.run(&mut whiteboard, &mut battle, dir.path()).unwrap();
        assert_eq!(whiteboard.state().shapes().len(), 2);
        assert!(whiteboard.state().selected_id().is_none());
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.exports.len(), 1);
        assert!(report.exports[0].exists());
    }

    #[test]
    fn test_panel_and_turn_actions() {
        let script = Script::from_json(
            r#"{
                "actions": [
                    { "action": "control", "set": { "control": "arm_placement", "kind": "circle" } },
                    { "action": "pointer", "event": { "type": "down", "x": 400, "y": 300 } },
                    { "action": "toggle_panel", "container": [440, 340] },
                    { "action": "notes", "text": "Hold the ruins" },
                    { "action": "phase", "phase": "shooting" },
                    { "action": "next_turn" }
                ]
            }"#,
        )
        .unwrap();
        let mut whiteboard = script.whiteboard(None).unwrap();
        let mut battle = battle();
        let report = script
            .run(&mut whiteboard, &mut battle, Path::new("."))
            .unwrap();

        assert!(whiteboard.panel_visible());
        assert_eq!(
            whiteboard.state().display().to_canvas(kurbo::Point::new(20.0, 20.0)),
            kurbo::Point::ZERO
        );
        assert!(whiteboard.layers().main().has_content());
        assert_eq!(report.history.len(), 1);
        assert_eq!(report.history[0].notes, "Hold the ruins");
        assert_eq!(battle.session().current_turn, 2);
        assert!(!battle.is_dirty());
    }

    #[test]
    fn test_missing_config_fails() {
        let script = Script {
            config: Some(PathBuf::from("/no/such/config.json")),
            ..Script::default()
        };
        assert!(matches!(
            script.whiteboard(None),
            Err(ScriptError::Config(ConfigError::Io { .. }))
        ));
    }
}
