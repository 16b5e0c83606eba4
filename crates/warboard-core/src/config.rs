//! Whiteboard configuration, loaded from JSON.

use crate::board::{BoardPreset, BoardSize};
use crate::overlay::DEFAULT_BACKGROUND_OPACITY;
use crate::shapes::StrokeColor;
use crate::storage::DEFAULT_AUTOSAVE_INTERVAL_SECS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for the whiteboard. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    pub pen_color: StrokeColor,
    pub pen_thickness: f64,
    pub eraser_size: f64,
    /// Opacity of the background layout layer.
    pub overlay_opacity: f64,
    /// Edge length of click-placed shapes.
    pub default_shape_size: f64,
    /// Pointer hit tolerance in canvas pixels.
    pub hit_tolerance: f64,
    pub board: BoardPreset,
    pub custom_board: BoardSize,
    /// Named background layouts and the image files they load.
    pub layouts: BTreeMap<String, PathBuf>,
    /// TTF/OTF font for shape labels. Labels are skipped without one.
    pub label_font: Option<PathBuf>,
    pub autosave_interval_secs: u64,
    pub session_max_age_days: i64,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            pen_color: StrokeColor::red(),
            pen_thickness: 2.0,
            eraser_size: 15.0,
            overlay_opacity: DEFAULT_BACKGROUND_OPACITY,
            default_shape_size: 50.0,
            hit_tolerance: 10.0,
            board: BoardPreset::default(),
            custom_board: BoardSize::default(),
            layouts: BTreeMap::new(),
            label_font: None,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            session_max_age_days: 7,
        }
    }
}

impl WhiteboardConfig {
    /// Parse and validate a JSON config string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. Relative layout and font paths resolve against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        for file in self.layouts.values_mut() {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        if let Some(font) = self.label_font.as_mut() {
            if font.is_relative() {
                *font = dir.join(&*font);
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("pen_thickness", self.pen_thickness),
            ("eraser_size", self.eraser_size),
            ("default_shape_size", self.default_shape_size),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(ConfigError::Invalid {
                field: "overlay_opacity",
                reason: format!("expected 0..=1, got {}", self.overlay_opacity),
            });
        }
        if !self.hit_tolerance.is_finite() || self.hit_tolerance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "hit_tolerance",
                reason: format!("expected a non-negative number, got {}", self.hit_tolerance),
            });
        }
        if self.custom_board.width == 0 || self.custom_board.height == 0 {
            return Err(ConfigError::Invalid {
                field: "custom_board",
                reason: "dimensions must be non-zero".to_string(),
            });
        }
        if self.layouts.contains_key("none") {
            return Err(ConfigError::Invalid {
                field: "layouts",
                reason: "'none' is reserved for no background".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WhiteboardConfig::default();
        assert_eq!(config.pen_color.to_hex(), "#FF0000");
        assert_eq!(config.hit_tolerance, 10.0);
        assert_eq!(config.overlay_opacity, 0.7);
        assert_eq!(config.board, BoardPreset::Incursion);
        assert_eq!(config.session_max_age_days, 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WhiteboardConfig::from_json(
            r##"{"pen_color": "#00FF00", "board": "killteam", "layouts": {"dawn": "dawn.png"}}"##,
        )
        .unwrap();
        assert_eq!(config.pen_color, StrokeColor::rgb(0, 255, 0));
        assert_eq!(config.board, BoardPreset::KillTeam);
        assert_eq!(config.eraser_size, 15.0);
        assert_eq!(config.layouts["dawn"], PathBuf::from("dawn.png"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = WhiteboardConfig::from_json(r#"{"pen_thickness": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pen_thickness", .. }));
        let err = WhiteboardConfig::from_json(r#"{"overlay_opacity": 1.5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "overlay_opacity", .. }));
        assert!(matches!(
            WhiteboardConfig::from_json(r#"{"pen_color": "blue"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warboard.json");
        std::fs::write(
            &path,
            r#"{"layouts": {"dawn": "maps/dawn.png"}, "label_font": "font.ttf"}"#,
        )
        .unwrap();
        let config = WhiteboardConfig::load(&path).unwrap();
        assert_eq!(config.layouts["dawn"], dir.path().join("maps/dawn.png"));
        assert_eq!(config.label_font, Some(dir.path().join("font.ttf")));
    }

    #[test]
    fn test_missing_file() {
        let err = WhiteboardConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
