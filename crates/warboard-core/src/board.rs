//! Game-table size presets and the canvas dimensions they map to.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named table size. Each maps to fixed canvas pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardPreset {
    KillTeam,
    #[default]
    Incursion,
    StrikeForce,
    Onslaught,
    Custom,
}

/// Canvas pixel dimensions of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub width: u32,
    pub height: u32,
}

impl BoardSize {
    /// Dimensions are clamped to at least one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn as_size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl BoardPreset {
    pub const ALL: [BoardPreset; 5] = [
        BoardPreset::KillTeam,
        BoardPreset::Incursion,
        BoardPreset::StrikeForce,
        BoardPreset::Onslaught,
        BoardPreset::Custom,
    ];

    /// Key used by controls and config files.
    pub fn key(self) -> &'static str {
        match self {
            BoardPreset::KillTeam => "killteam",
            BoardPreset::Incursion => "incursion",
            BoardPreset::StrikeForce => "strikeforce",
            BoardPreset::Onslaught => "onslaught",
            BoardPreset::Custom => "custom",
        }
    }

    /// Human-readable name with the physical table size.
    pub fn display_name(self) -> &'static str {
        match self {
            BoardPreset::KillTeam => "Kill Team (22\" x 16\")",
            BoardPreset::Incursion => "Incursion (44\" x 30\")",
            BoardPreset::StrikeForce => "Strike Force (44\" x 36\")",
            BoardPreset::Onslaught => "Onslaught (44\" x 45\")",
            BoardPreset::Custom => "Custom Size",
        }
    }

    /// Canvas size for this preset. `custom` supplies the custom dimensions.
    pub fn size(self, custom: BoardSize) -> BoardSize {
        match self {
            BoardPreset::KillTeam => BoardSize::new(600, 440),
            BoardPreset::Incursion => BoardSize::new(800, 600),
            BoardPreset::StrikeForce => BoardSize::new(960, 720),
            BoardPreset::Onslaught => BoardSize::new(1200, 900),
            BoardPreset::Custom => custom,
        }
    }
}

impl fmt::Display for BoardPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BoardPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        BoardPreset::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(|| format!("Unknown board preset: {s}"))
    }
}
