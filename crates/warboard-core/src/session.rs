//! Battle turn/phase bookkeeping around the whiteboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Phases of a battle round, in play order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Command,
    Movement,
    Shooting,
    Charge,
    Fight,
    Morale,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Command,
        Phase::Movement,
        Phase::Shooting,
        Phase::Charge,
        Phase::Fight,
        Phase::Morale,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Phase::Command => "command",
            Phase::Movement => "movement",
            Phase::Shooting => "shooting",
            Phase::Charge => "charge",
            Phase::Fight => "fight",
            Phase::Morale => "morale",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        let mut chars = key.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
        }
        f.write_str(" Phase")
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Phase::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(|| format!("Unknown phase: {s}"))
    }
}

/// Notes and an attached image for one phase of one turn.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub notes: String,
    /// Opaque image payload (a data URL for browser hosts).
    pub image: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl PhaseRecord {
    fn is_worth_logging(&self) -> bool {
        !self.notes.trim().is_empty() || self.image.is_some()
    }
}

pub type TurnRecord = BTreeMap<Phase, PhaseRecord>;

/// A phase that made it into the battle log when its turn ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub turn: u32,
    pub phase: Phase,
    pub notes: String,
    pub image: Option<String>,
}

/// The persisted battle: current position plus everything recorded so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSession {
    pub current_turn: u32,
    pub current_phase: Phase,
    pub turns: BTreeMap<u32, TurnRecord>,
}

impl Default for BattleSession {
    fn default() -> Self {
        Self {
            current_turn: 1,
            current_phase: Phase::Command,
            turns: BTreeMap::new(),
        }
    }
}

impl BattleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin at turn 1, command phase.
    pub fn start_battle(&mut self) {
        self.initialize_turn(1);
        self.current_phase = Phase::Command;
        log::info!("Battle started");
    }

    /// Create the phase records for `turn` if missing and make it current.
    fn initialize_turn(&mut self, turn: u32) {
        self.turns.entry(turn).or_insert_with(|| {
            Phase::ALL
                .into_iter()
                .map(|p| (p, PhaseRecord::default()))
                .collect()
        });
        self.current_turn = turn;
    }

    fn record_mut(&mut self, phase: Phase) -> &mut PhaseRecord {
        self.turns
            .entry(self.current_turn)
            .or_default()
            .entry(phase)
            .or_default()
    }

    pub fn record(&self, turn: u32, phase: Phase) -> Option<&PhaseRecord> {
        self.turns.get(&turn)?.get(&phase)
    }

    /// Stamp the phase being left, then switch.
    pub fn switch_phase(&mut self, phase: Phase) {
        self.switch_phase_at(phase, Utc::now());
    }

    pub fn switch_phase_at(&mut self, phase: Phase, now: DateTime<Utc>) {
        let leaving = self.current_phase;
        self.record_mut(leaving).timestamp = Some(now);
        self.current_phase = phase;
        log::debug!("Turn {}: {leaving} -> {phase}", self.current_turn);
    }

    pub fn set_notes(&mut self, phase: Phase, notes: impl Into<String>) {
        self.record_mut(phase).notes = notes.into();
    }

    pub fn attach_image(&mut self, phase: Phase, image: impl Into<String>) {
        self.record_mut(phase).image = Some(image.into());
    }

    /// Close the current turn and move to the next one at command phase.
    ///
    /// Returns log entries for every phase of the closed turn that has
    /// non-blank notes or an image, in phase order.
    pub fn next_turn(&mut self) -> Vec<HistoryEntry> {
        self.next_turn_at(Utc::now())
    }

    pub fn next_turn_at(&mut self, now: DateTime<Utc>) -> Vec<HistoryEntry> {
        let closed = self.current_turn;
        let history: Vec<HistoryEntry> = self
            .turns
            .get(&closed)
            .map(|turn| {
                turn.iter()
                    .filter(|(_, record)| record.is_worth_logging())
                    .map(|(phase, record)| HistoryEntry {
                        turn: closed,
                        phase: *phase,
                        notes: record.notes.clone(),
                        image: record.image.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        self.initialize_turn(closed + 1);
        self.switch_phase_at(Phase::Command, now);
        log::info!("Turn {} begins ({} phases logged)", self.current_turn, history.len());
        history
    }

    /// Drop all turns and go back to turn 1.
    pub fn reset(&mut self) {
        *self = Self::default();
        log::info!("Battle reset");
    }
}

/// Visibility of the whiteboard panel.
///
/// Layout measurement is unreliable while hidden, so the host recomputes the
/// canvas size whenever [`WhiteboardPanel::toggle`] reports it became visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WhiteboardPanel {
    visible: bool,
}

impl WhiteboardPanel {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flip visibility. Returns true when the panel just became visible.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}
