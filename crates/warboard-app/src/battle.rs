//! Turn and phase tracking around the whiteboard, with auto-save.

use std::time::Instant;
use warboard_core::storage::StorageResult;
use warboard_core::{AutoSave, BattleSession, HistoryEntry, Phase, Storage, WhiteboardConfig};

/// The battle session plus its persistence. Every mutation marks the
/// session dirty; the host's timer calls [`Battle::tick`].
pub struct Battle<S: Storage> {
    session: BattleSession,
    autosave: AutoSave<S>,
}

impl<S: Storage> Battle<S> {
    /// Restore the saved session, or start a new battle when there is none
    /// or it is too old.
    pub fn restore(storage: S, config: &WhiteboardConfig) -> StorageResult<Self> {
        let autosave = AutoSave::from_config(storage, config);
        let session = match autosave.store().load()? {
            Some(session) => {
                log::info!(
                    "Restored battle at turn {}, {}",
                    session.current_turn,
                    session.current_phase
                );
                session
            }
            None => {
                let mut session = BattleSession::new();
                session.start_battle();
                session
            }
        };
        Ok(Self { session, autosave })
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    pub fn switch_phase(&mut self, phase: Phase) {
        self.session.switch_phase(phase);
        self.autosave.mark_dirty();
    }

    /// Notes for the current phase.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        let phase = self.session.current_phase;
        self.session.set_notes(phase, notes);
        self.autosave.mark_dirty();
    }

    /// Attach an image (opaque data string) to the current phase.
    pub fn attach_image(&mut self, image: impl Into<String>) {
        let phase = self.session.current_phase;
        self.session.attach_image(phase, image);
        self.autosave.mark_dirty();
    }

    pub fn next_turn(&mut self) -> Vec<HistoryEntry> {
        let history = self.session.next_turn();
        self.autosave.mark_dirty();
        history
    }

    /// Start over and drop the saved session.
    pub fn reset(&mut self) -> StorageResult<()> {
        self.session.reset();
        self.session.start_battle();
        self.autosave.store().clear()
    }

    /// Save if dirty and the interval has passed.
    pub fn tick(&mut self) -> StorageResult<bool> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> StorageResult<bool> {
        self.autosave.tick_at(&self.session, now)
    }

    /// Save now, as on shutdown.
    pub fn save(&mut self) -> StorageResult<()> {
        self.autosave.save(&self.session)
    }
}
