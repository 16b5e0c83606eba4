//! Periodic session saving.
//!
//! The host owns the timer; it calls [`AutoSave::tick`] on every timer fire
//! and [`AutoSave::mark_dirty`] whenever the session changes.

use super::{SessionStore, Storage, StorageResult};
use crate::config::WhiteboardConfig;
use crate::session::BattleSession;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 10;

/// Tracks unsaved changes and saves at most once per interval.
pub struct AutoSave<S: Storage> {
    store: SessionStore<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
}

impl<S: Storage> AutoSave<S> {
    pub fn new(store: SessionStore<S>) -> Self {
        Self {
            store,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    /// Auto-save with the store age limit and interval from the config.
    pub fn from_config(storage: S, config: &WhiteboardConfig) -> Self {
        Self::new(SessionStore::from_config(storage, config))
            .with_interval(Duration::from_secs(config.autosave_interval_secs))
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty, and either never saved or the interval has passed.
    pub fn should_save(&self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Save if due. Returns true if a save happened.
    pub fn tick(&mut self, session: &BattleSession) -> StorageResult<bool> {
        self.tick_at(session, Instant::now())
    }

    pub fn tick_at(&mut self, session: &BattleSession, now: Instant) -> StorageResult<bool> {
        if !self.should_save(now) {
            return Ok(false);
        }
        self.save_at(session, now)?;
        Ok(true)
    }

    /// Save immediately regardless of the interval.
    pub fn save(&mut self, session: &BattleSession) -> StorageResult<()> {
        self.save_at(session, Instant::now())
    }

    fn save_at(&mut self, session: &BattleSession, now: Instant) -> StorageResult<()> {
        self.store.save(session)?;
        self.last_save = Some(now);
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn autosave() -> AutoSave<MemoryStorage> {
        AutoSave::new(SessionStore::new(MemoryStorage::new(), 7))
    }

    #[test]
    fn test_clean_session_not_saved() {
        let mut auto = autosave();
        assert!(!auto.tick(&BattleSession::new()).unwrap());
        assert_eq!(auto.store().load().unwrap(), None);
    }

    #[test]
    fn test_saves_once_per_interval() {
        let mut auto = autosave();
        let session = BattleSession::new();
        let t0 = Instant::now();

        auto.mark_dirty();
        assert!(auto.tick_at(&session, t0).unwrap());
        assert!(!auto.is_dirty());

        auto.mark_dirty();
        assert!(!auto.tick_at(&session, t0 + Duration::from_secs(5)).unwrap());
        assert!(auto.tick_at(&session, t0 + Duration::from_secs(10)).unwrap());
        assert_eq!(auto.store().load().unwrap(), Some(session));
    }

    #[test]
    fn test_interval_from_config() {
        let config = WhiteboardConfig {
            autosave_interval_secs: 30,
            ..WhiteboardConfig::default()
        };
        let mut auto = AutoSave::from_config(MemoryStorage::new(), &config);
        assert_eq!(auto.interval(), Duration::from_secs(30));

        let session = BattleSession::new();
        let t0 = Instant::now();
        auto.mark_dirty();
        assert!(auto.tick_at(&session, t0).unwrap());
        auto.mark_dirty();
        assert!(!auto.tick_at(&session, t0 + Duration::from_secs(10)).unwrap());
        assert!(auto.tick_at(&session, t0 + Duration::from_secs(30)).unwrap());
    }

    #[test]
    fn test_custom_interval() {
        let auto = autosave().with_interval(Duration::from_secs(60));
        assert_eq!(auto.interval(), Duration::from_secs(60));
    }
}
