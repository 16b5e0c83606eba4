//! Key-value persistence for the battle session.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSave, DEFAULT_AUTOSAVE_INTERVAL_SECS};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::config::WhiteboardConfig;
use crate::session::BattleSession;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed key the session is stored under.
pub const SESSION_KEY: &str = "40k-battle-assistant";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value backend, in the manner of browser local storage.
pub trait Storage {
    fn get(&self, key: &str) -> StorageResult<String>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    fn contains(&self, key: &str) -> StorageResult<bool>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> StorageResult<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn contains(&self, key: &str) -> StorageResult<bool> {
        (**self).contains(key)
    }
}

/// What actually gets written: the session plus when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEnvelope {
    pub saved_at: DateTime<Utc>,
    pub session: BattleSession,
}

/// Saves and restores the [`BattleSession`] under [`SESSION_KEY`],
/// discarding saves older than `max_age`.
pub struct SessionStore<S: Storage> {
    storage: S,
    max_age: Duration,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S, max_age_days: i64) -> Self {
        Self {
            storage,
            max_age: Duration::days(max_age_days),
        }
    }

    /// Store using `session_max_age_days` from the config.
    pub fn from_config(storage: S, config: &WhiteboardConfig) -> Self {
        Self::new(storage, config.session_max_age_days)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn save(&self, session: &BattleSession) -> StorageResult<()> {
        self.save_at(session, Utc::now())
    }

    pub fn save_at(&self, session: &BattleSession, now: DateTime<Utc>) -> StorageResult<()> {
        let envelope = SessionEnvelope {
            saved_at: now,
            session: session.clone(),
        };
        let json = serde_json::to_string(&envelope)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(SESSION_KEY, &json)?;
        log::debug!("Session saved at {now}");
        Ok(())
    }

    /// Restore the saved session. Missing and stale saves yield `None`.
    pub fn load(&self) -> StorageResult<Option<BattleSession>> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&self, now: DateTime<Utc>) -> StorageResult<Option<BattleSession>> {
        let json = match self.storage.get(SESSION_KEY) {
            Ok(json) => json,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let envelope: SessionEnvelope = serde_json::from_str(&json)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        if now - envelope.saved_at > self.max_age {
            log::info!("Discarding session saved at {}", envelope.saved_at);
            return Ok(None);
        }
        Ok(Some(envelope.session))
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Phase;
    use chrono::TimeZone;

    fn saved_session() -> BattleSession {
        let mut session = BattleSession::new();
        session.start_battle();
        session.set_notes(Phase::Movement, "Hold the centre");
        session
    }

    #[test]
    fn test_round_trip_within_max_age() {
        let store = SessionStore::new(MemoryStorage::new(), 7);
        let saved = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store.save_at(&saved_session(), saved).unwrap();

        let loaded = store.load_at(saved + Duration::days(7)).unwrap();
        assert_eq!(loaded, Some(saved_session()));
    }

    #[test]
    fn test_stale_session_discarded() {
        let store = SessionStore::new(MemoryStorage::new(), 7);
        let saved = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store.save_at(&saved_session(), saved).unwrap();

        let later = saved + Duration::days(7) + Duration::seconds(1);
        assert_eq!(store.load_at(later).unwrap(), None);
    }

    #[test]
    fn test_max_age_from_config() {
        let config = WhiteboardConfig {
            session_max_age_days: 1,
            ..WhiteboardConfig::default()
        };
        let store = SessionStore::from_config(MemoryStorage::new(), &config);
        let saved = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store.save_at(&saved_session(), saved).unwrap();

        assert!(store.load_at(saved + Duration::hours(23)).unwrap().is_some());
        assert_eq!(store.load_at(saved + Duration::days(2)).unwrap(), None);
    }

    #[test]
    fn test_missing_session() {
        let store = SessionStore::new(MemoryStorage::new(), 7);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_session_is_an_error() {
        let store = SessionStore::new(MemoryStorage::new(), 7);
        store.storage().set(SESSION_KEY, "{not json").unwrap();
        assert!(matches!(store.load(), Err(StorageError::Serialization(_))));
    }
}
