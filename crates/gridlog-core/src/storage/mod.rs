//! Storage boundary: collaborator traits and backend selection.
//!
//! The engine reads and writes through three narrow seams -- the event
//! store, the region catalog and the user directory -- so the computation
//! core never knows which backend is underneath. Two backends are provided:
//! SQLite (default) and plain JSON files.

pub mod config;
pub mod database;
pub mod file;

pub use config::{Config, StorageMode};
pub use database::Database;
pub use file::FileStore;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{CoreError, Result};
use crate::event::PowerEvent;
use crate::region::{seed, RegionProfile};
use crate::user::UserProfile;

/// Append-only store of power events.
///
/// Appended events are immutable; the store provides atomic single-row
/// append semantics and performs no retries.
pub trait EventStore {
    type Error: std::fmt::Display;

    fn append(&self, event: &PowerEvent) -> Result<(), Self::Error>;

    /// A user's events, ascending by timestamp, optionally bounded by
    /// calendar date (inclusive on both ends).
    fn events_for_user(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PowerEvent>, Self::Error>;

    /// A user's most recent events, descending by timestamp.
    fn recent_events(&self, user_id: &str, limit: usize) -> Result<Vec<PowerEvent>, Self::Error>;

    fn latest_event(&self, user_id: &str) -> Result<Option<PowerEvent>, Self::Error>;
}

/// Read access to the seeded region catalog.
pub trait RegionCatalog {
    type Error: std::fmt::Display;

    fn regions(&self) -> Result<Vec<RegionProfile>, Self::Error>;

    fn region(&self, id: &str) -> Result<Option<RegionProfile>, Self::Error>;
}

/// Registry of users and their region assignments.
pub trait UserDirectory {
    type Error: std::fmt::Display;

    fn upsert_user(&self, user: &UserProfile) -> Result<(), Self::Error>;

    fn user(&self, username: &str) -> Result<Option<UserProfile>, Self::Error>;

    fn users(&self) -> Result<Vec<UserProfile>, Self::Error>;

    fn users_in_region(&self, region_id: &str) -> Result<Vec<UserProfile>, Self::Error>;
}

/// Returns `~/.config/gridlog[-dev]/` based on GRIDLOG_ENV.
///
/// Set GRIDLOG_ENV=dev to use the development data directory, or
/// GRIDLOG_DATA_DIR to pin an explicit path (used by tests).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("GRIDLOG_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("GRIDLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("gridlog-dev")
    } else {
        base_dir.join("gridlog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Backend selected by `storage.mode` in the config.
pub enum Store {
    Sqlite(Database),
    File(FileStore),
}

impl Store {
    pub fn open(config: &Config) -> Result<Self> {
        match config.storage.mode {
            StorageMode::Sqlite => Ok(Store::Sqlite(Database::open()?)),
            StorageMode::File => Ok(Store::File(FileStore::open()?)),
        }
    }

    /// Seed the built-in region catalog if the backend has none yet.
    ///
    /// Returns the number of regions written (zero when already seeded).
    /// Malformed seed templates fail here, before any tick can run.
    pub fn ensure_seeded(&self) -> Result<usize> {
        if !self.regions()?.is_empty() {
            return Ok(0);
        }
        let regions = seed::builtin_regions()?;
        match self {
            Store::Sqlite(db) => db.seed_regions(&regions)?,
            Store::File(store) => store.seed_regions(&regions)?,
        }
        tracing::info!(count = regions.len(), "seeded built-in region catalog");
        Ok(regions.len())
    }
}

impl EventStore for Store {
    type Error = CoreError;

    fn append(&self, event: &PowerEvent) -> Result<()> {
        match self {
            Store::Sqlite(db) => db.append(event).map_err(CoreError::from),
            Store::File(store) => store.append(event),
        }
    }

    fn events_for_user(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PowerEvent>> {
        match self {
            Store::Sqlite(db) => db.events_for_user(user_id, from, to).map_err(CoreError::from),
            Store::File(store) => store.events_for_user(user_id, from, to),
        }
    }

    fn recent_events(&self, user_id: &str, limit: usize) -> Result<Vec<PowerEvent>> {
        match self {
            Store::Sqlite(db) => db.recent_events(user_id, limit).map_err(CoreError::from),
            Store::File(store) => store.recent_events(user_id, limit),
        }
    }

    fn latest_event(&self, user_id: &str) -> Result<Option<PowerEvent>> {
        match self {
            Store::Sqlite(db) => db.latest_event(user_id).map_err(CoreError::from),
            Store::File(store) => store.latest_event(user_id),
        }
    }
}

impl RegionCatalog for Store {
    type Error = CoreError;

    fn regions(&self) -> Result<Vec<RegionProfile>> {
        match self {
            Store::Sqlite(db) => db.regions().map_err(CoreError::from),
            Store::File(store) => store.regions(),
        }
    }

    fn region(&self, id: &str) -> Result<Option<RegionProfile>> {
        match self {
            Store::Sqlite(db) => db.region(id).map_err(CoreError::from),
            Store::File(store) => store.region(id),
        }
    }
}

impl UserDirectory for Store {
    type Error = CoreError;

    fn upsert_user(&self, user: &UserProfile) -> Result<()> {
        match self {
            Store::Sqlite(db) => db.upsert_user(user).map_err(CoreError::from),
            Store::File(store) => store.upsert_user(user),
        }
    }

    fn user(&self, username: &str) -> Result<Option<UserProfile>> {
        match self {
            Store::Sqlite(db) => db.user(username).map_err(CoreError::from),
            Store::File(store) => store.user(username),
        }
    }

    fn users(&self) -> Result<Vec<UserProfile>> {
        match self {
            Store::Sqlite(db) => db.users().map_err(CoreError::from),
            Store::File(store) => store.users(),
        }
    }

    fn users_in_region(&self, region_id: &str) -> Result<Vec<UserProfile>> {
        match self {
            Store::Sqlite(db) => db.users_in_region(region_id).map_err(CoreError::from),
            Store::File(store) => store.users_in_region(region_id),
        }
    }
}
