//! JSON-file backend, the fallback when SQLite is not wanted.
//!
//! Each collection lives in its own pretty-printed JSON file in the data
//! directory. Operations load, filter and save per call; the files are the
//! source of truth and no state is held in memory between calls.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{data_dir, EventStore, RegionCatalog, UserDirectory};
use crate::error::{CoreError, Result};
use crate::event::PowerEvent;
use crate::region::RegionProfile;
use crate::user::UserProfile;

const USERS_FILE: &str = "users.json";
const EVENTS_FILE: &str = "power_events.json";
const REGIONS_FILE: &str = "region_profiles.json";

/// File-based storage backend.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open the store in `data_dir()`.
    pub fn open() -> Result<Self> {
        Ok(Self { dir: data_dir()? })
    }

    /// Open the store in an explicit directory (used by tests).
    pub fn open_at(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save<T: Serialize>(&self, file: &str, items: &[T]) -> Result<()> {
        let content = serde_json::to_string_pretty(items)?;
        std::fs::write(self.dir.join(file), content)?;
        Ok(())
    }

    /// Replace the stored region catalog.
    pub fn seed_regions(&self, regions: &[RegionProfile]) -> Result<()> {
        self.save(REGIONS_FILE, regions)
    }
}

impl EventStore for FileStore {
    type Error = CoreError;

    fn append(&self, event: &PowerEvent) -> Result<()> {
        let mut events: Vec<PowerEvent> = self.load(EVENTS_FILE)?;
        events.push(event.clone());
        self.save(EVENTS_FILE, &events)
    }

    fn events_for_user(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PowerEvent>> {
        let mut events: Vec<PowerEvent> = self
            .load::<PowerEvent>(EVENTS_FILE)?
            .into_iter()
            .filter(|event| event.user_id == user_id)
            .filter(|event| from.map_or(true, |from| event.date >= from))
            .filter(|event| to.map_or(true, |to| event.date <= to))
            .collect();
        events.sort_by_key(|event| event.timestamp);
        Ok(events)
    }

    fn recent_events(&self, user_id: &str, limit: usize) -> Result<Vec<PowerEvent>> {
        let mut events = self.events_for_user(user_id, None, None)?;
        events.reverse();
        events.truncate(limit);
        Ok(events)
    }

    fn latest_event(&self, user_id: &str) -> Result<Option<PowerEvent>> {
        Ok(self.recent_events(user_id, 1)?.into_iter().next())
    }
}

impl RegionCatalog for FileStore {
    type Error = CoreError;

    fn regions(&self) -> Result<Vec<RegionProfile>> {
        self.load(REGIONS_FILE)
    }

    fn region(&self, id: &str) -> Result<Option<RegionProfile>> {
        Ok(self
            .regions()?
            .into_iter()
            .find(|region| region.id == id))
    }
}

impl UserDirectory for FileStore {
    type Error = CoreError;

    fn upsert_user(&self, user: &UserProfile) -> Result<()> {
        let mut users: Vec<UserProfile> = self.load(USERS_FILE)?;
        users.retain(|existing| existing.username != user.username);
        users.push(user.clone());
        users.sort_by(|a, b| a.username.cmp(&b.username));
        self.save(USERS_FILE, &users)
    }

    fn user(&self, username: &str) -> Result<Option<UserProfile>> {
        Ok(self
            .load::<UserProfile>(USERS_FILE)?
            .into_iter()
            .find(|user| user.username == username))
    }

    fn users(&self) -> Result<Vec<UserProfile>> {
        self.load(USERS_FILE)
    }

    fn users_in_region(&self, region_id: &str) -> Result<Vec<UserProfile>> {
        Ok(self
            .load::<UserProfile>(USERS_FILE)?
            .into_iter()
            .filter(|user| user.region_id.as_deref() == Some(region_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::region::seed::builtin_regions;
    use chrono::{TimeZone, Utc};

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open_at(dir.path()).unwrap();
        (dir, store)
    }

    fn ts(day: u32, hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn append_and_query_roundtrip() {
        let (_dir, store) = store();
        store
            .append(&PowerEvent::new("ada", EventType::On, ts(10, 8)))
            .unwrap();
        store
            .append(&PowerEvent::new("ada", EventType::Off, ts(10, 10)))
            .unwrap();
        store
            .append(&PowerEvent::new("bello", EventType::On, ts(10, 9)))
            .unwrap();

        let events = store.events_for_user("ada", None, None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::On);
        assert_eq!(events[1].event_type, EventType::Off);

        let latest = store.latest_event("ada").unwrap().unwrap();
        assert_eq!(latest.timestamp, ts(10, 10));
    }

    #[test]
    fn date_range_filters_are_inclusive() {
        let (_dir, store) = store();
        for day in [8, 9, 10, 11] {
            store
                .append(&PowerEvent::new("ada", EventType::On, ts(day, 8)))
                .unwrap();
        }
        let from = ts(9, 0).date_naive();
        let to = ts(10, 0).date_naive();
        let events = store.events_for_user("ada", Some(from), Some(to)).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn region_seed_roundtrip() {
        let (_dir, store) = store();
        assert!(store.regions().unwrap().is_empty());
        let regions = builtin_regions().unwrap();
        store.seed_regions(&regions).unwrap();
        assert_eq!(store.regions().unwrap().len(), regions.len());
        let eko = store.region("eko").unwrap().unwrap();
        assert!(!eko.schedule_template.is_empty());
    }

    #[test]
    fn upsert_replaces_existing_user() {
        let (_dir, store) = store();
        let ada = UserProfile::new("ada", ts(1, 0)).with_region(Some("eko".to_string()));
        store.upsert_user(&ada).unwrap();
        store
            .upsert_user(&ada.clone().with_region(Some("ikeja".to_string())))
            .unwrap();
        assert_eq!(store.users().unwrap().len(), 1);
        assert_eq!(
            store.user("ada").unwrap().unwrap().region_id.as_deref(),
            Some("ikeja")
        );
        assert_eq!(store.users_in_region("eko").unwrap().len(), 0);
        assert_eq!(store.users_in_region("ikeja").unwrap().len(), 1);
    }
}
