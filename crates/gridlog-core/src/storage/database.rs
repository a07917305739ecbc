//! SQLite backend for events, users and region profiles.
//!
//! Timestamps are stored as RFC 3339 text and dates as ISO `YYYY-MM-DD`
//! text, so lexicographic ordering in SQL matches chronological ordering.
//! Region states, keywords and schedule templates are stored as JSON text
//! columns; a template that fails to parse is rejected when the row is
//! read or seeded, never during schedule evaluation.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::{data_dir, EventStore, RegionCatalog, UserDirectory};
use crate::error::DatabaseError;
use crate::event::{EventType, PowerEvent};
use crate::region::RegionProfile;
use crate::user::UserProfile;

/// Parse an event type from its stored string form.
fn parse_event_type(raw: &str) -> EventType {
    match raw {
        "on" => EventType::On,
        _ => EventType::Off,
    }
}

/// Parse a datetime from an RFC 3339 string with fallback to current time.
fn parse_datetime_fallback(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_event(row: &rusqlite::Row) -> Result<PowerEvent, rusqlite::Error> {
    let event_type_str: String = row.get(1)?;
    let timestamp_str: String = row.get(2)?;
    let timestamp = parse_datetime_fallback(&timestamp_str);
    let date_str: String = row.get(3)?;
    let date = date_str
        .parse::<NaiveDate>()
        .unwrap_or_else(|_| timestamp.date_naive());

    Ok(PowerEvent {
        user_id: row.get(0)?,
        event_type: parse_event_type(&event_type_str),
        timestamp,
        date,
        location: row.get(4)?,
        region_id: row.get(5)?,
        auto_generated: row.get(6)?,
    })
}

fn row_to_user(row: &rusqlite::Row) -> Result<UserProfile, rusqlite::Error> {
    let created_at_str: String = row.get(3)?;
    Ok(UserProfile {
        username: row.get(0)?,
        location: row.get(1)?,
        region_id: row.get(2)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

fn json_column<T: serde::de::DeserializeOwned>(
    idx: usize,
    raw: &str,
) -> Result<T, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_region(row: &rusqlite::Row) -> Result<RegionProfile, rusqlite::Error> {
    let states_raw: String = row.get(2)?;
    let keywords_raw: String = row.get(3)?;
    let template_raw: String = row.get(9)?;
    Ok(RegionProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        states: json_column(2, &states_raw)?,
        keywords: json_column(3, &keywords_raw)?,
        avg_offtake_mwh_per_hour: row.get(4)?,
        avg_available_pcc_mwh_per_hour: row.get(5)?,
        utilisation_percent: row.get(6)?,
        estimated_daily_mwh: row.get(7)?,
        estimated_full_load_hours: row.get(8)?,
        schedule_template: json_column(9, &template_raw)?,
        source: row.get(10)?,
    })
}

const EVENT_COLUMNS: &str =
    "user_id, event_type, timestamp, date, location, region_id, auto_generated";
const REGION_COLUMNS: &str = "id, name, states, keywords, avg_offtake_mwh_per_hour, \
     avg_available_pcc_mwh_per_hour, utilisation_percent, estimated_daily_mwh, \
     estimated_full_load_hours, schedule_template, source";

/// SQLite database holding the event log, user directory and region catalog.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `data_dir()/gridlog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::OpenFailed {
                path: "<data dir>".into(),
                source: rusqlite::Error::InvalidPath(e.to_string().into()),
            })?
            .join("gridlog.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS power_events (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id        TEXT NOT NULL,
                    event_type     TEXT NOT NULL,
                    timestamp      TEXT NOT NULL,
                    date           TEXT NOT NULL,
                    location       TEXT,
                    region_id      TEXT,
                    auto_generated INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS users (
                    username   TEXT PRIMARY KEY,
                    location   TEXT,
                    region_id  TEXT,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS region_profiles (
                    id                            TEXT PRIMARY KEY,
                    name                          TEXT NOT NULL,
                    states                        TEXT NOT NULL,
                    keywords                      TEXT NOT NULL,
                    avg_offtake_mwh_per_hour      REAL NOT NULL,
                    avg_available_pcc_mwh_per_hour REAL NOT NULL,
                    utilisation_percent           REAL NOT NULL,
                    estimated_daily_mwh           REAL NOT NULL,
                    estimated_full_load_hours     REAL NOT NULL,
                    schedule_template             TEXT NOT NULL,
                    source                        TEXT NOT NULL
                );

                -- Indexes for the common query patterns
                CREATE INDEX IF NOT EXISTS idx_power_events_user_ts
                    ON power_events(user_id, timestamp);
                CREATE INDEX IF NOT EXISTS idx_power_events_user_date
                    ON power_events(user_id, date);
                CREATE INDEX IF NOT EXISTS idx_users_region ON users(region_id);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert or replace the given region profiles.
    pub fn seed_regions(&self, regions: &[RegionProfile]) -> Result<(), DatabaseError> {
        for region in regions {
            self.conn.execute(
                "INSERT OR REPLACE INTO region_profiles
                 (id, name, states, keywords, avg_offtake_mwh_per_hour,
                  avg_available_pcc_mwh_per_hour, utilisation_percent,
                  estimated_daily_mwh, estimated_full_load_hours,
                  schedule_template, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    region.id,
                    region.name,
                    serde_json::to_string(&region.states)
                        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?,
                    serde_json::to_string(&region.keywords)
                        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?,
                    region.avg_offtake_mwh_per_hour,
                    region.avg_available_pcc_mwh_per_hour,
                    region.utilisation_percent,
                    region.estimated_daily_mwh,
                    region.estimated_full_load_hours,
                    serde_json::to_string(&region.schedule_template)
                        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?,
                    region.source,
                ],
            )?;
        }
        Ok(())
    }
}

impl EventStore for Database {
    type Error = DatabaseError;

    fn append(&self, event: &PowerEvent) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO power_events
             (user_id, event_type, timestamp, date, location, region_id, auto_generated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.user_id,
                event.event_type.as_str(),
                event.timestamp.to_rfc3339(),
                event.date.to_string(),
                event.location,
                event.region_id,
                event.auto_generated,
            ],
        )?;
        Ok(())
    }

    fn events_for_user(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<PowerEvent>, DatabaseError> {
        let mut sql = format!("SELECT {EVENT_COLUMNS} FROM power_events WHERE user_id = ?1");
        let mut bindings: Vec<String> = vec![user_id.to_string()];
        if let Some(from) = from {
            bindings.push(from.to_string());
            sql.push_str(&format!(" AND date >= ?{}", bindings.len()));
        }
        if let Some(to) = to {
            bindings.push(to.to_string());
            sql.push_str(&format!(" AND date <= ?{}", bindings.len()));
        }
        sql.push_str(" ORDER BY timestamp ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings.iter()), row_to_event)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    fn recent_events(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<PowerEvent>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM power_events
             WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![user_id, limit as i64], row_to_event)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    fn latest_event(&self, user_id: &str) -> Result<Option<PowerEvent>, DatabaseError> {
        let event = self
            .conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM power_events
                     WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT 1"
                ),
                params![user_id],
                row_to_event,
            )
            .optional()?;
        Ok(event)
    }
}

impl RegionCatalog for Database {
    type Error = DatabaseError;

    fn regions(&self) -> Result<Vec<RegionProfile>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REGION_COLUMNS} FROM region_profiles ORDER BY id"
        ))?;
        let rows = stmt.query_map([], row_to_region)?;
        let mut regions = Vec::new();
        for row in rows {
            regions.push(row?);
        }
        Ok(regions)
    }

    fn region(&self, id: &str) -> Result<Option<RegionProfile>, DatabaseError> {
        let region = self
            .conn
            .query_row(
                &format!("SELECT {REGION_COLUMNS} FROM region_profiles WHERE id = ?1"),
                params![id],
                row_to_region,
            )
            .optional()?;
        Ok(region)
    }
}

impl UserDirectory for Database {
    type Error = DatabaseError;

    fn upsert_user(&self, user: &UserProfile) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO users (username, location, region_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user.username,
                user.location,
                user.region_id,
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn user(&self, username: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let user = self
            .conn
            .query_row(
                "SELECT username, location, region_id, created_at FROM users
                 WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn users(&self) -> Result<Vec<UserProfile>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT username, location, region_id, created_at FROM users ORDER BY username",
        )?;
        let rows = stmt.query_map([], row_to_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn users_in_region(&self, region_id: &str) -> Result<Vec<UserProfile>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT username, location, region_id, created_at FROM users
             WHERE region_id = ?1 ORDER BY username",
        )?;
        let rows = stmt.query_map(params![region_id], row_to_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::seed::builtin_regions;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn append_and_query_roundtrip() {
        let db = Database::open_memory().unwrap();
        let event = PowerEvent::new("ada", EventType::On, ts(10, 8))
            .with_location(Some("Lekki".to_string()))
            .with_region(Some("eko".to_string()));
        db.append(&event).unwrap();
        db.append(&PowerEvent::new("ada", EventType::Off, ts(10, 10)))
            .unwrap();
        // Another user's events stay out of ada's stream.
        db.append(&PowerEvent::new("bello", EventType::On, ts(10, 9)))
            .unwrap();

        let events = db.events_for_user("ada", None, None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::On);
        assert_eq!(events[0].location.as_deref(), Some("Lekki"));
        assert_eq!(events[0].region_id.as_deref(), Some("eko"));
        assert_eq!(events[1].event_type, EventType::Off);
    }

    #[test]
    fn date_range_filters_are_inclusive() {
        let db = Database::open_memory().unwrap();
        for day in [8, 9, 10, 11] {
            db.append(&PowerEvent::new("ada", EventType::On, ts(day, 8)))
                .unwrap();
        }
        let from = ts(9, 0).date_naive();
        let to = ts(10, 0).date_naive();
        let events = db.events_for_user("ada", Some(from), Some(to)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].date, from);
        assert_eq!(events[1].date, to);
    }

    #[test]
    fn recent_and_latest_are_descending() {
        let db = Database::open_memory().unwrap();
        for hour in [6, 9, 12] {
            db.append(&PowerEvent::new("ada", EventType::On, ts(10, hour)))
                .unwrap();
        }
        let recent = db.recent_events("ada", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, ts(10, 12));
        assert_eq!(recent[1].timestamp, ts(10, 9));

        let latest = db.latest_event("ada").unwrap().unwrap();
        assert_eq!(latest.timestamp, ts(10, 12));
        assert!(db.latest_event("nobody").unwrap().is_none());
    }

    #[test]
    fn region_seed_roundtrip() {
        let db = Database::open_memory().unwrap();
        let regions = builtin_regions().unwrap();
        db.seed_regions(&regions).unwrap();

        let loaded = db.regions().unwrap();
        assert_eq!(loaded.len(), regions.len());

        let eko = db.region("eko").unwrap().unwrap();
        assert_eq!(eko.name, "Eko Electricity Distribution Plc (EKEDC)");
        assert!(eko.keywords.contains(&"victoria island".to_string()));
        assert!(!eko.schedule_template.is_empty());
        assert!(db.region("mars").unwrap().is_none());

        // Seeding twice replaces rather than duplicates.
        db.seed_regions(&regions).unwrap();
        assert_eq!(db.regions().unwrap().len(), regions.len());
    }

    #[test]
    fn user_directory_roundtrip() {
        let db = Database::open_memory().unwrap();
        let ada = UserProfile::new("ada", ts(1, 0))
            .with_location(Some("Lekki".to_string()))
            .with_region(Some("eko".to_string()));
        let bello = UserProfile::new("bello", ts(1, 0)).with_region(Some("kaduna".to_string()));
        db.upsert_user(&ada).unwrap();
        db.upsert_user(&bello).unwrap();

        assert_eq!(db.users().unwrap().len(), 2);
        let found = db.user("ada").unwrap().unwrap();
        assert_eq!(found.region_id.as_deref(), Some("eko"));
        assert!(db.user("nobody").unwrap().is_none());

        let in_eko = db.users_in_region("eko").unwrap();
        assert_eq!(in_eko.len(), 1);
        assert_eq!(in_eko[0].username, "ada");

        // Upsert overwrites the existing row.
        db.upsert_user(&ada.clone().with_region(Some("ikeja".to_string())))
            .unwrap();
        assert_eq!(db.users().unwrap().len(), 2);
        assert_eq!(
            db.user("ada").unwrap().unwrap().region_id.as_deref(),
            Some("ikeja")
        );
    }
}
