//! End-to-end reconciliation over the SQLite backend.

use chrono::{DateTime, TimeZone, Utc};
use gridlog_core::{
    Database, EventStore, EventType, PowerEvent, Reconciler, UserDirectory, UserProfile,
};

fn seeded_db() -> Database {
    let db = Database::open_memory().unwrap();
    db.seed_regions(&gridlog_core::seed::builtin_regions().unwrap())
        .unwrap();
    let created = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    // benin's template expects ON all day; kaduna is OFF at noon.
    db.upsert_user(&UserProfile::new("ada", created).with_region(Some("benin".to_string())))
        .unwrap();
    db.upsert_user(&UserProfile::new("bello", created).with_region(Some("kaduna".to_string())))
        .unwrap();
    // A user with no region assignment is never touched by the tick.
    db.upsert_user(&UserProfile::new("chidi", created)).unwrap();
    db
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
}

#[test]
fn tick_fills_silent_timelines_and_is_idempotent() {
    let db = seeded_db();
    let reconciler = Reconciler::new();

    let first = reconciler.run_tick(&db, &db, &db, noon(), false).unwrap();
    assert_eq!(first.regions_processed, 11);
    assert_eq!(first.users_checked, 2);
    assert_eq!(first.events_created, 2);
    assert!(!first.has_failures());

    let ada = db.latest_event("ada").unwrap().unwrap();
    assert_eq!(ada.event_type, EventType::On);
    assert_eq!(ada.region_id.as_deref(), Some("benin"));
    assert!(ada.auto_generated);
    assert_eq!(ada.timestamp, noon());

    let bello = db.latest_event("bello").unwrap().unwrap();
    assert_eq!(bello.event_type, EventType::Off);

    assert!(db.latest_event("chidi").unwrap().is_none());

    // Same instant, no manual events in between: nothing new.
    let second = reconciler.run_tick(&db, &db, &db, noon(), false).unwrap();
    assert_eq!(second.events_created, 0);
    assert_eq!(db.events_for_user("ada", None, None).unwrap().len(), 1);
}

#[test]
fn manual_event_in_between_is_reconciled_again() {
    let db = seeded_db();
    let reconciler = Reconciler::new();
    reconciler.run_tick(&db, &db, &db, noon(), false).unwrap();

    // ada reports an outage the schedule says shouldn't exist.
    let later = noon() + chrono::Duration::minutes(30);
    db.append(&PowerEvent::new("ada", EventType::Off, later))
        .unwrap();

    let tick_time = noon() + chrono::Duration::hours(1);
    let summary = reconciler.run_tick(&db, &db, &db, tick_time, false).unwrap();
    assert_eq!(summary.events_created, 1);
    let ada = db.latest_event("ada").unwrap().unwrap();
    assert_eq!(ada.event_type, EventType::On);
    assert_eq!(ada.timestamp, tick_time);
}

#[test]
fn dry_run_tick_persists_nothing() {
    let db = seeded_db();
    let summary = Reconciler::new().run_tick(&db, &db, &db, noon(), true).unwrap();
    assert!(summary.dry_run);
    assert_eq!(summary.events_created, 2);
    assert!(db.latest_event("ada").unwrap().is_none());
    assert!(db.latest_event("bello").unwrap().is_none());
}
