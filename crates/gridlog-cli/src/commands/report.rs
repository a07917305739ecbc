use chrono::Utc;
use gridlog_core::{compute_report, EventStore};

use super::open_store;

pub fn run(user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let events = store.events_for_user(user, None, None)?;
    let report = compute_report(&events, Utc::now());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
