use chrono::Utc;
use gridlog_core::{compute_stats, EventStore, Period};

use super::open_store;

pub fn run(user: &str, period: &str, recent: usize) -> Result<(), Box<dyn std::error::Error>> {
    let period: Period = period.parse()?;
    let store = open_store()?;
    let events = store.events_for_user(user, None, None)?;
    let stats = compute_stats(&events, period, Utc::now(), recent);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
