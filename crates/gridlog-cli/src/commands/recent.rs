use gridlog_core::EventStore;

use super::open_store;

pub fn run(user: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let events = store.recent_events(user, limit)?;
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}
