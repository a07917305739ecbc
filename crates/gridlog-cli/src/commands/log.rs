use chrono::Utc;
use clap::Subcommand;
use gridlog_core::{resolver, EventStore, EventType, PowerEvent, RegionCatalog, UserDirectory};

use super::open_store;

#[derive(Subcommand)]
pub enum LogAction {
    /// Power came on
    On {
        #[arg(long)]
        user: String,
        /// Free-text location; falls back to the user's saved address
        #[arg(long)]
        location: Option<String>,
    },
    /// Power went off
    Off {
        #[arg(long)]
        user: String,
        #[arg(long)]
        location: Option<String>,
    },
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let (user, location, event_type) = match action {
        LogAction::On { user, location } => (user, location, EventType::On),
        LogAction::Off { user, location } => (user, location, EventType::Off),
    };

    let store = open_store()?;
    let profile = store.user(&user)?;
    let location = location.or_else(|| profile.as_ref().and_then(|p| p.location.clone()));
    let region_id = match &location {
        Some(text) => {
            let resolver = resolver::shared(&store.regions()?);
            resolver.resolve(text).map(String::from)
        }
        None => None,
    }
    .or_else(|| profile.as_ref().and_then(|p| p.region_id.clone()));

    let event = PowerEvent::new(&user, event_type, Utc::now())
        .with_location(location)
        .with_region(region_id);
    store.append(&event)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "message": format!("Power {event_type} logged successfully"),
            "timestamp": event.timestamp.to_rfc3339(),
            "date": event.date,
        }))?
    );
    Ok(())
}
