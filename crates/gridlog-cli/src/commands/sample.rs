use chrono::Utc;
use gridlog_core::{generate_sample_events, SampleOptions};

use super::open_store;

pub fn run(
    days: u32,
    min_events: u32,
    max_events: u32,
    seed: Option<u64>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let options = SampleOptions {
        days_back: days,
        min_events_per_day: min_events,
        max_events_per_day: max_events,
        seed,
        dry_run,
    };
    let count = generate_sample_events(&store, &store, &options, Utc::now())?;
    let suffix = if dry_run { " (dry-run)" } else { "" };
    println!("Generated {count} sample events{suffix}");
    Ok(())
}
