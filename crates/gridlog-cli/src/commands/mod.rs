pub mod log;
pub mod recent;
pub mod reconcile;
pub mod region;
pub mod report;
pub mod sample;
pub mod stats;
pub mod user;

use gridlog_core::{Config, Store};

/// Open the configured backend with the region catalog seeded.
pub fn open_store() -> Result<Store, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = Store::open(&config)?;
    store.ensure_seeded()?;
    Ok(store)
}
