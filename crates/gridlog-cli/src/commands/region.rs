use clap::Subcommand;
use gridlog_core::{resolver, RegionCatalog};

use super::open_store;

#[derive(Subcommand)]
pub enum RegionAction {
    /// List the region catalog
    List,
    /// Show one region profile
    Show { id: String },
    /// Resolve a free-text location to a region id
    Resolve { location: String },
}

pub fn run(action: RegionAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        RegionAction::List => {
            let regions = store.regions()?;
            println!("{}", serde_json::to_string_pretty(&regions)?);
        }
        RegionAction::Show { id } => match store.region(&id)? {
            Some(region) => println!("{}", serde_json::to_string_pretty(&region)?),
            None => return Err(format!("unknown region '{id}'").into()),
        },
        RegionAction::Resolve { location } => {
            let resolver = resolver::shared(&store.regions()?);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "location": location,
                    "region_id": resolver.resolve(&location),
                }))?
            );
        }
    }
    Ok(())
}
