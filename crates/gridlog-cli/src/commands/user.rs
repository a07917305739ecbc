use chrono::Utc;
use clap::Subcommand;
use gridlog_core::{resolver, RegionCatalog, UserDirectory, UserProfile};

use super::open_store;

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user, inferring the region from the address
    Add {
        username: String,
        /// Free-text address used for region inference
        #[arg(long)]
        location: Option<String>,
    },
    /// List registered users
    List,
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;

    match action {
        UserAction::Add { username, location } => {
            let region_id = match &location {
                Some(text) => {
                    let resolver = resolver::shared(&store.regions()?);
                    resolver.resolve(text).map(String::from)
                }
                None => None,
            };
            let profile = UserProfile::new(username, Utc::now())
                .with_location(location)
                .with_region(region_id);
            store.upsert_user(&profile)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        UserAction::List => {
            let users = store.users()?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
    }
    Ok(())
}
