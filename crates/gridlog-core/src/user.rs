use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered logger of power events.
///
/// Authentication lives outside the engine; the profile carries only what
/// region assignment and reconciliation need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub location: Option<String>,
    pub region_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            location: None,
            region_id: None,
            created_at,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn with_region(mut self, region_id: Option<String>) -> Self {
        self.region_id = region_id;
        self
    }
}
