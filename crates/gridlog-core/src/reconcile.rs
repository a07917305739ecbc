//! Periodic reconciliation of user timelines with regional schedules.
//!
//! For users who log nothing, the grid's expected state is still known from
//! their region's schedule template. One reconciliation tick walks every
//! region, derives the desired ON/OFF state for the current instant, and
//! appends a synthetic event for each assigned user whose latest event
//! disagrees. A tick is idempotent: running it twice with the same instant
//! and no intervening manual events creates nothing the second time.
//!
//! The tick is single-threaded and non-reentrant; the sleep-and-repeat loop
//! that drives it lives with the caller.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventType, PowerEvent};
use crate::region::RegionProfile;
use crate::storage::{EventStore, RegionCatalog, UserDirectory};
use crate::user::UserProfile;
use crate::{CoreError, Result};

/// Default seconds between ticks when the loop is self-driven.
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// Configuration for the reconciliation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Seconds between ticks. Default: 3600 (hourly).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Count without persisting. Default: false.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            dry_run: false,
        }
    }
}

impl ReconcilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A store failure recorded during a tick.
///
/// Failures never abort the tick; the remaining users and regions are still
/// processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickFailure {
    pub region_id: String,
    pub user_id: Option<String>,
    pub message: String,
}

/// Outcome of one reconciliation tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSummary {
    pub at: DateTime<Utc>,
    pub dry_run: bool,
    pub regions_processed: usize,
    pub users_checked: usize,
    pub events_created: usize,
    pub failures: Vec<TickFailure>,
}

impl TickSummary {
    fn new(at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            at,
            dry_run,
            regions_processed: 0,
            users_checked: 0,
            events_created: 0,
            failures: Vec::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Human-readable one-liner for logs and the CLI.
    pub fn message(&self) -> String {
        let suffix = if self.dry_run { " (dry-run)" } else { "" };
        format!(
            "Processed {} regions and queued {} events{}",
            self.regions_processed, self.events_created, suffix
        )
    }
}

/// Engine that drives one reconciliation tick at a time.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            config: ReconcilerConfig::default(),
        }
    }

    pub fn with_config(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// The event the region's schedule expects at this time of day.
    pub fn desired_event(region: &RegionProfile, at: NaiveTime) -> EventType {
        if region.should_be_on(at) {
            EventType::On
        } else {
            EventType::Off
        }
    }

    /// Bring every user assigned to the region in line with the expected
    /// state, returning the number of events created (or, in dry-run, that
    /// would be created) and any per-user failures.
    pub fn sync_region<S: EventStore>(
        &self,
        store: &S,
        region: &RegionProfile,
        users: &[UserProfile],
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> (usize, Vec<TickFailure>) {
        let desired = Self::desired_event(region, now.time());
        let mut created = 0;
        let mut failures = Vec::new();

        for user in users {
            let latest = match store.latest_event(&user.username) {
                Ok(latest) => latest,
                Err(e) => {
                    tracing::warn!(
                        user = %user.username,
                        region = %region.id,
                        error = %e,
                        "failed to read latest event"
                    );
                    failures.push(TickFailure {
                        region_id: region.id.clone(),
                        user_id: Some(user.username.clone()),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            if matches!(latest, Some(ref last) if last.event_type == desired) {
                continue;
            }
            if dry_run {
                created += 1;
                continue;
            }
            let event = PowerEvent::new(&user.username, desired, now)
                .with_location(user.location.clone())
                .with_region(Some(region.id.clone()))
                .with_auto_generated(true);
            match store.append(&event) {
                Ok(()) => created += 1,
                Err(e) => {
                    tracing::warn!(
                        user = %user.username,
                        region = %region.id,
                        error = %e,
                        "failed to append reconciliation event"
                    );
                    failures.push(TickFailure {
                        region_id: region.id.clone(),
                        user_id: Some(user.username.clone()),
                        message: e.to_string(),
                    });
                }
            }
        }

        (created, failures)
    }

    /// Run one tick over the whole catalog.
    ///
    /// Fails only when the catalog itself cannot be read; store failures for
    /// individual users or regions are recorded in the summary and skipped.
    pub fn run_tick<S, C, D>(
        &self,
        store: &S,
        catalog: &C,
        directory: &D,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<TickSummary>
    where
        S: EventStore,
        C: RegionCatalog,
        D: UserDirectory,
    {
        let regions = catalog
            .regions()
            .map_err(|e| CoreError::Custom(e.to_string()))?;
        let mut summary = TickSummary::new(now, dry_run);

        for region in &regions {
            summary.regions_processed += 1;
            let users = match directory.users_in_region(&region.id) {
                Ok(users) => users,
                Err(e) => {
                    tracing::warn!(region = %region.id, error = %e, "failed to list region users");
                    summary.failures.push(TickFailure {
                        region_id: region.id.clone(),
                        user_id: None,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            if users.is_empty() {
                continue;
            }
            summary.users_checked += users.len();
            let (created, failures) = self.sync_region(store, region, &users, now, dry_run);
            summary.events_created += created;
            summary.failures.extend(failures);
        }

        tracing::info!(
            regions = summary.regions_processed,
            users = summary.users_checked,
            events = summary.events_created,
            failures = summary.failures.len(),
            dry_run,
            "reconciliation tick complete"
        );
        Ok(summary)
    }
}
