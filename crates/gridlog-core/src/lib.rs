//! # Gridlog Core Library
//!
//! This library provides the core business logic for Gridlog, an
//! electricity-supply availability logger. Users log discrete power ON/OFF
//! events; the library reconstructs how many hours of supply they actually
//! had, and keeps silent users' timelines consistent with their region's
//! expected supply schedule.
//!
//! ## Architecture
//!
//! - **Timeline**: pure single-pass reconstruction of ON-duration intervals
//!   from an ordered event stream, with per-day and per-window aggregation
//! - **Regions**: seeded distribution-company profiles with time-of-day
//!   schedule templates, plus free-text location resolution
//! - **Reconciliation**: a periodic tick that appends synthetic events
//!   where a user's latest event disagrees with the regional schedule
//! - **Storage**: SQLite-based event log and catalog, with a JSON-file
//!   fallback and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`compute_stats`] / [`compute_report`]: aggregation entry points
//! - [`RegionResolver`]: location-to-region matching
//! - [`Reconciler`]: the reconciliation tick engine
//! - [`Database`] / [`FileStore`] / [`Store`]: storage backends

pub mod error;
pub mod event;
pub mod reconcile;
pub mod region;
pub mod sample;
pub mod storage;
pub mod timeline;
pub mod user;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ScheduleError};
pub use event::{EventType, PowerEvent};
pub use reconcile::{Reconciler, ReconcilerConfig, TickFailure, TickSummary};
pub use region::{resolver, seed, RegionProfile, RegionResolver, ScheduleBlock};
pub use sample::{generate_sample_events, SampleOptions};
pub use storage::{
    Config, Database, EventStore, FileStore, RegionCatalog, StorageMode, Store, UserDirectory,
};
pub use timeline::{
    compute_report, compute_stats, reconstruct, DailyBucket, DailyHours, LastEvent, Period,
    PeriodStats, UsageReport, WindowCounts,
};
pub use user::UserProfile;
