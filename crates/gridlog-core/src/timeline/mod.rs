//! Power-availability timeline reconstruction and aggregation.
//!
//! The event stream is sparse and irregular: users log ON and OFF moments,
//! the reconciliation tick fills in expected transitions, and nothing
//! guarantees strict alternation. Reconstruction replays an ordered stream
//! in a single forward pass with one cursor:
//!
//! - ON overwrites any unmatched ON unconditionally; an orphaned earlier ON
//!   contributes zero hours.
//! - OFF closes the open interval and attributes all of its hours to the
//!   OFF event's calendar date, so an interval crossing midnight lands
//!   entirely on the closing date.
//! - OFF with no open interval is ignored.
//! - A trailing open ON is closed against `now` and attributed to the last
//!   event's date.
//!
//! Accumulation is kept unrounded; rounding to two decimals happens only
//! when a display view is built.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{EventType, PowerEvent};

/// Aggregation window for stats queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn days_back(self) -> i64 {
        match self {
            Period::Day => 0,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    /// First calendar date included in the window.
    pub fn window_start(self, now: DateTime<Utc>) -> NaiveDate {
        (now - Duration::days(self.days_back())).date_naive()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!("unknown period '{other}' (expected day, week or month)")),
        }
    }
}

/// An event as listed inside a daily bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEvent {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
}

/// One calendar day of reconstructed supply.
///
/// Built fresh per aggregation call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub hours: f64,
    pub events: Vec<BucketEvent>,
}

/// One point of the per-day display series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Aggregated stats for one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodStats {
    pub period: Period,
    pub total_hours: f64,
    pub daily: Vec<DailyHours>,
    pub recent_events: Vec<PowerEvent>,
}

/// The most recent event and its age.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastEvent {
    pub event_type: EventType,
    pub hours_ago: f64,
}

/// Event counts per report window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowCounts {
    pub today_events: usize,
    pub week_events: usize,
    pub month_events: usize,
}

/// Summary report across the fixed 1/7/30-day windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    pub today_hours: f64,
    pub week_hours: f64,
    pub month_hours: f64,
    pub avg_daily_hours: f64,
    pub last_event: Option<LastEvent>,
    pub totals: WindowCounts,
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Replay an ordered event stream into per-day buckets.
///
/// `events` must already be sorted ascending by timestamp; buckets come back
/// in chronological order, keyed by actual date values rather than by any
/// incidental string ordering.
pub fn reconstruct<'a, I>(events: I, now: DateTime<Utc>) -> Vec<DailyBucket>
where
    I: IntoIterator<Item = &'a PowerEvent>,
{
    let mut buckets: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();
    let mut current_on_time: Option<DateTime<Utc>> = None;
    let mut last_event_date: Option<NaiveDate> = None;

    for event in events {
        let date = event.timestamp.date_naive();
        let bucket = buckets.entry(date).or_insert_with(|| DailyBucket {
            date,
            hours: 0.0,
            events: Vec::new(),
        });
        bucket.events.push(BucketEvent {
            event_type: event.event_type,
            timestamp: event.timestamp,
        });
        last_event_date = Some(event.date);

        match event.event_type {
            EventType::On => current_on_time = Some(event.timestamp),
            EventType::Off => {
                if let Some(on_time) = current_on_time.take() {
                    bucket.hours += hours_between(on_time, event.timestamp);
                }
            }
        }
    }

    // Power still on: attribute the open interval up to `now`.
    if let Some(on_time) = current_on_time {
        let date = last_event_date.unwrap_or_else(|| now.date_naive());
        let bucket = buckets.entry(date).or_insert_with(|| DailyBucket {
            date,
            hours: 0.0,
            events: Vec::new(),
        });
        bucket.hours += hours_between(on_time, now);
    }

    buckets.into_values().collect()
}

/// Reconstruct one window and build the display view.
///
/// `events` is the user's full ordered stream; the window filter keeps
/// events whose UTC calendar date falls on or after the window start.
/// `recent_limit` caps the trailing raw-event list.
pub fn compute_stats(
    events: &[PowerEvent],
    period: Period,
    now: DateTime<Utc>,
    recent_limit: usize,
) -> PeriodStats {
    let start = period.window_start(now);
    let filtered: Vec<&PowerEvent> = events
        .iter()
        .filter(|event| event.timestamp.date_naive() >= start)
        .collect();

    let buckets = reconstruct(filtered.iter().copied(), now);
    let total_hours: f64 = buckets.iter().map(|bucket| bucket.hours).sum();
    let daily = buckets
        .iter()
        .map(|bucket| DailyHours {
            date: bucket.date,
            hours: round2(bucket.hours),
        })
        .collect();
    let recent_events = filtered
        .iter()
        .skip(filtered.len().saturating_sub(recent_limit))
        .map(|event| (*event).clone())
        .collect();

    PeriodStats {
        period,
        total_hours: round2(total_hours),
        daily,
        recent_events,
    }
}

fn window_totals(events: &[PowerEvent], days_back: i64, now: DateTime<Utc>) -> (f64, usize) {
    let start = (now - Duration::days(days_back)).date_naive();
    let filtered: Vec<&PowerEvent> = events
        .iter()
        .filter(|event| event.timestamp.date_naive() >= start)
        .collect();

    let mut current_on_time: Option<DateTime<Utc>> = None;
    let mut total_hours = 0.0;
    for event in &filtered {
        match event.event_type {
            EventType::On => current_on_time = Some(event.timestamp),
            EventType::Off => {
                if let Some(on_time) = current_on_time.take() {
                    total_hours += hours_between(on_time, event.timestamp);
                }
            }
        }
    }
    if let Some(on_time) = current_on_time {
        total_hours += hours_between(on_time, now);
    }

    (round2(total_hours), filtered.len())
}

/// Run the reconstruction independently over the 1/7/30-day windows and
/// summarize.
///
/// The weekly average clamps to exactly zero on a non-positive week total;
/// that clamp is a business rule, not a rounding artifact.
pub fn compute_report(events: &[PowerEvent], now: DateTime<Utc>) -> UsageReport {
    let (today_hours, today_events) = window_totals(events, 1, now);
    let (week_hours, week_events) = window_totals(events, 7, now);
    let (month_hours, month_events) = window_totals(events, 30, now);

    let last_event = events
        .iter()
        .max_by_key(|event| event.timestamp)
        .map(|event| LastEvent {
            event_type: event.event_type,
            hours_ago: round1(hours_between(event.timestamp, now)),
        });

    let avg_daily_hours = if week_hours > 0.0 {
        round2(week_hours / 7.0)
    } else {
        0.0
    };

    UsageReport {
        today_hours,
        week_hours,
        month_hours,
        avg_daily_hours,
        last_event,
        totals: WindowCounts {
            today_events,
            week_events,
            month_events,
        },
    }
}
