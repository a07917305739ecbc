//! Region profiles and expected-supply schedules.
//!
//! A region is a distribution company's service area. Each region carries a
//! schedule template: an ordered list of time-of-day blocks describing when
//! grid supply is expected to be active. Templates are evaluated against a
//! plain time of day; there is no date or timezone component.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

pub mod resolver;
pub mod seed;

pub use resolver::RegionResolver;

const BLOCK_TIME_FORMAT: &str = "%H:%M";

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::BLOCK_TIME_FORMAT;

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(BLOCK_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, BLOCK_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One window of expected grid supply within a day.
///
/// Serialized as `{"start": "HH:MM", "end": "HH:MM"}`. A block may wrap past
/// midnight (`start > end`). Parsing failures surface when a template is
/// loaded or seeded, never during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl ScheduleBlock {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse a block from `HH:MM` strings, rejecting malformed input.
    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        let parse = |value: &str| {
            NaiveTime::parse_from_str(value, BLOCK_TIME_FORMAT).map_err(|source| {
                ScheduleError::MalformedBlock {
                    value: value.to_string(),
                    source,
                }
            })
        };
        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }

    /// Whether a time of day falls inside this block.
    ///
    /// For a non-wrapping block the end is exclusive: `start <= t < end`.
    /// A block with `start > end` wraps past midnight and covers
    /// `t >= start || t < end`.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= t && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

/// Regional distribution company profile with its expected-supply schedule.
///
/// Read-only at runtime; created and updated only by the seed process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionProfile {
    pub id: String,
    pub name: String,
    pub states: Vec<String>,
    pub keywords: Vec<String>,
    pub avg_offtake_mwh_per_hour: f64,
    pub avg_available_pcc_mwh_per_hour: f64,
    pub utilisation_percent: f64,
    pub estimated_daily_mwh: f64,
    pub estimated_full_load_hours: f64,
    pub schedule_template: Vec<ScheduleBlock>,
    pub source: String,
}

impl RegionProfile {
    /// Whether the region's grid is expected to be supplying at `t`.
    ///
    /// Blocks are OR'd; overlaps are tolerated. An empty template means the
    /// region is never expected on.
    pub fn should_be_on(&self, t: NaiveTime) -> bool {
        self.schedule_template.iter().any(|block| block.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn plain_block_bounds() {
        let block = ScheduleBlock::parse("05:00", "09:00").unwrap();
        assert!(block.contains(t(5, 0)));
        assert!(block.contains(t(8, 59)));
        assert!(!block.contains(t(9, 0)));
        assert!(!block.contains(t(4, 59)));
    }

    #[test]
    fn midnight_wrapping_block() {
        let block = ScheduleBlock::parse("22:00", "05:00").unwrap();
        assert!(block.contains(t(23, 0)));
        assert!(block.contains(t(0, 30)));
        assert!(block.contains(t(4, 59)));
        assert!(!block.contains(t(5, 0)));
        assert!(!block.contains(t(21, 59)));
    }

    #[test]
    fn malformed_block_is_rejected() {
        assert!(ScheduleBlock::parse("25:00", "09:00").is_err());
        assert!(ScheduleBlock::parse("05:00", "9am").is_err());
        assert!(ScheduleBlock::parse("", "09:00").is_err());
    }

    #[test]
    fn block_serde_uses_hhmm_strings() {
        let block = ScheduleBlock::parse("19:30", "23:30").unwrap();
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"start":"19:30","end":"23:30"}"#);
        let decoded: ScheduleBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn block_deserialization_rejects_bad_times() {
        let err = serde_json::from_str::<ScheduleBlock>(r#"{"start":"24:61","end":"05:00"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn empty_template_is_never_on() {
        let region = RegionProfile {
            id: "test".into(),
            name: "Test Disco".into(),
            states: vec![],
            keywords: vec![],
            avg_offtake_mwh_per_hour: 0.0,
            avg_available_pcc_mwh_per_hour: 0.0,
            utilisation_percent: 0.0,
            estimated_daily_mwh: 0.0,
            estimated_full_load_hours: 0.0,
            schedule_template: vec![],
            source: "test".into(),
        };
        assert!(!region.should_be_on(t(12, 0)));
    }

    #[test]
    fn template_blocks_are_ored() {
        let region = RegionProfile {
            id: "test".into(),
            name: "Test Disco".into(),
            states: vec![],
            keywords: vec![],
            avg_offtake_mwh_per_hour: 0.0,
            avg_available_pcc_mwh_per_hour: 0.0,
            utilisation_percent: 0.0,
            estimated_daily_mwh: 0.0,
            estimated_full_load_hours: 0.0,
            schedule_template: vec![
                ScheduleBlock::parse("05:00", "09:00").unwrap(),
                ScheduleBlock::parse("19:00", "22:00").unwrap(),
            ],
            source: "test".into(),
        };
        assert!(region.should_be_on(t(6, 0)));
        assert!(region.should_be_on(t(20, 0)));
        assert!(!region.should_be_on(t(12, 0)));
    }
}
