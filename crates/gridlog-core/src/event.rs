use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a power transition as perceived by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    On,
    Off,
}

impl EventType {
    /// Stable string form used for storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::On => "on",
            EventType::Off => "off",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            EventType::On => EventType::Off,
            EventType::Off => EventType::On,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single logged power transition.
///
/// Events are append-only: once stored they are never updated or deleted.
/// They are created either by a user action or by the reconciliation tick
/// (`auto_generated = true`). Consecutive same-type events are legal; the
/// timeline reconstruction policy decides what they mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerEvent {
    pub user_id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    /// UTC calendar date of `timestamp`, denormalized for date-range queries.
    pub date: NaiveDate,
    pub location: Option<String>,
    pub region_id: Option<String>,
    pub auto_generated: bool,
}

impl PowerEvent {
    pub fn new(
        user_id: impl Into<String>,
        event_type: EventType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event_type,
            timestamp,
            date: timestamp.date_naive(),
            location: None,
            region_id: None,
            auto_generated: false,
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

    pub fn with_auto_generated(mut self, auto_generated: bool) -> Self {
        self.auto_generated = auto_generated;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn event_type_serde_form() {
        assert_eq!(serde_json::to_string(&EventType::On).unwrap(), "\"on\"");
        assert_eq!(serde_json::to_string(&EventType::Off).unwrap(), "\"off\"");
        let decoded: EventType = serde_json::from_str("\"off\"").unwrap();
        assert_eq!(decoded, EventType::Off);
    }

    #[test]
    fn date_is_derived_from_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 3, 23, 45, 0).unwrap();
        let event = PowerEvent::new("ada", EventType::On, ts);
        assert_eq!(event.date, ts.date_naive());
        assert!(!event.auto_generated);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 3, 8, 0, 0).unwrap();
        let event = PowerEvent::new("ada", EventType::On, ts)
            .with_location(Some("Lekki, Lagos".to_string()))
            .with_region(Some("eko".to_string()))
            .with_auto_generated(true);
        let json = serde_json::to_string(&event).unwrap();
        let decoded: PowerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.user_id, "ada");
        assert_eq!(decoded.event_type, EventType::On);
        assert_eq!(decoded.region_id.as_deref(), Some("eko"));
        assert!(decoded.auto_generated);
    }
}
