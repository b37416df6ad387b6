//! Event metadata and the closed set of event layouts.

use anyhow::{bail, Result};
use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::idols::IDOL_COUNT;
use crate::time_axis::STEP_MINUTES;

/// Contents of `metadata/latest_event_border_info.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventInfo {
    #[serde(rename = "EventId")]
    pub id: u32,
    #[serde(rename = "EventName")]
    pub name: String,
    #[serde(rename = "EventType")]
    pub event_type_code: i64,
    pub start_at: DateTime<FixedOffset>,
    pub end_at: DateTime<FixedOffset>,
}

impl EventInfo {
    pub fn duration_days(&self) -> f64 {
        (self.end_at - self.start_at).num_seconds() as f64 / 86_400.0
    }

    pub fn is_running<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let now = now.with_timezone(&self.start_at.timezone());
        self.start_at <= now && now <= self.end_at
    }

    /// Number of 30-minute samples covering the whole event. An inverted
    /// schedule covers a single sample.
    pub fn total_steps(&self) -> usize {
        ((self.end_at - self.start_at).num_minutes() / STEP_MINUTES).max(0) as usize + 1
    }

    pub fn kind(&self) -> Result<EventKind> {
        EventKind::try_from(self.event_type_code)
    }
}

/// Dashboard layout implied by the event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// One whole-event ranking tracked at two borders.
    StandardDuoBorder,
    /// One ranking per idol, each tracked at two borders.
    PerSubjectMultiBorder,
}

impl EventKind {
    pub fn borders(&self) -> [u32; 2] {
        match self {
            EventKind::StandardDuoBorder => [100, 2500],
            EventKind::PerSubjectMultiBorder => [100, 1000],
        }
    }

    /// Subject ids fetched for this layout; 0 is the whole event.
    pub fn subjects(&self) -> Vec<u32> {
        match self {
            EventKind::StandardDuoBorder => vec![0],
            EventKind::PerSubjectMultiBorder => (1..=IDOL_COUNT).collect(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StandardDuoBorder => "standard_duo_border",
            EventKind::PerSubjectMultiBorder => "per_subject_multi_border",
        }
    }
}

impl TryFrom<i64> for EventKind {
    type Error = anyhow::Error;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            3 | 4 | 7 | 10 | 11 | 12 | 13 | 16 => Ok(EventKind::StandardDuoBorder),
            5 => Ok(EventKind::PerSubjectMultiBorder),
            other => bail!("unrecognized event type code {}", other),
        }
    }
}
