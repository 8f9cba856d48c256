//! SLA banding
//!
//! Informational only: the band never drives auto-close.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hours after creation at which a ticket enters Warning.
pub const WARNING_AFTER_HOURS: f64 = 2.0;

/// Hours after creation at which a ticket is Breached.
pub const BREACHED_AFTER_HOURS: f64 = 6.0;

/// Discrete SLA state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlaBand {
    #[serde(rename = "On Track")]
    OnTrack,
    Warning,
    Breached,
}

impl SlaBand {
    pub fn for_hours(hours_open: f64) -> Self {
        if hours_open < WARNING_AFTER_HOURS {
            Self::OnTrack
        } else if hours_open < BREACHED_AFTER_HOURS {
            Self::Warning
        } else {
            Self::Breached
        }
    }
}

impl std::fmt::Display for SlaBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnTrack => write!(f, "On Track"),
            Self::Warning => write!(f, "Warning"),
            Self::Breached => write!(f, "Breached"),
        }
    }
}

/// SLA state of one ticket at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlaReading {
    pub band: SlaBand,
    pub hours_open: f64,
}

/// Fractional hours from `created_at` to `now`, floored at zero.
pub fn hours_open(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - created_at).num_milliseconds();
    if millis <= 0 {
        return 0.0;
    }
    millis as f64 / 3_600_000.0
}

/// Band a ticket by its age since creation, whatever its status.
///
/// Total: a creation time in the future (clock skew) reads as 0 hours,
/// On Track.
pub fn compute_sla_band(created_at: DateTime<Utc>, now: DateTime<Utc>) -> SlaReading {
    let hours_open = hours_open(created_at, now);
    SlaReading {
        band: SlaBand::for_hours(hours_open),
        hours_open,
    }
}
