//! Planning preferences

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Per-user scheduling preferences
///
/// Resolved before prompt building; the prompt builder sees only the final
/// values, never hidden defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningPreferences {
    /// IANA timezone identifier (passed through to the model verbatim)
    pub timezone: String,

    /// Peak-focus window start (local time)
    #[serde(rename = "peak-start")]
    pub peak_start: NaiveTime,

    /// Peak-focus window end (local time)
    #[serde(rename = "peak-end")]
    pub peak_end: NaiveTime,

    /// Maximum cumulative scheduled focus minutes per day
    #[serde(rename = "max-focus-minutes")]
    pub max_focus_minutes: u32,
}

impl Default for PlanningPreferences {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            peak_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            peak_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            max_focus_minutes: 360,
        }
    }
}
