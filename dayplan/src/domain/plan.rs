//! Plan output types and interval arithmetic

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed, non-negotiable calendar commitment
///
/// Read-only input; no proposed assignment may overlap one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusyBlock {
    /// Event title
    pub title: String,
    /// Start time
    pub start: DateTime<Utc>,
    /// End time
    pub end: DateTime<Utc>,
    /// All-day flag
    pub is_all_day: bool,
}

/// A proposed time slot for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAssignment {
    /// Task identifier
    pub task_id: Uuid,
    /// Proposed start (absolute)
    pub start: DateTime<Utc>,
    /// Proposed end (absolute)
    pub end: DateTime<Utc>,
    /// Why this slot was chosen
    pub rationale: String,
}

impl ScheduledAssignment {
    /// Duration of the slot in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Why a task was left off the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnscheduledExplanation {
    /// Task identifier
    pub task_id: Uuid,
    /// Human-readable reason
    pub reason: String,
}

/// The aggregate planning result
///
/// Invariant (enforced by the schema validator): every input task id
/// appears in exactly one of `scheduled` / `unscheduled`, assignments are
/// pairwise non-overlapping and clear of every [`BusyBlock`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayPlan {
    /// Proposed assignments, in the order the model emitted them
    pub scheduled: Vec<ScheduledAssignment>,
    /// Tasks that did not fit, with reasons
    pub unscheduled: Vec<UnscheduledExplanation>,
    /// Optional free-text productivity insights
    pub insights: Vec<String>,
    /// Optional free-text warnings
    pub warnings: Vec<String>,
}

impl DayPlan {
    /// Empty plan carrying a single insight, for the no-pending-tasks case
    pub fn empty_with_insight(insight: impl Into<String>) -> Self {
        Self {
            insights: vec![insight.into()],
            ..Self::default()
        }
    }

    /// True when nothing was scheduled or explained
    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty() && self.unscheduled.is_empty()
    }
}

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
///
/// A boundary touch (one ends exactly when the other begins) does not count
/// as an overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}
