//! Domain types for day planning
//!
//! Transient, single-request-scoped values: the planner reads snapshots of
//! external task/calendar state and produces a [`DayPlan`]. Nothing here is
//! persisted by this crate; merging assignments back into the task store is
//! the caller's job.

mod breakdown;
mod plan;
mod preferences;
mod task;

pub use breakdown::{Subtask, TaskBreakdown};
pub use plan::{BusyBlock, DayPlan, ScheduledAssignment, UnscheduledExplanation, intervals_overlap};
pub use preferences::PlanningPreferences;
pub use task::{Priority, TaskSnapshot, Tier};
