//! Schema validation for model responses
//!
//! Pure functions from raw completion text to typed results. The whole
//! response is rejected on the first violation; silently dropping a subset
//! of assignments risks double-booking, so there is no partial acceptance
//! and no auto-repair.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{BusyBlock, DayPlan, ScheduledAssignment, Subtask, TaskBreakdown, UnscheduledExplanation, intervals_overlap};

/// Minimum length of a proposed assignment, in minutes
pub const MIN_ASSIGNMENT_MINUTES: i64 = 30;

/// A response that failed schema or invariant checks
///
/// Carries enough detail to log the first violating field or record.
/// Distinct from upstream failures: it indicates a prompt/model mismatch,
/// not a network issue.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("response is not a valid document: {0}")]
    Malformed(String),

    #[error("{section}[{index}]: taskId '{value}' is not a UUID")]
    InvalidTaskId {
        section: &'static str,
        index: usize,
        value: String,
    },

    #[error("scheduledTasks[{index}]: {field} '{value}' is not an ISO-8601 timestamp")]
    InvalidTimestamp {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("task {task_id}: startTime {start} is not before endTime {end}")]
    StartNotBeforeEnd {
        task_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("task {task_id}: assignment is {minutes} minutes, below the {MIN_ASSIGNMENT_MINUTES}-minute minimum")]
    AssignmentTooShort { task_id: Uuid, minutes: i64 },

    #[error("assignments for tasks {first} and {second} overlap")]
    OverlappingAssignments { first: Uuid, second: Uuid },

    #[error("assignment for task {task_id} overlaps busy block '{block}'")]
    BusyBlockOverlap { task_id: Uuid, block: String },

    #[error("task {task_id} appears in the response but was not in the planning input")]
    UnknownTaskId { task_id: Uuid },

    #[error("task {task_id} appears more than once in the response")]
    DuplicateTaskId { task_id: Uuid },

    #[error("input task {task_id} is missing from both scheduledTasks and unscheduledTasks")]
    MissingTaskId { task_id: Uuid },

    #[error("breakdown has no subtasks")]
    EmptyBreakdown,

    #[error("subtasks[{index}]: estimatedMinutes must be positive")]
    InvalidSubtaskMinutes { index: usize },
}

// Wire shapes of the model response documents. Field names are the contract
// stated in the system prompt; serde's strict decoding rejects missing or
// ill-typed fields.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanDoc {
    scheduled_tasks: Vec<ScheduledDoc>,
    unscheduled_tasks: Vec<UnscheduledDoc>,
    #[serde(default)]
    insights: Option<Vec<String>>,
    #[serde(default)]
    warnings: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduledDoc {
    task_id: String,
    start_time: String,
    end_time: String,
    rationale: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnscheduledDoc {
    task_id: String,
    reason: String,
}

fn parse_task_id(section: &'static str, index: usize, value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| ValidationError::InvalidTaskId {
        section,
        index,
        value: value.to_string(),
    })
}

fn parse_timestamp(index: usize, field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            index,
            field,
            value: value.to_string(),
        })
}

/// Validate a raw day-plan response against the expected shape and the
/// plan invariants.
///
/// Checks, in order: document shape and field types, per-record id and
/// timestamp validity, start < end and minimum length, the completeness
/// invariant (every input task id exactly once across the two output
/// sets), pairwise assignment overlap, and assignment/busy-block overlap.
/// All interval comparisons are half-open; a boundary touch is allowed.
pub fn validate_plan(raw: &str, input_task_ids: &[Uuid], busy_blocks: &[BusyBlock]) -> Result<DayPlan, ValidationError> {
    debug!(
        raw_len = raw.len(),
        input_count = input_task_ids.len(),
        "validate_plan: called"
    );

    let doc: PlanDoc = serde_json::from_str(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let known: HashSet<Uuid> = input_task_ids.iter().copied().collect();
    let mut seen: HashSet<Uuid> = HashSet::with_capacity(input_task_ids.len());

    let mut scheduled = Vec::with_capacity(doc.scheduled_tasks.len());
    for (index, entry) in doc.scheduled_tasks.iter().enumerate() {
        let task_id = parse_task_id("scheduledTasks", index, &entry.task_id)?;
        let start = parse_timestamp(index, "startTime", &entry.start_time)?;
        let end = parse_timestamp(index, "endTime", &entry.end_time)?;

        if start >= end {
            return Err(ValidationError::StartNotBeforeEnd { task_id, start, end });
        }
        let minutes = (end - start).num_minutes();
        if minutes < MIN_ASSIGNMENT_MINUTES {
            return Err(ValidationError::AssignmentTooShort { task_id, minutes });
        }
        if !known.contains(&task_id) {
            return Err(ValidationError::UnknownTaskId { task_id });
        }
        if !seen.insert(task_id) {
            return Err(ValidationError::DuplicateTaskId { task_id });
        }

        scheduled.push(ScheduledAssignment {
            task_id,
            start,
            end,
            rationale: entry.rationale.clone(),
        });
    }

    let mut unscheduled = Vec::with_capacity(doc.unscheduled_tasks.len());
    for (index, entry) in doc.unscheduled_tasks.iter().enumerate() {
        let task_id = parse_task_id("unscheduledTasks", index, &entry.task_id)?;

        if !known.contains(&task_id) {
            return Err(ValidationError::UnknownTaskId { task_id });
        }
        if !seen.insert(task_id) {
            return Err(ValidationError::DuplicateTaskId { task_id });
        }

        unscheduled.push(UnscheduledExplanation {
            task_id,
            reason: entry.reason.clone(),
        });
    }

    // Completeness: every input task must be accounted for.
    for task_id in input_task_ids {
        if !seen.contains(task_id) {
            return Err(ValidationError::MissingTaskId { task_id: *task_id });
        }
    }

    // Pairwise overlap among assignments: sort by start, check neighbours.
    let mut by_start: Vec<&ScheduledAssignment> = scheduled.iter().collect();
    by_start.sort_by_key(|a| a.start);
    for pair in by_start.windows(2) {
        if intervals_overlap(pair[0].start, pair[0].end, pair[1].start, pair[1].end) {
            return Err(ValidationError::OverlappingAssignments {
                first: pair[0].task_id,
                second: pair[1].task_id,
            });
        }
    }

    // No assignment may land on a fixed calendar commitment.
    for assignment in &scheduled {
        for block in busy_blocks {
            if intervals_overlap(assignment.start, assignment.end, block.start, block.end) {
                return Err(ValidationError::BusyBlockOverlap {
                    task_id: assignment.task_id,
                    block: block.title.clone(),
                });
            }
        }
    }

    debug!(
        scheduled = scheduled.len(),
        unscheduled = unscheduled.len(),
        "validate_plan: plan accepted"
    );

    Ok(DayPlan {
        scheduled,
        unscheduled,
        insights: doc.insights.unwrap_or_default(),
        warnings: doc.warnings.unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownDoc {
    subtasks: Vec<SubtaskDoc>,
    total_estimated_minutes: u32,
    reasoning: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubtaskDoc {
    title: String,
    estimated_minutes: u32,
    order: i32,
}

/// Validate a raw task-breakdown response
pub fn validate_breakdown(raw: &str) -> Result<TaskBreakdown, ValidationError> {
    debug!(raw_len = raw.len(), "validate_breakdown: called");

    let doc: BreakdownDoc = serde_json::from_str(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    if doc.subtasks.is_empty() {
        return Err(ValidationError::EmptyBreakdown);
    }
    for (index, subtask) in doc.subtasks.iter().enumerate() {
        if subtask.estimated_minutes == 0 {
            return Err(ValidationError::InvalidSubtaskMinutes { index });
        }
    }

    Ok(TaskBreakdown {
        subtasks: doc
            .subtasks
            .into_iter()
            .map(|s| Subtask {
                title: s.title,
                estimated_minutes: s.estimated_minutes,
                order: s.order,
            })
            .collect(),
        total_estimated_minutes: doc.total_estimated_minutes,
        reasoning: doc.reasoning,
    })
}
