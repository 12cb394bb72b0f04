//! Prompt builder
//!
//! Renders the system policy block and the user context document for a
//! planning call. Rendering is deterministic: identical inputs produce
//! byte-identical text, and "now" is always passed in rather than captured
//! here.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{BusyBlock, PlanningPreferences, TaskSnapshot};
use crate::schema::MIN_ASSIGNMENT_MINUTES;

/// Buffer the policy asks for between assignments and around busy blocks
pub const BUFFER_MINUTES: u32 = 15;

/// Render the system policy block for a day-planning call
///
/// The text is the contract the completion model is held to; everything the
/// schema validator later enforces is stated here first.
pub fn plan_system_block(prefs: &PlanningPreferences) -> String {
    debug!(timezone = %prefs.timezone, "plan_system_block: called");
    let peak_start = prefs.peak_start.format("%H:%M");
    let peak_end = prefs.peak_end.format("%H:%M");

    format!(
        "You are an expert productivity assistant that creates optimal daily schedules.\n\
         \n\
         ## Your Mission\n\
         Create a realistic, productive daily schedule that maximizes focus while respecting constraints.\n\
         \n\
         ## Scheduling Rules\n\
         1. NEVER double-book time slots - check the blockedTime entries carefully\n\
         2. Leave {buffer}-minute buffers between scheduled tasks and around blocked time\n\
         3. Schedule HIGH PRIORITY (3) tasks during peak hours ({peak_start}-{peak_end})\n\
         4. Schedule MEDIUM PRIORITY (2) tasks in the early afternoon\n\
         5. Schedule LOW PRIORITY (1) tasks in late afternoon or remaining gaps\n\
         6. Maximum {max_focus} minutes of scheduled focus work per day\n\
         7. Minimum {min_block}-minute blocks for tasks (no fragmented scheduling)\n\
         8. Respect task due dates - tasks due on or before the target date must be scheduled if at all possible\n\
         9. If a task cannot fit today, add it to unscheduledTasks with a reason\n\
         \n\
         ## Special Considerations\n\
         - If estimatedMinutes is not provided, estimate based on the task title and description\n\
         - Account for mental fatigue - don't schedule demanding tasks back-to-back\n\
         - Leave the lunch break (12:00-13:00) free unless explicitly requested\n\
         - Start scheduling from currentTime, not past hours\n\
         \n\
         ## Output Format\n\
         Return a JSON object:\n\
         {{\n\
         \x20 \"scheduledTasks\": [\n\
         \x20   {{\n\
         \x20     \"taskId\": \"uuid\",\n\
         \x20     \"startTime\": \"ISO8601 datetime\",\n\
         \x20     \"endTime\": \"ISO8601 datetime\",\n\
         \x20     \"rationale\": \"Brief explanation why this time slot\"\n\
         \x20   }}\n\
         \x20 ],\n\
         \x20 \"unscheduledTasks\": [\n\
         \x20   {{\n\
         \x20     \"taskId\": \"uuid\",\n\
         \x20     \"reason\": \"Why this task couldn't be scheduled today\"\n\
         \x20   }}\n\
         \x20 ],\n\
         \x20 \"insights\": [\"Optional productivity insights based on the schedule\"],\n\
         \x20 \"warnings\": [\"Optional warnings about conflicts or concerns\"]\n\
         }}",
        buffer = BUFFER_MINUTES,
        peak_start = peak_start,
        peak_end = peak_end,
        max_focus = prefs.max_focus_minutes,
        min_block = MIN_ASSIGNMENT_MINUTES,
    )
}

/// User context document for a planning call
///
/// This is the exact and only channel of information the model receives.
/// Field names are part of the wire contract; do not rename.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanContext {
    timezone: String,
    target_date: String,
    current_time: String,
    tasks: Vec<TaskContext>,
    blocked_time: Vec<BlockedTimeContext>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskContext {
    id: Uuid,
    title: String,
    description: Option<String>,
    priority: u8,
    estimated_minutes: Option<u32>,
    due_date: Option<String>,
    labels: Vec<String>,
    current_scheduled_start: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockedTimeContext {
    title: String,
    start: String,
    end: String,
    is_all_day: bool,
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render the user context document for a day-planning call
pub fn plan_user_block(
    tasks: &[TaskSnapshot],
    busy_blocks: &[BusyBlock],
    timezone: &str,
    target_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    debug!(
        task_count = tasks.len(),
        block_count = busy_blocks.len(),
        %target_date,
        "plan_user_block: called"
    );

    let context = PlanContext {
        timezone: timezone.to_string(),
        target_date: target_date.format("%Y-%m-%d").to_string(),
        current_time: iso(now),
        tasks: tasks
            .iter()
            .map(|t| TaskContext {
                id: t.id,
                title: t.title.clone(),
                description: t.description.clone(),
                priority: t.priority.ordinal(),
                estimated_minutes: t.estimated_minutes,
                due_date: t.due_date.map(iso),
                labels: t.labels.clone(),
                current_scheduled_start: t.scheduled_start.map(iso),
            })
            .collect(),
        blocked_time: busy_blocks
            .iter()
            .map(|b| BlockedTimeContext {
                title: b.title.clone(),
                start: iso(b.start),
                end: iso(b.end),
                is_all_day: b.is_all_day,
            })
            .collect(),
    };

    serde_json::to_string(&context)
}

/// System prompt for the task-breakdown call
pub fn breakdown_system_block() -> &'static str {
    "You are a productivity expert that breaks down complex tasks into actionable subtasks.\n\
     \n\
     ## Rules\n\
     1. Each subtask should be completable in 15-60 minutes\n\
     2. Subtasks should be specific and actionable\n\
     3. Order subtasks logically (dependencies first)\n\
     4. Total time should be realistic for the parent task\n\
     5. Include a brief reasoning for your breakdown\n\
     \n\
     ## Output Format\n\
     Return JSON:\n\
     {\n\
     \x20 \"subtasks\": [{ \"title\": \"string\", \"estimatedMinutes\": number, \"order\": number }],\n\
     \x20 \"totalEstimatedMinutes\": number,\n\
     \x20 \"reasoning\": \"string\"\n\
     }"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownContext {
    task: BreakdownTaskContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownTaskContext {
    title: String,
    description: Option<String>,
    estimated_minutes: Option<u32>,
    priority: u8,
    due_date: Option<String>,
}

/// Render the user document for a task-breakdown call
pub fn breakdown_user_block(task: &TaskSnapshot) -> Result<String, serde_json::Error> {
    debug!(task_id = %task.id, "breakdown_user_block: called");
    let context = BreakdownContext {
        task: BreakdownTaskContext {
            title: task.title.clone(),
            description: task.description.clone(),
            estimated_minutes: task.estimated_minutes,
            priority: task.priority.ordinal(),
            due_date: task.due_date.map(iso),
        },
    };

    serde_json::to_string(&context)
}
