//! Day-plan orchestrator
//!
//! One linear pass per invocation: gather inputs, build prompts, make a
//! single completion call, validate the response, hand back the plan plus
//! the assignment records the caller must merge into the task store. No
//! state survives between invocations and no retries happen here; upstream
//! failures propagate unchanged.

mod breakdown;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{Config, PlannerSettings};
use crate::domain::{BusyBlock, DayPlan, PlanningPreferences, ScheduledAssignment, TaskSnapshot};
use crate::llm::{CompletionClient, CompletionError, CompletionRequest};
use crate::prompt;
use crate::schema::{ValidationError, validate_plan};

/// Insight text returned when there is nothing to plan
const NO_TASKS_INSIGHT: &str = "No pending tasks to schedule.";

/// Errors from a planning or breakdown invocation
///
/// Completion and validation failures pass through unchanged so callers can
/// distinguish a network problem from a prompt/model mismatch.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to render prompt: {0}")]
    PromptRender(#[from] serde_json::Error),
}

impl PlanError {
    /// Whether a caller may reasonably retry
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Completion(e) => e.is_retryable(),
            // A schema failure indicates a prompt/model mismatch; retrying
            // is allowed but is not a transport concern.
            Self::Validation(_) => true,
            Self::PromptRender(_) => false,
        }
    }
}

/// Everything one planning invocation needs
///
/// `now` is supplied by the caller so the whole pass stays deterministic
/// and testable.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Unscheduled tasks eligible for the target date
    pub tasks: Vec<TaskSnapshot>,
    /// Fixed calendar commitments on the target date
    pub busy_blocks: Vec<BusyBlock>,
    /// Per-user preferences; defaults are used when absent
    pub preferences: Option<PlanningPreferences>,
    /// The day being planned
    pub target_date: NaiveDate,
    /// Current timestamp; scheduling must start no earlier than this
    pub now: DateTime<Utc>,
}

/// Result of a successful planning invocation
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The validated plan, passed through unchanged
    pub plan: DayPlan,
    /// Assignment records the caller must merge into persisted task state.
    /// The merge should be idempotent per task id; nothing has been
    /// persisted when this struct is returned.
    pub merge_records: Vec<ScheduledAssignment>,
}

/// The coordinating component for day planning
///
/// The completion client is an injected dependency so tests can substitute
/// a deterministic stand-in.
pub struct DayPlanner {
    client: Arc<dyn CompletionClient>,
    model: String,
    settings: PlannerSettings,
    default_preferences: PlanningPreferences,
}

impl DayPlanner {
    /// Create a planner from an injected client and configuration
    pub fn new(client: Arc<dyn CompletionClient>, config: &Config) -> Self {
        debug!(model = %config.llm.model, "DayPlanner::new: called");
        Self {
            client,
            model: config.llm.model.clone(),
            settings: config.planner.clone(),
            default_preferences: config.preferences.clone(),
        }
    }

    /// Generate a day plan for the request
    ///
    /// An empty task list short-circuits with an empty plan before any
    /// completion call is made. On any failure no task state has been
    /// touched; the outcome is all-or-nothing.
    pub async fn plan_day(&self, request: PlanRequest) -> Result<PlanOutcome, PlanError> {
        debug!(
            task_count = request.tasks.len(),
            block_count = request.busy_blocks.len(),
            target_date = %request.target_date,
            "DayPlanner::plan_day: called"
        );

        if request.tasks.is_empty() {
            debug!("DayPlanner::plan_day: no tasks, returning empty plan");
            return Ok(PlanOutcome {
                plan: DayPlan::empty_with_insight(NO_TASKS_INSIGHT),
                merge_records: vec![],
            });
        }

        let preferences = request
            .preferences
            .unwrap_or_else(|| self.default_preferences.clone());

        let system_block = prompt::plan_system_block(&preferences);
        let user_block = prompt::plan_user_block(
            &request.tasks,
            &request.busy_blocks,
            &preferences.timezone,
            request.target_date,
            request.now,
        )?;

        let raw = self
            .client
            .complete(CompletionRequest {
                system_block,
                user_block,
                model: self.model.clone(),
                temperature: self.settings.plan_temperature,
                max_output_tokens: self.settings.plan_max_tokens,
            })
            .await?;

        let input_ids: Vec<Uuid> = request.tasks.iter().map(|t| t.id).collect();
        let plan = validate_plan(&raw, &input_ids, &request.busy_blocks)?;

        info!(
            scheduled = plan.scheduled.len(),
            unscheduled = plan.unscheduled.len(),
            target_date = %request.target_date,
            "day plan generated"
        );

        let merge_records = plan.scheduled.clone();
        Ok(PlanOutcome { plan, merge_records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use crate::llm::client::mock::MockCompletionClient;
    use chrono::TimeZone;

    const TASK_HIGH: &str = "aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa";
    const TASK_LOW: &str = "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb";

    fn task(id: &str, title: &str, priority: Priority) -> TaskSnapshot {
        let mut task = TaskSnapshot::new(Uuid::parse_str(id).unwrap(), title);
        task.priority = priority;
        task
    }

    fn planner_with(responses: Vec<String>) -> (DayPlanner, Arc<MockCompletionClient>) {
        let client = Arc::new(MockCompletionClient::new(responses));
        let planner = DayPlanner::new(client.clone(), &Config::default());
        (planner, client)
    }

    fn request(tasks: Vec<TaskSnapshot>, busy_blocks: Vec<BusyBlock>) -> PlanRequest {
        PlanRequest {
            tasks,
            busy_blocks,
            preferences: None,
            target_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            now: Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_empty_task_list_short_circuits() {
        let (planner, client) = planner_with(vec![]);

        let outcome = planner.plan_day(request(vec![], vec![])).await.unwrap();

        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.plan.insights, vec![NO_TASKS_INSIGHT]);
        assert!(outcome.merge_records.is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_priority_scenario_both_tasks_scheduled() {
        // Priority-3 task lands in the peak window, priority-1 task after
        // 15:00, no calendar events: the plan validates and both tasks
        // become merge records.
        let response = format!(
            r#"{{"scheduledTasks":[
                {{"taskId":"{high}","startTime":"2025-06-02T09:00:00Z","endTime":"2025-06-02T10:30:00Z","rationale":"peak focus window"}},
                {{"taskId":"{low}","startTime":"2025-06-02T15:30:00Z","endTime":"2025-06-02T16:00:00Z","rationale":"low priority, late slot"}}
            ],"unscheduledTasks":[]}}"#,
            high = TASK_HIGH,
            low = TASK_LOW,
        );
        let (planner, client) = planner_with(vec![response]);

        let tasks = vec![
            task(TASK_HIGH, "Finish architecture review", Priority::High),
            task(TASK_LOW, "Tidy inbox", Priority::Low),
        ];
        let outcome = planner.plan_day(request(tasks, vec![])).await.unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(outcome.plan.scheduled.len(), 2);
        assert_eq!(outcome.plan.unscheduled.len(), 0);
        assert_eq!(outcome.merge_records.len(), 2);
        assert_eq!(outcome.merge_records[0].task_id, Uuid::parse_str(TASK_HIGH).unwrap());
    }

    #[tokio::test]
    async fn test_busy_block_conflict_is_validation_error() {
        // Mock response places the task at 09:30-10:00 inside a 09:00-10:00
        // event; the plan must be rejected and nothing merged.
        let response = format!(
            r#"{{"scheduledTasks":[
                {{"taskId":"{id}","startTime":"2025-06-02T09:30:00Z","endTime":"2025-06-02T10:00:00Z","rationale":"squeezed in"}}
            ],"unscheduledTasks":[]}}"#,
            id = TASK_HIGH,
        );
        let (planner, _client) = planner_with(vec![response]);

        let busy = vec![BusyBlock {
            title: "All-hands".to_string(),
            start: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
            is_all_day: false,
        }];
        let tasks = vec![task(TASK_HIGH, "Prep slides", Priority::High)];

        let err = planner.plan_day(request(tasks, busy)).await.unwrap_err();
        assert!(matches!(
            err,
            PlanError::Validation(ValidationError::BusyBlockOverlap { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_response_is_validation_error() {
        let response = format!(
            r#"{{"scheduledTasks":[{{"taskId":"{id}","startTime":"2025-06-02T09:00:00Z","rationale":"x"}}],"unscheduledTasks":[]}}"#,
            id = TASK_HIGH,
        );
        let (planner, _client) = planner_with(vec![response]);
        let tasks = vec![task(TASK_HIGH, "Prep slides", Priority::High)];

        let err = planner.plan_day(request(tasks, vec![])).await.unwrap_err();
        assert!(matches!(err, PlanError::Validation(ValidationError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_completion_failure_propagates_unchanged() {
        let client = Arc::new(MockCompletionClient::failing(CompletionError::EmptyResponse));
        let planner = DayPlanner::new(client, &Config::default());
        let tasks = vec![task(TASK_HIGH, "Prep slides", Priority::High)];

        let err = planner.plan_day(request(tasks, vec![])).await.unwrap_err();
        assert!(matches!(err, PlanError::Completion(CompletionError::EmptyResponse)));
        assert!(err.is_retryable());
    }
}
