//! Task breakdown operation
//!
//! Splits one complex task into 15-60 minute subtasks. Shares the
//! planner's client, model, and error taxonomy; gated by the same rate
//! gate as day planning.

use tracing::{debug, info};

use super::{DayPlanner, PlanError};
use crate::domain::{TaskBreakdown, TaskSnapshot};
use crate::llm::CompletionRequest;
use crate::prompt;
use crate::schema::validate_breakdown;

impl DayPlanner {
    /// Ask the completion backend to break a task into subtasks
    pub async fn breakdown_task(&self, task: &TaskSnapshot) -> Result<TaskBreakdown, PlanError> {
        debug!(task_id = %task.id, "DayPlanner::breakdown_task: called");

        let user_block = prompt::breakdown_user_block(task)?;

        let raw = self
            .client
            .complete(CompletionRequest {
                system_block: prompt::breakdown_system_block().to_string(),
                user_block,
                model: self.model.clone(),
                temperature: self.settings.breakdown_temperature,
                max_output_tokens: self.settings.breakdown_max_tokens,
            })
            .await?;

        let breakdown = validate_breakdown(&raw)?;

        info!(
            task_id = %task.id,
            subtask_count = breakdown.subtasks.len(),
            "task breakdown generated"
        );

        Ok(breakdown)
    }
}
