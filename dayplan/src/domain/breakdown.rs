//! Task breakdown output types

use serde::{Deserialize, Serialize};

/// One proposed subtask of a larger task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Subtask title
    pub title: String,
    /// Estimated duration in minutes (positive)
    pub estimated_minutes: u32,
    /// Suggested execution order
    pub order: i32,
}

/// A validated task-breakdown result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    /// Proposed subtasks, dependencies first
    pub subtasks: Vec<Subtask>,
    /// Model's estimate for the whole task
    pub total_estimated_minutes: u32,
    /// Why the task was split this way
    pub reasoning: String,
}
