//! Dayplan - AI day-plan orchestrator
//!
//! Builds a faithful snapshot of a user's pending tasks and fixed calendar
//! commitments, sends it to a generative completion backend under a
//! constrained prompt contract, validates the free-form JSON answer against
//! a strict schema, and hands back a plan plus the assignment records to
//! merge into task state.
//!
//! # Core Concepts
//!
//! - **Stateless passes**: every planning invocation is independent; no
//!   state is retained between calls
//! - **Strict validation**: a response violating the schema or any plan
//!   invariant is rejected whole, never repaired or partially accepted
//! - **Injected boundaries**: the completion backend and the usage ledger
//!   are trait objects supplied by the caller, so tests run against
//!   deterministic stand-ins
//!
//! # Modules
//!
//! - [`domain`] - task snapshots, busy blocks, preferences, plan outputs
//! - [`prompt`] - deterministic system/user prompt rendering
//! - [`llm`] - completion client trait and OpenAI implementation
//! - [`schema`] - response validation against the plan invariants
//! - [`planner`] - the day-plan orchestrator and task breakdown
//! - [`gate`] - per-user quota checks preceding a planning call
//! - [`config`] - configuration types and loading

pub mod config;
pub mod domain;
pub mod gate;
pub mod llm;
pub mod planner;
pub mod prompt;
pub mod schema;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PlannerSettings, RateLimitConfig};
pub use domain::{
    BusyBlock, DayPlan, PlanningPreferences, Priority, ScheduledAssignment, Subtask, TaskBreakdown, TaskSnapshot,
    Tier, UnscheduledExplanation,
};
pub use gate::{GateDecision, GateError, PeriodUsage, RateGate, UsageEvent, UsageKind, UsageLedger};
pub use llm::{CompletionClient, CompletionError, CompletionRequest, OpenAiClient, create_client};
pub use planner::{DayPlanner, PlanError, PlanOutcome, PlanRequest};
pub use schema::{MIN_ASSIGNMENT_MINUTES, ValidationError, validate_breakdown, validate_plan};
