//! Task rate gate
//!
//! Decides whether another planning or breakdown call is permitted for a
//! user right now. The counters themselves live in the external task
//! store, reached through the [`UsageLedger`] trait; this module only
//! holds the decision logic. A denial is a user-visible quota condition,
//! not an error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::RateLimitConfig;
use crate::domain::Tier;

/// Errors reaching the external usage ledger
#[derive(Debug, Error)]
pub enum GateError {
    #[error("usage ledger error: {0}")]
    Ledger(String),
}

/// What kind of call is being gated / recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    PlanDay,
    TaskBreakdown,
}

impl UsageKind {
    /// Event-type string recorded in the ledger
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlanDay => "ai.plan_generated",
            Self::TaskBreakdown => "ai.task_breakdown",
        }
    }
}

/// One recorded usage event
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub user_id: Uuid,
    pub kind: UsageKind,
    pub at: DateTime<Utc>,
}

/// Billing-period usage for a metered tier
#[derive(Debug, Clone, Copy)]
pub struct PeriodUsage {
    /// Calls made this billing period
    pub used: u64,
    /// Period ceiling, when the subscription carries one
    pub limit: Option<u64>,
}

/// External counter source, implemented by the task store
///
/// Recording is at-least-once: the caller records after a successful
/// planner run, and undercounting on a crash between the two is accepted.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Number of gated calls for the user since the given instant
    async fn calls_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<u64, GateError>;

    /// Billing-period usage, or `None` when the user has no active
    /// subscription record
    async fn period_usage(&self, user_id: Uuid) -> Result<Option<PeriodUsage>, GateError>;

    /// Record one usage event
    async fn record(&self, event: UsageEvent) -> Result<(), GateError>;
}

/// Outcome of a gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// Quota exceeded; `limit` is the ceiling that was hit
    Denied { limit: u64 },
}

impl GateDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Per-user quota check preceding a planning call
pub struct RateGate {
    ledger: Arc<dyn UsageLedger>,
    limits: RateLimitConfig,
}

impl RateGate {
    pub fn new(ledger: Arc<dyn UsageLedger>, limits: RateLimitConfig) -> Self {
        Self { ledger, limits }
    }

    /// Decide whether another gated call is permitted right now
    ///
    /// Unmetered tiers are limited by a rolling count over the trailing 60
    /// minutes. Metered tiers compare the billing-period counter against
    /// the ledger-supplied ceiling; a subscription without an explicit
    /// ceiling falls back to hourly-limit x 24 x 30 (a placeholder policy,
    /// not a contract). A metered user with no subscription record is
    /// treated as unmetered.
    pub async fn check(&self, user_id: Uuid, tier: Tier, now: DateTime<Utc>) -> Result<GateDecision, GateError> {
        debug!(%user_id, %tier, "RateGate::check: called");
        let hourly_limit = self.limits.hourly_limit(tier);

        if tier.is_metered() {
            if let Some(usage) = self.ledger.period_usage(user_id).await? {
                let limit = usage.limit.unwrap_or(hourly_limit * 24 * 30);
                debug!(used = usage.used, %limit, "RateGate::check: metered tier");
                return Ok(if usage.used < limit {
                    GateDecision::Allowed
                } else {
                    GateDecision::Denied { limit }
                });
            }
            debug!("RateGate::check: metered tier without subscription record, falling back to hourly");
        }

        let since = now - Duration::hours(1);
        let recent = self.ledger.calls_since(user_id, since).await?;
        debug!(%recent, %hourly_limit, "RateGate::check: trailing-hour count");

        Ok(if recent < hourly_limit {
            GateDecision::Allowed
        } else {
            GateDecision::Denied { limit: hourly_limit }
        })
    }

    /// Record a successful gated call
    ///
    /// Called by the caller after the planner returns successfully, never
    /// before.
    pub async fn record_usage(&self, user_id: Uuid, kind: UsageKind, now: DateTime<Utc>) -> Result<(), GateError> {
        debug!(%user_id, kind = kind.as_str(), "RateGate::record_usage: called");
        self.ledger
            .record(UsageEvent {
                user_id,
                kind,
                at: now,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// In-memory ledger for unit tests
    struct MemoryLedger {
        events: Mutex<Vec<UsageEvent>>,
        period: Mutex<Option<PeriodUsage>>,
    }

    impl MemoryLedger {
        fn new() -> Self {
            Self {
                events: Mutex::new(vec![]),
                period: Mutex::new(None),
            }
        }

        fn with_period(used: u64, limit: Option<u64>) -> Self {
            let ledger = Self::new();
            *ledger.period.lock().unwrap() = Some(PeriodUsage { used, limit });
            ledger
        }
    }

    #[async_trait]
    impl UsageLedger for MemoryLedger {
        async fn calls_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<u64, GateError> {
            let events = self.events.lock().unwrap();
            Ok(events.iter().filter(|e| e.user_id == user_id && e.at >= since).count() as u64)
        }

        async fn period_usage(&self, _user_id: Uuid) -> Result<Option<PeriodUsage>, GateError> {
            Ok(*self.period.lock().unwrap())
        }

        async fn record(&self, event: UsageEvent) -> Result<(), GateError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_free_tier_denied_on_fourth_call() {
        let ledger = Arc::new(MemoryLedger::new());
        let gate = RateGate::new(ledger.clone(), RateLimitConfig::default());
        let user = Uuid::new_v4();

        for _ in 0..3 {
            let decision = gate.check(user, Tier::Free, now()).await.unwrap();
            assert!(decision.is_allowed());
            gate.record_usage(user, UsageKind::PlanDay, now()).await.unwrap();
        }

        let decision = gate.check(user, Tier::Free, now()).await.unwrap();
        assert_eq!(decision, GateDecision::Denied { limit: 3 });
    }

    #[tokio::test]
    async fn test_free_tier_old_calls_age_out() {
        let ledger = Arc::new(MemoryLedger::new());
        let gate = RateGate::new(ledger.clone(), RateLimitConfig::default());
        let user = Uuid::new_v4();

        // Three calls made 2 hours ago are outside the rolling window.
        let earlier = now() - Duration::hours(2);
        for _ in 0..3 {
            gate.record_usage(user, UsageKind::PlanDay, earlier).await.unwrap();
        }

        let decision = gate.check(user, Tier::Free, now()).await.unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_metered_tier_under_limit_allowed() {
        let ledger = Arc::new(MemoryLedger::with_period(50, Some(100)));
        let gate = RateGate::new(ledger, RateLimitConfig::default());

        let decision = gate.check(Uuid::new_v4(), Tier::Pro, now()).await.unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_metered_tier_at_limit_denied() {
        let ledger = Arc::new(MemoryLedger::with_period(100, Some(100)));
        let gate = RateGate::new(ledger, RateLimitConfig::default());

        let decision = gate.check(Uuid::new_v4(), Tier::Pro, now()).await.unwrap();
        assert_eq!(decision, GateDecision::Denied { limit: 100 });
    }

    #[tokio::test]
    async fn test_metered_tier_placeholder_ceiling() {
        // Subscription without an explicit limit: starter hourly 10 becomes
        // 10 x 24 x 30 = 7200 for the period.
        let ledger = Arc::new(MemoryLedger::with_period(7200, None));
        let gate = RateGate::new(ledger, RateLimitConfig::default());

        let decision = gate.check(Uuid::new_v4(), Tier::Starter, now()).await.unwrap();
        assert_eq!(decision, GateDecision::Denied { limit: 7200 });
    }

    #[tokio::test]
    async fn test_metered_tier_without_subscription_uses_hourly() {
        let ledger = Arc::new(MemoryLedger::new());
        let gate = RateGate::new(ledger.clone(), RateLimitConfig::default());
        let user = Uuid::new_v4();

        for _ in 0..10 {
            gate.record_usage(user, UsageKind::PlanDay, now()).await.unwrap();
        }

        let decision = gate.check(user, Tier::Starter, now()).await.unwrap();
        assert_eq!(decision, GateDecision::Denied { limit: 10 });
    }

    #[tokio::test]
    async fn test_usage_kinds_recorded() {
        let ledger = Arc::new(MemoryLedger::new());
        let gate = RateGate::new(ledger.clone(), RateLimitConfig::default());
        let user = Uuid::new_v4();

        gate.record_usage(user, UsageKind::PlanDay, now()).await.unwrap();
        gate.record_usage(user, UsageKind::TaskBreakdown, now()).await.unwrap();

        let events = ledger.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind.as_str(), "ai.plan_generated");
        assert_eq!(events[1].kind.as_str(), "ai.task_breakdown");
    }
}
