//! Task snapshot and related enums

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;
use uuid::Uuid;

/// Task priority, ordinal 0-3 (3 = highest)
///
/// Serialized as a bare number because that is what the task store and the
/// prompt contract both speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    /// Numeric ordinal (0-3)
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Parse from a numeric ordinal
    pub fn from_ordinal(n: u8) -> Option<Self> {
        debug!(%n, "Priority::from_ordinal: called");
        match n {
            0 => Some(Self::None),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let n = u8::deserialize(deserializer)?;
        Priority::from_ordinal(n).ok_or_else(|| serde::de::Error::custom(format!("priority out of range: {}", n)))
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Immutable view of a task at planning time
///
/// Supplied by the external task store; the planner never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Task identifier
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Priority ordinal (0-3, 3 = highest)
    pub priority: Priority,
    /// Estimated duration in minutes, if the user supplied one
    pub estimated_minutes: Option<u32>,
    /// Due date/time, if any
    pub due_date: Option<DateTime<Utc>>,
    /// Already-scheduled start, if the task was previously placed
    pub scheduled_start: Option<DateTime<Utc>>,
    /// Free-form labels
    pub labels: Vec<String>,
}

impl TaskSnapshot {
    /// Minimal snapshot with just an id and title; everything else empty
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            priority: Priority::default(),
            estimated_minutes: None,
            due_date: None,
            scheduled_start: None,
            labels: vec![],
        }
    }
}

/// Subscription tier, used by the rate gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Starter,
    Pro,
    Team,
}

impl Tier {
    /// Metered tiers carry a billing-period counter; the free tier is
    /// limited by a rolling trailing-hour count instead.
    pub fn is_metered(self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Starter => write!(f, "starter"),
            Self::Pro => write!(f, "pro"),
            Self::Team => write!(f, "team"),
        }
    }
}
