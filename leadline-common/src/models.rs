//! Data models for callers and leads
//!
//! Wire format follows the dashboard contract: camelCase field names,
//! kebab-case status values.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A human agent with bounded daily call capacity and coverage rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    /// Spoken languages; empty means "any language"
    pub languages: Vec<String>,
    /// Geographic regions covered; empty means "all states"
    pub assigned_states: Vec<String>,
    /// Maximum assignments per operating day; 0 means unlimited
    pub daily_limit: i64,
    pub today_assigned_count: i64,
    pub last_assigned_at: Option<DateTime<Utc>>,
    /// Last day the counter was zeroed (operating-day boundary)
    pub last_reset_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Caller {
    /// Remaining capacity check against the daily limit (0 = unlimited)
    pub fn has_capacity(&self) -> bool {
        self.daily_limit == 0 || self.today_assigned_count < self.daily_limit
    }

    /// Whether this caller covers the given region (empty set covers all)
    pub fn covers_state(&self, state: &str) -> bool {
        self.assigned_states.is_empty() || self.assigned_states.iter().any(|s| s == state)
    }

    /// Whether this caller speaks the given language (empty set = any)
    pub fn speaks(&self, language: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == language)
    }
}

/// Administrative input for creating or updating a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerInput {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub assigned_states: Vec<String>,
    #[serde(default)]
    pub daily_limit: i64,
}

impl CallerInput {
    /// Reject malformed caller input before it reaches the registry
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("caller name must not be empty".into()));
        }
        if self.daily_limit < 0 {
            return Err(Error::InvalidInput(format!(
                "dailyLimit must be >= 0, got {}",
                self.daily_limit
            )));
        }
        Ok(())
    }
}

/// Lead lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    Pending,
    Calling,
    NoAnswer,
    Failed,
    Completed,
}

impl LeadStatus {
    /// Canonical text form used in the database and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Calling => "calling",
            LeadStatus::NoAnswer => "no-answer",
            LeadStatus::Failed => "failed",
            LeadStatus::Completed => "completed",
        }
    }

    /// Parse the canonical text form
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(LeadStatus::Pending),
            "calling" => Ok(LeadStatus::Calling),
            "no-answer" => Ok(LeadStatus::NoAnswer),
            "failed" => Ok(LeadStatus::Failed),
            "completed" => Ok(LeadStatus::Completed),
            other => Err(Error::InvalidInput(format!("unknown lead status: {}", other))),
        }
    }

    /// Leads still requiring caller action
    pub fn is_active(&self) -> bool {
        matches!(self, LeadStatus::Pending | LeadStatus::Calling)
    }
}

/// An inbound contact record requiring a caller to act on it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub lead_source: String,
    pub city: String,
    pub state: String,
    pub status: LeadStatus,
    /// Non-owning back-reference; written exactly once, at assignment
    pub assigned_caller_id: Option<Uuid>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal caller reference for read-side joins
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerRef {
    pub id: Uuid,
    pub name: String,
}

/// Lead joined with its assigned caller's name, as served to dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadWithCaller {
    #[serde(flatten)]
    pub lead: Lead,
    pub assigned_caller: Option<CallerRef>,
}

/// Ingestion payload for a new lead
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub lead_source: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    /// Optional language requirement; None imposes no constraint
    #[serde(default)]
    pub language: Option<String>,
}

impl LeadInput {
    /// Reject malformed lead input before the assignment engine runs
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("lead name must not be empty".into()));
        }
        if self.phone.trim().is_empty() {
            return Err(Error::InvalidInput("lead phone must not be empty".into()));
        }
        Ok(())
    }
}
