//! Lead store
//!
//! Persistence for leads plus the read-side join that resolves the assigned
//! caller's name for dashboards.

use chrono::{DateTime, Utc};
use leadline_common::models::{CallerRef, Lead, LeadStatus, LeadWithCaller};
use leadline_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Row tuple as selected by `LEAD_JOIN_COLUMNS`
type LeadJoinRow = (
    String,         // id
    String,         // name
    String,         // phone
    String,         // lead_source
    String,         // city
    String,         // state
    String,         // status
    Option<String>, // assigned_caller_id
    Option<String>, // assigned_at
    String,         // created_at
    String,         // updated_at
    Option<String>, // caller name (joined)
);

const LEAD_JOIN_COLUMNS: &str = "l.id, l.name, l.phone, l.lead_source, l.city, l.state, \
     l.status, l.assigned_caller_id, l.assigned_at, l.created_at, l.updated_at, c.name";

fn row_to_lead(row: LeadJoinRow) -> Result<LeadWithCaller> {
    let (
        id,
        name,
        phone,
        lead_source,
        city,
        state,
        status,
        assigned_caller_id,
        assigned_at,
        created_at,
        updated_at,
        caller_name,
    ) = row;

    let assigned_caller_id = assigned_caller_id
        .map(|s| {
            Uuid::parse_str(&s)
                .map_err(|e| Error::Internal(format!("corrupt assigned_caller_id: {}", e)))
        })
        .transpose()?;

    let lead = Lead {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("corrupt lead id '{}': {}", id, e)))?,
        name,
        phone,
        lead_source,
        city,
        state,
        status: LeadStatus::parse(&status)?,
        assigned_caller_id,
        assigned_at: parse_timestamp(assigned_at)?,
        created_at: parse_timestamp(Some(created_at))?
            .ok_or_else(|| Error::Internal("missing created_at".into()))?,
        updated_at: parse_timestamp(Some(updated_at))?
            .ok_or_else(|| Error::Internal("missing updated_at".into()))?,
    };

    let assigned_caller = match (lead.assigned_caller_id, caller_name) {
        (Some(id), Some(name)) => Some(CallerRef { id, name }),
        _ => None,
    };

    Ok(LeadWithCaller { lead, assigned_caller })
}

fn parse_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|ts| {
            DateTime::parse_from_rfc3339(&ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Internal(format!("corrupt timestamp '{}': {}", ts, e)))
        })
        .transpose()
}

/// Store of leads backed by the service database
#[derive(Clone)]
pub struct LeadStore {
    pool: SqlitePool,
}

impl LeadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a lead already bound to its caller
    ///
    /// INSERT OR REPLACE keyed on the pre-generated lead id makes the
    /// binding write idempotent, so it can be retried after a transient
    /// persistence failure without duplicating the lead.
    pub async fn insert_bound(&self, lead: &Lead) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO leads (id, name, phone, lead_source, city, state, status, \
             assigned_caller_id, assigned_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(lead.id.to_string())
        .bind(&lead.name)
        .bind(&lead.phone)
        .bind(&lead.lead_source)
        .bind(&lead.city)
        .bind(&lead.state)
        .bind(lead.status.as_str())
        .bind(lead.assigned_caller_id.map(|id| id.to_string()))
        .bind(lead.assigned_at.map(|ts| ts.to_rfc3339()))
        .bind(lead.created_at.to_rfc3339())
        .bind(lead.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// One lead with its caller's name resolved
    pub async fn get_with_caller(&self, id: Uuid) -> Result<LeadWithCaller> {
        let row = sqlx::query_as::<_, LeadJoinRow>(&format!(
            "SELECT {} FROM leads l LEFT JOIN callers c ON l.assigned_caller_id = c.id \
             WHERE l.id = ?",
            LEAD_JOIN_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("lead {}", id)))?;

        row_to_lead(row)
    }

    /// All leads, newest first, caller names resolved
    pub async fn list_with_callers(&self) -> Result<Vec<LeadWithCaller>> {
        let rows = sqlx::query_as::<_, LeadJoinRow>(&format!(
            "SELECT {} FROM leads l LEFT JOIN callers c ON l.assigned_caller_id = c.id \
             ORDER BY l.created_at DESC, l.id",
            LEAD_JOIN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_lead).collect()
    }

    /// Leads still requiring caller action (pending or calling)
    pub async fn list_active(&self) -> Result<Vec<LeadWithCaller>> {
        let rows = sqlx::query_as::<_, LeadJoinRow>(&format!(
            "SELECT {} FROM leads l LEFT JOIN callers c ON l.assigned_caller_id = c.id \
             WHERE l.status IN ('pending', 'calling') \
             ORDER BY l.created_at DESC, l.id",
            LEAD_JOIN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_lead).collect()
    }

    /// Transition a lead's status (independent of the assignment engine)
    pub async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<LeadWithCaller> {
        let result = sqlx::query("UPDATE leads SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("lead {}", id)));
        }

        self.get_with_caller(id).await
    }

    /// Remove a lead
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("lead {}", id)));
        }
        Ok(())
    }
}
