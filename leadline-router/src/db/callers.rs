//! Caller registry
//!
//! Persistent record of callers, their coverage and daily counters. The
//! `compare_and_increment` primitive is the only way a counter goes up;
//! administrative updates never touch counter columns.

use chrono::{DateTime, NaiveDate, Utc};
use leadline_common::models::{Caller, CallerInput};
use leadline_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Row tuple as selected by `CALLER_COLUMNS`
type CallerRow = (
    String,         // id
    String,         // name
    String,         // role
    String,         // languages (JSON)
    String,         // assigned_states (JSON)
    i64,            // daily_limit
    i64,            // today_assigned_count
    Option<String>, // last_assigned_at
    Option<String>, // last_reset_date
    String,         // created_at
    String,         // updated_at
);

const CALLER_COLUMNS: &str = "id, name, role, languages, assigned_states, daily_limit, \
     today_assigned_count, last_assigned_at, last_reset_date, created_at, updated_at";

fn row_to_caller(row: CallerRow) -> Result<Caller> {
    let (
        id,
        name,
        role,
        languages,
        assigned_states,
        daily_limit,
        today_assigned_count,
        last_assigned_at,
        last_reset_date,
        created_at,
        updated_at,
    ) = row;

    Ok(Caller {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("corrupt caller id '{}': {}", id, e)))?,
        name,
        role,
        languages: serde_json::from_str(&languages)
            .map_err(|e| Error::Internal(format!("corrupt languages column: {}", e)))?,
        assigned_states: serde_json::from_str(&assigned_states)
            .map_err(|e| Error::Internal(format!("corrupt assigned_states column: {}", e)))?,
        daily_limit,
        today_assigned_count,
        last_assigned_at: parse_timestamp(last_assigned_at)?,
        last_reset_date: last_reset_date
            .map(|d| {
                d.parse::<NaiveDate>()
                    .map_err(|e| Error::Internal(format!("corrupt last_reset_date: {}", e)))
            })
            .transpose()?,
        created_at: parse_timestamp(Some(created_at))?
            .ok_or_else(|| Error::Internal("missing created_at".into()))?,
        updated_at: parse_timestamp(Some(updated_at))?
            .ok_or_else(|| Error::Internal("missing updated_at".into()))?,
    })
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

/// Registry of callers backed by the service database
#[derive(Clone)]
pub struct CallerRegistry {
    pool: SqlitePool,
}

impl CallerRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All callers, ordered by id for reproducible traversal
    pub async fn list(&self) -> Result<Vec<Caller>> {
        let rows = sqlx::query_as::<_, CallerRow>(&format!(
            "SELECT {} FROM callers ORDER BY id",
            CALLER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_caller).collect()
    }

    /// Fetch one caller by id
    pub async fn get(&self, id: Uuid) -> Result<Caller> {
        let row = sqlx::query_as::<_, CallerRow>(&format!(
            "SELECT {} FROM callers WHERE id = ?",
            CALLER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("caller {}", id)))?;

        row_to_caller(row)
    }

    /// Create a new caller with zeroed counters
    pub async fn create(&self, input: &CallerInput) -> Result<Caller> {
        input.validate()?;

        let now = Utc::now();
        let caller = Caller {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            role: input.role.clone(),
            languages: input.languages.clone(),
            assigned_states: input.assigned_states.clone(),
            daily_limit: input.daily_limit,
            today_assigned_count: 0,
            last_assigned_at: None,
            last_reset_date: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO callers (id, name, role, languages, assigned_states, daily_limit, \
             today_assigned_count, last_assigned_at, last_reset_date, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, NULL, NULL, ?, ?)",
        )
        .bind(caller.id.to_string())
        .bind(&caller.name)
        .bind(&caller.role)
        .bind(serde_json::to_string(&caller.languages).unwrap_or_else(|_| "[]".into()))
        .bind(serde_json::to_string(&caller.assigned_states).unwrap_or_else(|_| "[]".into()))
        .bind(caller.daily_limit)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!("Created caller {} ({})", caller.name, caller.id);
        Ok(caller)
    }

    /// Update administrative fields of an existing caller
    ///
    /// Counters and `last_assigned_at` are deliberately not writable here.
    pub async fn update(&self, id: Uuid, input: &CallerInput) -> Result<Caller> {
        input.validate()?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE callers SET name = ?, role = ?, languages = ?, assigned_states = ?, \
             daily_limit = ?, updated_at = ? WHERE id = ?",
        )
        .bind(input.name.trim())
        .bind(&input.role)
        .bind(serde_json::to_string(&input.languages).unwrap_or_else(|_| "[]".into()))
        .bind(serde_json::to_string(&input.assigned_states).unwrap_or_else(|_| "[]".into()))
        .bind(input.daily_limit)
        .bind(now.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("caller {}", id)));
        }

        self.get(id).await
    }

    /// Remove a caller; leads previously bound to it keep a NULL reference
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM callers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("caller {}", id)));
        }
        Ok(())
    }

    /// Zero the daily counter of every caller whose last reset is not `today`
    ///
    /// One set-wide UPDATE: every caller the eligibility filter will examine
    /// is current before the decision runs. Idempotent within a day.
    pub async fn reset_stale_counters(&self, today: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE callers SET today_assigned_count = 0, last_reset_date = ?, updated_at = ? \
             WHERE last_reset_date IS NULL OR last_reset_date <> ?",
        )
        .bind(today.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(today.to_string())
        .execute(&self.pool)
        .await?;

        let reset = result.rows_affected();
        if reset > 0 {
            debug!("Day rollover: reset counters for {} caller(s)", reset);
        }
        Ok(reset)
    }

    /// Atomically consume one unit of capacity if the counter still equals
    /// `expected_count`
    ///
    /// Returns `false` on conflict (a concurrent assignment moved the
    /// counter first). The single conditional UPDATE is the per-caller
    /// serialization point; unrelated callers commit in parallel.
    pub async fn compare_and_increment(
        &self,
        id: Uuid,
        expected_count: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE callers SET today_assigned_count = today_assigned_count + 1, \
             last_assigned_at = ?, updated_at = ? \
             WHERE id = ? AND today_assigned_count = ?",
        )
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(id.to_string())
        .bind(expected_count)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
