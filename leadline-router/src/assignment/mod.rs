//! Lead assignment engine
//!
//! The decision pipeline: reconcile daily counters, compute the candidate
//! set, rank it, then commit the reservation optimistically. Selection runs
//! against a snapshot; correctness under concurrent arrivals comes from the
//! commit-time re-validation and the compare-and-increment primitive, not
//! from locking across the pipeline.

pub mod eligibility;
pub mod reconciler;
pub mod selector;

use crate::db::{CallerRegistry, LeadStore};
use chrono::Utc;
use leadline_common::models::{Lead, LeadInput, LeadStatus, LeadWithCaller};
use leadline_common::time;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fresh-snapshot restarts after a capacity race before giving up
const MAX_SELECTION_ATTEMPTS: u32 = 3;

/// Binding-write retries once a reservation has been spent
const BIND_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for binding-write backoff; doubles per retry
const BIND_BACKOFF_BASE_MS: u64 = 50;

/// Typed outcomes of an assignment decision
#[derive(Error, Debug)]
pub enum AssignError {
    /// No caller satisfies eligibility; terminal for this lead
    #[error("no eligible caller available for this lead")]
    NoEligibleCaller,

    /// The last unit of capacity was consumed concurrently on every attempt
    #[error("caller capacity consumed concurrently ({attempts} attempts)")]
    CapacityExceeded { attempts: u32 },

    /// Registry or lead-store I/O failed
    ///
    /// When `reserved_caller` is set, a unit of capacity was already spent
    /// on that caller and the lead binding did not persist; the failure
    /// must be reconciled against that caller, never by re-running
    /// selection.
    #[error("persistence failure: {source}")]
    Persistence {
        reserved_caller: Option<Uuid>,
        #[source]
        source: leadline_common::Error,
    },

    /// Malformed lead input, rejected before the engine runs
    #[error("validation error: {0}")]
    Validation(String),
}

impl AssignError {
    fn persistence(source: leadline_common::Error) -> Self {
        Self::Persistence { reserved_caller: None, source }
    }
}

/// The assignment decision engine
///
/// Cheap to clone; concurrent invocations share the underlying pool and
/// serialize only on the per-caller counter update.
#[derive(Clone)]
pub struct AssignmentEngine {
    registry: CallerRegistry,
    leads: LeadStore,
}

impl AssignmentEngine {
    pub fn new(registry: CallerRegistry, leads: LeadStore) -> Self {
        Self { registry, leads }
    }

    /// Assign a new lead to exactly one eligible caller and persist the
    /// binding
    ///
    /// On success the returned lead carries the resolved caller reference
    /// and exactly one caller's counter has been incremented.
    pub async fn assign(&self, input: &LeadInput) -> Result<LeadWithCaller, AssignError> {
        input
            .validate()
            .map_err(|e| AssignError::Validation(e.to_string()))?;

        for attempt in 1..=MAX_SELECTION_ATTEMPTS {
            let today = time::operating_day();
            reconciler::reconcile(&self.registry, today)
                .await
                .map_err(AssignError::persistence)?;

            let snapshot = self
                .registry
                .list()
                .await
                .map_err(AssignError::persistence)?;

            let candidates = eligibility::candidates(input, &snapshot);
            let chosen = match selector::select(&candidates) {
                Some(caller) => caller,
                None => return Err(AssignError::NoEligibleCaller),
            };

            // Re-read at commit time: the snapshot may be stale if another
            // request consumed capacity on this caller meanwhile.
            let current = self
                .registry
                .get(chosen.id)
                .await
                .map_err(AssignError::persistence)?;

            if current.daily_limit > 0 && current.today_assigned_count >= current.daily_limit {
                debug!(
                    caller = %current.id,
                    attempt,
                    "capacity consumed concurrently, restarting with fresh snapshot"
                );
                continue;
            }

            let now = Utc::now();
            let reserved = self
                .registry
                .compare_and_increment(current.id, current.today_assigned_count, now)
                .await
                .map_err(AssignError::persistence)?;

            if !reserved {
                debug!(
                    caller = %current.id,
                    attempt,
                    "counter moved under us, restarting with fresh snapshot"
                );
                continue;
            }

            // Reservation is final from here on; only the binding write may
            // still fail, and it retries against the same caller.
            info!(
                caller = %current.id,
                count = current.today_assigned_count + 1,
                "reserved capacity for lead '{}'",
                input.name
            );
            return self.bind(input, current.id, now).await;
        }

        Err(AssignError::CapacityExceeded { attempts: MAX_SELECTION_ATTEMPTS })
    }

    /// Persist the lead-to-caller binding for an already-spent reservation
    async fn bind(
        &self,
        input: &LeadInput,
        caller_id: Uuid,
        now: chrono::DateTime<Utc>,
    ) -> Result<LeadWithCaller, AssignError> {
        let lead = Lead {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            lead_source: input.lead_source.clone(),
            city: input.city.clone(),
            state: input.state.clone(),
            status: LeadStatus::Pending,
            assigned_caller_id: Some(caller_id),
            assigned_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let mut delay = Duration::from_millis(BIND_BACKOFF_BASE_MS);
        let mut last_error = None;

        for attempt in 1..=BIND_RETRY_ATTEMPTS {
            match self.leads.insert_bound(&lead).await {
                Ok(()) => {
                    return self
                        .leads
                        .get_with_caller(lead.id)
                        .await
                        .map_err(|e| AssignError::Persistence {
                            reserved_caller: Some(caller_id),
                            source: e,
                        });
                }
                Err(e) => {
                    warn!(
                        lead = %lead.id,
                        caller = %caller_id,
                        attempt,
                        "lead binding write failed: {}",
                        e
                    );
                    last_error = Some(e);
                    if attempt < BIND_RETRY_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(AssignError::Persistence {
            reserved_caller: Some(caller_id),
            source: last_error
                .unwrap_or_else(|| leadline_common::Error::Internal("bind retries exhausted".into())),
        })
    }
}
