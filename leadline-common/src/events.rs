//! Dashboard event types
//!
//! Events pushed to connected dashboards over the live-update channel.
//! Delivery is at-most-once; events for the same lead are emitted in order
//! (a single broadcast channel preserves send order).

use crate::models::{LeadStatus, LeadWithCaller};
use serde_json::{json, Value};
use uuid::Uuid;

/// A live-update event about a single lead
#[derive(Debug, Clone)]
pub enum LeadEvent {
    /// A lead was ingested and bound to a caller
    LeadAssigned { lead: Box<LeadWithCaller> },
    /// A lead's status was transitioned by an agent
    LeadStatusChanged { lead_id: Uuid, status: LeadStatus },
    /// A lead's status reached `completed`
    LeadCompleted { lead_id: Uuid },
    /// A lead was removed
    LeadDeleted { lead_id: Uuid },
}

impl LeadEvent {
    /// Create a LeadAssigned event
    pub fn assigned(lead: LeadWithCaller) -> Self {
        Self::LeadAssigned { lead: Box::new(lead) }
    }

    /// Create a LeadStatusChanged event
    pub fn status_changed(lead_id: Uuid, status: LeadStatus) -> Self {
        Self::LeadStatusChanged { lead_id, status }
    }

    /// Create a LeadCompleted event
    pub fn completed(lead_id: Uuid) -> Self {
        Self::LeadCompleted { lead_id }
    }

    /// Create a LeadDeleted event
    pub fn deleted(lead_id: Uuid) -> Self {
        Self::LeadDeleted { lead_id }
    }

    /// Wire name of the event (the SSE `event:` field)
    pub fn name(&self) -> &'static str {
        match self {
            LeadEvent::LeadAssigned { .. } => "lead-assigned",
            LeadEvent::LeadStatusChanged { .. } => "lead-status-changed",
            LeadEvent::LeadCompleted { .. } => "lead-completed",
            LeadEvent::LeadDeleted { .. } => "lead-deleted",
        }
    }

    /// JSON payload delivered as the SSE `data:` field
    pub fn payload(&self) -> Value {
        match self {
            LeadEvent::LeadAssigned { lead } => {
                serde_json::to_value(lead.as_ref()).unwrap_or(Value::Null)
            }
            LeadEvent::LeadStatusChanged { lead_id, status } => json!({
                "leadId": lead_id,
                "status": status,
            }),
            LeadEvent::LeadCompleted { lead_id } => json!({
                "leadId": lead_id,
            }),
            LeadEvent::LeadDeleted { lead_id } => json!({
                "leadId": lead_id,
            }),
        }
    }
}
