//! Daily counter reconciler
//!
//! Runs before every assignment decision rather than on a timer, so there
//! is no drift window in which a stale counter can leak into eligibility.

use crate::db::CallerRegistry;
use chrono::NaiveDate;
use leadline_common::Result;

/// Bring every caller's daily counter up to date for the given operating day
///
/// Callers whose `last_reset_date` is not `today` get their count zeroed
/// and the date stamped. Re-applying on an already-reset roster is a no-op.
pub async fn reconcile(registry: &CallerRegistry, today: NaiveDate) -> Result<u64> {
    registry.reset_stale_counters(today).await
}
