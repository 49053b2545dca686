//! Eligibility filter
//!
//! Pure predicate over a lead and a reconciled caller snapshot. An empty
//! candidate set is a valid result and means "no eligible caller".

use leadline_common::models::{Caller, LeadInput};

/// Compute the candidate set for a lead
///
/// A caller is a candidate iff all hold:
/// 1. capacity remains (`daily_limit == 0` or count below limit);
/// 2. the lead's state is empty, or the caller covers it (empty
///    `assigned_states` covers all states; exact case-sensitive match);
/// 3. the lead carries no language requirement, or the caller speaks it
///    (empty `languages` imposes no restriction).
///
/// Order of the input snapshot is preserved.
pub fn candidates<'a>(lead: &LeadInput, callers: &'a [Caller]) -> Vec<&'a Caller> {
    callers
        .iter()
        .filter(|c| c.has_capacity())
        .filter(|c| lead.state.is_empty() || c.covers_state(&lead.state))
        .filter(|c| match lead.language.as_deref() {
            Some(lang) if !lang.is_empty() => c.speaks(lang),
            _ => true,
        })
        .collect()
}
