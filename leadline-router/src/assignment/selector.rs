//! Assignment selector
//!
//! Deterministic least-loaded ranking. A pure function of the candidate
//! list: safe to re-run on retry, trivially testable.

use leadline_common::models::Caller;

/// Pick one caller from the candidate set
///
/// Ranking: smallest `today_assigned_count`; ties broken by earliest
/// `last_assigned_at` with never-assigned callers (`None`) winning; final
/// ties broken by smallest id. `None` when the candidate set is empty.
pub fn select<'a>(candidates: &[&'a Caller]) -> Option<&'a Caller> {
    candidates
        .iter()
        .min_by_key(|c| (c.today_assigned_count, c.last_assigned_at, c.id))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn caller(count: i64, last_assigned_offset_min: Option<i64>, id_byte: u8) -> Caller {
        Caller {
            id: Uuid::from_bytes([id_byte; 16]),
            name: "test".to_string(),
            role: String::new(),
            languages: vec![],
            assigned_states: vec![],
            daily_limit: 0,
            today_assigned_count: count,
            last_assigned_at: last_assigned_offset_min
                .map(|m| Utc::now() - Duration::minutes(m)),
            last_reset_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_candidate_set_yields_none() {
        assert!(select(&[]).is_none());
    }

    #[test]
    fn least_loaded_wins() {
        let c1 = caller(3, None, 1);
        let c2 = caller(1, None, 2);
        let picked = select(&[&c1, &c2]).unwrap();
        assert_eq!(picked.id, c2.id);
    }

    #[test]
    fn never_assigned_wins_count_tie() {
        let assigned = caller(2, Some(30), 1);
        let fresh = caller(2, None, 2);
        let picked = select(&[&assigned, &fresh]).unwrap();
        assert_eq!(picked.id, fresh.id);
    }

    #[test]
    fn earlier_assignment_wins_count_tie() {
        let recent = caller(2, Some(5), 1);
        let stale = caller(2, Some(120), 2);
        let picked = select(&[&recent, &stale]).unwrap();
        assert_eq!(picked.id, stale.id);
    }

    #[test]
    fn smallest_id_breaks_full_tie() {
        let ts = Utc::now();
        let mut a = caller(1, None, 9);
        let mut b = caller(1, None, 3);
        a.last_assigned_at = Some(ts);
        b.last_assigned_at = Some(ts);
        let picked = select(&[&a, &b]).unwrap();
        assert_eq!(picked.id, b.id);
    }

    #[test]
    fn repeated_invocations_pick_the_same_caller() {
        let c1 = caller(2, Some(10), 4);
        let c2 = caller(2, Some(10), 2);
        let c3 = caller(4, None, 1);
        let set = [&c1, &c2, &c3];
        let first = select(&set).unwrap().id;
        for _ in 0..10 {
            assert_eq!(select(&set).unwrap().id, first);
        }
    }
}
