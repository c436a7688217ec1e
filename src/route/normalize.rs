// src/route/normalize.rs

//! Waypoint-order normalization.
//!
//! The provider returns a visiting permutation over *its* waypoint list,
//! which has the depot at both ends. Whether the indices it sends back count
//! those depot entries is not documented; we detect it by the presence of an
//! index that cannot refer to a local stop.

/// Map provider waypoint indices onto local stop indices.
///
/// 1. If any index is `>= stop_count`, the list is depot-inclusive: shift
///    every index down by one.
/// 2. Drop indices outside `[0, stop_count)`; those are depot positions.
/// 3. What remains, in order, is the visiting order.
///
/// The output is *not* checked for completeness; see [`is_permutation`].
pub fn normalize_waypoint_order(raw: &[i64], stop_count: usize) -> Vec<usize> {
    let count = stop_count as i64;
    let depot_inclusive = raw.iter().any(|&idx| idx >= count);
    let offset = i64::from(depot_inclusive);

    raw.iter()
        .filter_map(|&idx| idx.checked_sub(offset))
        .filter(|&idx| idx >= 0 && idx < count)
        .map(|idx| idx as usize)
        .collect()
}

/// True when `order` contains each of `0..stop_count` exactly once.
pub fn is_permutation(order: &[usize], stop_count: usize) -> bool {
    if order.len() != stop_count {
        return false;
    }
    let mut seen = vec![false; stop_count];
    for &idx in order {
        match seen.get_mut(idx) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depot_inclusive_order_is_shifted_and_trimmed() {
        // Two stops, depot at provider positions 0 and 3.
        let order = normalize_waypoint_order(&[0, 2, 1, 3], 2);
        assert_eq!(order, vec![1, 0]);
        assert!(is_permutation(&order, 2));
    }

    #[test]
    fn stop_only_order_passes_through() {
        let order = normalize_waypoint_order(&[2, 0, 1], 3);
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn negative_and_far_indices_are_dropped() {
        let order = normalize_waypoint_order(&[-1, 0, 9, 1], 3);
        // 9 marks the list depot-inclusive: [-2, -1, 8, 0] -> [0]
        assert_eq!(order, vec![0]);
        assert!(!is_permutation(&order, 3));
    }

    #[test]
    fn extreme_indices_do_not_overflow() {
        let order = normalize_waypoint_order(&[i64::MIN, 5, 1, 2], 2);
        assert_eq!(order, vec![0, 1]);
        assert!(normalize_waypoint_order(&[i64::MAX, i64::MIN], 3).is_empty());
    }

    #[test]
    fn permutation_check_rejects_duplicates_and_gaps() {
        assert!(!is_permutation(&[0, 0], 2));
        assert!(!is_permutation(&[0, 2], 2));
        assert!(!is_permutation(&[0], 2));
        assert!(is_permutation(&[], 0));
    }
}
