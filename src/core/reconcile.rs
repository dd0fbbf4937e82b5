use std::collections::HashSet;

/// Every element of `existing` not present in `owned`, in the order of
/// `existing`. Pure set difference, no failure modes.
pub fn reconcile(owned: &[u32], existing: &[u32]) -> Vec<u32> {
    let owned: HashSet<u32> = owned.iter().copied().collect();
    existing
        .iter()
        .copied()
        .filter(|v| !owned.contains(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_existing_minus_owned() {
        let missing = reconcile(&[1, 2, 4], &[1, 2, 3, 4, 6]);
        assert_eq!(missing, vec![3, 6]);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(reconcile(&[], &[]), Vec::<u32>::new());
        assert_eq!(reconcile(&[1, 2], &[]), Vec::<u32>::new());
        assert_eq!(reconcile(&[], &[1, 2]), vec![1, 2]);
    }

    #[test]
    fn test_result_is_subset_of_existing_and_disjoint_from_owned() {
        let owned = [2, 4, 8];
        let existing = [1, 2, 3, 4, 5, 8, 13];
        let missing = reconcile(&owned, &existing);

        assert!(missing.iter().all(|v| existing.contains(v)));
        assert!(missing.iter().all(|v| !owned.contains(v)));
    }

    #[test]
    fn test_preserves_existing_order() {
        assert_eq!(reconcile(&[5], &[1, 5, 9, 12]), vec![1, 9, 12]);
    }
}
