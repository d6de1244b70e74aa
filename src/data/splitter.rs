// ============================================================
// Layer 4 — Train/Test Splitter and Subsampler
// ============================================================
// Deterministically shuffles rows and splits them into two sets:
//   - Training set: used to update model weights
//   - Test set:     used to measure performance on unseen data
//
// Both operations take an explicit seed so a run can be
// reproduced exactly. Contract for the split:
//   |train| + |test| == |input|, the two are disjoint, and their
//   union reconstructs the input set.
//
// subsample() shrinks a split to a fraction of its rows for fast
// iteration. It is NOT a validation split and has no statistical
// guarantees — it exists so a smoke run finishes in seconds.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom,
// the standard unbiased shuffle algorithm.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `rows` with the given seed and split into (train, test).
///
/// The split index is round(len * train_fraction), clamped to the
/// valid range so tiny inputs never panic.
pub fn split_train_test<T>(
    mut rows:       Vec<T>,
    train_fraction: f64,
    seed:           u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);

    let total    = rows.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] and returns them:
    // rows keeps [0..split_at], test gets [split_at..total]
    let test = rows.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} train, {} test (seed {})",
        rows.len(),
        test.len(),
        seed,
    );

    (rows, test)
}

/// Keep round(len * fraction) randomly chosen rows, at least one
/// when the input is non-empty. A fraction >= 1.0 is a no-op so
/// the common full-data path never reorders rows twice.
pub fn subsample<T>(mut rows: Vec<T>, fraction: f64, seed: u64) -> Vec<T> {
    if fraction >= 1.0 || rows.is_empty() {
        return rows;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);

    let keep = ((rows.len() as f64) * fraction).round() as usize;
    let keep = keep.clamp(1, rows.len());
    rows.truncate(keep);

    tracing::debug!("Subsampled to {} rows ({}%)", rows.len(), fraction * 100.0);
    rows
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_train_test(items, 0.8, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_split_is_a_partition() {
        // Disjoint by row identity, and the union reconstructs the input
        let items: Vec<usize> = (0..57).collect();
        let (train, test)     = split_train_test(items, 0.7, 7);

        let train_set: HashSet<usize> = train.iter().copied().collect();
        let test_set:  HashSet<usize> = test.iter().copied().collect();

        assert_eq!(train.len() + test.len(), 57);
        assert!(train_set.is_disjoint(&test_set));

        let union: HashSet<usize> = train_set.union(&test_set).copied().collect();
        assert_eq!(union, (0..57).collect::<HashSet<usize>>());
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let a = split_train_test((0..50).collect::<Vec<usize>>(), 0.8, 123);
        let b = split_train_test((0..50).collect::<Vec<usize>>(), 0.8, 123);
        assert_eq!(a, b);

        let c = split_train_test((0..50).collect::<Vec<usize>>(), 0.8, 124);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, test)     = split_train_test(items, 0.8, 42);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_subsample_size() {
        let items: Vec<usize> = (0..200).collect();
        let kept = subsample(items, 0.25, 42);
        assert_eq!(kept.len(), 50);
    }

    #[test]
    fn test_subsample_keeps_at_least_one_row() {
        // 1% of 10 rows rounds to 0 — the floor of one row keeps a
        // quick smoke run from producing an empty training set
        let items: Vec<usize> = (0..10).collect();
        let kept = subsample(items, 0.01, 42);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_subsample_full_fraction_is_identity() {
        let items: Vec<usize> = (0..10).collect();
        let kept = subsample(items.clone(), 1.0, 42);
        assert_eq!(kept, items);
    }
}
