//! Dynamic time warping distance between two numeric sequences.

use ndarray::Array2;
use swole_core::{Error, Result};

/// Accumulated-cost table for `s1` against `s2`
///
/// The table has one extra leading row and column: cell `(0, 0)` is zero and
/// the rest of that row and column are infinite, so every warping path
/// starts at the first sample of both sequences. Cell `(i + 1, j + 1)` holds
/// the cheapest squared-difference path ending at `s1[i]`, `s2[j]`.
pub fn dtw_cost_table(s1: &[f64], s2: &[f64]) -> Array2<f64> {
    let (n, m) = (s1.len(), s2.len());
    let mut table = Array2::from_elem((n + 1, m + 1), f64::INFINITY);
    table[[0, 0]] = 0.0;

    for i in 1..=n {
        for j in 1..=m {
            let cost = (s1[i - 1] - s2[j - 1]).powi(2);
            let best = table[[i - 1, j]]
                .min(table[[i, j - 1]])
                .min(table[[i - 1, j - 1]]);
            table[[i, j]] = cost + best;
        }
    }

    table
}

/// Elastic distance: square root of the total cost of the best alignment
///
/// `dtw_distance(s, s) == 0` and the distance is symmetric in its arguments.
/// Cost is O(|s1| * |s2|) time and memory.
pub fn dtw_distance(s1: &[f64], s2: &[f64]) -> Result<f64> {
    if s1.is_empty() || s2.is_empty() {
        return Err(Error::InvalidInput(format!(
            "dtw requires non-empty sequences, got lengths {} and {}",
            s1.len(),
            s2.len()
        )));
    }

    let table = dtw_cost_table(s1, s2);
    Ok(table[[s1.len(), s2.len()]].sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let s = [3.0, 7.5, -2.0, 11.0, 11.0, 4.0];
        assert_eq!(dtw_distance(&s, &s).unwrap(), 0.0);
        assert_eq!(dtw_distance(&[5.0], &[5.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let a = [0.0, 10.0, 20.0, 30.0, 20.0];
        let b = [1.0, 12.0, 28.0, 29.0, 29.0, 18.0, 3.0];
        let ab = dtw_distance(&a, &b).unwrap();
        let ba = dtw_distance(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_sensitivity() {
        let base = [0.0, 0.0, 0.0];
        let far = dtw_distance(&base, &[0.0, 0.0, 5.0]).unwrap();
        let near = dtw_distance(&base, &[0.0, 0.0, 1.0]).unwrap();
        assert!(far > near);
        assert!((near - 1.0).abs() < 1e-12);
        assert!((far - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_stretch_is_free() {
        // Repeating samples aligns them to the same point at no cost
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 1.0, 2.0, 2.0, 2.0, 3.0];
        assert_eq!(dtw_distance(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_unequal_lengths() {
        // Leading zero absorbs two samples, only the last pairs with 4.0
        let d = dtw_distance(&[0.0, 4.0], &[0.0, 0.0, 0.0]).unwrap();
        assert!((d - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(dtw_distance(&[], &[1.0]).is_err());
        assert!(dtw_distance(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_cost_table_boundaries() {
        let table = dtw_cost_table(&[1.0, 2.0], &[1.0]);
        assert_eq!(table.dim(), (3, 2));
        assert_eq!(table[[0, 0]], 0.0);
        assert!(table[[1, 0]].is_infinite());
        assert!(table[[0, 1]].is_infinite());
        assert_eq!(table[[2, 1]], 1.0);
    }
}
