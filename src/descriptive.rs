//! Descriptive statistics over plain `f64` samples.
//!
//! Callers are expected to filter out absent readings and to check for an
//! empty sample first; these helpers return `None` instead of NaN on empty
//! input.

use statrs::statistics::Statistics;

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Population variance (divides by n)
pub fn population_variance(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().population_variance())
}

/// Percentile `p` in [0, 100] using linear interpolation between the closest
/// order statistics, with rank `p / 100 * (n - 1)`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let fraction = rank - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * fraction)
}

/// Index and value of the largest element; ties resolve to the first occurrence
pub fn first_max(values: &[f64]) -> Option<(usize, f64)> {
    first_extremum(values, |candidate, best| candidate > best)
}

/// Index and value of the smallest element; ties resolve to the first occurrence
pub fn first_min(values: &[f64]) -> Option<(usize, f64)> {
    first_extremum(values, |candidate, best| candidate < best)
}

fn first_extremum(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<(usize, f64)> {
    let (&first, rest) = values.split_first()?;
    let mut best = (0, first);
    for (i, &value) in rest.iter().enumerate() {
        if better(value, best.1) {
            best = (i + 1, value);
        }
    }
    Some(best)
}

/// Share of `values` satisfying `predicate`, in percent
pub fn percent_where(values: &[f64], predicate: impl Fn(f64) -> bool) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let matching = values.iter().filter(|&&v| predicate(v)).count();
    Some(matching as f64 / values.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values).unwrap() - 5.0).abs() < 1e-12);
        assert!((population_variance(&values).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_variance(&[]), None);
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(first_max(&[]), None);
        assert_eq!(percent_where(&[], |_| true), None);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = [15.0, 20.0, 35.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 25.0), Some(20.0));
        assert_eq!(percentile(&values, 75.0), Some(40.0));

        // rank 0.75 between 1 and 2
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 25.0), Some(1.75));
        assert_eq!(percentile(&values, 75.0), Some(3.25));
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(4.0));
    }

    #[test]
    fn test_single_value_percentile() {
        assert_eq!(percentile(&[42.0], 25.0), Some(42.0));
        assert_eq!(percentile(&[42.0], 75.0), Some(42.0));
    }

    #[test]
    fn test_extremum_ties_take_first() {
        let values = [3.0, 9.0, 1.0, 9.0, 1.0];
        assert_eq!(first_max(&values), Some((1, 9.0)));
        assert_eq!(first_min(&values), Some((2, 1.0)));
    }

    #[test]
    fn test_percent_where() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percent_where(&values, |v| v > 2.5), Some(50.0));
        assert_eq!(percent_where(&values, |v| v >= 4.0), Some(25.0));
    }
}
