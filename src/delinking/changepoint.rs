//! Windowed changepoint statistic over a coverage profile.
//!
//! For every position `i` the mean depth of the window just before `i` is
//! compared with the mean of the window starting at `i`:
//!
//! ```text
//! score(i) = |mean(right) - mean(left)| / sqrt(var(left) + var(right) + 1)
//! ```
//!
//! Both windows have the same width `w = min(window_size, i, n - i)`, so the
//! window shrinks symmetrically near either end of the profile and the score
//! is 0 at the ends themselves. Variances are population variances; the `+ 1`
//! keeps flat windows finite.

/// Prefix sums of values and squared values
struct PrefixSums {
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl PrefixSums {
    fn new(profile: &[u32]) -> Self {
        let mut sum = Vec::with_capacity(profile.len() + 1);
        let mut sum_sq = Vec::with_capacity(profile.len() + 1);
        sum.push(0.0);
        sum_sq.push(0.0);
        for &v in profile {
            let v = f64::from(v);
            sum.push(sum[sum.len() - 1] + v);
            sum_sq.push(sum_sq[sum_sq.len() - 1] + v * v);
        }
        Self { sum, sum_sq }
    }

    /// Mean and population variance of `profile[from..to]`
    fn moments(&self, from: usize, to: usize) -> (f64, f64) {
        #[allow(clippy::cast_precision_loss)]
        let n = (to - from) as f64;
        let mean = (self.sum[to] - self.sum[from]) / n;
        let mean_sq = (self.sum_sq[to] - self.sum_sq[from]) / n;
        (mean, (mean_sq - mean * mean).max(0.0))
    }
}

/// Score every position of `profile`; the output has the same length.
#[must_use]
pub fn detect(profile: &[u32], window_size: usize) -> Vec<f64> {
    let n = profile.len();
    let sums = PrefixSums::new(profile);

    (0..n)
        .map(|i| {
            let w = window_size.min(i).min(n - i);
            if w == 0 {
                return 0.0;
            }
            let (mean_left, var_left) = sums.moments(i - w, i);
            let (mean_right, var_right) = sums.moments(i, i + w);
            (mean_right - mean_left).abs() / (var_left + var_right + 1.0).sqrt()
        })
        .collect()
}

/// Percentile of `values` with linear interpolation between closest ranks.
///
/// `pct` is clamped to `[0, 100]`. Returns `None` for an empty slice.
#[must_use]
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    #[allow(clippy::cast_precision_loss)]
    let rank = pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    #[allow(clippy::cast_precision_loss)]
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Positions whose score is strictly above the given percentile of all scores
#[must_use]
pub fn identify_outliers(scores: &[f64], percentile_threshold: f64) -> Vec<usize> {
    let Some(threshold) = percentile(scores, percentile_threshold) else {
        return Vec::new();
    };
    scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s > threshold)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_profile() -> Vec<u32> {
        let mut profile = vec![5; 30];
        profile.extend(vec![50; 15]);
        profile
    }

    #[test]
    fn test_flat_profile_scores_zero() {
        let scores = detect(&[7; 100], 10);
        assert_eq!(scores.len(), 100);
        assert!(scores.iter().all(|&s| s == 0.0));
        assert!(identify_outliers(&scores, 99.0).is_empty());
    }

    #[test]
    fn test_step_peaks_at_junction() {
        let profile = step_profile();
        let scores = detect(&profile, 10);
        assert_eq!(scores.len(), profile.len());

        let (best, _) = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(best, 30);
        assert!((scores[30] - 45.0).abs() < 1e-9);
        assert!((scores[29] - scores[31]).abs() < 1e-9);
    }

    #[test]
    fn test_step_outlier() {
        let scores = detect(&step_profile(), 10);
        assert_eq!(identify_outliers(&scores, 99.0), vec![30]);
    }

    #[test]
    fn test_window_larger_than_profile() {
        let profile = [1, 1, 9, 9];
        let scores = detect(&profile, 1500);
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[0], 0.0);
        // w = 2 at the midpoint
        assert!((scores[2] - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_detect_is_deterministic() {
        let profile: Vec<u32> = (0..200).map(|i| (i * 37 % 11) as u32).collect();
        assert_eq!(detect(&profile, 15), detect(&profile, 15));
    }

    #[test]
    fn test_detect_empty() {
        assert!(detect(&[], 10).is_empty());
        assert!(identify_outliers(&[], 99.0).is_empty());
    }

    #[test]
    fn test_percentile() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 50.0).unwrap() - 3.0).abs() < 1e-9);
        assert!((percentile(&values, 100.0).unwrap() - 5.0).abs() < 1e-9);
        assert!((percentile(&values, 0.0).unwrap() - 1.0).abs() < 1e-9);
        assert!((percentile(&values, 90.0).unwrap() - 4.6).abs() < 1e-9);
        assert!(percentile(&[], 50.0).is_none());
    }
}
