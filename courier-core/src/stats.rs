//! Descriptive statistics shared by the aggregation functions
//!
//! Conventions:
//! - Empty input has no mean or median (`NaN`)
//! - Standard deviation is the sample formula (n - 1); fewer than two values give `NaN`

use serde::{Deserialize, Serialize};

/// Arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Median; the mean of the two middle values for even-sized input
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Round half away from zero to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean and sample standard deviation of one group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    pub fn of(values: &[f64]) -> Self {
        MeanStd {
            mean: mean(values),
            std: sample_std(values),
        }
    }

    /// Both figures rounded to two decimals
    pub fn rounded(self) -> Self {
        MeanStd {
            mean: round2(self.mean),
            std: round2(self.std),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[25.0, 35.0]), 30.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_sample_std() {
        // sqrt(((25-30)^2 + (35-30)^2) / 1)
        let std = sample_std(&[25.0, 35.0]);
        assert!((std - 50.0_f64.sqrt()).abs() < 1e-12);
        assert!(sample_std(&[4.0]).is_nan());
        assert!(sample_std(&[]).is_nan());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(26.499), 26.5);
        assert_eq!(round2(7.071067), 7.07);
        assert!(round2(f64::NAN).is_nan());
    }

    #[test]
    fn test_mean_std_rounded() {
        let stats = MeanStd::of(&[25.0, 35.0]).rounded();
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.std, 7.07);
    }
}
