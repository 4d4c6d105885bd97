//! Summary statistics over a set of values.

use std::fmt;

use crate::error::SeriesError;

/// Aggregate statistics of a value set.
///
/// `mean_of_extremes` is the midpoint of the minimum and maximum, reported
/// next to the mean and median to show how badly it can misrepresent a
/// skewed distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Number of values.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Middle value (average of the two middle values for even counts).
    pub median: f64,
    /// `(min + max) / 2`.
    pub mean_of_extremes: f64,
}

impl Summary {
    /// Computes all statistics from `values`.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::Empty` if `values` is empty.
    pub fn from_values(values: &[f64]) -> Result<Self, SeriesError> {
        if values.is_empty() {
            return Err(SeriesError::Empty);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let min = sorted[0];
        let max = sorted[n - 1];
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Ok(Self {
            count: n,
            min,
            max,
            mean,
            median,
            mean_of_extremes: (min + max) / 2.0,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Summary ---")?;
        writeln!(f, "Values:            {}", self.count)?;
        writeln!(f, "Min / Max:         {:.1} / {:.1}", self.min, self.max)?;
        writeln!(f, "Mean:              {:.1}", self.mean)?;
        writeln!(f, "Median:            {:.1}", self.median)?;
        write!(f, "Mean of extremes:  {:.1}", self.mean_of_extremes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_count_median() {
        let s = Summary::from_values(&[5.0, 1.0, 3.0]).expect("non-empty");
        assert_eq!(s.median, 3.0);
        assert_eq!(s.mean, 3.0);
    }

    #[test]
    fn even_count_median() {
        let s = Summary::from_values(&[4.0, 1.0, 3.0, 2.0]).expect("non-empty");
        assert_eq!(s.median, 2.5);
    }

    #[test]
    fn skewed_extremes() {
        // one large outlier drags the midpoint far above the median
        let s = Summary::from_values(&[3.7, 12.0, 12.0, 13.0, 110.0]).expect("non-empty");
        assert_eq!(s.min, 3.7);
        assert_eq!(s.max, 110.0);
        assert!((s.mean_of_extremes - 56.85).abs() < 1e-9);
        assert!(s.mean_of_extremes > 4.0 * s.median);
    }

    #[test]
    fn empty_values() {
        assert_eq!(Summary::from_values(&[]), Err(SeriesError::Empty));
    }

    #[test]
    fn display_lists_all_fields() {
        let s = Summary::from_values(&[1.0, 2.0]).expect("non-empty");
        let text = s.to_string();
        assert!(text.contains("Median"));
        assert!(text.contains("Mean of extremes:  1.5"));
    }
}
