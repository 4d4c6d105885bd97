//! Generation/demand reconciliation over sampled power series.
//!
//! All operations are pure. Samples are assumed uniformly spaced at the
//! nominal interval: a gap in the timestamps is summed and averaged over as
//! if it were not there. This reproduces the historical chart numbers and is
//! a known accuracy limitation for irregular inputs.

use crate::error::SeriesError;
use crate::series::TimeSeries;

const MINUTES_PER_DAY: f64 = 60.0 * 24.0;

/// Integrates a power series into energy in value-unit·days.
///
/// Sums `value * interval/60/24` left to right. Megawatts sampled every five
/// minutes integrate to megawatt-days.
///
/// # Errors
///
/// Returns `SeriesError::Empty` for an empty series and
/// `SeriesError::InvalidInterval` for a non-positive or non-finite interval.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use energy_plots::reconcile::integrate;
/// use energy_plots::series::TimeSeries;
///
/// let t0 = NaiveDate::from_ymd_opt(2019, 6, 21)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let series = TimeSeries::uniform("demand", t0, 5, vec![10.0; 4]);
/// let energy = integrate(&series, 5.0).unwrap();
/// assert!((energy - 0.138_888).abs() < 1e-5);
/// ```
pub fn integrate(series: &TimeSeries, sample_interval_minutes: f64) -> Result<f64, SeriesError> {
    if !sample_interval_minutes.is_finite() || sample_interval_minutes <= 0.0 {
        return Err(SeriesError::InvalidInterval(sample_interval_minutes));
    }
    if series.is_empty() {
        return Err(SeriesError::Empty);
    }
    let mut total = 0.0;
    for v in series.values() {
        total += v * sample_interval_minutes / MINUTES_PER_DAY;
    }
    Ok(total)
}

/// Returns the factor that scales `source` so its integral matches `target`.
///
/// # Errors
///
/// Propagates `integrate` errors for either series and returns
/// `SeriesError::ZeroIntegral` when the source integral is zero.
pub fn scale_factor(
    source: &TimeSeries,
    target: &TimeSeries,
    sample_interval_minutes: f64,
) -> Result<f64, SeriesError> {
    let source_integral = integrate(source, sample_interval_minutes)?;
    let target_integral = integrate(target, sample_interval_minutes)?;
    if source_integral == 0.0 {
        return Err(SeriesError::ZeroIntegral);
    }
    Ok(target_integral / source_integral)
}

/// Multiplies every value by `factor`, keeping timestamps.
pub fn rescale(series: &TimeSeries, factor: f64) -> TimeSeries {
    series.map_values(|v| v * factor)
}

/// Trailing simple moving average over `window` samples.
///
/// The output starts at the first full window: it holds
/// `len - window + 1` samples, each stamped with the timestamp of the last
/// sample in its window. A window longer than the series yields an empty
/// series.
///
/// # Errors
///
/// Returns `SeriesError::ZeroWindow` when `window` is zero.
pub fn rolling_average(series: &TimeSeries, window: usize) -> Result<TimeSeries, SeriesError> {
    if window == 0 {
        return Err(SeriesError::ZeroWindow);
    }
    if window > series.len() {
        return Ok(TimeSeries::from_parts(
            series.label().to_string(),
            Vec::new(),
            Vec::new(),
        ));
    }

    let values = series.values();
    let mut averaged = Vec::with_capacity(values.len() - window + 1);
    for end in window - 1..values.len() {
        let sum: f64 = values[end + 1 - window..=end].iter().sum();
        averaged.push(sum / window as f64);
    }
    let timestamps = series.timestamps()[window - 1..].to_vec();

    Ok(TimeSeries::from_parts(
        series.label().to_string(),
        timestamps,
        averaged,
    ))
}

/// Element-wise `a - b`, stamped with `a`'s timestamps.
///
/// # Errors
///
/// Returns `SeriesError::LengthMismatch` if the series differ in length.
pub fn difference(a: &TimeSeries, b: &TimeSeries) -> Result<TimeSeries, SeriesError> {
    if a.len() != b.len() {
        return Err(SeriesError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let values = a
        .values()
        .iter()
        .zip(b.values())
        .map(|(x, y)| x - y)
        .collect();
    Ok(TimeSeries::from_parts(
        a.label().to_string(),
        a.timestamps().to_vec(),
        values,
    ))
}

/// Clamps negative values to zero.
pub fn positive_part(series: &TimeSeries) -> TimeSeries {
    series.map_values(|v| v.max(0.0))
}

/// Largest value in the series.
///
/// # Errors
///
/// Returns `SeriesError::Empty` for an empty series.
pub fn peak(series: &TimeSeries) -> Result<f64, SeriesError> {
    series
        .values()
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(SeriesError::Empty)
}

/// Ratio of produced energy to the energy at `capacity` over the same samples.
///
/// When `capacity` is `None` the series peak stands in for nameplate
/// capacity.
///
/// # Errors
///
/// Returns `SeriesError::Empty` for an empty series and
/// `SeriesError::NonPositiveCapacity` when the capacity is not positive.
pub fn capacity_factor(series: &TimeSeries, capacity: Option<f64>) -> Result<f64, SeriesError> {
    let capacity = match capacity {
        Some(c) => c,
        None => peak(series)?,
    };
    if series.is_empty() {
        return Err(SeriesError::Empty);
    }
    if capacity <= 0.0 || !capacity.is_finite() {
        return Err(SeriesError::NonPositiveCapacity(capacity));
    }
    let produced: f64 = series.values().iter().sum();
    Ok(produced / (capacity * series.len() as f64))
}

/// Scales `values` proportionally so they sum to `total`.
///
/// # Errors
///
/// Returns `SeriesError::Empty` for no values and `SeriesError::ZeroIntegral`
/// when the values sum to zero.
pub fn normalize_to_total(values: &[f64], total: f64) -> Result<Vec<f64>, SeriesError> {
    if values.is_empty() {
        return Err(SeriesError::Empty);
    }
    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        return Err(SeriesError::ZeroIntegral);
    }
    Ok(values.iter().map(|v| v / sum * total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 6, 21)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp")
    }

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries::uniform("test", start(), 5, values.to_vec())
    }

    #[test]
    fn integrate_four_samples_of_ten() {
        let energy = integrate(&series(&[10.0; 4]), 5.0).expect("non-empty");
        assert_relative_eq!(energy, 10.0 * 4.0 * 5.0 / 60.0 / 24.0, epsilon = 1e-12);
        assert_relative_eq!(energy, 0.138_888_9, epsilon = 1e-6);
    }

    #[test]
    fn integrate_constant_series() {
        let energy = integrate(&series(&[250.0; 288]), 5.0).expect("non-empty");
        assert_relative_eq!(energy, 250.0 * 288.0 * 5.0 / 60.0 / 24.0, epsilon = 1e-9);
    }

    #[test]
    fn integrate_empty_is_error() {
        assert_eq!(integrate(&series(&[]), 5.0), Err(SeriesError::Empty));
    }

    #[test]
    fn integrate_rejects_zero_interval() {
        assert_eq!(
            integrate(&series(&[1.0]), 0.0),
            Err(SeriesError::InvalidInterval(0.0))
        );
    }

    #[test]
    fn scale_factor_two_to_six() {
        // 1440 minutes at 2.0 -> integral 2.0; at 6.0 -> integral 6.0
        let source = TimeSeries::uniform("s", start(), 1440, vec![2.0]);
        let target = TimeSeries::uniform("t", start(), 1440, vec![6.0]);
        let factor = scale_factor(&source, &target, 1440.0).expect("non-zero source");
        assert_relative_eq!(factor, 3.0);
        let scaled = rescale(&source, factor);
        let energy = integrate(&scaled, 1440.0).expect("non-empty");
        assert_relative_eq!(energy, 6.0);
    }

    #[test]
    fn scale_factor_zero_source() {
        let err = scale_factor(&series(&[0.0, 0.0]), &series(&[1.0, 2.0]), 5.0);
        assert_eq!(err, Err(SeriesError::ZeroIntegral));
    }

    #[test]
    fn rescale_keeps_timestamps() {
        let s = series(&[1.0, 2.0]);
        let scaled = rescale(&s, 2.5);
        assert_eq!(scaled.timestamps(), s.timestamps());
        assert_eq!(scaled.values(), &[2.5, 5.0]);
    }

    #[test]
    fn rolling_average_window_three() {
        let avg = rolling_average(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3).expect("window > 0");
        assert_eq!(avg.values(), &[2.0, 3.0, 4.0]);
        assert_eq!(avg.timestamps()[0], series(&[0.0; 3]).timestamps()[2]);
    }

    #[test]
    fn rolling_average_constant() {
        let avg = rolling_average(&series(&[7.5; 20]), 12).expect("window > 0");
        assert_eq!(avg.len(), 9);
        assert!(avg.values().iter().all(|&v| (v - 7.5).abs() < 1e-12));
    }

    #[test]
    fn rolling_average_window_one_is_identity() {
        let s = series(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(rolling_average(&s, 1).expect("window > 0"), s);
    }

    #[test]
    fn rolling_average_window_longer_than_series() {
        let avg = rolling_average(&series(&[1.0, 2.0]), 3).expect("not an error");
        assert!(avg.is_empty());
    }

    #[test]
    fn rolling_average_zero_window() {
        assert_eq!(
            rolling_average(&series(&[1.0]), 0),
            Err(SeriesError::ZeroWindow)
        );
    }

    #[test]
    fn difference_requires_equal_lengths() {
        let err = difference(&series(&[1.0, 2.0]), &series(&[1.0]));
        assert_eq!(err, Err(SeriesError::LengthMismatch { left: 2, right: 1 }));
    }

    #[test]
    fn positive_difference() {
        let d = difference(&series(&[5.0, 1.0, 3.0]), &series(&[2.0, 2.0, 3.0])).expect("aligned");
        assert_eq!(positive_part(&d).values(), &[3.0, 0.0, 0.0]);
    }

    #[test]
    fn capacity_factor_against_peak() {
        let cf = capacity_factor(&series(&[1000.0, 3000.0, 2000.0, 4000.0]), None).expect("ok");
        assert_relative_eq!(cf, 10_000.0 / (4000.0 * 4.0));
    }

    #[test]
    fn capacity_factor_constant_is_one() {
        let cf = capacity_factor(&series(&[42.0; 10]), None).expect("ok");
        assert_relative_eq!(cf, 1.0);
    }

    #[test]
    fn capacity_factor_rejects_zero_capacity() {
        let err = capacity_factor(&series(&[0.0, 0.0]), None);
        assert_eq!(err, Err(SeriesError::NonPositiveCapacity(0.0)));
    }

    #[test]
    fn normalize_sums_to_total() {
        let scaled = normalize_to_total(&[1.0, 3.0], 950.0).expect("ok");
        assert_relative_eq!(scaled[0], 237.5);
        assert_relative_eq!(scaled.iter().sum::<f64>(), 950.0);
    }

    #[test]
    fn peak_of_empty() {
        assert_eq!(peak(&series(&[])), Err(SeriesError::Empty));
    }
}
