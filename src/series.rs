//! Labelled, time-ordered sample series.

use chrono::{NaiveDateTime, Timelike};

use crate::error::SeriesError;

/// An ordered sequence of `(timestamp, value)` samples.
///
/// Stored as two parallel vectors. Timestamps are strictly increasing;
/// gaps between them are allowed and are not interpolated.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use energy_plots::series::TimeSeries;
///
/// let t0 = NaiveDate::from_ymd_opt(2019, 6, 21)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let series = TimeSeries::uniform("Summer demand", t0, 5, vec![10.0, 12.0, 11.0]);
/// assert_eq!(series.len(), 3);
/// assert_eq!(series.values(), &[10.0, 12.0, 11.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    label: String,
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Creates a series, checking alignment and timestamp ordering.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::Unaligned` if the vectors differ in length and
    /// `SeriesError::NotIncreasing` at the first out-of-order timestamp.
    pub fn new(
        label: impl Into<String>,
        timestamps: Vec<NaiveDateTime>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if timestamps.len() != values.len() {
            return Err(SeriesError::Unaligned {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SeriesError::NotIncreasing { index: index + 1 });
        }
        Ok(Self {
            label: label.into(),
            timestamps,
            values,
        })
    }

    /// Creates a series sampled every `interval_minutes` starting at `start`.
    pub fn uniform(
        label: impl Into<String>,
        start: NaiveDateTime,
        interval_minutes: i64,
        values: Vec<f64>,
    ) -> Self {
        let step = chrono::Duration::minutes(interval_minutes.max(1));
        let timestamps = (0..values.len())
            .scan(start, |t, _| {
                let current = *t;
                *t += step;
                Some(current)
            })
            .collect();
        Self {
            label: label.into(),
            timestamps,
            values,
        }
    }

    /// Builds a series from values whose timestamps are already known to be
    /// increasing (output of another series operation).
    pub(crate) fn from_parts(
        label: String,
        timestamps: Vec<NaiveDateTime>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self {
            label,
            timestamps,
            values,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns a copy of the series under a new label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Keeps samples whose timestamp lies in `[start, end]`.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let (timestamps, values) = self
            .iter()
            .filter(|(t, _)| *t >= start && *t <= end)
            .unzip();
        Self::from_parts(self.label.clone(), timestamps, values)
    }

    /// Maps every value, keeping timestamps and label.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_parts(
            self.label.clone(),
            self.timestamps.clone(),
            self.values.iter().map(|&v| f(v)).collect(),
        )
    }

    /// Points as `(hour of day, value)` for daily profile charts.
    pub fn hour_of_day_points(&self) -> Vec<(f64, f64)> {
        self.iter()
            .map(|(t, v)| (f64::from(t.hour()) + f64::from(t.minute()) / 60.0, v))
            .collect()
    }

    /// Points as `(decimal year, value)` for multi-month charts.
    pub fn decimal_year_points(&self) -> Vec<(f64, f64)> {
        self.iter().map(|(t, v)| (decimal_year(t), v)).collect()
    }
}

/// Converts a timestamp to a fractional calendar year (2020.5 is early July).
pub fn decimal_year(t: NaiveDateTime) -> f64 {
    use chrono::Datelike;

    let year = t.year();
    let start = chrono::NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let next = chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    match (start, next) {
        (Some(start), Some(next)) => {
            let elapsed = (t - start).num_seconds() as f64;
            let span = (next - start).num_seconds() as f64;
            f64::from(year) + elapsed / span
        }
        _ => f64::from(year),
    }
}

/// Inverse of [`decimal_year`]; `None` outside chrono's calendar range.
pub fn from_decimal_year(v: f64) -> Option<NaiveDateTime> {
    if !v.is_finite() {
        return None;
    }
    let year = i32::try_from(v.floor() as i64).ok()?;
    let start = chrono::NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let next = chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let span = (next - start).num_seconds() as f64;
    let elapsed = ((v - v.floor()) * span).round() as i64;
    start.checked_add_signed(chrono::Duration::seconds(elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 12, 21)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn rejects_unaligned_vectors() {
        let err = TimeSeries::new("x", vec![at(0, 0)], vec![1.0, 2.0]);
        assert_eq!(
            err,
            Err(SeriesError::Unaligned {
                timestamps: 1,
                values: 2
            })
        );
    }

    #[test]
    fn rejects_repeated_timestamp() {
        let err = TimeSeries::new("x", vec![at(0, 0), at(0, 5), at(0, 5)], vec![1.0; 3]);
        assert_eq!(err, Err(SeriesError::NotIncreasing { index: 2 }));
    }

    #[test]
    fn accepts_gaps() {
        let series = TimeSeries::new("x", vec![at(0, 0), at(0, 5), at(3, 0)], vec![1.0; 3]);
        assert!(series.is_ok());
    }

    #[test]
    fn uniform_spacing() {
        let series = TimeSeries::uniform("x", at(0, 0), 5, vec![0.0; 4]);
        assert_eq!(series.timestamps()[3], at(0, 15));
    }

    #[test]
    fn hour_of_day_uses_minutes() {
        let series = TimeSeries::uniform("x", at(13, 30), 5, vec![1.0]);
        assert_eq!(series.hour_of_day_points(), vec![(13.5, 1.0)]);
    }

    #[test]
    fn between_is_inclusive() {
        let series = TimeSeries::uniform("x", at(0, 0), 60, vec![1.0, 2.0, 3.0, 4.0]);
        let cut = series.between(at(1, 0), at(2, 0));
        assert_eq!(cut.values(), &[2.0, 3.0]);
    }

    #[test]
    fn decimal_year_start_of_year() {
        let t = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        assert_eq!(decimal_year(t), 2020.0);
    }

    #[test]
    fn decimal_year_inverts() {
        let t = NaiveDate::from_ymd_opt(2020, 12, 3)
            .and_then(|d| d.and_hms_opt(6, 0, 0))
            .expect("valid timestamp");
        assert_eq!(from_decimal_year(decimal_year(t)), Some(t));
        assert_eq!(from_decimal_year(f64::NAN), None);
    }
}
