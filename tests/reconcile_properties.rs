//! Integration tests for the reconciliation operations on realistic days.

mod common;

use approx::assert_relative_eq;

use energy_plots::error::SeriesError;
use energy_plots::reconcile::{
    capacity_factor, difference, integrate, peak, positive_part, rescale, rolling_average,
    scale_factor,
};

fn daylight(peak_mw: f64) -> Vec<f64> {
    (0..288)
        .map(|i| {
            let h = i as f64 * 5.0 / 60.0;
            if (6.0..20.0).contains(&h) {
                peak_mw * ((h - 6.0) / 14.0 * std::f64::consts::PI).sin()
            } else {
                0.0
            }
        })
        .collect()
}

#[test]
fn rescaled_source_integrates_to_target() {
    let winter = common::five_minute("winter", &daylight(8_000.0));
    let summer = common::five_minute("summer", &daylight(11_000.0));

    let factor = scale_factor(&winter, &summer, 5.0).expect("non-zero source");
    let scaled = rescale(&winter, factor);

    let target = integrate(&summer, 5.0).expect("non-empty");
    let result = integrate(&scaled, 5.0).expect("non-empty");
    assert_relative_eq!(result, target, max_relative = 1e-9);
    assert_eq!(scaled.timestamps(), winter.timestamps());
}

#[test]
fn integral_is_linear_in_scale() {
    let day = common::five_minute("day", &daylight(1_000.0));
    let base = integrate(&day, 5.0).expect("non-empty");
    let doubled = integrate(&rescale(&day, 2.0), 5.0).expect("non-empty");
    assert_relative_eq!(doubled, 2.0 * base, max_relative = 1e-12);
}

#[test]
fn storage_energy_zero_when_supply_stays_below_demand() {
    let demand = common::five_minute("demand", &[30_000.0; 288]);
    let supply = common::five_minute("supply", &daylight(20_000.0));

    let surplus = positive_part(&difference(&supply, &demand).expect("equal lengths"));
    assert_eq!(integrate(&surplus, 5.0).expect("non-empty"), 0.0);
}

#[test]
fn storage_energy_counts_only_surplus() {
    let demand = common::five_minute("demand", &[10.0, 10.0, 10.0, 10.0]);
    let supply = common::five_minute("supply", &[0.0, 20.0, 30.0, 5.0]);

    let surplus = positive_part(&difference(&supply, &demand).expect("equal lengths"));
    assert_eq!(surplus.values(), &[0.0, 10.0, 20.0, 0.0]);
    assert_relative_eq!(
        integrate(&surplus, 5.0).expect("non-empty"),
        30.0 * 5.0 / 60.0 / 24.0,
        epsilon = 1e-12
    );
}

#[test]
fn rolling_average_of_year_of_months() {
    let months: Vec<f64> = (1..=24).map(f64::from).collect();
    let series = common::five_minute("cf", &months);

    let avg = rolling_average(&series, 12).expect("non-zero window");
    assert_eq!(avg.len(), 24 - 12 + 1);
    assert_relative_eq!(avg.values()[0], 6.5);
    assert_relative_eq!(avg.values()[12], 18.5);
    assert_eq!(avg.timestamps()[0], series.timestamps()[11]);
}

#[test]
fn rolling_window_rejects_zero() {
    let series = common::five_minute("cf", &[1.0, 2.0]);
    assert_eq!(rolling_average(&series, 0), Err(SeriesError::ZeroWindow));
    assert!(rolling_average(&series, 3).expect("non-zero window").is_empty());
}

#[test]
fn mismatched_days_cannot_be_differenced() {
    let a = common::five_minute("a", &[1.0; 288]);
    let b = common::five_minute("b", &[1.0; 287]);
    assert_eq!(
        difference(&a, &b),
        Err(SeriesError::LengthMismatch {
            left: 288,
            right: 287
        })
    );
}

#[test]
fn capacity_factor_bounds() {
    let day = common::five_minute("wind", &daylight(2_000.0));
    let at_peak = capacity_factor(&day, None).expect("non-empty");
    assert!(at_peak > 0.0 && at_peak <= 1.0);

    let nameplate = capacity_factor(&day, Some(4_000.0)).expect("positive capacity");
    assert_relative_eq!(nameplate, at_peak * peak(&day).expect("non-empty") / 4_000.0);

    let flat = common::five_minute("flat", &[7.0; 10]);
    assert_relative_eq!(capacity_factor(&flat, None).expect("non-empty"), 1.0);
}
