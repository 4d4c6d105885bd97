//! Small nuclear-physics helpers used by the explanatory charts.

/// Maximum fission energy released by one kilogram of U-235 (MWd/kg).
pub const U235_FISSION_MWD_PER_KG: f64 = 950.0;

/// Electron-volts per mega-electron-volt.
pub const EV_PER_MEV: f64 = 1.0e6;

/// Sunlight power per square metre at 1 AU (W/m²).
pub const SOLAR_CONSTANT_W_M2: f64 = 1361.0;

/// Sunlight intensity at `distance_au` relative to Earth's (inverse square).
pub fn relative_insolence(distance_au: f64) -> f64 {
    1.0 / (distance_au * distance_au)
}

/// Remaining quantity after `t` for an exponential decay with `half_life`.
///
/// `t` and `half_life` share a unit (years in the chart).
pub fn remaining(initial: f64, half_life: f64, t: f64) -> f64 {
    initial * (-std::f64::consts::LN_2 / half_life * t).exp()
}

/// Decay curve sampled at integer steps `0..steps`.
pub fn decay_curve(initial: f64, half_life: f64, steps: u32) -> Vec<(f64, f64)> {
    (0..steps)
        .map(|t| {
            let t = f64::from(t);
            (t, remaining(initial, half_life, t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_remains_after_one_half_life() {
        assert!((remaining(100.0, 50.0, 50.0) - 50.0).abs() < 1e-9);
        assert!((remaining(100.0, 300.0, 600.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn curve_starts_at_initial() {
        let curve = decay_curve(100.0, 200.0, 500);
        assert_eq!(curve.len(), 500);
        assert_eq!(curve[0], (0.0, 100.0));
        assert!(curve.windows(2).all(|w| w[1].1 < w[0].1));
    }

    #[test]
    fn insolence_falls_with_square_of_distance() {
        assert_eq!(relative_insolence(1.0), 1.0);
        assert!((relative_insolence(5.2) - 1.0 / 27.04).abs() < 1e-12);
        assert!((relative_insolence(0.5) - 4.0).abs() < 1e-12);
    }
}
