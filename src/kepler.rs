//! # Kepler's equation
//!
//! Conversion from mean anomaly to eccentric anomaly for elliptical (`M = E − e·sin E`),
//! near-parabolic and hyperbolic (`M = e·sinh H − H`) orbits.
//!
//! ## Overview
//!
//! - Low eccentricities (`e < 0.99999`) use a Newton iteration seeded with
//!   `atan2(sin M, cos M − e)`.
//! - Higher eccentricities are seeded with a cube root or `asinh` estimate and iterated with a
//!   threshold scaled by `|1 − e|`.
//! - After a few iterations without convergence the residual is evaluated with a power series
//!   ([`near_parabolic`]) to avoid the cancellation between `E` and `e·sin E`.
//! - The solver never loops forever: past [`MAX_ITERATIONS`] it returns
//!   [`KeplerError::DidNotConverge`] with its best estimate so callers may degrade gracefully.
use std::f64::consts::PI;

use crate::constants::{Radian, Second, DPI};
use crate::orrery_errors::KeplerError;

const MIN_THRESH: f64 = 1.0e-15;
const THRESH: f64 = 1.0e-12;
/// Iterations of plain Newton steps before switching to the series residual.
const SERIES_SWITCH: usize = 7;
/// Hard cap on the number of Newton steps.
pub const MAX_ITERATIONS: usize = 64;
const LOW_ECCENTRICITY_LIMIT: f64 = 0.99999;

/// `E − e·sin E` (or `E − e·sinh E` when `e > 1`) computed as a power series.
fn near_parabolic(ecc_anom: f64, e: f64) -> f64 {
    let anom2 = if e > 1.0 {
        ecc_anom * ecc_anom
    } else {
        -ecc_anom * ecc_anom
    };
    let mut term = e * anom2 * ecc_anom / 6.0;
    let mut rval = (1.0 - e) * ecc_anom - term;
    let mut n = 4.0;

    while term.abs() > 1e-15 {
        term *= anom2 / (n * (n + 1.0));
        rval -= term;
        n += 2.0;
    }
    rval
}

/// Residual of Kepler's equation for an eccentric anomaly guess.
pub fn kepler_residual(eccentricity: f64, eccentric_anomaly: Radian, mean_anomaly: Radian) -> f64 {
    if eccentricity < 1.0 {
        eccentric_anomaly - eccentricity * eccentric_anomaly.sin() - mean_anomaly
    } else {
        eccentricity * eccentric_anomaly.sinh() - eccentric_anomaly - mean_anomaly
    }
}

fn did_not_converge(eccentricity: f64, mean_anomaly: Radian, estimate: Radian) -> KeplerError {
    KeplerError::DidNotConverge {
        eccentricity,
        mean_anomaly,
        estimate,
        residual: kepler_residual(eccentricity, estimate, mean_anomaly),
    }
}

/// Solve Kepler's equation for the eccentric anomaly
///
/// Arguments
/// ---------
/// * `eccentricity`: orbit eccentricity, any non-negative value
/// * `mean_anomaly`: mean anomaly in radians, not necessarily reduced
///
/// Return
/// ------
/// * the eccentric anomaly in radians (hyperbolic anomaly when `eccentricity > 1`). For closed
///   orbits the multiple of 2π removed from `mean_anomaly` is added back.
/// * [`KeplerError::DidNotConverge`] if the iteration cap is reached or the inputs are not
///   finite. The error carries the last estimate and its residual.
/// * [`KeplerError::Parabolic`] for an eccentricity of exactly 1, see [`solve_barker`].
pub fn solve_kepler(eccentricity: f64, mean_anomaly: Radian) -> Result<Radian, KeplerError> {
    let ecc = eccentricity;
    if !ecc.is_finite() || !mean_anomaly.is_finite() {
        return Err(did_not_converge(ecc, mean_anomaly, f64::NAN));
    }
    if ecc == 1.0 {
        return Err(KeplerError::Parabolic);
    }
    if mean_anomaly == 0.0 {
        return Ok(0.0);
    }

    let mut mean_anom = mean_anomaly;
    let mut offset = 0.0;

    if ecc < 1.0 {
        if !(-PI..=PI).contains(&mean_anom) {
            // bring the mean anomaly within [-π, π]
            let mut tmod = mean_anom % DPI;
            if tmod > PI {
                tmod -= DPI;
            } else if tmod < -PI {
                tmod += DPI;
            }
            offset = mean_anom - tmod;
            mean_anom = tmod;
        }

        if ecc < LOW_ECCENTRICITY_LIMIT {
            let mut curr = mean_anom.sin().atan2(mean_anom.cos() - ecc);
            for _ in 0..MAX_ITERATIONS {
                let err = (curr - ecc * curr.sin() - mean_anom) / (1.0 - ecc * curr.cos());
                curr -= err;
                if err.abs() <= THRESH {
                    return Ok(curr + offset);
                }
            }
            return Err(did_not_converge(ecc, mean_anomaly, curr + offset));
        }
    }

    let is_negative = mean_anom < 0.0;
    if is_negative {
        mean_anom = -mean_anom;
    }

    // roundoff keeps us from going below a minimum threshold anyway
    let thresh = (THRESH * (1.0 - ecc).abs()).clamp(MIN_THRESH, THRESH);

    let mut curr = mean_anom;
    if mean_anom < PI / 3.0 || ecc > 1.0 {
        let mut trial = mean_anom / (1.0 - ecc).abs();
        if trial * trial > 6.0 * (1.0 - ecc).abs() {
            trial = if mean_anom < PI {
                // cubic term is dominant
                (6.0 * mean_anom).cbrt()
            } else {
                (mean_anom / ecc).asinh()
            };
        }
        curr = trial;
    }

    let mut delta_curr: f64 = 1.0;
    let mut n_iter = 0;
    while delta_curr.abs() > thresh {
        if n_iter >= MAX_ITERATIONS || !curr.is_finite() {
            let estimate = if is_negative { offset - curr } else { offset + curr };
            return Err(did_not_converge(ecc, mean_anomaly, estimate));
        }
        let use_series = n_iter > SERIES_SWITCH;
        if ecc < 1.0 {
            let err = if use_series {
                near_parabolic(curr, ecc) - mean_anom
            } else {
                curr - ecc * curr.sin() - mean_anom
            };
            delta_curr = -err / (1.0 - ecc * curr.cos());
        } else {
            let err = if use_series {
                -near_parabolic(curr, ecc) - mean_anom
            } else {
                ecc * curr.sinh() - curr - mean_anom
            };
            delta_curr = -err / (ecc * curr.cosh() - 1.0);
        }
        curr += delta_curr;
        n_iter += 1;
    }

    if !curr.is_finite() {
        return Err(did_not_converge(ecc, mean_anomaly, curr));
    }
    Ok(if is_negative {
        offset - curr
    } else {
        offset + curr
    })
}

/// True anomaly from the eccentric (or hyperbolic) anomaly.
pub fn true_anomaly(eccentricity: f64, eccentric_anomaly: Radian) -> Radian {
    let half = eccentric_anomaly / 2.0;
    if eccentricity < 1.0 {
        2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
            .atan2((1.0 - eccentricity).sqrt() * half.cos())
    } else {
        2.0 * ((eccentricity + 1.0).sqrt() * half.sinh())
            .atan2((eccentricity - 1.0).sqrt() * half.cosh())
    }
}

/// Barker's equation `M = D + D³/3` for a parabolic orbit, solved in closed form.
///
/// Return
/// ------
/// * the parabolic anomaly `D = tan(ν/2)`
pub fn solve_barker(mean_anomaly: Radian) -> f64 {
    let half = 1.5 * mean_anomaly;
    let y = (half + (1.0 + half * half).sqrt()).cbrt();
    y - 1.0 / y
}

/// Mean anomaly after `elapsed` seconds from periapsis
///
/// Arguments
/// ---------
/// * `elapsed`: time since periapsis passage in seconds
/// * `grav_param`: gravitational parameter of the central body in m³/s²
/// * `semimajor_axis`: semimajor axis in meters
///
/// Return
/// ------
/// * the mean anomaly wrapped to [0, 2π)
pub fn mean_anomaly_from_time(elapsed: Second, grav_param: f64, semimajor_axis: f64) -> Radian {
    (elapsed * (grav_param / semimajor_axis.abs().powi(3)).sqrt()).rem_euclid(DPI)
}

#[cfg(test)]
mod kepler_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn angle_diff(a: f64, b: f64) -> f64 {
        let diff = (a - b).rem_euclid(DPI);
        diff.min(DPI - diff)
    }

    #[test]
    fn test_zero_mean_anomaly() {
        assert_eq!(solve_kepler(0.3, 0.0).unwrap(), 0.0);
        assert_eq!(solve_kepler(2.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_elliptic_solutions_reproduce_mean_anomaly() {
        let eccentricities = [0.0, 0.0167, 0.3, 0.7, 0.95, 0.998];
        let mean_anomalies = [-7.5, -PI, -1.0, 0.001, 0.5, 2.9, PI, 4.2, 12.0];
        for &e in &eccentricities {
            for &m in &mean_anomalies {
                let ecc_anom = solve_kepler(e, m).unwrap();
                let recovered = ecc_anom - e * ecc_anom.sin();
                assert!(
                    angle_diff(recovered, m) < 1e-9,
                    "e = {e}, M = {m}, E = {ecc_anom}"
                );
            }
        }
    }

    #[test]
    fn test_offset_is_added_back() {
        let m = 0.5 + 2.0 * DPI;
        let e_wrapped = solve_kepler(0.1, 0.5).unwrap();
        let e_full = solve_kepler(0.1, m).unwrap();
        assert_abs_diff_eq!(e_full, e_wrapped + 2.0 * DPI, epsilon = 1e-9);
    }

    #[test]
    fn test_near_parabolic_elliptic() {
        for &m in &[1e-4, 0.01, 0.5, 2.0] {
            let e = 0.9999995;
            let ecc_anom = solve_kepler(e, m).unwrap();
            assert_abs_diff_eq!(kepler_residual(e, ecc_anom, m), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_hyperbolic() {
        for &(e, m) in &[(1.5, 2.0), (1.0001, 0.3), (3.0, 25.0), (1.2, -4.0)] {
            let h = solve_kepler(e, m).unwrap();
            assert_abs_diff_eq!(e * h.sinh() - h, m, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_non_finite_input_fails() {
        let err = solve_kepler(f64::NAN, 1.0).unwrap_err();
        assert!(matches!(err, KeplerError::DidNotConverge { .. }));
        assert!(solve_kepler(0.5, f64::INFINITY).is_err());
    }

    #[test]
    fn test_near_parabolic_series() {
        // the series matches the closed form away from cancellation
        let (e, ecc_anom) = (0.7, 0.4);
        assert_abs_diff_eq!(
            near_parabolic(ecc_anom, e),
            ecc_anom - e * ecc_anom.sin(),
            epsilon = 1e-14
        );
        let (e, h) = (1.3, 0.4);
        assert_abs_diff_eq!(near_parabolic(h, e), h - e * h.sinh(), epsilon = 1e-14);
    }

    #[test]
    fn test_true_anomaly() {
        assert_abs_diff_eq!(true_anomaly(0.0, 1.2), 1.2, epsilon = 1e-14);
        assert_abs_diff_eq!(true_anomaly(0.5, PI), PI, epsilon = 1e-12);
        // cos ν = (cos E − e) / (1 − e cos E)
        let (e, ecc_anom) = (0.3, 1.0_f64);
        let nu = true_anomaly(e, ecc_anom);
        assert_abs_diff_eq!(
            nu.cos(),
            (ecc_anom.cos() - e) / (1.0 - e * ecc_anom.cos()),
            epsilon = 1e-12
        );
        // cos ν = (e − cosh H) / (e cosh H − 1)
        let (e, h) = (1.5, 0.8_f64);
        let nu = true_anomaly(e, h);
        assert_abs_diff_eq!(
            nu.cos(),
            (e - h.cosh()) / (e * h.cosh() - 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_exact_parabola() {
        assert_eq!(solve_kepler(1.0, 0.5), Err(KeplerError::Parabolic));
        for &m in &[-3.0, 0.0, 0.2, 1.0, 40.0] {
            let d = solve_barker(m);
            assert_abs_diff_eq!(d + d.powi(3) / 3.0, m, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_mean_anomaly_from_time() {
        let period = DPI;
        assert_abs_diff_eq!(mean_anomaly_from_time(period / 4.0, 1.0, 1.0), PI / 2.0, epsilon = 1e-12);
        let full = mean_anomaly_from_time(3.0 * period + 0.25, 1.0, 1.0);
        assert_abs_diff_eq!(full, 0.25, epsilon = 1e-9);
    }
}
