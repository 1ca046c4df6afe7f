//! # Obliquity of the ecliptic and nutation
//!
//! ## Overview
//!
//! - Mean obliquity: IAU cubic in `T` (low accuracy, about 1″ over 2000 years) or Laskar's
//!   ten-term series in `T/100` (high accuracy, 0.01″ over 1000 years).
//! - Nutation in longitude `Δψ` and in obliquity `Δε`: four-term approximation (low accuracy,
//!   0.5″ / 0.1″) or the 63-term IAU 1980 table (high accuracy, 0.0003″).
//! - True obliquity is the mean obliquity plus `Δε`.
//!
//! `T` is measured in Julian centuries from J2000. All public functions return degree angles.
use crate::angle::{Angle, WrapMode};
use crate::constants::{ArcSec, Degree};
use crate::time::JulianDay;

/// Requested precision of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    Low,
    #[default]
    High,
}

/// Evaluate `Σ terms[i]·t^i` with Horner's scheme.
fn polynomial(t: f64, terms: &[f64]) -> f64 {
    terms.iter().rev().fold(0.0, |acc, term| acc * t + term)
}

fn arcsec(value: ArcSec) -> Angle {
    Angle::degrees(value / 3600.0).with_wrap(WrapMode::Symmetric)
}

/// Mean elongation of the Moon from the Sun (D).
pub fn mean_elongation_of_moon(jd: JulianDay) -> Angle {
    Angle::degrees(polynomial(
        jd.julian_century(),
        &[297.85036, 445267.111480, -0.0019142, 1.0 / 189474.0],
    ))
}

/// Mean anomaly of the Sun (M).
pub fn mean_anomaly_of_sun(jd: JulianDay) -> Angle {
    Angle::degrees(polynomial(
        jd.julian_century(),
        &[357.52772, 35999.050340, -0.0001603, -1.0 / 300000.0],
    ))
}

/// Mean anomaly of the Moon (M′).
pub fn mean_anomaly_of_moon(jd: JulianDay) -> Angle {
    Angle::degrees(polynomial(
        jd.julian_century(),
        &[134.96298, 477198.867398, 0.0086972, 1.0 / 56250.0],
    ))
}

/// Argument of latitude of the Moon (F).
pub fn moon_argument_of_latitude(jd: JulianDay) -> Angle {
    Angle::degrees(polynomial(
        jd.julian_century(),
        &[93.27191, 483202.017538, -0.0036825, 1.0 / 327270.0],
    ))
}

/// Longitude of the ascending node of the Moon's mean orbit on the ecliptic (Ω).
pub fn moon_ascending_node_longitude(jd: JulianDay) -> Angle {
    Angle::degrees(polynomial(
        jd.julian_century(),
        &[125.04452, -1934.136261, 0.0020708, 1.0 / 450000.0],
    ))
}

/// Mean obliquity of the ecliptic
///
/// Arguments
/// ---------
/// * `jd`: julian day
/// * `accuracy`: series to use; the high accuracy series is valid 10000 years around J2000
///
/// Return
/// ------
/// * the mean obliquity as a degree angle
pub fn mean_obliquity(jd: JulianDay, accuracy: Accuracy) -> Angle {
    let t = jd.julian_century();
    let seconds = match accuracy {
        Accuracy::Low => polynomial(
            t,
            &[23.0 * 3600.0 + 26.0 * 60.0 + 21.448, -46.815, -0.00059, 0.001813],
        ),
        Accuracy::High => polynomial(
            t / 100.0,
            &[
                84381.448, -4680.93, -1.55, 1999.25, -51.38, -249.67, -39.05, 7.12, 27.87, 5.79,
                2.45,
            ],
        ),
    };
    Angle::degrees(seconds / 3600.0)
}

/// Nutation in longitude and in obliquity
///
/// Return
/// ------
/// * `(Δψ, Δε)` as degree angles with a symmetric wrap
pub fn nutation(jd: JulianDay, accuracy: Accuracy) -> (Angle, Angle) {
    let t = jd.julian_century();
    let node = moon_ascending_node_longitude(jd).to_radians();

    match accuracy {
        Accuracy::Low => {
            let sun = (280.4665 + 36000.7698 * t).to_radians();
            let moon = (218.3165 + 481267.8813 * t).to_radians();
            let delta_psi = -17.2 * node.sin() - 1.32 * (2.0 * sun).sin()
                - 0.23 * (2.0 * moon).sin()
                + 0.21 * (2.0 * node).sin();
            let delta_eps = 9.2 * node.cos()
                + 0.57 * (2.0 * sun).cos()
                + 0.1 * (2.0 * moon).cos()
                - 0.09 * (2.0 * node).cos();
            (arcsec(delta_psi), arcsec(delta_eps))
        }
        Accuracy::High => {
            let fundamentals: [Degree; 5] = [
                mean_elongation_of_moon(jd).raw_value(),
                mean_anomaly_of_sun(jd).raw_value(),
                mean_anomaly_of_moon(jd).raw_value(),
                moon_argument_of_latitude(jd).raw_value(),
                moon_ascending_node_longitude(jd).raw_value(),
            ];
            let (psi, eps) = ARGUMENT_MULTIPLES.iter().zip(PE_TERMS.iter()).fold(
                (0.0, 0.0),
                |(psi, eps), (multiples, pe)| {
                    let arg: Degree = multiples
                        .iter()
                        .zip(fundamentals.iter())
                        .map(|(&m, &f)| m as f64 * f)
                        .sum();
                    let arg = arg.to_radians();
                    (
                        psi + arg.sin() * (pe[0] + pe[1] * t),
                        eps + arg.cos() * (pe[2] + pe[3] * t),
                    )
                },
            );
            // table is in units of 0.0001″
            (arcsec(psi / 1e4), arcsec(eps / 1e4))
        }
    }
}

pub fn true_obliquity(jd: JulianDay, accuracy: Accuracy) -> Angle {
    let (_, delta_eps) = nutation(jd, accuracy);
    Angle::degrees(mean_obliquity(jd, accuracy).raw_value() + delta_eps.raw_value())
}

/// Obliquity used to convert between ecliptic and equatorial frames.
///
/// The standard equinoxes use their conventional values (23.4392911° for J2000 and
/// 23.4457889° for B1950); any other date uses the true obliquity.
pub fn obliquity_of_ecliptic(jd: JulianDay) -> Angle {
    if jd == JulianDay::J2000 {
        Angle::degrees(23.4392911)
    } else if jd == JulianDay::B1950 {
        Angle::degrees(23.4457889)
    } else {
        true_obliquity(jd, Accuracy::High)
    }
}

/// Multiples of (D, M, M′, F, Ω) for each periodic term.
const ARGUMENT_MULTIPLES: [[i8; 5]; 63] = [
    [0, 0, 0, 0, 1],
    [-2, 0, 0, 2, 2],
    [0, 0, 0, 2, 2],
    [0, 0, 0, 0, 2],
    [0, 1, 0, 0, 0],
    [0, 0, 1, 0, 0],
    [-2, 1, 0, 2, 2],
    [0, 0, 0, 2, 1],
    [0, 0, 1, 2, 2],
    [-2, -1, 0, 2, 2],
    [-2, 0, 1, 0, 0],
    [-2, 0, 0, 2, 1],
    [0, 0, -1, 2, 2],
    [2, 0, 0, 0, 0],
    [0, 0, 1, 0, 1],
    [2, 0, -1, 2, 2],
    [0, 0, -1, 0, 1],
    [0, 0, 1, 2, 1],
    [-2, 0, 2, 0, 0],
    [0, 0, -2, 2, 1],
    [2, 0, 0, 2, 2],
    [0, 0, 2, 2, 2],
    [0, 0, 2, 0, 0],
    [-2, 0, 1, 2, 2],
    [0, 0, 0, 2, 0],
    [-2, 0, 0, 2, 0],
    [0, 0, -1, 2, 1],
    [0, 2, 0, 0, 0],
    [2, 0, -1, 0, 1],
    [-2, 2, 0, 2, 2],
    [0, 1, 0, 0, 1],
    [-2, 0, 1, 0, 1],
    [0, -1, 0, 0, 1],
    [0, 0, 2, -2, 0],
    [2, 0, -1, 2, 1],
    [2, 0, 1, 2, 2],
    [0, 1, 0, 2, 2],
    [-2, 1, 1, 0, 0],
    [0, -1, 0, 2, 2],
    [2, 0, 0, 2, 1],
    [2, 0, 1, 0, 0],
    [-2, 0, 2, 2, 2],
    [-2, 0, 1, 2, 1],
    [2, 0, -2, 0, 1],
    [2, 0, 0, 0, 1],
    [0, -1, 1, 0, 0],
    [-2, -1, 0, 2, 1],
    [-2, 0, 0, 0, 1],
    [0, 0, 2, 2, 1],
    [-2, 0, 2, 0, 1],
    [-2, 1, 0, 2, 1],
    [0, 0, 1, -2, 0],
    [-1, 0, 1, 0, 0],
    [-2, 1, 0, 0, 0],
    [1, 0, 0, 0, 0],
    [0, 0, 1, 2, 0],
    [0, 0, -2, 2, 2],
    [-1, -1, 1, 0, 0],
    [0, 1, 1, 0, 0],
    [0, -1, 1, 2, 2],
    [2, -1, -1, 2, 2],
    [0, 0, 3, 2, 2],
    [2, -1, 0, 2, 2],
];

/// Coefficients `[ψ0, ψ1, ε0, ε1]` of `Δψ = Σ sin(arg)(ψ0 + ψ1·T)` and
/// `Δε = Σ cos(arg)(ε0 + ε1·T)`, in units of 0.0001″.
const PE_TERMS: [[f64; 4]; 63] = [
    [-171996.0, -174.2, 92025.0, 8.9],
    [-13187.0, -1.6, 5736.0, -3.1],
    [-2274.0, -0.2, 977.0, -0.5],
    [2062.0, 0.2, -895.0, 0.5],
    [1426.0, -3.4, 54.0, -0.1],
    [712.0, 0.1, -7.0, 0.0],
    [-517.0, 1.2, 224.0, -0.6],
    [-386.0, -0.4, 200.0, 0.0],
    [-301.0, 0.0, 129.0, -0.1],
    [217.0, -0.5, -95.0, 0.3],
    [-158.0, 0.0, 0.0, 0.0],
    [129.0, 0.1, -70.0, 0.0],
    [123.0, 0.0, -53.0, 0.0],
    [63.0, 0.0, 0.0, 0.0],
    [63.0, 0.1, -33.0, 0.0],
    [-59.0, 0.0, 26.0, 0.0],
    [-58.0, -0.1, 32.0, 0.0],
    [-51.0, 0.0, 27.0, 0.0],
    [48.0, 0.0, 0.0, 0.0],
    [46.0, 0.0, -24.0, 0.0],
    [-38.0, 0.0, 16.0, 0.0],
    [-31.0, 0.0, 13.0, 0.0],
    [29.0, 0.0, 0.0, 0.0],
    [29.0, 0.0, -12.0, 0.0],
    [26.0, 0.0, 0.0, 0.0],
    [-22.0, 0.0, 0.0, 0.0],
    [21.0, 0.0, -10.0, 0.0],
    [17.0, -0.1, 0.0, 0.0],
    [16.0, 0.0, -8.0, 0.0],
    [-16.0, 0.1, 7.0, 0.0],
    [-15.0, 0.0, 9.0, 0.0],
    [-13.0, 0.0, 7.0, 0.0],
    [-12.0, 0.0, 6.0, 0.0],
    [11.0, 0.0, 0.0, 0.0],
    [-10.0, 0.0, 5.0, 0.0],
    [-8.0, 0.0, 3.0, 0.0],
    [7.0, 0.0, -3.0, 0.0],
    [-7.0, 0.0, 0.0, 0.0],
    [-7.0, 0.0, 3.0, 0.0],
    [-7.0, 0.0, 3.0, 0.0],
    [6.0, 0.0, 0.0, 0.0],
    [6.0, 0.0, -3.0, 0.0],
    [6.0, 0.0, -3.0, 0.0],
    [-6.0, 0.0, 3.0, 0.0],
    [-6.0, 0.0, 3.0, 0.0],
    [5.0, 0.0, 0.0, 0.0],
    [-5.0, 0.0, 3.0, 0.0],
    [-5.0, 0.0, 3.0, 0.0],
    [-5.0, 0.0, 3.0, 0.0],
    [4.0, 0.0, 0.0, 0.0],
    [4.0, 0.0, 0.0, 0.0],
    [4.0, 0.0, 0.0, 0.0],
    [-4.0, 0.0, 0.0, 0.0],
    [-4.0, 0.0, 0.0, 0.0],
    [-4.0, 0.0, 0.0, 0.0],
    [3.0, 0.0, 0.0, 0.0],
    [-3.0, 0.0, 0.0, 0.0],
    [-3.0, 0.0, 0.0, 0.0],
    [-3.0, 0.0, 0.0, 0.0],
    [-3.0, 0.0, 0.0, 0.0],
    [-3.0, 0.0, 0.0, 0.0],
    [-3.0, 0.0, 0.0, 0.0],
    [-3.0, 0.0, 0.0, 0.0],
];
