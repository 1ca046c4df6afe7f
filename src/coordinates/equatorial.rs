//! # Equatorial coordinates
//!
//! Right ascension and declination referred to the mean equator and equinox of an epoch.
//!
//! ## Overview
//!
//! - [`EquatorialCoordinate::to_cartesian`] / [`EquatorialCoordinate::from_cartesian`]: unit
//!   sphere scaled by the distance.
//! - [`EquatorialCoordinate::precessed`]: rigorous precession with the Herget rotation, good to a
//!   fraction of an arc second over a few centuries around 2000.
//! - [`EquatorialCoordinate::angular_separation`]: Vincenty formula, stable for tiny and
//!   antipodal separations.
use nalgebra::{Matrix3, Vector3};

use crate::angle::{Angle, AngleUnit, WrapMode};
use crate::constants::{RADEG, RADSEC};

/// Position on the celestial sphere referred to the equator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialCoordinate {
    /// Right ascension, in hours over [0h, 24h)
    pub right_ascension: Angle,
    /// Declination, in degrees over (-180°, 180°]
    pub declination: Angle,
    pub distance: f64,
}

impl EquatorialCoordinate {
    /// Arguments
    /// ---------
    /// * `right_ascension`: any angle, stored as hours
    /// * `declination`: any angle, stored as degrees with symmetric wrap
    /// * `distance`: distance from the origin, in the unit of the caller
    pub fn new(right_ascension: Angle, declination: Angle, distance: f64) -> Self {
        EquatorialCoordinate {
            right_ascension: right_ascension.to_unit(AngleUnit::Hour),
            declination: declination
                .to_unit(AngleUnit::Degree)
                .with_wrap(WrapMode::Symmetric),
            distance,
        }
    }

    /// Shorthand taking right ascension in hours and declination in degrees.
    pub fn from_hours_degrees(ra_hours: f64, dec_degrees: f64, distance: f64) -> Self {
        EquatorialCoordinate::new(Angle::hours(ra_hours), Angle::degrees(dec_degrees), distance)
    }

    pub fn from_cartesian(vec: &Vector3<f64>) -> Self {
        let distance = vec.norm();
        let declination = std::f64::consts::FRAC_PI_2 - (vec.z / distance).acos();
        let right_ascension = vec.y.atan2(vec.x);
        EquatorialCoordinate::new(
            Angle::radians(right_ascension),
            Angle::radians(declination),
            distance,
        )
    }

    pub fn to_cartesian(&self) -> Vector3<f64> {
        let (ra, dec) = (&self.right_ascension, &self.declination);
        Vector3::new(
            self.distance * dec.cos() * ra.cos(),
            self.distance * dec.cos() * ra.sin(),
            self.distance * dec.sin(),
        )
    }

    /// Herget precession between two epochs (Publ. Cincinnati Obs. No. 24, p. 9)
    ///
    /// Arguments
    /// ---------
    /// * `epoch1`: epoch of the coordinate, in years AD
    /// * `epoch2`: target epoch, in years AD
    ///
    /// Return
    /// ------
    /// * the coordinate referred to the equator and equinox of `epoch2`
    pub fn precessed(&self, epoch1: f64, epoch2: f64) -> EquatorialCoordinate {
        let (ra1, dec1) = (
            self.right_ascension.to_radians(),
            self.declination.to_radians(),
        );
        let x1 = Vector3::new(dec1.cos() * ra1.cos(), dec1.cos() * ra1.sin(), dec1.sin());

        let t = 0.001 * (epoch2 - epoch1);
        let st = 0.001 * (epoch1 - 1900.0);
        let a = RADSEC
            * t
            * (23042.53 + st * (139.75 + 0.06 * st) + t * (30.23 - 0.27 * st + 18.0 * t));
        let b = RADSEC * t * t * (79.27 + 0.66 * st + 0.32 * t) + a;
        let c = RADSEC
            * t
            * (20046.85 - st * (85.33 + 0.37 * st) + t * (-42.67 - 0.37 * st - 41.8 * t));

        let (sa, ca) = a.sin_cos();
        let (sb, cb) = b.sin_cos();
        let (sc, cc) = c.sin_cos();
        let r = Matrix3::new(
            ca * cb * cc - sa * sb,
            -ca * sb - sa * cb * cc,
            -cb * sc,
            sa * cb + ca * sb * cc,
            ca * cb - sa * sb * cc,
            -sb * sc,
            ca * sc,
            -sa * sc,
            cc,
        );
        let x2 = r * x1;

        EquatorialCoordinate::new(
            Angle::radians(x2.y.atan2(x2.x)),
            Angle::radians(x2.z.asin()),
            self.distance,
        )
    }

    /// Angular separation with the Vincenty formula on a sphere, in degrees.
    pub fn angular_separation(&self, other: &EquatorialCoordinate) -> Angle {
        let (a1, a2) = (
            self.right_ascension.to_radians(),
            other.right_ascension.to_radians(),
        );
        let (d1, d2) = (self.declination.to_radians(), other.declination.to_radians());
        let t1 = (d2.cos() * (a2 - a1).sin()).powi(2);
        let t2 = (d1.cos() * d2.sin() - d1.sin() * d2.cos() * (a2 - a1).cos()).powi(2);
        let denom = d1.sin() * d2.sin() + d1.cos() * d2.cos() * (a2 - a1).cos();
        Angle::degrees((t1 + t2).sqrt().atan2(denom) / RADEG)
    }
}

#[cfg(test)]
mod equatorial_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_to_cartesian() {
        let coord = EquatorialCoordinate::from_hours_degrees(14.4966, -62.681, 1.29);
        let v = coord.to_cartesian();
        assert_abs_diff_eq!(v.x, -0.4700, epsilon = 1e-3);
        assert_abs_diff_eq!(v.y, -0.3600, epsilon = 1e-3);
        assert_abs_diff_eq!(v.z, -1.1461, epsilon = 1e-3);

        let back = EquatorialCoordinate::from_cartesian(&v);
        assert_abs_diff_eq!(back.right_ascension.value(), 14.4966, epsilon = 1e-9);
        assert_abs_diff_eq!(back.declination.value(), -62.681, epsilon = 1e-9);
        assert_abs_diff_eq!(back.distance, 1.29, epsilon = 1e-12);
    }

    #[test]
    fn test_angular_separation() {
        let merak = EquatorialCoordinate::from_hours_degrees(11.0306, 56.3825, 1.0);
        let dubhe = EquatorialCoordinate::from_hours_degrees(11.0622, 61.7511, 1.0);
        assert_abs_diff_eq!(
            merak.angular_separation(&dubhe).value(),
            5.37413,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_precession() {
        let coord = EquatorialCoordinate::from_hours_degrees(2.5, 20.0, 1.0);
        let same = coord.precessed(2000.0, 2000.0);
        assert_abs_diff_eq!(same.right_ascension.value(), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(same.declination.value(), 20.0, epsilon = 1e-12);

        // about 3.5s of right ascension per year at this position
        let there = coord.precessed(2000.0, 2050.0);
        assert!(there.right_ascension.value() - 2.5 > 0.03);
        let back = there.precessed(2050.0, 2000.0);
        assert_abs_diff_eq!(back.right_ascension.value(), 2.5, epsilon = 1e-4);
        assert_abs_diff_eq!(back.declination.value(), 20.0, epsilon = 1e-3);
    }

    #[test]
    fn test_precession_of_theta_persei() {
        // Meeus, Astronomical Algorithms, example 21.b, proper motion already applied
        let j2000 = EquatorialCoordinate::new(
            Angle::from_hms(2.0, 44.0, 12.975),
            Angle::from_dms(49.0, 13.0, 39.90),
            1.0,
        );
        let epoch = 2000.0 + (2_462_088.69 - 2_451_545.0) / 365.25;

        let precessed = j2000.precessed(2000.0, epoch);

        let seconds_of_time = 1.0 / 3600.0;
        let arc_second = 1.0 / 3600.0;
        assert_abs_diff_eq!(
            precessed.right_ascension.value(),
            Angle::from_hms(2.0, 46.0, 11.331).value(),
            epsilon = 0.1 * seconds_of_time
        );
        assert_abs_diff_eq!(
            precessed.declination.value(),
            Angle::from_dms(49.0, 20.0, 54.54).value(),
            epsilon = 0.5 * arc_second
        );
    }
}
