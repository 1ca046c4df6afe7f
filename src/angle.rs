//! # Typed angles
//!
//! An [`Angle`] is a raw scalar tagged with an [`AngleUnit`] and a [`WrapMode`].
//!
//! ## Overview
//!
//! - The raw value is never wrapped in place. [`Angle::value`] projects it into the range of its
//!   wrap mode on read.
//! - Angles of different units never mix implicitly: there is no `+` or `-` between angles,
//!   [`Angle::try_add`] / [`Angle::try_sub`] report a unit mismatch as an error. Convert first
//!   with [`Angle::to_unit`].
//! - Display rounds to the whole second and carries into minutes and degrees (or hours).
//! - Trigonometric helpers work on the raw value expressed in radians.
//!
//! ## Wrap ranges
//!
//! | Mode        | Degree          | Hour       | Radian       |
//! |-------------|-----------------|------------|--------------|
//! | `None`      | raw             | raw        | raw          |
//! | `Symmetric` | (-180°, 180°]   | (-12h, 12h]| (-π, π]      |
//! | `Positive`  | [0°, 360°)      | [0h, 24h)  | [0, 2π)      |
use std::fmt;
use std::ops::{Div, Mul, Neg};

use crate::constants::{Degree, Radian, DPI, RADEG};
use crate::orrery_errors::OrreryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    Degree,
    Radian,
    Hour,
}

impl AngleUnit {
    /// Size of a full turn expressed in this unit.
    pub fn full_turn(&self) -> f64 {
        match self {
            AngleUnit::Degree => 360.0,
            AngleUnit::Radian => DPI,
            AngleUnit::Hour => 24.0,
        }
    }

    /// Number of degrees in one unit.
    fn in_degrees(&self) -> f64 {
        match self {
            AngleUnit::Degree => 1.0,
            AngleUnit::Radian => 1.0 / RADEG,
            AngleUnit::Hour => 15.0,
        }
    }

    /// Wrap mode used when an angle is built without an explicit one.
    pub fn default_wrap(&self) -> WrapMode {
        match self {
            AngleUnit::Degree | AngleUnit::Hour => WrapMode::Positive,
            AngleUnit::Radian => WrapMode::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    None,
    Symmetric,
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    unit: AngleUnit,
    value: f64,
    wrap: WrapMode,
}

impl Angle {
    /// Build an angle with the default wrap mode of `unit`.
    pub fn new(value: f64, unit: AngleUnit) -> Self {
        Angle {
            unit,
            value,
            wrap: unit.default_wrap(),
        }
    }

    pub fn degrees(value: Degree) -> Self {
        Angle::new(value, AngleUnit::Degree)
    }

    pub fn radians(value: Radian) -> Self {
        Angle::new(value, AngleUnit::Radian)
    }

    pub fn hours(value: f64) -> Self {
        Angle::new(value, AngleUnit::Hour)
    }

    /// Build a degree angle from sexagesimal components.
    ///
    /// The sign of the whole angle is taken from `degrees`; pass `-0.0` for angles
    /// between -1° and 0°.
    pub fn from_dms(degrees: f64, minutes: f64, seconds: f64) -> Self {
        Angle::degrees(signed_sexagesimal(degrees, minutes, seconds))
    }

    /// Build an hour angle from sexagesimal components, signed like [`Angle::from_dms`].
    pub fn from_hms(hours: f64, minutes: f64, seconds: f64) -> Self {
        Angle::hours(signed_sexagesimal(hours, minutes, seconds))
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap
    }

    /// Stored value, never wrapped.
    pub fn raw_value(&self) -> f64 {
        self.value
    }

    /// Stored value projected into the range of the wrap mode.
    pub fn value(&self) -> f64 {
        wrap_value(self.value, self.unit.full_turn(), self.wrap)
    }

    /// Convert to another unit. The result carries the default wrap mode of `unit`.
    pub fn to_unit(&self, unit: AngleUnit) -> Angle {
        Angle::new(self.value * self.unit.in_degrees() / unit.in_degrees(), unit)
    }

    pub fn to_degrees(&self) -> Degree {
        self.value * self.unit.in_degrees()
    }

    pub fn to_radians(&self) -> Radian {
        self.to_degrees() * RADEG
    }

    pub fn to_hours(&self) -> f64 {
        self.to_degrees() / 15.0
    }

    pub fn sin(&self) -> f64 {
        self.to_radians().sin()
    }

    pub fn cos(&self) -> f64 {
        self.to_radians().cos()
    }

    pub fn tan(&self) -> f64 {
        self.to_radians().tan()
    }

    /// Sign and sexagesimal split of the wrapped value.
    ///
    /// Return
    /// ------
    /// * `(sign, [whole, minutes, seconds])` where `sign` is `1.0` or `-1.0` and the three
    ///   components are non-negative.
    pub fn components(&self) -> (f64, [f64; 3]) {
        let wrapped = self.value();
        let sign = if wrapped < 0.0 { -1.0 } else { 1.0 };
        let magnitude = wrapped.abs();
        let whole = magnitude.trunc();
        let minutes_full = (magnitude - whole) * 60.0;
        let minutes = minutes_full.trunc();
        let seconds = (minutes_full - minutes) * 60.0;
        (sign, [whole, minutes, seconds])
    }

    pub fn try_add(self, rhs: Angle) -> Result<Angle, OrreryError> {
        self.check_unit(&rhs)?;
        Ok(Angle {
            value: self.value + rhs.value,
            ..self
        })
    }

    pub fn try_sub(self, rhs: Angle) -> Result<Angle, OrreryError> {
        self.check_unit(&rhs)?;
        Ok(Angle {
            value: self.value - rhs.value,
            ..self
        })
    }

    /// Sign and sexagesimal split of the wrapped value rounded to the whole second.
    ///
    /// A positive wrap that rounds up to a full turn reads as zero.
    fn rounded_components(&self) -> (f64, [f64; 3]) {
        let wrapped = self.value();
        let mut total = (wrapped.abs() * 3600.0).round();
        if self.wrap == WrapMode::Positive && total >= self.unit.full_turn() * 3600.0 {
            total = 0.0;
        }
        let sign = if wrapped < 0.0 && total > 0.0 { -1.0 } else { 1.0 };
        let whole = (total / 3600.0).trunc();
        let minutes = ((total - whole * 3600.0) / 60.0).trunc();
        let seconds = total - whole * 3600.0 - minutes * 60.0;
        (sign, [whole, minutes, seconds])
    }

    fn check_unit(&self, rhs: &Angle) -> Result<(), OrreryError> {
        if self.unit != rhs.unit {
            return Err(OrreryError::InvalidAngle(format!(
                "unit mismatch: {:?} and {:?}",
                self.unit, rhs.unit
            )));
        }
        Ok(())
    }
}

fn signed_sexagesimal(whole: f64, minutes: f64, seconds: f64) -> f64 {
    let magnitude = whole.abs() + minutes / 60.0 + seconds / 3600.0;
    if whole.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Project `value` into the range of `mode` for a unit whose full turn is `full_turn`.
pub(crate) fn wrap_value(value: f64, full_turn: f64, mode: WrapMode) -> f64 {
    match mode {
        WrapMode::None => value,
        WrapMode::Positive => {
            let wrapped = value.rem_euclid(full_turn);
            // rem_euclid may round up to full_turn for tiny negative inputs
            if wrapped >= full_turn {
                0.0
            } else {
                wrapped
            }
        }
        WrapMode::Symmetric => {
            let half = full_turn / 2.0;
            let wrapped = wrap_value(value, full_turn, WrapMode::Positive);
            if wrapped > half {
                wrapped - full_turn
            } else {
                wrapped
            }
        }
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;

    fn mul(self, rhs: f64) -> Angle {
        Angle {
            value: self.value * rhs,
            ..self
        }
    }
}

impl Div<f64> for Angle {
    type Output = Angle;

    fn div(self, rhs: f64) -> Angle {
        Angle {
            value: self.value / rhs,
            ..self
        }
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle {
            value: -self.value,
            ..self
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, [whole, minutes, seconds]) = self.rounded_components();
        let prefix = if sign < 0.0 { "-" } else { "" };
        match self.unit {
            AngleUnit::Hour => write!(f, "{prefix}{whole}h {minutes}m {seconds}s"),
            AngleUnit::Degree => write!(f, "{prefix}{whole}° {minutes}′ {seconds}″"),
            AngleUnit::Radian => write!(f, "{} rad", self.value()),
        }
    }
}

#[cfg(test)]
mod angle_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_degree_to_hour_components() {
        let angle = Angle::degrees(101.2875).to_unit(AngleUnit::Hour);
        assert_relative_eq!(angle.value(), 6.7525, epsilon = 1e-12);

        let (sign, [h, m, s]) = angle.components();
        assert_eq!(sign, 1.0);
        assert_eq!(h, 6.0);
        assert_eq!(m, 45.0);
        assert_relative_eq!(s, 9.0, epsilon = 1e-6);
        assert_eq!(angle.to_string(), "6h 45m 9s");
    }

    #[test]
    fn test_negative_hour_angle_wraps_positive() {
        let angle = -Angle::from_hms(8.0, 9.0, 50.0);
        assert!(angle.raw_value() < 0.0);

        let (sign, [h, m, s]) = angle.components();
        assert_eq!(sign, 1.0);
        assert_eq!(h, 15.0);
        assert_eq!(m, 50.0);
        assert_relative_eq!(s, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_symmetric_degree_components() {
        let angle = Angle::degrees(-26.432002).with_wrap(WrapMode::Symmetric);
        let (sign, [d, m, s]) = angle.components();
        assert_eq!(sign, -1.0);
        assert_eq!(d, 26.0);
        assert_eq!(m, 25.0);
        assert_relative_eq!(s, 55.2072, epsilon = 1e-3);
        assert_eq!(angle.to_string(), "-26° 25′ 55″");
    }

    #[test]
    fn test_radian_conversions() {
        let third = Angle::radians(std::f64::consts::PI / 3.0);
        assert_relative_eq!(third.to_unit(AngleUnit::Degree).value(), 60.0, epsilon = 1e-12);

        let three_halves = Angle::radians(3.0 * std::f64::consts::PI / 2.0);
        assert_relative_eq!(three_halves.to_unit(AngleUnit::Hour).value(), 18.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_ranges() {
        assert_relative_eq!(Angle::degrees(-90.0).value(), 270.0);
        assert_relative_eq!(Angle::degrees(720.0).value(), 0.0);
        assert_relative_eq!(
            Angle::degrees(190.0).with_wrap(WrapMode::Symmetric).value(),
            -170.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            Angle::degrees(180.0).with_wrap(WrapMode::Symmetric).value(),
            180.0
        );
        assert_relative_eq!(Angle::radians(7.0).value(), 7.0);
        // raw value stays untouched
        assert_relative_eq!(Angle::degrees(-90.0).raw_value(), -90.0);
    }

    #[test]
    fn test_arithmetic() {
        let sum = Angle::degrees(350.0).try_add(Angle::degrees(20.0)).unwrap();
        assert_relative_eq!(sum.raw_value(), 370.0);
        assert_relative_eq!(sum.value(), 10.0, epsilon = 1e-12);

        assert_relative_eq!((Angle::hours(3.0) * 2.0).raw_value(), 6.0);
        assert_relative_eq!((Angle::hours(3.0) / 2.0).raw_value(), 1.5);
    }

    #[test]
    fn test_unit_mismatch_is_an_error() {
        let err = Angle::degrees(10.0).try_add(Angle::hours(1.0)).unwrap_err();
        assert!(matches!(err, OrreryError::InvalidAngle(_)));

        let ok = Angle::degrees(10.0)
            .try_sub(Angle::hours(1.0).to_unit(AngleUnit::Degree))
            .unwrap();
        assert_relative_eq!(ok.raw_value(), -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trigonometry_uses_radians() {
        assert_relative_eq!(Angle::degrees(30.0).sin(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(Angle::hours(6.0).cos(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(Angle::degrees(45.0).tan(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_display_carries_rounded_seconds() {
        assert_eq!(Angle::from_dms(10.0, 59.0, 59.9999).to_string(), "11° 0′ 0″");
        assert_eq!(Angle::from_dms(10.0, 14.0, 59.6).to_string(), "10° 15′ 0″");
        assert_eq!(Angle::from_hms(6.0, 59.0, 59.7).to_string(), "7h 0m 0s");
        assert_eq!(
            Angle::from_dms(-0.0, 59.0, 59.8)
                .with_wrap(WrapMode::Symmetric)
                .to_string(),
            "-1° 0′ 0″"
        );
        // a positive wrap never prints a full turn
        assert_eq!(Angle::from_hms(23.0, 59.0, 59.9).to_string(), "0h 0m 0s");
        assert_eq!(
            Angle::degrees(-1e-6).with_wrap(WrapMode::Symmetric).to_string(),
            "0° 0′ 0″"
        );
    }
}
