//! # Orbit model
//!
//! An [`Orbit`] is an immutable pair of a [`ConicSection`] (the shape) and an [`Orientation`]
//! (how the orbital plane sits in the central body frame). Changing any element produces a new
//! value.
//!
//! ## Overview
//!
//! - [`ConicSection::from_axis`] and [`ConicSection::from_apsides`] build closed or hyperbolic
//!   shapes; parabolas go through [`ConicSection::parabola`].
//! - [`Orientation::rotation`] is the 3-1-3 Euler rotation `Rz(Ω)·Rx(i)·Rz(ω)` taking vectors
//!   from the perifocal frame to the central body frame.
//! - [`Orbit::orbital_period`] is `None` for parabolic orbits.
use std::fmt;

use nalgebra::Matrix3;

use crate::angle::Angle;
use crate::constants::{Meter, Radian, Second, DPI};
use crate::coordinates::{rotmt, Axis};
use crate::orrery_errors::OrreryError;

/// Tolerance under which an inclination is considered equatorial.
pub(crate) const EQUATORIAL_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConicSection {
    Circle {
        radius: Meter,
    },
    Ellipse {
        semimajor_axis: Meter,
        eccentricity: f64,
    },
    Parabola {
        periapsis: Meter,
    },
    Hyperbola {
        semimajor_axis: Meter,
        eccentricity: f64,
    },
}

impl ConicSection {
    /// Build a conic section from its semimajor axis and eccentricity
    ///
    /// Arguments
    /// ---------
    /// * `semimajor_axis`: semimajor axis in meters, must be finite
    /// * `eccentricity`: must not be exactly 1
    ///
    /// Return
    /// ------
    /// * a circle, an ellipse or a hyperbola depending on `eccentricity`
    pub fn from_axis(semimajor_axis: Meter, eccentricity: f64) -> Result<Self, OrreryError> {
        if semimajor_axis.is_infinite() || eccentricity == 1.0 {
            return Err(OrreryError::InvalidOrbit(
                "a parabola cannot be built from a semimajor axis".into(),
            ));
        }
        if eccentricity.is_nan() || eccentricity < 0.0 {
            return Err(OrreryError::InvalidOrbit(format!(
                "invalid eccentricity {eccentricity}"
            )));
        }
        Ok(if eccentricity == 0.0 {
            ConicSection::Circle {
                radius: semimajor_axis,
            }
        } else if eccentricity < 1.0 {
            ConicSection::Ellipse {
                semimajor_axis,
                eccentricity,
            }
        } else {
            ConicSection::Hyperbola {
                semimajor_axis,
                eccentricity,
            }
        })
    }

    /// Build a closed orbit from its apsides, both in meters.
    pub fn from_apsides(apoapsis: Meter, periapsis: Meter) -> Result<Self, OrreryError> {
        if apoapsis.is_infinite() {
            return Err(OrreryError::InvalidOrbit(
                "a parabola cannot be built from its apsides".into(),
            ));
        }
        ConicSection::from_axis(
            (apoapsis + periapsis) / 2.0,
            1.0 - 2.0 / ((apoapsis / periapsis) + 1.0),
        )
    }

    pub fn parabola(periapsis: Meter) -> Self {
        ConicSection::Parabola { periapsis }
    }

    /// Semimajor axis, infinite for a parabola.
    pub fn semimajor_axis(&self) -> Meter {
        match *self {
            ConicSection::Circle { radius } => radius,
            ConicSection::Ellipse { semimajor_axis, .. }
            | ConicSection::Hyperbola { semimajor_axis, .. } => semimajor_axis,
            ConicSection::Parabola { .. } => f64::INFINITY,
        }
    }

    pub fn eccentricity(&self) -> f64 {
        match *self {
            ConicSection::Circle { .. } => 0.0,
            ConicSection::Ellipse { eccentricity, .. }
            | ConicSection::Hyperbola { eccentricity, .. } => eccentricity,
            ConicSection::Parabola { .. } => 1.0,
        }
    }

    /// Farthest distance from the focus, undefined for open orbits.
    pub fn apoapsis(&self) -> Option<Meter> {
        match self {
            ConicSection::Circle { .. } | ConicSection::Ellipse { .. } => {
                Some(self.semimajor_axis() * (1.0 + self.eccentricity()))
            }
            ConicSection::Parabola { .. } | ConicSection::Hyperbola { .. } => None,
        }
    }

    pub fn periapsis(&self) -> Meter {
        match *self {
            ConicSection::Parabola { periapsis } => periapsis,
            _ => self.semimajor_axis() * (1.0 - self.eccentricity()),
        }
    }

    pub fn semilatus_rectum(&self) -> Meter {
        match *self {
            ConicSection::Parabola { periapsis } => 2.0 * periapsis,
            _ => self.semimajor_axis() * (1.0 - self.eccentricity().powi(2)),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            ConicSection::Circle { .. } | ConicSection::Ellipse { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub inclination: Angle,
    /// Absent only for equatorial orbits, where it is taken as zero.
    pub longitude_of_ascending_node: Option<Angle>,
    pub argument_of_periapsis: Angle,
}

impl Orientation {
    /// Build an orientation from radian values
    ///
    /// Arguments
    /// ---------
    /// * `inclination`: inclination in radians
    /// * `longitude_of_ascending_node`: longitude of the ascending node in radians, may be
    ///   `None` only when the orbit is equatorial (inclination 0 or π)
    /// * `argument_of_periapsis`: argument of periapsis in radians
    pub fn new(
        inclination: Radian,
        longitude_of_ascending_node: Option<Radian>,
        argument_of_periapsis: Radian,
    ) -> Result<Self, OrreryError> {
        if longitude_of_ascending_node.is_none() && !is_equatorial(inclination) {
            return Err(OrreryError::InvalidOrbit(format!(
                "inclined orbit (i = {inclination} rad) needs a longitude of ascending node"
            )));
        }
        Ok(Orientation {
            inclination: Angle::radians(inclination),
            longitude_of_ascending_node: longitude_of_ascending_node.map(Angle::radians),
            argument_of_periapsis: Angle::radians(argument_of_periapsis),
        })
    }

    pub fn equatorial() -> Self {
        Orientation {
            inclination: Angle::radians(0.0),
            longitude_of_ascending_node: None,
            argument_of_periapsis: Angle::radians(0.0),
        }
    }

    /// Longitude of the ascending node in radians, zero when absent.
    pub fn node_or_zero(&self) -> Radian {
        self.longitude_of_ascending_node
            .map(|node| node.to_radians())
            .unwrap_or(0.0)
    }

    /// Rotation from the perifocal frame to the central body frame.
    pub fn rotation(&self) -> Matrix3<f64> {
        rotmt(self.node_or_zero(), Axis::Z)
            * rotmt(self.inclination.to_radians(), Axis::X)
            * rotmt(self.argument_of_periapsis.to_radians(), Axis::Z)
    }
}

pub(crate) fn is_equatorial(inclination: Radian) -> bool {
    inclination.abs() < EQUATORIAL_TOLERANCE
        || (inclination - std::f64::consts::PI).abs() < EQUATORIAL_TOLERANCE
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub shape: ConicSection,
    pub orientation: Orientation,
}

impl Orbit {
    pub fn new(shape: ConicSection, orientation: Orientation) -> Self {
        Orbit { shape, orientation }
    }

    /// Build an orbit from classical elements, angles in radians.
    pub fn from_elements(
        semimajor_axis: Meter,
        eccentricity: f64,
        inclination: Radian,
        longitude_of_ascending_node: Option<Radian>,
        argument_of_periapsis: Radian,
    ) -> Result<Self, OrreryError> {
        Ok(Orbit {
            shape: ConicSection::from_axis(semimajor_axis, eccentricity)?,
            orientation: Orientation::new(
                inclination,
                longitude_of_ascending_node,
                argument_of_periapsis,
            )?,
        })
    }

    pub fn with_shape(&self, shape: ConicSection) -> Self {
        Orbit { shape, ..*self }
    }

    pub fn with_orientation(&self, orientation: Orientation) -> Self {
        Orbit {
            orientation,
            ..*self
        }
    }

    /// Orbital period around a central body
    ///
    /// Arguments
    /// ---------
    /// * `grav_param`: gravitational parameter of the central body in m³/s²
    ///
    /// Return
    /// ------
    /// * the period in seconds, `None` for a parabola
    pub fn orbital_period(&self, grav_param: f64) -> Option<Second> {
        match self.shape {
            ConicSection::Parabola { .. } => None,
            shape => Some(DPI * (shape.semimajor_axis().abs().powi(3) / grav_param).sqrt()),
        }
    }
}

impl fmt::Display for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(a: {}, e: {}, i: {}, om: {}, w: {})",
            self.shape.semimajor_axis(),
            self.shape.eccentricity(),
            self.orientation.inclination.to_radians(),
            self.orientation.node_or_zero(),
            self.orientation.argument_of_periapsis.to_radians()
        )
    }
}
