//! # Coordinate frames
//!
//! Pure conversions between the frames used to place a body in an observer's sky.
//!
//! ## Overview
//!
//! | Module            | Frame                                                         |
//! |-------------------|---------------------------------------------------------------|
//! | [`equatorial`]    | right ascension / declination, Cartesian, precession          |
//! | [`horizontal`]    | azimuth / altitude for an observer location and time          |
//! | [`ecliptic`]      | ecliptic longitude / latitude                                 |
//! | [`nutation`]      | obliquity of the ecliptic, nutation, fundamental arguments    |
//!
//! None of these functions reads ambient state: observer location and time are always explicit
//! parameters.
//!
//! Cartesian vectors follow the usual equatorial convention:
//!
//! ```text
//! +x → α = 0h (vernal equinox)
//! +y → α = 6h, δ = 0°
//! +z → δ = +90° (north celestial pole)
//! ```
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Degree, Meter, Radian};

pub mod ecliptic;
pub mod equatorial;
pub mod horizontal;
pub mod nutation;

pub use ecliptic::EclipticCoordinate;
pub use equatorial::EquatorialCoordinate;
pub use horizontal::{HorizontalCoordinate, ObserverLocationTime};

/// Principal axis of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes.
///
/// The rotation is **active**: a positive `alpha` turns vectors counter-clockwise when looking
/// from the tip of the axis toward the origin.
///
/// Arguments
/// ---------
/// * `alpha`: rotation angle in radians
/// * `axis`: axis of rotation
///
/// Return
/// ------
/// * a matrix `R` such that the rotated vector is `x' = R · x`
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Geodetic position of an observer on a body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeodeticLocation {
    /// North-positive latitude in degrees
    pub latitude: Degree,
    /// East-positive longitude in degrees
    pub longitude: Degree,
    /// Altitude above the reference surface in meters
    pub altitude: Meter,
}

impl GeodeticLocation {
    pub fn new(latitude: Degree, longitude: Degree, altitude: Meter) -> Self {
        GeodeticLocation {
            latitude,
            longitude,
            altitude,
        }
    }
}
