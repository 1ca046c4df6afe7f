use nalgebra::Vector3;

use crate::angle::{Angle, AngleUnit, WrapMode};
use crate::constants::DPI;
use crate::coordinates::{EquatorialCoordinate, GeodeticLocation};
use crate::time::{JulianDay, SiderealTime};

/// Where and when an observation is made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverLocationTime {
    pub location: GeodeticLocation,
    pub timestamp: JulianDay,
}

impl ObserverLocationTime {
    pub fn new(location: GeodeticLocation, timestamp: JulianDay) -> Self {
        ObserverLocationTime {
            location,
            timestamp,
        }
    }

    pub fn sidereal_time(&self) -> SiderealTime {
        SiderealTime::new(self.timestamp, self.location.longitude)
    }

    fn latitude(&self) -> Angle {
        Angle::degrees(self.location.latitude)
    }
}

/// Topocentric azimuth (from north through east) and altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalCoordinate {
    /// Degrees over [0°, 360°)
    pub azimuth: Angle,
    /// Degrees over (-180°, 180°]
    pub altitude: Angle,
}

impl HorizontalCoordinate {
    pub fn new(azimuth: Angle, altitude: Angle) -> Self {
        HorizontalCoordinate {
            azimuth: azimuth.to_unit(AngleUnit::Degree),
            altitude: altitude
                .to_unit(AngleUnit::Degree)
                .with_wrap(WrapMode::Symmetric),
        }
    }

    /// Project an equatorial coordinate on the sky of an observer
    ///
    /// Arguments
    /// ---------
    /// * `coord`: equatorial coordinate of the target
    /// * `observer`: location and time of the observation
    ///
    /// Return
    /// ------
    /// * azimuth and altitude of the target for this observer
    pub fn from_equatorial(
        coord: &EquatorialCoordinate,
        observer: &ObserverLocationTime,
    ) -> HorizontalCoordinate {
        let lat = observer.latitude();
        let dec = coord.declination;
        let hour_angle =
            observer.sidereal_time().local().to_radians() - coord.right_ascension.to_radians();

        let sin_alt = dec.sin() * lat.sin() + dec.cos() * lat.cos() * hour_angle.cos();
        let altitude = sin_alt.asin();
        let cos_azimuth = (dec.sin() - sin_alt * lat.sin()) / (altitude.cos() * lat.cos());
        // rounding can push the cosine slightly outside [-1, 1]
        let a = cos_azimuth.clamp(-1.0, 1.0).acos();
        let azimuth = if hour_angle.sin() < 0.0 { a } else { DPI - a };

        HorizontalCoordinate::new(Angle::radians(azimuth), Angle::radians(altitude))
    }

    pub fn from_cartesian(vec: &Vector3<f64>, observer: &ObserverLocationTime) -> Self {
        HorizontalCoordinate::from_equatorial(&EquatorialCoordinate::from_cartesian(vec), observer)
    }

    /// Inverse of [`HorizontalCoordinate::from_equatorial`], with a unit distance.
    pub fn to_equatorial(&self, observer: &ObserverLocationTime) -> EquatorialCoordinate {
        let lat = observer.latitude();
        let (alt, az) = (self.altitude, self.azimuth);

        let sin_dec = alt.sin() * lat.sin() + alt.cos() * lat.cos() * az.cos();
        let dec = sin_dec.asin();
        let sin_lha = -az.sin() * alt.cos() / dec.cos();
        let cos_lha = (alt.sin() - lat.sin() * dec.sin()) / (dec.cos() * lat.cos());
        let lha = sin_lha.atan2(cos_lha);
        let ra = observer.sidereal_time().local().to_radians() - lha;

        EquatorialCoordinate::new(Angle::radians(ra), Angle::radians(dec), 1.0)
    }
}
