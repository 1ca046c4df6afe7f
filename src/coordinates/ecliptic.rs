use crate::angle::{Angle, AngleUnit, WrapMode};
use crate::coordinates::nutation::obliquity_of_ecliptic;
use crate::coordinates::EquatorialCoordinate;
use crate::time::JulianDay;

/// Position referred to the ecliptic and equinox of `julian_day`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticCoordinate {
    /// Degrees over (-180°, 180°]
    pub longitude: Angle,
    /// Degrees over (-180°, 180°]
    pub latitude: Angle,
    pub distance: f64,
    pub julian_day: JulianDay,
}

impl EclipticCoordinate {
    pub fn new(longitude: Angle, latitude: Angle, distance: f64, julian_day: JulianDay) -> Self {
        EclipticCoordinate {
            longitude: longitude
                .to_unit(AngleUnit::Degree)
                .with_wrap(WrapMode::Symmetric),
            latitude: latitude
                .to_unit(AngleUnit::Degree)
                .with_wrap(WrapMode::Symmetric),
            distance,
            julian_day,
        }
    }

    /// Convert an equatorial coordinate referred to the equinox of `julian_day`
    ///
    /// Arguments
    /// ---------
    /// * `coord`: equatorial coordinate
    /// * `julian_day`: equinox; J2000 and B1950 use their standard obliquity, other dates the
    ///   true obliquity
    pub fn from_equatorial(coord: &EquatorialCoordinate, julian_day: JulianDay) -> Self {
        let eps = obliquity_of_ecliptic(julian_day);
        let (ra, dec) = (coord.right_ascension, coord.declination);
        let longitude = (ra.sin() * eps.cos() + dec.tan() * eps.sin()).atan2(ra.cos());
        let latitude = (dec.sin() * eps.cos() - dec.cos() * eps.sin() * ra.sin()).asin();
        EclipticCoordinate::new(
            Angle::radians(longitude),
            Angle::radians(latitude),
            coord.distance,
            julian_day,
        )
    }

    /// Equatorial coordinate referred to the same equinox.
    pub fn to_equatorial(&self) -> EquatorialCoordinate {
        let eps = obliquity_of_ecliptic(self.julian_day);
        let (lon, lat) = (self.longitude, self.latitude);
        let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin()).atan2(lon.cos());
        let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin()).asin();
        EquatorialCoordinate::new(Angle::radians(ra), Angle::radians(dec), self.distance)
    }
}
