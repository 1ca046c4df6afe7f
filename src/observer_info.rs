//! # Observer views
//!
//! Rows of the observer tables returned by the ephemeris source, as seen from a site on a
//! body, and the rise / transit / set summary derived from them.
//!
//! ## Overview
//!
//! | Type                          | Content                                                  |
//! |-------------------------------|----------------------------------------------------------|
//! | [`ObserverSite`]              | where the observer stands (body and geodetic location)   |
//! | [`ObserverInfo`]              | common part of every row: target, date, flags            |
//! | [`CelestialBodyObserverInfo`] | sky position, brightness and orientation of the target   |
//! | [`RiseTransitSetInfo`]        | azimuth / elevation rows of a rise-transit-set table     |
//! | [`RiseTransitSetElevation`]   | first rise, transit and set with the maximum elevation   |
use std::fmt;

use crate::angle::Angle;
use crate::constants::{Degree, NaifId, Radian, Second, RADEG, SECONDS_PER_DAY};
use crate::coordinates::{
    EquatorialCoordinate, GeodeticLocation, HorizontalCoordinate, ObserverLocationTime,
};
use crate::naif::Naif;
use crate::orrery_errors::ParseError;
use crate::time::JulianDay;

/// Observer standing on a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverSite {
    pub naif: Naif,
    pub location: GeodeticLocation,
}

impl ObserverSite {
    pub fn new(naif: Naif, location: GeodeticLocation) -> Self {
        ObserverSite { naif, location }
    }
}

impl fmt::Display for ObserverSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {} m) @ {}",
            self.location.latitude, self.location.longitude, self.location.altitude, self.naif
        )
    }
}

/// Position of the Sun relative to the observer horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarPresence {
    Day,
    CivilDawn,
    NauticalDawn,
    AstronomicalDawn,
    Night,
}

impl SolarPresence {
    pub fn from_flag(flag: &str) -> Result<Self, ParseError> {
        match flag {
            "*" => Ok(SolarPresence::Day),
            "C" => Ok(SolarPresence::CivilDawn),
            "N" => Ok(SolarPresence::NauticalDawn),
            "A" => Ok(SolarPresence::AstronomicalDawn),
            "" => Ok(SolarPresence::Night),
            other => Err(ParseError::UnknownFlag {
                column: "daylight",
                flag: other.to_string(),
            }),
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            SolarPresence::Day => "*",
            SolarPresence::CivilDawn => "C",
            SolarPresence::NauticalDawn => "N",
            SolarPresence::AstronomicalDawn => "A",
            SolarPresence::Night => "",
        }
    }
}

/// Position of the target relative to the observer horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiseTransitSet {
    Rise,
    Transit,
    Set,
    AboveHorizon,
    BelowHorizon,
}

impl RiseTransitSet {
    pub fn from_flag(flag: &str) -> Result<Self, ParseError> {
        match flag {
            "r" => Ok(RiseTransitSet::Rise),
            "t" => Ok(RiseTransitSet::Transit),
            "s" => Ok(RiseTransitSet::Set),
            "m" => Ok(RiseTransitSet::AboveHorizon),
            "" => Ok(RiseTransitSet::BelowHorizon),
            other => Err(ParseError::UnknownFlag {
                column: "rise-transit-set",
                flag: other.to_string(),
            }),
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            RiseTransitSet::Rise => "r",
            RiseTransitSet::Transit => "t",
            RiseTransitSet::Set => "s",
            RiseTransitSet::AboveHorizon => "m",
            RiseTransitSet::BelowHorizon => "",
        }
    }
}

/// Columns shared by every observer table row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverInfo {
    pub naif_id: NaifId,
    pub julian_day: JulianDay,
    pub location: GeodeticLocation,
    pub daylight: SolarPresence,
    pub rts: RiseTransitSet,
}

impl ObserverInfo {
    /// Arguments
    /// ---------
    /// * `daylight_flag`, `rts_flag`: the raw flags of the row, trimmed
    pub fn new(
        naif_id: NaifId,
        julian_day: JulianDay,
        location: GeodeticLocation,
        daylight_flag: &str,
        rts_flag: &str,
    ) -> Result<Self, ParseError> {
        Ok(ObserverInfo {
            naif_id,
            julian_day,
            location,
            daylight: SolarPresence::from_flag(daylight_flag)?,
            rts: RiseTransitSet::from_flag(rts_flag)?,
        })
    }

    pub fn naif(&self) -> Naif {
        Naif::from_id(self.naif_id)
    }

    pub fn observer(&self) -> ObserverLocationTime {
        ObserverLocationTime::new(self.location, self.julian_day)
    }
}

/// One row of an observer table. Angles are in degrees unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialBodyObserverInfo {
    pub info: ObserverInfo,
    /// Astrometric J2000 right ascension
    pub right_ascension: Degree,
    /// Astrometric J2000 declination
    pub declination: Degree,
    /// Not published for every body
    pub apparent_magnitude: Option<f64>,
    /// Visual magnitudes per square arcsecond
    pub surface_brightness: Option<f64>,
    /// Fraction of the disk illuminated by the Sun, in percent
    pub illuminated_percentage: f64,
    /// Equatorial angular width of the full disk, in arcseconds
    pub angular_diameter: f64,
    pub ob_lon: Degree,
    pub ob_lat: Degree,
    pub sl_lon: Option<Degree>,
    pub sl_lat: Option<Degree>,
    pub np_ra: Degree,
    pub np_dec: Degree,
    pub np_angle: Degree,
    /// Arcseconds
    pub np_distance: f64,
}

impl CelestialBodyObserverInfo {
    pub fn equatorial_coordinate(&self) -> EquatorialCoordinate {
        EquatorialCoordinate::new(
            Angle::degrees(self.right_ascension),
            Angle::degrees(self.declination),
            1.0,
        )
    }

    /// Azimuth and altitude of the target at the row date.
    pub fn horizontal_coordinate(&self) -> HorizontalCoordinate {
        HorizontalCoordinate::from_equatorial(&self.equatorial_coordinate(), &self.info.observer())
    }
}

/// One row of a rise-transit-set table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseTransitSetInfo {
    pub info: ObserverInfo,
    pub azimuth: Degree,
    pub elevation: Degree,
}

/// Next rise, transit and set of a body for an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseTransitSetElevation {
    pub naif_id: NaifId,
    pub maximum_elevation: Radian,
    pub rise_at: JulianDay,
    pub transit_at: JulianDay,
    pub set_at: JulianDay,
}

impl RiseTransitSetElevation {
    /// Summarize a rise-transit-set table
    ///
    /// Arguments
    /// ---------
    /// * `infos`: rows of a single target, in date order
    ///
    /// Return
    /// ------
    /// * the first rise, transit and set; the maximum elevation is the elevation at transit.
    ///   `None` when one of the three events is missing.
    pub fn from_infos(infos: &[RiseTransitSetInfo]) -> Option<Self> {
        let first = |event: RiseTransitSet| infos.iter().find(|row| row.info.rts == event);
        let rise = first(RiseTransitSet::Rise)?;
        let transit = first(RiseTransitSet::Transit)?;
        let set = first(RiseTransitSet::Set)?;
        Some(RiseTransitSetElevation {
            naif_id: transit.info.naif_id,
            maximum_elevation: transit.elevation * RADEG,
            rise_at: rise.info.julian_day,
            transit_at: transit.info.julian_day,
            set_at: set.info.julian_day,
        })
    }

    /// Local day containing a date
    ///
    /// Arguments
    /// ---------
    /// * `julian_day`: the requested date
    /// * `utc_offset`: offset of the observer time zone, in seconds
    ///
    /// Return
    /// ------
    /// * the `[start, end]` julian day range the rows must fall in
    pub fn day_window(julian_day: JulianDay, utc_offset: Second) -> (JulianDay, JulianDay) {
        let start = julian_day.value().trunc() + utc_offset / SECONDS_PER_DAY;
        (JulianDay::new(start), JulianDay::new(start + 1.0))
    }
}

#[cfg(test)]
mod observer_info_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn row(jd: f64, rts: &str, elevation: f64) -> RiseTransitSetInfo {
        RiseTransitSetInfo {
            info: ObserverInfo::new(
                301,
                JulianDay::new(jd),
                GeodeticLocation::new(37.0, -122.0, 0.0),
                "",
                rts,
            )
            .unwrap(),
            azimuth: 0.0,
            elevation,
        }
    }

    #[test]
    fn test_flags() {
        assert_eq!(SolarPresence::from_flag("*"), Ok(SolarPresence::Day));
        assert_eq!(SolarPresence::from_flag(""), Ok(SolarPresence::Night));
        assert_eq!(SolarPresence::from_flag("A"), Ok(SolarPresence::AstronomicalDawn));
        assert_eq!(RiseTransitSet::from_flag("m"), Ok(RiseTransitSet::AboveHorizon));
        assert_eq!(RiseTransitSet::from_flag(""), Ok(RiseTransitSet::BelowHorizon));
        assert_eq!(
            RiseTransitSet::from_flag("x"),
            Err(ParseError::UnknownFlag {
                column: "rise-transit-set",
                flag: "x".into()
            })
        );
        for presence in [SolarPresence::Day, SolarPresence::NauticalDawn, SolarPresence::Night] {
            assert_eq!(SolarPresence::from_flag(presence.flag()), Ok(presence));
        }
    }

    #[test]
    fn test_rise_transit_set_elevation() {
        let rows = vec![
            row(2440587.80, "", -5.0),
            row(2440587.86, "r", -0.76),
            row(2440588.10, "m", 20.0),
            row(2440588.13, "t", 35.83),
            row(2440588.40, "s", -0.7),
            row(2440588.90, "r", -0.7),
        ];
        let rtse = RiseTransitSetElevation::from_infos(&rows).unwrap();
        assert_eq!(rtse.naif_id, 301);
        assert_eq!(rtse.rise_at, JulianDay::new(2440587.86));
        assert_eq!(rtse.transit_at, JulianDay::new(2440588.13));
        assert_eq!(rtse.set_at, JulianDay::new(2440588.40));
        assert_abs_diff_eq!(rtse.maximum_elevation, 35.83 * RADEG, epsilon = 1e-12);

        assert!(RiseTransitSetElevation::from_infos(&rows[..3]).is_none());
    }

    #[test]
    fn test_day_window() {
        let (start, end) =
            RiseTransitSetElevation::day_window(JulianDay::new(2458000.75), -8.0 * 3600.0);
        assert_abs_diff_eq!(start.value(), 2458000.0 - 1.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end.value() - start.value(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_horizontal_coordinate() {
        // Dubhe from San Francisco, 2017-01-06 09:31:30 UTC
        let jd = JulianDay::from_gregorian(2017, 1, 6, 9, 31, 30.0).unwrap();
        let location = GeodeticLocation::new(
            Angle::from_dms(37.0, 46.0, 51.0).raw_value(),
            Angle::from_dms(-122.0, 24.0, 47.0).raw_value(),
            0.0,
        );
        let row = CelestialBodyObserverInfo {
            info: ObserverInfo::new(-1, jd, location, "", "m").unwrap(),
            right_ascension: Angle::from_hms(11.0, 3.0, 43.0).to_degrees(),
            declination: Angle::from_dms(61.0, 45.0, 3.72).raw_value(),
            apparent_magnitude: None,
            surface_brightness: None,
            illuminated_percentage: 0.0,
            angular_diameter: 0.0,
            ob_lon: 0.0,
            ob_lat: 0.0,
            sl_lon: None,
            sl_lat: None,
            np_ra: 0.0,
            np_dec: 0.0,
            np_angle: 0.0,
            np_distance: 0.0,
        };
        let horizontal = row.horizontal_coordinate();
        assert_abs_diff_eq!(horizontal.azimuth.value(), 32.43, epsilon = 1e-2);
        assert_abs_diff_eq!(horizontal.altitude.value(), 56.01, epsilon = 1e-2);
    }
}
