//! # Julian time and sidereal time
//!
//! [`JulianDay`] is the continuous time representation used everywhere in the crate. Calendar
//! conversions go through [`hifitime::Epoch`] in the UTC time scale.
//!
//! ## Overview
//!
//! - [`JulianDay::from_gregorian`] / [`JulianDay::to_gregorian`]: calendar round trip with
//!   sub-second agreement.
//! - [`JulianDay::greenwich_mean_sidereal_time`]: GMST as an hour [`Angle`].
//! - [`SiderealTime`]: local sidereal time for an observer longitude.
//! - [`JulianDay::horizons_format`]: `yyyy-MMM-dd HH:mm` rendering used in Horizons queries,
//!   read back by [`JulianDay::from_horizons_format`].
use std::fmt;
use std::ops::{Add, Sub};

use hifitime::{Duration, Epoch};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::angle::{Angle, AngleUnit, WrapMode};
use crate::constants::{
    Degree, Second, B1950, DAYS_PER_JULIAN_CENTURY, J2000, JDTOMJD, SECONDS_PER_DAY,
};
use crate::orrery_errors::OrreryError;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static HORIZONS_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?\d{1,6})-([A-Z][a-z]{2})-(\d{2}) (\d{2}):(\d{2})\s*$")
        .expect("horizons date regex")
});

/// Broken-down UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GregorianDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanos: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct JulianDay(f64);

impl JulianDay {
    pub const J2000: JulianDay = JulianDay(J2000);
    pub const B1950: JulianDay = JulianDay(B1950);

    pub fn new(value: f64) -> Self {
        JulianDay(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn modified_julian_day(&self) -> f64 {
        self.0 - JDTOMJD
    }

    /// Julian centuries elapsed since J2000.
    pub fn julian_century(&self) -> f64 {
        (self.0 - J2000) / DAYS_PER_JULIAN_CENTURY
    }

    pub fn add_seconds(&self, seconds: Second) -> JulianDay {
        JulianDay(self.0 + seconds / SECONDS_PER_DAY)
    }

    /// Transformation from a UTC Gregorian date to a julian day
    ///
    /// Arguments
    /// ---------
    /// * `year`, `month`, `day`, `hour`, `minute`: calendar fields
    /// * `second`: seconds with fraction
    ///
    /// Return
    /// ------
    /// * the julian day, or [`OrreryError::InvalidDate`] if the fields do not form a date
    pub fn from_gregorian(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: f64,
    ) -> Result<Self, OrreryError> {
        if !(0.0..60.0).contains(&second) {
            return Err(OrreryError::InvalidDate(format!("second out of range: {second}")));
        }
        let whole = second.trunc();
        let nanos = ((second - whole) * 1e9).round() as u32;
        let epoch =
            Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, whole as u8, nanos)
                .map_err(|e| OrreryError::InvalidDate(e.to_string()))?;
        Ok(JulianDay::from_epoch(epoch))
    }

    pub fn from_epoch(epoch: Epoch) -> Self {
        JulianDay(epoch.to_jde_utc_days())
    }

    pub fn to_epoch(&self) -> Epoch {
        Epoch::from_jde_utc(self.0)
    }

    /// UTC calendar date, rounded to the millisecond to absorb floating point noise.
    pub fn to_gregorian(&self) -> GregorianDate {
        let (year, month, day, hour, minute, second, nanos) = self
            .to_epoch()
            .round(Duration::from_milliseconds(1.0))
            .to_gregorian_utc();
        GregorianDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanos,
        }
    }

    /// Midnight UTC of January 1st of the current year.
    pub fn start_of_year(&self) -> JulianDay {
        let date = self.to_gregorian();
        JulianDay::from_epoch(Epoch::from_gregorian_utc_at_midnight(date.year, 1, 1))
    }

    /// Midnight UTC of the first day of the current month.
    pub fn start_of_month(&self) -> JulianDay {
        let date = self.to_gregorian();
        JulianDay::from_epoch(Epoch::from_gregorian_utc_at_midnight(
            date.year, date.month, 1,
        ))
    }

    /// Date formatted as `yyyy-MMM-dd HH:mm` (UTC), the layout expected by Horizons.
    pub fn horizons_format(&self) -> String {
        let date = self.to_gregorian();
        format!(
            "{:04}-{}-{:02} {:02}:{:02}",
            date.year,
            MONTH_ABBREVIATIONS[(date.month as usize).saturating_sub(1) % 12],
            date.day,
            date.hour,
            date.minute
        )
    }

    /// Read back a date rendered by [`JulianDay::horizons_format`].
    pub fn from_horizons_format(text: &str) -> Result<Self, OrreryError> {
        let invalid = || OrreryError::InvalidDate(format!("not a yyyy-MMM-dd HH:mm date: {text}"));
        let captures = HORIZONS_DATE.captures(text).ok_or_else(invalid)?;
        let field = |index: usize| captures.get(index).map_or("", |m| m.as_str());
        let month = MONTH_ABBREVIATIONS
            .iter()
            .position(|name| *name == field(2))
            .ok_or_else(invalid)?;
        let year = field(1).parse::<i32>().map_err(|_| invalid())?;
        let day = field(3).parse::<u8>().map_err(|_| invalid())?;
        let hour = field(4).parse::<u8>().map_err(|_| invalid())?;
        let minute = field(5).parse::<u8>().map_err(|_| invalid())?;
        JulianDay::from_gregorian(year, month as u8 + 1, day, hour, minute, 0.0)
    }

    /// Greenwich mean sidereal time
    ///
    /// Return
    /// ------
    /// * GMST as an hour angle wrapped to [0h, 24h)
    pub fn greenwich_mean_sidereal_time(&self) -> Angle {
        let hours = 18.697374558 + 24.06570982441908 * (self.0 - J2000);
        Angle::hours(hours)
    }
}

impl Add<f64> for JulianDay {
    type Output = JulianDay;

    /// Add a number of days.
    fn add(self, days: f64) -> JulianDay {
        JulianDay(self.0 + days)
    }
}

impl Sub for JulianDay {
    type Output = Second;

    /// Elapsed time between two julian days, in seconds.
    fn sub(self, rhs: JulianDay) -> Second {
        (self.0 - rhs.0) * SECONDS_PER_DAY
    }
}

impl fmt::Display for JulianDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {}", self.0)
    }
}

/// Sidereal time as seen from a given longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiderealTime {
    greenwich: Angle,
    longitude: Degree,
}

impl SiderealTime {
    /// Arguments
    /// ---------
    /// * `julian_day`: instant of observation (UTC)
    /// * `longitude`: east-positive observer longitude in degrees
    pub fn new(julian_day: JulianDay, longitude: Degree) -> Self {
        SiderealTime {
            greenwich: julian_day.greenwich_mean_sidereal_time(),
            longitude,
        }
    }

    pub fn greenwich(&self) -> Angle {
        self.greenwich
    }

    /// Local sidereal time, wrapped to [0h, 24h).
    pub fn local(&self) -> Angle {
        Angle::hours(self.greenwich.value() + self.offset().raw_value())
    }

    /// Offset from Greenwich, as an unwrapped hour angle.
    pub fn offset(&self) -> Angle {
        Angle::degrees(self.longitude)
            .to_unit(AngleUnit::Hour)
            .with_wrap(WrapMode::None)
    }

    /// Offset formatted as `±HH:MM:SS`, seconds truncated.
    pub fn offset_string(&self) -> String {
        let (sign, [h, m, s]) = self.offset().components();
        let sign = if sign < 0.0 { '-' } else { '+' };
        format!("{sign}{:02}:{:02}:{:02}", h as u32, m as u32, s.trunc() as u32)
    }
}

impl fmt::Display for SiderealTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.local(), self.offset_string())
    }
}
