//! # Observer table parsers
//!
//! `Observer` responses start every row with the same three columns:
//!
//! ```text
//!  Date_________JDUT, <daylight flag>, <rise-transit-set flag>, ...
//! ```
//!
//! The remaining columns depend on the requested quantities, they are located by their label
//! on the second line above `$$SOE`.
use super::response::Response;
use crate::constants::NaifId;
use crate::coordinates::GeodeticLocation;
use crate::observer_info::{CelestialBodyObserverInfo, ObserverInfo, RiseTransitSetInfo};
use crate::orrery_errors::ParseError;
use crate::time::JulianDay;

const RIGHT_ASCENSION: &[&str] = &["R.A._(ICRF/J2000.0)"];
const DECLINATION: &[&str] = &["DEC_(ICRF/J2000.0)"];
const APPARENT_MAGNITUDE: &[&str] = &["APmag"];
const SURFACE_BRIGHTNESS: &[&str] = &["S-brt"];
const ILLUMINATED_PERCENTAGE: &[&str] = &["Illu%"];
const ANGULAR_DIAMETER: &[&str] = &["Ang-diam"];
const OB_LON: &[&str] = &["Obsrv-lon", "Ob-lon"];
const OB_LAT: &[&str] = &["Obsrv-lat", "Ob-lat"];
const SL_LON: &[&str] = &["Solar-lon", "Sl-lon"];
const SL_LAT: &[&str] = &["Solar-lat", "Sl-lat"];
const NP_RA: &[&str] = &["N.Pole-RA"];
const NP_DEC: &[&str] = &["N.Pole-DC"];
const NP_ANGLE: &[&str] = &["NP.ang"];
const NP_DISTANCE: &[&str] = &["NP.dist"];

/// A table row split on commas.
struct Row<'a> {
    line: &'a str,
    components: Vec<&'a str>,
}

impl<'a> Row<'a> {
    fn new(line: &'a str) -> Self {
        Row {
            line,
            components: line.split(',').map(str::trim).collect(),
        }
    }

    fn text(&self, index: usize) -> Result<&'a str, ParseError> {
        self.components
            .get(index)
            .copied()
            .ok_or_else(|| ParseError::MalformedTable(format!("short row: {}", self.line)))
    }

    fn number(&self, index: usize, field: &'static str) -> Result<f64, ParseError> {
        let text = self.text(index)?;
        text.parse().map_err(|_| ParseError::MalformedValue {
            field,
            value: text.to_string(),
        })
    }

    /// `n.a.` and other non numeric values read as `None`.
    fn optional(&self, index: usize) -> Result<Option<f64>, ParseError> {
        Ok(self.text(index)?.parse().ok())
    }

    fn info(&self, naif_id: NaifId, location: GeodeticLocation) -> Result<ObserverInfo, ParseError> {
        ObserverInfo::new(
            naif_id,
            JulianDay::new(self.number(0, "julian day")?),
            location,
            self.text(1)?,
            self.text(2)?,
        )
    }
}

/// Index of the first label among `synonyms`.
fn column(labels: &[String], synonyms: &[&'static str]) -> Result<usize, ParseError> {
    synonyms
        .iter()
        .find_map(|synonym| labels.iter().position(|label| label == synonym))
        .ok_or(ParseError::MissingField(synonyms[0]))
}

struct ObserverColumns {
    right_ascension: usize,
    declination: usize,
    apparent_magnitude: usize,
    surface_brightness: usize,
    illuminated_percentage: usize,
    angular_diameter: usize,
    ob_lon: usize,
    ob_lat: usize,
    sl_lon: usize,
    sl_lat: usize,
    np_ra: usize,
    np_dec: usize,
    np_angle: usize,
    np_distance: usize,
}

impl ObserverColumns {
    fn locate(labels: &[String]) -> Result<Self, ParseError> {
        Ok(ObserverColumns {
            right_ascension: column(labels, RIGHT_ASCENSION)?,
            declination: column(labels, DECLINATION)?,
            apparent_magnitude: column(labels, APPARENT_MAGNITUDE)?,
            surface_brightness: column(labels, SURFACE_BRIGHTNESS)?,
            illuminated_percentage: column(labels, ILLUMINATED_PERCENTAGE)?,
            angular_diameter: column(labels, ANGULAR_DIAMETER)?,
            ob_lon: column(labels, OB_LON)?,
            ob_lat: column(labels, OB_LAT)?,
            sl_lon: column(labels, SL_LON)?,
            sl_lat: column(labels, SL_LAT)?,
            np_ra: column(labels, NP_RA)?,
            np_dec: column(labels, NP_DEC)?,
            np_angle: column(labels, NP_ANGLE)?,
            np_distance: column(labels, NP_DISTANCE)?,
        })
    }
}

/// Parse an observer table requested with the geocentric quantities
///
/// Arguments
/// ---------
/// * `content`: raw `Observer` response
///
/// Return
/// ------
/// * one info per row, in table order
/// * [`ParseError::MissingField`] when a quantity column is absent
pub fn parse_observer_infos(content: &str) -> Result<Vec<CelestialBodyObserverInfo>, ParseError> {
    let response = Response::new(content)?;
    let (_, naif_id) = response.target()?;
    let location = response.center_location()?;
    let columns = ObserverColumns::locate(&response.table_labels()?)?;

    response
        .table_rows()?
        .into_iter()
        .map(|line| {
            let row = Row::new(line);
            Ok(CelestialBodyObserverInfo {
                info: row.info(naif_id, location)?,
                right_ascension: row.number(columns.right_ascension, "R.A.")?,
                declination: row.number(columns.declination, "DEC")?,
                apparent_magnitude: row.optional(columns.apparent_magnitude)?,
                surface_brightness: row.optional(columns.surface_brightness)?,
                illuminated_percentage: row
                    .number(columns.illuminated_percentage, "Illu%")?,
                angular_diameter: row.number(columns.angular_diameter, "Ang-diam")?,
                ob_lon: row.number(columns.ob_lon, "Ob-lon")?,
                ob_lat: row.number(columns.ob_lat, "Ob-lat")?,
                sl_lon: row.optional(columns.sl_lon)?,
                sl_lat: row.optional(columns.sl_lat)?,
                np_ra: row.number(columns.np_ra, "N.Pole-RA")?,
                np_dec: row.number(columns.np_dec, "N.Pole-DC")?,
                np_angle: row.number(columns.np_angle, "NP.ang")?,
                np_distance: row.number(columns.np_distance, "NP.dist")?,
            })
        })
        .collect()
}

/// Parse a rise-transit-set table: `jd, daylight, rts, azimuth, elevation`.
pub fn parse_rise_transit_set(content: &str) -> Result<Vec<RiseTransitSetInfo>, ParseError> {
    let response = Response::new(content)?;
    let (_, naif_id) = response.target()?;
    let location = response.center_location()?;

    response
        .table_rows()?
        .into_iter()
        .map(|line| {
            let row = Row::new(line);
            Ok(RiseTransitSetInfo {
                info: row.info(naif_id, location)?,
                azimuth: row.number(3, "azimuth")?,
                elevation: row.number(4, "elevation")?,
            })
        })
        .collect()
}
