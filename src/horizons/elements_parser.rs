//! # Osculating elements table
//!
//! Rows of an `Elements` response, one per epoch:
//!
//! ```text
//! JDTDB, Calendar Date (TDB), EC, QR, IN, OM, W, Tp, N, MA, TA, A, AD, PR,
//! ```
//!
//! Distances are in km, angles in degrees, `Tp` is a julian day. Elements are relative to the
//! center body, whose gravitational parameter is given by the `Keplerian GM` (or `System GM`)
//! header field.
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::response::Response;
use crate::constants::{KM3_TO_M3, KM_TO_M, RADEG};
use crate::orbit::Orbit;
use crate::orbital_motion::OrbitalMotionMoment;
use crate::orrery_errors::{OrreryError, ParseError};
use crate::time::JulianDay;

const ELEMENTS_COLUMNS: usize = 14;

static SYSTEM_GM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?)\s*(km\^3 s\^-2|km\^3/s\^2)")
        .expect("system gm regex")
});

/// One row of the elements table.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ElementsRecord {
    pub jd: f64,
    pub calendar_date: String,
    /// Eccentricity
    pub ec: f64,
    /// Periapsis distance, km
    pub qr: f64,
    /// Inclination, degrees
    pub inclination: f64,
    /// Longitude of the ascending node, degrees
    pub om: f64,
    /// Argument of periapsis, degrees
    pub w: f64,
    /// Time of periapsis passage, julian day
    pub tp: f64,
    /// Mean motion, degrees per second
    pub n: f64,
    /// Mean anomaly, degrees
    pub ma: f64,
    /// True anomaly, degrees
    pub ta: f64,
    /// Semimajor axis, km
    pub a: f64,
    /// Apoapsis distance, km
    pub ad: f64,
    /// Sidereal period, seconds
    pub pr: f64,
}

impl ElementsRecord {
    /// Motion of the row around a center body with gravitational parameter `grav_param`.
    pub fn to_moment(&self, grav_param: f64) -> Result<OrbitalMotionMoment, OrreryError> {
        let orbit = Orbit::from_elements(
            self.a * KM_TO_M,
            self.ec,
            self.inclination * RADEG,
            Some(self.om * RADEG),
            self.w * RADEG,
        )?;
        OrbitalMotionMoment::new(
            orbit,
            grav_param,
            JulianDay::new(self.jd),
            JulianDay::new(self.tp),
        )
    }
}

/// Gravitational parameter of the center body in m³/s².
pub fn system_gm(response: &Response<'_>) -> Result<f64, ParseError> {
    let field = response
        .field("Keplerian GM")
        .or_else(|| response.field("System GM"))
        .ok_or(ParseError::MissingField("Keplerian GM"))?;
    SYSTEM_GM
        .captures(&field.value)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<f64>().ok())
        .map(|km3| km3 * KM3_TO_M3)
        .ok_or_else(|| ParseError::MalformedValue {
            field: "Keplerian GM",
            value: field.value.clone(),
        })
}

/// Rows of the table, the incomplete ones are skipped.
pub fn parse_records(response: &Response<'_>) -> Result<Vec<ElementsRecord>, ParseError> {
    let rows = response.table_rows()?.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rows.as_bytes());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| ParseError::MalformedTable(e.to_string()))?;
        let fields: csv::StringRecord = row.iter().filter(|field| !field.is_empty()).collect();
        if fields.len() != ELEMENTS_COLUMNS {
            debug!("skipping elements row with {} columns: {:?}", fields.len(), row);
            continue;
        }
        match fields.deserialize::<ElementsRecord>(None) {
            Ok(record) => records.push(record),
            Err(e) => debug!("skipping unreadable elements row {row:?}: {e}"),
        }
    }
    Ok(records)
}

/// Osculating motions of the target, one per row
///
/// Arguments
/// ---------
/// * `response`: an `Elements` response
///
/// Return
/// ------
/// * the motions in table order. Rows describing an impossible orbit are skipped.
pub fn parse_elements(response: &Response<'_>) -> Result<Vec<OrbitalMotionMoment>, ParseError> {
    let grav_param = system_gm(response)?;
    let (_, naif_id) = response.target()?;
    Ok(parse_records(response)?
        .into_iter()
        .filter_map(|record| match record.to_moment(grav_param) {
            Ok(moment) => Some(moment),
            Err(e) => {
                warn!("invalid elements for {naif_id} at {}: {e}", record.jd);
                None
            }
        })
        .collect())
}
