//! # Error taxonomy
//!
//! Every fallible operation of the crate returns one of the enums below.
//!
//! - [`KeplerError`]: numerical failures of the Kepler solver.
//! - [`ParseError`]: a Horizons payload that cannot be turned into a body, a motion or an
//!   observer row.
//! - [`OrreryError`]: crate-level error, wrapping the two above plus transport, I/O and
//!   configuration failures.
//! - [`FetchError`]: terminal state of one Horizons query that produced no payload.
//!
//! None of these errors is meant to be fatal to the process: the fetch pipeline records them
//! next to the best available data and lets the caller decide.
use thiserror::Error;

use crate::constants::NaifId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeplerError {
    #[error(
        "Kepler equation did not converge (e = {eccentricity}, M = {mean_anomaly}): \
         best estimate E = {estimate}, residual = {residual}"
    )]
    DidNotConverge {
        eccentricity: f64,
        mean_anomaly: f64,
        estimate: f64,
        residual: f64,
    },

    #[error("Operation is undefined for a parabolic orbit")]
    Parabolic,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Malformed value for {field}: {value}")]
    MalformedValue { field: &'static str, value: String },

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Unknown flag '{flag}' in column {column}")]
    UnknownFlag { column: &'static str, flag: String },

    #[error("Unknown NAIF id: {0}")]
    UnknownNaifId(NaifId),
}

#[derive(Error, Debug)]
pub enum OrreryError {
    #[error("Kepler solver error: {0}")]
    Kepler(#[from] KeplerError),

    #[error("Horizons parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid orbit: {0}")]
    InvalidOrbit(String),

    #[error("Invalid angle operation: {0}")]
    InvalidAngle(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Body {satellite} has no primary in the ephemeris")]
    OrphanBody { satellite: NaifId },

    #[error("Ephemeris is empty")]
    EmptyEphemeris,

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unable to parse the response for {naif_id}: {source}")]
    BodyParse {
        naif_id: NaifId,
        #[source]
        source: ParseError,
    },
}

impl PartialEq for OrreryError {
    fn eq(&self, other: &Self) -> bool {
        use OrreryError::*;
        match (self, other) {
            (Kepler(a), Kepler(b)) => a == b,
            (Parse(a), Parse(b)) => a == b,
            (InvalidOrbit(a), InvalidOrbit(b)) => a == b,
            (InvalidAngle(a), InvalidAngle(b)) => a == b,
            (InvalidDate(a), InvalidDate(b)) => a == b,
            (InvalidUrl(a), InvalidUrl(b)) => a == b,
            (OrphanBody { satellite: a }, OrphanBody { satellite: b }) => a == b,
            (Fetch(a), Fetch(b)) => a == b,
            (
                BodyParse {
                    naif_id: a,
                    source: sa,
                },
                BodyParse {
                    naif_id: b,
                    source: sb,
                },
            ) => a == b && sa == sb,
            (
                HttpStatus {
                    status: a,
                    url: ua,
                },
                HttpStatus {
                    status: b,
                    url: ub,
                },
            ) => a == b && ua == ub,

            // foreign payloads are not comparable, same variant is enough
            (ReqwestError(_), ReqwestError(_)) => true,
            (IoError(_), IoError(_)) => true,
            (ConfigError(_), ConfigError(_)) => true,

            (EmptyEphemeris, EmptyEphemeris) => true,

            _ => false,
        }
    }
}

/// Why a Horizons query ended without a usable payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchErrorKind {
    #[error("source still busy after the last attempt")]
    Exhausted,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("cancelled")]
    Cancelled,
}

/// Terminal failure of one query, reported next to the payloads of its siblings.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("query for {naif_id} failed after {attempts} attempt(s): {kind}")]
pub struct FetchError {
    pub naif_id: NaifId,
    pub attempts: u32,
    pub kind: FetchErrorKind,
}
