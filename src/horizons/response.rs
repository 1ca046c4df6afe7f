//! # Horizons response layout
//!
//! A batch response is free text made of blocks separated by lines of stars:
//!
//! ```text
//! *******************************************************************************
//!  Revised: ...                  Mars                            499 / 4
//!   Mean radius (km)      = 3389.9(2+-4)    Density (g cm^-3)     =  3.933(5+-4)
//!   ...                                                      <- physical block
//! *******************************************************************************
//! Ephemeris / WWW_USER ...
//! *******************************************************************************
//! Target body name: Mars (499)                      {source: mar097}
//! ...                                                        <- header blocks
//! *******************************************************************************
//! JDTDB, Calendar Date (TDB), EC, ...                        <- column labels
//! *******************************************************************************
//! $$SOE
//! ...                                                        <- table rows
//! $$EOE
//! ```
//!
//! [`Response`] locates these parts once and hands them to the table parsers.
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::NaifId;
use crate::coordinates::GeodeticLocation;
use crate::orrery_errors::ParseError;

/// Marker of the concurrent request throttling page.
pub const BUSY_MARKER: &str = "Blocked Concurrent Request";

static HEADER_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Ephemeris[^\*]+\*+([^\*]+)\*+([^\*]+)\*+([^\*]+)\*+")
        .expect("header block regex")
});
static HEADER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:]+):\s([^\{]+)(\{[^\}]+\})?$").expect("header line regex")
});
static DOUBLE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?:(.{38})\s+)|(?:(.{38}\S+)\s+))(.+)$").expect("double column regex")
});
static PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(.+)\s*=\s*(.{5,24}|[\d.-]+)").expect("property regex")
});
static NAME_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s*\((\d+)\)").expect("name id regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    /// The source refused the request because too many were in flight
    Busy,
}

impl ResponseStatus {
    pub fn validate(content: &str) -> ResponseStatus {
        if content.contains(BUSY_MARKER) {
            ResponseStatus::Busy
        } else {
            ResponseStatus::Ok
        }
    }
}

/// `key: value {annotation}` line of a header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub value: String,
    pub annotation: Option<String>,
}

impl HeaderField {
    /// `Mars (499)` → `("Mars", 499)`
    pub fn name_id(&self) -> Option<(String, NaifId)> {
        let captures = NAME_ID.captures(&self.value)?;
        let id = captures.get(2)?.as_str().parse().ok()?;
        Some((captures.get(1)?.as_str().to_string(), id))
    }

    /// `E-lon(deg),Lat(deg),Alt(km)` triplet, the longitude is wrapped to (-180°, 180°].
    pub fn geodetic_location(&self) -> Option<GeodeticLocation> {
        let components: Vec<f64> = self
            .value
            .split(',')
            .filter_map(|component| component.trim().parse().ok())
            .collect();
        match components.as_slice() {
            &[longitude, latitude, altitude] => Some(GeodeticLocation::new(
                latitude,
                wrap_longitude(longitude),
                altitude * 1000.0,
            )),
            _ => None,
        }
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    let wrapped = longitude.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

fn is_star_line(line: &str) -> bool {
    line.contains("***")
}

/// Parse the `key = value` pair of one column, `None` when the column holds no property.
fn parse_property(column: &str) -> Option<(String, String)> {
    let captures = PROPERTY.captures(column)?;
    Some((
        captures.get(1)?.as_str().trim().to_string(),
        captures.get(2)?.as_str().trim().to_string(),
    ))
}

/// Split a line of the physical block in its one or two `key = value` properties.
pub fn parse_double_column(line: &str) -> Option<((String, String), Option<(String, String)>)> {
    let Some(captures) = DOUBLE_COLUMN.captures(line) else {
        return parse_property(line).map(|property| (property, None));
    };
    let first = captures.get(1).or_else(|| captures.get(2))?.as_str();
    let second = captures.get(3)?.as_str();
    let first_property = parse_property(first)?;
    Some((first_property, parse_property(second)))
}

/// A raw Horizons response with its header already indexed.
#[derive(Debug, Clone)]
pub struct Response<'a> {
    content: &'a str,
    header: HashMap<String, HeaderField>,
}

impl<'a> Response<'a> {
    /// Index the header blocks of `content`
    ///
    /// Return
    /// ------
    /// * [`ParseError::MalformedTable`] if the `Ephemeris` header blocks are missing
    pub fn new(content: &'a str) -> Result<Self, ParseError> {
        let blocks = HEADER_BLOCKS.captures(content).ok_or_else(|| {
            ParseError::MalformedTable("no Ephemeris header blocks".to_string())
        })?;
        let header = (1..=3)
            .filter_map(|index| blocks.get(index))
            .flat_map(|block| block.as_str().lines())
            .filter_map(|line| {
                let captures = HEADER_LINE.captures(line)?;
                let key = captures.get(1)?.as_str().trim().to_string();
                let value = captures.get(2)?.as_str().trim().to_string();
                let annotation = captures.get(3).map(|m| m.as_str().trim().to_string());
                Some((key, HeaderField { value, annotation }))
            })
            .collect();
        Ok(Response { content, header })
    }

    pub fn content(&self) -> &'a str {
        self.content
    }

    pub fn header(&self) -> &HashMap<String, HeaderField> {
        &self.header
    }

    pub fn field(&self, key: &str) -> Option<&HeaderField> {
        self.header.get(key)
    }

    pub fn target(&self) -> Result<(String, NaifId), ParseError> {
        self.field("Target body name")
            .and_then(HeaderField::name_id)
            .ok_or(ParseError::MissingField("Target body name"))
    }

    pub fn center(&self) -> Result<(String, NaifId), ParseError> {
        self.field("Center body name")
            .and_then(HeaderField::name_id)
            .ok_or(ParseError::MissingField("Center body name"))
    }

    pub fn center_location(&self) -> Result<GeodeticLocation, ParseError> {
        self.field("Center geodetic")
            .and_then(HeaderField::geodetic_location)
            .ok_or(ParseError::MissingField("Center geodetic"))
    }

    /// Properties of the physical block, between the first two star lines.
    pub fn physical_properties(&self) -> HashMap<String, String> {
        self.content
            .lines()
            .skip_while(|line| !is_star_line(line))
            .skip(1)
            .take_while(|line| !is_star_line(line))
            .filter_map(parse_double_column)
            .flat_map(|(first, second)| std::iter::once(first).chain(second))
            .collect()
    }

    /// Rows between `$$SOE` and `$$EOE`, blank lines removed.
    pub fn table_rows(&self) -> Result<Vec<&'a str>, ParseError> {
        let (soe, eoe) = self.table_bounds()?;
        let lines: Vec<&'a str> = self.content.lines().collect();
        Ok(lines[soe + 1..eoe]
            .iter()
            .copied()
            .filter(|line| !line.trim().is_empty())
            .collect())
    }

    /// Column labels, found on the second line above `$$SOE`.
    pub fn table_labels(&self) -> Result<Vec<String>, ParseError> {
        let (soe, _) = self.table_bounds()?;
        let line = soe
            .checked_sub(2)
            .and_then(|index| self.content.lines().nth(index))
            .ok_or_else(|| ParseError::MalformedTable("no column labels".to_string()))?;
        Ok(line.split(',').map(|label| label.trim().to_string()).collect())
    }

    fn table_bounds(&self) -> Result<(usize, usize), ParseError> {
        let position = |marker: &str| {
            self.content
                .lines()
                .position(|line| line.contains(marker))
                .ok_or_else(|| ParseError::MalformedTable(format!("missing {marker}")))
        };
        let soe = position("$$SOE")?;
        let eoe = position("$$EOE")?;
        if eoe <= soe {
            return Err(ParseError::MalformedTable("$$EOE before $$SOE".to_string()));
        }
        Ok((soe, eoe))
    }
}
