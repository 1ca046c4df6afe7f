//! # Physical property extraction
//!
//! The physical block of a Horizons response is a free form `label = value` table whose
//! labels change from one body to the other. [`PropertyExtractor`] looks each property up
//! through a list of known synonyms and converts it to SI units.
//!
//! Pluto pages use their own layout, handled by [`ExtractorFlavour::Pluto`].
use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{NaifId, Radian, Second, KM3_TO_M3, KM_TO_M, RADEG, SECONDS_PER_DAY};
use crate::naif::{MajorBody, Naif};

const HILL_SPHERE_KEYS: &[&str] = &[
    "Hill's sphere rad. Rp",
    "Hill's sphere radius",
    "Hill's sphere rad., Rp",
];
const ROTATION_PERIOD_KEYS: &[&str] = &[
    "Sidereal rot. period",
    "Sidereal period, hr",
    "Inferred rot. period",
    "Orbit period",
    "Orbital period",
];
const OBLIQUITY_KEYS: &[&str] = &["Obliquity to orbit", "Obliquity to orbit, deg"];
const RADIUS_KEYS: &[&str] = &[
    "Mean radius (km)",
    "Mean radius, km",
    "Volumetric mean radius",
    "Radius (IAU), km",
];
const PLUTO_RADIUS_KEYS: &[&str] = &["Radius of Pluto, Rp"];
const PLUTO_GM_KEY: &str = "GM (planet) km^3/s^2";

static RADIUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-\d.]+)(?:(?:\([-+,.\d]*\))|(?:\+-[\d.]+))").expect("radius regex")
});
static PLUTO_RADIUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d\.]+) km").expect("pluto radius regex"));
static GM_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"GM(?:,| \()(10\^(\d+))?\s*(km\^3 s\^-2|km\^3/s\^2)\)?").expect("gm regex")
});
static ROTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-\d.]+)(\+-[-\d.]+)?\s*(hr|d)?").expect("rotation regex")
});
static OBLIQUITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([-\d.]+)\s*(?:deg)?").expect("obliquity regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorFlavour {
    Default,
    Pluto,
}

#[derive(Debug, Clone)]
pub struct PropertyExtractor<'a> {
    body_info: &'a HashMap<String, String>,
    flavour: ExtractorFlavour,
}

impl<'a> PropertyExtractor<'a> {
    /// Extractor matching the page layout of `naif_id`.
    pub fn for_naif(naif_id: NaifId, body_info: &'a HashMap<String, String>) -> Self {
        let flavour = match Naif::from_id(naif_id) {
            Naif::MajorBody(MajorBody::Pluto) => ExtractorFlavour::Pluto,
            _ => ExtractorFlavour::Default,
        };
        PropertyExtractor { body_info, flavour }
    }

    pub fn flavour(&self) -> ExtractorFlavour {
        self.flavour
    }

    fn lookup(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter()
            .find_map(|key| self.body_info.get(*key))
            .map(String::as_str)
    }

    /// Mean radius in meters.
    pub fn radius(&self) -> Option<f64> {
        match self.flavour {
            ExtractorFlavour::Default => {
                let km = self.lookup(RADIUS_KEYS)?;
                if let Ok(value) = km.parse::<f64>() {
                    return Some(value * KM_TO_M);
                }
                let value = first_capture(&RADIUS, km);
                if value.is_none() {
                    debug!("radius '{km}' does not match the radius pattern");
                }
                value.map(|km| km * KM_TO_M)
            }
            ExtractorFlavour::Pluto => {
                let text = self.lookup(PLUTO_RADIUS_KEYS)?;
                first_capture(&PLUTO_RADIUS, text).map(|km| km * KM_TO_M)
            }
        }
    }

    /// Gravitational parameter in m³/s²
    ///
    /// The label carries the unit and an optional power of ten, e.g. `GM (10^3 km^3 s^-2)`.
    pub fn gm(&self) -> Option<f64> {
        if self.flavour == ExtractorFlavour::Pluto {
            let value: f64 = self.body_info.get(PLUTO_GM_KEY)?.trim().parse().ok()?;
            return Some(value * KM3_TO_M3);
        }
        let mut keys: Vec<&String> = self
            .body_info
            .keys()
            .filter(|key| GM_KEY.is_match(key))
            .collect();
        keys.sort();
        let key = keys.first()?;
        let exponent: i32 = GM_KEY
            .captures(key)
            .and_then(|captures| captures.get(2))
            .and_then(|exponent| exponent.as_str().parse().ok())
            .unwrap_or(0);
        let value: f64 = self.body_info.get(*key)?.replace(',', "").trim().parse().ok()?;
        Some(value * 10f64.powi(exponent) * KM3_TO_M3)
    }

    /// Hill sphere radius in body radii.
    pub fn hill_sphere(&self) -> Option<f64> {
        self.lookup(HILL_SPHERE_KEYS)?.trim().parse().ok()
    }

    pub fn obliquity(&self) -> Option<Radian> {
        first_capture(&OBLIQUITY, self.lookup(OBLIQUITY_KEYS)?).map(|deg| deg * RADEG)
    }

    /// Sidereal rotation period in seconds
    ///
    /// Arguments
    /// ---------
    /// * `naif_id`: the body, the Moon falls back on its orbital period
    /// * `orbital_period`: used for synchronous rotators
    ///
    /// Return
    /// ------
    /// * hours are assumed when the unit is missing, `d` means days
    pub fn rotation_period(&self, naif_id: NaifId, orbital_period: Option<Second>) -> Option<Second> {
        let Some(text) = self.lookup(ROTATION_PERIOD_KEYS) else {
            return if naif_id == 301 { orbital_period } else { None };
        };
        if text.trim().eq_ignore_ascii_case("synchronous") {
            return orbital_period;
        }
        let captures = ROTATION.captures(text)?;
        let value: f64 = captures.get(1)?.as_str().parse().ok()?;
        match captures.get(3).map(|unit| unit.as_str()) {
            None | Some("hr") => Some(value * 3600.0),
            Some("d") => Some(value * SECONDS_PER_DAY),
            Some(_) => None,
        }
    }
}

fn first_capture(regex: &Regex, text: &str) -> Option<f64> {
    regex.captures(text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod property_extractor_test {
    use super::*;
    use approx::assert_relative_eq;

    fn info(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_mars_like_properties() {
        let body_info = info(&[
            ("Mean radius (km)", "3389.9(2+-4)"),
            ("Sidereal rot. period", "24.622962 hr"),
            ("Obliquity to orbit", "25.19 deg"),
            ("GM (km^3 s^-2)", "42828.3"),
            ("GM 1-sigma (km^3 s^-2)", "+- 0.1"),
            ("Hill's sphere rad. Rp", "319.8"),
        ]);
        let extractor = PropertyExtractor::for_naif(499, &body_info);
        assert_eq!(extractor.flavour(), ExtractorFlavour::Default);
        assert_relative_eq!(extractor.radius().unwrap(), 3389.9e3, max_relative = 1e-12);
        assert_relative_eq!(extractor.gm().unwrap(), 42828.3e9, max_relative = 1e-12);
        assert_relative_eq!(extractor.obliquity().unwrap(), 25.19 * RADEG);
        assert_relative_eq!(extractor.hill_sphere().unwrap(), 319.8);
        assert_relative_eq!(
            extractor.rotation_period(499, None).unwrap(),
            88642.6632,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_gm_with_exponent_and_commas() {
        let body_info = info(&[("GM (10^3 km^3 s^-2)", "126,686.511")]);
        let extractor = PropertyExtractor::for_naif(599, &body_info);
        assert_relative_eq!(extractor.gm().unwrap(), 126_686.511e3 * 1e9, max_relative = 1e-12);
    }

    #[test]
    fn test_radius_variants() {
        let plain = info(&[("Volumetric mean radius", "6051.8")]);
        assert_relative_eq!(
            PropertyExtractor::for_naif(299, &plain).radius().unwrap(),
            6051.8e3,
            max_relative = 1e-12
        );
        let sigma = info(&[("Mean radius, km", "24624+-21")]);
        assert_relative_eq!(
            PropertyExtractor::for_naif(899, &sigma).radius().unwrap(),
            24624e3
        );
        assert!(PropertyExtractor::for_naif(899, &info(&[])).radius().is_none());
    }

    #[test]
    fn test_rotation_period_variants() {
        let days = info(&[("Sidereal rot. period", "-243.0185 d")]);
        assert_relative_eq!(
            PropertyExtractor::for_naif(299, &days)
                .rotation_period(299, None)
                .unwrap(),
            -243.0185 * 86400.0,
            epsilon = 1e-6
        );
        let sync = info(&[("Orbital period", "Synchronous")]);
        assert_eq!(
            PropertyExtractor::for_naif(502, &sync).rotation_period(502, Some(306_822.0)),
            Some(306_822.0)
        );
        let missing = info(&[]);
        let extractor = PropertyExtractor::for_naif(301, &missing);
        assert_eq!(extractor.rotation_period(301, Some(2_360_584.68)), Some(2_360_584.68));
        assert_eq!(extractor.rotation_period(399, Some(1.0)), None);
    }

    #[test]
    fn test_pluto() {
        let body_info = info(&[
            ("Radius of Pluto, Rp", "1195 km"),
            ("GM (planet) km^3/s^2", "872.4"),
        ]);
        let extractor = PropertyExtractor::for_naif(999, &body_info);
        assert_eq!(extractor.flavour(), ExtractorFlavour::Pluto);
        assert_relative_eq!(extractor.radius().unwrap(), 1195e3);
        assert_relative_eq!(extractor.gm().unwrap(), 872.4e9, max_relative = 1e-12);
        assert!(extractor.obliquity().is_none());
    }
}
