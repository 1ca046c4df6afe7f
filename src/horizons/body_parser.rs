//! # Celestial body parser
//!
//! Turns a complete `Elements` response into a [`CelestialBody`]: identity from the header,
//! physical data from the physical block and the first row of the elements table as motion.
use log::warn;

use super::elements_parser::parse_elements;
use super::property_extractor::PropertyExtractor;
use super::response::Response;
use crate::celestial_body::CelestialBody;
use crate::naif::Naif;
use crate::orrery_errors::ParseError;

/// Parse a body and its osculating motion
///
/// Arguments
/// ---------
/// * `content`: raw `Elements` response
///
/// Return
/// ------
/// * the body, with a zero rotation period or obliquity when the page does not publish them
/// * [`ParseError::MissingField`] when the target, the center, the radius, the gravitational
///   parameter or the first elements row cannot be found
pub fn parse_celestial_body(content: &str) -> Result<CelestialBody, ParseError> {
    let response = Response::new(content)?;
    let (name, naif_id) = response.target()?;
    let body_info = response.physical_properties();
    let extractor = PropertyExtractor::for_naif(naif_id, &body_info);

    let moment = parse_elements(&response)?
        .into_iter()
        .next()
        .ok_or(ParseError::MissingField("orbital elements"))?;
    let radius = extractor.radius().ok_or(ParseError::MissingField("radius"))?;
    let (_, center_id) = response.center()?;
    let grav_param = extractor.gm().ok_or(ParseError::MissingField("GM"))?;

    let rotation_period = extractor
        .rotation_period(naif_id, moment.orbital_period())
        .unwrap_or_else(|| {
            warn!("no rotation period for {naif_id}, using 0");
            0.0
        });

    let mut body = CelestialBody::new(Naif::from_id(naif_id), name, grav_param, radius);
    body.rotation_period = rotation_period;
    body.obliquity = extractor.obliquity().unwrap_or(0.0);
    body.center_body_id = Some(center_id);
    body.hill_sphere_rad_rp = extractor.hill_sphere();
    Ok(body.with_motion(moment))
}
