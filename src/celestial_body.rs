//! # Celestial bodies
//!
//! Physical description of a body identified by its [`Naif`] code, together with the motion
//! around its primary when it is known.
//!
//! Two bodies are equal when they share the same NAIF id, whatever their physical data or
//! motion. The ordering is the [`Naif`] ordering.
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::constants::{Meter, NaifId, Radian, Second, GRAV_CONSTANT, SUN_MASS, SUN_RADIUS};
use crate::naif::Naif;
use crate::orbital_motion::{OrbitalMotion, OrbitalMotionMoment};
use crate::orrery_errors::OrreryError;
use crate::time::JulianDay;

/// Motion of a body around its primary.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyMotion {
    /// Motion without a reference epoch
    Plain(OrbitalMotion),
    /// Osculating elements valid at a given epoch
    Moment(OrbitalMotionMoment),
}

impl BodyMotion {
    pub fn motion(&self) -> &OrbitalMotion {
        match self {
            BodyMotion::Plain(motion) => motion,
            BodyMotion::Moment(moment) => moment.motion(),
        }
    }

    pub fn moment(&self) -> Option<&OrbitalMotionMoment> {
        match self {
            BodyMotion::Plain(_) => None,
            BodyMotion::Moment(moment) => Some(moment),
        }
    }

    /// Epoch of the elements, only known for a moment.
    pub fn epoch(&self) -> Option<JulianDay> {
        self.moment().map(OrbitalMotionMoment::ephemeris_julian_date)
    }

    /// Propagate a moment to `julian_date`, a plain motion is left as is.
    pub fn set_julian_date(&mut self, julian_date: JulianDay) -> Result<(), OrreryError> {
        match self {
            BodyMotion::Plain(_) => Ok(()),
            BodyMotion::Moment(moment) => moment.set_julian_date(julian_date),
        }
    }
}

impl From<OrbitalMotion> for BodyMotion {
    fn from(motion: OrbitalMotion) -> Self {
        BodyMotion::Plain(motion)
    }
}

impl From<OrbitalMotionMoment> for BodyMotion {
    fn from(moment: OrbitalMotionMoment) -> Self {
        BodyMotion::Moment(moment)
    }
}

#[derive(Debug, Clone)]
pub struct CelestialBody {
    pub naif: Naif,
    pub name: String,
    /// Gravitational parameter in m³/s²
    pub grav_param: f64,
    /// Mean radius in meters
    pub radius: Meter,
    /// Sidereal rotation period in seconds
    pub rotation_period: Second,
    /// Obliquity to orbit in radians
    pub obliquity: Radian,
    pub center_body_id: Option<NaifId>,
    /// Hill sphere radius expressed in body radii, when published by the source
    pub hill_sphere_rad_rp: Option<f64>,
    pub motion: Option<BodyMotion>,
}

impl CelestialBody {
    /// A body without motion, rotation nor obliquity.
    pub fn new(naif: Naif, name: impl Into<String>, grav_param: f64, radius: Meter) -> Self {
        CelestialBody {
            naif,
            name: name.into(),
            grav_param,
            radius,
            rotation_period: 0.0,
            obliquity: 0.0,
            center_body_id: None,
            hill_sphere_rad_rp: None,
            motion: None,
        }
    }

    pub fn from_mass(naif: Naif, name: impl Into<String>, mass: f64, radius: Meter) -> Self {
        CelestialBody::new(naif, name, mass * GRAV_CONSTANT, radius)
    }

    /// The Sun, root of every ephemeris.
    pub fn sun() -> Self {
        CelestialBody::from_mass(Naif::Sun, "Sun", SUN_MASS, SUN_RADIUS)
    }

    pub fn naif_id(&self) -> NaifId {
        self.naif.id()
    }

    /// Mass in kilograms.
    pub fn mass(&self) -> f64 {
        self.grav_param / GRAV_CONSTANT
    }

    pub fn with_motion(mut self, motion: impl Into<BodyMotion>) -> Self {
        self.motion = Some(motion.into());
        self
    }

    pub fn orbital_motion(&self) -> Option<&OrbitalMotion> {
        self.motion.as_ref().map(BodyMotion::motion)
    }

    pub fn moment(&self) -> Option<&OrbitalMotionMoment> {
        self.motion.as_ref().and_then(BodyMotion::moment)
    }

    /// Radius of the Hill sphere in meters
    ///
    /// Arguments
    /// ---------
    /// * `primary`: the body this one orbits
    ///
    /// Return
    /// ------
    /// * `hill_sphere_rad_rp × radius` when the source publishes it, otherwise the approximation
    ///   `distance × radius / primary.radius`. `None` when neither is available.
    pub fn hill_sphere(&self, primary: Option<&CelestialBody>) -> Option<Meter> {
        if let Some(rad_rp) = self.hill_sphere_rad_rp {
            return Some(rad_rp * self.radius);
        }
        let distance = self.orbital_motion()?.distance();
        primary.map(|primary| distance * self.radius / primary.radius)
    }

    pub fn set_julian_date(&mut self, julian_date: JulianDay) -> Result<(), OrreryError> {
        match self.motion.as_mut() {
            Some(motion) => motion.set_julian_date(julian_date),
            None => Ok(()),
        }
    }
}

impl PartialEq for CelestialBody {
    fn eq(&self, other: &Self) -> bool {
        self.naif == other.naif
    }
}

impl Eq for CelestialBody {}

impl Hash for CelestialBody {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.naif.hash(state);
    }
}

impl Ord for CelestialBody {
    fn cmp(&self, other: &Self) -> Ordering {
        self.naif.cmp(&other.naif)
    }
}

impl PartialOrd for CelestialBody {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CelestialBody {{ naif: {}, name: {}, radius(m): {}, rotation period(s): {}, \
             obliquity(rad): {}, gm: {} }}",
            self.naif_id(),
            self.name,
            self.radius,
            self.rotation_period,
            self.obliquity,
            self.grav_param
        )
    }
}
