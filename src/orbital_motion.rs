//! # Orbital motion
//!
//! Propagation of a body along a fixed [`Orbit`] around a central body of gravitational
//! parameter `GM`.
//!
//! ## Overview
//!
//! An [`OrbitalMotion`] is driven by a [`Phase`]: a mean anomaly, a time since periapsis
//! passage, or a julian date combined with the time of periapsis passage. Every mutator
//! (`set_phase`, `set_mean_anomaly`, `advance_time`, `set_orbit`, …) computes the complete
//! derived state first and only then commits it, so the anomalies, the position and the
//! velocity are always consistent with each other. When the Kepler solver fails the motion is
//! left untouched and the error is returned.
//!
//! State vectors are expressed in the frame of the central body, in meters and meters per
//! second. They are obtained in the perifocal frame and rotated with
//! [`Orientation::rotation`](crate::orbit::Orientation::rotation).
//!
//! [`OrbitalMotion::from_state_vectors`] performs the inverse operation and recovers the
//! classical elements from a position and a velocity.
//!
//! [`OrbitalMotionMoment`] pins a motion to the epoch of the osculating elements it was built
//! from, which is how the ephemeris source delivers them.
use std::fmt;
use std::ops::Deref;

use nalgebra::Vector3;

use crate::constants::{Meter, Radian, Second, DPI};
use crate::kepler::{mean_anomaly_from_time, solve_barker, solve_kepler, true_anomaly};
use crate::orbit::{ConicSection, Orbit, Orientation, EQUATORIAL_TOLERANCE};
use crate::orrery_errors::OrreryError;
use crate::time::JulianDay;

/// Eccentricity under which an orbit extracted from state vectors is taken as circular.
const CIRCULAR_TOLERANCE: f64 = 1e-10;

/// What drives the position of a body along its orbit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Mean anomaly in radians
    MeanAnomaly(Radian),
    /// Seconds elapsed since the periapsis passage
    TimeSincePeriapsis(Second),
    /// Absolute date, needs the time of periapsis passage
    JulianDate(JulianDay),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MotionState {
    mean_anomaly: Radian,
    eccentric_anomaly: Radian,
    true_anomaly: Radian,
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalMotion {
    orbit: Orbit,
    grav_param: f64,
    phase: Phase,
    time_of_periapsis_passage: Option<JulianDay>,
    state: MotionState,
}

/// Mean motion generalised to open orbits, in rad/s.
///
/// For a parabola this is the factor of Barker's equation `sqrt(GM / 2q³)`.
fn mean_motion(shape: &ConicSection, grav_param: f64) -> f64 {
    match *shape {
        ConicSection::Parabola { periapsis } => (grav_param / (2.0 * periapsis.powi(3))).sqrt(),
        _ => (grav_param / shape.semimajor_axis().abs().powi(3)).sqrt(),
    }
}

fn mean_anomaly_after(shape: &ConicSection, grav_param: f64, elapsed: Second) -> Radian {
    if shape.is_closed() {
        mean_anomaly_from_time(elapsed, grav_param, shape.semimajor_axis())
    } else {
        // open orbits never come back, the mean anomaly is not an angle
        elapsed * mean_motion(shape, grav_param)
    }
}

impl OrbitalMotion {
    /// Build a motion at a given phase
    ///
    /// Arguments
    /// ---------
    /// * `orbit`: the orbit followed by the body
    /// * `grav_param`: gravitational parameter of the central body in m³/s²
    /// * `phase`: where the body is along its orbit
    /// * `time_of_periapsis_passage`: required when `phase` is a [`Phase::JulianDate`]
    ///
    /// Return
    /// ------
    /// * the motion with its derived state, or the error of the Kepler solver
    pub fn new(
        orbit: Orbit,
        grav_param: f64,
        phase: Phase,
        time_of_periapsis_passage: Option<JulianDay>,
    ) -> Result<Self, OrreryError> {
        let state = derive_state(&orbit, grav_param, phase, time_of_periapsis_passage)?;
        Ok(OrbitalMotion {
            orbit,
            grav_param,
            phase,
            time_of_periapsis_passage,
            state,
        })
    }

    pub fn from_mean_anomaly(
        orbit: Orbit,
        grav_param: f64,
        mean_anomaly: Radian,
    ) -> Result<Self, OrreryError> {
        OrbitalMotion::new(orbit, grav_param, Phase::MeanAnomaly(mean_anomaly), None)
    }

    /// Recover an orbit from a state vector
    ///
    /// Arguments
    /// ---------
    /// * `grav_param`: gravitational parameter of the central body in m³/s²
    /// * `position`: position relative to the central body in meters
    /// * `velocity`: velocity relative to the central body in m/s
    ///
    /// Return
    /// ------
    /// * a motion whose phase is the mean anomaly of the body at this state.
    ///
    /// Degenerate geometries are resolved as follows:
    /// * equatorial orbits have no ascending node, the argument of periapsis is then measured
    ///   from the x axis (clockwise for retrograde orbits);
    /// * circular orbits have no periapsis, the argument of periapsis is zero and the anomaly is
    ///   measured from the ascending node, or from the x axis when the orbit is also equatorial.
    pub fn from_state_vectors(
        grav_param: f64,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> Result<Self, OrreryError> {
        let r = position.norm();
        let v = velocity.norm();
        if r == 0.0 || !r.is_finite() || !v.is_finite() {
            return Err(OrreryError::InvalidOrbit(format!(
                "degenerate state vector r = {position:?}, v = {velocity:?}"
            )));
        }

        let h = position.cross(velocity);
        let h_norm = h.norm();
        if h_norm == 0.0 {
            return Err(OrreryError::InvalidOrbit(
                "radial trajectory has no orbital plane".into(),
            ));
        }
        let ecc_vec = velocity.cross(&h) / grav_param - position / r;
        let ecc = ecc_vec.norm();
        let node = Vector3::z().cross(&h);
        let node_norm = node.norm();

        let inclination = (h.z / h_norm).clamp(-1.0, 1.0).acos();
        let retrograde = h.z < 0.0;
        let equatorial = node_norm <= EQUATORIAL_TOLERANCE * h_norm;
        let circular = ecc < CIRCULAR_TOLERANCE;

        let longitude_of_ascending_node = if equatorial {
            None
        } else {
            let omega = (node.x / node_norm).clamp(-1.0, 1.0).acos();
            Some(if node.y < 0.0 { DPI - omega } else { omega })
        };

        let argument_of_periapsis = if circular {
            0.0
        } else if equatorial {
            let w = ecc_vec.y.atan2(ecc_vec.x);
            if retrograde {
                -w
            } else {
                w
            }
        } else {
            let w = (node.dot(&ecc_vec) / (node_norm * ecc)).clamp(-1.0, 1.0).acos();
            if ecc_vec.z < 0.0 {
                DPI - w
            } else {
                w
            }
        };

        let true_anom = if circular {
            // argument of latitude, or true longitude for equatorial orbits
            let u = if equatorial {
                let y = if retrograde { -position.y } else { position.y };
                y.atan2(position.x)
            } else {
                let u = (node.dot(position) / (node_norm * r)).clamp(-1.0, 1.0).acos();
                if position.z < 0.0 {
                    DPI - u
                } else {
                    u
                }
            };
            u.rem_euclid(DPI)
        } else {
            let nu = (ecc_vec.dot(position) / (ecc * r)).clamp(-1.0, 1.0).acos();
            match (position.dot(velocity) < 0.0, ecc < 1.0) {
                (true, true) => DPI - nu,
                (true, false) => -nu,
                (false, _) => nu,
            }
        };

        let shape = if circular {
            ConicSection::from_axis(r, 0.0)?
        } else if ecc == 1.0 {
            ConicSection::parabola(h_norm * h_norm / (2.0 * grav_param))
        } else {
            ConicSection::from_axis(1.0 / (2.0 / r - v * v / grav_param), ecc)?
        };
        let orientation = Orientation::new(
            inclination,
            longitude_of_ascending_node,
            argument_of_periapsis,
        )?;

        let mean_anomaly = mean_anomaly_from_true(&shape, true_anom);
        OrbitalMotion::from_mean_anomaly(Orbit::new(shape, orientation), grav_param, mean_anomaly)
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    /// Gravitational parameter of the central body in m³/s².
    pub fn grav_param(&self) -> f64 {
        self.grav_param
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_of_periapsis_passage(&self) -> Option<JulianDay> {
        self.time_of_periapsis_passage
    }

    /// Mean anomaly, within [0, 2π) for closed orbits.
    pub fn mean_anomaly(&self) -> Radian {
        self.state.mean_anomaly
    }

    /// Eccentric anomaly (hyperbolic anomaly for hyperbolas, `tan(ν/2)` for parabolas).
    pub fn eccentric_anomaly(&self) -> Radian {
        self.state.eccentric_anomaly
    }

    pub fn true_anomaly(&self) -> Radian {
        self.state.true_anomaly
    }

    pub fn position(&self) -> Vector3<f64> {
        self.state.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.state.velocity
    }

    /// Replace the phase and re-derive the state.
    pub fn set_phase(&mut self, phase: Phase) -> Result<(), OrreryError> {
        self.state = derive_state(
            &self.orbit,
            self.grav_param,
            phase,
            self.time_of_periapsis_passage,
        )?;
        self.phase = phase;
        Ok(())
    }

    pub fn set_mean_anomaly(&mut self, mean_anomaly: Radian) -> Result<(), OrreryError> {
        self.set_phase(Phase::MeanAnomaly(mean_anomaly))
    }

    pub fn set_time_since_periapsis(&mut self, elapsed: Second) -> Result<(), OrreryError> {
        self.set_phase(Phase::TimeSincePeriapsis(elapsed))
    }

    /// Move the body to an absolute date, the time of periapsis passage must be known.
    pub fn set_julian_date(&mut self, julian_date: JulianDay) -> Result<(), OrreryError> {
        self.set_phase(Phase::JulianDate(julian_date))
    }

    /// Move the body forward (or backward) in time, keeping the kind of phase.
    pub fn advance_time(&mut self, delta: Second) -> Result<(), OrreryError> {
        let phase = match self.phase {
            Phase::MeanAnomaly(mean_anomaly) => Phase::MeanAnomaly(
                mean_anomaly + delta * mean_motion(&self.orbit.shape, self.grav_param),
            ),
            Phase::TimeSincePeriapsis(elapsed) => Phase::TimeSincePeriapsis(elapsed + delta),
            Phase::JulianDate(julian_date) => Phase::JulianDate(julian_date.add_seconds(delta)),
        };
        self.set_phase(phase)
    }

    /// Follow a new orbit from the current phase.
    pub fn set_orbit(&mut self, orbit: Orbit) -> Result<(), OrreryError> {
        self.state = derive_state(
            &orbit,
            self.grav_param,
            self.phase,
            self.time_of_periapsis_passage,
        )?;
        self.orbit = orbit;
        Ok(())
    }

    pub fn set_time_of_periapsis_passage(
        &mut self,
        time_of_periapsis_passage: JulianDay,
    ) -> Result<(), OrreryError> {
        self.state = derive_state(
            &self.orbit,
            self.grav_param,
            self.phase,
            Some(time_of_periapsis_passage),
        )?;
        self.time_of_periapsis_passage = Some(time_of_periapsis_passage);
        Ok(())
    }

    /// Position and velocity in the perifocal frame
    ///
    /// Arguments
    /// ---------
    /// * `true_anomaly`: true anomaly in radians
    ///
    /// Return
    /// ------
    /// * position (m) and velocity (m/s), periapsis along +x and the angular momentum along +z
    pub fn unrotated_state_vectors(&self, true_anomaly: Radian) -> (Vector3<f64>, Vector3<f64>) {
        perifocal_state(&self.orbit.shape, self.grav_param, true_anomaly)
    }

    /// Position and velocity in the central body frame at any true anomaly, without mutating
    /// the motion.
    pub fn state_vectors(&self, true_anomaly: Radian) -> (Vector3<f64>, Vector3<f64>) {
        let (position, velocity) = self.unrotated_state_vectors(true_anomaly);
        let rotation = self.orbit.orientation.rotation();
        (rotation * position, rotation * velocity)
    }

    /// Same as [`OrbitalMotion::state_vectors`], from a mean anomaly.
    pub fn state_vectors_from_mean_anomaly(
        &self,
        mean_anomaly: Radian,
    ) -> Result<(Vector3<f64>, Vector3<f64>), OrreryError> {
        let (_, true_anom) = anomalies(&self.orbit.shape, mean_anomaly)?;
        Ok(self.state_vectors(true_anom))
    }

    /// Distance to the center of the central body in meters.
    pub fn distance(&self) -> Meter {
        self.state.position.norm()
    }

    pub fn speed(&self) -> f64 {
        self.state.velocity.norm()
    }

    /// `v²/2 − GM/r`, negative for bound orbits.
    pub fn specific_mechanical_energy(&self) -> f64 {
        self.speed().powi(2) / 2.0 - self.grav_param / self.distance()
    }

    /// Period in seconds, `None` for parabolic orbits.
    pub fn orbital_period(&self) -> Option<Second> {
        self.orbit.orbital_period(self.grav_param)
    }

    /// Seconds elapsed since the last periapsis passage (since the only one for open orbits).
    pub fn time_since_periapsis(&self) -> Second {
        self.state.mean_anomaly / mean_motion(&self.orbit.shape, self.grav_param)
    }

    /// Altitude of the periapsis above a body of radius `radius` (m).
    pub fn periapsis_altitude(&self, radius: Meter) -> Meter {
        self.orbit.shape.periapsis() - radius
    }

    /// Altitude of the apoapsis above a body of radius `radius` (m), `None` for open orbits.
    pub fn apoapsis_altitude(&self, radius: Meter) -> Option<Meter> {
        self.orbit.shape.apoapsis().map(|apoapsis| apoapsis - radius)
    }
}

impl fmt::Display for OrbitalMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at M = {} (r = {:?}, v = {:?})",
            self.orbit,
            self.state.mean_anomaly,
            self.state.position.as_slice(),
            self.state.velocity.as_slice()
        )
    }
}

fn perifocal_state(
    shape: &ConicSection,
    grav_param: f64,
    true_anomaly: Radian,
) -> (Vector3<f64>, Vector3<f64>) {
    let e = shape.eccentricity();
    let p = shape.semilatus_rectum().abs();
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();
    let r = p / (1.0 + e * cos_nu);
    let speed_factor = (grav_param / p).sqrt();
    (
        Vector3::new(r * cos_nu, r * sin_nu, 0.0),
        Vector3::new(-speed_factor * sin_nu, speed_factor * (e + cos_nu), 0.0),
    )
}

/// Eccentric (or hyperbolic, or parabolic) anomaly and true anomaly for a mean anomaly.
fn anomalies(shape: &ConicSection, mean_anomaly: Radian) -> Result<(Radian, Radian), OrreryError> {
    match *shape {
        ConicSection::Circle { .. } => Ok((mean_anomaly, mean_anomaly)),
        ConicSection::Parabola { .. } => {
            let d = solve_barker(mean_anomaly);
            Ok((d, 2.0 * d.atan()))
        }
        _ => {
            let e = shape.eccentricity();
            let ecc_anom = solve_kepler(e, mean_anomaly)?;
            Ok((ecc_anom, true_anomaly(e, ecc_anom)))
        }
    }
}

fn mean_anomaly_from_true(shape: &ConicSection, true_anom: Radian) -> Radian {
    let e = shape.eccentricity();
    match shape {
        ConicSection::Circle { .. } => true_anom,
        ConicSection::Ellipse { .. } => {
            let ecc_anom =
                2.0 * ((1.0 - e).sqrt() * (true_anom / 2.0).sin())
                    .atan2((1.0 + e).sqrt() * (true_anom / 2.0).cos());
            (ecc_anom - e * ecc_anom.sin()).rem_euclid(DPI)
        }
        ConicSection::Parabola { .. } => {
            let d = (true_anom / 2.0).tan();
            d + d.powi(3) / 3.0
        }
        ConicSection::Hyperbola { .. } => {
            let h = 2.0 * (((e - 1.0) / (e + 1.0)).sqrt() * (true_anom / 2.0).tan()).atanh();
            e * h.sinh() - h
        }
    }
}

fn derive_state(
    orbit: &Orbit,
    grav_param: f64,
    phase: Phase,
    time_of_periapsis_passage: Option<JulianDay>,
) -> Result<MotionState, OrreryError> {
    let shape = &orbit.shape;
    let mean_anomaly = match phase {
        Phase::MeanAnomaly(mean_anomaly) if shape.is_closed() => mean_anomaly.rem_euclid(DPI),
        Phase::MeanAnomaly(mean_anomaly) => mean_anomaly,
        Phase::TimeSincePeriapsis(elapsed) => mean_anomaly_after(shape, grav_param, elapsed),
        Phase::JulianDate(julian_date) => {
            let tp = time_of_periapsis_passage.ok_or_else(|| {
                OrreryError::InvalidOrbit(
                    "a julian date phase needs the time of periapsis passage".into(),
                )
            })?;
            mean_anomaly_after(shape, grav_param, julian_date - tp)
        }
    };
    let (eccentric_anomaly, true_anom) = anomalies(shape, mean_anomaly)?;
    let (position, velocity) = perifocal_state(shape, grav_param, true_anom);
    let rotation = orbit.orientation.rotation();
    Ok(MotionState {
        mean_anomaly,
        eccentric_anomaly,
        true_anomaly: true_anom,
        position: rotation * position,
        velocity: rotation * velocity,
    })
}

/// An [`OrbitalMotion`] built from osculating elements valid at `ephemeris_julian_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalMotionMoment {
    motion: OrbitalMotion,
    ephemeris_julian_date: JulianDay,
}

impl OrbitalMotionMoment {
    /// Arguments
    /// ---------
    /// * `orbit`: osculating orbit at `julian_date`
    /// * `grav_param`: gravitational parameter of the central body in m³/s²
    /// * `julian_date`: epoch of the elements, the motion starts there
    /// * `time_of_periapsis_passage`: julian date of the periapsis passage
    pub fn new(
        orbit: Orbit,
        grav_param: f64,
        julian_date: JulianDay,
        time_of_periapsis_passage: JulianDay,
    ) -> Result<Self, OrreryError> {
        Ok(OrbitalMotionMoment {
            motion: OrbitalMotion::new(
                orbit,
                grav_param,
                Phase::JulianDate(julian_date),
                Some(time_of_periapsis_passage),
            )?,
            ephemeris_julian_date: julian_date,
        })
    }

    /// Epoch of the osculating elements.
    pub fn ephemeris_julian_date(&self) -> JulianDay {
        self.ephemeris_julian_date
    }

    /// Propagate to `julian_date`, the epoch of the elements is kept.
    pub fn set_julian_date(&mut self, julian_date: JulianDay) -> Result<(), OrreryError> {
        self.motion.set_julian_date(julian_date)
    }

    pub fn motion(&self) -> &OrbitalMotion {
        &self.motion
    }

    pub fn into_motion(self) -> OrbitalMotion {
        self.motion
    }
}

impl Deref for OrbitalMotionMoment {
    type Target = OrbitalMotion;

    fn deref(&self) -> &OrbitalMotion {
        &self.motion
    }
}
