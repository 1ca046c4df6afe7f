//! # Ephemeris
//!
//! A snapshot of celestial bodies arranged as a tree: every satellite is a child of its
//! primary, the root is normally the Sun.
//!
//! ## Overview
//!
//! - [`Ephemeris::new`] sorts the bodies in [`Naif`](crate::naif::Naif) order and attaches each
//!   one to the closest body already placed that it orbits. A body whose primary is missing
//!   yields [`OrreryError::OrphanBody`].
//! - Iteration is breadth first, so a primary is always visited before its satellites.
//! - [`merge_celestial_bodies`] reconciles cached and freshly fetched bodies, keeping for every
//!   id the motion whose epoch is the closest to a reference date.
use std::collections::{BTreeMap, HashMap, VecDeque};

use log::debug;
use nalgebra::Vector3;

use crate::celestial_body::CelestialBody;
use crate::constants::NaifId;
use crate::naif::Naif;
use crate::orrery_errors::OrreryError;
use crate::time::JulianDay;

#[derive(Debug, Clone)]
struct EphemerisNode {
    body: CelestialBody,
    primary: Option<usize>,
    satellites: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Ephemeris {
    nodes: Vec<EphemerisNode>,
    index: HashMap<NaifId, usize>,
    /// Date the motions were last propagated to
    pub timestamp: Option<JulianDay>,
    /// Date the ephemeris was requested for
    pub reference_timestamp: Option<JulianDay>,
}

impl Ephemeris {
    /// Arrange bodies in a tree
    ///
    /// Arguments
    /// ---------
    /// * `bodies`: the bodies, in any order. Duplicated ids keep the last body.
    ///
    /// Return
    /// ------
    /// * the ephemeris rooted at the first body in NAIF order
    /// * [`OrreryError::EmptyEphemeris`] without any body
    /// * [`OrreryError::OrphanBody`] when a body cannot be attached to a primary
    pub fn new(bodies: impl IntoIterator<Item = CelestialBody>) -> Result<Self, OrreryError> {
        let sorted: BTreeMap<Naif, CelestialBody> =
            bodies.into_iter().map(|body| (body.naif, body)).collect();
        if sorted.is_empty() {
            return Err(OrreryError::EmptyEphemeris);
        }

        let mut nodes: Vec<EphemerisNode> = Vec::with_capacity(sorted.len());
        let mut parents: Vec<usize> = Vec::new();
        for (naif, body) in sorted {
            let current = nodes.len();
            let primary = if current == 0 {
                None
            } else {
                while let Some(&parent) = parents.last() {
                    if naif.is_satellite_of(&nodes[parent].body.naif) {
                        break;
                    }
                    parents.pop();
                }
                match parents.last() {
                    Some(&parent) => Some(parent),
                    None => return Err(OrreryError::OrphanBody { satellite: naif.id() }),
                }
            };
            if let Some(parent) = primary {
                nodes[parent].satellites.push(current);
            }
            nodes.push(EphemerisNode {
                body,
                primary,
                satellites: Vec::new(),
            });
            parents.push(current);
        }

        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.body.naif_id(), i))
            .collect();
        Ok(Ephemeris {
            nodes,
            index,
            timestamp: None,
            reference_timestamp: None,
        })
    }

    pub fn with_reference_timestamp(mut self, reference_timestamp: JulianDay) -> Self {
        self.reference_timestamp = Some(reference_timestamp);
        self
    }

    pub fn root(&self) -> &CelestialBody {
        &self.nodes[0].body
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, naif_id: NaifId) -> bool {
        self.index.contains_key(&naif_id)
    }

    pub fn get(&self, naif_id: NaifId) -> Option<&CelestialBody> {
        self.index.get(&naif_id).map(|&i| &self.nodes[i].body)
    }

    /// Body the given one orbits within this ephemeris.
    pub fn primary_of(&self, naif_id: NaifId) -> Option<&CelestialBody> {
        let node = &self.nodes[*self.index.get(&naif_id)?];
        node.primary.map(|i| &self.nodes[i].body)
    }

    pub fn satellites_of(&self, naif_id: NaifId) -> Vec<&CelestialBody> {
        self.index
            .get(&naif_id)
            .map(|&i| {
                self.nodes[i]
                    .satellites
                    .iter()
                    .map(|&s| &self.nodes[s].body)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn breadth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([0]);
        while let Some(current) = queue.pop_front() {
            order.push(current);
            queue.extend(self.nodes[current].satellites.iter().copied());
        }
        order
    }

    /// Bodies in breadth first order, the root first.
    pub fn iter(&self) -> impl Iterator<Item = &CelestialBody> {
        self.breadth_first()
            .into_iter()
            .map(move |i| &self.nodes[i].body)
    }

    /// `(primary, satellite)` id pairs in breadth first order.
    pub fn dependencies(&self) -> Vec<(NaifId, NaifId)> {
        self.breadth_first()
            .into_iter()
            .flat_map(|i| {
                let primary = self.nodes[i].body.naif_id();
                self.nodes[i]
                    .satellites
                    .iter()
                    .map(move |&s| (primary, self.nodes[s].body.naif_id()))
            })
            .collect()
    }

    /// Propagate every body whose motion carries an epoch to `julian_date`.
    ///
    /// On error no body moves and the timestamp is kept.
    pub fn set_julian_date(&mut self, julian_date: JulianDay) -> Result<(), OrreryError> {
        let propagated = self
            .nodes
            .iter()
            .map(|node| {
                let mut body = node.body.clone();
                body.set_julian_date(julian_date).map(|_| body)
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (node, body) in self.nodes.iter_mut().zip(propagated) {
            node.body = body;
        }
        self.timestamp = Some(julian_date);
        Ok(())
    }

    /// Position relative to the root, summing the positions along the chain of primaries.
    pub fn heliocentric_position(&self, naif_id: NaifId) -> Option<Vector3<f64>> {
        let mut current = *self.index.get(&naif_id)?;
        let mut position = Vector3::zeros();
        while let Some(primary) = self.nodes[current].primary {
            if let Some(motion) = self.nodes[current].body.orbital_motion() {
                position += motion.position();
            }
            current = primary;
        }
        Some(position)
    }

    /// Hill sphere of a body, using its primary in this ephemeris.
    pub fn hill_sphere(&self, naif_id: NaifId) -> Option<f64> {
        self.get(naif_id)?.hill_sphere(self.primary_of(naif_id))
    }

    pub fn into_bodies(self) -> Vec<CelestialBody> {
        self.nodes.into_iter().map(|node| node.body).collect()
    }
}

impl<'a> IntoIterator for &'a Ephemeris {
    type Item = &'a CelestialBody;
    type IntoIter = std::vec::IntoIter<&'a CelestialBody>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter().collect::<Vec<_>>().into_iter()
    }
}

/// Keep, for every body, the version whose elements are the closest to a reference date
///
/// Arguments
/// ---------
/// * `cached`: bodies previously stored
/// * `fetched`: bodies freshly parsed from the ephemeris source
/// * `reference`: the date the ephemeris is requested for
///
/// Return
/// ------
/// * the union of both sets, in NAIF order. When an id is present on both sides, the body
///   with an epoch wins over the one without; when both have one, the fetched body replaces
///   the cached one only if its epoch is strictly closer to `reference`.
pub fn merge_celestial_bodies(
    cached: impl IntoIterator<Item = CelestialBody>,
    fetched: impl IntoIterator<Item = CelestialBody>,
    reference: JulianDay,
) -> Vec<CelestialBody> {
    let mut result: BTreeMap<Naif, CelestialBody> =
        cached.into_iter().map(|body| (body.naif, body)).collect();

    for body in fetched {
        let replace = match result.get(&body.naif) {
            None => true,
            Some(current) => {
                let cached_epoch = current.moment().map(|m| m.ephemeris_julian_date());
                let fetched_epoch = body.moment().map(|m| m.ephemeris_julian_date());
                match (cached_epoch, fetched_epoch) {
                    (Some(old), Some(new)) => {
                        (old - reference).abs() > (new - reference).abs()
                    }
                    (None, Some(_)) => true,
                    (Some(_), None) | (None, None) => false,
                }
            }
        };
        if replace {
            debug!("merge: using fetched {}", body.naif);
            result.insert(body.naif, body);
        }
    }
    result.into_values().collect()
}
