//! # Ephemeris cache
//!
//! [`EphemerisStore`] is the persistence seam of the façade: bodies, their osculating moments
//! and rise-transit-set rows. [`InMemoryStore`] is the bundled implementation.
//!
//! Bodies are stored without their motion, moments are stored separately and keyed by
//! `(body id, epoch)`: saving a moment for an existing key replaces it. Loading a moment picks
//! the one whose epoch is the closest to the requested date, so a cache filled over several
//! years still answers with the most relevant elements.
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use log::debug;

use crate::celestial_body::CelestialBody;
use crate::constants::NaifId;
use crate::observer_info::RiseTransitSetInfo;
use crate::orbital_motion::OrbitalMotionMoment;
use crate::orrery_errors::OrreryError;
use crate::time::JulianDay;

pub trait EphemerisStore: Send + Sync + 'static {
    /// Store the physical data of a body, its motion is ignored.
    fn save_body(&self, body: &CelestialBody) -> Result<(), OrreryError>;

    fn save_moment(&self, moment: &OrbitalMotionMoment, body_id: NaifId)
        -> Result<(), OrreryError>;

    fn load_body(&self, naif_id: NaifId) -> Result<Option<CelestialBody>, OrreryError>;

    /// The moment of `body_id` whose epoch is the closest to `optimal_epoch`.
    fn load_moment(
        &self,
        body_id: NaifId,
        optimal_epoch: JulianDay,
    ) -> Result<Option<OrbitalMotionMoment>, OrreryError>;

    fn save_rts(&self, infos: &[RiseTransitSetInfo]) -> Result<(), OrreryError>;

    /// Rows of `naif_id` with `jd_start <= date <= jd_end`, in date order.
    fn load_rts(
        &self,
        naif_id: NaifId,
        jd_start: JulianDay,
        jd_end: JulianDay,
    ) -> Result<Vec<RiseTransitSetInfo>, OrreryError>;

    /// A body with its closest moment attached, the Sun is returned without motion.
    fn load_body_at(
        &self,
        naif_id: NaifId,
        optimal_epoch: JulianDay,
    ) -> Result<Option<CelestialBody>, OrreryError> {
        let Some(body) = self.load_body(naif_id)? else {
            return Ok(None);
        };
        Ok(Some(match self.load_moment(naif_id, optimal_epoch)? {
            Some(moment) => body.with_motion(moment),
            None => body,
        }))
    }
}

type MomentKey = (NaifId, u64);
type RtsKey = (NaifId, u64, u64, u64);

fn rts_key(info: &RiseTransitSetInfo) -> RtsKey {
    (
        info.info.naif_id,
        info.info.julian_day.value().to_bits(),
        info.info.location.latitude.to_bits(),
        info.info.location.longitude.to_bits(),
    )
}

/// Process local store, every write goes through a lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    bodies: RwLock<HashMap<NaifId, CelestialBody>>,
    moments: RwLock<HashMap<MomentKey, OrbitalMotionMoment>>,
    rts: RwLock<HashMap<RtsKey, RiseTransitSetInfo>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    pub fn body_count(&self) -> usize {
        self.bodies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn moment_count(&self, body_id: NaifId) -> usize {
        self.moments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(id, _)| *id == body_id)
            .count()
    }
}

impl EphemerisStore for InMemoryStore {
    fn save_body(&self, body: &CelestialBody) -> Result<(), OrreryError> {
        let mut stored = body.clone();
        stored.motion = None;
        self.bodies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(body.naif_id(), stored);
        Ok(())
    }

    fn save_moment(
        &self,
        moment: &OrbitalMotionMoment,
        body_id: NaifId,
    ) -> Result<(), OrreryError> {
        let epoch = moment.ephemeris_julian_date();
        debug!("caching moment of {body_id} at {epoch}");
        self.moments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((body_id, epoch.value().to_bits()), moment.clone());
        Ok(())
    }

    fn load_body(&self, naif_id: NaifId) -> Result<Option<CelestialBody>, OrreryError> {
        Ok(self
            .bodies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&naif_id)
            .cloned())
    }

    fn load_moment(
        &self,
        body_id: NaifId,
        optimal_epoch: JulianDay,
    ) -> Result<Option<OrbitalMotionMoment>, OrreryError> {
        let moments = self.moments.read().unwrap_or_else(PoisonError::into_inner);
        Ok(moments
            .iter()
            .filter(|((id, _), _)| *id == body_id)
            .map(|(_, moment)| moment)
            .min_by(|a, b| {
                let distance = |m: &OrbitalMotionMoment| {
                    (m.ephemeris_julian_date() - optimal_epoch).abs()
                };
                distance(a).total_cmp(&distance(b))
            })
            .cloned())
    }

    fn save_rts(&self, infos: &[RiseTransitSetInfo]) -> Result<(), OrreryError> {
        let mut rts = self.rts.write().unwrap_or_else(PoisonError::into_inner);
        for info in infos {
            rts.insert(rts_key(info), *info);
        }
        Ok(())
    }

    fn load_rts(
        &self,
        naif_id: NaifId,
        jd_start: JulianDay,
        jd_end: JulianDay,
    ) -> Result<Vec<RiseTransitSetInfo>, OrreryError> {
        let rts = self.rts.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<RiseTransitSetInfo> = rts
            .values()
            .filter(|row| {
                row.info.naif_id == naif_id
                    && row.info.julian_day >= jd_start
                    && row.info.julian_day <= jd_end
            })
            .copied()
            .collect();
        rows.sort_by(|a, b| {
            a.info
                .julian_day
                .value()
                .total_cmp(&b.info.julian_day.value())
        });
        Ok(rows)
    }
}

#[cfg(test)]
mod cache_test {
    use super::*;
    use crate::coordinates::GeodeticLocation;
    use crate::naif::Naif;
    use crate::observer_info::ObserverInfo;
    use crate::orbit::Orbit;

    fn moment(epoch: f64, semimajor_axis: f64) -> OrbitalMotionMoment {
        let orbit = Orbit::from_elements(semimajor_axis, 0.1, 0.0, None, 0.0).unwrap();
        let jd = JulianDay::new(epoch);
        OrbitalMotionMoment::new(orbit, 1.327e20, jd, jd).unwrap()
    }

    fn rts_row(jd: f64, flag: &str) -> RiseTransitSetInfo {
        RiseTransitSetInfo {
            info: ObserverInfo::new(
                301,
                JulianDay::new(jd),
                GeodeticLocation::new(37.5, -122.25, 100.0),
                "",
                flag,
            )
            .unwrap(),
            azimuth: 120.0,
            elevation: 10.0,
        }
    }

    #[test]
    fn test_body_is_stored_without_motion() {
        let store = InMemoryStore::new();
        let mars = CelestialBody::new(Naif::from_id(499), "Mars", 4.28e13, 3.3899e6)
            .with_motion(moment(2457754.5, 2.279e11));
        store.save_body(&mars).unwrap();
        let loaded = store.load_body(499).unwrap().unwrap();
        assert_eq!(loaded.name, "Mars");
        assert!(loaded.motion.is_none());
        assert!(store.load_body(599).unwrap().is_none());
    }

    #[test]
    fn test_closest_moment() {
        let store = InMemoryStore::new();
        store.save_moment(&moment(2457754.5, 2.279e11), 499).unwrap();
        store.save_moment(&moment(2458119.5, 2.279e11), 499).unwrap();
        store.save_moment(&moment(2458119.5, 2.280e11), 499).unwrap();
        assert_eq!(store.moment_count(499), 2);

        let closest = store
            .load_moment(499, JulianDay::new(2458000.0))
            .unwrap()
            .unwrap();
        assert_eq!(closest.ephemeris_julian_date(), JulianDay::new(2458119.5));
        // same key replaced
        assert_eq!(closest.orbit().shape.semimajor_axis(), 2.280e11);
        assert!(store
            .load_moment(599, JulianDay::new(2458000.0))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_body_at() {
        let store = InMemoryStore::new();
        store.save_body(&CelestialBody::sun()).unwrap();
        store
            .save_body(&CelestialBody::new(Naif::from_id(499), "Mars", 4.28e13, 3.3899e6))
            .unwrap();
        store.save_moment(&moment(2457754.5, 2.279e11), 499).unwrap();

        let epoch = JulianDay::new(2457754.5);
        let mars = store.load_body_at(499, epoch).unwrap().unwrap();
        assert_eq!(mars.moment().map(|m| m.ephemeris_julian_date()), Some(epoch));
        let sun = store.load_body_at(10, epoch).unwrap().unwrap();
        assert!(sun.motion.is_none());
    }

    #[test]
    fn test_rts_window() {
        let store = InMemoryStore::new();
        store
            .save_rts(&[rts_row(2440589.3, "s"), rts_row(2440588.9, "r"), rts_row(2440591.0, "t")])
            .unwrap();
        store.save_rts(&[rts_row(2440588.9, "r")]).unwrap();

        let rows = store
            .load_rts(301, JulianDay::new(2440588.5), JulianDay::new(2440589.5))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].info.julian_day, JulianDay::new(2440588.9));
        assert_eq!(rows[1].info.julian_day, JulianDay::new(2440589.3));
        assert!(store
            .load_rts(10, JulianDay::new(0.0), JulianDay::new(3e6))
            .unwrap()
            .is_empty());
    }
}
