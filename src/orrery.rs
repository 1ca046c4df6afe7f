//! # Orrery service
//!
//! [`Orrery`] is the entry point of the crate: it owns the ephemeris source, the cache and the
//! configuration, and turns a request for a set of bodies into an [`Ephemeris`].
//!
//! ## Overview
//!
//! ```text
//!  request ──► cache ──(snapshot)──► updates
//!                │
//!                └─► HorizonsQuery ─► fetch ─► parse ─► save ─► merge ─► Ephemeris ──► updates
//! ```
//!
//! The [`FetchMode`] of a request decides which of the two paths run:
//!
//! | Mode          | Cache read | Network | Completes with                     |
//! |---------------|------------|---------|------------------------------------|
//! | `LocalOnly`   | yes        | never   | the cached snapshot, if any        |
//! | `PreferLocal` | yes        | on miss | the cached snapshot when non empty |
//! | `OnlineOnly`  | no         | always  | the fetched bodies                 |
//! | `Mixed`       | yes        | always  | cached and fetched bodies merged   |
//!
//! Failures never abort a request: every failed query, unparsable response or cache error is
//! collected in the completion next to the best ephemeris that could be built.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orrery::{cache::InMemoryStore, config::OrreryConfig, env_state::OrreryEnv};
//! use orrery::{naif::Naif, orrery::{EphemerisRequest, Orrery}, time::JulianDay};
//!
//! let config = OrreryConfig::default();
//! let env = OrreryEnv::new(config.clone())?;
//! let orrery = Orrery::new(Arc::new(env), Arc::new(InMemoryStore::new()), config);
//!
//! let date = JulianDay::from_gregorian(2017, 1, 1, 0, 0, 0.0)?;
//! let request = orrery.request(vec![Naif::Sun, Naif::from_id(399), Naif::from_id(301)], date);
//! let completion = orrery.fetch_ephemeris(&request, None).await;
//! ```
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::cache::EphemerisStore;
use crate::celestial_body::CelestialBody;
use crate::config::{FetchMode, OrreryConfig};
use crate::constants::{Degree, NaifId};
use crate::coordinates::GeodeticLocation;
use crate::ephemeris::{merge_celestial_bodies, Ephemeris};
use crate::horizons::body_parser::parse_celestial_body;
use crate::horizons::fetch::{fetch_queries, FetchCancellation, HorizonsSource};
use crate::horizons::observer_parser::parse_rise_transit_set;
use crate::horizons::query::HorizonsQuery;
use crate::naif::Naif;
use crate::observer_info::{ObserverSite, RiseTransitSetElevation};
use crate::orrery_errors::OrreryError;
use crate::time::JulianDay;

/// What to fetch, for which date, and how.
#[derive(Debug, Clone)]
pub struct EphemerisRequest {
    pub naifs: Vec<Naif>,
    pub date: JulianDay,
    pub mode: FetchMode,
    pub cancellation: FetchCancellation,
}

impl EphemerisRequest {
    pub fn new(naifs: Vec<Naif>, date: JulianDay) -> Self {
        EphemerisRequest {
            naifs,
            date,
            mode: FetchMode::default(),
            cancellation: FetchCancellation::new(),
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cancellation(mut self, cancellation: FetchCancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    fn wants_sun(&self) -> bool {
        self.naifs.contains(&Naif::Sun)
    }

    /// Requested ids without duplicates, in NAIF order.
    fn distinct_naifs(&self) -> BTreeSet<Naif> {
        self.naifs.iter().copied().collect()
    }
}

/// Final state of an ephemeris request, produced exactly once.
#[derive(Debug)]
pub struct EphemerisCompletion {
    pub ephemeris: Option<Ephemeris>,
    pub errors: Vec<OrreryError>,
}

/// Final state of a rise-transit-set request.
#[derive(Debug)]
pub struct RiseTransitSetCompletion {
    pub elevations: HashMap<NaifId, RiseTransitSetElevation>,
    pub errors: Vec<OrreryError>,
}

pub struct Orrery<S: HorizonsSource, C: EphemerisStore> {
    source: Arc<S>,
    store: Arc<C>,
    config: OrreryConfig,
}

impl<S: HorizonsSource, C: EphemerisStore> Orrery<S, C> {
    pub fn new(source: Arc<S>, store: Arc<C>, config: OrreryConfig) -> Self {
        Orrery {
            source,
            store,
            config,
        }
    }

    pub fn config(&self) -> &OrreryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<C> {
        &self.store
    }

    /// A request using the configured fetch mode.
    pub fn request(&self, naifs: Vec<Naif>, date: JulianDay) -> EphemerisRequest {
        EphemerisRequest::new(naifs, date).with_mode(self.config.fetch_mode)
    }

    /// Build the ephemeris of the requested bodies
    ///
    /// Arguments
    /// ---------
    /// * `request`: bodies, reference date, fetch mode and cancellation flag
    /// * `updates`: receives the cached snapshot, when there is one, and the merged ephemeris
    ///
    /// Return
    /// ------
    /// * the last ephemeris sent to `updates` (or the one that would have been sent) and every
    ///   error met on the way. `ephemeris` is `None` when no body could be gathered.
    pub async fn fetch_ephemeris(
        &self,
        request: &EphemerisRequest,
        updates: Option<&UnboundedSender<Ephemeris>>,
    ) -> EphemerisCompletion {
        let mut errors = Vec::new();
        let date = request.date;

        let cached = if request.mode.reads_cache() {
            self.load_cached_bodies(request, &mut errors)
        } else {
            Vec::new()
        };

        if cached.is_empty() && request.mode == FetchMode::LocalOnly {
            info!("no cached body for the request, nothing to do offline");
            return EphemerisCompletion {
                ephemeris: None,
                errors,
            };
        }

        if !cached.is_empty() {
            let snapshot = assemble(with_sun(cached.clone(), request), date, &mut errors);
            publish(updates, snapshot.as_ref());
            if matches!(request.mode, FetchMode::PreferLocal | FetchMode::LocalOnly) {
                return EphemerisCompletion {
                    ephemeris: snapshot,
                    errors,
                };
            }
        }

        let queries = HorizonsQuery::ephemeris_query(&request.naifs, date);
        let outcome = fetch_queries(
            Arc::clone(&self.source),
            queries,
            self.config.fetch_strategy,
            self.config.retry_policy(),
            &request.cancellation,
        )
        .await;
        errors.extend(outcome.errors.into_iter().map(OrreryError::from));

        let mut raw: Vec<(NaifId, String)> = outcome.raw.into_iter().collect();
        raw.sort_by_key(|(naif_id, _)| *naif_id);
        let mut fetched = Vec::with_capacity(raw.len());
        for (naif_id, content) in raw {
            match parse_celestial_body(&content) {
                Ok(body) => {
                    self.save_body(&body, &mut errors);
                    fetched.push(body);
                }
                Err(source) => {
                    warn!("unable to parse the response for {naif_id}: {source}");
                    errors.push(OrreryError::BodyParse { naif_id, source });
                }
            }
        }

        let merged = merge_celestial_bodies(cached, fetched, date);
        let ephemeris = assemble(with_sun(merged, request), date, &mut errors);
        publish(updates, ephemeris.as_ref());
        info!(
            "ephemeris request done: {} bod(ies), {} error(s)",
            ephemeris.as_ref().map_or(0, Ephemeris::len),
            errors.len()
        );
        EphemerisCompletion { ephemeris, errors }
    }

    /// Next rise, transit and set of the observed bodies
    ///
    /// Arguments
    /// ---------
    /// * `site`: where the observer stands
    /// * `date`: any instant of the local day of interest
    /// * `utc_offset`: offset of the observer time zone, in seconds
    /// * `mode`: cache policy, same meaning as for [`Orrery::fetch_ephemeris`]
    /// * `cancellation`: flag of the network part
    ///
    /// Return
    /// ------
    /// * the summaries found in the local day, by target id, and the errors met
    pub async fn fetch_rise_transit_set_elevation(
        &self,
        site: ObserverSite,
        date: JulianDay,
        utc_offset: f64,
        mode: FetchMode,
        cancellation: &FetchCancellation,
    ) -> RiseTransitSetCompletion {
        let mut errors = Vec::new();
        let queries = HorizonsQuery::rts_queries(site, date);
        let targets: Vec<NaifId> = queries.iter().map(|query| query.command).collect();
        let window = RiseTransitSetElevation::day_window(date, utc_offset);

        let mut elevations = if mode.reads_cache() {
            self.load_elevations(&targets, site, window, &mut errors)
        } else {
            HashMap::new()
        };
        let complete = targets.iter().all(|id| elevations.contains_key(id));
        if mode == FetchMode::LocalOnly || (mode == FetchMode::PreferLocal && complete) {
            return RiseTransitSetCompletion { elevations, errors };
        }

        let outcome = fetch_queries(
            Arc::clone(&self.source),
            queries,
            self.config.fetch_strategy,
            self.config.retry_policy(),
            cancellation,
        )
        .await;
        errors.extend(outcome.errors.into_iter().map(OrreryError::from));

        for (naif_id, content) in outcome.raw {
            match parse_rise_transit_set(&content) {
                Ok(rows) => {
                    if let Err(e) = self.store.save_rts(&rows) {
                        errors.push(e);
                    }
                }
                Err(source) => {
                    warn!("unable to parse the rise-transit-set table of {naif_id}: {source}");
                    errors.push(OrreryError::BodyParse { naif_id, source });
                }
            }
        }
        elevations.extend(self.load_elevations(&targets, site, window, &mut errors));
        RiseTransitSetCompletion { elevations, errors }
    }

    /// Cached bodies with their moment closest to the request date, the Sun excluded.
    fn load_cached_bodies(
        &self,
        request: &EphemerisRequest,
        errors: &mut Vec<OrreryError>,
    ) -> Vec<CelestialBody> {
        request
            .distinct_naifs()
            .into_iter()
            .filter(|naif| *naif != Naif::Sun)
            .filter_map(|naif| match self.store.load_body_at(naif.id(), request.date) {
                Ok(body) => body,
                Err(e) => {
                    warn!("cache read failed for {naif}: {e}");
                    errors.push(e);
                    None
                }
            })
            .collect()
    }

    fn save_body(&self, body: &CelestialBody, errors: &mut Vec<OrreryError>) {
        let saved = self.store.save_body(body).and_then(|()| match body.moment() {
            Some(moment) => self.store.save_moment(moment, body.naif_id()),
            None => Ok(()),
        });
        if let Err(e) = saved {
            warn!("cache write failed for {}: {e}", body.naif);
            errors.push(e);
        }
    }

    fn load_elevations(
        &self,
        targets: &[NaifId],
        site: ObserverSite,
        (start, end): (JulianDay, JulianDay),
        errors: &mut Vec<OrreryError>,
    ) -> HashMap<NaifId, RiseTransitSetElevation> {
        let mut elevations = HashMap::new();
        for &naif_id in targets {
            match self.store.load_rts(naif_id, start, end) {
                Ok(rows) => {
                    let rows: Vec<_> = rows
                        .into_iter()
                        .filter(|row| same_place(row.info.location, site.location))
                        .collect();
                    if let Some(elevation) = RiseTransitSetElevation::from_infos(&rows) {
                        elevations.insert(naif_id, elevation);
                    }
                }
                Err(e) => errors.push(e),
            }
        }
        elevations
    }
}

/// Horizons echoes the site coordinates with fewer digits than requested.
fn same_place(a: GeodeticLocation, b: GeodeticLocation) -> bool {
    const TOLERANCE: Degree = 1e-6;
    (a.latitude - b.latitude).abs() < TOLERANCE && (a.longitude - b.longitude).abs() < TOLERANCE
}

fn with_sun(mut bodies: Vec<CelestialBody>, request: &EphemerisRequest) -> Vec<CelestialBody> {
    if request.wants_sun() && !bodies.iter().any(|body| body.naif == Naif::Sun) {
        bodies.push(CelestialBody::sun());
    }
    bodies
}

/// Ephemeris propagated to `date`. Bodies whose primary is missing are dropped.
fn assemble(
    mut bodies: Vec<CelestialBody>,
    date: JulianDay,
    errors: &mut Vec<OrreryError>,
) -> Option<Ephemeris> {
    loop {
        match Ephemeris::new(bodies.clone()) {
            Ok(ephemeris) => {
                let mut ephemeris = ephemeris.with_reference_timestamp(date);
                if let Err(e) = ephemeris.set_julian_date(date) {
                    warn!("unable to propagate the ephemeris to {date}: {e}");
                    errors.push(e);
                }
                return Some(ephemeris);
            }
            Err(OrreryError::OrphanBody { satellite }) => {
                warn!("dropping {satellite}, its primary is not part of the ephemeris");
                bodies.retain(|body| body.naif_id() != satellite);
                errors.push(OrreryError::OrphanBody { satellite });
            }
            Err(e) => {
                debug!("no ephemeris: {e}");
                return None;
            }
        }
    }
}

fn publish(updates: Option<&UnboundedSender<Ephemeris>>, ephemeris: Option<&Ephemeris>) {
    if let (Some(updates), Some(ephemeris)) = (updates, ephemeris) {
        if updates.send(ephemeris.clone()).is_err() {
            debug!("ephemeris update dropped, no receiver");
        }
    }
}
