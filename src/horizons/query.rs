//! # Horizons batch queries
//!
//! Builds the `horizons_batch.cgi` requests: orbital elements of the bodies of an ephemeris,
//! and observer tables (sky position, rise / transit / set) for a site on a body.
//!
//! ## Overview
//!
//! - [`HorizonsQuery`] holds every parameter of a request and renders them as ordered
//!   `(key, 'value')` pairs with [`HorizonsQuery::query_items`].
//! - [`HorizonsQuery::ephemeris_query`] and the other factories turn a set of bodies and a
//!   reference date into the list of requests to send. The Sun never yields a request.
//! - [`ObserverField`] is the bit set of the observer table columns.
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use itertools::Itertools;
use reqwest::Url;

use crate::constants::NaifId;
use crate::naif::{MajorBody, Naif};
use crate::observer_info::ObserverSite;
use crate::orrery_errors::OrreryError;
use crate::time::JulianDay;

/// Half an hour, the length of an elements window: a single row is enough.
const ELEMENTS_WINDOW: f64 = 1800.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    Elements,
    Observer,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Elements => "Elements",
            TableType::Observer => "Observer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepSize {
    Day(u32),
    Hour(u32),
    Minute(u32),
    Month(u32),
    Year(u32),
    /// Number of equal steps in the window
    Step(u32),
}

impl fmt::Display for StepSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepSize::Day(d) => write!(f, "{d}d"),
            StepSize::Hour(h) => write!(f, "{h}h"),
            StepSize::Minute(m) => write!(f, "{m}m"),
            StepSize::Month(m) => write!(f, "{m}month"),
            StepSize::Year(y) => write!(f, "{y}y"),
            StepSize::Step(s) => write!(f, "{s}"),
        }
    }
}

/// Horizon used to decide rise and set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RtsMode {
    None,
    TrueVisualHorizon,
    GeometricHorizon,
    RadarHorizon,
}

impl RtsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RtsMode::None => "NO",
            RtsMode::TrueVisualHorizon => "TVH",
            RtsMode::GeometricHorizon => "GEO",
            RtsMode::RadarHorizon => "RAD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeUnit {
    Au,
    Km,
}

/// Columns of an observer table, bit `n` is the Horizons quantity `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverField(u64);

impl ObserverField {
    /// J2000 astrometric right ascension and declination
    pub const ASTROMETRIC_RA_AND_DEC: ObserverField = ObserverField(1 << 1);
    /// Apparent visual magnitude and surface brightness
    pub const VISUAL_MAGNITUDE_AND_SURFACE_BRIGHTNESS: ObserverField = ObserverField(1 << 9);
    pub const ILLUMINATED_FRACTION: ObserverField = ObserverField(1 << 10);
    pub const TARGET_ANGULAR_DIAMETER: ObserverField = ObserverField(1 << 13);
    /// Sub-observer longitude and latitude on the target
    pub const OBSERVER_SUB_LONGITUDE_AND_LATITUDE: ObserverField = ObserverField(1 << 14);
    /// Sub-solar longitude and latitude on the target
    pub const SUN_SUB_LONGITUDE_AND_LATITUDE: ObserverField = ObserverField(1 << 15);
    pub const NORTH_POLE_RA_AND_DEC: ObserverField = ObserverField(1 << 32);

    pub const GEOCENTRIC: ObserverField = ObserverField(
        Self::ASTROMETRIC_RA_AND_DEC.0
            | Self::VISUAL_MAGNITUDE_AND_SURFACE_BRIGHTNESS.0
            | Self::ILLUMINATED_FRACTION.0
            | Self::TARGET_ANGULAR_DIAMETER.0
            | Self::OBSERVER_SUB_LONGITUDE_AND_LATITUDE.0
            | Self::SUN_SUB_LONGITUDE_AND_LATITUDE.0
            | Self::NORTH_POLE_RA_AND_DEC.0,
    );

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn contains(&self, other: ObserverField) -> bool {
        self.0 & other.0 == other.0
    }

    /// Comma separated indices of the set bits, the `QUANTITIES` value.
    pub fn quantities(&self) -> String {
        (0..64u32).filter(|&bit| (self.0 >> bit) & 1 == 1).join(",")
    }
}

impl std::ops::BitOr for ObserverField {
    type Output = ObserverField;

    fn bitor(self, rhs: Self) -> Self::Output {
        ObserverField(self.0 | rhs.0)
    }
}

type QueryIdentity<'a> = (
    (TableType, &'a str, NaifId, bool, u64, u64),
    (
        bool,
        bool,
        StepSize,
        ObserverField,
        Option<(Naif, u64, u64, u64)>,
        RtsMode,
        RangeUnit,
    ),
);

/// Equality and hash cover every parameter, times compared bit for bit.
#[derive(Debug, Clone)]
pub struct HorizonsQuery {
    pub table_type: TableType,
    pub center: String,
    pub command: NaifId,
    pub make_ephemeris: bool,
    pub start_time: JulianDay,
    pub stop_time: JulianDay,
    pub show_object_page: bool,
    pub csv_format: bool,
    pub step_size: StepSize,
    pub observer_field: ObserverField,
    pub site: Option<ObserverSite>,
    pub rts_mode: RtsMode,
    pub range_unit: RangeUnit,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

fn quote_wrapped(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value.to_string()
    } else {
        format!("'{value}'")
    }
}

impl HorizonsQuery {
    pub fn new(
        table_type: TableType,
        center: impl Into<String>,
        command: NaifId,
        start_time: JulianDay,
        stop_time: JulianDay,
    ) -> Self {
        HorizonsQuery {
            table_type,
            center: center.into(),
            command,
            make_ephemeris: true,
            start_time,
            stop_time,
            show_object_page: true,
            csv_format: true,
            step_size: StepSize::Step(1),
            observer_field: ObserverField::GEOCENTRIC,
            site: None,
            rts_mode: RtsMode::None,
            range_unit: RangeUnit::Km,
        }
    }

    /// Elements of `naif` relative to its primary, `None` for a body without primary.
    pub fn orbital_element_query(
        naif: Naif,
        start_time: JulianDay,
        stop_time: JulianDay,
    ) -> Option<Self> {
        let primary = naif.primary()?;
        Some(HorizonsQuery::new(
            TableType::Elements,
            primary.id().to_string(),
            naif.id(),
            start_time,
            stop_time,
        ))
    }

    /// Observer table of `target` seen from `site`.
    pub fn observer_query(
        target: Naif,
        site: ObserverSite,
        start_time: JulianDay,
        stop_time: JulianDay,
    ) -> Self {
        let mut query = HorizonsQuery::new(
            TableType::Observer,
            format!("coord@{}", site.naif.id()),
            target.id(),
            start_time,
            stop_time,
        );
        query.site = Some(site);
        query
    }

    /// Observer table restricted to rise, transit and set rows.
    pub fn observer_rts_query(
        target: Naif,
        site: ObserverSite,
        start_time: JulianDay,
        stop_time: JulianDay,
    ) -> Self {
        let mut query = HorizonsQuery::observer_query(target, site, start_time, stop_time);
        query.rts_mode = RtsMode::TrueVisualHorizon;
        query.show_object_page = false;
        query.observer_field = ObserverField::ASTROMETRIC_RA_AND_DEC;
        query
    }

    /// One elements request per distinct body
    ///
    /// Planets are requested against the Sun over a yearly window, the Moon against the Earth
    /// over a monthly window and the other moons against their planet over a yearly window.
    ///
    /// Arguments
    /// ---------
    /// * `naifs`: requested bodies, duplicates are ignored
    /// * `date`: reference date
    ///
    /// Return
    /// ------
    /// * the requests in NAIF order, the Sun and custom bodies are skipped
    pub fn ephemeris_query(naifs: &[Naif], date: JulianDay) -> Vec<HorizonsQuery> {
        let this_year = date.start_of_year();
        let this_month = date.start_of_month();
        naifs
            .iter()
            .copied()
            .collect::<BTreeSet<Naif>>()
            .into_iter()
            .filter_map(|naif| {
                let start = match naif {
                    Naif::MajorBody(_) => this_year,
                    Naif::Moon(id) if id == 301 => this_month,
                    Naif::Moon(_) => this_year,
                    Naif::Sun | Naif::Custom(_) => return None,
                };
                HorizonsQuery::orbital_element_query(
                    naif,
                    start,
                    start.add_seconds(ELEMENTS_WINDOW),
                )
            })
            .collect()
    }

    /// The Sun and the planets.
    pub fn planet_query(date: JulianDay) -> Vec<HorizonsQuery> {
        HorizonsQuery::ephemeris_query(&planet_and_moon_items()[..10], date)
    }

    pub fn planet_and_moon_query(date: JulianDay) -> Vec<HorizonsQuery> {
        HorizonsQuery::ephemeris_query(&planet_and_moon_items(), date)
    }

    /// Moon observer tables over one day with a ten minutes step.
    pub fn observer_queries(site: ObserverSite, date: JulianDay) -> Vec<HorizonsQuery> {
        observer_targets(&site)
            .into_iter()
            .map(|target| {
                let mut query = HorizonsQuery::observer_query(target, site, date, date + 1.0);
                query.step_size = StepSize::Minute(10);
                query
            })
            .collect()
    }

    /// Moon rise / transit / set over one week with a one minute step.
    pub fn rts_queries(site: ObserverSite, date: JulianDay) -> Vec<HorizonsQuery> {
        observer_targets(&site)
            .into_iter()
            .map(|target| {
                let mut query = HorizonsQuery::observer_rts_query(target, site, date, date + 7.0);
                query.step_size = StepSize::Minute(1);
                query
            })
            .collect()
    }

    /// Parameters of the request, in the order Horizons documents them.
    pub fn query_items(&self) -> Vec<(&'static str, String)> {
        let start = self.start_time.horizons_format();
        let stop = self.stop_time.horizons_format();
        let items: Vec<(&'static str, String)> = match self.table_type {
            TableType::Elements => vec![
                ("batch", "1".into()),
                ("MAKE_EPHEM", yes_no(self.make_ephemeris).into()),
                ("TABLE_TYPE", self.table_type.as_str().into()),
                ("COMMAND", self.command.to_string()),
                ("START_TIME", start),
                ("STOP_TIME", stop),
                ("CSV_FORMAT", yes_no(self.csv_format).into()),
                ("STEP_SIZE", self.step_size.to_string()),
                ("CENTER", self.center.clone()),
            ],
            TableType::Observer => vec![
                ("batch", "1".into()),
                ("TABLE_TYPE", self.table_type.as_str().into()),
                ("COMMAND", self.command.to_string()),
                ("QUANTITIES", self.observer_field.quantities()),
                ("START_TIME", start),
                ("STOP_TIME", stop),
                ("CSV_FORMAT", yes_no(self.csv_format).into()),
                ("R_T_S_ONLY", self.rts_mode.as_str().into()),
                ("SITE_COORD", self.site_coord()),
                ("ANG_FORMAT", "DEG".into()),
                ("STEP_SIZE", self.step_size.to_string()),
                ("REF_SYSTEM", "J2000".into()),
                ("OBJ_PAGE", yes_no(self.show_object_page).into()),
                ("CENTER", self.center.clone()),
            ],
        };
        items
            .into_iter()
            .map(|(key, value)| (key, quote_wrapped(&value)))
            .collect()
    }

    /// Full GET url of the request
    ///
    /// Arguments
    /// ---------
    /// * `base`: the batch endpoint, e.g. `https://ssd.jpl.nasa.gov/horizons_batch.cgi`
    pub fn url(&self, base: &str) -> Result<Url, OrreryError> {
        Url::parse_with_params(base, self.query_items())
            .map_err(|e| OrreryError::InvalidUrl(format!("{base}: {e}")))
    }

    fn identity(&self) -> QueryIdentity<'_> {
        let site = self.site.map(|site| {
            (
                site.naif,
                site.location.latitude.to_bits(),
                site.location.longitude.to_bits(),
                site.location.altitude.to_bits(),
            )
        });
        (
            (
                self.table_type,
                self.center.as_str(),
                self.command,
                self.make_ephemeris,
                self.start_time.value().to_bits(),
                self.stop_time.value().to_bits(),
            ),
            (
                self.show_object_page,
                self.csv_format,
                self.step_size,
                self.observer_field,
                site,
                self.rts_mode,
                self.range_unit,
            ),
        )
    }

    /// `lon,lat,alt` with the altitude in kilometers.
    fn site_coord(&self) -> String {
        let location = self.site.map(|site| site.location).unwrap_or_default();
        format!(
            "{},{},{}",
            location.longitude,
            location.latitude,
            location.altitude / 1000.0
        )
    }
}

impl PartialEq for HorizonsQuery {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for HorizonsQuery {}

impl Hash for HorizonsQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// The Sun, the planets and the main moons of Mercury to Neptune.
pub fn planet_and_moon_items() -> Vec<Naif> {
    const MOON_COUNTS: [usize; 8] = [0, 0, 1, 2, 4, 5, 2, 2];
    let planets = MajorBody::ALL;
    std::iter::once(Naif::Sun)
        .chain(planets.iter().copied().map(Naif::MajorBody))
        .chain(
            MOON_COUNTS
                .iter()
                .zip(planets.iter())
                .flat_map(|(&count, planet)| planet.moons().into_iter().take(count)),
        )
        .collect()
}

fn observer_targets(site: &ObserverSite) -> Vec<Naif> {
    [Naif::Moon(301)]
        .into_iter()
        .filter(|target| *target != site.naif)
        .collect()
}
