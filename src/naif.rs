//! # NAIF identifiers
//!
//! Numeric catalog codes used by the ephemeris source to designate solar-system bodies
//! (<https://naif.jpl.nasa.gov/pub/naif/toolkit_docs/FORTRAN/req/naif_ids.html>).
//!
//! ## Overview
//!
//! - `10` is the Sun.
//! - `x99` (x in 1..=9) is a planet (or Pluto), see [`MajorBody`].
//! - `x01..=x98` under a known planet is one of its moons, its primary is `x99`.
//! - Everything else is kept as [`Naif::Custom`].
//!
//! [`Naif`] is ordered so that a sorted list can be turned into a tree in one pass: the Sun
//! first, then each planet immediately followed by its moons.
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::constants::{NaifId, SUN_NAIF_ID};
use crate::orrery_errors::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MajorBody {
    Mercury = 199,
    Venus = 299,
    Earth = 399,
    Mars = 499,
    Jupiter = 599,
    Saturn = 699,
    Uranus = 799,
    Neptune = 899,
    Pluto = 999,
}

impl MajorBody {
    pub const ALL: [MajorBody; 9] = [
        MajorBody::Mercury,
        MajorBody::Venus,
        MajorBody::Earth,
        MajorBody::Mars,
        MajorBody::Jupiter,
        MajorBody::Saturn,
        MajorBody::Uranus,
        MajorBody::Neptune,
        MajorBody::Pluto,
    ];

    pub fn id(&self) -> NaifId {
        *self as NaifId
    }

    pub fn name(&self) -> &'static str {
        match self {
            MajorBody::Mercury => "Mercury",
            MajorBody::Venus => "Venus",
            MajorBody::Earth => "Earth",
            MajorBody::Mars => "Mars",
            MajorBody::Jupiter => "Jupiter",
            MajorBody::Saturn => "Saturn",
            MajorBody::Uranus => "Uranus",
            MajorBody::Neptune => "Neptune",
            MajorBody::Pluto => "Pluto",
        }
    }

    /// Moons of this body with a known name, by increasing id.
    pub fn moons(&self) -> Vec<Naif> {
        let hundred = self.id() / 100;
        MOON_NAMES
            .iter()
            .filter(|(id, _)| id / 100 == hundred)
            .map(|&(id, _)| Naif::Moon(id))
            .collect()
    }
}

impl TryFrom<NaifId> for MajorBody {
    type Error = ParseError;

    fn try_from(id: NaifId) -> Result<Self, Self::Error> {
        MajorBody::ALL
            .into_iter()
            .find(|body| body.id() == id)
            .ok_or(ParseError::UnknownNaifId(id))
    }
}

/// Names of the best known moons, the Horizons target names.
const MOON_NAMES: &[(NaifId, &str)] = &[
    (301, "Moon"),
    (401, "Phobos"),
    (402, "Deimos"),
    (501, "Io"),
    (502, "Europa"),
    (503, "Ganymede"),
    (504, "Callisto"),
    (505, "Amalthea"),
    (506, "Himalia"),
    (507, "Elara"),
    (508, "Pasiphae"),
    (509, "Sinope"),
    (510, "Lysithea"),
    (511, "Carme"),
    (512, "Ananke"),
    (513, "Leda"),
    (514, "Thebe"),
    (515, "Adrastea"),
    (516, "Metis"),
    (601, "Mimas"),
    (602, "Enceladus"),
    (603, "Tethys"),
    (604, "Dione"),
    (605, "Rhea"),
    (606, "Titan"),
    (607, "Hyperion"),
    (608, "Iapetus"),
    (609, "Phoebe"),
    (610, "Janus"),
    (611, "Epimetheus"),
    (612, "Helene"),
    (613, "Telesto"),
    (614, "Calypso"),
    (615, "Atlas"),
    (616, "Prometheus"),
    (617, "Pandora"),
    (618, "Pan"),
    (701, "Ariel"),
    (702, "Umbriel"),
    (703, "Titania"),
    (704, "Oberon"),
    (705, "Miranda"),
    (706, "Cordelia"),
    (707, "Ophelia"),
    (708, "Bianca"),
    (709, "Cressida"),
    (710, "Desdemona"),
    (711, "Juliet"),
    (712, "Portia"),
    (713, "Rosalind"),
    (714, "Belinda"),
    (715, "Puck"),
    (801, "Triton"),
    (802, "Nereid"),
    (803, "Naiad"),
    (804, "Thalassa"),
    (805, "Despina"),
    (806, "Galatea"),
    (807, "Larissa"),
    (808, "Proteus"),
    (901, "Charon"),
    (902, "Nix"),
    (903, "Hydra"),
    (904, "Kerberos"),
    (905, "Styx"),
];

#[derive(Debug, Clone, Copy)]
pub enum Naif {
    Sun,
    MajorBody(MajorBody),
    /// Moon of a known major body, holds its NAIF id
    Moon(NaifId),
    Custom(NaifId),
}

impl Naif {
    pub fn from_id(id: NaifId) -> Naif {
        if id == SUN_NAIF_ID {
            return Naif::Sun;
        }
        let hundred = id / 100;
        let suffix = id % 100;
        match MajorBody::try_from(hundred * 100 + 99) {
            Ok(major) if suffix == 99 => Naif::MajorBody(major),
            Ok(_) if (1..=98).contains(&suffix) => Naif::Moon(id),
            _ => Naif::Custom(id),
        }
    }

    pub fn id(&self) -> NaifId {
        match *self {
            Naif::Sun => SUN_NAIF_ID,
            Naif::MajorBody(major) => major.id(),
            Naif::Moon(id) | Naif::Custom(id) => id,
        }
    }

    /// Body this one orbits, `None` for the Sun and custom bodies.
    pub fn primary(&self) -> Option<Naif> {
        match *self {
            Naif::MajorBody(_) => Some(Naif::Sun),
            Naif::Moon(id) => MajorBody::try_from(id / 100 * 100 + 99)
                .ok()
                .map(Naif::MajorBody),
            Naif::Sun | Naif::Custom(_) => None,
        }
    }

    pub fn is_satellite_of(&self, other: &Naif) -> bool {
        match (self, other) {
            (Naif::MajorBody(_), Naif::Sun) => true,
            (Naif::Moon(id), Naif::MajorBody(major)) => id / 100 == major.id() / 100,
            _ => false,
        }
    }

    pub fn is_primary_of(&self, other: &Naif) -> bool {
        other.is_satellite_of(self)
    }

    /// The Sun's satellites are the planets, a planet's satellites are its named moons.
    pub fn moons(&self) -> Vec<Naif> {
        match self {
            Naif::Sun => Naif::planets(),
            Naif::MajorBody(major) => major.moons(),
            Naif::Moon(_) | Naif::Custom(_) => Vec::new(),
        }
    }

    pub fn planets() -> Vec<Naif> {
        MajorBody::ALL.into_iter().map(Naif::MajorBody).collect()
    }

    /// `self` and every primary up to the root.
    pub fn lineage(&self) -> Vec<Naif> {
        std::iter::successors(Some(*self), |naif| naif.primary()).collect()
    }

    pub fn name(&self) -> String {
        match self {
            Naif::Sun => "Sun".to_string(),
            Naif::MajorBody(major) => major.name().to_string(),
            Naif::Moon(id) | Naif::Custom(id) => MOON_NAMES
                .iter()
                .find(|(moon, _)| moon == id)
                .map(|(_, name)| name.to_string())
                .unwrap_or_else(|| id.to_string()),
        }
    }
}

impl From<NaifId> for Naif {
    fn from(id: NaifId) -> Self {
        Naif::from_id(id)
    }
}

impl From<MajorBody> for Naif {
    fn from(major: MajorBody) -> Self {
        Naif::MajorBody(major)
    }
}

impl PartialEq for Naif {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Naif {}

impl Hash for Naif {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Ord for Naif {
    /// `10 < x99 < x01 < … < x98 < (x+1)99`
    fn cmp(&self, other: &Self) -> Ordering {
        let (lhs, rhs) = (self.id(), other.id());
        if lhs == rhs {
            return Ordering::Equal;
        }
        if lhs == SUN_NAIF_ID {
            return Ordering::Less;
        }
        if rhs == SUN_NAIF_ID {
            return Ordering::Greater;
        }
        if lhs / 100 == rhs / 100 {
            if lhs % 100 == 99 {
                return Ordering::Less;
            }
            if rhs % 100 == 99 {
                return Ordering::Greater;
            }
        }
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Naif {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Naif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

#[cfg(test)]
mod naif_test {
    use super::*;

    fn naifs(ids: &[NaifId]) -> Vec<Naif> {
        ids.iter().copied().map(Naif::from_id).collect()
    }

    #[test]
    fn test_from_id() {
        assert_eq!(Naif::from_id(10), Naif::Sun);
        assert!(matches!(
            Naif::from_id(399),
            Naif::MajorBody(MajorBody::Earth)
        ));
        assert!(matches!(Naif::from_id(301), Naif::Moon(301)));
        assert!(matches!(Naif::from_id(560), Naif::Moon(560)));
        assert!(matches!(Naif::from_id(1099), Naif::Custom(1099)));
        assert!(matches!(Naif::from_id(2000001), Naif::Custom(2000001)));
        assert!(matches!(Naif::from_id(-125544), Naif::Custom(-125544)));
        assert_eq!(MajorBody::try_from(42), Err(ParseError::UnknownNaifId(42)));
    }

    #[test]
    fn test_ordering() {
        let mut sorted = naifs(&[399, 10, 402, 401, 599]);
        sorted.sort();
        assert_eq!(sorted, naifs(&[10, 399, 401, 402, 599]));

        let mut sorted = naifs(&[301, 399, 10, 499, 402, 599, 501, 509, 508]);
        sorted.sort();
        assert_eq!(
            sorted,
            naifs(&[10, 399, 301, 499, 402, 599, 501, 508, 509])
        );
    }

    #[test]
    fn test_hierarchy() {
        let earth = Naif::from_id(399);
        let moon = Naif::from_id(301);
        assert!(moon.is_satellite_of(&earth));
        assert!(earth.is_primary_of(&moon));
        assert!(earth.is_satellite_of(&Naif::Sun));
        assert!(!moon.is_satellite_of(&Naif::Sun));
        assert!(!moon.is_satellite_of(&Naif::from_id(499)));
        assert_eq!(moon.primary(), Some(earth));
        assert_eq!(Naif::Sun.primary(), None);
        assert_eq!(moon.lineage(), vec![moon, earth, Naif::Sun]);
    }

    #[test]
    fn test_names_and_moons() {
        assert_eq!(Naif::from_id(301).name(), "Moon");
        assert_eq!(Naif::from_id(599).name(), "Jupiter");
        assert_eq!(Naif::from_id(560).name(), "560");
        assert_eq!(Naif::from_id(502).to_string(), "Europa (502)");
        assert_eq!(Naif::from_id(499).moons(), naifs(&[401, 402]));
        assert_eq!(Naif::Sun.moons().len(), 9);
        assert!(Naif::from_id(199).moons().is_empty());
    }
}
