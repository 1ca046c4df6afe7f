//! # Orrery
//!
//! Orbital propagation of the solar system bodies, fed by osculating elements fetched from the
//! JPL Horizons service.
//!
//! ## Overview
//!
//! ```text
//! HorizonsQuery ─► fetch (retry / backoff) ─► parsers ─► cache + merge ─► Ephemeris
//!                                                                            │
//!                          OrbitalMotion (Kepler) ◄──────────────────────────┘
//!                                 │
//!                                 └─► equatorial / horizontal / ecliptic coordinates
//! ```
//!
//! - [`orrery::Orrery`] is the service object tying the pipeline together.
//! - [`orbital_motion::OrbitalMotion`] propagates a body from its elements.
//! - [`coordinates`] converts positions between frames for an observer.
pub mod angle;
pub mod cache;
pub mod celestial_body;
pub mod config;
pub mod constants;
pub mod coordinates;
pub mod env_state;
pub mod ephemeris;
pub mod horizons;
pub mod kepler;
pub mod naif;
pub mod observer_info;
pub mod orbit;
pub mod orbital_motion;
pub mod orrery;
pub mod orrery_errors;
pub mod time;
