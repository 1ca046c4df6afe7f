//! # JPL Horizons
//!
//! Everything needed to talk to the Horizons batch interface.
//!
//! ## Overview
//!
//! | Module                  | Role                                                        |
//! |-------------------------|-------------------------------------------------------------|
//! | [`query`]               | build `Elements` and `Observer` requests and their URL      |
//! | [`fetch`]               | run a batch of requests with retries and backoff            |
//! | [`response`]            | split a raw response into header, physical block and table  |
//! | [`property_extractor`]  | physical properties in SI units                             |
//! | [`elements_parser`]     | osculating elements rows                                    |
//! | [`body_parser`]         | a full [`crate::celestial_body::CelestialBody`]             |
//! | [`observer_parser`]     | observer and rise-transit-set rows                          |
pub mod body_parser;
pub mod elements_parser;
pub mod fetch;
pub mod observer_parser;
pub mod property_extractor;
pub mod query;
pub mod response;

pub use body_parser::parse_celestial_body;
pub use fetch::{
    fetch_queries, FetchCancellation, FetchOutcome, FetchStrategy, HorizonsSource, RetryPolicy,
};
pub use observer_parser::{parse_observer_infos, parse_rise_transit_set};
pub use query::HorizonsQuery;
pub use response::ResponseStatus;
