//! # Constants and type definitions for Orrery
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! aliases** used throughout the `orrery` library.
//!
//! ## Overview
//!
//! - Astronomical constants (gravitational constant, reference epochs)
//! - Unit conversions (degrees ↔ radians ↔ hours, days ↔ seconds, km ↔ m)
//! - Core type aliases used across the crate
//!
//! All distances handled by the propagation engine are in **meters**, gravitational parameters
//! in **m³/s²** and durations in **seconds**, unless a name says otherwise.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of days in a Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Julian date of J2000.0 (2000-01-01 12:00:00)
pub const J2000: f64 = 2_451_545.0;

/// Julian date of the Besselian epoch B1950.0
pub const B1950: f64 = 2_433_282.4235;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Hours → radians
pub const RADH: f64 = DPI / 24.0;

/// Kilometers → meters
pub const KM_TO_M: f64 = 1_000.0;

/// km³/s² → m³/s²
pub const KM3_TO_M3: f64 = 1e9;

/// Newtonian constant of gravitation in m³·kg⁻¹·s⁻²
pub const GRAV_CONSTANT: f64 = 6.67408e-11;

/// NAIF identifier of the Sun
pub const SUN_NAIF_ID: i32 = 10;

/// Mass of the Sun in kilograms
pub const SUN_MASS: f64 = 1.988544e30;

/// Radius of the Sun, as carried by the built-in Sun body
pub const SUN_RADIUS: f64 = 6.955e5;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
/// Duration in seconds
pub type Second = f64;
/// Julian Date (days)
pub type JD = f64;
/// NAIF numeric identifier
pub type NaifId = i32;
