mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use orrery::constants::RADEG;
use orrery::horizons::response::{Response, ResponseStatus};
use orrery::horizons::{parse_celestial_body, parse_observer_infos, parse_rise_transit_set};
use orrery::observer_info::{RiseTransitSet, RiseTransitSetElevation, SolarPresence};
use orrery::orrery_errors::ParseError;
use orrery::time::JulianDay;

use crate::common::{read_fixture, BUSY_PAGE};

#[test]
fn test_mars_body() {
    let mars = parse_celestial_body(&read_fixture("mars.result")).unwrap();

    assert_eq!(mars.name, "Mars");
    assert_eq!(mars.naif_id(), 499);
    assert_eq!(mars.center_body_id, Some(10));
    assert_relative_eq!(mars.radius, 3389.9e3, max_relative = 1e-12);
    assert_relative_eq!(mars.grav_param, 42828.3e9, max_relative = 1e-12);
    assert_relative_eq!(mars.rotation_period, 88642.6632, epsilon = 1e-6);
    assert_relative_eq!(mars.obliquity, 25.19 * RADEG, epsilon = 1e-12);
    assert_eq!(mars.hill_sphere_rad_rp, Some(319.8));
}

#[test]
fn test_mars_motion() {
    let mars = parse_celestial_body(&read_fixture("mars.result")).unwrap();
    let moment = mars.moment().unwrap();

    assert_eq!(moment.ephemeris_julian_date(), JulianDay::new(2457754.5));
    assert_relative_eq!(
        moment.orbit().shape.semimajor_axis(),
        2.279e11,
        max_relative = 1e-12
    );
    assert_relative_eq!(moment.orbit().shape.eccentricity(), 0.0934, epsilon = 1e-12);
    assert_relative_eq!(
        moment.mean_anomaly(),
        20.49521750747146 * RADEG,
        epsilon = 1e-8
    );
}

#[test]
fn test_missing_radius_is_fatal() {
    let content = read_fixture("mars.result").replace("Mean radius (km)", "Mean Radiux (km)");
    assert_eq!(
        parse_celestial_body(&content).unwrap_err(),
        ParseError::MissingField("radius")
    );
}

#[test]
fn test_missing_rotation_defaults_to_zero() {
    let content =
        read_fixture("mars.result").replace("Sidereal rot. period", "Sidereal rot. phase ");
    let mars = parse_celestial_body(&content).unwrap();
    assert_eq!(mars.rotation_period, 0.0);
    assert!(mars.moment().is_some());
}

#[test]
fn test_observer_page_is_not_a_body() {
    assert_eq!(
        parse_celestial_body(&read_fixture("moon_ob.result")).unwrap_err(),
        ParseError::MissingField("Keplerian GM")
    );
}

#[test]
fn test_moon_observer_rows() {
    let infos = parse_observer_infos(&read_fixture("moon_ob.result")).unwrap();
    assert_eq!(infos.len(), 3);

    let first = &infos[0];
    assert_eq!(first.info.naif_id, 301);
    assert_eq!(first.info.julian_day, JulianDay::new(2440587.541666667));
    assert_eq!(first.info.daylight, SolarPresence::Day);
    assert_eq!(first.info.rts, RiseTransitSet::BelowHorizon);
    assert_abs_diff_eq!(first.info.location.latitude, 37.5, epsilon = 1e-9);
    assert_abs_diff_eq!(first.info.location.longitude, -122.25, epsilon = 1e-9);
    assert_abs_diff_eq!(first.info.location.altitude, 100.0, epsilon = 1e-9);
    assert_eq!(first.right_ascension, 41.52488);
    assert_eq!(first.apparent_magnitude, Some(-10.05));
    assert_eq!(first.surface_brightness, Some(5.20));
    assert_eq!(first.illuminated_percentage, 49.24400);
    assert_eq!(first.angular_diameter, 1805.181);
    assert_eq!(first.ob_lon, 352.62499);
    assert_eq!(first.ob_lat, 3.49985);
    assert_eq!(first.sl_lon, Some(261.84260));
    assert_eq!(first.sl_lat, Some(-1.40367));
    assert_eq!(first.np_ra, 270.94699);
    assert_eq!(first.np_dec, 68.05665);
    assert_eq!(first.np_angle, 20.345);
    assert_eq!(first.np_distance, -246.85);

    let second = &infos[1];
    assert_eq!(second.apparent_magnitude, None);
    assert_eq!(second.surface_brightness, None);
    assert_eq!(second.sl_lon, None);
    assert_eq!(second.sl_lat, None);
    assert_eq!(second.illuminated_percentage, 49.32133);

    let third = &infos[2];
    assert_eq!(third.info.daylight, SolarPresence::CivilDawn);
    assert_eq!(third.info.rts, RiseTransitSet::AboveHorizon);
}

#[test]
fn test_moon_rise_transit_set() {
    let rows = parse_rise_transit_set(&read_fixture("moon_ob_rts.result")).unwrap();
    let flags: Vec<RiseTransitSet> = rows.iter().map(|row| row.info.rts).collect();
    assert_eq!(
        flags,
        vec![
            RiseTransitSet::Rise,
            RiseTransitSet::Transit,
            RiseTransitSet::Set,
            RiseTransitSet::Rise
        ]
    );
    assert_eq!(rows[1].info.daylight, SolarPresence::CivilDawn);
    assert_eq!(rows[1].azimuth, 179.0547);

    let elevation = RiseTransitSetElevation::from_infos(&rows).unwrap();
    assert_eq!(elevation.naif_id, 301);
    assert_eq!(elevation.rise_at, JulianDay::new(2440587.265972222));
    assert_eq!(elevation.transit_at, JulianDay::new(2440587.533333333));
    assert_eq!(elevation.set_at, JulianDay::new(2440587.804861111));
    assert_relative_eq!(elevation.maximum_elevation, 35.8295 * RADEG, epsilon = 1e-12);
}

#[test]
fn test_header_of_an_observer_page() {
    let content = read_fixture("moon_ob_rts.result");
    let response = Response::new(&content).unwrap();
    assert_eq!(response.target().unwrap(), ("Moon".to_string(), 301));
    assert_eq!(response.center().unwrap(), ("Earth".to_string(), 399));
    assert_eq!(
        response.table_labels().unwrap()[3..5],
        ["Azi_(a-app)".to_string(), "Elev_(a-app)".to_string()]
    );
}

#[test]
fn test_busy_page() {
    assert_eq!(ResponseStatus::validate(BUSY_PAGE), ResponseStatus::Busy);
    assert_eq!(
        ResponseStatus::validate(&read_fixture("mars.result")),
        ResponseStatus::Ok
    );
}
