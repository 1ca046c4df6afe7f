#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use approx::assert_relative_eq;
use orrery::constants::NaifId;
use orrery::horizons::fetch::HorizonsSource;
use orrery::horizons::query::HorizonsQuery;
use orrery::orbital_motion::OrbitalMotion;
use orrery::orrery_errors::OrreryError;
use tokio::time::Instant;

pub const BUSY_PAGE: &str = "<html><body>Blocked Concurrent Request: please wait</body></html>";

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/data/{name}"))
        .unwrap_or_else(|e| panic!("unable to read fixture {name}: {e}"))
}

pub fn busy() -> Result<String, OrreryError> {
    Ok(BUSY_PAGE.to_string())
}

pub fn transport_failure() -> Result<String, OrreryError> {
    Err(OrreryError::HttpStatus {
        status: 503,
        url: "https://ssd.jpl.nasa.gov/horizons_batch.cgi".to_string(),
    })
}

/// Answers each query with the next scripted response of its `COMMAND` and records the call.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<NaifId, VecDeque<Result<String, OrreryError>>>>,
    calls: Mutex<Vec<(NaifId, Instant)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        ScriptedSource::default()
    }

    pub fn script(self, naif_id: NaifId, responses: Vec<Result<String, OrreryError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(naif_id)
            .or_default()
            .extend(responses);
        self
    }

    pub fn calls(&self) -> Vec<(NaifId, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, naif_id: NaifId) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter(|(id, _)| *id == naif_id)
            .map(|(_, at)| at)
            .collect()
    }
}

impl HorizonsSource for ScriptedSource {
    async fn fetch(&self, query: &HorizonsQuery) -> Result<String, OrreryError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.command, Instant::now()));
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&query.command)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| {
            Err(OrreryError::InvalidUrl(format!(
                "no scripted response for {}",
                query.command
            )))
        })
    }
}

pub fn assert_motion_close(actual: &OrbitalMotion, expected: &OrbitalMotion, epsilon: f64) {
    let (a, b) = (actual.orbit(), expected.orbit());
    assert_relative_eq!(
        a.shape.semimajor_axis(),
        b.shape.semimajor_axis(),
        max_relative = epsilon
    );
    assert_relative_eq!(
        a.shape.eccentricity(),
        b.shape.eccentricity(),
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.mean_anomaly(),
        expected.mean_anomaly(),
        epsilon = epsilon
    );
    assert_relative_eq!(
        (actual.position() - expected.position()).norm() / expected.position().norm(),
        0.0,
        epsilon = epsilon
    );
}
