mod common;

use std::sync::Arc;
use std::time::Duration;

use orrery::horizons::fetch::{fetch_queries, FetchCancellation, FetchStrategy, RetryPolicy};
use orrery::horizons::query::{HorizonsQuery, TableType};
use orrery::naif::Naif;
use orrery::orrery_errors::{FetchError, FetchErrorKind, OrreryError};
use orrery::time::JulianDay;
use tokio::time::Instant;

use crate::common::{busy, transport_failure, ScriptedSource};

fn query(naif_id: i32) -> HorizonsQuery {
    let start = JulianDay::new(2457754.5);
    HorizonsQuery::orbital_element_query(Naif::from_id(naif_id), start, start + 1.0)
        .expect("body with a primary")
}

fn payload(naif_id: i32) -> Result<String, OrreryError> {
    Ok(format!("Target body name: ({naif_id})"))
}

fn offsets(start: Instant, calls: &[Instant]) -> Vec<Duration> {
    calls.iter().map(|at| *at - start).collect()
}

#[tokio::test(start_paused = true)]
async fn test_busy_then_success_backs_off_exponentially() {
    let source = Arc::new(ScriptedSource::new().script(499, vec![busy(), busy(), payload(499)]));
    let start = Instant::now();

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(499)],
        FetchStrategy::Sequential,
        RetryPolicy::default(),
        &FetchCancellation::new(),
    )
    .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.raw[&499], "Target body name: (499)");
    assert_eq!(
        offsets(start, &source.calls_for(499)),
        vec![
            Duration::ZERO,
            Duration::from_millis(500),
            Duration::from_millis(1500)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_busy_until_the_cap_is_exhausted() {
    let source = Arc::new(ScriptedSource::new().script(499, (0..6).map(|_| busy()).collect()));
    let start = Instant::now();

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(499)],
        FetchStrategy::ExponentialBackoff,
        RetryPolicy::default(),
        &FetchCancellation::new(),
    )
    .await;

    assert!(outcome.raw.is_empty());
    assert_eq!(
        outcome.errors,
        vec![FetchError {
            naif_id: 499,
            attempts: 4,
            kind: FetchErrorKind::Exhausted,
        }]
    );
    assert_eq!(
        offsets(start, &source.calls_for(499)),
        vec![
            Duration::ZERO,
            Duration::from_millis(500),
            Duration::from_millis(1500),
            Duration::from_millis(3500)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_is_retried_and_reported() {
    let source = Arc::new(
        ScriptedSource::new()
            .script(599, (0..4).map(|_| transport_failure()).collect())
            .script(399, vec![transport_failure(), payload(399)]),
    );

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(399), query(599)],
        FetchStrategy::ExponentialBackoff,
        RetryPolicy::default(),
        &FetchCancellation::new(),
    )
    .await;

    assert_eq!(outcome.raw.len(), 1);
    assert!(outcome.raw.contains_key(&399));
    assert_eq!(outcome.errors.len(), 1);
    let error = &outcome.errors[0];
    assert_eq!(error.naif_id, 599);
    assert_eq!(error.attempts, 4);
    assert!(matches!(&error.kind, FetchErrorKind::Transport(message) if message.contains("503")));
    assert_eq!(source.calls_for(399).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_jobs_are_staggered() {
    let source = Arc::new(
        ScriptedSource::new()
            .script(199, vec![payload(199)])
            .script(299, vec![payload(299)])
            .script(399, vec![payload(399)]),
    );
    let start = Instant::now();

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(199), query(299), query(399)],
        FetchStrategy::ExponentialBackoff,
        RetryPolicy::default(),
        &FetchCancellation::new(),
    )
    .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.raw.len(), 3);
    assert_eq!(offsets(start, &source.calls_for(199)), vec![Duration::ZERO]);
    assert_eq!(
        offsets(start, &source.calls_for(299)),
        vec![Duration::from_millis(400)]
    );
    assert_eq!(
        offsets(start, &source.calls_for(399)),
        vec![Duration::from_millis(800)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sequential_runs_in_order() {
    let source = Arc::new(
        ScriptedSource::new()
            .script(399, vec![busy(), payload(399)])
            .script(499, vec![payload(499)]),
    );
    let start = Instant::now();

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(399), query(499)],
        FetchStrategy::Sequential,
        RetryPolicy::default(),
        &FetchCancellation::new(),
    )
    .await;

    assert!(outcome.is_complete());
    let order: Vec<i32> = source.calls().into_iter().map(|(id, _)| id).collect();
    assert_eq!(order, vec![399, 399, 499]);
    assert_eq!(
        offsets(start, &source.calls_for(499)),
        vec![Duration::from_millis(500)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sun_is_never_queried() {
    let source = Arc::new(ScriptedSource::new().script(499, vec![payload(499)]));
    let start = JulianDay::new(2457754.5);
    let sun = HorizonsQuery::new(TableType::Elements, "0", 10, start, start + 1.0);

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![sun, query(499)],
        FetchStrategy::ExponentialBackoff,
        RetryPolicy::default(),
        &FetchCancellation::new(),
    )
    .await;

    assert!(outcome.is_complete());
    assert!(source.calls_for(10).is_empty());
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_backoff() {
    let source = Arc::new(ScriptedSource::new().script(499, (0..4).map(|_| busy()).collect()));
    let cancellation = FetchCancellation::new();
    let trigger = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(700)).await;
        trigger.cancel();
    });
    let start = Instant::now();

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(499)],
        FetchStrategy::ExponentialBackoff,
        RetryPolicy::default(),
        &cancellation,
    )
    .await;

    assert_eq!(Instant::now() - start, Duration::from_millis(700));
    assert_eq!(
        outcome.errors,
        vec![FetchError {
            naif_id: 499,
            attempts: 2,
            kind: FetchErrorKind::Cancelled,
        }]
    );
    assert_eq!(source.calls_for(499).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start() {
    let source = Arc::new(
        ScriptedSource::new()
            .script(399, vec![payload(399)])
            .script(499, vec![payload(499)]),
    );
    let cancellation = FetchCancellation::new();
    cancellation.cancel();

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(399), query(499)],
        FetchStrategy::ExponentialBackoff,
        RetryPolicy::default(),
        &cancellation,
    )
    .await;

    assert!(outcome.raw.is_empty());
    assert!(source.calls().is_empty());
    assert!(outcome
        .errors
        .iter()
        .all(|error| error.kind == FetchErrorKind::Cancelled));
    assert_eq!(outcome.errors.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_identical_queries_are_sent_once() {
    let source = Arc::new(
        ScriptedSource::new()
            .script(499, vec![payload(499), Ok("second payload".to_string())])
            .script(599, vec![payload(599)]),
    );
    let start = Instant::now();

    let outcome = fetch_queries(
        Arc::clone(&source),
        vec![query(499), query(599), query(499)],
        FetchStrategy::ExponentialBackoff,
        RetryPolicy::default(),
        &FetchCancellation::new(),
    )
    .await;

    assert!(outcome.is_complete());
    assert_eq!(source.calls_for(499).len(), 1);
    assert_eq!(outcome.raw[&499], "Target body name: (499)");
    // the duplicate does not take a stagger slot
    assert_eq!(
        offsets(start, &source.calls_for(599)),
        vec![Duration::from_millis(400)]
    );
}
