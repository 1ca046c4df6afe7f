//! # Fetch pipeline
//!
//! Sends a batch of [`HorizonsQuery`] to a [`HorizonsSource`] and collects the raw payloads.
//!
//! ## Overview
//!
//! Every query runs its own retry loop:
//!
//! ```text
//! Pending ──(stagger)──► InFlight ──► Succeeded
//!                           │
//!                           ├── Busy / transport error ──(base · 2^trial)──► InFlight
//!                           └── last attempt failed ──► Failed (Exhausted | Transport)
//! ```
//!
//! - [`FetchStrategy::ExponentialBackoff`] spawns every query at once on a [`JoinSet`], job `i`
//!   starting after `i × job_stagger`.
//! - [`FetchStrategy::Sequential`] runs the queries one after the other, in order.
//!
//! A failed query never aborts its siblings: the [`FetchOutcome`] carries both the payloads
//! and the [`FetchError`] list. A [`FetchCancellation`] interrupts pending backoff sleeps and
//! requests in flight; the interrupted queries report [`FetchErrorKind::Cancelled`].
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::query::HorizonsQuery;
use super::response::ResponseStatus;
use crate::constants::{NaifId, SUN_NAIF_ID};
use crate::orrery_errors::{FetchError, FetchErrorKind, OrreryError};

/// Anything able to answer a Horizons batch query with the raw response text.
pub trait HorizonsSource: Send + Sync + 'static {
    fn fetch(
        &self,
        query: &HorizonsQuery,
    ) -> impl Future<Output = Result<String, OrreryError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// One query at a time
    Sequential,
    /// Every query at once, each one with its own backoff
    #[default]
    ExponentialBackoff,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts per query
    pub trial_count_limit: u32,
    pub base_backoff: Duration,
    /// Delay between the start of two consecutive jobs
    pub job_stagger: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            trial_count_limit: 4,
            base_backoff: Duration::from_millis(500),
            job_stagger: Duration::from_millis(400),
        }
    }
}

impl RetryPolicy {
    /// Sleep before the attempt following the failed attempt `trial` (0 based).
    pub fn backoff(&self, trial: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(trial)
    }
}

/// Shared cancellation flag of a fetch.
#[derive(Debug, Clone)]
pub struct FetchCancellation {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for FetchCancellation {
    fn default() -> Self {
        FetchCancellation::new()
    }
}

impl FetchCancellation {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        FetchCancellation {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

/// Payloads by NAIF id and the queries that produced none.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub raw: HashMap<NaifId, String>,
    pub errors: Vec<FetchError>,
}

impl FetchOutcome {
    fn record(&mut self, result: Result<(NaifId, String), FetchError>) {
        match result {
            Ok((naif_id, content)) => {
                self.raw.insert(naif_id, content);
            }
            Err(e) => self.errors.push(e),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolves once the flag is raised, never if the flag is dropped unraised.
async fn cancelled(receiver: &mut watch::Receiver<bool>) {
    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// `false` when interrupted.
async fn sleep_or_cancel(duration: Duration, receiver: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancelled(receiver) => false,
    }
}

fn retry_reason(failure: &FetchErrorKind) -> &'static str {
    match failure {
        FetchErrorKind::Transport(_) => "failed",
        _ => "busy",
    }
}

async fn run_query<S: HorizonsSource>(
    source: Arc<S>,
    query: HorizonsQuery,
    policy: RetryPolicy,
    start_delay: Duration,
    mut cancel: watch::Receiver<bool>,
) -> Result<(NaifId, String), FetchError> {
    let naif_id = query.command;
    let failure = move |attempts, kind| FetchError {
        naif_id,
        attempts,
        kind,
    };

    if !start_delay.is_zero() && !sleep_or_cancel(start_delay, &mut cancel).await {
        return Err(failure(0, FetchErrorKind::Cancelled));
    }

    let mut last_failure = FetchErrorKind::Exhausted;
    for trial in 0..policy.trial_count_limit {
        if *cancel.borrow() {
            return Err(failure(trial, FetchErrorKind::Cancelled));
        }
        debug!("querying Horizons for {naif_id}, attempt {}", trial + 1);
        let result = tokio::select! {
            result = source.fetch(&query) => result,
            _ = cancelled(&mut cancel) => {
                return Err(failure(trial + 1, FetchErrorKind::Cancelled));
            }
        };
        match result {
            Ok(content) if ResponseStatus::validate(&content) == ResponseStatus::Ok => {
                return Ok((naif_id, content));
            }
            Ok(_) => last_failure = FetchErrorKind::Exhausted,
            Err(e) => {
                warn!("Horizons query for {naif_id} failed: {e}");
                last_failure = FetchErrorKind::Transport(e.to_string());
            }
        }
        if trial + 1 < policy.trial_count_limit {
            let delay = policy.backoff(trial);
            info!(
                "Horizons query for {naif_id} {}, retrying in {delay:?}",
                retry_reason(&last_failure)
            );
            if !sleep_or_cancel(delay, &mut cancel).await {
                return Err(failure(trial + 1, FetchErrorKind::Cancelled));
            }
        }
    }
    warn!(
        "giving up on {naif_id} after {} attempt(s)",
        policy.trial_count_limit
    );
    Err(failure(policy.trial_count_limit, last_failure))
}

/// Run a batch of queries to completion
///
/// Arguments
/// ---------
/// * `source`: where the queries are sent
/// * `queries`: the batch, a query for the Sun is ignored and identical queries are sent once
/// * `strategy`: sequential or concurrent execution
/// * `policy`: retry limits and delays
/// * `cancellation`: flag checked by every pending sleep and request
///
/// Return
/// ------
/// * every payload keyed by the query `COMMAND`, and one error per failed query, sorted by id
pub async fn fetch_queries<S: HorizonsSource>(
    source: Arc<S>,
    queries: Vec<HorizonsQuery>,
    strategy: FetchStrategy,
    policy: RetryPolicy,
    cancellation: &FetchCancellation,
) -> FetchOutcome {
    let mut seen = HashSet::new();
    let queries: Vec<HorizonsQuery> = queries
        .into_iter()
        .filter(|query| query.command != SUN_NAIF_ID)
        .filter(|query| seen.insert(query.clone()))
        .collect();
    let count = queries.len();
    let mut outcome = FetchOutcome::default();

    match strategy {
        FetchStrategy::Sequential => {
            for query in queries {
                let result = run_query(
                    Arc::clone(&source),
                    query,
                    policy,
                    Duration::ZERO,
                    cancellation.subscribe(),
                )
                .await;
                outcome.record(result);
            }
        }
        FetchStrategy::ExponentialBackoff => {
            let mut jobs = JoinSet::new();
            for (index, query) in queries.into_iter().enumerate() {
                let delay = policy.job_stagger * index as u32;
                jobs.spawn(run_query(
                    Arc::clone(&source),
                    query,
                    policy,
                    delay,
                    cancellation.subscribe(),
                ));
            }
            while let Some(joined) = jobs.join_next().await {
                match joined {
                    Ok(result) => outcome.record(result),
                    Err(e) => error!("Horizons job aborted: {e}"),
                }
            }
        }
    }

    outcome.errors.sort_by_key(|e| e.naif_id);
    info!(
        "Horizons fetch done: {}/{} payload(s), {} error(s)",
        outcome.raw.len(),
        count,
        outcome.errors.len()
    );
    outcome
}

#[cfg(test)]
mod fetch_test {
    use super::*;

    #[test]
    fn test_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_retry_reason() {
        assert_eq!(retry_reason(&FetchErrorKind::Exhausted), "busy");
        assert_eq!(retry_reason(&FetchErrorKind::Transport("503".into())), "failed");
    }

    #[test]
    fn test_cancellation_flag() {
        let cancellation = FetchCancellation::new();
        let receiver = cancellation.subscribe();
        assert!(!cancellation.is_cancelled());
        cancellation.clone().cancel();
        assert!(cancellation.is_cancelled());
        assert!(*receiver.borrow());
    }

    #[test]
    fn test_strategy_names() {
        #[derive(Deserialize)]
        struct Holder {
            strategy: FetchStrategy,
        }
        let holder: Holder = toml::from_str("strategy = \"sequential\"").unwrap();
        assert_eq!(holder.strategy, FetchStrategy::Sequential);
        assert_eq!(FetchStrategy::default(), FetchStrategy::ExponentialBackoff);
    }
}
