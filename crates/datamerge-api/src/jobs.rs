//! Asynchronous job tracking and polling.
//!
//! Every long-running Datamerge operation follows the same shape: a start call
//! returns a [`JobHandle`], and a status endpoint is polled until the job
//! reaches a terminal state. [`start_and_await`] implements that loop once,
//! parameterized by the capability-specific start and fetch operations.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Poll interval applied when the caller supplies none (or a non-positive one).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Overall deadline applied when the caller supplies none (or a non-positive one).
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;

/// Status tokens treated as terminal success. Upstream vocabularies vary
/// across API revisions; this set is the observed union.
const SUCCESS_TOKENS: &[&str] = &["completed", "succeeded", "finished"];
/// Status tokens treated as terminal failure.
const FAILURE_TOKENS: &[&str] = &["failed", "error", "errored", "cancelled"];

/// Response of a start call: the job id to poll plus whatever else upstream
/// attached to the acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHandle {
    #[serde(alias = "id")]
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One observation of an asynchronous job. All fields are optional because
/// upstream status payloads are loosely typed; unrecognized keys are kept in
/// `extra` and round-trip unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(alias = "id", skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_ids: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl JobStatus {
    fn has_results(&self) -> bool {
        self.results.as_ref().is_some_and(|r| !r.is_empty())
    }
}

/// Classification of a job observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Succeeded,
    Failed,
    InProgress,
}

impl JobState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Succeeded => "completed",
            JobState::Failed => "failed",
            JobState::InProgress => "in_progress",
        }
    }
}

/// Classify a job observation.
///
/// An explicit failure token always wins. Otherwise a non-empty result list is
/// terminal success even when the status token is unrecognized: upstream status
/// vocabularies are not stable, and result presence is the stronger signal.
#[must_use]
pub fn classify(job: &JobStatus) -> JobState {
    let token = job
        .status
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if FAILURE_TOKENS.contains(&token.as_str()) {
        return JobState::Failed;
    }
    if job.has_results() || SUCCESS_TOKENS.contains(&token.as_str()) {
        return JobState::Succeeded;
    }
    JobState::InProgress
}

/// Poll cadence for [`start_and_await`]. `None` or zero fields fall back to
/// the module defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollOptions {
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl PollOptions {
    fn interval(self) -> Duration {
        Duration::from_secs(
            self.interval_secs
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    fn timeout(self) -> Duration {
        Duration::from_secs(
            self.timeout_secs
                .filter(|&v| v > 0)
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
        )
    }
}

/// Terminal outcome of [`start_and_await`].
///
/// `TimedOut` is not an error: it carries the job id so the caller can resume
/// polling through the capability's status endpoint.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(JobStatus),
    Failed(JobStatus),
    TimedOut { job_id: String },
}

/// Start a job and poll its status until it is terminal or the deadline
/// elapses.
///
/// A start failure propagates immediately (no polling). Status-fetch failures
/// during the loop also propagate immediately; only elapsed time drives the
/// next iteration, never failure-triggered backoff.
///
/// Each invocation is an independent unit of concurrency; the only suspension
/// points are the interval sleep and the network round-trips.
pub async fn start_and_await<S, SFut, F, FFut>(
    start: S,
    fetch_status: F,
    options: PollOptions,
) -> Result<JobOutcome>
where
    S: FnOnce() -> SFut,
    SFut: Future<Output = Result<JobHandle>>,
    F: Fn(String) -> FFut,
    FFut: Future<Output = Result<JobStatus>>,
{
    let interval = options.interval();
    let deadline = options.timeout();

    let handle = start().await?;
    let job_id = handle.job_id;
    let started = Instant::now();
    tracing::debug!(job_id = %job_id, status = handle.status.as_deref().unwrap_or("<none>"), "job started");

    loop {
        tokio::time::sleep(interval).await;

        let mut job = fetch_status(job_id.clone()).await?;
        if job.job_id.is_none() {
            job.job_id = Some(job_id.clone());
        }

        let state = classify(&job);
        tracing::debug!(
            job_id = %job_id,
            status = job.status.as_deref().unwrap_or("<none>"),
            state = state.as_str(),
            elapsed = ?started.elapsed(),
            "job polled"
        );

        match state {
            JobState::Succeeded => return Ok(JobOutcome::Completed(job)),
            JobState::Failed => return Ok(JobOutcome::Failed(job)),
            JobState::InProgress => {}
        }

        if started.elapsed() >= deadline {
            tracing::debug!(job_id = %job_id, elapsed = ?started.elapsed(), "job poll deadline reached");
            return Ok(JobOutcome::TimedOut { job_id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn status(token: Option<&str>, results: Option<Vec<Value>>) -> JobStatus {
        JobStatus {
            job_id: Some("job-1".to_string()),
            status: token.map(str::to_string),
            results,
            record_ids: None,
            extra: serde_json::Map::new(),
        }
    }

    fn handle(job_id: &str) -> JobHandle {
        JobHandle {
            job_id: job_id.to_string(),
            status: Some("queued".to_string()),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn classification_table() {
        // Success token, empty results: terminal success.
        assert_eq!(
            classify(&status(Some("completed"), Some(vec![]))),
            JobState::Succeeded
        );
        // Unrecognized/in-progress token with results: result presence wins.
        assert_eq!(
            classify(&status(Some("queued"), Some(vec![json!({"domain": "acme.com"})]))),
            JobState::Succeeded
        );
        // Failure token wins regardless of results.
        assert_eq!(
            classify(&status(Some("failed"), Some(vec![json!({"domain": "acme.com"})]))),
            JobState::Failed
        );
        // In-progress token, no results: keep polling.
        assert_eq!(
            classify(&status(Some("processing"), None)),
            JobState::InProgress
        );
        // Token matching is trim + case insensitive.
        assert_eq!(
            classify(&status(Some("  FINISHED "), None)),
            JobState::Succeeded
        );
        // Missing status, no results: in progress.
        assert_eq!(classify(&status(None, None)), JobState::InProgress);
    }

    #[test]
    fn poll_options_fall_back_on_non_positive_values() {
        let zero = PollOptions {
            interval_secs: Some(0),
            timeout_secs: Some(0),
        };
        assert_eq!(
            zero.interval(),
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );
        assert_eq!(zero.timeout(), Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS));

        let unset = PollOptions::default();
        assert_eq!(
            unset.interval(),
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );

        let explicit = PollOptions {
            interval_secs: Some(2),
            timeout_secs: Some(30),
        };
        assert_eq!(explicit.interval(), Duration::from_secs(2));
        assert_eq!(explicit.timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn start_failure_propagates_without_polling() {
        let fetches = Arc::new(AtomicU32::new(0));
        let fetches_in_loop = fetches.clone();

        let result = start_and_await(
            || async {
                Err(ApiError::Upstream {
                    status: 402,
                    message: "insufficient credits".to_string(),
                })
            },
            move |_id: String| {
                let fetches = fetches_in_loop.clone();
                async move {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(status(Some("processing"), None))
                }
            },
            PollOptions::default(),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Upstream { status: 402, .. })));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_terminal_success_as_soon_as_observed() {
        let polls = Arc::new(AtomicU32::new(0));
        let polls_in_loop = polls.clone();

        let outcome = start_and_await(
            || async { Ok(handle("job-7")) },
            move |_id: String| {
                let polls = polls_in_loop.clone();
                async move {
                    let n = polls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Ok(status(Some("processing"), None))
                    } else {
                        Ok(status(Some("completed"), Some(vec![json!({"domain": "acme.com"})])))
                    }
                }
            },
            PollOptions {
                interval_secs: Some(1),
                timeout_secs: Some(60),
            },
        )
        .await
        .expect("poll");

        let JobOutcome::Completed(job) = outcome else {
            panic!("expected completed outcome, got {outcome:?}");
        };
        assert_eq!(job.job_id.as_deref(), Some("job-7"));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_token_surfaces_job_id_and_status() {
        let outcome = start_and_await(
            || async { Ok(handle("job-9")) },
            |_id: String| async { Ok(status(Some("errored"), None)) },
            PollOptions {
                interval_secs: Some(1),
                timeout_secs: Some(10),
            },
        )
        .await
        .expect("poll");

        let JobOutcome::Failed(job) = outcome else {
            panic!("expected failed outcome, got {outcome:?}");
        };
        assert_eq!(job.job_id.as_deref(), Some("job-9"));
        assert_eq!(job.status.as_deref(), Some("errored"));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_at_deadline_with_resumable_job_id() {
        let polls = Arc::new(AtomicU32::new(0));
        let polls_in_loop = polls.clone();
        let started = Instant::now();

        let outcome = start_and_await(
            || async { Ok(handle("job-2")) },
            move |_id: String| {
                let polls = polls_in_loop.clone();
                async move {
                    polls.fetch_add(1, Ordering::SeqCst);
                    Ok(status(Some("processing"), None))
                }
            },
            PollOptions {
                interval_secs: Some(1),
                timeout_secs: Some(2),
            },
        )
        .await
        .expect("poll");

        let JobOutcome::TimedOut { job_id } = outcome else {
            panic!("expected timeout outcome, got {outcome:?}");
        };
        assert_eq!(job_id, "job-2");
        // Two 1s sleeps before the 2s deadline trips: not earlier, not later.
        assert_eq!(polls.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_propagates_mid_loop() {
        let result = start_and_await(
            || async { Ok(handle("job-3")) },
            |_id: String| async {
                Err(ApiError::Upstream {
                    status: 500,
                    message: "boom".to_string(),
                })
            },
            PollOptions {
                interval_secs: Some(1),
                timeout_secs: Some(10),
            },
        )
        .await;

        assert!(matches!(result, Err(ApiError::Upstream { status: 500, .. })));
    }

    #[test]
    fn job_status_preserves_unrecognized_fields() {
        let raw = json!({
            "job_id": "job-4",
            "status": "queued",
            "queue_position": 12,
            "requested_by": "api"
        });
        let job: JobStatus = serde_json::from_value(raw).expect("parse");
        assert_eq!(job.extra.get("queue_position"), Some(&json!(12)));

        let back = serde_json::to_value(&job).expect("serialize");
        assert_eq!(back.get("requested_by"), Some(&json!("api")));
    }
}
