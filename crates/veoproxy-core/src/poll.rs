//! Poll-loop wrappers over the status resolver.
//!
//! Two scheduling variants share one normalization path
//! ([`crate::NormalizedStatus::from_raw`]): a cooperative loop with no
//! deadline for caller-driven polling, and a blocking wait bounded by a
//! clamped wall-clock timeout for the synchronous "wait and redirect" flow.

use crate::client::VeoClient;
use crate::error::{Error, Result};
use crate::status::NormalizedStatus;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Fixed delay between consecutive status fetches
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Floor for the blocking wait's timeout
pub const MIN_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Ceiling for the blocking wait's timeout
pub const MAX_WAIT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Timeout used when the caller supplies none
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Clamp a caller-supplied wait timeout into `[10 s, 60 min]`, defaulting
/// to ten minutes.
pub fn clamp_wait_timeout(requested: Option<Duration>) -> Duration {
    requested
        .unwrap_or(DEFAULT_WAIT_TIMEOUT)
        .clamp(MIN_WAIT_TIMEOUT, MAX_WAIT_TIMEOUT)
}

/// Map a terminal status to the blocking wait's outcome: a result, an
/// operation failure, or the done-without-result anomaly.
fn terminal_outcome(status: NormalizedStatus) -> Result<NormalizedStatus> {
    if let Some(failure) = &status.error {
        return Err(Error::Operation(failure.message.clone()));
    }
    if status.file_uri.is_some() {
        return Ok(status);
    }
    Err(Error::MissingResult { raw: status.raw })
}

impl VeoClient {
    /// Client-driven variant: poll at the configured interval with no
    /// overall deadline and return the first terminal status, whether it
    /// carries a result, an error payload, or neither. Cancellation is
    /// dropping the future.
    pub async fn poll_until_done(&self, name: &str) -> Result<NormalizedStatus> {
        let mut polls = 0u32;
        loop {
            polls += 1;
            let status = self.fetch_status(name).await?;
            debug!(operation = name, poll = polls, done = status.done, "poll");
            if status.done {
                return Ok(status);
            }
            tokio::time::sleep(self.config().poll_interval).await;
        }
    }

    /// Server-driven variant: block until the operation resolves to a file
    /// reference, fails, or the clamped timeout elapses.
    pub async fn wait_for_completion(
        &self,
        name: &str,
        timeout: Option<Duration>,
    ) -> Result<NormalizedStatus> {
        let timeout = clamp_wait_timeout(timeout);
        self.wait_until_deadline(name, Instant::now() + timeout)
            .await
    }

    /// The explicit-deadline form of [`VeoClient::wait_for_completion`].
    /// Checks the deadline before every iteration; a deadline that elapses
    /// without a terminal state yields [`Error::Timeout`] carrying the last
    /// observed raw status.
    pub async fn wait_until_deadline(
        &self,
        name: &str,
        deadline: Instant,
    ) -> Result<NormalizedStatus> {
        let mut last = None;
        let mut polls = 0u32;

        while Instant::now() < deadline {
            polls += 1;
            let status = self.fetch_status(name).await?;
            debug!(
                operation = name,
                poll = polls,
                done = status.done,
                file_uri = status.file_uri.as_deref(),
                "wait poll"
            );

            if status.done {
                if status.file_uri.is_none() && status.error.is_none() {
                    warn!(operation = name, "operation done but no video file URI found");
                }
                return terminal_outcome(status);
            }

            last = Some(status.raw);
            tokio::time::sleep(self.config().poll_interval).await;
        }

        warn!(operation = name, polls, "deadline elapsed waiting for operation");
        Err(Error::Timeout { last })
    }
}
