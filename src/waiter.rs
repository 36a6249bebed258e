//! Fixed-interval polling of a [`Condition`] with a hard deadline.
//!
//! The first check runs immediately; subsequent checks start every
//! `poll_interval` until the condition is satisfied, reports a definitive
//! failure, or the deadline passes.  Each wait runs inside a span named after
//! the condition (`otel.name`, with the condition name also in `condition`),
//! and logs its start and its elapsed time on every exit path.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{info, info_span, Instrument};

use crate::client::ResourceClient;
use crate::condition::Condition;
use crate::error::{Error, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// Polling cadence and time budget of a [`Waiter`].  Only built through
/// [`WaitConfig::new`] or [`Default`], so the interval is never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitConfig {
    poll_interval: Duration,
    deadline: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl WaitConfig {
    pub fn new(poll_interval: Duration, deadline: Duration) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(Error::config("poll interval must be greater than zero"));
        }
        if deadline < poll_interval {
            return Err(Error::config(format!(
                "deadline {deadline:?} is shorter than the poll interval {poll_interval:?}"
            )));
        }
        Ok(Self {
            poll_interval,
            deadline,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// The record of a single wait.
#[derive(Debug)]
pub struct WaitOutcome {
    pub condition_name: String,
    pub satisfied: bool,
    pub error: Option<Error>,
    pub elapsed: Duration,
    /// Number of `check` invocations, including the immediate first one.
    pub polls: u32,
}

impl WaitOutcome {
    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Polls conditions against a shared client.
#[derive(Clone)]
pub struct Waiter {
    client: Arc<dyn ResourceClient>,
    config: WaitConfig,
}

impl Waiter {
    pub fn new(client: Arc<dyn ResourceClient>, config: WaitConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &dyn ResourceClient {
        self.client.as_ref()
    }

    pub fn shared_client(&self) -> Arc<dyn ResourceClient> {
        self.client.clone()
    }

    pub fn config(&self) -> WaitConfig {
        self.config
    }

    /// Wait until `condition` is satisfied.  Returns [`Error::ConditionFailed`]
    /// if the condition reports a definitive failure and [`Error::Timeout`] if
    /// the deadline passes first.
    pub async fn wait_for(&self, condition: &dyn Condition) -> Result<()> {
        self.observe(condition).await.into_result()
    }

    /// Like [`Waiter::wait_for`], but returns the full [`WaitOutcome`].
    pub async fn observe(&self, condition: &dyn Condition) -> WaitOutcome {
        let name = condition.name().to_string();
        let span = info_span!("wait_for", otel.name = %name, condition = %name);
        async {
            let start = Instant::now();
            info!("wait for {name}");
            let (polls, result) = self.poll(condition, &name, start).await;
            let elapsed = start.elapsed();
            info!(
                polls,
                satisfied = result.is_ok(),
                "waiting completed for {name} after {elapsed:?}"
            );
            WaitOutcome {
                condition_name: name.clone(),
                satisfied: result.is_ok(),
                error: result.err(),
                elapsed,
                polls,
            }
        }
        .instrument(span)
        .await
    }

    async fn poll(&self, condition: &dyn Condition, name: &str, start: Instant) -> (u32, Result<()>) {
        let deadline = start + self.config.deadline;
        let timeout = || Error::Timeout {
            condition: name.to_string(),
            elapsed: start.elapsed(),
        };
        let mut polls = 0;
        loop {
            let poll_started = Instant::now();
            polls += 1;
            // A check still running at the deadline is abandoned.
            match timeout_at(deadline, condition.check(self.client())).await {
                Ok(Ok(true)) => return (polls, Ok(())),
                Ok(Ok(false)) => {}
                Ok(Err(source)) => {
                    return (
                        polls,
                        Err(Error::ConditionFailed {
                            condition: name.to_string(),
                            elapsed: start.elapsed(),
                            source: Box::new(source),
                        }),
                    )
                }
                Err(_) => return (polls, Err(timeout())),
            }
            if Instant::now() >= deadline {
                return (polls, Err(timeout()));
            }
            // The last check happens exactly at the deadline.
            sleep_until((poll_started + self.config.poll_interval).min(deadline)).await;
        }
    }
}
