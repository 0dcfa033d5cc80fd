use crate::{
    error::RetryExhausted,
    fetcher::SnapshotSource,
    snapshot::Snapshot,
};
use std::time::Duration;
use tokio::time::sleep;

/// Pause between two attempts after a failed fetch.
pub const RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Retries a [`SnapshotSource`] with a fixed delay until it succeeds or more than
/// `max_failures` attempts in a row have failed.
pub struct RetryingFetcher<S> {
    source: S,
    max_failures: u32,
    delay: Duration,
}

impl<S: SnapshotSource> RetryingFetcher<S> {
    pub fn new(source: S, max_failures: u32) -> Self {
        Self {
            source,
            max_failures,
            delay: RETRY_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    /// The failure tally lives only for the duration of this call.
    pub async fn fetch(&self) -> Result<Snapshot, RetryExhausted> {
        let mut failures: u32 = 0;
        loop {
            match self.source.fetch().await {
                Ok(snapshot) => {
                    if failures > 0 {
                        info!(failures, "Stats endpoint reachable again");
                    }
                    return Ok(snapshot);
                }
                Err(err) if failures < self.max_failures => {
                    failures += 1;
                    let attempts_left = self.max_failures - failures + 1;
                    warn!(
                        %err,
                        failures,
                        attempts_left,
                        "Failed to fetch stats, retrying in {:?}...",
                        self.delay
                    );
                    sleep(self.delay).await;
                }
                // Reported by the caller, which owns the exit.
                Err(err) => {
                    return Err(RetryExhausted {
                        max_failures: self.max_failures,
                        last: err,
                    });
                }
            }
        }
    }
}
