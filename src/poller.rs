//! The sampling loop.
//!
//! ```text
//! Init --fetch ok--> Steady --fetch ok--> Steady ...
//!   |                  |
//!   +---exhausted------+------> Terminated
//! ```
//!
//! The baseline is owned by the [`PollState`] and handed from cycle to cycle, the
//! poller itself keeps no sample state.

use crate::{
    baseline::Baseline,
    emitter::{
        self,
        EmitReport,
        Emitter,
    },
    error::RetryExhausted,
    fetcher::{
        HttpSnapshotSource,
        SnapshotSource,
    },
    retry::RetryingFetcher,
    sink::{
        MetricsSink,
        StatsdSink,
    },
    snapshot::Snapshot,
};
use eyre::{
    Context as _,
    Result,
};
use std::time::Duration;
use stxy_config::Config;
use tokio::time::sleep;

const CYCLE_SEPARATOR: &str = "-------------------";

/// Every record of a sample, aggregate or not. Only visible with `--debug`.
fn dump_records(sample: &str, snapshot: &Snapshot) {
    for record in snapshot.iter() {
        debug!(sample, entity = record.name(), role = record.role(), fields = ?record.fields(), "Record");
    }
}

#[derive(Debug)]
pub enum PollState {
    Init,
    Steady(Baseline),
    Terminated(RetryExhausted),
}

pub struct Poller<S, K> {
    fetcher: RetryingFetcher<S>,
    emitter: Emitter<K>,
    interval: Duration,
}

impl Poller<HttpSnapshotSource, StatsdSink> {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let source = HttpSnapshotSource::from_config(config).context("Failed to create HTTP client")?;
        let sink = StatsdSink::connect(&config.statsd_url)
            .await
            .wrap_err_with(|| format!("Failed to set up statsd client for {}", config.statsd_url))?;

        let fetcher = RetryingFetcher::new(source, config.max_failures);

        info!(
            url = %fetcher.source().url(),
            statsd = %config.statsd_url,
            prefix = %config.prefix,
            max_failures = fetcher.max_failures(),
            "Sampling HAProxy stats"
        );

        Ok(Self::new(
            fetcher,
            Emitter::new(sink, config.prefix.clone()).quiet(config.quiet),
            config.interval(),
        ))
    }
}

impl<S: SnapshotSource, K: MetricsSink> Poller<S, K> {
    pub fn new(fetcher: RetryingFetcher<S>, emitter: Emitter<K>, interval: Duration) -> Self {
        Self {
            fetcher,
            emitter,
            interval,
        }
    }

    pub fn fetcher(&self) -> &RetryingFetcher<S> {
        &self.fetcher
    }

    pub fn emitter(&self) -> &Emitter<K> {
        &self.emitter
    }

    /// Emits `snapshot` against `baseline` and returns the baseline for the next cycle.
    ///
    /// All sends have completed when this returns.
    pub async fn cycle(&self, snapshot: &Snapshot, baseline: Baseline) -> (Baseline, EmitReport) {
        dump_records("current", snapshot);

        let emissions = emitter::compute(snapshot, &baseline);
        let report = self.emitter.emit(emissions).await;

        debug!("{CYCLE_SEPARATOR}");
        (Baseline::rebuild(snapshot), report)
    }

    /// Advances the state machine by one transition, including the interval sleep.
    pub async fn step(&self, state: PollState) -> PollState {
        match state {
            PollState::Init => match self.fetcher.fetch().await {
                Ok(snapshot) => {
                    dump_records("initial", &snapshot);
                    let baseline = Baseline::rebuild(&snapshot);
                    info!(entities = baseline.len(), "Initial baseline recorded");
                    sleep(self.interval).await;
                    PollState::Steady(baseline)
                }
                Err(err) => PollState::Terminated(err),
            },
            PollState::Steady(baseline) => match self.fetcher.fetch().await {
                Ok(snapshot) => {
                    let (baseline, report) = self.cycle(&snapshot, baseline).await;
                    info!(
                        entities = baseline.len(),
                        sent = report.sent,
                        failed = report.failed,
                        "Cycle complete"
                    );
                    sleep(self.interval).await;
                    PollState::Steady(baseline)
                }
                Err(err) => PollState::Terminated(err),
            },
            terminated @ PollState::Terminated(_) => terminated,
        }
    }

    /// Polls until the fetcher gives up. There is no other way out of the loop.
    pub async fn run(&self) -> RetryExhausted {
        let mut state = PollState::Init;
        loop {
            state = match self.step(state).await {
                PollState::Terminated(err) => return err,
                next => next,
            };
        }
    }
}
