//! Turns a snapshot and the previous baseline into statsd emissions.
//!
//! Gauges are sent as read. Counters are sent as the difference to the baseline.
//! A counter without a baseline entry (first sample, or an entity that just
//! appeared) is compared against 0, so its first emission carries the full
//! cumulative value.

use crate::{
    baseline::Baseline,
    metrics::{
        MetricKind,
        METRICS,
    },
    sink::MetricsSink,
    snapshot::Snapshot,
};
use futures::StreamExt as _;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

/// Upper bound on sends in flight within one cycle.
pub const EMIT_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub entity: String,
    pub metric: &'static str,
    pub kind: MetricKind,
    pub value: i64,
}

impl Emission {
    /// `<prefix.>entity.metric`, the prefix segment is dropped when empty.
    pub fn stat(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            format!("{}.{}", self.entity, self.metric)
        } else {
            format!("{}.{}.{}", prefix, self.entity, self.metric)
        }
    }

    /// statsd line protocol, e.g. `haproxy.api.hrsp_2xx:40|c`.
    pub fn line(&self, prefix: &str) -> String {
        format!("{}:{}|{}", self.stat(prefix), self.value, self.kind.statsd_suffix())
    }
}

/// Computes every emission of one cycle. Non-aggregate records are ignored.
pub fn compute(snapshot: &Snapshot, baseline: &Baseline) -> Vec<Emission> {
    let mut emissions = Vec::new();
    for record in snapshot.aggregates() {
        let entity = record.name();
        for def in METRICS {
            let current = match record.value(def.position) {
                Ok(value) => value,
                Err(err) => {
                    warn!(entity, metric = def.name, kind = def.kind.as_str(), %err, "Skipping metric");
                    continue;
                }
            };
            let value = match def.kind {
                MetricKind::Gauge => current,
                MetricKind::Counter => {
                    let previous = baseline.get(entity, def.name).unwrap_or(0);
                    match current.checked_sub(previous) {
                        Some(delta) => delta,
                        None => {
                            warn!(
                                entity,
                                metric = def.name,
                                kind = def.kind.as_str(),
                                current,
                                previous,
                                "Skipping metric, delta out of range"
                            );
                            continue;
                        }
                    }
                }
            };
            emissions.push(Emission {
                entity: entity.to_string(),
                metric: def.name,
                kind: def.kind,
                value,
            });
        }
    }
    emissions
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct Emitter<K> {
    sink: K,
    prefix: String,
    echo: bool,
    concurrency: usize,
}

impl<K: MetricsSink> Emitter<K> {
    pub fn new(sink: K, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
            echo: true,
            concurrency: EMIT_CONCURRENCY,
        }
    }

    /// Disables the stdout copy of every sent line.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.echo = !quiet;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Sends all emissions and returns once every send has finished.
    ///
    /// A failed send is logged and counted. It never stops the remaining sends.
    pub async fn emit(&self, emissions: Vec<Emission>) -> EmitReport {
        let sent = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let (sent_ref, failed_ref) = (&sent, &failed);

        futures::stream::iter(emissions)
            .for_each_concurrent(self.concurrency, |emission| async move {
                let line = emission.line(&self.prefix);
                match self.sink.send(&line).await {
                    Ok(()) => {
                        if self.echo {
                            println!("{line}");
                        }
                        sent_ref.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        warn!(%err, stat = emission.stat(&self.prefix), "Error sending metric");
                        failed_ref.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
            .await;

        EmitReport {
            sent: sent.into_inner(),
            failed: failed.into_inner(),
        }
    }
}
