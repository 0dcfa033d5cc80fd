//! The fixed mapping from HAProxy CSV columns to emitted metrics.
//!
//! Positions follow the column order of HAProxy's `show stat` CSV output
//! (`pxname,svname,qcur,qmax,scur,...`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Instantaneous value, sent as read.
    Gauge,
    /// Cumulative at the source, sent as the change since the previous sample.
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }

    /// Type suffix of the statsd line protocol.
    pub fn statsd_suffix(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "g",
            MetricKind::Counter => "c",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    pub name: &'static str,
    pub position: usize,
    pub kind: MetricKind,
}

impl MetricDefinition {
    const fn gauge(name: &'static str, position: usize) -> Self {
        Self {
            name,
            position,
            kind: MetricKind::Gauge,
        }
    }

    const fn counter(name: &'static str, position: usize) -> Self {
        Self {
            name,
            position,
            kind: MetricKind::Counter,
        }
    }
}

pub const METRICS: &[MetricDefinition] = &[
    MetricDefinition::gauge("scur", 4),
    MetricDefinition::gauge("smax", 5),
    MetricDefinition::gauge("bin", 8),
    MetricDefinition::gauge("bout", 9),
    MetricDefinition::gauge("ereq", 12),
    MetricDefinition::gauge("econ", 13),
    MetricDefinition::gauge("rate", 33),
    MetricDefinition::counter("hrsp_1xx", 39),
    MetricDefinition::counter("hrsp_2xx", 40),
    MetricDefinition::counter("hrsp_3xx", 41),
    MetricDefinition::counter("hrsp_4xx", 42),
    MetricDefinition::counter("hrsp_5xx", 43),
    MetricDefinition::gauge("qtime", 58),
    MetricDefinition::gauge("ctime", 59),
    MetricDefinition::gauge("rtime", 60),
    MetricDefinition::gauge("ttime", 61),
];

pub fn counters() -> impl Iterator<Item = &'static MetricDefinition> {
    METRICS.iter().filter(|def| def.kind == MetricKind::Counter)
}

pub fn find(name: &str) -> Option<&'static MetricDefinition> {
    METRICS.iter().find(|def| def.name == name)
}
