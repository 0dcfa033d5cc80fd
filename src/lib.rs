//! # stxy
//!
//! Samples the HAProxy CSV stats page at a fixed interval and relays per-backend
//! metrics to statsd.
//!
//! - **`fetcher`** / **`retry`**: one HTTP fetch per attempt, retried with a fixed delay
//!   until too many attempts in a row fail
//! - **`baseline`**: counter values of the previous sample
//! - **`emitter`**: gauges as read, counters as the delta to the baseline
//! - **`sink`**: statsd over UDP
//! - **`poller`**: the `Init -> Steady -> Terminated` loop tying it together

#[macro_use]
extern crate tracing;

pub mod baseline;
pub mod emitter;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod metrics;
pub mod poller;
pub mod retry;
pub mod sink;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use baseline::Baseline;
pub use emitter::{
    EmitReport,
    Emission,
    Emitter,
};
pub use error::{
    EmitError,
    FetchError,
    RetryExhausted,
};
pub use fetcher::{
    HttpSnapshotSource,
    SnapshotSource,
};
pub use logging::init_logging;
pub use poller::{
    PollState,
    Poller,
};
pub use retry::RetryingFetcher;
pub use sink::{
    MetricsSink,
    StatsdSink,
};
pub use snapshot::Snapshot;

pub fn init_errors() -> color_eyre::Result<()> {
    color_eyre::install()
}
