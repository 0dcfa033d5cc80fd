#[macro_use]
extern crate tracing;

mod app_config;
mod args;

pub use app_config::get_config_dir;
pub use args::Args;
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Duration;
use url::Url;

/// Samples closer together than this are rejected at startup.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Interval of {interval_ms}ms is below the minimum of {min_ms}ms")]
    IntervalTooShort { interval_ms: u64, min_ms: u64 },
    #[error("The statsd address must not be empty")]
    MissingStatsdUrl,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub haproxy_url: Url,
    #[serde(default)]
    pub haproxy_user: String,
    #[serde(default)]
    pub haproxy_pass: String,
    pub statsd_url: String,
    #[serde(default)]
    pub prefix: String,
    /// Milliseconds between two samples.
    pub interval: u64,
    pub max_failures: u32,
    /// Milliseconds a single stats request may take.
    pub request_timeout: u64,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    /// Layers the built-in defaults, the optional YAML config file and the command line.
    ///
    /// The config file is `--config` when given (and then must exist), otherwise
    /// `config.yaml` in [`get_config_dir`] if present.
    pub fn new(args: Args) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let source = match &args.config {
            Some(path) => config::File::from(path.clone()).required(true),
            None => config::File::from(get_config_dir().join("config.yaml")).required(false),
        };
        builder = builder.add_source(source.format(config::FileFormat::Yaml));

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(haproxy_url = %cfg.haproxy_url, statsd_url = %cfg.statsd_url, cfg.interval, "Loaded configuration");

        Ok(cfg)
    }

    /// Rejects settings the poll loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval() < MIN_INTERVAL {
            return Err(ConfigError::IntervalTooShort {
                interval_ms: self.interval,
                min_ms: MIN_INTERVAL.as_millis() as u64,
            });
        }
        if self.statsd_url.trim().is_empty() {
            return Err(ConfigError::MissingStatsdUrl);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    /// Basic auth is only used when both username and password are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.haproxy_user.is_empty() || self.haproxy_pass.is_empty() {
            None
        } else {
            Some((&self.haproxy_user, &self.haproxy_pass))
        }
    }
}
