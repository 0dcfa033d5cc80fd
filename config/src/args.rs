use clap::Parser;
use std::path::PathBuf;

/// HAProxy stats to statsd
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "stxy", author, version, about, long_about = None)]
pub struct Args {
    /// URL of the HAProxy CSV stats endpoint.
    #[arg(long, env = "STXY_HAPROXY_URL", value_name = "URL")]
    pub haproxy_url: Option<String>,

    /// HTTP basic auth username for the stats endpoint.
    #[arg(long, env = "STXY_HAPROXY_USER", value_name = "USER")]
    pub haproxy_user: Option<String>,

    /// HTTP basic auth password for the stats endpoint.
    #[arg(long, env = "STXY_HAPROXY_PASS", value_name = "PASSWORD")]
    pub haproxy_pass: Option<String>,

    /// host:port of the statsd server.
    #[arg(short = 's', long, env = "STXY_STATSD_URL", value_name = "HOST:PORT")]
    pub statsd_url: Option<String>,

    /// statsd namespace prepended to every metric.
    #[arg(short, long, env = "STXY_PREFIX")]
    pub prefix: Option<String>,

    /// Time between two samples in milliseconds.
    #[arg(short, long, env = "STXY_INTERVAL", value_name = "MILLISECONDS")]
    pub interval: Option<u64>,

    /// Contiguous fetch failures tolerated before giving up.
    #[arg(long, env = "STXY_MAX_FAILURES", value_name = "COUNT")]
    pub max_failures: Option<u64>,

    /// Timeout of a single stats request in milliseconds.
    #[arg(long, value_name = "MILLISECONDS")]
    pub request_timeout: Option<u64>,

    /// Do not echo emitted metrics to stdout.
    #[arg(short, long, action)]
    pub quiet: bool,

    /// Log fetched records and per-metric details.
    #[arg(short, long, action)]
    pub debug: bool,

    /// Path to a YAML config file.
    #[arg(short, long, env = "STXY_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(url) = &self.haproxy_url {
                cache.insert("haproxy_url".to_string(), url.clone().into());
            }
            if let Some(user) = &self.haproxy_user {
                cache.insert("haproxy_user".to_string(), user.clone().into());
            }
            if let Some(pass) = &self.haproxy_pass {
                cache.insert("haproxy_pass".to_string(), pass.clone().into());
            }
            if let Some(statsd_url) = &self.statsd_url {
                cache.insert("statsd_url".to_string(), statsd_url.clone().into());
            }
            if let Some(prefix) = &self.prefix {
                cache.insert("prefix".to_string(), prefix.clone().into());
            }
            if let Some(interval) = self.interval {
                cache.insert("interval".to_string(), interval.into());
            }
            if let Some(max_failures) = self.max_failures {
                cache.insert("max_failures".to_string(), max_failures.into());
            }
            if let Some(timeout) = self.request_timeout {
                cache.insert("request_timeout".to_string(), timeout.into());
            }
            if self.quiet {
                cache.insert("quiet".to_string(), true.into());
            }
            if self.debug {
                cache.insert("debug".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}
