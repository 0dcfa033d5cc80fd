use crate::{
    error::FetchError,
    snapshot::Snapshot,
};
use reqwest::Client as HttpClient;
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};
use stxy_config::Config;
use url::Url;

/// Anything that can produce one snapshot of the stats page per call.
pub trait SnapshotSource: Send + Sync {
    /// Performs exactly one attempt, without retrying.
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Snapshot, FetchError>> + Send + '_>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Reads the CSV stats page over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    http_client: HttpClient,
    url: Url,
    credentials: Option<Credentials>,
}

impl HttpSnapshotSource {
    pub fn new(url: Url, credentials: Option<Credentials>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url,
            credentials,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let credentials = config.credentials().map(|(username, password)| Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        Self::new(config.haproxy_url.clone(), credentials, config.request_timeout())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch_once(&self) -> Result<Snapshot, FetchError> {
        let mut request = self.http_client.get(self.url.clone());
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let snapshot = Snapshot::parse(&body)?;
        trace!(url = %self.url, records = snapshot.len(), "Fetched stats");
        Ok(snapshot)
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Snapshot, FetchError>> + Send + '_>> {
        Box::pin(self.fetch_once())
    }
}
