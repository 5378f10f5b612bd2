//! Content fetcher
//!
//! One unauthenticated GET per capture. The result is a [`FetchOutcome`]
//! rather than an error: a 404 or a refused connection is something the
//! ledger records, not something that aborts a capture.

use crate::config::FetchConfig;
use async_trait::async_trait;
use rulewatch_core::errors::{ExError, ExErrorKind};
use rulewatch_core::model::FetchStatus;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Why no status line was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    /// Any other failure before a response (TLS, redirects, protocol)
    Request,
    /// The status was 2xx but the body could not be read
    Body,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Body => "body",
        };
        f.write_str(name)
    }
}

/// Classified result of one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { status: u16, body: String },
    HttpFailure { status: u16 },
    TransportFailure {
        kind: TransportErrorKind,
        message: String,
    },
}

impl FetchOutcome {
    /// Status to record on the snapshot
    pub fn status(&self) -> FetchStatus {
        match self {
            FetchOutcome::Success { status, .. } | FetchOutcome::HttpFailure { status } => {
                FetchStatus::Http(*status)
            }
            FetchOutcome::TransportFailure { .. } => FetchStatus::Unknown,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        FetchOutcome::TransportFailure {
            kind: TransportErrorKind::Timeout,
            message: message.into(),
        }
    }
}

/// Retrieves the raw content of a source
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

/// [`ContentFetcher`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured timeout, user agent and
    /// redirect limit
    ///
    /// # Errors
    ///
    /// `ExternalService` if the TLS backend cannot be initialised.
    pub fn new(config: &FetchConfig) -> Result<Self, ExError> {
        let redirect = if config.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(config.max_redirects)
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .redirect(redirect)
            .build()
            .map_err(|e| {
                ExError::new(ExErrorKind::ExternalService)
                    .with_op("build_http_client")
                    .with_message(e.to_string())
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn classify(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Request
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        debug!(url = %url, "HTTP fetch starting");

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = classify(&e);
                warn!(url = %url, kind = %kind, error = %e, "HTTP request failed");
                return FetchOutcome::TransportFailure {
                    kind,
                    message: e.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(url = %url, status, "HTTP fetch returned failure status");
            return FetchOutcome::HttpFailure { status };
        }

        match response.text().await {
            Ok(body) => {
                debug!(url = %url, status, bytes = body.len(), "HTTP fetch complete");
                FetchOutcome::Success { status, body }
            }
            Err(e) => {
                let kind = if e.is_timeout() {
                    TransportErrorKind::Timeout
                } else {
                    TransportErrorKind::Body
                };
                warn!(url = %url, status, kind = %kind, error = %e, "Reading body failed");
                FetchOutcome::TransportFailure {
                    kind,
                    message: e.to_string(),
                }
            }
        }
    }
}
