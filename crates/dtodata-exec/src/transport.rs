//! Network seam.
//!
//! - `MemoryTransport`: canned responses plus a request log, for tests and demos.
//! - `HttpTransport` (feature `http`): blocking GET via `ureq`.
//!
//! Implementations report network failures as `TransportError` and hand back
//! every HTTP response, whatever its status; the instance decides what a
//! non-success status means.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("no response configured for {0}")]
    NoRoute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one GET per call. No retries, no cancellation.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

type Reply = Result<TransportResponse, TransportError>;

/// In-memory transport keyed by exact URL, with an optional catch-all reply.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: Mutex<HashMap<String, Reply>>,
    fallback: Mutex<Option<Reply>>,
    requests: Mutex<Vec<String>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to every URL without a dedicated route.
    pub fn respond_with(self, response: TransportResponse) -> Self {
        *lock(&self.fallback) = Some(Ok(response));
        self
    }

    /// Fail every URL without a dedicated route.
    pub fn fail_with(self, error: TransportError) -> Self {
        *lock(&self.fallback) = Some(Err(error));
        self
    }

    pub fn route(&self, url: impl Into<String>, response: TransportResponse) {
        lock(&self.routes).insert(url.into(), Ok(response));
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<String> {
        lock(&self.requests).last().cloned()
    }
}

impl Transport for MemoryTransport {
    fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        lock(&self.requests).push(url.to_string());

        if let Some(reply) = lock(&self.routes).get(url.as_str()) {
            return reply.clone();
        }
        lock(&self.fallback)
            .clone()
            .unwrap_or_else(|| Err(TransportError::NoRoute(url.to_string())))
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::{Transport, TransportError, TransportResponse};
    use url::Url;

    /// Blocking HTTP transport.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        agent: ureq::Agent,
    }

    impl Default for HttpTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HttpTransport {
        pub fn new() -> Self {
            Self {
                agent: ureq::AgentBuilder::new().build(),
            }
        }
    }

    impl Transport for HttpTransport {
        fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
            let call = self
                .agent
                .get(url.as_str())
                .set("Accept", "application/json")
                .call();

            match call {
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp
                        .into_string()
                        .map_err(|e| TransportError::Network(format!("read body: {e}")))?;
                    Ok(TransportResponse { status, body })
                }
                Err(ureq::Error::Status(status, resp)) => Ok(TransportResponse {
                    status,
                    body: resp.into_string().unwrap_or_default(),
                }),
                Err(e) => Err(TransportError::Network(e.to_string())),
            }
        }
    }
}
