//! HTTP Client Abstraction
//!
//! The schedule server is only ever queried with `GET`; the whole request
//! lives in the URL's query string.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// A `GET` request to the schedule server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    /// Overall deadline for this request, overriding the client default
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// A fully buffered response. Schedule documents are small.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String> {
        std::str::from_utf8(&self.body)
            .map(str::to_owned)
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid UTF-8: {}", e)))
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP client trait
///
/// Connection failures and timeouts must be reported as
/// [`BridgeError::Transport`]. Any response that arrives, whatever its
/// status, is returned as `Ok`; interpreting the status is up to the caller.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn fetch(client: &dyn HttpClient, url: String) -> Result<String> {
///     let response = client.execute(HttpRequest::get(url)).await?;
///     response.text()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send the request exactly once. Implementations never retry; the
    /// host's fetch and heartbeat timers are the only repetition.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("http://schedule.test/spotlivescreen/XmlServlet?idSchermo=7")
            .header("Accept", "application/xml")
            .timeout(Duration::from_secs(30));

        assert!(request.url.ends_with("idSchermo=7"));
        assert_eq!(
            request.headers.get("Accept").map(String::as_str),
            Some("application/xml")
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_response_status_and_text() {
        let ok = HttpResponse {
            status: 204,
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        assert!(ok.is_success());

        let unavailable = HttpResponse {
            status: 503,
            headers: HashMap::new(),
            body: Bytes::from_static(b"unavailable"),
        };
        assert!(!unavailable.is_success());
        assert_eq!(unavailable.text().unwrap(), "unavailable");

        let garbage = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from_static(&[0xff, 0xfe]),
        };
        assert!(matches!(
            garbage.text(),
            Err(BridgeError::OperationFailed(_))
        ));
    }
}
