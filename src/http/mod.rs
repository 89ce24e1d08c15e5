use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod client;
pub mod request;
pub mod response;

pub use client::HttpClient;

/// Ordered header collection with case-insensitive names.
///
/// Names are matched without regard to ASCII case but stored verbatim, and
/// insertion order is preserved on the wire. Setting an existing name
/// replaces its value in place (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing entry with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            *entry = (name, value);
        } else {
            self.entries.push((name, value));
        }
    }

    /// Look up a header value by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

/// A logical HTTP request before serialization.
///
/// Method and path are passed through uninterpreted; the caller is
/// responsible for a syntactically valid path.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Convenience constructor for a body-less GET.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A parsed HTTP response.
///
/// A status of 0 means the status line could not be determined (the peer
/// closed before the header terminator arrived). The body is interpreted as
/// a text payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Per-phase timing breakdown for one request.
///
/// `total` is measured from just before connecting until the result is
/// assembled, so it also covers parsing and bookkeeping and is always at
/// least `connect + send + receive`. On failure only the phases that
/// completed are non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub connect: Duration,
    pub send: Duration,
    pub receive: Duration,
    pub total: Duration,
}

/// Outcome of a single issued request.
///
/// Created exactly once per request and never mutated after collection.
/// `success` is true iff a connection was established, the request bytes
/// were fully sent, and a syntactically complete response was received and
/// parsed without framing error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResult {
    pub client_id: usize,
    pub sequence: usize,
    pub response: Option<HttpResponse>,
    pub timing: Timing,
    pub success: bool,
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl RequestResult {
    pub fn completed(response: HttpResponse, timing: Timing) -> Self {
        Self {
            client_id: 0,
            sequence: 0,
            response: Some(response),
            timing,
            success: true,
            error: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failed(error: &ClientError, timing: Timing) -> Self {
        Self {
            client_id: 0,
            sequence: 0,
            response: None,
            timing,
            success: false,
            error: Some(error.to_string()),
            completed_at: Utc::now(),
        }
    }

    /// Attach the issuing virtual client's identity.
    pub fn tag(mut self, client_id: usize, sequence: usize) -> Self {
        self.client_id = client_id;
        self.sequence = sequence;
        self
    }

    /// Status code of the response, 0 when none was determined.
    pub fn status(&self) -> u16 {
        self.response.as_ref().map_or(0, |r| r.status)
    }
}

/// Connection parameters shared by every client of one run.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Target host.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Externally supplied value for the `X-Custom-ID` header. Opaque to
    /// this crate; the target server validates it.
    pub custom_id: String,
    /// Bound on connect and on each send/receive operation.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, custom_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            custom_id: custom_id.into(),
            ..Self::default()
        }
    }

    /// `host:port` form used for connecting and for the `Host` header.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: crate::defaults::HOST.to_string(),
            port: crate::defaults::PORT,
            custom_id: String::new(),
            timeout: crate::defaults::TIMEOUT,
        }
    }
}

/// Failure classes for a single request.
///
/// Every variant is caught at the `HttpClient` boundary and converted into a
/// failed [`RequestResult`]; none of them escapes to the load harness. A
/// server-side rejection of the identifier header is not an error here, it
/// is visible only through the response status.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The connection could not be established within the timeout.
    #[error("connect to {addr} failed: {reason}")]
    Connect { addr: String, reason: String },

    /// Send or receive failed after the connection was established.
    #[error("{phase} failed: {reason}")]
    Transport {
        phase: &'static str,
        reason: String,
    },

    /// The status line could not be interpreted.
    #[error("invalid status line: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_is_case_insensitive_but_verbatim() {
        let mut headers = HeaderMap::new();
        headers.set("Content-Type", "text/plain");

        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.iter().next(), Some(("Content-Type", "text/plain")));
    }

    #[test]
    fn header_map_last_write_wins() {
        let mut headers = HeaderMap::new();
        headers.set("Connection", "keep-alive");
        headers.set("connection", "close");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Connection"), Some("close"));
    }

    #[test]
    fn header_map_preserves_insertion_order() {
        let headers: HeaderMap = [("B", "2"), ("A", "1"), ("C", "3")].into_iter().collect();

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn request_result_status_defaults_to_zero() {
        let error = ClientError::Connect {
            addr: "127.0.0.1:1".to_string(),
            reason: "connection refused".to_string(),
        };
        let result = RequestResult::failed(&error, Timing::default());

        assert_eq!(result.status(), 0);
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("refused"));
    }

    #[test]
    fn client_config_address() {
        let config = ClientConfig::new("10.0.0.2", 8081, "abc");
        assert_eq!(config.address(), "10.0.0.2:8081");
        assert_eq!(config.timeout, crate::defaults::TIMEOUT);
    }
}
