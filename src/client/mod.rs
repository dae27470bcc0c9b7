//! Dooray API client.
//!
//! One shared HTTP client issues every outbound request, classifies the
//! outcome against the operation's expected status, and deserializes the
//! body into one of three envelope shapes: a typed result, a nullable
//! result, or no body at all. Every failure is surfaced as a typed
//! [`ApiError`]; callers never see a bare transport error.

pub mod comment;
pub mod project;
pub mod types;
pub mod wiki;

use crate::config::DoorayConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};
use types::{DoorayErrorEnvelope, DoorayHeader, DoorayResponse, DoorayUnitResponse};

/// Result type for Dooray API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Classified failure of a single API call.
///
/// Exactly one of three shapes: the remote replied with an unexpected status
/// but a parseable error envelope, the body could not be interpreted, or the
/// request never completed at the transport level.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote API reported a failure with a parseable error envelope.
    #[error("API call failed: {message}")]
    Remote {
        /// HTTP status code of the response.
        status: u16,
        /// Application-level result code from the envelope header.
        code: i32,
        /// Result message from the envelope header.
        message: String,
    },

    /// The response body could not be parsed as the expected shape.
    #[error("API response parse failed ({status}): {body}")]
    Parse {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request failed below the HTTP layer (DNS, connect, timeout, TLS).
    #[error("Error during API call: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// HTTP status of the failed call, where one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } | ApiError::Parse { status, .. } => Some(*status),
            ApiError::Transport { source } => source.status().map(|s| s.as_u16()),
        }
    }
}

/// Shared HTTP client for the Dooray REST API.
///
/// Cheap to clone; safe for concurrent use. The authorization header and
/// JSON content type are attached to every request at construction time.
#[derive(Clone)]
pub struct DoorayClient {
    http: reqwest::Client,
    base_url: String,
}

impl DoorayClient {
    /// Create a new client from configuration.
    pub fn new(config: &DoorayConfig) -> Self {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("dooray-api {}", config.api_key))
            .expect("API key is not a valid header value");
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Send a request and verify the HTTP status, returning the raw body.
    ///
    /// Single point where outbound calls are logged and failures are
    /// classified; the typed/nullable/no-body paths below only differ in
    /// how they parse the returned body.
    async fn send_checked(
        &self,
        op: &str,
        expected: StatusCode,
        request: RequestBuilder,
    ) -> ApiResult<(StatusCode, String)> {
        debug!("API request: {op}");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(
            "API response: {op} -> {} {}",
            status.as_u16(),
            truncate_body(&body)
        );

        if status != expected {
            error!(
                "API error response: {op} -> {} (expected {}): {}",
                status.as_u16(),
                expected.as_u16(),
                truncate_body(&body)
            );
            return Err(classify_error(status, &body));
        }

        Ok((status, body))
    }

    /// Typed path: the result is a non-null `T`.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        op: &str,
        expected: StatusCode,
        request: RequestBuilder,
    ) -> ApiResult<DoorayResponse<T>> {
        let (status, body) = self.send_checked(op, expected, request).await?;
        parse_body(status, &body)
    }

    /// Nullable path: the result may be JSON null on success.
    pub(crate) async fn execute_unit(
        &self,
        op: &str,
        expected: StatusCode,
        request: RequestBuilder,
    ) -> ApiResult<DoorayUnitResponse> {
        let (status, body) = self.send_checked(op, expected, request).await?;
        parse_body(status, &body)
    }

    /// Bodiless path: an empty body at the expected status is a success.
    pub(crate) async fn execute_no_body(
        &self,
        op: &str,
        expected: StatusCode,
        request: RequestBuilder,
    ) -> ApiResult<DoorayHeader> {
        let (status, body) = self.send_checked(op, expected, request).await?;
        if body.trim().is_empty() {
            return Ok(DoorayHeader::ok());
        }
        let response: DoorayUnitResponse = parse_body(status, &body)?;
        Ok(response.header)
    }
}

fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|_| ApiError::Parse {
        status: status.as_u16(),
        body: body.to_string(),
    })
}

/// Classify a response whose status did not match the expected one.
fn classify_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<DoorayErrorEnvelope>(body) {
        Ok(envelope) => ApiError::Remote {
            status: status.as_u16(),
            code: envelope.header.result_code,
            message: envelope.header.result_message,
        },
        Err(_) => ApiError::Parse {
            status: status.as_u16(),
            body: body.to_string(),
        },
    }
}

/// Truncate a body for logging without splitting a UTF-8 character.
fn truncate_body(body: &str) -> &str {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Query string builder enforcing the Dooray parameter-encoding contract:
/// absent scalars are omitted entirely, and collection filters are omitted
/// when absent or empty and comma-joined when present.
#[derive(Debug, Default)]
pub(crate) struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl ToString) {
        self.pairs.push((key, value.to_string()));
    }

    pub fn push_opt<T: ToString>(&mut self, key: &'static str, value: Option<&T>) {
        if let Some(value) = value {
            self.push(key, value.to_string());
        }
    }

    pub fn push_list(&mut self, key: &'static str, values: Option<&[String]>) {
        match values {
            Some(values) if !values.is_empty() => self.push(key, values.join(",")),
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// Apply a query to a request builder, leaving the URL untouched when empty.
pub(crate) fn with_query(request: RequestBuilder, query: &Query) -> RequestBuilder {
    if query.is_empty() {
        request
    } else {
        request.query(query.pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client = DoorayClient::new(&DoorayConfig::new("https://api.dooray.com/", "key"));
        assert_eq!(
            client.url("/wiki/v1/wikis"),
            "https://api.dooray.com/wiki/v1/wikis"
        );
        assert_eq!(
            client.url("wiki/v1/wikis"),
            "https://api.dooray.com/wiki/v1/wikis"
        );
    }

    #[test]
    fn test_query_omits_absent_scalars() {
        let mut query = Query::new();
        query.push_opt::<u32>("page", None);
        query.push_opt("size", Some(&20u32));
        assert_eq!(query.pairs(), &[("size", "20".to_string())]);
    }

    #[test]
    fn test_query_omits_empty_collections() {
        let mut query = Query::new();
        query.push_list("tagIds", Some(&[]));
        query.push_list("memberIds", None);
        assert!(query.is_empty());
    }

    #[test]
    fn test_query_joins_collections_with_commas() {
        let mut query = Query::new();
        query.push_list(
            "toMemberIds",
            Some(&["m1".to_string(), "m2".to_string(), "m3".to_string()]),
        );
        assert_eq!(query.pairs(), &[("toMemberIds", "m1,m2,m3".to_string())]);
    }

    #[test]
    fn test_classify_error_with_parseable_header() {
        let body = r#"{"header":{"isSuccessful":false,"resultCode":-300,"resultMessage":"forbidden"}}"#;
        let err = classify_error(StatusCode::FORBIDDEN, body);
        match err {
            ApiError::Remote {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 403);
                assert_eq!(code, -300);
                assert_eq!(message, "forbidden");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
        let err = classify_error(StatusCode::FORBIDDEN, body);
        assert_eq!(err.to_string(), "API call failed: forbidden");
    }

    #[test]
    fn test_classify_error_with_unparseable_body() {
        let err = classify_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match &err {
            ApiError::Parse { status, body } => {
                assert_eq!(*status, 500);
                assert!(body.contains("oops"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("<html>oops</html>"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "가".repeat(400); // 1200 bytes of 3-byte chars
        let truncated = truncate_body(&body);
        assert!(truncated.len() <= 500);
        assert!(body.starts_with(truncated));
    }
}
