//! Dooray API response envelope and shared wire fragments.
//!
//! Every Dooray endpoint wraps its payload in a common envelope:
//! a `header` reporting application-level success independent of the HTTP
//! status, and a `result` whose shape varies per endpoint (typed object,
//! list, or null).

use serde::{Deserialize, Serialize};

/// Mime type Dooray uses for markdown bodies.
pub const MIME_MARKDOWN: &str = "text/x-markdown";

/// Per-response header block, independent of the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorayHeader {
    pub is_successful: bool,
    pub result_code: i32,
    pub result_message: String,
}

impl DoorayHeader {
    /// Synthesized success header for endpoints that return no body at all.
    pub(crate) fn ok() -> Self {
        Self {
            is_successful: true,
            result_code: 0,
            result_message: String::new(),
        }
    }
}

/// Envelope for endpoints that return a typed (non-null) result.
///
/// Listing endpoints additionally carry a `totalCount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorayResponse<T> {
    pub header: DoorayHeader,
    pub result: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

/// Envelope for endpoints whose `result` is null by design on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorayUnitResponse {
    pub header: DoorayHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

/// Minimal envelope used to extract the header from an error body.
#[derive(Debug, Deserialize)]
pub(crate) struct DoorayErrorEnvelope {
    pub header: DoorayHeader,
}

/// Organization member reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub organization_member_id: String,
}

impl Member {
    pub fn new(organization_member_id: impl Into<String>) -> Self {
        Self {
            organization_member_id: organization_member_id.into(),
        }
    }
}

/// Creator of a wiki page, post, or comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    #[serde(rename = "type")]
    pub kind: String,
    pub member: Member,
}

/// Mime-typed body used by posts, comments, and wiki content updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    pub mime_type: String,
    pub content: String,
}

impl PostBody {
    /// Markdown body with the mime type Dooray expects.
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            mime_type: MIME_MARKDOWN.to_string(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_deserializes_camel_case() {
        let raw = r#"{"isSuccessful":true,"resultCode":0,"resultMessage":"success"}"#;
        let header: DoorayHeader = serde_json::from_str(raw).unwrap();
        assert!(header.is_successful);
        assert_eq!(header.result_code, 0);
    }

    #[test]
    fn test_unit_response_accepts_null_result() {
        let raw = r#"{"header":{"isSuccessful":true,"resultCode":0,"resultMessage":""},"result":null}"#;
        let response: DoorayUnitResponse = serde_json::from_str(raw).unwrap();
        assert!(response.header.is_successful);
        assert!(response.result.is_none());
    }

    #[test]
    fn test_list_response_total_count() {
        let raw = r#"{
            "header": {"isSuccessful": true, "resultCode": 0, "resultMessage": ""},
            "result": [1, 2, 3],
            "totalCount": 3
        }"#;
        let response: DoorayResponse<Vec<i32>> = serde_json::from_str(raw).unwrap();
        assert_eq!(response.total_count, Some(3));
        assert_eq!(response.result.len(), 3);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let raw = r#"{"isSuccessful":false,"resultCode":-1,"resultMessage":"no","extra":42}"#;
        let header: DoorayHeader = serde_json::from_str(raw).unwrap();
        assert!(!header.is_successful);
    }

    #[test]
    fn test_markdown_body() {
        let body = PostBody::markdown("# title");
        assert_eq!(body.mime_type, MIME_MARKDOWN);
    }
}
