//! Outbound tool envelope.
//!
//! Every tool invocation produces exactly one envelope: a success payload
//! wrapping the data, or an error payload carrying a typed failure. Failures
//! flow through [`ToolFailure`] from validation to rendering; nothing above
//! the dispatcher re-raises.

use crate::client::types::DoorayHeader;
use crate::client::ApiError;
use crate::types::ToolResult;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error taxonomy surfaced to the invoking agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorKind {
    /// A required argument was absent from the invocation.
    ParameterMissing,
    /// A present argument failed a semantic rule.
    ValidationError,
    /// The remote API reported an application-level failure.
    ApiError,
    /// Transport, parse, or any other unexpected failure.
    InternalError,
}

/// Success envelope: `{success: true, data, message}`.
#[derive(Debug, Serialize)]
pub struct ToolSuccess<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error envelope: `{success: false, error: {type, code, details}, message}`.
#[derive(Debug, Serialize)]
pub struct ToolErrorBody {
    pub success: bool,
    pub error: ToolError,
    pub message: String,
}

/// Error detail block of the error envelope.
#[derive(Debug, Serialize)]
pub struct ToolError {
    #[serde(rename = "type")]
    pub kind: ToolErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A classified tool failure, carried from validation or dispatch to the
/// single rendering point.
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// Required argument absent; code `MISSING_<FIELD>`.
    #[error("{field} parameter is required")]
    MissingParam { field: String },

    /// Present argument failed a semantic rule.
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
    },

    /// Remote API reported failure; code `DOORAY_API_<resultCode>`.
    #[error("{message}")]
    Api { code: i32, message: String },

    /// Anything else: transport errors, parse errors, serialization bugs.
    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ToolFailure {
    /// Shorthand for a validation failure.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        ToolFailure::Validation {
            code,
            message: message.into(),
        }
    }

    fn kind(&self) -> ToolErrorKind {
        match self {
            ToolFailure::MissingParam { .. } => ToolErrorKind::ParameterMissing,
            ToolFailure::Validation { .. } => ToolErrorKind::ValidationError,
            ToolFailure::Api { .. } => ToolErrorKind::ApiError,
            ToolFailure::Internal { .. } => ToolErrorKind::InternalError,
        }
    }

    fn code(&self) -> Option<String> {
        match self {
            ToolFailure::MissingParam { field } => {
                Some(format!("MISSING_{}", field.to_uppercase()))
            }
            ToolFailure::Validation { code, .. } => Some((*code).to_string()),
            ToolFailure::Api { code, .. } => Some(format!("DOORAY_API_{code}")),
            ToolFailure::Internal { .. } => None,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ToolFailure::Internal { details, .. } => details.clone(),
            _ => None,
        }
    }

    /// Render this failure as the error envelope.
    pub fn into_result(self) -> ToolResult {
        let body = ToolErrorBody {
            success: false,
            error: ToolError {
                kind: self.kind(),
                code: self.code(),
                details: self.details(),
            },
            message: self.to_string(),
        };
        let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"type":"INTERNAL_ERROR"},"message":"failed to render error envelope"}"#
                .to_string()
        });
        ToolResult::error(text)
    }
}

impl From<ApiError> for ToolFailure {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Remote { code, .. } => ToolFailure::Api { code, message },
            other => ToolFailure::Internal {
                message,
                details: Some(format!("{other:?}")),
            },
        }
    }
}

/// Render a success envelope around serializable data.
pub fn success<T: Serialize>(data: &T, message: impl Into<String>) -> Result<ToolResult, ToolFailure> {
    let body = ToolSuccess {
        success: true,
        data,
        message: Some(message.into()),
    };
    let text = serde_json::to_string_pretty(&body).map_err(|e| ToolFailure::Internal {
        message: format!("failed to serialize tool response: {e}"),
        details: None,
    })?;
    Ok(ToolResult::text(text))
}

/// Fail when the remote header reports an application-level error, which can
/// happen inside a response whose HTTP status matched expectations.
pub fn check_header(header: &DoorayHeader) -> Result<(), ToolFailure> {
    if header.is_successful {
        Ok(())
    } else {
        Err(ToolFailure::Api {
            code: header.result_code,
            message: header.result_message.clone(),
        })
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract a required string argument.
pub fn require_str(args: &Value, field: &str) -> Result<String, ToolFailure> {
    args.get(field)
        .and_then(value_as_string)
        .ok_or_else(|| ToolFailure::MissingParam {
            field: field.to_string(),
        })
}

/// Extract an optional string argument; JSON null counts as absent.
pub fn optional_str(args: &Value, field: &str) -> Option<String> {
    args.get(field).and_then(value_as_string)
}

/// Extract an optional integer argument, accepting numbers or numeric strings.
pub fn optional_u32(args: &Value, field: &str) -> Option<u32> {
    match args.get(field)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Extract an optional list of strings.
pub fn optional_str_list(args: &Value, field: &str) -> Option<Vec<String>> {
    let items = args.get(field)?.as_array()?;
    Some(items.iter().filter_map(value_as_string).collect())
}

/// Extract a required list of strings.
pub fn require_str_list(args: &Value, field: &str) -> Result<Vec<String>, ToolFailure> {
    optional_str_list(args, field).ok_or_else(|| ToolFailure::MissingParam {
        field: field.to_string(),
    })
}
