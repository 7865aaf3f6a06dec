//! Error types for EdgeGrid operations.
//!
//! Two families of failures are modelled here: local ones raised before any
//! network traffic (struct validation, request construction) and remote ones
//! decoded from problem-detail bodies of non-success responses. Every service
//! crate re-uses this [`Error`] and wraps it with the name of the failed
//! operation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Main error type for EdgeGrid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Request failed local validation; nothing was sent.
    #[error("struct validation: {0}")]
    StructValidation(String),

    /// The API answered with a problem-detail error body.
    #[error("{0}")]
    Api(Box<ApiError>),

    /// Resource not found (for operations that map 404 themselves)
    #[error("not found: {0}")]
    NotFound(String),

    /// Building the HTTP request failed
    #[error("failed to create request: {0}")]
    Request(String),

    /// HTTP request failed at the transport level
    #[error("request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Endpoint could not be reached
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Success body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid endpoint or path
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// An error annotated with the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        /// Human-readable operation name, e.g. `"get an include version"`
        operation: &'static str,
        /// Underlying failure
        source: Box<Error>,
    },
}

/// Specialized result type for EdgeGrid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Problem-detail body returned by EdgeGrid APIs on failure.
///
/// The union of the fields used by the Property Manager, Application
/// Security and Image & Video Manager APIs. `status` always reflects the
/// HTTP status of the response, whatever the body says.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Problem type URI.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub error_type: String,
    /// Short summary.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    /// Detailed description.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub detail: String,
    /// Occurrence URI.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub instance: String,
    /// HTTP status code, taken from the response rather than the body.
    #[serde(default, skip_deserializing, skip_serializing_if = "is_zero")]
    pub status: u16,
    /// Offending rule tree behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_name: Option<String>,
    /// JSON pointer to the offending rule tree location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_location: Option<String>,
    /// Nested errors, kept raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
    /// Nested warnings, kept raw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<serde_json::Value>,
    /// Name of the exhausted limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_key: Option<String>,
    /// Limit value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Remaining quota for `limit_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    /// Problem identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,
    /// Request identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Value rejected by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illegal_value: Option<String>,
    /// Parameter the illegal value was given for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
    /// Additional service-specific fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extension_fields: BTreeMap<String, serde_json::Value>,
}

fn is_zero(value: &u16) -> bool {
    *value == 0
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ApiError {
    /// Decode a problem-detail body.
    ///
    /// A body that is not valid JSON still yields an error carrying the HTTP
    /// status and the decoder message.
    #[must_use]
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let mut error = match serde_json::from_slice::<Self>(body) {
            Ok(error) => error,
            Err(err) => {
                tracing::error!(status, "could not unmarshal API error: {err}");
                Self {
                    title: "Failed to unmarshal error body".to_string(),
                    detail: err.to_string(),
                    ..Self::default()
                }
            }
        };
        error.status = status;
        error
    }

    /// Error produced when the body of a failed response could not be read.
    #[must_use]
    pub fn unreadable(status: u16, reason: impl fmt::Display) -> Self {
        Self {
            title: "Failed to read error body".to_string(),
            detail: reason.to_string(),
            status,
            ..Self::default()
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(body) => write!(f, "API error: \n{body}"),
            Err(err) => write!(f, "error marshaling API error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// A well-known failure that can be recognised from an [`ApiError`].
pub trait ErrorCondition {
    /// Returns true if the API error represents this condition.
    fn matches(&self, error: &ApiError) -> bool;
}

/// Conditions shared by every EdgeGrid API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCondition {
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 429 Too Many Requests
    RateLimitExceeded,
}

impl ErrorCondition for ApiCondition {
    fn matches(&self, error: &ApiError) -> bool {
        let expected = match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::RateLimitExceeded => 429,
        };
        error.status == expected
    }
}

/// Comparing against another API error checks identity by value.
impl ErrorCondition for ApiError {
    fn matches(&self, error: &ApiError) -> bool {
        self == error
    }
}

impl Error {
    /// Annotate the error with the operation that failed.
    #[must_use]
    pub fn within(self, operation: &'static str) -> Self {
        Self::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping operation annotations.
    #[must_use]
    pub fn root(&self) -> &Self {
        let mut current = self;
        while let Self::Operation { source, .. } = current {
            current = source;
        }
        current
    }

    /// Returns the outermost operation name, if any.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Operation { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Returns the decoded API error, if this is a remote failure.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self.root() {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// HTTP status of a remote failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|error| error.status)
    }

    /// Returns true if the request failed local validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Self::StructValidation(_))
    }

    /// Check the error against a well-known condition.
    pub fn is<C>(&self, condition: &C) -> bool
    where
        C: ErrorCondition + ?Sized,
    {
        self.api_error().is_some_and(|error| condition.matches(error))
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Operation { source, .. } => source.error_code(),
            Self::StructValidation(_) => "STRUCT_VALIDATION",
            Self::Api(_) => "API_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Request(_) => "REQUEST_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Self::Api(Box::new(err))
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::StructValidation(crate::validation::describe(&err))
    }
}
