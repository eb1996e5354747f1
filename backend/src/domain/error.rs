//! Domain-level error taxonomy.
//!
//! Every fallible operation in the crate returns [`Error`]. Store failures are
//! classified at the failing call; anything unclassified becomes
//! [`ErrorCode::Internal`], which hides its cause from callers and carries an
//! incident id instead. Transport adapters map [`ErrorCode::http_status`] and
//! serialize the payload through its DTO.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unexpected store or protocol failure.
    Internal,
    /// The request is malformed or fails validation.
    BadRequest,
    /// The id or key does not resolve to a live row.
    NotFound,
    /// A uniqueness constraint was violated.
    AlreadyExists,
    /// An optimistic-concurrency token was stale.
    VersionMismatch,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
}

impl ErrorCode {
    /// Transport status an adapter should use for this category.
    ///
    /// Both conflict kinds share 409; they stay distinguishable by code.
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Internal => 500,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::AlreadyExists | Self::VersionMismatch => 409,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
        }
    }

    /// Whether the code belongs to the conflict class.
    pub const fn is_conflict(self) -> bool {
        matches!(self, Self::AlreadyExists | Self::VersionMismatch)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Internal => "internal",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::VersionMismatch => "version_mismatch",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
        };
        f.write_str(name)
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `cause` is never serialized; [`Error::safe_message`] never includes it.
/// - `incident_id` is set exactly for [`ErrorCode::Internal`] errors created
///   through [`Error::internal`].
///
/// # Examples
/// ```
/// use catalog_core::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("movie", "id", 7);
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "movie id:7 not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
    incident_id: Option<Uuid>,
    cause: Option<String>,
}

impl Error {
    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            incident_id: None,
            cause: None,
        }
    }

    /// Unexpected failure. The cause is logged with a fresh incident id and
    /// hidden from callers.
    pub fn internal(cause: impl fmt::Display) -> Self {
        let incident_id = Uuid::new_v4();
        let cause = cause.to_string();
        error!(%incident_id, %cause, "internal error");
        Self {
            code: ErrorCode::Internal,
            message: "internal error".to_owned(),
            details: None,
            incident_id: Some(incident_id),
            cause: Some(cause),
        }
    }

    /// Invalid input; the message is shown to callers.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// `subject key:value not found`.
    pub fn not_found(subject: &str, key: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        Self::new(
            ErrorCode::NotFound,
            format!("{subject} {key}:{value} not found"),
        )
        .with_details(json!({ "subject": subject, "key": key, "value": value }))
    }

    /// `subject key:value already exists`.
    pub fn already_exists(subject: &str, key: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        Self::new(
            ErrorCode::AlreadyExists,
            format!("{subject} {key}:{value} already exists"),
        )
        .with_details(json!({ "subject": subject, "key": key, "value": value }))
    }

    /// Optimistic-concurrency rejection carrying the rejected version.
    pub fn version_mismatch(
        subject: &str,
        key: &str,
        value: impl fmt::Display,
        version: u32,
    ) -> Self {
        let value = value.to_string();
        Self::new(
            ErrorCode::VersionMismatch,
            format!("{subject} {key}:{value} version {version} is stale"),
        )
        .with_details(json!({
            "subject": subject,
            "key": key,
            "value": value,
            "version": version,
        }))
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Record a secondary failure, such as a failed rollback, without
    /// changing the classification of `self`.
    pub fn joined(mut self, other: &Self) -> Self {
        let secondary = other.to_string();
        self.cause = Some(match self.cause.take() {
            Some(cause) => format!("{cause}; {secondary}"),
            None => secondary,
        });
        self
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Caller-facing message. For internal errors this is a fixed string.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Same as [`Error::message`]; never exposes the hidden cause.
    pub fn safe_message(&self) -> &str {
        self.message()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Incident id reported in place of an internal cause.
    pub fn incident_id(&self) -> Option<Uuid> {
        self.incident_id
    }

    /// Hidden cause, for logs only.
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {cause}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::convert::Infallible> for Error {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    incident_id: Option<Uuid>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
            incident_id: value.incident_id,
        }
    }
}

impl From<ErrorDto> for Error {
    fn from(value: ErrorDto) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
            incident_id: value.incident_id,
            cause: None,
        }
    }
}

#[cfg(test)]
mod tests;
