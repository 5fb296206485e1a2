//! Status codes and the `Result<T>` carrier every fallible core call returns.
//!
//! Mirrors a closed gRPC-style status code set rather than a flat
//! `thiserror` enum per failure kind, since the dual transport surface
//! (binary RPC + JSON/HTTP) needs one taxonomy it can map onto both
//! `tonic::Code` and an HTTP status without a lossy second translation.

use std::fmt;

use http::StatusCode as HttpStatusCode;
use thiserror::Error;

/// The closed set of status codes carried by every [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    /// Map to the HTTP status code the REST adapter renders (spec §4.12.4).
    #[must_use]
    pub fn http_code(self) -> HttpStatusCode {
        match self {
            Self::Ok => HttpStatusCode::OK,
            Self::InvalidArgument | Self::FailedPrecondition | Self::OutOfRange => {
                HttpStatusCode::BAD_REQUEST
            }
            Self::Unauthenticated => HttpStatusCode::UNAUTHORIZED,
            Self::PermissionDenied => HttpStatusCode::FORBIDDEN,
            Self::NotFound => HttpStatusCode::NOT_FOUND,
            Self::AlreadyExists | Self::Aborted => HttpStatusCode::CONFLICT,
            Self::ResourceExhausted => HttpStatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable => HttpStatusCode::SERVICE_UNAVAILABLE,
            Self::DeadlineExceeded => HttpStatusCode::GATEWAY_TIMEOUT,
            Self::Unimplemented => HttpStatusCode::NOT_IMPLEMENTED,
            Self::Cancelled => HttpStatusCode::from_u16(499).unwrap(),
            Self::Unknown | Self::Internal | Self::DataLoss => {
                HttpStatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(s)
    }
}

/// A `(code, message, cause)` error every fallible core operation returns
/// instead of raising an exception.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Status {
    #[must_use]
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(
        code: StatusCode,
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, message)
    }

    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(StatusCode::AlreadyExists, message)
    }

    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PermissionDenied, message)
    }

    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unauthenticated, message)
    }

    #[must_use]
    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FailedPrecondition, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unavailable, message)
    }

    #[must_use]
    pub fn http_code(&self) -> HttpStatusCode {
        self.code.http_code()
    }
}

#[cfg(feature = "tonic")]
impl From<Status> for tonic::Status {
    fn from(status: Status) -> Self {
        let code = match status.code {
            StatusCode::Ok => tonic::Code::Ok,
            StatusCode::Cancelled => tonic::Code::Cancelled,
            StatusCode::Unknown => tonic::Code::Unknown,
            StatusCode::InvalidArgument => tonic::Code::InvalidArgument,
            StatusCode::DeadlineExceeded => tonic::Code::DeadlineExceeded,
            StatusCode::NotFound => tonic::Code::NotFound,
            StatusCode::AlreadyExists => tonic::Code::AlreadyExists,
            StatusCode::PermissionDenied => tonic::Code::PermissionDenied,
            StatusCode::ResourceExhausted => tonic::Code::ResourceExhausted,
            StatusCode::FailedPrecondition => tonic::Code::FailedPrecondition,
            StatusCode::Aborted => tonic::Code::Aborted,
            StatusCode::OutOfRange => tonic::Code::OutOfRange,
            StatusCode::Unimplemented => tonic::Code::Unimplemented,
            StatusCode::Internal => tonic::Code::Internal,
            StatusCode::Unavailable => tonic::Code::Unavailable,
            StatusCode::DataLoss => tonic::Code::DataLoss,
            StatusCode::Unauthenticated => tonic::Code::Unauthenticated,
        };
        tonic::Status::new(code, status.message)
    }
}

/// Convenience alias used by every fallible core operation.
pub type Result<T> = std::result::Result<T, Status>;
