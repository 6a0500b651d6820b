//! HTTP error model
//!
//! Every failure the router can observe is an [`HttpError`]: a tagged
//! `{kind, status, message}` value that is carried through `Result` and
//! converted into a response at the router boundary.

use hyper::{Method, StatusCode};
use thiserror::Error;

/// Classification of a request failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No path template matched the request path
    NotFound,
    /// A template matched but the resource has no handler for the verb
    MethodNotAllowed,
    /// None of the client's `Accept` candidates can be produced
    NotAcceptable,
    /// The request body could not be understood
    BadRequest,
    /// The request body exceeds `http.max_body_size`
    PayloadTooLarge,
    /// Raised explicitly by a resource handler
    Handler,
    /// Unexpected failure during dispatch or serialization
    Internal,
}

/// Error raised anywhere in the request pipeline
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{status} {message}")]
pub struct HttpError {
    kind: ErrorKind,
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Error raised by a handler with its own status code.
    ///
    /// Status codes outside `100..=999` cannot be represented on the wire and
    /// degrade to an internal error that keeps the original message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match StatusCode::from_u16(status) {
            Ok(status) => Self {
                kind: ErrorKind::Handler,
                status,
                message,
            },
            Err(_) => Self::internal(format!("invalid status code {status}: {message}")),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::with_kind(
            ErrorKind::NotFound,
            StatusCode::NOT_FOUND,
            format!("No resource matches '{path}'"),
        )
    }

    pub fn method_not_allowed(method: &Method, path: &str) -> Self {
        Self::with_kind(
            ErrorKind::MethodNotAllowed,
            StatusCode::METHOD_NOT_ALLOWED,
            format!("Method {method} is not allowed on '{path}'"),
        )
    }

    pub fn not_acceptable(accept: &str) -> Self {
        Self::with_kind(
            ErrorKind::NotAcceptable,
            StatusCode::NOT_ACCEPTABLE,
            format!("None of the requested content types can be produced: {accept}"),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::BadRequest, StatusCode::BAD_REQUEST, message.into())
    }

    /// `size` is `None` when the body was streamed without a `Content-Length`
    pub fn payload_too_large(size: Option<u64>, max: u64) -> Self {
        let message = match size {
            Some(size) => format!("Request body too large: {size} bytes (max: {max})"),
            None => format!("Request body too large (max: {max})"),
        };
        Self::with_kind(ErrorKind::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_kind(
            ErrorKind::Internal,
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
        )
    }

    const fn with_kind(kind: ErrorKind, status: StatusCode, message: String) -> Self {
        Self {
            kind,
            status,
            message,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {err}"))
    }
}

impl From<hyper::header::InvalidHeaderValue> for HttpError {
    fn from(err: hyper::header::InvalidHeaderValue) -> Self {
        Self::internal(format!("Invalid header value: {err}"))
    }
}

impl From<hyper::header::InvalidHeaderName> for HttpError {
    fn from(err: hyper::header::InvalidHeaderName) -> Self {
        Self::internal(format!("Invalid header name: {err}"))
    }
}
