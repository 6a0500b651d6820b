//! Last-resort plain text responses
//!
//! Used when the regular [`Response`](crate::response::Response) path cannot
//! produce output, e.g. a handler left an invalid status and the error
//! rendering failed as well.

use hyper::body::Bytes;
use hyper::header;
use hyper::StatusCode;

use crate::response::ResponseOutput;

/// Build a `text/plain` output carrying `message`
pub fn plain_output(status: StatusCode, message: &str, server_name: &str) -> ResponseOutput {
    let body = Bytes::from(message.to_string());
    let response = hyper::Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::SERVER, server_name)
        .body(body.clone())
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut fallback = hyper::Response::new(body);
            *fallback.status_mut() = status;
            fallback
        });

    let (parts, body) = response.into_parts();
    ResponseOutput {
        status: parts.status,
        headers: parts.headers,
        body,
    }
}

fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!(
        "Failed to build {} response: {error}",
        status.as_u16()
    ));
}
