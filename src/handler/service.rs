//! Transport glue
//!
//! Converts a hyper request into an [`IncomingRequest`], hands it to the
//! router and writes one access log entry per request.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header;
use hyper::{Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::error::HttpError;
use crate::logger::{self, AccessLogEntry};
use crate::request::IncomingRequest;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let mut entry = access_entry(&req, peer_addr);
    let max_body_size = state.config.http.max_body_size;

    let output = match read_request(req, max_body_size).await {
        Ok(request) => state.router.dispatch(request).await,
        Err(err) => state.router.reject(&err),
    };

    if state.config.logging.access_log {
        entry.status = output.status.as_u16();
        entry.body_bytes = output.body.len();
        entry.content_type = output.header(header::CONTENT_TYPE.as_str()).map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(output.into_hyper())
}

/// Buffer the body, refusing anything above `max_body_size`
async fn read_request(
    req: Request<Incoming>,
    max_body_size: u64,
) -> Result<IncomingRequest, HttpError> {
    check_content_length(req.headers(), max_body_size)?;

    let (parts, body) = req.into_parts();
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            return Err(HttpError::payload_too_large(None, max_body_size));
        }
        Err(e) => {
            return Err(HttpError::bad_request(format!(
                "Failed to read request body: {e}"
            )));
        }
    };

    Ok(IncomingRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(ToString::to_string),
        headers: parts.headers,
        body,
    })
}

/// Validate Content-Length header before reading the body
fn check_content_length(headers: &hyper::HeaderMap, max_body_size: u64) -> Result<(), HttpError> {
    let Some(content_length) = headers.get(header::CONTENT_LENGTH) else {
        return Ok(());
    };
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return Ok(());
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => Err(HttpError::payload_too_large(Some(size), max_body_size)),
        Ok(_) => Ok(()),
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            Ok(())
        }
    }
}

fn access_entry(req: &Request<Incoming>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_string(req.headers(), header::REFERER);
    entry.user_agent = header_string(req.headers(), header::USER_AGENT);
    entry
}

fn header_string(headers: &hyper::HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use hyper::HeaderMap;

    fn with_length(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_content_length_within_limit() {
        assert!(check_content_length(&HeaderMap::new(), 10).is_ok());
        assert!(check_content_length(&with_length("10"), 10).is_ok());
    }

    #[test]
    fn test_content_length_over_limit() {
        let err = check_content_length(&with_length("11"), 10).unwrap_err();
        assert_eq!(err.status().as_u16(), 413);
        assert!(err.message().contains("11 bytes"));
    }

    #[test]
    fn test_unparsable_content_length_is_ignored() {
        assert!(check_content_length(&with_length("lots"), 10).is_ok());
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
