//! Conditional request support for static assets
//!
//! Entity tags are derived from file content; `If-None-Match` is compared
//! with weak comparison, so `W/"x"` and `"x"` are the same tag.

use hyper::header::{self, HeaderMap};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// `Cache-Control` value sent with static assets
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Quoted entity tag for `content`, e.g. `"1a2b3c"`
pub fn etag_for(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    content.len().hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether the request's `If-None-Match` already names `etag`
pub fn is_not_modified(headers: &HeaderMap, etag: &str) -> bool {
    let wanted = opaque_tag(etag);
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || opaque_tag(candidate) == wanted)
}

fn opaque_tag(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}
