//! Static file serving module
//!
//! Maps configured URL prefixes onto directories and emits file contents
//! verbatim through [`Response::send_static`].

use hyper::body::Bytes;
use hyper::header;
use hyper::Method;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::HttpError;
use crate::http::{cache, mime};
use crate::logger;
use crate::request::IncomingRequest;
use crate::response::{Response, ResponseOutput};

/// URL prefix served from a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoute {
    pub prefix: String,
    pub dir: PathBuf,
}

impl StaticRoute {
    pub fn new(prefix: &str, dir: impl Into<PathBuf>) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            },
            dir: dir.into(),
        }
    }

    /// Part of `path` below the prefix, or `None` when the prefix does not
    /// cover `path` (`/assets` covers `/assets/app.js` but not `/assetsx`)
    pub fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix == "/" {
            return Some(path.trim_start_matches('/'));
        }
        let rest = path.strip_prefix(&self.prefix)?;
        if rest.is_empty() {
            Some("")
        } else {
            rest.strip_prefix('/')
        }
    }
}

/// First route covering `path`, in configuration order
pub fn find_route<'a, 'p>(
    routes: &'a [StaticRoute],
    path: &'p str,
) -> Option<(&'a StaticRoute, &'p str)> {
    routes
        .iter()
        .find_map(|route| route.relative(path).map(|rest| (route, rest)))
}

/// Serve `relative` from `route` into `res`.
///
/// Only GET and HEAD are accepted; HEAD answers with headers only.
pub async fn serve(
    route: &StaticRoute,
    relative: &str,
    index_files: &[String],
    request: &IncomingRequest,
    res: &mut Response,
) -> Result<ResponseOutput, HttpError> {
    let is_head = request.method == Method::HEAD;
    if request.method != Method::GET && !is_head {
        res.set_header(header::ALLOW.as_str(), "GET, HEAD")?;
        return Err(HttpError::method_not_allowed(&request.method, &request.path));
    }

    let Some(file_path) = locate(route, relative, index_files).await else {
        return Err(HttpError::not_found(&request.path));
    };

    let content = fs::read(&file_path).await.map_err(|e| {
        logger::log_error(&format!(
            "Failed to read file '{}': {e}",
            file_path.display()
        ));
        HttpError::not_found(&request.path)
    })?;
    let content_type = mime::content_type_for(&file_path);
    let etag = cache::etag_for(&content);

    res.set_header(header::ETAG.as_str(), &etag)?;
    res.set_header(header::CACHE_CONTROL.as_str(), cache::STATIC_CACHE_CONTROL)?;

    if cache::is_not_modified(&request.headers, &etag) {
        res.set_status(304);
        return res.send_static(Bytes::new(), content_type);
    }

    if is_head {
        res.set_header(header::CONTENT_LENGTH.as_str(), &content.len().to_string())?;
        return res.send_static(Bytes::new(), content_type);
    }
    res.send_static(Bytes::from(content), content_type)
}

/// Resolve a file under the route directory, trying index files for
/// directories. Anything escaping the directory resolves to `None`.
async fn locate(route: &StaticRoute, relative: &str, index_files: &[String]) -> Option<PathBuf> {
    let relative_path = Path::new(relative);
    if !relative_path
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {relative}"));
        return None;
    }

    let root = match fs::canonicalize(&route.dir).await {
        Ok(root) => root,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                route.dir.display()
            ));
            return None;
        }
    };

    let mut candidate = root.join(relative_path);
    if fs::metadata(&candidate).await.ok()?.is_dir() {
        let mut found = None;
        for index in index_files {
            let index_path = candidate.join(index);
            if fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
                found = Some(index_path);
                break;
            }
        }
        candidate = found?;
    }

    let resolved = fs::canonicalize(&candidate).await.ok()?;
    if !resolved.starts_with(&root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            resolved.display()
        ));
        return None;
    }
    Some(resolved)
}
