//! View rendering module
//!
//! Reads view files from the configured views directory and renders them
//! with minijinja. Handlers opt in through `Response::render`; without a
//! views directory every render reports "not available" (`Ok(None)`).

use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use crate::error::HttpError;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view path '{0}' escapes the views directory")]
    InvalidPath(String),
    #[error("view '{path}' not found")]
    NotFound { path: String },
    #[error("failed to read view '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render view '{path}': {source}")]
    Render {
        path: String,
        #[source]
        source: minijinja::Error,
    },
}

impl From<ViewError> for HttpError {
    fn from(err: ViewError) -> Self {
        Self::internal(err.to_string())
    }
}

/// Renderer rooted at an optional views directory
#[derive(Debug, Clone, Default)]
pub struct ViewRenderer {
    dir: Option<PathBuf>,
}

impl ViewRenderer {
    pub const fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn is_configured(&self) -> bool {
        self.dir.is_some()
    }

    /// Render `relative` (e.g. `/index.html`) with optional data as context
    pub async fn render(
        &self,
        relative: &str,
        data: Option<&Value>,
    ) -> Result<Option<String>, ViewError> {
        let Some(dir) = &self.dir else {
            return Ok(None);
        };

        let path = resolve(dir, relative)?;
        let source = fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ViewError::NotFound {
                    path: relative.to_string(),
                }
            } else {
                ViewError::Io {
                    path: relative.to_string(),
                    source,
                }
            }
        })?;

        let env = minijinja::Environment::new();
        let empty = Value::Object(serde_json::Map::new());
        let rendered = env
            .render_str(&source, data.unwrap_or(&empty))
            .map_err(|source| ViewError::Render {
                path: relative.to_string(),
                source,
            })?;
        Ok(Some(rendered))
    }
}

/// Join `relative` onto `dir`, refusing anything but plain path segments
fn resolve(dir: &Path, relative: &str) -> Result<PathBuf, ViewError> {
    let relative_path = Path::new(relative.trim_start_matches('/'));
    let plain = relative_path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !plain || relative_path.as_os_str().is_empty() {
        return Err(ViewError::InvalidPath(relative.to_string()));
    }
    Ok(dir.join(relative_path))
}
