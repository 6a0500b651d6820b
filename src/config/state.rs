// Application state module
// Holds the loaded configuration and the router built from it

use std::sync::Arc;

use super::types::Config;
use crate::handler::{Router, RouterSettings};
use crate::routing::ResourceRegistry;
use crate::view::ViewRenderer;

/// State shared by every connection
pub struct AppState {
    pub config: Config,
    pub router: Router,
}

impl AppState {
    /// Wire the registry, static routes and views from `config` into a router
    pub fn new(config: Config, registry: ResourceRegistry) -> Self {
        let router = Router::new(
            Arc::new(registry),
            config.routes.static_routes(),
            Arc::new(ViewRenderer::new(config.views.dir_path())),
            RouterSettings {
                default_content_type: config.http.default_content_type.clone(),
                server_name: config.http.server_name.clone(),
                index_files: config.routes.index_files.clone(),
            },
        );
        Self { config, router }
    }
}
