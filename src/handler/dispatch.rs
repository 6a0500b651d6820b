//! Request dispatch module
//!
//! Turns an [`IncomingRequest`] into a [`ResponseOutput`]: static prefix
//! check, path matching, method check, content negotiation, handler
//! invocation and error rendering. Dispatch never fails; every error becomes
//! a well-formed response.

use futures::FutureExt;
use hyper::header::{self, HeaderValue};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::static_files::{self, StaticRoute};
use crate::error::HttpError;
use crate::http::{self, mime};
use crate::logger;
use crate::request::{IncomingRequest, RequestContext};
use crate::response::{Response, ResponseOutput};
use crate::routing::{ResourceRegistry, RouteMatch};
use crate::view::ViewRenderer;

/// Per-response settings taken from configuration
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub default_content_type: String,
    pub server_name: String,
    pub index_files: Vec<String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            default_content_type: mime::TEXT_HTML.to_string(),
            server_name: concat!("resource_server/", env!("CARGO_PKG_VERSION")).to_string(),
            index_files: vec!["index.html".to_string()],
        }
    }
}

/// Shared, immutable request router
pub struct Router {
    registry: Arc<ResourceRegistry>,
    static_routes: Vec<StaticRoute>,
    views: Arc<ViewRenderer>,
    settings: RouterSettings,
    server_header: Option<HeaderValue>,
}

impl Router {
    pub fn new(
        registry: Arc<ResourceRegistry>,
        static_routes: Vec<StaticRoute>,
        views: Arc<ViewRenderer>,
        settings: RouterSettings,
    ) -> Self {
        let server_header = HeaderValue::from_str(&settings.server_name)
            .map_err(|e| {
                logger::log_warning(&format!(
                    "Invalid server name '{}', Server header disabled: {e}",
                    settings.server_name
                ));
            })
            .ok();
        Self {
            registry,
            static_routes,
            views,
            settings,
            server_header,
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub const fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Route one request to completion
    pub async fn dispatch(&self, request: IncomingRequest) -> ResponseOutput {
        let mut res = self.fresh_response();

        if let Some((route, relative)) =
            static_files::find_route(&self.static_routes, &request.path)
        {
            let result = static_files::serve(
                route,
                relative,
                &self.settings.index_files,
                &request,
                &mut res,
            )
            .await;
            return self.finish(result, &mut res, None);
        }

        let mut negotiated = None;
        let result = self
            .dispatch_resource(request, &mut res, &mut negotiated)
            .await;
        self.finish(result, &mut res, negotiated.as_deref())
    }

    /// Render an error raised before routing, e.g. by the transport
    pub fn reject(&self, err: &HttpError) -> ResponseOutput {
        let mut res = self.fresh_response();
        let output = self.render_error(err, &mut res, None);
        self.stamp(output)
    }

    fn fresh_response(&self) -> Response {
        Response::new(&self.settings.default_content_type).with_views(Arc::clone(&self.views))
    }

    async fn dispatch_resource(
        &self,
        request: IncomingRequest,
        res: &mut Response,
        negotiated: &mut Option<String>,
    ) -> Result<ResponseOutput, HttpError> {
        let Some(RouteMatch {
            resource,
            template,
            params,
        }) = self.registry.resolve(&request.path)
        else {
            return Err(HttpError::not_found(&request.path));
        };

        if !resource.supports(&request.method) {
            res.set_header(header::ALLOW.as_str(), &resource.allow_header())?;
            return Err(HttpError::method_not_allowed(&request.method, &request.path));
        }

        let produced = resource.produced_types();
        let chosen = if produced.is_empty() {
            None
        } else {
            let chosen = http::negotiate(request.header_value("accept"), &produced)?;
            res.set_content_type(&chosen.media_type)?;
            *negotiated = Some(chosen.media_type.clone());
            Some(chosen)
        };

        let method = request.method.clone();
        let ctx = RequestContext::new(request, template, params, chosen)?;
        // Handler panics become a 500
        let handled = AssertUnwindSafe(async { resource.dispatch(&method, &ctx, res)?.await })
            .catch_unwind()
            .await;
        match handled {
            Ok(result) => result?,
            Err(payload) => {
                logger::log_error(&format!(
                    "Handler '{}' panicked on {method} {}: {}",
                    resource.name(),
                    ctx.path(),
                    panic_message(payload.as_ref())
                ));
                return Err(HttpError::internal("Internal Server Error"));
            }
        }

        match res.take_emitted() {
            Some(output) => Ok(output),
            None => res.send(),
        }
    }

    fn finish(
        &self,
        result: Result<ResponseOutput, HttpError>,
        res: &mut Response,
        negotiated: Option<&str>,
    ) -> ResponseOutput {
        let output = match result {
            Ok(output) => output,
            Err(err) => self.render_error(&err, res, negotiated),
        };
        self.stamp(output)
    }

    fn render_error(
        &self,
        err: &HttpError,
        res: &mut Response,
        negotiated: Option<&str>,
    ) -> ResponseOutput {
        if err.status().is_server_error() {
            logger::log_error(&err.to_string());
        } else {
            logger::log_debug(&err.to_string());
        }

        if let Some(output) = res.take_emitted() {
            logger::log_warning(&format!("Handler failed after sending a response: {err}"));
            return output;
        }

        res.apply_error(err, negotiated.unwrap_or(mime::TEXT_PLAIN));
        res.send().unwrap_or_else(|send_err| {
            logger::log_error(&format!("Failed to render error response: {send_err}"));
            http::plain_output(err.status(), err.message(), &self.settings.server_name)
        })
    }

    fn stamp(&self, mut output: ResponseOutput) -> ResponseOutput {
        if let Some(server) = &self.server_header {
            output.headers.insert(header::SERVER, server.clone());
        }
        output
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
