//! Resource module
//!
//! A [`Resource`] binds one or more path templates to a table of per-verb
//! handlers. Only verbs present in the table are callable; everything else is
//! a `405 Method Not Allowed`.
//!
//! ```
//! use resource_server::resource::Resource;
//!
//! let resource = Resource::new("greeting", ["/hello", "/hello/:name"])
//!     .unwrap()
//!     .produces(["text/html", "application/json"])
//!     .get(|ctx, res| {
//!         Box::pin(async move {
//!             let name = ctx.path_param("name").unwrap_or("stranger");
//!             res.set_body(format!("Hello, {name}!"));
//!             Ok(())
//!         })
//!     });
//! assert_eq!(resource.allow_header(), "GET");
//! ```

use hyper::Method;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HttpError;
use crate::request::RequestContext;
use crate::response::Response;
use crate::routing::{PathTemplate, TemplateError};

/// Future returned by a handler; resolves once the response is mutated
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HttpError>> + Send + 'a>>;

type BoxedHandler =
    Arc<dyn for<'a> Fn(&'a RequestContext, &'a mut Response) -> HandlerFuture<'a> + Send + Sync>;

/// Handler unit registered under one or more path templates
pub struct Resource {
    name: String,
    templates: Vec<PathTemplate>,
    produces: Vec<String>,
    handlers: Vec<(Method, BoxedHandler)>,
}

impl Resource {
    /// Create a resource answering on `paths`, in priority order
    pub fn new<I, S>(name: &str, paths: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let templates = paths
            .into_iter()
            .map(|p| PathTemplate::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.to_string(),
            templates,
            produces: Vec::new(),
            handlers: Vec::new(),
        })
    }

    /// Content types this resource can produce, in server preference order
    #[must_use]
    pub fn produces<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = types.into_iter().map(Into::into).collect();
        self
    }

    /// Register the handler for `method`, replacing any earlier one
    #[must_use]
    pub fn on<F>(mut self, method: Method, handler: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        let handler: BoxedHandler = Arc::new(handler);
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((method, handler)),
        }
        self
    }

    #[must_use]
    pub fn get<F>(self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on(Method::GET, handler)
    }

    #[must_use]
    pub fn post<F>(self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on(Method::POST, handler)
    }

    #[must_use]
    pub fn put<F>(self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on(Method::PUT, handler)
    }

    #[must_use]
    pub fn patch<F>(self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on(Method::PATCH, handler)
    }

    #[must_use]
    pub fn delete<F>(self, handler: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.on(Method::DELETE, handler)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn templates(&self) -> &[PathTemplate] {
        &self.templates
    }

    pub fn produced_types(&self) -> Vec<&str> {
        self.produces.iter().map(String::as_str).collect()
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.handlers.iter().map(|(m, _)| m)
    }

    pub fn supports(&self, method: &Method) -> bool {
        self.handlers.iter().any(|(m, _)| m == method)
    }

    /// Value for the `Allow` header, verbs in registration order
    pub fn allow_header(&self) -> String {
        self.methods()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Select the handler for `method` and start it.
    ///
    /// Fails with `405` before anything runs when the verb is not declared.
    pub fn dispatch<'a>(
        &'a self,
        method: &Method,
        ctx: &'a RequestContext,
        res: &'a mut Response,
    ) -> Result<HandlerFuture<'a>, HttpError> {
        let (_, handler) = self
            .handlers
            .iter()
            .find(|(m, _)| m == method)
            .ok_or_else(|| HttpError::method_not_allowed(method, ctx.path()))?;
        Ok(handler(ctx, res))
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field(
                "templates",
                &self.templates.iter().map(PathTemplate::as_str).collect::<Vec<_>>(),
            )
            .field("produces", &self.produces)
            .field("methods", &self.allow_header())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::IncomingRequest;

    fn echo_resource() -> Resource {
        Resource::new("echo", ["/echo/:word", "/echo"])
            .unwrap()
            .produces(["text/plain"])
            .get(|ctx, res| {
                Box::pin(async move {
                    res.set_body(ctx.path_param("word").unwrap_or("silence").to_string());
                    Ok(())
                })
            })
            .delete(|_ctx, _res| Box::pin(async { Err(HttpError::new(403, "no deleting")) }))
    }

    fn context_for(resource: &Resource, method: Method, path: &str) -> RequestContext {
        let template = &resource.templates()[0];
        let params = template.matches(path).unwrap();
        RequestContext::new(IncomingRequest::new(method, path), template, params, None).unwrap()
    }

    #[test]
    fn test_invalid_template_rejected() {
        assert!(Resource::new("bad", ["no-slash"]).is_err());
    }

    #[test]
    fn test_capabilities() {
        let resource = echo_resource();
        assert!(resource.supports(&Method::GET));
        assert!(!resource.supports(&Method::POST));
        assert_eq!(resource.allow_header(), "GET, DELETE");
        assert_eq!(resource.produced_types(), vec!["text/plain"]);
    }

    #[test]
    fn test_on_replaces_existing_handler() {
        let resource = echo_resource().on(Method::GET, |_ctx, res| {
            Box::pin(async move {
                res.set_body("replaced");
                Ok(())
            })
        });
        assert_eq!(resource.allow_header(), "GET, DELETE");
    }

    #[tokio::test]
    async fn test_dispatch_mutates_response_in_place() {
        let resource = echo_resource();
        let ctx = context_for(&resource, Method::GET, "/echo/hello");
        let mut res = Response::new("text/plain");
        res.set_header("X-Early", "1").unwrap();

        resource
            .dispatch(&Method::GET, &ctx, &mut res)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(res.generate_body().unwrap(), "hello");
        assert_eq!(res.header("x-early"), Some("1"));
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let resource = echo_resource();
        let ctx = context_for(&resource, Method::DELETE, "/echo/x");
        let mut res = Response::new("text/plain");
        let err = resource
            .dispatch(&Method::DELETE, &ctx, &mut res)
            .unwrap()
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
    }

    #[test]
    fn test_undeclared_method() {
        let resource = echo_resource();
        let ctx = context_for(&resource, Method::POST, "/echo/x");
        let mut res = Response::new("text/plain");
        let err = resource.dispatch(&Method::POST, &ctx, &mut res).err().unwrap();
        assert_eq!(err.status().as_u16(), 405);
    }
}
