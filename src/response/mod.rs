//! Response module
//!
//! A [`Response`] is created once per request by the router, lent mutably to
//! the resource handler, and serialized into a [`ResponseOutput`] for the
//! transport. Lifecycle: `Open` -> `Finalizing` (redirect) -> `Emitted`.

mod body;

pub use body::Body;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::error::HttpError;
use crate::http::cookie::Cookie;
use crate::http::status;
use crate::logger;
use crate::view::ViewRenderer;

/// Lifecycle of a single response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Handler is still mutating it
    Open,
    /// A redirect was issued; only emission remains
    Finalizing,
    /// Bytes were handed to the transport
    Emitted,
}

/// Structured output handed to the transport
#[derive(Debug, Clone)]
pub struct ResponseOutput {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResponseOutput {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut response = hyper::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Per-request response state
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Body,
    state: ResponseState,
    views: Option<Arc<ViewRenderer>>,
    emitted: Option<ResponseOutput>,
}

impl Response {
    /// Fresh response with status 200 and the given content type
    pub fn new(content_type: &str) -> Self {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(content_type).unwrap_or_else(|_| {
            logger::log_warning(&format!(
                "Invalid default content type '{content_type}', using text/plain"
            ));
            HeaderValue::from_static("text/plain")
        });
        headers.insert(header::CONTENT_TYPE, value);

        Self {
            status: 200,
            headers,
            body: Body::Undefined,
            state: ResponseState::Open,
            views: None,
            emitted: None,
        }
    }

    /// Attach the view renderer used by [`Response::render`]
    #[must_use]
    pub fn with_views(mut self, views: Arc<ViewRenderer>) -> Self {
        self.views = Some(views);
        self
    }

    pub const fn state(&self) -> ResponseState {
        self.state
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        if self.accepts_mutation("set_status") {
            self.status = status;
        }
    }

    pub fn status_message(&self) -> Option<&'static str> {
        status::reason_phrase(self.status)
    }

    /// `"<code> (<message>)"`, e.g. `"404 (Not Found)"`
    pub fn status_message_full(&self) -> Option<String> {
        self.status_message()
            .map(|message| format!("{} ({message})", self.status))
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if it is valid text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Replace every value of `name` with `value`
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), HttpError> {
        if self.accepts_mutation("set_header") {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            self.headers.insert(name, HeaderValue::from_str(value)?);
        }
        Ok(())
    }

    /// Add another value for `name`, keeping existing ones
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<(), HttpError> {
        if self.accepts_mutation("append_header") {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            self.headers.append(name, HeaderValue::from_str(value)?);
        }
        Ok(())
    }

    pub fn content_type(&self) -> &str {
        self.header(header::CONTENT_TYPE.as_str()).unwrap_or_default()
    }

    pub fn set_content_type(&mut self, content_type: &str) -> Result<(), HttpError> {
        self.set_header(header::CONTENT_TYPE.as_str(), content_type)
    }

    pub const fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        if self.accepts_mutation("set_body") {
            self.body = body.into();
        }
    }

    /// Store any serializable value as a structured body
    pub fn set_json<T: Serialize>(&mut self, value: &T) -> Result<(), HttpError> {
        let value = serde_json::to_value(value)?;
        self.set_body(value);
        Ok(())
    }

    /// Queue a `Set-Cookie` directive
    pub fn set_cookie(&mut self, cookie: &Cookie) -> Result<(), HttpError> {
        if self.accepts_mutation("set_cookie") {
            let value = HeaderValue::from_str(&cookie.to_string())?;
            self.headers.append(header::SET_COOKIE, value);
        }
        Ok(())
    }

    /// Queue a directive that expires `name` on the client
    pub fn delete_cookie(&mut self, name: &str) -> Result<(), HttpError> {
        self.set_cookie(&Cookie::removal(name))
    }

    /// Redirect with one of 301, 302, 303, 307 or 308.
    ///
    /// Any other status is a caller bug: it is logged and rejected, leaving
    /// the response untouched.
    pub fn redirect(&mut self, status: u16, location: &str) -> Result<(), HttpError> {
        if !status::is_redirect(status) {
            logger::log_warning(&format!(
                "Rejected redirect to '{location}' with non-redirect status {status}"
            ));
            return Err(HttpError::internal(format!(
                "{status} is not a redirect status code"
            )));
        }
        if !self.accepts_mutation("redirect") {
            return Ok(());
        }

        let location = HeaderValue::from_str(location)?;
        self.status = status;
        self.headers.insert(header::LOCATION, location);
        self.body = Body::Null;
        self.state = ResponseState::Finalizing;
        Ok(())
    }

    /// Render a view through the configured renderer.
    ///
    /// `None` means no views directory is configured.
    pub async fn render(
        &self,
        template: &str,
        data: Option<&serde_json::Value>,
    ) -> Result<Option<String>, HttpError> {
        let Some(views) = &self.views else {
            return Ok(None);
        };
        Ok(views.render(template, data).await?)
    }

    /// Serialize the body according to the current content type
    pub fn generate_body(&self) -> Result<String, HttpError> {
        self.body.serialize(self.content_type())
    }

    /// Serialize and emit
    pub fn send(&mut self) -> Result<ResponseOutput, HttpError> {
        let body = match self.state {
            ResponseState::Emitted => {
                return Err(HttpError::internal("response was already emitted"));
            }
            ResponseState::Finalizing => Bytes::new(),
            ResponseState::Open => Bytes::from(self.generate_body()?),
        };
        self.emit(body)
    }

    /// Emit raw bytes verbatim, bypassing body serialization
    pub fn send_static(
        &mut self,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<ResponseOutput, HttpError> {
        if self.state == ResponseState::Emitted {
            return Err(HttpError::internal("response was already emitted"));
        }
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type)?);
        self.body = Body::Raw(bytes.clone());
        self.emit(bytes)
    }

    /// Rewrite this response to describe `err`.
    ///
    /// Headers and cookies set earlier survive, except the ones the error path
    /// owns: `Content-Type`, `Location` and `Content-Length`.
    pub(crate) fn apply_error(&mut self, err: &HttpError, content_type: &str) {
        if self.state == ResponseState::Emitted {
            logger::log_warning(&format!("Dropping error after emission: {err}"));
            return;
        }
        let content_type = HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("text/plain"));

        self.headers.remove(header::LOCATION);
        self.headers.remove(header::CONTENT_LENGTH);
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.status = err.status().as_u16();
        self.body = Body::Text(err.message().to_string());
        self.state = ResponseState::Open;
    }

    fn emit(&mut self, body: Bytes) -> Result<ResponseOutput, HttpError> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|_| HttpError::internal(format!("invalid status code {}", self.status)))?;
        let output = ResponseOutput {
            status,
            headers: self.headers.clone(),
            body,
        };
        self.state = ResponseState::Emitted;
        self.emitted = Some(output.clone());
        Ok(output)
    }

    /// Output of an emission that happened inside a handler
    pub(crate) fn take_emitted(&mut self) -> Option<ResponseOutput> {
        self.emitted.take()
    }

    fn accepts_mutation(&self, action: &str) -> bool {
        if self.state == ResponseState::Open {
            return true;
        }
        logger::log_warning(&format!(
            "Ignoring {action} on a response that is already {:?}",
            self.state
        ));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn html() -> Response {
        Response::new("text/html")
    }

    #[test]
    fn test_defaults() {
        let res = Response::new("application/json");
        assert_eq!(res.status(), 200);
        assert_eq!(res.content_type(), "application/json");
        assert_eq!(res.body(), &Body::Undefined);
        assert_eq!(res.state(), ResponseState::Open);
    }

    #[test]
    fn test_generate_body_fallbacks() {
        let mut res = html();
        assert_eq!(res.generate_body().unwrap(), "undefined");
        res.set_body(Body::Null);
        assert_eq!(res.generate_body().unwrap(), "null");
        res.set_body(true);
        assert_eq!(res.generate_body().unwrap(), "true");
        res.set_body(json!(42));
        assert_eq!(res.generate_body().unwrap(), "null");

        let mut res = Response::new("application/json");
        res.set_json(&json!({"name": "Light"})).unwrap();
        assert_eq!(res.generate_body().unwrap(), r#"{"name":"Light"}"#);
    }

    #[test]
    fn test_status_messages() {
        let mut res = html();
        assert_eq!(res.status_message(), Some("OK"));
        assert_eq!(res.status_message_full().as_deref(), Some("200 (OK)"));
        res.set_status(404);
        assert_eq!(res.status_message_full().as_deref(), Some("404 (Not Found)"));
        res.set_status(299);
        assert_eq!(res.status_message(), None);
        assert_eq!(res.status_message_full(), None);
    }

    #[test]
    fn test_headers_are_case_insensitive_and_multi_valued() {
        let mut res = html();
        res.set_header("X-Roast", "light").unwrap();
        res.append_header("x-roast", "dark").unwrap();
        assert_eq!(res.header("X-ROAST"), Some("light"));
        let all: Vec<_> = res.headers().get_all("x-roast").iter().collect();
        assert_eq!(all.len(), 2);

        res.set_header("x-roast", "medium").unwrap();
        assert_eq!(res.headers().get_all("x-roast").iter().count(), 1);
    }

    #[test]
    fn test_invalid_header_is_internal_error() {
        let mut res = html();
        let err = res.set_header("bad header", "x").unwrap_err();
        assert_eq!(err.status().as_u16(), 500);
    }

    #[test]
    fn test_cookies_accumulate() {
        let mut res = html();
        res.set_cookie(&Cookie::new("flavor", "mocha")).unwrap();
        res.delete_cookie("session").unwrap();
        let cookies: Vec<_> = res
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies[0], "flavor=mocha");
        assert!(cookies[1].starts_with("session=; Expires=Thu, 01 Jan 1970"));
    }

    #[test]
    fn test_redirect() {
        let mut res = html();
        res.set_body("ignored");
        res.redirect(302, "/coffee/17").unwrap();
        assert_eq!(res.state(), ResponseState::Finalizing);

        let out = res.send().unwrap();
        assert_eq!(out.status, StatusCode::FOUND);
        assert_eq!(out.header("location"), Some("/coffee/17"));
        assert!(out.body.is_empty());
    }

    #[test]
    fn test_redirect_rejects_non_redirect_codes() {
        let mut res = html();
        let err = res.redirect(200, "/elsewhere").unwrap_err();
        assert_eq!(err.status().as_u16(), 500);
        assert_eq!(res.status(), 200);
        assert_eq!(res.header("location"), None);
        assert_eq!(res.state(), ResponseState::Open);
    }

    #[test]
    fn test_mutations_after_redirect_are_ignored() {
        let mut res = html();
        res.redirect(301, "/new").unwrap();
        res.set_status(200);
        res.set_body("late");
        res.set_cookie(&Cookie::new("late", "1")).unwrap();
        assert_eq!(res.status(), 301);
        assert_eq!(res.body(), &Body::Null);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn test_send_once() {
        let mut res = html();
        res.set_body("hello");
        let out = res.send().unwrap();
        assert_eq!(out.body_text(), "hello");
        assert_eq!(out.header("content-type"), Some("text/html"));
        assert_eq!(res.state(), ResponseState::Emitted);
        assert!(res.send().is_err());
        assert_eq!(res.take_emitted().unwrap().body_text(), "hello");
        assert!(res.take_emitted().is_none());
    }

    #[test]
    fn test_send_static_bypasses_serialization() {
        let mut res = Response::new("application/json");
        let out = res
            .send_static(Bytes::from_static(b"\x89PNG"), "image/png")
            .unwrap();
        assert_eq!(out.body.as_ref(), b"\x89PNG");
        assert_eq!(out.header("content-type"), Some("image/png"));
    }

    #[test]
    fn test_apply_error_keeps_unrelated_headers() {
        let mut res = html();
        res.set_header("X-Trace", "abc").unwrap();
        res.set_cookie(&Cookie::new("seen", "1")).unwrap();
        res.redirect(307, "/temp").unwrap();

        res.apply_error(&HttpError::new(400, "bad beans"), "text/plain");
        let out = res.send().unwrap();
        assert_eq!(out.status, StatusCode::BAD_REQUEST);
        assert_eq!(out.header("x-trace"), Some("abc"));
        assert_eq!(out.header("set-cookie"), Some("seen=1"));
        assert_eq!(out.header("location"), None);
        assert_eq!(out.body_text(), "bad beans");
    }

    #[test]
    fn test_invalid_status_fails_emission() {
        let mut res = html();
        res.set_status(42);
        assert!(res.send().is_err());
        assert_eq!(res.state(), ResponseState::Open);
    }

    #[tokio::test]
    async fn test_render_without_views() {
        let res = html();
        assert_eq!(res.render("index.html", None).await.unwrap(), None);
    }

    #[test]
    fn test_into_hyper() {
        let mut res = html();
        res.set_status(201);
        res.set_body("made");
        let hyper_response = res.send().unwrap().into_hyper();
        assert_eq!(hyper_response.status(), StatusCode::CREATED);
        assert_eq!(
            hyper_response.headers().get("content-type").unwrap(),
            "text/html"
        );
    }
}
