//! Request module
//!
//! [`IncomingRequest`] is the transport-independent request the router works
//! on; [`RequestContext`] is the read surface a handler sees once a resource
//! has been matched and a content type negotiated.

use hyper::body::Bytes;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method};
use serde_json::Value;

use crate::error::HttpError;
use crate::http::cookie::parse_cookie_header;
use crate::http::mime;
use crate::http::negotiate::{essence, NegotiatedType};
use crate::routing::{PathParams, PathTemplate};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Request as handed over by the transport
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    /// Build from a method and a request target such as `/coffee?id=17`
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    /// Add a header; invalid names or values are skipped
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
enum ParsedBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Opaque,
}

/// Per-request view handed to resource handlers
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    template: String,
    path_params: PathParams,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    body: Bytes,
    parsed_body: ParsedBody,
    negotiated: Option<NegotiatedType>,
}

impl RequestContext {
    /// Build the context for a matched request.
    ///
    /// JSON and form bodies are parsed eagerly; a malformed JSON body is a
    /// `400 Bad Request`.
    pub fn new(
        request: IncomingRequest,
        template: &PathTemplate,
        path_params: PathParams,
        negotiated: Option<NegotiatedType>,
    ) -> Result<Self, HttpError> {
        let IncomingRequest {
            method,
            path,
            query,
            headers,
            body,
        } = request;

        let query = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect();
        let request_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(essence);
        let parsed_body = parse_body(request_type.as_deref(), &body)?;

        Ok(Self {
            method,
            path,
            template: template.as_str().to_string(),
            path_params,
            query,
            headers,
            cookies,
            body,
            parsed_body,
            negotiated,
        })
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Template that matched, as registered
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Path parameter bound by the matched template.
    ///
    /// `None` when the template declares no such parameter, which handlers
    /// routinely treat as a normal branch.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    pub const fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// First decoded value of a query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a cookie sent by the client
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Field of a JSON object body or a form-encoded body
    pub fn body_param(&self, name: &str) -> Option<Value> {
        match &self.parsed_body {
            ParsedBody::Json(Value::Object(fields)) => fields.get(name).cloned(),
            ParsedBody::Form(pairs) => pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| Value::String(v.clone())),
            ParsedBody::Json(_) | ParsedBody::Empty | ParsedBody::Opaque => None,
        }
    }

    /// Whole JSON body, if the request carried one
    pub const fn json_body(&self) -> Option<&Value> {
        match &self.parsed_body {
            ParsedBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub const fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    pub const fn negotiated(&self) -> Option<&NegotiatedType> {
        self.negotiated.as_ref()
    }

    /// Negotiated response content type
    pub fn content_type(&self) -> Option<&str> {
        self.negotiated.as_ref().map(|n| n.media_type.as_str())
    }
}

fn parse_body(content_type: Option<&str>, body: &Bytes) -> Result<ParsedBody, HttpError> {
    if body.is_empty() {
        return Ok(ParsedBody::Empty);
    }
    match content_type {
        Some(mime::APPLICATION_JSON) => serde_json::from_slice(body)
            .map(ParsedBody::Json)
            .map_err(|e| HttpError::bad_request(format!("Unable to parse request body as JSON: {e}"))),
        Some(FORM_URLENCODED) => Ok(ParsedBody::Form(
            url::form_urlencoded::parse(body).into_owned().collect(),
        )),
        _ => Ok(ParsedBody::Opaque),
    }
}
