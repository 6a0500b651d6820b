//! Resource-oriented HTTP server
//!
//! Resources bind path templates to per-verb handlers. The router matches a
//! request path, checks the verb, negotiates the response content type from
//! `Accept`, and lends the handler a mutable [`response::Response`] to fill
//! in. Every failure is turned into a well-formed response.

pub mod config;
pub mod demo;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod request;
pub mod resource;
pub mod response;
pub mod routing;
pub mod server;
pub mod view;

pub use error::{ErrorKind, HttpError};
pub use request::{IncomingRequest, RequestContext};
pub use resource::{HandlerFuture, Resource};
pub use response::{Body, Response, ResponseOutput};
pub use routing::ResourceRegistry;
