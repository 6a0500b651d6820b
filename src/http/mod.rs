//! HTTP protocol layer module
//!
//! Protocol helpers shared by the router, resources and static file serving:
//! content negotiation, cookies, conditional requests, MIME types and status
//! codes.

pub mod cache;
pub mod cookie;
pub mod mime;
pub mod negotiate;
pub mod response;
pub mod status;

pub use negotiate::{negotiate, NegotiatedType};
pub use response::plain_output;
