//! Request handler module
//!
//! Responsible for request routing dispatch: resources, static files and the
//! hyper service entry point.

mod dispatch;
pub mod service;
pub mod static_files;

// Re-export main entry point
pub use dispatch::{Router, RouterSettings};
pub use service::handle_request;
pub use static_files::StaticRoute;
