//! Routing module
//!
//! Path templates with `:name` parameters and the registry that maps a
//! request path to the resource answering it.

mod registry;
mod template;

pub use registry::{RegistryBuilder, ResourceRegistry, RouteMatch};
pub use template::{match_templates, PathParams, PathTemplate, Segment, TemplateError};
