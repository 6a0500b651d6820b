//! Demo resources served by the binary

pub mod coffee;
pub mod home;

use crate::routing::{ResourceRegistry, TemplateError};

/// Registry with every demo resource, in match priority order
pub fn registry() -> Result<ResourceRegistry, TemplateError> {
    Ok(ResourceRegistry::builder()
        .register(home::resource()?)
        .register(coffee::resource()?)
        .build())
}
