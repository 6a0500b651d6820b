//! Resource registry
//!
//! Holds every registered resource and resolves a request path to the
//! resource, template and parameters that answer it.

use std::collections::HashMap;

use super::template::{match_templates, PathParams, PathTemplate};
use crate::logger;
use crate::resource::Resource;

/// Result of resolving a path
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub resource: &'a Resource,
    pub template: &'a PathTemplate,
    pub params: PathParams,
}

/// Immutable set of resources, searched in registration order
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
}

/// Collects resources before the registry is frozen
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    resources: Vec<Resource>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn register(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Freeze the registry.
    ///
    /// A template registered twice can never be reached the second time; this
    /// is reported but not rejected.
    pub fn build(self) -> ResourceRegistry {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for resource in &self.resources {
            for template in resource.templates() {
                if let Some(owner) = owners.get(template.as_str()) {
                    logger::log_warning(&format!(
                        "Template '{}' of resource '{}' is shadowed by resource '{owner}'",
                        template.as_str(),
                        resource.name()
                    ));
                } else {
                    owners.insert(template.as_str(), resource.name());
                }
            }
        }
        ResourceRegistry {
            resources: self.resources,
        }
    }
}

impl ResourceRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// First resource whose templates match `path`.
    ///
    /// Resources are tried in registration order, and each resource tries its
    /// own templates in declaration order.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.resources.iter().find_map(|resource| {
            match_templates(resource.templates(), path).map(|(template, params)| RouteMatch {
                resource,
                template,
                params,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str, paths: &[&str]) -> Resource {
        Resource::new(name, paths.iter().copied())
            .unwrap()
            .get(|_ctx, _res| Box::pin(async { Ok(()) }))
    }

    #[test]
    fn test_resolve_binds_params() {
        let registry = ResourceRegistry::builder()
            .register(noop("coffee", &["/coffee/:id", "/coffee"]))
            .build();

        let found = registry.resolve("/coffee/17").unwrap();
        assert_eq!(found.resource.name(), "coffee");
        assert_eq!(found.template.as_str(), "/coffee/:id");
        assert_eq!(found.params.get("id"), Some("17"));

        let found = registry.resolve("/coffee").unwrap();
        assert_eq!(found.template.as_str(), "/coffee");
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_no_match() {
        let registry = ResourceRegistry::builder()
            .register(noop("coffee", &["/coffee/:id"]))
            .build();
        assert!(registry.resolve("/tea/1").is_none());
        assert!(registry.resolve("/coffee/1/extra").is_none());
    }

    #[test]
    fn test_registration_order_wins() {
        let registry = ResourceRegistry::builder()
            .register(noop("wildcard", &["/menu/:item"]))
            .register(noop("specials", &["/menu/specials"]))
            .build();
        let found = registry.resolve("/menu/specials").unwrap();
        assert_eq!(found.resource.name(), "wildcard");
        assert_eq!(found.params.get("item"), Some("specials"));
    }

    #[test]
    fn test_duplicate_templates_are_kept() {
        let registry = ResourceRegistry::builder()
            .register(noop("first", &["/same"]))
            .register(noop("second", &["/same"]))
            .build();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("/same").unwrap().resource.name(), "first");
    }

    #[test]
    fn test_empty_registry() {
        let registry = ResourceRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.resolve("/").is_none());
        assert_eq!(registry.iter().count(), 0);
    }
}
