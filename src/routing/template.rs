//! Path template module
//!
//! Compiles `/`-delimited route templates such as `/coffee/:id` and matches
//! concrete request paths against them, extracting named parameters.

use thiserror::Error;

/// Marker that turns a template segment into a named parameter
const PARAM_MARKER: char = ':';

/// Template compilation failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("path template '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("path template '{template}' has an unnamed parameter segment")]
    EmptyParamName { template: String },
    #[error("path template '{template}' declares parameter '{name}' more than once")]
    DuplicateParam { template: String, name: String },
}

/// One segment of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Compiled route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

/// Parameters bound by a successful match, in template order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pairs: Vec<(String, String)>,
}

impl PathParams {
    /// Value bound to `name`, or `None` when the template has no such parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PathTemplate {
    /// Compile a template string.
    ///
    /// Each segment is wholly literal or wholly a parameter; `:id` binds the
    /// whole request segment, `a:id` is just a literal.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash(template.to_string()));
        }

        let mut segments = Vec::new();
        for part in template.split('/') {
            let Some(name) = part.strip_prefix(PARAM_MARKER) else {
                segments.push(Segment::Literal(part.to_string()));
                continue;
            };

            if name.is_empty() {
                return Err(TemplateError::EmptyParamName {
                    template: template.to_string(),
                });
            }
            let duplicate = segments
                .iter()
                .any(|s| matches!(s, Segment::Param(existing) if existing == name));
            if duplicate {
                return Err(TemplateError::DuplicateParam {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            segments.push(Segment::Param(name.to_string()));
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    /// Template text as registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Match a request path, returning bound parameters on success
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        if path.split('/').count() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, actual) in self.segments.iter().zip(path.split('/')) {
            match segment {
                Segment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Param(name) => params.pairs.push((name.clone(), actual.to_string())),
            }
        }
        Some(params)
    }
}

/// Find the first template that matches `path`, in the order given
pub fn match_templates<'a>(
    templates: &'a [PathTemplate],
    path: &str,
) -> Option<(&'a PathTemplate, PathParams)> {
    templates
        .iter()
        .find_map(|template| template.matches(path).map(|params| (template, params)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(templates: &[&str]) -> Vec<PathTemplate> {
        templates
            .iter()
            .map(|t| PathTemplate::parse(t).unwrap())
            .collect()
    }

    #[test]
    fn test_param_binding() {
        let template = PathTemplate::parse("/coffee/:id").unwrap();
        let params = template.matches("/coffee/17").unwrap();
        assert_eq!(params.get("id"), Some("17"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_param_binds_any_content() {
        let template = PathTemplate::parse("/files/:name/raw").unwrap();
        let params = template.matches("/files/a.b-c%20d:e/raw").unwrap();
        assert_eq!(params.get("name"), Some("a.b-c%20d:e"));
    }

    #[test]
    fn test_segment_count_must_match() {
        let template = PathTemplate::parse("/coffee/:id").unwrap();
        assert!(template.matches("/coffee").is_none());
        assert!(template.matches("/coffee/17/beans").is_none());
    }

    #[test]
    fn test_literal_must_match_exactly() {
        let template = PathTemplate::parse("/coffee/:id").unwrap();
        assert!(template.matches("/Coffee/17").is_none());
        assert!(template.matches("/tea/17").is_none());
    }

    #[test]
    fn test_trailing_slash_is_distinct() {
        let template = PathTemplate::parse("/coffee").unwrap();
        assert!(template.matches("/coffee").is_some());
        assert!(template.matches("/coffee/").is_none());

        let with_slash = PathTemplate::parse("/coffee/").unwrap();
        assert!(with_slash.matches("/coffee/").is_some());
        assert!(with_slash.matches("/coffee").is_none());
    }

    #[test]
    fn test_zero_param_template_is_exact() {
        let template = PathTemplate::parse("/about/team").unwrap();
        let params = template.matches("/about/team").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_unknown_param_is_absent() {
        let template = PathTemplate::parse("/coffee").unwrap();
        let params = template.matches("/coffee").unwrap();
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_partial_segment_is_literal() {
        let template = PathTemplate::parse("/v:version/items").unwrap();
        assert!(template.matches("/v2/items").is_none());
        assert!(template.matches("/v:version/items").is_some());
    }

    #[test]
    fn test_registration_order_wins() {
        let templates = compile(&["/coffee/:id", "/coffee/special"]);
        let (template, params) = match_templates(&templates, "/coffee/special").unwrap();
        assert_eq!(template.as_str(), "/coffee/:id");
        assert_eq!(params.get("id"), Some("special"));

        let templates = compile(&["/coffee/special", "/coffee/:id"]);
        let (template, params) = match_templates(&templates, "/coffee/special").unwrap();
        assert_eq!(template.as_str(), "/coffee/special");
        assert!(params.is_empty());
    }

    #[test]
    fn test_no_match() {
        let templates = compile(&["/coffee/:id", "/tea"]);
        assert!(match_templates(&templates, "/juice").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        assert_eq!(
            PathTemplate::parse("coffee"),
            Err(TemplateError::MissingLeadingSlash("coffee".to_string()))
        );
        assert!(matches!(
            PathTemplate::parse("/coffee/:"),
            Err(TemplateError::EmptyParamName { .. })
        ));
        assert!(matches!(
            PathTemplate::parse("/a/:id/b/:id"),
            Err(TemplateError::DuplicateParam { name, .. }) if name == "id"
        ));
    }
}
