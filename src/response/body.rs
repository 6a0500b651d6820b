//! Response body values and their text serialization

use hyper::body::Bytes;
use serde_json::Value;

use crate::error::HttpError;
use crate::http::mime;
use crate::http::negotiate::essence;

/// Body set by a handler
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// Nothing was ever assigned
    #[default]
    Undefined,
    /// Explicitly emptied
    Null,
    Bool(bool),
    Text(String),
    Structured(Value),
    Raw(Bytes),
}

impl Body {
    /// JavaScript-style truthiness, used for JSON bodies
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null | Self::Bool(false) => true,
            Self::Text(text) => text.is_empty(),
            Self::Structured(value) => match value {
                Value::Null | Value::Bool(false) => true,
                Value::String(s) => s.is_empty(),
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::Bool(true) | Value::Array(_) | Value::Object(_) => false,
            },
            Self::Bool(true) | Self::Raw(_) => false,
        }
    }

    /// Serialize for the given content type.
    ///
    /// JSON content types get JSON encoding, with falsy bodies rendered as
    /// the empty string. Every other content type uses the literal mapping:
    /// `Null` is `"null"`, `Undefined` is `"undefined"`, booleans are their
    /// text, strings pass through, anything else collapses to `"null"`.
    pub fn serialize(&self, content_type: &str) -> Result<String, HttpError> {
        if essence(content_type) == mime::APPLICATION_JSON {
            return self.to_json();
        }

        let text = match self {
            Self::Undefined => "undefined".to_string(),
            Self::Bool(flag) | Self::Structured(Value::Bool(flag)) => flag.to_string(),
            Self::Text(text) | Self::Structured(Value::String(text)) => text.clone(),
            Self::Null | Self::Structured(_) | Self::Raw(_) => "null".to_string(),
        };
        Ok(text)
    }

    fn to_json(&self) -> Result<String, HttpError> {
        if self.is_falsy() {
            return Ok(String::new());
        }
        let json = match self {
            Self::Bool(flag) => serde_json::to_string(flag)?,
            Self::Text(text) => serde_json::to_string(text)?,
            Self::Structured(value) => serde_json::to_string(value)?,
            Self::Raw(bytes) => serde_json::to_string(&bytes[..])?,
            Self::Undefined | Self::Null => String::new(),
        };
        Ok(json)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for Body {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Raw(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HTML: &str = "text/html";
    const JSON: &str = "application/json";

    #[test]
    fn test_literal_fallback_table() {
        assert_eq!(Body::Null.serialize(HTML).unwrap(), "null");
        assert_eq!(Body::Undefined.serialize(HTML).unwrap(), "undefined");
        assert_eq!(Body::Bool(true).serialize(HTML).unwrap(), "true");
        assert_eq!(Body::Bool(false).serialize("text/plain").unwrap(), "false");
        assert_eq!(Body::from(json!(42)).serialize(HTML).unwrap(), "null");
        assert_eq!(Body::from(json!({"a": 1})).serialize("text/xml").unwrap(), "null");
        assert_eq!(Body::from(vec![1u8, 2]).serialize(HTML).unwrap(), "null");
        assert_eq!(Body::from("<p>hi</p>").serialize(HTML).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn test_structured_scalars_keep_text_form() {
        assert_eq!(Body::from(json!("plain")).serialize(HTML).unwrap(), "plain");
        assert_eq!(Body::from(json!(true)).serialize(HTML).unwrap(), "true");
        assert_eq!(Body::from(json!(null)).serialize(HTML).unwrap(), "null");
    }

    #[test]
    fn test_json_encoding() {
        let body = Body::from(json!({"name": "Light"}));
        assert_eq!(body.serialize(JSON).unwrap(), r#"{"name":"Light"}"#);
        assert_eq!(
            Body::from("Please specify a coffee ID.").serialize(JSON).unwrap(),
            r#""Please specify a coffee ID.""#
        );
        assert_eq!(Body::Bool(true).serialize(JSON).unwrap(), "true");
        assert_eq!(Body::from(vec![7u8, 8]).serialize(JSON).unwrap(), "[7,8]");
    }

    #[test]
    fn test_json_falsy_bodies_are_empty() {
        for body in [
            Body::Undefined,
            Body::Null,
            Body::Bool(false),
            Body::from(""),
            Body::from(json!(0)),
            Body::from(json!(null)),
        ] {
            assert_eq!(body.serialize(JSON).unwrap(), "", "body {body:?}");
        }
    }

    #[test]
    fn test_json_with_parameters() {
        let body = Body::from(json!([1, 2]));
        assert_eq!(
            body.serialize("application/json; charset=utf-8").unwrap(),
            "[1,2]"
        );
    }
}
