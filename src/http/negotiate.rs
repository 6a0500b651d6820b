//! Content negotiation module
//!
//! Picks a response media type by walking the client's `Accept` candidates in
//! the order they were written and taking the first one the resource can
//! produce.
//!
//! Parsing is deliberately lenient and not RFC 7231 compliant: both `,` and
//! `;` separate candidates, and `q=` weights never reorder anything. Clients
//! sending `text/html;application/json` get `text/html`.

use crate::error::HttpError;

/// Wildcard that accepts every produced type
const ANY: &str = "*/*";

/// Result of a successful negotiation
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedType {
    /// Produced type that won, exactly as the resource declared it
    pub media_type: String,
    /// `q=` parameter of the winning candidate's own entry, 1.0 otherwise.
    /// Informational only.
    pub quality: f32,
}

/// Split an `Accept` header into its ordered candidate tokens
pub fn parse_accept(accept: &str) -> Vec<&str> {
    accept_tokens(accept).into_iter().map(|(token, _)| token).collect()
}

/// Candidate tokens, each paired with the token after it in the same
/// comma-separated entry
fn accept_tokens(accept: &str) -> Vec<(&str, Option<&str>)> {
    let mut tokens = Vec::new();
    for entry in accept.split(',') {
        let parts: Vec<&str> = entry
            .split(';')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();
        for (index, part) in parts.iter().enumerate() {
            tokens.push((*part, parts.get(index + 1).copied()));
        }
    }
    tokens
}

/// Negotiate a media type.
///
/// A missing or blank header behaves as `*/*`.
pub fn negotiate(accept: Option<&str>, produced: &[&str]) -> Result<NegotiatedType, HttpError> {
    let header = accept.map(str::trim).filter(|h| !h.is_empty()).unwrap_or(ANY);
    for (candidate, next) in accept_tokens(header) {
        let Some(winner) = produced.iter().find(|p| media_matches(candidate, p)) else {
            continue;
        };
        return Ok(NegotiatedType {
            media_type: (*winner).to_string(),
            quality: next.and_then(parse_quality).unwrap_or(1.0),
        });
    }

    Err(HttpError::not_acceptable(header))
}

/// Media type with parameters stripped, lowercased
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a client candidate accepts a produced type
fn media_matches(candidate: &str, produced: &str) -> bool {
    let candidate = candidate.to_ascii_lowercase();
    let produced = essence(produced);

    if candidate == ANY || candidate == produced {
        return true;
    }

    // "type/*" accepts any subtype of the same top-level type
    match (candidate.strip_suffix("/*"), produced.split_once('/')) {
        (Some(top), Some((produced_top, _))) => top == produced_top,
        _ => false,
    }
}

fn parse_quality(token: &str) -> Option<f32> {
    token
        .strip_prefix("q=")
        .and_then(|value| value.trim().parse::<f32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: &[&str] = &["text/html", "application/json"];
    const THREE: &[&str] = &["application/json", "text/html", "text/xml"];

    fn pick(accept: &str, produced: &[&str]) -> String {
        negotiate(Some(accept), produced).unwrap().media_type
    }

    #[test]
    fn test_client_order_wins() {
        assert_eq!(pick("text/html;application/json", BOTH), "text/html");
        assert_eq!(pick("application/json;text/xml", THREE), "application/json");
        assert_eq!(pick("text/xml", THREE), "text/xml");
    }

    #[test]
    fn test_client_order_beats_server_order() {
        assert_eq!(pick("text/html,application/json", THREE), "text/html");
        assert_eq!(pick("application/json,text/html", BOTH), "application/json");
    }

    #[test]
    fn test_no_acceptable_type() {
        let err = negotiate(Some("text/plain"), BOTH).unwrap_err();
        assert_eq!(err.status().as_u16(), 406);
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(pick("*/*", BOTH), "text/html");
        assert_eq!(pick("application/*", BOTH), "application/json");
        assert_eq!(pick("image/*;text/*", BOTH), "text/html");
        assert!(negotiate(Some("image/*"), BOTH).is_err());
    }

    #[test]
    fn test_missing_header_accepts_anything() {
        assert_eq!(negotiate(None, BOTH).unwrap().media_type, "text/html");
        assert_eq!(negotiate(Some("  "), BOTH).unwrap().media_type, "text/html");
    }

    #[test]
    fn test_quality_never_reorders() {
        let negotiated =
            negotiate(Some("text/html;q=0.1, application/json;q=0.9"), BOTH).unwrap();
        assert_eq!(negotiated.media_type, "text/html");
        assert!((negotiated.quality - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_quality_from_another_entry_ignored() {
        let negotiated = negotiate(Some("text/html, q=0.5"), BOTH).unwrap();
        assert_eq!(negotiated.media_type, "text/html");
        assert!((negotiated.quality - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_default_quality() {
        let negotiated = negotiate(Some("application/json"), BOTH).unwrap();
        assert!((negotiated.quality - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_produced_parameters_ignored() {
        let produced = &["text/html; charset=utf-8"];
        assert_eq!(pick("TEXT/HTML", produced), "text/html; charset=utf-8");
    }

    #[test]
    fn test_parse_accept_tokens() {
        assert_eq!(
            parse_accept("text/html, application/json;q=0.9 ;;"),
            vec!["text/html", "application/json", "q=0.9"]
        );
    }
}
