//! Status code helpers backed by hyper's canonical reason table

use hyper::StatusCode;

/// Status codes accepted by `Response::redirect`
pub const REDIRECT_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// Canonical reason phrase, `None` for unregistered codes
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    StatusCode::from_u16(code).ok()?.canonical_reason()
}

pub fn is_redirect(code: u16) -> bool {
    REDIRECT_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(404), Some("Not Found"));
        assert_eq!(reason_phrase(418), Some("I'm a teapot"));
        assert_eq!(reason_phrase(299), None);
        assert_eq!(reason_phrase(42), None);
    }

    #[test]
    fn test_redirect_codes() {
        assert!(is_redirect(302));
        assert!(is_redirect(308));
        assert!(!is_redirect(300));
        assert!(!is_redirect(304));
        assert!(!is_redirect(200));
    }
}
