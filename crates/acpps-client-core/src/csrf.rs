//! CSRF token lookup for state-changing requests.

use percent_encoding::percent_decode_str;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Anti-forgery token sent with every state-changing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Reads the token from a `document.cookie` style string.
    #[must_use]
    pub fn from_cookie_header(cookie_header: &str) -> Option<Self> {
        read_cookie(cookie_header, CSRF_COOKIE_NAME).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn header(&self) -> (&'static str, &str) {
        (CSRF_HEADER_NAME, &self.0)
    }
}

#[must_use]
pub fn read_cookie(cookie_header: &str, name: &str) -> Option<String> {
    if cookie_header.trim().is_empty() || name.is_empty() {
        return None;
    }
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie_among_others() {
        let header = "sessionid=abc; csrftoken=tok123; theme=dark";
        assert_eq!(read_cookie(header, "csrftoken").as_deref(), Some("tok123"));
        assert_eq!(read_cookie(header, "theme").as_deref(), Some("dark"));
    }

    #[test]
    fn prefix_named_cookies_do_not_match() {
        let header = "csrftoken_legacy=old; xcsrftoken=nope";
        assert_eq!(read_cookie(header, "csrftoken"), None);
    }

    #[test]
    fn first_matching_cookie_wins_and_value_is_percent_decoded() {
        let header = "csrftoken=a%2Bb%3D; csrftoken=second";
        assert_eq!(read_cookie(header, "csrftoken").as_deref(), Some("a+b="));
    }

    #[test]
    fn empty_header_yields_none() {
        assert_eq!(CsrfToken::from_cookie_header(""), None);
        assert_eq!(CsrfToken::from_cookie_header("   "), None);
    }

    #[test]
    fn token_header_uses_django_header_name() {
        let token = CsrfToken::from_cookie_header("csrftoken=tok").expect("token");
        assert_eq!(token.header(), ("X-CSRFToken", "tok"));
    }
}
