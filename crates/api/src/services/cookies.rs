//! Session cookie helpers for the admin login.

use axum::http::{header, HeaderMap, HeaderValue};

/// Name of the admin session cookie.
pub const SESSION_COOKIE: &str = "ts_session";

const COOKIE_PATH: &str = "/api";

/// Builds Set-Cookie values for the admin session.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie {
    secure: bool,
    max_age_secs: i64,
}

impl SessionCookie {
    pub fn new(secure: bool, max_age_secs: i64) -> Self {
        Self {
            secure,
            max_age_secs,
        }
    }

    /// Set-Cookie value carrying the raw session token.
    pub fn issue(&self, token: &str) -> String {
        self.with_attributes(format!(
            "{}={}; Path={}; Max-Age={}",
            SESSION_COOKIE, token, COOKIE_PATH, self.max_age_secs
        ))
    }

    /// Set-Cookie value that removes the session cookie.
    pub fn clear(&self) -> String {
        self.with_attributes(format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            SESSION_COOKIE, COOKIE_PATH
        ))
    }

    /// Appends a Set-Cookie header.
    pub fn append_to(headers: &mut HeaderMap, cookie: &str) {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.append(header::SET_COOKIE, value);
        }
    }

    fn with_attributes(&self, mut cookie: String) -> String {
        cookie.push_str("; HttpOnly; SameSite=Strict");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract a cookie value from request headers by name.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}
