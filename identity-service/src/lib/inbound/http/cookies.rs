use auth::TokenPair;
use auth::ACCESS_TOKEN_TTL_HOURS;
use auth::REFRESH_TOKEN_TTL_HOURS;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use time::Duration;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Attributes applied to both session cookies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Add both session cookies for a freshly issued pair.
    pub fn session_cookies(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.build(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.clone(),
            Duration::hours(ACCESS_TOKEN_TTL_HOURS),
        ))
        .add(self.build(
            REFRESH_TOKEN_COOKIE,
            tokens.refresh_token.clone(),
            Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        ))
    }

    /// Overwrite both session cookies with empty, immediately expired values.
    pub fn cleared_cookies(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(ACCESS_TOKEN_COOKIE, String::new(), Duration::ZERO))
            .add(self.build(REFRESH_TOKEN_COOKIE, String::new(), Duration::ZERO))
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }
}

/// Value of the named cookie, if present. An empty value counts as absent.
pub fn token_from_jar<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    use super::*;

    fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        let response = (jar, ()).into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_session_cookie_attributes() {
        let tokens = TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        };

        let jar = CookiePolicy::new(false).session_cookies(CookieJar::new(), &tokens);
        let headers = set_cookie_headers(jar);
        assert_eq!(headers.len(), 2);

        let access = headers
            .iter()
            .find(|h| h.starts_with("access_token=access"))
            .unwrap();
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("SameSite=Lax"));
        assert!(access.contains("Path=/"));
        assert!(access.contains("Max-Age=86400"));
        assert!(!access.contains("Secure"));

        let refresh = headers
            .iter()
            .find(|h| h.starts_with("refresh_token=refresh"))
            .unwrap();
        assert!(refresh.contains("Max-Age=604800"));
    }

    #[test]
    fn test_secure_flag_follows_policy() {
        let tokens = TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        };

        let jar = CookiePolicy::new(true).session_cookies(CookieJar::new(), &tokens);
        let headers = set_cookie_headers(jar);
        assert!(headers.iter().all(|h| h.contains("Secure")));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        let jar = CookiePolicy::default().cleared_cookies(CookieJar::new());
        let headers = set_cookie_headers(jar);

        assert_eq!(headers.len(), 2);
        assert!(headers
            .iter()
            .all(|h| h.contains("Max-Age=0") && h.contains("HttpOnly")));
        assert!(headers.iter().any(|h| h.starts_with("access_token=;")));
        assert!(headers.iter().any(|h| h.starts_with("refresh_token=;")));
    }

    #[test]
    fn test_empty_cookie_counts_as_absent() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, ""));
        assert_eq!(token_from_jar(&jar, ACCESS_TOKEN_COOKIE), None);

        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "abc"));
        assert_eq!(token_from_jar(&jar, ACCESS_TOKEN_COOKIE), Some("abc"));
    }
}
