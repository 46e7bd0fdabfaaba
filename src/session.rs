use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::Capabilities;
use crate::config::SessionConfig;

/// Authenticated identity carried in the session cookie.
///
/// Replaced wholesale on login/logout; never mutated in place. The
/// capability flags are computed once at login from the member's roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user: SessionUser,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Sign a session token for the cookie payload.
pub fn issue(user: &SessionUser, config: &SessionConfig) -> Result<String, SessionError> {
    let now = Utc::now();
    let claims = Claims {
        user: user.clone(),
        exp: (now + Duration::seconds(config.max_age_secs)).timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?)
}

/// Verify a session token; tampered or expired tokens are an error.
pub fn verify(token: &str, config: &SessionConfig) -> Result<SessionUser, SessionError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims.user)
}

/// Read the session from a request's Cookie header. Any invalid token
/// reads as "not logged in".
pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Option<SessionUser> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    let prefix = format!("{}=", config.cookie_name);
    let token = cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))?;
    verify(token, config).ok()
}

pub fn session_cookie(token: &str, config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name, token, config.max_age_secs
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Expired cookie that removes the session on the client.
pub fn clear_cookie(config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_config() -> SessionConfig {
        SessionConfig {
            cookie_name: "portal_session".to_string(),
            secret: "test-secret".to_string(),
            max_age_secs: 7 * 24 * 60 * 60,
            secure: false,
        }
    }

    fn test_user() -> SessionUser {
        SessionUser {
            id: "123456789012345678".to_string(),
            username: "quinoa".to_string(),
            display_name: "[T-411] Quinoa".to_string(),
            roles: vec!["100".to_string(), "200".to_string()],
            capabilities: Capabilities {
                can_login: true,
                can_view_dashboard: true,
                can_remove_logs: false,
                can_reset_stats: false,
            },
        }
    }

    #[test]
    fn issue_verify_round_trip() {
        let config = test_config();
        let token = issue(&test_user(), &config).unwrap();
        let user = verify(&token, &config).unwrap();
        assert_eq!(user.id, "123456789012345678");
        assert_eq!(user.display_name, "[T-411] Quinoa");
        assert!(user.capabilities.can_view_dashboard);
        assert!(!user.capabilities.can_reset_stats);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let config = test_config();
        let mut other = test_config();
        other.secret = "different-secret".to_string();
        let token = issue(&test_user(), &other).unwrap();
        assert!(verify(&token, &config).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let mut config = test_config();
        config.max_age_secs = -24 * 60 * 60;
        let token = issue(&test_user(), &config).unwrap();
        assert!(verify(&token, &test_config()).is_err());
    }

    #[test]
    fn reads_session_from_cookie_header() {
        let config = test_config();
        let token = issue(&test_user(), &config).unwrap();

        let mut headers = HeaderMap::new();
        let value = format!("other=1; portal_session={}; theme=dark", token);
        headers.insert(header::COOKIE, HeaderValue::from_str(&value).unwrap());

        let user = from_headers(&headers, &config).expect("session should parse");
        assert_eq!(user.username, "quinoa");
    }

    #[test]
    fn missing_cookie_reads_as_logged_out() {
        let headers = HeaderMap::new();
        assert!(from_headers(&headers, &test_config()).is_none());
    }

    #[test]
    fn cookie_attributes() {
        let mut config = test_config();
        let set = session_cookie("abc", &config);
        assert!(set.starts_with("portal_session=abc"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("SameSite=Lax"));
        assert!(!set.contains("Secure"));

        config.secure = true;
        assert!(session_cookie("abc", &config).contains("Secure"));
        assert!(clear_cookie(&config).contains("Max-Age=0"));
    }
}
