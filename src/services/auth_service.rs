use tracing::{debug, warn};
use axum::http::{self, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation, TokenData};

use crate::models::CollabError;

const AUTH_COOKIE: &str = "auth_token";
const TOKEN_QUERY_PARAM: &str = "token";

// Get the auth token from a request
pub fn get_auth_token<B>(req: &http::Request<B>) -> Result<String, String> {
    get_auth_token_from_parts(req.headers(), req.uri().query())
}

// Look for a bearer token in the Authorization header, the `token` query
// parameter and finally the auth cookie
pub fn get_auth_token_from_parts(headers: &HeaderMap, query: Option<&str>) -> Result<String, String> {
    // 1. Authorization header
    if let Some(auth_header) = headers.get(http::header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| "Invalid Authorization header".to_string())?;
        return Ok(auth_str
            .strip_prefix("Bearer ")
            .unwrap_or(auth_str)
            .to_string());
    }

    // 2. Query string, for clients that cannot set headers on a WebSocket handshake
    if let Some(token) = query.and_then(|q| {
        q.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, value)| *key == TOKEN_QUERY_PARAM && !value.is_empty())
            .map(|(_, value)| value.to_string())
    }) {
        return Ok(token);
    }

    // 3. Cookie
    let cookie_header = headers.get(http::header::COOKIE)
        .ok_or_else(|| "Missing Authorization header, token or cookie".to_string())?
        .to_str()
        .map_err(|_| "Invalid Cookie header".to_string())?;

    for cookie in cookie::Cookie::split_parse(cookie_header) {
        if let Ok(c) = cookie {
            if c.name() == AUTH_COOKIE {
                return Ok(c.value().to_string());
            }
        }
    }
    Err(format!("{} cookie not found", AUTH_COOKIE))
}

// Validate a JWT token and return the token data
pub fn validate_jwt(token: &str, secret: &str) -> Result<TokenData<serde_json::Value>, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<serde_json::Value>(token, &decoding_key, &validation)
}

/// Verified caller identity, stored in request extensions by the auth middleware
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

/// Binds a verified identity to a connection or request
#[derive(Clone)]
pub struct SessionAuthenticator {
    secret: String,
}

impl SessionAuthenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Resolve a bearer credential to the user id it was issued for
    pub fn authenticate(&self, token: &str) -> Result<String, CollabError> {
        if token.is_empty() {
            return Err(CollabError::Authentication("Token missing.".to_string()));
        }

        let token_data = validate_jwt(token, &self.secret).map_err(|e| {
            warn!("JWT validation failed: {}", e);
            CollabError::Authentication("Invalid token.".to_string())
        })?;

        let uid = token_data
            .claims
            .get("userId")
            .or_else(|| token_data.claims.get("sub"))
            .and_then(|v| v.as_str())
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| {
                warn!("JWT token carries no userId or sub claim");
                CollabError::Authentication("Invalid token.".to_string())
            })?;

        debug!("JWT token validated for user {}", uid);
        Ok(uid.to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub(crate) const SECRET: &str = "test-secret";

    pub(crate) fn token_for(uid: &str) -> String {
        signed(json!({"userId": uid, "exp": Utc::now().timestamp() + 3600}), SECRET)
    }

    fn signed(claims: serde_json::Value, secret: &str) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn accepts_user_id_and_sub_claims() {
        let auth = SessionAuthenticator::new(SECRET);
        assert_eq!(auth.authenticate(&token_for("u1")).unwrap(), "u1");

        let sub_token = signed(json!({"sub": "u2", "exp": Utc::now().timestamp() + 60}), SECRET);
        assert_eq!(auth.authenticate(&sub_token).unwrap(), "u2");
    }

    #[test]
    fn rejects_bad_credentials() {
        let auth = SessionAuthenticator::new(SECRET);
        let expired = signed(json!({"userId": "u1", "exp": Utc::now().timestamp() - 3600}), SECRET);
        let wrong_secret = signed(json!({"userId": "u1", "exp": Utc::now().timestamp() + 60}), "other");
        let no_identity = signed(json!({"exp": Utc::now().timestamp() + 60}), SECRET);

        for token in ["", "not-a-jwt", expired.as_str(), wrong_secret.as_str(), no_identity.as_str()] {
            assert!(
                matches!(auth.authenticate(token), Err(CollabError::Authentication(_))),
                "token {:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn token_sources_in_priority_order() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::COOKIE, HeaderValue::from_static("theme=dark; auth_token=from-cookie"));
        assert_eq!(get_auth_token_from_parts(&headers, None).unwrap(), "from-cookie");
        assert_eq!(
            get_auth_token_from_parts(&headers, Some("a=1&token=from-query")).unwrap(),
            "from-query"
        );

        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(
            get_auth_token_from_parts(&headers, Some("token=from-query")).unwrap(),
            "from-header"
        );

        assert!(get_auth_token_from_parts(&HeaderMap::new(), Some("token=")).is_err());
    }
}
