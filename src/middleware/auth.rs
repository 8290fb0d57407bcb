use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, routes::AppState};

/// Access tokens are valid for one hour from issuance.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims we issue.
#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    sub: String, // user id
    username: &'a str,
    iat: i64,
    exp: i64,
}

/// Claims we accept. Older clients put the user id under `id`, newer ones
/// under `sub`, either as a number or as a numeric string.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub id: Option<ClaimId>,
    pub sub: Option<ClaimId>,
    pub username: Option<String>,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ClaimId {
    Number(i64),
    Text(String),
}

impl ClaimId {
    fn user_id(&self) -> Option<i64> {
        match self {
            ClaimId::Number(n) => Some(*n),
            ClaimId::Text(s) => s.parse().ok(),
        }
    }
}

impl Claims {
    /// `id` first, then `sub`.
    pub fn user_id(&self) -> Option<i64> {
        self.id
            .as_ref()
            .and_then(ClaimId::user_id)
            .or_else(|| self.sub.as_ref().and_then(ClaimId::user_id))
    }
}

/// Identity of the caller, resolved from the bearer token.
///
/// Put it before any body/query extractor so unauthenticated requests are
/// rejected before validation or storage access.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let token = extract_token(header).ok_or(AuthError::MissingToken)?;
        let claims = verify_token(token, &state.config.jwt_secret)?;
        let user_id = claims.user_id().ok_or(AuthError::MissingSubject)?;

        Ok(AuthUser { user_id })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    MissingSubject,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = match err {
            AuthError::MissingToken => "Authentication token required",
            AuthError::InvalidToken => "Invalid or expired token",
            AuthError::MissingSubject => "Invalid token payload",
        };
        AppError::unauthorized(message)
    }
}

/// `Bearer <token>` or a bare token. Blank → `None`.
pub fn extract_token(header: &str) -> Option<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .unwrap_or(header)
        .trim();
    (!token.is_empty()).then_some(token)
}

pub fn create_token(
    user_id: i64,
    username: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = IssuedClaims {
        sub: user_id.to_string(),
        username,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Signature and expiry are checked by `jsonwebtoken`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("Token verification error: {}", e);
        AuthError::InvalidToken
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn sign(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!(extract_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("abc.def"), Some("abc.def"));
        assert_eq!(extract_token("  abc.def "), Some("abc.def"));
        assert_eq!(extract_token("Bearer "), None);
        assert_eq!(extract_token(""), None);
    }

    #[test]
    fn issued_token_round_trips_to_user_id() {
        let token = create_token(42, "alice", SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert!(claims.exp - Utc::now().timestamp() <= TOKEN_TTL_SECS);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(1, "alice", SECRET).unwrap();
        assert_eq!(
            verify_token(&token, "other").unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let past = Utc::now().timestamp() - 2 * TOKEN_TTL_SECS;
        let token = sign(json!({ "sub": "1", "exp": past }));
        assert_eq!(verify_token(&token, SECRET).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn id_claim_is_accepted_and_preferred() {
        let exp = Utc::now().timestamp() + 60;
        let token = sign(json!({ "id": 7, "sub": "9", "exp": exp }));
        assert_eq!(verify_token(&token, SECRET).unwrap().user_id(), Some(7));

        let token = sign(json!({ "sub": 9, "exp": exp }));
        assert_eq!(verify_token(&token, SECRET).unwrap().user_id(), Some(9));
    }

    #[test]
    fn token_without_identity_has_no_user_id() {
        let exp = Utc::now().timestamp() + 60;
        let token = sign(json!({ "username": "ghost", "exp": exp }));
        assert_eq!(verify_token(&token, SECRET).unwrap().user_id(), None);
    }
}
