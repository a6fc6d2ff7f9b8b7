//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose subject is the technician id. A token is only
//! honoured while it matches the one stored on the technician row, so logging
//! out or logging in again revokes earlier tokens.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::technicians;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

pub struct TokenAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenAuth {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn issue(&self, technician_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: technician_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Invalid token signature".to_string())
                }
                _ => AppError::Unauthorized("Token format is invalid".to_string()),
            })
    }
}

/// The authenticated technician. Every owner-scoped operation takes this
/// value explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub technician_id: String,
}

impl Caller {
    pub fn new(technician_id: impl Into<String>) -> Self {
        Self {
            technician_id: technician_id.into(),
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            AppError::Unauthorized("Authorization token is missing or malformed".to_string())
        })?;
        let claims = state.auth.verify(&token)?;

        let technician = technicians::find_technician_by_id(&state.db, &claims.sub)
            .await?
            .filter(|t| t.deleted_at.is_none())
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        if technician.auth_token.as_deref() != Some(token.as_str()) {
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }

        Ok(Caller::new(technician.id))
    }
}

/// Token from `Authorization: Bearer ...`, falling back to an
/// `authorization` cookie holding the same value.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return strip_bearer(value);
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "authorization")
        .and_then(|(_, value)| strip_bearer(value))
}

fn strip_bearer(value: &str) -> Option<String> {
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Bearer%20"))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let auth = TokenAuth::new(b"test-secret", Duration::hours(1));
        let token = auth.issue("tech-1").expect("issue");
        let claims = auth.verify(&token).expect("verify");
        assert_eq!(claims.sub, "tech-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = TokenAuth::new(b"secret-a", Duration::hours(1));
        let verifier = TokenAuth::new(b"secret-b", Duration::hours(1));
        let token = issuer.issue("tech-1").expect("issue");
        assert!(matches!(verifier.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = TokenAuth::new(b"test-secret", Duration::hours(-2));
        let token = auth.issue("tech-1").expect("issue");
        match auth.verify(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("expected expiry rejection, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn bearer_token_reads_header_then_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; authorization=Bearer%20abc"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
