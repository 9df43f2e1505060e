// region:    --- Imports
use crate::error::ApiError;
use crate::query;
use crate::state::AppState;
use crate::users::User;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
// endregion: --- Imports

// region:    --- Passwords
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}
// endregion: --- Passwords

// region:    --- Tokens
const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub exp: usize,
    pub iat: usize,
}

pub fn create_token(secret: &str, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
// endregion: --- Tokens

// region:    --- Extractor
/// Authenticated request extractor: validates the bearer token and loads the
/// current user. Deactivated accounts are refused here, so every protected
/// handler sees a live account.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized("missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("expected a bearer token"))?;

        let claims = decode_token(&state.config.jwt_secret, token)
            .map_err(|_| ApiError::Unauthorized("invalid or expired token"))?;

        let user = query::handlers::get_user_by_id(&state.db, claims.sub)
            .await?
            .ok_or(ApiError::Unauthorized("unknown user"))?;
        if !user.is_active {
            return Err(ApiError::Unauthorized(
                "your account has been deactivated, please contact admin",
            ));
        }
        Ok(AuthUser(user))
    }
}
// endregion: --- Extractor

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_carries_user_id() {
        let secret = "test-secret-that-is-long-enough!";
        let token = create_token(secret, 42).unwrap();
        let claims = decode_token(secret, &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let token = create_token("secret-number-one-padded-to-32ch", 7).unwrap();
        assert!(decode_token("secret-number-two-padded-to-32ch", &token).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }
}
