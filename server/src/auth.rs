//! Bearer-token authentication and role guards.

use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use entity::user::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use platform_api::ApiError;
use products_marketplace::{Caller, accounts::active_user};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::AppState;

#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    pub token_ttl_minutes: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(secret: Vec<u8>, token_ttl_minutes: i64) -> Self {
        Self {
            secret,
            token_ttl_minutes,
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue_token(
    user_id: Uuid,
    role: Role,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.token_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(token: &str, config: &AuthConfig) -> jsonwebtoken::errors::Result<Claims> {
    jsonwebtoken::decode::<Claims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Expected: Bearer <token>"))
}

/// Any authenticated, active user. The role comes from the database, not
/// the token, so a role change takes effect without reissuing tokens.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Caller);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_token(token, &state.config.auth)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
        let user = active_user(&state.db, claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::unauthorized("Unknown or inactive user"))?;
        Ok(CurrentUser(Caller::new(user.id, user.role)))
    }
}

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: Role,
) -> Result<Caller, ApiError> {
    let CurrentUser(caller) = CurrentUser::from_request_parts(parts, state).await?;
    if caller.role != role {
        return Err(ApiError::forbidden(format!(
            "{} role required",
            role.as_str()
        )));
    }
    Ok(caller)
}

pub struct RequireCustomer(pub Caller);

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Customer)
            .await
            .map(RequireCustomer)
    }
}

pub struct RequirePetsitter(pub Caller);

impl FromRequestParts<AppState> for RequirePetsitter {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Petsitter)
            .await
            .map(RequirePetsitter)
    }
}
