use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::{config::Config, utils::AppError};

pub const ADMIN_COOKIE: &str = "admin_token";
pub const ADMIN_ROLE: &str = "admin";
pub const TOKEN_TTL_SECS: i64 = 60 * 60 * 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl AdminClaims {
    pub fn new(username: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: username.to_owned(),
            role: ADMIN_ROLE.to_owned(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        }
    }

    pub fn encode(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn decode(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned());

    bearer.or_else(|| {
        parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == ADMIN_COOKIE)
            .map(|(_, value)| value.to_owned())
    })
}

impl<S> FromRequestParts<S> for AdminClaims
where
    Arc<Config>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<Config>::from_ref(state);

        let token = token_from_parts(parts).ok_or(AppError::Unauthorized)?;

        let claims = AdminClaims::decode(&token, &config.jwt_secret).map_err(|e| {
            debug!(error = %e, "rejecting admin token");
            AppError::Unauthorized
        })?;

        if claims.role != ADMIN_ROLE {
            return Err(AppError::Forbidden);
        }

        Ok(claims)
    }
}

/// Lets public endpoints widen their answer for a signed-in admin without
/// rejecting anonymous callers.
impl<S> OptionalFromRequestParts<S> for AdminClaims
where
    Arc<Config>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let config = Arc::<Config>::from_ref(state);

        Ok(token_from_parts(parts)
            .and_then(|token| AdminClaims::decode(&token, &config.jwt_secret).ok())
            .filter(|claims| claims.role == ADMIN_ROLE))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: i64,
}
