use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use bcrypt::verify;
use tracing::{info, warn};

use super::models::{ADMIN_COOKIE, AdminClaims, LoginRequest, LoginResponse, TOKEN_TTL_SECS};
use crate::{
    config::Config,
    utils::{AppError, ValidatedJson, internal_error},
};

pub async fn login(
    State(config): State<Arc<Config>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(hash) = config.admin_password_hash.clone() else {
        warn!("admin login attempted but ADMIN_PASSWORD_HASH is not configured");
        return Err(AppError::Unauthorized);
    };

    // bcrypt runs on every attempt, whatever the username
    let password_ok = verify_password(payload.password, hash).await?;

    if !password_ok || payload.username != config.admin_username {
        warn!(username = %payload.username, "admin login failed");
        return Err(AppError::Unauthorized);
    }

    let claims = AdminClaims::new(&payload.username);
    let token = claims.encode(&config.jwt_secret).map_err(internal_error)?;

    info!(username = %claims.sub, "admin logged in");

    let cookie = format!(
        "{ADMIN_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={TOKEN_TTL_SECS}"
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            success: true,
            token,
            expires_at: claims.exp,
        }),
    ))
}

pub async fn logout() -> impl IntoResponse {
    let cookie = format!("{ADMIN_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0");

    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(serde_json::json!({ "success": true })),
    )
}

pub async fn current_admin(claims: AdminClaims) -> Json<AdminClaims> {
    Json(claims)
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Password check error: {e}")))
}

/// bcrypt hash for `ADMIN_PASSWORD_HASH`.
pub async fn create_password_hash(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Hashing error: {e}")))
}
