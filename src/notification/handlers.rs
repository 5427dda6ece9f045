use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::warn;

use super::{
    email::Mailer,
    models::{EmailKind, SendEmailRequest, SendEmailResponse},
    templates,
};
use crate::{
    config::Config,
    utils::{AppError, ValidatedJson},
};

/// Renders a transactional template and sends it straight away over SMTP.
pub async fn send_email(
    State(config): State<Arc<Config>>,
    ValidatedJson(req): ValidatedJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, AppError> {
    let (subject, html) = match req.kind {
        EmailKind::OrderConfirmation => {
            templates::order_confirmation(&req.name, &req.order_id, &req.items, req.total)
        }
        EmailKind::StatusUpdate => {
            let status = req
                .status
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| AppError::Validation("status is required".to_owned()))?;
            templates::status_update(&req.name, &req.order_id, status)
        }
    };

    let smtp = config
        .smtp
        .as_ref()
        .ok_or_else(|| AppError::Upstream("email delivery is not configured".to_owned()))?;

    let name = Some(req.name.as_str()).filter(|n| !n.is_empty());

    Mailer::new(smtp)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .send_html(&req.to, name, &subject, html)
        .await
        .map_err(|e| {
            warn!(error = %e, order_id = %req.order_id, "transactional email failed");
            AppError::Upstream(e.to_string())
        })?;

    Ok(Json(SendEmailResponse { success: true }))
}
