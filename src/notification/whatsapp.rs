use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::config::{WhatsappConfig, WhatsappProvider};

#[derive(Error, Debug)]
pub enum WhatsappError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider answered {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Sends a text message to `to` (E.164, with or without `+`) through the configured provider.
pub async fn send_text(
    http: &reqwest::Client,
    config: &WhatsappConfig,
    to: &str,
    body: &str,
) -> Result<(), WhatsappError> {
    let digits = to.trim().trim_start_matches('+');

    let request = match &config.provider {
        WhatsappProvider::Twilio {
            account_sid,
            auth_token,
            from,
            api_base,
        } => {
            let from = format!("whatsapp:+{}", from.trim().trim_start_matches('+'));
            let to = format!("whatsapp:+{digits}");
            http.post(format!(
                "{api_base}/2010-04-01/Accounts/{account_sid}/Messages.json"
            ))
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", body)])
        }
        WhatsappProvider::Meta {
            token,
            phone_number_id,
            graph_base,
        } => http
            .post(format!("{graph_base}/{phone_number_id}/messages"))
            .bearer_auth(token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "to": digits,
                "type": "text",
                "text": { "body": body },
            })),
    };

    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(WhatsappError::Status { status, body });
    }

    info!(to = digits, "whatsapp message sent");

    Ok(())
}
