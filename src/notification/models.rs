use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

/// Outcome of one best-effort side channel, reported back to admins.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelStatus {
    Ok,
    Skipped,
    Failed(String),
}

impl ChannelStatus {
    pub fn from_result<E: fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => ChannelStatus::Ok,
            Err(e) => ChannelStatus::Failed(e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ChannelStatus::Ok)
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStatus::Ok => f.write_str("ok"),
            ChannelStatus::Skipped => f.write_str("skipped"),
            ChannelStatus::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}

impl Serialize for ChannelStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailItem {
    pub name: String,
    #[serde(default = "one")]
    pub quantity: i32,
    #[serde(default)]
    pub price: f64,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    OrderConfirmation,
    StatusUpdate,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[serde(rename = "type")]
    pub kind: EmailKind,
    #[validate(email(message = "a valid recipient email is required"))]
    pub to: String,
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, message = "orderId is required"))]
    pub order_id: String,
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<EmailItem>,
    pub total: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_status_serializes_as_flat_string() {
        let statuses = vec![
            ChannelStatus::Ok,
            ChannelStatus::Skipped,
            ChannelStatus::Failed("timeout".to_owned()),
        ];
        let json = serde_json::to_value(&statuses).unwrap();
        assert_eq!(json, serde_json::json!(["ok", "skipped", "failed(timeout)"]));
    }

    #[test]
    fn send_email_request_reads_type_tag() {
        let req: SendEmailRequest = serde_json::from_str(
            r#"{"type":"status_update","to":"a@b.in","name":"Asha","orderId":"ORD-1","status":"shipped"}"#,
        )
        .unwrap();
        assert_eq!(req.kind, EmailKind::StatusUpdate);
        assert_eq!(req.order_id, "ORD-1");
        assert!(req.items.is_empty());
    }
}
