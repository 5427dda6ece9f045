//! Side channels for a captured lead. Each runs after the local insert and
//! reports its own outcome; none of them can fail the request.

use reqwest::{StatusCode, header::AUTHORIZATION};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use super::models::Lead;
use crate::{
    config::{Config, ErpConfig, TicketConfig},
    notification::{ChannelStatus, Notifier, templates},
};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream answered {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RelayReport {
    pub ticket: ChannelStatus,
    pub erp: ChannelStatus,
    pub email: ChannelStatus,
    pub whatsapp: ChannelStatus,
}

pub fn ticket_payload(lead: &Lead) -> Value {
    let product = lead.product.as_deref().unwrap_or("FASTag enquiry");
    json!({
        "subject": format!("{product} - {}", lead.name),
        "name": lead.name,
        "phone": lead.phone,
        "city": lead.city,
        "vehicleNumber": lead.vehicle_number,
        "product": lead.product,
        "notes": lead.notes,
        "source": lead.source.as_deref().unwrap_or("website"),
        "leadId": lead.id,
    })
}

pub fn erp_payload(lead: &Lead) -> Value {
    let mut notes = Vec::new();
    if let Some(product) = &lead.product {
        notes.push(format!("Product: {product}"));
    }
    if let Some(vehicle) = &lead.vehicle_number {
        notes.push(format!("Vehicle: {vehicle}"));
    }
    if let Some(text) = &lead.notes {
        notes.push(text.clone());
    }

    json!({
        "lead_name": lead.name,
        "mobile_no": lead.phone,
        "city": lead.city,
        "source": "Website",
        "notes": notes.join("\n"),
    })
}

fn alert_fields(lead: &Lead) -> [(&'static str, Option<&str>); 7] {
    [
        ("Name", Some(lead.name.as_str())),
        ("Phone", Some(lead.phone.as_str())),
        ("City", lead.city.as_deref()),
        ("Vehicle", lead.vehicle_number.as_deref()),
        ("Product", lead.product.as_deref()),
        ("Form", lead.source.as_deref()),
        ("Notes", lead.notes.as_deref()),
    ]
}

async fn check(response: reqwest::Response) -> Result<(), RelayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(RelayError::Status { status, body })
}

pub async fn forward_ticket(
    http: &reqwest::Client,
    config: &TicketConfig,
    lead: &Lead,
) -> Result<(), RelayError> {
    let response = http
        .post(&config.url)
        .header(API_KEY_HEADER, &config.api_key)
        .json(&ticket_payload(lead))
        .send()
        .await?;
    check(response).await
}

/// ERPNext style `Lead` resource.
pub async fn forward_erp(
    http: &reqwest::Client,
    config: &ErpConfig,
    lead: &Lead,
) -> Result<(), RelayError> {
    let response = http
        .post(format!("{}/api/resource/Lead", config.url.trim_end_matches('/')))
        .header(
            AUTHORIZATION,
            format!("token {}:{}", config.api_key, config.api_secret),
        )
        .json(&erp_payload(lead))
        .send()
        .await?;
    check(response).await
}

fn status_of(
    channel: &'static str,
    lead_id: i32,
    result: Option<Result<(), RelayError>>,
) -> ChannelStatus {
    match result {
        None => ChannelStatus::Skipped,
        Some(Ok(())) => ChannelStatus::Ok,
        Some(Err(e)) => {
            warn!(channel, lead_id, error = %e, "lead forward failed");
            ChannelStatus::Failed(e.to_string())
        }
    }
}

/// Runs every configured side channel concurrently.
pub async fn relay(http: &reqwest::Client, config: &Config, lead: &Lead) -> RelayReport {
    let notifier = Notifier::new(http, config);
    let fields = alert_fields(lead);
    let subject = format!("New lead: {}", lead.product.as_deref().unwrap_or(&lead.name));

    let ticket = async {
        match &config.ticket {
            Some(cfg) => Some(forward_ticket(http, cfg, lead).await),
            None => None,
        }
    };
    let erp = async {
        match &config.erp {
            Some(cfg) => Some(forward_erp(http, cfg, lead).await),
            None => None,
        }
    };
    let email = notifier.email_sales(&subject, templates::sales_alert("New lead", &fields));
    let text = templates::text_alert("New lead", &fields);
    let whatsapp = notifier.whatsapp_sales(&text);

    let (ticket, erp, email, whatsapp) = tokio::join!(ticket, erp, email, whatsapp);

    let report = RelayReport {
        ticket: status_of("ticket", lead.id, ticket),
        erp: status_of("erp", lead.id, erp),
        email,
        whatsapp,
    };

    info!(
        lead_id = lead.id,
        ticket = %report.ticket,
        erp = %report.erp,
        email = %report.email,
        whatsapp = %report.whatsapp,
        "lead relayed"
    );

    report
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn lead() -> Lead {
        Lead {
            id: 1,
            name: "Vikram Singh".to_owned(),
            phone: "8667460935".to_owned(),
            city: Some("Coimbatore".to_owned()),
            vehicle_number: Some("TN38AB1234".to_owned()),
            product: Some("Buy FASTag".to_owned()),
            notes: None,
            source: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ticket_payload_carries_contact_and_default_source() {
        let payload = ticket_payload(&lead());
        assert_eq!(payload["subject"], "Buy FASTag - Vikram Singh");
        assert_eq!(payload["phone"], "8667460935");
        assert_eq!(payload["source"], "website");
    }

    #[test]
    fn erp_notes_join_known_fields() {
        let payload = erp_payload(&lead());
        assert_eq!(payload["notes"], "Product: Buy FASTag\nVehicle: TN38AB1234");
        assert_eq!(payload["mobile_no"], "8667460935");
    }

    #[tokio::test]
    async fn nothing_configured_means_everything_skipped() {
        let report = relay(&reqwest::Client::new(), &Config::default(), &lead()).await;
        assert_eq!(
            report,
            RelayReport {
                ticket: ChannelStatus::Skipped,
                erp: ChannelStatus::Skipped,
                email: ChannelStatus::Skipped,
                whatsapp: ChannelStatus::Skipped,
            }
        );
    }
}
