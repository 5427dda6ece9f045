use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::{
    notification::ChannelStatus,
    schema::{ecom_leads, ecom_orders},
    utils::{AppError, validate::normalize_indian_mobile},
};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name = ecom_leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EcomLead {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub product: Option<String>,
    pub vehicle_number: Option<String>,
    pub notes: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub page_url: Option<String>,
    pub raw: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = ecom_leads)]
pub struct NewEcomLead {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub product: Option<String>,
    pub vehicle_number: Option<String>,
    pub notes: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub page_url: Option<String>,
    pub raw: Value,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize)]
#[diesel(table_name = ecom_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EcomOrder {
    pub id: i32,
    pub order_ref: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub product: Option<String>,
    pub quantity: i32,
    pub amount: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub payment_method: Option<String>,
    pub status: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub page_url: Option<String>,
    pub raw: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = ecom_orders)]
pub struct NewEcomOrder {
    pub order_ref: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub product: Option<String>,
    pub quantity: i32,
    pub amount: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub payment_method: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub page_url: Option<String>,
    pub raw: Value,
}

/// Landing-page payloads vary by campaign, so fields are read by any of
/// their known spellings and the whole body is kept as `raw`.
pub struct LoosePayload<'a>(&'a Value);

impl<'a> LoosePayload<'a> {
    pub fn new(raw: &'a Value) -> Result<Self, AppError> {
        if raw.is_object() {
            Ok(Self(raw))
        } else {
            Err(AppError::Validation("expected a JSON object".to_owned()))
        }
    }

    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn name(&self) -> Result<String, AppError> {
        self.text(&["name", "fullName", "full_name", "customerName"])
            .ok_or_else(|| AppError::Validation("Name is required".to_owned()))
    }

    pub fn phone(&self) -> Result<String, AppError> {
        self.text(&["phone", "mobile", "phoneNumber", "whatsapp"])
            .as_deref()
            .and_then(normalize_indian_mobile)
            .ok_or_else(|| {
                AppError::Validation("Enter a valid 10-digit mobile number".to_owned())
            })
    }

    pub fn utm(&self) -> Utm {
        Utm {
            source: self.text(&["utm_source", "utmSource"]),
            medium: self.text(&["utm_medium", "utmMedium"]),
            campaign: self.text(&["utm_campaign", "utmCampaign"]),
            term: self.text(&["utm_term", "utmTerm"]),
            content: self.text(&["utm_content", "utmContent"]),
            page_url: self.text(&["page_url", "pageUrl", "landingPage"]),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Utm {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
    pub page_url: Option<String>,
}

impl NewEcomLead {
    pub fn from_raw(raw: Value) -> Result<Self, AppError> {
        let payload = LoosePayload::new(&raw)?;
        let utm = payload.utm();

        Ok(Self {
            name: payload.name()?,
            phone: payload.phone()?,
            email: payload.text(&["email"]),
            product: payload.text(&["product", "service", "interest"]),
            vehicle_number: payload
                .text(&["vehicleNumber", "vehicle_number", "vehicle"])
                .map(|v| v.to_uppercase()),
            notes: payload.text(&["notes", "message"]),
            utm_source: utm.source,
            utm_medium: utm.medium,
            utm_campaign: utm.campaign,
            utm_term: utm.term,
            utm_content: utm.content,
            page_url: utm.page_url,
            raw,
        })
    }
}

impl NewEcomOrder {
    /// `order_ref` is taken from the body when present, otherwise generated.
    pub fn from_raw(
        raw: Value,
        generated_ref: impl FnOnce() -> String,
    ) -> Result<Self, AppError> {
        let payload = LoosePayload::new(&raw)?;
        let utm = payload.utm();

        let quantity = payload
            .number(&["quantity", "qty"])
            .map(|q| q.round() as i32)
            .filter(|q| *q > 0)
            .unwrap_or(1);

        Ok(Self {
            order_ref: payload
                .text(&["orderRef", "order_ref", "orderId"])
                .unwrap_or_else(generated_ref),
            name: payload.name()?,
            phone: payload.phone()?,
            email: payload.text(&["email"]),
            product: payload.text(&["product", "productName"]),
            quantity,
            amount: payload.number(&["amount", "total", "price"]),
            address: payload.text(&["address"]),
            city: payload.text(&["city"]),
            state: payload.text(&["state"]),
            pincode: payload.text(&["pincode", "pin"]),
            payment_method: payload.text(&["paymentMethod", "payment_method"]),
            utm_source: utm.source,
            utm_medium: utm.medium,
            utm_campaign: utm.campaign,
            utm_term: utm.term,
            utm_content: utm.content,
            page_url: utm.page_url,
            raw,
        })
    }
}

#[derive(Serialize, Debug)]
pub struct FanOut {
    pub email: ChannelStatus,
    pub whatsapp: ChannelStatus,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EcomCreated {
    pub success: bool,
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ref: Option<String>,
    pub notification: FanOut,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lead_reads_alternate_keys_and_keeps_raw() {
        let raw = json!({
            "fullName": "Meena",
            "mobile": "+91 90030 12345",
            "utmSource": "google",
            "utm_campaign": "kyc-jan",
            "pageUrl": "https://example.in/kyc",
            "extra": true
        });
        let lead = NewEcomLead::from_raw(raw.clone()).unwrap();

        assert_eq!(lead.name, "Meena");
        assert_eq!(lead.phone, "9003012345");
        assert_eq!(lead.utm_source.as_deref(), Some("google"));
        assert_eq!(lead.utm_campaign.as_deref(), Some("kyc-jan"));
        assert_eq!(lead.page_url.as_deref(), Some("https://example.in/kyc"));
        assert_eq!(lead.raw, raw);
    }

    #[test]
    fn lead_requires_name_and_mobile() {
        assert!(NewEcomLead::from_raw(json!({ "phone": "9003012345" })).is_err());
        assert!(NewEcomLead::from_raw(json!({ "name": "Meena", "phone": "1234" })).is_err());
        assert!(NewEcomLead::from_raw(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn order_defaults_quantity_and_generates_ref() {
        let order = NewEcomOrder::from_raw(
            json!({ "name": "Meena", "phone": "9003012345", "amount": "499.00", "qty": 0 }),
            || "ECO-1".to_owned(),
        )
        .unwrap();

        assert_eq!(order.order_ref, "ECO-1");
        assert_eq!(order.quantity, 1);
        assert_eq!(order.amount, Some(499.0));

        let order = NewEcomOrder::from_raw(
            json!({ "name": "Meena", "phone": "9003012345", "orderId": "LP-77", "quantity": 2 }),
            || unreachable!(),
        )
        .unwrap();
        assert_eq!(order.order_ref, "LP-77");
        assert_eq!(order.quantity, 2);
    }
}
