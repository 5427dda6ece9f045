//! Shiprocket-compatible shipment booking: login, ad-hoc order, AWB assignment.

use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use super::models::{Order, OrderItem};
use crate::config::ShippingConfig;

pub const TRACKING_BASE: &str = "https://shiprocket.co/tracking";

#[derive(Error, Debug)]
pub enum ShippingError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{step} answered {status}: {body}")]
    Status {
        step: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{0} missing from shipping response")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    pub shipment_id: String,
    pub status: String,
    pub awb_number: Option<String>,
    pub courier_name: Option<String>,
    pub tracking_url: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    shipment_id: Option<Value>,
    status: Option<String>,
}

#[derive(Deserialize)]
struct AwbResponse {
    response: Option<AwbEnvelope>,
}

#[derive(Deserialize)]
struct AwbEnvelope {
    data: Option<AwbData>,
}

#[derive(Deserialize)]
struct AwbData {
    awb_code: Option<Value>,
    courier_name: Option<String>,
}

/// Ids arrive as numbers from some endpoints and strings from others.
fn id_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn tracking_url(awb: &str) -> String {
    format!("{TRACKING_BASE}/{awb}")
}

pub fn is_partner(config: &ShippingConfig, provider: &str) -> bool {
    config.provider.eq_ignore_ascii_case(provider.trim())
}

pub struct ShippingClient<'a> {
    http: &'a reqwest::Client,
    config: &'a ShippingConfig,
}

impl<'a> ShippingClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a ShippingConfig) -> Self {
        Self { http, config }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        step: &'static str,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<T, ShippingError> {
        let mut request = self
            .http
            .post(format!("{}{path}", self.config.base_url))
            .json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShippingError::Status { step, status, body });
        }

        Ok(response.json().await?)
    }

    async fn login(&self) -> Result<String, ShippingError> {
        let body = json!({ "email": self.config.email, "password": self.config.password });
        let login: LoginResponse = self
            .post("login", "/v1/external/auth/login", None, &body)
            .await?;
        Ok(login.token)
    }

    /// Creates the shipment and asks for an AWB. A failed AWB assignment still
    /// returns the shipment so its id is not lost.
    pub async fn book(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<Shipment, ShippingError> {
        let token = self.login().await?;

        let created: CreateOrderResponse = self
            .post(
                "create order",
                "/v1/external/orders/create/adhoc",
                Some(&token),
                &order_payload(order, items, &self.config.pickup_location),
            )
            .await?;

        let shipment_id =
            id_string(created.shipment_id).ok_or(ShippingError::Missing("shipment_id"))?;

        let mut shipment = Shipment {
            shipment_id,
            status: created.status.unwrap_or_else(|| "NEW".to_owned()),
            awb_number: None,
            courier_name: None,
            tracking_url: None,
        };

        let awb = self
            .post::<AwbResponse>(
                "assign awb",
                "/v1/external/courier/assign/awb",
                Some(&token),
                &json!({ "shipment_id": shipment.shipment_id }),
            )
            .await;

        match awb {
            Ok(awb) => {
                let data = awb.response.and_then(|r| r.data);
                if let Some(data) = data {
                    shipment.awb_number = id_string(data.awb_code);
                    shipment.courier_name = data.courier_name;
                }
                if let Some(awb) = &shipment.awb_number {
                    shipment.tracking_url = Some(tracking_url(awb));
                    shipment.status = "AWB_ASSIGNED".to_owned();
                }
            }
            Err(e) => {
                warn!(error = %e, order_id = %order.order_id, "awb assignment failed");
            }
        }

        info!(
            order_id = %order.order_id,
            shipment_id = %shipment.shipment_id,
            awb = ?shipment.awb_number,
            "shipment booked"
        );

        Ok(shipment)
    }
}

fn order_payload(order: &Order, items: &[OrderItem], pickup_location: &str) -> Value {
    let order_items: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "name": item.name,
                "sku": format!("ITEM-{}", item.id),
                "units": item.quantity,
                "selling_price": item.price,
            })
        })
        .collect();

    let prepaid = !order.payment_method.eq_ignore_ascii_case("cod");
    let billing_address = order
        .address
        .clone()
        .or_else(|| order.pickup_location.clone())
        .unwrap_or_default();

    json!({
        "order_id": order.order_id,
        "order_date": order.created_at.format("%Y-%m-%d %H:%M").to_string(),
        "pickup_location": pickup_location,
        "billing_customer_name": order.customer_name,
        "billing_last_name": "",
        "billing_address": billing_address,
        "billing_city": order.city.clone().unwrap_or_default(),
        "billing_pincode": order.pincode,
        "billing_state": order.state.clone().unwrap_or_default(),
        "billing_country": "India",
        "billing_email": order.email,
        "billing_phone": order.phone,
        "shipping_is_billing": true,
        "order_items": order_items,
        "payment_method": if prepaid { "Prepaid" } else { "COD" },
        "sub_total": order.total_amount,
        "length": 10,
        "breadth": 10,
        "height": 1,
        "weight": 0.1,
    })
}
