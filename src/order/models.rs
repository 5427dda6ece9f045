use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::checkout::{CustomerDetails, DeliverySpeed, Fulfillment};
use crate::{
    notification::ChannelStatus,
    schema::{order_documents, order_items, orders},
};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: i32,
    pub order_id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: String,
    pub delivery_mode: String,
    pub delivery_speed: Option<String>,
    pub pickup_location: Option<String>,
    pub payment_method: String,
    pub total_amount: f64,
    pub status: String,
    pub shipping_provider: Option<String>,
    pub shipment_id: Option<String>,
    pub awb_number: Option<String>,
    pub courier_name: Option<String>,
    pub tracking_url: Option<String>,
    pub shipment_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub order_id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: String,
    pub delivery_mode: String,
    pub delivery_speed: Option<String>,
    pub pickup_location: Option<String>,
    pub payment_method: String,
    pub total_amount: f64,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Serialize, Clone)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Serialize, Clone)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderDocument {
    pub id: i32,
    pub order_id: i32,
    pub doc_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = order_documents)]
pub struct NewOrderDocument {
    pub order_id: i32,
    pub doc_type: String,
    pub url: String,
}

#[derive(Serialize, Debug)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub documents: Vec<OrderDocument>,
}

#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
pub struct OrderItemPayload {
    #[validate(length(min = 1, max = 200, message = "item name is required"))]
    pub name: String,
    #[serde(default = "one")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: f64,
}

fn one() -> i32 {
    1
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Delivery,
    Pickup,
}

/// Body posted by the checkout's final step.
#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_id: Option<String>,
    #[serde(alias = "name")]
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: String,
    pub delivery_mode: DeliveryMode,
    pub delivery_speed: Option<DeliverySpeed>,
    pub pickup_location: Option<String>,
    pub payment_method: Option<String>,
    pub total_amount: Option<f64>,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<OrderItemPayload>,
    /// Uploaded KYC files keyed by document type.
    #[serde(default)]
    pub documents: BTreeMap<String, String>,
}

impl CreateOrderRequest {
    pub fn fulfillment(&self) -> Fulfillment {
        match self.delivery_mode {
            DeliveryMode::Delivery => Fulfillment::Delivery {
                speed: self.delivery_speed.unwrap_or(DeliverySpeed::Normal),
            },
            DeliveryMode::Pickup => Fulfillment::Pickup {
                location: self.pickup_location.clone().unwrap_or_default(),
            },
        }
    }

    pub fn customer(&self) -> CustomerDetails {
        CustomerDetails {
            name: self.customer_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }

    /// Client total when sent, otherwise the sum of the line items.
    pub fn total(&self) -> f64 {
        self.total_amount.unwrap_or_else(|| {
            self.items
                .iter()
                .map(|i| i.price * f64::from(i.quantity))
                .sum()
        })
    }
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, max = 30))]
    pub status: Option<String>,
    #[validate(length(max = 50))]
    pub shipping_provider: Option<String>,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = orders)]
pub struct OrderChanges {
    pub status: Option<String>,
    pub shipping_provider: Option<String>,
    pub shipment_id: Option<String>,
    pub awb_number: Option<String>,
    pub courier_name: Option<String>,
    pub tracking_url: Option<String>,
    pub shipment_status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct NotificationFlags {
    pub sales: ChannelStatus,
    pub customer: ChannelStatus,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub id: i32,
    pub order_id: String,
    pub notification: NotificationFlags,
}

#[derive(Serialize, Debug)]
pub struct UpdateOrderResponse {
    pub success: bool,
    pub order: OrderDetails,
    pub shipment: ChannelStatus,
}
