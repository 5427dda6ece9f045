use std::sync::Arc;

use axum::extract::{Json, State};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::Value;
use tracing::info;

use super::models::{EcomCreated, EcomLead, EcomOrder, FanOut, NewEcomLead, NewEcomOrder};
use crate::{
    auth::AdminClaims,
    config::Config,
    notification::{Notifier, templates},
    order::checkout::generate_order_id,
    schema::{ecom_leads, ecom_orders},
    utils::{AppJson, types::{JsonResult, Pool}},
};

async fn fan_out(
    http: &reqwest::Client,
    config: &Config,
    heading: &str,
    fields: &[(&str, Option<&str>)],
) -> FanOut {
    let notifier = Notifier::new(http, config);
    let html = templates::sales_alert(heading, fields);
    let text = templates::text_alert(heading, fields);

    let (email, whatsapp) = tokio::join!(
        notifier.email_sales(heading, html),
        notifier.whatsapp_sales(&text),
    );

    FanOut { email, whatsapp }
}

pub async fn create_ecom_lead(
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppJson(raw): AppJson<Value>,
) -> JsonResult<EcomCreated> {
    let new_lead = NewEcomLead::from_raw(raw)?;

    let mut conn = pool.get().await?;
    let lead = diesel::insert_into(ecom_leads::table)
        .values(&new_lead)
        .returning(EcomLead::as_returning())
        .get_result(&mut conn)
        .await?;
    drop(conn);

    info!(id = lead.id, utm_source = ?lead.utm_source, "ecom lead captured");

    let fields = [
        ("Name", Some(lead.name.as_str())),
        ("Phone", Some(lead.phone.as_str())),
        ("Email", lead.email.as_deref()),
        ("Product", lead.product.as_deref()),
        ("Vehicle", lead.vehicle_number.as_deref()),
        ("Notes", lead.notes.as_deref()),
        ("Source", lead.utm_source.as_deref()),
        ("Campaign", lead.utm_campaign.as_deref()),
        ("Page", lead.page_url.as_deref()),
    ];
    let notification = fan_out(&http, &config, "New ecom lead", &fields).await;

    Ok(Json(EcomCreated {
        success: true,
        id: lead.id,
        order_ref: None,
        notification,
    }))
}

pub async fn create_ecom_order(
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppJson(raw): AppJson<Value>,
) -> JsonResult<EcomCreated> {
    let new_order = NewEcomOrder::from_raw(raw, || generate_order_id(Utc::now()))?;

    let mut conn = pool.get().await?;
    let order = diesel::insert_into(ecom_orders::table)
        .values(&new_order)
        .returning(EcomOrder::as_returning())
        .get_result(&mut conn)
        .await?;
    drop(conn);

    info!(id = order.id, order_ref = %order.order_ref, "ecom order captured");

    let quantity = order.quantity.to_string();
    let amount = order.amount.map(|a| format!("{a:.2}"));
    let fields = [
        ("Order", Some(order.order_ref.as_str())),
        ("Name", Some(order.name.as_str())),
        ("Phone", Some(order.phone.as_str())),
        ("Email", order.email.as_deref()),
        ("Product", order.product.as_deref()),
        ("Quantity", Some(quantity.as_str())),
        ("Amount", amount.as_deref()),
        ("Address", order.address.as_deref()),
        ("City", order.city.as_deref()),
        ("Pincode", order.pincode.as_deref()),
        ("Payment", order.payment_method.as_deref()),
        ("Source", order.utm_source.as_deref()),
        ("Campaign", order.utm_campaign.as_deref()),
    ];
    let notification = fan_out(&http, &config, "New ecom order", &fields).await;

    Ok(Json(EcomCreated {
        success: true,
        id: order.id,
        order_ref: Some(order.order_ref),
        notification,
    }))
}

pub async fn get_ecom_leads(
    _admin: AdminClaims,
    State(pool): State<Pool>,
) -> JsonResult<Vec<EcomLead>> {
    let mut conn = pool.get().await?;

    let all = ecom_leads::table
        .select(EcomLead::as_select())
        .order(ecom_leads::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(all))
}

pub async fn get_ecom_orders(
    _admin: AdminClaims,
    State(pool): State<Pool>,
) -> JsonResult<Vec<EcomOrder>> {
    let mut conn = pool.get().await?;

    let all = ecom_orders::table
        .select(EcomOrder::as_select())
        .order(ecom_orders::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(all))
}
