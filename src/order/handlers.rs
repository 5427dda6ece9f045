use std::{collections::BTreeMap, sync::Arc};

use axum::extract::{Json, State};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{
    AsyncConnection, AsyncPgConnection, RunQueryDsl, scoped_futures::ScopedFutureExt,
};
use tracing::{error, info, warn};

use super::{
    checkout::{self, DocType},
    models::{
        CreateOrderRequest, CreateOrderResponse, NewOrder, NewOrderDocument, NewOrderItem,
        NotificationFlags, Order, OrderChanges, OrderDetails, OrderDocument, OrderItem,
        UpdateOrderRequest, UpdateOrderResponse,
    },
    shipping::{self, Shipment, ShippingClient},
};
use crate::{
    auth::AdminClaims,
    config::Config,
    notification::{ChannelStatus, Notifier, models::EmailItem, templates},
    schema::{order_documents, order_items, orders},
    utils::{
        AppError, AppPath, ValidatedJson,
        types::{JsonResult, Pool},
        validate::non_empty,
    },
};

/// Places an order after re-running every checkout guard. Order, items and
/// documents are written in one transaction; emails go out afterwards and
/// only their outcome is reported.
pub async fn create_order(
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> JsonResult<CreateOrderResponse> {
    let now = Utc::now();
    let fulfillment = req.fulfillment();

    checkout::check_fulfillment(&req.pincode, &fulfillment, now)?;

    let mut documents = BTreeMap::new();
    for (doc_type, url) in &req.documents {
        if url.trim().is_empty() {
            continue;
        }
        documents.insert(doc_type.parse::<DocType>()?, url.trim().to_owned());
    }
    checkout::check_documents(&documents)?;
    checkout::check_details(&req.customer(), &fulfillment)?;

    let order_ref =
        non_empty(req.order_id.clone()).unwrap_or_else(|| checkout::generate_order_id(now));
    let total = req.total();

    let (delivery_speed, pickup_location) = match &fulfillment {
        checkout::Fulfillment::Delivery { speed } => (Some(speed.as_str().to_owned()), None),
        checkout::Fulfillment::Pickup { location } => (None, Some(location.trim().to_owned())),
    };

    let new_order = NewOrder {
        order_id: order_ref,
        customer_name: req.customer_name.trim().to_owned(),
        email: req.email.trim().to_owned(),
        phone: req.phone.trim().to_owned(),
        address: non_empty(req.address.clone()),
        city: non_empty(req.city.clone()),
        state: non_empty(req.state.clone()),
        pincode: req.pincode.trim().to_owned(),
        delivery_mode: fulfillment.mode().to_owned(),
        delivery_speed,
        pickup_location,
        payment_method: non_empty(req.payment_method.clone()).unwrap_or_else(|| "cod".to_owned()),
        total_amount: total,
    };

    let mut conn = pool.get().await?;

    let (order, items) = conn
        .transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let order: Order = diesel::insert_into(orders::table)
                    .values(&new_order)
                    .returning(Order::as_returning())
                    .get_result(conn)
                    .await?;

                let new_items: Vec<NewOrderItem> = req
                    .items
                    .iter()
                    .map(|item| NewOrderItem {
                        order_id: order.id,
                        name: item.name.trim().to_owned(),
                        quantity: item.quantity,
                        price: item.price,
                    })
                    .collect();

                let items = diesel::insert_into(order_items::table)
                    .values(&new_items)
                    .returning(OrderItem::as_returning())
                    .get_results(conn)
                    .await?;

                let new_documents: Vec<NewOrderDocument> = documents
                    .iter()
                    .map(|(doc_type, url)| NewOrderDocument {
                        order_id: order.id,
                        doc_type: doc_type.as_str().to_owned(),
                        url: url.clone(),
                    })
                    .collect();

                if !new_documents.is_empty() {
                    diesel::insert_into(order_documents::table)
                        .values(&new_documents)
                        .execute(conn)
                        .await?;
                }

                Ok((order, items))
            }
            .scope_boxed()
        })
        .await?;

    info!(order_id = %order.order_id, id = order.id, total = order.total_amount, "order placed");

    let notifier = Notifier::new(&http, &config);
    let (sales, customer) = tokio::join!(
        notify_sales(notifier, &order),
        notify_customer(notifier, &order, &items),
    );

    Ok(Json(CreateOrderResponse {
        success: true,
        id: order.id,
        order_id: order.order_id,
        notification: NotificationFlags { sales, customer },
    }))
}

async fn notify_sales(notifier: Notifier<'_>, order: &Order) -> ChannelStatus {
    let total = format!("{:.2}", order.total_amount);
    let fields = [
        ("Order", Some(order.order_id.as_str())),
        ("Name", Some(order.customer_name.as_str())),
        ("Phone", Some(order.phone.as_str())),
        ("Email", Some(order.email.as_str())),
        ("Pincode", Some(order.pincode.as_str())),
        ("Mode", Some(order.delivery_mode.as_str())),
        ("Pickup", order.pickup_location.as_deref()),
        ("Address", order.address.as_deref()),
        ("City", order.city.as_deref()),
        ("Payment", Some(order.payment_method.as_str())),
        ("Total", Some(total.as_str())),
    ];

    notifier
        .email_sales(
            &format!("New order {}", order.order_id),
            templates::sales_alert("New order", &fields),
        )
        .await
}

async fn notify_customer(
    notifier: Notifier<'_>,
    order: &Order,
    items: &[OrderItem],
) -> ChannelStatus {
    let items: Vec<EmailItem> = items
        .iter()
        .map(|i| EmailItem {
            name: i.name.clone(),
            quantity: i.quantity,
            price: i.price,
        })
        .collect();

    let (subject, html) = templates::order_confirmation(
        &order.customer_name,
        &order.order_id,
        &items,
        Some(order.total_amount),
    );

    notifier
        .email_customer(&order.email, Some(&order.customer_name), &subject, html)
        .await
}

pub async fn get_orders(
    _admin: AdminClaims,
    State(pool): State<Pool>,
) -> JsonResult<Vec<OrderDetails>> {
    let mut conn = pool.get().await?;

    let all = orders::table
        .select(Order::as_select())
        .order(orders::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(with_children(&mut conn, all).await?))
}

/// Accepts the numeric row id or the external `ORD-...` reference.
pub async fn get_order(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(key): AppPath<String>,
) -> JsonResult<OrderDetails> {
    let mut conn = pool.get().await?;

    let order = find_order(&mut conn, &key).await?;
    let mut details = with_children(&mut conn, vec![order]).await?;

    details
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Order {key} not found")))
}

/// Updates status and shipping provider. Switching the provider to the
/// configured shipping partner books a shipment once per order.
pub async fn update_order(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppPath(key): AppPath<String>,
    ValidatedJson(req): ValidatedJson<UpdateOrderRequest>,
) -> JsonResult<UpdateOrderResponse> {
    let status = non_empty(req.status);
    let provider = non_empty(req.shipping_provider);

    if status.is_none() && provider.is_none() {
        return Err(AppError::Validation(
            "status or shippingProvider is required".to_owned(),
        ));
    }

    let mut conn = pool.get().await?;
    let existing = find_order(&mut conn, &key).await?;

    let mut order: Order = diesel::update(orders::table.find(existing.id))
        .set(&OrderChanges {
            status: status.clone(),
            shipping_provider: provider.clone(),
            updated_at: Some(Utc::now()),
            ..Default::default()
        })
        .returning(Order::as_returning())
        .get_result(&mut conn)
        .await?;

    info!(order_id = %order.order_id, status = ?status, provider = ?provider, "order updated");

    let partner = config
        .shipping
        .as_ref()
        .filter(|cfg| provider.as_deref().is_some_and(|p| shipping::is_partner(cfg, p)));

    let shipment = match partner {
        Some(_) if order.shipment_id.is_some() => ChannelStatus::Skipped,
        Some(cfg) => {
            let items = OrderItem::belonging_to(&order)
                .select(OrderItem::as_select())
                .load(&mut conn)
                .await?;

            match ShippingClient::new(&http, cfg).book(&order, &items).await {
                Ok(booked) => {
                    let saved = diesel::update(orders::table.find(order.id))
                        .set(&shipment_changes(&booked))
                        .returning(Order::as_returning())
                        .get_result(&mut conn)
                        .await;

                    match saved {
                        Ok(updated) => {
                            order = updated;
                            ChannelStatus::Ok
                        }
                        Err(e) => {
                            error!(
                                order_id = %order.order_id,
                                shipment_id = %booked.shipment_id,
                                awb = ?booked.awb_number,
                                error = %e,
                                "booked shipment could not be saved"
                            );
                            unsaved_shipment(&booked, &e)
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, order_id = %order.order_id, "shipment booking failed");
                    ChannelStatus::Failed(e.to_string())
                }
            }
        }
        None => ChannelStatus::Skipped,
    };

    let mut details = with_children(&mut conn, vec![order]).await?;
    let order = details
        .pop()
        .ok_or_else(|| AppError::Internal("updated order vanished".to_owned()))?;

    Ok(Json(UpdateOrderResponse {
        success: true,
        order,
        shipment,
    }))
}

fn shipment_changes(booked: &Shipment) -> OrderChanges {
    OrderChanges {
        shipment_id: Some(booked.shipment_id.clone()),
        awb_number: booked.awb_number.clone(),
        courier_name: booked.courier_name.clone(),
        tracking_url: booked.tracking_url.clone(),
        shipment_status: Some(booked.status.clone()),
        updated_at: Some(Utc::now()),
        ..Default::default()
    }
}

/// The partner already holds the shipment; its id goes back to the admin so
/// it can be recorded by hand instead of booking again.
fn unsaved_shipment(booked: &Shipment, e: &diesel::result::Error) -> ChannelStatus {
    let awb = booked.awb_number.as_deref().unwrap_or("none");
    ChannelStatus::Failed(format!(
        "shipment {} (awb {awb}) booked but not saved: {e}",
        booked.shipment_id
    ))
}

/// Items and documents go with the order through `ON DELETE CASCADE`.
pub async fn delete_order(
    _admin: AdminClaims,
    State(pool): State<Pool>,
    AppPath(key): AppPath<String>,
) -> JsonResult<Order> {
    let mut conn = pool.get().await?;

    let existing = find_order(&mut conn, &key).await?;

    let order = diesel::delete(orders::table.find(existing.id))
        .returning(Order::as_returning())
        .get_result(&mut conn)
        .await?;

    info!(order_id = %order.order_id, "order deleted");

    Ok(Json(order))
}

async fn find_order(conn: &mut AsyncPgConnection, key: &str) -> Result<Order, AppError> {
    let mut query = orders::table
        .select(Order::as_select())
        .filter(orders::order_id.eq(key.to_owned()))
        .into_boxed();

    if let Ok(id) = key.parse::<i32>() {
        query = query.or_filter(orders::id.eq(id));
    }

    query
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Order {key} not found")))
}

async fn with_children(
    conn: &mut AsyncPgConnection,
    all: Vec<Order>,
) -> Result<Vec<OrderDetails>, AppError> {
    let items = OrderItem::belonging_to(&all)
        .select(OrderItem::as_select())
        .order(order_items::id.asc())
        .load(conn)
        .await?
        .grouped_by(&all);

    let documents = OrderDocument::belonging_to(&all)
        .select(OrderDocument::as_select())
        .order(order_documents::id.asc())
        .load(conn)
        .await?
        .grouped_by(&all);

    Ok(all
        .into_iter()
        .zip(items)
        .zip(documents)
        .map(|((order, items), documents)| OrderDetails {
            order,
            items,
            documents,
        })
        .collect())
}
