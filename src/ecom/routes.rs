use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/ecom/leads",
            get(handlers::get_ecom_leads).post(handlers::create_ecom_lead),
        )
        .route(
            "/ecom/orders",
            get(handlers::get_ecom_orders).post(handlers::create_ecom_order),
        )
}
