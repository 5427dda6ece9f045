use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::get_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product_by_id)
                .put(handlers::update_product)
                .delete(handlers::remove_product),
        )
}
