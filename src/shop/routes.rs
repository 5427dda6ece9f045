use axum::{
    Router,
    routing::{get, put},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shops",
            get(handlers::get_shops)
                .post(handlers::create_shop)
                .put(handlers::update_shop)
                .delete(handlers::delete_shop),
        )
        .route(
            "/shops/{id}",
            put(handlers::update_shop_by_id).delete(handlers::delete_shop_by_id),
        )
}
