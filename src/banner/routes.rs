use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route(
        "/banners",
        get(handlers::get_banners)
            .post(handlers::create_banner)
            .put(handlers::update_banner)
            .delete(handlers::delete_banner),
    )
}
