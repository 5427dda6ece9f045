use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route(
        "/menus",
        get(handlers::get_menus)
            .post(handlers::save_menu)
            .delete(handlers::delete_menu),
    )
}
