use axum::{
    Router,
    routing::{get, post},
};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/pincode/{pincode}", get(handlers::lookup_pincode))
        .route("/places/resolve", post(handlers::resolve_place))
}
