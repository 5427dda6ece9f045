use axum::{Router, routing::post};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new().route("/send-email", post(handlers::send_email))
}
