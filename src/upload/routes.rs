use axum::{Router, extract::DefaultBodyLimit, routing::post};

use super::{handlers, models::MAX_UPLOAD_BYTES};
use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route("/blog-upload", post(handlers::upload_blog_media))
        .route("/banner-upload", post(handlers::upload_banner_image))
        .route("/order-doc-upload", post(handlers::upload_order_document))
        .route("/upload", post(handlers::upload_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES))
}
