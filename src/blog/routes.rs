use axum::{Router, routing::get};

use super::handlers;
use crate::state::AppState;

pub fn get_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/blogs",
            get(handlers::get_blogs)
                .post(handlers::create_blog)
                .put(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
        .route(
            "/blogs/{slug}",
            get(handlers::get_blog_by_slug)
                .put(handlers::update_blog_by_slug)
                .delete(handlers::delete_blog_by_slug),
        )
}
