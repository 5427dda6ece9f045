pub mod auth;
pub mod banner;
pub mod blog;
pub mod config;
pub mod ecom;
pub mod geo;
pub mod lead;
pub mod menu;
pub mod notification;
pub mod order;
pub mod pool;
pub mod product;
pub mod schema;
pub mod shop;
pub mod state;
pub mod upload;
pub mod utils;

use axum::{
    Json, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use config::MediaConfig;
use state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
            .allow_credentials(true),
        Err(e) => {
            warn!(error = %e, origin, "ignoring invalid CORS_ORIGIN");
            CorsLayer::new()
        }
    }
}

/// Full HTTP surface: every feature router under `/api`, plus locally stored
/// media when the local store is configured.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .merge(auth::routes::get_routes())
        .merge(product::routes::get_routes())
        .merge(shop::routes::get_routes())
        .merge(banner::routes::get_routes())
        .merge(menu::routes::get_routes())
        .merge(blog::routes::get_routes())
        .merge(order::routes::get_routes())
        .merge(lead::routes::get_routes())
        .merge(ecom::routes::get_routes())
        .merge(geo::routes::get_routes())
        .merge(upload::routes::get_routes())
        .merge(notification::routes::get_routes());

    let mut router = Router::new().nest("/api", api);

    if let MediaConfig::Local { dir, public_base } = &state.config.media {
        let mount = public_base.trim_end_matches('/');
        if mount.starts_with('/') && mount.len() > 1 {
            router = router.nest_service(mount, ServeDir::new(dir));
        }
    }

    router
        .fallback(utils::handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(state.config.cors_origin.as_deref()))
        .with_state(state)
}
