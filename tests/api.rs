mod common;

use axum::{
    Json, Router,
    body::Body,
    extract::Query,
    http::{Request, header},
    routing,
};
use serde_json::json;
use std::collections::HashMap;

use common::{admin_token, get, json, router, router_with, send, spawn, state_with};
use fastag_shop::{
    app,
    auth::AdminClaims,
    config::{Config, MediaConfig},
    geo::branches::Branch,
};

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(router(), get("/api/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_routes_are_json_404() {
    let (status, body) = send(router(), get("/api/nope")).await;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn malformed_pincode_is_rejected_without_lookup() {
    let mut config = Config::default();
    // any upstream call would fail the request differently
    config.postal_api_base = "http://127.0.0.1:1".to_owned();

    for pincode in ["041028", "64102", "abcdef"] {
        let (status, body) =
            send(router_with(config.clone()), get(&format!("/api/pincode/{pincode}"))).await;
        assert_eq!(status, 400, "{pincode}");
        assert_eq!(body["success"], false);
        assert_eq!(body["count"], 0);
        assert_eq!(body["offices"], json!([]));
    }
}

#[tokio::test]
async fn postal_lookup_failure_still_answers_with_empty_list() {
    let mut config = Config::default();
    config.postal_api_base = "http://127.0.0.1:1".to_owned();

    let (status, body) = send(router_with(config), get("/api/pincode/641028")).await;
    assert_eq!(status, 200);
    assert_eq!(body["mode"], "postal");
    assert_eq!(body["count"], 0);
}

fn branch(slug: &str, lat: f64, lng: f64) -> Branch {
    Branch {
        slug: slug.to_owned(),
        name: format!("FASTag Point {slug}"),
        address_line: "1 Main Road".to_owned(),
        locality: None,
        city: "Coimbatore".to_owned(),
        state: "Tamil Nadu".to_owned(),
        postal_code: "641028".to_owned(),
        phone: "+91 90000 00000".to_owned(),
        lat: Some(lat),
        lng: Some(lng),
        listing_url: None,
        neighborhoods: Vec::new(),
    }
}

/// Stands in for the public geocoder: every search lands near Singanallur.
async fn fake_geocoder() -> String {
    let geocoder = Router::new()
        .route(
            "/search",
            routing::get(|Query(params): Query<HashMap<String, String>>| async move {
                let hit = params.contains_key("postalcode") || params.contains_key("q");
                if hit {
                    Json(json!([{
                        "lat": "11.0000",
                        "lon": "77.0200",
                        "display_name": "Singanallur, Coimbatore, Tamil Nadu, 641005, India",
                        "name": "Singanallur",
                        "address": { "city": "Coimbatore", "state": "Tamil Nadu", "postcode": "641005" }
                    }]))
                } else {
                    Json(json!([]))
                }
            }),
        )
        .route(
            "/reverse",
            routing::get(|| async {
                Json(json!({
                    "lat": "11.0168",
                    "lon": "76.9558",
                    "display_name": "Gandhipuram, Coimbatore, Tamil Nadu, India",
                    "address": { "city": "Coimbatore", "state": "Tamil Nadu", "postcode": "641012" }
                }))
            }),
        );
    spawn(geocoder).await
}

#[tokio::test]
async fn pickup_mode_returns_branches_within_radius() {
    let base = fake_geocoder().await;

    let mut config = Config::default();
    config.geocoding.nominatim_base = base;

    let state = state_with(config).with_branches(vec![
        branch("near", 11.0150, 77.0100),
        branch("far", 13.0067, 80.2206),
    ]);

    let (status, body) = send(app(state), get("/api/pincode/641028?pickup=1&radiusKm=5")).await;

    assert_eq!(status, 200);
    assert_eq!(body["mode"], "pickup");
    assert_eq!(body["count"], 1);
    let office = &body["offices"][0];
    assert_eq!(office["slug"], "near");
    let distance = office["distanceKm"].as_f64().unwrap();
    assert!(distance > 0.0 && distance <= 5.0, "{distance}");
}

#[tokio::test]
async fn place_resolver_uses_coordinates_from_map_links() {
    let base = fake_geocoder().await;
    let mut config = Config::default();
    config.geocoding.nominatim_base = base;

    let (status, body) = send(
        router_with(config),
        json(
            "POST",
            "/api/places/resolve",
            &json!({ "query": "https://www.google.com/maps/place/FASTag+Point/@11.0168,76.9558,17z" }),
        ),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["name"], "FASTag Point");
    assert_eq!(body["city"], "Coimbatore");
    assert_eq!(body["source"], "coordinates");
}

#[tokio::test]
async fn place_resolver_rejects_empty_query() {
    let (status, body) = send(
        router(),
        json("POST", "/api/places/resolve", &json!({ "query": "  " })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn lead_validation_happens_before_persistence() {
    let cases = [
        json!({ "name": "Vikram Singh", "phone": "12345" }),
        json!({ "name": "Vikram Singh", "phone": "5123456789" }),
        json!({ "name": "", "phone": "8667460935" }),
    ];

    for lead in cases {
        let (status, body) = send(router(), json("POST", "/api/lead", &lead)).await;
        assert_eq!(status, 400, "{lead}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn malformed_requests_answer_with_json_errors() {
    let requests = [
        json(
            "POST",
            "/api/lead",
            &json!({ "name": "Vikram", "phone": 8667460935u64 }),
        ),
        Request::post("/api/lead")
            .body(Body::from(r#"{"name":"Vikram","phone":"8667460935"}"#))
            .unwrap(),
        json("POST", "/api/places/resolve", &json!({})),
        get("/api/products/abc"),
        json("POST", "/api/upload", &json!({ "file": "x" })),
    ];

    for request in requests {
        let uri = request.uri().clone();
        let (status, body) = send(router(), request).await;
        assert_eq!(status, 400, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{uri}");
    }
}

#[tokio::test]
async fn ecom_intake_validates_loose_payloads() {
    let (status, _) = send(
        router(),
        json("POST", "/api/ecom/leads", &json!({ "fullName": "Meena" })),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send(
        router(),
        json("POST", "/api/ecom/orders", &json!(["not", "an", "object"])),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn order_without_rc_front_is_rejected() {
    let order = json!({
        "name": "Asha",
        "email": "asha@example.in",
        "phone": "9876543210",
        "pincode": "641028",
        "deliveryMode": "pickup",
        "pickupLocation": "FASTag Point Peelamedu",
        "items": [{ "name": "Car FASTag", "price": 500 }],
        "documents": { "pan": "https://cdn.example/pan.jpg" }
    });

    let (status, body) = send(router(), json("POST", "/api/orders", &order)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "RC front image is required");
}

#[tokio::test]
async fn order_with_unknown_document_type_is_rejected() {
    let order = json!({
        "name": "Asha",
        "email": "asha@example.in",
        "phone": "9876543210",
        "pincode": "641028",
        "deliveryMode": "delivery",
        "address": "12 Avinashi Road",
        "city": "Coimbatore",
        "state": "Tamil Nadu",
        "items": [{ "name": "Car FASTag", "price": 500 }],
        "documents": { "rc_front": "https://cdn.example/rc.jpg", "passport": "https://cdn.example/p.jpg" }
    });

    let (status, body) = send(router(), json("POST", "/api/orders", &order)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Unknown document type passport");
}

#[tokio::test]
async fn admin_endpoints_require_a_token() {
    let cases = [
        json("POST", "/api/banners", &json!({ "title": "t", "image_url": "u" })),
        json("POST", "/api/menus", &json!({ "slug": "main", "items": [] })),
        json("POST", "/api/products", &json!({ "name": "Car FASTag" })),
        json("POST", "/api/blogs", &json!({ "title": "Hello" })),
        json("PATCH", "/api/orders/1", &json!({ "status": "shipped" })),
        get("/api/orders"),
        get("/api/lead"),
        get("/api/ecom/leads"),
        get("/api/banners?all=1"),
        get("/api/auth/me"),
    ];

    for request in cases {
        let uri = request.uri().to_string();
        let (status, body) = send(router(), request).await;
        assert_eq!(status, 401, "{uri}");
        assert_eq!(body["error"], "Authentication required");
    }
}

#[tokio::test]
async fn tokens_with_other_roles_are_forbidden() {
    let config = Config::default();
    let mut claims = AdminClaims::new("editor");
    claims.role = "editor".to_owned();
    let token = claims.encode(&config.jwt_secret).unwrap();

    let request = Request::get("/api/orders")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(router_with(config), request).await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn admin_cookie_is_accepted() {
    let config = Config::default();
    let token = admin_token(&config);

    let request = Request::get("/api/auth/me")
        .header(header::COOKIE, format!("theme=dark; admin_token={token}"))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router_with(config), request).await;
    assert_eq!(status, 200);
    assert_eq!(body["sub"], "admin");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn login_checks_username_and_password() {
    let config = Config {
        admin_password_hash: Some(bcrypt::hash("s3cret-pass", 4).unwrap()),
        ..Config::default()
    };
    let attempt = |username: &str, password: &str| {
        json(
            "POST",
            "/api/auth/login",
            &json!({ "username": username, "password": password }),
        )
    };

    let (status, body) = send(router_with(config.clone()), attempt("root", "s3cret-pass")).await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);

    let (status, _) = send(router_with(config.clone()), attempt("admin", "wrong-pass")).await;
    assert_eq!(status, 401);

    let (status, body) = send(router_with(config), attempt("admin", "s3cret-pass")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn login_without_configured_hash_is_refused() {
    let (status, _) = send(
        router(),
        json(
            "POST",
            "/api/auth/login",
            &json!({ "username": "admin", "password": "secret" }),
        ),
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn send_email_validates_recipient() {
    let (status, _) = send(
        router(),
        json(
            "POST",
            "/api/send-email",
            &json!({ "type": "order_confirmation", "to": "not-an-email", "orderId": "ORD-1" }),
        ),
    )
    .await;
    assert_eq!(status, 400);
}

const BOUNDARY: &str = "fastag-test-boundary";

fn multipart(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn local_media_config() -> (Config, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!("fastag-upload-{}", uuid::Uuid::new_v4()));
    let config = Config {
        media: MediaConfig::Local {
            dir: dir.clone(),
            public_base: "/media".to_owned(),
        },
        ..Config::default()
    };
    (config, dir)
}

#[tokio::test]
async fn order_document_upload_assigns_order_reference() {
    let (config, dir) = local_media_config();

    let (status, body) = send(
        router_with(config),
        multipart(
            "/api/order-doc-upload",
            &[("docType", "rc_front")],
            Some(("rc.jpg", "image/jpeg", &b"jpeg-bytes"[..])),
        ),
    )
    .await;

    assert_eq!(status, 200, "{body}");
    let order_id = body["orderId"].as_str().unwrap();
    assert!(order_id.starts_with("ORD-"));
    assert_eq!(body["docType"], "rc_front");
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with(&format!("/media/orders/{order_id}/rc_front/")));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn order_document_upload_rejects_unknown_types() {
    let (config, dir) = local_media_config();

    let (status, body) = send(
        router_with(config.clone()),
        multipart(
            "/api/order-doc-upload",
            &[("docType", "passport"), ("orderId", "ORD-1")],
            Some(("p.jpg", "image/jpeg", &b"jpeg-bytes"[..])),
        ),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Unknown document type passport");

    let (status, _) = send(
        router_with(config),
        multipart(
            "/api/order-doc-upload",
            &[("docType", "pan")],
            Some(("page.html", "text/html", &b"<html>"[..])),
        ),
    )
    .await;
    assert_eq!(status, 400);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn banner_upload_requires_admin() {
    let (config, _dir) = local_media_config();
    let (status, _) = send(
        router_with(config),
        multipart(
            "/api/banner-upload",
            &[],
            Some(("hero.png", "image/png", &b"png"[..])),
        ),
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn uploaded_media_is_served_from_local_store() {
    let (config, dir) = local_media_config();
    let token = admin_token(&config);

    let mut request = multipart(
        "/api/banner-upload",
        &[],
        Some(("hero.png", "image/png", &b"png-bytes"[..])),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );

    let (status, body) = send(router_with(config.clone()), request).await;
    assert_eq!(status, 200, "{body}");
    let url = body["url"].as_str().unwrap().to_owned();

    let response = tower::ServiceExt::oneshot(router_with(config), get(&url))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let _ = std::fs::remove_dir_all(dir);
}
