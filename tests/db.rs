//! Round trips against a real Postgres. Skipped unless `TEST_DATABASE_URL` is set.

mod common;

use axum::{
    Json, Router,
    body::Body,
    http::{Request, header},
    routing::post,
};
use serde_json::{Value, json};
use tokio::sync::OnceCell;

use common::{admin_token, get, json, send, spawn};
use fastag_shop::{
    app,
    config::{Config, ShippingConfig},
    pool::{get_pool, run_migrations},
    state::AppState,
};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn database_router() -> Option<(Router, Config)> {
    database_router_with(Config::default()).await
}

async fn database_router_with(config: Config) -> Option<(Router, Config)> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    MIGRATED
        .get_or_init(|| async {
            run_migrations(&url).await.unwrap();
        })
        .await;
    let pool = get_pool(&url).await.unwrap();
    let config = Config {
        database_url: url,
        ..config
    };
    let state = AppState::new(pool, config.clone()).unwrap();
    Some((app(state), config))
}

fn authed(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

fn labels(nodes: &Value) -> Vec<&str> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["label"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn menu_save_replaces_the_whole_tree() {
    let Some((router, config)) = database_router().await else {
        return;
    };
    let token = admin_token(&config);
    let menu = json!({
        "slug": "db-test-main",
        "name": "Main",
        "items": [
            { "label": "Home", "href": "/" },
            { "label": "Buy", "href": "/buy", "children": [
                { "label": "Car", "href": "/buy/car" }
            ]}
        ]
    });

    for _ in 0..2 {
        let (status, body) = send(
            router.clone(),
            authed(json("POST", "/api/menus", &menu), &token),
        )
        .await;
        assert_eq!(status, 200, "{body}");
    }

    let (status, body) = send(router.clone(), get("/api/menus?slug=db-test-main")).await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Main");
    assert_eq!(labels(&body["items"]), ["Home", "Buy"]);
    assert_eq!(labels(&body["items"][1]["children"]), ["Car"]);
    assert_eq!(body["items"][1]["children"][0]["active"], true);
    assert!(body["items"][0]["children"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn lead_is_persisted_even_without_side_channels() {
    let Some((router, config)) = database_router().await else {
        return;
    };

    let (status, body) = send(
        router.clone(),
        json(
            "POST",
            "/api/lead",
            &json!({ "name": "Vikram Singh", "phone": "+91 86674 60935", "product": "Buy FASTag" }),
        ),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["debug"]["ticket"], "skipped");
    let id = body["id"].as_i64().unwrap();

    let (status, leads) = send(router, authed(get("/api/lead"), &admin_token(&config))).await;
    assert_eq!(status, 200);
    let stored = leads
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["id"].as_i64() == Some(id))
        .unwrap();
    assert_eq!(stored["phone"], "8667460935");
    assert_eq!(stored["name"], "Vikram Singh");
}

async fn fake_shipping_partner() -> String {
    let partner = Router::new()
        .route(
            "/v1/external/auth/login",
            post(|| async { Json(json!({ "token": "partner-token" })) }),
        )
        .route(
            "/v1/external/orders/create/adhoc",
            post(|| async { Json(json!({ "order_id": 501, "shipment_id": 9911, "status": "NEW" })) }),
        )
        .route(
            "/v1/external/courier/assign/awb",
            post(|| async {
                Json(json!({
                    "awb_assign_status": 1,
                    "response": { "data": { "awb_code": "1422210", "courier_name": "Delhivery" } }
                }))
            }),
        );
    spawn(partner).await
}

#[tokio::test]
async fn order_is_placed_read_back_and_shipped() {
    let partner = fake_shipping_partner().await;
    let config = Config {
        shipping: Some(ShippingConfig {
            provider: "shiprocket".to_owned(),
            base_url: partner,
            email: "ops@fastag.example".to_owned(),
            password: "secret".to_owned(),
            pickup_location: "Primary".to_owned(),
        }),
        ..Config::default()
    };
    let Some((router, config)) = database_router_with(config).await else {
        return;
    };
    let token = admin_token(&config);

    let order = json!({
        "name": "Asha Raman",
        "email": "asha@example.in",
        "phone": "9876543210",
        "pincode": "641028",
        "deliveryMode": "pickup",
        "pickupLocation": "FASTag Point Peelamedu",
        "items": [
            { "name": "Car FASTag", "quantity": 2, "price": 199.5 },
            { "name": "Recharge", "price": 100 }
        ],
        "documents": { "rc_front": "https://cdn.example/rc-front.jpg", "pan": " " }
    });

    let (status, created) = send(router.clone(), json("POST", "/api/orders", &order)).await;
    assert_eq!(status, 200, "{created}");
    assert_eq!(created["success"], true);
    assert_eq!(created["notification"]["sales"], "skipped");
    let order_ref = created["orderId"].as_str().unwrap().to_owned();
    assert!(order_ref.starts_with("ORD-"), "{order_ref}");

    let (status, stored) = send(
        router.clone(),
        authed(get(&format!("/api/orders/{order_ref}")), &token),
    )
    .await;
    assert_eq!(status, 200, "{stored}");
    assert_eq!(stored["id"], created["id"]);
    assert_eq!(stored["status"], "new");
    assert_eq!(stored["delivery_mode"], "pickup");
    assert_eq!(stored["total_amount"], 499.0);
    assert_eq!(labels_of(&stored["items"], "name"), ["Car FASTag", "Recharge"]);
    assert_eq!(stored["items"][0]["quantity"], 2);
    assert_eq!(labels_of(&stored["documents"], "doc_type"), ["rc_front"]);

    let id = created["id"].as_i64().unwrap();
    let patch = json!({ "status": "processing", "shippingProvider": "Shiprocket" });
    let (status, updated) = send(
        router.clone(),
        authed(json("PATCH", &format!("/api/orders/{id}"), &patch), &token),
    )
    .await;
    assert_eq!(status, 200, "{updated}");
    assert_eq!(updated["shipment"], "ok");
    assert_eq!(updated["order"]["status"], "processing");
    assert_eq!(updated["order"]["shipment_id"], "9911");
    assert_eq!(updated["order"]["awb_number"], "1422210");
    assert_eq!(updated["order"]["courier_name"], "Delhivery");
    assert_eq!(updated["order"]["items"].as_array().unwrap().len(), 2);

    let (status, again) = send(
        router,
        authed(json("PATCH", &format!("/api/orders/{id}"), &patch), &token),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(again["shipment"], "skipped");
    assert_eq!(again["order"]["shipment_id"], "9911");
}

fn labels_of<'a>(rows: &'a Value, key: &str) -> Vec<&'a str> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row[key].as_str().unwrap())
        .collect()
}
