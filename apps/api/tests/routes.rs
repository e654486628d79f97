use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use dairy_api::{build_router, AppState};
use dairy_core::{NewProduct, Product};
use dairy_db::{Database, DbConfig};

const TENANT: &str = "tenant-a";
const ADMIN: &str = "admin-1";

async fn setup() -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let app = build_router(AppState::new(db.clone()));
    (app, db)
}

async fn seed_product(db: &Database, sku: &str, price_cents: i64, quantity: i64) -> Product {
    let input = NewProduct {
        name: format!("{sku} milk"),
        sku: sku.to_string(),
        price_cents,
        cost_price_cents: price_cents / 2,
        initial_quantity: quantity,
        product_type: "Dairy".to_string(),
        unit: "L".to_string(),
    };
    db.catalog().create_product(TENANT, &input, None).await.unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Tenant-Id", TENANT)
        .header("X-User-Id", ADMIN);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn checkout(product_id: &str, quantity: i64) -> Value {
    json!({
        "clientName": "Asha Patel",
        "clientEmail": "asha@example.com",
        "items": [{ "productId": product_id, "quantity": quantity }],
        "shippingAddress": {
            "name": "Asha Patel",
            "line1": "12 Dairy Road",
            "city": "Anand",
            "postalCode": "388001"
        }
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _db) = setup().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_tenant_header_is_rejected() {
    let (app, _db) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders/price")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "items": [] }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn price_applies_overrides_and_discounts() {
    let (app, db) = setup().await;
    let milk = seed_product(&db, "MILK-1L", 4550, 20).await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders/price",
        Some(json!({
            "items": [{ "productId": milk.id, "quantity": 2, "discountCents": 100 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 2);
    assert_eq!(body["subtotalCents"], 9000);
    assert_eq!(body["discountTotalCents"], 100);
    assert_eq!(body["totalCents"], 9000);
}

#[tokio::test]
async fn price_unknown_product_is_404() {
    let (app, _db) = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders/price",
        Some(json!({ "items": [{ "productId": "nope", "quantity": 1 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
}

#[tokio::test]
async fn checkout_then_cancel_restores_stock() {
    let (app, db) = setup().await;
    let milk = seed_product(&db, "MILK-1L", 4550, 10).await;

    let (status, created) = send(&app, "POST", "/orders", Some(checkout(&milk.id, 3))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["orderNumber"], "O0001");
    assert_eq!(created["invoiceNumber"], "INV0001");
    assert_eq!(created["totalCents"], 13650);

    let order_id = created["orderId"].as_str().unwrap().to_string();
    let after_order = db.catalog().get_product(TENANT, &milk.id).await.unwrap();
    assert_eq!(after_order.quantity, 7);

    let (status, result) = send(
        &app,
        "PUT",
        &format!("/orders/{order_id}/status"),
        Some(json!({ "status": "Cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["changed"], true);

    let restored = db.catalog().get_product(TENANT, &milk.id).await.unwrap();
    assert_eq!(restored.quantity, 10);

    let (status, page) = send(
        &app,
        "GET",
        &format!("/admin/inventory/transactions?productId={}", milk.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
}

#[tokio::test]
async fn checkout_beyond_stock_is_rejected() {
    let (app, db) = setup().await;
    let milk = seed_product(&db, "MILK-1L", 4550, 2).await;

    let (status, body) = send(&app, "POST", "/orders", Some(checkout(&milk.id, 5))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    let untouched = db.catalog().get_product(TENANT, &milk.id).await.unwrap();
    assert_eq!(untouched.quantity, 2);
}

#[tokio::test]
async fn unknown_order_maps_to_404() {
    let (app, _db) = setup().await;

    let (status, body) = send(&app, "GET", "/orders/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ORDER_NOT_FOUND");

    let (status, body) = send(&app, "DELETE", "/orders/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn payment_is_listed_with_the_order_invoices() {
    let (app, db) = setup().await;
    let milk = seed_product(&db, "MILK-1L", 5000, 10).await;

    let (_, created) = send(&app, "POST", "/orders", Some(checkout(&milk.id, 2))).await;
    let order_id = created["orderId"].as_str().unwrap().to_string();

    let (status, payment) = send(
        &app,
        "POST",
        "/admin/invoices",
        Some(json!({ "orderId": order_id, "amountCents": 4000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["invoiceNumber"], "INV0002");

    let (status, overpay) = send(
        &app,
        "POST",
        "/admin/invoices",
        Some(json!({ "orderId": order_id, "amountCents": 7000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(overpay["code"], "AMOUNT_EXCEEDS_BALANCE");

    let (status, invoices) = send(&app, "GET", &format!("/orders/{order_id}/invoices"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoices.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn address_book_keeps_one_default() {
    let (app, db) = setup().await;
    let milk = seed_product(&db, "MILK-1L", 4550, 10).await;
    let (_, created) = send(&app, "POST", "/orders", Some(checkout(&milk.id, 1))).await;
    let client_id = created["clientId"].as_str().unwrap().to_string();

    let (status, office) = send(
        &app,
        "POST",
        &format!("/clients/{client_id}/addresses"),
        Some(json!({
            "label": "Office",
            "name": "Asha Patel",
            "line1": "4 Market Street",
            "city": "Anand",
            "isDefault": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(office["isDefault"], true);

    let (status, listed) = send(&app, "GET", &format!("/clients/{client_id}/addresses"), None).await;
    assert_eq!(status, StatusCode::OK);
    let defaults = listed
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["isDefault"] == true)
        .count();
    assert_eq!(defaults, 1);
}

#[tokio::test]
async fn mutations_require_an_acting_user() {
    let (app, _db) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/orders/any")
                .header("X-Tenant-Id", TENANT)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn manual_adjustment_is_recorded_for_the_acting_user() {
    let (app, db) = setup().await;
    let paneer = seed_product(&db, "PANEER-200", 9000, 4).await;

    let (status, entry) = send(
        &app,
        "POST",
        "/admin/inventory/adjust",
        Some(json!({
            "productId": paneer.id,
            "quantityDelta": 6,
            "reason": "Manual",
            "note": "morning delivery"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["quantityDelta"], 6);
    assert_eq!(entry["reason"], "Manual");
    assert_eq!(entry["referenceType"], "Manual");
    assert_eq!(entry["createdBy"], ADMIN);

    let (status, body) = send(
        &app,
        "POST",
        "/admin/inventory/adjust",
        Some(json!({
            "productId": paneer.id,
            "quantityDelta": -50,
            "reason": "OrderPlaced"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let stocked = db.catalog().get_product(TENANT, &paneer.id).await.unwrap();
    assert_eq!(stocked.quantity, 10);
}

#[tokio::test]
async fn malformed_input_uses_the_error_envelope() {
    let (app, _db) = setup().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/orders/any/status",
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_BODY");

    let (status, body) = send(
        &app,
        "POST",
        "/orders/price",
        Some(json!({ "items": [{ "productId": "p", "quantity": "two" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_BODY");

    let (status, body) = send(&app, "GET", "/admin/inventory/transactions?page=first", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_QUERY");
}
