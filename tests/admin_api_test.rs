mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use storefront_api::services::orders::{CreateOrderInput, NewOrderItem};

#[tokio::test]
async fn product_crud_and_duplication() {
    let app = TestApp::new().await;

    // Create with a comma-decimal price; stored as cents.
    let (status, product) = app
        .request(
            Method::POST,
            "/api/v1/admin/products",
            Some(json!({"title": "Linen Shirt", "price": "19,95"})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "body: {product}");
    assert_eq!(product["price_cents"], 1995);
    assert_eq!(product["slug"], "linen-shirt");
    let product_id = product["id"].as_str().unwrap().to_string();

    // Storefront sees the active product by slug.
    let (status, fetched) = app
        .request(Method::GET, "/api/v1/products/linen-shirt", None, false)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Linen Shirt");

    // Duplicates claim fresh slugs inside the copy transaction.
    let dup_uri = format!("/api/v1/admin/products/{}/duplicate", product_id);
    let (status, first_copy) = app.request(Method::POST, &dup_uri, None, true).await;
    assert_eq!(status, StatusCode::CREATED, "body: {first_copy}");
    let (status, second_copy) = app.request(Method::POST, &dup_uri, None, true).await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(first_copy["active"], false);
    assert_ne!(first_copy["slug"], second_copy["slug"]);
    assert!(first_copy["slug"].as_str().unwrap().starts_with("linen-shirt"));
    assert!(second_copy["slug"].as_str().unwrap().starts_with("linen-shirt"));

    // Drafts are hidden from the storefront but visible to admins.
    let (_, public) = app.request(Method::GET, "/api/v1/products", None, false).await;
    assert_eq!(public.as_array().unwrap().len(), 1);
    let (_, admin) = app
        .request(Method::GET, "/api/v1/admin/products", None, true)
        .await;
    assert_eq!(admin.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn admin_routes_require_authentication() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(Method::GET, "/api/v1/admin/products", None, false)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request(Method::GET, "/api/v1/orders", None, false).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/v1/settings", None, false)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_usable_tokens() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": "admin@example.com", "password": "test-password"})),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "admin@example.com");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": "admin@example.com", "password": "wrong"})),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn settings_withhold_secret_values() {
    let app = TestApp::new().await;

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/v1/settings",
            Some(json!({"settings": {
                "store_name": "Test Store",
                "stripe_secret_key": "sk_live_very_secret",
            }})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.request(Method::GET, "/api/v1/settings", None, true).await;
    assert_eq!(status, StatusCode::OK);
    let settings = body.as_array().unwrap();

    let store_name = settings
        .iter()
        .find(|s| s["key"] == "store_name")
        .expect("store_name");
    assert_eq!(store_name["value"], "Test Store");
    assert_eq!(store_name["secret"], false);

    let stripe_key = settings
        .iter()
        .find(|s| s["key"] == "stripe_secret_key")
        .expect("stripe key");
    assert_eq!(stripe_key["secret"], true);
    assert!(stripe_key.get("value").is_none() || stripe_key["value"].is_null());

    // The decrypted value round-trips through the service layer.
    let value = app
        .state
        .services
        .settings
        .get_value("stripe_secret_key")
        .await
        .expect("get")
        .expect("present");
    assert_eq!(value, "sk_live_very_secret");
}

#[tokio::test]
async fn discount_admin_crud() {
    let app = TestApp::new().await;

    let (status, created) = app
        .request(
            Method::POST,
            "/api/v1/discounts",
            Some(json!({"code": "welcome", "discount_type": "fixed", "amount": "10.00"})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "body: {created}");
    assert_eq!(created["code"], "WELCOME");
    assert_eq!(created["amount_cents"], 1000);
    let id = created["id"].as_str().unwrap().to_string();

    // Duplicate codes conflict.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/discounts",
            Some(json!({"code": "WELCOME", "discount_type": "fixed", "amount": "5.00"})),
            true,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Deactivate, then delete.
    let uri = format!("/api/v1/discounts/{}", id);
    let (status, updated) = app
        .request(Method::PATCH, &uri, Some(json!({"active": false})), true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["active"], false);

    let (status, _) = app.request(Method::DELETE, &uri, None, true).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.request(Method::DELETE, &uri, None, true).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sendcloud_webhook_advances_delivered_orders() {
    let app = TestApp::new().await;

    let order = app
        .state
        .services
        .orders
        .create_order(CreateOrderInput {
            email: "shopper@example.com".to_string(),
            customer_name: None,
            shipping_address: None,
            items: vec![NewOrderItem {
                product_id: None,
                title: "Test item".to_string(),
                sku: None,
                quantity: 1,
                unit_cents: 5_000,
            }],
            shipping_cents: 0,
            shipping_option: None,
            discount: None,
            preferred_payment_method: Some("paypal".to_string()),
            currency: "EUR".to_string(),
        })
        .await
        .expect("order");
    app.state
        .services
        .orders
        .update_status(order.id, storefront_api::entities::order::OrderStatus::Paid)
        .await
        .expect("paid");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/webhooks/sendcloud",
            Some(json!({
                "action": "parcel_status_changed",
                "parcel": {
                    "id": 42,
                    "tracking_number": "SC123456789NL",
                    "order_number": order.order_number,
                    "status": {"id": 11, "message": "Delivered"}
                }
            })),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let updated = app.state.services.orders.get(order.id).await.unwrap();
    assert_eq!(
        updated.status,
        storefront_api::entities::order::OrderStatus::Fulfilled
    );
    assert_eq!(updated.tracking_number.as_deref(), Some("SC123456789NL"));

    // Unknown parcels are acknowledged without state changes.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/webhooks/sendcloud",
            Some(json!({
                "action": "parcel_status_changed",
                "parcel": {
                    "id": 43,
                    "tracking_number": "SC000000000NL",
                    "order_number": "ORD-MISSING",
                    "status": {"id": 11, "message": "Delivered"}
                }
            })),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn order_list_pagination_and_filtering() {
    let app = TestApp::new().await;

    for i in 0..3 {
        app.state
            .services
            .orders
            .create_order(CreateOrderInput {
                email: format!("shopper{}@example.com", i),
                customer_name: None,
                shipping_address: None,
                items: vec![NewOrderItem {
                    product_id: None,
                    title: "Test item".to_string(),
                    sku: None,
                    quantity: 1,
                    unit_cents: 1_000,
                }],
                shipping_cents: 0,
                shipping_option: None,
                discount: None,
                preferred_payment_method: Some("stripe".to_string()),
                currency: "EUR".to_string(),
            })
            .await
            .expect("order");
    }

    let (status, body) = app
        .request(Method::GET, "/api/v1/orders?page=1&per_page=2", None, true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_pages"], 2);

    let (status, body) = app
        .request(
            Method::GET,
            "/api/v1/orders?status=pending_payment&email=shopper1@example.com",
            None,
            true,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["email"], "shopper1@example.com");
}
