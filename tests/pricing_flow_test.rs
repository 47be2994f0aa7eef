mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use storefront_api::entities::{discount_code::DiscountType, shipping_option::ShippingType};
use storefront_api::services::discounts::CreateDiscountInput;
use storefront_api::services::shipping_options::CreateShippingOptionInput;

async fn seed_standard_shipping(app: &TestApp) -> uuid::Uuid {
    app.state
        .services
        .shipping_options
        .create(CreateShippingOptionInput {
            carrier: "postnl".to_string(),
            shipping_type: ShippingType::Shipping,
            title: "Standard".to_string(),
            description: None,
            price: "4.90".to_string(),
            min_order_total: None,
            max_order_total: None,
        })
        .await
        .expect("shipping option")
        .id
}

async fn seed_save10(app: &TestApp) {
    app.state
        .services
        .discounts
        .create(CreateDiscountInput {
            code: "save10".to_string(),
            discount_type: DiscountType::Percent,
            amount_cents: None,
            percent_off: Some(10),
            active: true,
        })
        .await
        .expect("discount");
}

#[tokio::test]
async fn shipping_resolution_falls_back_to_default() {
    let app = TestApp::new().await;

    let resolved = app
        .state
        .services
        .pricing
        .resolve_shipping(None, 5000, app.state.config.default_shipping_cents)
        .await
        .expect("resolve");
    assert!(resolved.option.is_none());
    assert_eq!(resolved.shipping_cents, 490);
}

#[tokio::test]
async fn shipping_resolution_honors_bounds() {
    let app = TestApp::new().await;
    let option = app
        .state
        .services
        .shipping_options
        .create(CreateShippingOptionInput {
            carrier: "dhl".to_string(),
            shipping_type: ShippingType::Shipping,
            title: "Bounded".to_string(),
            description: None,
            price: "6,50".to_string(),
            min_order_total: Some("10.00".to_string()),
            max_order_total: Some("50.00".to_string()),
        })
        .await
        .expect("option");

    let pricing = &app.state.services.pricing;

    // Inclusive on both ends
    let ok = pricing.resolve_shipping(Some(option.id), 1000, 0).await.unwrap();
    assert_eq!(ok.shipping_cents, 650);
    let ok = pricing.resolve_shipping(Some(option.id), 5000, 0).await.unwrap();
    assert_eq!(ok.shipping_cents, 650);

    // Out of range either side
    assert!(pricing.resolve_shipping(Some(option.id), 999, 0).await.is_err());
    assert!(pricing.resolve_shipping(Some(option.id), 5001, 0).await.is_err());

    // Unknown option id
    assert!(pricing
        .resolve_shipping(Some(uuid::Uuid::new_v4()), 1000, 0)
        .await
        .is_err());
}

#[tokio::test]
async fn discount_validation_is_idempotent_over_http() {
    let app = TestApp::new().await;
    seed_save10(&app).await;

    let body = json!({"code": "save10", "subtotal_cents": 5490});
    let (status_a, first) = app
        .request(
            Method::POST,
            "/api/v1/checkout/discounts/validate",
            Some(body.clone()),
            false,
        )
        .await;
    let (status_b, second) = app
        .request(
            Method::POST,
            "/api/v1/checkout/discounts/validate",
            Some(body),
            false,
        )
        .await;

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(first["code"], "SAVE10");
    assert_eq!(first["discount_cents"], 549);
    assert_eq!(first, second);
}

#[tokio::test]
async fn unknown_discount_is_404() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/checkout/discounts/validate",
            Some(json!({"code": "NOPE", "subtotal_cents": 1000})),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("NOPE"));
}

#[tokio::test]
async fn inactive_discount_is_rejected() {
    let app = TestApp::new().await;
    let created = app
        .state
        .services
        .discounts
        .create(CreateDiscountInput {
            code: "OLD".to_string(),
            discount_type: DiscountType::Fixed,
            amount_cents: Some(500),
            percent_off: None,
            active: false,
        })
        .await
        .expect("discount");
    assert!(!created.active);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/checkout/discounts/validate",
            Some(json!({"code": "OLD", "subtotal_cents": 1000})),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_runs_the_worked_example() {
    let app = TestApp::new().await;
    let option_id = seed_standard_shipping(&app).await;
    seed_save10(&app).await;

    let product = app
        .state
        .services
        .products
        .create(storefront_api::services::products::CreateProductInput {
            title: "Linen Shirt".to_string(),
            description: None,
            price_cents: 2500,
            currency: "EUR".to_string(),
            images: None,
            collection_id: None,
            tags: None,
            active: true,
        })
        .await
        .expect("product");

    // Subtotal 2 x 2500 = 5000, shipping 4.90, SAVE10 on 5490 → 549 off.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/checkout/payment-intents",
            Some(json!({
                "email": "shopper@example.com",
                "customer_name": "Ada Lovelace",
                "items": [{"product_id": product.id, "quantity": 2}],
                "shipping_option_id": option_id,
                "discount_code": "save10",
                "payment_method": "paypal",
            })),
            false,
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    assert_eq!(body["subtotal_cents"], 5000);
    assert_eq!(body["shipping_cents"], 490);
    assert_eq!(body["discount_cents"], 549);
    assert_eq!(body["total_cents"], 4941);
    assert_eq!(body["currency"], "EUR");
    assert!(body["client_secret"].is_null());

    // The persisted order carries the same snapshot and the invariant
    // total == subtotal + shipping - discount.
    let order_number = body["order_number"].as_str().unwrap();
    let order = app
        .state
        .services
        .orders
        .get_by_order_number(order_number)
        .await
        .expect("order");
    assert_eq!(
        order.total_cents,
        order.subtotal_cents + order.shipping_cents - order.discount_cents
    );
    assert_eq!(order.discount_code.as_deref(), Some("SAVE10"));
    assert_eq!(order.shipping_title.as_deref(), Some("Standard"));
    assert_eq!(order.refunded_cents, 0);

    let items = app
        .state
        .services
        .orders
        .get_items(order.id)
        .await
        .expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].total_cents, 5000);
}

#[tokio::test]
async fn checkout_rejects_discount_that_zeroes_the_total() {
    let app = TestApp::new().await;

    let product = app
        .state
        .services
        .products
        .create(storefront_api::services::products::CreateProductInput {
            title: "Sticker".to_string(),
            description: None,
            price_cents: 100,
            currency: "EUR".to_string(),
            images: None,
            collection_id: None,
            tags: None,
            active: true,
        })
        .await
        .expect("product");

    app.state
        .services
        .discounts
        .create(CreateDiscountInput {
            code: "EVERYTHING".to_string(),
            discount_type: DiscountType::Percent,
            amount_cents: None,
            percent_off: Some(100),
            active: true,
        })
        .await
        .expect("discount");

    // 100% off clamps the discount to the full base; the aggregator then
    // refuses the zero total.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/checkout/payment-intents",
            Some(json!({
                "email": "shopper@example.com",
                "items": [{"product_id": product.id, "quantity": 1}],
                "discount_code": "EVERYTHING",
                "payment_method": "paypal",
            })),
            false,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("total"));
}
