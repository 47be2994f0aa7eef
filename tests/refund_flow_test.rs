mod common;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use storefront_api::crypto;
use storefront_api::entities::order::PaymentStatus;
use storefront_api::errors::ServiceError;
use storefront_api::services::orders::{CreateOrderInput, NewOrderItem};
use storefront_api::services::payments::{
    PaymentIntent, PaymentProvider, ProviderRefund, RefundRequest,
};

/// Records refund calls instead of talking to a real provider.
struct StubProvider {
    refunds: AtomicU32,
}

#[async_trait]
impl PaymentProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn create_payment_intent(
        &self,
        _amount_cents: i64,
        _currency: &str,
        order_number: &str,
    ) -> Result<PaymentIntent, ServiceError> {
        Ok(PaymentIntent {
            id: format!("pi_{}", order_number),
            client_secret: Some("secret".to_string()),
        })
    }

    async fn refund(&self, request: &RefundRequest) -> Result<ProviderRefund, ServiceError> {
        assert!(request.amount_cents > 0);
        self.refunds.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderRefund {
            id: "re_stub".to_string(),
        })
    }
}

/// Installs a stub Stripe-keyed provider into the client cache so the
/// payment service resolves it by credential fingerprint.
async fn install_stub(app: &TestApp) -> Arc<StubProvider> {
    app.state
        .services
        .settings
        .put_many(vec![(
            "stripe_secret_key".to_string(),
            "sk_test_stub".to_string(),
        )])
        .await
        .expect("settings");

    let stub = Arc::new(StubProvider {
        refunds: AtomicU32::new(0),
    });
    let fingerprint = crypto::credential_fingerprint(&["stripe", "sk_test_stub"]);
    app.state
        .services
        .provider_cache
        .insert(fingerprint, stub.clone());
    stub
}

async fn seed_paid_order(app: &TestApp, total_cents: i64) -> storefront_api::entities::order::Model {
    let order = app
        .state
        .services
        .orders
        .create_order(CreateOrderInput {
            email: "shopper@example.com".to_string(),
            customer_name: Some("Ada Lovelace".to_string()),
            shipping_address: None,
            items: vec![NewOrderItem {
                product_id: None,
                title: "Test item".to_string(),
                sku: None,
                quantity: 1,
                unit_cents: total_cents,
            }],
            shipping_cents: 0,
            shipping_option: None,
            discount: None,
            preferred_payment_method: Some("stripe".to_string()),
            currency: "EUR".to_string(),
        })
        .await
        .expect("order");

    let intent_id = format!("pi_{}", order.order_number);
    app.state
        .services
        .orders
        .record_payment_intent(order.id, &intent_id)
        .await
        .expect("intent");
    // The payment webhook path marks the order paid and upserts the
    // customer; the confirmation email fails (no credentials) and is
    // swallowed.
    app.state
        .services
        .orders
        .mark_paid_by_payment_intent(&intent_id, Some("ch_test_123"))
        .await
        .expect("paid")
}

#[tokio::test]
async fn full_refund_reaches_refunded() {
    let app = TestApp::new().await;
    let stub = install_stub(&app).await;
    let order = seed_paid_order(&app, 10_000).await;

    let updated = app
        .state
        .services
        .orders
        .refund(order.id, 10_000)
        .await
        .expect("refund");

    assert_eq!(updated.refunded_cents, 10_000);
    assert_eq!(updated.payment_status, PaymentStatus::Refunded);
    assert_eq!(stub.refunds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn partial_then_final_refund() {
    let app = TestApp::new().await;
    let stub = install_stub(&app).await;
    let order = seed_paid_order(&app, 10_000).await;

    let after_partial = app
        .state
        .services
        .orders
        .refund(order.id, 2_500)
        .await
        .expect("partial refund");
    assert_eq!(after_partial.refunded_cents, 2_500);
    assert_eq!(after_partial.payment_status, PaymentStatus::PartiallyRefunded);

    // Exactly the remaining amount is accepted and closes the order out.
    let after_final = app
        .state
        .services
        .orders
        .refund(order.id, 7_500)
        .await
        .expect("final refund");
    assert_eq!(after_final.refunded_cents, 10_000);
    assert_eq!(after_final.payment_status, PaymentStatus::Refunded);
    assert_eq!(stub.refunds.load(Ordering::SeqCst), 2);

    // Nothing remains; even one cent is over.
    assert!(app.state.services.orders.refund(order.id, 1).await.is_err());
    assert_eq!(stub.refunds.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn over_refund_is_rejected_without_provider_call() {
    let app = TestApp::new().await;
    let stub = install_stub(&app).await;
    let order = seed_paid_order(&app, 10_000).await;

    let err = app
        .state
        .services
        .orders
        .refund(order.id, 10_001)
        .await
        .expect_err("over-refund must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
    // The guard fires before the provider is contacted.
    assert_eq!(stub.refunds.load(Ordering::SeqCst), 0);

    let unchanged = app.state.services.orders.get(order.id).await.unwrap();
    assert_eq!(unchanged.refunded_cents, 0);
    assert_eq!(unchanged.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = TestApp::new().await;
    let stub = install_stub(&app).await;
    let order = seed_paid_order(&app, 10_000).await;

    assert!(app.state.services.orders.refund(order.id, 0).await.is_err());
    assert!(app.state.services.orders.refund(order.id, -100).await.is_err());
    assert_eq!(stub.refunds.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refund_over_http_normalizes_decimal_amounts() {
    let app = TestApp::new().await;
    let _stub = install_stub(&app).await;
    let order = seed_paid_order(&app, 10_000).await;

    // Comma-separated decimal euros, normalized to 2500 cents.
    let uri = format!("/api/v1/orders/{}/refund", order.order_number);
    let (status, body) = app
        .request(Method::POST, &uri, Some(json!({"amount": "25,00"})), true)
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["refunded_cents"], 2500);
    assert_eq!(body["payment_status"], "partially_refunded");

    // Unparseable amounts are a 400 before any state change.
    let (status, _) = app
        .request(Method::POST, &uri, Some(json!({"amount": "lots"})), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Refunds require an authenticated admin.
    let (status, _) = app
        .request(Method::POST, &uri, Some(json!({"amount": "1.00"})), false)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unsupported_payment_method_is_rejected() {
    let app = TestApp::new().await;
    let _stub = install_stub(&app).await;

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
            preferred_payment_method: Some("ideal".to_string()),
            currency: "EUR".to_string(),
        })
        .await
        .expect("order");

    let err = app
        .state
        .services
        .orders
        .refund(order.id, 1_000)
        .await
        .expect_err("unsupported method must fail");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn status_transitions_follow_the_state_machine() {
    let app = TestApp::new().await;
    let _stub = install_stub(&app).await;
    let order = seed_paid_order(&app, 5_000).await;

    // paid → fulfilled is allowed
    let uri = format!("/api/v1/orders/{}/status", order.order_number);
    let (status, body) = app
        .request(Method::PUT, &uri, Some(json!({"status": "fulfilled"})), true)
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["status"], "fulfilled");

    // fulfilled → paid is not
    let (status, _) = app
        .request(Method::PUT, &uri, Some(json!({"status": "paid"})), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // late cancellation is not allowed either
    let (status, _) = app
        .request(Method::PUT, &uri, Some(json!({"status": "cancelled"})), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
