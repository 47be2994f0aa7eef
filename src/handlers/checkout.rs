//! Public checkout endpoints: applicable shipping options, discount
//! validation, and payment-intent creation. Input normalization →
//! shipping resolution → discount evaluation → aggregation → provider
//! call, in that order.

use crate::services::orders::{CreateOrderInput, NewOrderItem};
use crate::services::payments::ProviderKind;
use crate::{errors::ServiceError, events::Event, AppState};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ShippingOptionsQuery {
    /// Order subtotal the options must admit
    pub subtotal_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingOptionView {
    pub id: Uuid,
    pub carrier: String,
    pub shipping_type: crate::entities::shipping_option::ShippingType,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

/// Shipping options applicable to a subtotal
#[utoipa::path(
    get,
    path = "/api/v1/checkout/shipping-options",
    params(ShippingOptionsQuery),
    responses(
        (status = 200, description = "Applicable options", body = Vec<ShippingOptionView>),
        (status = 400, description = "Invalid subtotal", body = crate::errors::ErrorResponse)
    ),
    tag = "Checkout"
)]
pub async fn list_shipping_options(
    State(state): State<AppState>,
    Query(query): Query<ShippingOptionsQuery>,
) -> Result<Json<Vec<ShippingOptionView>>, ServiceError> {
    if query.subtotal_cents < 0 {
        return Err(ServiceError::ValidationError(
            "subtotal_cents must not be negative".to_string(),
        ));
    }
    let options = state
        .services
        .shipping_options
        .list_applicable(query.subtotal_cents)
        .await?;
    Ok(Json(
        options
            .into_iter()
            .map(|(option, price_cents)| ShippingOptionView {
                id: option.id,
                carrier: option.carrier,
                shipping_type: option.shipping_type,
                title: option.title,
                description: option.description,
                price_cents,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ValidateDiscountRequest {
    #[validate(length(min = 1))]
    pub code: String,
    pub subtotal_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateDiscountResponse {
    pub code: String,
    pub discount_cents: i64,
}

/// Validate a discount code against a subtotal
///
/// Read-only: calling this twice with the same inputs returns the same
/// discount both times.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/discounts/validate",
    request_body = ValidateDiscountRequest,
    responses(
        (status = 200, description = "Discount is valid", body = ValidateDiscountResponse),
        (status = 404, description = "Unknown or inactive code", body = crate::errors::ErrorResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "Checkout"
)]
pub async fn validate_discount(
    State(state): State<AppState>,
    Json(request): Json<ValidateDiscountRequest>,
) -> Result<Json<ValidateDiscountResponse>, ServiceError> {
    request.validate()?;
    if request.subtotal_cents < 0 {
        return Err(ServiceError::ValidationError(
            "subtotal_cents must not be negative".to_string(),
        ));
    }
    let (discount, discount_cents) = state
        .services
        .pricing
        .evaluate_discount(&request.code, request.subtotal_cents)
        .await?;
    Ok(Json(ValidateDiscountResponse {
        code: discount.code,
        discount_cents,
    }))
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckoutItem {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePaymentIntentRequest {
    #[validate(email)]
    pub email: String,
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<CheckoutItem>,
    pub shipping_option_id: Option<Uuid>,
    pub discount_code: Option<String>,
    /// Client payment method, e.g. "stripe" or "paypal"
    #[validate(length(min = 1))]
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePaymentIntentResponse {
    pub order_number: String,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub currency: String,
    /// Present for Stripe checkouts; confirms the intent client-side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

/// Price a cart and open a payment
///
/// Runs the full pricing pipeline, persists a pending order, and (for
/// Stripe) creates the PaymentIntent backing the client-side payment.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/payment-intents",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 201, description = "Order created", body = CreatePaymentIntentResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product, option, or code", body = crate::errors::ErrorResponse),
        (status = 402, description = "Payment provider failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Checkout"
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<(axum::http::StatusCode, Json<CreatePaymentIntentResponse>), ServiceError> {
    request.validate()?;
    let services = &state.services;

    // Server-side prices only; the client sends product references.
    let mut items = Vec::with_capacity(request.items.len());
    let mut subtotal_cents: i64 = 0;
    for item in &request.items {
        if item.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Item quantity must be at least 1".to_string(),
            ));
        }
        let product = services.products.get(item.product_id).await?;
        if !product.active {
            return Err(ServiceError::ValidationError(format!(
                "Product {} is not available",
                product.slug
            )));
        }
        subtotal_cents += product.price_cents * item.quantity as i64;
        items.push(NewOrderItem {
            product_id: Some(product.id),
            title: product.title,
            sku: None,
            quantity: item.quantity,
            unit_cents: product.price_cents,
        });
    }

    let resolved = services
        .pricing
        .resolve_shipping(
            request.shipping_option_id,
            subtotal_cents,
            state.config.default_shipping_cents,
        )
        .await?;

    let discount = match request.discount_code.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(code) => {
            let base = subtotal_cents + resolved.shipping_cents;
            let (model, cents) = services.pricing.evaluate_discount(code, base).await?;
            Some((model.code, cents))
        }
        None => None,
    };

    let order = services
        .orders
        .create_order(CreateOrderInput {
            email: request.email,
            customer_name: request.customer_name,
            shipping_address: request.shipping_address,
            items,
            shipping_cents: resolved.shipping_cents,
            shipping_option: resolved.option,
            discount,
            preferred_payment_method: Some(request.payment_method.clone()),
            currency: state.config.currency.clone(),
        })
        .await?;

    let kind = ProviderKind::from_preferred_method(Some(request.payment_method.as_str()))?;
    let client_secret = match kind {
        ProviderKind::Stripe => {
            let provider = services.payments.provider(kind).await?;
            let intent = provider
                .create_payment_intent(order.total_cents, &order.currency, &order.order_number)
                .await?;
            services
                .orders
                .record_payment_intent(order.id, &intent.id)
                .await?;
            state
                .event_sender
                .send(Event::PaymentIntentCreated {
                    order_id: order.id,
                    provider: "stripe".to_string(),
                })
                .await;
            intent.client_secret
        }
        // PayPal captures client-side; the webhookless capture id is
        // recorded later through the admin order PATCH.
        ProviderKind::PayPal => None,
    };

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreatePaymentIntentResponse {
            order_number: order.order_number,
            subtotal_cents: order.subtotal_cents,
            shipping_cents: order.shipping_cents,
            discount_cents: order.discount_cents,
            total_cents: order.total_cents,
            currency: order.currency,
            client_secret,
        }),
    ))
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/shipping-options", get(list_shipping_options))
        .route("/discounts/validate", post(validate_discount))
        .route("/payment-intents", post(create_payment_intent))
}

#[cfg(test)]
mod tests {
    use crate::services::pricing;

    // Pure pricing composition mirrors the worked example: subtotal 5000,
    // shipping 490, 10% discount on 5490 → total 4941.
    #[test]
    fn worked_example_composes() {
        let subtotal = 5000;
        let shipping = 490;
        let base = subtotal + shipping;
        let discount = (base * 10 + 50) / 100;
        assert_eq!(discount, 549);
        assert_eq!(
            pricing::aggregate_total(subtotal, shipping, discount).unwrap(),
            4941
        );
    }
}
