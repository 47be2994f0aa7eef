use crate::auth::AuthUser;
use crate::entities::{order, order_item};
use crate::handlers::common::PaginationParams;
use crate::money;
use crate::services::orders::{OrderListFilter, UpdateOrderDetails};
use crate::{errors::ServiceError, AppState, PaginatedResponse};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Resolve an order identifier that may be a UUID or an order_number string
pub async fn resolve_order(state: &AppState, id: &str) -> Result<order::Model, ServiceError> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return state.services.orders.get(uuid).await;
    }
    state.services.orders.get_by_order_number(id).await
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct OrderListQuery {
    /// Filter by order status
    pub status: Option<order::OrderStatus>,
    /// Filter by customer email
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: order::Model,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<order_item::Model>,
}

/// List orders with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(PaginationParams, OrderListQuery),
    responses(
        (status = 200, description = "Orders", body = PaginatedResponse<order::Model>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<OrderListQuery>,
    auth_user: AuthUser,
) -> Result<Json<PaginatedResponse<order::Model>>, ServiceError> {
    auth_user.require_admin()?;

    let result = state
        .services
        .orders
        .list_orders(
            pagination.page,
            pagination.per_page,
            OrderListFilter {
                status: filter.status,
                email: filter.email,
            },
        )
        .await?;

    let per_page = pagination.per_page.max(1);
    let total_pages = (result.total + per_page - 1) / per_page;
    Ok(Json(PaginatedResponse {
        items: result.orders,
        total: result.total,
        page: pagination.page,
        limit: pagination.per_page,
        total_pages,
    }))
}

/// Get a single order with its items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Order", body = OrderView),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth_user: AuthUser,
) -> Result<Json<OrderView>, ServiceError> {
    auth_user.require_admin()?;
    let order = resolve_order(&state, &id).await?;
    let items = state.services.orders.get_items(order.id).await?;
    Ok(Json(OrderView { order, items }))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub preferred_payment_method: Option<String>,
    pub tracking_number: Option<String>,
}

/// Patch editable order details
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    request_body = UpdateOrderRequest,
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Updated order", body = order::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<order::Model>, ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;
    let order = resolve_order(&state, &id).await?;
    let updated = state
        .services
        .orders
        .update_details(
            order.id,
            UpdateOrderDetails {
                customer_name: request.customer_name,
                shipping_address: request.shipping_address,
                notes: request.notes,
                preferred_payment_method: request.preferred_payment_method,
                tracking_number: request.tracking_number,
            },
        )
        .await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    pub status: order::OrderStatus,
}

/// Apply a status transition
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    request_body = UpdateOrderStatusRequest,
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Updated order", body = order::Model),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<order::Model>, ServiceError> {
    auth_user.require_admin()?;
    let order = resolve_order(&state, &id).await?;
    let updated = state
        .services
        .orders
        .update_status(order.id, request.status)
        .await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderTagsRequest {
    pub tags: Vec<String>,
}

/// Replace the order's tags
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/tags",
    request_body = UpdateOrderTagsRequest,
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Updated order", body = order::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth_user: AuthUser,
    Json(request): Json<UpdateOrderTagsRequest>,
) -> Result<Json<order::Model>, ServiceError> {
    auth_user.require_admin()?;
    let order = resolve_order(&state, &id).await?;
    let updated = state.services.orders.set_tags(order.id, request.tags).await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RefundOrderRequest {
    /// Refund amount as a decimal string or number ("10.00", "10,00", 10)
    pub amount: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefundOrderResponse {
    pub order_number: String,
    pub refunded_cents: i64,
    pub payment_status: order::PaymentStatus,
}

/// Refund an order through its payment provider
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/refund",
    request_body = RefundOrderRequest,
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Refund applied", body = RefundOrderResponse),
        (status = 400, description = "Invalid amount", body = crate::errors::ErrorResponse),
        (status = 402, description = "Provider refused the refund", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn refund_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth_user: AuthUser,
    Json(request): Json<RefundOrderRequest>,
) -> Result<Json<RefundOrderResponse>, ServiceError> {
    auth_user.require_admin()?;
    let amount_cents = money::normalize_amount(&request.amount)
        .ok_or_else(|| ServiceError::ValidationError("Invalid amount".to_string()))?;

    let order = resolve_order(&state, &id).await?;
    let updated = state.services.orders.refund(order.id, amount_cents).await?;
    Ok(Json(RefundOrderResponse {
        order_number: updated.order_number,
        refunded_cents: updated.refunded_cents,
        payment_status: updated.payment_status,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentLinkResponse {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
}

/// Issue a payment link and email it to the customer
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/payment-link",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Link issued", body = PaymentLinkResponse),
        (status = 400, description = "Order is not awaiting payment", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_payment_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth_user: AuthUser,
) -> Result<Json<PaymentLinkResponse>, ServiceError> {
    auth_user.require_admin()?;
    let order = resolve_order(&state, &id).await?;
    let link = state.services.orders.create_payment_link(order.id).await?;
    Ok(Json(PaymentLinkResponse {
        url: link.url,
        payment_intent_id: link.payment_intent_id,
    }))
}

/// Download the shipping label PDF for a shipped order
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/label",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Label PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "No label available", body = crate::errors::ErrorResponse),
        (status = 502, description = "Carrier error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn download_label(
    State(state): State<AppState>,
    Path(id): Path<String>,
    auth_user: AuthUser,
) -> Result<Response, ServiceError> {
    auth_user.require_admin()?;
    let order = resolve_order(&state, &id).await?;
    let tracking_number = order.tracking_number.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Order {} has no tracking number",
            order.order_number
        ))
    })?;

    let pdf = state
        .services
        .sendcloud
        .label_by_tracking(&tracking_number)
        .await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/pdf")],
        pdf,
    )
        .into_response())
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id", patch(update_order))
        .route("/:id/status", put(update_order_status))
        .route("/:id/tags", put(update_order_tags))
        .route("/:id/refund", post(refund_order))
        .route("/:id/payment-link", post(create_payment_link))
        .route("/:id/label", get(download_label))
}
