use crate::auth::AuthUser;
use crate::entities::shipping_option::{self, ShippingType};
use crate::services::sendcloud::{Carrier, ServicePoint, ShippingMethodQuote};
use crate::services::shipping_options::{CreateShippingOptionInput, UpdateShippingOptionInput};
use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateShippingOptionRequest {
    #[validate(length(min = 1))]
    pub carrier: String,
    pub shipping_type: ShippingType,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    /// Decimal price string, comma or dot separated ("4.90", "4,90")
    #[validate(length(min = 1))]
    pub price: String,
    pub min_order_total: Option<String>,
    pub max_order_total: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateShippingOptionRequest {
    pub carrier: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<String>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub min_order_total: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub max_order_total: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReorderRequest {
    #[validate(length(min = 1))]
    pub ordered_ids: Vec<Uuid>,
}

/// List all shipping options in display order
#[utoipa::path(
    get,
    path = "/api/v1/shipping-options",
    responses((status = 200, description = "Shipping options", body = Vec<shipping_option::Model>)),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn list_options(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<shipping_option::Model>>, ServiceError> {
    auth_user.require_admin()?;
    Ok(Json(state.services.shipping_options.list().await?))
}

/// Create a shipping option
#[utoipa::path(
    post,
    path = "/api/v1/shipping-options",
    request_body = CreateShippingOptionRequest,
    responses(
        (status = 201, description = "Created", body = shipping_option::Model),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn create_option(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateShippingOptionRequest>,
) -> Result<(StatusCode, Json<shipping_option::Model>), ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;
    let created = state
        .services
        .shipping_options
        .create(CreateShippingOptionInput {
            carrier: request.carrier,
            shipping_type: request.shipping_type,
            title: request.title,
            description: request.description,
            price: request.price,
            min_order_total: request.min_order_total,
            max_order_total: request.max_order_total,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a shipping option
#[utoipa::path(
    patch,
    path = "/api/v1/shipping-options/{id}",
    request_body = UpdateShippingOptionRequest,
    params(("id" = Uuid, Path, description = "Shipping option id")),
    responses(
        (status = 200, description = "Updated", body = shipping_option::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn update_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateShippingOptionRequest>,
) -> Result<Json<shipping_option::Model>, ServiceError> {
    auth_user.require_admin()?;
    let updated = state
        .services
        .shipping_options
        .update(
            id,
            UpdateShippingOptionInput {
                carrier: request.carrier,
                title: request.title,
                description: request.description,
                price: request.price,
                min_order_total: request.min_order_total,
                max_order_total: request.max_order_total,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// Delete a shipping option
#[utoipa::path(
    delete,
    path = "/api/v1/shipping-options/{id}",
    params(("id" = Uuid, Path, description = "Shipping option id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn delete_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_admin()?;
    state.services.shipping_options.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rewrite the manual ordering of shipping options
#[utoipa::path(
    put,
    path = "/api/v1/shipping-options/reorder",
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Reordered"),
        (status = 400, description = "Incomplete ordering", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn reorder_options(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<ReorderRequest>,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;
    state
        .services
        .shipping_options
        .reorder(request.ordered_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct QuotesQuery {
    /// ISO 3166-1 alpha-2 destination country
    pub to_country: Option<String>,
}

/// Carrier shipping-method quotes (Sendcloud passthrough)
#[utoipa::path(
    get,
    path = "/api/v1/shipping/quotes",
    params(QuotesQuery),
    responses(
        (status = 200, description = "Quotes", body = Vec<ShippingMethodQuote>),
        (status = 502, description = "Carrier error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn shipping_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuotesQuery>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ShippingMethodQuote>>, ServiceError> {
    auth_user.require_admin()?;
    let quotes = state
        .services
        .sendcloud
        .shipping_methods(query.to_country.as_deref())
        .await?;
    Ok(Json(quotes))
}

/// Carrier list (Sendcloud passthrough)
#[utoipa::path(
    get,
    path = "/api/v1/shipping/carriers",
    responses(
        (status = 200, description = "Carriers", body = Vec<Carrier>),
        (status = 502, description = "Carrier error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn carriers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Carrier>>, ServiceError> {
    auth_user.require_admin()?;
    Ok(Json(state.services.sendcloud.carriers().await?))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ServicePointsQuery {
    pub country: String,
    pub postal_code: Option<String>,
}

/// Pickup points near a postal code (Sendcloud passthrough)
#[utoipa::path(
    get,
    path = "/api/v1/shipping/service-points",
    params(ServicePointsQuery),
    responses(
        (status = 200, description = "Service points", body = Vec<ServicePoint>),
        (status = 502, description = "Carrier error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping"
)]
pub async fn service_points(
    State(state): State<AppState>,
    Query(query): Query<ServicePointsQuery>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ServicePoint>>, ServiceError> {
    auth_user.require_admin()?;
    let points = state
        .services
        .sendcloud
        .service_points(&query.country, query.postal_code.as_deref())
        .await?;
    Ok(Json(points))
}

pub fn shipping_option_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_options))
        .route("/", post(create_option))
        .route("/reorder", put(reorder_options))
        .route("/:id", patch(update_option))
        .route("/:id", delete(delete_option))
}

pub fn shipping_provider_routes() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(shipping_quotes))
        .route("/carriers", get(carriers))
        .route("/service-points", get(service_points))
}
