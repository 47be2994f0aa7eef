use crate::auth::AuthUser;
use crate::entities::discount_code::{self, DiscountType};
use crate::money;
use crate::services::discounts::{CreateDiscountInput, UpdateDiscountInput};
use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDiscountRequest {
    #[validate(length(min = 1, max = 40))]
    pub code: String,
    pub discount_type: DiscountType,
    /// Fixed discounts: decimal amount string or number ("10.00", 10)
    pub amount: Option<serde_json::Value>,
    /// Percent discounts: whole percentage in (0, 100]
    pub percent_off: Option<i32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateDiscountRequest {
    pub amount: Option<serde_json::Value>,
    pub percent_off: Option<i32>,
    pub active: Option<bool>,
}

/// List discount codes
#[utoipa::path(
    get,
    path = "/api/v1/discounts",
    responses((status = 200, description = "Discount codes", body = Vec<discount_code::Model>)),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn list_discounts(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<discount_code::Model>>, ServiceError> {
    auth_user.require_admin()?;
    Ok(Json(state.services.discounts.list().await?))
}

/// Create a discount code
#[utoipa::path(
    post,
    path = "/api/v1/discounts",
    request_body = CreateDiscountRequest,
    responses(
        (status = 201, description = "Created", body = discount_code::Model),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already exists", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn create_discount(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateDiscountRequest>,
) -> Result<(StatusCode, Json<discount_code::Model>), ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;

    let amount_cents = parse_amount(request.amount.as_ref())?;
    let created = state
        .services
        .discounts
        .create(CreateDiscountInput {
            code: request.code,
            discount_type: request.discount_type,
            amount_cents,
            percent_off: request.percent_off,
            active: request.active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a discount code
#[utoipa::path(
    patch,
    path = "/api/v1/discounts/{id}",
    request_body = UpdateDiscountRequest,
    params(("id" = Uuid, Path, description = "Discount id")),
    responses(
        (status = 200, description = "Updated", body = discount_code::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn update_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateDiscountRequest>,
) -> Result<Json<discount_code::Model>, ServiceError> {
    auth_user.require_admin()?;

    let amount_cents = parse_amount(request.amount.as_ref())?;
    let updated = state
        .services
        .discounts
        .update(
            id,
            UpdateDiscountInput {
                amount_cents,
                percent_off: request.percent_off,
                active: request.active,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// Delete a discount code
#[utoipa::path(
    delete,
    path = "/api/v1/discounts/{id}",
    params(("id" = Uuid, Path, description = "Discount id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Discounts"
)]
pub async fn delete_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_admin()?;
    state.services.discounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_amount(amount: Option<&serde_json::Value>) -> Result<Option<i64>, ServiceError> {
    match amount {
        Some(value) => money::normalize_amount(value)
            .map(Some)
            .ok_or_else(|| ServiceError::ValidationError("Invalid amount".to_string())),
        None => Ok(None),
    }
}

pub fn discount_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_discounts))
        .route("/", post(create_discount))
        .route("/:id", patch(update_discount))
        .route("/:id", delete(delete_discount))
}
