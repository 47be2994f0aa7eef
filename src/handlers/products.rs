use crate::auth::AuthUser;
use crate::entities::product;
use crate::money;
use crate::services::products::{CreateProductInput, UpdateProductInput};
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
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    /// Decimal amount string or number ("19.95", 19.95)
    pub price: serde_json::Value,
    pub images: Option<serde_json::Value>,
    pub collection_id: Option<Uuid>,
    pub tags: Option<serde_json::Value>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<serde_json::Value>)]
    pub images: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub collection_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<serde_json::Value>)]
    pub tags: Option<Option<serde_json::Value>>,
    pub active: Option<bool>,
    pub position: Option<i32>,
}

/// Storefront: list active products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses((status = 200, description = "Active products", body = Vec<product::Model>)),
    tag = "Catalog"
)]
pub async fn list_public_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<product::Model>>, ServiceError> {
    Ok(Json(state.services.products.list(true).await?))
}

/// Storefront: product by slug
#[utoipa::path(
    get,
    path = "/api/v1/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product", body = product::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn get_public_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<product::Model>, ServiceError> {
    let product = state.services.products.get_by_slug(&slug).await?;
    if !product.active {
        return Err(ServiceError::NotFound(format!("Product {} not found", slug)));
    }
    Ok(Json(product))
}

/// Admin: list all products including drafts
#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    responses((status = 200, description = "Products", body = Vec<product::Model>)),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<product::Model>>, ServiceError> {
    auth_user.require_admin()?;
    Ok(Json(state.services.products.list(false).await?))
}

/// Admin: create a product
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = product::Model),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<product::Model>), ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;

    let price_cents = money::normalize_amount(&request.price)
        .ok_or_else(|| ServiceError::ValidationError("Invalid price".to_string()))?;

    let created = state
        .services
        .products
        .create(CreateProductInput {
            title: request.title,
            description: request.description,
            price_cents,
            currency: state.config.currency.clone(),
            images: request.images,
            collection_id: request.collection_id,
            tags: request.tags,
            active: request.active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Admin: update a product
#[utoipa::path(
    patch,
    path = "/api/v1/admin/products/{id}",
    request_body = UpdateProductRequest,
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Updated", body = product::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<product::Model>, ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;

    let price_cents = match request.price.as_ref() {
        Some(value) => Some(money::normalize_amount(value).ok_or_else(|| {
            ServiceError::ValidationError("Invalid price".to_string())
        })?),
        None => None,
    };

    let updated = state
        .services
        .products
        .update(
            id,
            UpdateProductInput {
                title: request.title,
                description: request.description,
                price_cents,
                images: request.images,
                collection_id: request.collection_id,
                tags: request.tags,
                active: request.active,
                position: request.position,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// Admin: delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_admin()?;
    state.services.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin: duplicate a product as an inactive draft
#[utoipa::path(
    post,
    path = "/api/v1/admin/products/{id}/duplicate",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 201, description = "Copy created", body = product::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug space exhausted", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn duplicate_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<(StatusCode, Json<product::Model>), ServiceError> {
    auth_user.require_admin()?;
    let copy = state.services.products.duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub fn public_product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public_products))
        .route("/:slug", get(get_public_product))
}

pub fn admin_product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", patch(update_product))
        .route("/:id", delete(delete_product))
        .route("/:id/duplicate", post(duplicate_product))
}
