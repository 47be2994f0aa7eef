use crate::auth::AuthUser;
use crate::entities::{collection, product};
use crate::services::collections::{CreateCollectionInput, UpdateCollectionInput};
use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCollectionRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::handlers::common::deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub position: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionView {
    #[serde(flatten)]
    pub collection: collection::Model,
    pub products: Vec<product::Model>,
}

/// Storefront: list collections
#[utoipa::path(
    get,
    path = "/api/v1/collections",
    responses((status = 200, description = "Collections", body = Vec<collection::Model>)),
    tag = "Catalog"
)]
pub async fn list_public_collections(
    State(state): State<AppState>,
) -> Result<Json<Vec<collection::Model>>, ServiceError> {
    Ok(Json(state.services.collections.list().await?))
}

/// Storefront: collection by slug with its active products
#[utoipa::path(
    get,
    path = "/api/v1/collections/{slug}",
    params(("slug" = String, Path, description = "Collection slug")),
    responses(
        (status = 200, description = "Collection", body = CollectionView),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn get_public_collection(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CollectionView>, ServiceError> {
    let collection = state.services.collections.get_by_slug(&slug).await?;
    let products = state
        .services
        .products
        .list_by_collection(collection.id)
        .await?;
    Ok(Json(CollectionView {
        collection,
        products,
    }))
}

/// Admin: create a collection
#[utoipa::path(
    post,
    path = "/api/v1/admin/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Created", body = collection::Model),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<collection::Model>), ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;
    let created = state
        .services
        .collections
        .create(CreateCollectionInput {
            title: request.title,
            description: request.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Admin: update a collection
#[utoipa::path(
    patch,
    path = "/api/v1/admin/collections/{id}",
    request_body = UpdateCollectionRequest,
    params(("id" = Uuid, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Updated", body = collection::Model),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
    Json(request): Json<UpdateCollectionRequest>,
) -> Result<Json<collection::Model>, ServiceError> {
    auth_user.require_admin()?;
    request.validate()?;
    let updated = state
        .services
        .collections
        .update(
            id,
            UpdateCollectionInput {
                title: request.title,
                description: request.description,
                position: request.position,
            },
        )
        .await?;
    Ok(Json(updated))
}

/// Admin: delete a collection
#[utoipa::path(
    delete,
    path = "/api/v1/admin/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth_user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_admin()?;
    state.services.collections.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn public_collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public_collections))
        .route("/:slug", get(get_public_collection))
}

pub fn admin_collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_collection))
        .route("/:id", patch(update_collection))
        .route("/:id", delete(delete_collection))
}
