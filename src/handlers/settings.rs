use crate::auth::AuthUser;
use crate::services::settings::SettingView;
use crate::{errors::ServiceError, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    /// Key/value pairs to upsert; secret keys are encrypted at rest
    pub settings: BTreeMap<String, String>,
}

/// List website settings (secret values withheld)
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses((status = 200, description = "Settings", body = Vec<SettingView>)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<SettingView>>, ServiceError> {
    auth_user.require_admin()?;
    Ok(Json(state.services.settings.list().await?))
}

/// Upsert website settings
///
/// Writing any setting invalidates the cached payment-provider clients,
/// so rotated credentials take effect on the next provider call.
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 204, description = "Saved"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<StatusCode, ServiceError> {
    auth_user.require_admin()?;
    if request.settings.is_empty() {
        return Err(ServiceError::ValidationError(
            "No settings provided".to_string(),
        ));
    }
    for key in request.settings.keys() {
        if key.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Setting keys must not be empty".to_string(),
            ));
        }
    }
    state
        .services
        .settings
        .put_many(request.settings.into_iter().collect())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_settings))
        .route("/", put(update_settings))
}
