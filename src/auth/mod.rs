//! Back-office authentication: argon2 password login against
//! `admin_users`, HS256 access tokens, and an `AuthUser` extractor that
//! gates admin routes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::admin_user;
use crate::errors::ServiceError;
use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, access_token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            access_token_expiration,
        }
    }
}

/// JWT claims carried by back-office access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (admin user id)
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated request identity, extracted from the Authorization
/// header on every admin endpoint.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "Admin privileges required".to_string(),
            ))
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self { config, db }
    }

    /// Verifies credentials and issues an access token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let normalized = email.trim().to_lowercase();
        let user = admin_user::Entity::find()
            .filter(admin_user::Column::Email.eq(normalized.clone()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::AuthError("Invalid credentials".to_string()))?;

        if !user.active {
            warn!(email = %normalized, "login attempt for inactive admin user");
            return Err(ServiceError::AuthError("Invalid credentials".to_string()));
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(ServiceError::AuthError("Invalid credentials".to_string()));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "admin login succeeded");
        Ok(LoginResponse {
            token,
            user: AdminIdentity {
                id: user.id,
                email: user.email,
                role: user.role,
            },
        })
    }

    pub fn issue_token(&self, user: &admin_user::Model) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::seconds(self.config.access_token_expiration.as_secs() as i64))
                .timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::AuthError(format!("Failed to issue token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized("Invalid or expired token".to_string()))
    }
}

/// Hashes a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ServiceError::InternalError(format!("Malformed password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| ServiceError::Unauthorized("Expected Bearer token".to_string()))?;

        let claims = state.services.auth.verify_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

// Login DTOs

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminIdentity {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminIdentity,
}

/// Exchange admin credentials for an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    request.validate()?;
    let response = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(response))
}

/// Return the identity behind the presented token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current identity", body = AdminIdentity),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth_user: AuthUser) -> Json<AdminIdentity> {
    Json(AdminIdentity {
        id: auth_user.user_id,
        email: auth_user.email,
        role: auth_user.role,
    })
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2!").expect("hash");
        assert!(verify_password("hunter2!", &hash).expect("verify"));
        assert!(!verify_password("wrong", &hash).expect("verify"));
    }

    #[test]
    fn token_round_trip() {
        let service = AuthService::new(
            AuthConfig::new("0".repeat(64), Duration::from_secs(3600)),
            Arc::new(sea_orm::DatabaseConnection::default()),
        );
        let user = admin_user::Model {
            id: Uuid::new_v4(),
            email: "ops@example.com".to_string(),
            password_hash: String::new(),
            role: "admin".to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        };

        let token = service.issue_token(&user).expect("issue");
        let claims = service.verify_token(&token).expect("verify");
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "ops@example.com");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = AuthService::new(
            AuthConfig::new("0".repeat(64), Duration::from_secs(3600)),
            Arc::new(sea_orm::DatabaseConnection::default()),
        );
        assert!(service.verify_token("not.a.token").is_err());
    }

    #[test]
    fn non_admin_is_forbidden() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            email: "viewer@example.com".to_string(),
            role: "viewer".to_string(),
        };
        assert!(matches!(
            user.require_admin(),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
