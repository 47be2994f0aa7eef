//! Storefront API Library
//!
//! Storefront catalog and checkout endpoints plus the back-office admin
//! surface for orders, discounts, shipping, and settings.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod money;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<T>, errors::ServiceError>;

/// Full v1 API surface: public storefront routes, webhooks, and the
/// admin panel routes (each admin handler gates on AuthUser).
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Auth
        .nest("/auth", auth::auth_routes())
        // Storefront catalog
        .nest("/products", handlers::products::public_product_routes())
        .nest(
            "/collections",
            handlers::collections::public_collection_routes(),
        )
        // Checkout pricing pipeline
        .nest("/checkout", handlers::checkout::checkout_routes())
        // Webhooks (provider-authenticated)
        .nest("/webhooks", handlers::webhooks::webhook_routes())
        // Admin: orders, discounts, shipping, settings
        .nest("/orders", handlers::orders::order_routes())
        .nest("/discounts", handlers::discounts::discount_routes())
        .nest(
            "/shipping-options",
            handlers::shipping::shipping_option_routes(),
        )
        .nest("/shipping", handlers::shipping::shipping_provider_routes())
        .nest("/settings", handlers::settings::settings_routes())
        // Admin: catalog management
        .nest("/admin/products", handlers::products::admin_product_routes())
        .nest(
            "/admin/collections",
            handlers::collections::admin_collection_routes(),
        )
}

async fn api_status() -> Result<Json<Value>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "storefront-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(status_data))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Ok(Json(health_data))
}
