use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_CURRENCY: &str = "EUR";
const DEFAULT_SHIPPING_CENTS: i64 = 490;
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_that_is_at_least_64_characters_long_for_testing";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT secret key (minimum 64 characters)
    #[validate(length(min = 64))]
    pub jwt_secret: String,

    /// JWT expiration time in seconds
    pub jwt_expiration: usize,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default = "default_false_bool")]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Charge currency (ISO 4217); the checkout pipeline prices in this
    #[serde(default = "default_currency")]
    #[validate(custom = "validate_currency")]
    pub currency: String,

    /// Shipping cost applied when checkout carries no shipping option
    #[serde(default = "default_shipping_cents")]
    #[validate(custom = "validate_non_negative_cents")]
    pub default_shipping_cents: i64,

    /// Public storefront base URL, used to build payment links
    #[serde(default = "default_storefront_url")]
    pub storefront_url: String,

    /// 64-hex-char AES-256-GCM key for provider credentials at rest
    #[validate(length(equal = 64))]
    pub secret_encryption_key: String,

    /// Stripe secret key fallback when not present in website settings
    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    /// Secret used to verify Stripe webhook signatures
    #[serde(default)]
    pub stripe_webhook_secret: Option<String>,

    /// PayPal REST credentials fallback
    #[serde(default)]
    pub paypal_client_id: Option<String>,
    #[serde(default)]
    pub paypal_client_secret: Option<String>,
    #[serde(default = "default_paypal_api_base")]
    pub paypal_api_base: String,

    /// Sendcloud API credentials fallback
    #[serde(default)]
    pub sendcloud_public_key: Option<String>,
    #[serde(default)]
    pub sendcloud_secret_key: Option<String>,
    #[serde(default = "default_sendcloud_api_base")]
    pub sendcloud_api_base: String,

    /// Brevo transactional email credentials fallback
    #[serde(default)]
    pub brevo_api_key: Option<String>,
    #[serde(default = "default_brevo_api_base")]
    pub brevo_api_base: String,
    #[serde(default = "default_sender_email")]
    pub email_sender_address: String,
    #[serde(default = "default_sender_name")]
    pub email_sender_name: String,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_false_bool() -> bool {
    false
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}
fn default_shipping_cents() -> i64 {
    DEFAULT_SHIPPING_CENTS
}
fn default_storefront_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_paypal_api_base() -> String {
    "https://api-m.paypal.com".to_string()
}
fn default_sendcloud_api_base() -> String {
    "https://panel.sendcloud.sc/api/v2".to_string()
}
fn default_brevo_api_base() -> String {
    "https://api.brevo.com/v3".to_string()
}
fn default_sender_email() -> String {
    "orders@example.com".to_string()
}
fn default_sender_name() -> String {
    "Storefront".to_string()
}
fn default_event_channel_capacity() -> usize {
    1024
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("currency");
        err.message = Some("Currency must be a 3-letter ISO code".into());
        Err(err)
    }
}

fn validate_non_negative_cents(cents: i64) -> Result<(), ValidationError> {
    if cents >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Amount in cents must not be negative".into());
        Err(err)
    }
}

impl AppConfig {
    /// Construct a minimal config programmatically (used by tests).
    pub fn new(
        database_url: String,
        jwt_secret: String,
        jwt_expiration: usize,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            currency: default_currency(),
            default_shipping_cents: default_shipping_cents(),
            storefront_url: default_storefront_url(),
            secret_encryption_key: "00".repeat(32),
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            paypal_client_id: None,
            paypal_client_secret: None,
            paypal_api_base: default_paypal_api_base(),
            sendcloud_public_key: None,
            sendcloud_secret_key: None,
            sendcloud_api_base: default_sendcloud_api_base(),
            brevo_api_key: None,
            brevo_api_base: default_brevo_api_base(),
            email_sender_address: default_sender_email(),
            email_sender_name: default_sender_name(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("dev")
            || self.environment.eq_ignore_ascii_case("test")
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration from `config/{default,RUN_ENV}` files and
/// `APP__`-prefixed environment variables, validating the result.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let builder = Config::builder()
        .set_default("database_url", "sqlite://storefront.db?mode=rwc")?
        .set_default("jwt_expiration", 3600)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false));

    let config = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // jwt_secret and the encryption key have no production default; a dev
    // fallback is injected only outside production so local runs work.
    let is_dev = run_env.eq_ignore_ascii_case("development") || run_env.eq_ignore_ascii_case("test");
    let mut app_config: AppConfig = match config.clone().try_deserialize() {
        Ok(cfg) => cfg,
        Err(err) => {
            if is_dev {
                let patched = Config::builder()
                    .add_source(config)
                    .set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?
                    .set_default("secret_encryption_key", "00".repeat(32))?
                    .build()?;
                patched.try_deserialize().map_err(AppConfigError::Config)?
            } else {
                return Err(AppConfigError::Config(err));
            }
        }
    };

    if app_config.jwt_secret.is_empty() {
        return Err(AppConfigError::Missing("jwt_secret"));
    }

    app_config
        .validate()
        .map_err(|e| AppConfigError::Invalid(e.to_string()))?;

    if !app_config.is_development() && app_config.jwt_secret == DEV_DEFAULT_JWT_SECRET {
        return Err(AppConfigError::Invalid(
            "the development jwt_secret must not be used outside development".to_string(),
        ));
    }

    app_config.environment = run_env;
    Ok(app_config)
}

/// Initializes the tracing subscriber with an env-filter and optional
/// JSON output.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("storefront_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".to_string(),
            DEV_DEFAULT_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            8080,
            "test".to_string(),
        )
    }

    #[test]
    fn programmatic_config_validates() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.is_development());
        assert!(cfg.should_allow_permissive_cors());
        assert_eq!(cfg.currency, "EUR");
        assert_eq!(cfg.default_shipping_cents, 490);
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut cfg = base_config();
        cfg.jwt_secret = "short".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_currency_is_rejected() {
        let mut cfg = base_config();
        cfg.currency = "EURO".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_encryption_key_is_rejected() {
        let mut cfg = base_config();
        cfg.secret_encryption_key = "abcd".to_string();
        assert!(cfg.validate().is_err());
    }
}
