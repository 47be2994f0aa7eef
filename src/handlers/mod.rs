pub mod checkout;
pub mod collections;
pub mod common;
pub mod discounts;
pub mod orders;
pub mod products;
pub mod settings;
pub mod shipping;
pub mod webhooks;

use crate::auth::{AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::crypto::SecretKey;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::payments::ProviderCache;
use std::sync::Arc;
use std::time::Duration;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub pricing: Arc<crate::services::pricing::PricingService>,
    pub discounts: Arc<crate::services::discounts::DiscountService>,
    pub shipping_options: Arc<crate::services::shipping_options::ShippingOptionService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub collections: Arc<crate::services::collections::CollectionService>,
    pub customers: Arc<crate::services::customers::CustomerService>,
    pub settings: Arc<crate::services::settings::SettingsService>,
    pub payments: Arc<crate::services::payments::PaymentService>,
    pub sendcloud: Arc<crate::services::sendcloud::SendcloudService>,
    pub email: Arc<crate::services::email::EmailService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    /// Shared with the settings service, which clears it on writes.
    /// Tests use it to stub payment providers by fingerprint.
    pub provider_cache: Arc<ProviderCache>,
}

impl AppServices {
    /// Wires the full service graph. The provider-client cache is shared
    /// between the settings service (which clears it on writes) and the
    /// payment service (which fills it per credential fingerprint).
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Result<Self, ServiceError> {
        let secret_key = SecretKey::from_hex(&config.secret_encryption_key)?;
        let provider_cache = Arc::new(ProviderCache::new());

        let auth = Arc::new(AuthService::new(
            AuthConfig::new(
                config.jwt_secret.clone(),
                Duration::from_secs(config.jwt_expiration as u64),
            ),
            db.clone(),
        ));
        let settings = Arc::new(crate::services::settings::SettingsService::new(
            db.clone(),
            secret_key,
            provider_cache.clone(),
        ));
        let payments = Arc::new(crate::services::payments::PaymentService::new(
            settings.clone(),
            config.clone(),
            provider_cache.clone(),
        ));
        let email = Arc::new(crate::services::email::EmailService::new(
            settings.clone(),
            config.clone(),
        ));
        let sendcloud = Arc::new(crate::services::sendcloud::SendcloudService::new(
            settings.clone(),
            config.clone(),
        ));
        let pricing = Arc::new(crate::services::pricing::PricingService::new(db.clone()));
        let discounts = Arc::new(crate::services::discounts::DiscountService::new(db.clone()));
        let shipping_options = Arc::new(
            crate::services::shipping_options::ShippingOptionService::new(db.clone()),
        );
        let products = Arc::new(crate::services::products::ProductService::new(db.clone()));
        let collections = Arc::new(crate::services::collections::CollectionService::new(
            db.clone(),
        ));
        let customers = Arc::new(crate::services::customers::CustomerService::new(db.clone()));
        let orders = Arc::new(crate::services::orders::OrderService::new(
            db,
            event_sender,
            payments.clone(),
            email.clone(),
            customers.clone(),
            config.storefront_url.clone(),
        ));

        Ok(Self {
            auth,
            pricing,
            discounts,
            shipping_options,
            products,
            collections,
            customers,
            settings,
            payments,
            sendcloud,
            email,
            orders,
            provider_cache,
        })
    }
}
