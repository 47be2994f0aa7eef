//! Payment-provider adapters, polymorphic over {create-charge, refund}.
//!
//! Provider clients are cached in a DashMap keyed by a SHA-256
//! fingerprint of the decrypted credentials; settings writes clear the
//! map, so credential rotation never serves a stale client.

pub mod paypal;
pub mod stripe;

use crate::{
    config::AppConfig,
    crypto,
    entities::order,
    errors::ServiceError,
    services::settings::SettingsService,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub use paypal::PayPalProvider;
pub use stripe::StripeProvider;

/// A created provider charge handle.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    /// Client-side confirmation secret (Stripe)
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderRefund {
    pub id: String,
}

/// Provider references recorded on the order, passed through on refund.
#[derive(Debug, Clone, Default)]
pub struct RefundRequest {
    pub payment_intent_id: Option<String>,
    pub charge_id: Option<String>,
    pub capture_id: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        order_number: &str,
    ) -> Result<PaymentIntent, ServiceError>;

    async fn refund(&self, request: &RefundRequest) -> Result<ProviderRefund, ServiceError>;
}

/// Fingerprint-keyed cache of constructed provider clients.
pub type ProviderCache = DashMap<String, Arc<dyn PaymentProvider>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Stripe,
    PayPal,
}

impl ProviderKind {
    /// Substring selection over the order's recorded payment method.
    pub fn from_preferred_method(preferred: Option<&str>) -> Result<Self, ServiceError> {
        let method = preferred.unwrap_or_default().to_lowercase();
        if method.contains("stripe") {
            Ok(ProviderKind::Stripe)
        } else if method.contains("paypal") {
            Ok(ProviderKind::PayPal)
        } else {
            Err(ServiceError::InvalidOperation(
                "Unsupported payment method".to_string(),
            ))
        }
    }
}

#[derive(Clone)]
pub struct PaymentService {
    settings: Arc<SettingsService>,
    config: AppConfig,
    http: reqwest::Client,
    cache: Arc<ProviderCache>,
}

impl PaymentService {
    pub fn new(
        settings: Arc<SettingsService>,
        config: AppConfig,
        cache: Arc<ProviderCache>,
    ) -> Self {
        // Connect timeout only; in-flight provider calls are never
        // aborted once dispatched.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            settings,
            config,
            http,
            cache,
        }
    }

    /// Resolves the adapter for an order by its recorded payment method.
    pub async fn provider_for_order(
        &self,
        order: &order::Model,
    ) -> Result<Arc<dyn PaymentProvider>, ServiceError> {
        let kind = ProviderKind::from_preferred_method(order.preferred_payment_method.as_deref())?;
        self.provider(kind).await
    }

    pub async fn provider(
        &self,
        kind: ProviderKind,
    ) -> Result<Arc<dyn PaymentProvider>, ServiceError> {
        match kind {
            ProviderKind::Stripe => {
                let secret_key = self
                    .settings
                    .credential("stripe_secret_key", self.config.stripe_secret_key.as_deref())
                    .await?;
                let fingerprint = crypto::credential_fingerprint(&["stripe", &secret_key]);
                if let Some(cached) = self.cache.get(&fingerprint) {
                    return Ok(cached.clone());
                }
                debug!("constructing stripe client");
                let provider: Arc<dyn PaymentProvider> =
                    Arc::new(StripeProvider::new(self.http.clone(), secret_key));
                self.cache.insert(fingerprint, provider.clone());
                Ok(provider)
            }
            ProviderKind::PayPal => {
                let client_id = self
                    .settings
                    .credential("paypal_client_id", self.config.paypal_client_id.as_deref())
                    .await?;
                let client_secret = self
                    .settings
                    .credential(
                        "paypal_client_secret",
                        self.config.paypal_client_secret.as_deref(),
                    )
                    .await?;
                let fingerprint =
                    crypto::credential_fingerprint(&["paypal", &client_id, &client_secret]);
                if let Some(cached) = self.cache.get(&fingerprint) {
                    return Ok(cached.clone());
                }
                debug!("constructing paypal client");
                let provider: Arc<dyn PaymentProvider> = Arc::new(PayPalProvider::new(
                    self.http.clone(),
                    client_id,
                    client_secret,
                    self.config.paypal_api_base.clone(),
                ));
                self.cache.insert(fingerprint, provider.clone());
                Ok(provider)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_selection_is_substring_based() {
        assert_eq!(
            ProviderKind::from_preferred_method(Some("stripe")).unwrap(),
            ProviderKind::Stripe
        );
        assert_eq!(
            ProviderKind::from_preferred_method(Some("stripe_card")).unwrap(),
            ProviderKind::Stripe
        );
        assert_eq!(
            ProviderKind::from_preferred_method(Some("PayPal Express")).unwrap(),
            ProviderKind::PayPal
        );
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(ProviderKind::from_preferred_method(Some("ideal")).is_err());
        assert!(ProviderKind::from_preferred_method(None).is_err());
        assert!(ProviderKind::from_preferred_method(Some("")).is_err());
    }
}
