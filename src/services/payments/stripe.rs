use super::{PaymentIntent, PaymentProvider, ProviderRefund, RefundRequest};
use crate::errors::ServiceError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe REST adapter. Uses the form-encoded v1 API with the secret key
/// as bearer credential. Provider error bodies are logged but never
/// surfaced to clients.
pub struct StripeProvider {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeRefund {
    id: String,
}

impl StripeProvider {
    pub fn new(http: reqwest::Client, secret_key: String) -> Self {
        Self {
            http,
            secret_key,
            api_base: STRIPE_API_BASE.to_string(),
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        order_number: &str,
    ) -> Result<PaymentIntent, ServiceError> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_lowercase()),
            ("metadata[order_number]", order_number.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("stripe payment intent request failed: {}", e);
                ServiceError::PaymentFailed("stripe request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "stripe rejected payment intent");
            return Err(ServiceError::PaymentFailed(format!(
                "stripe returned {}",
                status
            )));
        }

        let intent: StripePaymentIntent = response.json().await.map_err(|e| {
            warn!("stripe payment intent response unreadable: {}", e);
            ServiceError::PaymentFailed("stripe response unreadable".to_string())
        })?;

        debug!(intent_id = %intent.id, amount_cents, "stripe payment intent created");
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    async fn refund(&self, request: &RefundRequest) -> Result<ProviderRefund, ServiceError> {
        let mut params = vec![("amount", request.amount_cents.to_string())];
        // Refund by payment intent when available, else by charge.
        if let Some(intent_id) = request.payment_intent_id.as_deref() {
            params.push(("payment_intent", intent_id.to_string()));
        } else if let Some(charge_id) = request.charge_id.as_deref() {
            params.push(("charge", charge_id.to_string()));
        } else {
            return Err(ServiceError::InvalidOperation(
                "Order has no Stripe payment reference".to_string(),
            ));
        }

        let response = self
            .http
            .post(format!("{}/refunds", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("stripe refund request failed: {}", e);
                ServiceError::PaymentFailed("stripe request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "stripe rejected refund");
            return Err(ServiceError::PaymentFailed(format!(
                "stripe returned {}",
                status
            )));
        }

        let refund: StripeRefund = response.json().await.map_err(|e| {
            warn!("stripe refund response unreadable: {}", e);
            ServiceError::PaymentFailed("stripe response unreadable".to_string())
        })?;

        debug!(refund_id = %refund.id, amount_cents = request.amount_cents, "stripe refund created");
        Ok(ProviderRefund { id: refund.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refund_without_reference_is_rejected() {
        let provider = StripeProvider::new(reqwest::Client::new(), "sk_test".to_string());
        let request = RefundRequest {
            amount_cents: 500,
            currency: "EUR".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            provider.refund(&request).await,
            Err(ServiceError::InvalidOperation(_))
        ));
    }
}
