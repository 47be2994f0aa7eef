use super::{PaymentIntent, PaymentProvider, ProviderRefund, RefundRequest};
use crate::{errors::ServiceError, money};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// PayPal REST adapter. Obtains a client-credentials access token, then
/// refunds against the recorded capture id with a two-decimal amount
/// string. Charges are captured client-side by the PayPal SDK, so
/// create-charge is not a server-side operation for this provider.
pub struct PayPalProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct PayPalTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PayPalRefundResponse {
    id: String,
}

impl PayPalProvider {
    pub fn new(
        http: reqwest::Client,
        client_id: String,
        client_secret: String,
        api_base: String,
    ) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            api_base,
        }
    }

    async fn access_token(&self) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                warn!("paypal token request failed: {}", e);
                ServiceError::PaymentFailed("paypal request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "paypal rejected token request");
            return Err(ServiceError::PaymentFailed(format!(
                "paypal returned {}",
                status
            )));
        }

        let token: PayPalTokenResponse = response.json().await.map_err(|e| {
            warn!("paypal token response unreadable: {}", e);
            ServiceError::PaymentFailed("paypal response unreadable".to_string())
        })?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentProvider for PayPalProvider {
    fn name(&self) -> &'static str {
        "paypal"
    }

    async fn create_payment_intent(
        &self,
        _amount_cents: i64,
        _currency: &str,
        _order_number: &str,
    ) -> Result<PaymentIntent, ServiceError> {
        Err(ServiceError::InvalidOperation(
            "PayPal charges are captured client-side".to_string(),
        ))
    }

    async fn refund(&self, request: &RefundRequest) -> Result<ProviderRefund, ServiceError> {
        let capture_id = request.capture_id.as_deref().ok_or_else(|| {
            ServiceError::InvalidOperation("Order has no PayPal capture reference".to_string())
        })?;

        let token = self.access_token().await?;
        let body = json!({
            "amount": {
                "value": money::format_cents(request.amount_cents),
                "currency_code": request.currency,
            }
        });

        let response = self
            .http
            .post(format!(
                "{}/v2/payments/captures/{}/refund",
                self.api_base, capture_id
            ))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("paypal refund request failed: {}", e);
                ServiceError::PaymentFailed("paypal request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "paypal rejected refund");
            return Err(ServiceError::PaymentFailed(format!(
                "paypal returned {}",
                status
            )));
        }

        let refund: PayPalRefundResponse = response.json().await.map_err(|e| {
            warn!("paypal refund response unreadable: {}", e);
            ServiceError::PaymentFailed("paypal response unreadable".to_string())
        })?;

        debug!(refund_id = %refund.id, amount_cents = request.amount_cents, "paypal refund created");
        Ok(ProviderRefund { id: refund.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> PayPalProvider {
        PayPalProvider::new(
            reqwest::Client::new(),
            "client".to_string(),
            "secret".to_string(),
            "https://api-m.sandbox.paypal.com".to_string(),
        )
    }

    #[tokio::test]
    async fn create_intent_is_not_server_side() {
        assert!(matches!(
            provider().create_payment_intent(1000, "EUR", "ORD-1").await,
            Err(ServiceError::InvalidOperation(_))
        ));
    }

    #[tokio::test]
    async fn refund_without_capture_is_rejected() {
        let request = RefundRequest {
            amount_cents: 500,
            currency: "EUR".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            provider().refund(&request).await,
            Err(ServiceError::InvalidOperation(_))
        ));
    }
}
