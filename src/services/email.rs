//! Brevo transactional email. Sends are best-effort: callers log and
//! swallow failures so email never rolls back a completed state change.

use crate::{
    config::AppConfig,
    errors::ServiceError,
    services::settings::SettingsService,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct EmailService {
    settings: Arc<SettingsService>,
    config: AppConfig,
    http: reqwest::Client,
}

impl EmailService {
    pub fn new(settings: Arc<SettingsService>, config: AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            settings,
            config,
            http,
        }
    }

    /// Sends one transactional email through the Brevo SMTP API.
    pub async fn send(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        subject: &str,
        html_body: &str,
    ) -> Result<(), ServiceError> {
        let api_key = self
            .settings
            .credential("brevo_api_key", self.config.brevo_api_key.as_deref())
            .await?;

        let body = json!({
            "sender": {
                "email": self.config.email_sender_address,
                "name": self.config.email_sender_name,
            },
            "to": [{
                "email": to_email,
                "name": to_name.unwrap_or(to_email),
            }],
            "subject": subject,
            "htmlContent": html_body,
        });

        let response = self
            .http
            .post(format!("{}/smtp/email", self.config.brevo_api_base))
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("brevo request failed: {}", e);
                ServiceError::EmailError("brevo request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "brevo rejected email");
            return Err(ServiceError::EmailError(format!(
                "brevo returned {}",
                status
            )));
        }

        info!(to = %to_email, subject = %subject, "transactional email sent");
        Ok(())
    }

    pub async fn send_payment_link(
        &self,
        to_email: &str,
        order_number: &str,
        payment_url: &str,
    ) -> Result<(), ServiceError> {
        let subject = format!("Complete your payment for order {}", order_number);
        let html = format!(
            "<p>Thank you for your order <strong>{}</strong>.</p>\
             <p><a href=\"{}\">Click here to complete your payment.</a></p>",
            order_number, payment_url
        );
        self.send(to_email, None, &subject, &html).await
    }

    pub async fn send_order_confirmation(
        &self,
        to_email: &str,
        order_number: &str,
    ) -> Result<(), ServiceError> {
        let subject = format!("Order {} confirmed", order_number);
        let html = format!(
            "<p>Your order <strong>{}</strong> has been paid and is being prepared.</p>",
            order_number
        );
        self.send(to_email, None, &subject, &html).await
    }
}
