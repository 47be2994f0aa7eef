//! Inbound webhooks: Stripe payment confirmations and Sendcloud parcel
//! status updates. Both always answer 2xx for events they deliberately
//! ignore, so providers do not retry forever.

use crate::services::sendcloud::SendcloudWebhook;
use crate::{errors::ServiceError, AppState};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct StripeEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: StripeEventObject,
}

#[derive(Debug, Deserialize)]
struct StripeEventObject {
    id: String,
    #[serde(default)]
    latest_charge: Option<String>,
}

/// Verifies the `Stripe-Signature` header (t=...,v1=...) against the
/// HMAC-SHA256 of `{timestamp}.{payload}`.
fn verify_stripe_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
) -> Result<(), ServiceError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or_else(|| {
        ServiceError::Unauthorized("Malformed webhook signature".to_string())
    })?;
    if signatures.is_empty() {
        return Err(ServiceError::Unauthorized(
            "Malformed webhook signature".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ServiceError::ConfigError("Invalid webhook secret".to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    if signatures.iter().any(|sig| *sig == expected) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized(
            "Webhook signature mismatch".to_string(),
        ))
    }
}

/// Stripe payment webhook
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/stripe",
    request_body = String,
    responses(
        (status = 200, description = "Processed"),
        (status = 401, description = "Bad signature", body = crate::errors::ErrorResponse)
    ),
    tag = "Webhooks"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ServiceError> {
    match state.config.stripe_webhook_secret.as_deref() {
        Some(secret) => {
            let signature = headers
                .get("Stripe-Signature")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    ServiceError::Unauthorized("Missing webhook signature".to_string())
                })?;
            verify_stripe_signature(secret, signature, &body)?;
        }
        None => {
            warn!("stripe webhook secret not configured; accepting unverified event");
        }
    }

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|_| ServiceError::ValidationError("Malformed webhook payload".to_string()))?;

    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let intent = event.data.object;
            state
                .services
                .orders
                .mark_paid_by_payment_intent(&intent.id, intent.latest_charge.as_deref())
                .await?;
        }
        other => {
            info!(event_type = %other, "stripe event ignored");
        }
    }
    Ok(StatusCode::OK)
}

/// Sendcloud parcel status webhook
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/sendcloud",
    request_body = SendcloudWebhook,
    responses(
        (status = 200, description = "Processed"),
        (status = 400, description = "Malformed payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Webhooks"
)]
pub async fn sendcloud_webhook(
    State(state): State<AppState>,
    Json(payload): Json<SendcloudWebhook>,
) -> Result<StatusCode, ServiceError> {
    if payload.action != "parcel_status_changed" {
        info!(action = %payload.action, "sendcloud event ignored");
        return Ok(StatusCode::OK);
    }
    let Some(parcel) = payload.parcel else {
        return Err(ServiceError::ValidationError(
            "Parcel update without parcel payload".to_string(),
        ));
    };

    match state
        .services
        .orders
        .apply_parcel_update(
            parcel.order_number.as_deref(),
            parcel.tracking_number.as_deref(),
            &parcel.status.message,
        )
        .await
    {
        Ok(_) => {}
        // A parcel we cannot match is the carrier's problem, not a retry
        // candidate.
        Err(ServiceError::NotFound(msg)) => {
            warn!("sendcloud webhook for unknown order: {}", msg);
        }
        Err(e) => return Err(e),
    }
    Ok(StatusCode::OK)
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/stripe", post(stripe_webhook))
        .route("/sendcloud", post(sendcloud_webhook))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_passes() {
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let signature = sign("whsec_test", "1712000000", payload);
        let header = format!("t=1712000000,v1={}", signature);
        assert!(verify_stripe_signature("whsec_test", &header, payload).is_ok());
    }

    #[test]
    fn wrong_secret_fails() {
        let payload = b"{}";
        let signature = sign("whsec_other", "1712000000", payload);
        let header = format!("t=1712000000,v1={}", signature);
        assert!(verify_stripe_signature("whsec_test", &header, payload).is_err());
    }

    #[test]
    fn malformed_header_fails() {
        assert!(verify_stripe_signature("whsec_test", "nonsense", b"{}").is_err());
        assert!(verify_stripe_signature("whsec_test", "t=123", b"{}").is_err());
        assert!(verify_stripe_signature("whsec_test", "v1=abc", b"{}").is_err());
    }
}
