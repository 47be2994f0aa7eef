//! Sendcloud carrier integration: shipping-method quotes, carrier list,
//! service points, and label downloads, authenticated with HTTP Basic
//! auth built from the decrypted public/secret key pair.

use crate::{
    config::AppConfig,
    errors::ServiceError,
    services::settings::SettingsService,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct SendcloudService {
    settings: Arc<SettingsService>,
    config: AppConfig,
    http: reqwest::Client,
}

/// A quoted shipping method as exposed to the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ShippingMethodQuote {
    pub id: i64,
    pub name: String,
    pub carrier: String,
    /// Two-decimal price string as returned by the carrier API
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Carrier {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServicePoint {
    pub id: i64,
    pub name: String,
    pub street: String,
    pub house_number: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Webhook payload for parcel status changes.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SendcloudWebhook {
    pub action: String,
    pub parcel: Option<ParcelPayload>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ParcelPayload {
    pub id: i64,
    pub tracking_number: Option<String>,
    pub order_number: Option<String>,
    pub status: ParcelStatusPayload,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ParcelStatusPayload {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ShippingMethodsResponse {
    shipping_methods: Vec<RawShippingMethod>,
}

#[derive(Debug, Deserialize)]
struct RawShippingMethod {
    id: i64,
    name: String,
    carrier: String,
    #[serde(default)]
    countries: Vec<RawMethodCountry>,
}

#[derive(Debug, Deserialize)]
struct RawMethodCountry {
    iso_2: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct CarriersResponse {
    carriers: Vec<RawCarrier>,
}

#[derive(Debug, Deserialize)]
struct RawCarrier {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ServicePointsResponse {
    #[serde(default)]
    service_points: Vec<RawServicePoint>,
}

#[derive(Debug, Deserialize)]
struct RawServicePoint {
    id: i64,
    name: String,
    street: String,
    #[serde(default)]
    house_number: Option<String>,
    postal_code: String,
    city: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct ParcelsResponse {
    parcels: Vec<RawParcel>,
}

#[derive(Debug, Deserialize)]
struct RawParcel {
    id: i64,
}

impl SendcloudService {
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

    async fn credentials(&self) -> Result<(String, String), ServiceError> {
        let public = self
            .settings
            .credential(
                "sendcloud_public_key",
                self.config.sendcloud_public_key.as_deref(),
            )
            .await?;
        let secret = self
            .settings
            .credential(
                "sendcloud_secret_key",
                self.config.sendcloud_secret_key.as_deref(),
            )
            .await?;
        Ok((public, secret))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, ServiceError> {
        let (public, secret) = self.credentials().await?;
        let response = self
            .http
            .get(format!("{}{}", self.config.sendcloud_api_base, path))
            .basic_auth(public, Some(secret))
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!("sendcloud request failed: {}", e);
                ServiceError::ExternalServiceError("sendcloud request failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, path, "sendcloud returned an error");
            return Err(ServiceError::ExternalServiceError(format!(
                "sendcloud returned {}",
                status
            )));
        }
        Ok(response)
    }

    /// Shipping methods, optionally narrowed to a destination country.
    /// Prices come back as two-decimal strings ready for display.
    pub async fn shipping_methods(
        &self,
        to_country: Option<&str>,
    ) -> Result<Vec<ShippingMethodQuote>, ServiceError> {
        let mut query = Vec::new();
        if let Some(country) = to_country {
            query.push(("to_country", country.to_uppercase()));
        }

        let response = self.get("/shipping_methods", &query).await?;
        let parsed: ShippingMethodsResponse = response.json().await.map_err(|e| {
            warn!("sendcloud shipping methods response unreadable: {}", e);
            ServiceError::ExternalServiceError("sendcloud response unreadable".to_string())
        })?;

        let country_filter = to_country.map(|c| c.to_uppercase());
        let quotes = parsed
            .shipping_methods
            .into_iter()
            .filter_map(|method| {
                let price = match &country_filter {
                    Some(country) => method
                        .countries
                        .iter()
                        .find(|c| c.iso_2.eq_ignore_ascii_case(country))
                        .map(|c| c.price)?,
                    None => method.countries.first().map(|c| c.price)?,
                };
                Some(ShippingMethodQuote {
                    id: method.id,
                    name: method.name,
                    carrier: method.carrier,
                    price: format!("{:.2}", price),
                })
            })
            .collect();
        Ok(quotes)
    }

    pub async fn carriers(&self) -> Result<Vec<Carrier>, ServiceError> {
        let response = self.get("/carriers", &[]).await?;
        let parsed: CarriersResponse = response.json().await.map_err(|e| {
            warn!("sendcloud carriers response unreadable: {}", e);
            ServiceError::ExternalServiceError("sendcloud response unreadable".to_string())
        })?;
        Ok(parsed
            .carriers
            .into_iter()
            .map(|c| Carrier {
                code: c.code,
                name: c.name,
            })
            .collect())
    }

    pub async fn service_points(
        &self,
        country: &str,
        postal_code: Option<&str>,
    ) -> Result<Vec<ServicePoint>, ServiceError> {
        let mut query = vec![("country", country.to_uppercase())];
        if let Some(postal_code) = postal_code {
            query.push(("postal_code", postal_code.to_string()));
        }

        let response = self.get("/service-points", &query).await?;
        let parsed: ServicePointsResponse = response.json().await.map_err(|e| {
            warn!("sendcloud service points response unreadable: {}", e);
            ServiceError::ExternalServiceError("sendcloud response unreadable".to_string())
        })?;
        Ok(parsed
            .service_points
            .into_iter()
            .map(|p| ServicePoint {
                id: p.id,
                name: p.name,
                street: p.street,
                house_number: p.house_number,
                postal_code: p.postal_code,
                city: p.city,
                country: p.country,
            })
            .collect())
    }

    /// Downloads the label PDF for the parcel behind a tracking number.
    pub async fn label_by_tracking(&self, tracking_number: &str) -> Result<Bytes, ServiceError> {
        let response = self
            .get(
                "/parcels",
                &[("tracking_number", tracking_number.to_string())],
            )
            .await?;
        let parsed: ParcelsResponse = response.json().await.map_err(|e| {
            warn!("sendcloud parcels response unreadable: {}", e);
            ServiceError::ExternalServiceError("sendcloud response unreadable".to_string())
        })?;
        let parcel = parsed.parcels.first().ok_or_else(|| {
            ServiceError::NotFound(format!(
                "No parcel found for tracking number {}",
                tracking_number
            ))
        })?;

        debug!(parcel_id = parcel.id, "downloading sendcloud label");
        let response = self
            .get(&format!("/labels/label_printer/{}", parcel.id), &[])
            .await?;
        response.bytes().await.map_err(|e| {
            warn!("sendcloud label download failed: {}", e);
            ServiceError::ExternalServiceError("sendcloud label download failed".to_string())
        })
    }
}
