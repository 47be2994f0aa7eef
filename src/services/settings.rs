use crate::{
    crypto::SecretKey,
    db::DbPool,
    entities::website_setting,
    errors::ServiceError,
    services::payments::ProviderCache,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Settings whose values are provider credentials; stored encrypted and
/// never echoed back through the admin API.
pub const SECRET_SETTING_KEYS: &[&str] = &[
    "stripe_secret_key",
    "paypal_client_secret",
    "sendcloud_secret_key",
    "brevo_api_key",
];

pub fn is_secret_key(key: &str) -> bool {
    SECRET_SETTING_KEYS.contains(&key)
}

/// Admin-facing view; secret values are withheld.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SettingView {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub secret: bool,
    pub updated_at: chrono::DateTime<Utc>,
}

#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DbPool>,
    secret_key: SecretKey,
    provider_cache: Arc<ProviderCache>,
}

impl SettingsService {
    pub fn new(db: Arc<DbPool>, secret_key: SecretKey, provider_cache: Arc<ProviderCache>) -> Self {
        Self {
            db,
            secret_key,
            provider_cache,
        }
    }

    /// All settings with secret values withheld.
    pub async fn list(&self) -> Result<Vec<SettingView>, ServiceError> {
        let rows = website_setting::Entity::find()
            .order_by_asc(website_setting::Column::Key)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SettingView {
                secret: row.encrypted,
                value: if row.encrypted { None } else { Some(row.value) },
                key: row.key,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Returns the decrypted value for a key, if present.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let row = website_setting::Entity::find_by_id(key.to_string())
            .one(&*self.db)
            .await?;
        match row {
            Some(row) if row.encrypted => Ok(Some(self.secret_key.decrypt(&row.value)?)),
            Some(row) => Ok(Some(row.value)),
            None => Ok(None),
        }
    }

    /// Resolves a provider credential: stored setting first, environment
    /// fallback second. Missing both is a configuration error.
    pub async fn credential(
        &self,
        key: &str,
        fallback: Option<&str>,
    ) -> Result<String, ServiceError> {
        if let Some(value) = self.get_value(key).await? {
            if !value.trim().is_empty() {
                return Ok(value);
            }
        }
        match fallback {
            Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
            _ => Err(ServiceError::ConfigError(format!(
                "Missing credential: {}",
                key
            ))),
        }
    }

    /// Upserts a batch of settings in one transaction, encrypting secret
    /// keys, then invalidates the provider-client cache so rotated
    /// credentials take effect immediately.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn put_many(&self, entries: Vec<(String, String)>) -> Result<(), ServiceError> {
        if entries.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        for (key, value) in entries {
            let secret = is_secret_key(&key);
            let stored_value = if secret {
                self.secret_key.encrypt(&value)?
            } else {
                value
            };

            let existing = website_setting::Entity::find_by_id(key.clone())
                .one(&txn)
                .await?;
            match existing {
                Some(row) => {
                    let mut active_model: website_setting::ActiveModel = row.into();
                    active_model.value = Set(stored_value);
                    active_model.encrypted = Set(secret);
                    active_model.updated_at = Set(Utc::now());
                    active_model.update(&txn).await?;
                }
                None => {
                    website_setting::ActiveModel {
                        key: Set(key),
                        value: Set(stored_value),
                        encrypted: Set(secret),
                        updated_at: Set(Utc::now()),
                    }
                    .insert(&txn)
                    .await?;
                }
            }
        }
        txn.commit().await?;

        self.provider_cache.clear();
        info!("website settings updated; provider client cache invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_classification() {
        assert!(is_secret_key("stripe_secret_key"));
        assert!(is_secret_key("brevo_api_key"));
        assert!(!is_secret_key("store_name"));
        assert!(!is_secret_key("paypal_client_id"));
    }
}
