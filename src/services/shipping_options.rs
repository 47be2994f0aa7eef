use crate::{
    db::DbPool,
    entities::shipping_option::{self, ShippingType},
    errors::ServiceError,
    money,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateShippingOptionInput {
    pub carrier: String,
    pub shipping_type: ShippingType,
    pub title: String,
    pub description: Option<String>,
    pub price: String,
    pub min_order_total: Option<String>,
    pub max_order_total: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateShippingOptionInput {
    pub carrier: Option<String>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<String>,
    pub min_order_total: Option<Option<String>>,
    pub max_order_total: Option<Option<String>>,
}

#[derive(Clone)]
pub struct ShippingOptionService {
    db: Arc<DbPool>,
}

impl ShippingOptionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateShippingOptionInput,
    ) -> Result<shipping_option::Model, ServiceError> {
        validate_amounts(
            &input.price,
            input.min_order_total.as_deref(),
            input.max_order_total.as_deref(),
        )?;

        let next_position = shipping_option::Entity::find()
            .order_by_desc(shipping_option::Column::Position)
            .one(&*self.db)
            .await?
            .map(|option| option.position + 1)
            .unwrap_or(0);

        let model = shipping_option::ActiveModel {
            id: Set(Uuid::new_v4()),
            carrier: Set(input.carrier),
            shipping_type: Set(input.shipping_type),
            title: Set(input.title),
            description: Set(input.description),
            price: Set(input.price),
            min_order_total: Set(input.min_order_total),
            max_order_total: Set(input.max_order_total),
            position: Set(next_position),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        info!(option_id = %created.id, "shipping option created");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<shipping_option::Model>, ServiceError> {
        shipping_option::Entity::find()
            .order_by_asc(shipping_option::Column::Position)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    /// Options whose order-total bounds admit the given subtotal, with
    /// prices resolved to cents for the storefront.
    pub async fn list_applicable(
        &self,
        subtotal_cents: i64,
    ) -> Result<Vec<(shipping_option::Model, i64)>, ServiceError> {
        let mut applicable = Vec::new();
        for option in self.list().await? {
            let Some(price_cents) = money::parse_cents(&option.price) else {
                continue;
            };
            let min_ok = match option.min_order_total.as_deref().and_then(money::parse_cents) {
                Some(min) => subtotal_cents >= min,
                None => option.min_order_total.is_none(),
            };
            let max_ok = match option.max_order_total.as_deref().and_then(money::parse_cents) {
                Some(max) => subtotal_cents <= max,
                None => option.max_order_total.is_none(),
            };
            if min_ok && max_ok {
                applicable.push((option, price_cents));
            }
        }
        Ok(applicable)
    }

    pub async fn get(&self, id: Uuid) -> Result<shipping_option::Model, ServiceError> {
        shipping_option::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shipping option {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateShippingOptionInput,
    ) -> Result<shipping_option::Model, ServiceError> {
        let existing = self.get(id).await?;

        let price = input.price.clone().unwrap_or_else(|| existing.price.clone());
        let min = match &input.min_order_total {
            Some(value) => value.clone(),
            None => existing.min_order_total.clone(),
        };
        let max = match &input.max_order_total {
            Some(value) => value.clone(),
            None => existing.max_order_total.clone(),
        };
        validate_amounts(&price, min.as_deref(), max.as_deref())?;

        let mut active_model: shipping_option::ActiveModel = existing.into();
        if let Some(carrier) = input.carrier {
            active_model.carrier = Set(carrier);
        }
        if let Some(title) = input.title {
            active_model.title = Set(title);
        }
        if let Some(description) = input.description {
            active_model.description = Set(description);
        }
        if let Some(price) = input.price {
            active_model.price = Set(price);
        }
        if let Some(min) = input.min_order_total {
            active_model.min_order_total = Set(min);
        }
        if let Some(max) = input.max_order_total {
            active_model.max_order_total = Set(max);
        }
        active_model.updated_at = Set(Some(Utc::now()));

        active_model.update(&*self.db).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = shipping_option::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Shipping option {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Replaces the manual ordering. Every persisted option must appear
    /// exactly once; positions are rewritten inside one transaction.
    #[instrument(skip(self, ordered_ids))]
    pub async fn reorder(&self, ordered_ids: Vec<Uuid>) -> Result<(), ServiceError> {
        let existing = self.list().await?;
        if existing.len() != ordered_ids.len() {
            return Err(ServiceError::ValidationError(
                "Reorder must include every shipping option exactly once".to_string(),
            ));
        }
        for option in &existing {
            if !ordered_ids.contains(&option.id) {
                return Err(ServiceError::ValidationError(format!(
                    "Reorder is missing shipping option {}",
                    option.id
                )));
            }
        }

        let txn = self.db.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            let mut active_model = shipping_option::ActiveModel {
                id: Set(*id),
                ..Default::default()
            };
            active_model.position = Set(position as i32);
            active_model.updated_at = Set(Some(Utc::now()));
            active_model.update(&txn).await?;
        }
        txn.commit().await?;

        info!(count = ordered_ids.len(), "shipping options reordered");
        Ok(())
    }
}

fn validate_amounts(
    price: &str,
    min_order_total: Option<&str>,
    max_order_total: Option<&str>,
) -> Result<(), ServiceError> {
    if money::parse_cents(price).is_none() {
        return Err(ServiceError::ValidationError(
            "Shipping price must be a non-negative decimal amount".to_string(),
        ));
    }

    let min = match min_order_total {
        Some(raw) => Some(money::parse_cents(raw).ok_or_else(|| {
            ServiceError::ValidationError(
                "min_order_total must be a non-negative decimal amount".to_string(),
            )
        })?),
        None => None,
    };
    let max = match max_order_total {
        Some(raw) => Some(money::parse_cents(raw).ok_or_else(|| {
            ServiceError::ValidationError(
                "max_order_total must be a non-negative decimal amount".to_string(),
            )
        })?),
        None => None,
    };

    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ServiceError::ValidationError(
                "min_order_total must not exceed max_order_total".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_parse() {
        assert!(validate_amounts("4.90", None, None).is_ok());
        assert!(validate_amounts("4,90", None, None).is_ok());
        assert!(validate_amounts("free", None, None).is_err());
        assert!(validate_amounts("-1.00", None, None).is_err());
    }

    #[test]
    fn bounds_must_be_ordered() {
        assert!(validate_amounts("4.90", Some("10.00"), Some("50.00")).is_ok());
        assert!(validate_amounts("4.90", Some("50.00"), Some("10.00")).is_err());
        assert!(validate_amounts("4.90", Some("10.00"), Some("10.00")).is_ok());
        assert!(validate_amounts("4.90", Some("abc"), None).is_err());
    }
}
