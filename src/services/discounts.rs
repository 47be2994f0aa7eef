use crate::{
    db::DbPool,
    entities::discount_code::{self, DiscountType},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateDiscountInput {
    pub code: String,
    pub discount_type: DiscountType,
    pub amount_cents: Option<i64>,
    pub percent_off: Option<i32>,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDiscountInput {
    pub amount_cents: Option<i64>,
    pub percent_off: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct DiscountService {
    db: Arc<DbPool>,
}

impl DiscountService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a discount code. The code is stored uppercase; exactly one
    /// of amount/percent must be meaningful for the chosen type.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateDiscountInput,
    ) -> Result<discount_code::Model, ServiceError> {
        let code = input.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ServiceError::ValidationError(
                "Discount code must not be empty".to_string(),
            ));
        }
        validate_value(input.discount_type, input.amount_cents, input.percent_off)?;

        let existing = discount_code::Entity::find()
            .filter(discount_code::Column::Code.eq(code.clone()))
            .count(&*self.db)
            .await?;
        if existing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Discount code {} already exists",
                code
            )));
        }

        let model = discount_code::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            discount_type: Set(input.discount_type),
            amount_cents: Set(match input.discount_type {
                DiscountType::Fixed => input.amount_cents,
                DiscountType::Percent => None,
            }),
            percent_off: Set(match input.discount_type {
                DiscountType::Percent => input.percent_off,
                DiscountType::Fixed => None,
            }),
            active: Set(input.active),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        info!(code = %code, "discount code created");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<discount_code::Model>, ServiceError> {
        discount_code::Entity::find()
            .order_by_asc(discount_code::Column::Code)
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<discount_code::Model, ServiceError> {
        discount_code::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Discount {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateDiscountInput,
    ) -> Result<discount_code::Model, ServiceError> {
        let existing = self.get(id).await?;
        let amount = input.amount_cents.or(existing.amount_cents);
        let percent = input.percent_off.or(existing.percent_off);
        validate_value(existing.discount_type, amount, percent)?;

        let mut active_model: discount_code::ActiveModel = existing.into();
        if input.amount_cents.is_some() {
            active_model.amount_cents = Set(input.amount_cents);
        }
        if input.percent_off.is_some() {
            active_model.percent_off = Set(input.percent_off);
        }
        if let Some(active) = input.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Some(Utc::now()));

        active_model.update(&*self.db).await.map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = discount_code::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Discount {} not found", id)));
        }
        info!(discount_id = %id, "discount code deleted");
        Ok(())
    }
}

fn validate_value(
    discount_type: DiscountType,
    amount_cents: Option<i64>,
    percent_off: Option<i32>,
) -> Result<(), ServiceError> {
    match discount_type {
        DiscountType::Fixed => match amount_cents {
            Some(amount) if amount > 0 => Ok(()),
            _ => Err(ServiceError::ValidationError(
                "Fixed discounts require a positive amount_cents".to_string(),
            )),
        },
        DiscountType::Percent => match percent_off {
            Some(percent) if (1..=100).contains(&percent) => Ok(()),
            _ => Err(ServiceError::ValidationError(
                "Percent discounts require percent_off between 1 and 100".to_string(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_requires_positive_amount() {
        assert!(validate_value(DiscountType::Fixed, Some(100), None).is_ok());
        assert!(validate_value(DiscountType::Fixed, Some(0), None).is_err());
        assert!(validate_value(DiscountType::Fixed, None, Some(10)).is_err());
    }

    #[test]
    fn percent_requires_valid_range() {
        assert!(validate_value(DiscountType::Percent, None, Some(1)).is_ok());
        assert!(validate_value(DiscountType::Percent, None, Some(100)).is_ok());
        assert!(validate_value(DiscountType::Percent, None, Some(0)).is_err());
        assert!(validate_value(DiscountType::Percent, None, Some(101)).is_err());
        assert!(validate_value(DiscountType::Percent, Some(100), None).is_err());
    }
}
