//! Checkout pricing pipeline: shipping resolution, discount evaluation,
//! and total aggregation. All arithmetic in integer cents.

use crate::{
    db::DbPool,
    entities::{discount_code, shipping_option},
    errors::ServiceError,
    money,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Result of resolving the shipping leg of a checkout.
#[derive(Debug, Clone)]
pub struct ResolvedShipping {
    /// The persisted option, when one was requested
    pub option: Option<shipping_option::Model>,
    /// Always a non-negative integer
    pub shipping_cents: i64,
}

#[derive(Clone)]
pub struct PricingService {
    db: Arc<DbPool>,
}

impl PricingService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Resolves a shipping option against the order subtotal.
    ///
    /// No option id means the configured default shipping cost applies
    /// and no option is referenced. A present id must exist, carry a
    /// parseable price, and admit the subtotal within its inclusive
    /// min/max order-total bounds.
    #[instrument(skip(self))]
    pub async fn resolve_shipping(
        &self,
        option_id: Option<Uuid>,
        subtotal_cents: i64,
        default_shipping_cents: i64,
    ) -> Result<ResolvedShipping, ServiceError> {
        let Some(option_id) = option_id else {
            return Ok(ResolvedShipping {
                option: None,
                shipping_cents: default_shipping_cents.max(0),
            });
        };

        let option = shipping_option::Entity::find_by_id(option_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Shipping option {} not found", option_id))
            })?;

        let shipping_cents = money::parse_cents(&option.price).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Shipping option {} has an invalid price",
                option.id
            ))
        })?;

        check_bounds(&option, subtotal_cents)?;

        debug!(option_id = %option.id, shipping_cents, "shipping option resolved");
        Ok(ResolvedShipping {
            option: Some(option),
            shipping_cents,
        })
    }

    /// Looks up an active discount code, uppercasing the input first.
    pub async fn find_active_discount(
        &self,
        code: &str,
    ) -> Result<discount_code::Model, ServiceError> {
        let normalized = code.trim().to_uppercase();
        discount_code::Entity::find()
            .filter(discount_code::Column::Code.eq(normalized.clone()))
            .filter(discount_code::Column::Active.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Discount code {} not found", normalized))
            })
    }

    /// Evaluates a discount code against a base amount. Read-only and
    /// idempotent; the code row is never touched.
    #[instrument(skip(self))]
    pub async fn evaluate_discount(
        &self,
        code: &str,
        base_cents: i64,
    ) -> Result<(discount_code::Model, i64), ServiceError> {
        let discount = self.find_active_discount(code).await?;
        let discount_cents = calculate_discount(&discount, base_cents)?;
        Ok((discount, discount_cents))
    }
}

fn check_bounds(
    option: &shipping_option::Model,
    subtotal_cents: i64,
) -> Result<(), ServiceError> {
    let parse_bound = |raw: &str| {
        money::parse_cents(raw).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Shipping option {} has a malformed order-total bound",
                option.id
            ))
        })
    };

    if let Some(raw) = option.min_order_total.as_deref() {
        if subtotal_cents < parse_bound(raw)? {
            return Err(ServiceError::ValidationError(
                "Shipping option is not applicable to this order total".to_string(),
            ));
        }
    }
    if let Some(raw) = option.max_order_total.as_deref() {
        if subtotal_cents > parse_bound(raw)? {
            return Err(ServiceError::ValidationError(
                "Shipping option is not applicable to this order total".to_string(),
            ));
        }
    }
    Ok(())
}

/// Computes the discount a code grants on a base amount.
///
/// Fixed codes discount their `amount_cents`; percent codes discount
/// `round(base * percent / 100)` (half-up). The result is clamped to
/// `[0, base_cents]` so a discount can never push a total negative.
pub fn calculate_discount(
    discount: &discount_code::Model,
    base_cents: i64,
) -> Result<i64, ServiceError> {
    let raw = match discount.discount_type {
        discount_code::DiscountType::Fixed => {
            let amount = discount.amount_cents.unwrap_or(0);
            if amount <= 0 {
                return Err(ServiceError::ValidationError(format!(
                    "Discount {} has an invalid amount",
                    discount.code
                )));
            }
            amount
        }
        discount_code::DiscountType::Percent => {
            let percent = discount.percent_off.unwrap_or(0) as i64;
            if percent <= 0 || percent > 100 {
                return Err(ServiceError::ValidationError(format!(
                    "Discount {} has an invalid percentage",
                    discount.code
                )));
            }
            // Round half-up to whole cents.
            (base_cents * percent + 50) / 100
        }
    };

    Ok(raw.clamp(0, base_cents.max(0)))
}

/// Combines the three pricing legs into the chargeable total. Checkout
/// cannot proceed with a zero or negative charge.
pub fn aggregate_total(
    subtotal_cents: i64,
    shipping_cents: i64,
    discount_cents: i64,
) -> Result<i64, ServiceError> {
    let total = subtotal_cents + shipping_cents - discount_cents;
    if total <= 0 {
        return Err(ServiceError::ValidationError(
            "Order total must be greater than zero".to_string(),
        ));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn percent_code(percent: i32) -> discount_code::Model {
        discount_code::Model {
            id: Uuid::new_v4(),
            code: "SAVE10".to_string(),
            discount_type: discount_code::DiscountType::Percent,
            amount_cents: None,
            percent_off: Some(percent),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn fixed_code(amount_cents: i64) -> discount_code::Model {
        discount_code::Model {
            id: Uuid::new_v4(),
            code: "TENOFF".to_string(),
            discount_type: discount_code::DiscountType::Fixed,
            amount_cents: Some(amount_cents),
            percent_off: None,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn percent_discount_rounds_half_up() {
        // Worked example: 10% of 5490 is 549.
        assert_eq!(calculate_discount(&percent_code(10), 5490).unwrap(), 549);
        // 10% of 5495 is 549.5, rounded up to 550.
        assert_eq!(calculate_discount(&percent_code(10), 5495).unwrap(), 550);
    }

    #[test]
    fn fixed_discount_uses_amount() {
        assert_eq!(calculate_discount(&fixed_code(1000), 5000).unwrap(), 1000);
    }

    #[test]
    fn discount_is_clamped_to_base() {
        assert_eq!(calculate_discount(&fixed_code(9000), 5000).unwrap(), 5000);
        assert_eq!(calculate_discount(&percent_code(100), 5000).unwrap(), 5000);
        assert_eq!(calculate_discount(&fixed_code(1), 0).unwrap(), 0);
    }

    #[test]
    fn invalid_fixed_amount_is_rejected() {
        assert!(calculate_discount(&fixed_code(0), 5000).is_err());
        assert!(calculate_discount(&fixed_code(-100), 5000).is_err());

        let mut missing = fixed_code(100);
        missing.amount_cents = None;
        assert!(calculate_discount(&missing, 5000).is_err());
    }

    #[test]
    fn invalid_percent_is_rejected() {
        assert!(calculate_discount(&percent_code(0), 5000).is_err());
        assert!(calculate_discount(&percent_code(-5), 5000).is_err());
        assert!(calculate_discount(&percent_code(101), 5000).is_err());
        assert!(calculate_discount(&percent_code(100), 5000).is_ok());
    }

    #[test]
    fn discount_never_exceeds_base_across_magnitudes() {
        for base in [0i64, 1, 49, 50, 99, 100, 5490, 1_000_000] {
            for percent in [1, 10, 33, 50, 99, 100] {
                let cents = calculate_discount(&percent_code(percent), base).unwrap();
                assert!(cents >= 0, "negative discount for base {base}");
                assert!(cents <= base.max(0), "discount {cents} exceeds base {base}");
            }
        }
    }

    #[test]
    fn aggregate_rejects_non_positive_totals() {
        assert_eq!(aggregate_total(5000, 490, 549).unwrap(), 4941);
        assert!(aggregate_total(1000, 0, 1000).is_err());
        assert!(aggregate_total(0, 0, 0).is_err());
        assert!(aggregate_total(100, 0, 500).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        let option = shipping_option::Model {
            id: Uuid::new_v4(),
            carrier: "postnl".to_string(),
            shipping_type: shipping_option::ShippingType::Shipping,
            title: "Standard".to_string(),
            description: None,
            price: "4.90".to_string(),
            min_order_total: Some("10.00".to_string()),
            max_order_total: Some("50,00".to_string()),
            position: 0,
            created_at: Utc::now(),
            updated_at: None,
        };

        assert!(check_bounds(&option, 1000).is_ok());
        assert!(check_bounds(&option, 5000).is_ok());
        assert!(check_bounds(&option, 999).is_err());
        assert!(check_bounds(&option, 5001).is_err());
    }
}
