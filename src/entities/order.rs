use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer order. Monetary columns hold integer cents; the pricing
/// invariant `total == subtotal + shipping - discount` is enforced at
/// creation and never recomputed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Public opaque identifier shown to customers (e.g. "ORD-3F2A81")
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub email: String,
    #[sea_orm(nullable)]
    pub customer_name: Option<String>,
    #[sea_orm(nullable)]
    pub shipping_address: Option<String>,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub refunded_cents: i64,
    pub currency: String,
    /// Discount code snapshot taken at checkout
    #[sea_orm(nullable)]
    pub discount_code: Option<String>,
    #[sea_orm(nullable)]
    pub shipping_option_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub shipping_title: Option<String>,
    /// Raw client-side payment method string; provider selection does a
    /// substring match for "stripe" / "paypal"
    #[sea_orm(nullable)]
    pub preferred_payment_method: Option<String>,
    #[sea_orm(nullable)]
    pub payment_intent_id: Option<String>,
    #[sea_orm(nullable)]
    pub charge_id: Option<String>,
    #[sea_orm(nullable)]
    pub capture_id: Option<String>,
    #[sea_orm(nullable)]
    pub tracking_number: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub tags: Option<Json>,
    #[sea_orm(nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Order lifecycle status. Transitions are admin- or webhook-triggered;
/// nothing is system-timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending_payment")]
    PendingPayment,
    #[sea_orm(string_value = "payment_link_sent")]
    PaymentLinkSent,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "fulfilled")]
    Fulfilled,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Forward transitions: pending_payment → payment_link_sent → paid →
    /// fulfilled, with cancellation reachable from the two early states.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (PendingPayment, PaymentLinkSent)
                | (PendingPayment, Paid)
                | (PendingPayment, Cancelled)
                | (PaymentLinkSent, Paid)
                | (PaymentLinkSent, Cancelled)
                | (Paid, Fulfilled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::PaymentLinkSent => "payment_link_sent",
            OrderStatus::Paid => "paid",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Secondary payment axis, advanced by webhooks and refunds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "partially_refunded")]
    PartiallyRefunded,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_machine_allows_forward_transitions() {
        assert!(OrderStatus::PendingPayment.can_transition_to(OrderStatus::PaymentLinkSent));
        assert!(OrderStatus::PendingPayment.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::PaymentLinkSent.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Fulfilled));
    }

    #[test]
    fn status_machine_rejects_backwards_and_late_cancel() {
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::PendingPayment));
        assert!(!OrderStatus::Fulfilled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Fulfilled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn cancel_reachable_from_early_states() {
        assert!(OrderStatus::PendingPayment.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::PaymentLinkSent.can_transition_to(OrderStatus::Cancelled));
    }
}
