use crate::{
    db::DbPool,
    entities::{
        order::{self, OrderStatus, PaymentStatus},
        order_item, shipping_option,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        customers::{CustomerContact, CustomerService},
        email::EmailService,
        payments::{PaymentService, ProviderKind, RefundRequest},
        pricing,
    },
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Option<Uuid>,
    pub title: String,
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_cents: i64,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub email: String,
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    pub items: Vec<NewOrderItem>,
    pub shipping_cents: i64,
    pub shipping_option: Option<shipping_option::Model>,
    /// Code and evaluated cents, snapshotted at checkout
    pub discount: Option<(String, i64)>,
    pub preferred_payment_method: Option<String>,
    pub currency: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrderDetails {
    pub customer_name: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub preferred_payment_method: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    pub email: Option<String>,
}

#[derive(Debug)]
pub struct OrderListResult {
    pub orders: Vec<order::Model>,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct PaymentLinkResult {
    pub url: String,
    pub payment_intent_id: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    payments: Arc<PaymentService>,
    email: Arc<EmailService>,
    customers: Arc<CustomerService>,
    storefront_url: String,
}

impl OrderService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        payments: Arc<PaymentService>,
        email: Arc<EmailService>,
        customers: Arc<CustomerService>,
        storefront_url: String,
    ) -> Self {
        Self {
            db,
            event_sender,
            payments,
            email,
            customers,
            storefront_url,
        }
    }

    /// Creates a pending order with its items in one transaction. The
    /// totals are fixed here and never recomputed.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<order::Model, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }
        let mut subtotal_cents: i64 = 0;
        for item in &input.items {
            if item.quantity < 1 {
                return Err(ServiceError::ValidationError(
                    "Item quantity must be at least 1".to_string(),
                ));
            }
            if item.unit_cents < 0 {
                return Err(ServiceError::ValidationError(
                    "Item price must not be negative".to_string(),
                ));
            }
            subtotal_cents += item.unit_cents * item.quantity as i64;
        }

        let discount_cents = input.discount.as_ref().map(|(_, cents)| *cents).unwrap_or(0);
        let total_cents =
            pricing::aggregate_total(subtotal_cents, input.shipping_cents, discount_cents)?;

        let order_id = Uuid::new_v4();
        let order_number = generate_order_number(order_id);
        let now = Utc::now();

        let txn = self.db.begin().await?;
        let order_model = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            status: Set(OrderStatus::PendingPayment),
            payment_status: Set(PaymentStatus::Pending),
            email: Set(input.email.trim().to_lowercase()),
            customer_name: Set(input.customer_name),
            shipping_address: Set(input.shipping_address),
            subtotal_cents: Set(subtotal_cents),
            shipping_cents: Set(input.shipping_cents),
            discount_cents: Set(discount_cents),
            total_cents: Set(total_cents),
            refunded_cents: Set(0),
            currency: Set(input.currency),
            discount_code: Set(input.discount.as_ref().map(|(code, _)| code.clone())),
            shipping_option_id: Set(input.shipping_option.as_ref().map(|o| o.id)),
            shipping_title: Set(input.shipping_option.as_ref().map(|o| o.title.clone())),
            preferred_payment_method: Set(input.preferred_payment_method),
            payment_intent_id: Set(None),
            charge_id: Set(None),
            capture_id: Set(None),
            tracking_number: Set(None),
            tags: Set(None),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
        };
        let created = order_model.insert(&txn).await?;

        for item in &input.items {
            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                title: Set(item.title.clone()),
                sku: Set(item.sku.clone()),
                quantity: Set(item.quantity),
                unit_cents: Set(item.unit_cents),
                total_cents: Set(item.unit_cents * item.quantity as i64),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        self.event_sender.send(Event::OrderCreated(order_id)).await;
        if let Some((code, cents)) = &input.discount {
            self.event_sender
                .send(Event::DiscountRedeemed {
                    code: code.clone(),
                    order_id,
                    discount_cents: *cents,
                })
                .await;
        }

        info!(order_id = %order_id, order_number = %order_number, total_cents, "order created");
        Ok(created)
    }

    pub async fn list_orders(
        &self,
        page: u64,
        limit: u64,
        filter: OrderListFilter,
    ) -> Result<OrderListResult, ServiceError> {
        let limit = limit.clamp(1, 100);
        let mut query = order::Entity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }
        if let Some(email) = filter.email {
            query = query.filter(order::Column::Email.eq(email.trim().to_lowercase()));
        }

        let paginator = query.paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok(OrderListResult { orders, total })
    }

    pub async fn get(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    pub async fn get_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<order::Model, ServiceError> {
        order::Entity::find()
            .filter(order::Column::OrderNumber.eq(order_number))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))
    }

    pub async fn get_items(&self, order_id: Uuid) -> Result<Vec<order_item::Model>, ServiceError> {
        order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await
            .map_err(ServiceError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_details(
        &self,
        id: Uuid,
        details: UpdateOrderDetails,
    ) -> Result<order::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active_model: order::ActiveModel = existing.into();
        if let Some(customer_name) = details.customer_name {
            active_model.customer_name = Set(Some(customer_name));
        }
        if let Some(shipping_address) = details.shipping_address {
            active_model.shipping_address = Set(Some(shipping_address));
        }
        if let Some(notes) = details.notes {
            active_model.notes = Set(Some(notes));
        }
        if let Some(method) = details.preferred_payment_method {
            active_model.preferred_payment_method = Set(Some(method));
        }
        if let Some(tracking_number) = details.tracking_number {
            active_model.tracking_number = Set(Some(tracking_number));
        }
        active_model.updated_at = Set(Some(Utc::now()));
        active_model.update(&*self.db).await.map_err(ServiceError::from)
    }

    /// Applies a status transition, rejecting anything the state machine
    /// does not allow.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let existing = self.get(id).await?;
        let old_status = existing.status;
        if old_status == new_status {
            return Ok(existing);
        }
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot transition order from {} to {}",
                old_status.as_str(),
                new_status.as_str()
            )));
        }

        let mut active_model: order::ActiveModel = existing.into();
        active_model.status = Set(new_status);
        active_model.updated_at = Set(Some(Utc::now()));
        let updated = active_model.update(&*self.db).await?;

        self.event_sender
            .send(Event::OrderStatusChanged {
                order_id: id,
                old_status: old_status.as_str().to_string(),
                new_status: new_status.as_str().to_string(),
            })
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, tags))]
    pub async fn set_tags(&self, id: Uuid, tags: Vec<String>) -> Result<order::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active_model: order::ActiveModel = existing.into();
        active_model.tags = Set(Some(serde_json::json!(tags)));
        active_model.updated_at = Set(Some(Utc::now()));
        active_model.update(&*self.db).await.map_err(ServiceError::from)
    }

    /// Refunds part or all of an order through its payment provider.
    ///
    /// The guard admits `0 < amount <= total - refunded`. Bookkeeping
    /// runs only after the provider confirms and is not compensated if a
    /// later step fails.
    #[instrument(skip(self))]
    pub async fn refund(&self, id: Uuid, amount_cents: i64) -> Result<order::Model, ServiceError> {
        let existing = self.get(id).await?;
        let (new_refunded, new_payment_status) =
            next_refund_state(existing.total_cents, existing.refunded_cents, amount_cents)?;

        let provider = self.payments.provider_for_order(&existing).await?;
        let refund = provider
            .refund(&RefundRequest {
                payment_intent_id: existing.payment_intent_id.clone(),
                charge_id: existing.charge_id.clone(),
                capture_id: existing.capture_id.clone(),
                amount_cents,
                currency: existing.currency.clone(),
            })
            .await?;

        info!(order_id = %id, provider = provider.name(), refund_id = %refund.id, amount_cents, "provider refund confirmed");

        let total_cents = existing.total_cents;
        let mut active_model: order::ActiveModel = existing.into();
        active_model.refunded_cents = Set(new_refunded);
        active_model.payment_status = Set(new_payment_status);
        active_model.updated_at = Set(Some(Utc::now()));
        let updated = active_model.update(&*self.db).await?;

        self.event_sender
            .send(Event::OrderRefunded {
                order_id: id,
                amount_cents,
                remaining_cents: total_cents - new_refunded,
            })
            .await;
        Ok(updated)
    }

    /// Issues a payment link for an unpaid order: creates a provider
    /// charge when the provider supports it, marks the order
    /// payment_link_sent, and emails the customer. Email failure is
    /// logged and swallowed.
    #[instrument(skip(self))]
    pub async fn create_payment_link(
        &self,
        id: Uuid,
    ) -> Result<PaymentLinkResult, ServiceError> {
        let existing = self.get(id).await?;
        if !matches!(
            existing.status,
            OrderStatus::PendingPayment | OrderStatus::PaymentLinkSent
        ) {
            return Err(ServiceError::InvalidOperation(
                "Payment links can only be issued for unpaid orders".to_string(),
            ));
        }

        // Stripe intents back the hosted payment page; PayPal orders are
        // captured client-side on that page without a server-side charge.
        let kind = ProviderKind::from_preferred_method(
            existing.preferred_payment_method.as_deref().or(Some("stripe")),
        )?;
        let payment_intent_id = match kind {
            ProviderKind::Stripe => {
                let provider = self.payments.provider(kind).await?;
                let intent = provider
                    .create_payment_intent(
                        existing.total_cents,
                        &existing.currency,
                        &existing.order_number,
                    )
                    .await?;
                Some(intent.id)
            }
            ProviderKind::PayPal => None,
        };

        let url = format!("{}/checkout/pay/{}", self.storefront_url, existing.order_number);
        let order_number = existing.order_number.clone();
        let email_address = existing.email.clone();
        let already_sent = existing.status == OrderStatus::PaymentLinkSent;

        let mut active_model: order::ActiveModel = existing.into();
        if let Some(intent_id) = &payment_intent_id {
            active_model.payment_intent_id = Set(Some(intent_id.clone()));
        }
        if !already_sent {
            active_model.status = Set(OrderStatus::PaymentLinkSent);
        }
        active_model.updated_at = Set(Some(Utc::now()));
        active_model.update(&*self.db).await?;

        if let Err(e) = self
            .email
            .send_payment_link(&email_address, &order_number, &url)
            .await
        {
            warn!(order_id = %id, "payment link email failed: {}", e);
        }

        self.event_sender
            .send(Event::PaymentLinkSent {
                order_id: id,
                email: email_address,
            })
            .await;

        Ok(PaymentLinkResult {
            url,
            payment_intent_id,
        })
    }

    /// Stores the provider charge handle created at checkout.
    pub async fn record_payment_intent(
        &self,
        id: Uuid,
        payment_intent_id: &str,
    ) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        let mut active_model: order::ActiveModel = existing.into();
        active_model.payment_intent_id = Set(Some(payment_intent_id.to_string()));
        active_model.updated_at = Set(Some(Utc::now()));
        active_model.update(&*self.db).await?;
        Ok(())
    }

    /// Webhook entry point: marks the order behind a payment intent as
    /// paid, upserts the customer record, and sends the confirmation
    /// email best-effort.
    #[instrument(skip(self))]
    pub async fn mark_paid_by_payment_intent(
        &self,
        payment_intent_id: &str,
        charge_id: Option<&str>,
    ) -> Result<order::Model, ServiceError> {
        let existing = order::Entity::find()
            .filter(order::Column::PaymentIntentId.eq(payment_intent_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No order for payment intent {}",
                    payment_intent_id
                ))
            })?;

        let old_status = existing.status;
        if !old_status.can_transition_to(OrderStatus::Paid) {
            // Duplicate webhook deliveries land here; not an error.
            info!(order_id = %existing.id, "payment webhook ignored; order already {}", old_status.as_str());
            return Ok(existing);
        }

        let order_id = existing.id;
        let email_address = existing.email.clone();
        let customer_name = existing.customer_name.clone();
        let order_number = existing.order_number.clone();

        let mut active_model: order::ActiveModel = existing.into();
        active_model.status = Set(OrderStatus::Paid);
        active_model.payment_status = Set(PaymentStatus::Paid);
        if let Some(charge_id) = charge_id {
            active_model.charge_id = Set(Some(charge_id.to_string()));
        }
        active_model.updated_at = Set(Some(Utc::now()));
        let updated = active_model.update(&*self.db).await?;

        let (first_name, last_name) = split_name(customer_name.as_deref());
        if let Err(e) = self
            .customers
            .upsert(CustomerContact {
                email: email_address.clone(),
                first_name,
                last_name,
                ..Default::default()
            })
            .await
        {
            warn!(order_id = %order_id, "customer upsert failed: {}", e);
        }

        if let Err(e) = self
            .email
            .send_order_confirmation(&email_address, &order_number)
            .await
        {
            warn!(order_id = %order_id, "order confirmation email failed: {}", e);
        }

        self.event_sender
            .send(Event::OrderStatusChanged {
                order_id,
                old_status: old_status.as_str().to_string(),
                new_status: OrderStatus::Paid.as_str().to_string(),
            })
            .await;
        Ok(updated)
    }

    /// Applies a carrier webhook: stores the tracking number and, when
    /// the parcel is delivered, advances a paid order to fulfilled.
    #[instrument(skip(self))]
    pub async fn apply_parcel_update(
        &self,
        order_number: Option<&str>,
        tracking_number: Option<&str>,
        status_message: &str,
    ) -> Result<order::Model, ServiceError> {
        let existing = match order_number {
            Some(number) => self.get_by_order_number(number).await?,
            None => {
                let tracking = tracking_number.ok_or_else(|| {
                    ServiceError::ValidationError(
                        "Parcel update carries neither order number nor tracking number"
                            .to_string(),
                    )
                })?;
                order::Entity::find()
                    .filter(order::Column::TrackingNumber.eq(tracking))
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "No order for tracking number {}",
                            tracking
                        ))
                    })?
            }
        };

        let order_id = existing.id;
        let delivered = status_message.to_lowercase().contains("delivered");
        let can_fulfill = existing.status.can_transition_to(OrderStatus::Fulfilled);

        let mut active_model: order::ActiveModel = existing.into();
        if let Some(tracking) = tracking_number {
            active_model.tracking_number = Set(Some(tracking.to_string()));
        }
        if delivered && can_fulfill {
            active_model.status = Set(OrderStatus::Fulfilled);
        }
        active_model.updated_at = Set(Some(Utc::now()));
        let updated = active_model.update(&*self.db).await?;

        self.event_sender
            .send(Event::ParcelStatusChanged {
                order_id,
                tracking_number: tracking_number.map(String::from),
                status: status_message.to_string(),
                timestamp: Utc::now(),
            })
            .await;
        Ok(updated)
    }
}

fn generate_order_number(order_id: Uuid) -> String {
    format!(
        "ORD-{}",
        order_id.simple().to_string()[..6].to_uppercase()
    )
}

fn split_name(full: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(full) = full else {
        return (None, None);
    };
    let mut parts = full.trim().splitn(2, ' ');
    let first = parts.next().filter(|s| !s.is_empty()).map(String::from);
    let last = parts.next().filter(|s| !s.is_empty()).map(String::from);
    (first, last)
}

/// Validates a refund request and computes the resulting bookkeeping.
/// Pure; the provider call happens between this check and the update.
fn next_refund_state(
    total_cents: i64,
    refunded_cents: i64,
    amount_cents: i64,
) -> Result<(i64, PaymentStatus), ServiceError> {
    let remaining = total_cents - refunded_cents;
    if amount_cents <= 0 || amount_cents > remaining {
        return Err(ServiceError::ValidationError(
            "Invalid refund amount".to_string(),
        ));
    }
    let new_refunded = refunded_cents + amount_cents;
    let status = if new_refunded >= total_cents {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    };
    Ok((new_refunded, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_refund_reaches_refunded() {
        let (refunded, status) = next_refund_state(10000, 0, 10000).unwrap();
        assert_eq!(refunded, 10000);
        assert_eq!(status, PaymentStatus::Refunded);
    }

    #[test]
    fn partial_refund_reaches_partially_refunded() {
        let (refunded, status) = next_refund_state(10000, 0, 2500).unwrap();
        assert_eq!(refunded, 2500);
        assert_eq!(status, PaymentStatus::PartiallyRefunded);

        let (refunded, status) = next_refund_state(10000, 2500, 7500).unwrap();
        assert_eq!(refunded, 10000);
        assert_eq!(status, PaymentStatus::Refunded);
    }

    #[test]
    fn over_refund_and_non_positive_amounts_are_rejected() {
        assert!(next_refund_state(10000, 0, 10001).is_err());
        assert!(next_refund_state(10000, 0, 0).is_err());
        assert!(next_refund_state(10000, 0, -5).is_err());
        assert!(next_refund_state(10000, 10000, 1).is_err());
    }

    #[test]
    fn order_number_is_opaque_and_prefixed() {
        let id = Uuid::new_v4();
        let number = generate_order_number(id);
        assert!(number.starts_with("ORD-"));
        assert_eq!(number.len(), 10);
        assert!(number[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn name_splitting() {
        assert_eq!(
            split_name(Some("Ada Lovelace")),
            (Some("Ada".to_string()), Some("Lovelace".to_string()))
        );
        assert_eq!(split_name(Some("Prince")), (Some("Prince".to_string()), None));
        assert_eq!(split_name(None), (None, None));
    }
}
