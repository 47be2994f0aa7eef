use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by services. Consumed by a single logging
/// processor; handlers never block on event delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderRefunded {
        order_id: Uuid,
        amount_cents: i64,
        remaining_cents: i64,
    },
    PaymentLinkSent {
        order_id: Uuid,
        email: String,
    },
    PaymentIntentCreated {
        order_id: Uuid,
        provider: String,
    },
    DiscountRedeemed {
        code: String,
        order_id: Uuid,
        discount_cents: i64,
    },
    ParcelStatusChanged {
        order_id: Uuid,
        tracking_number: Option<String>,
        status: String,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. A full or closed channel is logged
    /// and dropped; event delivery never fails a request.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Runs as a spawned task
/// for the lifetime of the process.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "order created");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(order_id = %order_id, from = %old_status, to = %new_status, "order status changed");
            }
            Event::OrderRefunded {
                order_id,
                amount_cents,
                remaining_cents,
            } => {
                info!(order_id = %order_id, amount_cents, remaining_cents, "order refunded");
            }
            Event::PaymentLinkSent { order_id, email } => {
                info!(order_id = %order_id, email = %email, "payment link sent");
            }
            Event::PaymentIntentCreated { order_id, provider } => {
                info!(order_id = %order_id, provider = %provider, "payment intent created");
            }
            Event::DiscountRedeemed {
                code,
                order_id,
                discount_cents,
            } => {
                info!(code = %code, order_id = %order_id, discount_cents, "discount redeemed");
            }
            Event::ParcelStatusChanged {
                order_id, status, ..
            } => {
                info!(order_id = %order_id, status = %status, "parcel status changed");
            }
        }
    }
    info!("Event channel closed; event processor exiting");
}
