//! 订单通知总线
//!
//! Broadcasts order lifecycle changes to in-process subscribers (kitchen
//! display, dashboard push). Publishing never blocks the checkout and
//! never fails it: with no subscriber the notification is dropped.

use serde::{Deserialize, Serialize};
use shared::order::OrderStatus;
use tokio::sync::broadcast;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderNotification {
    /// A checkout was persisted
    Created {
        checkout_id: String,
        ticket_number: String,
        order_numbers: Vec<String>,
    },
    /// Staff moved a cup to a new status
    StatusChanged {
        order_number: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

#[derive(Debug, Clone)]
pub struct OrderEventBus {
    tx: broadcast::Sender<OrderNotification>,
}

impl Default for OrderEventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl OrderEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 发布通知 (无订阅者时丢弃)
    pub fn publish(&self, notification: OrderNotification) {
        if let Err(e) = self.tx.send(notification) {
            tracing::debug!(notification = ?e.0, "No subscribers, notification dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderNotification> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
