//! Order status changes.
//!
//! Any status may follow any other. The only invariant is that the stored
//! value is one of the five `OrderStatus` labels.

use super::db::DbHandle;
use super::models::{Order, OrderStatus, SenderType};
use crate::errors::HugError;

/// Status an order moves to when a reply from `sender` is appended.
pub fn status_after_reply(sender: SenderType) -> OrderStatus {
    match sender {
        SenderType::Admin => OrderStatus::Replied,
        SenderType::Client => OrderStatus::ClientReplied,
    }
}

pub fn parse_status(value: &str) -> Result<OrderStatus, HugError> {
    value
        .trim()
        .parse::<OrderStatus>()
        .map_err(|e| HugError::invalid("status", e))
}

/// Overwrite an order's status (last write wins) and return the order.
pub async fn update_status(db: &DbHandle, order_id: &str, target: &str) -> Result<Order, HugError> {
    let status = parse_status(target)?;
    let id = order_id.to_string();
    let updated = db
        .call(move |db| db.update_order_status(&id, status))
        .await
        .map_err(HugError::Store)?;
    match updated {
        Some(order) => {
            tracing::info!(order_id = %order.id, status = %order.status, "order status updated");
            Ok(order)
        }
        None => Err(HugError::OrderNotFound {
            id: order_id.to_string(),
        }),
    }
}
