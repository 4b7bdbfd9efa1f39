//! Order event channel
//!
//! Services that need to tell clients where to go next (e.g. to the order
//! confirmation screen after a successful placement) send an [`OrderEvent`]
//! through the sender handed to them at construction.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Follow-up signalled by order processing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    /// Order stored; the consumer should be taken to its confirmation
    Placed {
        order_id: Uuid,
        consumer_id: String,
        producer_id: String,
    },
    /// Placement failed; the consumer stays on checkout
    Rejected { consumer_id: String, reason: String },
}

pub type OrderEventSender = mpsc::Sender<OrderEvent>;

pub fn channel(buffer: usize) -> (OrderEventSender, mpsc::Receiver<OrderEvent>) {
    mpsc::channel(buffer.max(1))
}

/// Drain the channel until every sender is dropped
pub async fn dispatch(mut events: mpsc::Receiver<OrderEvent>) {
    while let Some(event) = events.recv().await {
        match &event {
            OrderEvent::Placed {
                order_id,
                consumer_id,
                producer_id,
            } => {
                tracing::info!(%order_id, %consumer_id, %producer_id, "Order placed");
            }
            OrderEvent::Rejected { consumer_id, reason } => {
                tracing::warn!(%consumer_id, %reason, "Order rejected");
            }
        }
    }
    tracing::debug!("Order event channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_delivered_in_order() {
        tokio_test::block_on(async {
            let (tx, mut rx) = channel(4);
            let order_id = Uuid::new_v4();
            tx.send(OrderEvent::Placed {
                order_id,
                consumer_id: "c1".to_string(),
                producer_id: "p1".to_string(),
            })
            .await
            .unwrap();
            tx.send(OrderEvent::Rejected {
                consumer_id: "c1".to_string(),
                reason: "Insufficient stock".to_string(),
            })
            .await
            .unwrap();
            drop(tx);

            assert!(matches!(rx.recv().await, Some(OrderEvent::Placed { order_id: id, .. }) if id == order_id));
            assert!(matches!(rx.recv().await, Some(OrderEvent::Rejected { .. })));
            assert_eq!(rx.recv().await, None);
        });
    }

    #[test]
    fn test_dispatch_ends_when_senders_dropped() {
        tokio_test::block_on(async {
            let (tx, rx) = channel(0);
            tx.send(OrderEvent::Rejected {
                consumer_id: "c1".to_string(),
                reason: "test".to_string(),
            })
            .await
            .unwrap();
            drop(tx);
            dispatch(rx).await;
        });
    }
}
