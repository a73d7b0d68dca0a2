//! Message contracts on the cross-process queues consumed by the external
//! order manager. The producer never blocks; the consumer owns the
//! message lifecycle.

use serde::{Deserialize, Serialize};

use super::{KvError, KvStore};

/// Queue of trade events driving downstream price recomputation.
fn update_price_key(chain: &str) -> String {
    format!("update_price_event:{chain}")
}

/// Queue of fresh orders handed to the expiry tracker.
fn order_expiry_key(chain: &str) -> String {
    format!("order_manager_queue:{chain}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeEventKind {
    Buy,
    Cancel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    pub event_type: TradeEventKind,
    pub order_id: String,
    pub collection_address: String,
    pub token_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderExpiryMessage {
    pub order_id: String,
    pub expire_time: i64,
    pub collection_address: String,
    pub token_id: String,
    pub price: String,
    pub maker: String,
}

pub async fn push_update_price_event(
    kv: &dyn KvStore,
    event: &TradeEvent,
    chain: &str,
) -> Result<(), KvError> {
    let payload = serde_json::to_string(event)?;
    kv.rpush(&update_price_key(chain), &payload).await
}

pub async fn push_order_expiry(
    kv: &dyn KvStore,
    message: &OrderExpiryMessage,
    chain: &str,
) -> Result<(), KvError> {
    let payload = serde_json::to_string(message)?;
    kv.rpush(&order_expiry_key(chain), &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::kv::MemoryStore;

    #[tokio::test]
    async fn trade_events_land_on_the_chain_queue() {
        let store = MemoryStore::new();
        let event = TradeEvent {
            event_type: TradeEventKind::Buy,
            order_id: "0x01".into(),
            collection_address: "0xc".into(),
            token_id: "7".into(),
            from: Some("0xa".into()),
            to: Some("0xb".into()),
        };

        push_update_price_event(&store, &event, "eth").await.unwrap();

        let queued = store.list("update_price_event:eth");
        assert_eq!(queued.len(), 1);
        let round: TradeEvent = serde_json::from_str(&queued[0]).unwrap();
        assert_eq!(round.event_type, TradeEventKind::Buy);
        assert_eq!(round.order_id, "0x01");
    }

    #[tokio::test]
    async fn cancel_events_omit_transfer_parties() {
        let store = MemoryStore::new();
        let event = TradeEvent {
            event_type: TradeEventKind::Cancel,
            order_id: "0x02".into(),
            collection_address: "0xc".into(),
            token_id: "7".into(),
            from: None,
            to: None,
        };

        push_update_price_event(&store, &event, "sepolia")
            .await
            .unwrap();

        let queued = store.list("update_price_event:sepolia");
        assert!(!queued[0].contains("\"from\""));
        assert!(!queued[0].contains("\"to\""));
    }

    #[tokio::test]
    async fn expiry_messages_land_on_the_order_manager_queue() {
        let store = MemoryStore::new();
        let message = OrderExpiryMessage {
            order_id: "0x03".into(),
            expire_time: 1_700_300_637,
            collection_address: "0xc".into(),
            token_id: "9".into(),
            price: "1000000000000000000".into(),
            maker: "0xa".into(),
        };

        push_order_expiry(&store, &message, "eth").await.unwrap();
        assert_eq!(store.list("order_manager_queue:eth").len(), 1);
    }
}
