//! The per-chain polling loop (cursor → batch → dispatch → advance).
//!
//! The cursor advance is the commit point: it runs only after every log in
//! the batch has been dispatched, so a crash mid-batch replays the same
//! blocks and the idempotent handlers converge.

use std::time::Duration;

use super::OrderBookIndexer;
use crate::domain::events::{decode_log, OrderBookEvent, RawLog};
use crate::infrastructure::persistence::entities::indexed_status::ORDER_BOOK_EVENT_INDEX;

/// Poll backoff when caught up or after an RPC failure.
pub const SLEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Blocks requested per eth_getLogs call.
pub const BATCH_SIZE: u64 = 100;

/// Blocks withheld from the head to ride out short reorgs. Deeper reorgs
/// are the reorg guard's job.
pub fn confirmation_depth(chain: &str) -> u64 {
    match chain {
        "eth" | "optimism" | "base" | "sepolia" | "polygon" => 8,
        _ => 8,
    }
}

/// Next inclusive block range to scan, or None while the cursor is inside
/// the confirmation window.
pub fn next_batch_range(cursor: u64, head: u64, depth: u64, batch: u64) -> Option<(u64, u64)> {
    let safe_head = head.saturating_sub(depth);
    if cursor > safe_head {
        return None;
    }
    Some((cursor, (cursor + batch).min(safe_head)))
}

impl OrderBookIndexer {
    pub(super) async fn sync_order_book_event_loop(&self) {
        let status = match self
            .repos
            .indexed_status
            .read(self.chain_id, ORDER_BOOK_EVENT_INDEX)
            .await
        {
            Ok(Some(status)) => status,
            Ok(None) => {
                tracing::error!(
                    chain = %self.chain,
                    "no indexed_status row for the orderbook sync loop"
                );
                return;
            }
            Err(e) => {
                tracing::error!(chain = %self.chain, error = %e, "failed to read sync cursor");
                return;
            }
        };

        let depth = confirmation_depth(&self.chain);
        let mut cursor = status.last_indexed_block as u64;

        loop {
            if self.is_shutdown() {
                tracing::info!(chain = %self.chain, "sync loop stopped");
                return;
            }

            let head = match self.chain_client.block_number().await {
                Ok(head) => head,
                Err(e) => {
                    tracing::error!(chain = %self.chain, error = %e, "failed to get head block");
                    if self.sleep_or_shutdown(SLEEP_INTERVAL).await {
                        return;
                    }
                    continue;
                }
            };

            let Some((from, mut to)) = next_batch_range(cursor, head, depth, BATCH_SIZE) else {
                if self.sleep_or_shutdown(SLEEP_INTERVAL).await {
                    return;
                }
                continue;
            };

            let logs = match self
                .chain_client
                .filter_logs(from, to, &[self.dex_address])
                .await
            {
                Ok(logs) => logs,
                Err(e) => {
                    tracing::error!(
                        chain = %self.chain,
                        error = %e,
                        start_block = from,
                        end_block = to,
                        "failed to filter logs"
                    );
                    if to > from {
                        // Narrow to a single block; some RPCs cap the
                        // response size rather than the range.
                        to = from;
                        tracing::warn!(chain = %self.chain, block = from, "retrying single block");
                        match self
                            .chain_client
                            .filter_logs(from, to, &[self.dex_address])
                            .await
                        {
                            Ok(logs) => logs,
                            Err(e) => {
                                tracing::error!(
                                    chain = %self.chain,
                                    error = %e,
                                    block = from,
                                    "single-block retry failed"
                                );
                                if self.sleep_or_shutdown(SLEEP_INTERVAL).await {
                                    return;
                                }
                                continue;
                            }
                        }
                    } else {
                        if self.sleep_or_shutdown(SLEEP_INTERVAL).await {
                            return;
                        }
                        continue;
                    }
                }
            };

            // Chain order as returned by the RPC: (block, log_index).
            for log in &logs {
                self.dispatch(log).await;
            }

            cursor = to + 1;
            if let Err(e) = self
                .repos
                .indexed_status
                .advance(self.chain_id, ORDER_BOOK_EVENT_INDEX, cursor as i64)
                .await
            {
                tracing::error!(chain = %self.chain, error = %e, "failed to advance sync cursor");
                return;
            }

            tracing::info!(
                chain = %self.chain,
                start_block = from,
                end_block = to,
                logs = logs.len(),
                "synced orderbook events"
            );
        }
    }

    /// Route one log to its handler. Handler failures are logged and the
    /// batch continues; a bad log must not poison its neighbours.
    pub(super) async fn dispatch(&self, log: &RawLog) {
        let event = match decode_log(log) {
            Ok(Some(event)) => event,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(
                    chain = %self.chain,
                    tx_hash = %log.tx_hash,
                    log_index = log.log_index,
                    error = %e,
                    "skipping undecodable log"
                );
                return;
            }
        };

        let result = match event {
            OrderBookEvent::Make(event) => self.handle_make(log, event).await,
            OrderBookEvent::Cancel(event) => self.handle_cancel(log, event).await,
            OrderBookEvent::Match(event) => self.handle_match(log, event).await,
            OrderBookEvent::Approval(event) => self.handle_approval(log, event).await,
        };

        if let Err(e) = result {
            tracing::error!(
                chain = %self.chain,
                tx_hash = %log.tx_hash,
                block_number = log.block_number,
                error = %e,
                "event handler failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_inside_the_confirmation_window() {
        // head 100, depth 8 -> safe head 92; cursor past it waits.
        assert_eq!(next_batch_range(93, 100, 8, 100), None);
        assert_eq!(next_batch_range(100, 100, 8, 100), None);
        // head shallower than the depth never yields a range.
        assert_eq!(next_batch_range(0, 5, 8, 100), None);
    }

    #[test]
    fn caps_the_batch_at_the_safe_head() {
        assert_eq!(next_batch_range(0, 1000, 8, 100), Some((0, 100)));
        assert_eq!(next_batch_range(900, 1000, 8, 100), Some((900, 992)));
        assert_eq!(next_batch_range(92, 100, 8, 100), Some((92, 92)));
    }

    #[test]
    fn ranges_are_inclusive_and_contiguous() {
        let (from, to) = next_batch_range(0, 1000, 8, 100).unwrap();
        let (next_from, _) = next_batch_range(to + 1, 1000, 8, 100).unwrap();
        assert_eq!(next_from, from + BATCH_SIZE + 1);
    }

    #[test]
    fn default_confirmation_depth_is_eight() {
        assert_eq!(confirmation_depth("eth"), 8);
        assert_eq!(confirmation_depth("sepolia"), 8);
        assert_eq!(confirmation_depth("somechain"), 8);
    }
}
