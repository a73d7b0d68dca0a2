//! Thread-safe membership set of tracked collection addresses.
//!
//! Seeded once at startup from collections whose sync flag is set; admin
//! writes may add or remove entries at runtime while the indexer only
//! reads. Addresses are lowercased on every boundary.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::infrastructure::persistence::repositories::CollectionRepository;
use crate::infrastructure::persistence::DbError;

#[derive(Default)]
pub struct CollectionFilter {
    set: RwLock<HashSet<String>>,
}

impl CollectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, element: &str) {
        self.set.write().unwrap().insert(element.to_lowercase());
    }

    pub fn remove(&self, element: &str) {
        self.set.write().unwrap().remove(&element.to_lowercase());
    }

    pub fn contains(&self, element: &str) -> bool {
        self.set.read().unwrap().contains(&element.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.set.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.read().unwrap().is_empty()
    }

    /// Load every sync-enabled collection for the chain. Called before the
    /// sync loop starts so no event is filtered against a half-empty set.
    pub async fn preload(
        &self,
        collections: &CollectionRepository,
        chain_id: i64,
    ) -> Result<(), DbError> {
        let addresses = collections.sync_enabled_addresses(chain_id).await?;
        for address in &addresses {
            self.add(address);
        }
        tracing::info!(count = addresses.len(), "preloaded tracked collections");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_case_insensitive() {
        let filter = CollectionFilter::new();
        filter.add("0xE7F1725E7734CE288F8367e1Bb143E90bb3F0512");
        assert!(filter.contains("0xe7f1725e7734ce288f8367e1bb143e90bb3f0512"));
        assert!(filter.contains("0xE7F1725E7734CE288F8367E1BB143E90BB3F0512"));
        assert!(!filter.contains("0x0000000000000000000000000000000000000001"));
    }

    #[test]
    fn remove_drops_membership() {
        let filter = CollectionFilter::new();
        filter.add("0xabc0000000000000000000000000000000000001");
        filter.remove("0xABC0000000000000000000000000000000000001");
        assert!(filter.is_empty());
    }

    #[test]
    fn concurrent_reads_do_not_block_each_other() {
        let filter = std::sync::Arc::new(CollectionFilter::new());
        filter.add("0xabc0000000000000000000000000000000000001");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let filter = filter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        assert!(filter.contains("0xabc0000000000000000000000000000000000001"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
