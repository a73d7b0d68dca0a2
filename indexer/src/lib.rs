//! Chain-side half of the openmart NFT marketplace backend.
//!
//! Turns on-chain OrderBook contract events into the canonical off-chain
//! order/activity database the API layer reads. One sync task and one
//! floor-maintenance task per chain; both are driven from `main.rs`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
