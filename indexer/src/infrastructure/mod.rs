pub mod chain;
pub mod kv;
pub mod persistence;
