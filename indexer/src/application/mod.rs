pub mod collection_filter;
pub mod indexer;
