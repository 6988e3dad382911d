/// Persisted document model definitions.
pub mod models;
/// Storage abstraction layer shared by every backend.
pub mod storage;
/// Tier document storage and retrieval operations.
pub mod tier_store;
