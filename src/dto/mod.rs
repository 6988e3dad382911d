/// Health and banner payloads.
pub mod health;
/// Player profile projection.
pub mod player;
/// Rankings projections.
pub mod rankings;
/// Aggregate counters.
pub mod stats;
