/// Guild configuration and data export.
pub mod admin_service;
/// Ban issuance, expiry, and overview.
pub mod ban_service;
/// Per-player, per-mode cooldown ledger.
pub mod cooldown_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Read-side projections for the public API.
pub mod ranking_service;
/// Test result recording and tester leaderboards.
pub mod result_service;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;
/// Hourly expiry sweeps.
pub mod sweeper;
/// Ticket lifecycle and transcripts.
pub mod ticket_service;
/// Transcript rendering and compression.
pub mod transcript;
/// Per-mode waitlist queues.
pub mod waitlist_service;
