use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/health` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "error").
    pub status: String,
    /// Number of recorded tests, present when storage answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tests: Option<u64>,
    /// Set to "disconnected" when storage is unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl HealthResponse {
    /// Storage answered; report the result count.
    pub fn ok(total_tests: u64) -> Self {
        Self {
            status: "ok".to_string(),
            total_tests: Some(total_tests),
            database: None,
        }
    }

    /// Storage is unreachable.
    pub fn error() -> Self {
        Self {
            status: "error".to_string(),
            total_tests: None,
            database: Some("disconnected".to_string()),
        }
    }
}

/// Greeting returned by the root route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    /// Always "online".
    pub status: String,
    /// Service banner.
    pub message: String,
}

impl HomeResponse {
    /// The static banner payload.
    pub fn online() -> Self {
        Self {
            status: "online".to_string(),
            message: "Papayas Tierlist API".to_string(),
        }
    }
}
