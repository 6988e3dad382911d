//! Error taxonomy: domain errors raised by services and their HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{dao::storage::StorageError, state::tiers::Mode};

/// Errors that can occur in service layer operations.
///
/// The first group mirrors the outcomes surfaced to members interacting with
/// the queues; the rest covers permissions and infrastructure.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The waitlist for this mode is not accepting joins.
    #[error("the {0} waitlist is closed")]
    Closed(Mode),
    /// The player is still cooling down for this mode.
    #[error("on cooldown for {mode} until {until}")]
    OnCooldown {
        /// Mode the cooldown applies to.
        mode: Mode,
        /// RFC 3339 end of the cooldown window.
        until: String,
    },
    /// The player is already waiting in this mode's queue.
    #[error("already queued for {0}")]
    AlreadyQueued(Mode),
    /// The queue has reached its capacity.
    #[error("the {0} queue is full")]
    QueueFull(Mode),
    /// The player is not in this mode's queue.
    #[error("not queued for {0}")]
    NotQueued(Mode),
    /// A tester pulled from an empty queue.
    #[error("the {0} queue is empty")]
    EmptyQueue(Mode),
    /// A tester tried to pull without being on duty.
    #[error("not on duty for {0}")]
    NotOnDuty(Mode),
    /// The invoker lacks the capability the operation requires.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Storage backend rejected the write that would commit the operation.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The invoker lacks permission.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found. The message is the wire body, so no
    /// prefix here.
    #[error("{0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Closed(_)
            | ServiceError::AlreadyQueued(_)
            | ServiceError::QueueFull(_)
            | ServiceError::NotQueued(_)
            | ServiceError::EmptyQueue(_)
            | ServiceError::NotOnDuty(_)
            | ServiceError::OnCooldown { .. } => AppError::Conflict(err.to_string()),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            error: self.to_string(),
        });

        (status, payload).into_response()
    }
}
