//! Boundary to the chat platform.
//!
//! Every side effect the workflow produces (panel renders, DMs, roles,
//! channels, announcements) crosses this trait so the core never links the
//! chat SDK. Side-effect failures are logged and swallowed; the workflow
//! always makes forward progress over delivery.

mod gateway;
#[cfg(test)]
pub mod recording;

pub use gateway::{
    DmNotice, Gateway, NullGateway, PanelSnapshot, ResultAnnouncement, SideEffectError,
    SideEffectResult, TicketChannelRequest, TranscriptUpload,
};

use futures::future::BoxFuture;
use tracing::warn;

use crate::error::ServiceError;

/// Identity and capabilities of the member invoking an operation.
///
/// Capabilities are resolved from platform roles before the call reaches the
/// services, which only ever check these booleans.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Platform user id.
    pub id: String,
    /// Display name, recorded in results and transcripts.
    pub display_name: String,
    /// Holds the tester role.
    pub tester: bool,
    /// Holds the staff role.
    pub staff: bool,
    /// Holds the admin role.
    pub admin: bool,
}

impl Actor {
    /// A plain member with no elevated capability.
    pub fn member(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            tester: false,
            staff: false,
            admin: false,
        }
    }

    /// Grant the tester capability.
    pub fn as_tester(mut self) -> Self {
        self.tester = true;
        self
    }

    /// Grant the staff capability.
    pub fn as_staff(mut self) -> Self {
        self.staff = true;
        self
    }

    /// Grant the admin capability (implies staff).
    pub fn as_admin(mut self) -> Self {
        self.staff = true;
        self.admin = true;
        self
    }

    /// Fail unless the actor is a tester.
    pub fn require_tester(&self) -> Result<(), ServiceError> {
        if self.tester {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("tester role required".into()))
        }
    }

    /// Fail unless the actor is staff.
    pub fn require_staff(&self) -> Result<(), ServiceError> {
        if self.staff {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("staff role required".into()))
        }
    }

    /// Fail unless the actor is an admin.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.admin {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("admin role required".into()))
        }
    }
}

/// Await a fire-and-forget side effect, logging delivery failures.
///
/// The document mutation is already persisted by the time this runs, so a
/// failed delivery must never bubble up as an operation error.
pub async fn deliver(label: &'static str, effect: BoxFuture<'static, SideEffectResult<()>>) {
    if let Err(err) = effect.await {
        warn!(effect = label, error = %err, "side effect not delivered");
    }
}
