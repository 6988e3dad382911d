//! Gateway trait plus the typed payloads crossing the platform boundary.

use futures::future::BoxFuture;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::dao::models::BanReason;
use crate::state::tiers::{Mode, Tier};

/// Result alias for side-effect delivery.
pub type SideEffectResult<T> = Result<T, SideEffectError>;

/// Typed outcome of a failed side effect.
#[derive(Debug, Error)]
pub enum SideEffectError {
    /// The user does not accept direct messages.
    #[error("user {user_id} has DMs closed")]
    DmClosed {
        /// Target user id.
        user_id: String,
    },
    /// A referenced role does not exist in the guild.
    #[error("role for {tier} {mode} is missing")]
    RoleMissing {
        /// Mode whose role was looked up.
        mode: Mode,
        /// Tier whose role was looked up.
        tier: Tier,
    },
    /// A referenced channel or message no longer exists.
    #[error("channel or message {id} is gone")]
    TargetGone {
        /// Channel or message id.
        id: String,
    },
    /// The gateway implementation does not support this operation.
    #[error("operation `{operation}` is not supported by this gateway")]
    Unsupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
    /// Any other transport failure.
    #[error("platform transport error: {message}")]
    Transport {
        /// Description from the underlying SDK.
        message: String,
    },
}

/// Direct-message notices the workflow sends to members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmNotice {
    /// The player was pulled from a queue into a ticket.
    Pulled {
        /// Mode being tested.
        mode: Mode,
        /// Ticket channel the player was granted access to, when one could
        /// be opened.
        channel_id: Option<String>,
    },
    /// A test result was recorded for the player.
    ResultRecorded {
        /// Tested mode.
        mode: Mode,
        /// Awarded tier.
        tier: Tier,
        /// Points the tier is worth.
        points: u32,
        /// New total across all modes.
        total: u32,
    },
    /// A cooldown expired, the player may queue again.
    CooldownExpired {
        /// Mode that reopened.
        mode: Mode,
    },
    /// Staff cleared one or more cooldowns early.
    CooldownCleared {
        /// Modes that were cleared.
        modes: Vec<Mode>,
    },
    /// The player was banned from the tierlist.
    Banned {
        /// Reason for the ban.
        reason: BanReason,
        /// `None` for permanent bans.
        ends_at: Option<OffsetDateTime>,
    },
    /// A temporary ban expired.
    BanLifted,
}

/// Everything needed to render one mode's waitlist panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    /// Mode the panel belongs to.
    pub mode: Mode,
    /// Whether the queue is open.
    pub active: bool,
    /// Queued player ids in FIFO order.
    pub queue: Vec<String>,
    /// On-duty tester ids.
    pub testers: Vec<String>,
    /// Existing panel message to edit, `None` to post a fresh one.
    pub message_id: Option<u64>,
}

/// Request to open a private ticket channel for one test session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketChannelRequest {
    /// Category under which the channel is created.
    pub category_id: u64,
    /// Mode being tested, used in the channel name.
    pub mode: Mode,
    /// Player granted access.
    pub player_id: String,
    /// Tester granted access.
    pub tester_id: String,
}

/// Public announcement published after a recorded result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultAnnouncement {
    /// Tested player's nickname.
    pub nick_mc: String,
    /// Tested player's id, for the mention.
    pub player_id: String,
    /// Tested mode.
    pub mode: Mode,
    /// Tier before the test, `None` for a first test.
    pub previous_tier: Option<Tier>,
    /// Awarded tier.
    pub new_tier: Tier,
    /// New total points.
    pub total_points: u32,
}

/// Rendered transcript attached to a closed-ticket summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptUpload {
    /// Suggested attachment file name.
    pub file_name: String,
    /// Gzipped transcript bytes.
    pub bytes: Vec<u8>,
    /// Summary line accompanying the upload.
    pub summary: String,
}

/// Chat-platform operations the workflow depends on.
///
/// Implementations live outside this crate; [`NullGateway`] stands in for
/// deployments that only serve the read API.
pub trait Gateway: Send + Sync {
    /// Render (post or edit) a mode's waitlist panel, returning its message id.
    fn render_panel(&self, panel: PanelSnapshot) -> BoxFuture<'static, SideEffectResult<u64>>;
    /// Send a direct message to a member.
    fn send_dm(&self, user_id: String, notice: DmNotice)
    -> BoxFuture<'static, SideEffectResult<()>>;
    /// Replace a member's tier role in one mode.
    fn swap_tier_role(
        &self,
        user_id: String,
        mode: Mode,
        previous: Option<Tier>,
        new: Tier,
    ) -> BoxFuture<'static, SideEffectResult<()>>;
    /// Strip every tier role from a member (used on bans).
    fn clear_tier_roles(&self, user_id: String) -> BoxFuture<'static, SideEffectResult<()>>;
    /// Create a private ticket channel, returning its channel id.
    fn create_ticket_channel(
        &self,
        request: TicketChannelRequest,
    ) -> BoxFuture<'static, SideEffectResult<String>>;
    /// Grant a member access to an existing ticket channel.
    fn grant_channel_access(
        &self,
        channel_id: String,
        user_id: String,
    ) -> BoxFuture<'static, SideEffectResult<()>>;
    /// Delete a ticket channel after the close grace delay.
    fn delete_channel(&self, channel_id: String) -> BoxFuture<'static, SideEffectResult<()>>;
    /// Publish a result announcement to the configured channel.
    fn announce_result(
        &self,
        channel_id: u64,
        announcement: ResultAnnouncement,
    ) -> BoxFuture<'static, SideEffectResult<()>>;
    /// Upload a transcript to the ticket-logs channel.
    fn upload_transcript(
        &self,
        channel_id: u64,
        upload: TranscriptUpload,
    ) -> BoxFuture<'static, SideEffectResult<()>>;
}

/// Gateway for deployments without a chat connection.
///
/// Fire-and-forget effects are logged at debug and reported delivered;
/// effects whose result the workflow needs (channel creation, panel posting)
/// report [`SideEffectError::Unsupported`].
#[derive(Debug, Clone, Default)]
pub struct NullGateway;

impl Gateway for NullGateway {
    fn render_panel(&self, panel: PanelSnapshot) -> BoxFuture<'static, SideEffectResult<u64>> {
        Box::pin(async move {
            debug!(mode = %panel.mode, queued = panel.queue.len(), "panel render skipped");
            match panel.message_id {
                Some(id) => Ok(id),
                None => Err(SideEffectError::Unsupported {
                    operation: "render_panel",
                }),
            }
        })
    }

    fn send_dm(
        &self,
        user_id: String,
        notice: DmNotice,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        Box::pin(async move {
            debug!(user_id, ?notice, "dm skipped");
            Ok(())
        })
    }

    fn swap_tier_role(
        &self,
        user_id: String,
        mode: Mode,
        previous: Option<Tier>,
        new: Tier,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        Box::pin(async move {
            debug!(user_id, %mode, ?previous, %new, "role swap skipped");
            Ok(())
        })
    }

    fn clear_tier_roles(&self, user_id: String) -> BoxFuture<'static, SideEffectResult<()>> {
        Box::pin(async move {
            debug!(user_id, "role clear skipped");
            Ok(())
        })
    }

    fn create_ticket_channel(
        &self,
        request: TicketChannelRequest,
    ) -> BoxFuture<'static, SideEffectResult<String>> {
        Box::pin(async move {
            debug!(mode = %request.mode, player = request.player_id, "ticket channel unavailable");
            Err(SideEffectError::Unsupported {
                operation: "create_ticket_channel",
            })
        })
    }

    fn grant_channel_access(
        &self,
        channel_id: String,
        user_id: String,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        Box::pin(async move {
            debug!(channel_id, user_id, "channel grant skipped");
            Ok(())
        })
    }

    fn delete_channel(&self, channel_id: String) -> BoxFuture<'static, SideEffectResult<()>> {
        Box::pin(async move {
            debug!(channel_id, "channel delete skipped");
            Ok(())
        })
    }

    fn announce_result(
        &self,
        channel_id: u64,
        announcement: ResultAnnouncement,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        Box::pin(async move {
            debug!(channel_id, nick = announcement.nick_mc, "announcement skipped");
            Ok(())
        })
    }

    fn upload_transcript(
        &self,
        channel_id: u64,
        upload: TranscriptUpload,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        Box::pin(async move {
            debug!(channel_id, file = upload.file_name, "transcript upload skipped");
            Ok(())
        })
    }
}
