//! Recording gateway used by service tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::future::BoxFuture;
use std::sync::Mutex;

use super::gateway::{
    DmNotice, Gateway, PanelSnapshot, ResultAnnouncement, SideEffectError, SideEffectResult,
    TicketChannelRequest, TranscriptUpload,
};
use crate::state::tiers::{Mode, Tier};

/// Everything a [`RecordingGateway`] observed, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Panel render.
    Panel(PanelSnapshot),
    /// Direct message.
    Dm(String, DmNotice),
    /// Tier role swap.
    RoleSwap(String, Mode, Option<Tier>, Tier),
    /// Tier role clear.
    RoleClear(String),
    /// Ticket channel creation.
    ChannelCreated(TicketChannelRequest),
    /// Channel access grant.
    Granted(String, String),
    /// Channel deletion.
    ChannelDeleted(String),
    /// Public result announcement.
    Announced(u64, ResultAnnouncement),
    /// Transcript upload.
    Transcript(u64, String),
}

/// Gateway that records effects and can simulate delivery failures.
#[derive(Clone, Default)]
pub struct RecordingGateway {
    effects: Arc<Mutex<Vec<Effect>>>,
    next_channel: Arc<AtomicU64>,
    fail_dms: Arc<AtomicBool>,
    fail_channels: Arc<AtomicBool>,
}

impl RecordingGateway {
    /// Fresh gateway with no recorded effects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded effects.
    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    /// Count effects matching a predicate.
    pub fn count(&self, pred: impl Fn(&Effect) -> bool) -> usize {
        self.effects.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    /// Make every DM fail with `DmClosed`.
    pub fn fail_dms(&self) {
        self.fail_dms.store(true, Ordering::SeqCst);
    }

    /// Make channel creation fail.
    pub fn fail_channels(&self) {
        self.fail_channels.store(true, Ordering::SeqCst);
    }

    fn record(&self, effect: Effect) {
        self.effects.lock().unwrap().push(effect);
    }
}

impl Gateway for RecordingGateway {
    fn render_panel(&self, panel: PanelSnapshot) -> BoxFuture<'static, SideEffectResult<u64>> {
        let gateway = self.clone();
        Box::pin(async move {
            let id = panel.message_id.unwrap_or(900);
            gateway.record(Effect::Panel(panel));
            Ok(id)
        })
    }

    fn send_dm(
        &self,
        user_id: String,
        notice: DmNotice,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            if gateway.fail_dms.load(Ordering::SeqCst) {
                return Err(SideEffectError::DmClosed { user_id });
            }
            gateway.record(Effect::Dm(user_id, notice));
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
        let gateway = self.clone();
        Box::pin(async move {
            gateway.record(Effect::RoleSwap(user_id, mode, previous, new));
            Ok(())
        })
    }

    fn clear_tier_roles(&self, user_id: String) -> BoxFuture<'static, SideEffectResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            gateway.record(Effect::RoleClear(user_id));
            Ok(())
        })
    }

    fn create_ticket_channel(
        &self,
        request: TicketChannelRequest,
    ) -> BoxFuture<'static, SideEffectResult<String>> {
        let gateway = self.clone();
        Box::pin(async move {
            if gateway.fail_channels.load(Ordering::SeqCst) {
                return Err(SideEffectError::Transport {
                    message: "simulated channel failure".into(),
                });
            }
            let id = gateway.next_channel.fetch_add(1, Ordering::SeqCst) + 1;
            gateway.record(Effect::ChannelCreated(request));
            Ok(format!("chan-{id}"))
        })
    }

    fn grant_channel_access(
        &self,
        channel_id: String,
        user_id: String,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            gateway.record(Effect::Granted(channel_id, user_id));
            Ok(())
        })
    }

    fn delete_channel(&self, channel_id: String) -> BoxFuture<'static, SideEffectResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            gateway.record(Effect::ChannelDeleted(channel_id));
            Ok(())
        })
    }

    fn announce_result(
        &self,
        channel_id: u64,
        announcement: ResultAnnouncement,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            gateway.record(Effect::Announced(channel_id, announcement));
            Ok(())
        })
    }

    fn upload_transcript(
        &self,
        channel_id: u64,
        upload: TranscriptUpload,
    ) -> BoxFuture<'static, SideEffectResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            gateway.record(Effect::Transcript(channel_id, upload.file_name));
            Ok(())
        })
    }
}
