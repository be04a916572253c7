use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::client::ApiClient;
use crate::api::events::{AppEvent, SyncUpdate};
use crate::api::models::ConversationId;

/// Monotonic request numbering shared by every sync loop of a session, so
/// superseded responses can be told apart from fresh ones.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence(Arc<AtomicU64>);

impl RequestSequence {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Polls the backend on a fixed period on behalf of one conversation.
pub struct SyncLoop {
    client: ApiClient,
    conversation: ConversationId,
    period: Duration,
    sequence: RequestSequence,
    events: UnboundedSender<AppEvent>,
}

/// Owning handle of a running loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct SyncHandle {
    conversation: ConversationId,
    cancel: CancellationToken,
}

impl SyncHandle {
    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SyncLoop {
    pub fn new(
        client: ApiClient,
        conversation: ConversationId,
        period: Duration,
        sequence: RequestSequence,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self { client, conversation, period, sequence, events }
    }

    pub fn spawn(self, runtime: &Handle) -> SyncHandle {
        let cancel = CancellationToken::new();
        let handle = SyncHandle { conversation: self.conversation, cancel: cancel.clone() };
        runtime.spawn(self.run(cancel));
        handle
    }

    async fn run(self, cancel: CancellationToken) {
        log::info!("Sync loop started for conversation {} every {:?}", self.conversation, self.period);
        // First poll fires one period after start.
        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.poll_once(),
            }
        }
        log::info!("Sync loop stopped for conversation {}", self.conversation);
    }

    /// Fire one request without waiting for it; slow responses overlap with
    /// later ticks and are ordered by `seq` when applied.
    fn poll_once(&self) {
        let seq = self.sequence.next();
        let conversation = self.conversation;
        let client = self.client.clone();
        let events = self.events.clone();
        log::debug!("Sync #{seq} for conversation {conversation}");
        tokio::spawn(async move {
            let outcome = client.sync_messages().await;
            if events.send(AppEvent::Synced(SyncUpdate { conversation, seq, outcome })).is_err() {
                log::debug!("Sync #{seq} finished after the receiver went away");
            }
        });
    }
}
