use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::client::ApiClient;
use crate::api::events::AppEvent;
use crate::api::models::{ConversationId, Message};
use crate::config::Settings;
use crate::error::ApiError;
use crate::store::{AiMode, AppState, ConversationStore};
use crate::suggest::SuggestionEngine;
use crate::sync::{RequestSequence, SyncHandle, SyncLoop};

/// Ties the application state to the background sync loop and the
/// suggestion proxy. Lives on the UI thread; background results come back
/// through the receiver returned by [`Session::new`] and must be fed to
/// [`Session::handle_event`].
pub struct Session {
    state: AppState,
    client: ApiClient,
    engine: SuggestionEngine,
    sequence: RequestSequence,
    period: Duration,
    runtime: Handle,
    events: UnboundedSender<AppEvent>,
    sync: Option<SyncHandle>,
}

impl Session {
    pub fn new(
        settings: &Settings,
        conversations: ConversationStore,
        runtime: Handle,
    ) -> Result<(Self, UnboundedReceiver<AppEvent>), ApiError> {
        let client = ApiClient::new(&settings.base_url, settings.request_timeout())?;
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            state: AppState::new(conversations, settings.ai_mode),
            engine: SuggestionEngine::new(client.clone(), events.clone()),
            client,
            sequence: RequestSequence::default(),
            period: settings.poll_interval(),
            runtime,
            events,
            sync: None,
        };
        Ok((session, rx))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Conversation the running sync loop is bound to.
    pub fn syncing(&self) -> Option<ConversationId> {
        self.sync.as_ref().map(SyncHandle::conversation)
    }

    pub fn start(&mut self) {
        self.restart_sync();
    }

    /// Stop polling. In-flight responses still arrive and are applied to
    /// the conversation they were issued for.
    pub fn shutdown(&mut self) {
        if let Some(old) = self.sync.take() {
            old.cancel();
        }
    }

    fn restart_sync(&mut self) {
        self.shutdown();
        let Some(active) = self.state.active() else {
            log::warn!("No conversation to sync");
            return;
        };
        let sync_loop = SyncLoop::new(
            self.client.clone(),
            active,
            self.period,
            self.sequence.clone(),
            self.events.clone(),
        );
        self.sync = Some(sync_loop.spawn(&self.runtime));
    }

    pub fn select_conversation(&mut self, id: ConversationId) -> bool {
        if !self.state.select_conversation(id) {
            return false;
        }
        log::info!("Switched to conversation {id}");
        self.restart_sync();
        true
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.state.set_compose(text);
    }

    pub fn send(&mut self) -> Option<Message> {
        self.state.send()
    }

    pub fn pick_suggestion(&mut self, index: usize) -> bool {
        self.state.pick_suggestion(index)
    }

    pub fn set_mode(&mut self, mode: AiMode) {
        if self.state.mode() != mode {
            log::info!("AI mode set to {mode:?}");
        }
        self.state.set_mode(mode);
    }

    /// Re-analyze the newest message of the active conversation.
    pub fn refresh_suggestions(&mut self) -> bool {
        match (self.state.active(), self.state.refresh_target()) {
            (Some(active), Some(latest)) => {
                self.engine.request(&self.runtime, active, &latest.content);
                true
            }
            _ => {
                log::info!("Nothing to analyze in the active conversation");
                false
            }
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Synced(update) => {
                let conversation = update.conversation;
                if let Some(trigger) = self.state.apply_sync(update) {
                    self.engine.request(&self.runtime, conversation, &trigger.content);
                }
            }
            AppEvent::Analyzed(update) => {
                self.state.apply_analysis(update);
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
