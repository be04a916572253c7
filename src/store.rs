//! Application state owned by the window controller.
//!
//! Everything here is plain data mutated from the UI thread only; network
//! results arrive as [`SyncUpdate`]/[`AnalysisUpdate`] values and are folded
//! in by [`AppState::apply_sync`] and [`AppState::apply_analysis`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::events::{AnalysisUpdate, SyncUpdate};
use crate::api::models::{Conversation, ConversationId, Message, Sender};

pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "您好，请问有什么可以帮您的？",
    "稍等，我正在为您查询。",
    "很高兴为您服务。",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    /// Suggestions are shown, the operator decides.
    #[default]
    Copilot,
    /// The first fresh suggestion is sent right away.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Connecting,
    Ok,
    Error,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Connecting => "Connecting…",
            SyncStatus::Ok => "Connected",
            SyncStatus::Error => "Connection failed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    items: Vec<Conversation>,
}

impl ConversationStore {
    pub fn new(items: Vec<Conversation>) -> Self {
        Self { items }
    }

    /// The fixed contact list shown until a contacts service exists.
    pub fn demo() -> Self {
        let entry = |id, name: &str, seed: &str, last: &str, time: &str, unread| Conversation {
            id: ConversationId(id),
            name: name.to_string(),
            avatar: format!("https://i.pravatar.cc/40?u={seed}"),
            last_message: last.to_string(),
            time: time.to_string(),
            unread,
        };
        Self::new(vec![
            entry(1, "张三", "a042581f4e29026704d", "好的，明天见！", "14:23", 2),
            entry(2, "李四", "a042581f4e29026705d", "这个需求我们评估一下。", "14:20", 0),
            entry(3, "产品-王五", "a042581f4e29026706d", "[文件] 新版UI设计稿.zip", "13:55", 1),
            entry(4, "技术支持-赵六", "a042581f4e29026707d", "你那边现在能复现吗？", "13:40", 0),
            entry(5, "市场部-周七", "a042581f4e29026708d", "活动下周上线，请周知。", "11:10", 0),
        ])
    }

    pub fn all(&self) -> &[Conversation] {
        &self.items
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn position(&self, id: ConversationId) -> Option<usize> {
        self.items.iter().position(|c| c.id == id)
    }

    pub fn first_id(&self) -> Option<ConversationId> {
        self.items.first().map(|c| c.id)
    }
}

/// Per-conversation message sequences. Keys appear on first sync or send.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: HashMap<ConversationId, Vec<Message>>,
}

impl MessageLog {
    pub fn get(&self, id: ConversationId) -> &[Message] {
        self.entries.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: ConversationId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn last(&self, id: ConversationId) -> Option<&Message> {
        self.get(id).last()
    }

    pub fn append(&mut self, id: ConversationId, message: Message) {
        self.entries.entry(id).or_default().push(message);
    }

    /// Swap in an authoritative sequence, returning what was there before.
    pub fn replace(&mut self, id: ConversationId, messages: Vec<Message>) -> Vec<Message> {
        self.entries.insert(id, messages).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSet(Vec<String>);

impl SuggestionSet {
    pub fn fallback() -> Self {
        Self(FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect())
    }

    pub fn replace(&mut self, suggestions: Vec<String>) {
        self.0 = suggestions;
    }

    pub fn reset_to_fallback(&mut self) {
        *self = Self::fallback();
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

impl Default for SuggestionSet {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Returns the fetched tail message when it is an inbound message the
/// previous sequence did not end with.
///
/// Compares content only, so two identical texts in a row count once.
pub fn detect_new_inbound<'a>(previous: &[Message], fetched: &'a [Message]) -> Option<&'a Message> {
    let incoming = fetched.last()?;
    if incoming.sender != Sender::Them {
        return None;
    }
    match previous.last() {
        Some(known) if known.content == incoming.content => None,
        _ => Some(incoming),
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    conversations: ConversationStore,
    active: Option<ConversationId>,
    log: MessageLog,
    suggestions: SuggestionSet,
    status: SyncStatus,
    compose: String,
    mode: AiMode,
    applied: HashMap<ConversationId, u64>,
    /// Inbound content each conversation's last auto reply answered.
    answered: HashMap<ConversationId, String>,
}

impl AppState {
    pub fn new(conversations: ConversationStore, mode: AiMode) -> Self {
        let active = conversations.first_id();
        Self {
            conversations,
            active,
            log: MessageLog::default(),
            suggestions: SuggestionSet::default(),
            status: SyncStatus::Connecting,
            compose: String::new(),
            mode,
            applied: HashMap::new(),
            answered: HashMap::new(),
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn active(&self) -> Option<ConversationId> {
        self.active
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active.and_then(|id| self.conversations.get(id))
    }

    pub fn messages(&self, id: ConversationId) -> &[Message] {
        self.log.get(id)
    }

    pub fn active_messages(&self) -> &[Message] {
        self.active.map(|id| self.log.get(id)).unwrap_or(&[])
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn suggestions(&self) -> &SuggestionSet {
        &self.suggestions
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn compose(&self) -> &str {
        &self.compose
    }

    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    pub fn can_send(&self) -> bool {
        self.active.is_some() && !self.compose.trim().is_empty()
    }

    pub fn mode(&self) -> AiMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AiMode) {
        self.mode = mode;
    }

    /// Returns `true` when the active conversation actually changed.
    pub fn select_conversation(&mut self, id: ConversationId) -> bool {
        if self.conversations.get(id).is_none() {
            log::warn!("Ignoring selection of unknown conversation {id}");
            return false;
        }
        if self.active == Some(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Local echo of the compose text into the active conversation.
    pub fn send(&mut self) -> Option<Message> {
        if !self.can_send() {
            return None;
        }
        let active = self.active?;
        let message = Message::outgoing(std::mem::take(&mut self.compose), crate::utils::now_clock());
        self.log.append(active, message.clone());
        Some(message)
    }

    pub fn pick_suggestion(&mut self, index: usize) -> bool {
        match self.suggestions.get(index) {
            Some(text) => {
                self.compose = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Message to analyze on a manual refresh: the newest one in the active
    /// conversation, whoever sent it.
    pub fn refresh_target(&self) -> Option<Message> {
        self.active.and_then(|id| self.log.last(id)).cloned()
    }

    /// Fold one sync result in. Returns the message that should trigger a
    /// suggestion refresh, if any.
    pub fn apply_sync(&mut self, update: SyncUpdate) -> Option<Message> {
        let SyncUpdate { conversation, seq, outcome } = update;
        if let Some(&applied) = self.applied.get(&conversation) {
            if seq <= applied {
                log::debug!("Dropping superseded sync #{seq} for conversation {conversation} (applied #{applied})");
                return None;
            }
        }
        self.applied.insert(conversation, seq);

        match outcome {
            Ok(fetched) => {
                self.status = SyncStatus::Ok;
                let answered = fetched.last().is_some_and(|tail| self.already_answered(conversation, tail));
                if !answered {
                    self.answered.remove(&conversation);
                }
                let trigger = detect_new_inbound(self.log.get(conversation), &fetched)
                    .filter(|_| !answered)
                    .cloned();
                if answered {
                    log::debug!("Conversation {conversation} still ends with an auto-answered message");
                }
                self.log.replace(conversation, fetched);
                if self.active != Some(conversation) {
                    log::debug!("Sync #{seq} landed on inactive conversation {conversation}");
                    return None;
                }
                trigger
            }
            Err(e) => {
                self.status = SyncStatus::Error;
                log::warn!("Sync #{seq} for conversation {conversation} failed: {e}");
                None
            }
        }
    }

    fn already_answered(&self, conversation: ConversationId, incoming: &Message) -> bool {
        incoming.sender == Sender::Them
            && self.answered.get(&conversation).is_some_and(|content| *content == incoming.content)
    }

    /// Replace suggestions wholesale, or fall back on any failure. In auto
    /// mode a fresh first suggestion is sent and returned, but only into the
    /// conversation that triggered the analysis and only while it is active.
    pub fn apply_analysis(&mut self, update: AnalysisUpdate) -> Option<Message> {
        let AnalysisUpdate { conversation, trigger, outcome } = update;
        match outcome {
            Ok(suggestions) => {
                self.suggestions.replace(suggestions);
                if self.mode != AiMode::Auto {
                    return None;
                }
                if self.active != Some(conversation) {
                    log::info!("Not auto-replying: conversation {conversation} is no longer active");
                    return None;
                }
                let reply = self.suggestions.get(0).filter(|s| !s.trim().is_empty())?.to_string();
                let message = Message::outgoing(reply, crate::utils::now_clock());
                log::info!("Auto-replying in conversation {conversation}");
                self.log.append(conversation, message.clone());
                self.answered.insert(conversation, trigger);
                Some(message)
            }
            Err(e) => {
                log::warn!("Analysis of {trigger:?} failed, using fallback suggestions: {e}");
                self.suggestions.reset_to_fallback();
                None
            }
        }
    }
}
