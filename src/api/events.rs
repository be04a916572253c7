use crate::api::models::{ConversationId, Message};
use crate::error::ApiError;

/// Result of one sync tick, tagged with the conversation it was issued for.
#[derive(Debug)]
pub struct SyncUpdate {
    pub conversation: ConversationId,
    pub seq: u64,
    pub outcome: Result<Vec<Message>, ApiError>,
}

/// Result of one analyze request, tagged with the conversation whose
/// message triggered it.
#[derive(Debug)]
pub struct AnalysisUpdate {
    pub conversation: ConversationId,
    pub trigger: String,
    pub outcome: Result<Vec<String>, ApiError>,
}

/// Events produced by background network tasks for the UI thread.
#[derive(Debug)]
pub enum AppEvent {
    Synced(SyncUpdate),
    Analyzed(AnalysisUpdate),
}
