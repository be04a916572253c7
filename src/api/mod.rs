pub mod client;
pub mod events;
pub mod models;

pub use client::ApiClient;
pub use events::{AnalysisUpdate, AppEvent, SyncUpdate};
pub use models::{Conversation, ConversationId, Message, Sender};
