pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod suggest;
pub mod sync;
pub mod utils;

pub use config::Settings;
pub use error::{ApiError, ConfigError};
pub use session::Session;
pub use store::{AiMode, AppState, ConversationStore, SyncStatus};
