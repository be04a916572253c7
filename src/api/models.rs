use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub u32);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    pub avatar: String,
    pub last_message: String,
    pub time: String,
    pub unread: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Me,
    Them,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    pub time: String,
}

impl Message {
    pub fn outgoing(content: impl Into<String>, time: impl Into<String>) -> Self {
        Self { sender: Sender::Me, content: content.into(), time: time.into() }
    }

    pub fn incoming(content: impl Into<String>, time: impl Into<String>) -> Self {
        Self { sender: Sender::Them, content: content.into(), time: time.into() }
    }
}

/// Body of `GET /api/sync_messages`.
///
/// Only `status` is checked; `data` is trusted once it decodes.
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub status: String,
    #[serde(default)]
    pub data: Vec<Message>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SyncResponse {
    pub const SUCCESS: &'static str = "success";

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_uses_lowercase_wire_names() {
        let msg: Message =
            serde_json::from_str(r#"{"sender":"them","content":"Hi","time":"09:30"}"#).unwrap();
        assert_eq!(msg, Message::incoming("Hi", "09:30"));
        let out = serde_json::to_value(Message::outgoing("Yo", "09:31")).unwrap();
        assert_eq!(out["sender"], "me");
    }

    #[test]
    fn unknown_sender_is_rejected() {
        let res = serde_json::from_str::<Message>(r#"{"sender":"bot","content":"x","time":"1"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn sync_response_defaults_missing_data() {
        let resp: SyncResponse =
            serde_json::from_str(r#"{"status":"error","message":"WeChat not found"}"#).unwrap();
        assert!(!resp.is_success());
        assert!(resp.data.is_empty());
        assert_eq!(resp.message.as_deref(), Some("WeChat not found"));
    }
}
