use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::client::ApiClient;
use crate::api::events::{AnalysisUpdate, AppEvent};
use crate::api::models::ConversationId;

/// Client-side proxy for the analyze endpoint. Each call is one request;
/// there is no retry, the next inbound message triggers a new one.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    client: ApiClient,
    events: UnboundedSender<AppEvent>,
}

impl SuggestionEngine {
    pub fn new(client: ApiClient, events: UnboundedSender<AppEvent>) -> Self {
        Self { client, events }
    }

    pub fn request(&self, runtime: &Handle, conversation: ConversationId, content: &str) {
        let client = self.client.clone();
        let events = self.events.clone();
        let trigger = content.to_string();
        log::info!("Requesting suggestions for {trigger:?} in conversation {conversation}");
        runtime.spawn(async move {
            let outcome = client.analyze(&trigger).await;
            let update = AnalysisUpdate { conversation, trigger, outcome };
            if events.send(AppEvent::Analyzed(update)).is_err() {
                log::debug!("Analysis for conversation {conversation} finished after the receiver went away");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn request_emits_analysis_for_trigger() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .and(body_json(json!({"content": "系统报错了"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestions": ["请截图发我看下", "重启试试？", "技术正在排查"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = ApiClient::new(&server.uri(), Duration::from_secs(2)).unwrap();
        SuggestionEngine::new(client, tx).request(&Handle::current(), ConversationId(3), "系统报错了");

        match timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(AppEvent::Analyzed(update))) => {
                assert_eq!(update.conversation, ConversationId(3));
                assert_eq!(update.trigger, "系统报错了");
                assert_eq!(update.outcome.unwrap().len(), 3);
            }
            other => panic!("expected analysis, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_delivered_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = ApiClient::new(&server.uri(), Duration::from_secs(2)).unwrap();
        SuggestionEngine::new(client, tx).request(&Handle::current(), ConversationId(1), "hi");

        match timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(AppEvent::Analyzed(update))) => assert!(update.outcome.unwrap_err().is_transport()),
            other => panic!("expected analysis, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_receiver_does_not_fail_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"suggestions": ["好"]})))
            .expect(1)
            .mount(&server)
            .await;

        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let client = ApiClient::new(&server.uri(), Duration::from_secs(2)).unwrap();
        SuggestionEngine::new(client, tx).request(&Handle::current(), ConversationId(2), "hi");

        let served = timeout(Duration::from_secs(2), async {
            while server.received_requests().await.unwrap_or_default().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(served.is_ok());
    }
}
