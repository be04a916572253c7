use std::time::Duration;

use reqwest::Client as HttpClient;
use url::Url;

use crate::api::models::{AnalyzeRequest, AnalyzeResponse, Message, SyncResponse};
use crate::error::ApiError;

/// Thin client for the local copilot backend.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub http: HttpClient,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { http, base: Self::base_api(base_url)? })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn base_api(base_url: &str) -> Result<Url, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
        Ok(Url::parse(&format!("{}/api/", trimmed))?)
    }

    fn endpoint(&self, name: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(name)?)
    }

    /// Fetch the full, authoritative message list of whatever chat the
    /// backend currently has open.
    pub async fn sync_messages(&self) -> Result<Vec<Message>, ApiError> {
        let endpoint = self.endpoint("sync_messages")?;
        let resp = self.http.get(endpoint).send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        let body = resp.bytes().await?;
        let parsed: SyncResponse =
            serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        if !parsed.is_success() {
            return Err(ApiError::Backend {
                message: parsed.message.unwrap_or_else(|| "sync failed".into()),
                status: parsed.status,
            });
        }
        Ok(parsed.data)
    }

    /// Ask the backend for reply suggestions to `content`.
    pub async fn analyze(&self, content: &str) -> Result<Vec<String>, ApiError> {
        let endpoint = self.endpoint("analyze")?;
        let resp = self
            .http
            .post(endpoint)
            .json(&AnalyzeRequest { content })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        let body = resp.bytes().await?;
        let parsed: AnalyzeResponse =
            serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        parsed
            .suggestions
            .ok_or_else(|| ApiError::Malformed("missing `suggestions`".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Sender;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn base_url_accepts_api_suffix_and_trailing_slash() {
        let a = ApiClient::new("http://127.0.0.1:8000/", Duration::from_secs(1)).unwrap();
        let b = ApiClient::new("http://127.0.0.1:8000/api", Duration::from_secs(1)).unwrap();
        assert_eq!(a.base_url().as_str(), "http://127.0.0.1:8000/api/");
        assert_eq!(a.base_url(), b.base_url());
        assert_eq!(
            a.endpoint("sync_messages").unwrap().as_str(),
            "http://127.0.0.1:8000/api/sync_messages"
        );
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let err = ApiClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::Url(_)));
    }

    #[tokio::test]
    async fn sync_returns_fetched_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sync_messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": [
                    {"sender": "them", "content": "A", "time": "10:00"},
                    {"sender": "me", "content": "B", "time": "10:01"}
                ]
            })))
            .mount(&server)
            .await;

        let messages = client_for(&server).sync_messages().await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::Them);
        assert_eq!(messages[1].content, "B");
    }

    #[tokio::test]
    async fn sync_non_success_status_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sync_messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": "WeChat not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).sync_messages().await.unwrap_err();
        match err {
            ApiError::Backend { status, message } => {
                assert_eq!(status, "error");
                assert_eq!(message, "WeChat not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sync_http_failure_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sync_messages"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).sync_messages().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);
        let client = ApiClient::new(&uri, Duration::from_millis(500)).unwrap();
        let err = client.sync_messages().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn analyze_posts_content_and_returns_suggestions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .and(body_json(json!({"content": "多少钱"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "suggestions": ["我们的基础版是5万/年", "私有化部署需要详谈"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let suggestions = client_for(&server).analyze("多少钱").await.unwrap();
        assert_eq!(suggestions, vec!["我们的基础版是5万/年", "私有化部署需要详谈"]);
    }

    #[tokio::test]
    async fn analyze_without_suggestions_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "nope"})))
            .mount(&server)
            .await;

        let err = client_for(&server).analyze("hi").await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn analyze_garbage_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).analyze("hi").await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn slow_backend_times_out_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sync_messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "data": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"suggestions": ["好的"]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        let err = client.sync_messages().await.unwrap_err();
        assert!(err.is_transport(), "{err:?}");
        assert!(matches!(&err, ApiError::Transport(e) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(2));

        let err = client.analyze("hi").await.unwrap_err();
        assert!(err.is_transport(), "{err:?}");
    }
}
