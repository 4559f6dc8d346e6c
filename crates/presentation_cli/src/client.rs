//! Thin HTTP client for a running gateway

use anyhow::{Context, bail};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

/// `GET /health` body
#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// `GET /current-key` body
#[derive(Debug, Deserialize)]
pub struct CurrentKey {
    pub api_key: String,
    pub expiry: String,
    pub days_remaining: i64,
}

/// `POST /chat` body
#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: Option<String>,
    pub model: String,
    #[serde(default)]
    pub usage: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client bound to one gateway base URL
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn health(&self) -> anyhow::Result<HealthStatus> {
        let resp = self
            .http
            .get(self.url("/health"))
            .send()
            .await
            .context("health request failed")?;
        decode(resp).await
    }

    pub async fn current_key(
        &self,
        admin_header: &str,
        admin_secret: &str,
    ) -> anyhow::Result<CurrentKey> {
        let resp = self
            .http
            .get(self.url("/current-key"))
            .header(admin_header, admin_secret)
            .send()
            .await
            .context("current-key request failed")?;
        decode(resp).await
    }

    pub async fn chat(
        &self,
        api_key_header: &str,
        api_key: &str,
        prompt: &str,
    ) -> anyhow::Result<ChatReply> {
        let resp = self
            .http
            .post(self.url("/chat"))
            .header(api_key_header, api_key)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .context("chat request failed")?;
        decode(resp).await
    }
}

/// Decode a success body, or turn the gateway's error body into an error
async fn decode<T: DeserializeOwned>(resp: Response) -> anyhow::Result<T> {
    let status = resp.status();
    debug!(%status, "Gateway responded");

    if status.is_success() {
        return resp.json::<T>().await.context("unexpected response body");
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);
    bail!("HTTP {}: {}", status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = GatewayClient::new("http://localhost:8000/");
        assert_eq!(client.url("/chat"), "http://localhost:8000/chat");
    }

    #[tokio::test]
    async fn health_decodes_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "healthy",
                "timestamp": "2024-06-12T09:00:00Z"
            })))
            .mount(&server)
            .await;

        let health = GatewayClient::new(&server.uri()).health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.version.is_none());
    }

    #[tokio::test]
    async fn current_key_sends_admin_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current-key"))
            .and(header("admin-secret", "hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "api_key": "sk-576cd1f5c8cf6b74",
                "expiry": "2024-06-19T09:00:00Z",
                "days_remaining": 6
            })))
            .expect(1)
            .mount(&server)
            .await;

        let key = GatewayClient::new(&server.uri())
            .current_key("admin-secret", "hunter2")
            .await
            .unwrap();
        assert_eq!(key.api_key, "sk-576cd1f5c8cf6b74");
        assert_eq!(key.days_remaining, 6);
    }

    #[tokio::test]
    async fn chat_posts_json_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("x-api-key", "sk-576cd1f5c8cf6b74"))
            .and(body_json(serde_json::json!({"prompt": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Hello!",
                "model": "llama3-70b-8192",
                "usage": {"total_tokens": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = GatewayClient::new(&server.uri())
            .chat("x-api-key", "sk-576cd1f5c8cf6b74", "hi")
            .await
            .unwrap();
        assert_eq!(reply.response.as_deref(), Some("Hello!"));
        assert_eq!(reply.usage["total_tokens"], 3);
    }

    #[tokio::test]
    async fn error_body_becomes_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "Invalid or expired API key",
                "code": "unauthorized"
            })))
            .mount(&server)
            .await;

        let err = GatewayClient::new(&server.uri())
            .chat("x-api-key", "sk-0000000000000000", "hi")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 401: Invalid or expired API key");
    }
}
