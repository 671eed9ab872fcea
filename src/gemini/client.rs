use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;

use super::{GenerativeApi, UpstreamError, UpstreamReply};
use crate::config::ApiKey;

/// Gemini `generateContent` over HTTPS, authenticated with the `key` query parameter.
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("gemini-key-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn generate_content(
        &self,
        key: &ApiKey,
        model: &str,
        body: &Value,
    ) -> Result<UpstreamReply, UpstreamError> {
        // reqwest errors carry the full URL, key included
        let transport = |e: reqwest::Error| UpstreamError::Transport(e.without_url());

        let response = self
            .http_client
            .post(self.model_url(model))
            .query(&[("key", key.expose())])
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        let body = serde_json::from_slice(&bytes)
            .map_err(|e| UpstreamError::InvalidBody(e.to_string()))?;

        tracing::debug!("Gemini {} answered {}", model, status);

        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key() -> ApiKey {
        ApiKey::new("test-key").unwrap()
    }

    #[tokio::test]
    async fn posts_to_model_endpoint_with_key_query() {
        let server = MockServer::start().await;
        let body = json!({"contents": [{"parts": [{"text": "hi"}]}]});

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key"))
            .and(header_eq("content-type", "application/json"))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri()).unwrap();
        let reply = client
            .generate_content(&key(), "gemini-test", &body)
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, json!({"candidates": []}));
    }

    #[tokio::test]
    async fn keeps_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"code": 400, "message": "bad"}})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(format!("{}/", server.uri())).unwrap();
        let reply = client
            .generate_content(&key(), "gemini-test", &json!({}))
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"]["message"], "bad");
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri()).unwrap();
        let err = client
            .generate_content(&key(), "gemini-test", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn transport_error_hides_key() {
        // nothing listens on port 1
        let client = GeminiClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .generate_content(&key(), "gemini-test", &json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Transport(_)));
        assert!(!err.to_string().contains("test-key"));
        assert!(!format!("{:?}", err).contains("test-key"));
    }
}
