use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use viewer_core::Session;

use crate::error::{PresenceError, Result};
use crate::types::{AvatarSessionProvider, CreateSessionRequest};

/// HTTP client for the presence service's session API.
pub struct PresenceClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl PresenceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            client: Client::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            client,
        }
    }

    pub async fn create_session(&self, request: &CreateSessionRequest) -> Result<Session> {
        let response = self
            .authorized(self.client.post(format!("{}/v1/sessions", self.base_url)))
            .json(request)
            .send()
            .await?;

        let session: Session = self.handle_response(response).await?;
        debug!(session_id = %session.id, avatar_id = %session.avatar_id, "session created");
        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        let response = self
            .authorized(
                self.client
                    .get(format!("{}/v1/sessions/{}", self.base_url, session_id)),
            )
            .send()
            .await?;

        self.handle_response(response).await
    }

    pub async fn destroy_session(&self, session_id: &str) -> Result<()> {
        let response = self
            .authorized(
                self.client
                    .delete(format!("{}/v1/sessions/{}", self.base_url, session_id)),
            )
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PresenceError::SessionNotFound(session_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PresenceError::InvalidResponse(format!(
                "Status {}: {}",
                status, body
            )));
        }

        debug!(session_id, "session destroyed");
        Ok(())
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PresenceError::SessionNotFound(
                "Resource not found".to_string(),
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PresenceError::InvalidResponse(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let body = response.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl AvatarSessionProvider for PresenceClient {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<Session> {
        PresenceClient::create_session(self, request).await
    }

    async fn destroy_session(&self, session_id: &str) -> Result<()> {
        PresenceClient::destroy_session(self, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_body() -> serde_json::Value {
        json!({
            "id": "sess-1",
            "avatar_id": "avatar-a",
            "transport_url": "wss://room.example",
            "transport_credential": "viewer-tok",
            "status": "active",
            "created_at": "2026-01-01T00:00:00Z",
            "expires_at": "2026-01-01T01:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_create_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(201).set_body_json(session_body()))
            .mount(&server)
            .await;

        let client = PresenceClient::new(server.uri()).with_api_key("secret");
        let request = CreateSessionRequest::new("avatar-a", "wss://room.example", "tok1");
        let session = client.create_session(&request).await.unwrap();

        assert_eq!(session.id, "sess-1");
        assert_eq!(session.avatar_id, "avatar-a");
        assert_eq!(session.transport_credential, "viewer-tok");
    }

    #[tokio::test]
    async fn test_create_session_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/sessions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = PresenceClient::new(server.uri());
        let request = CreateSessionRequest::new("avatar-a", "wss://room.example", "tok1");
        let result = client.create_session(&request).await;

        match result {
            Err(PresenceError::InvalidResponse(msg)) => assert!(msg.contains("500")),
            other => panic!("unexpected result: {:?}", other.map(|s| s.id)),
        }
    }

    #[tokio::test]
    async fn test_get_session_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/sessions/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = PresenceClient::new(server.uri());
        let result = client.get_session("missing").await;
        assert!(matches!(result, Err(PresenceError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_destroy_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/sessions/sess-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = PresenceClient::new(server.uri());
        client.destroy_session("sess-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_destroy_session_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/sessions/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = PresenceClient::new(server.uri());
        let result = client.destroy_session("gone").await;
        assert!(matches!(result, Err(PresenceError::SessionNotFound(_))));
    }
}
