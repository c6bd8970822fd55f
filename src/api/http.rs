use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use super::{ApiError, ChatBackend, ChatRequest, ChatResponse};

/// Chat client for the SymptoSeek REST backend.
pub struct HttpChatBackend {
    http: HttpClient,
    token: String,
    endpoint: String,
}

impl HttpChatBackend {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let endpoint = format!("{}/api/chat", base_url.trim_end_matches('/'));
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            token: token.into(),
            endpoint,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        debug!("POST {}", self.endpoint);
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            status if status.is_success() => {
                let body = resp.text().await?;
                Ok(serde_json::from_str(&body)?)
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message: error_message(&body),
                })
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pulls the `message` field out of an error body, when there is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ResponsePart;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpChatBackend {
        HttpChatBackend::new(&server.uri(), "test-token", Duration::from_secs(5)).unwrap()
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn sends_bearer_token_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "message": "I have a headache",
                "latitude": null,
                "longitude": null,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "bot_response_parts": [{ "type": "text", "content": "Tell me more." }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = backend_for(&server)
            .send_message(&request("I have a headache"))
            .await
            .unwrap();

        assert!(reply.success);
        let parts = reply.bot_response_parts.unwrap();
        assert!(matches!(&parts[0], ResponsePart::Text(text) if text == "Tell me more."));
    }

    #[tokio::test]
    async fn forwards_coordinates_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "message": "Find doctors near me",
                "latitude": 23.8103,
                "longitude": 90.4125,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "bot_response_parts": [],
            })))
            .mount(&server)
            .await;

        let reply = backend_for(&server)
            .send_message(&ChatRequest {
                message: "Find doctors near me".to_string(),
                latitude: Some(23.8103),
                longitude: Some(90.4125),
            })
            .await
            .unwrap();

        assert_eq!(reply.bot_response_parts.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_its_own_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .send_message(&request("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn server_error_carries_the_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "message": "Chat service unavailable" })),
            )
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .send_message(&request("hello"))
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.as_deref(), Some("Chat service unavailable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_without_message_keeps_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .send_message(&request("hello"))
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert!(message.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_payload_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .send_message(&request("hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Payload(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // An exclusive (non-pooled) server actually frees its port on drop;
        // `MockServer::start()` hands the listener back to wiremock's pool,
        // where it keeps serving 404s.
        let server = MockServer::builder().start().await;
        let uri = server.uri();
        drop(server);

        let backend = HttpChatBackend::new(&uri, "test-token", Duration::from_secs(5)).unwrap();
        let err = backend.send_message(&request("hello")).await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn error_message_survives_junk_bodies() {
        assert_eq!(
            error_message(r#"{ "message": "boom" }"#).as_deref(),
            Some("boom")
        );
        assert!(error_message(r#"{ "detail": "boom" }"#).is_none());
        assert!(error_message("<html>502</html>").is_none());
        assert!(error_message("").is_none());
    }
}
