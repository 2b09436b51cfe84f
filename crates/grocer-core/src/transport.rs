use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;

/// The single outbound call to the assistant endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one user utterance and return the raw reply payload.
    async fn send(&self, message: &str) -> Result<Value, TransportError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// JSON-over-HTTP transport: `POST {"message": ...}` to a fixed endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, message: &str) -> Result<Value, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, "posting message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "assistant endpoint returned non-success status");
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatRequest { message: "plan my week" }).unwrap();
        assert_eq!(body, json!({ "message": "plan my week" }));
    }

    #[test]
    fn test_endpoint_is_kept_verbatim() {
        let transport = HttpTransport::new("http://localhost:5001/chat-with-agent");
        assert_eq!(transport.endpoint(), "http://localhost:5001/chat-with-agent");
    }
}
