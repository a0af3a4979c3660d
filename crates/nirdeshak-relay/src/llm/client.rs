//! Azure OpenAI chat-completion client.
//!
//! Issues exactly one non-streaming request per call and classifies the
//! outcome into an [`UpstreamFailure`] when it does not produce a reply.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::{ChatConfig, key_header};
use crate::error::{MalformedKind, RelayError, Result, UpstreamFailure, UpstreamResult};
use crate::llm::types::{ChatRequest, Message};

/// Header carrying the Azure OpenAI key.
const API_KEY_HEADER: &str = "api-key";

/// A chat-completion client bound to one Azure deployment.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ChatClient {
    config: Arc<ChatConfig>,
    http: reqwest::Client,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a new client whose every call is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Fails if the API key cannot be sent as a header or the HTTP client
    /// cannot be built.
    pub fn new(config: ChatConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_header("AZURE_OPENAI_API_KEY", &config.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(RelayError::HttpClient)?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// The model identifier placed in every request.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build a request for the configured model.
    pub fn request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest::new(self.config.model.clone(), messages)
    }

    /// Send `request` and return the first choice's message content.
    ///
    /// No retry is attempted; the first failure is returned as-is.
    pub async fn complete(&self, request: &ChatRequest) -> UpstreamResult<String> {
        let resp = self.send(request).await?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| UpstreamFailure::from_transport(&e))?;

        if !status.is_success() {
            let failure = UpstreamFailure::from_status(status.as_u16());
            tracing::warn!(
                status = status.as_u16(),
                class = failure.tag(),
                "chat API returned an error"
            );
            tracing::debug!(body = %text, "chat API error body");
            return Err(failure);
        }

        parse_completion(&text)
    }

    /// Send the HTTP request to the deployment endpoint.
    async fn send(&self, request: &ChatRequest) -> UpstreamResult<reqwest::Response> {
        tracing::debug!(
            model = %request.model,
            turns = request.messages.len(),
            "sending chat completion request"
        );

        self.http
            .post(self.config.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let failure = UpstreamFailure::from_transport(&e);
                tracing::warn!(error = %e, class = failure.tag(), "chat request did not complete");
                failure
            })
    }
}

/// Extract `choices[0].message.content` from a 2xx completion body.
pub fn parse_completion(body: &str) -> UpstreamResult<String> {
    let v: Value = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "chat API returned a non-JSON body");
        UpstreamFailure::MalformedResponse(MalformedKind::InvalidFormat)
    })?;

    let content = v
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str);

    match content {
        Some(text) => Ok(text.to_owned()),
        None => {
            tracing::warn!("chat API response has no choices[0].message.content");
            Err(UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
