//! Claude API client for the Anthropic Messages API

use axum::body::Bytes;
use futures_util::{StreamExt, stream::BoxStream};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::sse::{SseDecoder, StreamEvent};
use crate::config::Config;

const API_VERSION: &str = "2023-06-01";

/// Text deltas of one streamed reply, in arrival order
pub type TextStream = BoxStream<'static, Result<String, ClaudeError>>;

#[derive(Debug, thiserror::Error)]
pub enum ClaudeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Claude API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Claude stream error: {0}")]
    Stream(String),

    #[error("No text content in response")]
    EmptyResponse,
}

/// Client for the Anthropic Claude Messages API
#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Error detail from the Messages API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ClaudeClient {
    /// Build a client from configuration; `None` when no API key is set
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.anthropic_api_key.clone()?;
        Some(Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint: config.anthropic_api_url.clone(),
            model: config.anthropic_model.clone(),
            max_tokens: config.anthropic_max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message with an optional system prompt, return the reply text
    pub async fn message(
        &self,
        system: Option<&str>,
        user_message: &str,
    ) -> Result<String, ClaudeError> {
        let response = self.send(system, user_message, false).await?;
        let body: ApiResponse = response.json().await?;

        body.content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or(ClaudeError::EmptyResponse)
    }

    /// Open a streaming request.
    ///
    /// Fails before any text is produced if the vendor rejects the request.
    /// Errors reported mid-stream end the returned stream with an `Err` item.
    pub async fn stream_message(&self, user_message: &str) -> Result<TextStream, ClaudeError> {
        let response = self.send(None, user_message, true).await?;
        Ok(text_deltas(response.bytes_stream().boxed()))
    }

    async fn send(
        &self,
        system: Option<&str>,
        user_message: &str,
        stream: bool,
    ) -> Result<reqwest::Response, ClaudeError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user_message,
            }],
            stream,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(api_err) => api_err.error.message,
                Err(_) => body,
            };
            return Err(ClaudeError::Api { status, message });
        }

        Ok(response)
    }
}

struct DeltaState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, ClaudeError>>,
    /// Set once `message_stop` arrives; EOF without it is an error
    stopped: bool,
    finished: bool,
}

impl DeltaState {
    fn fail(&mut self, error: ClaudeError) {
        self.pending.push_back(Err(error));
        self.finished = true;
    }

    fn consume(&mut self, chunk: &[u8]) {
        for decoded in self.decoder.push(chunk) {
            match decoded.map(StreamEvent::from) {
                Ok(StreamEvent::Text(text)) => self.pending.push_back(Ok(text)),
                Ok(StreamEvent::Stop) => {
                    self.stopped = true;
                    self.finished = true;
                }
                Ok(StreamEvent::Error(message)) => self.fail(ClaudeError::Stream(message)),
                Ok(StreamEvent::Other) => {}
                Err(oversized) => self.fail(ClaudeError::Stream(oversized.to_string())),
            }
            if self.finished {
                break;
            }
        }
    }
}

/// Turn a raw event-stream body into the reply's text deltas
fn text_deltas(body: BoxStream<'static, reqwest::Result<Bytes>>) -> TextStream {
    let state = DeltaState {
        body,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        stopped: false,
        finished: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.consume(&chunk),
                Some(Err(e)) => state.fail(e.into()),
                None if state.stopped => state.finished = true,
                None => state.fail(ClaudeError::Stream("stream ended before message_stop".into())),
            }
        }
    })
    .boxed()
}
