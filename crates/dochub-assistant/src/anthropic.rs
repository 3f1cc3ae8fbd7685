//! Anthropic Messages API backend with streamed replies.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dochub_core::config::AssistantConfig;
use dochub_core::error::{AppError, ErrorKind};
use dochub_core::result::AppResult;

use crate::backend::{AssistantBackend, AssistantRequest, DeltaStream, PromptMessage};
use crate::sse::{SseDecoder, SseFrame};

const API_VERSION: &str = "2023-06-01";

/// Environment variable consulted when `assistant.api_key` is empty.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: &'a [PromptMessage],
    stream: bool,
}

/// Streaming event payloads. Only the ones that matter are modelled.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: ErrorDetail },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// What one SSE frame means for the reply.
#[derive(Debug, PartialEq, Eq)]
enum Piece {
    Text(String),
    Stop,
    Skip,
}

fn interpret(frame: &SseFrame) -> AppResult<Piece> {
    if frame.data.is_empty() {
        return Ok(Piece::Skip);
    }
    let event: StreamEvent = serde_json::from_str(&frame.data).map_err(|e| {
        AppError::with_source(
            ErrorKind::ExternalService,
            "Malformed event from assistant API",
            e,
        )
    })?;
    match event {
        StreamEvent::ContentBlockDelta {
            delta: Delta::TextDelta { text },
        } => Ok(Piece::Text(text)),
        StreamEvent::MessageStop => Ok(Piece::Stop),
        StreamEvent::Error { error } => Err(AppError::external_service(format!(
            "Assistant API error ({}): {}",
            error.kind, error.message
        ))),
        _ => Ok(Piece::Skip),
    }
}

struct StreamState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<AppResult<String>>,
    stopped: bool,
    finished: bool,
}

impl StreamState {
    fn absorb(&mut self, chunk: &[u8]) {
        for frame in self.decoder.push(chunk) {
            match interpret(&frame) {
                Ok(Piece::Text(text)) => self.pending.push_back(Ok(text)),
                Ok(Piece::Stop) => {
                    self.stopped = true;
                    self.finished = true;
                    return;
                }
                Ok(Piece::Skip) => {}
                Err(e) => {
                    self.pending.push_back(Err(e));
                    self.finished = true;
                    return;
                }
            }
        }
    }
}

/// Client for `POST /v1/messages` with `stream: true`.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    /// Create a backend from configuration.
    pub fn new(config: &AssistantConfig) -> AppResult<Self> {
        let api_key = if config.api_key.is_empty() {
            std::env::var(API_KEY_ENV).unwrap_or_default()
        } else {
            config.api_key.clone()
        };
        if api_key.is_empty() {
            return Err(AppError::configuration(format!(
                "assistant.api_key or {API_KEY_ENV} is required for the anthropic provider"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl AssistantBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn stream(&self, request: AssistantRequest) -> AppResult<DeltaStream> {
        let body = ApiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: &request.system,
            messages: &request.messages,
            stream: true,
        };

        debug!(model = %self.model, turns = request.messages.len(), "Calling assistant API");

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Assistant API request failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            warn!(status = %status, "Assistant API rejected the request");
            return Err(AppError::external_service(format!(
                "Assistant API error ({status}): {message}"
            )));
        }

        let state = StreamState {
            body: response.bytes_stream().boxed(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            stopped: false,
            finished: false,
        };

        let deltas = futures::stream::unfold(state, |mut st| async move {
            loop {
                if let Some(item) = st.pending.pop_front() {
                    return Some((item, st));
                }
                if st.finished {
                    return None;
                }
                match st.body.next().await {
                    Some(Ok(chunk)) => st.absorb(&chunk),
                    Some(Err(e)) => {
                        st.finished = true;
                        st.pending.push_back(Err(AppError::with_source(
                            ErrorKind::ExternalService,
                            "Assistant stream interrupted",
                            e,
                        )));
                    }
                    None => {
                        st.finished = true;
                        if !st.stopped {
                            st.pending.push_back(Err(AppError::external_service(
                                "Assistant stream ended before the reply was complete",
                            )));
                        }
                    }
                }
            }
        });

        Ok(deltas.boxed())
    }
}
