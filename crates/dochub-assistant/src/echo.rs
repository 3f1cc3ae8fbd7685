//! Offline backend that answers by repeating the question.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use dochub_core::result::AppResult;

use crate::backend::{AssistantBackend, AssistantRequest, DeltaStream};

/// Deterministic backend for local development and tests.
///
/// The reply is `"Echo: <last user message>"`, streamed one word at a time.
#[derive(Debug, Clone, Default)]
pub struct EchoBackend {
    delay: Option<Duration>,
}

impl EchoBackend {
    /// Create an echo backend that streams without pausing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause between deltas, to exercise slow upstreams.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }

    /// The full reply for a request.
    pub fn reply_for(request: &AssistantRequest) -> String {
        format!("Echo: {}", request.last_user_message().unwrap_or_default())
    }
}

/// Split text into word-sized deltas that concatenate back to the input.
fn split_deltas(text: &str) -> Vec<String> {
    let mut deltas = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if ch.is_whitespace() {
            deltas.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        deltas.push(current);
    }
    deltas
}

#[async_trait]
impl AssistantBackend for EchoBackend {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn stream(&self, request: AssistantRequest) -> AppResult<DeltaStream> {
        let deltas = split_deltas(&Self::reply_for(&request));
        let delay = self.delay;
        let stream = futures::stream::iter(deltas).then(move |delta| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(delta)
        });
        Ok(stream.boxed())
    }
}
