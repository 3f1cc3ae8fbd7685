//! # dochub-assistant
//!
//! Everything between the chat service and the upstream code assistant:
//!
//! - [`backend`]: the [`AssistantBackend`] trait and backend selection
//! - [`anthropic`]: Anthropic Messages API client with incremental SSE decoding
//! - [`echo`]: deterministic offline backend for development and tests
//! - [`event`]: the chat events streamed to the browser
//! - [`relay`]: forwards upstream deltas to a client channel until done,
//!   failed, or cancelled

pub mod anthropic;
pub mod backend;
pub mod echo;
pub mod event;
pub mod relay;
pub mod sse;

pub use anthropic::AnthropicBackend;
pub use backend::{AssistantBackend, AssistantRequest, DeltaStream, PromptMessage, build_backend};
pub use echo::EchoBackend;
pub use event::ChatEvent;
pub use relay::{RelayOutcome, relay};
