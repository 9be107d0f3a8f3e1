//! Transport-only client for OpenAI-compatible Chat Completions streaming.
//!
//! This crate owns request building, SSE framing and event normalization for
//! the `/chat/completions` endpoint. It contains no prompt construction, no
//! persona logic and no retry policy: one request is one attempt.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::OpenAiApiClient;
pub use client::{CancellationSignal, StreamTerminal};
pub use config::OpenAiApiConfig;
pub use error::OpenAiApiError;
pub use events::{ChatStreamEvent, FinishReason};
pub use payload::{ChatCompletionRequest, ChatMessage};
pub use sse::SseStreamParser;
pub use url::normalize_chat_completions_url;
