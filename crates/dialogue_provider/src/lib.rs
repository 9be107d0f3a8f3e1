//! Minimal provider-agnostic contract for streaming one persona turn.
//!
//! This crate defines only the shared completion lifecycle and prompt message
//! types. It excludes provider transport details, protocol payloads, and the
//! turn-taking orchestration itself.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

/// Identifier for one completion run.
pub type RunId = u64;

/// Shared cancellation flag for a run.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a provider before any run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Provider-neutral chat message handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptMessage {
    System(String),
    Human(String),
    Assistant(String),
}

impl PromptMessage {
    /// Returns the text carried by the message regardless of role.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::System(text) | Self::Human(text) | Self::Assistant(text) => text,
        }
    }

    /// Returns the chat role name used by OpenAI-compatible transports.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::Human(_) => "user",
            Self::Assistant(_) => "assistant",
        }
    }
}

/// Input required to stream one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub run_id: RunId,
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<PromptMessage>,
}

/// Provider-emitted lifecycle event for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Started { run_id: RunId },
    Chunk { run_id: RunId, text: String },
    Finished { run_id: RunId },
    Failed { run_id: RunId, error: String },
    Cancelled { run_id: RunId },
}

impl StreamEvent {
    /// Returns the run identifier associated with this event.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        match self {
            Self::Started { run_id }
            | Self::Chunk { run_id, .. }
            | Self::Finished { run_id }
            | Self::Failed { run_id, .. }
            | Self::Cancelled { run_id } => *run_id,
        }
    }

    /// Returns true when this event terminates the run lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

/// Immutable metadata describing a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for streaming one completion request.
pub trait CompletionProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Streams a completion and emits lifecycle events in arrival order.
    ///
    /// Exactly one terminal event is expected per run. A run cannot be
    /// restarted; callers issue a new request with a fresh run id instead.
    fn stream(
        &self,
        req: CompletionRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(StreamEvent),
    ) -> Result<(), String>;
}
