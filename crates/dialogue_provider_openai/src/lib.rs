//! OpenAI Chat Completions implementation of the shared `dialogue_provider`
//! contract.
//!
//! This adapter translates `openai_api` stream semantics into the ordered
//! `StreamEvent` lifecycle consumed by the dialogue engine. Deltas are
//! forwarded as they arrive rather than after the stream drains.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dialogue_provider::{
    CancelSignal, CompletionProvider, CompletionRequest, PromptMessage, ProviderInitError,
    ProviderProfile, StreamEvent,
};
use openai_api::{
    ChatCompletionRequest, ChatMessage, ChatStreamEvent, OpenAiApiClient, OpenAiApiConfig,
    OpenAiApiError, StreamTerminal,
};

/// Stable provider identifier used by startup selection.
pub const OPENAI_PROVIDER_ID: &str = "openai";

/// Runtime configuration for the OpenAI provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub organization: Option<String>,
    pub timeout: Option<Duration>,
}

impl OpenAiProviderConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            organization: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_api_config(self) -> OpenAiApiConfig {
        let mut config = OpenAiApiConfig::new(self.api_key);

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(organization) = self.organization {
            config = config.with_organization(organization);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait StreamClient: Send + Sync {
    fn stream(
        &self,
        request: &ChatCompletionRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(ChatStreamEvent),
    ) -> Result<StreamTerminal, OpenAiApiError>;
}

#[derive(Debug)]
struct DefaultStreamClient {
    client: OpenAiApiClient,
}

impl StreamClient for DefaultStreamClient {
    fn stream(
        &self,
        request: &ChatCompletionRequest,
        cancel: &CancelSignal,
        on_event: &mut dyn FnMut(ChatStreamEvent),
    ) -> Result<StreamTerminal, OpenAiApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                OpenAiApiError::Runtime(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(
            self.client
                .stream_with_handler(request, Some(cancel), |event| on_event(event)),
        )
    }
}

/// `CompletionProvider` adapter backed by `openai_api` transport primitives.
pub struct OpenAiProvider {
    default_model: String,
    stream_client: Arc<dyn StreamClient>,
}

impl OpenAiProvider {
    /// Creates a provider using real OpenAI transport.
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderInitError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderInitError::new(
                "OPENAI_API_KEY is not set; export it or choose SOCRATIC_PROVIDER=mock",
            ));
        }

        let default_model = sanitize_model(&config.model);
        let stream_client = Arc::new(DefaultStreamClient {
            client: OpenAiApiClient::new(config.into_api_config()).map_err(map_init_error)?,
        });

        Ok(Self {
            default_model,
            stream_client,
        })
    }

    fn build_request(&self, req: &CompletionRequest) -> ChatCompletionRequest {
        let model = if req.model.trim().is_empty() {
            self.default_model.clone()
        } else {
            req.model.trim().to_string()
        };
        let messages = req.messages.iter().map(to_chat_message).collect();

        ChatCompletionRequest::new(model, messages).with_temperature(req.temperature)
    }

    #[cfg(test)]
    fn with_stream_client_for_tests(model: &str, stream_client: Arc<dyn StreamClient>) -> Self {
        Self {
            default_model: sanitize_model(model),
            stream_client,
        }
    }
}

impl CompletionProvider for OpenAiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: OPENAI_PROVIDER_ID.to_string(),
            model_id: self.default_model.clone(),
        }
    }

    fn stream(
        &self,
        req: CompletionRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(StreamEvent),
    ) -> Result<(), String> {
        let run_id = req.run_id;

        emit(StreamEvent::Started { run_id });

        if cancel.load(Ordering::Acquire) {
            emit(StreamEvent::Cancelled { run_id });
            return Ok(());
        }

        let request = self.build_request(&req);
        tracing::debug!(run_id, model = %request.model, messages = request.messages.len(), "streaming completion");

        let result = self.stream_client.stream(&request, &cancel, &mut |event| {
            if let ChatStreamEvent::ContentDelta { delta } = event {
                if !delta.is_empty() {
                    emit(StreamEvent::Chunk {
                        run_id,
                        text: delta,
                    });
                }
            }
        });

        match result {
            Ok(terminal) if terminal.completed => emit(StreamEvent::Finished { run_id }),
            Ok(_) => emit(StreamEvent::Failed {
                run_id,
                error: "completion stream ended before the model finished".to_string(),
            }),
            Err(OpenAiApiError::Cancelled) => emit(StreamEvent::Cancelled { run_id }),
            Err(error) => {
                tracing::warn!(run_id, %error, "completion request failed");
                emit(StreamEvent::Failed {
                    run_id,
                    error: error.to_string(),
                });
            }
        }

        Ok(())
    }
}

fn to_chat_message(message: &PromptMessage) -> ChatMessage {
    ChatMessage::new(message.role(), message.text())
}

fn sanitize_model(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        "gpt-4o-mini".to_string()
    } else {
        trimmed.to_string()
    }
}

fn map_init_error(error: OpenAiApiError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize openai provider: {error}"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::{Mutex, MutexGuard};

    use openai_api::FinishReason;

    use super::*;

    enum FakeStreamOutcome {
        Success {
            events: Vec<ChatStreamEvent>,
            terminal: StreamTerminal,
        },
        Error(OpenAiApiError),
    }

    struct FakeStreamClient {
        observed: Mutex<Option<ChatCompletionRequest>>,
        outcome: Mutex<Option<FakeStreamOutcome>>,
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    impl FakeStreamClient {
        fn success(events: Vec<ChatStreamEvent>, completed: bool) -> Arc<Self> {
            Arc::new(Self {
                observed: Mutex::new(None),
                outcome: Mutex::new(Some(FakeStreamOutcome::Success {
                    events,
                    terminal: StreamTerminal {
                        completed,
                        finish_reason: completed.then_some(FinishReason::Stop),
                    },
                })),
            })
        }

        fn failure(error: OpenAiApiError) -> Arc<Self> {
            Arc::new(Self {
                observed: Mutex::new(None),
                outcome: Mutex::new(Some(FakeStreamOutcome::Error(error))),
            })
        }

        fn observed(&self) -> Option<ChatCompletionRequest> {
            lock(&self.observed).clone()
        }
    }

    impl StreamClient for FakeStreamClient {
        fn stream(
            &self,
            request: &ChatCompletionRequest,
            _cancel: &CancelSignal,
            on_event: &mut dyn FnMut(ChatStreamEvent),
        ) -> Result<StreamTerminal, OpenAiApiError> {
            *lock(&self.observed) = Some(request.clone());

            match lock(&self.outcome).take() {
                Some(FakeStreamOutcome::Success { events, terminal }) => {
                    for event in events {
                        on_event(event);
                    }
                    Ok(terminal)
                }
                Some(FakeStreamOutcome::Error(error)) => Err(error),
                None => panic!("fake stream outcome should be consumed exactly once"),
            }
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            run_id: 9,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            messages: vec![
                PromptMessage::System("You are Socrates.".to_string()),
                PromptMessage::Human("Ana: What is virtue?".to_string()),
                PromptMessage::Assistant("Socrates: ".to_string()),
            ],
        }
    }

    fn run_events(provider: &OpenAiProvider) -> Vec<StreamEvent> {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut events = Vec::new();

        provider
            .stream(request(), cancel, &mut |event| events.push(event))
            .expect("stream should not return provider-level failure");

        events
    }

    fn delta(text: &str) -> ChatStreamEvent {
        ChatStreamEvent::ContentDelta {
            delta: text.to_string(),
        }
    }

    #[test]
    fn profile_reports_openai_provider_id_and_model() {
        let stream = FakeStreamClient::success(Vec::new(), true);
        let provider = OpenAiProvider::with_stream_client_for_tests(" gpt-4o ", stream);

        let profile = provider.profile();
        assert_eq!(profile.provider_id, OPENAI_PROVIDER_ID);
        assert_eq!(profile.model_id, "gpt-4o");
    }

    #[test]
    fn stream_maps_deltas_to_chunks_in_order_and_done_to_finished() {
        let stream = FakeStreamClient::success(
            vec![
                delta("Tell me"),
                delta(""),
                delta(", Ana."),
                ChatStreamEvent::Finished {
                    reason: Some(FinishReason::Stop),
                },
                ChatStreamEvent::Done,
            ],
            true,
        );
        let provider = OpenAiProvider::with_stream_client_for_tests(
            "gpt-4o-mini",
            Arc::clone(&stream) as Arc<dyn StreamClient>,
        );

        let events = run_events(&provider);

        assert_eq!(
            events,
            vec![
                StreamEvent::Started { run_id: 9 },
                StreamEvent::Chunk {
                    run_id: 9,
                    text: "Tell me".to_string(),
                },
                StreamEvent::Chunk {
                    run_id: 9,
                    text: ", Ana.".to_string(),
                },
                StreamEvent::Finished { run_id: 9 },
            ]
        );
    }

    #[test]
    fn stream_forwards_roles_model_and_temperature() {
        let stream = FakeStreamClient::success(Vec::new(), true);
        let provider = OpenAiProvider::with_stream_client_for_tests(
            "gpt-4o-mini",
            Arc::clone(&stream) as Arc<dyn StreamClient>,
        );

        run_events(&provider);

        let observed = stream.observed().expect("request should reach the client");
        assert_eq!(observed.model, "gpt-4o-mini");
        assert_eq!(observed.temperature, Some(0.7));
        let roles: Vec<&str> = observed
            .messages
            .iter()
            .map(|message| message.role.as_str())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(observed.messages[1].content, "Ana: What is virtue?");
    }

    #[test]
    fn stream_maps_cancelled_transport_to_cancelled_terminal_event() {
        let stream = FakeStreamClient::failure(OpenAiApiError::Cancelled);
        let provider = OpenAiProvider::with_stream_client_for_tests("gpt-4o-mini", stream);

        let events = run_events(&provider);

        assert!(matches!(events.first(), Some(StreamEvent::Started { run_id: 9 })));
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Cancelled { run_id: 9 })
        ));
    }

    #[test]
    fn stream_maps_transport_error_to_failed_terminal_event() {
        let stream = FakeStreamClient::failure(OpenAiApiError::StreamFailed {
            code: Some("server_error".to_string()),
            message: "boom".to_string(),
        });
        let provider = OpenAiProvider::with_stream_client_for_tests("gpt-4o-mini", stream);

        let events = run_events(&provider);

        assert!(matches!(events.first(), Some(StreamEvent::Started { run_id: 9 })));
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Failed { run_id: 9, error }) if error.contains("boom")
        ));
    }

    #[test]
    fn truncated_stream_fails_after_forwarding_partial_chunks() {
        let stream = FakeStreamClient::success(vec![delta("half a tho")], false);
        let provider = OpenAiProvider::with_stream_client_for_tests("gpt-4o-mini", stream);

        let events = run_events(&provider);

        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], StreamEvent::Chunk { .. }));
        assert!(matches!(events[2], StreamEvent::Failed { .. }));
    }

    #[test]
    fn pre_cancelled_run_never_reaches_transport() {
        let stream = FakeStreamClient::success(Vec::new(), true);
        let provider = OpenAiProvider::with_stream_client_for_tests(
            "gpt-4o-mini",
            Arc::clone(&stream) as Arc<dyn StreamClient>,
        );
        let cancel = Arc::new(AtomicBool::new(true));
        let mut events = Vec::new();

        provider
            .stream(request(), cancel, &mut |event| events.push(event))
            .expect("cancelled run is not a provider-level failure");

        assert_eq!(
            events,
            vec![
                StreamEvent::Started { run_id: 9 },
                StreamEvent::Cancelled { run_id: 9 },
            ]
        );
        assert!(stream.observed().is_none());
    }

    #[test]
    fn missing_api_key_is_an_init_error() {
        let error = match OpenAiProvider::new(OpenAiProviderConfig::new("  ", "gpt-4o-mini")) {
            Ok(_) => panic!("blank key must be rejected"),
            Err(error) => error,
        };

        assert!(error.message().contains("OPENAI_API_KEY"));
    }
}
