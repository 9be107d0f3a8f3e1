use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};

use crate::config::OpenAiApiConfig;
use crate::error::{parse_error_message, OpenAiApiError};
use crate::events::{ChatStreamEvent, FinishReason};
use crate::headers::build_headers;
use crate::payload::ChatCompletionRequest;
use crate::sse::SseStreamParser;
use crate::url::normalize_chat_completions_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct OpenAiApiClient {
    http: Client,
    config: OpenAiApiConfig,
}

/// Terminal bookkeeping while a stream is drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamTerminal {
    pub completed: bool,
    pub finish_reason: Option<FinishReason>,
}

impl OpenAiApiClient {
    pub fn new(config: OpenAiApiConfig) -> Result<Self, OpenAiApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(OpenAiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_completions_url(&self.config.base_url)
    }

    pub fn build_headers(&self, user_agent: Option<&str>) -> Result<HeaderMap, OpenAiApiError> {
        let headers = build_headers(&self.config, user_agent)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| OpenAiApiError::InvalidHeader(format!("invalid key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    OpenAiApiError::InvalidHeader(format!("invalid value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<reqwest::RequestBuilder, OpenAiApiError> {
        validate_request_payload(request)?;

        let headers = self.build_headers(self.config.user_agent.as_deref())?;
        let mut payload = request.clone();
        payload.stream = true;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    /// Sends the request once. Non-success statuses become [`OpenAiApiError::Status`].
    pub async fn send(
        &self,
        request: &ChatCompletionRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, OpenAiApiError> {
        if is_cancelled(cancellation) {
            return Err(OpenAiApiError::Cancelled);
        }

        let response = await_or_cancel(self.build_request(request)?.send(), cancellation)
            .await?
            .map_err(OpenAiApiError::from)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .unwrap_or_default();
        let message = parse_error_message(status, &body);
        tracing::warn!(status = status.as_u16(), %message, "chat completion request rejected");
        Err(OpenAiApiError::Status(status, message))
    }

    /// Streams the completion, handing each parsed event to `on_event` as it
    /// arrives. In-band errors fail the stream; the returned terminal tells
    /// whether the model finished.
    pub async fn stream_with_handler<F>(
        &self,
        request: &ChatCompletionRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<StreamTerminal, OpenAiApiError>
    where
        F: FnMut(ChatStreamEvent),
    {
        let response = self.send(request, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut terminal = StreamTerminal::default();

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(OpenAiApiError::Cancelled);
            }
            let chunk = chunk.map_err(OpenAiApiError::from)?;
            for event in parser.feed(&chunk) {
                process_stream_event(event, &mut terminal, &mut on_event)?;
            }
        }

        if is_cancelled(cancellation) {
            return Err(OpenAiApiError::Cancelled);
        }

        Ok(terminal)
    }
}

fn validate_request_payload(request: &ChatCompletionRequest) -> Result<(), OpenAiApiError> {
    if request.model.trim().is_empty() {
        return Err(OpenAiApiError::InvalidRequestPayload(
            "'model' must not be empty".to_string(),
        ));
    }
    if request.messages.is_empty() {
        return Err(OpenAiApiError::InvalidRequestPayload(
            "'messages' must contain at least one message".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn process_stream_event<F>(
    event: ChatStreamEvent,
    terminal: &mut StreamTerminal,
    on_event: &mut F,
) -> Result<(), OpenAiApiError>
where
    F: FnMut(ChatStreamEvent),
{
    if let ChatStreamEvent::Error { code, message } = &event {
        return Err(OpenAiApiError::StreamFailed {
            code: code.clone(),
            message: message
                .clone()
                .or_else(|| code.clone())
                .unwrap_or_else(|| "unknown stream error".to_owned()),
        });
    }

    match &event {
        ChatStreamEvent::Finished { reason } => {
            terminal.completed = true;
            terminal.finish_reason = *reason;
        }
        ChatStreamEvent::Done => terminal.completed = true,
        _ => {}
    }

    on_event(event);
    Ok(())
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, OpenAiApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(OpenAiApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(OpenAiApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
