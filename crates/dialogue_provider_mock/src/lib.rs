//! Deterministic mock implementation of the shared `dialogue_provider`
//! contract.
//!
//! This crate contains no transport logic. It replays replies word by word.
//! A scripted provider records every request it receives for engine-level
//! tests; a repeating provider serves local runs without an API key and keeps
//! no request log.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use dialogue_provider::{
    CancelSignal, CompletionProvider, CompletionRequest, ProviderProfile, StreamEvent,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Streams the text and finishes.
    Complete(String),
    /// Streams `partial`, then fails with `error`.
    Fail { partial: String, error: String },
}

impl MockReply {
    #[must_use]
    pub fn complete(text: impl Into<String>) -> Self {
        Self::Complete(text.into())
    }

    #[must_use]
    pub fn fail(partial: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Fail {
            partial: partial.into(),
            error: error.into(),
        }
    }
}

/// Deterministic mock provider used by dialogue tests and local runs.
#[derive(Debug)]
pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    fallback: Option<MockReply>,
    requests: Mutex<Vec<CompletionRequest>>,
    /// Only scripted providers log requests; a repeating one runs unbounded.
    record_requests: bool,
    token_delay: Duration,
}

impl MockProvider {
    const TOKEN_DELAY_MS: u64 = 40;

    /// Creates a provider that replays `replies` once each, in order, with no
    /// streaming delay. A request beyond the end of the script fails.
    #[must_use]
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
            record_requests: true,
            token_delay: Duration::ZERO,
        }
    }

    /// Creates a provider that answers every request with `reply`.
    #[must_use]
    pub fn repeating(reply: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(reply),
            requests: Mutex::new(Vec::new()),
            record_requests: false,
            token_delay: Duration::from_millis(Self::TOKEN_DELAY_MS),
        }
    }

    #[must_use]
    pub fn with_token_delay(mut self, token_delay: Duration) -> Self {
        self.token_delay = token_delay;
        self
    }

    /// Returns every request received so far, oldest first. Always empty for
    /// a repeating provider.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock_unpoisoned(&self.requests).clone()
    }

    fn next_reply(&self) -> Option<MockReply> {
        lock_unpoisoned(&self.script)
            .pop_front()
            .or_else(|| self.fallback.clone())
    }

    /// Emits `text` word by word. Returns false when the run was cancelled.
    fn stream_words(
        &self,
        run_id: u64,
        text: &str,
        cancel: &CancelSignal,
        emit: &mut dyn FnMut(StreamEvent),
    ) -> bool {
        let mut pending_token = String::new();
        for ch in text.chars() {
            pending_token.push(ch);

            if matches!(ch, ' ' | '\n') {
                if cancel.load(Ordering::SeqCst) {
                    return false;
                }
                emit(StreamEvent::Chunk {
                    run_id,
                    text: std::mem::take(&mut pending_token),
                });
                self.pause();
            }
        }

        if !pending_token.is_empty() {
            if cancel.load(Ordering::SeqCst) {
                return false;
            }
            emit(StreamEvent::Chunk {
                run_id,
                text: pending_token,
            });
            self.pause();
        }

        !cancel.load(Ordering::SeqCst)
    }

    fn pause(&self) {
        if !self.token_delay.is_zero() {
            thread::sleep(self.token_delay);
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::repeating(MockReply::complete(
            "And yet, if we cannot say what a thing is, how can we be sure of what belongs \
             to it? Let us examine your answer once more, slowly, as two friends would.",
        ))
    }
}

impl CompletionProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: "mock".to_string(),
        }
    }

    fn stream(
        &self,
        req: CompletionRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(StreamEvent),
    ) -> Result<(), String> {
        let run_id = req.run_id;
        if self.record_requests {
            lock_unpoisoned(&self.requests).push(req);
        }

        emit(StreamEvent::Started { run_id });

        if cancel.load(Ordering::SeqCst) {
            emit(StreamEvent::Cancelled { run_id });
            return Ok(());
        }

        match self.next_reply() {
            Some(MockReply::Complete(text)) => {
                if self.stream_words(run_id, &text, &cancel, emit) {
                    emit(StreamEvent::Finished { run_id });
                } else {
                    emit(StreamEvent::Cancelled { run_id });
                }
            }
            Some(MockReply::Fail { partial, error }) => {
                if self.stream_words(run_id, &partial, &cancel, emit) {
                    emit(StreamEvent::Failed { run_id, error });
                } else {
                    emit(StreamEvent::Cancelled { run_id });
                }
            }
            None => {
                tracing::debug!(run_id, "mock script exhausted");
                emit(StreamEvent::Failed {
                    run_id,
                    error: "mock script exhausted".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
