/// Reason the model stopped producing a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
}

impl FinishReason {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            "tool_calls" | "function_call" => Self::ToolCalls,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
            Self::ToolCalls => "tool_calls",
        }
    }
}

/// Stream event emitted by the parser after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStreamEvent {
    /// Incremental assistant text for the first choice.
    ContentDelta { delta: String },
    /// The first choice reported a finish reason. Unknown reasons map to `None`.
    Finished { reason: Option<FinishReason> },
    /// The `[DONE]` sentinel closing the stream.
    Done,
    /// An error object delivered in-band on the event stream.
    Error {
        code: Option<String>,
        message: Option<String>,
    },
}
