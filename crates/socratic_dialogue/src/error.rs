use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(
        "system prompt '{field}' must contain {{{placeholder}}}; templates need {{topic}} for the discussion topic and {{name}} for the interlocutor name"
    )]
    MissingPlaceholder {
        field: &'static str,
        placeholder: &'static str,
    },

    #[error("system prompt '{field}' uses unknown placeholder {{{placeholder}}}")]
    UnknownPlaceholder {
        field: &'static str,
        placeholder: String,
    },

    #[error("system prompt '{field}' has an unmatched '{brace}' at byte {offset}; write {{{{ or }}}} for a literal brace")]
    UnmatchedBrace {
        field: &'static str,
        brace: char,
        offset: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    Temperature(f64),

    #[error("response_length.min ({min}) must not exceed response_length.max ({max})")]
    ResponseLength { min: u32, max: u32 },
}

/// Why a turn could not produce a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Provider(String),

    #[error("completion stream ended without finishing")]
    Unterminated,
}
