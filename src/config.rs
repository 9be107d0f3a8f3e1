//! Environment configuration.

use std::env;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// `DEBUG`: raises the default log filter to `debug`.
    pub debug: bool,
    /// `SOCRATIC_LOG`: append logs to this file instead of stderr.
    pub log_file: Option<String>,
    /// `RUST_LOG`: explicit filter directives, wins over `debug`.
    pub log_filter: Option<String>,
    /// `NO_COLOR`: any non-empty value disables ANSI colors.
    pub no_color: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            debug: env_flag("DEBUG"),
            log_file: env_string_opt("SOCRATIC_LOG"),
            log_filter: env_string_opt("RUST_LOG"),
            no_color: env_string_opt("NO_COLOR").is_some(),
        }
    }

    /// Whether speaker labels and banners should carry ANSI colors.
    pub fn color_enabled(&self) -> bool {
        !self.no_color
    }
}

/// True for `1`, `true` or `yes`, in any case.
pub fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            )
        })
        .unwrap_or(false)
}

/// Returns the variable's value unless it is unset or blank.
pub fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
