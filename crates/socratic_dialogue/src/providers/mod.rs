use std::sync::Arc;
use std::time::Duration;

use dialogue_console::config::env_string_opt;
use dialogue_provider::{CompletionProvider, ProviderInitError};
use dialogue_provider_mock::{MockProvider, MOCK_PROVIDER_ID};
use dialogue_provider_openai::{OpenAiProvider, OpenAiProviderConfig, OPENAI_PROVIDER_ID};

use crate::config::Config;

pub const DEFAULT_PROVIDER_ID: &str = OPENAI_PROVIDER_ID;
pub const PROVIDER_ENV_VAR: &str = "SOCRATIC_PROVIDER";

/// Provider settings read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub organization: Option<String>,
    /// Raw `SOCRATIC_TIMEOUT_SEC`, validated when the provider is built.
    pub timeout_sec: Option<String>,
}

impl ProviderSettings {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string_opt("OPENAI_API_KEY"),
            base_url: env_string_opt("OPENAI_BASE_URL"),
            organization: env_string_opt("OPENAI_ORGANIZATION"),
            timeout_sec: env_string_opt("SOCRATIC_TIMEOUT_SEC"),
        }
    }

    fn timeout(&self) -> Result<Option<Duration>, ProviderInitError> {
        let Some(raw) = self.timeout_sec.as_deref() else {
            return Ok(None);
        };
        match raw.trim().parse::<u64>() {
            Ok(seconds) if seconds > 0 => Ok(Some(Duration::from_secs(seconds))),
            _ => Err(ProviderInitError::new(format!(
                "SOCRATIC_TIMEOUT_SEC must be a whole number of seconds greater than 0, got '{raw}'"
            ))),
        }
    }
}

pub fn provider_from_env(config: &Config) -> Result<Arc<dyn CompletionProvider>, ProviderInitError> {
    let provider_id = env_string_opt(PROVIDER_ENV_VAR).map(|value| value.trim().to_string());

    provider_for_id(
        provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER_ID),
        config,
        &ProviderSettings::from_env(),
    )
}

pub fn provider_for_id(
    provider_id: &str,
    config: &Config,
    settings: &ProviderSettings,
) -> Result<Arc<dyn CompletionProvider>, ProviderInitError> {
    match provider_id {
        MOCK_PROVIDER_ID => Ok(Arc::new(MockProvider::default())),
        OPENAI_PROVIDER_ID => {
            let mut provider_config = OpenAiProviderConfig::new(
                settings.api_key.clone().unwrap_or_default(),
                config.ai_model_name.clone(),
            );
            if let Some(base_url) = &settings.base_url {
                provider_config = provider_config.with_base_url(base_url.clone());
            }
            if let Some(organization) = &settings.organization {
                provider_config = provider_config.with_organization(organization.clone());
            }
            if let Some(timeout) = settings.timeout()? {
                provider_config = provider_config.with_timeout(timeout);
            }
            Ok(Arc::new(OpenAiProvider::new(provider_config)?))
        }
        unknown => Err(ProviderInitError::new(format!(
            "Unsupported provider '{unknown}'. Available providers: {OPENAI_PROVIDER_ID}, {MOCK_PROVIDER_ID}"
        ))),
    }
}
