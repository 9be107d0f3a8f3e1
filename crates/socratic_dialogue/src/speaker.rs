//! The two personas and their bindings.

use dialogue_console::{Color, Palette};

use crate::config::Config;
use crate::template::DialogueTemplate;

pub const PRIMARY_NAME: &str = "Socrates";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerKind {
    /// Socrates.
    Primary,
    /// The human-named interlocutor.
    Secondary,
}

impl SpeakerKind {
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// Model parameters a persona is generated with.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBinding {
    pub model: String,
    pub temperature: f64,
}

impl ModelBinding {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.ai_model_name.clone(),
            temperature: config.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Speaker {
    pub kind: SpeakerKind,
    pub name: String,
    pub color: Color,
    pub template: String,
    pub binding: ModelBinding,
}

impl Speaker {
    pub fn primary(template: &DialogueTemplate, binding: ModelBinding) -> Self {
        Self {
            kind: SpeakerKind::Primary,
            name: PRIMARY_NAME.to_string(),
            color: Color::Red,
            template: template.socrates().to_string(),
            binding,
        }
    }

    pub fn secondary(
        name: impl Into<String>,
        template: &DialogueTemplate,
        binding: ModelBinding,
    ) -> Self {
        Self {
            kind: SpeakerKind::Secondary,
            name: name.into(),
            color: Color::Green,
            template: template.user().to_string(),
            binding,
        }
    }

    /// Colored display name.
    pub fn label(&self, palette: &Palette) -> String {
        palette.paint(self.color, &self.name)
    }

    /// Transcript line for `text` spoken by this persona.
    pub fn line(&self, text: &str) -> String {
        format!("{}: {text}", self.name)
    }
}
