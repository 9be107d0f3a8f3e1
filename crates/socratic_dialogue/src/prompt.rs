//! Prompt rendering for one persona turn.
//!
//! Persona templates may use `{topic}`, `{name}`, `{line}` and `{context}`.
//! `{{` and `}}` stand for literal braces. Substitution is a single pass, so
//! braces inside substituted values are never expanded.

use std::sync::OnceLock;

use dialogue_provider::PromptMessage;
use regex::{Captures, Regex};

use crate::config::ResponseLength;
use crate::error::TemplateError;
use crate::speaker::{SpeakerKind, PRIMARY_NAME};

/// Placeholders a persona template may reference.
pub const PLACEHOLDERS: [&str; 4] = ["topic", "name", "line", "context"];

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}|[{}]")
            .expect("placeholder pattern is valid")
    })
}

/// Returns the placeholders `text` references, in order of appearance.
///
/// Fails on placeholders outside [`PLACEHOLDERS`] and on braces that are
/// neither part of a placeholder nor doubled.
pub fn scan_placeholders(field: &'static str, text: &str) -> Result<Vec<String>, TemplateError> {
    let mut found = Vec::new();

    for caps in placeholder_pattern().captures_iter(text) {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        if whole == "{{" || whole == "}}" {
            continue;
        }

        match caps.get(1) {
            Some(name) if PLACEHOLDERS.contains(&name.as_str()) => {
                found.push(name.as_str().to_string());
            }
            Some(name) => {
                return Err(TemplateError::UnknownPlaceholder {
                    field,
                    placeholder: name.as_str().to_string(),
                });
            }
            None => {
                let offset = caps.get(0).map_or(0, |m| m.start());
                return Err(TemplateError::UnmatchedBrace {
                    field,
                    brace: whole.chars().next().unwrap_or('{'),
                    offset,
                });
            }
        }
    }

    Ok(found)
}

/// Values substituted into a persona template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptVars<'a> {
    pub topic: &'a str,
    /// The human interlocutor's name.
    pub name: &'a str,
    /// The line the persona responds to.
    pub line: &'a str,
    /// Recent transcript lines joined by newlines.
    pub context: &'a str,
}

impl PromptVars<'_> {
    pub fn get(&self, placeholder: &str) -> Option<&str> {
        match placeholder {
            "topic" => Some(self.topic),
            "name" => Some(self.name),
            "line" => Some(self.line),
            "context" => Some(self.context),
            _ => None,
        }
    }
}

/// Substitutes `vars` into `text` in one pass.
pub fn substitute(text: &str, vars: &PromptVars<'_>) -> String {
    placeholder_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            match whole {
                "{{" => "{".to_string(),
                "}}" => "}".to_string(),
                _ => caps
                    .get(1)
                    .and_then(|name| vars.get(name.as_str()))
                    .map_or_else(|| whole.to_string(), str::to_string),
            }
        })
        .into_owned()
}

/// A fully rendered chat prompt for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub human: String,
    /// Prefix the model continues from.
    pub assistant: String,
}

impl RenderedPrompt {
    pub fn to_messages(&self) -> Vec<PromptMessage> {
        vec![
            PromptMessage::System(self.system.clone()),
            PromptMessage::Human(self.human.clone()),
            PromptMessage::Assistant(self.assistant.clone()),
        ]
    }

    pub fn as_text(&self) -> String {
        format!(
            "system: {}\nhuman: {}\nassistant: {}",
            self.system, self.human, self.assistant
        )
    }
}

/// Renders the prompt for `kind`'s turn from its persona template.
pub fn render(
    kind: SpeakerKind,
    template: &str,
    vars: &PromptVars<'_>,
    length: &ResponseLength,
) -> RenderedPrompt {
    let system = format!(
        "{} Your response should be between {} and {} words long. Previous context: {}",
        substitute(template, vars).trim_end(),
        length.min,
        length.max,
        vars.context,
    );

    let (human, assistant) = match kind {
        SpeakerKind::Primary => (
            format!("{}: {}", vars.name, vars.line),
            format!("{PRIMARY_NAME}: "),
        ),
        SpeakerKind::Secondary => (
            format!("{PRIMARY_NAME}: {}", vars.line),
            format!("{}: ", vars.name),
        ),
    };

    RenderedPrompt {
        system,
        human,
        assistant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(line: &'a str, context: &'a str) -> PromptVars<'a> {
        PromptVars {
            topic: "justice",
            name: "Ana",
            line,
            context,
        }
    }

    #[test]
    fn substitute_replaces_known_placeholders_and_unescapes_braces() {
        let text = "Discuss {topic} with {name}. Use {{braces}} freely.";

        assert_eq!(
            substitute(text, &vars("", "")),
            "Discuss justice with Ana. Use {braces} freely."
        );
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let rendered = substitute("{name} said: {line}", &vars("what about {topic}?", ""));

        assert_eq!(rendered, "Ana said: what about {topic}?");
    }

    #[test]
    fn scan_reports_placeholders_in_order() {
        let found = scan_placeholders("socrates", "{name} on {topic}, {{not}} {line}")
            .expect("template should scan");

        assert_eq!(found, vec!["name", "topic", "line"]);
    }

    #[test]
    fn scan_rejects_unknown_placeholders_and_stray_braces() {
        assert!(matches!(
            scan_placeholders("user", "{topic} {name} {mood}"),
            Err(TemplateError::UnknownPlaceholder { placeholder, .. }) if placeholder == "mood"
        ));
        assert!(matches!(
            scan_placeholders("user", "{topic} {name} }"),
            Err(TemplateError::UnmatchedBrace { brace: '}', .. })
        ));
        assert!(matches!(
            scan_placeholders("user", "{topic {name}"),
            Err(TemplateError::UnmatchedBrace { brace: '{', offset: 0, .. })
        ));
    }

    #[test]
    fn primary_prompt_addresses_socrates_from_the_human() {
        let prompt = render(
            SpeakerKind::Primary,
            "You are Socrates discussing {topic} with {name}.",
            &vars("Is justice the same for all?", ""),
            &ResponseLength { min: 10, max: 50 },
        );

        assert_eq!(
            prompt.system,
            "You are Socrates discussing justice with Ana. Your response should be between 10 and 50 words long. Previous context: "
        );
        assert_eq!(prompt.human, "Ana: Is justice the same for all?");
        assert_eq!(prompt.assistant, "Socrates: ");
    }

    #[test]
    fn secondary_prompt_answers_socrates_as_the_human() {
        let prompt = render(
            SpeakerKind::Secondary,
            "You are {name}, talking about {topic}.",
            &vars("What do you mean?", "Ana: hi\nSocrates: What do you mean?"),
            &ResponseLength { min: 5, max: 20 },
        );

        assert!(prompt
            .system
            .ends_with("Previous context: Ana: hi\nSocrates: What do you mean?"));
        assert_eq!(prompt.human, "Socrates: What do you mean?");
        assert_eq!(prompt.assistant, "Ana: ");

        let messages = prompt.to_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role(), "system");
        assert_eq!(messages[2].text(), "Ana: ");
    }

    #[test]
    fn every_placeholder_resolves_for_both_speakers() {
        let template = "{topic} {name} {line} {context}";
        let length = ResponseLength { min: 10, max: 50 };

        for kind in [SpeakerKind::Primary, SpeakerKind::Secondary] {
            let prompt = render(kind, template, &vars("a line", "a context"), &length);

            assert!(prompt
                .system
                .starts_with("justice Ana a line a context Your response"));
            for part in [&prompt.system, &prompt.human, &prompt.assistant] {
                for placeholder in PLACEHOLDERS {
                    let token = format!("{{{placeholder}}}");
                    assert!(
                        !part.contains(&token),
                        "{kind:?} prompt still contains {token}: {part}"
                    );
                }
            }
        }
    }
}
