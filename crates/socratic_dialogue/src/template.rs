//! Persona system-prompt templates.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TemplateError;
use crate::prompt::scan_placeholders;

pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
const REQUIRED_PLACEHOLDERS: [&str; 2] = ["topic", "name"];

const DEFAULT_SOCRATES: &str = "You are Socrates, the wisest man in Athens. \
You would like to get to the bottom of {topic}. \
You speak to {name}, an old friend from Syracuse. \
Be perceptive and critical of what your interlocutor says.";

const DEFAULT_USER: &str = "You are {name}, a Syracusan speaking to Socrates, \
a philosopher whose reputation speaks for itself. \
Today you feel like talking about {topic}. Be respectful but critical.";

#[derive(Debug, Deserialize)]
struct TemplateFile {
    socrates: String,
    user: String,
}

/// System prompts for both personas. Always validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTemplate {
    socrates: String,
    user: String,
}

impl DialogueTemplate {
    pub fn new(socrates: impl Into<String>, user: impl Into<String>) -> Result<Self, TemplateError> {
        let socrates = socrates.into();
        let user = user.into();
        validate_field("socrates", &socrates)?;
        validate_field("user", &user)?;
        Ok(Self { socrates, user })
    }

    pub fn socrates(&self) -> &str {
        &self.socrates
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl Default for DialogueTemplate {
    fn default() -> Self {
        Self {
            socrates: DEFAULT_SOCRATES.to_string(),
            user: DEFAULT_USER.to_string(),
        }
    }
}

fn validate_field(field: &'static str, text: &str) -> Result<(), TemplateError> {
    let found = scan_placeholders(field, text)?;
    for placeholder in REQUIRED_PLACEHOLDERS {
        if !found.iter().any(|name| name == placeholder) {
            return Err(TemplateError::MissingPlaceholder { field, placeholder });
        }
    }
    Ok(())
}

/// Parses template YAML with `socrates` and `user` keys.
pub fn parse_template(contents: &str, path: &Path) -> Result<DialogueTemplate, TemplateError> {
    let file: TemplateFile =
        serde_yaml::from_str(contents).map_err(|source| TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    DialogueTemplate::new(file.socrates, file.user)
}

pub fn load_template(path: &Path) -> Result<DialogueTemplate, TemplateError> {
    let contents = fs::read_to_string(path).map_err(|source| TemplateError::Io {
        operation: "reading template",
        path: path.to_path_buf(),
        source,
    })?;
    parse_template(&contents, path)
}

/// `*.yaml` files directly inside `dir`, sorted by file name. A missing
/// directory has no templates.
pub fn list_templates(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "yaml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
