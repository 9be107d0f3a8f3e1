//! Startup prompts that run before the dialogue opens.

use std::io;
use std::path::{Path, PathBuf};

use dialogue_console::config::env_string_opt;
use dialogue_console::{Color, Console, Palette};

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::engine::INPUT_MARKER;
use crate::template::{list_templates, load_template, DialogueTemplate, DEFAULT_TEMPLATE_DIR};

pub const CONFIG_PATH_ENV_VAR: &str = "SOCRATIC_CONFIG_PATH";
pub const TEMPLATE_DIR_ENV_VAR: &str = "SOCRATIC_TEMPLATE_DIR";

/// Where startup looks for `config.yaml` and persona templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupPaths {
    pub config: PathBuf,
    pub templates: PathBuf,
}

impl Default for StartupPaths {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            templates: PathBuf::from(DEFAULT_TEMPLATE_DIR),
        }
    }
}

impl StartupPaths {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            config: env_string_opt(CONFIG_PATH_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.config),
            templates: env_string_opt(TEMPLATE_DIR_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.templates),
        }
    }
}

pub fn print_config_banner(
    console: &mut impl Console,
    palette: &Palette,
    config: &Config,
    path: &Path,
) -> io::Result<()> {
    console.write_line(&palette.paint(
        Color::Purple,
        &format!(
            "Configuration Loaded. You may change it by editing {} file",
            path.display()
        ),
    ))?;
    console.write_line(&palette.paint(Color::Purple, &config.summary()))
}

/// Asks whether to use a custom template and loads the chosen one.
///
/// Returns `None` when the user interrupts. Invalid choices and templates
/// that fail validation are reported and the question is asked again.
pub fn select_template(
    console: &mut impl Console,
    template_dir: &Path,
) -> io::Result<Option<DialogueTemplate>> {
    loop {
        console.write_line(
            "Would you like to see available custom templates for system prompts? (y/n):",
        )?;
        let Some(answer) = console.read_line(INPUT_MARKER)?.into_line() else {
            return Ok(None);
        };
        if !answer.trim().eq_ignore_ascii_case("y") {
            return Ok(Some(DialogueTemplate::default()));
        }

        let files = list_templates(template_dir)?;
        if files.is_empty() {
            console.write_line(&format!(
                "No YAML templates found in {} directory. Proceeding with default template.",
                template_dir.display()
            ))?;
            return Ok(Some(DialogueTemplate::default()));
        }

        console.write_line("Available templates:")?;
        for (index, file) in files.iter().enumerate() {
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            console.write_line(&format!("{}: {name}", index + 1))?;
        }
        console.write_line(
            "Enter the number of the template you want to load (type \"d\" for default)",
        )?;

        let Some(selection) = console.read_line(INPUT_MARKER)?.into_line() else {
            return Ok(None);
        };
        let selection = selection.trim();
        if selection == "d" {
            return Ok(Some(DialogueTemplate::default()));
        }

        let chosen = selection
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| files.get(index));
        let Some(chosen) = chosen else {
            console.write_line(&format!("Invalid {selection}."))?;
            continue;
        };

        match load_template(chosen) {
            Ok(template) => {
                tracing::info!(path = %chosen.display(), "custom template loaded");
                return Ok(Some(template));
            }
            Err(error) => {
                tracing::warn!(%error, "template rejected");
                console.write_line(&format!("Could not use {}: {error}", chosen.display()))?;
            }
        }
    }
}
