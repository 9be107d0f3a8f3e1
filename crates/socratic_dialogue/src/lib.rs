//! Socratic dialogue: a turn-taking conversation between Socrates and a
//! human-named interlocutor, both voiced by a language model.
//!
//! ## Provider bootstrap
//!
//! - `SOCRATIC_PROVIDER=openai` (default) streams from an OpenAI-compatible
//!   Chat Completions endpoint. Requires `OPENAI_API_KEY`; honours
//!   `OPENAI_BASE_URL`, `OPENAI_ORGANIZATION` and `SOCRATIC_TIMEOUT_SEC`.
//! - `SOCRATIC_PROVIDER=mock` replays a canned reply, no network needed.
//!
//! ## Files
//!
//! `config.yaml` (or `SOCRATIC_CONFIG_PATH`) sets the model, temperature,
//! context window size and advisory response length. Persona templates are
//! YAML files with `socrates` and `user` keys under `templates/` (or
//! `SOCRATIC_TEMPLATE_DIR`); both prompts must mention `{topic}` and `{name}`.
//!
//! ## Turn contract
//!
//! The human opens, Socrates answers, then the personas alternate. On the
//! interlocutor's turn the human may type a line to speak instead of the
//! model; an empty line lets the model speak. A failed generation or an
//! interrupt ends the dialogue and offers to save the transcript.

pub mod config;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod providers;
pub mod speaker;
pub mod startup;
pub mod template;
pub mod transcript;
