//! Turn-taking dialogue engine.
//!
//! The engine is a small state machine. Each state runs to completion and
//! names its successor; a turn reports a typed [`TurnOutcome`] and failures
//! or interrupts move explicitly to [`DialogueState::SavePrompt`].

use std::io;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dialogue_console::{Console, Palette, Prompted};
use dialogue_provider::{CancelSignal, CompletionProvider, CompletionRequest, RunId, StreamEvent};
use transcript_store::save_transcript;

use crate::config::Config;
use crate::error::GenerationError;
use crate::prompt::{render, PromptVars};
use crate::speaker::{ModelBinding, Speaker, SpeakerKind};
use crate::template::DialogueTemplate;
use crate::transcript::Transcript;

pub const INTRO: &str = "We'll try to write a Platonic dialogue with AI.\n\
You'll need to write the first line, and then language models will do things for you.\n\
After Socrates voices his opinion, you may press Return to proceed or write a line yourself if you'd like to interfere.\n\
Let's start by providing your name:";
pub const TOPIC_PROMPT: &str = "You would like to talk about:";
pub const OPENING_PROMPT: &str = "Enter your first line to kick things off:";
pub const SAVE_HINT: &str =
    "If you'd like to save the dialogue, enter its name or a full path. Otherwise press Return";
pub const INPUT_MARKER: &str = "> ";

/// Everything the engine needs, built once at startup.
pub struct DialogueContext {
    pub config: Config,
    pub template: DialogueTemplate,
    pub provider: Arc<dyn CompletionProvider>,
    /// Set by the signal handler; also cancels in-flight generation.
    pub interrupt: CancelSignal,
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    AwaitOpening,
    GenerateOpeningResponse,
    AwaitSecondaryOverrideOrGenerate,
    RunningLoop { next: SpeakerKind },
    SavePrompt,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Generated(String),
    Overridden(String),
    Failed(GenerationError),
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    GenerationFailed(GenerationError),
    Interrupted,
}

/// What a finished dialogue left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueReport {
    pub transcript: Vec<String>,
    pub end_reason: Option<EndReason>,
    pub saved_to: Option<PathBuf>,
}

pub struct DialogueEngine<C: Console> {
    context: DialogueContext,
    console: C,
    state: DialogueState,
    transcript: Transcript,
    topic: String,
    primary: Speaker,
    secondary: Speaker,
    /// The line the next generated turn responds to.
    current_line: String,
    next_run_id: RunId,
    end_reason: Option<EndReason>,
    saved_to: Option<PathBuf>,
}

impl<C: Console> DialogueEngine<C> {
    pub fn new(context: DialogueContext, console: C) -> Self {
        let binding = ModelBinding::from_config(&context.config);
        let primary = Speaker::primary(&context.template, binding.clone());
        let secondary = Speaker::secondary(String::new(), &context.template, binding);

        Self {
            context,
            console,
            state: DialogueState::AwaitOpening,
            transcript: Transcript::new(),
            topic: String::new(),
            primary,
            secondary,
            current_line: String::new(),
            next_run_id: 1,
            end_reason: None,
            saved_to: None,
        }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The line the next generated turn will respond to.
    pub fn current_line(&self) -> &str {
        &self.current_line
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Runs states until the dialogue terminates.
    pub fn run(&mut self) -> io::Result<DialogueReport> {
        while self.state != DialogueState::Terminated {
            self.step()?;
        }

        Ok(DialogueReport {
            transcript: self.transcript.lines().to_vec(),
            end_reason: self.end_reason.clone(),
            saved_to: self.saved_to.clone(),
        })
    }

    /// Runs the current state once and moves to its successor.
    pub fn step(&mut self) -> io::Result<DialogueState> {
        let next = match self.state {
            DialogueState::AwaitOpening => self.await_opening()?,
            DialogueState::GenerateOpeningResponse => self.generate_opening_response()?,
            DialogueState::AwaitSecondaryOverrideOrGenerate => self.await_secondary()?,
            DialogueState::RunningLoop { next } => self.running_loop(next)?,
            DialogueState::SavePrompt => self.save_prompt()?,
            DialogueState::Terminated => DialogueState::Terminated,
        };

        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "dialogue state transition");
        }
        self.state = next;
        Ok(next)
    }

    fn await_opening(&mut self) -> io::Result<DialogueState> {
        self.console.write_line(INTRO)?;
        let Some(name) = self.console.read_line(INPUT_MARKER)?.into_line() else {
            return Ok(self.end(EndReason::Interrupted));
        };
        self.secondary.name = name;

        self.console.write_line(TOPIC_PROMPT)?;
        let Some(topic) = self.console.read_line(INPUT_MARKER)?.into_line() else {
            return Ok(self.end(EndReason::Interrupted));
        };
        self.topic = topic;

        self.console.write_line(OPENING_PROMPT)?;
        let label = format!("{}: ", self.secondary.label(&self.context.palette));
        let Some(opening) = self.console.read_line(&label)?.into_line() else {
            return Ok(self.end(EndReason::Interrupted));
        };

        tracing::info!(name = %self.secondary.name, topic = %self.topic, "dialogue opened");
        self.transcript.append(self.secondary.line(&opening));
        self.current_line = opening;
        Ok(DialogueState::GenerateOpeningResponse)
    }

    fn generate_opening_response(&mut self) -> io::Result<DialogueState> {
        match self.primary_turn(String::new())? {
            TurnOutcome::Generated(text) | TurnOutcome::Overridden(text) => {
                self.transcript.append(self.primary.line(&text));
                self.current_line = text;
                Ok(DialogueState::AwaitSecondaryOverrideOrGenerate)
            }
            TurnOutcome::Failed(error) => self.abort_turn(EndReason::GenerationFailed(error)),
            TurnOutcome::Interrupted => self.abort_turn(EndReason::Interrupted),
        }
    }

    fn await_secondary(&mut self) -> io::Result<DialogueState> {
        match self.secondary_turn()? {
            TurnOutcome::Generated(text) | TurnOutcome::Overridden(text) => {
                self.transcript.append(self.secondary.line(&text));
                self.current_line = text;
                Ok(DialogueState::RunningLoop {
                    next: SpeakerKind::Primary,
                })
            }
            TurnOutcome::Failed(error) => self.abort_turn(EndReason::GenerationFailed(error)),
            TurnOutcome::Interrupted => self.abort_turn(EndReason::Interrupted),
        }
    }

    fn running_loop(&mut self, speaker: SpeakerKind) -> io::Result<DialogueState> {
        let outcome = match speaker {
            SpeakerKind::Primary => {
                let context = self.context_window();
                self.primary_turn(context)?
            }
            SpeakerKind::Secondary => self.secondary_turn()?,
        };

        match outcome {
            TurnOutcome::Generated(text) => {
                let line = self.speaker(speaker).line(&text);
                self.transcript.append(line);
                self.current_line = text;
            }
            // Recorded, but the next generated turn still answers the last
            // generated line.
            TurnOutcome::Overridden(text) => {
                let line = self.speaker(speaker).line(&text);
                self.transcript.append(line);
            }
            TurnOutcome::Failed(error) => {
                return self.abort_turn(EndReason::GenerationFailed(error));
            }
            TurnOutcome::Interrupted => return self.abort_turn(EndReason::Interrupted),
        }

        Ok(DialogueState::RunningLoop {
            next: speaker.other(),
        })
    }

    fn save_prompt(&mut self) -> io::Result<DialogueState> {
        self.context.interrupt.store(false, Ordering::SeqCst);

        self.console.write_line(SAVE_HINT)?;
        let destination = match self.console.read_line(INPUT_MARKER)? {
            Prompted::Line(line) => line,
            Prompted::Interrupted => String::new(),
        };

        if destination.trim().is_empty() {
            tracing::debug!("transcript not saved");
            return Ok(DialogueState::Terminated);
        }

        match save_transcript(self.transcript.lines(), &destination) {
            Ok(path) => {
                self.console
                    .write_line(&format!("Dialogue saved to {}", path.display()))?;
                self.saved_to = Some(path);
            }
            Err(error) => {
                tracing::warn!(%error, "failed to save transcript");
                self.console
                    .write_line(&format!("Could not save the dialogue: {error}"))?;
            }
        }

        Ok(DialogueState::Terminated)
    }

    fn primary_turn(&mut self, context: String) -> io::Result<TurnOutcome> {
        let label = format!("{}: ", self.primary.label(&self.context.palette));
        self.console.write(&label)?;
        let line = self.current_line.clone();
        self.generate(SpeakerKind::Primary, &line, &context)
    }

    /// Offers the human an override, generating when the input is empty.
    fn secondary_turn(&mut self) -> io::Result<TurnOutcome> {
        let label = format!("{}:", self.secondary.label(&self.context.palette));
        match self.console.read_inline(&label)? {
            Prompted::Interrupted => Ok(TurnOutcome::Interrupted),
            Prompted::Line(text) if !text.trim().is_empty() => {
                self.console.write("\n")?;
                tracing::debug!(chars = text.chars().count(), "override accepted");
                Ok(TurnOutcome::Overridden(text))
            }
            Prompted::Line(_) => {
                self.console.write(" ")?;
                let line = self.current_line.clone();
                let context = self.context_window();
                self.generate(SpeakerKind::Secondary, &line, &context)
            }
        }
    }

    /// Streams one completion, writing chunks as they arrive.
    fn generate(&mut self, kind: SpeakerKind, line: &str, context: &str) -> io::Result<TurnOutcome> {
        let run_id = self.next_run_id;
        self.next_run_id += 1;

        let speaker = self.speaker(kind).clone();
        let vars = PromptVars {
            topic: &self.topic,
            name: &self.secondary.name,
            line,
            context,
        };
        let prompt = render(
            kind,
            &speaker.template,
            &vars,
            &self.context.config.response_length,
        );

        let _span = tracing::info_span!("turn", run_id, speaker = %speaker.name).entered();
        tracing::debug!(prompt = %prompt.as_text(), "rendered prompt");

        let request = CompletionRequest {
            run_id,
            model: speaker.binding.model.clone(),
            temperature: speaker.binding.temperature,
            messages: prompt.to_messages(),
        };
        let provider = Arc::clone(&self.context.provider);
        let cancel = Arc::clone(&self.context.interrupt);
        let console = &mut self.console;

        let mut text = String::new();
        let mut terminal: Option<StreamEvent> = None;
        let mut write_error: Option<io::Error> = None;

        let result = provider.stream(request, cancel, &mut |event| {
            if event.run_id() != run_id || terminal.is_some() {
                tracing::debug!(event_run_id = event.run_id(), "ignoring stale stream event");
                return;
            }

            match event {
                StreamEvent::Started { .. } => {}
                StreamEvent::Chunk { text: chunk, .. } => {
                    if write_error.is_none() {
                        if let Err(error) = console.write(&chunk) {
                            write_error = Some(error);
                        }
                    }
                    text.push_str(&chunk);
                }
                event => terminal = Some(event),
            }
        });

        if let Some(error) = write_error {
            return Err(error);
        }

        let outcome = match (result, terminal) {
            (Err(error), _) => TurnOutcome::Failed(GenerationError::Provider(error)),
            (Ok(()), Some(StreamEvent::Finished { .. })) => TurnOutcome::Generated(text),
            (Ok(()), Some(StreamEvent::Failed { error, .. })) => {
                TurnOutcome::Failed(GenerationError::Provider(error))
            }
            (Ok(()), Some(StreamEvent::Cancelled { .. })) => TurnOutcome::Interrupted,
            (Ok(()), _) => TurnOutcome::Failed(GenerationError::Unterminated),
        };

        self.console.write("\n")?;
        tracing::debug!(outcome = ?outcome, "turn finished");
        Ok(outcome)
    }

    fn abort_turn(&mut self, reason: EndReason) -> io::Result<DialogueState> {
        if let EndReason::GenerationFailed(error) = &reason {
            tracing::warn!(%error, "generation failed");
            self.console
                .write_line(&format!("Spartans are attacking! {error}"))?;
        }
        Ok(self.end(reason))
    }

    fn end(&mut self, reason: EndReason) -> DialogueState {
        tracing::info!(reason = ?reason, lines = self.transcript.len(), "dialogue ended");
        self.end_reason = Some(reason);
        DialogueState::SavePrompt
    }

    fn speaker(&self, kind: SpeakerKind) -> &Speaker {
        match kind {
            SpeakerKind::Primary => &self.primary,
            SpeakerKind::Secondary => &self.secondary,
        }
    }

    fn context_window(&self) -> String {
        self.transcript
            .context_window(self.context.config.previous_context_messages)
    }
}
