#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dialogue_console::{Console, Palette, Prompted};
use dialogue_provider::{CancelSignal, CompletionProvider};
use dialogue_provider_mock::{MockProvider, MockReply};
use socratic_dialogue::config::Config;
use socratic_dialogue::engine::{DialogueContext, DialogueEngine};
use socratic_dialogue::template::DialogueTemplate;

/// Console fed from a script. Prompts and echoed input are recorded in
/// `output` the way a terminal would show them. Reads past the end of the
/// script behave like an interrupt.
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<Prompted>,
    pub output: String,
    pub prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs
                .iter()
                .map(|line| Prompted::Line((*line).to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn next_input(&mut self) -> Prompted {
        self.inputs.pop_front().unwrap_or(Prompted::Interrupted)
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Prompted> {
        self.prompts.push(prompt.to_string());
        self.output.push_str(prompt);
        let input = self.next_input();
        match &input {
            Prompted::Line(line) => {
                self.output.push_str(line);
                self.output.push('\n');
            }
            Prompted::Interrupted => self.output.push('\n'),
        }
        Ok(input)
    }

    fn read_inline(&mut self, label: &str) -> io::Result<Prompted> {
        self.prompts.push(label.to_string());
        self.output.push_str(label);
        let input = self.next_input();
        match &input {
            Prompted::Line(line) => self.output.push_str(line),
            Prompted::Interrupted => self.output.push('\n'),
        }
        Ok(input)
    }
}

pub fn replies(texts: &[&str]) -> Vec<MockReply> {
    texts.iter().map(|text| MockReply::complete(*text)).collect()
}

pub fn template() -> DialogueTemplate {
    DialogueTemplate::new(
        "You are Socrates. Examine {topic} with {name}.",
        "You are {name}, curious about {topic}.",
    )
    .expect("test template should validate")
}

pub fn context(provider: Arc<dyn CompletionProvider>, config: Config) -> (DialogueContext, CancelSignal) {
    let interrupt = Arc::new(AtomicBool::new(false));
    let context = DialogueContext {
        config,
        template: template(),
        provider,
        interrupt: Arc::clone(&interrupt),
        palette: Palette::plain(),
    };
    (context, interrupt)
}

pub fn engine_with_mock(
    mock: &Arc<MockProvider>,
    inputs: &[&str],
) -> DialogueEngine<ScriptedConsole> {
    let (context, _) = context(Arc::clone(mock) as Arc<dyn CompletionProvider>, Config::default());
    DialogueEngine::new(context, ScriptedConsole::new(inputs))
}
