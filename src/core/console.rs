//! Console trait shared by the process console and scripted test consoles.

use std::io;

/// Result of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted {
    /// A line of input with the trailing newline removed.
    Line(String),
    /// The read was interrupted by a signal or stdin reached end of input.
    Interrupted,
}

impl Prompted {
    /// Returns the line, or `None` when interrupted.
    pub fn into_line(self) -> Option<String> {
        match self {
            Self::Line(line) => Some(line),
            Self::Interrupted => None,
        }
    }
}

/// Minimal line-oriented console used by the dialogue engine.
pub trait Console {
    /// Writes `text` as-is and flushes it.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Writes `text` followed by a newline.
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text)?;
        self.write("\n")
    }

    /// Prints `prompt` and reads one line.
    fn read_line(&mut self, prompt: &str) -> io::Result<Prompted>;

    /// Prints `label` without a newline and reads one line.
    ///
    /// After the read the cursor is placed back on the label's line: right
    /// after the label when nothing was typed, after the typed text
    /// otherwise. Output that follows continues that line.
    fn read_inline(&mut self, label: &str) -> io::Result<Prompted>;
}
