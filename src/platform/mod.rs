//! Process-backed console and signal integrations.

pub mod process_console;
pub mod signals;

pub use process_console::ProcessConsole;
#[cfg(unix)]
pub use signals::{install_interrupt_handler, SignalHookGuard};
