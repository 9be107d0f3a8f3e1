//! Line-oriented terminal console for turn-taking dialogues.
//!
//! Invariant: dialogue text goes to stdout through a [`Console`]; diagnostics
//! go through `tracing` and never interleave with it when a log file is set.
//!
//! # Public API Overview
//! - Read and write dialogue lines through the [`Console`] trait, backed by
//!   [`ProcessConsole`] in the binary and by scripted fakes in tests.
//! - Color speaker labels with [`Palette`] and measure them with
//!   [`visible_width`].
//! - Route SIGINT/SIGTERM into a shared flag via [`install_interrupt_handler`].

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;

pub use crate::config::EnvConfig;
pub use crate::core::console::{Console, Prompted};
pub use crate::core::style::{Color, Palette};
pub use crate::core::width::{strip_ansi, visible_width};
pub use crate::logging::init_logging;
pub use crate::platform::process_console::ProcessConsole;
#[cfg(unix)]
pub use crate::platform::signals::{install_interrupt_handler, SignalHookGuard};
pub use crate::platform::signals::INTERRUPT_EXIT_CODE;
