//! Stdin/stdout console used by the `socratic` binary.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(unix)]
use libc::c_int;

use crate::core::console::{Console, Prompted};
use crate::core::width::visible_width;

#[cfg(unix)]
const POLL_INTERVAL_MS: i32 = 50;

#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: i32) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    if result < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    Ok(result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0)
}

#[cfg(unix)]
fn read_fd(fd: c_int, buffer: &mut [u8]) -> io::Result<usize> {
    loop {
        let result = unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut libc::c_void, buffer.len()) };
        if result >= 0 {
            return Ok(result as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// Console over the process's stdin and stdout.
///
/// Reads poll stdin so that a pending interrupt ends the read even while the
/// user is mid-line. End of input is reported as [`Prompted::Interrupted`].
pub struct ProcessConsole {
    interrupt: Arc<AtomicBool>,
    pending: Vec<u8>,
    #[cfg(unix)]
    stdin_fd: c_int,
}

impl ProcessConsole {
    pub fn new(interrupt: Arc<AtomicBool>) -> Self {
        Self {
            interrupt,
            pending: Vec::new(),
            #[cfg(unix)]
            stdin_fd: libc::STDIN_FILENO,
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    fn take_pending_line(&mut self) -> Option<String> {
        let newline = self.pending.iter().position(|byte| *byte == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=newline).collect();
        Some(decode_line(&line))
    }

    #[cfg(unix)]
    fn read_raw_line(&mut self) -> io::Result<Prompted> {
        let mut buffer = [0u8; 1024];

        loop {
            if let Some(line) = self.take_pending_line() {
                return Ok(Prompted::Line(line));
            }
            if self.interrupted() {
                tracing::debug!("input read interrupted");
                self.pending.clear();
                self.write("\n")?;
                return Ok(Prompted::Interrupted);
            }
            if !poll_readable(self.stdin_fd, POLL_INTERVAL_MS)? {
                continue;
            }

            let read = read_fd(self.stdin_fd, &mut buffer)?;
            if read == 0 {
                tracing::debug!("stdin reached end of input");
                if self.pending.is_empty() {
                    return Ok(Prompted::Interrupted);
                }
                let rest = std::mem::take(&mut self.pending);
                return Ok(Prompted::Line(decode_line(&rest)));
            }
            self.pending.extend_from_slice(&buffer[..read]);
        }
    }

    #[cfg(not(unix))]
    fn read_raw_line(&mut self) -> io::Result<Prompted> {
        if let Some(line) = self.take_pending_line() {
            return Ok(Prompted::Line(line));
        }
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 || self.interrupted() {
            return Ok(Prompted::Interrupted);
        }
        Ok(Prompted::Line(decode_line(line.as_bytes())))
    }
}

impl Console for ProcessConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Prompted> {
        self.write(prompt)?;
        self.read_raw_line()
    }

    fn read_inline(&mut self, label: &str) -> io::Result<Prompted> {
        self.write(label)?;
        let prompted = self.read_raw_line()?;
        if let Prompted::Line(text) = &prompted {
            self.write(&inline_restore_sequence(label, text))?;
        }
        Ok(prompted)
    }
}

/// Escape sequence that moves the cursor from the start of the line below
/// the prompt back to the end of what was shown on the prompt line.
pub fn inline_restore_sequence(label: &str, typed: &str) -> String {
    if typed.is_empty() {
        format!("\x1b[F\x1b[{}C\x1b[K", visible_width(label))
    } else {
        format!("\x1b[F\x1b[{}C", visible_width(label) + visible_width(typed))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches(['\n', '\r']).to_string()
}
