//! SIGINT/SIGTERM routing into the shared interrupt flag.

#[cfg(unix)]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(unix)]
use std::sync::Arc;
#[cfg(unix)]
use std::thread::{self, JoinHandle};

#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Exit status used when a second interrupt arrives before the first is handled.
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Stops the signal listener thread on drop.
#[cfg(unix)]
pub struct SignalHookGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<JoinHandle<()>>,
}

#[cfg(unix)]
impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Records one interrupt. Returns false when an earlier interrupt is still
/// pending, meaning the caller should exit immediately.
#[cfg(unix)]
pub fn raise_interrupt(flag: &AtomicBool) -> bool {
    !flag.swap(true, Ordering::SeqCst)
}

/// Install SIGINT/SIGTERM handlers that set `flag`.
///
/// The dialogue clears the flag once it has reacted to an interrupt. A signal
/// that arrives while the flag is still set terminates the process with
/// [`INTERRUPT_EXIT_CODE`].
#[cfg(unix)]
pub fn install_interrupt_handler(flag: Arc<AtomicBool>) -> std::io::Result<SignalHookGuard> {
    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM])?;
    let handle = signals.handle();

    let thread = thread::spawn(move || {
        for signal in signals.forever() {
            tracing::debug!(signal, "interrupt received");
            if !raise_interrupt(&flag) {
                tracing::warn!("second interrupt while the first is pending, exiting");
                println!();
                std::process::exit(INTERRUPT_EXIT_CODE);
            }
        }
    });

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn first_interrupt_is_recorded_and_second_requests_exit() {
        let flag = AtomicBool::new(false);

        assert!(raise_interrupt(&flag));
        assert!(flag.load(Ordering::SeqCst));
        assert!(!raise_interrupt(&flag));

        flag.store(false, Ordering::SeqCst);
        assert!(raise_interrupt(&flag));
    }

    #[test]
    fn guard_drop_stops_listener() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = install_interrupt_handler(Arc::clone(&flag)).expect("signals should register");
        drop(guard);
        assert!(!flag.load(Ordering::SeqCst));
    }
}
