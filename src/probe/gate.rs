//! One-shot terminal latch with bounded await.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Latch released exactly once, by whichever terminal signal arrives first.
///
/// Locking the gate is the memory barrier between the producer's writes and
/// the controller's reads: an `await_open` that returns `true` happens-after
/// the `open()` that released it, so captured state read afterwards reflects
/// everything the producer wrote before the terminal.
#[derive(Debug, Default)]
pub struct TerminalGate {
    opened: Mutex<bool>,
    cond: Condvar,
}

impl TerminalGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the gate. Idempotent; only the first call notifies waiters.
    pub fn open(&self) {
        let mut opened = self.opened.lock();
        if !*opened {
            *opened = true;
            self.cond.notify_all();
        }
    }

    /// Non-blocking peek.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.opened.lock()
    }

    /// Block until the gate opens or `timeout` elapses.
    ///
    /// Returns `true` if the gate was observed open within the bound,
    /// `false` on timeout. Timeout is an ordinary outcome, never a panic.
    /// Once the gate is open every call returns `true` without blocking.
    #[must_use]
    pub fn await_open(&self, timeout: Duration) -> bool {
        let mut opened = self.opened.lock();
        if *opened {
            return true;
        }
        let result = self.cond.wait_while_for(&mut opened, |open| !*open, timeout);
        // On a timed-out wait the flag may still have flipped at the edge;
        // the flag, not the wait result, is the answer.
        if result.timed_out() { *opened } else { true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn starts_closed() {
        let gate = TerminalGate::new();
        assert!(!gate.is_open());
    }

    #[test]
    fn await_after_open_returns_immediately() {
        let gate = TerminalGate::new();
        gate.open();
        let start = Instant::now();
        assert!(gate.await_open(Duration::from_secs(60)));
        assert!(
            start.elapsed() < Duration::from_secs(1),
            "open gate must not block"
        );
    }

    #[test]
    fn open_is_idempotent() {
        let gate = TerminalGate::new();
        gate.open();
        gate.open();
        assert!(gate.is_open());
        assert!(gate.await_open(Duration::from_millis(1)));
    }

    #[test]
    fn timeout_returns_false_after_roughly_the_bound() {
        let gate = TerminalGate::new();
        let bound = Duration::from_millis(100);
        let start = Instant::now();
        assert!(!gate.await_open(bound));
        let elapsed = start.elapsed();
        assert!(elapsed >= bound, "returned early: {elapsed:?}");
        assert!(
            elapsed < Duration::from_secs(5),
            "timeout wildly overshot: {elapsed:?}"
        );
        assert!(!gate.is_open());
    }

    #[test]
    fn open_from_another_thread_releases_waiter() {
        let gate = Arc::new(TerminalGate::new());
        let opener = Arc::clone(&gate);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            opener.open();
        });
        assert!(gate.await_open(Duration::from_secs(10)));
        handle.join().expect("opener thread");
    }
}
