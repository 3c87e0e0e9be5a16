//! Capture core and deferred assertion surface.
//!
//! A [`StreamProbe`] is handed to the producer as a plain receiver (it
//! implements [`StreamSink`]) and held by the controlling thread for
//! assertions. The producer writes captured state under its mutex; the
//! controller blocks on the terminal gate, then reads. One probe serves one
//! stream and is discarded after assertion.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::core::config::{ProbeConfig, ViolationPolicy};
use crate::core::errors::{ProbeError, Result};
use crate::probe::event::{StreamEvent, TerminalOutcome, Violation, ViolationKind};
use crate::probe::gate::TerminalGate;
use crate::probe::sink::{SinkPolicy, StreamSink};

// ──────────────────── captured state ────────────────────

struct CapturedState<T, E> {
    values: Vec<T>,
    terminal: Option<TerminalOutcome<E>>,
    violations: Vec<Violation>,
}

impl<T, E> Default for CapturedState<T, E> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            terminal: None,
            violations: Vec::new(),
        }
    }
}

/// Serializable diagnostics snapshot of a probe.
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct ProbeSummary {
    pub value_count: usize,
    /// `"completed"`, `"errored"`, or absent while the stream is live.
    pub outcome: Option<&'static str>,
    pub violations: Vec<Violation>,
    pub captured_at: DateTime<Utc>,
}

// ──────────────────── probe ────────────────────

/// Captures one push-stream's output for deferred, blocking assertions.
pub struct StreamProbe<T, E> {
    state: Mutex<CapturedState<T, E>>,
    gate: TerminalGate,
    policy: SinkPolicy<T, E>,
    config: ProbeConfig,
}

impl<T, E> StreamProbe<T, E> {
    /// Capture-only probe with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(SinkPolicy::Capture, ProbeConfig::default())
    }

    /// Capture-only probe with explicit configuration.
    #[must_use]
    pub fn with_config(config: ProbeConfig) -> Self {
        Self::with_policy(SinkPolicy::Capture, config)
    }

    /// Probe that relays every accepted event to `downstream` after
    /// recording it, in delivery order.
    #[must_use]
    pub fn forwarding(downstream: Arc<dyn StreamSink<T, E>>) -> Self {
        Self::with_policy(SinkPolicy::Forward(downstream), ProbeConfig::default())
    }

    /// General constructor over the closed set of sink policies.
    #[must_use]
    pub fn with_policy(policy: SinkPolicy<T, E>, config: ProbeConfig) -> Self {
        Self {
            state: Mutex::new(CapturedState::default()),
            gate: TerminalGate::new(),
            policy,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    // ──────────────────── awaits ────────────────────

    /// Block until the stream reaches a terminal state or `timeout` elapses.
    ///
    /// `true` means terminal was observed within the bound; `false` is an
    /// ordinary timeout, not a failure.
    #[must_use]
    pub fn await_terminal(&self, timeout: Duration) -> bool {
        self.gate.await_open(timeout)
    }

    /// [`Self::await_terminal`] with the configured default bound.
    #[must_use]
    pub fn await_terminal_default(&self) -> bool {
        self.await_terminal(self.config.timeouts.terminal())
    }

    /// Block until at least `expected` values have been captured.
    ///
    /// Polls at the configured interval. Returns `false` as soon as the
    /// stream terminates short of `expected` (waiting longer can never
    /// succeed) or when `timeout` elapses.
    #[must_use]
    pub fn await_count(&self, expected: usize, timeout: Duration) -> bool {
        let poll = self.config.timeouts.count_poll();
        let deadline = Instant::now() + timeout;
        loop {
            let (reached, terminated) = {
                let state = self.state.lock();
                (state.values.len() >= expected, state.terminal.is_some())
            };
            if reached {
                return true;
            }
            if terminated {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            thread::sleep(poll.min(remaining));
        }
    }

    /// [`Self::await_count`] with the configured default bound.
    #[must_use]
    pub fn await_count_default(&self, expected: usize) -> bool {
        self.await_count(expected, self.config.timeouts.count())
    }

    // ──────────────────── assertions ────────────────────

    /// Fails unless the stream completed successfully.
    pub fn assert_complete(&self) -> Result<&Self> {
        let state = self.state.lock();
        Self::guard_violations(&state)?;
        match &state.terminal {
            Some(TerminalOutcome::Completed) => Ok(self),
            Some(outcome @ TerminalOutcome::Errored(_)) => Err(ProbeError::UnexpectedOutcome {
                expected: "completed",
                observed: outcome.label().to_string(),
            }),
            None => Err(ProbeError::UnexpectedOutcome {
                expected: "completed",
                observed: "no terminal signal yet".to_string(),
            }),
        }
    }

    /// Fails only when the stream terminated with an error outcome.
    pub fn assert_no_errors(&self) -> Result<&Self> {
        let state = self.state.lock();
        Self::guard_violations(&state)?;
        match &state.terminal {
            Some(TerminalOutcome::Errored(_)) => Err(ProbeError::UnexpectedOutcome {
                expected: "completion or a live stream",
                observed: "errored".to_string(),
            }),
            _ => Ok(self),
        }
    }

    /// Fails unless exactly `expected` values were captured.
    pub fn assert_value_count(&self, expected: usize) -> Result<&Self> {
        let state = self.state.lock();
        Self::guard_violations(&state)?;
        let actual = state.values.len();
        if actual == expected {
            Ok(self)
        } else {
            Err(ProbeError::ValueCountMismatch { expected, actual })
        }
    }

    // ──────────────────── accessors ────────────────────

    #[must_use]
    pub fn value_count(&self) -> usize {
        self.state.lock().values.len()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.gate.is_open()
    }

    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        self.state.lock().violations.clone()
    }

    /// Diagnostics snapshot: counts, outcome tag, recorded violations.
    #[must_use]
    pub fn summary(&self) -> ProbeSummary {
        let state = self.state.lock();
        ProbeSummary {
            value_count: state.values.len(),
            outcome: state.terminal.as_ref().map(TerminalOutcome::label),
            violations: state.violations.clone(),
            captured_at: Utc::now(),
        }
    }

    /// [`Self::summary`] rendered as a single JSON line.
    pub fn summary_json(&self) -> Result<String> {
        serde_json::to_string(&self.summary()).map_err(Into::into)
    }

    fn guard_violations(state: &CapturedState<T, E>) -> Result<()> {
        state
            .violations
            .first()
            .map_or(Ok(()), |first| Err(first.to_error()))
    }

    fn note_violation(&self, state: &mut CapturedState<T, E>, kind: ViolationKind, details: String) {
        error!(%kind, %details, "stream protocol violation");
        let violation = Violation::new(kind, details);
        match self.config.violations.policy {
            ViolationPolicy::Record => state.violations.push(violation),
            // parking_lot guards unlock on unwind; no poisoning.
            ViolationPolicy::Panic => panic!("{}", violation.to_error()),
        }
    }
}

impl<T, E> StreamProbe<T, E>
where
    T: Clone,
{
    /// Captured value at `index`, in delivery order.
    ///
    /// Indices are stable once the stream is terminal; synchronize via
    /// [`Self::await_terminal`] before reading from another thread.
    pub fn value_at(&self, index: usize) -> Result<T> {
        let state = self.state.lock();
        Self::guard_violations(&state)?;
        state
            .values
            .get(index)
            .cloned()
            .ok_or(ProbeError::IndexOutOfRange {
                index,
                len: state.values.len(),
            })
    }

    /// Snapshot of every captured value, in delivery order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.state.lock().values.clone()
    }
}

impl<T, E> StreamProbe<T, E>
where
    E: Clone,
{
    /// The captured error cause, if the stream terminated with one.
    #[must_use]
    pub fn first_error(&self) -> Option<E> {
        match &self.state.lock().terminal {
            Some(TerminalOutcome::Errored(cause)) => Some(cause.clone()),
            _ => None,
        }
    }

    /// The terminal outcome, if the stream has one yet.
    #[must_use]
    pub fn outcome(&self) -> Option<TerminalOutcome<E>> {
        self.state.lock().terminal.clone()
    }
}

// ──────────────────── capture core ────────────────────

impl<T, E> StreamProbe<T, E>
where
    T: Clone,
    E: Clone,
{
    /// Apply one producer signal to the captured state.
    ///
    /// Safe to call from one producer thread while another thread reads via
    /// the assertion surface. Signals after a terminal are violations and
    /// are never merged into captured values or forwarded.
    pub fn deliver(&self, event: StreamEvent<T, E>) {
        match event {
            StreamEvent::Next(value) => self.capture_next(value),
            StreamEvent::Error(cause) => self.capture_terminal(TerminalOutcome::Errored(cause)),
            StreamEvent::Complete => self.capture_terminal(TerminalOutcome::Completed),
        }
    }

    fn capture_next(&self, value: T) {
        let mut state = self.state.lock();
        if state.terminal.is_some() {
            self.note_violation(
                &mut state,
                ViolationKind::NextAfterTerminal,
                "value delivered after the terminal signal".to_string(),
            );
            return;
        }
        match &self.policy {
            SinkPolicy::Capture => {
                state.values.push(value);
                let count = state.values.len();
                drop(state);
                trace!(count, "captured value");
            }
            SinkPolicy::Forward(downstream) => {
                state.values.push(value.clone());
                let count = state.values.len();
                drop(state);
                trace!(count, "captured value");
                downstream.on_next(value);
            }
        }
    }

    fn capture_terminal(&self, outcome: TerminalOutcome<E>) {
        let mut state = self.state.lock();
        if let Some(first) = &state.terminal {
            let details = format!(
                "second terminal signal ({}) after stream already {}",
                outcome.label(),
                first.label()
            );
            self.note_violation(&mut state, ViolationKind::DuplicateTerminal, details);
            return;
        }
        state.terminal = Some(outcome.clone());
        drop(state);
        debug!(outcome = outcome.label(), "stream reached terminal state");
        // Forward before releasing waiters: a controller unblocked by the
        // gate must also observe a fully-delivered downstream.
        if let SinkPolicy::Forward(downstream) = &self.policy {
            match outcome {
                TerminalOutcome::Completed => downstream.on_complete(),
                TerminalOutcome::Errored(cause) => downstream.on_error(cause),
            }
        }
        self.gate.open();
    }
}

impl<T, E> Default for StreamProbe<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for StreamProbe<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("StreamProbe")
            .field("value_count", &state.values.len())
            .field(
                "terminal",
                &state.terminal.as_ref().map(TerminalOutcome::label),
            )
            .field("violations", &state.violations.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T, E> StreamSink<T, E> for StreamProbe<T, E>
where
    T: Clone + Send,
    E: Clone + Send,
{
    fn on_next(&self, value: T) {
        self.deliver(StreamEvent::Next(value));
    }

    fn on_error(&self, cause: E) {
        self.deliver(StreamEvent::Error(cause));
    }

    fn on_complete(&self) {
        self.deliver(StreamEvent::Complete);
    }
}
