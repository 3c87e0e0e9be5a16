//! Stream event model: tagged signals, terminal outcomes, protocol violations.

#![allow(missing_docs)]

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::errors::ProbeError;

/// Single signal delivered by a stream producer.
///
/// A well-behaved stream delivers zero or more `Next` events followed by
/// exactly one of `Error` or `Complete`, and nothing after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent<T, E> {
    /// A value.
    Next(T),
    /// The stream's own failure; ends the stream.
    Error(E),
    /// Successful completion; ends the stream.
    Complete,
}

impl<T, E> StreamEvent<T, E> {
    /// Whether this event ends the stream's lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Complete)
    }

    /// Short label for logging.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Next(_) => "next",
            Self::Error(_) => "error",
            Self::Complete => "complete",
        }
    }
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome<E> {
    /// Stream finished without a failure.
    Completed,
    /// Stream reported a failure, preserved verbatim.
    Errored(E),
}

impl<E> TerminalOutcome<E> {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Outcome tag for messages and summaries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Errored(_) => "errored",
        }
    }
}

/// Classification of a broken stream contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// A second terminal signal after the stream already ended.
    DuplicateTerminal,
    /// A value delivered after the terminal signal.
    NextAfterTerminal,
}

impl ViolationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateTerminal => "duplicate-terminal",
            Self::NextAfterTerminal => "next-after-terminal",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded evidence that the producer broke the stream contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}

impl Violation {
    #[must_use]
    pub fn new(kind: ViolationKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
            recorded_at: Utc::now(),
        }
    }

    /// The error every post-violation assertion reports.
    #[must_use]
    pub fn to_error(&self) -> ProbeError {
        ProbeError::Violation {
            kind: self.kind,
            details: self.details.clone(),
        }
    }
}
