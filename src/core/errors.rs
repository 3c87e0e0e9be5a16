//! SPB-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

use crate::probe::event::ViolationKind;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Top-level error type for Stream Probe.
///
/// Cloneable: a captured stream's error outcome is stored as data and handed
/// back to assertions, so the fake proxy can use `ProbeError` directly as its
/// stream error type.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("[SPB-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SPB-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SPB-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SPB-1004] IO failure at {path}: {details}")]
    Io { path: PathBuf, details: String },

    #[error("[SPB-1101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[SPB-2001] stream protocol violation ({kind}): {details}")]
    Violation {
        kind: ViolationKind,
        details: String,
    },

    #[error("[SPB-2101] unexpected terminal outcome: expected {expected}, observed {observed}")]
    UnexpectedOutcome {
        expected: &'static str,
        observed: String,
    },

    #[error("[SPB-2102] value count mismatch: expected {expected}, captured {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("[SPB-2103] value index {index} out of range for {len} captured values")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("[SPB-3101] missing field {index} in record")]
    MissingField { index: u32 },

    #[error("[SPB-3102] field {index} holds {actual}, expected {expected}")]
    FieldType {
        index: u32,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("[SPB-3103] duplicate write to field {index}")]
    DuplicateField { index: u32 },

    #[error("[SPB-4101] mutation vetoed by trigger: {reason}")]
    TriggerVeto { reason: String },

    #[error("[SPB-4102] no cache named {name} in scope {scope}")]
    UnknownCache { scope: String, name: String },

    #[error("[SPB-4103] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SPB-4104] producer thread panicked in component {component}")]
    ProducerPanicked { component: &'static str },
}

impl ProbeError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SPB-1001",
            Self::MissingConfig { .. } => "SPB-1002",
            Self::ConfigParse { .. } => "SPB-1003",
            Self::Io { .. } => "SPB-1004",
            Self::Serialization { .. } => "SPB-1101",
            Self::Violation { .. } => "SPB-2001",
            Self::UnexpectedOutcome { .. } => "SPB-2101",
            Self::ValueCountMismatch { .. } => "SPB-2102",
            Self::IndexOutOfRange { .. } => "SPB-2103",
            Self::MissingField { .. } => "SPB-3101",
            Self::FieldType { .. } => "SPB-3102",
            Self::DuplicateField { .. } => "SPB-3103",
            Self::TriggerVeto { .. } => "SPB-4101",
            Self::UnknownCache { .. } => "SPB-4102",
            Self::ChannelClosed { .. } => "SPB-4103",
            Self::ProducerPanicked { .. } => "SPB-4104",
        }
    }

    /// Whether this error reports a failed assertion over captured state,
    /// as opposed to a harness or collaborator fault.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedOutcome { .. }
                | Self::ValueCountMismatch { .. }
                | Self::IndexOutOfRange { .. }
        )
    }

    /// Whether this error reports a broken producer (stream contract
    /// violation) rather than a legitimate captured outcome.
    #[must_use]
    pub const fn is_violation(&self) -> bool {
        matches!(self, Self::Violation { .. })
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for ProbeError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
