//! Harness configuration: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{ProbeError, Result};

/// Full probe configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[derive(Default)]
pub struct ProbeConfig {
    pub timeouts: TimeoutConfig,
    pub violations: ViolationConfig,
}

/// Await bounds and the count-wait polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Default bound for `await_terminal` when callers use the config default.
    pub terminal_ms: u64,
    /// Default bound for `await_count`.
    pub count_ms: u64,
    /// Poll interval while waiting for a value count.
    pub count_poll_ms: u64,
}

/// How the capture core reacts to stream protocol violations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViolationConfig {
    pub policy: ViolationPolicy,
}

/// Violation loudness policy.
///
/// `Record` keeps the violation as state and fails every later assertion;
/// `Panic` fails fast on the delivering thread.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationPolicy {
    #[default]
    Record,
    Panic,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            terminal_ms: 60_000,
            count_ms: 5_000,
            count_poll_ms: 10,
        }
    }
}

impl Default for ViolationConfig {
    fn default() -> Self {
        Self {
            policy: ViolationPolicy::Record,
        }
    }
}

impl TimeoutConfig {
    #[must_use]
    pub const fn terminal(&self) -> Duration {
        Duration::from_millis(self.terminal_ms)
    }

    #[must_use]
    pub const fn count(&self) -> Duration {
        Duration::from_millis(self.count_ms)
    }

    #[must_use]
    pub const fn count_poll(&self) -> Duration {
        Duration::from_millis(self.count_poll_ms)
    }
}

impl ProbeConfig {
    /// Default configuration path, relative to the invoking test's cwd.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from("stream_probe.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from the default
    /// path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| ProbeError::Io {
                path: path_buf.clone(),
                details: source.to_string(),
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(ProbeError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SPB_TIMEOUT_TERMINAL_MS") {
            self.timeouts.terminal_ms = parse_env_u64("SPB_TIMEOUT_TERMINAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("SPB_TIMEOUT_COUNT_MS") {
            self.timeouts.count_ms = parse_env_u64("SPB_TIMEOUT_COUNT_MS", &raw)?;
        }
        if let Some(raw) = lookup("SPB_TIMEOUT_COUNT_POLL_MS") {
            self.timeouts.count_poll_ms = parse_env_u64("SPB_TIMEOUT_COUNT_POLL_MS", &raw)?;
        }
        if let Some(raw) = lookup("SPB_VIOLATION_POLICY") {
            self.violations.policy = parse_policy(&raw)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.timeouts.terminal_ms == 0 {
            return Err(ProbeError::InvalidConfig {
                details: "timeouts.terminal_ms must be positive".into(),
            });
        }
        if self.timeouts.count_ms == 0 {
            return Err(ProbeError::InvalidConfig {
                details: "timeouts.count_ms must be positive".into(),
            });
        }
        if self.timeouts.count_poll_ms == 0 {
            return Err(ProbeError::InvalidConfig {
                details: "timeouts.count_poll_ms must be positive".into(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| ProbeError::InvalidConfig {
        details: format!("{name} must be a non-negative integer, got {raw:?}"),
    })
}

fn parse_policy(raw: &str) -> Result<ViolationPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "record" => Ok(ViolationPolicy::Record),
        "panic" => Ok(ViolationPolicy::Panic),
        other => Err(ProbeError::InvalidConfig {
            details: format!("SPB_VIOLATION_POLICY must be record or panic, got {other:?}"),
        }),
    }
}
