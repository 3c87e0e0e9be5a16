//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use stream_probe::prelude::*;
//! ```

// Core
pub use crate::core::config::{ProbeConfig, TimeoutConfig, ViolationConfig, ViolationPolicy};
pub use crate::core::errors::{ProbeError, Result};

// Probe
pub use crate::probe::driver::{
    DriverStep, EventFeed, ProducerHandle, spawn_live, spawn_scripted,
};
pub use crate::probe::event::{StreamEvent, TerminalOutcome, Violation, ViolationKind};
pub use crate::probe::gate::TerminalGate;
pub use crate::probe::recorder::{ProbeSummary, StreamProbe};
pub use crate::probe::sink::{DiscardSink, SinkPolicy, StreamSink};

// Codec
pub use crate::codec::buffer::{FieldBuffer, FieldValue};
pub use crate::codec::fields::{FieldReader, FieldWriter, WireRecord};

// Cache
pub use crate::cache::service::{CacheAddress, InMemoryProxy, ProxyService, SharedStore};
pub use crate::cache::store::TriggeredStore;
pub use crate::cache::trigger::{EntryTrigger, TriggerEntry, veto};
