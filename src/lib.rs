#![forbid(unsafe_code)]

//! Stream Probe — deferred-assertion capture for push-style value streams.
//!
//! A producer delivers zero or more values and exactly one terminal signal
//! (completion or failure) into a probe; the controlling thread awaits the
//! terminal with a bound, then asserts on everything captured, in delivery
//! order. Events can also be relayed unchanged to a real downstream receiver,
//! or discarded outright when a caller only needs *some* receiver.
//!
//! The crate additionally carries the collaborator contracts streams are
//! exercised against: a scope/name-routed cache proxy, a field-indexed codec,
//! and entry-mutation triggers, each with an in-memory realization for tests.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use stream_probe::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use stream_probe::probe::recorder::StreamProbe;
//! use stream_probe::probe::driver::{DriverStep, spawn_scripted};
//! ```

pub mod prelude;

pub mod cache;
pub mod codec;
pub mod core;
pub mod probe;
