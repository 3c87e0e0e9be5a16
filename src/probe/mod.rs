//! Stream capture harness: event model, terminal gate, sink policies,
//! the recording probe, and producer-side test drivers.

pub mod driver;
pub mod event;
pub mod gate;
pub mod recorder;
pub mod sink;
