//! Receiver contracts and the capture-vs-forward sink policy.

use std::fmt;
use std::sync::Arc;

/// Push-stream receiver: zero or more `on_next` calls, then exactly one
/// terminal call, all from a single logical producer.
///
/// The generic observer's `on_complete` and the streaming receiver's
/// `on_completed` are two spellings of the same terminal event; the provided
/// alias is the only place the translation lives.
pub trait StreamSink<T, E>: Send + Sync {
    /// Deliver a value.
    fn on_next(&self, value: T);

    /// Deliver the stream's failure; ends the stream.
    fn on_error(&self, cause: E);

    /// Deliver successful completion; ends the stream.
    fn on_complete(&self);

    /// Streaming-receiver spelling of [`StreamSink::on_complete`].
    fn on_completed(&self) {
        self.on_complete();
    }
}

impl<T, E, S> StreamSink<T, E> for Arc<S>
where
    S: StreamSink<T, E> + ?Sized,
{
    fn on_next(&self, value: T) {
        (**self).on_next(value);
    }

    fn on_error(&self, cause: E) {
        (**self).on_error(cause);
    }

    fn on_complete(&self) {
        (**self).on_complete();
    }
}

/// Receiver that accepts and drops every event in O(1).
///
/// For callers that must hand *some* receiver to an API whose outcome the
/// scenario does not care about. Never blocks, never panics, holds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl<T, E> StreamSink<T, E> for DiscardSink {
    fn on_next(&self, _value: T) {}

    fn on_error(&self, _cause: E) {}

    fn on_complete(&self) {}
}

/// What the probe does with events after recording them.
pub enum SinkPolicy<T, E> {
    /// Record only.
    Capture,
    /// Record, then relay to a downstream receiver in delivery order.
    /// The downstream is borrowed for the probe's lifetime, never closed
    /// beyond forwarding the terminal it received.
    Forward(Arc<dyn StreamSink<T, E>>),
}

impl<T, E> fmt::Debug for SinkPolicy<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture => f.write_str("Capture"),
            Self::Forward(_) => f.write_str("Forward(..)"),
        }
    }
}
