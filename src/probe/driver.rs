//! Producer-side drivers: scripted replay and live feeds on dedicated threads.
//!
//! These supply the producer execution context in tests. The probe itself
//! owns no threads; a driver replays a script (or drains a live feed) into
//! any [`StreamSink`] from a spawned thread, so awaits and assertions really
//! cross thread boundaries.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded};
use tracing::{debug, trace};

use crate::core::errors::{ProbeError, Result};
use crate::probe::event::StreamEvent;
use crate::probe::sink::StreamSink;

/// Live feed capacity. Bounded so a stalled sink applies backpressure to the
/// feeding test thread instead of buffering without limit.
const LIVE_FEED_CAP: usize = 64;

/// One step of a scripted producer.
#[derive(Debug, Clone)]
pub enum DriverStep<T, E> {
    /// Deliver a stream event to the sink.
    Emit(StreamEvent<T, E>),
    /// Sleep on the producer thread before the next step.
    Pause(Duration),
}

/// Handle on a spawned producer thread.
pub struct ProducerHandle {
    handle: JoinHandle<()>,
    component: &'static str,
}

impl ProducerHandle {
    /// Wait for the producer thread to finish its script or feed.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| ProbeError::ProducerPanicked {
                component: self.component,
            })
    }
}

/// Sending half of a live producer.
///
/// Dropping the feed without a terminal event ends the producer thread; the
/// stream then simply never terminates and awaits on it time out.
pub struct EventFeed<T, E> {
    tx: Sender<StreamEvent<T, E>>,
}

impl<T, E> EventFeed<T, E> {
    /// Enqueue one event for delivery on the producer thread.
    ///
    /// Fails once the producer has drained a terminal event and exited.
    pub fn send(&self, event: StreamEvent<T, E>) -> Result<()> {
        self.tx.send(event).map_err(|_| ProbeError::ChannelClosed {
            component: "live-producer",
        })
    }
}

/// Replay `steps` into `sink` from a dedicated producer thread.
pub fn spawn_scripted<T, E>(
    steps: Vec<DriverStep<T, E>>,
    sink: Arc<dyn StreamSink<T, E>>,
) -> ProducerHandle
where
    T: Send + 'static,
    E: Send + 'static,
{
    let handle = thread::spawn(move || {
        debug!(steps = steps.len(), "scripted producer starting");
        for step in steps {
            match step {
                DriverStep::Pause(pause) => thread::sleep(pause),
                DriverStep::Emit(event) => emit(sink.as_ref(), event),
            }
        }
        debug!("scripted producer finished");
    });
    ProducerHandle {
        handle,
        component: "scripted-producer",
    }
}

/// Spawn a producer thread that drains a bounded feed into `sink`.
///
/// The thread exits after delivering a terminal event (or when the feed is
/// dropped); later sends fail with a closed-channel error.
pub fn spawn_live<T, E>(sink: Arc<dyn StreamSink<T, E>>) -> (EventFeed<T, E>, ProducerHandle)
where
    T: Send + 'static,
    E: Send + 'static,
{
    let (tx, rx) = bounded::<StreamEvent<T, E>>(LIVE_FEED_CAP);
    let handle = thread::spawn(move || {
        for event in rx {
            let terminal = event.is_terminal();
            emit(sink.as_ref(), event);
            if terminal {
                break;
            }
        }
        debug!("live producer drained");
    });
    (
        EventFeed { tx },
        ProducerHandle {
            handle,
            component: "live-producer",
        },
    )
}

fn emit<T, E>(sink: &dyn StreamSink<T, E>, event: StreamEvent<T, E>) {
    trace!(kind = event.kind_label(), "delivering event");
    match event {
        StreamEvent::Next(value) => sink.on_next(value),
        StreamEvent::Error(cause) => sink.on_error(cause),
        StreamEvent::Complete => sink.on_complete(),
    }
}
