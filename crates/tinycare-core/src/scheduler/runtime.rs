//! Async driver for the break scheduler.
//!
//! One task owns the reactor and waits on either the next host event or the
//! pending deadline. Both arms run on the same task, so arm, cancel and fire
//! are applied strictly in the order they are observed.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::engine::BreakScheduler;
use crate::events::Event;
use crate::host::HostEvent;

/// Anything that reacts to host events and a single optional deadline.
pub trait Reactor: Send + 'static {
    /// Events to publish before the first host event is read.
    fn start(&mut self) -> Vec<Event> {
        Vec::new()
    }

    fn handle(&mut self, event: HostEvent, now_ms: u64) -> Vec<Event>;

    fn poll(&mut self, now_ms: u64) -> Vec<Event>;

    /// Monotonic time (ms) at which `poll` must next run.
    fn deadline_ms(&self) -> Option<u64>;
}

impl Reactor for BreakScheduler {
    fn handle(&mut self, event: HostEvent, now_ms: u64) -> Vec<Event> {
        BreakScheduler::handle(self, event, now_ms)
    }

    fn poll(&mut self, now_ms: u64) -> Vec<Event> {
        BreakScheduler::poll(self, now_ms).into_iter().collect()
    }

    fn deadline_ms(&self) -> Option<u64> {
        BreakScheduler::deadline_ms(self)
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Drive `reactor` until `events` closes or `out` is dropped.
///
/// A timer still pending when the input closes is dropped without firing.
/// Returns the reactor so callers can inspect its final state.
pub async fn run<R: Reactor>(
    mut reactor: R,
    mut events: mpsc::Receiver<HostEvent>,
    out: mpsc::Sender<Event>,
) -> R {
    let origin = Instant::now();
    let now_ms = move || origin.elapsed().as_millis() as u64;

    for event in reactor.start() {
        if out.send(event).await.is_err() {
            return reactor;
        }
    }

    loop {
        let deadline = reactor
            .deadline_ms()
            .map(|ms| origin + Duration::from_millis(ms));

        let emitted = tokio::select! {
            biased;
            received = events.recv() => match received {
                Some(event) => {
                    tracing::trace!(open_count = event.open_count(), "host event received");
                    reactor.handle(event, now_ms())
                }
                None => {
                    if reactor.deadline_ms().is_some() {
                        tracing::debug!("event source closed, dropping pending break timer");
                    }
                    break;
                }
            },
            _ = sleep_until_deadline(deadline) => reactor.poll(now_ms()),
        };

        for event in emitted {
            if out.send(event).await.is_err() {
                tracing::debug!("event consumer gone, stopping scheduler");
                return reactor;
            }
        }
    }

    reactor
}

/// Spawn [`run`] on the current tokio runtime.
pub fn spawn<R: Reactor>(
    reactor: R,
    events: mpsc::Receiver<HostEvent>,
    out: mpsc::Sender<Event>,
) -> JoinHandle<R> {
    tokio::spawn(run(reactor, events, out))
}
