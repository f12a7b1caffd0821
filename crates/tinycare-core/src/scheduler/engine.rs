//! Break scheduler state machine.
//!
//! A single cancellable one-shot delay. Like the rest of the core it has no
//! internal thread: the caller supplies a monotonic `now_ms` and calls
//! `poll()` (or `handle()`) to let the deadline elapse.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --arm--> Armed --cancel--> Idle
//!               Armed --elapse--> Idle   (emits BreakTaken)
//! ```
//!
//! Arming while already armed keeps the pending timer and its deadline.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::host::HostEvent;

/// One armed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakTimer {
    /// Monotonic time (ms) at which the timer was armed.
    pub armed_at_ms: u64,
    pub duration_ms: u64,
    #[serde(default)]
    pub cancelled: bool,
}

impl BreakTimer {
    pub fn new(armed_at_ms: u64, duration_ms: u64) -> Self {
        Self {
            armed_at_ms,
            duration_ms,
            cancelled: false,
        }
    }

    pub fn deadline_ms(&self) -> u64 {
        self.armed_at_ms.saturating_add(self.duration_ms)
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms()
    }

    /// Milliseconds left before the deadline (0 once due).
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms().saturating_sub(now_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Armed { timer: BreakTimer },
}

/// Whether an active-document change should arm a break timer.
///
/// True only when exactly one document is open and none of them is active.
pub fn should_arm(open_count: usize, has_active: bool) -> bool {
    open_count == 1 && !has_active
}

/// Converts open/active-document events into at most one break-taken event
/// per idle period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakScheduler {
    duration_ms: u64,
    state: SchedulerState,
}

impl BreakScheduler {
    /// Create an idle scheduler. `duration_ms` is fixed for its lifetime.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            state: SchedulerState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// The pending timer, if any.
    pub fn pending(&self) -> Option<&BreakTimer> {
        match &self.state {
            SchedulerState::Armed { timer } => Some(timer),
            SchedulerState::Idle => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending().is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending().map(BreakTimer::deadline_ms)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm a new timer at `now_ms`.
    ///
    /// While a timer is pending the request is ignored and the original
    /// deadline stands.
    pub fn arm(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            SchedulerState::Idle => {
                let timer = BreakTimer::new(now_ms, self.duration_ms);
                self.state = SchedulerState::Armed { timer };
                tracing::debug!(
                    armed_at_ms = now_ms,
                    deadline_ms = timer.deadline_ms(),
                    "break timer armed"
                );
                Some(Event::BreakArmed {
                    timer,
                    at: Utc::now(),
                })
            }
            SchedulerState::Armed { timer } => {
                tracing::debug!(
                    remaining_ms = timer.remaining_ms(now_ms),
                    "break timer already pending, ignoring re-arm"
                );
                Some(Event::BreakRearmIgnored {
                    timer,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Drop the pending timer, if any. Never produces a break-taken event.
    pub fn cancel(&mut self, open_count: usize) -> Option<Event> {
        match self.state {
            SchedulerState::Armed { mut timer } => {
                self.state = SchedulerState::Idle;
                timer.cancelled = true;
                tracing::debug!(open_count, "cancelling break timer");
                Some(Event::BreakCancelled {
                    timer,
                    open_count,
                    at: Utc::now(),
                })
            }
            SchedulerState::Idle => None,
        }
    }

    /// Fire the pending timer if its deadline has been reached.
    pub fn poll(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            SchedulerState::Armed { timer } if timer.is_due(now_ms) => {
                self.state = SchedulerState::Idle;
                tracing::info!(duration_ms = timer.duration_ms, "break taken");
                Some(Event::BreakTaken {
                    timer,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// A document was opened: cancel any pending timer, then report whether
    /// a work timer may start.
    pub fn on_document_opened(&mut self, open_count: usize) -> Vec<Event> {
        let mut events: Vec<Event> = self.cancel(open_count).into_iter().collect();
        events.push(Event::CanStartTimer {
            can_start: open_count > 0,
            at: Utc::now(),
        });
        events
    }

    /// The active document changed: arm when [`should_arm`] holds.
    pub fn on_active_changed(
        &mut self,
        open_count: usize,
        has_active: bool,
        now_ms: u64,
    ) -> Option<Event> {
        tracing::debug!(open_count, has_active, "active document changed");
        if should_arm(open_count, has_active) {
            self.arm(now_ms)
        } else {
            None
        }
    }

    /// Apply a host event observed at `now_ms`.
    ///
    /// The deadline is checked first, so a timer that is already due fires
    /// before a later event can cancel it.
    pub fn handle(&mut self, event: HostEvent, now_ms: u64) -> Vec<Event> {
        let mut events: Vec<Event> = self.poll(now_ms).into_iter().collect();
        match event {
            HostEvent::DocumentOpened { open_count } => {
                events.extend(self.on_document_opened(open_count));
            }
            HostEvent::ActiveDocumentChanged {
                open_count,
                has_active,
            } => {
                events.extend(self.on_active_changed(open_count, has_active, now_ms));
            }
        }
        events
    }
}
