use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::BreakTimer;

/// Every state change in the system produces an Event.
/// The CLI prints them; the plugin forwards the relevant ones to the care
/// library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A break timer was armed.
    BreakArmed {
        timer: BreakTimer,
        at: DateTime<Utc>,
    },
    /// An arm request arrived while a timer was already pending.
    BreakRearmIgnored {
        timer: BreakTimer,
        at: DateTime<Utc>,
    },
    /// A document was opened before the pending timer fired.
    BreakCancelled {
        timer: BreakTimer,
        open_count: usize,
        at: DateTime<Utc>,
    },
    /// The break elapsed without interruption.
    BreakTaken {
        timer: BreakTimer,
        at: DateTime<Utc>,
    },
    /// Whether a work timer may start, sent on every document open.
    CanStartTimer {
        can_start: bool,
        at: DateTime<Utc>,
    },
    CareNotification {
        bot: String,
        text: String,
        at: DateTime<Utc>,
    },
    /// The care library could not be initialized; the plugin kept going.
    CareInitFailed {
        reason: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_break_taken(&self) -> bool {
        matches!(self, Event::BreakTaken { .. })
    }
}
