//! Plugin activation and event wiring.
//!
//! `Plugin::activate` sets up the care library and the break scheduler. A
//! care library that fails to initialize produces one warning for the user
//! and nothing else: the scheduler is wired exactly the same way.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::care::{CareCallback, CareHandle, CareLibrary, CareNotification, TwitterCredentials};
use crate::config::Config;
use crate::error::ConfigError;
use crate::events::Event;
use crate::host::{HostEvent, Notifier};
use crate::scheduler::{BreakScheduler, Reactor};

/// Title of the warning shown when the care library cannot be initialized.
pub const INIT_FAILURE_TITLE: &str = "You may be missing some of the Twitter configuration.";
/// Detail of the warning shown when the care library cannot be initialized.
pub const INIT_FAILURE_DETAIL: &str = "Please open up the settings and add your keys.";

type Outbox = Arc<Mutex<Vec<Event>>>;

pub struct Plugin {
    scheduler: BreakScheduler,
    care: Box<dyn CareLibrary>,
    handle: Option<CareHandle>,
    outbox: Outbox,
}

impl Plugin {
    /// Initialize the care library and wire the scheduler.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] if `config` fails validation.
    /// A care library that cannot initialize is not an error.
    pub fn activate(
        config: &Config,
        mut care: Box<dyn CareLibrary>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            care = care.name(),
            break_time = config.break_time,
            "tinycare is now active"
        );

        let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
        let callback: CareCallback = {
            let notifier = Arc::clone(&notifier);
            let outbox = Arc::clone(&outbox);
            Arc::new(move |message: CareNotification| {
                tracing::info!(bot = %message.bot, "care notification");
                notifier.info(&message.bot, &message.text);
                if let Ok(mut pending) = outbox.lock() {
                    pending.push(Event::CareNotification {
                        bot: message.bot,
                        text: message.text,
                        at: Utc::now(),
                    });
                }
            })
        };

        let credentials = TwitterCredentials::from(&config.twitter);
        let handle = match care.initialize(&credentials, callback) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "care library initialization failed");
                notifier.warning(INIT_FAILURE_TITLE, INIT_FAILURE_DETAIL);
                if let Ok(mut pending) = outbox.lock() {
                    pending.push(Event::CareInitFailed {
                        reason: e.to_string(),
                        at: Utc::now(),
                    });
                }
                None
            }
        };

        Ok(Self {
            scheduler: BreakScheduler::new(config.break_duration_ms()),
            care,
            handle,
            outbox,
        })
    }

    /// Whether the care library accepted its credentials.
    pub fn is_care_ready(&self) -> bool {
        self.handle.is_some()
    }

    pub fn scheduler(&self) -> &BreakScheduler {
        &self.scheduler
    }

    pub fn handle_event(&mut self, event: HostEvent, now_ms: u64) -> Vec<Event> {
        let events = self.scheduler.handle(event, now_ms);
        self.dispatch(events)
    }

    pub fn poll(&mut self, now_ms: u64) -> Vec<Event> {
        let events = self.scheduler.poll(now_ms).into_iter().collect();
        self.dispatch(events)
    }

    /// Events queued outside of `handle_event`/`poll` (activation results).
    pub fn drain(&mut self) -> Vec<Event> {
        self.outbox
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    /// Forward scheduler events to the care library. Care notifications the
    /// library raises in response follow the event that caused them.
    fn dispatch(&mut self, events: Vec<Event>) -> Vec<Event> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            let taken = event.is_break_taken();
            if let Event::CanStartTimer { can_start, .. } = &event {
                self.care.emit_can_start_timer(*can_start);
            }
            out.push(event);
            if taken {
                self.care.emit_break_taken();
                out.extend(self.drain());
            }
        }
        out
    }
}

impl Reactor for Plugin {
    fn start(&mut self) -> Vec<Event> {
        self.drain()
    }

    fn handle(&mut self, event: HostEvent, now_ms: u64) -> Vec<Event> {
        self.handle_event(event, now_ms)
    }

    fn poll(&mut self, now_ms: u64) -> Vec<Event> {
        Plugin::poll(self, now_ms)
    }

    fn deadline_ms(&self) -> Option<u64> {
        self.scheduler.deadline_ms()
    }
}
