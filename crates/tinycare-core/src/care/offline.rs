//! Local care library -- validates credentials and answers breaks with a
//! rotating set of care messages. No network access.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use super::{CareCallback, CareHandle, CareLibrary, CareNotification, TwitterCredentials};
use crate::error::InitError;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn default_messages() -> Vec<CareNotification> {
    [
        ("@tinycarebot", "remember to take a deep breath"),
        ("@selfcarebot", "please remember to drink some water"),
        ("@tinycarebot", "stretch your shoulders and look away from the screen"),
        ("@selfcarebot", "that break was well earned, welcome back"),
    ]
    .into_iter()
    .map(|(bot, text)| CareNotification {
        text: text.to_string(),
        bot: bot.to_string(),
    })
    .collect()
}

pub struct OfflineCare {
    registered: Option<(CareHandle, CareCallback)>,
    messages: Vec<CareNotification>,
    cursor: AtomicUsize,
    can_start: AtomicBool,
    breaks_taken: AtomicU64,
}

impl Default for OfflineCare {
    fn default() -> Self {
        Self::with_messages(default_messages())
    }
}

impl OfflineCare {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `messages` instead of the built-in set. An empty list disables
    /// break-taken messages.
    pub fn with_messages(messages: Vec<CareNotification>) -> Self {
        Self {
            registered: None,
            messages,
            cursor: AtomicUsize::new(0),
            can_start: AtomicBool::new(false),
            breaks_taken: AtomicU64::new(0),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.registered.is_some()
    }

    /// Last value passed to `emit_can_start_timer`.
    pub fn can_start_timer(&self) -> bool {
        self.can_start.load(Ordering::Relaxed)
    }

    pub fn breaks_taken(&self) -> u64 {
        self.breaks_taken.load(Ordering::Relaxed)
    }

    fn next_message(&self) -> Option<CareNotification> {
        if self.messages.is_empty() {
            return None;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.messages.len();
        self.messages.get(i).cloned()
    }
}

impl CareLibrary for OfflineCare {
    fn name(&self) -> &str {
        "offline"
    }

    fn initialize(
        &mut self,
        credentials: &TwitterCredentials,
        on_notification: CareCallback,
    ) -> Result<CareHandle, InitError> {
        if let Some(missing) = credentials.first_missing() {
            return Err(InitError::MissingCredential(missing));
        }
        let handle = CareHandle::new(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        self.registered = Some((handle, on_notification));
        tracing::debug!(handle = handle.id(), "offline care library initialized");
        Ok(handle)
    }

    fn notify(&self, handle: &CareHandle, message: CareNotification) {
        match &self.registered {
            Some((registered, callback)) if registered == handle => callback(message),
            _ => tracing::warn!(handle = handle.id(), "care notification for unknown handle dropped"),
        }
    }

    fn emit_break_taken(&self) {
        self.breaks_taken.fetch_add(1, Ordering::Relaxed);
        let Some((handle, _)) = &self.registered else {
            return;
        };
        if let Some(message) = self.next_message() {
            self.notify(handle, message);
        }
    }

    fn emit_can_start_timer(&self, can_start: bool) {
        tracing::debug!(can_start, "can start timer");
        self.can_start.store(can_start, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn creds() -> TwitterCredentials {
        TwitterCredentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_secret: "as".into(),
        }
    }

    fn recorder() -> (CareCallback, Arc<Mutex<Vec<CareNotification>>>) {
        let seen: Arc<Mutex<Vec<CareNotification>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: CareCallback = Arc::new(move |n: CareNotification| sink.lock().unwrap().push(n));
        (callback, seen)
    }

    #[test]
    fn rejects_missing_credentials() {
        let mut care = OfflineCare::new();
        let (callback, _) = recorder();
        let err = care
            .initialize(&TwitterCredentials::default(), callback)
            .unwrap_err();
        assert_eq!(err, InitError::MissingCredential("consumer_key"));
        assert!(!care.is_initialized());
    }

    #[test]
    fn break_taken_posts_rotating_messages() {
        let mut care = OfflineCare::with_messages(vec![
            CareNotification {
                text: "one".into(),
                bot: "a".into(),
            },
            CareNotification {
                text: "two".into(),
                bot: "b".into(),
            },
        ]);
        let (callback, seen) = recorder();
        care.initialize(&creds(), callback).unwrap();

        care.emit_break_taken();
        care.emit_break_taken();
        care.emit_break_taken();

        let seen = seen.lock().unwrap();
        let texts: Vec<_> = seen.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "one"]);
        assert_eq!(care.breaks_taken(), 3);
    }

    #[test]
    fn break_taken_without_init_is_counted_but_silent() {
        let care = OfflineCare::new();
        care.emit_break_taken();
        assert_eq!(care.breaks_taken(), 1);
    }

    #[test]
    fn notify_ignores_foreign_handle() {
        let mut care = OfflineCare::new();
        let (callback, seen) = recorder();
        let handle = care.initialize(&creds(), callback).unwrap();
        care.notify(
            &CareHandle::new(handle.id() + 1_000),
            CareNotification {
                text: "x".into(),
                bot: "y".into(),
            },
        );
        assert!(seen.lock().unwrap().is_empty());

        care.notify(
            &handle,
            CareNotification {
                text: "x".into(),
                bot: "y".into(),
            },
        );
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn tracks_can_start_timer() {
        let care = OfflineCare::new();
        care.emit_can_start_timer(true);
        assert!(care.can_start_timer());
        care.emit_can_start_timer(false);
        assert!(!care.can_start_timer());
    }
}
