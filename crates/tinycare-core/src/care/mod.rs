//! Boundary to the wellness-reminder ("care") library.
//!
//! The library is an injected capability: the plugin hands it credentials
//! and a notification callback, then signals break-taken and can-start-timer
//! as the scheduler produces them.

mod offline;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::TwitterConfig;
use crate::error::InitError;

pub use offline::OfflineCare;

/// Credentials in the shape the care library expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl From<&TwitterConfig> for TwitterCredentials {
    fn from(cfg: &TwitterConfig) -> Self {
        Self {
            consumer_key: cfg.consumer_key.clone(),
            consumer_secret: cfg.consumer_secret.clone(),
            access_token: cfg.access_token.clone(),
            access_secret: cfg.access_token_secret.clone(),
        }
    }
}

impl TwitterCredentials {
    /// Name of the first empty credential, if any.
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.access_token),
            ("access_token_secret", &self.access_secret),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// A care message, e.g. a reminder posted by one of the care bots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareNotification {
    pub text: String,
    pub bot: String,
}

/// Called by the library for every care message it wants shown.
pub type CareCallback = Arc<dyn Fn(CareNotification) + Send + Sync>;

/// Opaque token returned by a successful initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CareHandle(u64);

impl CareHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The wellness library as seen by the plugin.
pub trait CareLibrary: Send {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Register credentials and the notification callback.
    fn initialize(
        &mut self,
        credentials: &TwitterCredentials,
        on_notification: CareCallback,
    ) -> Result<CareHandle, InitError>;

    /// Deliver `message` through the callback registered for `handle`.
    fn notify(&self, handle: &CareHandle, message: CareNotification);

    /// The configured break elapsed uninterrupted.
    fn emit_break_taken(&self) {}

    /// Whether a work timer may start (at least one document is open).
    fn emit_can_start_timer(&self, _can_start: bool) {}
}
