//! # tinycare Core Library
//!
//! Break reminders for a text editor. When focus leaves the last open
//! document, a break timer is armed; if nothing is opened before it runs
//! out, the wellness ("care") library is told a break was taken and its
//! care messages are shown through the host's notifications.
//!
//! ## Architecture
//!
//! - **Scheduler**: an explicit `Idle`/`Armed` state machine plus a tokio
//!   driver that owns it and its single deadline
//! - **Care**: the wellness library as an injected capability
//! - **Plugin**: activation, failure isolation, and event wiring
//! - **Config**: TOML configuration with validation
//!
//! ## Key Components
//!
//! - [`BreakScheduler`]: break timer state machine
//! - [`Plugin`]: activated plugin, drivable by [`scheduler::runtime`]
//! - [`CareLibrary`]: trait for the wellness library
//! - [`Config`]: credentials and break length

pub mod care;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod plugin;
pub mod scheduler;

pub use care::{CareCallback, CareHandle, CareLibrary, CareNotification, OfflineCare, TwitterCredentials};
pub use config::{Config, TwitterConfig};
pub use error::{ConfigError, CoreError, InitError};
pub use events::Event;
pub use host::{HostEvent, Notification, NotificationLevel, Notifier};
pub use plugin::Plugin;
pub use scheduler::{BreakScheduler, BreakTimer, Reactor, SchedulerState};
