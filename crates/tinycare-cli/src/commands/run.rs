//! `tinycare run` -- act as the editor host.
//!
//! Host events arrive as JSON lines on stdin, e.g.
//! `{"type":"active_document_changed","open_count":1,"has_active":false}`.
//! Every resulting event is printed as one JSON line on stdout; user-facing
//! notifications go to stderr.

use std::sync::Arc;

use clap::Args;
use tinycare_core::scheduler::runtime;
use tinycare_core::{
    Config, Event, HostEvent, Notification, NotificationLevel, Notifier, OfflineCare, Plugin,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Args)]
pub struct RunArgs {
    /// Override the configured break length (minutes, at least 1)
    #[arg(long, allow_negative_numbers = true)]
    break_time: Option<i64>,
    /// After stdin closes, keep running long enough for a pending break to fire
    #[arg(long)]
    wait: bool,
}

/// Prints host notifications to stderr.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => {
                eprintln!("[{}] {}", notification.title, notification.detail);
            }
            NotificationLevel::Warning => {
                eprintln!("warning: {}\n  {}", notification.title, notification.detail);
            }
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(break_time) = args.break_time {
        config.set("break_time", &break_time.to_string())?;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(serve(config, args.wait))
}

async fn serve(config: Config, wait: bool) -> Result<(), Box<dyn std::error::Error>> {
    let plugin = Plugin::activate(
        &config,
        Box::new(OfflineCare::new()),
        Arc::new(TerminalNotifier),
    )?;

    let (host_tx, host_rx) = mpsc::channel::<HostEvent>(64);
    let (event_tx, mut event_rx) = mpsc::channel::<Event>(64);
    let scheduler = runtime::spawn(plugin, host_rx, event_tx);

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to encode event"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    while let Some(raw) = lines.next_segment().await? {
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!(error = %e, "skipping host event that is not UTF-8");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => {
                if host_tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => tracing::warn!(error = %e, %line, "skipping malformed host event"),
        }
    }

    if wait {
        tracing::debug!(
            wait_ms = config.break_duration_ms(),
            "stdin closed, waiting for pending break"
        );
        tokio::time::sleep(config.break_duration()).await;
    }
    drop(host_tx);

    scheduler.await?;
    printer.await?;
    Ok(())
}
