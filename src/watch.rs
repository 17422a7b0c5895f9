use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use notify::{EventKind, RecursiveMode, Watcher};

use crate::config::Config;
use crate::dashboard::{Dashboard, ViewRequest};
use crate::output;
use crate::storage;

/// Re-render the dashboard whenever the bucket store changes.
///
/// A change notification is only a trigger, never a data source: every
/// render re-opens the store and re-runs the whole aggregation. Bursts
/// of events are debounced by draining anything that arrives within the
/// interval before rendering once.
pub fn run(request: &ViewRequest, config: &Config, interval_secs: u64) -> Result<()> {
    let interval = Duration::from_secs(interval_secs);

    // Initial render before the first change arrives.
    render(request, config)?;

    let watch_path = storage::default_store()
        .watch_path()
        .ok_or_else(|| anyhow::anyhow!("bucket store has no watchable path"))?;
    std::fs::create_dir_all(&watch_path)?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                    let _ = tx.send(());
                }
                _ => {}
            }
        }
    })?;
    watcher.watch(&watch_path, RecursiveMode::Recursive)?;

    while let Ok(()) = rx.recv() {
        // Debounce: drain any additional events within the interval
        let deadline = Instant::now() + interval;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok(()) => continue,
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }

        render(request, config)?;
    }

    Ok(())
}

fn render(request: &ViewRequest, config: &Config) -> Result<()> {
    let store = storage::default_store();
    let providers = config.provider_set();
    let dashboard = Dashboard::new(store.as_ref(), &providers, config.default_currency());
    let payload = dashboard.assemble(request, Utc::now())?;
    let fmt = output::currency_format_or_raw(&payload.currency);

    // Clear screen and move cursor to top-left
    print!("\x1b[2J\x1b[H");
    output::print_table(&payload, &providers, &fmt);

    Ok(())
}
