//! bar: a text status bar assembled from threaded, template-driven modules.
//!
//! Prints one line of markup to stdout whenever a module's output changes and
//! reads `<module> <action> [data]` commands from stdin.
//!
//! Run with:  `RUST_LOG=info bar [path/to/bar.toml]`

mod host;

use anyhow::{Context, Result};
use bar_config::{default_path, load as load_config, ConfigWatcher};
use bar_core::Signal;
use host::Bar;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging on stderr; RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("bar v{} starting", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os().nth(1).map(PathBuf::from).unwrap_or_else(default_path);
    let config = load_config(&path).with_context(|| format!("loading {}", path.display()))?;

    let (tx, mut signals) = mpsc::unbounded_channel::<Signal>();
    let emitter = Arc::new(tx);

    let mut bar = Bar::build(config, emitter.clone());
    bar.start();
    print_line(&mut bar)?;

    let (_watcher, mut reloads) = ConfigWatcher::spawn(&path);
    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(signal) = signals.recv() => match signal {
                Signal::Changed { .. } => print_line(&mut bar)?,
                Signal::Halted { module, reason } => {
                    warn!(%module, "module halted: {reason}");
                    print_line(&mut bar)?;
                }
                Signal::Stopped { module } => tracing::debug!(%module, "module stopped"),
            },
            Some(config) = reloads.recv() => {
                info!("configuration changed, rebuilding modules");
                bar.stop_blocking();
                bar = Bar::build(config, emitter.clone());
                bar.start();
                print_line(&mut bar)?;
            }
            line = commands.next_line(), if stdin_open => match line {
                Ok(Some(line)) => dispatch(&bar, &line),
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin closed: {e}");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        }
    }

    bar.stop_blocking();
    Ok(())
}

/// Handle one `<module> <action> [data]` command line.
fn dispatch(bar: &Bar, line: &str) {
    let mut parts = line.trim().splitn(3, ' ');
    let (Some(target), Some(action)) = (parts.next(), parts.next()) else {
        warn!("ignoring malformed command '{line}'");
        return;
    };
    if !bar.input(target, action, parts.next().unwrap_or("")) {
        tracing::debug!(module = target, action, "no module handled the command");
    }
}

fn print_line(bar: &mut Bar) -> Result<()> {
    if let Some(line) = bar.redraw() {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
    }
    Ok(())
}
