use crate::{load, Config};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Editors often write a file in several steps; changes closer together than
/// this are folded into one reload.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches a config file and delivers a freshly parsed [`Config`] after every
/// change. Parse failures are logged and skipped, so the receiver only ever
/// sees valid configurations.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_, mut rx) = bar_config::ConfigWatcher::spawn("/home/user/.config/bar/bar.toml");
/// while let Some(config) = rx.recv().await {
///     println!("reloaded: {:?}", config.bar_config());
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path` on the current Tokio runtime.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<Config>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<Config>) {
    use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        NotifyConfig::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", path.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) if matches!(e.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                tokio::time::sleep(DEBOUNCE).await;
                while sync_rx.try_recv().is_ok() {}

                match load(&path) {
                    Ok(config) => {
                        if tx.send(config).await.is_err() {
                            break; // receiver dropped
                        }
                    }
                    Err(e) => warn!("Ignoring config change: {e}"),
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}
