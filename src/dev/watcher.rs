//! Source tree watcher for live reload.

use std::path::{Component, Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::broadcast;

/// Directory names never worth a reload.
pub const DEFAULT_IGNORED: &[&str] = &[".git", "target", "node_modules"];

/// A batch of changed paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    pub paths: Vec<PathBuf>,
}

/// Fan-out point between the watcher and connected browsers.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadEvent>,
}

impl ReloadHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    /// Publish a change; returns how many clients were listening.
    pub fn notify(&self, paths: Vec<PathBuf>) -> usize {
        self.tx.send(ReloadEvent { paths }).unwrap_or(0)
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Decides which changed paths are ignored, relative to the watched root.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    root: PathBuf,
    names: Vec<String>,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra: &[String]) -> Self {
        let names = DEFAULT_IGNORED
            .iter()
            .map(|s| s.to_string())
            .chain(extra.iter().cloned())
            .collect();
        Self {
            root: root.to_path_buf(),
            names,
        }
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.components().any(|c| match c {
            Component::Normal(name) => self.names.iter().any(|n| name == n.as_str()),
            _ => false,
        })
    }
}

/// Watches the dev root and publishes changes to a [`ReloadHub`].
pub struct SourceWatcher {
    root: PathBuf,
    filter: IgnoreFilter,
    hub: ReloadHub,
}

impl SourceWatcher {
    pub fn new(root: &Path, ignore: &[String], hub: ReloadHub) -> Self {
        // Event paths are absolute; match them against the canonical root.
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let filter = IgnoreFilter::new(&root, ignore);
        Self { root, filter, hub }
    }

    /// Start watching on notify's background thread.
    ///
    /// Watching stops when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let hub = self.hub.clone();
        let filter = self.filter.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                        return;
                    }
                    let paths: Vec<PathBuf> = event
                        .paths
                        .into_iter()
                        .filter(|p| !filter.is_ignored(p))
                        .collect();
                    if paths.is_empty() {
                        return;
                    }
                    tracing::debug!(?paths, "Source change detected");
                    let clients = hub.notify(paths);
                    tracing::info!(clients, "Reload broadcast");
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default(),
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        tracing::info!(path = ?self.root, "Source watcher started");
        Ok(watcher)
    }
}
