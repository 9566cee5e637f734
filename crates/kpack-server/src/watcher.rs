//! File watching for content changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Change to a Markdown/MDX source.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEvent {
    /// Page created or modified
    Changed(PathBuf),

    /// Page deleted
    Removed(PathBuf),
}

/// Watches content directories for page changes.
pub struct ContentWatcher {
    _watcher: RecommendedWatcher,
}

impl ContentWatcher {
    /// Create a watcher for the given paths.
    ///
    /// Paths that do not exist yet are skipped. Returns the watcher and a
    /// channel of page events; the watcher must be kept alive for events
    /// to keep flowing.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<ContentEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            } else {
                tracing::warn!("Not watching missing path {}", path.display());
            }
        }

        // Debouncing is left to the consumer so the last event of a burst
        // is never dropped.
        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                for path in &event.paths {
                    if let Some(e) = classify_event(path, &event.kind) {
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event, ignoring anything that is not a page.
fn classify_event(path: &Path, kind: &EventKind) -> Option<ContentEvent> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext != "mdx" && ext != "md" {
        return None;
    }

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => {
            Some(ContentEvent::Changed(path.to_path_buf()))
        }
        EventKind::Remove(_) => Some(ContentEvent::Removed(path.to_path_buf())),
        _ => None,
    }
}
