use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the beads directory watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// One or more backend change markers changed on disk.
    Changed(Vec<PathBuf>),
    /// The watch broke. It must be re-armed by starting a new watcher.
    Failed(String),
}

/// Whether a path is one of the backend's on-disk change markers:
/// the database (and its WAL), the JSONL export, or `last-touched`.
pub fn is_change_marker(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name == "last-touched" {
        return true;
    }
    if name.ends_with(".db-wal") {
        return true;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("db") | Some("jsonl")
    )
}

/// A file system watcher for the `.beads/` directory.
///
/// The callback runs on notify's thread; it should only forward the event.
pub struct BeadsWatcher {
    _watcher: RecommendedWatcher,
}

impl BeadsWatcher {
    /// Start watching the given beads directory (non-recursive).
    pub fn start<F>(beads_dir: &Path, on_event: F) -> Result<Self, notify::Error>
    where
        F: Fn(WatchEvent) + Send + 'static,
    {
        let beads_dir_owned = beads_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        on_event(WatchEvent::Failed(e.to_string()));
                        return;
                    }
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| p.starts_with(&beads_dir_owned) && is_change_marker(p))
                    .collect();

                if !relevant.is_empty() {
                    on_event(WatchEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(beads_dir, RecursiveMode::NonRecursive)?;
        tracing::info!(dir = %beads_dir.display(), "watching beads directory");
        Ok(BeadsWatcher { _watcher: watcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_markers() {
        assert!(is_change_marker(Path::new("/p/.beads/beads.db")));
        assert!(is_change_marker(Path::new("/p/.beads/beads.db-wal")));
        assert!(is_change_marker(Path::new("/p/.beads/issues.jsonl")));
        assert!(is_change_marker(Path::new("/p/.beads/last-touched")));
        assert!(!is_change_marker(Path::new("/p/.beads/board.log")));
        assert!(!is_change_marker(Path::new("/p/.beads/board.toml")));
    }

    #[test]
    fn watching_missing_dir_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(BeadsWatcher::start(&missing, |_| {}).is_err());
    }
}
