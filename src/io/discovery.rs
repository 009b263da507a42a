use std::path::{Path, PathBuf};

/// Name of the backend's data directory
pub const BEADS_DIR_NAME: &str = ".beads";

/// Error type for locating the beads directory (fatal at startup)
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no .beads directory found in {0} or any parent (use --beads-dir)")]
    NotFound(PathBuf),
    #[error("--beads-dir {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Resolve the beads directory: an explicit path must exist, otherwise walk
/// up from `start` looking for a `.beads/` subdirectory.
pub fn find_beads_dir(explicit: Option<&Path>, start: &Path) -> Result<PathBuf, DiscoveryError> {
    if let Some(dir) = explicit {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            start.join(dir)
        };
        return if dir.is_dir() {
            Ok(dir)
        } else {
            Err(DiscoveryError::NotADirectory(dir))
        };
    }

    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(BEADS_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(DiscoveryError::NotFound(start.to_path_buf()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_beads_dir_in_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".beads")).unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        let found = find_beads_dir(None, &nested).unwrap();
        assert_eq!(found, dir.path().join(".beads"));
    }

    #[test]
    fn explicit_dir_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = find_beads_dir(Some(Path::new("missing")), dir.path()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory(_)));
        fs::create_dir(dir.path().join("store")).unwrap();
        let found = find_beads_dir(Some(Path::new("store")), dir.path()).unwrap();
        assert_eq!(found, dir.path().join("store"));
    }
}
