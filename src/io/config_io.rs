use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

/// Config file name inside the beads directory
pub const CONFIG_FILE: &str = "board.toml";

/// Error type for configuration problems (fatal at startup)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("empty entry in plugin list `{0}`")]
    EmptyPluginToken(String),
    #[error("unknown plugin `{0}` (known: tmux, clipboard)")]
    UnknownPlugin(String),
}

/// Read `board.toml` from the beads directory. A missing file yields defaults.
pub fn read_config(beads_dir: &Path) -> Result<BoardConfig, ConfigError> {
    let path = beads_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(BoardConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = read_config(dir.path()).unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.debounce_ms, 200);
        assert_eq!(config.backend_timeout_secs, 12);
        assert_eq!(config.mux_timeout_secs, 4);
    }

    #[test]
    fn partial_file_overrides_some_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "poll_interval_secs = 30\neditor = \"hx\"\n\n[colors]\nhighlight = \"#FF0000\"\n",
        )
        .unwrap();
        let config = read_config(dir.path()).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.editor.as_deref(), Some("hx"));
        assert_eq!(config.colors.get("highlight").map(String::as_str), Some("#FF0000"));
        assert_eq!(config.watch_backoff_secs, 3);
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "poll_interval_secs = [").unwrap();
        assert!(matches!(
            read_config(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
