use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration from `<beads-dir>/board.toml`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Seconds between fallback polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Coalescing window for filesystem change notifications
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Delay before re-arming a failed watch
    #[serde(default = "default_watch_backoff_secs")]
    pub watch_backoff_secs: u64,
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,
    #[serde(default = "default_mux_timeout_secs")]
    pub mux_timeout_secs: u64,
    /// How long a toast stays in the status row
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
    /// Editor command. Falls back to $VISUAL, $EDITOR, then `vi`.
    #[serde(default)]
    pub editor: Option<String>,
    /// Default plugin list, same syntax as `--plugins`
    #[serde(default)]
    pub plugins: Option<String>,
    /// Log file path. Default: `board.log` in the beads directory.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Theme color overrides (`name = "#RRGGBB"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            poll_interval_secs: default_poll_interval_secs(),
            debounce_ms: default_debounce_ms(),
            watch_backoff_secs: default_watch_backoff_secs(),
            backend_timeout_secs: default_backend_timeout_secs(),
            mux_timeout_secs: default_mux_timeout_secs(),
            toast_secs: default_toast_secs(),
            editor: None,
            plugins: None,
            log_file: None,
            colors: HashMap::new(),
        }
    }
}

impl BoardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn watch_backoff(&self) -> Duration {
        Duration::from_secs(self.watch_backoff_secs)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs.max(1))
    }

    pub fn mux_timeout(&self) -> Duration {
        Duration::from_secs(self.mux_timeout_secs.max(1))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_watch_backoff_secs() -> u64 {
    3
}

fn default_backend_timeout_secs() -> u64 {
    12
}

fn default_mux_timeout_secs() -> u64 {
    4
}

fn default_toast_secs() -> u64 {
    4
}
