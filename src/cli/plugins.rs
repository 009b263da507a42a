use indexmap::IndexMap;

use crate::io::config_io::ConfigError;

/// Multiplexer pane picker and send-to-pane
pub const PLUGIN_TMUX: &str = "tmux";
/// Copy issue ids to the system clipboard
pub const PLUGIN_CLIPBOARD: &str = "clipboard";

/// Optional integrations and whether each is enabled, in a stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugins {
    enabled: IndexMap<&'static str, bool>,
}

impl Default for Plugins {
    fn default() -> Self {
        let mut enabled = IndexMap::new();
        enabled.insert(PLUGIN_TMUX, true);
        enabled.insert(PLUGIN_CLIPBOARD, true);
        Plugins { enabled }
    }
}

impl Plugins {
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.get(name).copied().unwrap_or(false)
    }

    /// Apply a toggle list such as `tmux,-clipboard` left to right.
    pub fn apply(&mut self, list: &str) -> Result<(), ConfigError> {
        for raw in list.split(',') {
            let token = raw.trim();
            let (name, on) = match token.strip_prefix('-') {
                Some(rest) => (rest.trim(), false),
                None => (token, true),
            };
            if name.is_empty() {
                return Err(ConfigError::EmptyPluginToken(list.to_string()));
            }
            match self.enabled.get_mut(name) {
                Some(slot) => *slot = on,
                None => return Err(ConfigError::UnknownPlugin(name.to_string())),
            }
        }
        Ok(())
    }

    /// Defaults, then the config file list, then the command line list.
    pub fn resolve(config: Option<&str>, cli: Option<&str>) -> Result<Self, ConfigError> {
        let mut plugins = Plugins::default();
        if let Some(list) = config {
            plugins.apply(list)?;
        }
        if let Some(list) = cli {
            plugins.apply(list)?;
        }
        Ok(plugins)
    }

    /// Enabled plugin names, for the log.
    pub fn enabled_names(&self) -> Vec<&'static str> {
        self.enabled
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| *name)
            .collect()
    }
}
