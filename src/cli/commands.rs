use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "bboard",
    about = concat!("beadboard v", env!("CARGO_PKG_VERSION"), " - a live kanban board for beads"),
    version
)]
pub struct Cli {
    /// Backing store directory (default: nearest .beads/ above the working directory)
    #[arg(long = "beads-dir", value_name = "PATH")]
    pub beads_dir: Option<PathBuf>,

    /// Disable filesystem change notifications; rely on polling only
    #[arg(long = "no-watch")]
    pub no_watch: bool,

    /// Toggle integrations: comma list of `name` (enable) or `-name` (disable)
    #[arg(long, value_name = "LIST", allow_hyphen_values = true)]
    pub plugins: Option<String>,

    /// Backend executable
    #[arg(long, value_name = "PATH", default_value = "bd")]
    pub bd: String,

    /// Poll interval in seconds (overrides board.toml)
    #[arg(long, value_name = "SECS")]
    pub poll: Option<u64>,
}
