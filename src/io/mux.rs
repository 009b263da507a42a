use std::time::Duration;

use super::process::{self, ProcessError, ProcessSpec};

/// Paste buffer name used when sending text to a pane
const PASTE_BUFFER: &str = "beadboard";
/// Style applied while a pane is highlighted
const HIGHLIGHT_STYLE: &str = "bg=colour236";

/// Error type for terminal multiplexer calls
#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("unexpected tmux output: {0}")]
    Parse(String),
}

/// An addressable multiplexer pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub session_name: String,
    pub session_id: String,
    pub pane_id: String,
    pub command: String,
    pub title: String,
    /// A client is attached to the pane's session
    pub attached: bool,
    pub marked: bool,
}

/// Operations the board needs from the terminal multiplexer.
pub trait Mux: Send + Sync {
    fn list_panes(&self) -> Result<Vec<Pane>, MuxError>;
    fn set_mark(&self, pane_id: &str, marked: bool) -> Result<(), MuxError>;
    /// Id of the currently marked pane, if any.
    fn marked_pane(&self) -> Result<Option<String>, MuxError>;
    /// Load `text` into a paste buffer and paste it into the pane.
    fn send_text(&self, pane_id: &str, text: &str) -> Result<(), MuxError>;
    fn focus(&self, pane_id: &str) -> Result<(), MuxError>;
    /// Flash the pane's window. `on = false` restores the default style.
    fn highlight(&self, pane_id: &str, on: bool) -> Result<(), MuxError>;
}

/// `Mux` implemented with the `tmux` command.
#[derive(Debug, Clone)]
pub struct TmuxCli {
    program: String,
    timeout: Duration,
}

const PANE_FORMAT: &str = "#{session_name}\t#{session_id}\t#{pane_id}\t#{pane_current_command}\t#{pane_title}\t#{session_attached}\t#{pane_marked}";

impl TmuxCli {
    pub fn new(timeout: Duration) -> Self {
        TmuxCli {
            program: "tmux".to_string(),
            timeout,
        }
    }

    fn run<I, S>(&self, args: I) -> Result<String, MuxError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = ProcessSpec::new(&self.program, self.timeout).args(args);
        Ok(process::run(&spec)?.stdout_text())
    }
}

impl Mux for TmuxCli {
    fn list_panes(&self) -> Result<Vec<Pane>, MuxError> {
        let out = self.run(["list-panes", "-a", "-F", PANE_FORMAT])?;
        parse_pane_list(&out)
    }

    fn set_mark(&self, pane_id: &str, marked: bool) -> Result<(), MuxError> {
        let flag = if marked { "-m" } else { "-M" };
        self.run(["select-pane", flag, "-t", pane_id])?;
        Ok(())
    }

    fn marked_pane(&self) -> Result<Option<String>, MuxError> {
        Ok(self
            .list_panes()?
            .into_iter()
            .find(|p| p.marked)
            .map(|p| p.pane_id))
    }

    fn send_text(&self, pane_id: &str, text: &str) -> Result<(), MuxError> {
        self.run(["set-buffer", "-b", PASTE_BUFFER, "--", text])?;
        self.run(["paste-buffer", "-b", PASTE_BUFFER, "-t", pane_id])?;
        Ok(())
    }

    fn focus(&self, pane_id: &str) -> Result<(), MuxError> {
        self.run(["switch-client", "-t", pane_id])?;
        self.run(["select-window", "-t", pane_id])?;
        self.run(["select-pane", "-t", pane_id])?;
        Ok(())
    }

    fn highlight(&self, pane_id: &str, on: bool) -> Result<(), MuxError> {
        let style = if on { HIGHLIGHT_STYLE } else { "default" };
        self.run(["select-pane", "-t", pane_id, "-P", style])?;
        Ok(())
    }
}

/// Parse `list-panes -F` output in `PANE_FORMAT`.
pub fn parse_pane_list(out: &str) -> Result<Vec<Pane>, MuxError> {
    out.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                return Err(MuxError::Parse(line.to_string()));
            }
            Ok(Pane {
                session_name: fields[0].to_string(),
                session_id: fields[1].to_string(),
                pane_id: fields[2].to_string(),
                command: fields[3].to_string(),
                title: fields[4].to_string(),
                attached: fields[5].trim() != "0" && !fields[5].trim().is_empty(),
                marked: fields[6].trim() == "1",
            })
        })
        .collect()
}
