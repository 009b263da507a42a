use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use crate::cli::commands::Cli;
use crate::cli::plugins::{PLUGIN_CLIPBOARD, PLUGIN_TMUX, Plugins};
use crate::io::backend::{Backend, BdCli};
use crate::io::config_io::read_config;
use crate::io::discovery::find_beads_dir;
use crate::io::editor::{edit_draft, resolve_editor};
use crate::io::logging::init_file_logging;
use crate::io::mux::{Mux, TmuxCli};
use crate::io::watcher::{BeadsWatcher, WatchEvent};
use crate::model::{BoardConfig, Filter, Issue, SortMode, Status};
use crate::ops::columns::{Columns, compute_columns};

use super::cmd::{Cmd, Msg, Worker};
use super::layout::BoardGeometry;
use super::refresh::{RefreshScheduler, ReloadSource};
use super::render;
use super::selection::Selection;
use super::state::{Mode, ModeState};
use super::theme::Theme;
use super::update::update;

/// Longest the event loop sleeps without a deadline
const MAX_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

/// Transient message in the status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub expires: Instant,
}

/// Startup settings for the board.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub config: BoardConfig,
    pub plugins: Plugins,
    /// The multiplexer plugin is enabled and we run inside it
    pub tmux_available: bool,
    pub watch: bool,
    /// Shown in the header bar
    pub title: String,
}

impl Default for AppOptions {
    fn default() -> Self {
        AppOptions {
            config: BoardConfig::default(),
            plugins: Plugins::default(),
            tmux_available: false,
            watch: true,
            title: String::new(),
        }
    }
}

/// Main application state. Mutated only by the reducer on the UI thread.
pub struct App {
    /// Current snapshot in canonical order
    pub issues: Vec<Issue>,
    pub index: HashMap<String, usize>,
    pub columns: Columns,
    pub search: String,
    pub filter: Filter,
    pub sort_mode: SortMode,
    pub selection: Selection,
    /// Column with keyboard focus
    pub focus: Status,
    pub mode: ModeState,
    /// Space was pressed; the next key is a leader binding
    pub leader: bool,
    pub toast: Option<Toast>,
    pub theme: Theme,
    pub geometry: BoardGeometry,
    pub refresh: RefreshScheduler,
    pub plugins: Plugins,
    pub tmux_available: bool,
    pub watch: bool,
    pub title: String,
    /// A snapshot has been applied at least once
    pub loaded: bool,
    /// Last reload failure, cleared by the next successful one
    pub load_error: Option<String>,
    /// Focus this issue once it shows up in a snapshot
    pub pending_select: Option<String>,
    pub should_quit: bool,
    /// Clock reading for the message being processed
    pub now: Instant,
    pub toast_duration: Duration,
    next_request: u64,
}

impl App {
    pub fn new(options: AppOptions, now: Instant) -> Self {
        App {
            issues: Vec::new(),
            index: HashMap::new(),
            columns: Columns::default(),
            search: String::new(),
            filter: Filter::default(),
            sort_mode: SortMode::default(),
            selection: Selection::default(),
            focus: Status::Open,
            mode: ModeState::Board,
            leader: false,
            toast: None,
            theme: Theme::from_colors(&options.config.colors),
            geometry: BoardGeometry::default(),
            refresh: RefreshScheduler::from_config(&options.config, now),
            plugins: options.plugins,
            tmux_available: options.tmux_available,
            watch: options.watch,
            title: options.title,
            loaded: false,
            load_error: None,
            pending_select: None,
            should_quit: false,
            now,
            toast_duration: options.config.toast_duration(),
            next_request: 0,
        }
    }

    pub fn mode_kind(&self) -> Mode {
        self.mode.kind()
    }

    pub fn items_per_page(&self) -> usize {
        self.geometry.items_per_page()
    }

    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.index.get(id).map(|&i| &self.issues[i])
    }

    /// Snapshot index of the focused column's selected issue.
    pub fn selected_index(&self) -> Option<usize> {
        self.selection.selected_issue(&self.columns, self.focus)
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.selected_index().map(|i| &self.issues[i])
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_issue().map(|i| i.id.clone())
    }

    /// Whether `id` sits somewhere below `ancestor` in the parent tree.
    pub fn is_descendant(&self, id: &str, ancestor: &str) -> bool {
        let mut cur = self.issue(id).and_then(|i| i.parent.clone());
        let mut steps = 0;
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.issues.len() {
                return false;
            }
            cur = self.issue(&p).and_then(|i| i.parent.clone());
        }
        false
    }

    pub fn toast_info(&mut self, text: impl Into<String>) {
        self.set_toast(text.into(), ToastKind::Info);
    }

    pub fn toast_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!(message = %text, "error toast");
        self.set_toast(text, ToastKind::Error);
    }

    fn set_toast(&mut self, text: String, kind: ToastKind) {
        self.toast = Some(Toast {
            text,
            kind,
            expires: self.now + self.toast_duration,
        });
    }

    /// Drop the toast once it has expired.
    pub fn expire_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| self.now >= t.expires) {
            self.toast = None;
        }
    }

    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.plugins.is_enabled(name)
    }

    pub fn clipboard_enabled(&self) -> bool {
        self.plugin_enabled(PLUGIN_CLIPBOARD)
    }

    pub fn tmux_enabled(&self) -> bool {
        self.tmux_available && self.plugin_enabled(PLUGIN_TMUX)
    }

    /// Ticket and command for a reload from `source`.
    pub fn reload(&mut self, source: ReloadSource) -> Cmd {
        Cmd::Reload(self.refresh.ticket(source))
    }

    pub fn next_request(&mut self) -> u64 {
        self.next_request += 1;
        self.next_request
    }

    /// Earliest instant the event loop must wake for.
    pub fn next_deadline(&self) -> Instant {
        let refresh = self.refresh.next_deadline();
        match self.toast {
            Some(ref t) => refresh.min(t.expires),
            None => refresh,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.geometry = BoardGeometry::for_screen(Rect::new(0, 0, width, height));
        self.selection
            .ensure_all_visible(&self.columns, self.items_per_page());
    }

    /// Rebuild the columns after search, filter or sort changed.
    pub fn recompute(&mut self) {
        let remembered = self.selection.remember(&self.columns, &self.issues);
        let focused = self.selected_id();
        self.columns = compute_columns(&self.issues, &self.search, &self.filter, self.sort_mode);
        self.selection
            .restore(&self.columns, &self.index, &remembered);
        if let Some(id) = focused {
            self.follow(&id);
        }
        self.selection
            .ensure_all_visible(&self.columns, self.items_per_page());
    }

    /// Replace the snapshot, keeping selections on the same issues.
    pub fn apply_issues(&mut self, issues: Vec<Issue>) {
        let remembered = self.selection.remember(&self.columns, &self.issues);
        let focused = self.selected_id();

        self.index = issues
            .iter()
            .enumerate()
            .map(|(i, issue)| (issue.id.clone(), i))
            .collect();
        self.issues = issues;
        self.columns = compute_columns(&self.issues, &self.search, &self.filter, self.sort_mode);
        self.selection
            .restore(&self.columns, &self.index, &remembered);

        if let Some(id) = self.pending_select.take().or(focused) {
            self.follow(&id);
        }
        self.selection
            .ensure_all_visible(&self.columns, self.items_per_page());
        self.drop_stale_mode();
        self.loaded = true;
    }

    /// Move focus to the column now holding `id`, if it is visible.
    fn follow(&mut self, id: &str) {
        if let Some(&i) = self.index.get(id)
            && let Some((status, sel)) = self.columns.locate(i)
        {
            self.focus = status;
            self.selection.select(status, sel);
        }
    }

    /// Focus the real row of snapshot issue `issue`. False when it is not
    /// visible in any column.
    pub fn focus_issue(&mut self, issue: usize) -> bool {
        match self.columns.locate(issue) {
            Some((status, sel)) => {
                self.focus = status;
                self.selection.select(status, sel);
                let page = self.items_per_page();
                self.selection
                    .ensure_visible(self.columns.get(status), page);
                true
            }
            None => false,
        }
    }

    pub fn clear_search_and_filters(&mut self) {
        self.search.clear();
        self.filter = Filter::default();
        self.recompute();
    }

    /// Leave modes that point at an issue the new snapshot no longer has.
    fn drop_stale_mode(&mut self) {
        let gone = match &self.mode {
            ModeState::Details(d) => Some(d.id.clone()),
            ModeState::ConfirmDelete { id, .. } => Some(id.clone()),
            ModeState::Prompt(p) => Some(p.issue.clone()),
            ModeState::ParentPicker(p) => Some(p.issue.clone()),
            _ => None,
        }
        .filter(|id| !self.index.contains_key(id));
        if let Some(id) = gone {
            self.mode = ModeState::Board;
            self.toast_info(format!("{id} no longer exists"));
        }
    }
}

/// Resolve startup settings, then run the board until the user quits.
pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let beads_dir = find_beads_dir(cli.beads_dir.as_deref(), &cwd)?;
    let mut config = read_config(&beads_dir)?;
    if let Some(secs) = cli.poll {
        config.poll_interval_secs = secs;
    }
    let plugins = Plugins::resolve(config.plugins.as_deref(), cli.plugins.as_deref())?;

    let log_path = config
        .log_file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| beads_dir.join("board.log"));
    if let Err(e) = init_file_logging(&log_path) {
        eprintln!("warning: could not open log file {}: {}", log_path.display(), e);
    }
    tracing::info!(
        beads_dir = %beads_dir.display(),
        plugins = ?plugins.enabled_names(),
        watch = !cli.no_watch,
        "starting board"
    );

    let tmux_available = plugins.is_enabled(PLUGIN_TMUX) && std::env::var_os("TMUX").is_some();
    let backend: Arc<dyn Backend> = Arc::new(BdCli::new(&cli.bd, &beads_dir, config.backend_timeout()));
    let mux: Option<Arc<dyn Mux>> = if tmux_available {
        Some(Arc::new(TmuxCli::new(config.mux_timeout())))
    } else {
        None
    };
    let editor = resolve_editor(config.editor.as_deref());

    let (tx, rx) = mpsc::channel();
    let worker = Worker::new(backend, mux, tx.clone());
    let options = AppOptions {
        config,
        plugins,
        tmux_available,
        watch: !cli.no_watch,
        title: project_title(&beads_dir),
    };
    let mut app = App::new(options, Instant::now());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let size = terminal.size()?;
    app.resize(size.width, size.height);

    let mut runtime = Runtime {
        worker,
        tx,
        rx,
        beads_dir,
        editor,
        watcher: None,
    };
    let result = run_event_loop(&mut terminal, &mut app, &mut runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    tracing::info!("board closed");

    result
}

/// Name of the directory holding `.beads`, for the header.
fn project_title(beads_dir: &Path) -> String {
    beads_dir
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| beads_dir.display().to_string())
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Resources owned by the event loop
struct Runtime {
    worker: Worker,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    beads_dir: PathBuf,
    editor: String,
    watcher: Option<BeadsWatcher>,
}

fn run_event_loop(
    terminal: &mut Term,
    app: &mut App,
    rt: &mut Runtime,
) -> Result<(), Box<dyn std::error::Error>> {
    let startup = app.reload(ReloadSource::Startup);
    let mut initial = vec![startup, Cmd::LoadSortMode];
    if app.watch {
        initial.push(Cmd::ArmWatch);
    }
    execute_cmd(terminal, rt, Cmd::Batch(initial))?;

    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        let now = Instant::now();
        let wait = app
            .next_deadline()
            .saturating_duration_since(now)
            .min(MAX_WAIT);
        if event::poll(wait)? {
            let msg = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(Msg::Key(key)),
                Event::Mouse(mouse) => Some(Msg::Mouse(mouse)),
                Event::Resize(w, h) => Some(Msg::Resize(w, h)),
                _ => None,
            };
            if let Some(msg) = msg {
                dispatch(terminal, app, rt, msg)?;
            }
        }

        while let Ok(msg) = rt.rx.try_recv() {
            dispatch(terminal, app, rt, msg)?;
        }
        dispatch(terminal, app, rt, Msg::Tick)?;

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn dispatch(
    terminal: &mut Term,
    app: &mut App,
    rt: &mut Runtime,
    msg: Msg,
) -> Result<(), Box<dyn std::error::Error>> {
    match update(app, msg, Instant::now()) {
        Some(cmd) => execute_cmd(terminal, rt, cmd),
        None => Ok(()),
    }
}

fn execute_cmd(
    terminal: &mut Term,
    rt: &mut Runtime,
    cmd: Cmd,
) -> Result<(), Box<dyn std::error::Error>> {
    for cmd in cmd.flatten() {
        match cmd {
            Cmd::OpenEditor(draft) => {
                suspend(terminal)?;
                let result = edit_draft(&rt.editor, &draft).map_err(|e| e.to_string());
                resume(terminal)?;
                let _ = rt.tx.send(Msg::EditorFinished(result));
            }
            Cmd::ArmWatch => arm_watch(rt),
            Cmd::DisarmWatch => {
                rt.watcher = None;
            }
            cmd => rt.worker.spawn(cmd),
        }
    }
    Ok(())
}

fn arm_watch(rt: &mut Runtime) {
    // Dropping the old watcher stops it before the new one starts.
    rt.watcher = None;
    let tx = rt.tx.clone();
    let started = BeadsWatcher::start(&rt.beads_dir, move |event| {
        let msg = match event {
            WatchEvent::Changed(_) => Msg::FsChanged,
            WatchEvent::Failed(e) => Msg::WatchFailed(e),
        };
        let _ = tx.send(msg);
    });
    match started {
        Ok(watcher) => {
            tracing::debug!(dir = %rt.beads_dir.display(), "watch armed");
            rt.watcher = Some(watcher);
        }
        Err(e) => {
            let _ = rt.tx.send(Msg::WatchFailed(e.to_string()));
        }
    }
}

/// Hand the terminal to a foreground child process.
fn suspend(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

fn resume(terminal: &mut Term) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    terminal.clear()
}
