use std::sync::Mutex;
use std::time::Instant;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::backend::{Backend, BackendError, DeleteMode, RawSnapshot};
use crate::io::mux::{Mux, MuxError, Pane};
use crate::model::{IssueChanges, IssueDraft};

use super::app::{App, AppOptions};
use super::cmd::Msg;
use super::refresh::ReloadSource;
use super::update::update;

pub const TERM_W: u16 = 100;
pub const TERM_H: u16 = 24;

/// Three open issues, no hierarchy.
pub const THREE_OPEN: &str = concat!(
    r#"{"id":"bd-1","title":"Write docs"}"#,
    "\n",
    r#"{"id":"bd-2","title":"Fix login"}"#,
    "\n",
    r#"{"id":"bd-3","title":"Ship release"}"#,
    "\n",
);

/// A closed epic with an open child and grandchild, plus a loose issue.
pub const FAMILY: &str = concat!(
    r#"{"id":"bd-1","title":"Standalone"}"#,
    "\n",
    r#"{"id":"bd-10","title":"Closed epic","status":"closed","issue_type":"epic"}"#,
    "\n",
    r#"{"id":"bd-11","title":"Child","parent":"bd-10"}"#,
    "\n",
    r#"{"id":"bd-12","title":"Grandchild","parent":"bd-11"}"#,
    "\n",
);

/// bd-21 is blocked by the open bd-20.
pub const BLOCKED_PAIR: &str = concat!(
    r#"{"id":"bd-20","title":"Blocker"}"#,
    "\n",
    r#"{"id":"bd-21","title":"Waiting","dependencies":[{"depends_on_id":"bd-20","type":"blocks"}]}"#,
    "\n",
);

/// An app sized to `TERM_W` x `TERM_H` with `payload` applied as the
/// startup snapshot.
pub fn loaded_app(payload: &str) -> App {
    let now = Instant::now();
    let mut app = App::new(AppOptions::default(), now);
    app.resize(TERM_W, TERM_H);
    let ticket = app.refresh.ticket(ReloadSource::Startup);
    let snapshot = RawSnapshot::parse(payload.as_bytes()).unwrap();
    update(
        &mut app,
        Msg::SnapshotLoaded {
            ticket,
            result: Ok(snapshot),
        },
        now,
    );
    app
}

/// `count` open issues `bd-00`.. in id order.
pub fn many_open(count: usize) -> String {
    (0..count)
        .map(|i| format!("{{\"id\":\"bd-{i:02}\",\"title\":\"Task {i}\"}}\n"))
        .collect()
}

pub fn pane(id: &str, marked: bool) -> Pane {
    Pane {
        session_name: "work".into(),
        session_id: "$1".into(),
        pane_id: id.into(),
        command: "zsh".into(),
        title: "shell".into(),
        attached: true,
        marked,
    }
}

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();
    lines.join("\n")
}

/// Full-screen render of the app.
pub fn render_app(app: &mut App) -> String {
    render_to_string(TERM_W, TERM_H, |frame, _| super::render::render(frame, app))
}

/// Backend that records every call and serves a fixed listing.
#[derive(Default)]
pub struct FakeBackend {
    pub listing: String,
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
    /// Fail only calls whose record starts with this prefix
    pub fail_prefix: Option<String>,
}

impl FakeBackend {
    pub fn with_listing(listing: &str) -> Self {
        FakeBackend {
            listing: listing.to_string(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), BackendError> {
        let failing = self.fail
            || self
                .fail_prefix
                .as_deref()
                .is_some_and(|p| call.starts_with(p));
        self.calls.lock().unwrap().push(call);
        if failing {
            Err(BackendError::Rejected("backend said no".into()))
        } else {
            Ok(())
        }
    }
}

impl Backend for FakeBackend {
    fn list_all(&self) -> Result<RawSnapshot, BackendError> {
        self.record("list".into())?;
        RawSnapshot::parse(self.listing.as_bytes())
    }

    fn create_issue(&self, draft: &IssueDraft) -> Result<String, BackendError> {
        self.record(format!("create {} status={}", draft.title, draft.status.as_str()))?;
        Ok("bd-new".into())
    }

    fn update_issue(&self, id: &str, changes: &IssueChanges) -> Result<(), BackendError> {
        self.record(format!("update {id} {changes:?}"))
    }

    fn close_issue(&self, id: &str) -> Result<(), BackendError> {
        self.record(format!("close {id}"))
    }

    fn reopen_issue(&self, id: &str) -> Result<(), BackendError> {
        self.record(format!("reopen {id}"))
    }

    fn delete_issue(&self, id: &str, mode: DeleteMode, dry_run: bool) -> Result<String, BackendError> {
        self.record(format!("delete {id} {mode:?} dry_run={dry_run}"))?;
        Ok(format!("would delete {id}"))
    }

    fn add_blocker(&self, issue: &str, blocker: &str) -> Result<(), BackendError> {
        self.record(format!("block {issue} by {blocker}"))
    }

    fn remove_blocker(&self, issue: &str, blocker: &str) -> Result<(), BackendError> {
        self.record(format!("unblock {issue} from {blocker}"))
    }

    fn list_dependencies(&self, id: &str) -> Result<String, BackendError> {
        self.record(format!("deps {id}"))?;
        Ok(format!("{id} depends on nothing"))
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.record(format!("get {key}"))?;
        Ok(None)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.record(format!("set {key}={value}"))
    }
}

/// Multiplexer double with a fixed pane list.
#[derive(Default)]
pub struct FakeMux {
    pub panes: Vec<Pane>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeMux {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Mux for FakeMux {
    fn list_panes(&self) -> Result<Vec<Pane>, MuxError> {
        self.record("list".into());
        Ok(self.panes.clone())
    }

    fn set_mark(&self, pane_id: &str, marked: bool) -> Result<(), MuxError> {
        self.record(format!("mark {pane_id} {marked}"));
        Ok(())
    }

    fn marked_pane(&self) -> Result<Option<String>, MuxError> {
        Ok(self.panes.iter().find(|p| p.marked).map(|p| p.pane_id.clone()))
    }

    fn send_text(&self, pane_id: &str, text: &str) -> Result<(), MuxError> {
        self.record(format!("send {pane_id} {text}"));
        Ok(())
    }

    fn focus(&self, pane_id: &str) -> Result<(), MuxError> {
        self.record(format!("focus {pane_id}"));
        Ok(())
    }

    fn highlight(&self, pane_id: &str, on: bool) -> Result<(), MuxError> {
        self.record(format!("highlight {pane_id} {on}"));
        Ok(())
    }
}
