//! Side effects as data.
//!
//! Input handlers never call the backend. They return a `Cmd`; the event
//! loop hands it to the `Worker`, which runs it on a background thread and
//! sends the outcome back as a `Msg`. Tests assert on the `Cmd` directly.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crossterm::event::{KeyEvent, MouseEvent};

use crate::io::backend::{Backend, DeleteMode, RawSnapshot};
use crate::io::clipboard;
use crate::io::mux::{Mux, Pane};
use crate::model::{IssueChanges, IssueDraft, SortMode, Status};

use super::refresh::ReloadTicket;

/// How long a pane stays highlighted after text is sent to it
const PANE_FLASH: Duration = Duration::from_millis(600);

/// A side effect requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Batch(Vec<Cmd>),
    Reload(ReloadTicket),
    LoadSortMode,
    SaveSortMode(SortMode),
    /// Create, then link `blocker` as blocking the new issue when set.
    Create {
        draft: IssueDraft,
        blocker: Option<String>,
    },
    Update {
        id: String,
        changes: IssueChanges,
    },
    Close(String),
    Reopen(String),
    DeletePreview(String),
    Delete {
        id: String,
        mode: DeleteMode,
    },
    AddBlocker {
        issue: String,
        blocker: String,
    },
    RemoveBlocker {
        issue: String,
        blocker: String,
    },
    ListDeps(String),
    ListPanes {
        request: u64,
    },
    SetPaneMark {
        pane: String,
        marked: bool,
    },
    SendToPane {
        pane: String,
        text: String,
    },
    Copy(String),
    /// Runs in the foreground; the event loop suspends the terminal.
    OpenEditor(IssueDraft),
    /// (Re)start the filesystem watch; owned by the event loop.
    ArmWatch,
    /// Drop a failed watch until the backoff re-arms it.
    DisarmWatch,
}

impl Cmd {
    /// Flatten nested batches into a list of single commands.
    pub fn flatten(self) -> Vec<Cmd> {
        match self {
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::flatten).collect(),
            cmd => vec![cmd],
        }
    }
}

/// Combine optional commands into one.
pub fn batch(cmds: impl IntoIterator<Item = Option<Cmd>>) -> Option<Cmd> {
    let mut cmds: Vec<Cmd> = cmds.into_iter().flatten().collect();
    match cmds.len() {
        0 => None,
        1 => cmds.pop(),
        _ => Some(Cmd::Batch(cmds)),
    }
}

/// Everything the reducer reacts to. Results carry errors as display text.
#[derive(Debug, Clone)]
pub enum Msg {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    SnapshotLoaded {
        ticket: ReloadTicket,
        result: Result<RawSnapshot, String>,
    },
    SortModeLoaded(Result<Option<String>, String>),
    SortModeSaved(Result<(), String>),
    /// `result` is the `bd create` outcome. `followup` reports a failed
    /// status change or blocker link after the issue already exists.
    Created {
        result: Result<String, String>,
        followup: Option<String>,
    },
    /// A mutation finished; `done` describes it for the toast.
    Mutated {
        done: String,
        result: Result<(), String>,
    },
    DeletePreviewed {
        id: String,
        result: Result<String, String>,
    },
    DepsListed {
        id: String,
        result: Result<String, String>,
    },
    PanesListed {
        request: u64,
        result: Result<Vec<Pane>, String>,
    },
    PaneMarked {
        pane: String,
        marked: bool,
        result: Result<(), String>,
    },
    PaneSent {
        pane: String,
        result: Result<(), String>,
    },
    Copied {
        text: String,
        result: Result<(), String>,
    },
    EditorFinished(Result<IssueDraft, String>),
    FsChanged,
    WatchFailed(String),
}

/// Runs backend and multiplexer commands off the UI thread.
#[derive(Clone)]
pub struct Worker {
    backend: Arc<dyn Backend>,
    mux: Option<Arc<dyn Mux>>,
    tx: Sender<Msg>,
}

impl Worker {
    pub fn new(backend: Arc<dyn Backend>, mux: Option<Arc<dyn Mux>>, tx: Sender<Msg>) -> Self {
        Worker { backend, mux, tx }
    }

    /// Run `cmd` on its own thread; the result arrives on the channel.
    pub fn spawn(&self, cmd: Cmd) {
        let worker = self.clone();
        thread::spawn(move || {
            if let Some(msg) = worker.execute(cmd) {
                // The receiver is gone only during shutdown.
                let _ = worker.tx.send(msg);
            }
        });
    }

    /// Run `cmd` on the current thread. Commands the event loop owns
    /// (`OpenEditor`, the watch commands, `Batch`) produce nothing here.
    pub fn execute(&self, cmd: Cmd) -> Option<Msg> {
        tracing::debug!(?cmd, "executing");
        let backend = &self.backend;
        let msg = match cmd {
            Cmd::Reload(ticket) => Msg::SnapshotLoaded {
                ticket,
                result: backend.list_all().map_err(|e| e.to_string()),
            },
            Cmd::LoadSortMode => Msg::SortModeLoaded(
                backend
                    .get_setting(SortMode::SETTING_KEY)
                    .map_err(|e| e.to_string()),
            ),
            Cmd::SaveSortMode(mode) => Msg::SortModeSaved(
                backend
                    .set_setting(SortMode::SETTING_KEY, mode.setting_value())
                    .map_err(|e| e.to_string()),
            ),
            Cmd::Create { draft, blocker } => match backend.create_issue(&draft) {
                Ok(id) => {
                    let followup = create_followup(backend.as_ref(), &id, &draft, blocker.as_deref());
                    Msg::Created {
                        result: Ok(id),
                        followup,
                    }
                }
                Err(e) => Msg::Created {
                    result: Err(e.to_string()),
                    followup: None,
                },
            },
            Cmd::Update { id, changes } => mutated(
                format!("updated {id}"),
                backend.update_issue(&id, &changes),
            ),
            Cmd::Close(id) => mutated(format!("closed {id}"), backend.close_issue(&id)),
            Cmd::Reopen(id) => mutated(format!("reopened {id}"), backend.reopen_issue(&id)),
            Cmd::DeletePreview(id) => {
                let result = backend
                    .delete_issue(&id, DeleteMode::Plain, true)
                    .map_err(|e| e.to_string());
                Msg::DeletePreviewed { id, result }
            }
            Cmd::Delete { id, mode } => mutated(
                format!("deleted {id}"),
                backend.delete_issue(&id, mode, false).map(|_| ()),
            ),
            Cmd::AddBlocker { issue, blocker } => mutated(
                format!("{issue} blocked by {blocker}"),
                backend.add_blocker(&issue, &blocker),
            ),
            Cmd::RemoveBlocker { issue, blocker } => mutated(
                format!("{issue} no longer blocked by {blocker}"),
                backend.remove_blocker(&issue, &blocker),
            ),
            Cmd::ListDeps(id) => {
                let result = backend.list_dependencies(&id).map_err(|e| e.to_string());
                Msg::DepsListed { id, result }
            }
            Cmd::ListPanes { request } => Msg::PanesListed {
                request,
                result: self.with_mux(|mux| mux.list_panes().map_err(|e| e.to_string())),
            },
            Cmd::SetPaneMark { pane, marked } => {
                let result = self.with_mux(|mux| mux.set_mark(&pane, marked).map_err(|e| e.to_string()));
                Msg::PaneMarked { pane, marked, result }
            }
            Cmd::SendToPane { pane, text } => {
                let result = self.with_mux(|mux| {
                    mux.send_text(&pane, &text)
                        .and_then(|_| mux.focus(&pane))
                        .and_then(|_| mux.highlight(&pane, true))
                        .map_err(|e| e.to_string())
                });
                if result.is_ok() {
                    thread::sleep(PANE_FLASH);
                    if let Some(ref mux) = self.mux
                        && let Err(e) = mux.highlight(&pane, false)
                    {
                        tracing::warn!(pane = %pane, error = %e, "could not clear pane highlight");
                    }
                }
                Msg::PaneSent { pane, result }
            }
            Cmd::Copy(text) => {
                let result = clipboard::copy(&text).map_err(|e| e.to_string());
                Msg::Copied { text, result }
            }
            Cmd::Batch(_) | Cmd::OpenEditor(_) | Cmd::ArmWatch | Cmd::DisarmWatch => return None,
        };
        Some(msg)
    }

    fn with_mux<T>(&self, f: impl FnOnce(&dyn Mux) -> Result<T, String>) -> Result<T, String> {
        match self.mux {
            Some(ref mux) => f(mux.as_ref()),
            None => Err("tmux integration is not available".to_string()),
        }
    }
}

/// Status and blocker changes applied once `bd create` returned an id.
/// The first failure stops the rest and is returned as toast text.
fn create_followup(
    backend: &dyn Backend,
    id: &str,
    draft: &IssueDraft,
    blocker: Option<&str>,
) -> Option<String> {
    let status = if draft.status != Status::Open {
        backend
            .update_issue(id, &IssueChanges::status(draft.status))
            .map_err(|e| format!("could not set status: {e}"))
    } else {
        Ok(())
    };
    let linked = status.and_then(|()| match blocker {
        Some(blocker) => backend
            .add_blocker(id, blocker)
            .map_err(|e| format!("could not link blocker {blocker}: {e}")),
        None => Ok(()),
    });
    let err = linked.err()?;
    tracing::warn!(id = %id, error = %err, "created issue but follow-up failed");
    Some(err)
}

fn mutated<E: std::fmt::Display>(done: String, result: Result<(), E>) -> Msg {
    if let Err(ref e) = result {
        tracing::warn!(action = %done, error = %e, "mutation failed");
    }
    Msg::Mutated {
        done,
        result: result.map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::tui::test_helpers::{FakeBackend, THREE_OPEN};

    fn worker(backend: &Arc<FakeBackend>) -> Worker {
        let (tx, _rx) = mpsc::channel();
        Worker::new(backend.clone(), None, tx)
    }

    fn blocked_draft() -> IssueDraft {
        IssueDraft {
            title: "Follow up".into(),
            status: Status::Blocked,
            ..Default::default()
        }
    }

    #[test]
    fn failed_blocker_link_still_reports_the_new_issue() {
        let backend = Arc::new(FakeBackend {
            fail_prefix: Some("block".into()),
            ..FakeBackend::with_listing(THREE_OPEN)
        });
        let msg = worker(&backend).execute(Cmd::Create {
            draft: blocked_draft(),
            blocker: Some("bd-1".into()),
        });
        match msg {
            Some(Msg::Created {
                result: Ok(id),
                followup: Some(e),
            }) => {
                assert_eq!(id, "bd-new");
                assert!(e.contains("bd-1"), "{e}");
            }
            other => panic!("unexpected {other:?}"),
        }
        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("create Follow up"));
        assert!(calls[1].starts_with("update bd-new"));
        assert_eq!(calls[2], "block bd-new by bd-1");
    }

    #[test]
    fn failed_status_update_skips_the_link() {
        let backend = Arc::new(FakeBackend {
            fail_prefix: Some("update".into()),
            ..FakeBackend::with_listing(THREE_OPEN)
        });
        let msg = worker(&backend).execute(Cmd::Create {
            draft: blocked_draft(),
            blocker: Some("bd-1".into()),
        });
        assert!(matches!(
            msg,
            Some(Msg::Created { result: Ok(_), followup: Some(ref e) }) if e.starts_with("could not set status")
        ));
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn failed_create_makes_no_follow_up_calls() {
        let backend = Arc::new(FakeBackend {
            fail: true,
            ..FakeBackend::with_listing(THREE_OPEN)
        });
        let msg = worker(&backend).execute(Cmd::Create {
            draft: blocked_draft(),
            blocker: Some("bd-1".into()),
        });
        assert!(matches!(
            msg,
            Some(Msg::Created { result: Err(_), followup: None })
        ));
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn open_issue_without_blocker_is_a_single_call() {
        let backend = Arc::new(FakeBackend::with_listing(THREE_OPEN));
        let msg = worker(&backend).execute(Cmd::Create {
            draft: IssueDraft {
                title: "Plain".into(),
                ..Default::default()
            },
            blocker: None,
        });
        assert!(matches!(
            msg,
            Some(Msg::Created { result: Ok(_), followup: None })
        ));
        assert_eq!(backend.calls(), vec!["create Plain status=open".to_string()]);
    }
}
