//! The reducer: applies one message to the model and returns at most one
//! command. Runs on the UI thread only.

use std::time::Instant;

use crate::io::backend::RawSnapshot;
use crate::io::mux::Pane;
use crate::model::{IssueDraft, SortMode};

use super::app::App;
use super::cmd::{Cmd, Msg, batch};
use super::input;
use super::mouse;
use super::refresh::{Acceptance, Due, ReloadSource, ReloadTicket};
use super::state::{DetailsState, ModeState};

pub fn update(app: &mut App, msg: Msg, now: Instant) -> Option<Cmd> {
    app.now = now;
    match msg {
        Msg::Key(key) => input::handle_key(app, key),
        Msg::Mouse(event) => mouse::handle_mouse(app, event),
        Msg::Resize(w, h) => {
            app.resize(w, h);
            None
        }
        Msg::Tick => tick(app),
        Msg::SnapshotLoaded { ticket, result } => on_snapshot(app, ticket, result),
        Msg::SortModeLoaded(result) => {
            on_sort_mode_loaded(app, result);
            None
        }
        Msg::SortModeSaved(result) => {
            if let Err(e) = result {
                app.toast_error(format!("could not save sort mode: {e}"));
            }
            None
        }
        Msg::Created { result, followup } => match result {
            Ok(id) => {
                match followup {
                    Some(e) => app.toast_error(format!("created {id}, but {e}")),
                    None => app.toast_info(format!("created {id}")),
                }
                app.pending_select = Some(id);
                Some(app.reload(ReloadSource::Mutation))
            }
            Err(e) => {
                app.toast_error(format!("create failed: {e}"));
                None
            }
        },
        Msg::Mutated { done, result } => match result {
            Ok(()) => {
                app.toast_info(done);
                Some(app.reload(ReloadSource::Mutation))
            }
            Err(e) => {
                app.toast_error(e);
                None
            }
        },
        Msg::DeletePreviewed { id, result } => {
            if let ModeState::ConfirmDelete {
                id: ref open,
                ref mut preview,
            } = app.mode
                && *open == id
            {
                *preview = Some(result);
            }
            None
        }
        Msg::DepsListed { id, result } => {
            if let ModeState::DepList(ref mut list) = app.mode
                && list.id == id
            {
                list.text = Some(result);
            }
            None
        }
        Msg::PanesListed { request, result } => {
            on_panes_listed(app, request, result);
            None
        }
        Msg::PaneMarked {
            pane,
            marked,
            result,
        } => {
            on_pane_marked(app, &pane, marked, result);
            None
        }
        Msg::PaneSent { pane, result } => {
            match result {
                Ok(()) => app.toast_info(format!("sent to {pane}")),
                Err(e) => app.toast_error(format!("send to {pane} failed: {e}")),
            }
            None
        }
        Msg::Copied { text, result } => {
            match result {
                Ok(()) => app.toast_info(format!("copied {text}")),
                Err(e) => app.toast_error(format!("copy failed: {e}")),
            }
            None
        }
        Msg::EditorFinished(result) => on_editor_finished(app, result),
        Msg::FsChanged => {
            app.refresh.notify_change(now);
            None
        }
        Msg::WatchFailed(e) => {
            if !app.refresh.watch_failed(now) {
                tracing::debug!(error = %e, "watch failure while re-arm pending");
                return None;
            }
            tracing::warn!(error = %e, "filesystem watch failed; re-arming after backoff");
            app.toast_error(format!("watch failed: {e}"));
            Some(Cmd::DisarmWatch)
        }
    }
}

fn tick(app: &mut App) -> Option<Cmd> {
    app.expire_toast();
    let due = app.refresh.due(app.now);
    let cmds: Vec<Option<Cmd>> = due
        .into_iter()
        .map(|d| match d {
            Due::Reload(source) => Some(app.reload(source)),
            Due::RearmWatch => app.watch.then_some(Cmd::ArmWatch),
        })
        .collect();
    batch(cmds)
}

fn on_snapshot(
    app: &mut App,
    ticket: ReloadTicket,
    result: Result<RawSnapshot, String>,
) -> Option<Cmd> {
    let snapshot = match result {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(source = ?ticket.source, error = %e, "reload failed");
            // Timers keep failing while the backend is down; toast once.
            let quiet = app.load_error.is_some() && !ticket.source.always_applies();
            if !quiet {
                app.toast_error(format!("reload failed: {e}"));
            }
            app.load_error = Some(e);
            return None;
        }
    };

    match app.refresh.accept(ticket, snapshot.hash) {
        Acceptance::Apply => {
            let issues = snapshot.issues();
            tracing::debug!(source = ?ticket.source, issues = issues.len(), "snapshot applied");
            app.apply_issues(issues);
            app.load_error = None;
            if ticket.source == ReloadSource::Manual {
                app.toast_info("refreshed");
            }
        }
        Acceptance::Unchanged => {
            tracing::trace!(source = ?ticket.source, "snapshot unchanged");
            app.load_error = None;
        }
        Acceptance::Stale => {
            tracing::debug!(seq = ticket.seq, "dropping stale snapshot");
        }
    }
    None
}

fn on_sort_mode_loaded(app: &mut App, result: Result<Option<String>, String>) {
    match result {
        Ok(Some(value)) => match SortMode::from_setting(&value) {
            Some(mode) if mode != app.sort_mode => {
                app.sort_mode = mode;
                app.recompute();
            }
            Some(_) => {}
            None => tracing::warn!(value = %value, "ignoring unknown sort mode setting"),
        },
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "sort mode setting unavailable"),
    }
}

fn on_panes_listed(app: &mut App, request: u64, result: Result<Vec<Pane>, String>) {
    let ModeState::TmuxPicker(ref mut picker) = app.mode else {
        return;
    };
    if picker.request != request {
        return;
    }
    match result {
        Ok(panes) => {
            picker.cursor = panes
                .iter()
                .position(|p| p.marked)
                .unwrap_or(0);
            picker.panes = Some(panes);
        }
        Err(e) => {
            app.mode = ModeState::Board;
            app.toast_error(format!("could not list panes: {e}"));
        }
    }
}

fn on_pane_marked(app: &mut App, pane: &str, marked: bool, result: Result<(), String>) {
    if let Err(e) = result {
        app.toast_error(format!("could not mark {pane}: {e}"));
        return;
    }
    // The multiplexer keeps a single mark.
    if let ModeState::TmuxPicker(ref mut picker) = app.mode
        && let Some(ref mut panes) = picker.panes
    {
        for p in panes.iter_mut() {
            p.marked = marked && p.pane_id == pane;
        }
    }
    app.toast_info(if marked {
        format!("marked {pane}")
    } else {
        format!("unmarked {pane}")
    });
}

fn on_editor_finished(app: &mut App, result: Result<IssueDraft, String>) -> Option<Cmd> {
    let Some(form) = app.mode.form_mut() else {
        tracing::debug!("editor finished with no form open");
        return None;
    };

    if !form.return_to_details {
        match result {
            Ok(draft) => form.load(&draft),
            Err(e) => app.toast_error(format!("editor: {e}")),
        }
        return None;
    }

    form.return_to_details = false;
    let details = form
        .edit_id()
        .map(DetailsState::new)
        .map_or(ModeState::Board, ModeState::Details);
    let draft = match result {
        Ok(d) => d,
        Err(e) => {
            app.mode = details;
            app.toast_error(format!("editor: {e}"));
            return None;
        }
    };
    form.load(&draft);
    let submitted = input::form::submission(app);
    app.mode = details;
    match submitted {
        Ok(cmd) => cmd,
        Err(e) => {
            app.toast_error(e);
            None
        }
    }
}
