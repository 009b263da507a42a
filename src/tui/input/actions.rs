//! Issue actions shared by the board and the details view.

use crate::model::{IssueChanges, IssueDraft, Status};
use crate::tui::app::App;
use crate::tui::cmd::Cmd;
use crate::tui::form::{FormTarget, IssueForm};
use crate::tui::state::{DepListState, ModeState, ParentPicker, PromptKind, PromptState, TmuxPicker};
use crate::tui::text_input::TextInput;

pub fn open_create(app: &mut App) -> Option<Cmd> {
    app.mode = ModeState::Create(IssueForm::create(&IssueDraft::default()));
    None
}

/// Start a child of `parent`. A closed parent must be reopened first, so
/// that case asks for confirmation instead.
pub fn open_create_child(app: &mut App, parent: &str) -> Option<Cmd> {
    let Some(issue) = app.issue(parent) else {
        app.toast_error(format!("unknown issue {parent}"));
        return None;
    };
    app.mode = if issue.status == Status::Closed {
        ModeState::ConfirmClosedParentCreate {
            parent: parent.to_string(),
        }
    } else {
        ModeState::Create(child_form(parent))
    };
    None
}

pub fn child_form(parent: &str) -> IssueForm {
    let draft = IssueDraft {
        parent: parent.to_string(),
        ..Default::default()
    };
    IssueForm::create(&draft)
}

/// New issue that `blocker` blocks. The link is made after creation.
pub fn open_create_blocked(app: &mut App, blocker: &str) -> Option<Cmd> {
    let draft = IssueDraft {
        status: Status::Blocked,
        ..Default::default()
    };
    app.mode = ModeState::Create(IssueForm::new(
        FormTarget::Create {
            blocker: Some(blocker.to_string()),
        },
        &draft,
    ));
    None
}

/// Create form prefilled from an existing issue.
pub fn open_clone(app: &mut App, id: &str) -> Option<Cmd> {
    let issue = app.issue(id)?;
    let mut draft = IssueDraft::from_issue(issue);
    draft.title = format!("{} (copy)", issue.title);
    draft.status = Status::Open;
    app.mode = ModeState::Create(IssueForm::create(&draft));
    None
}

pub fn open_edit(app: &mut App, id: &str) -> Option<Cmd> {
    let issue = app.issue(id)?;
    app.mode = ModeState::Edit(IssueForm::edit(id, &IssueDraft::from_issue(issue)));
    None
}

/// Edit `id` in the external editor. From Details the result is submitted
/// directly and Details comes back afterwards.
pub fn open_external_editor(app: &mut App, id: &str, from_details: bool) -> Option<Cmd> {
    let issue = app.issue(id)?;
    let mut form = IssueForm::edit(id, &IssueDraft::from_issue(issue));
    form.return_to_details = from_details;
    let draft = form.draft();
    app.mode = ModeState::Edit(form);
    Some(Cmd::OpenEditor(draft))
}

/// Move the stored status one step along the column order.
pub fn cycle_status(app: &mut App, id: &str, dir: isize) -> Option<Cmd> {
    let issue = app.issue(id)?;
    let next = if dir >= 0 {
        issue.status.next()
    } else {
        issue.status.prev()
    };
    Some(Cmd::Update {
        id: id.to_string(),
        changes: IssueChanges::status(next),
    })
}

pub fn close(app: &mut App, id: &str) -> Option<Cmd> {
    if app.issue(id)?.status == Status::Closed {
        app.toast_info(format!("{id} is already closed"));
        return None;
    }
    Some(Cmd::Close(id.to_string()))
}

pub fn reopen(app: &mut App, id: &str) -> Option<Cmd> {
    if app.issue(id)?.status != Status::Closed {
        app.toast_info(format!("{id} is not closed"));
        return None;
    }
    Some(Cmd::Reopen(id.to_string()))
}

/// Open the delete dialog and fetch the dry-run preview.
pub fn confirm_delete(app: &mut App, id: &str) -> Option<Cmd> {
    app.issue(id)?;
    app.mode = ModeState::ConfirmDelete {
        id: id.to_string(),
        preview: None,
    };
    Some(Cmd::DeletePreview(id.to_string()))
}

pub fn prompt_blocker(app: &mut App, id: &str, kind: PromptKind) -> Option<Cmd> {
    let issue = app.issue(id)?;
    let prefill = match (kind, issue.blocked_by.as_slice()) {
        (PromptKind::RemoveBlocker, [only]) => only.clone(),
        _ => String::new(),
    };
    app.mode = ModeState::Prompt(PromptState {
        kind,
        issue: id.to_string(),
        input: TextInput::new(prefill),
    });
    None
}

pub fn copy_id(app: &mut App, id: &str) -> Option<Cmd> {
    if !app.clipboard_enabled() {
        app.toast_info("clipboard plugin is disabled");
        return None;
    }
    Some(Cmd::Copy(id.to_string()))
}

pub fn open_tmux(app: &mut App, id: &str) -> Option<Cmd> {
    if !app.tmux_enabled() {
        app.toast_info("tmux integration is not available");
        return None;
    }
    let request = app.next_request();
    app.mode = ModeState::TmuxPicker(TmuxPicker {
        issue: id.to_string(),
        request,
        panes: None,
        cursor: 0,
    });
    Some(Cmd::ListPanes { request })
}

/// Every issue except `id` and its descendants can become its parent.
pub fn open_parent_picker(app: &mut App, id: &str) -> Option<Cmd> {
    let current = app.issue(id)?.parent.clone();
    let candidates: Vec<String> = app
        .issues
        .iter()
        .filter(|i| i.id != id && !app.is_descendant(&i.id, id))
        .map(|i| i.id.clone())
        .collect();
    let cursor = current
        .and_then(|p| candidates.iter().position(|c| *c == p))
        .unwrap_or(0);
    app.mode = ModeState::ParentPicker(ParentPicker {
        issue: id.to_string(),
        query: TextInput::default(),
        candidates,
        cursor,
    });
    None
}

pub fn clear_parent(app: &mut App, id: &str) -> Option<Cmd> {
    let Some(parent) = app.issue(id)?.parent.clone() else {
        app.toast_info(format!("{id} has no parent"));
        return None;
    };
    Some(Cmd::Update {
        id: id.to_string(),
        changes: IssueChanges::parent(Some(parent), None),
    })
}

pub fn open_dep_list(app: &mut App, id: &str) -> Option<Cmd> {
    app.issue(id)?;
    app.mode = ModeState::DepList(DepListState {
        id: id.to_string(),
        text: None,
        scroll: 0,
    });
    Some(Cmd::ListDeps(id.to_string()))
}

/// Flip the column sort and persist the choice.
pub fn toggle_sort(app: &mut App) -> Option<Cmd> {
    app.sort_mode = app.sort_mode.toggle();
    app.recompute();
    app.toast_info(format!("sort: {}", app.sort_mode.label()));
    Some(Cmd::SaveSortMode(app.sort_mode))
}

/// Select the real row of a ghost's issue. When search or filters hide it
/// everywhere, clear them and try again.
pub fn select_ghost(app: &mut App, issue: usize) -> bool {
    if app.focus_issue(issue) {
        return true;
    }
    app.clear_search_and_filters();
    let found = app.focus_issue(issue);
    if found {
        app.toast_info("cleared search and filters to show parent");
    }
    found
}
