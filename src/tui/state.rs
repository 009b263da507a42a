//! Payloads for the modal states of the board.

use std::collections::HashMap;

use crate::io::mux::Pane;
use crate::model::{Filter, ISSUE_TYPES, Issue, MAX_PRIORITY, Status, filter_text_value};
use crate::ops::columns::matches_search;

use super::form::IssueForm;
use super::text_input::TextInput;

/// Which modal state the board is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Board,
    Details,
    Help,
    Search,
    Filter,
    Create,
    Edit,
    Prompt,
    ParentPicker,
    TmuxPicker,
    DepList,
    ConfirmDelete,
    ConfirmClosedParentCreate,
}

/// The current mode together with its data. Only the active mode's data
/// exists, so stale sub-state cannot leak between modes.
#[derive(Debug, Clone, Default)]
pub enum ModeState {
    #[default]
    Board,
    Details(DetailsState),
    Help {
        scroll: u16,
    },
    Search {
        input: TextInput,
        /// Search text to restore on cancel
        original: String,
    },
    Filter(FilterForm),
    Create(IssueForm),
    Edit(IssueForm),
    Prompt(PromptState),
    ParentPicker(ParentPicker),
    TmuxPicker(TmuxPicker),
    DepList(DepListState),
    ConfirmDelete {
        id: String,
        /// Dry-run output, once it arrives
        preview: Option<Result<String, String>>,
    },
    ConfirmClosedParentCreate {
        parent: String,
    },
}

impl ModeState {
    pub fn kind(&self) -> Mode {
        match self {
            ModeState::Board => Mode::Board,
            ModeState::Details(_) => Mode::Details,
            ModeState::Help { .. } => Mode::Help,
            ModeState::Search { .. } => Mode::Search,
            ModeState::Filter(_) => Mode::Filter,
            ModeState::Create(_) => Mode::Create,
            ModeState::Edit(_) => Mode::Edit,
            ModeState::Prompt(_) => Mode::Prompt,
            ModeState::ParentPicker(_) => Mode::ParentPicker,
            ModeState::TmuxPicker(_) => Mode::TmuxPicker,
            ModeState::DepList(_) => Mode::DepList,
            ModeState::ConfirmDelete { .. } => Mode::ConfirmDelete,
            ModeState::ConfirmClosedParentCreate { .. } => Mode::ConfirmClosedParentCreate,
        }
    }

    pub fn form(&self) -> Option<&IssueForm> {
        match self {
            ModeState::Create(f) | ModeState::Edit(f) => Some(f),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut IssueForm> {
        match self {
            ModeState::Create(f) | ModeState::Edit(f) => Some(f),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsState {
    pub id: String,
    pub scroll: u16,
}

impl DetailsState {
    pub fn new(id: impl Into<String>) -> Self {
        DetailsState {
            id: id.into(),
            scroll: 0,
        }
    }
}

/// Fields of the filter form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Assignee,
    Label,
    Status,
    Priority,
    Type,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::Assignee,
        FilterField::Label,
        FilterField::Status,
        FilterField::Priority,
        FilterField::Type,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::Assignee => "Assignee",
            FilterField::Label => "Label",
            FilterField::Status => "Status",
            FilterField::Priority => "Priority",
            FilterField::Type => "Type",
        }
    }

    fn step(self, dir: isize) -> FilterField {
        let n = FilterField::ALL.len() as isize;
        let pos = FilterField::ALL.iter().position(|&f| f == self).unwrap_or(0) as isize;
        FilterField::ALL[(pos + dir).rem_euclid(n) as usize]
    }

    pub fn next(self) -> FilterField {
        self.step(1)
    }

    pub fn prev(self) -> FilterField {
        self.step(-1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterForm {
    pub field: FilterField,
    pub assignee: TextInput,
    pub label: TextInput,
    pub status: Option<Status>,
    pub priority: Option<u8>,
    pub issue_type: Option<String>,
}

impl FilterForm {
    pub fn from_filter(filter: &Filter) -> Self {
        FilterForm {
            field: FilterField::Assignee,
            assignee: TextInput::new(filter.assignee.clone().unwrap_or_default()),
            label: TextInput::new(filter.label.clone().unwrap_or_default()),
            status: filter.status,
            priority: filter.priority,
            issue_type: filter.issue_type.clone(),
        }
    }

    pub fn to_filter(&self) -> Filter {
        Filter {
            assignee: filter_text_value(&self.assignee.text),
            label: filter_text_value(&self.label.text),
            status: self.status,
            priority: self.priority,
            issue_type: self.issue_type.clone(),
        }
    }

    pub fn active_input(&mut self) -> Option<&mut TextInput> {
        match self.field {
            FilterField::Assignee => Some(&mut self.assignee),
            FilterField::Label => Some(&mut self.label),
            _ => None,
        }
    }

    pub fn value(&self, field: FilterField) -> String {
        let any = || "any".to_string();
        match field {
            FilterField::Assignee => self.assignee.text.clone(),
            FilterField::Label => self.label.text.clone(),
            FilterField::Status => self.status.map_or_else(any, |s| s.label().to_string()),
            FilterField::Priority => self.priority.map_or_else(any, |p| format!("P{p}")),
            FilterField::Type => self.issue_type.clone().unwrap_or_else(any),
        }
    }

    /// Step the focused choice field through "any" and its values.
    pub fn cycle(&mut self, dir: isize) {
        match self.field {
            FilterField::Status => self.status = cycle_option(&self.status, &Status::ALL, dir),
            FilterField::Priority => {
                let all: Vec<u8> = (0..=MAX_PRIORITY).collect();
                self.priority = cycle_option(&self.priority, &all, dir);
            }
            FilterField::Type => {
                let all: Vec<String> = ISSUE_TYPES.iter().map(|t| t.to_string()).collect();
                self.issue_type = cycle_option(&self.issue_type, &all, dir);
            }
            _ => {}
        }
    }

    /// Reset the focused field to "any".
    pub fn clear_field(&mut self) {
        match self.field {
            FilterField::Assignee => self.assignee.set(""),
            FilterField::Label => self.label.set(""),
            FilterField::Status => self.status = None,
            FilterField::Priority => self.priority = None,
            FilterField::Type => self.issue_type = None,
        }
    }
}

/// `None` sits before the first choice; unknown values restart at `None`.
fn cycle_option<T: Clone + PartialEq>(cur: &Option<T>, choices: &[T], dir: isize) -> Option<T> {
    let n = choices.len() as isize + 1;
    let pos = match cur {
        None => 0,
        Some(v) => match choices.iter().position(|c| c == v) {
            Some(i) => i as isize + 1,
            None => return None,
        },
    };
    let next = (pos + dir).rem_euclid(n);
    if next == 0 {
        None
    } else {
        Some(choices[next as usize - 1].clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AddBlocker,
    RemoveBlocker,
}

/// Single-line id prompt for dependency edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptState {
    pub kind: PromptKind,
    pub issue: String,
    pub input: TextInput,
}

impl PromptState {
    pub fn title(&self) -> String {
        match self.kind {
            PromptKind::AddBlocker => format!("Add blocker to {}", self.issue),
            PromptKind::RemoveBlocker => format!("Remove blocker from {}", self.issue),
        }
    }
}

/// Chooses a new parent for `issue` from every non-descendant issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentPicker {
    pub issue: String,
    pub query: TextInput,
    /// Eligible parents, in snapshot order
    pub candidates: Vec<String>,
    pub cursor: usize,
}

impl ParentPicker {
    /// Candidates matching the query, as snapshot indices.
    pub fn visible(&self, issues: &[Issue], index: &HashMap<String, usize>) -> Vec<usize> {
        let needle = self.query.text.trim().to_lowercase();
        self.candidates
            .iter()
            .filter_map(|id| index.get(id).copied())
            .filter(|&i| matches_search(&issues[i], &needle))
            .collect()
    }
}

/// Multiplexer pane chooser. `panes` is None until the listing arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxPicker {
    pub issue: String,
    /// Matches the listing reply to this picker
    pub request: u64,
    pub panes: Option<Vec<Pane>>,
    pub cursor: usize,
}

impl TmuxPicker {
    pub fn selected(&self) -> Option<&Pane> {
        self.panes.as_ref()?.get(self.cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepListState {
    pub id: String,
    pub text: Option<Result<String, String>>,
    pub scroll: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_cycle_passes_through_any() {
        let all = Status::ALL;
        assert_eq!(cycle_option(&None, &all, 1), Some(Status::Open));
        assert_eq!(cycle_option(&Some(Status::Closed), &all, 1), None);
        assert_eq!(cycle_option(&None, &all, -1), Some(Status::Closed));
        assert_eq!(cycle_option(&Some(Status::Open), &all, -1), None);
    }

    #[test]
    fn filter_form_round_trip() {
        let filter = Filter {
            assignee: Some("ana".into()),
            label: None,
            status: Some(Status::Blocked),
            priority: Some(1),
            issue_type: Some("bug".into()),
        };
        let form = FilterForm::from_filter(&filter);
        assert_eq!(form.to_filter(), filter);
        assert_eq!(form.value(FilterField::Label), "");
        assert_eq!(form.value(FilterField::Priority), "P1");
    }

    #[test]
    fn any_text_clears_filter_field() {
        let mut form = FilterForm::from_filter(&Filter::default());
        form.assignee.set("ANY");
        form.label.set("  ");
        assert!(form.to_filter().is_empty());
    }

    #[test]
    fn clear_field_resets_only_focused_field() {
        let mut form = FilterForm::from_filter(&Filter {
            priority: Some(0),
            status: Some(Status::Open),
            ..Default::default()
        });
        form.field = FilterField::Priority;
        form.clear_field();
        assert_eq!(form.priority, None);
        assert_eq!(form.status, Some(Status::Open));
    }

    #[test]
    fn parent_picker_filters_by_query() {
        let issues = vec![Issue::new("bd-1", "Login page"), Issue::new("bd-2", "Signup")];
        let index = issues.iter().enumerate().map(|(i, x)| (x.id.clone(), i)).collect();
        let mut picker = ParentPicker {
            issue: "bd-9".into(),
            query: TextInput::default(),
            candidates: vec!["bd-1".into(), "bd-2".into(), "gone".into()],
            cursor: 0,
        };
        assert_eq!(picker.visible(&issues, &index), vec![0, 1]);
        picker.query.set("LOGIN");
        assert_eq!(picker.visible(&issues, &index), vec![0]);
    }

    #[test]
    fn field_order_wraps() {
        assert_eq!(FilterField::Type.next(), FilterField::Assignee);
        assert_eq!(FilterField::Assignee.prev(), FilterField::Type);
    }
}
