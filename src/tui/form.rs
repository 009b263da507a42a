use crate::model::{ISSUE_TYPES, IssueDraft, MAX_PRIORITY, Status};

use super::text_input::TextInput;

/// Fields of the issue form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Status,
    Priority,
    Type,
    Assignee,
    Labels,
    Parent,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Title,
        FormField::Status,
        FormField::Priority,
        FormField::Type,
        FormField::Assignee,
        FormField::Labels,
        FormField::Parent,
        FormField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Status => "Status",
            FormField::Priority => "Priority",
            FormField::Type => "Type",
            FormField::Assignee => "Assignee",
            FormField::Labels => "Labels",
            FormField::Parent => "Parent",
            FormField::Description => "Description",
        }
    }

    /// Fields edited by cycling through fixed choices
    pub fn is_choice(self) -> bool {
        matches!(self, FormField::Status | FormField::Priority | FormField::Type)
    }

    fn position(self) -> usize {
        FormField::ALL.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> FormField {
        FormField::ALL[(self.position() + 1) % FormField::ALL.len()]
    }

    pub fn prev(self) -> FormField {
        let n = FormField::ALL.len();
        FormField::ALL[(self.position() + n - 1) % n]
    }
}

/// What a submitted form does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    /// New issue; `blocker` gets linked as blocking it once created.
    Create { blocker: Option<String> },
    Edit { id: String },
}

/// Create/Edit form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueForm {
    pub target: FormTarget,
    pub field: FormField,
    pub title: TextInput,
    pub status: Status,
    pub priority: u8,
    pub issue_type: String,
    pub assignee: TextInput,
    pub labels: TextInput,
    pub parent: TextInput,
    pub description: TextInput,
    /// Opened from Details for an external-editor round trip: submit on
    /// success and go back to Details either way.
    pub return_to_details: bool,
}

impl IssueForm {
    pub fn new(target: FormTarget, draft: &IssueDraft) -> Self {
        let mut form = IssueForm {
            target,
            field: FormField::Title,
            title: TextInput::default(),
            status: Status::Open,
            priority: 0,
            issue_type: String::new(),
            assignee: TextInput::default(),
            labels: TextInput::default(),
            parent: TextInput::default(),
            description: TextInput::default(),
            return_to_details: false,
        };
        form.load(draft);
        form
    }

    pub fn create(draft: &IssueDraft) -> Self {
        IssueForm::new(FormTarget::Create { blocker: None }, draft)
    }

    pub fn edit(id: impl Into<String>, draft: &IssueDraft) -> Self {
        IssueForm::new(FormTarget::Edit { id: id.into() }, draft)
    }

    /// Replace every field with `draft`'s values.
    pub fn load(&mut self, draft: &IssueDraft) {
        self.title.set(draft.title.clone());
        self.status = draft.status;
        self.priority = draft.priority;
        self.issue_type = draft.issue_type.clone();
        self.assignee.set(draft.assignee.clone());
        self.labels.set(draft.labels.clone());
        self.parent.set(draft.parent.clone());
        self.description.set(draft.description.clone());
    }

    pub fn draft(&self) -> IssueDraft {
        IssueDraft {
            title: self.title.text.clone(),
            status: self.status,
            priority: self.priority,
            issue_type: self.issue_type.clone(),
            assignee: self.assignee.text.clone(),
            labels: self.labels.text.clone(),
            parent: self.parent.text.clone(),
            description: self.description.text.clone(),
        }
    }

    pub fn edit_id(&self) -> Option<&str> {
        match self.target {
            FormTarget::Edit { ref id } => Some(id),
            FormTarget::Create { .. } => None,
        }
    }

    /// Text input behind the focused field, if it is a text field.
    pub fn active_input(&mut self) -> Option<&mut TextInput> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Assignee => Some(&mut self.assignee),
            FormField::Labels => Some(&mut self.labels),
            FormField::Parent => Some(&mut self.parent),
            FormField::Description => Some(&mut self.description),
            FormField::Status | FormField::Priority | FormField::Type => None,
        }
    }

    /// Display value of a field
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.text.clone(),
            FormField::Status => self.status.label().to_string(),
            FormField::Priority => format!("P{}", self.priority),
            FormField::Type => self.issue_type.clone(),
            FormField::Assignee => self.assignee.text.clone(),
            FormField::Labels => self.labels.text.clone(),
            FormField::Parent => self.parent.text.clone(),
            FormField::Description => self.description.text.clone(),
        }
    }

    /// Step the focused choice field forward (`+1`) or back (`-1`).
    pub fn cycle(&mut self, dir: isize) {
        match self.field {
            FormField::Status => {
                self.status = if dir >= 0 {
                    self.status.next()
                } else {
                    self.status.prev()
                }
            }
            FormField::Priority => {
                let span = MAX_PRIORITY as isize + 1;
                self.priority = (self.priority as isize + dir).rem_euclid(span) as u8;
            }
            FormField::Type => {
                let n = ISSUE_TYPES.len() as isize;
                let cur = ISSUE_TYPES
                    .iter()
                    .position(|t| t.eq_ignore_ascii_case(&self.issue_type));
                let next = match cur {
                    Some(i) => (i as isize + dir).rem_euclid(n) as usize,
                    // Custom types from the backend step onto the known list.
                    None => 0,
                };
                self.issue_type = ISSUE_TYPES[next].to_string();
            }
            _ => {}
        }
    }
}
