use indexmap::IndexSet;

use super::issue::{DEFAULT_ISSUE_TYPE, DEFAULT_PRIORITY, Issue, Status, parse_label_list};

/// Local validation failure. Blocks submission; no backend call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("unknown parent issue: {0}")]
    UnknownParent(String),
    #[error("an issue cannot be its own parent")]
    SelfParent,
}

/// Editable field values for creating or editing an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub status: Status,
    pub priority: u8,
    pub issue_type: String,
    pub assignee: String,
    /// Comma-separated
    pub labels: String,
    /// Parent id, empty for none
    pub parent: String,
    pub description: String,
}

impl Default for IssueDraft {
    fn default() -> Self {
        IssueDraft {
            title: String::new(),
            status: Status::Open,
            priority: DEFAULT_PRIORITY,
            issue_type: DEFAULT_ISSUE_TYPE.to_string(),
            assignee: String::new(),
            labels: String::new(),
            parent: String::new(),
            description: String::new(),
        }
    }
}

impl IssueDraft {
    /// Draft mirroring an existing issue (stored status, not display status).
    pub fn from_issue(issue: &Issue) -> Self {
        IssueDraft {
            title: issue.title.clone(),
            status: issue.status,
            priority: issue.priority,
            issue_type: issue.issue_type.clone(),
            assignee: issue.assignee.clone(),
            labels: issue.labels_joined(),
            parent: issue.parent.clone().unwrap_or_default(),
            description: issue.description.clone(),
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        let p = self.parent.trim();
        if p.is_empty() { None } else { Some(p) }
    }

    pub fn label_set(&self) -> IndexSet<String> {
        parse_label_list(&self.labels)
    }

    /// Check the draft before any backend call. `self_id` is the issue being
    /// edited (None when creating); `exists` answers whether an id is known.
    pub fn validate(
        &self,
        self_id: Option<&str>,
        exists: impl Fn(&str) -> bool,
    ) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if let Some(parent) = self.parent_id() {
            if self_id == Some(parent) {
                return Err(ValidationError::SelfParent);
            }
            if !exists(parent) {
                return Err(ValidationError::UnknownParent(parent.to_string()));
            }
        }
        Ok(())
    }

    /// Fields that differ from `issue`. Empty when nothing changed.
    pub fn changes_from(&self, issue: &Issue) -> IssueChanges {
        let mut changes = IssueChanges::default();
        if self.title.trim() != issue.title {
            changes.title = Some(self.title.trim().to_string());
        }
        if self.status != issue.status {
            changes.status = Some(self.status);
        }
        if self.priority != issue.priority {
            changes.priority = Some(self.priority);
        }
        if self.issue_type != issue.issue_type {
            changes.issue_type = Some(self.issue_type.clone());
        }
        if self.assignee.trim() != issue.assignee {
            changes.assignee = Some(self.assignee.trim().to_string());
        }
        let labels = self.label_set();
        if labels != issue.labels {
            changes.labels = Some(LabelChange {
                add: labels.difference(&issue.labels).cloned().collect(),
                remove: issue.labels.difference(&labels).cloned().collect(),
            });
        }
        let new_parent = self.parent_id().map(str::to_string);
        if new_parent != issue.parent {
            changes.parent = Some(ParentChange {
                from: issue.parent.clone(),
                to: new_parent,
            });
        }
        if self.description != issue.description {
            changes.description = Some(self.description.clone());
        }
        changes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelChange {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentChange {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueChanges {
    pub title: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<u8>,
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
    pub labels: Option<LabelChange>,
    pub parent: Option<ParentChange>,
    pub description: Option<String>,
}

impl IssueChanges {
    pub fn is_empty(&self) -> bool {
        *self == IssueChanges::default()
    }

    pub fn status(status: Status) -> Self {
        IssueChanges {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn parent(from: Option<String>, to: Option<String>) -> Self {
        IssueChanges {
            parent: Some(ParentChange { from, to }),
            ..Default::default()
        }
    }
}
