use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Lowest (most urgent) priority value.
pub const MIN_PRIORITY: u8 = 0;
/// Highest (least urgent) priority value.
pub const MAX_PRIORITY: u8 = 4;
/// Priority used when the backend sends nothing usable.
pub const DEFAULT_PRIORITY: u8 = 2;
/// Issue type used when the backend sends none.
pub const DEFAULT_ISSUE_TYPE: &str = "task";
/// Issue types offered by the form and accepted by the editor codec.
pub const ISSUE_TYPES: [&str; 5] = ["task", "bug", "feature", "epic", "chore"];

/// Workflow status of an issue. Also identifies a board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Blocked,
    Closed,
}

impl Status {
    /// All statuses in column order (left to right).
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Blocked,
        Status::Closed,
    ];

    /// The backend's wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Blocked => "blocked",
            Status::Closed => "closed",
        }
    }

    /// Human-readable column heading
    pub fn label(self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::InProgress => "In Progress",
            Status::Blocked => "Blocked",
            Status::Closed => "Closed",
        }
    }

    /// Parse a status name. Accepts the wire name plus dashed/spaced variants.
    pub fn parse(s: &str) -> Option<Status> {
        let norm: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();
        match norm.as_str() {
            "open" => Some(Status::Open),
            "inprogress" => Some(Status::InProgress),
            "blocked" => Some(Status::Blocked),
            "closed" => Some(Status::Closed),
            _ => None,
        }
    }

    /// Position of this status' column on the board.
    pub fn column_index(self) -> usize {
        match self {
            Status::Open => 0,
            Status::InProgress => 1,
            Status::Blocked => 2,
            Status::Closed => 3,
        }
    }

    pub fn from_column_index(idx: usize) -> Option<Status> {
        Status::ALL.get(idx).copied()
    }

    /// Next status in column order, wrapping around.
    pub fn next(self) -> Status {
        Status::ALL[(self.column_index() + 1) % Status::ALL.len()]
    }

    /// Previous status in column order, wrapping around.
    pub fn prev(self) -> Status {
        let n = Status::ALL.len();
        Status::ALL[(self.column_index() + n - 1) % n]
    }
}

/// A normalized issue. Edge lists are derived once per snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Status as stored by the backend
    pub status: Status,
    /// Status used for column placement (see `derive_display`)
    pub display: Status,
    /// 0 (critical) through 4 (backlog)
    pub priority: u8,
    pub issue_type: String,
    pub assignee: String,
    pub labels: IndexSet<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Back-reference to the parent issue id
    pub parent: Option<String>,
    pub children: Vec<String>,
    /// Active (non-closed, known) blockers
    pub blocked_by: Vec<String>,
    pub blocks: Vec<String>,
}

impl Issue {
    /// Create an open issue with default priority and type.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Issue {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: Status::Open,
            display: Status::Open,
            priority: DEFAULT_PRIORITY,
            issue_type: DEFAULT_ISSUE_TYPE.to_string(),
            assignee: String::new(),
            labels: IndexSet::new(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            parent: None,
            children: Vec::new(),
            blocked_by: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Recompute `display` from `status` and the (already filtered) blocker list.
    pub fn derive_display(&mut self) {
        self.display = if self.status == Status::Open && !self.blocked_by.is_empty() {
            Status::Blocked
        } else {
            self.status
        };
    }

    /// Labels joined with ", " (form and editor representation)
    pub fn labels_joined(&self) -> String {
        self.labels.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Clamp a priority into the valid range.
pub fn clamp_priority(p: i64) -> u8 {
    p.clamp(MIN_PRIORITY as i64, MAX_PRIORITY as i64) as u8
}

/// Split a comma-separated label list, trimming and dropping empties.
pub fn parse_label_list(s: &str) -> IndexSet<String> {
    s.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
