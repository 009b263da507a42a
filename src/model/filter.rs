use super::issue::{Issue, Status};

/// Board filter criteria. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Exact, case-insensitive
    pub assignee: Option<String>,
    /// Exact label membership
    pub label: Option<String>,
    /// Compared against the display status
    pub status: Option<Status>,
    pub priority: Option<u8>,
    pub issue_type: Option<String>,
}

/// Case-insensitive equality that also folds non-ASCII letters.
fn same_text(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.assignee.is_none()
            && self.label.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.issue_type.is_none()
    }

    /// Whether an issue satisfies every constrained field.
    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(ref a) = self.assignee
            && !same_text(&issue.assignee, a)
        {
            return false;
        }
        if let Some(ref l) = self.label
            && !issue.labels.contains(l)
        {
            return false;
        }
        if let Some(s) = self.status
            && issue.display != s
        {
            return false;
        }
        if let Some(p) = self.priority
            && issue.priority != p
        {
            return false;
        }
        if let Some(ref t) = self.issue_type
            && !same_text(&issue.issue_type, t)
        {
            return false;
        }
        true
    }

    /// Short description for the header bar, e.g. `assignee:bob p1`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref a) = self.assignee {
            parts.push(format!("assignee:{}", a));
        }
        if let Some(ref l) = self.label {
            parts.push(format!("label:{}", l));
        }
        if let Some(s) = self.status {
            parts.push(format!("status:{}", s.as_str()));
        }
        if let Some(p) = self.priority {
            parts.push(format!("p{}", p));
        }
        if let Some(ref t) = self.issue_type {
            parts.push(format!("type:{}", t));
        }
        parts.join(" ")
    }
}

/// Normalize a free-text filter field: empty or "any" clears it.
pub fn filter_text_value(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("any") {
        None
    } else {
        Some(t.to_string())
    }
}

/// Per-column ordering mode. Persisted as a backend setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Most recently updated first; priority ignored
    StatusDateOnly,
    /// Priority ascending, then most recently updated
    #[default]
    PriorityThenStatusDate,
}

impl SortMode {
    /// Backend setting key holding the persisted mode.
    pub const SETTING_KEY: &'static str = "board.sort_mode";

    pub fn setting_value(self) -> &'static str {
        match self {
            SortMode::StatusDateOnly => "status-date",
            SortMode::PriorityThenStatusDate => "priority",
        }
    }

    pub fn from_setting(s: &str) -> Option<SortMode> {
        match s.trim() {
            "status-date" => Some(SortMode::StatusDateOnly),
            "priority" => Some(SortMode::PriorityThenStatusDate),
            _ => None,
        }
    }

    pub fn toggle(self) -> SortMode {
        match self {
            SortMode::StatusDateOnly => SortMode::PriorityThenStatusDate,
            SortMode::PriorityThenStatusDate => SortMode::StatusDateOnly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::StatusDateOnly => "updated",
            SortMode::PriorityThenStatusDate => "priority",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> Issue {
        let mut i = Issue::new("bd-1", "Fix login");
        i.assignee = "Alice".into();
        i.labels.insert("auth".into());
        i.priority = 1;
        i.issue_type = "bug".into();
        i
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::default().is_empty());
        assert!(Filter::default().matches(&issue()));
    }

    #[test]
    fn assignee_is_case_insensitive() {
        let f = Filter {
            assignee: Some("alice".into()),
            ..Default::default()
        };
        assert!(f.matches(&issue()));
    }

    #[test]
    fn case_folding_covers_accented_names() {
        let mut i = issue();
        i.assignee = "émile".into();
        i.issue_type = "Épic".into();
        let f = Filter {
            assignee: Some("ÉMILE".into()),
            issue_type: Some("épic".into()),
            ..Default::default()
        };
        assert!(f.matches(&i));
    }

    #[test]
    fn every_field_must_match() {
        let f = Filter {
            label: Some("auth".into()),
            priority: Some(2),
            ..Default::default()
        };
        assert!(!f.matches(&issue()));
        let f = Filter {
            label: Some("auth".into()),
            priority: Some(1),
            issue_type: Some("bug".into()),
            status: Some(Status::Open),
            ..Default::default()
        };
        assert!(f.matches(&issue()));
    }

    #[test]
    fn any_clears_text_field() {
        assert_eq!(filter_text_value(" Any "), None);
        assert_eq!(filter_text_value(""), None);
        assert_eq!(filter_text_value(" bob "), Some("bob".into()));
    }

    #[test]
    fn sort_mode_setting_round_trip() {
        for mode in [SortMode::StatusDateOnly, SortMode::PriorityThenStatusDate] {
            assert_eq!(SortMode::from_setting(mode.setting_value()), Some(mode));
            assert_eq!(mode.toggle().toggle(), mode);
        }
        assert_eq!(SortMode::from_setting("bogus"), None);
    }
}
