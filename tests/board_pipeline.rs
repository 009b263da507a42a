use beadboard::io::backend::RawSnapshot;
use beadboard::model::{Filter, Issue, IssueDraft, SortMode, Status};
use beadboard::ops::columns::{Columns, compute_columns};
use beadboard::ops::issue_text::{parse_issue_text, render_issue_text};
use pretty_assertions::assert_eq;

const LISTING: &str = r#"[
  {"id":"bd-1","title":"Epic","status":"closed","issue_type":"epic","priority":1},
  {"id":"bd-2","title":"Login page","parent":"bd-1","priority":1,"labels":["web"]},
  {"id":"bd-3","title":"Session store","parent":"bd-1","priority":2,"assignee":"dana"},
  {"id":"bd-4","title":"Rotate keys","status":"in_progress","priority":0,
   "dependencies":[{"issue_id":"bd-4","depends_on_id":"bd-3","type":"blocks"}]},
  {"id":"bd-5","title":"Audit","dependencies":[{"depends_on_id":"bd-1","type":"blocks"}]},
  {"id":"bd-6","title":"Waiting on store","dependencies":[{"depends_on_id":"bd-3","type":"blocks"}]}
]"#;

fn load() -> Vec<Issue> {
    RawSnapshot::parse(LISTING.as_bytes())
        .expect("listing parses")
        .issues()
}

/// Rows of one column as `~id@depth` (ghost) or `id@depth`.
fn rows(issues: &[Issue], columns: &Columns, status: Status) -> Vec<String> {
    columns
        .get(status)
        .rows
        .iter()
        .map(|r| {
            let mark = if r.ghost { "~" } else { "" };
            format!("{mark}{}@{}", issues[r.issue].id, r.depth)
        })
        .collect()
}

fn by_id<'a>(issues: &'a [Issue], id: &str) -> &'a Issue {
    issues.iter().find(|i| i.id == id).expect("issue present")
}

#[test]
fn blocked_display_only_for_open_issues_with_active_blockers() {
    let issues = load();
    assert_eq!(by_id(&issues, "bd-6").display, Status::Blocked);
    assert_eq!(by_id(&issues, "bd-6").blocked_by, vec!["bd-3".to_string()]);
    // In progress stays in progress even with an open blocker
    assert_eq!(by_id(&issues, "bd-4").display, Status::InProgress);
    // A closed blocker no longer blocks
    assert_eq!(by_id(&issues, "bd-5").display, Status::Open);
    assert!(by_id(&issues, "bd-5").blocked_by.is_empty());
    assert_eq!(
        by_id(&issues, "bd-3").blocks,
        vec!["bd-4".to_string(), "bd-6".to_string()]
    );
}

#[test]
fn children_of_closed_epic_sit_under_a_ghost_row() {
    let issues = load();
    let columns = compute_columns(&issues, "", &Filter::default(), SortMode::default());
    assert_eq!(
        rows(&issues, &columns, Status::Open),
        vec!["~bd-1@0", "bd-2@1", "bd-3@1", "bd-5@0"]
    );
    assert_eq!(rows(&issues, &columns, Status::Closed), vec!["bd-1@0"]);
    assert_eq!(rows(&issues, &columns, Status::Blocked), vec!["bd-6@0"]);
    assert_eq!(rows(&issues, &columns, Status::InProgress), vec!["bd-4@0"]);
    // Ghosts are never selectable
    assert_eq!(columns.get(Status::Open).len(), 3);
}

#[test]
fn search_and_filter_narrow_every_column() {
    let issues = load();
    let columns = compute_columns(&issues, "STORE", &Filter::default(), SortMode::default());
    let visible: Vec<&str> = columns
        .iter()
        .flat_map(|c| c.issues.iter().map(|&i| issues[i].id.as_str()))
        .collect();
    assert_eq!(visible, vec!["bd-3", "bd-6"]);

    let filter = Filter {
        label: Some("web".into()),
        ..Default::default()
    };
    let columns = compute_columns(&issues, "", &filter, SortMode::default());
    assert_eq!(rows(&issues, &columns, Status::Open), vec!["~bd-1@0", "bd-2@1"]);
    assert!(columns.get(Status::Blocked).rows.is_empty());
}

#[test]
fn editor_text_round_trips_an_edited_issue() {
    let issues = load();
    let base = IssueDraft::from_issue(by_id(&issues, "bd-3"));
    let text = render_issue_text(&base).replace("priority: 2", "priority: 0");
    let text = text.replace("---\n\n", "---\nmore detail\n");
    let edited = parse_issue_text(&text, &base).expect("valid text");
    assert_eq!(edited.priority, 0);
    assert_eq!(edited.assignee, "dana");
    assert_eq!(edited.parent, "bd-1");
    assert_eq!(edited.description, "more detail");

    let changes = edited.changes_from(by_id(&issues, "bd-3"));
    assert_eq!(changes.priority, Some(0));
    assert!(changes.title.is_none());
}
