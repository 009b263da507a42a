use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexSet;
use regex::Regex;
use serde_json::Value;

use crate::model::{
    DEFAULT_ISSUE_TYPE, DEFAULT_PRIORITY, Issue, Status, clamp_priority, parse_label_list,
};

/// Dependency kind that sets `parent`/`children`.
pub const DEP_PARENT_CHILD: &str = "parent-child";
/// Dependency kind that sets `blocked_by`/`blocks`.
pub const DEP_BLOCKS: &str = "blocks";

/// One dependency triple as reported by the backend:
/// `issue_id` depends on `depends_on_id` with the given kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDependency {
    pub issue_id: String,
    pub depends_on_id: String,
    pub dep_type: String,
}

impl RawDependency {
    pub fn new(issue_id: &str, depends_on_id: &str, dep_type: &str) -> Self {
        RawDependency {
            issue_id: issue_id.to_string(),
            depends_on_id: depends_on_id.to_string(),
            dep_type: dep_type.to_string(),
        }
    }
}

/// Pull dependency triples embedded in issue records (`dependencies: [...]`).
///
/// Entries may be full dependency objects or, for older backends, bare ids
/// (treated as `blocks`). Missing `issue_id` falls back to the owning record.
pub fn dependencies_from_records(records: &[Value]) -> Vec<RawDependency> {
    let mut deps = Vec::new();
    for record in records {
        let owner = match string_field(record, "id") {
            Some(id) => id,
            None => continue,
        };
        let list = match record.get("dependencies").and_then(Value::as_array) {
            Some(l) => l,
            None => continue,
        };
        for entry in list {
            match entry {
                Value::String(target) if !target.trim().is_empty() => {
                    deps.push(RawDependency::new(&owner, target.trim(), DEP_BLOCKS));
                }
                Value::Object(_) => {
                    let issue_id = string_field(entry, "issue_id").unwrap_or_else(|| owner.clone());
                    let target = string_field(entry, "depends_on_id")
                        .or_else(|| string_field(entry, "id"));
                    let kind = string_field(entry, "type")
                        .or_else(|| string_field(entry, "dependency_type"))
                        .unwrap_or_else(|| DEP_BLOCKS.to_string());
                    if let Some(target) = target {
                        deps.push(RawDependency {
                            issue_id,
                            depends_on_id: target,
                            dep_type: kind,
                        });
                    }
                }
                _ => {}
            }
        }
    }
    deps
}

/// Turn loosely-typed backend records plus dependency triples into the
/// canonical issue list: edges resolved, display status derived, sorted by
/// priority, then most recent update, then id.
pub fn normalize(records: &[Value], deps: &[RawDependency]) -> Vec<Issue> {
    let mut issues: Vec<Issue> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(issue) = issue_from_record(record) else {
            continue;
        };
        if index.contains_key(&issue.id) {
            tracing::debug!(id = %issue.id, "duplicate issue record ignored");
            continue;
        }
        index.insert(issue.id.clone(), issues.len());
        issues.push(issue);
    }

    for dep in deps {
        let Some(&from) = index.get(&dep.issue_id) else {
            continue;
        };
        if dep.issue_id == dep.depends_on_id {
            continue;
        }
        match dep.dep_type.as_str() {
            DEP_PARENT_CHILD => {
                issues[from].parent = Some(dep.depends_on_id.clone());
            }
            DEP_BLOCKS => {
                push_unique(&mut issues[from].blocked_by, &dep.depends_on_id);
                if let Some(&to) = index.get(&dep.depends_on_id) {
                    push_unique(&mut issues[to].blocks, &dep.issue_id);
                }
            }
            _ => {}
        }
    }

    // Children follow input order, whichever source set the parent.
    for i in 0..issues.len() {
        let Some(parent) = issues[i].parent.clone() else {
            continue;
        };
        if parent == issues[i].id {
            continue;
        }
        if let Some(&p) = index.get(&parent) {
            let child = issues[i].id.clone();
            push_unique(&mut issues[p].children, &child);
        }
    }

    let closed_or_missing: Vec<Vec<String>> = issues
        .iter()
        .map(|issue| {
            issue
                .blocked_by
                .iter()
                .filter(|b| {
                    index
                        .get(b.as_str())
                        .is_none_or(|&bi| issues[bi].status == Status::Closed)
                })
                .cloned()
                .collect()
        })
        .collect();
    for (issue, inactive) in issues.iter_mut().zip(closed_or_missing) {
        issue.blocked_by.retain(|b| !inactive.contains(b));
        issue.derive_display();
    }

    issues.sort_by(canonical_order);
    issues
}

/// Priority ascending, then `updated_at` descending, then id ascending.
pub fn canonical_order(a: &Issue, b: &Issue) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| updated_desc(a, b))
        .then_with(|| a.id.cmp(&b.id))
}

/// Newest update first; issues without a timestamp sort last.
pub fn updated_desc(a: &Issue, b: &Issue) -> Ordering {
    b.updated_at.cmp(&a.updated_at)
}

fn push_unique(list: &mut Vec<String>, id: &str) {
    if !list.iter().any(|x| x == id) {
        list.push(id.to_string());
    }
}

fn issue_from_record(record: &Value) -> Option<Issue> {
    let id = string_field(record, "id")?;
    let title = match record.get("title") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };

    let mut issue = Issue::new(id, title);
    issue.description = string_field(record, "description").unwrap_or_default();
    issue.status = string_field(record, "status")
        .and_then(|s| Status::parse(&s))
        .unwrap_or(Status::Open);
    issue.priority = record
        .get("priority")
        .and_then(parse_priority_value)
        .unwrap_or(DEFAULT_PRIORITY);
    issue.issue_type = string_field(record, "issue_type")
        .or_else(|| string_field(record, "type"))
        .unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string());
    issue.assignee = string_field(record, "assignee").unwrap_or_default();
    issue.labels = match record.get("labels") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => parse_label_list(s),
        _ => IndexSet::new(),
    };
    issue.created_at = record.get("created_at").and_then(parse_timestamp);
    issue.updated_at = record.get("updated_at").and_then(parse_timestamp);
    issue.closed_at = record.get("closed_at").and_then(parse_timestamp);
    issue.parent = string_field(record, "parent");
    issue.display = issue.status;
    Some(issue)
}

/// A trimmed, non-empty string field. Numbers are stringified.
fn string_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() { None } else { Some(t.to_string()) }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_priority_value(v: &Value) -> Option<u8> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(clamp_priority),
        Value::String(s) => parse_priority(s),
        _ => None,
    }
}

/// `2`, `p2`, `P 2`, with optional surrounding space
static PRIORITY_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*[pP]?\s*(-?\d+)\s*$").ok());

/// Parse a priority permissively: `2`, `"2"`, `"p2"`, `"P2"`. Clamped to 0..=4.
pub fn parse_priority(s: &str) -> Option<u8> {
    let caps = PRIORITY_RE.as_ref()?.captures(s)?;
    caps[1].parse::<i64>().ok().map(clamp_priority)
}

fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}
