use std::collections::{HashMap, HashSet};

use crate::model::{Filter, Issue, SortMode, Status};

use super::normalize::updated_desc;

/// One rendered row of a board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRow {
    /// Index into the snapshot's issue list
    pub issue: usize,
    pub depth: usize,
    /// Ancestor shown only for hierarchy context
    pub ghost: bool,
}

/// A single status lane: rendered rows plus the selectable (real) issues.
#[derive(Debug, Clone)]
pub struct Column {
    pub status: Status,
    /// Rendered rows, ghosts included
    pub rows: Vec<BoardRow>,
    /// Real rows only, in tree order. Selection indexes into this list.
    pub issues: Vec<usize>,
    /// Rendered depth of each real issue, keyed by id
    pub depth: HashMap<String, usize>,
}

impl Column {
    fn empty(status: Status) -> Self {
        Column {
            status,
            rows: Vec::new(),
            issues: Vec::new(),
            depth: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Rendered-row index of the real row for `issue`.
    pub fn rendered_row_of(&self, issue: usize) -> Option<usize> {
        self.rows.iter().position(|r| !r.ghost && r.issue == issue)
    }

    /// Rendered-row index of the `selected`-th real issue.
    pub fn rendered_row_of_selection(&self, selected: usize) -> Option<usize> {
        self.issues
            .get(selected)
            .and_then(|&issue| self.rendered_row_of(issue))
    }

    /// Selection index of `issue` if it is a real row here.
    pub fn selection_index_of(&self, issue: usize) -> Option<usize> {
        self.issues.iter().position(|&i| i == issue)
    }
}

/// All four columns, in board order.
#[derive(Debug, Clone)]
pub struct Columns {
    columns: Vec<Column>,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            columns: Status::ALL.iter().map(|&s| Column::empty(s)).collect(),
        }
    }
}

impl Columns {
    pub fn get(&self, status: Status) -> &Column {
        &self.columns[status.column_index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Find the column and selection index holding `issue` as a real row.
    pub fn locate(&self, issue: usize) -> Option<(Status, usize)> {
        self.columns
            .iter()
            .find_map(|c| c.selection_index_of(issue).map(|i| (c.status, i)))
    }
}

/// Case-insensitive substring match over id, title, description, assignee
/// and labels. `needle` must already be lowercase.
pub fn matches_search(issue: &Issue, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    issue.id.to_lowercase().contains(needle)
        || issue.title.to_lowercase().contains(needle)
        || issue.description.to_lowercase().contains(needle)
        || issue.assignee.to_lowercase().contains(needle)
        || issue.labels.iter().any(|l| l.to_lowercase().contains(needle))
}

/// Build the per-status columns for a snapshot in canonical order.
pub fn compute_columns(issues: &[Issue], search: &str, filter: &Filter, sort: SortMode) -> Columns {
    let needle = search.trim().to_lowercase();
    let index: HashMap<&str, usize> = issues
        .iter()
        .enumerate()
        .map(|(i, issue)| (issue.id.as_str(), i))
        .collect();

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); Status::ALL.len()];
    for (i, issue) in issues.iter().enumerate() {
        if matches_search(issue, &needle) && filter.matches(issue) {
            buckets[issue.display.column_index()].push(i);
        }
    }

    let columns = Status::ALL
        .iter()
        .zip(buckets)
        .map(|(&status, mut bucket)| {
            sort_bucket(issues, &mut bucket, sort);
            build_column(issues, &index, status, &bucket)
        })
        .collect();
    Columns { columns }
}

/// Stable sort, so equal keys keep canonical order.
fn sort_bucket(issues: &[Issue], bucket: &mut [usize], sort: SortMode) {
    match sort {
        SortMode::StatusDateOnly => bucket.sort_by(|&a, &b| {
            let (a, b) = (&issues[a], &issues[b]);
            updated_desc(a, b).then_with(|| a.id.cmp(&b.id))
        }),
        SortMode::PriorityThenStatusDate => bucket.sort_by(|&a, &b| {
            let (a, b) = (&issues[a], &issues[b]);
            a.priority
                .cmp(&b.priority)
                .then_with(|| updated_desc(a, b))
                .then_with(|| a.id.cmp(&b.id))
        }),
    }
}

/// Depth-first order of a bucket as `(issue, depth)` pairs.
///
/// Roots are issues whose parent is outside the bucket (or themselves). Any
/// node still unvisited afterwards sits on a parent cycle and is swept in as
/// an extra root. Nodes are marked when pushed, so each appears once.
pub fn tree_order(issues: &[Issue], bucket: &[usize]) -> Vec<(usize, usize)> {
    let in_bucket: HashSet<&str> = bucket.iter().map(|&i| issues[i].id.as_str()).collect();
    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for &i in bucket {
        let issue = &issues[i];
        match issue.parent.as_deref() {
            Some(p) if p != issue.id && in_bucket.contains(p) => {
                children.entry(p).or_default().push(i);
            }
            _ => roots.push(i),
        }
    }

    let mut order = Vec::with_capacity(bucket.len());
    let mut visited: HashSet<usize> = HashSet::with_capacity(bucket.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for &start in roots.iter().chain(bucket.iter()) {
        if !visited.insert(start) {
            continue;
        }
        stack.push((start, 0));
        while let Some((i, depth)) = stack.pop() {
            order.push((i, depth));
            if let Some(kids) = children.get(issues[i].id.as_str()) {
                for &k in kids.iter().rev() {
                    if visited.insert(k) {
                        stack.push((k, depth + 1));
                    }
                }
            }
        }
    }
    order
}

/// Ancestors of `issue` that are not rows of this bucket, nearest-to-root
/// first. The walk stops at the first ancestor inside the bucket, at an
/// unknown id, or on a cycle.
fn ghost_chain(
    issues: &[Issue],
    index: &HashMap<&str, usize>,
    in_bucket: &HashSet<usize>,
    issue: usize,
) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut seen: HashSet<usize> = HashSet::from([issue]);
    let mut cursor = issues[issue].parent.as_deref();
    while let Some(pid) = cursor {
        let Some(&p) = index.get(pid) else { break };
        if in_bucket.contains(&p) || !seen.insert(p) {
            break;
        }
        chain.push(p);
        cursor = issues[p].parent.as_deref();
    }
    chain.reverse();
    chain
}

fn build_column(
    issues: &[Issue],
    index: &HashMap<&str, usize>,
    status: Status,
    bucket: &[usize],
) -> Column {
    let in_bucket: HashSet<usize> = bucket.iter().copied().collect();
    let mut column = Column::empty(status);
    let mut prev_chain: Vec<usize> = Vec::new();
    let mut ghost_offset = 0;

    for (i, depth) in tree_order(issues, bucket) {
        if depth == 0 {
            let chain = ghost_chain(issues, index, &in_bucket, i);
            let shared = chain
                .iter()
                .zip(prev_chain.iter())
                .take_while(|(a, b)| a == b)
                .count();
            for (d, &g) in chain.iter().enumerate().skip(shared) {
                column.rows.push(BoardRow {
                    issue: g,
                    depth: d,
                    ghost: true,
                });
            }
            ghost_offset = chain.len();
            prev_chain = chain;
        }
        let rendered = depth + ghost_offset;
        column.rows.push(BoardRow {
            issue: i,
            depth: rendered,
            ghost: false,
        });
        column.issues.push(i);
        column.depth.insert(issues[i].id.clone(), rendered);
    }
    column
}
