use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::model::{Issue, IssueChanges, IssueDraft};
use crate::ops::normalize::{DEP_BLOCKS, DEP_PARENT_CHILD, RawDependency, dependencies_from_records, normalize};

use super::process::{self, ProcessError, ProcessSpec};

/// Error type for issue-tracker backend calls
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("could not parse backend output: {0}")]
    Parse(String),
    #[error("{0}")]
    Rejected(String),
}

/// How a delete treats dependents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Refuse when other issues depend on this one
    Plain,
    /// Delete dependents too
    Cascade,
    /// Delete and orphan dependents
    Force,
}

/// One full backend listing plus a hash of the raw payload bytes.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub records: Vec<Value>,
    pub deps: Vec<RawDependency>,
    pub hash: u64,
}

impl RawSnapshot {
    /// Parse a listing that is either a JSON array or JSON lines.
    pub fn parse(payload: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(payload);
        let trimmed = text.trim();
        let records: Vec<Value> = if trimmed.is_empty() {
            Vec::new()
        } else if trimmed.starts_with('[') {
            serde_json::from_str(trimmed).map_err(|e| BackendError::Parse(e.to_string()))?
        } else {
            trimmed
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(serde_json::from_str)
                .collect::<Result<_, _>>()
                .map_err(|e| BackendError::Parse(e.to_string()))?
        };
        let deps = dependencies_from_records(&records);
        Ok(RawSnapshot {
            records,
            deps,
            hash: payload_hash(payload),
        })
    }

    /// Canonical, normalized issue list.
    pub fn issues(&self) -> Vec<Issue> {
        normalize(&self.records, &self.deps)
    }
}

/// Content hash used to suppress redundant reloads.
pub fn payload_hash(payload: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    payload.hash(&mut hasher);
    hasher.finish()
}

/// Operations the board needs from the issue tracker.
pub trait Backend: Send + Sync {
    fn list_all(&self) -> Result<RawSnapshot, BackendError>;
    /// Returns the new issue's id. Only title and the fields `bd create`
    /// accepts are sent; a non-open status is a separate update.
    fn create_issue(&self, draft: &IssueDraft) -> Result<String, BackendError>;
    fn update_issue(&self, id: &str, changes: &IssueChanges) -> Result<(), BackendError>;
    fn close_issue(&self, id: &str) -> Result<(), BackendError>;
    fn reopen_issue(&self, id: &str) -> Result<(), BackendError>;
    /// With `dry_run`, returns the preview text and changes nothing.
    fn delete_issue(&self, id: &str, mode: DeleteMode, dry_run: bool)
    -> Result<String, BackendError>;
    /// `issue` becomes blocked by `blocker`.
    fn add_blocker(&self, issue: &str, blocker: &str) -> Result<(), BackendError>;
    fn remove_blocker(&self, issue: &str, blocker: &str) -> Result<(), BackendError>;
    fn list_dependencies(&self, id: &str) -> Result<String, BackendError>;
    fn get_setting(&self, key: &str) -> Result<Option<String>, BackendError>;
    fn set_setting(&self, key: &str, value: &str) -> Result<(), BackendError>;
}

/// `Backend` implemented by shelling out to the `bd` command.
#[derive(Debug, Clone)]
pub struct BdCli {
    program: String,
    beads_dir: PathBuf,
    timeout: Duration,
}

impl BdCli {
    pub fn new(program: impl Into<String>, beads_dir: &Path, timeout: Duration) -> Self {
        BdCli {
            program: program.into(),
            beads_dir: beads_dir.to_path_buf(),
            timeout,
        }
    }

    fn run<I, S>(&self, args: I) -> Result<process::ProcessOutput, BackendError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = ProcessSpec::new(&self.program, self.timeout).args(args);
        spec.envs
            .push(("BEADS_DIR", self.beads_dir.to_string_lossy().into_owned()));
        spec.cwd = self.beads_dir.parent();
        process::run(&spec).map_err(BackendError::from)
    }

    fn run_text<I, S>(&self, args: I) -> Result<String, BackendError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.run(args)?.stdout_text())
    }

    fn add_dependency(&self, issue: &str, target: &str, kind: &str) -> Result<(), BackendError> {
        self.run(["dep", "add", issue, target, "--type", kind])?;
        Ok(())
    }

    fn remove_dependency(&self, issue: &str, target: &str) -> Result<(), BackendError> {
        self.run(["dep", "remove", issue, target])?;
        Ok(())
    }
}

impl Backend for BdCli {
    fn list_all(&self) -> Result<RawSnapshot, BackendError> {
        let out = self.run(["export"])?;
        RawSnapshot::parse(&out.stdout)
    }

    fn create_issue(&self, draft: &IssueDraft) -> Result<String, BackendError> {
        let mut args = vec![
            "create".to_string(),
            draft.title.trim().to_string(),
            "--priority".into(),
            draft.priority.to_string(),
            "--type".into(),
            draft.issue_type.clone(),
            "--json".into(),
        ];
        if !draft.description.is_empty() {
            args.push("--description".into());
            args.push(draft.description.clone());
        }
        if !draft.assignee.trim().is_empty() {
            args.push("--assignee".into());
            args.push(draft.assignee.trim().to_string());
        }
        let labels: Vec<String> = draft.label_set().into_iter().collect();
        if !labels.is_empty() {
            args.push("--labels".into());
            args.push(labels.join(","));
        }
        if let Some(parent) = draft.parent_id() {
            args.push("--parent".into());
            args.push(parent.to_string());
        }

        let out = self.run(args)?;
        let created: Value = serde_json::from_slice(&out.stdout)
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        let id = created
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| BackendError::Parse("create returned no id".into()))?
            .to_string();
        Ok(id)
    }

    fn update_issue(&self, id: &str, changes: &IssueChanges) -> Result<(), BackendError> {
        let mut args = vec!["update".to_string(), id.to_string()];
        if let Some(ref title) = changes.title {
            args.extend(["--title".into(), title.clone()]);
        }
        if let Some(status) = changes.status {
            args.extend(["--status".into(), status.as_str().to_string()]);
        }
        if let Some(priority) = changes.priority {
            args.extend(["--priority".into(), priority.to_string()]);
        }
        if let Some(ref kind) = changes.issue_type {
            args.extend(["--type".into(), kind.clone()]);
        }
        if let Some(ref assignee) = changes.assignee {
            args.extend(["--assignee".into(), assignee.clone()]);
        }
        if let Some(ref description) = changes.description {
            args.extend(["--description".into(), description.clone()]);
        }
        if args.len() > 2 {
            self.run(args)?;
        }

        if let Some(ref labels) = changes.labels {
            for label in &labels.add {
                self.run(["label", "add", id, label.as_str()])?;
            }
            for label in &labels.remove {
                self.run(["label", "remove", id, label.as_str()])?;
            }
        }
        if let Some(ref parent) = changes.parent {
            if let Some(ref old) = parent.from {
                self.remove_dependency(id, old)?;
            }
            if let Some(ref new) = parent.to {
                self.add_dependency(id, new, DEP_PARENT_CHILD)?;
            }
        }
        Ok(())
    }

    fn close_issue(&self, id: &str) -> Result<(), BackendError> {
        self.run(["close", id])?;
        Ok(())
    }

    fn reopen_issue(&self, id: &str) -> Result<(), BackendError> {
        self.run(["reopen", id])?;
        Ok(())
    }

    fn delete_issue(
        &self,
        id: &str,
        mode: DeleteMode,
        dry_run: bool,
    ) -> Result<String, BackendError> {
        let mut args = vec!["delete".to_string(), id.to_string()];
        match mode {
            DeleteMode::Plain => {}
            DeleteMode::Cascade => args.push("--cascade".into()),
            DeleteMode::Force => args.push("--force".into()),
        }
        if dry_run {
            args.push("--dry-run".into());
        } else if mode == DeleteMode::Plain {
            // Without --force, bd only previews.
            args.push("--force".into());
        }
        Ok(self.run_text(args)?.trim_end().to_string())
    }

    fn add_blocker(&self, issue: &str, blocker: &str) -> Result<(), BackendError> {
        self.add_dependency(issue, blocker, DEP_BLOCKS)
    }

    fn remove_blocker(&self, issue: &str, blocker: &str) -> Result<(), BackendError> {
        self.remove_dependency(issue, blocker)
    }

    fn list_dependencies(&self, id: &str) -> Result<String, BackendError> {
        Ok(self.run_text(["dep", "list", id])?.trim_end().to_string())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, BackendError> {
        let raw = self.run_text(["config", "get", key])?;
        let value = raw.trim();
        if value.is_empty() || value.contains("(not set)") {
            Ok(None)
        } else {
            Ok(Some(value.to_string()))
        }
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.run(["config", "set", key, value])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    #[test]
    fn parses_json_lines_listing() {
        let payload = br#"{"id":"a","title":"A","dependencies":[{"issue_id":"a","depends_on_id":"b","type":"blocks"}]}
{"id":"b","title":"B"}
"#;
        let snap = RawSnapshot::parse(payload).unwrap();
        assert_eq!(snap.records.len(), 2);
        assert_eq!(snap.deps, vec![RawDependency::new("a", "b", DEP_BLOCKS)]);
        let issues = snap.issues();
        let a = issues.iter().find(|i| i.id == "a").unwrap();
        assert_eq!(a.display, Status::Blocked);
    }

    #[test]
    fn parses_json_array_listing() {
        let snap = RawSnapshot::parse(br#"[{"id":"a","title":"A"}]"#).unwrap();
        assert_eq!(snap.records.len(), 1);
    }

    #[test]
    fn empty_listing_is_empty_snapshot() {
        let snap = RawSnapshot::parse(b"  \n").unwrap();
        assert!(snap.records.is_empty());
    }

    #[test]
    fn malformed_listing_is_parse_error() {
        assert!(matches!(
            RawSnapshot::parse(b"{not json"),
            Err(BackendError::Parse(_))
        ));
    }

    #[test]
    fn identical_payloads_hash_equal() {
        assert_eq!(payload_hash(b"same"), payload_hash(b"same"));
        assert_ne!(payload_hash(b"same"), payload_hash(b"diff"));
    }
}
