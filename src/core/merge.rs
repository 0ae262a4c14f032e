//! Three-way merge of another branch into the current one.
//!
//! All precondition checks run before the first write, so a refused merge
//! leaves the repository untouched.

use crate::core::error::{RepoError, Result};
use crate::core::object::ObjectType;
use crate::core::repository::Repository;
use crate::core::tree::Tree;
use std::collections::BTreeSet;
use tracing::{info, warn};

pub const CONFLICT_START: &str = "<<<<<<< HEAD\n";
pub const CONFLICT_SEPARATOR: &str = "=======\n";
pub const CONFLICT_END: &str = ">>>>>>>\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The target already sits in the current branch's history.
    UpToDate,
    /// The current branch was moved to the target head; no commit was made.
    FastForward { head: String },
    /// A two-parent commit was written. Conflicted paths hold markers in the
    /// working tree.
    Merged { commit: String, conflicts: Vec<String> },
}

impl MergeOutcome {
    pub fn has_conflicts(&self) -> bool {
        matches!(self, MergeOutcome::Merged { conflicts, .. } if !conflicts.is_empty())
    }
}

/// What to do with one path given its digest at the split point, in the
/// current head and in the target head (`None` = not tracked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Keep,
    Take(String),
    Delete,
    Conflict,
}

pub fn resolve(split: Option<&str>, current: Option<&str>, target: Option<&str>) -> Resolution {
    if current == target || split == target {
        return Resolution::Keep;
    }
    if split == current {
        return match target {
            Some(hash) => Resolution::Take(hash.to_string()),
            None => Resolution::Delete,
        };
    }
    Resolution::Conflict
}

/// Working-file content for a conflicted path. A side that deleted the file
/// contributes an empty block.
pub fn conflict_content(current: Option<&[u8]>, target: Option<&[u8]>) -> Vec<u8> {
    let mut out = CONFLICT_START.as_bytes().to_vec();
    out.extend_from_slice(current.unwrap_or_default());
    out.extend_from_slice(CONFLICT_SEPARATOR.as_bytes());
    out.extend_from_slice(target.unwrap_or_default());
    out.extend_from_slice(CONFLICT_END.as_bytes());
    out
}

impl Repository {
    pub fn merge(&mut self, branch: &str) -> Result<MergeOutcome> {
        let target_head = self
            .state
            .branches
            .get(branch)
            .ok_or_else(|| RepoError::UnknownBranch(branch.to_string()))?
            .to_string();
        if !self.state.staging.is_empty() {
            return Err(RepoError::UncommittedChanges);
        }
        let current_name = self.state.branches.current_name().to_string();
        if current_name == branch {
            return Err(RepoError::SelfMerge);
        }

        let current_head = self.head_id()?;
        let current = self.get_commit(&current_head)?;
        let target = self.get_commit(&target_head)?;
        self.check_untracked(&current.tracked, &target.tracked)?;

        let split_id = self.graph().split_point(&current_head, &target_head)?;

        if split_id.as_deref() == Some(target_head.as_str()) {
            info!(branch, "given branch is already merged");
            return Ok(MergeOutcome::UpToDate);
        }
        if split_id.as_deref() == Some(current_head.as_str()) {
            self.materialize(&current.tracked, &target.tracked)?;
            self.state.branches.set_head(&current_name, &target_head)?;
            info!(branch, head = %target_head, "fast-forwarded");
            return Ok(MergeOutcome::FastForward { head: target_head });
        }

        let split = match &split_id {
            Some(id) => self.get_commit(id)?.tracked,
            None => {
                warn!(branch, "merging histories with no common ancestor");
                Tree::new()
            }
        };

        let conflicts = self.apply_three_way(&split, &current.tracked, &target.tracked)?;

        let message = format!("Merged {} into {}.", branch, current_name);
        let commit = self.record_commit(vec![current_head, target_head], message)?;
        info!(branch, commit = %commit, conflicts = conflicts.len(), "merged");

        Ok(MergeOutcome::Merged { commit, conflicts })
    }

    /// Update working tree and staging for every path; returns conflicted paths.
    ///
    /// The merged snapshot is checked for file/directory clashes before the
    /// working tree is touched, and deletions are applied before writes.
    fn apply_three_way(&mut self, split: &Tree, current: &Tree, target: &Tree) -> Result<Vec<String>> {
        let paths: BTreeSet<&str> = split
            .paths()
            .chain(current.paths())
            .chain(target.paths())
            .collect();

        let mut plan = Vec::new();
        let mut merged = current.clone();
        for path in paths {
            let resolution = resolve(split.get(path), current.get(path), target.get(path));
            match &resolution {
                Resolution::Keep => continue,
                Resolution::Take(hash) => merged.insert(path.to_string(), hash.clone()),
                Resolution::Delete => {
                    merged.remove(path);
                }
                Resolution::Conflict => merged.insert(path.to_string(), String::new()),
            }
            plan.push((path, resolution));
        }
        if let Some(path) = merged.path_clash() {
            return Err(RepoError::PathConflict(path.to_string()));
        }
        for (_, resolution) in &plan {
            if let Resolution::Take(hash) = resolution {
                if !self.objects.exists(hash) {
                    return Err(RepoError::ObjectNotFound(hash.clone()));
                }
            }
        }

        for (path, resolution) in &plan {
            if *resolution == Resolution::Delete {
                self.worktree.remove(path)?;
                self.state.staging.stage_removal(path);
            }
        }

        let mut conflicts = Vec::new();
        for (path, resolution) in plan {
            let ours = current.get(path);
            match resolution {
                Resolution::Keep | Resolution::Delete => {}
                Resolution::Take(hash) => {
                    let content = self.objects.read(&hash)?;
                    self.worktree.write(path, &content)?;
                    self.state.staging.stage(path, &hash, ours);
                }
                Resolution::Conflict => {
                    let ours_content = ours.map(|h| self.objects.read(h)).transpose()?;
                    let theirs_content = target.get(path).map(|h| self.objects.read(h)).transpose()?;
                    let content = conflict_content(ours_content.as_deref(), theirs_content.as_deref());

                    let hash = self.objects.create(ObjectType::Blob, &content)?;
                    self.worktree.write(path, &content)?;
                    self.state.staging.stage(path, &hash, ours);
                    conflicts.push(path.to_string());
                }
            }
        }

        Ok(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: Option<&str> = Some("s0000000");
    const X: Option<&str> = Some("x0000000");
    const Y: Option<&str> = Some("y0000000");

    #[test]
    fn unchanged_or_identical_keeps_current() {
        assert_eq!(resolve(S, S, S), Resolution::Keep);
        assert_eq!(resolve(S, X, X), Resolution::Keep);
        assert_eq!(resolve(S, None, None), Resolution::Keep);
    }

    #[test]
    fn change_only_on_target_is_taken() {
        assert_eq!(resolve(S, S, X), Resolution::Take("x0000000".into()));
        assert_eq!(resolve(None, None, X), Resolution::Take("x0000000".into()));
        assert_eq!(resolve(S, S, None), Resolution::Delete);
    }

    #[test]
    fn change_only_on_current_is_kept() {
        assert_eq!(resolve(S, X, S), Resolution::Keep);
        assert_eq!(resolve(None, X, None), Resolution::Keep);
        assert_eq!(resolve(S, None, S), Resolution::Keep);
    }

    #[test]
    fn divergent_changes_conflict() {
        assert_eq!(resolve(S, X, Y), Resolution::Conflict);
        assert_eq!(resolve(S, None, X), Resolution::Conflict);
        assert_eq!(resolve(S, X, None), Resolution::Conflict);
        assert_eq!(resolve(None, X, Y), Resolution::Conflict);
    }

    #[test]
    fn conflict_markers_wrap_both_sides() {
        let content = conflict_content(Some(b"X\n"), Some(b"Y\n"));
        assert_eq!(content, b"<<<<<<< HEAD\nX\n=======\nY\n>>>>>>>\n");
        let deleted = conflict_content(None, Some(b"Y\n"));
        assert_eq!(deleted, b"<<<<<<< HEAD\n=======\nY\n>>>>>>>\n");
    }
}
