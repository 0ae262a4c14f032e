use crate::core::error::{RepoError, Result};
use crate::core::tree::Tree;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Pending changes not yet captured by a commit.
///
/// A path is never in both `added` and `removed`: whichever of `stage` or
/// `unstage` ran last wins.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingArea {
    added: BTreeMap<String, String>,
    removed: BTreeSet<String>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `hash` as the next content of `path`.
    ///
    /// Staging the content head already tracks drops any pending entry
    /// instead. Returns whether `path` ends up staged for addition.
    pub fn stage(&mut self, path: &str, hash: &str, head_hash: Option<&str>) -> bool {
        self.removed.remove(path);
        if head_hash == Some(hash) {
            self.added.remove(path);
            false
        } else {
            self.added.insert(path.to_string(), hash.to_string());
            true
        }
    }

    /// Mark `path` for removal, or just drop its pending addition when head
    /// does not track it.
    pub fn unstage(&mut self, path: &str, tracked_by_head: bool) -> Result<()> {
        if !self.added.contains_key(path) && !tracked_by_head {
            return Err(RepoError::NothingToRemove(path.to_string()));
        }
        self.added.remove(path);
        if tracked_by_head {
            self.removed.insert(path.to_string());
        }
        Ok(())
    }

    pub fn stage_removal(&mut self, path: &str) {
        self.added.remove(path);
        self.removed.insert(path.to_string());
    }

    /// Head snapshot overlaid with additions, minus removals.
    pub fn assemble(&self, head: &Tree) -> Tree {
        let mut tracked = head.clone();
        for (path, hash) in &self.added {
            tracked.insert(path.clone(), hash.clone());
        }
        for path in &self.removed {
            tracked.remove(path);
        }
        tracked
    }

    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn added(&self) -> &BTreeMap<String, String> {
        &self.added
    }

    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    pub fn staged_hash(&self, path: &str) -> Option<&str> {
        self.added.get(path).map(String::as_str)
    }

    pub fn is_removed(&self, path: &str) -> bool {
        self.removed.contains(path)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(path) = self.added.keys().find(|p| self.removed.contains(*p)) {
            return Err(RepoError::Corrupted(format!(
                "'{}' is staged for both addition and removal",
                path
            )));
        }
        Ok(())
    }
}
