use crate::core::error::{RepoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Listing view of one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub head: String,
    pub is_current: bool,
}

/// Named branch heads plus the name of the checked-out branch.
///
/// The current branch is a single `head` field rather than a flag on each
/// branch, so there is always exactly one.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BranchTable {
    head: String,
    branches: BTreeMap<String, String>,
}

impl BranchTable {
    pub fn new(name: &str, commit: &str) -> Self {
        let mut branches = BTreeMap::new();
        branches.insert(name.to_string(), commit.to_string());
        Self {
            head: name.to_string(),
            branches,
        }
    }

    pub fn create(&mut self, name: &str, commit: &str) -> Result<()> {
        if self.branches.contains_key(name) {
            return Err(RepoError::BranchExists(name.to_string()));
        }
        self.branches.insert(name.to_string(), commit.to_string());
        info!(branch = name, head = commit, "created branch");
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<String> {
        if !self.branches.contains_key(name) {
            return Err(RepoError::UnknownBranch(name.to_string()));
        }
        if self.head == name {
            return Err(RepoError::CannotRemoveCurrent(name.to_string()));
        }
        let head = self.branches.remove(name).unwrap_or_default();
        info!(branch = name, "removed branch");
        Ok(head)
    }

    pub fn set_head(&mut self, name: &str, commit: &str) -> Result<()> {
        let slot = self
            .branches
            .get_mut(name)
            .ok_or_else(|| RepoError::UnknownBranch(name.to_string()))?;
        *slot = commit.to_string();
        info!(branch = name, head = commit, "moved branch");
        Ok(())
    }

    /// Create or move a branch without any existence checks.
    pub fn upsert(&mut self, name: &str, commit: &str) {
        self.branches.insert(name.to_string(), commit.to_string());
        info!(branch = name, head = commit, "updated branch");
    }

    pub fn switch_current(&mut self, name: &str) -> Result<()> {
        if !self.branches.contains_key(name) {
            return Err(RepoError::UnknownBranch(name.to_string()));
        }
        if self.head == name {
            return Err(RepoError::AlreadyCurrent(name.to_string()));
        }
        self.head = name.to_string();
        info!(branch = name, "switched current branch");
        Ok(())
    }

    pub fn current_name(&self) -> &str {
        &self.head
    }

    pub fn current_head(&self) -> Result<&str> {
        self.get(&self.head)
            .ok_or_else(|| RepoError::Corrupted(format!("current branch '{}' has no head", self.head)))
    }

    pub fn current(&self) -> Result<Branch> {
        Ok(Branch {
            name: self.head.clone(),
            head: self.current_head()?.to_string(),
            is_current: true,
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.branches.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    pub fn heads(&self) -> impl Iterator<Item = &str> {
        self.branches.values().map(String::as_str)
    }

    /// All branches sorted by name.
    pub fn list(&self) -> Vec<Branch> {
        self.branches
            .iter()
            .map(|(name, head)| Branch {
                name: name.clone(),
                head: head.clone(),
                is_current: *name == self.head,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BranchTable {
        let mut t = BranchTable::new("master", "aaaaaaaa");
        t.create("feature", "aaaaaaaa").unwrap();
        t
    }

    #[test]
    fn create_rejects_duplicates() {
        let mut t = table();
        assert!(matches!(t.create("feature", "bbbbbbbb"), Err(RepoError::BranchExists(_))));
        assert_eq!(t.get("feature"), Some("aaaaaaaa"));
    }

    #[test]
    fn cannot_remove_current() {
        let mut t = table();
        assert!(matches!(t.remove("master"), Err(RepoError::CannotRemoveCurrent(_))));
        assert!(matches!(t.remove("nope"), Err(RepoError::UnknownBranch(_))));
        assert_eq!(t.list().len(), 2);
        assert_eq!(t.remove("feature").unwrap(), "aaaaaaaa");
        assert!(!t.contains("feature"));
    }

    #[test]
    fn exactly_one_current() {
        let mut t = table();
        t.switch_current("feature").unwrap();
        let current: Vec<_> = t.list().into_iter().filter(|b| b.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].name, "feature");
        assert!(matches!(t.switch_current("feature"), Err(RepoError::AlreadyCurrent(_))));
        assert!(matches!(t.switch_current("ghost"), Err(RepoError::UnknownBranch(_))));
    }

    #[test]
    fn set_head_moves_only_named_branch() {
        let mut t = table();
        t.set_head("master", "cccccccc").unwrap();
        assert_eq!(t.current_head().unwrap(), "cccccccc");
        assert_eq!(t.get("feature"), Some("aaaaaaaa"));
        assert!(t.set_head("ghost", "cccccccc").is_err());
    }
}
