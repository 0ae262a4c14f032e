use crate::core::branch::Branch;
use crate::core::error::Result;
use crate::core::object::blob_hash;
use crate::core::repository::Repository;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Modified,
    Deleted,
}

impl Change {
    pub fn as_str(&self) -> &str {
        match self {
            Change::Modified => "modified",
            Change::Deleted => "deleted",
        }
    }
}

/// Snapshot of branches, staging and working tree. Every list is sorted.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub branches: Vec<Branch>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub unstaged: Vec<(String, Change)>,
    pub untracked: Vec<String>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.removed.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
    }
}

impl Repository {
    pub fn status(&self) -> Result<Status> {
        let head = self.head_commit()?;
        let staging = &self.state.staging;
        let mut unstaged = BTreeMap::new();

        for (path, head_hash) in head.tracked.iter() {
            if staging.is_removed(path) || staging.staged_hash(path).is_some() {
                continue;
            }
            match self.worktree.read(path)? {
                Some(content) if blob_hash(&content) != head_hash => {
                    unstaged.insert(path.to_string(), Change::Modified);
                }
                Some(_) => {}
                None => {
                    unstaged.insert(path.to_string(), Change::Deleted);
                }
            }
        }

        for (path, staged_hash) in staging.added() {
            match self.worktree.read(path)? {
                Some(content) if blob_hash(&content) != *staged_hash => {
                    unstaged.insert(path.clone(), Change::Modified);
                }
                Some(_) => {}
                None => {
                    unstaged.insert(path.clone(), Change::Deleted);
                }
            }
        }

        let untracked = self
            .worktree
            .files()?
            .into_iter()
            .filter(|path| {
                staging.is_removed(path)
                    || (staging.staged_hash(path).is_none() && !head.tracked.contains(path))
            })
            .collect();

        Ok(Status {
            branches: self.state.branches.list(),
            staged: staging.added().keys().cloned().collect(),
            removed: staging.removed().iter().cloned().collect(),
            unstaged: unstaged.into_iter().collect(),
            untracked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reports_every_section() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut repo = Repository::init_with_branch(root, "master").unwrap();

        fs::write(root.join("keep.txt"), "keep").unwrap();
        fs::write(root.join("edit.txt"), "v1").unwrap();
        fs::write(root.join("gone.txt"), "gone").unwrap();
        fs::write(root.join("drop.txt"), "drop").unwrap();
        for f in ["keep.txt", "edit.txt", "gone.txt", "drop.txt"] {
            repo.add(f).unwrap();
        }
        repo.commit("base").unwrap();
        repo.branch("other").unwrap();

        fs::write(root.join("edit.txt"), "v2").unwrap();
        fs::remove_file(root.join("gone.txt")).unwrap();
        repo.rm("drop.txt").unwrap();
        fs::write(root.join("new.txt"), "staged").unwrap();
        repo.add("new.txt").unwrap();
        fs::write(root.join("new.txt"), "changed after staging").unwrap();
        fs::write(root.join("stray.txt"), "?").unwrap();

        let status = repo.status().unwrap();
        let names: Vec<_> = status.branches.iter().map(|b| (b.name.as_str(), b.is_current)).collect();
        assert_eq!(names, vec![("master", true), ("other", false)]);
        assert_eq!(status.staged, vec!["new.txt"]);
        assert_eq!(status.removed, vec!["drop.txt"]);
        assert_eq!(
            status.unstaged,
            vec![
                ("edit.txt".to_string(), Change::Modified),
                ("gone.txt".to_string(), Change::Deleted),
                ("new.txt".to_string(), Change::Modified),
            ]
        );
        assert_eq!(status.untracked, vec!["stray.txt"]);
        assert!(!status.is_clean());
    }

    #[test]
    fn fresh_repository_is_clean() {
        let dir = tempdir().unwrap();
        let repo = Repository::init_with_branch(dir.path(), "master").unwrap();
        assert!(repo.status().unwrap().is_clean());
    }
}
