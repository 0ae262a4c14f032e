use crate::core::error::{RepoError, Result};
use crate::core::object::{ObjectStore, ObjectType};
use crate::core::tree::Tree;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

pub const INITIAL_MESSAGE: &str = "initial commit";

/// Immutable history record.
///
/// `tracked` is the complete snapshot at this commit, never a diff. The id is
/// the object digest of the serialized record, so it covers the parents, the
/// snapshot, the message and the timestamp.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Commit {
    pub parents: Vec<String>,
    pub tracked: Tree,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    pub fn new(parents: Vec<String>, tracked: Tree, message: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            parents,
            tracked,
            message,
            timestamp,
        }
    }

    /// The shared root: no parents, nothing tracked, stamped at the epoch.
    /// Every repository starts from the same id.
    pub fn initial() -> Self {
        Self::new(
            Vec::new(),
            Tree::new(),
            INITIAL_MESSAGE.to_string(),
            DateTime::<Utc>::default(),
        )
    }

    pub fn write(&self, store: &ObjectStore) -> Result<String> {
        let content = serde_json::to_vec(self)?;
        store.create(ObjectType::Commit, &content)
    }

    pub fn from_hash(store: &ObjectStore, hash: &str) -> Result<Self> {
        let (obj_type, content) = store.read_with_type(hash)?;
        if obj_type != ObjectType::Commit {
            return Err(RepoError::Corrupted(format!("{} is not a commit", hash)));
        }
        Ok(serde_json::from_slice(&content)?)
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn format_date(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    /// Log block for this commit, without the trailing blank line.
    pub fn format_for_log(&self, hash: &str) -> String {
        let mut out = format!("===\ncommit {}\n", hash);
        if self.is_merge() {
            out.push_str(&format!(
                "Merge: {} {}\n",
                short_hash(&self.parents[0]),
                short_hash(&self.parents[1])
            ));
        }
        out.push_str(&format!("Date: {}\n{}", self.format_date(), self.message));
        out
    }
}

pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn initial_commit_is_deterministic() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let id_a = Commit::initial().write(&ObjectStore::new(a.path())).unwrap();
        let id_b = Commit::initial().write(&ObjectStore::new(b.path())).unwrap();
        assert_eq!(id_a, id_b);
        assert!(Commit::initial().is_root());
    }

    #[test]
    fn snapshot_is_part_of_identity() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let when = Utc::now();
        let empty = Commit::new(vec!["abcdef12".into()], Tree::new(), "m".into(), when);
        let mut tracked = Tree::new();
        tracked.insert("a.txt".into(), "12345678".into());
        let full = Commit::new(vec!["abcdef12".into()], tracked, "m".into(), when);
        assert_ne!(empty.write(&store).unwrap(), full.write(&store).unwrap());
    }

    #[test]
    fn reads_back_what_was_written() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let commit = Commit::new(Vec::new(), Tree::new(), "hello".into(), Utc::now());
        let id = commit.write(&store).unwrap();
        assert_eq!(Commit::from_hash(&store, &id).unwrap(), commit);
    }

    #[test]
    fn rejects_blob_as_commit() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let blob = store.create(ObjectType::Blob, b"not a commit").unwrap();
        assert!(matches!(Commit::from_hash(&store, &blob), Err(RepoError::Corrupted(_))));
    }

    #[test]
    fn log_block_shows_merge_parents() {
        let commit = Commit::new(
            vec!["1234567890".into(), "abcdefabcd".into()],
            Tree::new(),
            "Merged feature into master.".into(),
            Utc::now(),
        );
        let block = commit.format_for_log("ffff0000");
        assert!(block.starts_with("===\ncommit ffff0000\nMerge: 1234567 abcdefa\nDate: "));
        assert!(block.ends_with("Merged feature into master."));
    }
}
