//! Named remotes and history transfer between two repositories on disk.
//!
//! A remote is another sprig repository addressed by the path of its
//! `.sprig` directory. Transfers copy commit and blob objects only; the
//! remote's working tree is never touched.

use crate::core::commit::Commit;
use crate::core::error::{RepoError, Result};
use crate::core::merge::MergeOutcome;
use crate::core::object::ObjectStore;
use crate::core::repository::Repository;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Remotes {
    entries: BTreeMap<String, PathBuf>,
}

impl Remotes {
    pub fn add(&mut self, name: &str, path: &Path) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(RepoError::RemoteExists(name.to_string()));
        }
        self.entries.insert(name.to_string(), path.to_path_buf());
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<PathBuf> {
        self.entries
            .remove(name)
            .ok_or_else(|| RepoError::UnknownRemote(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&Path> {
        self.entries
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| RepoError::UnknownRemote(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub branch: String,
    pub head: String,
    pub commits: usize,
    pub objects: usize,
}

/// Copy every commit reachable from `start` that `known` lacks, with the blobs
/// of its snapshot. Walks all parents and stops at commits already known on
/// the destination. Returns the copied commit ids.
fn transfer(src: &ObjectStore, dst: &ObjectStore, known: &BTreeSet<String>, start: &str) -> Result<(Vec<String>, usize)> {
    let mut copied = Vec::new();
    let mut objects = 0;
    let mut seen = HashSet::new();
    let mut to_visit = vec![start.to_string()];

    while let Some(id) = to_visit.pop() {
        if known.contains(&id) || !seen.insert(id.clone()) {
            continue;
        }
        let commit = Commit::from_hash(src, &id)?;
        for hash in commit.tracked.hashes() {
            if src.copy_to(dst, hash)? {
                objects += 1;
            }
        }
        if src.copy_to(dst, &id)? {
            objects += 1;
        }
        debug!(commit = %id, "transferred commit");
        copied.push(id);
        to_visit.extend(commit.parents);
    }

    Ok((copied, objects))
}

impl Repository {
    pub fn add_remote(&mut self, name: &str, path: &Path) -> Result<()> {
        self.state.remotes.add(name, path)
    }

    pub fn rm_remote(&mut self, name: &str) -> Result<()> {
        self.state.remotes.remove(name).map(|_| ())
    }

    pub fn open_remote(&self, name: &str) -> Result<Repository> {
        let configured = self.state.remotes.get(name)?;
        let git_dir = if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.path.join(configured)
        };
        if !git_dir.is_dir() {
            return Err(RepoError::RemoteNotFound(configured.display().to_string()));
        }
        Repository::open_git_dir(&git_dir)
    }

    /// Copy `branch` from remote `name` into the tracking branch `name/branch`.
    pub fn fetch(&mut self, name: &str, branch: &str) -> Result<TransferSummary> {
        let remote = self.open_remote(name)?;
        let remote_head = remote
            .state
            .branches
            .get(branch)
            .ok_or_else(|| RepoError::RemoteBranchNotFound(branch.to_string()))?
            .to_string();

        let (copied, objects) = transfer(&remote.objects, &self.objects, &self.state.commits, &remote_head)?;
        let commits = copied.len();
        self.state.commits.extend(copied);

        let tracking = format!("{}/{}", name, branch);
        self.state.branches.upsert(&tracking, &remote_head);
        info!(remote = name, branch = %tracking, commits, objects, "fetched");

        Ok(TransferSummary {
            branch: tracking,
            head: remote_head,
            commits,
            objects,
        })
    }

    /// Fast-forward `branch` on remote `name` to the current head.
    pub fn push(&mut self, name: &str, branch: &str) -> Result<TransferSummary> {
        let mut remote = self.open_remote(name)?;
        let local_head = self.head_id()?;

        if let Some(remote_head) = remote.state.branches.get(branch) {
            if !self.graph().ancestors(&local_head)?.contains(remote_head) {
                return Err(RepoError::NeedsPull);
            }
        }

        let (copied, objects) = transfer(&self.objects, &remote.objects, &remote.state.commits, &local_head)?;
        let commits = copied.len();
        remote.state.commits.extend(copied);
        remote.state.branches.upsert(branch, &local_head);
        remote.save()?;
        info!(remote = name, branch, commits, objects, "pushed");

        Ok(TransferSummary {
            branch: branch.to_string(),
            head: local_head,
            commits,
            objects,
        })
    }

    /// Fetch, record the tracking branch, then merge it. A refused merge still
    /// leaves the fetched branch in place.
    pub fn pull(&mut self, name: &str, branch: &str) -> Result<MergeOutcome> {
        let fetched = self.fetch(name, branch)?;
        self.save()?;
        self.merge(&fetched.branch)
    }
}
