use crate::core::branch::BranchTable;
use crate::core::commit::Commit;
use crate::core::config::Config;
use crate::core::error::{RepoError, Result};
use crate::core::graph::CommitGraph;
use crate::core::index::StagingArea;
use crate::core::object::{ObjectStore, ObjectType};
use crate::core::remote::Remotes;
use crate::core::tree::{parent_dirs, Tree};
use crate::core::worktree::WorkTree;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const REPO_DIR: &str = ".sprig";
const STATE_FILE: &str = "repo.json";
const STATE_VERSION: u32 = 1;

/// Everything mutable about a repository, persisted as one JSON record.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RepoState {
    pub version: u32,
    pub branches: BranchTable,
    pub staging: StagingArea,
    pub commits: BTreeSet<String>,
    #[serde(default)]
    pub remotes: Remotes,
}

impl RepoState {
    fn verify(&self) -> Result<()> {
        if self.version != STATE_VERSION {
            return Err(RepoError::Corrupted(format!(
                "unsupported repository format version {}",
                self.version
            )));
        }
        self.staging.validate()?;
        for head in self.branches.heads() {
            if !self.commits.contains(head) {
                return Err(RepoError::Corrupted(format!(
                    "branch head {} is not a known commit",
                    head
                )));
            }
        }
        self.branches.current_head()?;
        Ok(())
    }
}

/// Aggregate root: object store, branch table, staging area, commit index and
/// remotes of one repository. Loaded once per command and saved once.
pub struct Repository {
    pub path: PathBuf,
    pub git_dir: PathBuf,
    pub(crate) objects: ObjectStore,
    pub(crate) worktree: WorkTree,
    pub(crate) state: RepoState,
}

impl Repository {
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let branch = Config::load_global().unwrap_or_default().default_branch();
        Self::init_with_branch(path, &branch)
    }

    pub fn init_with_branch<P: AsRef<Path>>(path: P, branch: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let git_dir = path.join(REPO_DIR);

        if git_dir.exists() {
            return Err(RepoError::AlreadyExists);
        }

        fs::create_dir_all(git_dir.join("objects"))?;
        let objects = ObjectStore::new(git_dir.join("objects"));
        let root = Commit::initial().write(&objects)?;

        let state = RepoState {
            version: STATE_VERSION,
            branches: BranchTable::new(branch, &root),
            staging: StagingArea::new(),
            commits: BTreeSet::from([root.clone()]),
            remotes: Remotes::default(),
        };

        let repo = Repository {
            worktree: WorkTree::new(&path, REPO_DIR),
            path,
            git_dir,
            objects,
            state,
        };
        repo.save()?;

        info!(path = %repo.path.display(), branch, root = %root, "initialized repository");
        Ok(repo)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_git_dir(path.as_ref().join(REPO_DIR))
    }

    /// Open a repository by its `.sprig` directory; the working tree is its parent.
    pub fn open_git_dir<P: AsRef<Path>>(git_dir: P) -> Result<Self> {
        let git_dir = git_dir.as_ref().to_path_buf();

        if !Self::is_valid_repo(&git_dir) {
            return Err(RepoError::NotARepo);
        }

        let path = match git_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let content = fs::read_to_string(git_dir.join(STATE_FILE))?;
        let state: RepoState = serde_json::from_str(&content)?;
        state.verify()?;

        debug!(path = %path.display(), commits = state.commits.len(), "opened repository");
        Ok(Repository {
            worktree: WorkTree::new(&path, REPO_DIR),
            objects: ObjectStore::new(git_dir.join("objects")),
            path,
            git_dir,
            state,
        })
    }

    fn is_valid_repo(git_dir: &Path) -> bool {
        git_dir.join(STATE_FILE).is_file() && git_dir.join("objects").is_dir()
    }

    pub fn save(&self) -> Result<()> {
        let state_path = self.git_dir.join(STATE_FILE);
        let content = serde_json::to_string_pretty(&self.state)?;

        let temp_path = state_path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &state_path)?;
        Ok(())
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn worktree(&self) -> &WorkTree {
        &self.worktree
    }

    pub fn branches(&self) -> &BranchTable {
        &self.state.branches
    }

    pub fn staging(&self) -> &StagingArea {
        &self.state.staging
    }

    pub fn commits(&self) -> &BTreeSet<String> {
        &self.state.commits
    }

    pub fn remotes(&self) -> &Remotes {
        &self.state.remotes
    }

    pub fn graph(&self) -> CommitGraph<'_> {
        CommitGraph::new(&self.objects)
    }

    pub fn config(&self) -> Result<Config> {
        Config::load(&self.git_dir)
    }

    pub fn head_id(&self) -> Result<String> {
        Ok(self.state.branches.current_head()?.to_string())
    }

    pub fn head_commit(&self) -> Result<Commit> {
        self.get_commit(&self.head_id()?)
    }

    pub fn get_commit(&self, id: &str) -> Result<Commit> {
        Commit::from_hash(&self.objects, id)
    }

    /// Full id for an exact id or a unique prefix of a known commit.
    pub fn resolve_commit(&self, id: &str) -> Result<String> {
        if self.state.commits.contains(id) {
            return Ok(id.to_string());
        }
        if id.is_empty() {
            return Err(RepoError::UnknownCommit(id.to_string()));
        }

        let mut matches = self.state.commits.iter().filter(|c| c.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found.clone()),
            (Some(_), Some(_)) => Err(RepoError::AmbiguousCommit(id.to_string())),
            (None, _) => Err(RepoError::UnknownCommit(id.to_string())),
        }
    }

    /// Stage the working copy of `path`. Returns whether it is now staged;
    /// content identical to head leaves nothing staged.
    pub fn add(&mut self, path: &str) -> Result<bool> {
        Ok(self.add_all(&[path])?.into_iter().all(|staged| staged))
    }

    /// Stage several paths. Every path is read before anything is staged, so
    /// a missing file leaves the staging area as it was.
    pub fn add_all<S: AsRef<str>>(&mut self, paths: &[S]) -> Result<Vec<bool>> {
        let mut contents = Vec::with_capacity(paths.len());
        for path in paths {
            let path = self.worktree.normalize(path.as_ref())?;
            let content = self
                .worktree
                .read(&path)?
                .ok_or_else(|| RepoError::FileNotFound(path.clone()))?;
            contents.push((path, content));
        }

        let head = self.head_commit()?;
        let mut results = Vec::with_capacity(contents.len());
        for (path, content) in contents {
            let hash = self.objects.create(ObjectType::Blob, &content)?;
            let staged = self.state.staging.stage(&path, &hash, head.tracked.get(&path));
            debug!(path = %path, hash = %hash, staged, "add");
            results.push(staged);
        }
        Ok(results)
    }

    pub fn rm(&mut self, path: &str) -> Result<()> {
        self.rm_all(&[path])
    }

    /// Unstage or mark for removal several paths. Working files are deleted
    /// only after every path passed its check.
    pub fn rm_all<S: AsRef<str>>(&mut self, paths: &[S]) -> Result<()> {
        let head = self.head_commit()?;
        let mut staging = self.state.staging.clone();
        let mut doomed = Vec::new();

        for path in paths {
            let path = self.worktree.normalize(path.as_ref())?;
            let tracked = head.tracked.contains(&path);
            staging.unstage(&path, tracked)?;
            debug!(path = %path, tracked, "rm");
            if tracked {
                doomed.push(path);
            }
        }

        self.state.staging = staging;
        for path in &doomed {
            self.worktree.remove(path)?;
        }
        Ok(())
    }

    pub fn commit(&mut self, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            return Err(RepoError::EmptyMessage);
        }
        if self.state.staging.is_empty() {
            return Err(RepoError::NothingToCommit);
        }
        let parent = self.head_id()?;
        self.record_commit(vec![parent], message.to_string())
    }

    /// Snapshot head plus staging into a new commit on the current branch.
    pub(crate) fn record_commit(&mut self, parents: Vec<String>, message: String) -> Result<String> {
        let head = self.head_commit()?;
        let tracked = self.state.staging.assemble(&head.tracked);
        let commit = Commit::new(parents, tracked, message, Utc::now());
        let id = commit.write(&self.objects)?;

        self.state.commits.insert(id.clone());
        let current = self.state.branches.current_name().to_string();
        self.state.branches.set_head(&current, &id)?;
        self.state.staging.clear();

        info!(commit = %id, branch = %current, files = commit.tracked.len(), "recorded commit");
        Ok(id)
    }

    /// First-parent history from the current head back to the root.
    pub fn log(&self) -> Result<Vec<(String, Commit)>> {
        self.graph().first_parent_chain(&self.head_id()?).collect()
    }

    /// Every known commit, newest first.
    pub fn global_log(&self) -> Result<Vec<(String, Commit)>> {
        let mut all = self
            .state
            .commits
            .iter()
            .map(|id| Ok((id.clone(), self.get_commit(id)?)))
            .collect::<Result<Vec<_>>>()?;
        all.sort_by(|(id_a, a), (id_b, b)| b.timestamp.cmp(&a.timestamp).then_with(|| id_a.cmp(id_b)));
        Ok(all)
    }

    pub fn find(&self, message: &str) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for id in &self.state.commits {
            if self.get_commit(id)?.message == message {
                found.push(id.clone());
            }
        }
        if found.is_empty() {
            return Err(RepoError::NoCommitWithMessage(message.to_string()));
        }
        Ok(found)
    }

    /// Overwrite the working copy of `path` with its content in `commit`
    /// (head when `None`).
    pub fn checkout_file(&self, commit: Option<&str>, path: &str) -> Result<()> {
        let id = match commit {
            Some(c) => self.resolve_commit(c)?,
            None => self.head_id()?,
        };
        let path = self.worktree.normalize(path)?;
        let commit = self.get_commit(&id)?;
        let hash = commit
            .tracked
            .get(&path)
            .ok_or_else(|| RepoError::FileNotInCommit(path.clone()))?;

        let content = self.objects.read(hash)?;
        self.worktree.write(&path, &content)
    }

    pub fn checkout_branch(&mut self, name: &str) -> Result<()> {
        let target_head = self
            .state
            .branches
            .get(name)
            .ok_or_else(|| RepoError::UnknownBranch(name.to_string()))?
            .to_string();
        if self.state.branches.current_name() == name {
            return Err(RepoError::AlreadyCurrent(name.to_string()));
        }

        let current = self.head_commit()?;
        let target = self.get_commit(&target_head)?;
        self.check_untracked(&current.tracked, &target.tracked)?;

        self.materialize(&current.tracked, &target.tracked)?;
        self.state.branches.switch_current(name)?;
        self.state.staging.clear();
        Ok(())
    }

    pub fn branch(&mut self, name: &str) -> Result<()> {
        let head = self.head_id()?;
        self.state.branches.create(name, &head)
    }

    pub fn rm_branch(&mut self, name: &str) -> Result<()> {
        self.state.branches.remove(name).map(|_| ())
    }

    /// Move the current branch to `commit` and make the working tree match it.
    pub fn reset(&mut self, commit: &str) -> Result<String> {
        let id = self.resolve_commit(commit)?;
        let target = self.get_commit(&id)?;
        let current = self.head_commit()?;
        self.check_untracked(&current.tracked, &target.tracked)?;

        self.materialize(&current.tracked, &target.tracked)?;
        let branch = self.state.branches.current_name().to_string();
        self.state.branches.set_head(&branch, &id)?;
        self.state.staging.clear();
        Ok(id)
    }

    /// Refuses a switch from `current` to `target` that would clobber files
    /// `current` does not track, or that needs a file and a directory at the
    /// same path.
    pub(crate) fn check_untracked(&self, current: &Tree, target: &Tree) -> Result<()> {
        if let Some(path) = target.path_clash() {
            return Err(RepoError::PathConflict(path.to_string()));
        }

        for path in target.paths() {
            if !current.contains(path) && self.worktree.exists(path) {
                return Err(RepoError::UntrackedInTheWay(path.to_string()));
            }
            // A file where a directory has to go. Files only `current` tracks
            // are deleted before anything is written.
            for dir in parent_dirs(path) {
                if self.worktree.exists(dir) && !current.contains(dir) {
                    return Err(RepoError::UntrackedInTheWay(dir.to_string()));
                }
            }
            // A directory where a file has to go.
            if self.worktree.is_dir(path) {
                for file in self.worktree.files_under(path)? {
                    if !current.contains(&file) {
                        return Err(RepoError::UntrackedInTheWay(file));
                    }
                }
            }
        }
        Ok(())
    }

    /// Rewrite the working tree from the `current` snapshot to `target`.
    /// Deletions run first so a path can turn from file into directory or back.
    pub(crate) fn materialize(&self, current: &Tree, target: &Tree) -> Result<()> {
        if let Some(missing) = target.hashes().find(|h| !self.objects.exists(h)) {
            return Err(RepoError::ObjectNotFound(missing.to_string()));
        }

        for path in current.paths() {
            if !target.contains(path) {
                self.worktree.remove(path)?;
            }
        }
        for (path, hash) in target.iter() {
            let content = self.objects.read(hash)?;
            self.worktree.write(path, &content)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_refuses_existing_repository() {
        let dir = tempdir().unwrap();
        Repository::init_with_branch(dir.path(), "master").unwrap();
        assert!(matches!(
            Repository::init_with_branch(dir.path(), "master"),
            Err(RepoError::AlreadyExists)
        ));
    }

    #[test]
    fn open_requires_repository() {
        let dir = tempdir().unwrap();
        assert!(matches!(Repository::open(dir.path()), Err(RepoError::NotARepo)));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::init_with_branch(dir.path(), "trunk").unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        repo.add("a.txt").unwrap();
        repo.save().unwrap();

        let reopened = Repository::open(dir.path()).unwrap();
        assert_eq!(reopened.branches().current_name(), "trunk");
        assert!(reopened.staging().staged_hash("a.txt").is_some());
        assert_eq!(reopened.commits().len(), 1);
    }

    #[test]
    fn rejects_unknown_format_version() {
        let dir = tempdir().unwrap();
        let repo = Repository::init_with_branch(dir.path(), "master").unwrap();
        let state_path = repo.git_dir.join(STATE_FILE);
        let content = fs::read_to_string(&state_path).unwrap().replace("\"version\": 1", "\"version\": 99");
        fs::write(&state_path, content).unwrap();
        assert!(matches!(Repository::open(dir.path()), Err(RepoError::Corrupted(_))));
    }

    #[test]
    fn resolves_unique_prefixes() {
        let dir = tempdir().unwrap();
        let repo = Repository::init_with_branch(dir.path(), "master").unwrap();
        let root = repo.head_id().unwrap();
        assert_eq!(repo.resolve_commit(&root[..6]).unwrap(), root);
        assert!(matches!(repo.resolve_commit("zzzz"), Err(RepoError::UnknownCommit(_))));
        assert!(matches!(repo.resolve_commit(""), Err(RepoError::UnknownCommit(_))));
    }
}
