use crate::core::error::{RepoError, Result};
use crate::utils::ignore::IgnoreRules;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Files on disk next to the repository directory.
///
/// All paths handed in and out are relative to `root` and use `/`.
#[derive(Debug, Clone)]
pub struct WorkTree {
    root: PathBuf,
    repo_dir_name: String,
}

impl WorkTree {
    pub fn new<P: AsRef<Path>>(root: P, repo_dir_name: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            repo_dir_name: repo_dir_name.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turn user input like `./dir/a.txt` into `dir/a.txt`.
    pub fn normalize(&self, path: &str) -> Result<String> {
        let mut parts = Vec::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| RepoError::PathOutsideRepo(path.to_string()))?;
                    parts.push(part.to_string());
                }
                Component::CurDir => {}
                _ => return Err(RepoError::PathOutsideRepo(path.to_string())),
            }
        }
        if parts.is_empty() || parts[0] == self.repo_dir_name {
            return Err(RepoError::PathOutsideRepo(path.to_string()));
        }
        Ok(parts.join("/"))
    }

    pub fn full_path(&self, path: &str) -> PathBuf {
        path.split('/').fold(self.root.clone(), |acc, part| acc.join(part))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.full_path(path).is_file()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.full_path(path).is_dir()
    }

    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.full_path(path);
        if !full.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read(full)?))
    }

    pub fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        debug!(path, size = content.len(), "wrote working file");
        Ok(())
    }

    /// Delete a working file if present, pruning directories it leaves empty.
    pub fn remove(&self, path: &str) -> Result<bool> {
        let full = self.full_path(path);
        if !full.is_file() {
            return Ok(false);
        }
        fs::remove_file(&full)?;
        debug!(path, "removed working file");

        let mut dir = full.parent();
        while let Some(d) = dir {
            if d == self.root || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
        Ok(true)
    }

    /// Every regular file under the root, skipping the repository directory
    /// and anything `.sprigignore` excludes. Sorted.
    pub fn files(&self) -> Result<Vec<String>> {
        let rules = IgnoreRules::new(&self.root);
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root).min_depth(1).into_iter().filter_entry(|entry| {
            let Some(rel) = self.relative(entry.path()) else {
                return false;
            };
            let is_dir = entry.file_type().is_dir();
            !(is_dir && rel == self.repo_dir_name) && !rules.is_ignored(&rel, is_dir)
        });

        for entry in walker {
            let entry = entry.map_err(|e| RepoError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = self.relative(entry.path()) {
                files.push(rel);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Every regular file below the directory `dir`, ignore rules not applied.
    pub fn files_under(&self, dir: &str) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(self.full_path(dir)).min_depth(1) {
            let entry = entry.map_err(|e| RepoError::Io(e.into()))?;
            if entry.file_type().is_file() {
                if let Some(rel) = self.relative(entry.path()) {
                    files.push(rel);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn relative(&self, full: &Path) -> Option<String> {
        let rel = full.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
        Some(parts?.join("/"))
    }
}
