use crate::core::error::{RepoError, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_BRANCH: &str = "master";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    settings: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_path() -> Result<PathBuf> {
        home_dir()
            .map(|home| home.join(".sprigconfig"))
            .ok_or_else(|| RepoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot find home directory",
            )))
    }

    pub fn repo_path(git_dir: &Path) -> PathBuf {
        git_dir.join("config.json")
    }

    pub fn load_global() -> Result<Self> {
        Self::load_from_file(&Self::global_path()?)
    }

    pub fn load_repo(git_dir: &Path) -> Result<Self> {
        Self::load_from_file(&Self::repo_path(git_dir))
    }

    /// Global settings overlaid with the repository's own.
    pub fn load(git_dir: &Path) -> Result<Self> {
        let mut config = Self::load_global().unwrap_or_default();
        config.merge(Self::load_repo(git_dir)?);
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_global(&self) -> Result<()> {
        self.save_to_file(&Self::global_path()?)
    }

    pub fn save_repo(&self, git_dir: &Path) -> Result<()> {
        self.save_to_file(&Self::repo_path(git_dir))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn merge(&mut self, other: Config) {
        self.settings.extend(other.settings);
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.settings.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.settings.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.settings.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.settings.iter()
    }

    pub fn default_branch(&self) -> String {
        self.get("init.defaultBranch")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string())
    }

    pub fn color_enabled(&self) -> bool {
        !matches!(
            self.get("color.ui").map(|v| v.to_ascii_lowercase()).as_deref(),
            Some("false" | "never" | "off" | "0")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = Config::new();
        assert_eq!(config.default_branch(), "master");
        assert!(config.color_enabled());
    }

    #[test]
    fn repo_values_override() {
        let dir = tempdir().unwrap();
        let mut repo = Config::new();
        repo.set("init.defaultBranch", "trunk");
        repo.set("color.ui", "false");
        repo.save_repo(dir.path()).unwrap();

        let mut config = Config::new();
        config.set("init.defaultBranch", "main");
        config.merge(Config::load_repo(dir.path()).unwrap());
        assert_eq!(config.default_branch(), "trunk");
        assert!(!config.color_enabled());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(Config::load_repo(dir.path()).unwrap().is_empty());
    }
}
