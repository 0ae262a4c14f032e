use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full snapshot of tracked files: path to blob digest.
///
/// Paths are relative to the working-tree root and always use `/`. The map is
/// ordered, so two trees with the same content serialize identically.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Tree {
    entries: BTreeMap<String, String>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: String, hash: String) {
        self.entries.insert(path, hash);
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, h)| (p.as_str(), h.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First tracked path that is also a parent directory of another tracked
    /// path. Such a tree cannot exist on disk.
    pub fn path_clash(&self) -> Option<&str> {
        self.paths()
            .flat_map(parent_dirs)
            .find(|dir| self.contains(dir))
    }
}

/// Proper directory prefixes of a `/`-separated path, outermost first.
pub fn parent_dirs(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}

impl FromIterator<(String, String)> for Tree {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_sorted_map() {
        let tree: Tree = [
            ("b.txt".to_string(), "22222222".to_string()),
            ("a.txt".to_string(), "11111111".to_string()),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"a.txt":"11111111","b.txt":"22222222"}"#);
        let back: Tree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.paths().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn detects_file_directory_clash() {
        let mut tree = Tree::new();
        tree.insert("x-y".into(), "11111111".into());
        tree.insert("x/y/z".into(), "22222222".into());
        assert_eq!(tree.path_clash(), None);

        tree.insert("x/y".into(), "33333333".into());
        assert_eq!(tree.path_clash(), Some("x/y"));
        assert_eq!(parent_dirs("a/b/c").collect::<Vec<_>>(), vec!["a", "a/b"]);
    }
}
