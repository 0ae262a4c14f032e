//! Traversals over the commit DAG.
//!
//! Commits are loaded from the object store on demand. Every walk keeps a
//! visited set keyed by id, since merge commits give a node several paths
//! back to the root.

use crate::core::commit::Commit;
use crate::core::error::Result;
use crate::core::object::ObjectStore;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

pub struct CommitGraph<'a> {
    store: &'a ObjectStore,
}

impl<'a> CommitGraph<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    pub fn commit(&self, id: &str) -> Result<Commit> {
        Commit::from_hash(self.store, id)
    }

    /// Every commit reachable from `id` through parent links, `id` included.
    pub fn ancestors(&self, id: &str) -> Result<HashSet<String>> {
        let mut visited = HashSet::new();
        let mut to_visit = vec![id.to_string()];

        while let Some(hash) = to_visit.pop() {
            if !visited.insert(hash.clone()) {
                continue;
            }
            let commit = self.commit(&hash)?;
            for parent in commit.parents {
                if !visited.contains(&parent) {
                    to_visit.push(parent);
                }
            }
        }

        Ok(visited)
    }

    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        Ok(self.ancestors(descendant)?.contains(ancestor))
    }

    /// Breadth-first distance from `id` to each of its ancestors.
    pub fn distances(&self, id: &str) -> Result<HashMap<String, usize>> {
        let mut depth = HashMap::new();
        let mut queue = VecDeque::from([(id.to_string(), 0usize)]);

        while let Some((hash, d)) = queue.pop_front() {
            if depth.contains_key(&hash) {
                continue;
            }
            let commit = self.commit(&hash)?;
            depth.insert(hash, d);
            for parent in commit.parents {
                if !depth.contains_key(&parent) {
                    queue.push_back((parent, d + 1));
                }
            }
        }

        Ok(depth)
    }

    /// Merge base of `current` and `target`.
    ///
    /// Takes the common ancestors, drops every one that is itself an ancestor
    /// of another common ancestor, and picks the survivor closest to both
    /// heads. Ties go to the one nearer `current`, then to the smaller id.
    pub fn split_point(&self, current: &str, target: &str) -> Result<Option<String>> {
        let from_current = self.distances(current)?;
        let from_target = self.distances(target)?;

        let common: HashSet<&String> = from_current
            .keys()
            .filter(|id| from_target.contains_key(*id))
            .collect();
        if common.is_empty() {
            return Ok(None);
        }

        // Anything strictly behind a common ancestor is not a lowest one.
        let mut dominated: HashSet<String> = HashSet::new();
        let mut to_visit = Vec::new();
        for id in &common {
            to_visit.extend(self.commit(id)?.parents);
        }
        while let Some(hash) = to_visit.pop() {
            if !dominated.insert(hash.clone()) {
                continue;
            }
            to_visit.extend(self.commit(&hash)?.parents);
        }

        let best = common
            .into_iter()
            .filter(|id| !dominated.contains(*id))
            .min_by(|a, b| {
                let key_a = (from_current[*a] + from_target[*a], from_current[*a]);
                let key_b = (from_current[*b] + from_target[*b], from_current[*b]);
                key_a.cmp(&key_b).then_with(|| a.cmp(b))
            })
            .cloned();

        debug!(current, target, split = ?best, "computed split point");
        Ok(best)
    }

    /// Walk from `id` to the root following first parents only.
    pub fn first_parent_chain(&self, id: &str) -> FirstParentChain<'_> {
        FirstParentChain {
            graph: CommitGraph { store: self.store },
            next: Some(id.to_string()),
        }
    }

    pub fn root_of(&self, id: &str) -> Result<String> {
        let mut last = id.to_string();
        for entry in self.first_parent_chain(id) {
            last = entry?.0;
        }
        Ok(last)
    }
}

pub struct FirstParentChain<'a> {
    graph: CommitGraph<'a>,
    next: Option<String>,
}

impl Iterator for FirstParentChain<'_> {
    type Item = Result<(String, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;
        match self.graph.commit(&hash) {
            Ok(commit) => {
                self.next = commit.first_parent().map(str::to_string);
                Some(Ok((hash, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::Tree;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    struct Dag {
        store: ObjectStore,
        tick: i64,
    }

    impl Dag {
        fn commit(&mut self, parents: &[&str], message: &str) -> String {
            self.tick += 1;
            let when = Utc::now() + Duration::seconds(self.tick);
            let parents = parents.iter().map(|p| p.to_string()).collect();
            Commit::new(parents, Tree::new(), message.into(), when)
                .write(&self.store)
                .unwrap()
        }
    }

    fn dag(dir: &tempfile::TempDir) -> Dag {
        Dag {
            store: ObjectStore::new(dir.path()),
            tick: 0,
        }
    }

    #[test]
    fn ancestors_include_both_merge_parents() {
        let dir = tempdir().unwrap();
        let mut d = dag(&dir);
        let root = d.commit(&[], "root");
        let left = d.commit(&[&root], "left");
        let right = d.commit(&[&root], "right");
        let merged = d.commit(&[&left, &right], "merge");

        let graph = CommitGraph::new(&d.store);
        let all = graph.ancestors(&merged).unwrap();
        assert_eq!(all.len(), 4);
        assert!(graph.is_ancestor(&right, &merged).unwrap());
        assert!(!graph.is_ancestor(&merged, &right).unwrap());
        assert_eq!(graph.root_of(&merged).unwrap(), root);
    }

    #[test]
    fn split_point_of_simple_fork() {
        let dir = tempdir().unwrap();
        let mut d = dag(&dir);
        let root = d.commit(&[], "root");
        let base = d.commit(&[&root], "base");
        let a = d.commit(&[&base], "a");
        let b = d.commit(&[&base], "b");
        let b2 = d.commit(&[&b], "b2");

        let graph = CommitGraph::new(&d.store);
        assert_eq!(graph.split_point(&a, &b2).unwrap(), Some(base.clone()));
        assert_eq!(graph.split_point(&base, &b2).unwrap(), Some(base.clone()));
        assert_eq!(graph.split_point(&b2, &b).unwrap(), Some(b));
    }

    #[test]
    fn split_point_prefers_lowest_common_ancestor() {
        // root - a - l - t
        //   \         \
        //    \         c1 - c2 - c3
        //     \                    \
        //      -------------------- m
        // Walking breadth first from m reaches root before l, but l is the
        // lowest ancestor shared with t.
        let dir = tempdir().unwrap();
        let mut d = dag(&dir);
        let root = d.commit(&[], "root");
        let a = d.commit(&[&root], "a");
        let l = d.commit(&[&a], "l");
        let t = d.commit(&[&l], "t");
        let c1 = d.commit(&[&l], "c1");
        let c2 = d.commit(&[&c1], "c2");
        let c3 = d.commit(&[&c2], "c3");
        let m = d.commit(&[&c3, &root], "m");

        let graph = CommitGraph::new(&d.store);
        assert_eq!(graph.split_point(&m, &t).unwrap(), Some(l));
    }

    #[test]
    fn unrelated_histories_have_no_split_point() {
        let dir = tempdir().unwrap();
        let mut d = dag(&dir);
        let a = d.commit(&[], "a");
        let b = d.commit(&[], "b");
        let graph = CommitGraph::new(&d.store);
        assert_eq!(graph.split_point(&a, &b).unwrap(), None);
    }

    #[test]
    fn first_parent_chain_skips_second_parents() {
        let dir = tempdir().unwrap();
        let mut d = dag(&dir);
        let root = d.commit(&[], "root");
        let side = d.commit(&[&root], "side");
        let main = d.commit(&[&root], "main");
        let merged = d.commit(&[&main, &side], "merge");

        let graph = CommitGraph::new(&d.store);
        let ids: Vec<String> = graph
            .first_parent_chain(&merged)
            .map(|e| e.unwrap().0)
            .collect();
        assert_eq!(ids, vec![merged, main, root]);
    }
}
