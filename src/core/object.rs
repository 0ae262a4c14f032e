use crate::core::error::{RepoError, Result};
use crate::utils::compression::{compress, decompress};
use ring::digest;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Commit => "commit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(ObjectType::Blob),
            "commit" => Some(ObjectType::Commit),
            _ => None,
        }
    }
}

/// Content-addressable store under `.sprig/objects/`.
///
/// Every object is framed as `"<type> <len>\0" + payload`, hashed, then
/// zlib-compressed into `objects/<first two hex>/<rest>`. Writing the same
/// content twice is a no-op.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new<P: AsRef<Path>>(objects_dir: P) -> Self {
        Self {
            root: objects_dir.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create(&self, obj_type: ObjectType, content: &[u8]) -> Result<String> {
        let full_content = frame(obj_type, content);
        let hash = hash_content(&full_content);

        let obj_path = self.object_path(&hash);
        if obj_path.exists() {
            return Ok(hash);
        }

        if let Some(dir) = obj_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let compressed = compress(&full_content)?;
        let temp_path = obj_path.with_extension("tmp");
        fs::write(&temp_path, compressed)?;
        fs::rename(&temp_path, &obj_path)?;
        debug!(hash = %hash, kind = obj_type.as_str(), size = content.len(), "stored object");

        Ok(hash)
    }

    pub fn read(&self, hash: &str) -> Result<Vec<u8>> {
        self.read_with_type(hash).map(|(_, content)| content)
    }

    pub fn read_with_type(&self, hash: &str) -> Result<(ObjectType, Vec<u8>)> {
        if !is_valid_hash(hash) {
            return Err(RepoError::ObjectNotFound(hash.to_string()));
        }

        let obj_path = self.object_path(hash);
        if !obj_path.exists() {
            return Err(RepoError::ObjectNotFound(hash.to_string()));
        }

        let compressed_data = fs::read(&obj_path)?;
        let decompressed = decompress(&compressed_data)
            .map_err(|_| RepoError::Corrupted(format!("object {} is not readable", hash)))?;

        if hash_content(&decompressed) != hash {
            return Err(RepoError::Corrupted(format!(
                "object {} failed integrity verification",
                hash
            )));
        }

        let null_pos = decompressed
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| RepoError::Corrupted(format!("object {} has no header", hash)))?;

        let header = String::from_utf8_lossy(&decompressed[..null_pos]);
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| RepoError::Corrupted(format!("object {} has a bad header", hash)))?;
        let obj_type = ObjectType::from_str(kind)
            .ok_or_else(|| RepoError::Corrupted(format!("object {} has unknown type {}", hash, kind)))?;
        let expected_size: usize = size
            .parse()
            .map_err(|_| RepoError::Corrupted(format!("object {} has a bad size", hash)))?;

        let content = decompressed[null_pos + 1..].to_vec();
        if content.len() != expected_size {
            return Err(RepoError::Corrupted(format!("object {} size mismatch", hash)));
        }

        Ok((obj_type, content))
    }

    pub fn exists(&self, hash: &str) -> bool {
        is_valid_hash(hash) && self.object_path(hash).exists()
    }

    /// Copy one object into `other`, returning whether anything was written.
    pub fn copy_to(&self, other: &ObjectStore, hash: &str) -> Result<bool> {
        if other.exists(hash) {
            return Ok(false);
        }
        let (obj_type, content) = self.read_with_type(hash)?;
        let written = other.create(obj_type, &content)?;
        if written != hash {
            return Err(RepoError::Corrupted(format!(
                "object {} re-hashed to {}",
                hash, written
            )));
        }
        Ok(true)
    }

    pub fn list_objects(&self) -> Result<Vec<String>> {
        let mut objects = Vec::new();

        if !self.root.exists() {
            return Ok(objects);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let dir_name = entry.file_name();
            let Some(prefix) = dir_name.to_str() else { continue };
            if prefix.len() != 2 || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
                continue;
            }
            for obj_entry in fs::read_dir(entry.path())? {
                let obj_entry = obj_entry?;
                if let Some(suffix) = obj_entry.file_name().to_str() {
                    if suffix.chars().all(|c| c.is_ascii_hexdigit()) {
                        objects.push(format!("{}{}", prefix, suffix));
                    }
                }
            }
        }

        objects.sort();
        Ok(objects)
    }

    fn object_path(&self, hash: &str) -> PathBuf {
        let (dir, file) = hash.split_at(2);
        self.root.join(dir).join(file)
    }
}

/// Digest of a blob's content as the store would name it.
pub fn blob_hash(content: &[u8]) -> String {
    hash_content(&frame(ObjectType::Blob, content))
}

pub fn hash_content(content: &[u8]) -> String {
    let digest_result = digest::digest(&digest::SHA256, content);
    hex::encode(digest_result.as_ref())
}

fn frame(obj_type: ObjectType, content: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", obj_type.as_str(), content.len());
    let mut full_content = header.into_bytes();
    full_content.extend_from_slice(content);
    full_content
}

fn is_valid_hash(hash: &str) -> bool {
    hash.len() >= 8 && hash.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn put_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());

        let h1 = store.create(ObjectType::Blob, b"same content").unwrap();
        let h2 = store.create(ObjectType::Blob, b"same content").unwrap();
        assert_eq!(h1, h2);
        assert_eq!(store.list_objects().unwrap(), vec![h1.clone()]);
        assert_eq!(store.read(&h1).unwrap(), b"same content");
    }

    #[test]
    fn blob_hash_matches_store() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let hash = store.create(ObjectType::Blob, b"hello").unwrap();
        assert_eq!(hash, blob_hash(b"hello"));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn type_is_part_of_identity() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let blob = store.create(ObjectType::Blob, b"{}").unwrap();
        let commit = store.create(ObjectType::Commit, b"{}").unwrap();
        assert_ne!(blob, commit);
        assert_eq!(store.read_with_type(&commit).unwrap().0, ObjectType::Commit);
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let err = store.read("deadbeefdeadbeef").unwrap_err();
        assert!(matches!(err, RepoError::ObjectNotFound(_)));
        assert!(!store.exists("deadbeefdeadbeef"));
        assert!(!store.exists("xyz"));
    }

    #[test]
    fn tampered_object_is_corrupted() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let hash = store.create(ObjectType::Blob, b"original").unwrap();
        let (d, f) = hash.split_at(2);
        fs::write(dir.path().join(d).join(f), compress(b"blob 8\0tampered").unwrap()).unwrap();
        assert!(matches!(store.read(&hash), Err(RepoError::Corrupted(_))));
    }

    #[test]
    fn copies_between_stores() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let src = ObjectStore::new(a.path());
        let dst = ObjectStore::new(b.path());
        let hash = src.create(ObjectType::Blob, b"travelling").unwrap();

        assert!(src.copy_to(&dst, &hash).unwrap());
        assert!(!src.copy_to(&dst, &hash).unwrap());
        assert_eq!(dst.read(&hash).unwrap(), b"travelling");
    }
}
