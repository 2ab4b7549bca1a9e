// api-server/src/storage.rs
use async_trait::async_trait;
use common::ActorError;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

// Storage namespaces, one per actor kind
pub const SESSIONS: &str = "sessions";
pub const ACCOUNTS: &str = "accounts";
pub const COURSES: &str = "courses";

/// Durable key/value storage behind the keyed actors.
///
/// Each (kind, key) pair is exclusively owned by the single live actor for
/// that key, so implementations do not need cross-key transactions; they only
/// need `put` to be atomic per key.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, kind: &str, key: &str) -> Result<Option<Vec<u8>>, ActorError>;
    async fn put(&self, kind: &str, key: &str, value: Vec<u8>) -> Result<(), ActorError>;
}

/// File-backed storage: one file per (kind, key) under the data directory.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, kind: &str, key: &str) -> PathBuf {
        self.root.join(kind).join(file_name(key))
    }
}

/// Map an actor key to a safe file name. Wallet identities are usually plain
/// ("alice.testnet"); anything else is hex-encoded behind a '%' marker, a
/// character excluded from plain names so the two forms cannot collide.
/// Keys ending in ".tmp" take the hex form as well, keeping record files out
/// of the temp-file namespace used by `put`.
fn file_name(key: &str) -> String {
    let plain = !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with(".tmp")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if plain {
        key.to_string()
    } else {
        format!("%{}", hex::encode(key))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, kind: &str, key: &str) -> Result<Option<Vec<u8>>, ActorError> {
        let path = self.path(kind, key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ActorError::Storage(format!(
                "read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn put(&self, kind: &str, key: &str, value: Vec<u8>) -> Result<(), ActorError> {
        let path = self.path(kind, key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ActorError::Storage(format!("mkdir {}: {}", parent.display(), e)))?;
        }
        // Write to a temp file and rename so a crash mid-write never leaves
        // a torn record behind. The temp suffix is appended to the full file
        // name ("alice.testnet.tmp"), never substituted for a dot-segment of
        // the key, so it cannot land on a sibling key's record. The owning
        // actor serializes writes per key, so the temp name cannot collide
        // with itself.
        let tmp = path.with_file_name(format!("{}.tmp", file_name(key)));
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| ActorError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| ActorError::Storage(format!("rename {}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// In-memory storage for tests and local development.
#[derive(Default)]
pub struct MemoryStorage {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(kind: &str, key: &str) -> String {
        format!("{}/{}", kind, key)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, kind: &str, key: &str) -> Result<Option<Vec<u8>>, ActorError> {
        Ok(self
            .entries
            .get(&Self::slot(kind, key))
            .map(|v| v.value().clone()))
    }

    async fn put(&self, kind: &str, key: &str, value: Vec<u8>) -> Result<(), ActorError> {
        self.entries.insert(Self::slot(kind, key), value);
        Ok(())
    }
}
