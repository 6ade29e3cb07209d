//! # Exclusion Store
//!
//! The persisted set of node IDs opted out of automatic actions.
//!
//! This is the only state in the crate with a lifecycle beyond a single
//! call. The engine only ever reads it — and reads it fresh at the start of
//! every automatic run, treating each read as a snapshot with no isolation
//! from concurrent opt-in/opt-out edits. Exclusion affects automatic-mode
//! destination selection only: interactive or explicit selection of an
//! excluded node still applies bans to it.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::NodeId;

/// Persisted set of nodes opted out of automatic actions.
///
/// `add` and `remove` are idempotent; the returned bool reports whether the
/// set actually changed, which callers use to tell the actor "already opted
/// out" / "not opted out" instead of silently succeeding.
#[async_trait]
pub trait ExclusionStore: Send + Sync {
    /// The current exclusion set.
    async fn get(&self) -> Result<HashSet<NodeId>>;

    /// Opt a node out of automatic actions. Returns `false` if it already
    /// was.
    async fn add(&self, node: NodeId) -> Result<bool>;

    /// Opt a node back in. Returns `false` if it was not opted out.
    async fn remove(&self, node: NodeId) -> Result<bool>;
}

/// The typed settings section backing [`JsonExclusionStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct ExclusionSettings {
    /// Nodes opted out of automatic actions
    #[serde(default)]
    excluded_from_automatic: Vec<NodeId>,
    /// Unix timestamp of the last mutation
    #[serde(default)]
    updated_at: i64,
}

/// JSON-file-backed exclusion store.
///
/// Mutations are atomic read-modify-write cycles: the settings file is
/// re-read, updated, written to a sibling temp file and renamed into place,
/// all under a process-local lock. A missing file reads as an empty set.
pub struct JsonExclusionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonExclusionStore {
    /// Create a store backed by the given settings file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<ExclusionSettings> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| Error::StoreRead(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(ExclusionSettings::default())
            }
            Err(e) => Err(Error::StoreRead(e.to_string())),
        }
    }

    fn persist(&self, settings: &ExclusionSettings) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(settings)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes).map_err(|e| Error::StoreWrite(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::StoreWrite(e.to_string()))?;
        Ok(())
    }

    fn mutate<F>(&self, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<NodeId>) -> bool,
    {
        let _guard = self.lock.lock();
        let mut settings = self.load()?;
        if !apply(&mut settings.excluded_from_automatic) {
            return Ok(false);
        }
        settings.updated_at = chrono::Utc::now().timestamp();
        self.persist(&settings)?;
        Ok(true)
    }
}

#[async_trait]
impl ExclusionStore for JsonExclusionStore {
    async fn get(&self) -> Result<HashSet<NodeId>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.excluded_from_automatic.into_iter().collect())
    }

    async fn add(&self, node: NodeId) -> Result<bool> {
        self.mutate(|excluded| {
            if excluded.contains(&node) {
                false
            } else {
                excluded.push(node);
                true
            }
        })
    }

    async fn remove(&self, node: NodeId) -> Result<bool> {
        self.mutate(|excluded| {
            let before = excluded.len();
            excluded.retain(|id| *id != node);
            excluded.len() != before
        })
    }
}

/// In-memory exclusion store for embedders and tests that do not need
/// persistence.
#[derive(Default)]
pub struct MemoryExclusionStore {
    excluded: Mutex<HashSet<NodeId>>,
}

impl MemoryExclusionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given node IDs.
    pub fn with_excluded(ids: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            excluded: Mutex::new(ids.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ExclusionStore for MemoryExclusionStore {
    async fn get(&self) -> Result<HashSet<NodeId>> {
        Ok(self.excluded.lock().clone())
    }

    async fn add(&self, node: NodeId) -> Result<bool> {
        Ok(self.excluded.lock().insert(node))
    }

    async fn remove(&self, node: NodeId) -> Result<bool> {
        Ok(self.excluded.lock().remove(&node))
    }
}
