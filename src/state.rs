//! Tracked State Store
//!
//! Persists the last confirmed state of every managed instance between
//! invocations of the binary. Entries are written only after an operation
//! succeeded and removed once a delete succeeded.

use crate::resource::Tracked;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One tracked instance as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub kind: String,
    pub id: String,
    pub key: String,
    pub attributes: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    resources: BTreeMap<String, StateEntry>,
}

/// File-backed map of `<kind>.<key>` to tracked state
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    file: StateFile,
}

fn slot(kind: &str, key: &str) -> String {
    format!("{}.{}", kind, key)
}

impl StateStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse state file {:?}", path))?
        } else {
            StateFile::default()
        };

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the store back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state file {:?}", self.path))?;
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &StateEntry> {
        self.file.resources.values()
    }

    pub fn entry(&self, kind: &str, key: &str) -> Option<&StateEntry> {
        self.file.resources.get(&slot(kind, key))
    }

    /// Look up a tracked instance by kind and key
    pub fn get<R: DeserializeOwned>(&self, kind: &str, key: &str) -> Result<Option<Tracked<R>>> {
        let Some(entry) = self.entry(kind, key) else {
            return Ok(None);
        };

        let record = serde_json::from_value(entry.attributes.clone())
            .with_context(|| format!("Corrupt state for {} '{}'", kind, key))?;
        Ok(Some(Tracked {
            id: entry.id.clone(),
            key: entry.key.clone(),
            record,
        }))
    }

    /// Record a successful operation.
    ///
    /// An instance is identified by its server id; if its key changed (a
    /// title-keyed book whose title was updated) the old slot is dropped.
    /// A key already held by a different id is refused and nothing changes.
    pub fn put<R: Serialize>(&mut self, kind: &str, tracked: &Tracked<R>) -> Result<()> {
        if let Some(existing) = self.entry(kind, &tracked.key) {
            if existing.id != tracked.id {
                bail!(
                    "{} '{}' is already tracked for id '{}'; refusing to re-key id '{}'",
                    kind,
                    tracked.key,
                    existing.id,
                    tracked.id
                );
            }
        }

        self.file
            .resources
            .retain(|_, e| !(e.kind == kind && e.id == tracked.id));

        let entry = StateEntry {
            kind: kind.to_string(),
            id: tracked.id.clone(),
            key: tracked.key.clone(),
            attributes: serde_json::to_value(&tracked.record)?,
            updated_at: Utc::now(),
        };
        self.file.resources.insert(slot(kind, &tracked.key), entry);
        Ok(())
    }

    /// Forget an instance after it was deleted remotely
    pub fn remove(&mut self, kind: &str, key: &str) -> Option<StateEntry> {
        self.file.resources.remove(&slot(kind, key))
    }
}
