// src/checklist/store.rs

//! Durable storage for the checklist.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::checklist::Checklist;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Reads and writes the checklist as pretty-printed JSON.
///
/// Writes replace the whole file; there is no batching, so a write follows
/// every mutation.
#[derive(Debug, Clone)]
pub struct ChecklistStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl ChecklistStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn on_disk(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(RealFileSystem), path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted checklist.
    ///
    /// A missing file is not an error: the manager starts with an empty
    /// checklist.
    pub fn load(&self) -> Result<Checklist> {
        if !self.fs.exists(&self.path) {
            warn!(path = ?self.path, "checklist file not found; starting with empty checklist");
            return Ok(Checklist::new());
        }

        let contents = self.fs.read_to_string(&self.path)?;
        let checklist: Checklist = serde_json::from_str(&contents)?;
        info!(
            path = ?self.path,
            namespaces = checklist.namespaces().count(),
            "checklist loaded"
        );
        Ok(checklist)
    }

    pub fn write(&self, checklist: &Checklist) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(checklist)?;
        contents.push('\n');
        self.fs
            .write(&self.path, contents.as_bytes())
            .with_context(|| format!("writing checklist to {:?}", self.path))?;
        debug!(path = ?self.path, "checklist written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use serde_json::json;

    #[test]
    fn missing_file_loads_empty_checklist() {
        let store = ChecklistStore::new(Arc::new(MockFileSystem::new()), "nowcast_checklist.json");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn written_checklist_loads_back() {
        let fs = MockFileSystem::new();
        let store = ChecklistStore::new(Arc::new(fs.clone()), "state/checklist.json");

        let mut checklist = Checklist::new();
        checklist.update("NEMO run", json!({"nowcast": {"run date": "2018-01-20"}}));
        store.write(&checklist).unwrap();

        let text = fs.contents("state/checklist.json").unwrap();
        assert!(text.contains("\"run date\": \"2018-01-20\""));
        assert_eq!(store.load().unwrap(), checklist);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let fs = MockFileSystem::new();
        fs.add_file("checklist.json", "{not json");
        let store = ChecklistStore::new(Arc::new(fs), "checklist.json");
        assert!(store.load().is_err());
    }
}
