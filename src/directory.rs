use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::{Constituency, Level, Representative};

/// Read interface over the records the import collaborator maintains.
/// The engine only reads; imports happen out of process.
pub trait Directory: Send + Sync {
    /// All constituencies at a level, optionally filtered by state scope.
    /// `None` state means no filter (nationwide entries included).
    fn constituencies_at(&self, level: Level, state: Option<&str>) -> Vec<Constituency>;

    /// Representatives elected for a constituency.
    fn representatives_of(&self, constituency_id: &str) -> Vec<Representative>;

    /// Look up one constituency by identifier.
    fn constituency(&self, id: &str) -> Option<Constituency>;
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    constituencies: Vec<Constituency>,
    #[serde(default)]
    representatives: Vec<Representative>,
}

/// JSON-file-backed directory (`directory.json` in the data directory),
/// held immutably in memory for the process lifetime.
#[derive(Debug)]
pub struct FileDirectory {
    constituencies: Vec<Constituency>,
    by_id: AHashMap<String, usize>,
    representatives: Vec<Representative>,
}

impl FileDirectory {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read directory file: {}", path.display()))?;
        let file: DirectoryFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse directory file: {}", path.display()))?;
        Ok(Self::from_records(file.constituencies, file.representatives))
    }

    /// Empty directory, for deployments that only resolve spatially.
    pub fn empty() -> Self {
        Self::from_records(Vec::new(), Vec::new())
    }

    pub fn from_records(
        constituencies: Vec<Constituency>,
        representatives: Vec<Representative>,
    ) -> Self {
        let by_id = constituencies
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.id.clone(), idx))
            .collect();
        Self { constituencies, by_id, representatives }
    }
}

impl Directory for FileDirectory {
    fn constituencies_at(&self, level: Level, state: Option<&str>) -> Vec<Constituency> {
        self.constituencies
            .iter()
            .filter(|c| c.level == level)
            .filter(|c| match state {
                Some(state) => {
                    c.state.is_none() || c.state.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(state))
                }
                None => true,
            })
            .cloned()
            .collect()
    }

    fn representatives_of(&self, constituency_id: &str) -> Vec<Representative> {
        self.representatives
            .iter()
            .filter(|r| r.constituency_id == constituency_id)
            .cloned()
            .collect()
    }

    fn constituency(&self, id: &str) -> Option<Constituency> {
        self.by_id.get(id).map(|&idx| self.constituencies[idx].clone())
    }
}
