use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::Level;

pub const POSTAL_TABLE_FILE: &str = "postal-prefixes.json";

/// Static postal-prefix → constituency table, the middle rung of the
/// fallback chain. One map per level, keyed by the first `prefix_len`
/// digits of a postal code.
#[derive(Debug, Clone, Deserialize)]
pub struct PostalTable {
    /// Prefix length in digits (the leading "Leitzonen" digits).
    #[serde(default = "default_prefix_len")]
    pub prefix_len: usize,
    #[serde(default)]
    eu: AHashMap<String, String>,
    #[serde(default)]
    federal: AHashMap<String, String>,
    #[serde(default)]
    state: AHashMap<String, String>,
    #[serde(default)]
    local: AHashMap<String, String>,
}

fn default_prefix_len() -> usize {
    2
}

impl PostalTable {
    /// Load the table from a data directory. A missing file yields an
    /// empty table (the fallback stage simply never fires).
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(POSTAL_TABLE_FILE);
        if !path.exists() {
            return Ok(Self::empty());
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read postal table: {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse postal table: {}", path.display()))
    }

    pub fn empty() -> Self {
        Self {
            prefix_len: default_prefix_len(),
            eu: AHashMap::new(),
            federal: AHashMap::new(),
            state: AHashMap::new(),
            local: AHashMap::new(),
        }
    }

    fn table(&self, level: Level) -> &AHashMap<String, String> {
        match level {
            Level::Eu => &self.eu,
            Level::Federal => &self.federal,
            Level::State => &self.state,
            Level::Local => &self.local,
        }
    }

    /// Match a postal code's prefix against the table for a level.
    pub fn lookup(&self, level: Level, postal_code: &str) -> Option<&str> {
        let digits = postal_code.trim();
        if digits.len() < self.prefix_len || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        self.table(level)
            .get(&digits[..self.prefix_len])
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.eu.is_empty() && self.federal.is_empty() && self.state.is_empty() && self.local.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, level: Level, prefix: &str, constituency_id: &str) {
        let table = match level {
            Level::Eu => &mut self.eu,
            Level::Federal => &mut self.federal,
            Level::State => &mut self.state,
            Level::Local => &mut self.local,
        };
        table.insert(prefix.to_string(), constituency_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_on_prefix_only() {
        let mut table = PostalTable::empty();
        table.insert(Level::State, "10", "agh-berlin");
        assert_eq!(table.lookup(Level::State, "10115"), Some("agh-berlin"));
        assert_eq!(table.lookup(Level::State, "80331"), None);
        assert_eq!(table.lookup(Level::Federal, "10115"), None);
    }

    #[test]
    fn rejects_short_or_non_numeric_codes() {
        let mut table = PostalTable::empty();
        table.insert(Level::State, "10", "agh-berlin");
        assert_eq!(table.lookup(Level::State, "1"), None);
        assert_eq!(table.lookup(Level::State, "1x115"), None);
        assert_eq!(table.lookup(Level::State, ""), None);
    }

    #[test]
    fn parses_table_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(POSTAL_TABLE_FILE),
            br#"{"prefix_len": 2, "federal": {"11": "btw-075"}}"#,
        )
        .unwrap();
        let table = PostalTable::open(dir.path()).unwrap();
        assert_eq!(table.lookup(Level::Federal, "11011"), Some("btw-075"));
        assert!(!table.is_empty());
    }

    #[test]
    fn missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PostalTable::open(dir.path()).unwrap().is_empty());
    }
}
