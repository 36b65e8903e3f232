use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use ahash::AHashMap;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::common::write_atomic;
use crate::types::{Address, Coordinates};

const CACHE_FILE: &str = "geocode-cache.json";

/// One resolved address. Entries never mutate after write; a forced
/// re-geocode replaces the entry wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub lat: f64,
    pub lon: f64,
    /// State name as normalized through the synonym table.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Provider confidence indicator, if the provider reports one.
    #[serde(default)]
    pub confidence: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    #[inline]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Normalize an address into the stable cache key: lowercase, trimmed,
/// internal whitespace collapsed, parts joined with `|`.
pub fn normalize_key(address: &Address) -> String {
    let squash = |s: &str| -> String {
        s.trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!(
        "{}|{}|{}|{}",
        squash(&address.street),
        squash(&address.postal_code),
        squash(&address.city),
        squash(address.state.as_deref().unwrap_or("")),
    )
}

/// Durable mapping from normalized address to resolved coordinates, backed
/// by a single JSON file. Safe for concurrent readers; writes are
/// last-write-wins and idempotent (identical addresses geocode to identical
/// entries, so racing writers are harmless). Storage failures degrade to
/// "always miss" and never propagate to resolution.
#[derive(Debug)]
pub struct GeocodeCache {
    path: Option<PathBuf>,
    max_age: Option<Duration>,
    entries: RwLock<AHashMap<String, CacheEntry>>,
}

impl GeocodeCache {
    /// Open (or create) the cache file under `cache_dir`. A missing file
    /// starts empty; a corrupt file is logged and treated as empty.
    pub fn open(cache_dir: &Path, max_age: Option<Duration>) -> Self {
        let path = cache_dir.join(CACHE_FILE);
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("geocode cache at {} unreadable, starting empty: {err:#}", path.display());
                AHashMap::new()
            }
        };
        Self {
            path: Some(path),
            max_age,
            entries: RwLock::new(entries),
        }
    }

    /// Purely in-memory cache (no durability), used by tests and embedders.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            max_age: None,
            entries: RwLock::new(AHashMap::new()),
        }
    }

    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Look up an address. Entries older than the configured max age count
    /// as misses, which makes staleness a policy rather than a silent fact.
    pub fn get(&self, address: &Address) -> Option<CacheEntry> {
        let key = normalize_key(address);
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(&key)?;
        if let Some(max_age) = self.max_age {
            let age = Utc::now().signed_duration_since(entry.fetched_at);
            if age.num_seconds() >= 0 && age.num_seconds() as u64 >= max_age.as_secs() {
                return None;
            }
        }
        Some(entry.clone())
    }

    /// Insert (or overwrite) the entry for an address and persist the store.
    /// Persistence failures are logged and swallowed: the cache degrades to
    /// a smaller working set, resolution is never blocked.
    pub fn put(&self, address: &Address, entry: CacheEntry) {
        let key = normalize_key(address);
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.insert(key, entry);
        }
        if let Err(err) = self.persist() {
            warn!("failed to persist geocode cache: {err:#}");
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        let bytes = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            serde_json::to_vec_pretty(&*entries).context("serialize geocode cache")?
        };
        write_atomic(path, &bytes)
    }
}

fn read_entries(path: &Path) -> Result<AHashMap<String, CacheEntry>> {
    if !path.exists() {
        return Ok(AHashMap::new());
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("parse {}", path.display()))
}
