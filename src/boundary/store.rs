use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use anyhow::Result;
use log::{debug, warn};
use regex::Regex;

use crate::types::Level;

use super::geojson::read_boundary_file;
use super::locator::DistrictIndex;

/// Scope key: level plus optional state (lowercased slug). `None` state
/// means the nationwide collection for that level.
type ScopeKey = (Level, Option<String>);

/// Loads and indexes per-scope boundary polygon collections from a data
/// directory. Files are named `{level}.geojson` (nationwide) or
/// `{level}_{state-slug}.geojson`. Each scope loads lazily on first access
/// and at most once per process (load-once); a missing file is not an
/// error, it yields an empty scope and pushes resolution to fallback.
#[derive(Debug)]
pub struct BoundaryStore {
    dir: PathBuf,
    file_pattern: Regex,
    scopes: RwLock<AHashMap<ScopeKey, Arc<DistrictIndex>>>,
}

impl BoundaryStore {
    pub fn open(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            // Infallible: the pattern is a fixed literal.
            file_pattern: Regex::new(r"^(eu|federal|state|local)(?:_([a-z0-9-]+))?\.geojson$")
                .unwrap(),
            scopes: RwLock::new(AHashMap::new()),
        }
    }

    /// Get the district index for a scope, loading it on first access.
    /// Concurrent first accesses are serialized through the write lock, so
    /// a scope is loaded exactly once. Loading an already-loaded scope is
    /// a no-op; use [`reload_scope`](Self::reload_scope) for a replace.
    pub fn scope(&self, level: Level, state: Option<&str>) -> Arc<DistrictIndex> {
        let key = scope_key(level, state);
        {
            let scopes = self.scopes.read().unwrap_or_else(|e| e.into_inner());
            if let Some(index) = scopes.get(&key) {
                return Arc::clone(index);
            }
        }

        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have loaded the scope while we waited.
        if let Some(index) = scopes.get(&key) {
            return Arc::clone(index);
        }
        let index = Arc::new(self.load_scope(&key));
        scopes.insert(key, Arc::clone(&index));
        index
    }

    /// Drop and re-load one scope (full replace), e.g. after new boundary
    /// files were imported.
    pub fn reload_scope(&self, level: Level, state: Option<&str>) -> Arc<DistrictIndex> {
        let key = scope_key(level, state);
        let index = Arc::new(self.load_scope(&key));
        let mut scopes = self.scopes.write().unwrap_or_else(|e| e.into_inner());
        scopes.insert(key, Arc::clone(&index));
        index
    }

    /// Whether any boundary file at all exists in the data directory.
    /// Total absence across all levels is a startup-fatal configuration
    /// error for the engine (unless a postal-prefix table exists).
    pub fn has_any_boundary_file(&self) -> bool {
        let Ok(entries) = std::fs::read_dir(&self.dir) else { return false };
        entries.flatten().any(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.file_pattern.is_match(name))
        })
    }

    fn load_scope(&self, key: &ScopeKey) -> DistrictIndex {
        let path = self.dir.join(scope_file_name(key));
        if !path.exists() {
            debug!("no boundary file for scope {key:?} at {}", path.display());
            return DistrictIndex::new(Vec::new());
        }
        match read_boundary_file(&path) {
            Ok(polygons) => {
                debug!("loaded {} polygons from {}", polygons.len(), path.display());
                DistrictIndex::new(polygons)
            }
            Err(err) => {
                // Corrupt file: recoverable, scope resolves through fallback.
                warn!("treating boundary scope {key:?} as empty: {err:#}");
                DistrictIndex::new(Vec::new())
            }
        }
    }
}

fn scope_key(level: Level, state: Option<&str>) -> ScopeKey {
    (level, state.map(state_slug))
}

fn scope_file_name(key: &ScopeKey) -> String {
    match &key.1 {
        Some(slug) => format!("{}_{}.geojson", key.0.to_str(), slug),
        None => format!("{}.geojson", key.0.to_str()),
    }
}

/// File-name slug for a state: lowercase ASCII, umlauts transliterated,
/// everything else folded to `-`.
pub fn state_slug(state: &str) -> String {
    let mut slug = String::with_capacity(state.len());
    for ch in state.trim().to_lowercase().chars() {
        match ch {
            'a'..='z' | '0'..='9' => slug.push(ch),
            'ä' => slug.push_str("ae"),
            'ö' => slug.push_str("oe"),
            'ü' => slug.push_str("ue"),
            'ß' => slug.push_str("ss"),
            _ if slug.ends_with('-') => {}
            _ => slug.push('-'),
        }
    }
    slug.trim_matches('-').to_string()
}
