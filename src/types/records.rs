use serde::{Deserialize, Serialize};

use super::level::Level;

/// A named electoral or administrative district at one governmental level.
/// Owned by the import collaborator; the engine only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituency {
    pub id: String,
    pub name: String,
    pub level: Level,
    /// State scope. `None` means nationwide.
    #[serde(default)]
    pub state: Option<String>,
    /// Electoral district number, where the level has one (e.g. Wahlkreis number).
    #[serde(default)]
    pub electoral_district: Option<u32>,
}

/// An elected representative as imported from the political-data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Representative {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub party: Option<String>,
    /// Constituency the representative was elected for.
    pub constituency_id: String,
    /// Policy-area tags (taxonomy topic ids) from committee memberships.
    #[serde(default)]
    pub policy_tags: Vec<String>,
}
