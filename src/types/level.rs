use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Governmental level a constituency or policy topic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Eu,         // European parliament
    Federal,    // Bundestag
    State,      // Landtag
    Local,      // Municipal council
}

impl Level {
    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Eu => "eu",
            Level::Federal => "federal",
            Level::State => "state",
            Level::Local => "local",
        }
    }

    pub fn order() -> [Level; 4] {
        [Level::Eu, Level::Federal, Level::State, Level::Local]
    }

    /// Whether the level has a single nationwide default constituency that
    /// applies to every address (the last rung of the fallback chain).
    /// Expressed as data so the resolver stays free of per-level branches.
    pub fn has_nationwide_default(&self) -> bool {
        match self {
            Level::Eu | Level::Federal => true,
            Level::State | Level::Local => false,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eu" => Ok(Level::Eu),
            "federal" | "bund" => Ok(Level::Federal),
            "state" | "land" => Ok(Level::State),
            "local" | "kommune" => Ok(Level::Local),
            other => anyhow::bail!("Unknown governmental level: {other}"),
        }
    }
}
