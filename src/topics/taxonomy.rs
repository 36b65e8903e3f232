use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::Level;

pub const TAXONOMY_FILE: &str = "taxonomy.json";

/// One policy area: which governmental level is responsible for it, the
/// keywords that signal it, and the legal basis of the responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicArea {
    pub id: String,
    pub name: String,
    pub level: Level,
    /// Matched case-insensitively as substrings of the input text.
    pub keywords: Vec<String>,
    /// Citation of the competency norm, e.g. "Art. 73 Abs. 1 Nr. 6a GG".
    pub legal_basis: String,
}

/// The static topic catalogue. Declared order is the tie-break order for
/// equal scores, so it is preserved exactly as loaded. Immutable after
/// construction.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    topics: Vec<TopicArea>,
}

impl Taxonomy {
    /// Build from an explicit topic list. An empty list is refused: an
    /// engine without topics could never match anything (startup-fatal).
    pub fn new(topics: Vec<TopicArea>) -> Result<Self> {
        if topics.is_empty() {
            anyhow::bail!("Topic taxonomy is empty; the engine cannot match any concern");
        }
        Ok(Self { topics })
    }

    /// Load `taxonomy.json` from the data directory, or fall back to the
    /// built-in catalogue if the file does not exist.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(TAXONOMY_FILE);
        if !path.exists() {
            return Self::builtin();
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read taxonomy: {}", path.display()))?;
        let topics: Vec<TopicArea> = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse taxonomy: {}", path.display()))?;
        Self::new(topics)
    }

    #[inline]
    pub fn topics(&self) -> &[TopicArea] {
        &self.topics
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Built-in catalogue of German policy areas and their competency norms.
    pub fn builtin() -> Result<Self> {
        let topic = |id: &str, name: &str, level: Level, keywords: &[&str], legal: &str| TopicArea {
            id: id.to_string(),
            name: name.to_string(),
            level,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            legal_basis: legal.to_string(),
        };

        Self::new(vec![
            topic(
                "eisenbahn",
                "Eisenbahnen des Bundes",
                Level::Federal,
                &["bahn", "zug", "schiene", "ice", "gleis", "bahnhof"],
                "Art. 73 Abs. 1 Nr. 6a GG",
            ),
            topic(
                "migration",
                "Einwanderung und Asyl",
                Level::Federal,
                &["asyl", "einwanderung", "migration", "visum", "staatsangehörigkeit"],
                "Art. 73 Abs. 1 Nr. 3 GG",
            ),
            topic(
                "verteidigung",
                "Verteidigung",
                Level::Federal,
                &["bundeswehr", "verteidigung", "wehrpflicht", "nato"],
                "Art. 73 Abs. 1 Nr. 1 GG",
            ),
            topic(
                "energie",
                "Energiewirtschaft und Klima",
                Level::Federal,
                &["energie", "strom", "klima", "windkraft", "solar", "kohle"],
                "Art. 74 Abs. 1 Nr. 11 GG",
            ),
            topic(
                "wohnen",
                "Mietrecht und Wohnungswesen",
                Level::Federal,
                &["miete", "wohnung", "mietpreis", "vermieter"],
                "Art. 74 Abs. 1 Nr. 1 GG",
            ),
            topic(
                "bildung",
                "Schulen und Bildung",
                Level::State,
                &["schule", "bildung", "lehrer", "abitur", "lehrplan", "universität"],
                "Art. 30, 70 Abs. 1 GG",
            ),
            topic(
                "polizei",
                "Polizei und öffentliche Ordnung",
                Level::State,
                &["polizei", "ordnungsamt", "versammlung", "innere sicherheit"],
                "Art. 30, 70 Abs. 1 GG",
            ),
            topic(
                "rundfunk",
                "Rundfunk und Medien",
                Level::State,
                &["rundfunk", "fernsehen", "rundfunkbeitrag", "medien"],
                "Art. 30, 70 Abs. 1 GG",
            ),
            topic(
                "abfall",
                "Abfallentsorgung",
                Level::Local,
                &["müll", "abfall", "mülltonne", "sperrmüll", "recycling"],
                "Art. 28 Abs. 2 GG",
            ),
            topic(
                "strassen",
                "Gemeindestraßen und Verkehrsberuhigung",
                Level::Local,
                &["schlagloch", "gehweg", "spielstraße", "parkplatz", "radweg"],
                "Art. 28 Abs. 2 GG",
            ),
            topic(
                "kita",
                "Kinderbetreuung",
                Level::Local,
                &["kita", "kindergarten", "kitaplatz", "betreuung"],
                "Art. 28 Abs. 2 GG, § 24 SGB VIII",
            ),
            topic(
                "handel",
                "Gemeinsame Handelspolitik",
                Level::Eu,
                &["zoll", "handelsabkommen", "binnenmarkt", "import", "export"],
                "Art. 207 AEUV",
            ),
            topic(
                "agrar",
                "Landwirtschaft und Fischerei",
                Level::Eu,
                &["landwirtschaft", "agrar", "fischerei", "subvention"],
                "Art. 38 AEUV",
            ),
            topic(
                "datenschutz",
                "Datenschutz im Binnenmarkt",
                Level::Eu,
                &["datenschutz", "dsgvo", "personenbezogene daten"],
                "Art. 16 AEUV",
            ),
        ])
    }
}
