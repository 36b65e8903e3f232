use std::sync::Arc;

use ahash::AHashSet;
use serde::Serialize;

use crate::directory::Directory;
use crate::resolve::Resolver;
use crate::topics::{TopicMatch, TopicMatcher};
use crate::types::{Address, Level, Representative};

/// Outcome of matching the free-text concern against the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Matched,
    /// No topic scored above zero. The result carries guidance; it is
    /// never presented as an empty successful ranking.
    NoMatch,
    /// Top-scoring topics tie across different governmental levels.
    Ambiguous,
}

/// Governmental level the concern points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SuggestedLevel {
    Single { level: Level },
    /// Tied topics span several levels; no level is picked arbitrarily.
    Multiple { levels: Vec<Level> },
}

/// One ranked representative with the topic that led to the suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRepresentative {
    pub representative: Representative,
    pub score: u32,
    pub matched_topic: String,
    pub explanation: String,
}

/// Ranked suggestion output. Ephemeral, produced per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionResult {
    pub outcome: MatchOutcome,
    pub suggested_level: Option<SuggestedLevel>,
    /// Human-readable summary: matched topic(s), level(s), legal basis.
    pub explanation: String,
    pub suggestions: Vec<RankedRepresentative>,
    /// Present when the caller should prompt the user for more detail.
    pub guidance: Option<String>,
}

/// Score weights for the ranking tuple. Constituency match dominates any
/// number of policy-tag overlaps.
const CONSTITUENCY_MATCH_SCORE: u32 = 100;
const POLICY_TAG_SCORE: u32 = 10;

/// Combines the topic matcher (which level is responsible) with the
/// constituency resolver (which concrete constituency applies) to rank
/// candidate representatives.
pub struct SuggestionEngine {
    matcher: TopicMatcher,
    directory: Arc<dyn Directory>,
}

impl SuggestionEngine {
    pub fn new(matcher: TopicMatcher, directory: Arc<dyn Directory>) -> Self {
        Self { matcher, directory }
    }

    #[inline]
    pub fn matcher(&self) -> &TopicMatcher {
        &self.matcher
    }

    pub fn suggest(
        &self,
        resolver: &Resolver,
        text: &str,
        address: Option<&Address>,
        limit: usize,
    ) -> SuggestionResult {
        let ranked = self.matcher.rank(text);
        let Some(top_score) = ranked.first().map(|m| m.score) else {
            return SuggestionResult {
                outcome: MatchOutcome::NoMatch,
                suggested_level: None,
                explanation: "No policy topic matched the description.".to_string(),
                suggestions: Vec::new(),
                guidance: Some(
                    "Please describe the concern in more detail, naming the subject \
                     (e.g. a train connection, a school, waste collection)."
                        .to_string(),
                ),
            };
        };

        let top: Vec<&TopicMatch<'_>> =
            ranked.iter().take_while(|m| m.score == top_score).collect();
        let mut levels: Vec<Level> = Vec::new();
        for m in &top {
            if !levels.contains(&m.topic.level) {
                levels.push(m.topic.level);
            }
        }

        let (outcome, suggested_level, explanation) = if levels.len() > 1 {
            let named = top
                .iter()
                .map(|m| format!("{} ({} level, {})", m.topic.name, m.topic.level, m.topic.legal_basis))
                .collect::<Vec<_>>()
                .join("; ");
            (
                MatchOutcome::Ambiguous,
                SuggestedLevel::Multiple { levels: levels.clone() },
                format!("Several levels could be responsible: {named}."),
            )
        } else {
            let topic = top[0].topic;
            (
                MatchOutcome::Matched,
                SuggestedLevel::Single { level: topic.level },
                format!(
                    "{} is a {} responsibility ({}).",
                    topic.name, topic.level, topic.legal_basis
                ),
            )
        };

        let mut suggestions = self.rank_representatives(resolver, &top, address);
        suggestions.truncate(limit);

        SuggestionResult {
            outcome,
            suggested_level: Some(suggested_level),
            explanation,
            suggestions,
            guidance: None,
        }
    }

    /// Rank representatives for the tied top topics: exact constituency
    /// match first, then policy-tag overlap, then representative id for a
    /// deterministic order.
    fn rank_representatives(
        &self,
        resolver: &Resolver,
        top: &[&TopicMatch<'_>],
        address: Option<&Address>,
    ) -> Vec<RankedRepresentative> {
        let mut out: Vec<RankedRepresentative> = Vec::new();

        for m in top {
            let topic = m.topic;

            // Narrow to one constituency when an address resolves; fall
            // back to every constituency at the topic's level otherwise.
            let resolved = address
                .map(|addr| resolver.resolve_level(addr, topic.level))
                .and_then(|resolution| resolution.constituency().cloned());
            let (constituencies, narrowed) = match resolved {
                Some(constituency) => (vec![constituency], true),
                None => (self.directory.constituencies_at(topic.level, None), false),
            };

            for constituency in &constituencies {
                for representative in self.directory.representatives_of(&constituency.id) {
                    let mut score = 0;
                    if narrowed {
                        score += CONSTITUENCY_MATCH_SCORE;
                    }
                    if representative.policy_tags.iter().any(|tag| *tag == topic.id) {
                        score += POLICY_TAG_SCORE;
                    }
                    let explanation = format!(
                        "{} ({} level, {})",
                        topic.name, topic.level, topic.legal_basis
                    );
                    out.push(RankedRepresentative {
                        representative,
                        score,
                        matched_topic: topic.id.clone(),
                        explanation,
                    });
                }
            }
        }

        // A representative reachable through several tied topics keeps the
        // highest-scoring entry only.
        out.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.representative.id.cmp(&b.representative.id))
        });
        let mut seen = AHashSet::new();
        out.retain(|s| seen.insert(s.representative.id.clone()));
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::boundary::BoundaryStore;
    use crate::directory::FileDirectory;
    use crate::error::GeocodeError;
    use crate::geocode::{GeocodeCache, GeocodeProvider, Geocoder, ProviderHit};
    use crate::resolve::PostalTable;
    use crate::topics::{Taxonomy, TopicArea};
    use crate::types::Constituency;

    struct NoProvider;

    impl GeocodeProvider for NoProvider {
        fn lookup(&self, _address: &Address) -> Result<Option<ProviderHit>, GeocodeError> {
            Err(GeocodeError::Unavailable("test provider".into()))
        }
    }

    fn topic(id: &str, level: Level, keywords: &[&str]) -> TopicArea {
        TopicArea {
            id: id.to_string(),
            name: id.to_string(),
            level,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            legal_basis: format!("Art. {id} GG"),
        }
    }

    fn rep(id: &str, constituency: &str, tags: &[&str]) -> Representative {
        Representative {
            id: id.to_string(),
            name: format!("Rep {id}"),
            party: None,
            constituency_id: constituency.to_string(),
            policy_tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn constituency(id: &str, level: Level) -> Constituency {
        Constituency {
            id: id.to_string(),
            name: id.to_string(),
            level,
            state: None,
            electoral_district: None,
        }
    }

    fn engine_with(
        topics: Vec<TopicArea>,
        directory: FileDirectory,
    ) -> (SuggestionEngine, Resolver, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let directory: Arc<dyn Directory> = Arc::new(directory);
        let resolver = Resolver::new(
            Geocoder::new(GeocodeCache::in_memory(), Box::new(NoProvider)),
            Arc::new(BoundaryStore::open(dir.path())),
            PostalTable::empty(),
            Arc::clone(&directory),
        );
        let engine =
            SuggestionEngine::new(TopicMatcher::new(Taxonomy::new(topics).unwrap()), directory);
        (engine, resolver, dir)
    }

    #[test]
    fn no_match_is_explicit_with_guidance() {
        let (engine, resolver, _dir) =
            engine_with(vec![topic("rail", Level::Federal, &["bahn"])], FileDirectory::empty());
        let result = engine.suggest(&resolver, "xyzzy plugh", None, 5);
        assert_eq!(result.outcome, MatchOutcome::NoMatch);
        assert!(result.suggestions.is_empty());
        assert!(result.guidance.is_some());
        assert!(result.suggested_level.is_none());
    }

    #[test]
    fn tied_topics_across_levels_produce_multiple() {
        let (engine, resolver, _dir) = engine_with(
            vec![
                topic("rail", Level::Federal, &["verspätung"]),
                topic("strassen", Level::Local, &["verspätung"]),
            ],
            FileDirectory::empty(),
        );
        let result = engine.suggest(&resolver, "dauernd verspätung", None, 5);
        assert_eq!(result.outcome, MatchOutcome::Ambiguous);
        assert_eq!(
            result.suggested_level,
            Some(SuggestedLevel::Multiple { levels: vec![Level::Federal, Level::Local] })
        );
        // The explanation names both tied topics.
        assert!(result.explanation.contains("rail"));
        assert!(result.explanation.contains("strassen"));
    }

    #[test]
    fn tie_at_same_level_stays_single() {
        let (engine, resolver, _dir) = engine_with(
            vec![
                topic("rail", Level::Federal, &["bahn"]),
                topic("energy", Level::Federal, &["strom"]),
            ],
            FileDirectory::empty(),
        );
        let result = engine.suggest(&resolver, "bahn und strom", None, 5);
        assert_eq!(result.outcome, MatchOutcome::Matched);
        assert_eq!(
            result.suggested_level,
            Some(SuggestedLevel::Single { level: Level::Federal })
        );
    }

    #[test]
    fn ranking_prefers_tag_overlap_then_id() {
        let directory = FileDirectory::from_records(
            vec![constituency("c1", Level::Federal)],
            vec![
                rep("rep-b", "c1", &[]),
                rep("rep-a", "c1", &[]),
                rep("rep-c", "c1", &["rail"]),
            ],
        );
        let (engine, resolver, _dir) =
            engine_with(vec![topic("rail", Level::Federal, &["bahn"])], directory);

        let result = engine.suggest(&resolver, "die bahn", None, 5);
        let ids: Vec<&str> = result
            .suggestions
            .iter()
            .map(|s| s.representative.id.as_str())
            .collect();
        // Tag overlap outranks; remaining ties are ordered by id.
        assert_eq!(ids, vec!["rep-c", "rep-a", "rep-b"]);
        assert_eq!(result.suggestions[0].score, POLICY_TAG_SCORE);
    }

    #[test]
    fn limit_truncates_suggestions() {
        let directory = FileDirectory::from_records(
            vec![constituency("c1", Level::Federal)],
            (0..10).map(|i| rep(&format!("rep-{i}"), "c1", &[])).collect(),
        );
        let (engine, resolver, _dir) =
            engine_with(vec![topic("rail", Level::Federal, &["bahn"])], directory);
        let result = engine.suggest(&resolver, "bahn", None, 3);
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn explanation_carries_level_and_legal_basis() {
        let directory = FileDirectory::from_records(
            vec![constituency("c1", Level::Federal)],
            vec![rep("rep-a", "c1", &[])],
        );
        let (engine, resolver, _dir) =
            engine_with(vec![topic("rail", Level::Federal, &["bahn"])], directory);
        let result = engine.suggest(&resolver, "bahn", None, 5);
        assert!(result.explanation.contains("federal"));
        assert!(result.explanation.contains("Art. rail GG"));
        assert!(result.suggestions[0].explanation.contains("federal"));
    }
}
