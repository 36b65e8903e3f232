use super::taxonomy::{Taxonomy, TopicArea};

/// One topic with its keyword-overlap score.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMatch<'a> {
    pub topic: &'a TopicArea,
    /// Number of distinct keywords present in the input. Keyword presence
    /// is binary: repeating a keyword does not raise the score.
    pub score: usize,
}

/// Bag-of-keywords matcher over the fixed taxonomy. Intentionally
/// precision-over-recall: no stemming, no semantics. Known limitation,
/// not a defect.
#[derive(Debug)]
pub struct TopicMatcher {
    taxonomy: Taxonomy,
}

impl TopicMatcher {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    #[inline]
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Score free text against every topic. Topics with score 0 are
    /// excluded; the rest are ordered by descending score, ties broken by
    /// the taxonomy's declared order (stable sort over insertion order).
    pub fn rank(&self, text: &str) -> Vec<TopicMatch<'_>> {
        let haystack = text.to_lowercase();
        let mut matches: Vec<TopicMatch<'_>> = self
            .taxonomy
            .topics()
            .iter()
            .filter_map(|topic| {
                let score = topic
                    .keywords
                    .iter()
                    .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
                    .count();
                (score > 0).then_some(TopicMatch { topic, score })
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    fn topic(id: &str, level: Level, keywords: &[&str]) -> TopicArea {
        TopicArea {
            id: id.to_string(),
            name: id.to_string(),
            level,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            legal_basis: "Art. 1 GG".to_string(),
        }
    }

    fn matcher(topics: Vec<TopicArea>) -> TopicMatcher {
        TopicMatcher::new(Taxonomy::new(topics).unwrap())
    }

    #[test]
    fn repeated_keyword_scores_once() {
        let matcher = matcher(vec![topic("rail", Level::Federal, &["train"])]);
        let once = matcher.rank("the train is late");
        let thrice = matcher.rank("train train train");
        assert_eq!(once[0].score, 1);
        assert_eq!(thrice[0].score, 1);
    }

    #[test]
    fn distinct_keywords_accumulate() {
        let matcher = matcher(vec![topic("rail", Level::Federal, &["train", "track", "station"])]);
        assert_eq!(matcher.rank("the train left the station")[0].score, 2);
    }

    #[test]
    fn zero_score_topics_are_excluded() {
        let matcher = matcher(vec![
            topic("rail", Level::Federal, &["train"]),
            topic("waste", Level::Local, &["garbage"]),
        ]);
        let ranked = matcher.rank("my train is late");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].topic.id, "rail");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let matcher = matcher(vec![topic("rail", Level::Federal, &["bahn"])]);
        assert_eq!(matcher.rank("Die BAHN kommt nie").len(), 1);
    }

    #[test]
    fn ties_keep_declared_taxonomy_order() {
        let matcher = matcher(vec![
            topic("second-declared", Level::Federal, &["alpha"]),
            topic("first-declared", Level::State, &["beta"]),
        ]);
        let ranked = matcher.rank("alpha beta");
        assert_eq!(ranked[0].topic.id, "second-declared");
        assert_eq!(ranked[1].topic.id, "first-declared");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn no_keywords_yield_empty_ranking() {
        let matcher = matcher(vec![topic("rail", Level::Federal, &["train"])]);
        assert!(matcher.rank("xyzzy plugh").is_empty());
    }
}
