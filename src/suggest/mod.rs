mod engine;

pub use engine::{
    MatchOutcome, RankedRepresentative, SuggestedLevel, SuggestionEngine, SuggestionResult,
};
