mod matcher;
mod taxonomy;

pub use matcher::{TopicMatch, TopicMatcher};
pub use taxonomy::{TAXONOMY_FILE, Taxonomy, TopicArea};
