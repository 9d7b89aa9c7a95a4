//! Extraction module
//!
//! This module turns a loaded conversation page into structured data:
//! - Resolving which selector variant currently matches the markup
//! - Labeling matched nodes as user/assistant turns
//! - Deriving keywords from the transcript text

mod keywords;
mod resolver;
mod stopwords;
mod turns;

pub use keywords::{
    KeywordCandidate, KeywordExtractor, TextSignals, ACRONYM_BOOST, MAX_ACRONYMS,
    MAX_PROPER_NOUNS, MIN_FILL_OCCURRENCES, MIN_TERM_CHARS, PROPER_NOUN_BOOST,
};
pub use resolver::{Resolution, SelectorOutcome, SelectorResolver};
pub use stopwords::is_stopword;
pub use turns::{label_turns, NodeSignals, TurnClassifier};
