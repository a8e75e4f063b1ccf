

pub mod context;
pub mod matcher;
pub mod pipeline;
pub mod similarity;
pub mod synthesizer;

pub use context::{ContextExtractor, ContextOutcome, ContextRecord, NO_INFORMATION};
pub use matcher::{EntityMatcher, MatchStrategy, MatchedSet, MatcherConfig};
pub use pipeline::BiomedicalRag;
pub use synthesizer::AnswerSynthesizer;
