/// AST-layer modules: parser registry and the two extraction strategies.
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod languages;

// Re-export main types for convenience
pub use error::AstError;
pub use extractor::AstFeatureExtractor;
pub use fallback::RegexFeatureExtractor;
pub use languages::{Language, ParserRegistry};
