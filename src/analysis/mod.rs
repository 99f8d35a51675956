/// Static analysis: feature extraction and complexity estimation.
pub mod ast;
pub mod complexity;
pub mod features;
pub(crate) mod idioms;

// Re-export commonly used types
pub use ast::languages::{Language, ParserRegistry};
pub use complexity::{estimate_space, estimate_time, SpaceComplexity, TimeComplexity};
pub use features::{FeatureVector, Paradigm};

use ast::extractor::AstFeatureExtractor;
use ast::fallback::RegexFeatureExtractor;

/// Extract the structural feature vector of one submission.
///
/// Total function: never panics, never returns partial data. The AST
/// strategy is authoritative; a submission it declines (syntax errors,
/// oversized or unparseable input) degrades to the regex strategy, and
/// blank input short-circuits to the all-defaults vector.
pub fn extract_features(code: &str, language: Language) -> FeatureVector {
    if code.trim().is_empty() {
        return FeatureVector::defaults_for(code);
    }
    match AstFeatureExtractor::extract(code, language) {
        Ok(vector) => vector,
        Err(reason) => {
            tracing::warn!(
                language = %language,
                %reason,
                "AST extraction declined, using regex fallback"
            );
            RegexFeatureExtractor::extract(code, language)
        }
    }
}

/// Tag-normalizing wrapper: unknown language tags degrade to the
/// all-defaults vector instead of failing.
pub fn extract_features_tagged(code: &str, tag: &str) -> FeatureVector {
    match Language::from_tag(tag) {
        Some(language) => extract_features(code, language),
        None => {
            tracing::warn!(tag, "unknown language tag, returning defaults");
            FeatureVector::defaults_for(code)
        }
    }
}

/// Batch extraction over independent submissions.
pub fn extract_features_batch(submissions: &[(String, Language)]) -> Vec<FeatureVector> {
    use rayon::prelude::*;

    submissions
        .par_iter()
        .map(|(code, language)| extract_features(code, *language))
        .collect()
}
