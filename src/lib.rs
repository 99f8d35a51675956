//! Deterministic code-equivalence and complexity-grading engine.
//!
//! Given a student submission (Python, JavaScript, Java, or C/C++) and a
//! per-question reference specification, the engine extracts structural
//! features without executing the code, estimates asymptotic complexity,
//! lowers the source into canonical three-address code for equivalence
//! scoring, and fuses the rule-based result with external test-execution
//! data into a single trust-weighted verdict.
//!
//! Every public entry point is a synchronous total function: malformed
//! input degrades to safe defaults and explicit error fields, never to a
//! panic or a partial result. The only shared state is two read-mostly
//! caches (parser grammars and reference documents), so the engine is safe
//! to call concurrently without locking.

/// Static analysis: parser registry, feature extraction, complexity rules
pub mod analysis;

/// Three-address-code lowering, canonicalization, and comparison
pub mod tac;

/// Reference-logic documents and their cached loader
pub mod reference;

/// Rule-based comparison and verdict fusion
pub mod grading;

// Re-export the engine's public surface for convenience
pub use analysis::{
    extract_features, extract_features_batch, extract_features_tagged, FeatureVector, Language,
    Paradigm, ParserRegistry, SpaceComplexity, TimeComplexity,
};
pub use grading::{
    compare_against_reference, generate_final_verdict, AiExplanation, ComparisonResult, Decision,
    Finding, MatchLevel, SecurityEvent, Severity, TestExecutionResult, Verdict, VerdictInput,
};
pub use reference::{canonical_question_id, ReferenceLogic, ReferenceLogicStore};
pub use tac::{compare_tac, generate_tac, normalize_tac, TacComparison, TacInstruction, TacProgram};

/// Estimate the time-complexity class of an already-extracted feature
/// vector. Pure; see [`analysis::complexity::estimate_time`].
pub fn estimate_time_complexity(features: &FeatureVector) -> TimeComplexity {
    analysis::complexity::estimate_time(features)
}

/// Compare extracted features against the rubric for a question id,
/// consulting the store's cache. A question with no loadable rubric grades
/// as the explicit no-rubric failure result, never as a permissive pass.
pub fn compare_against_question(
    features: &FeatureVector,
    store: &ReferenceLogicStore,
    question_id: &str,
) -> ComparisonResult {
    let reference = store.get(question_id);
    compare_against_reference(features, reference.as_deref(), None)
}

/// Estimate the space-complexity class of an already-extracted feature
/// vector. Pure; see [`analysis::complexity::estimate_space`].
pub fn estimate_space_complexity(features: &FeatureVector) -> SpaceComplexity {
    analysis::complexity::estimate_space(features)
}
