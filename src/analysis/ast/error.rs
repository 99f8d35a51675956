use thiserror::Error;

/// Reasons the AST extraction path can decline a submission. These never
/// escape the public API: every variant triggers the regex fallback or the
/// all-defaults vector.
#[derive(Debug, Error)]
pub enum AstError {
    #[error("source code is empty")]
    EmptySource,

    #[error("source code too large ({0} bytes)")]
    SourceTooLarge(usize),

    #[error("failed to parse {0} source code")]
    ParseFailed(String),

    #[error("source code contains syntax errors that prevent analysis")]
    SyntaxError,

    #[error("unknown language tag: {0}")]
    UnknownTag(String),
}
