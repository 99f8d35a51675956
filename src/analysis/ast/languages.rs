/// Language tags and the Tree-sitter parser registry.
use anyhow::Result;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tree_sitter::{Language as Grammar, Parser, Tree};

/// Submission languages accepted by the engine.
///
/// C submissions share the C++ grammar; the tag normalizer folds `c` into
/// `Cpp` for that reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Cpp,
    Java,
}

impl Language {
    /// Normalize a free-form language tag. Unknown tags yield `None`; the
    /// caller degrades to the all-defaults feature vector.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" | "node" | "jsx" | "ecmascript" => Some(Self::JavaScript),
            "python" | "py" | "python3" => Some(Self::Python),
            "cpp" | "c++" | "c" | "cc" | "cxx" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    pub fn grammar(self) -> Grammar {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }

    pub const ALL: [Language; 4] = [
        Language::JavaScript,
        Language::Python,
        Language::Cpp,
        Language::Java,
    ];
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JavaScript => write!(f, "javascript"),
            Self::Python => write!(f, "python"),
            Self::Cpp => write!(f, "cpp"),
            Self::Java => write!(f, "java"),
        }
    }
}

// Grammar handles are expensive to build and safe to share between parsers,
// so they are cached process-wide behind an RwLock.
lazy_static! {
    static ref GRAMMAR_CACHE: Arc<RwLock<HashMap<Language, Grammar>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Process-wide registry of parser grammars, loaded lazily and immutable
/// thereafter.
pub struct ParserRegistry;

impl ParserRegistry {
    /// Get or create the grammar handle for a language.
    pub fn grammar(language: Language) -> Result<Grammar> {
        {
            let cache = GRAMMAR_CACHE
                .read()
                .map_err(|e| anyhow::anyhow!("grammar cache read lock poisoned: {}", e))?;
            if let Some(grammar) = cache.get(&language) {
                return Ok(grammar.clone());
            }
        }

        let grammar = language.grammar();

        {
            let mut cache = GRAMMAR_CACHE
                .write()
                .map_err(|e| anyhow::anyhow!("grammar cache write lock poisoned: {}", e))?;
            cache.entry(language).or_insert_with(|| grammar.clone());
        }

        Ok(grammar)
    }

    /// Build a parser configured for the given language.
    pub fn parser(language: Language) -> Result<Parser> {
        let grammar = Self::grammar(language)?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| anyhow::anyhow!("failed to set parser language for {}: {}", language, e))?;
        Ok(parser)
    }

    /// Single parse contract: `Some(tree)` or `None`, never a panic.
    /// A tree whose root contains syntax errors still comes back `Some`;
    /// callers decide whether an errorful tree is usable.
    pub fn parse(code: &str, language: Language) -> Option<Tree> {
        let mut parser = match Self::parser(language) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(language = %language, error = %e, "parser unavailable");
                return None;
            }
        };
        parser.parse(code, None)
    }

    /// Drop every cached grammar (test isolation).
    pub fn clear_cache() -> Result<()> {
        let mut cache = GRAMMAR_CACHE
            .write()
            .map_err(|e| anyhow::anyhow!("grammar cache write lock poisoned: {}", e))?;
        cache.clear();
        Ok(())
    }

    pub fn cache_size() -> Result<usize> {
        let cache = GRAMMAR_CACHE
            .read()
            .map_err(|e| anyhow::anyhow!("grammar cache read lock poisoned: {}", e))?;
        Ok(cache.len())
    }

    /// Pre-populate the cache for predictable first-call latency.
    pub fn warm_all() -> Result<()> {
        for language in Language::ALL {
            Self::grammar(language)?;
        }
        Ok(())
    }
}
