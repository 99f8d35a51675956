/// Per-question reference specifications and their cached loader.
///
/// Each question is one JSON document (`Q0NN.json`) under the store
/// directory; an optional `index.json` lists ids for bulk preload. The cache
/// is an explicit object owned by the store, not a hidden module singleton:
/// construct one at process start, pass it by reference, call `clear()` for
/// test isolation.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::complexity::{SpaceComplexity, TimeComplexity};

/// Structural constraints a question may impose on submissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    pub should_read_input: Option<bool>,
    pub should_use_loops: Option<bool>,
    pub should_use_recursion: Option<bool>,
    pub min_line_count: Option<usize>,
    pub max_line_count: Option<usize>,
}

/// Validated reference specification for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLogic {
    pub question_id: String,
    pub expected_algorithm: String,
    pub allowed_approaches: Vec<String>,
    pub disallowed_patterns: Vec<String>,
    pub expected_time_complexity: TimeComplexity,
    pub expected_space_complexity: SpaceComplexity,
    pub acceptable_complexities: Vec<TimeComplexity>,
    pub paradigm: Option<String>,
    pub constraints: Option<Constraints>,
}

/// Raw on-disk shape before validation. Complexity fields stay free text
/// here; they are normalized into the closed enums during validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReferenceLogic {
    #[serde(default)]
    question_id: Option<serde_json::Value>,
    #[serde(default)]
    expected_algorithm: Option<String>,
    #[serde(default)]
    allowed_approaches: Option<Vec<String>>,
    #[serde(default)]
    disallowed_patterns: Option<Vec<String>>,
    #[serde(default)]
    expected_time_complexity: Option<String>,
    #[serde(default)]
    expected_space_complexity: Option<String>,
    #[serde(default)]
    acceptable_complexities: Option<Vec<String>>,
    #[serde(default)]
    paradigm: Option<String>,
    #[serde(default)]
    constraints: Option<Constraints>,
}

#[derive(Debug, Deserialize)]
struct QuestionIndex {
    #[serde(default)]
    questions: Vec<serde_json::Value>,
}

/// Canonicalize any accepted question-id form (`1`, `"1"`, `"Q001"`, `"q1"`)
/// to the `Q0NN` key. Ids outside the three-digit namespace are rejected.
pub fn canonical_question_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('Q')
        .or_else(|| trimmed.strip_prefix('q'))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: u32 = digits.parse().ok()?;
    if number == 0 || number > 999 {
        return None;
    }
    Some(format!("Q{:03}", number))
}

fn canonical_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => canonical_question_id(s),
        serde_json::Value::Number(n) => {
            let id = n.as_u64()?;
            canonical_question_id(&id.to_string())
        }
        _ => None,
    }
}

/// Cached loader for reference specifications.
///
/// Reads are lock-free; the first load for a key is serialized by the cache
/// entry, so each question is read from disk at most once per process (hits
/// and misses are both cached).
pub struct ReferenceLogicStore {
    dir: PathBuf,
    cache: DashMap<String, Option<Arc<ReferenceLogic>>>,
}

impl ReferenceLogicStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: DashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fetch the reference for a question id in any accepted form.
    /// `None` means "no rubric available" and must never be read as
    /// "everything is allowed".
    pub fn get(&self, id: &str) -> Option<Arc<ReferenceLogic>> {
        let key = match canonical_question_id(id) {
            Some(key) => key,
            None => {
                tracing::warn!(id, "malformed question id");
                return None;
            }
        };
        let entry = self
            .cache
            .entry(key.clone())
            .or_insert_with(|| self.load(&key));
        entry.value().clone()
    }

    /// Numeric convenience form of [`get`](Self::get).
    pub fn get_numeric(&self, id: u32) -> Option<Arc<ReferenceLogic>> {
        self.get(&id.to_string())
    }

    /// Drop every cached entry (test isolation).
    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Load every id listed in `index.json`; returns how many validated.
    pub fn preload_index(&self) -> Result<usize> {
        let path = self.dir.join("index.json");
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let index: QuestionIndex =
            serde_json::from_str(&text).with_context(|| "malformed index.json")?;
        let mut loaded = 0;
        for entry in &index.questions {
            if let Some(key) = canonical_from_value(entry) {
                if self.get(&key).is_some() {
                    loaded += 1;
                }
            }
        }
        Ok(loaded)
    }

    fn load(&self, key: &str) -> Option<Arc<ReferenceLogic>> {
        let path = self.dir.join(format!("{}.json", key));
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "reference document unavailable");
                return None;
            }
        };
        let raw: RawReferenceLogic = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "reference document is not valid JSON");
                return None;
            }
        };
        validate(raw, key).map(Arc::new)
    }
}

/// Validate the mandatory-field schema. The two complexity fields are
/// recoverable (safe defaults plus a degraded-mode warning); every other
/// missing mandatory field fails the load closed.
fn validate(raw: RawReferenceLogic, requested_key: &str) -> Option<ReferenceLogic> {
    let question_id = match raw.question_id.as_ref().and_then(canonical_from_value) {
        Some(id) => id,
        None => {
            tracing::warn!(requested_key, "reference document missing questionId");
            return None;
        }
    };
    if question_id != requested_key {
        tracing::warn!(
            requested_key,
            document_id = %question_id,
            "reference document id does not match its file name"
        );
        return None;
    }

    let expected_algorithm = match raw.expected_algorithm {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            tracing::warn!(requested_key, "reference document missing expectedAlgorithm");
            return None;
        }
    };
    let allowed_approaches = match raw.allowed_approaches {
        Some(tags) => tags,
        None => {
            tracing::warn!(requested_key, "reference document missing allowedApproaches");
            return None;
        }
    };
    let disallowed_patterns = match raw.disallowed_patterns {
        Some(tags) => tags,
        None => {
            tracing::warn!(requested_key, "reference document missing disallowedPatterns");
            return None;
        }
    };

    let expected_time_complexity = match raw.expected_time_complexity {
        Some(text) => TimeComplexity::normalize(&text),
        None => {
            tracing::warn!(
                requested_key,
                "expectedTimeComplexity missing, running degraded with O(1)"
            );
            TimeComplexity::Constant
        }
    };
    let expected_space_complexity = match raw.expected_space_complexity {
        Some(text) => SpaceComplexity::normalize(&text),
        None => {
            tracing::warn!(
                requested_key,
                "expectedSpaceComplexity missing, running degraded with O(1)"
            );
            SpaceComplexity::Constant
        }
    };

    let acceptable_complexities = raw
        .acceptable_complexities
        .unwrap_or_default()
        .iter()
        .map(|text| TimeComplexity::normalize(text))
        .collect();

    Some(ReferenceLogic {
        question_id,
        expected_algorithm,
        allowed_approaches,
        disallowed_patterns,
        expected_time_complexity,
        expected_space_complexity,
        acceptable_complexities,
        paradigm: raw.paradigm,
        constraints: raw.constraints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_canonicalization() {
        assert_eq!(canonical_question_id("1"), Some("Q001".to_string()));
        assert_eq!(canonical_question_id("Q001"), Some("Q001".to_string()));
        assert_eq!(canonical_question_id("q17"), Some("Q017".to_string()));
        assert_eq!(canonical_question_id("042"), Some("Q042".to_string()));
        assert_eq!(canonical_question_id("999"), Some("Q999".to_string()));
        assert_eq!(canonical_question_id("1000"), None);
        assert_eq!(canonical_question_id("0"), None);
        assert_eq!(canonical_question_id("abc"), None);
        assert_eq!(canonical_question_id(""), None);
    }

    #[test]
    fn numeric_json_ids_are_accepted() {
        assert_eq!(
            canonical_from_value(&serde_json::json!(7)),
            Some("Q007".to_string())
        );
        assert_eq!(
            canonical_from_value(&serde_json::json!("Q007")),
            Some("Q007".to_string())
        );
        assert_eq!(canonical_from_value(&serde_json::json!(null)), None);
    }

    #[test]
    fn missing_algorithm_fails_closed() {
        let raw: RawReferenceLogic = serde_json::from_str(
            r#"{"questionId": "Q001", "allowedApproaches": [], "disallowedPatterns": []}"#,
        )
        .unwrap();
        assert!(validate(raw, "Q001").is_none());
    }

    #[test]
    fn missing_complexities_degrade_to_constant() {
        let raw: RawReferenceLogic = serde_json::from_str(
            r#"{
                "questionId": "Q001",
                "expectedAlgorithm": "two sum",
                "allowedApproaches": ["hash-map"],
                "disallowedPatterns": []
            }"#,
        )
        .unwrap();
        let logic = validate(raw, "Q001").unwrap();
        assert_eq!(logic.expected_time_complexity, TimeComplexity::Constant);
        assert_eq!(logic.expected_space_complexity, SpaceComplexity::Constant);
    }

    #[test]
    fn free_text_complexities_are_normalized() {
        let raw: RawReferenceLogic = serde_json::from_str(
            r#"{
                "questionId": "Q003",
                "expectedAlgorithm": "binary search",
                "allowedApproaches": ["binary-search"],
                "disallowedPatterns": ["linear-scan"],
                "expectedTimeComplexity": "O(log n)",
                "expectedSpaceComplexity": "constant",
                "acceptableComplexities": ["O(n)"]
            }"#,
        )
        .unwrap();
        let logic = validate(raw, "Q003").unwrap();
        assert_eq!(logic.expected_time_complexity, TimeComplexity::Logarithmic);
        assert_eq!(logic.expected_space_complexity, SpaceComplexity::Constant);
        assert_eq!(logic.acceptable_complexities, vec![TimeComplexity::Linear]);
    }

    #[test]
    fn mismatched_document_id_fails_closed() {
        let raw: RawReferenceLogic = serde_json::from_str(
            r#"{
                "questionId": "Q002",
                "expectedAlgorithm": "x",
                "allowedApproaches": [],
                "disallowedPatterns": []
            }"#,
        )
        .unwrap();
        assert!(validate(raw, "Q001").is_none());
    }
}
