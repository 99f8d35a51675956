/// Rule-based comparison of a submission's features against the reference
/// specification for its question.
use serde::{Deserialize, Serialize};

use crate::analysis::complexity::TimeComplexity;
use crate::analysis::features::FeatureVector;
use crate::reference::ReferenceLogic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchLevel {
    Full,
    Partial,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Medium,
    Warning,
    Info,
}

/// One tagged, severity-annotated observation about a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub tag: String,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn new(tag: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            tag: tag.to_string(),
            severity,
            message: message.into(),
        }
    }
}

/// Output of the rule-based comparator. Always fully populated; a missing
/// rubric is reported through `success`/`error`, never via a panic or a
/// permissive default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub algorithm_match: MatchLevel,
    pub time_complexity_match: bool,
    pub space_complexity_match: bool,
    pub complexity_marks: u8,
    pub logic_score: u8,
    pub issues: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub successes: Vec<Finding>,
    pub success: bool,
    pub error: Option<String>,
}

impl ComparisonResult {
    /// The explicit "no rubric available" result: zero score, zero marks,
    /// nothing matched.
    pub fn no_reference() -> Self {
        Self {
            algorithm_match: MatchLevel::None,
            time_complexity_match: false,
            space_complexity_match: false,
            complexity_marks: 0,
            logic_score: 0,
            issues: vec![Finding::new(
                "missing-rubric",
                Severity::Critical,
                "no reference logic available for this question",
            )],
            warnings: Vec::new(),
            successes: Vec::new(),
            success: false,
            error: Some("no reference logic available".to_string()),
        }
    }
}

/// Fixed 10/5/0 lookup over the two match flags. Never interpolated.
pub fn complexity_marks(time_match: bool, space_match: bool) -> u8 {
    match (time_match, space_match) {
        (true, true) => 10,
        (true, false) | (false, true) => 5,
        (false, false) => 0,
    }
}

/// Does the submission exhibit the approach named by a rubric tag?
fn approach_matches(tag: &str, features: &FeatureVector) -> bool {
    match tag.to_lowercase().replace('_', "-").as_str() {
        "hash-map" | "hashmap" | "hash-table" | "dictionary" => features.uses_hash_map,
        "sorting" | "sort" => features.uses_sorting,
        "two-pointers" | "two-pointer" => features.two_pointers,
        "sliding-window" => features.sliding_window,
        "binary-search" => {
            features.has_log_loop
                || features.divides_input
                || features.estimated_time_complexity == TimeComplexity::Logarithmic
        }
        "dynamic-programming" | "dp" | "memoization" => features.memoization_or_dp,
        "recursion" | "recursive" => features.recursion_detected,
        "stack" => features.uses_stack,
        "queue" => features.uses_queue,
        "graph" | "bfs" | "dfs" | "graph-traversal" => features.graph_traversal,
        "iteration" | "iterative" | "loop" => features.loop_count > 0,
        "brute-force" => features.nested_loop_count > 0,
        // Greedy has no structural signature; accept straightforward
        // iterative or simple-logic shapes.
        "greedy" => !features.recursion_detected && features.nested_loop_count == 0,
        _ => false,
    }
}

fn disallowed_finding(tag: &str, features: &FeatureVector) -> Option<Finding> {
    match tag.to_lowercase().replace('_', "-").as_str() {
        "hardcoding" | "hardcoded" if features.hardcoding_detected => Some(Finding::new(
            "hardcoding",
            Severity::Critical,
            "submission appears to hardcode expected outputs",
        )),
        "nested-loops" if features.nested_loop_count > 0 => Some(Finding::new(
            "nested-loops",
            Severity::Medium,
            "nested loops are disallowed for this question",
        )),
        "brute-force" if features.nested_loop_count > 0 => Some(Finding::new(
            "brute-force",
            Severity::Medium,
            "brute-force enumeration is disallowed for this question",
        )),
        "recursion" | "recursive" if features.recursion_detected => Some(Finding::new(
            "recursion",
            Severity::Medium,
            "recursion is disallowed for this question",
        )),
        _ => None,
    }
}

/// Compare extracted features against the reference logic.
///
/// `tac_similarity`, when supplied, is the canonical-stream similarity of
/// the submission against the model solution in [0, 1].
pub fn compare_against_reference(
    features: &FeatureVector,
    reference: Option<&ReferenceLogic>,
    tac_similarity: Option<f64>,
) -> ComparisonResult {
    let Some(reference) = reference else {
        return ComparisonResult::no_reference();
    };

    let mut issues: Vec<Finding> = Vec::new();
    let mut warnings: Vec<Finding> = Vec::new();
    let mut successes: Vec<Finding> = Vec::new();

    let detected_time = features.estimated_time_complexity;
    let detected_space = features.estimated_space_complexity;

    let time_match = detected_time == reference.expected_time_complexity
        || reference.acceptable_complexities.contains(&detected_time);
    let space_match = detected_space == reference.expected_space_complexity;

    if time_match {
        successes.push(Finding::new(
            "time-complexity",
            Severity::Info,
            format!("time complexity {} meets the rubric", detected_time),
        ));
    } else {
        issues.push(Finding::new(
            "time-complexity",
            Severity::Medium,
            format!(
                "detected time complexity {} but the rubric expects {}",
                detected_time, reference.expected_time_complexity
            ),
        ));
    }
    if space_match {
        successes.push(Finding::new(
            "space-complexity",
            Severity::Info,
            format!("space complexity {} meets the rubric", detected_space),
        ));
    } else {
        warnings.push(Finding::new(
            "space-complexity",
            Severity::Warning,
            format!(
                "detected space complexity {} but the rubric expects {}",
                detected_space, reference.expected_space_complexity
            ),
        ));
    }

    // Approach cross-reference against the allow-list.
    if !reference.allowed_approaches.is_empty() {
        let matched: Vec<&String> = reference
            .allowed_approaches
            .iter()
            .filter(|tag| approach_matches(tag, features))
            .collect();
        if matched.is_empty() {
            issues.push(Finding::new(
                "approach",
                Severity::Medium,
                format!(
                    "none of the allowed approaches ({}) were recognized in the submission",
                    reference.allowed_approaches.join(", ")
                ),
            ));
        } else {
            successes.push(Finding::new(
                "approach",
                Severity::Info,
                format!("recognized allowed approach: {}", matched[0]),
            ));
        }
    }

    // Disallowed-pattern checks.
    for tag in &reference.disallowed_patterns {
        if let Some(finding) = disallowed_finding(tag, features) {
            issues.push(finding);
        }
    }
    // Hardcoding is flagged even when the rubric does not name it.
    if features.hardcoding_detected && !issues.iter().any(|f| f.tag == "hardcoding") {
        issues.push(Finding::new(
            "hardcoding",
            Severity::Critical,
            "submission appears to hardcode expected outputs",
        ));
    }
    // Linear work where the rubric demands sublinear time.
    if reference.expected_time_complexity.rank() < TimeComplexity::Linear.rank()
        && detected_time.rank() >= TimeComplexity::Linear.rank()
        && !time_match
    {
        issues.push(Finding::new(
            "sublinear-required",
            Severity::Medium,
            format!(
                "a sublinear approach is required but the submission runs in {}",
                detected_time
            ),
        ));
    }

    // Structural constraints.
    if let Some(constraints) = &reference.constraints {
        if constraints.should_read_input == Some(true) && !features.input_dependent_logic {
            issues.push(Finding::new(
                "input-handling",
                Severity::Medium,
                "the question requires reading input but none was detected",
            ));
        }
        if constraints.should_use_loops == Some(true) && features.loop_count == 0 {
            warnings.push(Finding::new(
                "loops-expected",
                Severity::Warning,
                "the question expects an iterative solution but no loops were found",
            ));
        }
        if constraints.should_use_recursion == Some(true) && !features.recursion_detected {
            warnings.push(Finding::new(
                "recursion-expected",
                Severity::Warning,
                "the question expects a recursive solution but no recursion was found",
            ));
        }
        if let Some(min) = constraints.min_line_count {
            if features.line_count < min {
                warnings.push(Finding::new(
                    "line-count",
                    Severity::Warning,
                    format!("submission has {} lines, below the minimum {}", features.line_count, min),
                ));
            }
        }
        if let Some(max) = constraints.max_line_count {
            if features.line_count > max {
                warnings.push(Finding::new(
                    "line-count",
                    Severity::Warning,
                    format!("submission has {} lines, above the maximum {}", features.line_count, max),
                ));
            }
        }
    }

    // Canonical-structure similarity, when the caller computed one.
    if let Some(similarity) = tac_similarity {
        if similarity >= 0.8 {
            successes.push(Finding::new(
                "structure",
                Severity::Info,
                format!("canonical structure closely matches the model solution ({:.2})", similarity),
            ));
        } else if similarity < 0.3 {
            warnings.push(Finding::new(
                "structure",
                Severity::Warning,
                format!("canonical structure diverges from the model solution ({:.2})", similarity),
            ));
        }
    }

    let critical = issues.iter().filter(|f| f.severity == Severity::Critical).count() as u32;
    let medium = issues.iter().filter(|f| f.severity == Severity::Medium).count() as u32;
    let warning_count = warnings.len() as u32;
    let logic_score = 100u32
        .saturating_sub(critical * 20)
        .saturating_sub(medium * 10)
        .saturating_sub(warning_count * 5)
        .min(100) as u8;

    let algorithm_match = match issues.len() {
        0 => MatchLevel::Full,
        1 | 2 => MatchLevel::Partial,
        _ => MatchLevel::None,
    };

    ComparisonResult {
        algorithm_match,
        time_complexity_match: time_match,
        space_complexity_match: space_match,
        complexity_marks: complexity_marks(time_match, space_match),
        logic_score,
        issues,
        warnings,
        successes,
        success: true,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::complexity::SpaceComplexity;

    fn reference() -> ReferenceLogic {
        ReferenceLogic {
            question_id: "Q001".to_string(),
            expected_algorithm: "two sum via hash map".to_string(),
            allowed_approaches: vec!["hash-map".to_string()],
            disallowed_patterns: vec!["nested-loops".to_string(), "hardcoding".to_string()],
            expected_time_complexity: TimeComplexity::Linear,
            expected_space_complexity: SpaceComplexity::Linear,
            acceptable_complexities: Vec::new(),
            paradigm: None,
            constraints: None,
        }
    }

    fn matching_features() -> FeatureVector {
        FeatureVector {
            loop_count: 1,
            uses_hash_map: true,
            input_dependent_logic: true,
            estimated_time_complexity: TimeComplexity::Linear,
            estimated_space_complexity: SpaceComplexity::Linear,
            ..FeatureVector::default()
        }
    }

    #[test]
    fn complexity_marks_lookup_is_exhaustive() {
        assert_eq!(complexity_marks(true, true), 10);
        assert_eq!(complexity_marks(true, false), 5);
        assert_eq!(complexity_marks(false, true), 5);
        assert_eq!(complexity_marks(false, false), 0);
    }

    #[test]
    fn full_match_scores_clean() {
        let result = compare_against_reference(&matching_features(), Some(&reference()), None);
        assert!(result.success);
        assert_eq!(result.algorithm_match, MatchLevel::Full);
        assert!(result.time_complexity_match);
        assert!(result.space_complexity_match);
        assert_eq!(result.complexity_marks, 10);
        assert_eq!(result.logic_score, 100);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn missing_reference_fails_closed() {
        let result = compare_against_reference(&matching_features(), None, None);
        assert!(!result.success);
        assert_eq!(result.logic_score, 0);
        assert_eq!(result.complexity_marks, 0);
        assert_eq!(result.algorithm_match, MatchLevel::None);
        assert!(result.error.is_some());
    }

    #[test]
    fn nested_loops_are_debited_when_disallowed() {
        let features = FeatureVector {
            loop_count: 2,
            nested_loop_count: 1,
            uses_hash_map: true,
            estimated_time_complexity: TimeComplexity::Quadratic,
            estimated_space_complexity: SpaceComplexity::Linear,
            ..FeatureVector::default()
        };
        let result = compare_against_reference(&features, Some(&reference()), None);
        assert!(result.issues.iter().any(|f| f.tag == "nested-loops"));
        assert!(!result.time_complexity_match);
        assert_eq!(result.complexity_marks, 5);
        assert!(result.logic_score < 100);
    }

    #[test]
    fn acceptable_complexities_allow_alternates() {
        let mut rubric = reference();
        rubric.expected_time_complexity = TimeComplexity::Linearithmic;
        rubric.acceptable_complexities = vec![TimeComplexity::Linear];
        let result = compare_against_reference(&matching_features(), Some(&rubric), None);
        assert!(result.time_complexity_match);
    }

    #[test]
    fn hardcoding_is_critical_even_without_a_tag() {
        let mut rubric = reference();
        rubric.disallowed_patterns.clear();
        let features = FeatureVector {
            hardcoding_detected: true,
            constant_only_output: true,
            estimated_time_complexity: TimeComplexity::Linear,
            estimated_space_complexity: SpaceComplexity::Linear,
            uses_hash_map: true,
            loop_count: 1,
            ..FeatureVector::default()
        };
        let result = compare_against_reference(&features, Some(&rubric), None);
        let hardcoding = result.issues.iter().find(|f| f.tag == "hardcoding").unwrap();
        assert_eq!(hardcoding.severity, Severity::Critical);
        assert!(result.logic_score <= 80);
    }

    #[test]
    fn sublinear_requirement_flags_linear_scans() {
        let mut rubric = reference();
        rubric.expected_time_complexity = TimeComplexity::Logarithmic;
        rubric.expected_space_complexity = SpaceComplexity::Constant;
        rubric.allowed_approaches = vec!["binary-search".to_string()];
        let features = FeatureVector {
            loop_count: 1,
            input_dependent_logic: true,
            estimated_time_complexity: TimeComplexity::Linear,
            ..FeatureVector::default()
        };
        let result = compare_against_reference(&features, Some(&rubric), None);
        assert!(result.issues.iter().any(|f| f.tag == "sublinear-required"));
    }

    #[test]
    fn algorithm_match_degrades_with_issue_count() {
        let mut rubric = reference();
        rubric.expected_time_complexity = TimeComplexity::Logarithmic;
        rubric.expected_space_complexity = SpaceComplexity::Constant;
        rubric.allowed_approaches = vec!["binary-search".to_string()];
        // Linear scan with nested loops: approach miss + time miss +
        // sublinear + nested-loops is more than two issues.
        let features = FeatureVector {
            loop_count: 2,
            nested_loop_count: 1,
            estimated_time_complexity: TimeComplexity::Quadratic,
            ..FeatureVector::default()
        };
        let result = compare_against_reference(&features, Some(&rubric), None);
        assert_eq!(result.algorithm_match, MatchLevel::None);
    }

    #[test]
    fn tac_similarity_annotates_but_never_panics() {
        let high = compare_against_reference(&matching_features(), Some(&reference()), Some(0.95));
        assert!(high.successes.iter().any(|f| f.tag == "structure"));
        let low = compare_against_reference(&matching_features(), Some(&reference()), Some(0.1));
        assert!(low.warnings.iter().any(|f| f.tag == "structure"));
    }

    #[test]
    fn constraints_are_checked() {
        let mut rubric = reference();
        rubric.constraints = Some(crate::reference::Constraints {
            should_read_input: Some(true),
            should_use_loops: Some(true),
            should_use_recursion: None,
            min_line_count: Some(3),
            max_line_count: None,
        });
        let features = FeatureVector {
            estimated_time_complexity: TimeComplexity::Linear,
            estimated_space_complexity: SpaceComplexity::Linear,
            uses_hash_map: true,
            line_count: 1,
            ..FeatureVector::default()
        };
        let result = compare_against_reference(&features, Some(&rubric), None);
        assert!(result.issues.iter().any(|f| f.tag == "input-handling"));
        assert!(result.warnings.iter().any(|f| f.tag == "loops-expected"));
        assert!(result.warnings.iter().any(|f| f.tag == "line-count"));
    }
}
