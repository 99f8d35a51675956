/// Canonical structural description of a submission.
///
/// A `FeatureVector` is produced once per extraction call, is immutable once
/// returned, and is always fully populated: every extraction path (AST,
/// regex fallback, defaults on unusable input) fills every field.
use serde::{Deserialize, Serialize};

use crate::analysis::complexity::{SpaceComplexity, TimeComplexity};

/// Dominant algorithmic paradigm detected in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Paradigm {
    DynamicProgramming,
    Recursion,
    GraphTraversal,
    StackBased,
    QueueBased,
    Sorting,
    HashMap,
    TwoPointers,
    SlidingWindow,
    BruteForce,
    Iterative,
    SimpleLogic,
}

impl Default for Paradigm {
    fn default() -> Self {
        Paradigm::SimpleLogic
    }
}

impl std::fmt::Display for Paradigm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::DynamicProgramming => "dynamic-programming",
            Self::Recursion => "recursion",
            Self::GraphTraversal => "graph-traversal",
            Self::StackBased => "stack-based",
            Self::QueueBased => "queue-based",
            Self::Sorting => "sorting",
            Self::HashMap => "hash-map",
            Self::TwoPointers => "two-pointers",
            Self::SlidingWindow => "sliding-window",
            Self::BruteForce => "brute-force",
            Self::Iterative => "iterative",
            Self::SimpleLogic => "simple-logic",
        };
        write!(f, "{}", name)
    }
}

/// Structural feature vector for one submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureVector {
    pub loop_count: u32,
    pub nested_loop_count: u32,
    pub conditional_count: u32,

    pub recursion_detected: bool,
    pub uses_sorting: bool,
    pub uses_hash_map: bool,
    pub uses_stack: bool,
    pub uses_queue: bool,
    pub array_manipulation: bool,
    pub graph_traversal: bool,
    pub dynamic_programming: bool,
    pub two_pointers: bool,
    pub sliding_window: bool,
    pub has_log_loop: bool,
    pub divides_input: bool,
    pub memoization_or_dp: bool,
    pub constant_only_output: bool,
    pub input_dependent_logic: bool,
    pub hardcoding_detected: bool,

    pub estimated_time_complexity: TimeComplexity,
    pub estimated_space_complexity: SpaceComplexity,
    pub paradigm: Paradigm,

    pub line_count: usize,
    pub character_count: usize,
}

impl FeatureVector {
    /// All-defaults vector carrying only the size metadata of the input.
    /// Used when the source is empty or no extraction strategy applies.
    pub fn defaults_for(code: &str) -> Self {
        Self {
            line_count: code.lines().count(),
            character_count: code.chars().count(),
            ..Self::default()
        }
    }

    /// Classify the dominant paradigm from the boolean/count fields.
    /// Fixed priority order so the result is deterministic.
    pub fn classify_paradigm(&self) -> Paradigm {
        if self.dynamic_programming || self.memoization_or_dp {
            Paradigm::DynamicProgramming
        } else if self.recursion_detected {
            Paradigm::Recursion
        } else if self.graph_traversal {
            Paradigm::GraphTraversal
        } else if self.uses_stack {
            Paradigm::StackBased
        } else if self.uses_queue {
            Paradigm::QueueBased
        } else if self.uses_sorting {
            Paradigm::Sorting
        } else if self.uses_hash_map {
            Paradigm::HashMap
        } else if self.two_pointers {
            Paradigm::TwoPointers
        } else if self.sliding_window {
            Paradigm::SlidingWindow
        } else if self.nested_loop_count > 0 {
            Paradigm::BruteForce
        } else if self.loop_count > 0 {
            Paradigm::Iterative
        } else {
            Paradigm::SimpleLogic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vector_is_fully_populated_and_safe() {
        let v = FeatureVector::default();
        assert_eq!(v.loop_count, 0);
        assert_eq!(v.nested_loop_count, 0);
        assert_eq!(v.conditional_count, 0);
        assert!(!v.recursion_detected);
        assert_eq!(v.estimated_time_complexity, TimeComplexity::Constant);
        assert_eq!(v.estimated_space_complexity, SpaceComplexity::Constant);
        assert_eq!(v.paradigm, Paradigm::SimpleLogic);
    }

    #[test]
    fn defaults_for_keeps_size_metadata() {
        let v = FeatureVector::defaults_for("a\nb\nc");
        assert_eq!(v.line_count, 3);
        assert_eq!(v.character_count, 5);
        assert_eq!(v.loop_count, 0);
    }

    #[test]
    fn paradigm_priority_prefers_dp_over_recursion() {
        let v = FeatureVector {
            recursion_detected: true,
            memoization_or_dp: true,
            ..Default::default()
        };
        assert_eq!(v.classify_paradigm(), Paradigm::DynamicProgramming);
    }

    #[test]
    fn paradigm_falls_back_to_iterative_then_simple() {
        let looped = FeatureVector {
            loop_count: 1,
            ..Default::default()
        };
        assert_eq!(looped.classify_paradigm(), Paradigm::Iterative);
        assert_eq!(
            FeatureVector::default().classify_paradigm(),
            Paradigm::SimpleLogic
        );
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let json = serde_json::to_string(&FeatureVector::default()).unwrap();
        assert!(json.contains("\"loopCount\""));
        assert!(json.contains("\"estimatedTimeComplexity\""));
        assert!(json.contains("\"usesHashMap\""));
    }
}
