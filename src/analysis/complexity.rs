/// Asymptotic complexity classes and the rule-based estimator.
///
/// Both enums are closed: anything read from free text goes through
/// `normalize`, which collapses unknown shapes to the nearest conservative
/// member and is idempotent.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::features::FeatureVector;

/// Time complexity classes, ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeComplexity {
    #[serde(rename = "O(1)")]
    Constant,
    #[serde(rename = "O(log n)")]
    Logarithmic,
    #[serde(rename = "O(n)")]
    Linear,
    #[serde(rename = "O(n log n)")]
    Linearithmic,
    #[serde(rename = "O(n²)")]
    Quadratic,
    #[serde(rename = "O(2ⁿ)")]
    Exponential,
}

/// Space complexity classes, ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceComplexity {
    #[serde(rename = "O(1)")]
    Constant,
    #[serde(rename = "O(log n)")]
    Logarithmic,
    #[serde(rename = "O(n)")]
    Linear,
}

impl Default for TimeComplexity {
    fn default() -> Self {
        Self::Constant
    }
}

impl Default for SpaceComplexity {
    fn default() -> Self {
        Self::Constant
    }
}

impl std::fmt::Display for TimeComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Constant => "O(1)",
            Self::Logarithmic => "O(log n)",
            Self::Linear => "O(n)",
            Self::Linearithmic => "O(n log n)",
            Self::Quadratic => "O(n²)",
            Self::Exponential => "O(2ⁿ)",
        };
        write!(f, "{}", s)
    }
}

impl std::fmt::Display for SpaceComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Constant => "O(1)",
            Self::Logarithmic => "O(log n)",
            Self::Linear => "O(n)",
        };
        write!(f, "{}", s)
    }
}

// n^k with k >= 2, in caret or superscript spelling
static POLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"n\s*(?:\^\s*([2-9]|[1-9]\d+)|[²³])|n\s*\*\s*n").expect("poly regex"));
static EXP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"2\s*(?:\^|\*\*)\s*n|2ⁿ|k\s*\^\s*n|exponential").expect("exp regex"));
static LINEARITHMIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"n\s*\*?\s*log|linearithmic").expect("nlogn regex"));
static LINEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bn\b|linear").expect("linear regex"));

impl TimeComplexity {
    /// Position in the fixed worst-case ordering.
    pub fn rank(self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::Logarithmic => 1,
            Self::Linear => 2,
            Self::Linearithmic => 3,
            Self::Quadratic => 4,
            Self::Exponential => 5,
        }
    }

    /// Coerce a free-text complexity expression into the closed enum.
    ///
    /// The ladder is checked from most to least expensive so `n log n` is not
    /// swallowed by the bare-`n` pattern. Unknown text collapses to `O(1)`.
    pub fn normalize(text: &str) -> Self {
        let t = text.trim().to_lowercase();
        if EXP_RE.is_match(&t) {
            Self::Exponential
        } else if POLY_RE.is_match(&t) || t.contains("quadratic") {
            Self::Quadratic
        } else if LINEARITHMIC_RE.is_match(&t) {
            Self::Linearithmic
        } else if t.contains("log") {
            Self::Logarithmic
        } else if LINEAR_RE.is_match(&t) {
            Self::Linear
        } else {
            Self::Constant
        }
    }
}

impl SpaceComplexity {
    pub fn rank(self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::Logarithmic => 1,
            Self::Linear => 2,
        }
    }

    /// Free-text coercion for the three-member space enum. Quadratic-or-worse
    /// shapes collapse conservatively to `O(n)`.
    pub fn normalize(text: &str) -> Self {
        let t = text.trim().to_lowercase();
        if t.contains("log") && !LINEARITHMIC_RE.is_match(&t) {
            Self::Logarithmic
        } else if LINEAR_RE.is_match(&t)
            || POLY_RE.is_match(&t)
            || EXP_RE.is_match(&t)
            || LINEARITHMIC_RE.is_match(&t)
        {
            Self::Linear
        } else {
            Self::Constant
        }
    }
}

impl std::str::FromStr for TimeComplexity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl std::str::FromStr for SpaceComplexity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

/// Estimate time complexity from structural features.
///
/// Each rule contributes a candidate class; the result is the worst case in
/// the fixed ordering. Pure and independent of field evaluation order.
pub fn estimate_time(f: &FeatureVector) -> TimeComplexity {
    let mut candidates: Vec<TimeComplexity> = Vec::new();
    let memoized = f.memoization_or_dp || f.dynamic_programming;

    if f.recursion_detected {
        if memoized {
            // Memoization caps the recursion at one visit per subproblem.
            candidates.push(TimeComplexity::Linear);
        } else if f.divides_input {
            let halving_only = f.loop_count == 0 || (f.loop_count <= 1 && f.has_log_loop);
            candidates.push(if halving_only {
                TimeComplexity::Logarithmic
            } else {
                // Linear combine work at each division level.
                TimeComplexity::Linearithmic
            });
        } else {
            candidates.push(TimeComplexity::Exponential);
        }
    }

    if f.uses_sorting {
        candidates.push(TimeComplexity::Linearithmic);
    }

    if f.nested_loop_count > 0 {
        candidates.push(TimeComplexity::Quadratic);
    }

    if f.loop_count >= 1 {
        if f.loop_count == 1
            && f.nested_loop_count == 0
            && f.has_log_loop
            && !f.recursion_detected
        {
            candidates.push(TimeComplexity::Logarithmic);
        } else {
            candidates.push(TimeComplexity::Linear);
        }
    }

    candidates
        .into_iter()
        .max_by_key(|c| c.rank())
        .unwrap_or(TimeComplexity::Constant)
}

/// Estimate auxiliary space complexity from structural features.
pub fn estimate_space(f: &FeatureVector) -> SpaceComplexity {
    let auxiliary_structure = f.uses_hash_map
        || f.uses_stack
        || f.uses_queue
        || f.memoization_or_dp
        || f.dynamic_programming;

    if auxiliary_structure {
        SpaceComplexity::Linear
    } else if f.recursion_detected && f.divides_input {
        // Call-stack depth of the divide-and-conquer recursion.
        SpaceComplexity::Logarithmic
    } else {
        SpaceComplexity::Constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector::default()
    }

    #[test]
    fn no_loops_no_recursion_is_constant() {
        assert_eq!(estimate_time(&features()), TimeComplexity::Constant);
    }

    #[test]
    fn single_plain_loop_is_linear() {
        let f = FeatureVector {
            loop_count: 1,
            ..features()
        };
        assert_eq!(estimate_time(&f), TimeComplexity::Linear);
    }

    #[test]
    fn halving_loop_is_logarithmic() {
        let f = FeatureVector {
            loop_count: 1,
            has_log_loop: true,
            ..features()
        };
        assert_eq!(estimate_time(&f), TimeComplexity::Logarithmic);
    }

    #[test]
    fn nested_loops_are_quadratic() {
        let f = FeatureVector {
            loop_count: 2,
            nested_loop_count: 1,
            ..features()
        };
        assert_eq!(estimate_time(&f), TimeComplexity::Quadratic);
    }

    #[test]
    fn sorting_escalates_to_quadratic_under_nesting() {
        let sorted = FeatureVector {
            uses_sorting: true,
            ..features()
        };
        assert_eq!(estimate_time(&sorted), TimeComplexity::Linearithmic);

        let nested = FeatureVector {
            uses_sorting: true,
            loop_count: 2,
            nested_loop_count: 1,
            ..features()
        };
        assert_eq!(estimate_time(&nested), TimeComplexity::Quadratic);
    }

    #[test]
    fn plain_recursion_is_exponential() {
        let f = FeatureVector {
            recursion_detected: true,
            ..features()
        };
        assert_eq!(estimate_time(&f), TimeComplexity::Exponential);
    }

    #[test]
    fn memoized_recursion_overrides_exponential() {
        let f = FeatureVector {
            recursion_detected: true,
            memoization_or_dp: true,
            ..features()
        };
        assert_eq!(estimate_time(&f), TimeComplexity::Linear);
    }

    #[test]
    fn divide_and_conquer_without_combine_work_is_logarithmic() {
        let f = FeatureVector {
            recursion_detected: true,
            divides_input: true,
            ..features()
        };
        assert_eq!(estimate_time(&f), TimeComplexity::Logarithmic);
    }

    #[test]
    fn divide_and_conquer_with_linear_combine_is_linearithmic() {
        let f = FeatureVector {
            recursion_detected: true,
            divides_input: true,
            loop_count: 1,
            ..features()
        };
        assert_eq!(estimate_time(&f), TimeComplexity::Linearithmic);
    }

    #[test]
    fn space_rules() {
        let map = FeatureVector {
            uses_hash_map: true,
            ..features()
        };
        assert_eq!(estimate_space(&map), SpaceComplexity::Linear);

        let dnc = FeatureVector {
            recursion_detected: true,
            divides_input: true,
            ..features()
        };
        assert_eq!(estimate_space(&dnc), SpaceComplexity::Logarithmic);

        assert_eq!(estimate_space(&features()), SpaceComplexity::Constant);
    }

    #[test]
    fn normalize_ladder() {
        assert_eq!(TimeComplexity::normalize("O(2^n)"), TimeComplexity::Exponential);
        assert_eq!(TimeComplexity::normalize("2**n"), TimeComplexity::Exponential);
        assert_eq!(TimeComplexity::normalize("O(n^2)"), TimeComplexity::Quadratic);
        assert_eq!(TimeComplexity::normalize("O(n^3)"), TimeComplexity::Quadratic);
        assert_eq!(TimeComplexity::normalize("n*n"), TimeComplexity::Quadratic);
        assert_eq!(TimeComplexity::normalize("O(n log n)"), TimeComplexity::Linearithmic);
        assert_eq!(TimeComplexity::normalize("nlogn"), TimeComplexity::Linearithmic);
        assert_eq!(TimeComplexity::normalize("O(log n)"), TimeComplexity::Logarithmic);
        assert_eq!(TimeComplexity::normalize("O(n)"), TimeComplexity::Linear);
        assert_eq!(TimeComplexity::normalize("linear"), TimeComplexity::Linear);
        assert_eq!(TimeComplexity::normalize("O(1)"), TimeComplexity::Constant);
        assert_eq!(TimeComplexity::normalize("constant"), TimeComplexity::Constant);
        assert_eq!(TimeComplexity::normalize("banana"), TimeComplexity::Constant);
    }

    #[test]
    fn normalize_is_idempotent_over_display() {
        let all = [
            TimeComplexity::Constant,
            TimeComplexity::Logarithmic,
            TimeComplexity::Linear,
            TimeComplexity::Linearithmic,
            TimeComplexity::Quadratic,
            TimeComplexity::Exponential,
        ];
        for c in all {
            let once = TimeComplexity::normalize(&c.to_string());
            let twice = TimeComplexity::normalize(&once.to_string());
            assert_eq!(once, c);
            assert_eq!(twice, once);
        }
        let space = [
            SpaceComplexity::Constant,
            SpaceComplexity::Logarithmic,
            SpaceComplexity::Linear,
        ];
        for c in space {
            assert_eq!(SpaceComplexity::normalize(&c.to_string()), c);
        }
    }

    #[test]
    fn space_normalize_collapses_quadratic_to_linear() {
        assert_eq!(SpaceComplexity::normalize("O(n^2)"), SpaceComplexity::Linear);
        assert_eq!(SpaceComplexity::normalize("O(n log n)"), SpaceComplexity::Linear);
        assert_eq!(SpaceComplexity::normalize("O(log n)"), SpaceComplexity::Logarithmic);
        assert_eq!(SpaceComplexity::normalize("O(1)"), SpaceComplexity::Constant);
    }

    #[test]
    fn monotone_when_nested_loop_added() {
        let base = FeatureVector {
            loop_count: 1,
            ..features()
        };
        let nested = FeatureVector {
            loop_count: 2,
            nested_loop_count: 1,
            ..base.clone()
        };
        assert!(estimate_time(&nested).rank() >= estimate_time(&base).rank());
    }

    #[test]
    fn serde_uses_canonical_strings() {
        let json = serde_json::to_string(&TimeComplexity::Quadratic).unwrap();
        assert_eq!(json, "\"O(n²)\"");
        let back: TimeComplexity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TimeComplexity::Quadratic);
    }
}
