/// Final verdict fusion: rule results, external test execution, and
/// security posture combine into one trust-weighted decision.
///
/// The engine is pure over its inputs and tolerant of any subset of them
/// being absent. The AI explanation is carried through verbatim and is
/// never consulted for the score, the trust score, or the decision.
use serde::{Deserialize, Serialize};

use crate::grading::comparator::{ComparisonResult, MatchLevel};

/// External test-execution outcome, produced by the sandbox collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestExecutionResult {
    pub total_tests: u32,
    pub passed_tests: u32,
    /// Some collaborators report a count, others a list of failed cases.
    #[serde(deserialize_with = "count_or_list")]
    pub failed_tests: u32,
    /// Percentage in [0, 100].
    pub pass_rate: f64,
    pub execution_error: Option<String>,
    pub timeout_occurred: bool,
}

impl Default for TestExecutionResult {
    fn default() -> Self {
        Self {
            total_tests: 0,
            passed_tests: 0,
            failed_tests: 0,
            pass_rate: 0.0,
            execution_error: None,
            timeout_occurred: false,
        }
    }
}

fn count_or_list<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CountOrList {
        Count(u32),
        List(Vec<serde_json::Value>),
    }
    Ok(match CountOrList::deserialize(deserializer)? {
        CountOrList::Count(n) => n,
        CountOrList::List(items) => items.len() as u32,
    })
}

/// A recorded security event; only the count feeds the scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    pub kind: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Opaque AI explanation, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiExplanation {
    pub explanation: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Correct,
    Acceptable,
    NeedsImprovement,
    Incorrect,
}

/// Sub-records of the stages that actually contributed to a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictComponents {
    pub rules: Option<RuleComponent>,
    pub tests: Option<TestComponent>,
    pub security: SecurityComponent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleComponent {
    pub algorithm_match: MatchLevel,
    pub complexity_marks: u8,
    pub logic_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestComponent {
    pub total_tests: u32,
    pub passed_tests: u32,
    pub pass_rate: f64,
    pub execution_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityComponent {
    pub event_count: usize,
}

/// Final evaluation verdict. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub decision: Decision,
    pub score: u8,
    pub trust_score: u8,
    pub components: VerdictComponents,
    pub issues: Vec<String>,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
    pub ai_explanation: Option<AiExplanation>,
}

/// Inputs to one verdict fusion.
#[derive(Debug, Clone, Default)]
pub struct VerdictInput<'a> {
    pub rule_result: Option<&'a ComparisonResult>,
    pub test_result: Option<&'a TestExecutionResult>,
    pub security_events: &'a [SecurityEvent],
    pub ai_explanation: Option<AiExplanation>,
}

/// Effective pass rate: a sandbox failure zeroes the test signal.
fn effective_pass_rate(tests: &TestExecutionResult) -> f64 {
    if tests.execution_error.is_some() || tests.timeout_occurred {
        0.0
    } else {
        tests.pass_rate.clamp(0.0, 100.0)
    }
}

fn rule_consistency_band(rules: &ComparisonResult) -> f64 {
    if !rules.success {
        return 10.0;
    }
    match rules.algorithm_match {
        MatchLevel::Full => 100.0,
        MatchLevel::Partial => 60.0,
        MatchLevel::None => 25.0,
    }
}

fn test_band(tests: &TestExecutionResult) -> f64 {
    if tests.execution_error.is_some() || tests.timeout_occurred {
        return 0.0;
    }
    let rate = tests.pass_rate.clamp(0.0, 100.0);
    if rate >= 90.0 {
        100.0
    } else if rate >= 70.0 {
        75.0
    } else if rate >= 40.0 {
        50.0
    } else if rate > 0.0 {
        25.0
    } else {
        10.0
    }
}

fn security_band(event_count: usize) -> f64 {
    match event_count {
        0 => 100.0,
        1 | 2 => 60.0,
        _ => 20.0,
    }
}

/// Fuse the available signals into the final verdict.
pub fn generate_final_verdict(input: &VerdictInput<'_>) -> Verdict {
    let pass_rate = input.test_result.map(effective_pass_rate).unwrap_or(0.0);
    let logic_score = input.rule_result.map(|r| r.logic_score as f64).unwrap_or(0.0);
    let marks = input.rule_result.map(|r| r.complexity_marks as f64).unwrap_or(0.0);

    let score = (0.70 * pass_rate + 0.20 * logic_score + marks)
        .round()
        .clamp(0.0, 100.0) as u8;

    // Trust: mean of the independently-banded factors actually present.
    let mut factors: Vec<f64> = Vec::new();
    if let Some(rules) = input.rule_result {
        factors.push(rule_consistency_band(rules));
    }
    if let Some(tests) = input.test_result {
        factors.push(test_band(tests));
    }
    factors.push(security_band(input.security_events.len()));
    let trust_score = (factors.iter().sum::<f64>() / factors.len() as f64)
        .round()
        .clamp(0.0, 100.0) as u8;

    // Decision: weighted indicator ratio over the present indicators.
    // AI data is excluded by construction.
    let mut weighted = 0.0f64;
    let mut weight_total = 0.0f64;
    if input.test_result.is_some() {
        weighted += 0.50 * (pass_rate / 100.0);
        weight_total += 0.50;
    }
    if input.rule_result.is_some() {
        weighted += 0.30 * (logic_score / 100.0);
        weighted += 0.20 * (marks / 10.0);
        weight_total += 0.50;
    }
    let ratio = if weight_total > 0.0 {
        weighted / weight_total
    } else {
        0.0
    };
    let decision = if ratio >= 0.85 {
        Decision::Correct
    } else if ratio >= 0.65 {
        Decision::Acceptable
    } else if ratio >= 0.40 {
        Decision::NeedsImprovement
    } else {
        Decision::Incorrect
    };

    let mut issues: Vec<String> = Vec::new();
    let mut strengths: Vec<String> = Vec::new();
    let mut recommendations: Vec<String> = Vec::new();

    if let Some(rules) = input.rule_result {
        for finding in &rules.issues {
            issues.push(finding.message.clone());
        }
        for finding in &rules.warnings {
            issues.push(finding.message.clone());
        }
        for finding in &rules.successes {
            strengths.push(finding.message.clone());
        }
        if !rules.time_complexity_match && rules.success {
            recommendations
                .push("revisit the algorithm choice to meet the expected time complexity".to_string());
        }
        if rules.error.is_some() {
            recommendations.push("submission could not be graded against a rubric".to_string());
        }
    } else {
        issues.push("no rule-based analysis was available".to_string());
    }

    if let Some(tests) = input.test_result {
        if let Some(error) = &tests.execution_error {
            issues.push(format!("test execution failed: {}", error));
            recommendations.push("fix the runtime error before resubmitting".to_string());
        } else if tests.timeout_occurred {
            issues.push("test execution timed out".to_string());
            recommendations.push("reduce the running time of the solution".to_string());
        } else if tests.pass_rate >= 100.0 {
            strengths.push(format!("all {} tests passed", tests.total_tests));
        } else {
            issues.push(format!(
                "{} of {} tests failed",
                tests.failed_tests, tests.total_tests
            ));
            recommendations.push("fix the failing test cases".to_string());
        }
    } else {
        issues.push("no test execution results were available".to_string());
    }

    if !input.security_events.is_empty() {
        issues.push(format!(
            "{} security event(s) recorded during evaluation",
            input.security_events.len()
        ));
        recommendations.push("remove unsafe or disallowed operations".to_string());
    }

    Verdict {
        decision,
        score,
        trust_score,
        components: VerdictComponents {
            rules: input.rule_result.map(|r| RuleComponent {
                algorithm_match: r.algorithm_match,
                complexity_marks: r.complexity_marks,
                logic_score: r.logic_score,
            }),
            tests: input.test_result.map(|t| TestComponent {
                total_tests: t.total_tests,
                passed_tests: t.passed_tests,
                pass_rate: t.pass_rate,
                execution_failed: t.execution_error.is_some() || t.timeout_occurred,
            }),
            security: SecurityComponent {
                event_count: input.security_events.len(),
            },
        },
        issues,
        strengths,
        recommendations,
        ai_explanation: input.ai_explanation.clone(),
    }
}
