/// Similarity scoring between two canonicalized instruction streams.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::tac::normalizer::normalize_tac;
use crate::tac::TacInstruction;

/// Cap on the LCS table size; streams beyond this are truncated to keep the
/// quadratic table bounded. Student submissions never get close.
const MAX_LCS_LINES: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacComparison {
    pub tac_match: bool,
    pub similarity: f64,
    pub mismatch_reasons: Vec<String>,
}

/// Compare two instruction streams after canonicalization.
///
/// `similarity = 0.5·Jaccard(lineSets) + 0.5·(2·LCS)/(|A|+|B|)`, in [0, 1].
/// Two empty streams are trivially identical (similarity 1.0).
pub fn compare_tac(a: &[TacInstruction], b: &[TacInstruction]) -> TacComparison {
    let lines_a: Vec<String> = normalize_tac(a).iter().map(|i| i.to_string()).collect();
    let lines_b: Vec<String> = normalize_tac(b).iter().map(|i| i.to_string()).collect();

    let set_a: HashSet<&str> = lines_a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = lines_b.iter().map(String::as_str).collect();

    let jaccard = if set_a.is_empty() && set_b.is_empty() {
        1.0
    } else {
        let intersection = set_a.intersection(&set_b).count() as f64;
        let union = set_a.union(&set_b).count() as f64;
        intersection / union
    };

    let lcs_ratio = if lines_a.is_empty() && lines_b.is_empty() {
        1.0
    } else {
        let lcs = lcs_length(&lines_a, &lines_b) as f64;
        (2.0 * lcs) / (lines_a.len() + lines_b.len()) as f64
    };

    let similarity = 0.5 * jaccard + 0.5 * lcs_ratio;
    let tac_match = similarity >= 1.0;

    let mut mismatch_reasons = Vec::new();
    for line in lines_a.iter().filter(|l| !set_b.contains(l.as_str())).take(5) {
        mismatch_reasons.push(format!("only in first: {}", line));
    }
    for line in lines_b.iter().filter(|l| !set_a.contains(l.as_str())).take(5) {
        mismatch_reasons.push(format!("only in second: {}", line));
    }

    TacComparison {
        tac_match,
        similarity,
        mismatch_reasons,
    }
}

/// Exact longest-common-subsequence length, standard O(|A|·|B|) table.
fn lcs_length(a: &[String], b: &[String]) -> usize {
    let a = &a[..a.len().min(MAX_LCS_LINES)];
    let b = &b[..b.len().min(MAX_LCS_LINES)];
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for item_a in a {
        for (j, item_b) in b.iter().enumerate() {
            current[j + 1] = if item_a == item_b {
                prev[j] + 1
            } else {
                prev[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}
