/// Regex/keyword feature extraction: the degraded strategy.
///
/// Used when the AST path declines a submission (syntax errors, unsupported
/// input). Produces the identical `FeatureVector` contract from per-language
/// keyword tables; counts come from word-boundary keyword matches, nesting
/// from brace or indentation depth. The boolean idiom fields share their
/// tables with the AST path, so the two strategies agree wherever the
/// submission is well formed.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::ast::languages::Language;
use crate::analysis::complexity::{estimate_space, estimate_time};
use crate::analysis::features::FeatureVector;
use crate::analysis::idioms;

static LOOP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:for|while)\b").expect("loop regex"));
static CONDITIONAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:if|elif|case)\b").expect("conditional regex"));

static PY_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*def\s+(\w+)").expect("py def regex"));
static JS_FUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\s+(\w+)").expect("js function regex"));
static JS_ARROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+(\w+)\s*=\s*(?:function\b|\(|\w+\s*=>)")
        .expect("js arrow regex")
});
static C_STYLE_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:[\w<>\[\],&*.:]+\s+)+(\w+)\s*\([^;{)]*\)\s*\{")
        .expect("c-style def regex")
});

const NON_FUNCTION_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "new",
];

pub struct RegexFeatureExtractor;

impl RegexFeatureExtractor {
    pub fn extract(code: &str, language: Language) -> FeatureVector {
        if code.trim().is_empty() {
            return FeatureVector::defaults_for(code);
        }

        let stripped = strip_comments(code, language);
        let (loop_count, nested_loop_count) = count_loops(&stripped, language);
        let conditional_count = stripped
            .lines()
            .map(|line| CONDITIONAL_RE.find_iter(line).count() as u32)
            .sum();

        let recursion_detected = detect_recursion(&stripped, language);
        let halving = idioms::HALVING_RE.is_match(&stripped);
        let has_log_loop = loop_count > 0 && halving;
        let divides_input = recursion_detected && halving;

        let mut v = FeatureVector {
            loop_count,
            nested_loop_count,
            conditional_count,
            recursion_detected,
            has_log_loop,
            divides_input,
            uses_sorting: idioms::uses_sorting(code, language),
            uses_hash_map: idioms::uses_hash_map(code, language),
            uses_stack: idioms::uses_stack(code, language),
            uses_queue: idioms::uses_queue(code, language),
            array_manipulation: idioms::array_manipulation(code, language),
            graph_traversal: idioms::graph_traversal(code),
            memoization_or_dp: idioms::memoization_or_dp(code, language),
            sliding_window: idioms::sliding_window(code),
            input_dependent_logic: idioms::input_dependent_logic(code, language),
            constant_only_output: idioms::constant_only_output(code, language),
            line_count: code.lines().count(),
            character_count: code.chars().count(),
            ..FeatureVector::default()
        };
        v.dynamic_programming =
            v.memoization_or_dp && (v.loop_count > 0 || v.recursion_detected);
        v.two_pointers = idioms::two_pointers(code, v.loop_count > 0);
        v.hardcoding_detected = idioms::hardcoding_detected(code, language, v.conditional_count);
        v.paradigm = v.classify_paradigm();
        v.estimated_time_complexity = estimate_time(&v);
        v.estimated_space_complexity = estimate_space(&v);
        v
    }
}

/// Blank out comments while preserving line structure, so the keyword
/// counters and nesting scan never read commented-out code.
fn strip_comments(code: &str, language: Language) -> String {
    let mut out = String::with_capacity(code.len());
    let mut in_string: Option<char> = None;
    let mut in_block_comment = false;
    let mut in_line_comment = false;
    let mut escaped = false;
    let block_comments = language != Language::Python;
    let line_comment_start: &str = match language {
        Language::Python => "#",
        _ => "//",
    };

    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            in_line_comment = false;
            escaped = false;
            out.push('\n');
            continue;
        }
        if in_line_comment {
            out.push(' ');
            continue;
        }
        if in_block_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                out.push_str("  ");
                in_block_comment = false;
            } else {
                out.push(' ');
            }
            continue;
        }
        if let Some(quote) = in_string {
            // Blank string contents so quoted keywords never reach the
            // counters; keep the closing quote for delimiter sanity.
            if escaped {
                escaped = false;
                out.push(' ');
            } else if c == '\\' {
                escaped = true;
                out.push(' ');
            } else if c == quote {
                in_string = None;
                out.push(quote);
            } else {
                out.push(' ');
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                in_string = Some(c);
                out.push(c);
            }
            '#' if line_comment_start == "#" => {
                in_line_comment = true;
                out.push(' ');
            }
            '/' if line_comment_start == "//" && chars.peek() == Some(&'/') => {
                chars.next();
                in_line_comment = true;
                out.push_str("  ");
            }
            '/' if block_comments && chars.peek() == Some(&'*') => {
                chars.next();
                in_block_comment = true;
                out.push_str("  ");
            }
            _ => out.push(c),
        }
    }
    out
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Count loops and structurally nested loops from brace depth (C-family)
/// or indentation (Python).
fn count_loops(stripped: &str, language: Language) -> (u32, u32) {
    let mut loop_count = 0u32;
    let mut nested = 0u32;

    if language == Language::Python {
        let mut open_loops: Vec<usize> = Vec::new();
        for line in stripped.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let indent = indent_of(line);
            while open_loops.last().is_some_and(|&top| indent <= top) {
                open_loops.pop();
            }
            if LOOP_RE.is_match(line) {
                loop_count += 1;
                if !open_loops.is_empty() {
                    nested += 1;
                }
                open_loops.push(indent);
            }
        }
    } else {
        let mut depth = 0i32;
        let mut open_loops: Vec<i32> = Vec::new();
        for line in stripped.lines() {
            if LOOP_RE.is_match(line) {
                loop_count += 1;
                if !open_loops.is_empty() {
                    nested += 1;
                }
                open_loops.push(depth);
            }
            for c in line.chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            while open_loops.last().is_some_and(|&top| depth <= top) {
                open_loops.pop();
            }
        }
    }
    (loop_count, nested)
}

fn declared_function_names(stripped: &str, language: Language) -> Vec<String> {
    let mut names = Vec::new();
    let mut push = |name: &str| {
        if !NON_FUNCTION_NAMES.contains(&name) && !names.iter().any(|n: &String| n == name) {
            names.push(name.to_string());
        }
    };
    match language {
        Language::Python => {
            for cap in PY_DEF_RE.captures_iter(stripped) {
                push(&cap[1]);
            }
        }
        Language::JavaScript => {
            for cap in JS_FUNCTION_RE.captures_iter(stripped) {
                push(&cap[1]);
            }
            for cap in JS_ARROW_RE.captures_iter(stripped) {
                push(&cap[1]);
            }
        }
        Language::Java | Language::Cpp => {
            for cap in C_STYLE_DEF_RE.captures_iter(stripped) {
                push(&cap[1]);
            }
        }
    }
    names
}

/// Direct recursion: a declared function name invoked beyond its own
/// declaration site.
fn detect_recursion(stripped: &str, language: Language) -> bool {
    for name in declared_function_names(stripped, language) {
        let call = match Regex::new(&format!(r"\b{}\s*\(", regex::escape(&name))) {
            Ok(re) => re,
            Err(_) => continue,
        };
        if call.find_iter(stripped).count() >= 2 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::complexity::TimeComplexity;

    #[test]
    fn total_on_garbage() {
        let v = RegexFeatureExtractor::extract("\u{0}ÿÿ not code at all {{{", Language::Python);
        assert_eq!(v.loop_count, 0);
        assert_eq!(v.conditional_count, 0);
        assert!(!v.recursion_detected);
        assert_eq!(v.estimated_time_complexity, TimeComplexity::Constant);
    }

    #[test]
    fn nested_loops_from_indentation() {
        let code = "for i in range(n):\n    for j in range(n):\n        pass\n";
        let v = RegexFeatureExtractor::extract(code, Language::Python);
        assert_eq!(v.loop_count, 2);
        assert_eq!(v.nested_loop_count, 1);
    }

    #[test]
    fn nested_loops_from_braces() {
        let code = "for (int i = 0; i < n; i++) {\n    for (int j = 0; j < n; j++) {\n        total += a[i][j];\n    }\n}\n";
        let v = RegexFeatureExtractor::extract(code, Language::Cpp);
        assert_eq!(v.loop_count, 2);
        assert_eq!(v.nested_loop_count, 1);
    }

    #[test]
    fn sequential_braced_loops_are_not_nested() {
        let code = "while (a) { x++; }\nwhile (b) { y++; }\n";
        let v = RegexFeatureExtractor::extract(code, Language::JavaScript);
        assert_eq!(v.loop_count, 2);
        assert_eq!(v.nested_loop_count, 0);
    }

    #[test]
    fn commented_loops_are_ignored() {
        let code = "# for x in range(10):\nvalue = 1\n";
        let v = RegexFeatureExtractor::extract(code, Language::Python);
        assert_eq!(v.loop_count, 0);

        let js = "// while (true) {}\n/* for (;;) {} */\nlet x = 1;\n";
        let v = RegexFeatureExtractor::extract(js, Language::JavaScript);
        assert_eq!(v.loop_count, 0);
    }

    #[test]
    fn recursion_from_name_recurrence() {
        let code = "def fib(n):\n    if n <= 1:\n        return n\n    return fib(n - 1) + fib(n - 2)\n";
        let v = RegexFeatureExtractor::extract(code, Language::Python);
        assert!(v.recursion_detected);
        assert_eq!(v.estimated_time_complexity, TimeComplexity::Exponential);
    }

    #[test]
    fn keywords_inside_strings_do_not_count() {
        let code = "message = \"for while if\"\n";
        let v = RegexFeatureExtractor::extract(code, Language::Python);
        assert_eq!(v.loop_count, 0);
        assert_eq!(v.conditional_count, 0);
    }
}
