/// Per-language idiom and data-structure detection shared by the AST and
/// regex extraction strategies, so both paths report identical boolean
/// fields for the same source.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::ast::languages::Language;

/// Halving or bit-shift reduction of a working range. Scoped by the caller
/// to a loop extent (log-loop signal) or a recursive function extent
/// (divide-and-conquer signal).
pub(crate) static HALVING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?://\s*2\b|/\s*2\b|/=\s*2\b|>>=?\s*1\b|\*=\s*2\b)").expect("halving regex")
});

// Comparison of an input-looking identifier against a numeric literal,
// the signature of a hardcoded answer table.
static LITERAL_BRANCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"==\s*-?\d+").expect("literal branch regex"));

static RETURN_PAYLOAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)\breturn\b[ \t]*([^;\n]*)"#).expect("return regex"));

static LITERAL_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[-+*/ \t0-9."'\[\](),]*$|^(?:true|false|True|False|null|None)$"#)
        .expect("literal-only regex")
});

static PARAM_SIGNATURE_RE: Lazy<Regex> = Lazy::new(|| {
    // A function header with a non-empty parameter list, in any of the four
    // surface syntaxes. The captured name is filtered against control
    // keywords by `has_parameterized_function`.
    Regex::new(r"(?m)^[^\n=]*\b([A-Za-z_]\w*)\s*\(\s*[A-Za-z_][^)]*\)\s*(?:\{|:|->)")
        .expect("param signature regex")
});

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "while", "for", "switch", "catch", "return", "elif", "with", "until",
];

fn has_parameterized_function(code: &str) -> bool {
    PARAM_SIGNATURE_RE
        .captures_iter(code)
        .filter_map(|c| c.get(1))
        .any(|name| !CONTROL_KEYWORDS.contains(&name.as_str()))
}

// dict literal: braces with a key:value pair
static DICT_LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\{\s*["'\w]+\s*:"#).expect("dict literal regex"));

static INDEXED_ACCESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+\s*\[\s*\w+\s*\]").expect("indexed access regex"));

fn contains_any(code: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| code.contains(n))
}

/// Word-boundary keyword search, shared with the fallback counters.
pub(crate) fn contains_keyword(text: &str, keyword: &str) -> bool {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(keyword) {
        let abs = start + pos;
        let before_ok = abs == 0 || {
            let c = bytes[abs - 1] as char;
            !c.is_alphanumeric() && c != '_'
        };
        let end = abs + keyword.len();
        let after_ok = end >= bytes.len() || {
            let c = bytes[end] as char;
            !c.is_alphanumeric() && c != '_'
        };
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}

pub(crate) fn uses_sorting(code: &str, language: Language) -> bool {
    match language {
        Language::Python => contains_any(code, &["sorted(", ".sort("]),
        Language::JavaScript => contains_any(code, &[".sort("]),
        Language::Java => contains_any(code, &["Arrays.sort", "Collections.sort", ".sort("]),
        Language::Cpp => contains_any(code, &["sort(", "qsort("]),
    }
}

pub(crate) fn uses_hash_map(code: &str, language: Language) -> bool {
    match language {
        Language::Python => {
            contains_any(code, &["dict(", "defaultdict", "Counter(", "set("])
                || contains_keyword(code, "dict")
                || DICT_LITERAL_RE.is_match(code)
                || code.contains("= {}")
        }
        Language::JavaScript => {
            contains_any(code, &["new Map(", "new Set(", "Object.create("])
                || code.contains("= {}")
        }
        Language::Java => contains_any(code, &["HashMap", "HashSet", "Hashtable", "TreeMap"]),
        Language::Cpp => contains_any(code, &["unordered_map", "unordered_set", "map<", "set<"]),
    }
}

pub(crate) fn uses_stack(code: &str, language: Language) -> bool {
    match language {
        Language::Python => {
            contains_keyword(code, "stack")
                || (code.contains(".append(") && code.contains(".pop()"))
        }
        Language::JavaScript => {
            contains_keyword(code, "stack")
                || (code.contains(".push(") && code.contains(".pop()"))
        }
        Language::Java => contains_any(code, &["Stack<", "ArrayDeque", "Deque<"]),
        Language::Cpp => contains_any(code, &["stack<"]),
    }
}

pub(crate) fn uses_queue(code: &str, language: Language) -> bool {
    match language {
        Language::Python => contains_any(code, &["deque(", "Queue(", "queue."]),
        Language::JavaScript => {
            contains_keyword(code, "queue") || code.contains(".shift(")
        }
        Language::Java => contains_any(code, &["Queue<", "LinkedList<", "PriorityQueue"]),
        Language::Cpp => contains_any(code, &["queue<", "deque<", "priority_queue"]),
    }
}

pub(crate) fn array_manipulation(code: &str, language: Language) -> bool {
    let generic = INDEXED_ACCESS_RE.is_match(code);
    let methods = match language {
        Language::Python => contains_any(code, &[".append(", ".extend(", ".insert(", ".pop("]),
        Language::JavaScript => {
            contains_any(code, &[".push(", ".slice(", ".splice(", ".map(", ".filter("])
        }
        Language::Java => contains_any(code, &["ArrayList", ".add(", "new int["]),
        Language::Cpp => contains_any(code, &["vector<", ".push_back(", ".emplace_back("]),
    };
    generic || methods
}

pub(crate) fn graph_traversal(code: &str) -> bool {
    ["dfs", "bfs", "visited", "adjacency", "adjacent", "neighbors", "neighbours", "graph"]
        .iter()
        .any(|k| contains_keyword(&code.to_lowercase(), k))
}

pub(crate) fn memoization_or_dp(code: &str, language: Language) -> bool {
    let lowered = code.to_lowercase();
    let named = ["memo", "dp", "cache", "tabulation"]
        .iter()
        .any(|k| contains_keyword(&lowered, k));
    let decorated = match language {
        Language::Python => contains_any(code, &["lru_cache", "@cache", "functools.cache"]),
        _ => false,
    };
    named || decorated
}

pub(crate) fn two_pointers(code: &str, has_loop: bool) -> bool {
    if !has_loop {
        return false;
    }
    let lowered = code.to_lowercase();
    (contains_keyword(&lowered, "left") && contains_keyword(&lowered, "right"))
        || (contains_keyword(&lowered, "lo") && contains_keyword(&lowered, "hi"))
        || (contains_keyword(&lowered, "low") && contains_keyword(&lowered, "high"))
}

pub(crate) fn sliding_window(code: &str) -> bool {
    let lowered = code.to_lowercase();
    ["window", "window_start", "windowstart", "window_end"]
        .iter()
        .any(|k| contains_keyword(&lowered, k))
}

fn reads_input(code: &str, language: Language) -> bool {
    match language {
        Language::Python => contains_any(code, &["input(", "sys.stdin", "readline"]),
        Language::JavaScript => {
            contains_any(code, &["process.argv", "readline", "prompt(", "process.stdin"])
        }
        Language::Java => contains_any(code, &["Scanner", "System.in", "BufferedReader", "args["]),
        Language::Cpp => contains_any(code, &["cin", "scanf", "getline", "argv"]),
    }
}

/// True when the program's behaviour can depend on its input: it either
/// reads input directly or declares a function taking parameters.
pub(crate) fn input_dependent_logic(code: &str, language: Language) -> bool {
    reads_input(code, language) || has_parameterized_function(code)
}

/// All observable outputs (return payloads) are bare literals.
pub(crate) fn constant_only_output(code: &str, language: Language) -> bool {
    let mut saw_output = false;
    for cap in RETURN_PAYLOAD_RE.captures_iter(code) {
        let payload = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if payload.is_empty() {
            continue;
        }
        saw_output = true;
        if !LITERAL_ONLY_RE.is_match(payload) {
            return false;
        }
    }
    saw_output && !input_dependent_logic(code, language)
}

/// Hardcoded-answer heuristic: constant-only output, or a chain of
/// literal-equality branches standing in for the real computation.
pub(crate) fn hardcoding_detected(code: &str, language: Language, conditional_count: u32) -> bool {
    if constant_only_output(code, language) {
        return true;
    }
    let literal_branches = LITERAL_BRANCH_RE.find_iter(code).count();
    literal_branches >= 3 && conditional_count >= 3
}
