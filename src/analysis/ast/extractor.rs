/// Tree-sitter feature extraction: the authoritative strategy.
///
/// Walks the concrete syntax tree once with an explicit stack (no Rust-side
/// recursion, so pathological nesting cannot overflow). Structural facts
/// (loop nesting, direct recursion, halving scoped to loop or recursive
/// function extents) come from the tree; idiom booleans come from the
/// keyword tables shared with the regex fallback.
use tree_sitter::Node;

use crate::analysis::ast::error::AstError;
use crate::analysis::ast::languages::{Language, ParserRegistry};
use crate::analysis::complexity::{estimate_space, estimate_time};
use crate::analysis::features::FeatureVector;
use crate::analysis::idioms;

/// Upper bound on submission size; anything larger degrades to the fallback.
pub const MAX_SOURCE_BYTES: usize = 1_000_000;

pub struct AstFeatureExtractor;

impl AstFeatureExtractor {
    pub fn extract(code: &str, language: Language) -> Result<FeatureVector, AstError> {
        if code.trim().is_empty() {
            return Err(AstError::EmptySource);
        }
        if code.len() > MAX_SOURCE_BYTES {
            return Err(AstError::SourceTooLarge(code.len()));
        }

        let tree = ParserRegistry::parse(code, language)
            .ok_or_else(|| AstError::ParseFailed(language.to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(AstError::SyntaxError);
        }

        let mut walker = FeatureWalker::new(code, language);
        walker.walk(&root);
        Ok(walker.finish())
    }
}

struct FunctionScope {
    name: Option<String>,
    start: usize,
    end: usize,
    calls: Vec<String>,
}

struct FeatureWalker<'a> {
    code: &'a str,
    language: Language,
    loop_count: u32,
    nested_loop_count: u32,
    conditional_count: u32,
    loop_extents: Vec<(usize, usize)>,
    functions: Vec<FunctionScope>,
}

impl<'a> FeatureWalker<'a> {
    fn new(code: &'a str, language: Language) -> Self {
        Self {
            code,
            language,
            loop_count: 0,
            nested_loop_count: 0,
            conditional_count: 0,
            loop_extents: Vec::new(),
            functions: Vec::new(),
        }
    }

    fn is_loop_kind(&self, kind: &str) -> bool {
        match self.language {
            Language::Python => matches!(kind, "for_statement" | "while_statement"),
            Language::JavaScript => matches!(
                kind,
                "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
            ),
            Language::Java => matches!(
                kind,
                "for_statement" | "enhanced_for_statement" | "while_statement" | "do_statement"
            ),
            Language::Cpp => matches!(
                kind,
                "for_statement" | "for_range_loop" | "while_statement" | "do_statement"
            ),
        }
    }

    fn is_conditional_kind(&self, kind: &str) -> bool {
        match self.language {
            Language::Python => {
                matches!(kind, "if_statement" | "elif_clause" | "conditional_expression")
            }
            Language::JavaScript => {
                matches!(kind, "if_statement" | "switch_statement" | "ternary_expression")
            }
            Language::Java => {
                matches!(kind, "if_statement" | "switch_expression" | "ternary_expression")
            }
            Language::Cpp => {
                matches!(kind, "if_statement" | "switch_statement" | "conditional_expression")
            }
        }
    }

    fn is_function_kind(&self, kind: &str) -> bool {
        match self.language {
            Language::Python => kind == "function_definition",
            Language::JavaScript => matches!(
                kind,
                "function_declaration"
                    | "function_expression"
                    | "arrow_function"
                    | "method_definition"
                    | "generator_function_declaration"
            ),
            Language::Java => matches!(kind, "method_declaration" | "constructor_declaration"),
            Language::Cpp => matches!(kind, "function_definition" | "lambda_expression"),
        }
    }

    fn is_call_kind(&self, kind: &str) -> bool {
        match self.language {
            Language::Python => kind == "call",
            Language::JavaScript | Language::Cpp => kind == "call_expression",
            Language::Java => kind == "method_invocation",
        }
    }

    fn text_of(&self, node: &Node) -> Option<String> {
        node.utf8_text(self.code.as_bytes())
            .ok()
            .map(|s| s.to_string())
    }

    /// Declared name of a function-like node, if it has one. Anonymous
    /// JavaScript functions pick up the name of the variable they are
    /// assigned to, so `const fib = (n) => ...` still supports recursion
    /// detection.
    fn function_name(&self, node: &Node) -> Option<String> {
        match self.language {
            Language::Python | Language::JavaScript | Language::Java => node
                .child_by_field_name("name")
                .and_then(|n| self.text_of(&n))
                .or_else(|| {
                    node.parent()
                        .filter(|p| p.kind() == "variable_declarator")
                        .and_then(|p| p.child_by_field_name("name"))
                        .and_then(|n| self.text_of(&n))
                }),
            Language::Cpp => {
                let mut declarator = node.child_by_field_name("declarator");
                while let Some(d) = declarator {
                    if matches!(d.kind(), "identifier" | "field_identifier") {
                        return self.text_of(&d);
                    }
                    declarator = d
                        .child_by_field_name("declarator")
                        .or_else(|| d.named_child(0));
                }
                None
            }
        }
    }

    /// Identifier a call resolves to, used for direct-recursion detection.
    fn callee_name(&self, node: &Node) -> Option<String> {
        if self.language == Language::Java {
            return node
                .child_by_field_name("name")
                .and_then(|n| self.text_of(&n));
        }
        let function = node.child_by_field_name("function")?;
        match function.kind() {
            "identifier" | "field_identifier" => self.text_of(&function),
            // python: obj.method()
            "attribute" => function
                .child_by_field_name("attribute")
                .and_then(|n| self.text_of(&n)),
            // javascript: obj.method()
            "member_expression" => function
                .child_by_field_name("property")
                .and_then(|n| self.text_of(&n)),
            // c++: obj.method()
            "field_expression" => function
                .child_by_field_name("field")
                .and_then(|n| self.text_of(&n)),
            _ => None,
        }
    }

    fn walk(&mut self, root: &Node) {
        // (node, enclosing loop depth, enclosing function index)
        let mut stack: Vec<(Node, u32, Option<usize>)> = vec![(*root, 0, None)];

        while let Some((node, loop_depth, fn_idx)) = stack.pop() {
            let kind = node.kind();
            let mut child_loop_depth = loop_depth;
            let mut child_fn = fn_idx;

            if self.is_loop_kind(kind) {
                self.loop_count += 1;
                if loop_depth > 0 {
                    self.nested_loop_count += 1;
                }
                self.loop_extents.push((node.start_byte(), node.end_byte()));
                child_loop_depth += 1;
            } else if self.is_conditional_kind(kind) {
                self.conditional_count += 1;
            } else if self.is_function_kind(kind) {
                let name = self.function_name(&node);
                self.functions.push(FunctionScope {
                    name,
                    start: node.start_byte(),
                    end: node.end_byte(),
                    calls: Vec::new(),
                });
                child_fn = Some(self.functions.len() - 1);
                // Loops inside a nested function are not nested loops of the
                // enclosing one.
                child_loop_depth = 0;
            } else if self.is_call_kind(kind) {
                if let (Some(idx), Some(name)) = (fn_idx, self.callee_name(&node)) {
                    self.functions[idx].calls.push(name);
                }
            }

            let mut cursor = node.walk();
            if cursor.goto_first_child() {
                let mut children = Vec::new();
                loop {
                    children.push(cursor.node());
                    if !cursor.goto_next_sibling() {
                        break;
                    }
                }
                // Reverse so the explicit stack pops left-to-right.
                for child in children.into_iter().rev() {
                    stack.push((child, child_loop_depth, child_fn));
                }
            }
        }
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        self.code.get(start..end).unwrap_or("")
    }

    fn finish(self) -> FeatureVector {
        let code = self.code;
        let language = self.language;

        let recursive: Vec<&FunctionScope> = self
            .functions
            .iter()
            .filter(|f| match &f.name {
                Some(name) => f.calls.iter().any(|c| c == name),
                None => false,
            })
            .collect();
        let recursion_detected = !recursive.is_empty();
        let divides_input = recursive
            .iter()
            .any(|f| idioms::HALVING_RE.is_match(self.slice(f.start, f.end)));
        let has_log_loop = self
            .loop_extents
            .iter()
            .any(|&(s, e)| idioms::HALVING_RE.is_match(self.slice(s, e)));

        let mut v = FeatureVector {
            loop_count: self.loop_count,
            nested_loop_count: self.nested_loop_count,
            conditional_count: self.conditional_count,
            recursion_detected,
            divides_input,
            has_log_loop,
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
