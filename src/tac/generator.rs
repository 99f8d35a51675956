/// Heuristic line-based lowering of source text into three-address code.
///
/// This is deliberately not a full parse: it operates on logical, trimmed,
/// non-empty source lines, recognizing the statement shapes common to the
/// four submission languages. The output is deterministic: identical input
/// text always yields a byte-identical instruction stream.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::ast::languages::Language;
use crate::tac::{TacInstruction, TacProgram};

static RANGE_FOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^for\s+(\w+)\s+in\s+range\s*\((.*)\)\s*:?$").expect("range-for regex")
});
static FOREACH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^for\s*\(?\s*(?:const\s+|let\s+|var\s+|int\s+|auto\s+|char\s+|long\s+)?(\w+)\s*(?:in|of|:)\s*(.+?)\)?\s*[:{]?$")
        .expect("foreach regex")
});
static INCREMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\+\+|--)?\s*([\w.\[\]]+)\s*(\+\+|--)?$").expect("increment regex")
});
static COMPOUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w.\[\]]+)\s*(<<|>>|[+\-*/%&|])=\s*(.+)$").expect("compound regex")
});
static BARE_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.]*)\s*\((.*)\)$").expect("bare call regex"));

const PRINT_PREFIXES: &[&str] = &[
    "print(",
    "console.log(",
    "System.out.println(",
    "System.out.print(",
    "printf(",
    "puts(",
];

/// Lower source text into a TAC program. Total and deterministic.
pub fn generate_tac(code: &str, language: Language) -> TacProgram {
    Generator::new(language).run(code)
}

enum FrameKind {
    If {
        false_label: Option<String>,
        end_label: Option<String>,
    },
    Loop {
        start_label: String,
        end_label: String,
        increment: Option<String>,
    },
    Plain,
}

struct Frame {
    kind: FrameKind,
    indent: usize,
}

struct Generator {
    instructions: Vec<TacInstruction>,
    temp_counter: u32,
    label_counter: u32,
    frames: Vec<Frame>,
    python_style: bool,
}

impl Generator {
    fn new(language: Language) -> Self {
        Self {
            instructions: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
            frames: Vec::new(),
            python_style: language == Language::Python,
        }
    }

    fn new_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    fn new_label(&mut self) -> String {
        self.label_counter += 1;
        format!("L{}", self.label_counter)
    }

    fn emit(&mut self, instruction: TacInstruction) {
        self.instructions.push(instruction);
    }

    fn run(mut self, code: &str) -> TacProgram {
        for raw in code.lines() {
            let without_comment = strip_line_comment(raw, self.python_style);
            if without_comment.trim().is_empty() {
                continue;
            }
            if self.python_style {
                let indent = indent_of(&without_comment);
                let trimmed = without_comment.trim();
                // An else/elif at the same indent continues its if-frame;
                // everything else at or above the frame indent closes it.
                let continues_if = trimmed.starts_with("else") || trimmed.starts_with("elif");
                while let Some(frame) = self.frames.last() {
                    if indent > frame.indent {
                        break;
                    }
                    if indent == frame.indent
                        && continues_if
                        && matches!(frame.kind, FrameKind::If { .. })
                    {
                        break;
                    }
                    self.close_frame();
                }
                let line = trimmed.trim_end_matches(';').trim();
                self.statement(line, indent);
            } else {
                self.braced_line(without_comment.trim());
            }
        }
        while !self.frames.is_empty() {
            self.close_frame();
        }
        TacProgram {
            instructions: self.instructions,
            temp_count: self.temp_counter,
            label_count: self.label_counter,
        }
    }

    /// Brace-language line handling: leading `}` tokens terminate blocks,
    /// `} else` transfers control inside the open if-frame.
    fn braced_line(&mut self, mut line: &str) {
        while let Some(rest) = line.strip_prefix('}') {
            let rest = rest.trim_start();
            if rest.starts_with("else") {
                line = rest;
                break;
            }
            self.close_frame();
            line = rest;
        }
        let line = line.trim().trim_end_matches(';').trim();
        if line.is_empty() {
            return;
        }
        if line == "{" {
            // Allman-style opener: scope only, keeps braces balanced.
            self.frames.push(Frame {
                kind: FrameKind::Plain,
                indent: 0,
            });
            return;
        }
        self.statement(line, 0);
    }

    fn statement(&mut self, line: &str, indent: usize) {
        if let Some(condition) = keyword_header(line, "if") {
            self.open_if(&condition, indent);
        } else if let Some(condition) = keyword_header(line, "elif") {
            self.handle_else(&format!("else if ({})", condition), indent);
        } else if line.starts_with("else") {
            self.handle_else(line, indent);
        } else if let Some(condition) = keyword_header(line, "while") {
            self.open_while(&condition, indent, None);
        } else if line.starts_with("for") {
            self.open_for(line, indent);
        } else if let Some(payload) = keyword_header_loose(line, "return") {
            let src = if payload.is_empty() {
                None
            } else {
                Some(self.lower_expr(&payload))
            };
            self.emit(TacInstruction::Return { src });
        } else if let Some(args) = print_arguments(line) {
            for arg in args {
                let _ = self.lower_expr(&arg);
            }
            self.emit(TacInstruction::Call {
                name: "print".to_string(),
            });
        } else if let Some(caps) = COMPOUND_RE.captures(line) {
            let dst = caps[1].to_string();
            let op = caps[2].to_string();
            let rhs = caps[3].to_string();
            self.assign(&dst, &format!("{} {} ({})", dst, op, rhs));
        } else if let Some((dst, delta)) = increment_sugar(line) {
            self.assign(&dst, &format!("{} {} 1", dst, delta));
        } else if let Some((lhs, rhs)) = split_assignment(line) {
            let dst = declared_name(&lhs);
            self.assign(&dst, &rhs);
        } else if let Some(caps) = BARE_CALL_RE.captures(line) {
            let name = caps[1].to_string();
            let args = caps[2].to_string();
            for arg in split_top_level(&args, ',') {
                if !arg.trim().is_empty() {
                    let _ = self.lower_expr(arg.trim());
                }
            }
            self.emit(TacInstruction::Call { name });
        } else if line.ends_with('{') || line.ends_with(':') {
            // Unrecognized block opener (function/class header): scope only.
            self.frames.push(Frame {
                kind: FrameKind::Plain,
                indent,
            });
        }
        // Anything else is noise for equivalence purposes and is skipped.
    }

    fn assign(&mut self, dst: &str, rhs: &str) {
        let src = self.lower_expr(rhs);
        self.emit(TacInstruction::Assign {
            dst: dst.to_string(),
            src,
        });
    }

    fn open_if(&mut self, condition: &str, indent: usize) {
        let cond = self.lower_expr(condition);
        let true_label = self.new_label();
        let false_label = self.new_label();
        self.emit(TacInstruction::CJump {
            cond,
            if_true: true_label.clone(),
            if_false: false_label.clone(),
        });
        self.emit(TacInstruction::Label { name: true_label });
        self.frames.push(Frame {
            kind: FrameKind::If {
                false_label: Some(false_label),
                end_label: None,
            },
            indent,
        });
    }

    fn handle_else(&mut self, line: &str, indent: usize) {
        if !matches!(
            self.frames.last(),
            Some(Frame {
                kind: FrameKind::If { .. },
                ..
            })
        ) {
            return; // stray else: ignore
        }

        // Transfer out of the true branch, land on the false label.
        let existing_end = match self.frames.last() {
            Some(Frame {
                kind: FrameKind::If { end_label, .. },
                ..
            }) => end_label.clone(),
            _ => None,
        };
        let goto_end = existing_end.unwrap_or_else(|| self.new_label());
        let mut old_false = None;
        if let Some(Frame {
            kind: FrameKind::If {
                false_label,
                end_label,
            },
            ..
        }) = self.frames.last_mut()
        {
            *end_label = Some(goto_end.clone());
            old_false = false_label.take();
        }
        self.emit(TacInstruction::Goto { target: goto_end });
        if let Some(label) = old_false {
            self.emit(TacInstruction::Label { name: label });
        }

        let rest = line["else".len()..].trim_start();
        if let Some(condition) = keyword_header(rest, "if") {
            // else-if chains continue inside the same frame.
            let cond = self.lower_expr(&condition);
            let true_label = self.new_label();
            let next_false = self.new_label();
            self.emit(TacInstruction::CJump {
                cond,
                if_true: true_label.clone(),
                if_false: next_false.clone(),
            });
            self.emit(TacInstruction::Label { name: true_label });
            if let Some(Frame {
                kind: FrameKind::If { false_label, .. },
                ..
            }) = self.frames.last_mut()
            {
                *false_label = Some(next_false);
            }
        }
        let _ = indent;
    }

    fn open_while(&mut self, condition: &str, indent: usize, increment: Option<String>) {
        let start_label = self.new_label();
        self.emit(TacInstruction::Label {
            name: start_label.clone(),
        });
        let cond = self.lower_expr(condition);
        let body_label = self.new_label();
        let end_label = self.new_label();
        self.emit(TacInstruction::CJump {
            cond,
            if_true: body_label.clone(),
            if_false: end_label.clone(),
        });
        self.emit(TacInstruction::Label { name: body_label });
        self.frames.push(Frame {
            kind: FrameKind::Loop {
                start_label,
                end_label,
                increment,
            },
            indent,
        });
    }

    fn open_for(&mut self, line: &str, indent: usize) {
        let body = line
            .trim_end_matches('{')
            .trim_end_matches(':')
            .trim()
            .to_string();

        if let Some(caps) = RANGE_FOR_RE.captures(&body) {
            let var = caps[1].to_string();
            let args: Vec<String> = split_top_level(&caps[2], ',')
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            let (start, stop, step) = match args.len() {
                0 => ("0".to_string(), "0".to_string(), "1".to_string()),
                1 => ("0".to_string(), args[0].clone(), "1".to_string()),
                2 => (args[0].clone(), args[1].clone(), "1".to_string()),
                _ => (args[0].clone(), args[1].clone(), args[2].clone()),
            };
            self.assign(&var, &start);
            self.open_while(
                &format!("{} < ({})", var, stop),
                indent,
                Some(format!("{} = {} + {}", var, var, step)),
            );
            return;
        }

        // C-style for(init; cond; inc)
        let inner = body
            .strip_prefix("for")
            .map(|rest| rest.trim())
            .map(|rest| {
                rest.strip_prefix('(')
                    .map(|r| r.strip_suffix(')').unwrap_or(r))
                    .unwrap_or(rest)
            })
            .unwrap_or(&body)
            .to_string();
        if inner.contains(';') {
            let parts: Vec<String> = split_top_level(&inner, ';')
                .into_iter()
                .map(|p| p.trim().to_string())
                .collect();
            let init = parts.first().cloned().unwrap_or_default();
            let cond = parts.get(1).cloned().unwrap_or_default();
            let inc = parts.get(2).cloned().unwrap_or_default();
            if !init.is_empty() {
                self.statement(&init, indent);
            }
            let cond = if cond.is_empty() { "1".to_string() } else { cond };
            let increment = if inc.is_empty() { None } else { Some(inc) };
            self.open_while(&cond, indent, increment);
            return;
        }

        // for-each forms: presence-test the iterable, no index arithmetic.
        if let Some(caps) = FOREACH_RE.captures(&body) {
            let var = caps[1].to_string();
            let iterable = caps[2].trim().to_string();
            self.assign(&var, &iterable);
            self.open_while(&iterable, indent, None);
            return;
        }

        // Malformed for-header: treat as an opaque block.
        self.frames.push(Frame {
            kind: FrameKind::Plain,
            indent,
        });
    }

    fn close_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        match frame.kind {
            FrameKind::Plain => {}
            FrameKind::If {
                false_label,
                end_label,
            } => {
                if let Some(label) = false_label {
                    self.emit(TacInstruction::Label { name: label });
                }
                if let Some(label) = end_label {
                    self.emit(TacInstruction::Label { name: label });
                }
            }
            FrameKind::Loop {
                start_label,
                end_label,
                increment,
            } => {
                if let Some(inc) = increment {
                    self.statement(&inc, frame.indent);
                }
                self.emit(TacInstruction::Goto {
                    target: start_label,
                });
                self.emit(TacInstruction::Label { name: end_label });
            }
        }
    }

    /// Lower an expression to a single operand, emitting `BinOp` temps for
    /// each operator via shunting-yard postfix conversion.
    fn lower_expr(&mut self, expr: &str) -> String {
        let tokens = tokenize(expr);
        if tokens.is_empty() {
            return "0".to_string();
        }
        let postfix = to_postfix(tokens);
        let mut stack: Vec<String> = Vec::new();
        for token in postfix {
            match token {
                Token::Operand(text) => stack.push(text),
                Token::Operator(op) => {
                    let b = stack.pop().unwrap_or_else(|| "0".to_string());
                    let a = stack.pop().unwrap_or_else(|| "0".to_string());
                    let dst = self.new_temp();
                    self.emit(TacInstruction::BinOp {
                        dst: dst.clone(),
                        a,
                        b,
                        operator: op,
                    });
                    stack.push(dst);
                }
                _ => {}
            }
        }
        stack.pop().unwrap_or_else(|| "0".to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Operand(String),
    Operator(String),
    LParen,
    RParen,
}

fn precedence(op: &str) -> u8 {
    match op {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" => 3,
        "<" | "<=" | ">" | ">=" => 4,
        "<<" | ">>" => 5,
        "+" | "-" => 6,
        "*" | "/" | "%" => 7,
        _ => 0,
    }
}

fn tokenize(expr: &str) -> Vec<Token> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == ',' {
            i += 1;
            continue;
        }
        if c == '(' {
            tokens.push(Token::LParen);
            i += 1;
            continue;
        }
        if c == ')' {
            tokens.push(Token::RParen);
            i += 1;
            continue;
        }
        if c == '"' || c == '\'' {
            let (literal, next) = consume_string(&chars, i, c);
            tokens.push(Token::Operand(literal));
            i = next;
            continue;
        }
        if c.is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                j += 1;
            }
            tokens.push(Token::Operand(chars[i..j].iter().collect()));
            i = j;
            continue;
        }
        // Two-character operators take priority over the `!` operand prefix.
        let two: String = chars[i..(i + 2).min(chars.len())].iter().collect();
        if matches!(
            two.as_str(),
            "||" | "&&" | "==" | "!=" | "<=" | ">=" | "<<" | ">>"
        ) {
            tokens.push(Token::Operator(two));
            i += 2;
            continue;
        }
        if c.is_alphabetic() || c == '_' || c == '!' {
            let (operand, next) = consume_operand(&chars, i);
            tokens.push(Token::Operand(operand));
            i = next;
            continue;
        }
        // Unary minus folds into the following operand.
        if c == '-' {
            let unary = matches!(
                tokens.last(),
                None | Some(Token::Operator(_)) | Some(Token::LParen)
            );
            if unary && i + 1 < chars.len() {
                let (mut operand, next) = if chars[i + 1].is_ascii_digit() {
                    let mut j = i + 1;
                    while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                        j += 1;
                    }
                    (chars[i + 1..j].iter().collect::<String>(), j)
                } else if chars[i + 1].is_alphabetic() || chars[i + 1] == '_' {
                    consume_operand(&chars, i + 1)
                } else {
                    (String::new(), i + 1)
                };
                if operand.is_empty() {
                    operand = "0".to_string();
                }
                tokens.push(Token::Operand(format!("-{}", operand)));
                i = next;
                continue;
            }
        }
        if matches!(c, '+' | '-' | '*' | '/' | '%' | '<' | '>') {
            tokens.push(Token::Operator(c.to_string()));
            i += 1;
            continue;
        }
        // Unknown character: skip.
        i += 1;
    }
    tokens
}

fn consume_string(chars: &[char], start: usize, quote: char) -> (String, usize) {
    let mut j = start + 1;
    let mut escaped = false;
    while j < chars.len() {
        if escaped {
            escaped = false;
        } else if chars[j] == '\\' {
            escaped = true;
        } else if chars[j] == quote {
            j += 1;
            break;
        }
        j += 1;
    }
    (chars[start..j.min(chars.len())].iter().collect(), j)
}

/// Consume an identifier together with attached member access, call
/// arguments, and index brackets, producing one opaque operand token
/// (`arr[i]`, `Math.floor(x / 2)`, `!done`).
fn consume_operand(chars: &[char], start: usize) -> (String, usize) {
    let mut j = start;
    while j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_' || chars[j] == '.') {
        j += 1;
    }
    loop {
        if j < chars.len() && (chars[j] == '(' || chars[j] == '[') {
            let open = chars[j];
            let close = if open == '(' { ')' } else { ']' };
            let mut depth = 0i32;
            while j < chars.len() {
                if chars[j] == open {
                    depth += 1;
                } else if chars[j] == close {
                    depth -= 1;
                    if depth == 0 {
                        j += 1;
                        break;
                    }
                }
                j += 1;
            }
            // Member access may continue after a call: a.b(c).d
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_' || chars[j] == '.')
            {
                j += 1;
            }
        } else {
            break;
        }
    }
    (chars[start..j].iter().collect(), j)
}

fn to_postfix(tokens: Vec<Token>) -> Vec<Token> {
    let mut output = Vec::new();
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Operand(_) => output.push(token),
            Token::Operator(ref op) => {
                while let Some(Token::Operator(top)) = operators.last() {
                    if precedence(top) >= precedence(op) {
                        output.push(operators.pop().unwrap());
                    } else {
                        break;
                    }
                }
                operators.push(token);
            }
            Token::LParen => operators.push(token),
            Token::RParen => {
                while let Some(top) = operators.pop() {
                    if matches!(top, Token::LParen) {
                        break;
                    }
                    output.push(top);
                }
            }
        }
    }
    while let Some(top) = operators.pop() {
        if !matches!(top, Token::LParen) {
            output.push(top);
        }
    }
    output
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn strip_line_comment(line: &str, python_style: bool) -> String {
    let marker = if python_style { "#" } else { "//" };
    let mut in_string: Option<char> = None;
    let mut result = String::with_capacity(line.len());
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if let Some(quote) = in_string {
            result.push(c);
            if c == quote && (i == 0 || chars[i - 1] != '\\') {
                in_string = None;
            }
            i += 1;
            continue;
        }
        if c == '"' || c == '\'' {
            in_string = Some(c);
            result.push(c);
            i += 1;
            continue;
        }
        let rest: String = chars[i..(i + marker.len()).min(chars.len())].iter().collect();
        if rest == marker {
            break;
        }
        result.push(c);
        i += 1;
    }
    result
}

/// Strip a keyword header (`if`, `while`) and return its condition text
/// without surrounding parentheses or the trailing block opener.
fn keyword_header(line: &str, keyword: &str) -> Option<String> {
    let rest = line.strip_prefix(keyword)?;
    if !rest.is_empty() && rest.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        return None; // identifier that merely starts with the keyword
    }
    let mut condition = rest.trim().trim_end_matches('{').trim_end_matches(':').trim();
    if wrapped_in_matching_parens(condition) {
        condition = &condition[1..condition.len() - 1];
    }
    Some(condition.trim().to_string())
}

/// True when the first `(` pairs with the final `)`, so stripping both is
/// safe: `(a && (b))` yes, `(a) && (b)` no.
fn wrapped_in_matching_parens(text: &str) -> bool {
    if !(text.starts_with('(') && text.ends_with(')')) {
        return false;
    }
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return i == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Like `keyword_header` but keeps the payload verbatim (`return` values).
fn keyword_header_loose(line: &str, keyword: &str) -> Option<String> {
    let rest = line.strip_prefix(keyword)?;
    if !rest.is_empty() && rest.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(rest.trim().to_string())
}

fn print_arguments(line: &str) -> Option<Vec<String>> {
    if let Some(rest) = line.strip_prefix("cout") {
        let args: Vec<String> = rest
            .split("<<")
            .map(str::trim)
            .filter(|part| !part.is_empty() && *part != "endl" && *part != "std::endl")
            .map(str::to_string)
            .collect();
        return Some(args);
    }
    for prefix in PRINT_PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            let inner = rest.strip_suffix(')').unwrap_or(rest);
            let args = split_top_level(inner, ',')
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            return Some(args);
        }
    }
    None
}

fn increment_sugar(line: &str) -> Option<(String, &'static str)> {
    let caps = INCREMENT_RE.captures(line)?;
    let op = caps
        .get(2)
        .map(|m| m.as_str())
        .or_else(|| {
            if line.starts_with("++") {
                Some("++")
            } else if line.starts_with("--") {
                Some("--")
            } else {
                None
            }
        })?;
    let var = caps[1].to_string();
    Some((var, if op == "++" { "+" } else { "-" }))
}

/// Find a top-level assignment `=` (not part of a comparison or arrow) and
/// split around it.
fn split_assignment(line: &str) -> Option<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    for i in 0..chars.len() {
        let c = chars[i];
        if let Some(quote) = in_string {
            if c == quote && (i == 0 || chars[i - 1] != '\\') {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => in_string = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '=' if depth == 0 => {
                let prev = if i > 0 { chars[i - 1] } else { ' ' };
                let next = chars.get(i + 1).copied().unwrap_or(' ');
                if next == '='
                    || next == '>'
                    || matches!(prev, '=' | '!' | '<' | '>' | '+' | '-' | '*' | '/' | '%')
                {
                    continue;
                }
                let lhs: String = chars[..i].iter().collect();
                let rhs: String = chars[i + 1..].iter().collect();
                let lhs = lhs.trim().to_string();
                let rhs = rhs.trim().to_string();
                if lhs.is_empty() || rhs.is_empty() {
                    return None;
                }
                return Some((lhs, rhs));
            }
            _ => {}
        }
    }
    None
}

/// Drop declaration keywords and type names from an assignment target:
/// `let mid`, `int x`, `std::vector<int> v` all reduce to the final token.
fn declared_name(lhs: &str) -> String {
    lhs.split_whitespace()
        .last()
        .unwrap_or(lhs)
        .trim_start_matches('*')
        .trim_start_matches('&')
        .to_string()
}

fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(program: &TacProgram) -> Vec<String> {
        program.instructions.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn simple_assignment_chain() {
        let program = generate_tac("x = a + b * c\n", Language::Python);
        assert_eq!(
            lines(&program),
            vec!["t1 = b * c", "t2 = a + t1", "x = t2"]
        );
        assert_eq!(program.temp_count, 2);
        assert_eq!(program.label_count, 0);
    }

    #[test]
    fn while_loop_shape() {
        let program = generate_tac("while i > n:\n    i = i - 1\n", Language::Python);
        assert_eq!(
            lines(&program),
            vec![
                "L1:",
                "t1 = i > n",
                "if t1 goto L2 else goto L3",
                "L2:",
                "t2 = i - 1",
                "i = t2",
                "goto L1",
                "L3:",
            ]
        );
    }

    #[test]
    fn c_style_for_loop() {
        let code = "for (i = 0; i < n; i++) {\n    s += i;\n}\n";
        let program = generate_tac(code, Language::JavaScript);
        let text = lines(&program).join("\n");
        // init, guard, body, increment rewritten to i = i + 1, loop-back
        assert!(text.contains("i = 0"));
        assert!(text.contains("t1 = i < n"));
        assert!(text.contains("i + 1"), "increment sugar lowered: {}", text);
        assert!(text.contains("goto L1"));
    }

    #[test]
    fn python_range_for_desugars_to_counted_while() {
        let program = generate_tac("for i in range(n):\n    print(i)\n", Language::Python);
        let text = lines(&program).join("\n");
        assert!(text.starts_with("i = 0"));
        assert!(text.contains("t1 = i < n"));
        assert!(text.contains("call print"));
        assert!(text.contains("i = t2"), "increment present: {}", text);
        assert!(text.contains("goto L1"));
    }

    #[test]
    fn if_else_blocks() {
        let code = "if (x > 0) {\n    y = 1;\n} else {\n    y = 2;\n}\n";
        let program = generate_tac(code, Language::JavaScript);
        assert_eq!(
            lines(&program),
            vec![
                "t1 = x > 0",
                "if t1 goto L1 else goto L2",
                "L1:",
                "y = 1",
                "goto L3",
                "L2:",
                "y = 2",
                "L3:",
            ]
        );
    }

    #[test]
    fn compound_assignment_rewrites() {
        let program = generate_tac("total += x\n", Language::Python);
        assert_eq!(lines(&program), vec!["t1 = total + x", "total = t1"]);
    }

    #[test]
    fn bare_call_is_side_effecting() {
        let program = generate_tac("process(a, b)\n", Language::Python);
        assert_eq!(lines(&program), vec!["call process"]);
    }

    #[test]
    fn return_without_value() {
        let program = generate_tac("return\n", Language::Python);
        assert_eq!(lines(&program), vec!["return"]);
    }

    #[test]
    fn generation_is_deterministic() {
        let code = "def f(n):\n    s = 0\n    for i in range(n):\n        s += i\n    return s\n";
        let a = generate_tac(code, Language::Python);
        let b = generate_tac(code, Language::Python);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_yields_empty_program() {
        let program = generate_tac("", Language::Python);
        assert!(program.instructions.is_empty());
        assert_eq!(program.temp_count, 0);
        assert_eq!(program.label_count, 0);
    }

    #[test]
    fn temps_and_labels_never_reset_mid_stream() {
        let code = "if a > b:\n    x = 1\nif c > d:\n    y = 2\n";
        let program = generate_tac(code, Language::Python);
        let text = lines(&program).join("\n");
        // Second if must continue the counters, not restart at t1/L1.
        assert!(text.contains("t2 = c > d"), "stream: {}", text);
        assert!(text.contains("goto L4") || text.contains("L4:"), "stream: {}", text);
    }
}
