/// Canonicalization of instruction streams.
///
/// Renames variables, temps, and labels to position-based names in
/// first-occurrence order, flips relational operators to a single direction,
/// and sorts commutative operand pairs, so structurally-equivalent-but-
/// textually-different programs converge to the same canonical stream.
use std::collections::HashMap;

use crate::tac::TacInstruction;

struct RenameTable {
    vars: HashMap<String, String>,
    temps: HashMap<String, String>,
    labels: HashMap<String, String>,
}

impl RenameTable {
    fn new() -> Self {
        Self {
            vars: HashMap::new(),
            temps: HashMap::new(),
            labels: HashMap::new(),
        }
    }

    fn operand(&mut self, token: &str) -> String {
        if is_literal(token) {
            return token.to_string();
        }
        if is_temp(token) {
            let next = self.temps.len() + 1;
            return self
                .temps
                .entry(token.to_string())
                .or_insert_with(|| format!("t{}", next))
                .clone();
        }
        let next = self.vars.len() + 1;
        self.vars
            .entry(token.to_string())
            .or_insert_with(|| format!("v{}", next))
            .clone()
    }

    fn label(&mut self, name: &str) -> String {
        let next = self.labels.len() + 1;
        self.labels
            .entry(name.to_string())
            .or_insert_with(|| format!("L{}", next))
            .clone()
    }
}

fn is_temp(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('t') && !token[1..].is_empty() && token[1..].chars().all(|c| c.is_ascii_digit())
}

fn is_literal(token: &str) -> bool {
    if token.is_empty() {
        return true;
    }
    let numeric = token
        .strip_prefix('-')
        .unwrap_or(token)
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.');
    numeric
        || token.starts_with('"')
        || token.starts_with('\'')
        || matches!(token, "true" | "false" | "null" | "None" | "True" | "False")
}

fn is_commutative(op: &str) -> bool {
    matches!(op, "+" | "*" | "&&" | "||")
}

/// Canonicalize one instruction stream.
pub fn normalize_tac(instructions: &[TacInstruction]) -> Vec<TacInstruction> {
    let mut table = RenameTable::new();
    let mut out = Vec::with_capacity(instructions.len());

    for instruction in instructions {
        let normalized = match instruction {
            TacInstruction::Assign { dst, src } => TacInstruction::Assign {
                dst: table.operand(dst),
                src: table.operand(src),
            },
            TacInstruction::BinOp { dst, a, b, operator } => {
                // Flip before renaming so `i > n` and `n < i` hand the
                // renamer the same operand sequence.
                let (a, b, operator) = match operator.as_str() {
                    ">" => (b, a, "<".to_string()),
                    ">=" => (b, a, "<=".to_string()),
                    _ => (a, b, operator.clone()),
                };
                let dst = table.operand(dst);
                let mut a = table.operand(a);
                let mut b = table.operand(b);
                if is_commutative(&operator) && a > b {
                    std::mem::swap(&mut a, &mut b);
                }
                TacInstruction::BinOp { dst, a, b, operator }
            }
            TacInstruction::CJump {
                cond,
                if_true,
                if_false,
            } => TacInstruction::CJump {
                cond: table.operand(cond),
                if_true: table.label(if_true),
                if_false: table.label(if_false),
            },
            TacInstruction::Label { name } => TacInstruction::Label {
                name: table.label(name),
            },
            TacInstruction::Goto { target } => TacInstruction::Goto {
                target: table.label(target),
            },
            TacInstruction::Return { src } => TacInstruction::Return {
                src: src.as_ref().map(|s| table.operand(s)),
            },
            // Call targets are global names, not variables; renaming them
            // would erase the difference between calling print and calling
            // anything else.
            TacInstruction::Call { name } => TacInstruction::Call { name: name.clone() },
        };
        out.push(normalized);
    }
    out
}
