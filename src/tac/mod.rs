/// Three-address-code intermediate form.
///
/// The generator lowers source text into an instruction stream, the
/// normalizer rewrites the stream into its canonical representative, and the
/// comparator scores two canonical streams. Temps (`t1..`) and labels
/// (`L1..`) come from two monotone counters scoped to one generation call,
/// never reused and never reset mid-stream.
pub mod comparator;
pub mod generator;
pub mod normalizer;

pub use comparator::{compare_tac, TacComparison};
pub use generator::generate_tac;
pub use normalizer::normalize_tac;

use serde::{Deserialize, Serialize};

/// One three-address instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TacInstruction {
    #[serde(rename = "ASSIGN")]
    Assign { dst: String, src: String },
    #[serde(rename = "BINOP")]
    BinOp {
        dst: String,
        a: String,
        b: String,
        operator: String,
    },
    #[serde(rename = "CJUMP")]
    CJump {
        cond: String,
        if_true: String,
        if_false: String,
    },
    #[serde(rename = "LABEL")]
    Label { name: String },
    #[serde(rename = "GOTO")]
    Goto { target: String },
    #[serde(rename = "RETURN")]
    Return { src: Option<String> },
    #[serde(rename = "CALL")]
    Call { name: String },
}

impl std::fmt::Display for TacInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assign { dst, src } => write!(f, "{} = {}", dst, src),
            Self::BinOp { dst, a, b, operator } => write!(f, "{} = {} {} {}", dst, a, operator, b),
            Self::CJump {
                cond,
                if_true,
                if_false,
            } => write!(f, "if {} goto {} else goto {}", cond, if_true, if_false),
            Self::Label { name } => write!(f, "{}:", name),
            Self::Goto { target } => write!(f, "goto {}", target),
            Self::Return { src: Some(src) } => write!(f, "return {}", src),
            Self::Return { src: None } => write!(f, "return"),
            Self::Call { name } => write!(f, "call {}", name),
        }
    }
}

/// Result of one lowering call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacProgram {
    pub instructions: Vec<TacInstruction>,
    pub temp_count: u32,
    pub label_count: u32,
}

impl TacProgram {
    pub fn empty() -> Self {
        Self {
            instructions: Vec::new(),
            temp_count: 0,
            label_count: 0,
        }
    }
}
