// SPDX-License-Identifier: BSD-3-Clause
//! Representation of an IR program that is amenable to fact extraction. The
//! instruction kinds the analyses care about are explicit variants with their
//! operands; everything else collapses to [`Opcode::Other`]. Successors are
//! explicit instruction indices, so a program is a complete control-flow
//! graph on its own and the extraction layer never has to reconstruct one.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, thiserror::Error)]
pub struct Error(pub String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed IR program: {}", self.0)
    }
}

/// A value operand: a literal constant or a named value. Constants carry no
/// identity and never become fact subjects.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operand {
    Const(i64),
    Var(String),
}

impl Operand {
    pub fn var(&self) -> Option<&str> {
        match self {
            Operand::Var(name) => Some(name),
            Operand::Const(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(value) => write!(f, "{}", value),
            Operand::Var(name) => write!(f, "%{}", name),
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::UDiv => "udiv",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::URem => "urem",
            BinaryOp::SRem => "srem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::LShr => "lshr",
            BinaryOp::AShr => "ashr",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Opcode {
    /// Write `value` through `pointer`.
    Store { value: Operand, pointer: Operand },
    /// Read through `pointer`.
    Load { pointer: Operand },
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<Operand>,
    },
    Binary {
        op: BinaryOp,
        operand0: Operand,
        operand1: Operand,
    },
    /// Anything the analyses have no use for.
    Other,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Store { value, pointer } => write!(f, "store {}, {}", value, pointer),
            Opcode::Load { pointer } => write!(f, "load {}", pointer),
            Opcode::Call { callee, args } => {
                write!(f, "call {}(", callee)?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Opcode::Binary {
                op,
                operand0,
                operand1,
            } => write!(f, "{} {}, {}", op, operand0, operand1),
            Opcode::Other => write!(f, "other"),
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Control-flow successors, as indices into the program's instructions.
    #[serde(default)]
    pub succs: Vec<usize>,
}

#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// A program where each instruction falls through to the next.
    pub fn straight_line(opcodes: Vec<Opcode>) -> Self {
        let len = opcodes.len();
        Program {
            instructions: opcodes
                .into_iter()
                .enumerate()
                .map(|(idx, opcode)| Instruction {
                    opcode,
                    succs: if idx + 1 < len { vec![idx + 1] } else { vec![] },
                })
                .collect(),
        }
    }

    /// Check that every successor index names an instruction.
    pub fn validate(&self) -> Result<(), Error> {
        for (idx, instruction) in self.instructions.iter().enumerate() {
            for &succ in &instruction.succs {
                if succ >= self.instructions.len() {
                    return Err(Error(format!(
                        "instruction {} has out-of-range successor {}",
                        idx, succ
                    )));
                }
            }
        }
        Ok(())
    }
}
