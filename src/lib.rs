// SPDX-License-Identifier: BSD-3-Clause
//! Yet Another Datalog Dataflow Analyzer
//!
//! Translates an IR program into base facts over finite relations, derives
//! reaching definitions and taint paths as the least fixpoint of Horn-clause
//! rules under stratified negation, and reports divide-by-zero alarms at
//! division sites reachable from unsanitized taint sources.

pub mod analysis;
pub mod datalog;
pub mod extract;
pub mod ir;
pub mod policy;

pub use datalog::{Database, Engine, Error, NodeId, Rule, Term, Tuple};
pub use extract::Extractor;
pub use ir::{BinaryOp, Instruction, Opcode, Operand, Program};
pub use policy::{Policy, PolicyConfig};
