// SPDX-License-Identifier: BSD-3-Clause
//! Fact extraction: walks a program and asserts the base facts each
//! instruction kind contributes. Instructions are numbered by their index;
//! named values are interned into the same dense id space after the
//! instruction block, so a `Def`'s subject and site never collide.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::analysis::relation::{DEF, DIV, GEN, NEXT, SANITIZER, TAINT, USE};
use crate::datalog::{Engine, Error, NodeId};
use crate::ir::{BinaryOp, Opcode, Operand, Program};
use crate::policy::Policy;

pub struct Extractor<'a> {
    engine: &'a mut Engine,
    values: FxHashMap<String, NodeId>,
    next_value: NodeId,
}

impl<'a> Extractor<'a> {
    /// Instruction ids are `0..num_instructions`; value ids are handed out
    /// from `num_instructions` upward.
    pub fn new(engine: &'a mut Engine, num_instructions: usize) -> Self {
        Extractor {
            engine,
            values: FxHashMap::default(),
            next_value: num_instructions as NodeId,
        }
    }

    /// Assert base facts for every instruction. The program is expected to
    /// be [validated](crate::ir::Program::validate).
    pub fn extract(&mut self, program: &Program, policy: &Policy) -> Result<(), Error> {
        for (idx, instruction) in program.instructions.iter().enumerate() {
            let here = idx as NodeId;
            match &instruction.opcode {
                Opcode::Store { value, pointer } => {
                    self.add_def(pointer, here)?;
                    self.add_use(value, here)?;
                    self.engine.insert(GEN, vec![here, here])?;
                }
                Opcode::Load { pointer } => {
                    // Loads contribute no facts in this rule set.
                    debug!(instruction = idx, %pointer, "skipping load");
                }
                Opcode::Call { callee, .. } => {
                    if policy.is_source(callee) {
                        self.engine.insert(TAINT, vec![here])?;
                    }
                    if policy.is_sanitizer(callee) {
                        self.engine.insert(SANITIZER, vec![here])?;
                    }
                }
                Opcode::Binary {
                    op: BinaryOp::SDiv,
                    operand1,
                    ..
                } => {
                    // Only the divisor can make the division alarm-worthy.
                    self.add_div(operand1, here)?;
                }
                Opcode::Binary { .. } => (),
                Opcode::Other => (),
            }
            for &succ in &instruction.succs {
                self.engine.insert(NEXT, vec![here, succ as NodeId])?;
            }
        }
        Ok(())
    }

    /// Dense id for a named value, interning it on first sight.
    pub fn value_id(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.values.get(name) {
            return id;
        }
        let id = self.next_value;
        self.next_value += 1;
        self.values.insert(name.to_string(), id);
        id
    }

    fn add_def(&mut self, operand: &Operand, instruction: NodeId) -> Result<(), Error> {
        if let Some(name) = operand.var() {
            let value = self.value_id(name);
            self.engine.insert(DEF, vec![value, instruction])?;
        }
        Ok(())
    }

    fn add_use(&mut self, operand: &Operand, instruction: NodeId) -> Result<(), Error> {
        if let Some(name) = operand.var() {
            let value = self.value_id(name);
            self.engine.insert(USE, vec![value, instruction])?;
        }
        Ok(())
    }

    fn add_div(&mut self, operand: &Operand, instruction: NodeId) -> Result<(), Error> {
        if let Some(name) = operand.var() {
            let value = self.value_id(name);
            self.engine.insert(DIV, vec![value, instruction])?;
        }
        Ok(())
    }
}
