// SPDX-License-Identifier: BSD-3-Clause
//! The shipped rule sets and the one-call analysis entry point.

use crate::datalog::{Engine, Error, NodeId};
use crate::extract::Extractor;
use crate::ir::Program;
use crate::policy::Policy;

pub mod rdef;
pub mod taint;

/// Relation names shared by extraction, the rule sets, and reporting.
pub mod relation {
    /// Def(value, instruction): `instruction` defines `value`.
    pub const DEF: &str = "def";
    /// Use(value, instruction): `instruction` reads `value`.
    pub const USE: &str = "use";
    /// Gen(subject, instruction): `instruction` generates a definition.
    pub const GEN: &str = "gen";
    /// Kill(value, instruction): `instruction` kills definitions of `value`.
    pub const KILL: &str = "kill";
    /// Next(i, j): `j` is a control-flow successor of `i`.
    pub const NEXT: &str = "next";
    /// In(subject, instruction): a definition reaches the instruction entry.
    pub const IN: &str = "in";
    /// Out(subject, instruction): a definition survives the instruction.
    pub const OUT: &str = "out";
    /// Taint(instruction): the instruction is a taint source.
    pub const TAINT: &str = "taint";
    /// Sanitizer(instruction): taint stops propagating past the instruction.
    pub const SANITIZER: &str = "sanitizer";
    /// Div(value, instruction): `instruction` divides by `value`.
    pub const DIV: &str = "div";
    /// Edge(i, j): a def-use chain consecutive in control flow.
    pub const EDGE: &str = "edge";
    /// Path(i, j): an unsanitized taint path from source `i` to `j`.
    pub const PATH: &str = "path";
    /// Alarm(instruction): a division reachable by a taint path.
    pub const ALARM: &str = "alarm";
}

/// Register every base and derived relation the rule sets mention.
pub fn register_relations(engine: &mut Engine) -> Result<(), Error> {
    for (name, arity) in [
        (relation::DEF, 2),
        (relation::USE, 2),
        (relation::GEN, 2),
        (relation::KILL, 2),
        (relation::NEXT, 2),
        (relation::IN, 2),
        (relation::OUT, 2),
        (relation::TAINT, 1),
        (relation::SANITIZER, 1),
        (relation::DIV, 2),
        (relation::EDGE, 2),
        (relation::PATH, 2),
        (relation::ALARM, 1),
    ] {
        engine.register(name, arity)?;
    }
    Ok(())
}

#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Collect derived-relation sizes into [`OutputRelations::metrics`].
    pub metrics: bool,
}

/// Sizes of the derived relations after solving.
#[derive(Clone, Debug)]
pub struct Metrics {
    pub kills: usize,
    pub reaching_in: usize,
    pub reaching_out: usize,
    pub edges: usize,
    pub paths: usize,
    pub alarms: usize,
}

#[derive(Clone, Debug)]
pub struct OutputRelations {
    pub reaching_in: Vec<(NodeId, NodeId)>,
    pub reaching_out: Vec<(NodeId, NodeId)>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub paths: Vec<(NodeId, NodeId)>,
    pub alarms: Vec<NodeId>,
    pub metrics: Option<Metrics>,
}

/// Dataflow analysis: extract base facts from `program` under `policy`, run
/// both rule sets to a fixpoint, and read the derived relations back out.
pub fn analysis(
    program: &Program,
    policy: &Policy,
    opts: &Options,
) -> Result<OutputRelations, Error> {
    let mut engine = Engine::new();
    register_relations(&mut engine)?;

    let mut extractor = Extractor::new(&mut engine, program.instructions.len());
    extractor.extract(program, policy)?;

    rdef::install(&mut engine)?;
    taint::install(&mut engine)?;
    engine.solve()?;

    let reaching_in = pairs(&engine, relation::IN)?;
    let reaching_out = pairs(&engine, relation::OUT)?;
    let edges = pairs(&engine, relation::EDGE)?;
    let paths = pairs(&engine, relation::PATH)?;
    let alarms = singles(&engine, relation::ALARM)?;

    let metrics = if opts.metrics {
        Some(Metrics {
            kills: engine.database().cardinality(relation::KILL)?,
            reaching_in: reaching_in.len(),
            reaching_out: reaching_out.len(),
            edges: edges.len(),
            paths: paths.len(),
            alarms: alarms.len(),
        })
    } else {
        None
    };

    Ok(OutputRelations {
        reaching_in,
        reaching_out,
        edges,
        paths,
        alarms,
        metrics,
    })
}

fn pairs(engine: &Engine, name: &str) -> Result<Vec<(NodeId, NodeId)>, Error> {
    Ok(engine
        .tuples_of(name)?
        .into_iter()
        .map(|tuple| (tuple[0], tuple[1]))
        .collect())
}

fn singles(engine: &Engine, name: &str) -> Result<Vec<NodeId>, Error> {
    Ok(engine
        .tuples_of(name)?
        .into_iter()
        .map(|tuple| tuple[0])
        .collect())
}
