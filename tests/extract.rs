// Fact extraction from IR programs, and the one-call analysis entry point.

use yadda::analysis::{self, relation};
use yadda::datalog::Engine;
use yadda::{BinaryOp, Extractor, Instruction, Opcode, Operand, Policy, PolicyConfig, Program};

// ------------------------------------------------------------------
// Helpers

fn var(name: &str) -> Operand {
    Operand::Var(name.to_string())
}

fn store(value: Operand, pointer: &str) -> Opcode {
    Opcode::Store {
        value,
        pointer: var(pointer),
    }
}

fn call(callee: &str) -> Opcode {
    Opcode::Call {
        callee: callee.to_string(),
        args: vec![],
    }
}

fn binary(op: BinaryOp, operand0: Operand, operand1: Operand) -> Opcode {
    Opcode::Binary {
        op,
        operand0,
        operand1,
    }
}

fn policy() -> Policy {
    Policy::new(&PolicyConfig {
        sources: vec!["^read_".to_string()],
        sanitizers: vec!["^sanitize$".to_string()],
    })
    .unwrap()
}

fn extract(program: &Program) -> Engine {
    program.validate().unwrap();
    let mut engine = Engine::new();
    analysis::register_relations(&mut engine).unwrap();
    let mut extractor = Extractor::new(&mut engine, program.instructions.len());
    extractor.extract(program, &policy()).unwrap();
    engine.solve().unwrap();
    engine
}

// ------------------------------------------------------------------
// Per-kind facts

#[test]
fn store_facts() {
    let program = Program::straight_line(vec![store(var("v"), "p")]);
    let e = extract(&program);
    // Value ids follow the single instruction: p is 1, v is 2.
    assert_eq!(e.tuples_of(relation::DEF).unwrap(), vec![vec![1, 0]]);
    assert_eq!(e.tuples_of(relation::USE).unwrap(), vec![vec![2, 0]]);
    assert_eq!(e.tuples_of(relation::GEN).unwrap(), vec![vec![0, 0]]);
}

#[test]
fn constants_are_not_tracked() {
    let program = Program::straight_line(vec![
        store(Operand::Const(0), "p"),
        binary(BinaryOp::SDiv, var("a"), Operand::Const(2)),
    ]);
    let e = extract(&program);
    assert!(e.tuples_of(relation::USE).unwrap().is_empty());
    assert!(e.tuples_of(relation::DIV).unwrap().is_empty());
    assert_eq!(e.tuples_of(relation::DEF).unwrap(), vec![vec![2, 0]]);
}

#[test]
fn division_tracks_divisor_only() {
    let program = Program::straight_line(vec![binary(BinaryOp::SDiv, var("a"), var("b"))]);
    let e = extract(&program);
    // Only the divisor is interned, so b is 1.
    assert_eq!(e.tuples_of(relation::DIV).unwrap(), vec![vec![1, 0]]);
}

#[test]
fn unsigned_division_is_ignored() {
    let program = Program::straight_line(vec![binary(BinaryOp::UDiv, var("a"), var("b"))]);
    let e = extract(&program);
    assert!(e.tuples_of(relation::DIV).unwrap().is_empty());
}

#[test]
fn loads_contribute_nothing() {
    let program = Program::straight_line(vec![Opcode::Load { pointer: var("p") }]);
    let e = extract(&program);
    for name in [relation::DEF, relation::USE, relation::GEN, relation::DIV] {
        assert!(e.tuples_of(name).unwrap().is_empty());
    }
}

#[test]
fn policy_classifies_calls() {
    let program =
        Program::straight_line(vec![call("read_input"), call("sanitize"), call("memcpy")]);
    let e = extract(&program);
    assert_eq!(e.tuples_of(relation::TAINT).unwrap(), vec![vec![0]]);
    assert_eq!(e.tuples_of(relation::SANITIZER).unwrap(), vec![vec![1]]);
}

#[test]
fn same_variable_interns_to_same_id() {
    let program = Program::straight_line(vec![store(var("v"), "p"), store(var("w"), "p")]);
    let e = extract(&program);
    assert_eq!(
        e.tuples_of(relation::DEF).unwrap(),
        vec![vec![2, 0], vec![2, 1]]
    );
}

// ------------------------------------------------------------------
// Control flow

#[test]
fn next_follows_straight_line() {
    let program = Program::straight_line(vec![Opcode::Other, Opcode::Other, Opcode::Other]);
    let e = extract(&program);
    assert_eq!(
        e.tuples_of(relation::NEXT).unwrap(),
        vec![vec![0, 1], vec![1, 2]]
    );
}

#[test]
fn next_follows_branches() {
    let program = Program {
        instructions: vec![
            Instruction {
                opcode: Opcode::Other,
                succs: vec![1, 2],
            },
            Instruction {
                opcode: Opcode::Other,
                succs: vec![],
            },
            Instruction {
                opcode: Opcode::Other,
                succs: vec![],
            },
        ],
    };
    let e = extract(&program);
    assert_eq!(
        e.tuples_of(relation::NEXT).unwrap(),
        vec![vec![0, 1], vec![0, 2]]
    );
}

#[test]
fn out_of_range_successor_is_rejected() {
    let program = Program {
        instructions: vec![Instruction {
            opcode: Opcode::Other,
            succs: vec![7],
        }],
    };
    assert!(program.validate().is_err());
}

// ------------------------------------------------------------------
// Entry point

#[test]
fn analysis_end_to_end() {
    // 0: store %v, %p   1: store %p, %q   2: sdiv %x, %p
    let program = Program::straight_line(vec![
        store(var("v"), "p"),
        store(var("p"), "q"),
        binary(BinaryOp::SDiv, var("x"), var("p")),
    ]);
    let outs = analysis::analysis(
        &program,
        &policy(),
        &analysis::Options { metrics: true },
    )
    .unwrap();

    // p is defined at 0 and used as the stored value at 1.
    assert_eq!(outs.edges, vec![(0, 1)]);
    // Nothing is tainted, so no paths and no alarms.
    assert!(outs.paths.is_empty());
    assert!(outs.alarms.is_empty());
    // Both stores generate a definition that flows down the chain.
    assert_eq!(outs.reaching_in, vec![(0, 1), (0, 2), (1, 2)]);
    assert_eq!(
        outs.reaching_out,
        vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2)]
    );

    let metrics = outs.metrics.unwrap();
    assert_eq!(metrics.edges, 1);
    assert_eq!(metrics.alarms, 0);
    assert_eq!(metrics.reaching_in, 3);
}

#[test]
fn programs_round_trip_through_json() {
    let json = r#"{
        "instructions": [
            { "opcode": { "call": { "callee": "read_input" } }, "succs": [1] },
            { "opcode": { "store": { "value": { "var": "v" }, "pointer": { "var": "p" } } }, "succs": [2] },
            { "opcode": { "binary": { "op": "sdiv", "operand0": { "const": 1 }, "operand1": { "var": "p" } } } }
        ]
    }"#;
    let program: Program = serde_json::from_str(json).unwrap();
    program.validate().unwrap();
    let e = extract(&program);
    assert_eq!(e.tuples_of(relation::TAINT).unwrap(), vec![vec![0]]);
    assert_eq!(e.tuples_of(relation::DEF).unwrap(), vec![vec![3, 1]]);
    assert_eq!(e.tuples_of(relation::DIV).unwrap(), vec![vec![3, 2]]);
}
