// SPDX-License-Identifier: BSD-3-Clause
//! Least-fixpoint evaluation of the registered rules.
//!
//! Evaluation is stratified and semi-naive: rules are grouped by the stratum
//! of their head relation, each stratum is driven to a fixpoint before the
//! next begins, and after an initial seeding pass each round only re-derives
//! through body atoms that can see a tuple that is new since the previous
//! round. Termination follows from the finite node domain and the fact that
//! every update is a monotone union.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::rule::{compile, CRule, CTerm, Rule};
use super::stratify::stratify;
use super::{Database, Error, NodeId, RelId, Tuple};

/// Relation store plus rules; drives base facts to a least fixpoint.
///
/// Lifecycle: register relations, insert base facts, add rules, call
/// [`Engine::solve`] once, then query. Base relations are assumed frozen
/// once `solve` begins; `solve` only ever grows rule-headed relations.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    db: Database,
    rules: Vec<CRule>,
    solved: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// See [`Database::register`].
    pub fn register(&mut self, name: &str, arity: usize) -> Result<(), Error> {
        self.db.register(name, arity)
    }

    /// See [`Database::insert`].
    pub fn insert(&mut self, name: &str, tuple: Tuple) -> Result<(), Error> {
        self.db.insert(name, tuple)
    }

    pub fn contains(&self, name: &str, tuple: &[NodeId]) -> Result<bool, Error> {
        self.db.contains(name, tuple)
    }

    /// Register a Horn clause. Fails if an atom names an unregistered
    /// relation or has the wrong arity, or if a head or negated variable is
    /// not bound by a positive body atom.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), Error> {
        let compiled = compile(&self.db, &rule)?;
        self.rules.push(compiled);
        Ok(())
    }

    /// Compute, for every rule-headed relation, the smallest set of tuples
    /// satisfying all rules simultaneously given the current base facts.
    /// Fails only when the rules have no valid stratification.
    pub fn solve(&mut self) -> Result<(), Error> {
        let strata = stratify(&self.db, &self.rules)?;
        let last = self
            .rules
            .iter()
            .map(|rule| strata[rule.head_rel])
            .max()
            .unwrap_or(0);
        for s in 0..=last {
            let rules: Vec<CRule> = self
                .rules
                .iter()
                .filter(|rule| strata[rule.head_rel] == s)
                .cloned()
                .collect();
            if rules.is_empty() {
                continue;
            }
            debug!(stratum = s, rules = rules.len(), "solving stratum");
            fixpoint(&mut self.db, &rules);
        }
        self.solved = true;

        #[cfg(feature = "count")]
        for rel in 0..self.db.num_relations() {
            eprintln!("{} {}", self.db.name(rel), self.db.set(rel).len());
        }

        Ok(())
    }

    /// Final contents of a relation, sorted for stable output. Fails with
    /// [`Error::NotSolved`] before [`Engine::solve`] has completed.
    pub fn tuples_of(&self, name: &str) -> Result<Vec<Tuple>, Error> {
        if !self.solved {
            return Err(Error::NotSolved);
        }
        let mut tuples: Vec<Tuple> = self.db.tuples(name)?.cloned().collect();
        tuples.sort_unstable();
        Ok(tuples)
    }
}

type Delta = FxHashMap<RelId, FxHashSet<Tuple>>;

/// Run one stratum's rules to a fixpoint.
fn fixpoint(db: &mut Database, rules: &[CRule]) {
    let local: FxHashSet<RelId> = rules.iter().map(|rule| rule.head_rel).collect();

    // Seeding pass: every rule against the full store.
    let mut delta: Delta = FxHashMap::default();
    for rule in rules {
        let mut derived = Vec::new();
        evaluate(db, rule, None, &mut derived);
        for tuple in derived {
            if !db.set(rule.head_rel).contains(&tuple) {
                delta.entry(rule.head_rel).or_default().insert(tuple);
            }
        }
    }
    merge(db, &delta);

    // Delta rounds: a new derivation must read at least one tuple that was
    // new in the previous round, so each rule is re-run once per positive
    // atom over a relation this stratum is still growing, with that atom
    // restricted to the previous round's delta.
    let mut round = 0usize;
    while delta.values().any(|tuples| !tuples.is_empty()) {
        round += 1;
        let mut next: Delta = FxHashMap::default();
        for rule in rules {
            for (idx, atom) in rule.positive.iter().enumerate() {
                if !local.contains(&atom.rel) {
                    continue;
                }
                let Some(restricted) = delta.get(&atom.rel) else {
                    continue;
                };
                if restricted.is_empty() {
                    continue;
                }
                let mut derived = Vec::new();
                evaluate(db, rule, Some((idx, restricted)), &mut derived);
                for tuple in derived {
                    if !db.set(rule.head_rel).contains(&tuple) {
                        next.entry(rule.head_rel).or_default().insert(tuple);
                    }
                }
            }
        }
        let new: usize = next.values().map(|tuples| tuples.len()).sum();
        trace!(round, new, "fixpoint round");
        merge(db, &next);
        delta = next;
    }
}

fn merge(db: &mut Database, delta: &Delta) {
    for (&rel, tuples) in delta {
        for tuple in tuples {
            db.insert_tuple(rel, tuple.clone());
        }
    }
}

/// Evaluate one rule body, optionally restricting the positive atom at
/// `delta.0` to the tuples in `delta.1`, pushing every resulting head
/// instantiation.
fn evaluate(
    db: &Database,
    rule: &CRule,
    delta: Option<(usize, &FxHashSet<Tuple>)>,
    out: &mut Vec<Tuple>,
) {
    let mut env: Vec<Option<NodeId>> = vec![None; rule.vars];
    join(db, rule, 0, delta, &mut env, out);
}

fn join(
    db: &Database,
    rule: &CRule,
    idx: usize,
    delta: Option<(usize, &FxHashSet<Tuple>)>,
    env: &mut [Option<NodeId>],
    out: &mut Vec<Tuple>,
) {
    if idx == rule.positive.len() {
        // Negated atoms are ground by now; they read relations completed in
        // earlier strata.
        for atom in &rule.negative {
            let tuple: Tuple = atom.terms.iter().map(|term| ground(env, term)).collect();
            if db.set(atom.rel).contains(&tuple) {
                return;
            }
        }
        out.push(rule.head.iter().map(|term| ground(env, term)).collect());
        return;
    }
    let atom = &rule.positive[idx];
    let source = match delta {
        Some((restricted, tuples)) if restricted == idx => tuples,
        _ => db.set(atom.rel),
    };
    for tuple in source {
        if let Some(bound) = bind(&atom.terms, tuple, env) {
            join(db, rule, idx + 1, delta, env, out);
            for var in bound {
                env[var] = None;
            }
        }
    }
}

/// Match an atom's terms against one tuple, extending `env`. Returns the
/// variables newly bound, or `None` (with `env` unchanged) on mismatch.
fn bind(terms: &[CTerm], tuple: &[NodeId], env: &mut [Option<NodeId>]) -> Option<Vec<usize>> {
    let mut bound = Vec::new();
    for (term, &value) in terms.iter().zip(tuple) {
        let ok = match term {
            CTerm::Const(node) => *node == value,
            CTerm::Var(var) => match env[*var] {
                Some(seen) => seen == value,
                None => {
                    env[*var] = Some(value);
                    bound.push(*var);
                    true
                }
            },
        };
        if !ok {
            for var in bound {
                env[var] = None;
            }
            return None;
        }
    }
    Some(bound)
}

fn ground(env: &[Option<NodeId>], term: &CTerm) -> NodeId {
    match term {
        CTerm::Const(node) => *node,
        // The range restriction checked at `add_rule` guarantees a binding.
        CTerm::Var(var) => env[*var].expect("unbound variable in a checked rule"),
    }
}
