// SPDX-License-Identifier: BSD-3-Clause
//! Finite relations over dense node identifiers, and the Horn-clause engine
//! that derives new tuples from them. Relations are registered once, grow
//! monotonically, and are never retracted from; the engine evaluates all
//! registered rules to a least fixpoint, stratum by stratum, so that negated
//! relations are complete before they are read.

use rustc_hash::{FxHashMap, FxHashSet};

mod engine;
mod error;
mod rule;
mod stratify;

pub use engine::Engine;
pub use error::Error;
pub use rule::{Atom, Literal, Rule, Term};

/// Opaque identifier naming one instruction or value of the analyzed
/// program. Assigned densely by the extraction layer; the engine only ever
/// compares these for equality.
pub type NodeId = u32;

/// One row of a relation.
pub type Tuple = Vec<NodeId>;

/// Dense index of a registered relation.
pub(crate) type RelId = usize;

#[derive(Clone, Debug)]
struct Relation {
    name: String,
    arity: usize,
    tuples: FxHashSet<Tuple>,
}

/// All relations of one analysis run. Identity is the relation name; arity
/// is fixed at registration. Insertion has set semantics.
#[derive(Clone, Debug, Default)]
pub struct Database {
    relations: Vec<Relation>,
    by_name: FxHashMap<String, RelId>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty relation of the given arity.
    pub fn register(&mut self, name: &str, arity: usize) -> Result<(), Error> {
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateRelation(name.to_string()));
        }
        let id = self.relations.len();
        self.relations.push(Relation {
            name: name.to_string(),
            arity,
            tuples: FxHashSet::default(),
        });
        self.by_name.insert(name.to_string(), id);
        Ok(())
    }

    /// Add a tuple to a registered relation. Re-inserting an existing tuple
    /// is a no-op.
    pub fn insert(&mut self, name: &str, tuple: Tuple) -> Result<(), Error> {
        let rel = self.resolve(name)?;
        self.check_arity(rel, tuple.len())?;
        self.relations[rel].tuples.insert(tuple);
        Ok(())
    }

    pub fn contains(&self, name: &str, tuple: &[NodeId]) -> Result<bool, Error> {
        let rel = self.resolve(name)?;
        self.check_arity(rel, tuple.len())?;
        Ok(self.relations[rel].tuples.contains(tuple))
    }

    /// Current tuples of a relation, in unspecified order. Rules must not
    /// depend on iteration order.
    pub fn tuples(&self, name: &str) -> Result<impl Iterator<Item = &Tuple>, Error> {
        let rel = self.resolve(name)?;
        Ok(self.relations[rel].tuples.iter())
    }

    /// Number of tuples currently in a relation.
    pub fn cardinality(&self, name: &str) -> Result<usize, Error> {
        let rel = self.resolve(name)?;
        Ok(self.relations[rel].tuples.len())
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<RelId, Error> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownRelation(name.to_string()))
    }

    pub(crate) fn check_arity(&self, rel: RelId, found: usize) -> Result<(), Error> {
        let expected = self.relations[rel].arity;
        if expected != found {
            return Err(Error::ArityMismatch {
                relation: self.relations[rel].name.clone(),
                expected,
                found,
            });
        }
        Ok(())
    }

    pub(crate) fn name(&self, rel: RelId) -> &str {
        &self.relations[rel].name
    }

    pub(crate) fn num_relations(&self) -> usize {
        self.relations.len()
    }

    pub(crate) fn set(&self, rel: RelId) -> &FxHashSet<Tuple> {
        &self.relations[rel].tuples
    }

    pub(crate) fn insert_tuple(&mut self, rel: RelId, tuple: Tuple) -> bool {
        self.relations[rel].tuples.insert(tuple)
    }
}

#[cfg(test)]
mod tests {
    use super::{Database, Error};

    #[test]
    fn registration_and_insertion() {
        let mut db = Database::new();
        db.register("next", 2).unwrap();
        assert_eq!(
            db.register("next", 2),
            Err(Error::DuplicateRelation("next".to_string()))
        );
        db.insert("next", vec![0, 1]).unwrap();
        db.insert("next", vec![0, 1]).unwrap();
        assert_eq!(db.cardinality("next").unwrap(), 1);
        assert!(db.contains("next", &[0, 1]).unwrap());
        assert!(!db.contains("next", &[1, 0]).unwrap());
    }

    #[test]
    fn arity_is_fixed() {
        let mut db = Database::new();
        db.register("taint", 1).unwrap();
        assert_eq!(
            db.insert("taint", vec![0, 1]),
            Err(Error::ArityMismatch {
                relation: "taint".to_string(),
                expected: 1,
                found: 2
            })
        );
    }
}
