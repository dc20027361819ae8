// SPDX-License-Identifier: BSD-3-Clause
//! Stratification of rules by their negative dependencies.

use super::rule::CRule;
use super::{Database, Error};

/// Assign a stratum to every relation such that a rule's head sits at or
/// above each relation it reads positively, and strictly above each relation
/// it negates. Iterative relaxation over the dependency edges; a stratum
/// climbing past the relation count proves a cycle through negation.
pub(crate) fn stratify(db: &Database, rules: &[CRule]) -> Result<Vec<usize>, Error> {
    let n = db.num_relations();
    let mut stratum = vec![0usize; n];
    loop {
        let mut changed = false;
        for rule in rules {
            let head = rule.head_rel;
            for atom in &rule.positive {
                if stratum[atom.rel] > stratum[head] {
                    stratum[head] = stratum[atom.rel];
                    changed = true;
                }
            }
            for atom in &rule.negative {
                if stratum[atom.rel] + 1 > stratum[head] {
                    stratum[head] = stratum[atom.rel] + 1;
                    changed = true;
                }
            }
            if stratum[head] > n {
                return Err(Error::Stratification(db.name(head).to_string()));
            }
        }
        if !changed {
            return Ok(stratum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stratify;
    use crate::datalog::rule::compile;
    use crate::datalog::{Database, Error, Rule};

    fn db() -> Database {
        let mut db = Database::new();
        for name in ["base", "p", "q"] {
            db.register(name, 1).unwrap();
        }
        db
    }

    #[test]
    fn negation_pushes_head_up() {
        let db = db();
        let rules = vec![
            compile(&db, &Rule::new("p", ["x"]).when("base", ["x"])).unwrap(),
            compile(&db, &Rule::new("q", ["x"]).when("base", ["x"]).unless("p", ["x"])).unwrap(),
        ];
        let strata = stratify(&db, &rules).unwrap();
        let base = db.resolve("base").unwrap();
        let p = db.resolve("p").unwrap();
        let q = db.resolve("q").unwrap();
        assert_eq!(strata[base], 0);
        assert_eq!(strata[p], 0);
        assert_eq!(strata[q], 1);
    }

    #[test]
    fn mutual_negation_is_cyclic() {
        let db = db();
        let rules = vec![
            compile(&db, &Rule::new("p", ["x"]).when("base", ["x"]).unless("q", ["x"])).unwrap(),
            compile(&db, &Rule::new("q", ["x"]).when("base", ["x"]).unless("p", ["x"])).unwrap(),
        ];
        assert!(matches!(
            stratify(&db, &rules),
            Err(Error::Stratification(_))
        ));
    }
}
