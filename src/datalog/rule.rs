// SPDX-License-Identifier: BSD-3-Clause
//! Horn clauses over registered relations, and their compiled form.
//!
//! A rule is built with [`Rule::new`] for the head, then chained [`Rule::when`]
//! calls for positive body atoms and [`Rule::unless`] calls for negated ones:
//!
//! ```
//! # use yadda::datalog::Rule;
//! let out = Rule::new("out", ["x", "i"])
//!     .when("in", ["x", "i"])
//!     .unless("kill", ["x", "i"]);
//! ```

use rustc_hash::FxHashMap;

use super::{Database, Error, NodeId, RelId};

/// One argument position of an atom: a named variable or a constant node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    Var(String),
    Const(NodeId),
}

impl From<&str> for Term {
    fn from(name: &str) -> Self {
        Term::Var(name.to_string())
    }
}

impl From<String> for Term {
    fn from(name: String) -> Self {
        Term::Var(name)
    }
}

impl From<NodeId> for Term {
    fn from(node: NodeId) -> Self {
        Term::Const(node)
    }
}

/// A relation applied to terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Atom {
    pub relation: String,
    pub terms: Vec<Term>,
}

impl Atom {
    pub fn new<T: Into<Term>>(relation: &str, terms: impl IntoIterator<Item = T>) -> Self {
        Atom {
            relation: relation.to_string(),
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    Pos(Atom),
    Neg(Atom),
}

/// `head :- body`, where the body is a conjunction of positive and negated
/// atoms. Atom order carries no meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub head: Atom,
    pub body: Vec<Literal>,
}

impl Rule {
    pub fn new<T: Into<Term>>(relation: &str, terms: impl IntoIterator<Item = T>) -> Self {
        Rule {
            head: Atom::new(relation, terms),
            body: Vec::new(),
        }
    }

    /// Append a positive body atom.
    pub fn when<T: Into<Term>>(
        mut self,
        relation: &str,
        terms: impl IntoIterator<Item = T>,
    ) -> Self {
        self.body.push(Literal::Pos(Atom::new(relation, terms)));
        self
    }

    /// Append a negated body atom.
    pub fn unless<T: Into<Term>>(
        mut self,
        relation: &str,
        terms: impl IntoIterator<Item = T>,
    ) -> Self {
        self.body.push(Literal::Neg(Atom::new(relation, terms)));
        self
    }
}

// ------------------------------------------------------------------
// Compiled form

#[derive(Clone, Copy, Debug)]
pub(crate) enum CTerm {
    Var(usize),
    Const(NodeId),
}

#[derive(Clone, Debug)]
pub(crate) struct CAtom {
    pub(crate) rel: RelId,
    pub(crate) terms: Vec<CTerm>,
}

/// A rule with relation names resolved and variables interned to dense
/// indices. Positive and negated atoms are split; negated atoms are always
/// evaluated after the positives have bound every variable.
#[derive(Clone, Debug)]
pub(crate) struct CRule {
    pub(crate) head_rel: RelId,
    pub(crate) head: Vec<CTerm>,
    pub(crate) positive: Vec<CAtom>,
    pub(crate) negative: Vec<CAtom>,
    pub(crate) vars: usize,
}

/// Resolve and check a rule: every atom must name a registered relation with
/// matching arity, and every head or negated variable must occur in some
/// positive body atom (range restriction, so negated atoms ground out).
pub(crate) fn compile(db: &Database, rule: &Rule) -> Result<CRule, Error> {
    let mut names: Vec<String> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    let mut compile_atom = |atom: &Atom| -> Result<CAtom, Error> {
        let rel = db.resolve(&atom.relation)?;
        db.check_arity(rel, atom.terms.len())?;
        let terms = atom
            .terms
            .iter()
            .map(|term| match term {
                Term::Const(node) => CTerm::Const(*node),
                Term::Var(name) => {
                    let var = *index.entry(name.clone()).or_insert_with(|| {
                        names.push(name.clone());
                        names.len() - 1
                    });
                    CTerm::Var(var)
                }
            })
            .collect();
        Ok(CAtom { rel, terms })
    };

    let head = compile_atom(&rule.head)?;
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    for literal in &rule.body {
        match literal {
            Literal::Pos(atom) => positive.push(compile_atom(atom)?),
            Literal::Neg(atom) => negative.push(compile_atom(atom)?),
        }
    }

    let mut bound = vec![false; names.len()];
    for atom in &positive {
        for term in &atom.terms {
            if let CTerm::Var(var) = term {
                bound[*var] = true;
            }
        }
    }
    let check = |terms: &[CTerm]| -> Result<(), Error> {
        for term in terms {
            if let CTerm::Var(var) = term {
                if !bound[*var] {
                    return Err(Error::UnsafeRule {
                        relation: rule.head.relation.clone(),
                        variable: names[*var].clone(),
                    });
                }
            }
        }
        Ok(())
    };
    check(&head.terms)?;
    for atom in &negative {
        check(&atom.terms)?;
    }

    Ok(CRule {
        head_rel: head.rel,
        head: head.terms,
        positive,
        negative,
        vars: names.len(),
    })
}
