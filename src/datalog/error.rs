#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("relation {0:?} is already registered")]
    DuplicateRelation(String),

    #[error("unknown relation {0:?}")]
    UnknownRelation(String),

    #[error("relation {relation:?} has arity {expected}, got a tuple of arity {found}")]
    ArityMismatch {
        relation: String,
        expected: usize,
        found: usize,
    },

    #[error("variable {variable:?} in a rule for {relation:?} is not bound by a positive body atom")]
    UnsafeRule { relation: String, variable: String },

    #[error("rules cannot be stratified: cycle through a negation of {0:?}")]
    Stratification(String),

    #[error("relation contents queried before solve()")]
    NotSolved,
}
