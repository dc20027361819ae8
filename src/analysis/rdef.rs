// SPDX-License-Identifier: BSD-3-Clause
//! Reaching definitions.
//!
//! ```text
//! Kill(x, j) :- Def(x, i), Def(x, j).
//! Out(x, i)  :- Gen(x, i).
//! Out(x, i)  :- In(x, i), !Kill(x, i).
//! In(x, j)   :- Out(x, i), Next(i, j).
//! ```
//!
//! A definition of `x` at `j` kills every definition site of `x`, its own
//! included; the reflexive pair is harmless because `Gen` re-derives `Out`
//! at the definition site itself.

use super::relation::{DEF, GEN, IN, KILL, NEXT, OUT};
use crate::datalog::{Engine, Error, Rule};

pub fn install(engine: &mut Engine) -> Result<(), Error> {
    engine.add_rule(
        Rule::new(KILL, ["x", "j"])
            .when(DEF, ["x", "i"])
            .when(DEF, ["x", "j"]),
    )?;
    engine.add_rule(Rule::new(OUT, ["x", "i"]).when(GEN, ["x", "i"]))?;
    engine.add_rule(
        Rule::new(OUT, ["x", "i"])
            .when(IN, ["x", "i"])
            .unless(KILL, ["x", "i"]),
    )?;
    engine.add_rule(
        Rule::new(IN, ["x", "j"])
            .when(OUT, ["x", "i"])
            .when(NEXT, ["i", "j"]),
    )?;
    Ok(())
}
