// SPDX-License-Identifier: BSD-3-Clause
//! Taint propagation and divide-by-zero alarms.
//!
//! ```text
//! Edge(i, j) :- Def(x, i), Use(x, j), Next(i, j).
//! Path(i, j) :- Edge(i, j), Taint(i).
//! Path(i, k) :- Path(i, j), Edge(j, k), !Sanitizer(j).
//! Alarm(j)   :- Path(i, j), Div(x, j).
//! ```
//!
//! An edge is a def-use chain consecutive in control flow. Paths start at
//! tainted instructions and extend along edges unless the intermediate
//! instruction sanitizes; a division at the end of a path raises an alarm.

use super::relation::{ALARM, DEF, DIV, EDGE, NEXT, PATH, SANITIZER, TAINT, USE};
use crate::datalog::{Engine, Error, Rule};

pub fn install(engine: &mut Engine) -> Result<(), Error> {
    engine.add_rule(
        Rule::new(EDGE, ["i", "j"])
            .when(DEF, ["x", "i"])
            .when(USE, ["x", "j"])
            .when(NEXT, ["i", "j"]),
    )?;
    engine.add_rule(
        Rule::new(PATH, ["i", "j"])
            .when(EDGE, ["i", "j"])
            .when(TAINT, ["i"]),
    )?;
    engine.add_rule(
        Rule::new(PATH, ["i", "k"])
            .when(PATH, ["i", "j"])
            .when(EDGE, ["j", "k"])
            .unless(SANITIZER, ["j"]),
    )?;
    engine.add_rule(
        Rule::new(ALARM, ["j"])
            .when(PATH, ["i", "j"])
            .when(DIV, ["x", "j"]),
    )?;
    Ok(())
}
