//! Tie resolution: make every state carry its own `trans` and `only` tables.
//!
//! `tied_letter P` replaces the state's emission table with a copy of `P`'s.
//! `tied_trans P` keeps the state's own list of targets and pairs it, by
//! position, with the probabilities of `P`'s transition table in `P`'s
//! declaration order. The pairing is by position, not by name: targets
//! `[A, B]` tied to a parent written `trans B:0.2 A:0.8;` get `A:0.2 B:0.8`.
//!
//! Parents are resolved before they are copied from, so ties may point
//! forward in the file and may chain.

use crate::ast::{FieldValue, ProbTable, RawModel, RawState};
use crate::error::HmmError;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tie {
    Trans,
    Letter,
}

impl Tie {
    fn tie_field(self) -> &'static str {
        match self {
            Tie::Trans => "tied_trans",
            Tie::Letter => "tied_letter",
        }
    }

    fn table_field(self) -> &'static str {
        match self {
            Tie::Trans => "trans",
            Tie::Letter => "only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mark {
    Pending,
    InProgress,
    Done,
}

struct Resolver<'a> {
    states: &'a mut [(String, RawState)],
    index: &'a HashMap<String, usize>,
    tie: Tie,
    marks: Vec<Mark>,
}

impl<'a> Resolver<'a> {
    fn run(&mut self) -> Result<(), HmmError> {
        for i in 0..self.states.len() {
            self.resolve(i)?;
        }
        Ok(())
    }

    fn resolve(&mut self, i: usize) -> Result<(), HmmError> {
        let tie_field = self.tie.tie_field();
        let table_field = self.tie.table_field();
        match self.marks[i] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(HmmError::reference(
                    &self.states[i].0,
                    tie_field,
                    "tie cycle",
                ))
            }
            Mark::Pending => {}
        }

        let Some(parent_name) = self.states[i].1.scalar(tie_field).map(str::to_owned) else {
            self.marks[i] = Mark::Done;
            return Ok(());
        };
        self.marks[i] = Mark::InProgress;

        let name = self.states[i].0.clone();
        let parent = *self.index.get(&parent_name).ok_or_else(|| {
            HmmError::reference(
                &name,
                tie_field,
                format!("tied to unknown state '{}'", parent_name),
            )
        })?;
        self.resolve(parent)?;

        let parent_table = self.states[parent]
            .1
            .table(table_field)
            .cloned()
            .ok_or_else(|| {
                HmmError::reference(
                    &name,
                    tie_field,
                    format!(
                        "tied state '{}' has no '{}' table to inherit",
                        parent_name, table_field
                    ),
                )
            })?;

        let table = match self.tie {
            Tie::Letter => parent_table,
            Tie::Trans => {
                let targets = tied_targets(&name, &self.states[i].1)?;
                if targets.len() != parent_table.len() {
                    tracing::warn!(
                        state = %name,
                        parent = %parent_name,
                        targets = targets.len(),
                        parent_values = parent_table.len(),
                        "tied transition lists differ in length; extra entries are dropped"
                    );
                }
                targets
                    .into_iter()
                    .zip(parent_table.into_iter().map(|(_, p)| p))
                    .collect()
            }
        };

        tracing::debug!(state = %name, parent = %parent_name, field = table_field, "resolved tie");
        self.states[i]
            .1
            .fields
            .insert(table_field.to_owned(), FieldValue::Map(table));
        self.marks[i] = Mark::Done;
        Ok(())
    }
}

/// Target names a `tied_trans` state declares, in its own written order.
fn tied_targets(name: &str, state: &RawState) -> Result<Vec<String>, HmmError> {
    match state.get("trans") {
        Some(FieldValue::List(targets)) => Ok(targets.clone()),
        Some(FieldValue::Map(table)) => Ok(table.iter().map(|(k, _)| k.clone()).collect()),
        _ => Err(HmmError::reference(
            name,
            "tied_trans",
            "tied transitions need a 'trans' list naming the target states",
        )),
    }
}

/// Resolve every `tied_trans` and `tied_letter` reference in place.
pub fn normalize(mut model: RawModel) -> Result<RawModel, HmmError> {
    let index: HashMap<String, usize> = model
        .states
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.clone(), i))
        .collect();

    for tie in [Tie::Trans, Tie::Letter] {
        let marks = vec![Mark::Pending; model.states.len()];
        Resolver {
            states: &mut model.states,
            index: &index,
            tie,
            marks,
        }
        .run()?;
    }
    Ok(model)
}

/// Look up a resolved table, reporting which state lacks it.
pub(crate) fn concrete_table<'s>(
    name: &str,
    state: &'s RawState,
    field: &str,
) -> Result<&'s ProbTable, HmmError> {
    match state.get(field) {
        Some(FieldValue::Map(table)) => Ok(table),
        Some(FieldValue::List(_)) => Err(HmmError::reference(
            name,
            field,
            "bare name list without a tie to take probabilities from",
        )),
        Some(_) => Err(HmmError::reference(
            name,
            field,
            "expected a key:probability table",
        )),
        None => Err(HmmError::reference(name, field, "missing")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser};

    fn normalized(src: &str) -> Result<RawModel, HmmError> {
        let tokens = lexer::lex(&lexer::strip_comments(src));
        normalize(parser::parse(&tokens, "tie.model")?)
    }

    fn table(model: &RawModel, state: &str, field: &str) -> ProbTable {
        model.state(state).unwrap().table(field).unwrap().clone()
    }

    fn pairs(items: &[(&str, f64)]) -> ProbTable {
        items.iter().map(|(k, p)| (k.to_string(), *p)).collect()
    }

    #[test]
    fn tied_letter_copies_parent_emissions() {
        let model = normalized(
            "header { alphabet AB; }
             P { trans P:1; only A:0.3 B:0.7; }
             Q { trans Q:1; only A:0.5 B:0.5; tied_letter P; }",
        )
        .unwrap();
        assert_eq!(table(&model, "Q", "only"), table(&model, "P", "only"));
    }

    #[test]
    fn tied_trans_pairs_by_position_in_parent_order() {
        // Parent lists Q before P; the dependent lists P before Q.
        let model = normalized(
            "header { alphabet A; }
             P { trans Q:0.25 P:0.75; only A:1; }
             Q { tied_trans P; trans P Q; only A:1; }",
        )
        .unwrap();
        assert_eq!(table(&model, "Q", "trans"), pairs(&[("P", 0.25), ("Q", 0.75)]));
        // the parent is untouched
        assert_eq!(table(&model, "P", "trans"), pairs(&[("Q", 0.25), ("P", 0.75)]));
    }

    #[test]
    fn forward_and_chained_ties_resolve() {
        let model = normalized(
            "header { alphabet AB; }
             C { tied_letter B; tied_trans B; trans C; }
             B { tied_letter A; tied_trans A; trans B; }
             A { trans A:0.9; only A:0.4 B:0.6; }",
        )
        .unwrap();
        assert_eq!(table(&model, "C", "only"), pairs(&[("A", 0.4), ("B", 0.6)]));
        assert_eq!(table(&model, "C", "trans"), pairs(&[("C", 0.9)]));
        assert_eq!(table(&model, "B", "trans"), pairs(&[("B", 0.9)]));
    }

    #[test]
    fn length_mismatch_truncates_like_zip() {
        let model = normalized(
            "header { alphabet A; }
             P { trans P:0.5 Q:0.3 R:0.2; only A:1; }
             Q { tied_trans P; trans Q R; only A:1; }
             R { tied_trans Q; trans R P Q; only A:1; }",
        )
        .unwrap();
        assert_eq!(table(&model, "Q", "trans"), pairs(&[("Q", 0.5), ("R", 0.3)]));
        assert_eq!(table(&model, "R", "trans"), pairs(&[("R", 0.5), ("P", 0.3)]));
    }

    #[test]
    fn repeated_parent_key_counts_once_when_pairing() {
        let model = normalized(
            "header { alphabet A; }
             P { trans P:0.1 Q:0.7 P:0.3; only A:1; }
             Q { tied_trans P; trans Q P; only A:1; }",
        )
        .unwrap();
        assert_eq!(table(&model, "Q", "trans"), pairs(&[("Q", 0.3), ("P", 0.7)]));
    }

    #[test]
    fn unknown_tie_target_is_a_reference_error() {
        let err = normalized("header { alphabet A; } S { tied_letter Nope; trans S:1; }")
            .unwrap_err();
        assert_eq!(
            err,
            HmmError::reference("S", "tied_letter", "tied to unknown state 'Nope'")
        );
    }

    #[test]
    fn tie_cycles_are_reported() {
        let err = normalized(
            "header { alphabet A; }
             S { tied_letter T; }
             T { tied_letter S; }",
        )
        .unwrap_err();
        assert_eq!(err.kind(), "reference");
        assert!(err.to_string().contains("tie cycle"), "{}", err);
    }

    #[test]
    fn tied_trans_without_targets_is_rejected() {
        let err = normalized(
            "header { alphabet A; }
             P { trans P:1; only A:1; }
             Q { tied_trans P; only A:1; }",
        )
        .unwrap_err();
        assert_eq!(err.kind(), "reference");
    }
}
