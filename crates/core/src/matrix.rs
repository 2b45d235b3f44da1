//! Matrix form of a normalized model.
//!
//! States are numbered in file order with `begin` removed; symbols are
//! numbered in alphabet order. Every matrix shares those two index spaces.
//! Entries a state does not mention stay at probability 0; rows are not
//! renormalized.

use crate::ast::{Header, RawModel};
use crate::error::HmmError;
use crate::normalize::concrete_table;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Name of the pseudo-state whose transitions give initial probabilities.
pub const BEGIN_STATE: &str = "begin";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub header: Header,
    /// `initial[s]`: probability of starting in state `s`.
    pub initial: Vec<f64>,
    /// `transitions[i][j]`: probability of moving from state `i` to `j`.
    pub transitions: Vec<Vec<f64>>,
    /// `emissions[s][c]`: probability that state `s` emits symbol `c`.
    pub emissions: Vec<Vec<f64>>,
    pub char_map: BTreeMap<char, usize>,
    /// Output label of every state that declares one.
    pub label_map: BTreeMap<usize, String>,
    /// `name_map[s]`: the state's name in the model file.
    pub name_map: Vec<String>,
}

impl Model {
    pub fn num_states(&self) -> usize {
        self.name_map.len()
    }

    /// Alphabet symbols in column order.
    pub fn alphabet(&self) -> Vec<char> {
        let mut symbols: Vec<(char, usize)> =
            self.char_map.iter().map(|(c, i)| (*c, *i)).collect();
        symbols.sort_by_key(|(_, i)| *i);
        symbols.into_iter().map(|(c, _)| c).collect()
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.name_map.iter().position(|n| n == name)
    }

    pub fn state_name(&self, index: usize) -> Option<&str> {
        self.name_map.get(index).map(String::as_str)
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.label_map.get(&index).map(String::as_str)
    }
}

/// Build the matrix form from a model whose ties are already resolved.
pub fn build(model: RawModel) -> Result<Model, HmmError> {
    let RawModel { header, mut states } = model;

    let alphabet = header.alphabet().ok_or_else(|| {
        HmmError::reference("header", "alphabet", "header declares no alphabet")
    })?;

    let begin_pos = states
        .iter()
        .position(|(name, _)| name == BEGIN_STATE)
        .ok_or_else(|| {
            HmmError::reference(BEGIN_STATE, "trans", "model declares no begin state")
        })?;
    let (_, begin) = states.remove(begin_pos);

    let state_map: HashMap<&str, usize> = states
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();

    let mut char_map: BTreeMap<char, usize> = BTreeMap::new();
    for (i, c) in alphabet.iter().enumerate() {
        if char_map.insert(*c, i).is_some() {
            return Err(HmmError::reference(
                "header",
                "alphabet",
                format!("symbol '{}' is declared twice", c),
            ));
        }
    }

    let n = states.len();
    let mut initial = vec![0.0; n];
    let mut transitions = vec![vec![0.0; n]; n];
    let mut emissions = vec![vec![0.0; alphabet.len()]; n];
    let mut label_map = BTreeMap::new();

    for (to, prob) in concrete_table(BEGIN_STATE, &begin, "trans")? {
        initial[target(&state_map, BEGIN_STATE, to)?] = *prob;
    }

    for (i, (name, state)) in states.iter().enumerate() {
        if let Some(label) = state.scalar("label") {
            label_map.insert(i, label.to_owned());
        }

        for (to, prob) in concrete_table(name, state, "trans")? {
            transitions[i][target(&state_map, name, to)?] = *prob;
        }

        for (symbol, prob) in concrete_table(name, state, "only")? {
            let column = single_char(symbol)
                .and_then(|c| char_map.get(&c).copied())
                .ok_or_else(|| {
                    HmmError::reference(
                        name,
                        "only",
                        format!("symbol '{}' is not in the alphabet", symbol),
                    )
                })?;
            emissions[i][column] = *prob;
        }
    }

    let name_map: Vec<String> = states.into_iter().map(|(name, _)| name).collect();
    tracing::debug!(
        states = n,
        symbols = alphabet.len(),
        labelled = label_map.len(),
        "built matrix form"
    );

    Ok(Model {
        header,
        initial,
        transitions,
        emissions,
        char_map,
        label_map,
        name_map,
    })
}

fn target(state_map: &HashMap<&str, usize>, from: &str, to: &str) -> Result<usize, HmmError> {
    state_map.get(to).copied().ok_or_else(|| {
        HmmError::reference(from, "trans", format!("unknown target state '{}'", to))
    })
}

fn single_char(symbol: &str) -> Option<char> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
