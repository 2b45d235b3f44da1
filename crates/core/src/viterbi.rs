//! Log-space Viterbi decoding over a matrix-form [`Model`].
//!
//! The recurrence runs over (observation position, state):
//!
//! ```text
//! M[0][s] = ln initial[s] + ln emissions[s][x0]
//! M[t][j] = max_k (M[t-1][k] + ln transitions[k][j]) + ln emissions[j][xt]
//! ```
//!
//! Zero probabilities become `-inf` and simply forbid the corresponding
//! start, move or emission. Maximization scans states in index order and
//! only replaces the running best on a strictly greater score, so ties go
//! to the lowest state index, both for back-pointers and for the final
//! state.
//!
//! Cost is O(T·S²) time and O(T·S) space for T symbols and S states.

use crate::error::HmmError;
use crate::matrix::{Model, BEGIN_STATE};
use serde::Serialize;
use std::ops::Index;

// ---------------------------------------------------------------------------
// ScoreMatrix
// ---------------------------------------------------------------------------

/// The dynamic-programming table `M`, one row per observed symbol and one
/// column per state, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ScoreMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        ScoreMatrix {
            rows,
            cols,
            data: vec![f64::NEG_INFINITY; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, t: usize, s: usize) -> f64 {
        self.data[t * self.cols + s]
    }

    /// Scores of every state after the first `t + 1` symbols.
    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.cols..(t + 1) * self.cols]
    }

    fn set(&mut self, t: usize, s: usize, v: f64) {
        self.data[t * self.cols + s] = v;
    }
}

impl Index<(usize, usize)> for ScoreMatrix {
    type Output = f64;

    fn index(&self, (t, s): (usize, usize)) -> &f64 {
        &self.data[t * self.cols + s]
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// The optimal path for one sequence together with the full score table.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoding {
    states: Vec<usize>,
    path: Vec<String>,
    scores: ScoreMatrix,
}

impl Decoding {
    /// One output label per observed symbol.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The labels concatenated, e.g. `"iiiMMMoo"`.
    pub fn path_string(&self) -> String {
        self.path.concat()
    }

    /// State index chosen at every position.
    pub fn states(&self) -> &[usize] {
        &self.states
    }

    pub fn scores(&self) -> &ScoreMatrix {
        &self.scores
    }

    /// Log-probability of the optimal path; `-inf` when the sequence is
    /// empty or cannot be produced by the model.
    pub fn log_probability(&self) -> f64 {
        match self.states.last() {
            Some(&s) => self.scores.get(self.scores.rows() - 1, s),
            None => f64::NEG_INFINITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A model converted to log space once, reusable for many sequences.
#[derive(Debug, Clone)]
pub struct Decoder<'m> {
    model: &'m Model,
    log_initial: Vec<f64>,
    log_transitions: Vec<Vec<f64>>,
    log_emissions: Vec<Vec<f64>>,
}

fn ln_rows(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| row.iter().map(|p| p.ln()).collect())
        .collect()
}

impl<'m> Decoder<'m> {
    pub fn new(model: &'m Model) -> Self {
        Decoder {
            model,
            log_initial: model.initial.iter().map(|p| p.ln()).collect(),
            log_transitions: ln_rows(&model.transitions),
            log_emissions: ln_rows(&model.emissions),
        }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Map every symbol to its emission column.
    pub fn encode(&self, sequence: &str) -> Result<Vec<usize>, HmmError> {
        sequence
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                self.model
                    .char_map
                    .get(&symbol)
                    .copied()
                    .ok_or(HmmError::Alphabet { symbol, position })
            })
            .collect()
    }

    /// Most probable state path for `sequence`.
    ///
    /// # Errors
    ///
    /// - [`HmmError::Alphabet`] if a symbol is outside the model alphabet.
    /// - [`HmmError::Label`] if the optimal path passes through a state
    ///   without a `label`.
    pub fn decode(&self, sequence: &str) -> Result<Decoding, HmmError> {
        let obs = self.encode(sequence)?;
        let n = self.model.num_states();
        let t_len = obs.len();

        let mut scores = ScoreMatrix::new(t_len, n);
        if t_len == 0 {
            return Ok(Decoding {
                states: Vec::new(),
                path: Vec::new(),
                scores,
            });
        }
        if n == 0 {
            return Err(HmmError::reference(
                BEGIN_STATE,
                "trans",
                "model has no states to decode with",
            ));
        }

        let mut back = vec![0usize; t_len * n];

        for s in 0..n {
            scores.set(0, s, self.log_initial[s] + self.log_emissions[s][obs[0]]);
        }

        for t in 1..t_len {
            let sym = obs[t];
            for j in 0..n {
                let mut best_k = 0;
                let mut best = f64::NEG_INFINITY;
                for k in 0..n {
                    let cand = scores.get(t - 1, k) + self.log_transitions[k][j];
                    if cand > best {
                        best = cand;
                        best_k = k;
                    }
                }
                scores.set(t, j, best + self.log_emissions[j][sym]);
                back[t * n + j] = best_k;
            }
        }

        let mut state = argmax(scores.row(t_len - 1));
        let mut states = Vec::with_capacity(t_len);
        let mut path = Vec::with_capacity(t_len);
        for t in (0..t_len).rev() {
            let label = self.model.label(state).ok_or_else(|| HmmError::Label {
                state,
                name: self.model.state_name(state).unwrap_or_default().to_owned(),
                position: t,
            })?;
            states.push(state);
            path.push(label.to_owned());
            state = back[t * n + state];
        }
        states.reverse();
        path.reverse();

        tracing::trace!(
            length = t_len,
            log_probability = scores.get(t_len - 1, states[t_len - 1]),
            "decoded sequence"
        );
        Ok(Decoding {
            states,
            path,
            scores,
        })
    }
}

/// Index of the first maximum; 0 when every entry is `-inf`.
fn argmax(row: &[f64]) -> usize {
    let mut best_s = 0;
    let mut best = f64::NEG_INFINITY;
    for (s, &v) in row.iter().enumerate() {
        if v > best {
            best = v;
            best_s = s;
        }
    }
    best_s
}

/// Decode a single sequence; see [`Decoder::decode`].
pub fn optimal_path(model: &Model, sequence: &str) -> Result<Decoding, HmmError> {
    Decoder::new(model).decode(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::parse_model;

    const TOY: &str = "
header { alphabet ab; }
begin { trans X:0.6 Y:0.4; }
X { trans X:0.7 Y:0.3; only a:0.9 b:0.1; label x; }
Y { trans X:0.4 Y:0.6; only a:0.2 b:0.8; label y; }
";

    fn toy() -> Model {
        parse_model(TOY, "toy.model").expect("toy model builds")
    }

    #[test]
    fn matches_hand_computed_path() {
        // M[4][X] = 0.6*0.9 * 0.7*0.9 * 0.3*0.8 * 0.6*0.8 * 0.4*0.9
        let model = toy();
        let decoding = optimal_path(&model, "aabba").unwrap();
        assert_eq!(decoding.path_string(), "xxyyx");
        assert_eq!(decoding.states(), &[0, 0, 1, 1, 0]);
        let expected = (0.0141087744f64).ln();
        assert!((decoding.log_probability() - expected).abs() < 1e-9);
        assert!((decoding.scores()[(0, 1)] - (0.08f64).ln()).abs() < 1e-12);
        assert_eq!(decoding.scores().rows(), 5);
        assert_eq!(decoding.scores().cols(), 2);
    }

    #[test]
    fn repeated_decoding_is_identical() {
        let model = toy();
        let decoder = Decoder::new(&model);
        let first = decoder.decode("abbbaab").unwrap();
        let second = decoder.decode("abbbaab").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, optimal_path(&model, "abbbaab").unwrap());
    }

    #[test]
    fn ties_go_to_the_lowest_state_index() {
        let model = parse_model(
            "header { alphabet a; }
             begin { trans P:0.5 Q:0.5; }
             P { trans P:0.5 Q:0.5; only a:1; label p; }
             Q { trans P:0.5 Q:0.5; only a:1; label q; }",
            "tie.model",
        )
        .unwrap();
        for _ in 0..3 {
            let decoding = optimal_path(&model, "aaaa").unwrap();
            assert_eq!(decoding.path_string(), "pppp");
            let row = decoding.scores().row(3);
            assert_eq!(row[0], row[1]);
        }
    }

    #[test]
    fn states_missing_from_begin_are_never_started_in() {
        let model = parse_model(
            "header { alphabet a; }
             begin { trans Q:1; }
             P { trans P:1; only a:1; label p; }
             Q { trans P:0.5 Q:0.5; only a:0.1; label q; }",
            "start.model",
        )
        .unwrap();
        let decoding = optimal_path(&model, "aa").unwrap();
        assert_eq!(decoding.scores().get(0, 0), f64::NEG_INFINITY);
        assert_eq!(decoding.path_string(), "qp");
    }

    #[test]
    fn out_of_alphabet_symbol_is_an_error() {
        let model = toy();
        let err = optimal_path(&model, "abz").unwrap_err();
        assert_eq!(
            err,
            HmmError::Alphabet {
                symbol: 'z',
                position: 2
            }
        );
        // lower case is not folded
        assert!(optimal_path(&model, "A").is_err());
    }

    #[test]
    fn unlabeled_state_on_the_path_is_an_error() {
        let model = parse_model(
            "header { alphabet a; }
             begin { trans S:1; }
             S { trans S:1; only a:1; }",
            "nolabel.model",
        )
        .unwrap();
        let err = optimal_path(&model, "aaa").unwrap_err();
        assert_eq!(
            err,
            HmmError::Label {
                state: 0,
                name: "S".into(),
                position: 2
            }
        );
    }

    #[test]
    fn empty_sequence_decodes_to_empty_path() {
        let model = toy();
        let decoding = optimal_path(&model, "").unwrap();
        assert!(decoding.path().is_empty());
        assert_eq!(decoding.scores().rows(), 0);
        assert_eq!(decoding.log_probability(), f64::NEG_INFINITY);
    }

    #[test]
    fn impossible_sequence_has_negative_infinite_score() {
        let model = parse_model(
            "header { alphabet ab; }
             begin { trans P:0.5 Q:0.5; }
             P { trans P:1; only a:1; label p; }
             Q { trans Q:1; only a:1; label q; }",
            "impossible.model",
        )
        .unwrap();
        let decoding = optimal_path(&model, "ab").unwrap();
        assert_eq!(decoding.log_probability(), f64::NEG_INFINITY);
        assert_eq!(decoding.states(), &[0, 0]);
    }
}
