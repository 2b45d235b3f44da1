//! tmhmm-core: TMHMM model parsing and Viterbi decoding.
//!
//! Turns a model written in the TMHMM description language into dense
//! matrices and finds the most probable labelled state path for a
//! sequence.
//!
//! # Public API
//!
//! - [`parse_model()`] / [`load_model()`] -- run the full loading pipeline
//! - [`Model`] -- matrix-form model (initial, transitions, emissions, maps)
//! - [`Decoder`] / [`optimal_path()`] -- log-space Viterbi decoding
//! - [`summarize()`] -- collapse a label path into [`Segment`]s
//! - [`HmmError`] -- every failure the pipeline or decoder reports
//!
//! The stage functions ([`lexer::lex`], [`parser::parse`],
//! [`normalize::normalize`], [`matrix::build`]) are public for selective
//! pipeline execution.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod load;
pub mod matrix;
pub mod normalize;
pub mod parser;
pub mod summary;
pub mod viterbi;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{FieldValue, Header, ProbTable, Provenance, RawModel, RawState};
pub use error::HmmError;
pub use matrix::{Model, BEGIN_STATE};
pub use summary::Segment;
pub use viterbi::{Decoder, Decoding, ScoreMatrix};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use load::{load_model, parse_model};
pub use summary::summarize;
pub use viterbi::optimal_path;
