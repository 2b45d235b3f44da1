//! Model loading: source text -> matrix-form [`Model`].
//!
//! Thin orchestrator over the pipeline stages, in order:
//! comment stripping, lexing, parsing, tie normalization, matrix building.

use crate::error::HmmError;
use crate::lexer;
use crate::matrix::{self, Model};
use crate::normalize;
use crate::parser;
use std::path::Path;

/// Build a model from source text. `filename` only labels grammar errors.
pub fn parse_model(src: &str, filename: &str) -> Result<Model, HmmError> {
    let tokens = lexer::lex(&lexer::strip_comments(src));
    let raw = parser::parse(&tokens, filename)?;
    let raw = normalize::normalize(raw)?;
    matrix::build(raw)
}

/// Read and build the model at `path`.
pub fn load_model(path: &Path) -> Result<Model, HmmError> {
    let filename = path.to_string_lossy();
    let src = std::fs::read_to_string(path).map_err(|e| HmmError::Io {
        file: filename.to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(file = %filename, bytes = src.len(), "read model file");
    parse_model(&src, &filename)
}
