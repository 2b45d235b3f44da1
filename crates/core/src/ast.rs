//! Raw model types produced by the parser.
//!
//! These mirror the model file one-to-one: nothing is resolved here. Tied
//! parameters are still references, and `trans` may still be a bare list of
//! target names. The normalizer and matrix builder consume these.

use serde::Serialize;
use std::collections::BTreeMap;

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

// ──────────────────────────────────────────────
// Header
// ──────────────────────────────────────────────

/// The `header { key value; ... }` block. Values are single verbatim tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Header {
    pub entries: BTreeMap<String, String>,
}

impl Header {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The declared emission alphabet, in declaration order.
    pub fn alphabet(&self) -> Option<Vec<char>> {
        self.get("alphabet").map(|a| a.chars().collect())
    }
}

// ──────────────────────────────────────────────
// States
// ──────────────────────────────────────────────

/// Key→probability pairs in declaration order. Order is significant: tied
/// transitions are paired with a parent's values by position.
pub type ProbTable = Vec<(String, f64)>;

/// A field value as written in a state block.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `key:prob key:prob ...`
    Map(ProbTable),
    /// Bare identifiers, e.g. the target list of a tied state.
    List(Vec<String>),
    /// `type` and `end`.
    Int(i64),
    /// Any other field: one verbatim token.
    Scalar(String),
}

/// A state block before tie resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawState {
    pub fields: BTreeMap<String, FieldValue>,
    pub prov: Provenance,
}

impl RawState {
    pub fn new(prov: Provenance) -> Self {
        RawState {
            fields: BTreeMap::new(),
            prov,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// The field as a probability table, if it was written as one.
    pub fn table(&self, field: &str) -> Option<&ProbTable> {
        match self.fields.get(field) {
            Some(FieldValue::Map(m)) => Some(m),
            _ => None,
        }
    }

    /// The field as a single token (`label`, `tied_trans`, `tied_letter`, ...).
    pub fn scalar(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(FieldValue::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(FieldValue::Int(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Output of the parser: one header plus every state in file order.
#[derive(Debug, Clone)]
pub struct RawModel {
    pub header: Header,
    pub states: Vec<(String, RawState)>,
}

impl RawModel {
    pub fn state(&self, name: &str) -> Option<&RawState> {
        self.states.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}
