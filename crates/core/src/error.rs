use serde::Serialize;

/// Every way loading a model or decoding a sequence can fail.
///
/// None of these are recoverable inside the core: a malformed model aborts
/// construction and never yields a partial [`Model`](crate::Model).
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HmmError {
    /// Malformed token stream: missing punctuation, unexpected end of input,
    /// leftover tokens, bad numeric literals, duplicate state names.
    #[error("{file}:{line}: {message}")]
    Grammar {
        file: String,
        line: u32,
        message: String,
    },

    /// A name in the model that does not resolve: tie targets, transition
    /// targets, emission symbols, the `begin` state, the header alphabet.
    #[error("state '{state}', field '{field}': {message}")]
    Reference {
        state: String,
        field: String,
        message: String,
    },

    /// The input sequence contains a symbol outside the model alphabet.
    #[error("symbol '{symbol}' at position {position} is not in the model alphabet")]
    Alphabet { symbol: char, position: usize },

    /// Backtracking reached a state that declares no output label.
    #[error("state {state} ('{name}') reached at position {position} has no label")]
    Label {
        state: usize,
        name: String,
        position: usize,
    },

    #[error("cannot read '{file}': {message}")]
    Io { file: String, message: String },
}

impl HmmError {
    pub fn grammar(file: &str, line: u32, message: impl Into<String>) -> Self {
        HmmError::Grammar {
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn reference(state: &str, field: &str, message: impl Into<String>) -> Self {
        HmmError::Reference {
            state: state.to_owned(),
            field: field.to_owned(),
            message: message.into(),
        }
    }

    /// Stable lowercase tag naming the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            HmmError::Grammar { .. } => "grammar",
            HmmError::Reference { .. } => "reference",
            HmmError::Alphabet { .. } => "alphabet",
            HmmError::Label { .. } => "label",
            HmmError::Io { .. } => "io",
        }
    }

    /// Flat JSON object with the error class, its fields and the rendered
    /// message, for machine-readable output.
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self)
            .unwrap_or_else(|_| serde_json::json!({ "kind": self.kind() }));
        if let Some(obj) = value.as_object_mut() {
            obj.entry("message")
                .or_insert_with(|| serde_json::Value::String(self.to_string()));
            obj.insert(
                "display".to_owned(),
                serde_json::Value::String(self.to_string()),
            );
        }
        value
    }
}
