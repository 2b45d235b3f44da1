//! Configuration file for `tmhmm`.
//!
//! Maps output labels to the names printed in segment summaries and can
//! name a default model.
//!
//! # Example
//!
//! ```toml
//! model = "models/TMHMM2.0.model"
//!
//! [labels]
//! M = "transmembrane helix"
//! s = "signal peptide"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Friendly names for the labels of the standard TMHMM model.
const DEFAULT_LABELS: [(&str, &str); 4] = [
    ("i", "inside"),
    ("M", "transmembrane helix"),
    ("o", "outside"),
    ("O", "outside"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Model used by `decode` when `--model` is not given.
    pub model: Option<PathBuf>,
    /// Label -> friendly name. File entries override the defaults.
    pub labels: BTreeMap<String, String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            model: None,
            labels: DEFAULT_LABELS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl CliConfig {
    /// Friendly name for `label`, or the label itself when none is known.
    pub fn friendly_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.labels.get(label).map(String::as_str).unwrap_or(label)
    }
}

/// Parse config TOML text, layering it over the defaults.
pub fn parse_config(content: &str) -> Result<CliConfig, toml::de::Error> {
    #[derive(Deserialize)]
    struct FileConfig {
        model: Option<PathBuf>,
        #[serde(default)]
        labels: BTreeMap<String, String>,
    }

    let file: FileConfig = toml::from_str(content)?;
    let mut labels = CliConfig::default().labels;
    labels.extend(file.labels);
    Ok(CliConfig {
        model: file.model,
        labels,
    })
}

/// Read the config at `path`, or the defaults when no path is given.
///
/// Returns a human-readable error string on failure.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig, String> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let config = parse_config(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;
    tracing::debug!(file = %path.display(), labels = config.labels.len(), "loaded config");
    Ok(config)
}
