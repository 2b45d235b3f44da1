use std::path::Path;
use std::process;

use crate::{report_model_error, OutputFormat};

pub(crate) fn cmd_inspect(model_path: &Path, output: OutputFormat, quiet: bool) {
    let model = match tmhmm_core::load_model(model_path) {
        Ok(m) => m,
        Err(e) => {
            report_model_error(&e, output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&model)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            if quiet {
                return;
            }
            let alphabet: String = model.alphabet().into_iter().collect();
            println!("Model: {}", model_path.display());
            println!(
                "  States: {} ({} labelled)",
                model.num_states(),
                model.label_map.len()
            );
            println!("  Alphabet: {} ({} symbols)", alphabet, alphabet.chars().count());
            println!();
            println!("  {:>5}  {:<16} {:<6} {:>10}", "index", "name", "label", "initial");
            for (index, name) in model.name_map.iter().enumerate() {
                println!(
                    "  {:>5}  {:<16} {:<6} {:>10.6}",
                    index,
                    name,
                    model.label(index).unwrap_or("-"),
                    model.initial[index]
                );
            }
        }
    }
}
