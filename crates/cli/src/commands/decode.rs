use std::path::Path;
use std::process;

use serde::Serialize;
use tmhmm_core::{summarize, Decoder, Decoding};

use crate::config::CliConfig;
use crate::fasta::{self, SequenceRecord};
use crate::{report_error, report_model_error, OutputFormat};

#[derive(Debug, Serialize)]
struct SegmentReport {
    start: usize,
    end: usize,
    label: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct RecordReport {
    id: String,
    description: String,
    path: String,
    /// `null` when the sequence is impossible under the model.
    log_probability: Option<f64>,
    segments: Vec<SegmentReport>,
}

impl RecordReport {
    fn new(record: &SequenceRecord, decoding: &Decoding, config: &CliConfig) -> Self {
        let log_p = decoding.log_probability();
        let segments = summarize(decoding.path())
            .into_iter()
            .map(|seg| SegmentReport {
                start: seg.start,
                end: seg.end,
                name: config.friendly_name(&seg.label).to_owned(),
                label: seg.label,
            })
            .collect();
        RecordReport {
            id: record.id.clone(),
            description: record.description.clone(),
            path: decoding.path_string(),
            log_probability: log_p.is_finite().then_some(log_p),
            segments,
        }
    }

    fn print_text(&self) {
        for seg in &self.segments {
            println!("{}-{}: {}", seg.start, seg.end, seg.name);
        }
        println!();
        if self.description.is_empty() {
            println!(">{}", self.id);
        } else {
            println!(">{} {}", self.id, self.description);
        }
        println!("{}", self.path);
    }
}

pub(crate) fn cmd_decode(
    model_path: &Path,
    sequences: &Path,
    config: &CliConfig,
    output: OutputFormat,
    quiet: bool,
) {
    // Step 1: Load the model
    let model = match tmhmm_core::load_model(model_path) {
        Ok(m) => m,
        Err(e) => {
            report_model_error(&e, output, quiet);
            process::exit(1);
        }
    };

    // Step 2: Read the sequences
    let records = match fasta::read_records(sequences) {
        Ok(r) => r,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    // Step 3: Decode each record; a bad record does not stop the rest
    let decoder = Decoder::new(&model);
    let mut reports = Vec::with_capacity(records.len());
    let mut failed = 0usize;
    for record in &records {
        match decoder.decode(&record.residues) {
            Ok(decoding) => {
                let report = RecordReport::new(record, &decoding, config);
                if output == OutputFormat::Text && !quiet {
                    report.print_text();
                }
                reports.push(report);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(id = %record.id, kind = e.kind(), "sequence not decoded");
                match output {
                    _ if quiet => {}
                    OutputFormat::Json => {
                        let mut err_json = e.to_json_value();
                        err_json["id"] = serde_json::Value::String(record.id.clone());
                        eprintln!("{}", err_json);
                    }
                    OutputFormat::Text => {
                        report_error(&format!("{}: {}", record.id, e), output, quiet)
                    }
                }
            }
        }
    }

    // Step 4: Emit JSON
    if output == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&reports)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
        println!("{}", json);
    }

    if failed > 0 {
        process::exit(1);
    }
}
