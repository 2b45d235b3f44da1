//! Sequence input: FASTA records via `needletail`.

use std::path::Path;

use needletail::parse_fastx_file;

/// One input sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRecord {
    pub id: String,
    pub description: String,
    pub residues: String,
}

/// Split a FASTA header line into the id and the free-text description.
fn split_header(header: &str) -> (String, String) {
    match header.split_once(char::is_whitespace) {
        Some((id, desc)) => (id.to_owned(), desc.trim().to_owned()),
        None => (header.to_owned(), String::new()),
    }
}

/// Read every record of a FASTA (or FASTQ) file.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, String> {
    let mut reader =
        parse_fastx_file(path).map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    let mut records = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;
        let header = String::from_utf8_lossy(record.id());
        let (id, description) = split_header(&header);
        let residues = String::from_utf8_lossy(&record.seq()).into_owned();
        records.push(SequenceRecord {
            id,
            description,
            residues,
        });
    }
    tracing::debug!(file = %path.display(), records = records.len(), "read sequences");
    Ok(records)
}
