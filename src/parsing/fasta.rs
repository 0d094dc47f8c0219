//! Loading contig sequences from FASTA files using noodles.
//!
//! Sequences are only needed to write scaffold FASTA output. Both plain and
//! gzip/bgzip compressed files are read.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::parsing::ParseError;
use crate::utils::validation::{is_gzipped, normalize_contig_id};

/// Contig id to sequence bytes
pub type SequenceMap = HashMap<String, Vec<u8>>;

/// Read all sequences of a FASTA file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles`
/// if a record is malformed, or `ParseError::InvalidFormat` if the file has no
/// records.
pub fn parse_fasta_file(path: &Path) -> Result<SequenceMap, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        let mut reader = fasta::io::Reader::new(BufReader::new(MultiGzDecoder::new(file)));
        parse_fasta_reader(&mut reader)
    } else {
        let mut reader = fasta::io::Reader::new(BufReader::new(file));
        parse_fasta_reader(&mut reader)
    }
}

fn parse_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<SequenceMap, ParseError> {
    let mut sequences = SequenceMap::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let id = normalize_contig_id(&name).to_string();
        sequences.insert(id, record.sequence().as_ref().to_vec());
    }

    if sequences.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(sequences)
}
