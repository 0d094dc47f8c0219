//! Scaffold sequences of the final components.

use std::io::Write;

use tracing::warn;

use crate::core::contig::Strand;
use crate::delinking::DelinkingReport;
use crate::output::OutputError;
use crate::parsing::fasta::SequenceMap;

/// Number of `N`s placed between consecutive contigs of a scaffold
pub const GAP_LENGTH: usize = 100;

const LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, Default)]
pub struct ScaffoldStats {
    /// FASTA records written
    pub records: usize,
    /// Placed contigs without a sequence
    pub missing: Vec<String>,
}

/// Write one FASTA record per final component, named by its after id.
///
/// Contigs are joined in coordinate order with [`GAP_LENGTH`] `N`s between
/// them, reverse complemented when placed on the reverse strand. Contigs
/// missing from `sequences` are skipped, and components with no sequence at
/// all produce no record.
///
/// # Errors
///
/// Returns `OutputError::Io` on write failures.
pub fn write_scaffolds<W: Write>(
    w: &mut W,
    report: &DelinkingReport,
    sequences: &SequenceMap,
) -> Result<ScaffoldStats, OutputError> {
    let mut stats = ScaffoldStats::default();

    for piece in report.final_components() {
        let mut scaffold: Vec<u8> = Vec::new();
        for placement in &piece.layout.coords {
            let Some(sequence) = sequences.get(&placement.contig) else {
                warn!(
                    "No sequence for contig '{}' of scaffold {}",
                    placement.contig, piece.id
                );
                stats.missing.push(placement.contig.clone());
                continue;
            };
            if !scaffold.is_empty() {
                scaffold.extend(std::iter::repeat(b'N').take(GAP_LENGTH));
            }
            match placement.strand {
                Strand::Forward => scaffold.extend_from_slice(sequence),
                Strand::Reverse => scaffold.extend(reverse_complement(sequence)),
            }
        }

        if scaffold.is_empty() {
            continue;
        }
        writeln!(w, ">{}", piece.id)?;
        for line in scaffold.chunks(LINE_WIDTH) {
            w.write_all(line)?;
            writeln!(w)?;
        }
        stats.records += 1;
    }

    Ok(stats)
}

/// Reverse complement of a nucleotide sequence, preserving case.
/// IUPAC ambiguity codes are complemented; other bytes are kept as is.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}

fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'a' => b't',
        b't' | b'u' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        b'r' => b'y',
        b'y' => b'r',
        b'k' => b'm',
        b'm' => b'k',
        b'b' => b'v',
        b'v' => b'b',
        b'd' => b'h',
        b'h' => b'd',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::LinkOrientation;
    use crate::core::graph::ScaffoldGraph;
    use crate::delinking::{CoverageTable, DelinkingConfig, DelinkingEngine};

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"ACGTN"), b"NACGT".to_vec());
        assert_eq!(reverse_complement(b"aacG"), b"Cgtt".to_vec());
        assert!(reverse_complement(b"").is_empty());
    }

    #[test]
    fn test_write_scaffolds() {
        // A forward, B reverse relative to A
        let mut graph = ScaffoldGraph::new();
        graph.add_link("A", "B", LinkOrientation::EE);
        graph.add_contig("C");
        let mut coverage = CoverageTable::new();
        coverage.insert("A", vec![3; 4]);
        coverage.insert("B", vec![3; 2]);
        coverage.insert("C", vec![3; 3]);

        let report = DelinkingEngine::new(DelinkingConfig::default())
            .run(&graph, &coverage)
            .unwrap();

        let mut sequences = SequenceMap::new();
        sequences.insert("A".to_string(), b"AAAC".to_vec());
        sequences.insert("B".to_string(), b"GT".to_vec());

        let mut buf = Vec::new();
        let stats = write_scaffolds(&mut buf, &report, &sequences).unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.missing, vec!["C".to_string()]);

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(">1"));
        let body: String = lines.collect();
        assert_eq!(body, format!("AAAC{}AC", "N".repeat(GAP_LENGTH)));
    }
}
