//! Writers for the files produced by a delinking run.
//!
//! All tables are tab-separated without a header row, one file per table,
//! so they can be joined on component ids downstream:
//!
//! | File | Columns |
//! |------|---------|
//! | `Coverages_Before_Delinking.txt` | before_id, position, coverage |
//! | `Coords_Before_Delinking.txt` | before_id, contig, start, end, strand, length |
//! | `Coverages_After_Delinking.txt` | after_id, before_id, position, coverage |
//! | `Coords_After_Delinking.txt` | after_id, before_id, contig, start, end, strand, in_graph, length |
//! | `<prefix>_Summary.txt` | after_id, length, span, mean, std |
//! | `<prefix>_NotFound.txt` | contig |
//!
//! A JSON run manifest (`<prefix>_Run.json`) and, when contig sequences are
//! available, a scaffold FASTA (`<prefix>_Scaffolds.fasta`) complete the set.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::delinking::{DelinkingConfig, DelinkingReport};
use crate::parsing::fasta::SequenceMap;

pub mod scaffolds;
pub mod tables;

pub use tables::RunManifest;

pub const COVERAGES_BEFORE: &str = "Coverages_Before_Delinking.txt";
pub const COORDS_BEFORE: &str = "Coords_Before_Delinking.txt";
pub const COVERAGES_AFTER: &str = "Coverages_After_Delinking.txt";
pub const COORDS_AFTER: &str = "Coords_After_Delinking.txt";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Files written by [`write_outputs`]
#[derive(Debug, Clone, Default)]
pub struct WrittenFiles {
    pub paths: Vec<PathBuf>,
    /// Scaffold records written, when sequences were given
    pub scaffolds: Option<usize>,
    /// Placed contigs missing from the sequences
    pub missing_sequences: Vec<String>,
}

/// Write every output table of `report` into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns `OutputError` if the directory or any file cannot be written.
pub fn write_outputs(
    dir: &Path,
    prefix: &str,
    report: &DelinkingReport,
    config: &DelinkingConfig,
    sequences: Option<&SequenceMap>,
) -> Result<WrittenFiles, OutputError> {
    std::fs::create_dir_all(dir)?;
    let mut written = WrittenFiles::default();

    write_file(dir.join(COVERAGES_BEFORE), &mut written, |w| {
        tables::write_coverages_before(w, report)
    })?;
    write_file(dir.join(COORDS_BEFORE), &mut written, |w| {
        tables::write_coords_before(w, report)
    })?;
    write_file(dir.join(COVERAGES_AFTER), &mut written, |w| {
        tables::write_coverages_after(w, report)
    })?;
    write_file(dir.join(COORDS_AFTER), &mut written, |w| {
        tables::write_coords_after(w, report)
    })?;
    write_file(dir.join(format!("{prefix}_Summary.txt")), &mut written, |w| {
        tables::write_summary(w, report)
    })?;
    write_file(dir.join(format!("{prefix}_NotFound.txt")), &mut written, |w| {
        tables::write_not_found(w, report)
    })?;

    let manifest = RunManifest::new(config, report);
    write_file(dir.join(format!("{prefix}_Run.json")), &mut written, |w| {
        serde_json::to_writer_pretty(&mut *w, &manifest)?;
        writeln!(w)?;
        Ok(())
    })?;

    if let Some(sequences) = sequences {
        let mut stats = scaffolds::ScaffoldStats::default();
        write_file(dir.join(format!("{prefix}_Scaffolds.fasta")), &mut written, |w| {
            stats = scaffolds::write_scaffolds(w, report, sequences)?;
            Ok(())
        })?;
        written.scaffolds = Some(stats.records);
        written.missing_sequences = stats.missing;
    }

    info!("Wrote {} files to {}", written.paths.len(), dir.display());
    Ok(written)
}

fn write_file<F>(path: PathBuf, written: &mut WrittenFiles, body: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), OutputError>,
{
    let mut writer = BufWriter::new(File::create(&path)?);
    body(&mut writer)?;
    writer.flush()?;
    written.paths.push(path);
    Ok(())
}
