//! Tab-separated result tables and the JSON run manifest.

use std::io::Write;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::delinking::engine::{ComponentFailure, ComponentOrigin, FinalComponent};
use crate::delinking::{DelinkingConfig, DelinkingReport};
use crate::output::OutputError;

/// Per-position coverage of every before-component
///
/// # Errors
///
/// Returns `OutputError::Io` on write failures.
pub fn write_coverages_before<W: Write>(
    w: &mut W,
    report: &DelinkingReport,
) -> Result<(), OutputError> {
    for component in &report.components {
        for (position, depth) in component.layout.profile.iter().enumerate() {
            writeln!(w, "{}\t{position}\t{depth}", component.id)?;
        }
    }
    Ok(())
}

/// Contig placements of every before-component, with contig lengths
///
/// # Errors
///
/// Returns `OutputError::Io` on write failures.
pub fn write_coords_before<W: Write>(
    w: &mut W,
    report: &DelinkingReport,
) -> Result<(), OutputError> {
    for component in &report.components {
        for p in &component.layout.coords {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                component.id,
                p.contig,
                p.start,
                p.end,
                p.strand.symbol(),
                p.len()
            )?;
        }
    }
    Ok(())
}

/// Per-position coverage of every final component, tagged with its parent
///
/// # Errors
///
/// Returns `OutputError::Io` on write failures.
pub fn write_coverages_after<W: Write>(
    w: &mut W,
    report: &DelinkingReport,
) -> Result<(), OutputError> {
    for piece in report.final_components() {
        for (position, depth) in piece.layout.profile.iter().enumerate() {
            writeln!(w, "{}\t{}\t{position}\t{depth}", piece.id, piece.parent)?;
        }
    }
    Ok(())
}

/// Contig placements of every final component
///
/// `in_graph` is `0` for contigs that only appear in the coverage table.
///
/// # Errors
///
/// Returns `OutputError::Io` on write failures.
pub fn write_coords_after<W: Write>(
    w: &mut W,
    report: &DelinkingReport,
) -> Result<(), OutputError> {
    for piece in report.final_components() {
        let in_graph = u8::from(piece.origin.in_graph());
        for p in &piece.layout.coords {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}\t{in_graph}\t{}",
                piece.id,
                piece.parent,
                p.contig,
                p.start,
                p.end,
                p.strand.symbol(),
                p.len()
            )?;
        }
    }
    Ok(())
}

/// One line per final component: `after_id, length, span, mean, std`.
///
/// `length` is the summed contig length of the component and `span` the
/// length of its coverage profile. They differ only for synthesized
/// components of contigs without coverage. Mean and standard deviation are
/// rounded to one decimal; empty profiles print `NaN`.
///
/// # Errors
///
/// Returns `OutputError::Io` on write failures.
pub fn write_summary<W: Write>(w: &mut W, report: &DelinkingReport) -> Result<(), OutputError> {
    for piece in report.final_components() {
        writeln!(
            w,
            "{}\t{}\t{}\t{:.1}\t{:.1}",
            piece.id,
            piece_length(piece),
            piece.summary.span,
            piece.summary.mean,
            piece.summary.std_dev
        )?;
    }
    Ok(())
}

/// Graph contigs that had no coverage, one per line
///
/// # Errors
///
/// Returns `OutputError::Io` on write failures.
pub fn write_not_found<W: Write>(w: &mut W, report: &DelinkingReport) -> Result<(), OutputError> {
    for contig in &report.not_found {
        writeln!(w, "{contig}")?;
    }
    Ok(())
}

fn piece_length(piece: &FinalComponent) -> u64 {
    piece.layout.coords.total_length()
}

/// Component counts of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub before_components: usize,
    pub after_components: usize,
    pub split_components: usize,
    pub failed_components: usize,
    pub unplaced_contigs: usize,
    pub not_found_contigs: usize,
}

/// Machine-readable record of a run, written as `<prefix>_Run.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub version: String,
    pub created_at: String,
    pub config: DelinkingConfig,
    pub counts: RunCounts,
    pub failures: Vec<ComponentFailure>,
}

impl RunManifest {
    pub fn new(config: &DelinkingConfig, report: &DelinkingReport) -> Self {
        let unplaced_contigs = report
            .components
            .iter()
            .filter(|c| c.origin == ComponentOrigin::Unplaced)
            .count();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now().to_rfc3339(),
            config: config.clone(),
            counts: RunCounts {
                before_components: report.components.len(),
                after_components: report.final_components().count(),
                split_components: report.split_count(),
                failed_components: report.failures.len(),
                unplaced_contigs,
                not_found_contigs: report.not_found.len(),
            },
            failures: report.failures.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::LinkOrientation;
    use crate::core::graph::ScaffoldGraph;
    use crate::delinking::{CoverageTable, DelinkingEngine};

    fn report() -> DelinkingReport {
        let mut graph = ScaffoldGraph::new();
        graph.add_link("A", "B", LinkOrientation::EB);
        graph.add_link("B", "M", LinkOrientation::EB);
        let mut coverage = CoverageTable::new();
        coverage.insert("A", vec![4, 4]);
        coverage.insert("B", vec![6, 6, 6]);
        coverage.insert("U", vec![1]);

        // Nothing scores strictly above the maximum, so A-B stays joined
        let config = DelinkingConfig {
            window_size: 2,
            outlier_percentile: 100.0,
            ..DelinkingConfig::default()
        };
        DelinkingEngine::new(config).run(&graph, &coverage).unwrap()
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), OutputError>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_coords_tables() {
        let report = report();
        let before = render(|w| write_coords_before(w, &report));
        assert_eq!(
            before,
            "1\tA\t0\t2\t+\t2\n1\tB\t2\t5\t+\t3\n2\tU\t0\t1\t+\t1\n3\tM\t0\t0\t+\t0\n"
        );

        let after = render(|w| write_coords_after(w, &report));
        let lines: Vec<&str> = after.lines().collect();
        assert_eq!(lines[0], "1\t1\tA\t0\t2\t+\t1\t2");
        assert_eq!(lines[2], "2\t2\tU\t0\t1\t+\t0\t1");
        assert_eq!(lines[3], "3\t3\tM\t0\t0\t+\t1\t0");
    }

    #[test]
    fn test_coverage_tables() {
        let report = report();
        let before = render(|w| write_coverages_before(w, &report));
        assert!(before.starts_with("1\t0\t4\n1\t1\t4\n1\t2\t6\n"));
        assert!(before.ends_with("2\t0\t1\n"));

        let after = render(|w| write_coverages_after(w, &report));
        assert_eq!(after.lines().count(), 6);
        assert!(after.starts_with("1\t1\t0\t4\n"));
    }

    #[test]
    fn test_summary_and_not_found() {
        let report = report();
        let summary = render(|w| write_summary(w, &report));
        assert_eq!(summary, "1\t5\t5\t5.2\t1.0\n2\t1\t1\t1.0\t0.0\n3\t0\t0\tNaN\tNaN\n");

        let not_found = render(|w| write_not_found(w, &report));
        assert_eq!(not_found, "M\n");
    }

    #[test]
    fn test_manifest_counts() {
        let report = report();
        let manifest = RunManifest::new(&DelinkingConfig::default(), &report);
        assert_eq!(
            manifest.counts,
            RunCounts {
                before_components: 3,
                after_components: 3,
                split_components: 0,
                failed_components: 0,
                unplaced_contigs: 1,
                not_found_contigs: 1,
            }
        );
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["config"]["window_size"], 1500);
        assert!(json["created_at"].as_str().is_some());
    }
}
