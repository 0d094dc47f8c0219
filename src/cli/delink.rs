use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::delinking::engine::{
    DelinkOutcome, DEFAULT_NEIGHBOR_RADIUS, DEFAULT_OUTLIER_PERCENTILE, DEFAULT_POSITION_CUTOFF,
    DEFAULT_WINDOW_SIZE,
};
use crate::delinking::{DelinkingConfig, DelinkingEngine, DelinkingReport};
use crate::output::{self, WrittenFiles};
use crate::parsing;

#[derive(Args)]
pub struct DelinkArgs {
    /// Scaffold graph: GML (.gml) or tab-separated link list
    #[arg(short, long)]
    pub graph: PathBuf,

    /// Per-base depth table (`contig position depth` or bedGraph), optionally gzipped
    #[arg(short, long)]
    pub coverage: PathBuf,

    /// Output directory, created if missing
    #[arg(short, long)]
    pub output: PathBuf,

    /// Prefix of the summary, not-found, run manifest and scaffold files
    #[arg(short, long, default_value = "delinked")]
    pub prefix: String,

    /// Contig sequences (FASTA, optionally gzipped); enables scaffold output
    #[arg(long)]
    pub contigs: Option<PathBuf>,

    // === Changepoint options ===
    /// Half-width of the windows compared at each position, in bases
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window_size: usize,

    /// Percentile of changepoint scores above which a position is flagged (0-100]
    #[arg(long, default_value_t = DEFAULT_OUTLIER_PERCENTILE)]
    pub outlier_percentile: f64,

    /// Flagged positions closer than this are reported once
    #[arg(long, default_value_t = DEFAULT_NEIGHBOR_RADIUS)]
    pub neighbor_radius: usize,

    /// Maximum distance from a contig junction for a changepoint to cut links
    #[arg(long, default_value_t = DEFAULT_POSITION_CUTOFF)]
    pub position_cutoff: u64,

    /// Worker threads (defaults to one per core)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

impl DelinkArgs {
    fn config(&self) -> DelinkingConfig {
        DelinkingConfig {
            window_size: self.window_size,
            outlier_percentile: self.outlier_percentile,
            neighbor_radius: self.neighbor_radius,
            position_cutoff: self.position_cutoff,
            threads: self.threads,
        }
    }
}

pub fn run(args: DelinkArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let graph = parsing::graph_file(&args.graph)
        .with_context(|| format!("Failed to read scaffold graph {}", args.graph.display()))?;
    let coverage = parsing::depth::parse_depth_file(&args.coverage)
        .with_context(|| format!("Failed to read coverage {}", args.coverage.display()))?;
    let sequences = args
        .contigs
        .as_ref()
        .map(|path| {
            parsing::fasta::parse_fasta_file(path)
                .with_context(|| format!("Failed to read contigs {}", path.display()))
        })
        .transpose()?;

    if verbose {
        eprintln!(
            "Graph: {} contigs, {} links; coverage for {} contigs",
            graph.node_count(),
            graph.edge_count(),
            coverage.len()
        );
    }

    let engine = DelinkingEngine::new(args.config());
    let report = engine.run(&graph, &coverage)?;

    let written = output::write_outputs(
        &args.output,
        &args.prefix,
        &report,
        engine.config(),
        sequences.as_ref(),
    )
    .with_context(|| format!("Failed to write results to {}", args.output.display()))?;

    match format {
        OutputFormat::Text => print_text_report(&args, &report, &written, verbose),
        OutputFormat::Json => print_json_report(&args, &report, &written)?,
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(())
}

fn print_text_report(
    args: &DelinkArgs,
    report: &DelinkingReport,
    written: &WrittenFiles,
    verbose: bool,
) {
    println!("Delinking Results");
    println!("{}", "=".repeat(60));

    println!("\nGraph: {}", args.graph.display());
    println!("Coverage: {}", args.coverage.display());

    println!("\nComponents before delinking: {}", report.components.len());
    println!(
        "Components after delinking: {}",
        report.final_components().count()
    );
    println!("Components split: {}", report.split_count());
    println!("Contigs without coverage: {}", report.not_found.len());

    if verbose {
        for component in &report.components {
            match &component.outcome {
                DelinkOutcome::Split { removed_links } => {
                    let links: Vec<String> =
                        removed_links.iter().map(|(s, t)| format!("{s}->{t}")).collect();
                    println!(
                        "  Component {}: split into {} ({})",
                        component.id,
                        component.pieces.len(),
                        links.join(", ")
                    );
                }
                DelinkOutcome::Unsplit { flagged_links } if *flagged_links > 0 => {
                    println!(
                        "  Component {}: {flagged_links} flagged link(s), not split",
                        component.id
                    );
                }
                _ => {}
            }
        }
    }

    if !report.failures.is_empty() {
        println!("\nFailed components:");
        for failure in &report.failures {
            println!(
                "  Component {} ({} contigs): {}",
                failure.id, failure.contigs, failure.reason
            );
        }
    }

    if let Some(records) = written.scaffolds {
        println!("\nScaffolds written: {records}");
        if !written.missing_sequences.is_empty() {
            println!(
                "  Contigs without sequence: {}",
                written.missing_sequences.len()
            );
        }
    }

    println!("\nOutput: {}", args.output.display());
}

fn print_json_report(
    args: &DelinkArgs,
    report: &DelinkingReport,
    written: &WrittenFiles,
) -> anyhow::Result<()> {
    let components: Vec<_> = report
        .components
        .iter()
        .map(|c| {
            let removed: Vec<String> = match &c.outcome {
                DelinkOutcome::Split { removed_links } => removed_links
                    .iter()
                    .map(|(s, t)| format!("{s}->{t}"))
                    .collect(),
                _ => Vec::new(),
            };
            serde_json::json!({
                "id": c.id.0,
                "origin": c.origin,
                "contigs": c.layout.coords.len(),
                "span": c.layout.profile.len(),
                "outliers": c.outliers,
                "removed_links": removed,
                "pieces": c.pieces.iter().map(|p| p.id.0).collect::<Vec<_>>(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "graph": args.graph.display().to_string(),
        "coverage": args.coverage.display().to_string(),
        "output": args.output.display().to_string(),
        "before_components": report.components.len(),
        "after_components": report.final_components().count(),
        "split_components": report.split_count(),
        "not_found": report.not_found,
        "failures": report.failures,
        "components": components,
        "files": written.paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_report(report: &DelinkingReport) {
    println!("before_components\tafter_components\tsplit_components\tfailed_components\tnot_found");
    println!(
        "{}\t{}\t{}\t{}\t{}",
        report.components.len(),
        report.final_components().count(),
        report.split_count(),
        report.failures.len(),
        report.not_found.len()
    );
}
