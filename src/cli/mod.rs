//! Command-line interface for scaffold-delink.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **delink**: Split scaffold components at coverage changepoints and write
//!   the coordinate, coverage and summary tables
//! - **inspect**: Report the connected components of a scaffold graph
//!
//! ## Usage
//!
//! ```text
//! # Delink a MetaCarvel graph with bedtools genomecov -d depths
//! scaffold-delink delink -g oriented.gml -c coverage.txt.gz -o results/
//!
//! # Also write scaffold sequences
//! scaffold-delink delink -g oriented.gml -c coverage.txt -o results/ --contigs contigs.fa
//!
//! # JSON run summary for scripting
//! scaffold-delink --format json delink -g links.tsv -c coverage.txt -o results/
//!
//! # Which components need cycle resolution?
//! scaffold-delink inspect -g oriented.gml
//! ```

use clap::{Parser, Subcommand};

pub mod delink;
pub mod inspect;

#[derive(Parser)]
#[command(name = "scaffold-delink")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Split assembly scaffolds at coverage changepoints")]
#[command(
    long_about = "scaffold-delink lays out each connected component of a scaffold graph on a linear coordinate line, builds its per-base coverage profile, and cuts the links at junctions where coverage shifts abruptly.\n\nIt writes:\n- Contig coordinates and coverage before and after delinking\n- Coverage mean, standard deviation and span per final component\n- Optionally, scaffold sequences of the final components"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Delink a scaffold graph using per-base coverage
    Delink(delink::DelinkArgs),

    /// Summarize the connected components of a scaffold graph
    Inspect(inspect::InspectArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
