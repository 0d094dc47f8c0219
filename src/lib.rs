//! # scaffold-delink
//!
//! A library for splitting assembly scaffolds at coverage discontinuities.
//!
//! Scaffolders join contigs into scaffolds from read-pair and mate-pair
//! evidence, and occasionally join contigs that come from different genomes.
//! Such mis-joins show up as abrupt shifts in sequencing depth at the
//! junction. `scaffold-delink` lays out every connected component of a
//! scaffold graph on a linear coordinate line, builds its per-base coverage
//! profile, finds the positions where coverage changes sharply, and removes
//! the links at those junctions.
//!
//! ## Features
//!
//! - **Cycle resolution**: components without a source contig, or with
//!   cycles, are made acyclic by dropping the fewest obvious back links
//! - **Oriented layout**: contigs placed on the reverse strand contribute
//!   their coverage reversed
//! - **Windowed changepoints**: a two-window mean-shift statistic scored at
//!   every position, thresholded at a percentile
//! - **Parallel processing**: components are delinked independently with
//!   rayon, with output identical to a sequential run
//!
//! ## Example
//!
//! ```rust,no_run
//! use scaffold_delink::parsing::{depth, graph_file};
//! use scaffold_delink::{DelinkingConfig, DelinkingEngine};
//! use std::path::Path;
//!
//! let graph = graph_file(Path::new("oriented.gml")).unwrap();
//! let coverage = depth::parse_depth_file(Path::new("coverage.txt")).unwrap();
//!
//! let engine = DelinkingEngine::new(DelinkingConfig::default());
//! let report = engine.run(&graph, &coverage).unwrap();
//!
//! for piece in report.final_components() {
//!     println!("{}: span {} mean {:.1}", piece.id, piece.summary.span, piece.summary.mean);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Contigs, orientations, the scaffold graph and coordinate types
//! - [`delinking`]: Cycle resolution, layout, changepoints and the engine
//! - [`parsing`]: Parsers for GML graphs, link lists, depth tables and FASTA
//! - [`output`]: Writers for result tables and scaffold sequences
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod delinking;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::contig::{LinkOrientation, Strand};
pub use core::graph::ScaffoldGraph;
pub use core::types::*;
pub use delinking::{CoverageTable, DelinkingConfig, DelinkingEngine, DelinkingReport};
