//! Parsers for the inputs of a delinking run.
//!
//! This module provides parsers for:
//!
//! - **Per-base depth**: `contig position depth` rows as written by
//!   `bedtools genomecov -d`, or `contig start end depth` bedGraph rows
//! - **Scaffold graphs**: GML files with oriented nodes and links, or
//!   tab-separated link lists
//! - **Contig sequences**: FASTA files, used to write scaffold sequences
//!
//! Depth and FASTA inputs may be gzip/bgzip compressed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scaffold_delink::parsing::{depth, graph_file};
//! use std::path::Path;
//!
//! let graph = graph_file(Path::new("oriented.gml")).unwrap();
//! let coverage = depth::parse_depth_file(Path::new("coverage.txt.gz")).unwrap();
//! println!("{} contigs, {} with coverage", graph.node_count(), coverage.len());
//! ```

use std::path::Path;

use thiserror::Error;

use crate::core::graph::ScaffoldGraph;

pub mod depth;
pub mod fasta;
pub mod gml;
pub mod links;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),
}

/// Parse a scaffold graph, choosing the parser from the file extension.
///
/// `.gml` files go through the GML parser, anything else is read as a
/// tab-separated link list.
///
/// # Errors
///
/// Returns the error of the selected parser.
pub fn graph_file(path: &Path) -> Result<ScaffoldGraph, ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("gml") => gml::parse_gml_file(path),
        _ => links::parse_links_file(path),
    }
}
