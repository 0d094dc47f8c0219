//! Parser for tab-separated scaffold link lists.
//!
//! Each row names one directed link, optionally with its orientation:
//!
//! ```text
//! # source  target  orientation
//! NODE_1    NODE_2  EB
//! NODE_2    NODE_3
//! ```
//!
//! Rows without an orientation are `EB` links. A row with a single field
//! declares an isolated contig.

use std::path::Path;

use crate::core::contig::LinkOrientation;
use crate::core::graph::ScaffoldGraph;
use crate::parsing::ParseError;

/// Parse a link list file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if a row is malformed or no rows are found.
pub fn parse_links_file(path: &Path) -> Result<ScaffoldGraph, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_links_text(&content)
}

/// Parse link list text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a row is malformed or no rows are
/// found.
pub fn parse_links_text(text: &str) -> Result<ScaffoldGraph, ParseError> {
    let mut graph = ScaffoldGraph::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

        match fields.as_slice() {
            [contig] => {
                graph.add_contig(contig);
            }
            [source, target] => {
                graph.add_link(source, target, LinkOrientation::EB);
            }
            [source, target, orientation, ..] => {
                let orientation = LinkOrientation::parse(orientation).ok_or_else(|| {
                    ParseError::InvalidFormat(format!(
                        "Invalid orientation on line {line_num}: '{orientation}'"
                    ))
                })?;
                graph.add_link(source, target, orientation);
            }
            [] => continue,
        }
    }

    if graph.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No links found in link list".to_string(),
        ));
    }

    Ok(graph)
}
