//! Core data types for scaffold delinking.
//!
//! - [`LinkOrientation`], [`Strand`]: orientation carried by scaffold links
//! - [`ScaffoldGraph`]: directed graph of contigs
//! - [`CoordinateMap`], [`Placement`]: contig intervals on a component's coordinate line
//! - [`CoverageProfile`], [`SummaryRecord`]: per-position depth and its statistics
//!
//! [`LinkOrientation`]: contig::LinkOrientation
//! [`Strand`]: contig::Strand
//! [`ScaffoldGraph`]: graph::ScaffoldGraph
//! [`CoordinateMap`]: types::CoordinateMap
//! [`Placement`]: types::Placement
//! [`CoverageProfile`]: types::CoverageProfile
//! [`SummaryRecord`]: types::SummaryRecord

pub mod contig;
pub mod graph;
pub mod types;
