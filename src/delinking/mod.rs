//! Coverage-driven delinking of scaffold components.
//!
//! Each weakly connected component of the scaffold graph goes through:
//!
//! 1. **Cycle resolution** ([`cycles`]): pick a start contig and drop the links
//!    that stop the component from being laid out as a DAG
//! 2. **Coordinate assignment** ([`coordinates`]): lay contigs end to end on a
//!    component coordinate line
//! 3. **Coverage aggregation** ([`coverage`]): copy per-base depth onto that line
//! 4. **Changepoint detection** ([`changepoint`]): score every position by how
//!    much depth shifts across it and flag the top percentile
//! 5. **Outlier filtering** ([`outliers`]): keep one position per discontinuity
//! 6. **Delinking** ([`delink`]): cut the links at flagged contig junctions
//!
//! [`DelinkingEngine`] drives these steps over a whole graph and produces a
//! [`DelinkingReport`].
//!
//! ## Example
//!
//! ```rust
//! use scaffold_delink::core::contig::LinkOrientation;
//! use scaffold_delink::core::graph::ScaffoldGraph;
//! use scaffold_delink::delinking::{CoverageTable, DelinkingConfig, DelinkingEngine};
//!
//! let mut graph = ScaffoldGraph::new();
//! graph.add_link("A", "B", LinkOrientation::EB);
//!
//! let mut coverage = CoverageTable::new();
//! coverage.insert("A", vec![5; 10]);
//! coverage.insert("B", vec![5; 20]);
//!
//! let engine = DelinkingEngine::new(DelinkingConfig::default());
//! let report = engine.run(&graph, &coverage).unwrap();
//! assert_eq!(report.final_components().count(), 1);
//! ```

use thiserror::Error;

pub mod changepoint;
pub mod coordinates;
pub mod coverage;
pub mod cycles;
pub mod delink;
pub mod engine;
pub mod outliers;

pub use coverage::CoverageTable;
pub use engine::{DelinkingConfig, DelinkingEngine, DelinkingReport};

#[derive(Error, Debug)]
pub enum DelinkError {
    #[error("Contig '{contig}' is not reachable from start contig '{start}'")]
    Unreachable { start: String, contig: String },

    #[error("Start contig '{0}' still has incoming links")]
    StartHasPredecessors(String),

    #[error("No coverage for contig '{0}'")]
    MissingCoverage(String),

    #[error("Coverage profile position {0} is not filled exactly once")]
    Tiling(u64),

    #[error("Contig '{contig}' has {actual} depth values but is placed over {expected} positions")]
    LengthMismatch {
        contig: String,
        expected: u64,
        actual: u64,
    },

    #[error("Component has no contigs")]
    EmptyComponent,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}
