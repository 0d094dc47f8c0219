use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::contig::Strand;
use crate::core::graph::{Link, ScaffoldGraph};
use crate::core::types::{ComponentId, CoordinateMap, CoverageProfile, Placement, SummaryRecord};
use crate::delinking::changepoint::{detect, identify_outliers};
use crate::delinking::coordinates::assign_coordinates;
use crate::delinking::coverage::{aggregate, CoverageTable};
use crate::delinking::cycles::{resolve, Resolved};
use crate::delinking::delink::{delink, positions_to_edges};
use crate::delinking::outliers::filter_neighbors;
use crate::delinking::DelinkError;
use crate::utils::validation::validate_config;

/// Default half-width of the changepoint windows, in bases
pub const DEFAULT_WINDOW_SIZE: usize = 1500;

/// Default percentile of changepoint scores above which a position is flagged
pub const DEFAULT_OUTLIER_PERCENTILE: f64 = 99.0;

/// Default radius within which flagged positions are collapsed
pub const DEFAULT_NEIGHBOR_RADIUS: usize = 100;

/// Default distance from a contig junction within which a changepoint cuts links
pub const DEFAULT_POSITION_CUTOFF: u64 = 100;

/// Configuration for the delinking engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelinkingConfig {
    /// Half-width of the windows compared on either side of a position
    pub window_size: usize,
    /// Percentile (0-100] of the score distribution used as flagging cutoff
    pub outlier_percentile: f64,
    /// Flagged positions within this distance are reported once
    pub neighbor_radius: usize,
    /// Maximum distance from a contig junction for a changepoint to cut links
    pub position_cutoff: u64,
    /// Worker threads; `None` uses the global rayon pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl Default for DelinkingConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            outlier_percentile: DEFAULT_OUTLIER_PERCENTILE,
            neighbor_radius: DEFAULT_NEIGHBOR_RADIUS,
            position_cutoff: DEFAULT_POSITION_CUTOFF,
            threads: None,
        }
    }
}

/// Where a component came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentOrigin {
    /// A weakly connected component of the scaffold graph
    Graph,
    /// A contig with coverage that does not appear in the graph
    Unplaced,
    /// A graph contig with no coverage
    MissingCoverage,
}

impl ComponentOrigin {
    pub fn in_graph(self) -> bool {
        !matches!(self, ComponentOrigin::Unplaced)
    }
}

/// Coordinates and coverage of one component.
///
/// Shared behind an `Arc`: a component that delinking leaves whole is its
/// own single final piece and keeps one copy of its profile.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub coords: CoordinateMap,
    pub profile: CoverageProfile,
}

/// What delinking did to a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelinkOutcome {
    /// Single contig, never evaluated
    Singleton,
    /// Evaluated, but cutting the flagged links left one piece
    Unsplit { flagged_links: usize },
    /// Split into several pieces by cutting these `(source, target)` links
    Split { removed_links: Vec<(String, String)> },
}

/// A component after delinking
#[derive(Debug, Clone)]
pub struct FinalComponent {
    pub id: ComponentId,
    /// Component this one was cut from
    pub parent: ComponentId,
    pub origin: ComponentOrigin,
    pub layout: Arc<Layout>,
    pub summary: SummaryRecord,
}

/// A component before delinking, with the pieces it ended up as
#[derive(Debug, Clone)]
pub struct ScaffoldComponent {
    pub id: ComponentId,
    pub origin: ComponentOrigin,
    pub layout: Arc<Layout>,
    /// Links dropped to lay the component out
    pub simplified_links: Vec<(String, String)>,
    /// Changepoint positions left after neighbour filtering
    pub outliers: Vec<usize>,
    pub outcome: DelinkOutcome,
    pub pieces: Vec<FinalComponent>,
}

/// A component whose processing failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentFailure {
    pub id: ComponentId,
    pub contigs: usize,
    pub reason: String,
}

/// Result of a delinking run
#[derive(Debug, Clone, Default)]
pub struct DelinkingReport {
    /// Components in discovery order, graph components first
    pub components: Vec<ScaffoldComponent>,
    pub failures: Vec<ComponentFailure>,
    /// Graph contigs absent from the coverage table
    pub not_found: Vec<String>,
}

impl DelinkingReport {
    /// Final components in id order
    pub fn final_components(&self) -> impl Iterator<Item = &FinalComponent> + '_ {
        self.components.iter().flat_map(|c| c.pieces.iter())
    }

    pub fn split_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| matches!(c.outcome, DelinkOutcome::Split { .. }))
            .count()
    }
}

/// Per-component result before ids are assigned to its pieces
struct Processed {
    layout: Arc<Layout>,
    simplified_links: Vec<(String, String)>,
    outliers: Vec<usize>,
    outcome: DelinkOutcome,
    pieces: Vec<Arc<Layout>>,
}

/// The delinking engine
pub struct DelinkingEngine {
    config: DelinkingConfig,
}

impl DelinkingEngine {
    pub fn new(config: DelinkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DelinkingConfig {
        &self.config
    }

    /// Delink every component of `graph` using depths from `coverage`.
    ///
    /// Components are processed independently, in parallel, and reported in
    /// discovery order. A component that fails is recorded in
    /// `DelinkingReport::failures` and the run carries on.
    ///
    /// # Errors
    ///
    /// Returns `DelinkError::InvalidConfig` for an invalid configuration or
    /// `DelinkError::ThreadPool` if the worker pool cannot be built.
    pub fn run(
        &self,
        graph: &ScaffoldGraph,
        coverage: &CoverageTable,
    ) -> Result<DelinkingReport, DelinkError> {
        validate_config(&self.config).map_err(DelinkError::InvalidConfig)?;

        let not_found: Vec<String> = graph
            .contig_ids()
            .filter(|id| !coverage.contains(id))
            .map(str::to_string)
            .collect();
        if !not_found.is_empty() {
            warn!(
                "{} graph contig(s) have no coverage and are reported separately",
                not_found.len()
            );
        }
        let missing: HashSet<String> = not_found.iter().cloned().collect();
        let covered = graph.without_contigs(&missing);

        let jobs: Vec<(ComponentId, ScaffoldGraph)> = covered
            .component_subgraphs()
            .into_iter()
            .enumerate()
            .map(|(i, component)| (ComponentId(i + 1), component))
            .collect();
        info!("Found {} connected components", jobs.len());

        let work = || -> Vec<Result<Processed, DelinkError>> {
            jobs.par_iter()
                .map(|(id, component)| self.process_component(*id, component, coverage))
                .collect()
        };
        let results = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| DelinkError::ThreadPool(e.to_string()))?
                .install(work),
            None => work(),
        };

        let mut report = DelinkingReport {
            not_found,
            ..DelinkingReport::default()
        };
        let mut next_after = 1;

        for ((id, component), result) in jobs.iter().zip(results) {
            match result {
                Ok(processed) => {
                    let pieces = processed
                        .pieces
                        .into_iter()
                        .map(|layout| {
                            let piece = final_component(
                                ComponentId(next_after),
                                *id,
                                ComponentOrigin::Graph,
                                layout,
                            );
                            next_after += 1;
                            piece
                        })
                        .collect();
                    report.components.push(ScaffoldComponent {
                        id: *id,
                        origin: ComponentOrigin::Graph,
                        layout: processed.layout,
                        simplified_links: processed.simplified_links,
                        outliers: processed.outliers,
                        outcome: processed.outcome,
                        pieces,
                    });
                }
                Err(e) => {
                    warn!("Component {id} ({} contigs) failed: {e}", component.node_count());
                    report.failures.push(ComponentFailure {
                        id: *id,
                        contigs: component.node_count(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut next_before = jobs.len() + 1;
        let unplaced = coverage.contigs().filter(|id| !graph.contains(id));
        for contig in unplaced {
            let depths = coverage.depths(contig).unwrap_or_default().to_vec();
            let placement = Placement {
                contig: contig.to_string(),
                start: 0,
                end: depths.len() as u64,
                strand: Strand::Forward,
            };
            report.components.push(singleton_component(
                ComponentId(next_before),
                ComponentId(next_after),
                ComponentOrigin::Unplaced,
                placement,
                depths,
            ));
            next_before += 1;
            next_after += 1;
        }

        let not_found = report.not_found.clone();
        for contig in &not_found {
            let placement = Placement {
                contig: contig.clone(),
                start: 0,
                end: 0,
                strand: Strand::Forward,
            };
            report.components.push(singleton_component(
                ComponentId(next_before),
                ComponentId(next_after),
                ComponentOrigin::MissingCoverage,
                placement,
                Vec::new(),
            ));
            next_before += 1;
            next_after += 1;
        }

        info!(
            "Delinked {} components into {} final components ({} split, {} failed)",
            jobs.len(),
            next_after - 1,
            report.split_count(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Lay out one component, look for changepoints and cut at most once
    fn process_component(
        &self,
        id: ComponentId,
        graph: &ScaffoldGraph,
        coverage: &CoverageTable,
    ) -> Result<Processed, DelinkError> {
        let (resolved, layout) = layout_component(graph, coverage)?;
        let layout = Arc::new(layout);
        debug!(
            "Component {id}: {} contigs, {} links, {} bases",
            graph.node_count(),
            graph.edge_count(),
            layout.profile.len()
        );

        if graph.node_count() == 1 {
            return Ok(Processed {
                pieces: vec![Arc::clone(&layout)],
                layout,
                simplified_links: resolved.removed,
                outliers: Vec::new(),
                outcome: DelinkOutcome::Singleton,
            });
        }

        let scores = detect(&layout.profile, self.config.window_size);
        let flagged = identify_outliers(&scores, self.config.outlier_percentile);
        let outliers = filter_neighbors(&flagged, &scores, self.config.neighbor_radius);
        let links = positions_to_edges(
            &outliers,
            &layout.coords,
            &resolved.graph,
            self.config.position_cutoff,
        );
        let parts = delink(&resolved.graph, &links).weakly_connected_components();
        debug!(
            "Component {id}: {} flagged, {} after filtering, {} link(s) cut, {} piece(s)",
            flagged.len(),
            outliers.len(),
            links.len(),
            parts.len()
        );

        if parts.len() == 1 {
            if !links.is_empty() {
                warn!(
                    "Component {id}: cutting {} did not split it ({} changepoint(s) at {:?}, position cutoff {})",
                    link_names(&resolved.graph, &links).join(", "),
                    outliers.len(),
                    outliers,
                    self.config.position_cutoff
                );
            }
            return Ok(Processed {
                pieces: vec![Arc::clone(&layout)],
                layout,
                simplified_links: resolved.removed,
                outliers,
                outcome: DelinkOutcome::Unsplit {
                    flagged_links: links.len(),
                },
            });
        }

        // Pieces are cut from the unsimplified component; node indices of the
        // resolved graph match it.
        let pieces = parts
            .iter()
            .map(|nodes| {
                layout_component(&graph.subgraph(nodes), coverage).map(|(_, l)| Arc::new(l))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut removed_links: Vec<(String, String)> = links
            .iter()
            .map(|&(s, t)| {
                (
                    resolved.graph.contig_id(s).to_string(),
                    resolved.graph.contig_id(t).to_string(),
                )
            })
            .collect();
        removed_links.sort();

        Ok(Processed {
            layout,
            simplified_links: resolved.removed,
            outliers,
            outcome: DelinkOutcome::Split { removed_links },
            pieces,
        })
    }
}

/// Resolve cycles, assign coordinates and build the coverage profile
fn layout_component(
    graph: &ScaffoldGraph,
    coverage: &CoverageTable,
) -> Result<(Resolved, Layout), DelinkError> {
    let resolved = resolve(graph)?;
    let coords = assign_coordinates(&resolved.graph, resolved.start, coverage)?;
    let profile = aggregate(coverage, &coords)?;
    Ok((resolved, Layout { coords, profile }))
}

/// `source->target` names of links, sorted
fn link_names(graph: &ScaffoldGraph, links: &HashSet<Link>) -> Vec<String> {
    let mut names: Vec<String> = links
        .iter()
        .map(|&(s, t)| format!("{}->{}", graph.contig_id(s), graph.contig_id(t)))
        .collect();
    names.sort();
    names
}

fn final_component(
    id: ComponentId,
    parent: ComponentId,
    origin: ComponentOrigin,
    layout: Arc<Layout>,
) -> FinalComponent {
    let summary = SummaryRecord::from_profile(&layout.profile);
    FinalComponent {
        id,
        parent,
        origin,
        layout,
        summary,
    }
}

fn singleton_component(
    before: ComponentId,
    after: ComponentId,
    origin: ComponentOrigin,
    placement: Placement,
    profile: CoverageProfile,
) -> ScaffoldComponent {
    let layout = Arc::new(Layout {
        coords: CoordinateMap::new(vec![placement]),
        profile,
    });
    ScaffoldComponent {
        id: before,
        origin,
        layout: Arc::clone(&layout),
        simplified_links: Vec::new(),
        outliers: Vec::new(),
        outcome: DelinkOutcome::Singleton,
        pieces: vec![final_component(after, before, origin, layout)],
    }
}
