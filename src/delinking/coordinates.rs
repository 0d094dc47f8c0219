//! Linear coordinates for the contigs of an acyclic component.

use std::collections::{BTreeSet, VecDeque};

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::core::contig::Strand;
use crate::core::graph::ScaffoldGraph;
use crate::core::types::{CoordinateMap, Placement};
use crate::delinking::coverage::CoverageTable;
use crate::delinking::DelinkError;

/// Lay the contigs of `graph` end to end on a coordinate line starting at 0.
///
/// Contigs are ordered topologically from `start`; other source contigs are
/// released in node order once the frontier runs dry. Each contig gets a
/// longest-path offset (the largest end among its predecessors) and the
/// final layout sorts by that offset, then by topological rank, so the
/// placements tile `[0, total_length)` without gaps or overlaps.
///
/// Strands are propagated along links from `start`, which is forward.
///
/// # Errors
///
/// Returns `DelinkError::StartHasPredecessors` if `start` has incoming links,
/// `DelinkError::Unreachable` if a contig cannot be ordered (a cycle is left
/// or the graph is not weakly connected), or `DelinkError::MissingCoverage`
/// if a contig has no length in `lengths`.
pub fn assign_coordinates(
    graph: &ScaffoldGraph,
    start: NodeIndex,
    lengths: &CoverageTable,
) -> Result<CoordinateMap, DelinkError> {
    if graph.in_degree(start) > 0 {
        return Err(DelinkError::StartHasPredecessors(
            graph.contig_id(start).to_string(),
        ));
    }

    let order = topological_order(graph, start)?;
    let strands = propagate_strands(graph, start)?;

    let n = graph.node_count();
    let mut length = vec![0u64; n];
    for node in graph.nodes() {
        let id = graph.contig_id(node);
        length[node.index()] = lengths
            .length(id)
            .ok_or_else(|| DelinkError::MissingCoverage(id.to_string()))?;
    }

    let mut offset = vec![0u64; n];
    let mut rank = vec![0usize; n];
    for (r, &node) in order.iter().enumerate() {
        rank[node.index()] = r;
        offset[node.index()] = graph
            .predecessors(node)
            .into_iter()
            .map(|p| offset[p.index()] + length[p.index()])
            .max()
            .unwrap_or(0);
    }

    let mut layout = order;
    layout.sort_by_key(|n| (offset[n.index()], rank[n.index()]));

    let mut cursor = 0;
    let placements = layout
        .into_iter()
        .map(|node| {
            let start = cursor;
            cursor += length[node.index()];
            Placement {
                contig: graph.contig_id(node).to_string(),
                start,
                end: cursor,
                strand: strands[node.index()],
            }
        })
        .collect();

    Ok(CoordinateMap::new(placements))
}

/// Kahn's algorithm, emitting `start` first and breaking ties by node order
fn topological_order(
    graph: &ScaffoldGraph,
    start: NodeIndex,
) -> Result<Vec<NodeIndex>, DelinkError> {
    let mut pending: Vec<usize> = graph.nodes().map(|n| graph.in_degree(n)).collect();
    let mut ready: BTreeSet<NodeIndex> = graph
        .nodes()
        .filter(|&n| n != start && pending[n.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    let mut next = Some(start);
    while let Some(node) = next.take().or_else(|| ready.pop_first()) {
        order.push(node);
        for succ in graph.successors(node) {
            let count = &mut pending[succ.index()];
            *count = count.saturating_sub(1);
            if *count == 0 {
                ready.insert(succ);
            }
        }
    }

    if order.len() < graph.node_count() {
        let mut seen = vec![false; graph.node_count()];
        for node in &order {
            seen[node.index()] = true;
        }
        let missing = graph.nodes().find(|n| !seen[n.index()]).unwrap_or(start);
        return Err(DelinkError::Unreachable {
            start: graph.contig_id(start).to_string(),
            contig: graph.contig_id(missing).to_string(),
        });
    }

    Ok(order)
}

/// Breadth-first walk over links in both directions assigning strands
fn propagate_strands(
    graph: &ScaffoldGraph,
    start: NodeIndex,
) -> Result<Vec<Strand>, DelinkError> {
    let mut strands: Vec<Option<Strand>> = vec![None; graph.node_count()];
    strands[start.index()] = Some(Strand::Forward);

    let mut queue = VecDeque::from([start]);
    let mut conflicts = 0usize;
    while let Some(node) = queue.pop_front() {
        let Some(here) = strands[node.index()] else {
            continue;
        };
        for (neighbour, _, orientation) in graph.incident_links(node) {
            let implied = orientation.propagate(here);
            match strands[neighbour.index()] {
                None => {
                    strands[neighbour.index()] = Some(implied);
                    queue.push_back(neighbour);
                }
                Some(existing) if existing != implied => conflicts += 1,
                Some(_) => {}
            }
        }
    }

    if conflicts > 0 {
        debug!(
            "{conflicts} link(s) disagree with strands propagated from '{}'",
            graph.contig_id(start)
        );
    }

    strands
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            s.ok_or_else(|| DelinkError::Unreachable {
                start: graph.contig_id(start).to_string(),
                contig: graph.contig_id(NodeIndex::new(i)).to_string(),
            })
        })
        .collect()
}
