//! Mapping changepoints back to scaffold links and cutting them.

use std::collections::HashSet;

use crate::core::graph::{Link, ScaffoldGraph};
use crate::core::types::CoordinateMap;

/// Links to cut for a set of changepoint positions.
///
/// A position inside contig `c` placed over `[s, e)` only acts on a junction
/// it is close to: when `p - s <= position_cutoff` the links between `c` and
/// graph neighbours placed before `c` are marked, and when
/// `e - 1 - p <= position_cutoff` the links to neighbours placed after `c`
/// are marked. Positions deeper inside a contig are ignored.
#[must_use]
pub fn positions_to_edges(
    positions: &[usize],
    coords: &CoordinateMap,
    graph: &ScaffoldGraph,
    position_cutoff: u64,
) -> HashSet<Link> {
    let mut marked = HashSet::new();

    for &position in positions {
        let position = position as u64;
        let Some((rank, placement)) = coords.placement_at(position) else {
            continue;
        };
        let Some(node) = graph.node(&placement.contig) else {
            continue;
        };

        let near_start = position - placement.start <= position_cutoff;
        let near_end = placement.end - 1 - position <= position_cutoff;
        if !near_start && !near_end {
            continue;
        }

        for (neighbour, link, _) in graph.incident_links(node) {
            let Some(other) = coords.rank(graph.contig_id(neighbour)) else {
                continue;
            };
            if (near_start && other < rank) || (near_end && other > rank) {
                marked.insert(link);
            }
        }
    }

    marked
}

/// Copy of `graph` without the given links
#[must_use]
pub fn delink(graph: &ScaffoldGraph, links: &HashSet<Link>) -> ScaffoldGraph {
    graph.without_links(links)
}
