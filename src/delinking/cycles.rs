//! Start selection and cycle breaking.
//!
//! A component can only be laid out from a start contig with no incoming
//! links, and only if it has no directed cycles. When either condition fails
//! the component is simplified by dropping links, never contigs.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::core::graph::{Link, ScaffoldGraph};
use crate::delinking::DelinkError;

/// Component ready for coordinate assignment
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Acyclic copy of the component
    pub graph: ScaffoldGraph,
    /// Start contig, with no incoming links in `graph`
    pub start: NodeIndex,
    /// Links dropped from the input, as `(source, target)` contig ids
    pub removed: Vec<(String, String)>,
}

/// Pick the contig with the fewest incoming links, the first one in node
/// order on ties. Returns `None` for an empty graph.
pub fn choose_start(graph: &ScaffoldGraph) -> Option<(NodeIndex, usize)> {
    let mut best: Option<(NodeIndex, usize)> = None;
    for node in graph.nodes() {
        let degree = graph.in_degree(node);
        if best.map_or(true, |(_, d)| degree < d) {
            best = Some((node, degree));
        }
    }
    best
}

/// Drop the links that keep `graph` from being laid out from `start`.
///
/// Every incoming link of `start` is removed, then a depth-first search
/// seeded at `start` (and afterwards at every unvisited contig in node order)
/// removes each link that closes a cycle. The result is acyclic, `start` has
/// no incoming links, and applying this again removes nothing.
#[must_use]
pub fn simplify(graph: &ScaffoldGraph, start: NodeIndex) -> ScaffoldGraph {
    let mut removed: HashSet<Link> = graph
        .predecessors(start)
        .into_iter()
        .map(|p| (p, start))
        .collect();

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        New,
        Open,
        Done,
    }

    let mut marks = vec![Mark::New; graph.node_count()];
    let seeds = std::iter::once(start).chain(graph.nodes().filter(|&n| n != start));

    for seed in seeds {
        if marks[seed.index()] != Mark::New {
            continue;
        }
        marks[seed.index()] = Mark::Open;
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
            vec![(seed, graph.successors(seed), 0)];

        while let Some((node, successors, next)) = stack.last_mut() {
            let node = *node;
            if let Some(&succ) = successors.get(*next) {
                *next += 1;
                if removed.contains(&(node, succ)) {
                    continue;
                }
                match marks[succ.index()] {
                    Mark::Open => {
                        removed.insert((node, succ));
                    }
                    Mark::New => {
                        marks[succ.index()] = Mark::Open;
                        stack.push((succ, graph.successors(succ), 0));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node.index()] = Mark::Done;
                stack.pop();
            }
        }
    }

    if removed.is_empty() {
        return graph.clone();
    }
    debug!(
        "Simplified component from '{}': removed {} link(s)",
        graph.contig_id(start),
        removed.len()
    );
    graph.without_links(&removed)
}

/// Choose a start contig and simplify the component when it has no source
/// contig or contains a cycle.
///
/// # Errors
///
/// Returns `DelinkError::EmptyComponent` if the graph has no contigs.
pub fn resolve(graph: &ScaffoldGraph) -> Result<Resolved, DelinkError> {
    let (start, in_degree) = choose_start(graph).ok_or(DelinkError::EmptyComponent)?;

    if graph.node_count() == 1 && in_degree == 0 {
        return Ok(Resolved {
            graph: graph.clone(),
            start,
            removed: Vec::new(),
        });
    }

    if in_degree == 0 && !graph.is_cyclic() {
        return Ok(Resolved {
            graph: graph.clone(),
            start,
            removed: Vec::new(),
        });
    }

    debug!(
        "Component of {} contigs requires graph simplification (start '{}', in-degree {})",
        graph.node_count(),
        graph.contig_id(start),
        in_degree
    );
    let simplified = simplify(graph, start);

    let kept: HashSet<(&str, &str)> = simplified
        .links()
        .map(|(s, t, _)| (simplified.contig_id(s), simplified.contig_id(t)))
        .collect();
    let removed = graph
        .links()
        .map(|(s, t, _)| (graph.contig_id(s), graph.contig_id(t)))
        .filter(|link| !kept.contains(link))
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect();

    let (start, _) = choose_start(&simplified).ok_or(DelinkError::EmptyComponent)?;
    Ok(Resolved {
        graph: simplified,
        start,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::LinkOrientation;

    fn graph(links: &[(&str, &str)]) -> ScaffoldGraph {
        let mut g = ScaffoldGraph::new();
        for (a, b) in links {
            g.add_link(a, b, LinkOrientation::EB);
        }
        g
    }

    fn link_names(g: &ScaffoldGraph) -> Vec<(String, String)> {
        g.links()
            .map(|(s, t, _)| (g.contig_id(s).to_string(), g.contig_id(t).to_string()))
            .collect()
    }

    #[test]
    fn test_choose_start_prefers_source() {
        let g = graph(&[("B", "C"), ("A", "B")]);
        let (start, degree) = choose_start(&g).unwrap();
        assert_eq!(g.contig_id(start), "A");
        assert_eq!(degree, 0);
    }

    #[test]
    fn test_choose_start_ties_use_node_order() {
        let g = graph(&[("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        let (start, degree) = choose_start(&g).unwrap();
        assert_eq!(g.contig_id(start), "X");
        assert_eq!(degree, 1);
    }

    #[test]
    fn test_resolve_dag_is_untouched() {
        let g = graph(&[("A", "B"), ("B", "C"), ("A", "C")]);
        let resolved = resolve(&g).unwrap();
        assert!(resolved.removed.is_empty());
        assert_eq!(resolved.graph.edge_count(), 3);
        assert_eq!(resolved.graph.contig_id(resolved.start), "A");
    }

    #[test]
    fn test_resolve_breaks_three_cycle() {
        let g = graph(&[("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        let resolved = resolve(&g).unwrap();
        assert_eq!(resolved.removed, vec![("Z".to_string(), "X".to_string())]);
        assert!(!resolved.graph.is_cyclic());
        assert_eq!(resolved.graph.node_count(), 3);
        assert_eq!(resolved.graph.in_degree(resolved.start), 0);
    }

    #[test]
    fn test_resolve_breaks_cycle_below_source() {
        let g = graph(&[("A", "B"), ("B", "C"), ("C", "B")]);
        let resolved = resolve(&g).unwrap();
        assert!(!resolved.graph.is_cyclic());
        assert_eq!(resolved.removed, vec![("C".to_string(), "B".to_string())]);
    }

    #[test]
    fn test_resolve_handles_self_loop() {
        let g = graph(&[("A", "A"), ("A", "B")]);
        let resolved = resolve(&g).unwrap();
        assert!(!resolved.graph.is_cyclic());
        assert_eq!(resolved.graph.edge_count(), 1);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let g = graph(&[
            ("A", "B"),
            ("B", "A"),
            ("B", "C"),
            ("C", "D"),
            ("D", "B"),
            ("D", "A"),
        ]);
        let once = resolve(&g).unwrap();
        let twice = resolve(&once.graph).unwrap();
        assert!(twice.removed.is_empty());
        assert_eq!(link_names(&once.graph), link_names(&twice.graph));
        assert_eq!(once.graph.node_count(), g.node_count());
    }

    #[test]
    fn test_resolve_empty_graph() {
        assert!(matches!(
            resolve(&ScaffoldGraph::new()),
            Err(DelinkError::EmptyComponent)
        ));
    }
}
