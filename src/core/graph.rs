//! Directed scaffold graph keyed by contig id.
//!
//! Nodes keep the order in which contigs were first added; every
//! tie-break in the delinking pipeline relies on that order, so two runs
//! over the same input always produce the same components and layouts.
//!
//! Graphs are never edited once handed to the pipeline. Simplification and
//! delinking build a fresh graph with [`ScaffoldGraph::without_links`] and
//! pieces are cut out with [`ScaffoldGraph::subgraph`] or, for a whole
//! graph at once, [`ScaffoldGraph::component_subgraphs`]. Both only touch
//! the links of the nodes they keep.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::debug;

use crate::core::contig::LinkOrientation;

/// A directed link `(source, target)` between two nodes of one graph
pub type Link = (NodeIndex, NodeIndex);

#[derive(Debug, Clone, Default)]
pub struct ScaffoldGraph {
    graph: DiGraph<String, LinkOrientation>,
    index: HashMap<String, NodeIndex>,
}

impl ScaffoldGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contig if it is not present yet and return its node
    pub fn add_contig(&mut self, id: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(id) {
            return node;
        }
        let node = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), node);
        node
    }

    /// Add a link between two contigs, creating them as needed.
    ///
    /// A second link in the same direction between the same pair is ignored
    /// and the first orientation is kept. Returns `false` in that case.
    pub fn add_link(&mut self, source: &str, target: &str, orientation: LinkOrientation) -> bool {
        let a = self.add_contig(source);
        let b = self.add_contig(target);
        if self.graph.find_edge(a, b).is_some() {
            debug!("Ignoring duplicate link {source} -> {target}");
            return false;
        }
        self.graph.add_edge(a, b, orientation);
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Contig id of a node
    pub fn contig_id(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Contig ids in insertion order
    pub fn contig_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.graph.edges_directed(node, Direction::Incoming).count()
    }

    /// All links as `(source, target, orientation)` in insertion order
    pub fn links(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, LinkOrientation)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), *e.weight()))
    }

    /// Successors of a node, sorted by node order
    pub fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Predecessors of a node, sorted by node order
    pub fn predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Links touching a node in either direction, as `(neighbour, link, orientation)`
    pub fn incident_links(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, Link, LinkOrientation)> + '_ {
        let outgoing = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), (e.source(), e.target()), *e.weight()));
        let incoming = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), (e.source(), e.target()), *e.weight()));
        outgoing.chain(incoming)
    }

    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Weakly connected components, each sorted by node order, the list
    /// ordered by each component's first node.
    pub fn weakly_connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let (components, _) = self.partition();
        components
    }

    /// Every weakly connected component as its own graph, in the order of
    /// [`ScaffoldGraph::weakly_connected_components`].
    pub fn component_subgraphs(&self) -> Vec<Self> {
        let (components, slot_of) = self.partition();

        let mut links: Vec<Vec<EdgeIndex>> = vec![Vec::new(); components.len()];
        for edge in self.graph.edge_references() {
            links[slot_of[edge.source().index()]].push(edge.id());
        }

        components
            .iter()
            .zip(&links)
            .map(|(nodes, edges)| self.build(nodes, edges))
            .collect()
    }

    /// Copy of the graph restricted to `nodes`, keeping node order and every
    /// link whose endpoints are both kept.
    #[must_use]
    pub fn subgraph(&self, nodes: &[NodeIndex]) -> Self {
        let keep: HashSet<NodeIndex> = nodes.iter().copied().collect();
        let mut ordered: Vec<NodeIndex> = keep.iter().copied().collect();
        ordered.sort_unstable();

        let mut edges: Vec<EdgeIndex> = ordered
            .iter()
            .flat_map(|&node| self.graph.edges_directed(node, Direction::Outgoing))
            .filter(|e| keep.contains(&e.target()))
            .map(|e| e.id())
            .collect();
        edges.sort_unstable();

        self.build(&ordered, &edges)
    }

    /// Components as sorted node lists, plus the component slot of every node
    fn partition(&self) -> (Vec<Vec<NodeIndex>>, Vec<usize>) {
        let mut sets = UnionFind::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut by_root: HashMap<usize, usize> = HashMap::new();
        let mut components: Vec<Vec<NodeIndex>> = Vec::new();
        let mut slot_of = Vec::with_capacity(self.graph.node_count());
        for node in self.graph.node_indices() {
            let root = sets.find(node.index());
            let slot = *by_root.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(node);
            slot_of.push(slot);
        }
        (components, slot_of)
    }

    /// New graph from sorted nodes and sorted links of this one
    fn build(&self, nodes: &[NodeIndex], edges: &[EdgeIndex]) -> Self {
        let mut sub = Self::new();
        for &node in nodes {
            sub.add_contig(&self.graph[node]);
        }
        for &edge in edges {
            if let Some((source, target)) = self.graph.edge_endpoints(edge) {
                sub.add_link(&self.graph[source], &self.graph[target], self.graph[edge]);
            }
        }
        sub
    }

    /// Copy of the graph with the given directed links left out. Node
    /// indices are preserved.
    #[must_use]
    pub fn without_links(&self, removed: &HashSet<Link>) -> Self {
        let mut out = Self::new();
        for node in self.graph.node_indices() {
            out.add_contig(&self.graph[node]);
        }
        for edge in self.graph.edge_references() {
            if !removed.contains(&(edge.source(), edge.target())) {
                out.add_link(
                    &self.graph[edge.source()],
                    &self.graph[edge.target()],
                    *edge.weight(),
                );
            }
        }
        out
    }

    /// Copy of the graph without the named contigs and their links
    #[must_use]
    pub fn without_contigs(&self, removed: &HashSet<String>) -> Self {
        let kept: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&n| !removed.contains(&self.graph[n]))
            .collect();
        self.subgraph(&kept)
    }
}
