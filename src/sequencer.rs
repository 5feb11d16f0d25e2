use crate::error::SequenceError;
use crate::graph::{Node, WorkflowGraph};
use ahash::AHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::{debug, warn};

/// A visitation order over a graph's nodes, stored as indices into `graph.nodes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
    indices: Vec<usize>,
}

impl TopologicalOrder {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Resolves the order against the graph it was computed from.
    pub fn nodes<'g>(&'g self, graph: &'g WorkflowGraph) -> impl Iterator<Item = &'g Node> + 'g {
        self.indices.iter().map(move |&i| &graph.nodes[i])
    }

    pub fn node_ids<'g>(&self, graph: &'g WorkflowGraph) -> Vec<&'g str> {
        self.indices.iter().map(|&i| graph.nodes[i].id.as_str()).collect()
    }
}

/// Orders nodes so that every edge's source precedes its target (Kahn's algorithm).
///
/// When several nodes are ready at once, the one that appears first in `graph.nodes` goes
/// first, so identical input always yields the identical order. A cycle is reported as
/// [`SequenceError::CyclicGraph`]; a partial order is never returned.
pub fn topological_order(graph: &WorkflowGraph) -> Result<TopologicalOrder, SequenceError> {
    let node_count = graph.nodes.len();
    let mut index_of: AHashMap<&str, usize> = AHashMap::with_capacity(node_count);
    for (i, node) in graph.nodes.iter().enumerate() {
        if index_of.insert(node.id.as_str(), i).is_some() {
            return Err(SequenceError::DuplicateNode {
                node_id: node.id.clone(),
            });
        }
    }

    let lookup = |id: &str| {
        index_of
            .get(id)
            .copied()
            .ok_or_else(|| SequenceError::UnknownNode {
                node_id: id.to_string(),
            })
    };

    let mut in_degree = vec![0usize; node_count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for edge in &graph.edges {
        let source = lookup(&edge.source_node_id)?;
        let target = lookup(&edge.target_node_id)?;
        successors[source].push(target);
        in_degree[target] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..node_count)
        .filter(|&i| in_degree[i] == 0)
        .map(Reverse)
        .collect();
    let mut indices = Vec::with_capacity(node_count);

    while let Some(Reverse(current)) = ready.pop() {
        indices.push(current);
        for &next in &successors[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if indices.len() < node_count {
        let node_ids: Vec<String> = (0..node_count)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| graph.nodes[i].id.clone())
            .collect();
        warn!(unordered = ?node_ids, "workflow graph contains a cycle");
        return Err(SequenceError::CyclicGraph { node_ids });
    }

    debug!(nodes = indices.len(), "topological order computed");
    Ok(TopologicalOrder { indices })
}
