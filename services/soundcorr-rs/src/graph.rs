//! Segment and language correspondence graphs, plus graph statistics.

use ahash::{AHashMap, AHashSet};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::correspondence::AnalysisState;
use crate::types::{log_size, split_pair_key, Graph, GraphEdge, GraphNode};

const SEGMENT_COLOR: &str = "#2D6CA2";
const SEGMENT_EDGE_COLOR: &str = "#999";
const LANGUAGE_COLOR: &str = "#dc143c";
const LANGUAGE_EDGE_COLOR: &str = "#666";

/// Upper bound on language edges handed to the renderer.
pub const MAX_LANGUAGE_EDGES: usize = 400;

/// Segment-pair correspondences shown on a language edge.
const LANGUAGE_EDGE_DETAILS: usize = 3;

/// Graph of the `top_n` most frequent segments and their co-occurrences.
///
/// Segments outside the top-N never appear, not even as edge endpoints.
pub fn build_segment_graph(state: &AnalysisState, top_n: usize, min_count: usize) -> Graph {
    let selected = state.segments.top(top_n);
    let mut graph = Graph::new();
    let mut node_ids: AHashMap<&str, String> = AHashMap::new();

    for (i, &(segment, freq)) in selected.iter().enumerate() {
        let id = format!("seg-{i}");
        node_ids.insert(segment, id.clone());
        graph
            .nodes
            .push(GraphNode::new(id, segment, log_size(freq), SEGMENT_COLOR));
    }

    for (key, count) in state.pairs.iter() {
        if count < min_count {
            continue;
        }
        let Some((a, b)) = split_pair_key(key) else {
            continue;
        };
        let (Some(source), Some(target)) = (node_ids.get(a), node_ids.get(b)) else {
            continue;
        };
        graph.edges.push(GraphEdge {
            id: format!("e-{}", graph.edges.len()),
            source: source.clone(),
            target: target.clone(),
            size: log_size(count),
            label: None,
            color: Some(SEGMENT_EDGE_COLOR.to_string()),
        });
    }

    log::debug!(
        "Segment graph: {} nodes, {} edges (top_n={top_n}, min_count={min_count})",
        graph.nodes.len(),
        graph.edges.len()
    );
    graph
}

/// Graph of languages linked by how often they share aligned columns.
///
/// Edge labels list the most frequent segment correspondences of the pair,
/// e.g. `b~p(3), a~e(1)`. At most [`MAX_LANGUAGE_EDGES`] edges are emitted,
/// in discovery order.
pub fn build_language_graph(state: &AnalysisState, min_count: usize) -> Graph {
    let mut graph = Graph::new();
    let mut node_ids: AHashMap<&str, String> = AHashMap::new();

    let mut observed: AHashSet<&str> = AHashSet::new();
    for (key, _) in state.lang_pairs.iter() {
        if let Some((a, b)) = split_pair_key(key) {
            observed.insert(a);
            observed.insert(b);
        }
    }

    for (language, rows) in state.lang_counts.iter() {
        if !observed.contains(language) {
            continue;
        }
        let id = format!("lang-{}", graph.nodes.len());
        node_ids.insert(language, id.clone());
        graph
            .nodes
            .push(GraphNode::new(id, language, log_size(rows), LANGUAGE_COLOR));
    }

    for (key, count) in state.lang_pairs.iter() {
        if count < min_count {
            continue;
        }
        if graph.edges.len() >= MAX_LANGUAGE_EDGES {
            log::warn!("Language graph truncated at {MAX_LANGUAGE_EDGES} edges");
            break;
        }
        let Some((a, b)) = split_pair_key(key) else {
            continue;
        };
        let (Some(source), Some(target)) = (node_ids.get(a), node_ids.get(b)) else {
            continue;
        };
        let label = state
            .lang_pair_details
            .get(key)
            .map(|detail| {
                detail
                    .top(LANGUAGE_EDGE_DETAILS)
                    .into_iter()
                    .map(|(pkey, n)| format!("{}({n})", pkey.replacen("||", "~", 1)))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        graph.edges.push(GraphEdge {
            id: format!("le-{}", graph.edges.len()),
            source: source.clone(),
            target: target.clone(),
            size: log_size(count),
            label: Some(label),
            color: Some(LANGUAGE_EDGE_COLOR.to_string()),
        });
    }

    log::debug!(
        "Language graph: {} nodes, {} edges (min_count={min_count})",
        graph.nodes.len(),
        graph.edges.len()
    );
    graph
}

/// Graph statistics
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub avg_degree: f64,
    pub density: f64,
    pub num_components: usize,
}

/// Undirected petgraph view of a visualization graph.
fn to_petgraph(graph: &Graph) -> UnGraph<String, f64> {
    let mut ug = UnGraph::new_undirected();
    let mut node_map: AHashMap<&str, NodeIndex> = AHashMap::new();
    for node in &graph.nodes {
        let idx = ug.add_node(node.label.clone());
        node_map.insert(node.id.as_str(), idx);
    }
    for edge in &graph.edges {
        if let (Some(&s), Some(&t)) = (
            node_map.get(edge.source.as_str()),
            node_map.get(edge.target.as_str()),
        ) {
            ug.add_edge(s, t, edge.size);
        }
    }
    ug
}

/// Get graph statistics
pub fn graph_stats(graph: &Graph) -> GraphStats {
    let ug = to_petgraph(graph);
    let num_nodes = ug.node_count();
    let num_edges = ug.edge_count();
    let avg_degree = if num_nodes > 0 {
        (2 * num_edges) as f64 / num_nodes as f64
    } else {
        0.0
    };

    let density = if num_nodes > 1 {
        (2 * num_edges) as f64 / (num_nodes * (num_nodes - 1)) as f64
    } else {
        0.0
    };

    GraphStats {
        num_nodes,
        num_edges,
        avg_degree,
        density,
        num_components: connected_components(&ug),
    }
}

/// Export graph to JSON for the renderer.
pub fn to_json(graph: &Graph) -> serde_json::Result<String> {
    serde_json::to_string(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CognateMode;
    use crate::correspondence::GroupMember;

    fn state() -> AnalysisState {
        let mut state = AnalysisState::new("test", CognateMode::Full);
        state.accumulate_group(&[
            GroupMember::new("A", &["p", "a", "t"]),
            GroupMember::new("B", &["b", "e", "t"]),
            GroupMember::new("C", &["p", "e", "d"]),
        ]);
        state
    }

    #[test]
    fn test_segment_graph() {
        let graph = build_segment_graph(&state(), 10, 1);
        assert_eq!(graph.nodes.len(), 6);
        // p~b, a~e and t~d twice each; identical tokens never pair
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(graph.nodes[0].label, "p");
        assert!(graph.has_edge_between("p", "b"));
    }

    #[test]
    fn test_segment_graph_min_count() {
        let graph = build_segment_graph(&state(), 10, 3);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes.len(), 6);
    }

    #[test]
    fn test_language_graph_labels() {
        let graph = build_language_graph(&state(), 1);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 3);
        let ab = graph
            .edges
            .iter()
            .find(|e| e.source == "lang-0" && e.target == "lang-1")
            .unwrap();
        assert_eq!(ab.label.as_deref(), Some("b~p(1), a~e(1)"));
    }

    #[test]
    fn test_language_graph_threshold() {
        let graph = build_language_graph(&state(), 4);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_language_graph_edge_cap() {
        let languages: Vec<String> = (0..29).map(|i| format!("L{i}")).collect();
        let members: Vec<GroupMember> = languages
            .iter()
            .map(|lang| GroupMember::new(lang, &["p"]))
            .collect();
        let mut state = AnalysisState::new("test", CognateMode::Full);
        state.accumulate_group(&members);
        assert_eq!(state.lang_pairs.len(), 406);

        let graph = build_language_graph(&state, 1);
        assert_eq!(graph.nodes.len(), 29);
        assert_eq!(graph.edges.len(), MAX_LANGUAGE_EDGES);
        assert_eq!(graph.edges[0].label.as_deref(), Some(""));
    }

    #[test]
    fn test_language_graph_same_language_loop() {
        let mut state = AnalysisState::new("test", CognateMode::Full);
        state.accumulate_group(&[
            GroupMember::new("A", &["p"]),
            GroupMember::new("A", &["b"]),
        ]);
        let graph = build_language_graph(&state, 1);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, graph.edges[0].target);
        assert_eq!(graph.edges[0].label.as_deref(), Some("b~p(1)"));
    }

    #[test]
    fn test_graph_stats() {
        let graph = build_segment_graph(&state(), 10, 1);
        let stats = graph_stats(&graph);
        assert_eq!(stats.num_nodes, 6);
        assert_eq!(stats.num_edges, 3);
        assert_eq!(stats.num_components, 3);
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&build_segment_graph(&state(), 2, 1)).unwrap();
        assert!(json.contains("\"nodes\""));
        assert!(json.contains("\"edges\""));
    }
}
