//! Feature-driven phonological graphs: greedy chain, breadth-first tree and
//! sound-class forest.
//!
//! All three strategies work on the `top_n` most frequent segments for which
//! the feature oracle knows a type. Two segments are adjacent when they share
//! a type and co-occur at least `min_count` times.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use soundcorr_phonetic::{
    describe_diffs, feature_diffs, ClassOracle, FeatureCache, FeatureOracle, FeatureVector,
};

use crate::cluster::UnionFind;
use crate::correspondence::AnalysisState;
use crate::error::{Result, SoundChangeError};
use crate::types::{log_size, Graph, GraphEdge, GraphNode};

/// Bucket for segments the class oracle does not know.
pub const UNKNOWN_CLASS: &str = "UNKNOWN";

const VOWEL_COLOR: &str = "#2D6CA2";
const CONSONANT_COLOR: &str = "#dc143c";
const OTHER_COLOR: &str = "#777";
const EDGE_COLOR: &str = "#999";
const LINK_COLOR: &str = "#f0ad4e";
const CLASS_PALETTE: [&str; 8] = [
    "#2D6CA2", "#dc143c", "#3c9d5d", "#f0ad4e", "#8e44ad", "#16a085", "#c0392b", "#7f8c8d",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureGraphMode {
    Chain,
    Tree,
    Class,
}

impl FromStr for FeatureGraphMode {
    type Err = SoundChangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chain" => Ok(FeatureGraphMode::Chain),
            "tree" => Ok(FeatureGraphMode::Tree),
            "class" => Ok(FeatureGraphMode::Class),
            other => Err(SoundChangeError::Config(format!(
                "unknown feature graph mode {other:?}"
            ))),
        }
    }
}

impl fmt::Display for FeatureGraphMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureGraphMode::Chain => "chain",
            FeatureGraphMode::Tree => "tree",
            FeatureGraphMode::Class => "class",
        };
        f.write_str(name)
    }
}

/// Parameters of one feature graph request.
#[derive(Debug, Clone, Copy)]
pub struct FeatureGraphParams<'a> {
    pub mode: FeatureGraphMode,
    /// Start segment for chain and tree; defaults to the most frequent one.
    pub start: Option<&'a str>,
    pub top_n: usize,
    pub min_count: usize,
}

/// Sound-class oracle together with the model name it is queried with.
#[derive(Clone, Copy)]
pub struct ClassModel<'a> {
    pub oracle: &'a dyn ClassOracle,
    pub model: &'a str,
}

impl ClassModel<'_> {
    pub fn class_of(&self, segment: &str) -> Option<String> {
        self.oracle.class_of(segment, self.model)
    }
}

struct Selected<'s> {
    segment: &'s str,
    freq: usize,
    features: FeatureVector,
}

struct Neighbor {
    idx: usize,
    count: usize,
    distance: usize,
    label: String,
}

/// Build one of the three feature graphs.
///
/// Returns `Ok(None)` when no segment has a known type. Class mode needs a
/// class oracle and fails with [`SoundChangeError::OracleUnavailable`]
/// without one.
pub fn build_feature_graph(
    state: &AnalysisState,
    features: &dyn FeatureOracle,
    classes: Option<ClassModel<'_>>,
    cache: &mut FeatureCache,
    params: FeatureGraphParams<'_>,
) -> Result<Option<Graph>> {
    if params.mode == FeatureGraphMode::Class && classes.is_none() {
        return Err(SoundChangeError::OracleUnavailable("sound class"));
    }

    let selected: Vec<Selected<'_>> = state
        .segments
        .ranked()
        .into_iter()
        .filter_map(|(segment, freq)| {
            cache.get(features, segment).cloned().map(|vector| Selected {
                segment,
                freq,
                features: vector,
            })
        })
        .take(params.top_n)
        .collect();

    if selected.is_empty() {
        log::debug!("No segment with known features; feature graph is empty");
        return Ok(None);
    }

    let graph = match (params.mode, classes) {
        (FeatureGraphMode::Chain, _) => {
            let adjacency = adjacency(state, &selected, params.min_count);
            let start = start_index(&selected, params.start);
            greedy_chain(&selected, &adjacency, start)
        }
        (FeatureGraphMode::Tree, _) => {
            let adjacency = adjacency(state, &selected, params.min_count);
            let start = start_index(&selected, params.start);
            breadth_first_tree(&selected, &adjacency, start)
        }
        (FeatureGraphMode::Class, Some(classes)) => {
            class_forest(state, &selected, classes, params.min_count)
        }
        (FeatureGraphMode::Class, None) => {
            return Err(SoundChangeError::OracleUnavailable("sound class"))
        }
    };

    log::debug!(
        "Feature graph ({}): {} nodes, {} edges",
        params.mode,
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(Some(graph))
}

fn start_index(selected: &[Selected<'_>], start: Option<&str>) -> usize {
    match start {
        None => 0,
        Some(s) => selected.iter().position(|x| x.segment == s).unwrap_or_else(|| {
            log::warn!("Start segment {s:?} is not among the selected segments; using the most frequent");
            0
        }),
    }
}

/// Ranked neighbor lists: count desc, distance asc, neighbor frequency desc,
/// then selection order.
fn adjacency(state: &AnalysisState, selected: &[Selected<'_>], min_count: usize) -> Vec<Vec<Neighbor>> {
    let threshold = min_count.max(1);
    let mut adjacency: Vec<Vec<Neighbor>> = selected.iter().map(|_| Vec::new()).collect();

    for i in 0..selected.len() {
        for j in (i + 1)..selected.len() {
            let count = state.pair_count(selected[i].segment, selected[j].segment);
            if count < threshold {
                continue;
            }
            let (Some(forward), Some(backward)) = (
                feature_diffs(&selected[i].features, &selected[j].features),
                feature_diffs(&selected[j].features, &selected[i].features),
            ) else {
                continue;
            };
            adjacency[i].push(Neighbor {
                idx: j,
                count,
                distance: forward.len(),
                label: edge_label(&describe_diffs(&forward), count),
            });
            adjacency[j].push(Neighbor {
                idx: i,
                count,
                distance: backward.len(),
                label: edge_label(&describe_diffs(&backward), count),
            });
        }
    }

    for neighbors in adjacency.iter_mut() {
        neighbors.sort_by(|a, b| rank(selected, a, b));
    }
    adjacency
}

fn rank(selected: &[Selected<'_>], a: &Neighbor, b: &Neighbor) -> Ordering {
    b.count
        .cmp(&a.count)
        .then(a.distance.cmp(&b.distance))
        .then(selected[b.idx].freq.cmp(&selected[a.idx].freq))
        .then(a.idx.cmp(&b.idx))
}

fn edge_label(diff: &str, count: usize) -> String {
    if diff.is_empty() {
        format!("same features ({count})")
    } else {
        format!("{diff} ({count})")
    }
}

fn node_id(idx: usize) -> String {
    format!("f-{idx}")
}

fn feature_node(selected: &Selected<'_>, idx: usize, color: &str) -> GraphNode {
    GraphNode::new(node_id(idx), selected.segment, log_size(selected.freq), color)
}

fn type_color(features: &FeatureVector) -> &'static str {
    match features.kind.as_str() {
        "vowel" => VOWEL_COLOR,
        "consonant" => CONSONANT_COLOR,
        _ => OTHER_COLOR,
    }
}

fn push_edge(graph: &mut Graph, source: usize, target: usize, count: usize, label: String, color: &str) {
    graph.edges.push(GraphEdge {
        id: format!("fe-{}", graph.edges.len()),
        source: node_id(source),
        target: node_id(target),
        size: log_size(count),
        label: Some(label),
        color: Some(color.to_string()),
    });
}

/// Single greedy walk to the best-ranked unvisited neighbor.
fn greedy_chain(selected: &[Selected<'_>], adjacency: &[Vec<Neighbor>], start: usize) -> Graph {
    let mut graph = Graph::new();
    let mut visited = vec![false; selected.len()];
    let mut current = start;
    visited[current] = true;
    graph
        .nodes
        .push(feature_node(&selected[current], current, type_color(&selected[current].features)));

    while let Some(next) = adjacency[current].iter().find(|n| !visited[n.idx]) {
        visited[next.idx] = true;
        let sel = &selected[next.idx];
        graph
            .nodes
            .push(feature_node(sel, next.idx, type_color(&sel.features)));
        push_edge(&mut graph, current, next.idx, next.count, next.label.clone(), EDGE_COLOR);
        current = next.idx;
    }
    graph
}

/// Level-by-level expansion attaching every unvisited neighbor in rank order.
fn breadth_first_tree(selected: &[Selected<'_>], adjacency: &[Vec<Neighbor>], start: usize) -> Graph {
    let mut graph = Graph::new();
    let mut visited = vec![false; selected.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;
    graph
        .nodes
        .push(feature_node(&selected[start], start, type_color(&selected[start].features)));

    while let Some(parent) = queue.pop_front() {
        for child in &adjacency[parent] {
            if visited[child.idx] {
                continue;
            }
            visited[child.idx] = true;
            let sel = &selected[child.idx];
            graph
                .nodes
                .push(feature_node(sel, child.idx, type_color(&sel.features)));
            push_edge(&mut graph, parent, child.idx, child.count, child.label.clone(), EDGE_COLOR);
            queue.push_back(child.idx);
        }
    }
    graph
}

/// Sound classes chained internally and joined by a maximum-weight forest.
fn class_forest(
    state: &AnalysisState,
    selected: &[Selected<'_>],
    classes: ClassModel<'_>,
    min_count: usize,
) -> Graph {
    let mut buckets: Vec<(String, Vec<usize>)> = Vec::new();
    let mut class_of = Vec::with_capacity(selected.len());
    for (idx, sel) in selected.iter().enumerate() {
        let class = classes
            .class_of(sel.segment)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CLASS.to_string());
        let bucket = match buckets.iter().position(|(name, _)| *name == class) {
            Some(b) => b,
            None => {
                buckets.push((class, Vec::new()));
                buckets.len() - 1
            }
        };
        buckets[bucket].1.push(idx);
        class_of.push(bucket);
    }

    let mut graph = Graph::new();
    for (idx, sel) in selected.iter().enumerate() {
        let color = CLASS_PALETTE[class_of[idx] % CLASS_PALETTE.len()];
        graph.nodes.push(feature_node(sel, idx, color));
    }

    for (name, members) in &buckets {
        let mut ordered = members.clone();
        ordered.sort_by(|&a, &b| {
            selected[a]
                .features
                .sort_key(selected[a].segment)
                .cmp(&selected[b].features.sort_key(selected[b].segment))
        });
        for pair in ordered.windows(2) {
            let count = state.pair_count(selected[pair[0]].segment, selected[pair[1]].segment);
            let label = if count > 0 {
                format!("{name} ({count})")
            } else {
                name.clone()
            };
            push_edge(&mut graph, pair[0], pair[1], count, label, EDGE_COLOR);
        }
    }

    let threshold = min_count.max(1);
    let mut candidates: Vec<(usize, usize, usize, usize, usize)> = Vec::new();
    for ci in 0..buckets.len() {
        for cj in (ci + 1)..buckets.len() {
            let mut best: Option<(usize, usize, usize)> = None;
            for &s in &buckets[ci].1 {
                for &t in &buckets[cj].1 {
                    let count = state.pair_count(selected[s].segment, selected[t].segment);
                    if count >= threshold && best.map_or(true, |(_, _, c)| count > c) {
                        best = Some((s, t, count));
                    }
                }
            }
            if let Some((s, t, count)) = best {
                candidates.push((ci, cj, s, t, count));
            }
        }
    }
    candidates.sort_by(|a, b| b.4.cmp(&a.4));

    let mut forest: UnionFind<usize> = UnionFind::new();
    for ci in 0..buckets.len() {
        forest.find(&ci);
    }
    for (ci, cj, s, t, count) in candidates {
        if !forest.union(&ci, &cj) {
            continue;
        }
        let label = format!("{}~{} ({count})", buckets[ci].0, buckets[cj].0);
        push_edge(&mut graph, s, t, count, label, LINK_COLOR);
    }
    graph
}
