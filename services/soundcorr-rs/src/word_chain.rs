//! Word-form similarity network.
//!
//! Forms sharing a sound-class signature form a cluster, chained internally
//! by nearest-neighbor token edit distance. Clusters are linked by a
//! minimum spanning forest over signature distances.

use rayon::prelude::*;

use soundcorr_phonetic::{levenshtein, signature_distance};

use crate::cluster::UnionFind;
use crate::feature_graph::ClassModel;
use crate::types::{log_size, Graph, GraphEdge, GraphNode, WordForm};

/// Class symbol for tokens the class oracle does not know.
pub const UNKNOWN_SYMBOL: &str = "?";

const CHAIN_COLOR: &str = "#999";
const LINK_COLOR: &str = "#2D6CA2";
const START_COLOR: &str = "#dc143c";
const CLUSTER_PALETTE: [&str; 6] = ["#3c9d5d", "#8e44ad", "#f0ad4e", "#16a085", "#7f8c8d", "#c0392b"];

/// Sound-class signature of a token sequence.
pub fn sound_class_signature(tokens: &[String], classes: ClassModel<'_>) -> String {
    tokens
        .iter()
        .map(|t| {
            classes
                .class_of(t)
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string())
        })
        .collect()
}

#[derive(Debug)]
struct Cluster {
    signature: String,
    members: Vec<usize>,
    representative: usize,
}

fn cluster_forms(forms: &[WordForm], signatures: &[String]) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for (idx, signature) in signatures.iter().enumerate() {
        match clusters.iter_mut().find(|c| c.signature == *signature) {
            Some(cluster) => cluster.members.push(idx),
            None => clusters.push(Cluster {
                signature: signature.clone(),
                members: vec![idx],
                representative: idx,
            }),
        }
    }
    for cluster in clusters.iter_mut() {
        if let Some(&rep) = cluster
            .members
            .iter()
            .min_by(|&&a, &&b| forms[a].label.cmp(&forms[b].label))
        {
            cluster.representative = rep;
        }
    }
    clusters
}

fn push_edge(graph: &mut Graph, source: usize, target: usize, size: f64, label: String, color: &str) {
    graph.edges.push(GraphEdge {
        id: format!("we-{}", graph.edges.len()),
        source: format!("w-{source}"),
        target: format!("w-{target}"),
        size,
        label: Some(label),
        color: Some(color.to_string()),
    });
}

/// Build the word-form chain. Returns `None` for an empty form list.
///
/// A `start_label` naming a form that is not its cluster's representative
/// adds one highlighted `start` edge from that form to the representative.
pub fn build_word_chain(
    forms: &[WordForm],
    classes: ClassModel<'_>,
    start_label: Option<&str>,
) -> Option<Graph> {
    if forms.is_empty() {
        return None;
    }

    let signatures: Vec<String> = forms
        .iter()
        .map(|f| sound_class_signature(&f.tokens, classes))
        .collect();
    let clusters = cluster_forms(forms, &signatures);
    let mut cluster_of = vec![0usize; forms.len()];
    for (ci, cluster) in clusters.iter().enumerate() {
        for &m in &cluster.members {
            cluster_of[m] = ci;
        }
    }

    let mut graph = Graph::new();
    for (idx, form) in forms.iter().enumerate() {
        let color = CLUSTER_PALETTE[cluster_of[idx] % CLUSTER_PALETTE.len()];
        graph.nodes.push(GraphNode::new(
            format!("w-{idx}"),
            &form.label,
            log_size(form.tokens.len()),
            color,
        ));
    }

    for cluster in &clusters {
        let mut current = cluster.representative;
        let mut remaining: Vec<usize> = cluster
            .members
            .iter()
            .copied()
            .filter(|&m| m != current)
            .collect();
        while !remaining.is_empty() {
            let mut best = 0;
            let mut best_dist = usize::MAX;
            for (pos, &m) in remaining.iter().enumerate() {
                let dist = levenshtein(&forms[current].tokens, &forms[m].tokens);
                if dist < best_dist {
                    best = pos;
                    best_dist = dist;
                }
            }
            let next = remaining.remove(best);
            push_edge(
                &mut graph,
                current,
                next,
                log_size(best_dist),
                best_dist.to_string(),
                CHAIN_COLOR,
            );
            current = next;
        }
    }

    let pairs: Vec<(usize, usize)> = (0..clusters.len())
        .flat_map(|i| (i + 1..clusters.len()).map(move |j| (i, j)))
        .collect();
    let distances: Vec<usize> = pairs
        .par_iter()
        .map(|&(i, j)| signature_distance(&clusters[i].signature, &clusters[j].signature))
        .collect();
    let mut candidates: Vec<((usize, usize), usize)> = pairs.into_iter().zip(distances).collect();
    candidates.sort_by_key(|&(_, dist)| dist);

    let mut forest: UnionFind<usize> = UnionFind::new();
    for ((i, j), dist) in candidates {
        if !forest.union(&i, &j) {
            continue;
        }
        push_edge(
            &mut graph,
            clusters[i].representative,
            clusters[j].representative,
            log_size(dist),
            dist.to_string(),
            LINK_COLOR,
        );
    }

    if let Some(label) = start_label.map(str::trim).filter(|l| !l.is_empty()) {
        match forms.iter().position(|f| f.label == label) {
            Some(start) => {
                graph.nodes[start].color = START_COLOR.to_string();
                let rep = clusters[cluster_of[start]].representative;
                if rep != start {
                    push_edge(&mut graph, start, rep, 1.0, "start".to_string(), START_COLOR);
                }
            }
            None => log::warn!("Start form {label:?} not found"),
        }
    }

    log::debug!(
        "Word chain: {} forms in {} clusters, {} edges",
        forms.len(),
        clusters.len(),
        graph.edges.len()
    );
    Some(graph)
}
