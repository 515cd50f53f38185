//! Shared data structures for the sound-correspondence engine.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Row identifier in the wordlist store.
pub type RowId = usize;

/// Gap symbol used for positional padding (and found inside alignments).
pub const GAP: &str = "-";

/// Morpheme-boundary marker filtered out of token sequences.
pub const MORPHEME_BOUNDARY: &str = "+";

/// Separator of canonical pair keys.
pub const PAIR_SEPARATOR: &str = "||";

/// Order-independent key for an unordered pair: `pair_key(a, b) == pair_key(b, a)`.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}{PAIR_SEPARATOR}{b}")
    } else {
        format!("{b}{PAIR_SEPARATOR}{a}")
    }
}

/// Split a canonical pair key back into its two members.
pub fn split_pair_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(PAIR_SEPARATOR)
}

/// Node/edge size derived from a count: `max(1, ln(count + 1))`.
pub fn log_size(count: usize) -> f64 {
    f64::max(1.0, ((count + 1) as f64).ln())
}

/// Occurrence counter that remembers discovery order.
///
/// Ties in frequency rankings are broken by the order in which keys were
/// first seen, so rankings are reproducible across runs.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    entries: Vec<(String, usize)>,
    index: AHashMap<String, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, inc: usize) {
        if let Some(&idx) = self.index.get(key) {
            self.entries[idx].1 += inc;
        } else {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), inc));
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map(|&idx| self.entries[idx].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Entries sorted by descending count; stable, so ties keep discovery order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut items: Vec<(&str, usize)> = self.iter().collect();
        items.sort_by(|a, b| b.1.cmp(&a.1));
        items
    }

    /// The `n` highest-ranked entries.
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut items = self.ranked();
        items.truncate(n);
        items
    }
}

/// Node of a visualization graph. `x`/`y` are cosmetic layout hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub size: f64,
    pub color: String,
    pub x: f64,
    pub y: f64,
}

impl GraphNode {
    pub fn new(id: String, label: &str, size: f64, color: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            size,
            color: color.to_string(),
            x: 0.0,
            y: 0.0,
        }
    }
}

/// Edge of a visualization graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Generic node/edge graph handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edge endpoints resolved to node labels, in edge order.
    pub fn edge_labels(&self) -> Vec<(String, String)> {
        self.edges
            .iter()
            .filter_map(|e| {
                let source = self.node(&e.source)?;
                let target = self.node(&e.target)?;
                Some((source.label.clone(), target.label.clone()))
            })
            .collect()
    }

    /// Whether some edge joins the nodes labelled `a` and `b`, in either direction.
    pub fn has_edge_between(&self, a: &str, b: &str) -> bool {
        self.edge_labels()
            .iter()
            .any(|(s, t)| (s == a && t == b) || (s == b && t == a))
    }
}

/// Word form fed into the word-chain builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordForm {
    pub row_id: RowId,
    pub label: String,
    pub tokens: Vec<String>,
}

impl WordForm {
    pub fn new(row_id: RowId, label: &str, tokens: Vec<String>) -> Self {
        Self {
            row_id,
            label: label.to_string(),
            tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_symmetric() {
        assert_eq!(pair_key("p", "b"), pair_key("b", "p"));
        assert_eq!(pair_key("p", "b"), "b||p");
        assert_eq!(split_pair_key("b||p"), Some(("b", "p")));
    }

    #[test]
    fn test_log_size_floor() {
        assert_eq!(log_size(0), 1.0);
        assert_eq!(log_size(1), 1.0);
        assert!((log_size(10) - 11f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_counter_ranked_is_stable() {
        let mut c = Counter::new();
        c.add("x", 1);
        c.add("y", 2);
        c.add("z", 1);
        c.add("x", 1);
        let ranked = c.ranked();
        assert_eq!(ranked, vec![("x", 2), ("y", 2), ("z", 1)]);
        assert_eq!(c.top(1), vec![("x", 2)]);
        assert_eq!(c.get("missing"), 0);
    }

    #[test]
    fn test_graph_json_omits_missing_label() {
        let graph = Graph {
            nodes: vec![],
            edges: vec![GraphEdge {
                id: "e-0".into(),
                source: "a".into(),
                target: "b".into(),
                size: 1.0,
                label: None,
                color: None,
            }],
        };
        let json = serde_json::to_string(&graph).unwrap();
        assert!(!json.contains("label"));
    }
}
