//! Cosmetic node placement. Coordinates are random and never read back.

use rand::Rng;

use crate::config::LayoutConfig;
use crate::types::Graph;

/// Scatter nodes uniformly over `[0, extent)²` using the given source.
pub fn scatter<R: Rng>(graph: &mut Graph, extent: f64, rng: &mut R) {
    for node in graph.nodes.iter_mut() {
        node.x = rng.random_range(0.0..extent);
        node.y = rng.random_range(0.0..extent);
    }
}

/// Apply the configured layout, if enabled.
pub fn apply_layout(graph: &mut Graph, config: &LayoutConfig) {
    if !config.enabled || config.extent <= 0.0 {
        return;
    }
    scatter(graph, config.extent, &mut rand::rng());
}
