//! Greedy walk over directed sound-change edges.

use ahash::AHashSet;

/// Default step limit of [`follow_transitions`].
pub const MAX_TRANSITION_STEPS: usize = 10;

/// Directed, counted change `source > target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub source: String,
    pub target: String,
    pub count: usize,
}

impl Transition {
    pub fn new(source: &str, target: &str, count: usize) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            count,
        }
    }
}

/// Follow the most frequent outgoing change to an unvisited segment, starting
/// at `start`, for at most `max_steps` steps.
///
/// The result always begins with `start`; a single element means no change
/// leads anywhere new. Equal counts resolve to the earlier edge.
pub fn follow_transitions(edges: &[Transition], start: &str, max_steps: usize) -> Vec<String> {
    let mut chain = vec![start.to_string()];
    let mut visited: AHashSet<&str> = AHashSet::new();
    visited.insert(start);
    let mut current = start;

    for _ in 0..max_steps {
        let mut best: Option<&Transition> = None;
        for edge in edges {
            if edge.source != current || visited.contains(edge.target.as_str()) {
                continue;
            }
            if best.map_or(true, |b| edge.count > b.count) {
                best = Some(edge);
            }
        }
        let Some(next) = best else {
            break;
        };
        visited.insert(&next.target);
        chain.push(next.target.clone());
        current = &next.target;
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges() -> Vec<Transition> {
        vec![
            Transition::new("p", "f", 3),
            Transition::new("p", "b", 5),
            Transition::new("b", "v", 2),
            Transition::new("v", "p", 9),
            Transition::new("v", "w", 1),
        ]
    }

    #[test]
    fn test_follows_highest_count() {
        assert_eq!(
            follow_transitions(&edges(), "p", MAX_TRANSITION_STEPS),
            vec!["p", "b", "v", "w"]
        );
    }

    #[test]
    fn test_step_limit() {
        assert_eq!(follow_transitions(&edges(), "p", 1), vec!["p", "b"]);
    }

    #[test]
    fn test_dead_end() {
        assert_eq!(follow_transitions(&edges(), "w", MAX_TRANSITION_STEPS), vec!["w"]);
        assert_eq!(follow_transitions(&[], "a", MAX_TRANSITION_STEPS), vec!["a"]);
    }
}
