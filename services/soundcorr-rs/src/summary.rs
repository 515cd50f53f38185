//! Tabular views of an analysis: pair table, heatmap matrix and run summary.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{AnalysisConfig, CognateMode};
use crate::correspondence::AnalysisState;
use crate::types::{pair_key, split_pair_key};

/// One row of the segment-pair table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRow {
    pub left: String,
    pub right: String,
    pub count: usize,
}

/// Segment pairs with `count >= min_count`, most frequent first, at most `limit` rows.
pub fn pair_table(state: &AnalysisState, min_count: usize, limit: usize) -> Vec<PairRow> {
    state
        .pairs
        .ranked()
        .into_iter()
        .filter(|&(_, count)| count >= min_count)
        .filter_map(|(key, count)| {
            let (left, right) = split_pair_key(key)?;
            Some(PairRow {
                left: left.to_string(),
                right: right.to_string(),
                count,
            })
        })
        .take(limit)
        .collect()
}

/// Pair counts among the most frequent segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub segments: Vec<String>,
    /// Symmetric; `counts[[i, j]]` is the pair count of `segments[i]` and `segments[j]`.
    pub counts: Array2<usize>,
}

impl Heatmap {
    pub fn get(&self, a: &str, b: &str) -> Option<usize> {
        let i = self.segments.iter().position(|s| s == a)?;
        let j = self.segments.iter().position(|s| s == b)?;
        Some(self.counts[[i, j]])
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

pub fn heatmap(state: &AnalysisState, top_n: usize) -> Heatmap {
    let segments: Vec<String> = state
        .segments
        .top(top_n)
        .into_iter()
        .map(|(s, _)| s.to_string())
        .collect();
    let n = segments.len();
    let mut counts = Array2::<usize>::zeros((n, n));

    for i in 0..n {
        for j in i + 1..n {
            let count = state.pairs.get(&pair_key(&segments[i], &segments[j]));
            counts[[i, j]] = count;
            counts[[j, i]] = count;
        }
    }

    Heatmap { segments, counts }
}

/// Parameters an analysis ran with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    pub mode: CognateMode,
    pub doculect_column: String,
    pub concept_column: String,
    pub tokens_column: String,
    pub cognate_column: String,
    pub top_n: usize,
    pub min_count: usize,
}

impl RunParams {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            mode: config.mode,
            doculect_column: config.columns.doculect.clone(),
            concept_column: config.columns.concept.clone(),
            tokens_column: config.columns.tokens.clone(),
            cognate_column: config.cognate_column().to_string(),
            top_n: config.top_n,
            min_count: config.min_count,
        }
    }
}

impl fmt::Display for RunParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode {}, columns {}/{}/{}/{}, top {}, min count {}",
            self.mode,
            self.doculect_column,
            self.concept_column,
            self.tokens_column,
            self.cognate_column,
            self.top_n,
            self.min_count
        )
    }
}

/// Headline numbers of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub concept: String,
    pub rows: usize,
    pub pairs: usize,
    pub languages: usize,
}

impl RunSummary {
    pub fn from_state(state: &AnalysisState) -> Self {
        Self {
            concept: state.concept.clone(),
            rows: state.row_count,
            pairs: state.pairs.len(),
            languages: state.lang_counts.len(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Concept: {} | rows {} | pairs {} | languages {}",
            self.concept, self.rows, self.pairs, self.languages
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspondence::GroupMember;
    use pretty_assertions::assert_eq;

    fn state() -> AnalysisState {
        let mut state = AnalysisState::new("hand", CognateMode::Full);
        state.row_count = 4;
        state.accumulate_group(&[
            GroupMember::new("A", &["p", "a"]),
            GroupMember::new("B", &["b", "a"]),
            GroupMember::new("C", &["b", "e"]),
        ]);
        state
    }

    #[test]
    fn test_pair_table_order_and_threshold() {
        let rows = pair_table(&state(), 1, 10);
        // p~b twice, then a~e twice (discovery order), nothing else
        assert_eq!(
            rows,
            vec![
                PairRow {
                    left: "b".to_string(),
                    right: "p".to_string(),
                    count: 2
                },
                PairRow {
                    left: "a".to_string(),
                    right: "e".to_string(),
                    count: 2
                },
            ]
        );
        assert!(pair_table(&state(), 3, 10).is_empty());
        assert_eq!(pair_table(&state(), 1, 1).len(), 1);
    }

    #[test]
    fn test_heatmap_symmetric() {
        let map = heatmap(&state(), 4);
        assert_eq!(map.segments.len(), 4);
        assert_eq!(map.get("p", "b"), Some(2));
        assert_eq!(map.get("b", "p"), Some(2));
        assert_eq!(map.get("a", "a"), Some(0));
        assert_eq!(map.get("p", "x"), None);
        assert_eq!(map.max_count(), 2);
        assert_eq!(map.counts, map.counts.t());
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary::from_state(&state());
        assert_eq!(summary.languages, 3);
        assert_eq!(summary.pairs, 2);
        assert_eq!(
            summary.to_string(),
            "Concept: hand | rows 4 | pairs 2 | languages 3"
        );
    }

    #[test]
    fn test_params_display() {
        let params = RunParams::from_config(&AnalysisConfig::default());
        assert_eq!(
            params.to_string(),
            "mode FULL, columns DOCULECT/CONCEPT/TOKENS/COGID, top 20, min count 1"
        );
    }
}
