//! Sound-correspondence engine for cognate-coded wordlists.
//!
//! Provides:
//! - correspondence aggregation over positionally aligned cognate sets
//! - segment and language correspondence graphs
//! - feature-driven chain, tree and sound-class graphs
//! - word-form similarity chains
//! - pair tables, heatmaps and run summaries
//!
//! With the `python` feature the session is exported via PyO3, returning JSON.

pub mod cluster;
pub mod config;
pub mod correspondence;
pub mod error;
pub mod feature_graph;
pub mod graph;
pub mod layout;
pub mod session;
pub mod summary;
pub mod transitions;
pub mod types;
pub mod word_chain;
pub mod wordlist;

pub use cluster::UnionFind;
pub use config::{AnalysisConfig, CognateMode, ColumnNames, LayoutConfig, WordFormScope};
pub use correspondence::{AnalysisState, GroupMember};
pub use error::{Result, SoundChangeError};
pub use feature_graph::{build_feature_graph, ClassModel, FeatureGraphMode, FeatureGraphParams};
pub use graph::{build_language_graph, build_segment_graph, graph_stats, to_json, GraphStats};
pub use session::SoundChangeSession;
pub use summary::{heatmap, pair_table, Heatmap, PairRow, RunParams, RunSummary};
pub use transitions::{follow_transitions, Transition, MAX_TRANSITION_STEPS};
pub use types::{pair_key, Counter, Graph, GraphEdge, GraphNode, RowId, WordForm};
pub use word_chain::{build_word_chain, sound_class_signature};
pub use wordlist::{Columns, Wordlist};

#[cfg(feature = "python")]
mod python {
    use pyo3::exceptions::{PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use soundcorr_phonetic::TableOracle;

    use crate::{
        follow_transitions, graph_stats, AnalysisConfig, FeatureGraphMode, Graph,
        SoundChangeError, SoundChangeSession, Transition, Wordlist,
    };

    impl From<SoundChangeError> for PyErr {
        fn from(err: SoundChangeError) -> PyErr {
            match err {
                SoundChangeError::InputMissing(_)
                | SoundChangeError::InvalidInput(_)
                | SoundChangeError::Config(_)
                | SoundChangeError::Csv(_) => {
                    PyValueError::new_err(err.to_string())
                }
                _ => PyRuntimeError::new_err(err.to_string()),
            }
        }
    }

    fn session(config_toml: Option<&str>, oracle_json: Option<&str>) -> PyResult<SoundChangeSession> {
        let config = match config_toml {
            Some(text) => AnalysisConfig::from_toml_str(text)?,
            None => AnalysisConfig::default(),
        };
        let mut session = SoundChangeSession::new(config);
        if let Some(json) = oracle_json {
            let oracle = TableOracle::from_json(json).map_err(SoundChangeError::from)?;
            session = session
                .with_feature_oracle(oracle.clone())
                .with_class_oracle(oracle);
        }
        Ok(session)
    }

    fn graph_json(graph: Option<Graph>) -> PyResult<String> {
        let graph = graph.unwrap_or_default();
        Ok(crate::to_json(&graph).map_err(SoundChangeError::from)?)
    }

    /// Run an analysis and return the summary, segment graph and language graph as JSON.
    #[pyfunction]
    #[pyo3(signature = (tsv, concept, config_toml=None))]
    fn analyze(tsv: &str, concept: &str, config_toml: Option<&str>) -> PyResult<String> {
        let wordlist = Wordlist::from_tsv(tsv)?;
        let mut session = session(config_toml, None)?;
        let summary = session.run(&wordlist, concept)?;
        let (top_n, min_count) = (session.config().top_n, session.config().min_count);
        let segments = session.segment_graph(top_n, min_count)?;
        let languages = session.language_graph(min_count)?;
        let value = serde_json::json!({
            "summary": summary,
            "params": session.params(),
            "segments": segments,
            "languages": languages,
            "pairs": session.pair_table(min_count)?,
        });
        Ok(value.to_string())
    }

    /// Feature graph (`chain`, `tree` or `class`) as JSON; empty when no segment is known.
    #[pyfunction]
    #[pyo3(signature = (tsv, concept, oracle_json, mode, start=None, config_toml=None))]
    fn feature_graph(
        tsv: &str,
        concept: &str,
        oracle_json: &str,
        mode: &str,
        start: Option<&str>,
        config_toml: Option<&str>,
    ) -> PyResult<String> {
        let wordlist = Wordlist::from_tsv(tsv)?;
        let mode: FeatureGraphMode = mode.parse()?;
        let mut session = session(config_toml, Some(oracle_json))?;
        session.run(&wordlist, concept)?;
        let (top_n, min_count) = (session.config().top_n, session.config().min_count);
        graph_json(session.feature_graph(mode, start, top_n, min_count)?)
    }

    /// Word-form chain of a concept as JSON.
    #[pyfunction]
    #[pyo3(signature = (tsv, concept, oracle_json, start=None, config_toml=None))]
    fn word_chain(
        tsv: &str,
        concept: &str,
        oracle_json: &str,
        start: Option<&str>,
        config_toml: Option<&str>,
    ) -> PyResult<String> {
        let wordlist = Wordlist::from_tsv(tsv)?;
        let mut session = session(config_toml, Some(oracle_json))?;
        session.run(&wordlist, concept)?;
        graph_json(session.word_chain(start)?)
    }

    /// Greedy walk over directed `(source, target, count)` changes.
    #[pyfunction]
    #[pyo3(signature = (edges, start, max_steps=crate::MAX_TRANSITION_STEPS))]
    fn transition_chain(
        edges: Vec<(String, String, usize)>,
        start: &str,
        max_steps: usize,
    ) -> PyResult<Vec<String>> {
        let edges: Vec<Transition> = edges
            .iter()
            .map(|(s, t, c)| Transition::new(s, t, *c))
            .collect();
        Ok(follow_transitions(&edges, start, max_steps))
    }

    /// `(num_nodes, num_edges, avg_degree, density, num_components)` of a JSON graph.
    #[pyfunction]
    fn stats(graph_json: &str) -> PyResult<(usize, usize, f64, f64, usize)> {
        let graph: Graph = serde_json::from_str(graph_json).map_err(SoundChangeError::from)?;
        let s = graph_stats(&graph);
        Ok((s.num_nodes, s.num_edges, s.avg_degree, s.density, s.num_components))
    }

    #[pymodule]
    fn soundcorr_core(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(analyze, m)?)?;
        m.add_function(wrap_pyfunction!(feature_graph, m)?)?;
        m.add_function(wrap_pyfunction!(word_chain, m)?)?;
        m.add_function(wrap_pyfunction!(transition_chain, m)?)?;
        m.add_function(wrap_pyfunction!(stats, m)?)?;
        Ok(())
    }
}
