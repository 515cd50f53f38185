//! Analysis session: owns the configuration, the oracles and the state of the
//! last run. Every graph is a read-only projection of that state.

use soundcorr_phonetic::{ClassOracle, FeatureCache, FeatureOracle};

use crate::config::{AnalysisConfig, WordFormScope};
use crate::correspondence::AnalysisState;
use crate::error::{Result, SoundChangeError};
use crate::feature_graph::{build_feature_graph, ClassModel, FeatureGraphMode, FeatureGraphParams};
use crate::graph::{build_language_graph, build_segment_graph};
use crate::layout::apply_layout;
use crate::summary::{heatmap, pair_table, Heatmap, PairRow, RunParams, RunSummary};
use crate::types::{Graph, WordForm};
use crate::word_chain::build_word_chain;
use crate::wordlist::{Columns, Wordlist};

/// Results of the last run, replaced wholesale by the next one.
struct RunOutput {
    state: AnalysisState,
    params: RunParams,
    forms: Vec<WordForm>,
}

pub struct SoundChangeSession {
    config: AnalysisConfig,
    features: Option<Box<dyn FeatureOracle>>,
    classes: Option<Box<dyn ClassOracle>>,
    cache: FeatureCache,
    last: Option<RunOutput>,
}

impl Default for SoundChangeSession {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl SoundChangeSession {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            features: None,
            classes: None,
            cache: FeatureCache::new(),
            last: None,
        }
    }

    pub fn with_feature_oracle(mut self, oracle: impl FeatureOracle + 'static) -> Self {
        self.features = Some(Box::new(oracle));
        self.cache = FeatureCache::new();
        self
    }

    pub fn with_class_oracle(mut self, oracle: impl ClassOracle + 'static) -> Self {
        self.classes = Some(Box::new(oracle));
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// State of the last run, if any.
    pub fn state(&self) -> Option<&AnalysisState> {
        self.last.as_ref().map(|run| &run.state)
    }

    pub fn params(&self) -> Option<&RunParams> {
        self.last.as_ref().map(|run| &run.params)
    }

    /// Word forms of the last run, from the configured [`WordFormScope`].
    pub fn forms(&self) -> Option<&[WordForm]> {
        self.last.as_ref().map(|run| run.forms.as_slice())
    }

    /// Aggregate every row of `concept`.
    ///
    /// Inputs are validated before anything changes: on error the previous
    /// run, if any, stays available.
    pub fn run(&mut self, wordlist: &Wordlist, concept: &str) -> Result<RunSummary> {
        let concept = concept.trim();
        if concept.is_empty() {
            return Err(SoundChangeError::InputMissing("no concept selected".to_string()));
        }
        let columns = Columns::for_config(wordlist, &self.config)?;
        if columns.cognate.is_none() {
            return Err(SoundChangeError::InputMissing(format!(
                "cognate column {} not found",
                self.config.cognate_column()
            )));
        }
        let rows = wordlist.concept_rows(&columns, concept);
        if rows.is_empty() {
            return Err(SoundChangeError::InputMissing(format!(
                "no rows for concept {concept:?}"
            )));
        }

        log::info!(
            "Running {} analysis for {concept:?} over {} rows",
            self.config.mode,
            rows.len()
        );
        let state = AnalysisState::compute(wordlist, &columns, concept, &rows, self.config.mode);
        let forms = match self.config.word_chain_scope {
            WordFormScope::Concept => wordlist.word_forms_of(&columns, &rows),
            WordFormScope::Wordlist => wordlist.word_forms(&columns),
        };
        let summary = RunSummary::from_state(&state);

        self.cache = FeatureCache::new();
        self.last = Some(RunOutput {
            state,
            params: RunParams::from_config(&self.config),
            forms,
        });
        Ok(summary)
    }

    /// Drop the last run.
    pub fn clear(&mut self) {
        self.last = None;
        self.cache = FeatureCache::new();
    }

    fn last_run(&self) -> Result<&RunOutput> {
        self.last.as_ref().ok_or(SoundChangeError::NoAnalysis)
    }

    fn finish(&self, mut graph: Graph) -> Graph {
        apply_layout(&mut graph, &self.config.layout);
        graph
    }

    pub fn summary(&self) -> Result<RunSummary> {
        Ok(RunSummary::from_state(&self.last_run()?.state))
    }

    pub fn segment_graph(&self, top_n: usize, min_count: usize) -> Result<Graph> {
        let graph = build_segment_graph(&self.last_run()?.state, top_n, min_count);
        Ok(self.finish(graph))
    }

    pub fn language_graph(&self, min_count: usize) -> Result<Graph> {
        let graph = build_language_graph(&self.last_run()?.state, min_count);
        Ok(self.finish(graph))
    }

    /// Feature graph of the last run. The class oracle is consulted only in
    /// class mode.
    pub fn feature_graph(
        &mut self,
        mode: FeatureGraphMode,
        start: Option<&str>,
        top_n: usize,
        min_count: usize,
    ) -> Result<Option<Graph>> {
        let run = self.last.as_ref().ok_or(SoundChangeError::NoAnalysis)?;
        let features = self
            .features
            .as_deref()
            .ok_or(SoundChangeError::OracleUnavailable("feature"))?;
        let classes = self.classes.as_deref().map(|oracle| ClassModel {
            oracle,
            model: self.config.sound_class_model.as_str(),
        });
        let params = FeatureGraphParams {
            mode,
            start,
            top_n,
            min_count,
        };
        let graph = build_feature_graph(&run.state, features, classes, &mut self.cache, params)?;
        Ok(graph.map(|g| self.finish(g)))
    }

    /// Word-form chain over the forms of the last run.
    pub fn word_chain(&self, start_label: Option<&str>) -> Result<Option<Graph>> {
        let run = self.last_run()?;
        let oracle = self
            .classes
            .as_deref()
            .ok_or(SoundChangeError::OracleUnavailable("sound class"))?;
        let classes = ClassModel {
            oracle,
            model: self.config.sound_class_model.as_str(),
        };
        Ok(build_word_chain(&run.forms, classes, start_label).map(|g| self.finish(g)))
    }

    /// Pair table capped at the configured `table_limit`.
    pub fn pair_table(&self, min_count: usize) -> Result<Vec<PairRow>> {
        Ok(pair_table(
            &self.last_run()?.state,
            min_count,
            self.config.table_limit,
        ))
    }

    pub fn heatmap(&self, top_n: usize) -> Result<Heatmap> {
        Ok(heatmap(&self.last_run()?.state, top_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundcorr_phonetic::TableOracle;

    const TSV: &str = "ID\tDOCULECT\tCONCEPT\tTOKENS\tCOGID\n\
                       1\tA\thand\tp a\t1\n\
                       2\tB\thand\tb a\t1\n\
                       3\tC\tfoot\tk o\t2\n";

    fn wordlist() -> Wordlist {
        Wordlist::from_tsv(TSV).unwrap()
    }

    #[test]
    fn test_builders_need_a_run() {
        let session = SoundChangeSession::default();
        assert!(matches!(
            session.segment_graph(10, 1),
            Err(SoundChangeError::NoAnalysis)
        ));
        assert!(matches!(session.summary(), Err(SoundChangeError::NoAnalysis)));
    }

    #[test]
    fn test_run_and_clear() {
        let mut session = SoundChangeSession::default();
        let summary = session.run(&wordlist(), "hand").unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.pairs, 1);
        assert_eq!(session.forms().map(|f| f.len()), Some(2));
        assert_eq!(session.segment_graph(10, 1).unwrap().edges.len(), 1);

        session.clear();
        assert!(session.state().is_none());
        assert!(matches!(
            session.language_graph(1),
            Err(SoundChangeError::NoAnalysis)
        ));
    }

    #[test]
    fn test_failed_run_keeps_previous_state() {
        let mut session = SoundChangeSession::default();
        session.run(&wordlist(), "hand").unwrap();
        assert!(matches!(
            session.run(&wordlist(), "eye"),
            Err(SoundChangeError::InputMissing(_))
        ));
        assert!(matches!(
            session.run(&wordlist(), "  "),
            Err(SoundChangeError::InputMissing(_))
        ));
        assert_eq!(session.state().map(|s| s.concept.as_str()), Some("hand"));
    }

    #[test]
    fn test_missing_cognate_column() {
        let wl = Wordlist::from_tsv("DOCULECT\tCONCEPT\tTOKENS\nA\thand\tp a\n").unwrap();
        let mut session = SoundChangeSession::default();
        assert!(matches!(
            session.run(&wl, "hand"),
            Err(SoundChangeError::InputMissing(_))
        ));
        assert!(session.state().is_none());
    }

    #[test]
    fn test_missing_oracles() {
        let mut session = SoundChangeSession::default();
        session.run(&wordlist(), "hand").unwrap();
        assert!(matches!(
            session.feature_graph(FeatureGraphMode::Chain, None, 10, 1),
            Err(SoundChangeError::OracleUnavailable(_))
        ));
        assert!(matches!(
            session.word_chain(None),
            Err(SoundChangeError::OracleUnavailable(_))
        ));
    }

    #[test]
    fn test_word_chain_through_session() {
        let classes = TableOracle::new()
            .with_class("sca", "p", "P")
            .with_class("sca", "b", "P")
            .with_class("sca", "a", "A");
        let mut session = SoundChangeSession::default().with_class_oracle(classes);
        session.run(&wordlist(), "hand").unwrap();
        let graph = session.word_chain(Some("B: b a")).unwrap().unwrap();
        assert_eq!(graph.nodes.len(), 2);
        // chain edge plus the start edge to the representative "A: p a"
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[1].label.as_deref(), Some("start"));
    }

    #[test]
    fn test_word_chain_over_whole_wordlist() {
        let classes = TableOracle::new()
            .with_class("sca", "p", "P")
            .with_class("sca", "b", "P")
            .with_class("sca", "a", "A")
            .with_class("sca", "k", "K")
            .with_class("sca", "o", "U");
        let config = AnalysisConfig::from_toml_str("word_chain_scope = \"wordlist\"").unwrap();
        let mut session = SoundChangeSession::new(config).with_class_oracle(classes);
        let summary = session.run(&wordlist(), "hand").unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(session.forms().map(|f| f.len()), Some(3));

        let graph = session.word_chain(None).unwrap().unwrap();
        let labels: Vec<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
        assert!(labels.contains(&"C: k o"));
        assert_eq!(graph.edges.len(), 2);
    }
}
