//! Phonological primitives shared by the sound-correspondence engine.
//!
//! - token-level Levenshtein distance
//! - feature vectors, feature distance and the oracle capabilities
//! - a JSON table oracle
//!
//! With the `python` feature the distance primitive is exported via PyO3.

pub mod features;
pub mod levenshtein;
pub mod table;

pub use features::{
    attribute_label, describe_diffs, feature_diffs, feature_distance, ClassOracle, FeatureAttribute,
    FeatureCache, FeatureDiff, FeatureOracle, FeatureVector,
};
pub use levenshtein::{batch_levenshtein, levenshtein, signature_distance};
pub use table::{OracleError, TableOracle};

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use rustc_hash::FxHashMap;

    /// Edit distance between two whitespace-separated token strings.
    #[pyfunction]
    fn token_distance(tokens_a: &str, tokens_b: &str) -> PyResult<usize> {
        let a: Vec<&str> = tokens_a.split_whitespace().collect();
        let b: Vec<&str> = tokens_b.split_whitespace().collect();
        Ok(crate::levenshtein(&a, &b))
    }

    /// Batch token distances for multiple pairs.
    #[pyfunction]
    fn batch_token_distance(pairs: Vec<(String, String)>) -> PyResult<Vec<usize>> {
        let tokenized: Vec<(Vec<&str>, Vec<&str>)> = pairs
            .iter()
            .map(|(a, b)| (a.split_whitespace().collect(), b.split_whitespace().collect()))
            .collect();
        Ok(crate::batch_levenshtein(&tokenized))
    }

    #[pyfunction]
    fn signature_distance(sig_a: &str, sig_b: &str) -> PyResult<usize> {
        Ok(crate::signature_distance(sig_a, sig_b))
    }

    /// Sound-class signature of a token string using a plain class table.
    #[pyfunction]
    fn signature(tokens: &str, classes: FxHashMap<String, String>) -> PyResult<String> {
        Ok(tokens
            .split_whitespace()
            .map(|t| classes.get(t).map(String::as_str).unwrap_or("?"))
            .collect())
    }

    /// Python module definition.
    #[pymodule]
    fn soundcorr_phonetic(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(token_distance, m)?)?;
        m.add_function(wrap_pyfunction!(batch_token_distance, m)?)?;
        m.add_function(wrap_pyfunction!(signature_distance, m)?)?;
        m.add_function(wrap_pyfunction!(signature, m)?)?;
        Ok(())
    }
}
