//! Table-backed oracle loaded from JSON.
//!
//! ```json
//! {
//!   "features": { "p": { "type": "consonant", "place": "bilabial", "manner": "stop" } },
//!   "classes": { "sca": { "p": "P", "b": "P", "a": "A" } }
//! }
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{ClassOracle, FeatureAttribute, FeatureOracle, FeatureVector};

/// Longest prefix (in characters) tried when a segment has no exact entry.
const MAX_PREFIX: usize = 3;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Invalid oracle table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableOracle {
    #[serde(default)]
    features: FxHashMap<String, FeatureVector>,
    #[serde(default)]
    classes: FxHashMap<String, FxHashMap<String, String>>,
}

/// Exact match first, then prefixes of 3, 2 and 1 characters.
fn longest_match<'a, V>(table: &'a FxHashMap<String, V>, segment: &str) -> Option<&'a V> {
    if let Some(v) = table.get(segment) {
        return Some(v);
    }
    let chars: Vec<(usize, char)> = segment.char_indices().collect();
    for len in (1..=MAX_PREFIX.min(chars.len())).rev() {
        let end = chars
            .get(len)
            .map(|&(idx, _)| idx)
            .unwrap_or(segment.len());
        if let Some(v) = table.get(&segment[..end]) {
            return Some(v);
        }
    }
    None
}

impl TableOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, OracleError> {
        let oracle: Self = serde_json::from_str(json)?;
        log::debug!(
            "Loaded oracle table: {} feature entries, {} class models",
            oracle.features.len(),
            oracle.classes.len()
        );
        Ok(oracle)
    }

    pub fn with_features(mut self, segment: &str, vector: FeatureVector) -> Self {
        self.features.insert(segment.to_string(), vector);
        self
    }

    pub fn with_class(mut self, model: &str, segment: &str, class: &str) -> Self {
        self.classes
            .entry(model.to_string())
            .or_default()
            .insert(segment.to_string(), class.to_string());
        self
    }

    pub fn has_model(&self, model: &str) -> bool {
        self.classes.contains_key(model)
    }
}

impl FeatureOracle for TableOracle {
    fn describe(&self, segment: &str, attribute: FeatureAttribute) -> Option<String> {
        let vector = longest_match(&self.features, segment)?;
        let value = vector.get(attribute);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

impl ClassOracle for TableOracle {
    fn class_of(&self, segment: &str, model: &str) -> Option<String> {
        let table = self.classes.get(model)?;
        longest_match(table, segment).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "features": {
            "p": {"type": "consonant", "place": "bilabial", "manner": "stop", "misc1": "voiceless"},
            "a": {"type": "vowel", "place": "central", "manner": "open"}
        },
        "classes": {"sca": {"p": "P", "b": "P", "a": "A", "tʰ": "T"}}
    }"#;

    #[test]
    fn test_from_json() {
        let oracle = TableOracle::from_json(TABLE).unwrap();
        assert_eq!(
            oracle.describe("p", FeatureAttribute::Place).as_deref(),
            Some("bilabial")
        );
        assert_eq!(oracle.describe("a", FeatureAttribute::Misc1), None);
        assert_eq!(oracle.class_of("b", "sca").as_deref(), Some("P"));
        assert!(oracle.has_model("sca"));
    }

    #[test]
    fn test_prefix_fallback() {
        let oracle = TableOracle::from_json(TABLE).unwrap();
        assert_eq!(oracle.class_of("pʷ", "sca").as_deref(), Some("P"));
        assert_eq!(oracle.class_of("tʰʲ", "sca").as_deref(), Some("T"));
        assert_eq!(
            oracle.describe("aː", FeatureAttribute::Type).as_deref(),
            Some("vowel")
        );
        assert_eq!(oracle.class_of("x", "sca"), None);
    }

    #[test]
    fn test_unknown_model() {
        let oracle = TableOracle::from_json(TABLE).unwrap();
        assert_eq!(oracle.class_of("p", "dolgo"), None);
    }

    #[test]
    fn test_invalid_json() {
        assert!(TableOracle::from_json("{not json").is_err());
    }

    #[test]
    fn test_builder() {
        let oracle = TableOracle::new().with_class("sca", "k", "K");
        assert_eq!(oracle.class_of("k", "sca").as_deref(), Some("K"));
    }
}
