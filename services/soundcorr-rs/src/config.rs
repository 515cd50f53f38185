//! Analysis configuration, loadable from TOML.
//!
//! ```toml
//! mode = "partial"
//! top_n = 30
//! min_count = 2
//! word_chain_scope = "wordlist"
//!
//! [columns]
//! cognates = "COGID"
//! partial_cognates = "ROOTS"
//!
//! [layout]
//! enabled = false
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SoundChangeError};

/// Whether cognate ids apply to whole words or to morpheme slices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognateMode {
    #[default]
    Full,
    Partial,
}

impl fmt::Display for CognateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CognateMode::Full => f.write_str("FULL"),
            CognateMode::Partial => f.write_str("PARTIAL"),
        }
    }
}

/// Rows the word chain is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordFormScope {
    /// Rows of the analysed concept.
    #[default]
    Concept,
    /// Every row of the wordlist that has tokens.
    Wordlist,
}

/// Header names of the wordlist columns the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub doculect: String,
    pub concept: String,
    pub tokens: String,
    pub alignment: String,
    pub cognates: String,
    pub partial_cognates: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            doculect: "DOCULECT".to_string(),
            concept: "CONCEPT".to_string(),
            tokens: "TOKENS".to_string(),
            alignment: "ALIGNMENT".to_string(),
            cognates: "COGID".to_string(),
            partial_cognates: "COGIDS".to_string(),
        }
    }
}

/// Cosmetic node placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub enabled: bool,
    /// Coordinates are drawn from `[0, extent)`.
    pub extent: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extent: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub mode: CognateMode,
    pub top_n: usize,
    pub min_count: usize,
    pub sound_class_model: String,
    pub table_limit: usize,
    pub word_chain_scope: WordFormScope,
    pub columns: ColumnNames,
    pub layout: LayoutConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: CognateMode::Full,
            top_n: 20,
            min_count: 1,
            sound_class_model: "sca".to_string(),
            table_limit: 200,
            word_chain_scope: WordFormScope::Concept,
            columns: ColumnNames::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| SoundChangeError::Config(e.to_string()))?;
        if config.sound_class_model.trim().is_empty() {
            return Err(SoundChangeError::Config(
                "sound_class_model must not be empty".to_string(),
            ));
        }
        if config.layout.extent.is_nan() || config.layout.extent <= 0.0 {
            return Err(SoundChangeError::Config(
                "layout.extent must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    /// Header name of the cognate column for the active mode.
    pub fn cognate_column(&self) -> &str {
        match self.mode {
            CognateMode::Full => &self.columns.cognates,
            CognateMode::Partial => &self.columns.partial_cognates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.cognate_column(), "COGID");
    }

    #[test]
    fn test_partial_mode() {
        let config = AnalysisConfig::from_toml_str(
            "mode = \"partial\"\ntop_n = 5\n[columns]\npartial_cognates = \"ROOTS\"\n",
        )
        .unwrap();
        assert_eq!(config.mode, CognateMode::Partial);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.min_count, 1);
        assert_eq!(config.cognate_column(), "ROOTS");
        assert_eq!(config.columns.tokens, "TOKENS");
    }

    #[test]
    fn test_word_chain_scope() {
        let config = AnalysisConfig::from_toml_str("word_chain_scope = \"wordlist\"").unwrap();
        assert_eq!(config.word_chain_scope, WordFormScope::Wordlist);
        assert!(AnalysisConfig::from_toml_str("word_chain_scope = \"corpus\"").is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AnalysisConfig::from_toml_str("mode = \"sideways\"").is_err());
        assert!(AnalysisConfig::from_toml_str("sound_class_model = \" \"").is_err());
        assert!(AnalysisConfig::from_toml_str("[layout]\nextent = 0.0").is_err());
    }
}
