//! Articulatory feature vectors and the oracle capabilities that supply them.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute slots an oracle can describe for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureAttribute {
    Type,
    Place,
    Manner,
    Misc1,
    Misc2,
}

impl FeatureAttribute {
    /// Attributes that take part in the feature distance, in comparison order.
    pub const COMPARED: [FeatureAttribute; 4] = [
        FeatureAttribute::Place,
        FeatureAttribute::Manner,
        FeatureAttribute::Misc1,
        FeatureAttribute::Misc2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureAttribute::Type => "type",
            FeatureAttribute::Place => "place",
            FeatureAttribute::Manner => "manner",
            FeatureAttribute::Misc1 => "misc1",
            FeatureAttribute::Misc2 => "misc2",
        }
    }
}

impl fmt::Display for FeatureAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature lookup supplied by the host application.
pub trait FeatureOracle {
    /// Describe one attribute of a segment. `None` or an empty string means
    /// the attribute is unknown.
    fn describe(&self, segment: &str, attribute: FeatureAttribute) -> Option<String>;
}

/// Coarse sound-class lookup supplied by the host application.
pub trait ClassOracle {
    fn class_of(&self, segment: &str, model: &str) -> Option<String>;
}

/// Normalized feature tuple of one segment. Empty strings mark absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureVector {
    #[serde(rename = "type")]
    pub kind: String,
    pub place: String,
    pub manner: String,
    pub misc1: String,
    pub misc2: String,
}

fn normalize(value: Option<String>) -> String {
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}

impl FeatureVector {
    /// Query every attribute of `segment`. Returns `None` when the oracle
    /// has no type for it, which makes the segment incomparable.
    pub fn lookup(oracle: &dyn FeatureOracle, segment: &str) -> Option<Self> {
        let kind = normalize(oracle.describe(segment, FeatureAttribute::Type));
        if kind.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            place: normalize(oracle.describe(segment, FeatureAttribute::Place)),
            manner: normalize(oracle.describe(segment, FeatureAttribute::Manner)),
            misc1: normalize(oracle.describe(segment, FeatureAttribute::Misc1)),
            misc2: normalize(oracle.describe(segment, FeatureAttribute::Misc2)),
        })
    }

    pub fn get(&self, attribute: FeatureAttribute) -> &str {
        match attribute {
            FeatureAttribute::Type => &self.kind,
            FeatureAttribute::Place => &self.place,
            FeatureAttribute::Manner => &self.manner,
            FeatureAttribute::Misc1 => &self.misc1,
            FeatureAttribute::Misc2 => &self.misc2,
        }
    }

    /// Sort key used when ordering members of a sound class.
    pub fn sort_key<'a>(&'a self, segment: &'a str) -> [&'a str; 6] {
        [
            self.kind.as_str(),
            self.place.as_str(),
            self.manner.as_str(),
            self.misc1.as_str(),
            self.misc2.as_str(),
            segment,
        ]
    }
}

/// One differing attribute between two comparable vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDiff {
    pub attribute: FeatureAttribute,
    pub label: String,
    pub left: String,
    pub right: String,
}

impl fmt::Display for FeatureDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &str| if v.is_empty() { "-".to_string() } else { v.to_string() };
        write!(f, "{}: {} -> {}", self.label, show(&self.left), show(&self.right))
    }
}

/// Human-readable name of an attribute for a given segment type.
pub fn attribute_label(kind: &str, attribute: FeatureAttribute, left: &str, right: &str) -> String {
    if kind == "vowel" {
        match attribute {
            FeatureAttribute::Place => return "backness".to_string(),
            FeatureAttribute::Manner => return "height".to_string(),
            FeatureAttribute::Misc1 => return "rounding".to_string(),
            _ => {}
        }
    } else if attribute == FeatureAttribute::Misc1
        && (left.contains("voice") || right.contains("voice"))
    {
        return "voicing".to_string();
    }
    attribute.as_str().to_string()
}

/// Attributes that differ between `a` and `b`, or `None` when the types differ.
///
/// One side present and the other absent counts as a difference; both absent
/// does not.
pub fn feature_diffs(a: &FeatureVector, b: &FeatureVector) -> Option<Vec<FeatureDiff>> {
    if a.kind != b.kind {
        return None;
    }
    let diffs = FeatureAttribute::COMPARED
        .iter()
        .filter(|&&attr| a.get(attr) != b.get(attr))
        .map(|&attr| FeatureDiff {
            attribute: attr,
            label: attribute_label(&a.kind, attr, a.get(attr), b.get(attr)),
            left: a.get(attr).to_string(),
            right: b.get(attr).to_string(),
        })
        .collect();
    Some(diffs)
}

/// Number of differing compared attributes, defined only for equal types.
pub fn feature_distance(a: &FeatureVector, b: &FeatureVector) -> Option<usize> {
    feature_diffs(a, b).map(|d| d.len())
}

/// Join diffs into one edge annotation, e.g. `height: close -> open`.
pub fn describe_diffs(diffs: &[FeatureDiff]) -> String {
    diffs
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Memoized feature lookups for the duration of one analysis run.
#[derive(Debug, Default)]
pub struct FeatureCache {
    entries: FxHashMap<String, Option<FeatureVector>>,
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, oracle: &dyn FeatureOracle, segment: &str) -> Option<&FeatureVector> {
        self.entries
            .entry(segment.to_string())
            .or_insert_with(|| FeatureVector::lookup(oracle, segment))
            .as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
