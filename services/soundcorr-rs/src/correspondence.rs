//! Correspondence aggregation over positionally aligned cognate sets.
//!
//! Members of a cognate set are stacked and padded on the right with the gap
//! symbol; every column then contributes segment counts, segment-pair
//! co-occurrences and language-pair co-occurrences. No alignment beyond the
//! positional padding is attempted.

use ahash::AHashMap;

use crate::config::CognateMode;
use crate::types::{pair_key, Counter, RowId, GAP};
use crate::wordlist::{Columns, Wordlist};

/// One resolved member of a cognate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub language: String,
    pub tokens: Vec<String>,
}

impl GroupMember {
    pub fn new(language: &str, tokens: &[&str]) -> Self {
        Self {
            language: language.to_string(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Membership of a row (or one of its morpheme slices) in a cognate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Membership {
    row: RowId,
    part: usize,
}

/// Aggregated statistics of one analysis run.
///
/// Built once per run and read-only afterwards; every graph builder is a
/// projection of this value.
#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    pub concept: String,
    pub mode: CognateMode,
    /// Rows of the concept that entered the run.
    pub row_count: usize,
    /// Cognate sets that produced at least one column.
    pub groups_used: usize,
    pub segments: Counter,
    pub pairs: Counter,
    pub lang_pairs: Counter,
    pub lang_pair_details: AHashMap<String, Counter>,
    pub lang_counts: Counter,
}

impl AnalysisState {
    pub fn new(concept: &str, mode: CognateMode) -> Self {
        Self {
            concept: concept.to_string(),
            mode,
            ..Self::default()
        }
    }

    /// Aggregate the cognate sets formed by `row_ids`.
    pub fn compute(
        wordlist: &Wordlist,
        columns: &Columns,
        concept: &str,
        row_ids: &[RowId],
        mode: CognateMode,
    ) -> Self {
        let mut state = Self::new(concept, mode);
        state.row_count = row_ids.len();

        let groups = group_rows(wordlist, columns, row_ids, mode);
        let mut skipped = 0usize;

        for (cogid, members) in &groups {
            if members.len() < 2 {
                skipped += 1;
                continue;
            }
            let resolved: Vec<GroupMember> = members
                .iter()
                .map(|m| GroupMember {
                    language: wordlist
                        .doculect(columns, m.row)
                        .unwrap_or_default()
                        .to_string(),
                    tokens: member_tokens(wordlist, columns, *m, mode),
                })
                .collect();
            if !state.accumulate_group(&resolved) {
                log::debug!("Cognate set {cogid} has fewer than two usable members");
                skipped += 1;
            }
        }

        log::info!(
            "Aggregated {} cognate sets for {:?} ({} skipped): {} segments, {} pairs",
            state.groups_used,
            concept,
            skipped,
            state.segments.len(),
            state.pairs.len()
        );
        state
    }

    /// Add one cognate set. Members with empty token sequences are dropped;
    /// returns `false` when fewer than two members remain.
    pub fn accumulate_group(&mut self, members: &[GroupMember]) -> bool {
        let entries: Vec<&GroupMember> = members.iter().filter(|m| !m.tokens.is_empty()).collect();
        for entry in &entries {
            self.lang_counts.add(&entry.language, 1);
        }

        let max_len = entries.iter().map(|e| e.tokens.len()).max().unwrap_or(0);
        if entries.len() < 2 || max_len == 0 {
            return false;
        }

        for pos in 0..max_len {
            let column: Vec<(&str, &str)> = entries
                .iter()
                .map(|e| {
                    let tok = e.tokens.get(pos).map(String::as_str).unwrap_or(GAP);
                    (e.language.as_str(), tok)
                })
                .collect();
            self.accumulate_column(&column);
        }
        self.groups_used += 1;
        true
    }

    fn accumulate_column(&mut self, column: &[(&str, &str)]) {
        for (a, &(lang_a, tok_a)) in column.iter().enumerate() {
            if is_gap(tok_a) {
                continue;
            }
            self.segments.add(tok_a, 1);

            for &(lang_b, tok_b) in &column[a + 1..] {
                if is_gap(tok_b) {
                    continue;
                }
                let lkey = pair_key(lang_a, lang_b);
                self.lang_pairs.add(&lkey, 1);
                if tok_a == tok_b {
                    continue;
                }
                let pkey = pair_key(tok_a, tok_b);
                self.pairs.add(&pkey, 1);
                self.lang_pair_details.entry(lkey).or_default().add(&pkey, 1);
            }
        }
    }

    pub fn pair_count(&self, a: &str, b: &str) -> usize {
        self.pairs.get(&pair_key(a, b))
    }

    pub fn lang_pair_count(&self, a: &str, b: &str) -> usize {
        self.lang_pairs.get(&pair_key(a, b))
    }

    /// Segment-pair counts observed between two languages.
    pub fn lang_pair_detail(&self, a: &str, b: &str) -> Option<&Counter> {
        self.lang_pair_details.get(&pair_key(a, b))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn is_gap(token: &str) -> bool {
    token.is_empty() || token == GAP
}

/// Cognate sets keyed by id, in order of first appearance.
fn group_rows(
    wordlist: &Wordlist,
    columns: &Columns,
    row_ids: &[RowId],
    mode: CognateMode,
) -> Vec<(String, Vec<Membership>)> {
    let mut order: Vec<(String, Vec<Membership>)> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for &row in row_ids {
        for (part, cogid) in wordlist.cognate_ids(columns, row, mode).into_iter().enumerate() {
            let membership = Membership { row, part };
            match index.get(&cogid) {
                Some(&idx) => order[idx].1.push(membership),
                None => {
                    index.insert(cogid.clone(), order.len());
                    order.push((cogid, vec![membership]));
                }
            }
        }
    }
    order
}

fn member_tokens(
    wordlist: &Wordlist,
    columns: &Columns,
    member: Membership,
    mode: CognateMode,
) -> Vec<String> {
    match mode {
        CognateMode::Full => wordlist.tokens(columns, member.row),
        CognateMode::Partial => wordlist
            .morphemes(columns, member.row)
            .into_iter()
            .nth(member.part)
            .unwrap_or_default(),
    }
}
