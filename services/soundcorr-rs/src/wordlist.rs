//! In-memory wordlist store and column resolution.

use ahash::AHashMap;
use std::io::Read;

use crate::config::{AnalysisConfig, CognateMode, ColumnNames};
use crate::error::{Result, SoundChangeError};
use crate::types::{RowId, WordForm, MORPHEME_BOUNDARY};

/// Tabular wordlist: a header plus rows of cells, addressed by row id.
#[derive(Debug, Clone, Default)]
pub struct Wordlist {
    header: Vec<String>,
    rows: Vec<(RowId, Vec<String>)>,
    row_index: AHashMap<RowId, usize>,
}

impl Wordlist {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
            row_index: AHashMap::new(),
        }
    }

    /// Parse tab-separated text. Lines starting with `#` are comments and
    /// quoted cells are unquoted. If the first header column is `ID`, that
    /// column supplies row ids, otherwise rows are numbered from 1.
    pub fn from_tsv(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let header: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if header.iter().all(|h| h.is_empty()) {
            return Err(SoundChangeError::InputMissing("wordlist has no header".to_string()));
        }
        let has_ids = header
            .first()
            .map(|h| h.eq_ignore_ascii_case("id"))
            .unwrap_or(false);

        let mut wordlist = Self::new(header);
        for record in rdr.records() {
            let record = record?;
            if record.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            let cells: Vec<String> = record.iter().map(String::from).collect();
            let id = if has_ids {
                let raw = cells.first().map(|c| c.trim()).unwrap_or_default();
                raw.parse::<RowId>().map_err(|_| {
                    SoundChangeError::InvalidInput(format!("invalid row id {raw:?}"))
                })?
            } else {
                wordlist.len() + 1
            };
            wordlist.push_row(id, cells);
        }
        log::debug!("Parsed wordlist with {} rows", wordlist.len());
        Ok(wordlist)
    }

    /// Insert or replace a row.
    pub fn push_row(&mut self, id: RowId, cells: Vec<String>) {
        if let Some(&idx) = self.row_index.get(&id) {
            self.rows[idx].1 = cells;
        } else {
            self.row_index.insert(id, self.rows.len());
            self.rows.push((id, cells));
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|(id, _)| *id)
    }

    /// Case-insensitive header lookup; the first matching column wins.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.header.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Raw cell content, `None` for unknown rows or short rows.
    pub fn cell(&self, row: RowId, column: usize) -> Option<&str> {
        let idx = *self.row_index.get(&row)?;
        self.rows[idx].1.get(column).map(String::as_str)
    }

    /// Non-empty trimmed cell content.
    fn text(&self, row: RowId, column: Option<usize>) -> Option<&str> {
        let text = self.cell(row, column?)?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Ids of rows whose concept cell equals `concept`, in insertion order.
    pub fn concept_rows(&self, columns: &Columns, concept: &str) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|(_, cells)| {
                cells
                    .get(columns.concept)
                    .map(|c| c.trim() == concept)
                    .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn doculect(&self, columns: &Columns, row: RowId) -> Option<&str> {
        self.text(row, Some(columns.doculect))
    }

    /// Token cell of a row: alignment preferred, tokens as fallback.
    fn token_text(&self, columns: &Columns, row: RowId) -> Option<&str> {
        self.text(row, columns.alignment)
            .or_else(|| self.text(row, columns.tokens))
    }

    /// Whole-word token sequence with boundary markers removed.
    pub fn tokens(&self, columns: &Columns, row: RowId) -> Vec<String> {
        self.token_text(columns, row)
            .map(split_tokens)
            .unwrap_or_default()
    }

    /// Token sequence split into morpheme slices.
    pub fn morphemes(&self, columns: &Columns, row: RowId) -> Vec<Vec<String>> {
        self.token_text(columns, row)
            .map(split_morphemes)
            .unwrap_or_default()
    }

    /// Cognate identifiers of a row for the given mode.
    pub fn cognate_ids(&self, columns: &Columns, row: RowId, mode: CognateMode) -> Vec<String> {
        self.text(row, columns.cognate)
            .map(|text| split_cognate_ids(text, mode))
            .unwrap_or_default()
    }

    /// Labelled word forms of every row that has tokens.
    pub fn word_forms(&self, columns: &Columns) -> Vec<WordForm> {
        let ids: Vec<RowId> = self.row_ids().collect();
        self.word_forms_of(columns, &ids)
    }

    /// Labelled word forms of the given rows, skipping rows without tokens.
    pub fn word_forms_of(&self, columns: &Columns, rows: &[RowId]) -> Vec<WordForm> {
        rows.iter()
            .filter_map(|&id| {
                let tokens = self.tokens(columns, id);
                if tokens.is_empty() {
                    return None;
                }
                let doculect = self.doculect(columns, id).unwrap_or_default();
                let label = format!("{}: {}", doculect, tokens.join(" "));
                Some(WordForm::new(id, &label, tokens))
            })
            .collect()
    }
}

/// Resolved column indices for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub doculect: usize,
    pub concept: usize,
    pub tokens: Option<usize>,
    pub alignment: Option<usize>,
    pub cognate: Option<usize>,
}

impl Columns {
    /// Resolve column names against the wordlist header. Doculect and
    /// concept columns are mandatory; the rest may be absent.
    pub fn resolve(wordlist: &Wordlist, names: &ColumnNames, mode: CognateMode) -> Result<Self> {
        let required = |name: &str| {
            wordlist
                .find_column(name)
                .ok_or_else(|| SoundChangeError::InputMissing(format!("column {name} not found")))
        };
        let cognate_name = match mode {
            CognateMode::Full => &names.cognates,
            CognateMode::Partial => &names.partial_cognates,
        };
        Ok(Self {
            doculect: required(&names.doculect)?,
            concept: required(&names.concept)?,
            tokens: wordlist.find_column(&names.tokens),
            alignment: wordlist.find_column(&names.alignment),
            cognate: wordlist.find_column(cognate_name),
        })
    }

    pub fn for_config(wordlist: &Wordlist, config: &AnalysisConfig) -> Result<Self> {
        Self::resolve(wordlist, &config.columns, config.mode)
    }
}

/// Whitespace-separated tokens without morpheme-boundary markers.
pub fn split_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|t| *t != MORPHEME_BOUNDARY)
        .map(String::from)
        .collect()
}

/// Tokens grouped by morpheme; standalone `+` tokens separate the slices.
pub fn split_morphemes(text: &str) -> Vec<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = Vec::new();
    for token in text.split_whitespace() {
        if token == MORPHEME_BOUNDARY {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
        } else {
            current.push(token.to_string());
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Cognate ids from a cognate cell.
///
/// Full mode keeps the first whitespace-delimited id. Partial mode splits on
/// `+` when present, otherwise on whitespace.
pub fn split_cognate_ids(text: &str, mode: CognateMode) -> Vec<String> {
    match mode {
        CognateMode::Full => text
            .split_whitespace()
            .next()
            .map(|id| vec![id.to_string()])
            .unwrap_or_default(),
        CognateMode::Partial => {
            if text.contains('+') {
                text.split('+')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            } else {
                text.split_whitespace().map(String::from).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "ID\tDOCULECT\tCONCEPT\tTOKENS\tALIGNMENT\tCOGID\tCOGIDS\n\
                       1\tA\thand\tp a\t\t1\t1 2\n\
                       2\tB\thand\tb a + t\tb a + t -\t1\t1 + 2\n\
                       # comment\n\
                       3\tC\tfoot\tk o\t\t\t\n";

    fn load() -> (Wordlist, Columns) {
        let wl = Wordlist::from_tsv(TSV).unwrap();
        let cols = Columns::resolve(&wl, &ColumnNames::default(), CognateMode::Full).unwrap();
        (wl, cols)
    }

    #[test]
    fn test_from_tsv() {
        let (wl, cols) = load();
        assert_eq!(wl.len(), 3);
        assert_eq!(wl.concept_rows(&cols, "hand"), vec![1, 2]);
        assert_eq!(wl.doculect(&cols, 3), Some("C"));
        assert!(wl.concept_rows(&cols, "eye").is_empty());
    }

    #[test]
    fn test_alignment_preferred() {
        let (wl, cols) = load();
        assert_eq!(wl.tokens(&cols, 1), vec!["p", "a"]);
        assert_eq!(wl.tokens(&cols, 2), vec!["b", "a", "t", "-"]);
        assert_eq!(
            wl.morphemes(&cols, 2),
            vec![vec!["b".to_string(), "a".to_string()], vec!["t".to_string(), "-".to_string()]]
        );
    }

    #[test]
    fn test_cognate_ids() {
        assert_eq!(split_cognate_ids(" 12  7", CognateMode::Full), vec!["12"]);
        assert_eq!(split_cognate_ids("1 + 2", CognateMode::Partial), vec!["1", "2"]);
        assert_eq!(split_cognate_ids("1 2", CognateMode::Partial), vec!["1", "2"]);
        assert!(split_cognate_ids("", CognateMode::Full).is_empty());
    }

    #[test]
    fn test_split_morphemes_drops_empty_slices() {
        assert_eq!(
            split_morphemes("+ a + b"),
            vec![vec!["a".to_string()], vec!["b".to_string()]]
        );
        assert_eq!(split_morphemes("a b"), vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_missing_required_column() {
        let wl = Wordlist::new(vec!["TOKENS".to_string()]);
        assert!(matches!(
            Columns::resolve(&wl, &ColumnNames::default(), CognateMode::Full),
            Err(SoundChangeError::InputMissing(_))
        ));
    }

    #[test]
    fn test_word_forms() {
        let (wl, cols) = load();
        let forms = wl.word_forms(&cols);
        assert_eq!(forms.len(), 3);
        assert_eq!(forms[0].label, "A: p a");
        assert_eq!(forms[1].label, "B: b a t -");
        let hand = wl.word_forms_of(&cols, &wl.concept_rows(&cols, "hand"));
        assert_eq!(hand.len(), 2);
        assert!(wl.word_forms_of(&cols, &[99]).is_empty());
    }

    #[test]
    fn test_invalid_row_id() {
        assert!(matches!(
            Wordlist::from_tsv("ID\tDOCULECT\nx\tA\n"),
            Err(SoundChangeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_quoted_cells_are_unquoted() {
        let wl = Wordlist::from_tsv(
            "DOCULECT\tCONCEPT\tTOKENS\tCOGID\n\
             A\thand\t\"p a\"\t1\n\
             \n\
             B\thand\tb a\t1\n",
        )
        .unwrap();
        let cols = Columns::resolve(&wl, &ColumnNames::default(), CognateMode::Full).unwrap();
        assert_eq!(wl.row_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(wl.tokens(&cols, 1), vec!["p", "a"]);
        assert_eq!(wl.doculect(&cols, 2), Some("B"));
    }

    #[test]
    fn test_short_rows_and_empty_input() {
        let wl = Wordlist::from_tsv("DOCULECT\tCONCEPT\tTOKENS\nA\thand\n").unwrap();
        assert_eq!(wl.cell(1, 1), Some("hand"));
        assert_eq!(wl.cell(1, 2), None);
        assert!(matches!(
            Wordlist::from_tsv(""),
            Err(SoundChangeError::InputMissing(_))
        ));
    }
}
