use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde::Serialize;

use crate::error::{FieldScoutError, Result};
use crate::field::RawColumnStat;
use crate::source::summary::Summarizer;

/// Delimiters tried when sniffing the header line, in tie-break order.
const CANDIDATE_DELIMITERS: &[u8] = b",\t;|";

/// A decoded delimited file. Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Iterate one column's cells. Short rows yield `None`.
    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|cell| cell.as_deref()))
    }

    /// Parse a column as floats. Cells that are blank or not numeric are `None`.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        Some(
            self.column(index)
                .map(|cell| cell.and_then(|v| v.parse::<f64>().ok()))
                .collect(),
        )
    }
}

/// Raw stats for a file plus the decoded rows they were computed from.
#[derive(Debug, Clone)]
pub struct FileProfile {
    pub path: PathBuf,
    pub columns: Vec<RawColumnStat>,
    pub dataset: Dataset,
}

/// Pick the delimiter that occurs most often in the header line, ignoring
/// anything inside double quotes.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let mut in_quotes = false;
    let unquoted: Vec<u8> = header_line
        .bytes()
        .filter(|&b| {
            if b == b'"' {
                in_quotes = !in_quotes;
                return false;
            }
            !in_quotes
        })
        .collect();

    let mut best = b',';
    let mut best_count = 0;
    for &candidate in CANDIDATE_DELIMITERS {
        let count = unquoted.iter().filter(|&&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Read a delimited file, detecting the delimiter from its first line.
///
/// Only open/read failures are `SourceUnavailable`; bytes that are not UTF-8
/// are decoded as Latin-1 instead of failing.
pub fn read_delimited(path: &Path) -> Result<Dataset> {
    let bytes = std::fs::read(path).map_err(|e| FieldScoutError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = decode_text(&bytes);
    if matches!(content, Cow::Owned(_)) {
        tracing::debug!(path = %path.display(), "File is not UTF-8, decoded as Latin-1");
    }
    parse_delimited(&content, path)
}

/// UTF-8 when valid, otherwise Latin-1 (every byte maps to one code point).
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Parse delimited text. `origin` is only used in error messages.
pub fn parse_delimited(content: &str, origin: &Path) -> Result<Dataset> {
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(content.lines().next().unwrap_or(""));

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let csv_err = |e: csv::Error| FieldScoutError::Csv {
        path: origin.to_path_buf(),
        source: e,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut unique = HashSet::with_capacity(headers.len());
    if let Some(duplicate) = headers.iter().find(|h| !unique.insert(h.as_str())) {
        return Err(FieldScoutError::DataShape {
            column: duplicate.clone(),
            message: format!("header appears more than once in {}", origin.display()),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let mut row: Vec<Option<String>> = record
            .iter()
            .take(headers.len())
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    tracing::debug!(
        origin = %origin.display(),
        delimiter = %(delimiter as char).escape_default(),
        columns = headers.len(),
        rows = rows.len(),
        "Decoded delimited data"
    );

    Ok(Dataset { headers, rows })
}

/// Read `path` and summarize every column.
pub fn profile_file<S: Summarizer + ?Sized>(path: &Path, summarizer: &S) -> Result<FileProfile> {
    let dataset = read_delimited(path)?;
    let columns = summarizer.summarize(&dataset)?;
    tracing::info!(
        path = %path.display(),
        columns = columns.len(),
        rows = dataset.row_count(),
        "Profiled file"
    );
    Ok(FileProfile {
        path: path.to_path_buf(),
        columns,
        dataset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Dataset {
        parse_delimited(text, Path::new("inline.csv")).unwrap()
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a|b"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
        // comma wins ties
        assert_eq!(detect_delimiter("a,b;c"), b',');
    }

    #[test]
    fn test_detect_delimiter_skips_quoted_text() {
        assert_eq!(detect_delimiter("\"a;b;c\",d"), b',');
        assert_eq!(detect_delimiter("\"x,y\";z;w"), b';');
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let err = parse_delimited("store,price,store\nA,1,B\n", Path::new("dup.csv")).unwrap_err();
        assert!(matches!(err, FieldScoutError::DataShape { ref column, .. } if column == "store"));
    }

    #[test]
    fn test_decode_text_falls_back_to_latin1() {
        assert!(matches!(decode_text(b"plain"), Cow::Borrowed("plain")));
        assert_eq!(decode_text(b"M\xfcnchen"), "M\u{fc}nchen");
    }

    #[test]
    fn test_read_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.csv");
        std::fs::write(&path, b"city,sales\nM\xfcnchen,10\nK\xf6ln,12\n").unwrap();

        let ds = read_delimited(&path).unwrap();
        assert_eq!(ds.headers, vec!["city", "sales"]);
        assert_eq!(ds.rows[0][0].as_deref(), Some("M\u{fc}nchen"));
        assert_eq!(ds.rows[1][0].as_deref(), Some("K\u{f6}ln"));
    }

    #[test]
    fn test_parse_blank_cells_are_null() {
        let ds = parse("store,price\nA,1.5\n,2\nB,\n");
        assert_eq!(ds.headers, vec!["store", "price"]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.rows[1][0], None);
        assert_eq!(ds.rows[2][1], None);
    }

    #[test]
    fn test_parse_bom_and_semicolons() {
        let ds = parse("\u{feff}Country_Region;Confirmed\nItaly;10\n");
        assert_eq!(ds.headers, vec!["Country_Region", "Confirmed"]);
        assert_eq!(ds.rows[0][0].as_deref(), Some("Italy"));
    }

    #[test]
    fn test_parse_ragged_rows() {
        let ds = parse("a,b,c\n1\n1,2,3,4\n");
        assert_eq!(ds.rows[0], vec![Some("1".to_string()), None, None]);
        assert_eq!(ds.rows[1].len(), 3);
    }

    #[test]
    fn test_numeric_column() {
        let ds = parse("x,y\n1,a\n2.5,b\nn/a,c\n,d\n");
        assert_eq!(
            ds.numeric_column("x").unwrap(),
            vec![Some(1.0), Some(2.5), None, None]
        );
        assert!(ds.numeric_column("missing").is_none());
    }

    #[test]
    fn test_read_missing_file_is_source_unavailable() {
        let err = read_delimited(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.is_source_unavailable());
    }
}
