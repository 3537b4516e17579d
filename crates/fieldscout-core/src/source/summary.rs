use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::field::{ColumnType, RawColumnStat};
use crate::source::file::Dataset;

/// Computes per-column statistics for a decoded dataset.
///
/// Implement this to plug in an external summarization service; the default
/// is [`InferringSummarizer`].
pub trait Summarizer {
    fn summarize(&self, dataset: &Dataset) -> Result<Vec<RawColumnStat>>;
}

/// Counts cells and infers a type per column from its non-null values.
#[derive(Debug, Clone, Copy, Default)]
pub struct InferringSummarizer;

impl Summarizer for InferringSummarizer {
    fn summarize(&self, dataset: &Dataset) -> Result<Vec<RawColumnStat>> {
        let count = dataset.row_count() as u64;
        let stats = dataset
            .headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let mut valid = 0u64;
                let mut seen: HashSet<&str> = HashSet::new();
                let mut inference = TypeInference::default();
                for value in dataset.column(index).flatten() {
                    valid += 1;
                    seen.insert(value);
                    inference.observe(value);
                }
                let column_type = inference.finish();
                let distinct = seen
                    .iter()
                    .map(|value| ValueKey::parse(value, &column_type))
                    .collect::<HashSet<_>>()
                    .len();
                RawColumnStat::new(name.clone(), column_type).with_counts(
                    count,
                    valid,
                    distinct as u64,
                )
            })
            .collect();
        Ok(stats)
    }
}

/// A cell value normalized to its column's inferred type, so that `1`, `01`
/// and `1.0` compare equal when the column is numeric.
#[derive(Debug, PartialEq, Eq, Hash)]
enum ValueKey<'a> {
    Integer(i64),
    /// `f64::to_bits` with `-0.0` folded into `0.0`
    Number(u64),
    Boolean(bool),
    Text(&'a str),
}

impl<'a> ValueKey<'a> {
    fn parse(value: &'a str, column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Integer => match value.parse::<i64>() {
                Ok(n) => ValueKey::Integer(n),
                Err(_) => ValueKey::Text(value),
            },
            ColumnType::Number => match value.parse::<f64>() {
                Ok(n) if n == 0.0 => ValueKey::Number(0.0f64.to_bits()),
                Ok(n) => ValueKey::Number(n.to_bits()),
                Err(_) => ValueKey::Text(value),
            },
            ColumnType::Boolean => ValueKey::Boolean(value.eq_ignore_ascii_case("true")),
            _ => ValueKey::Text(value),
        }
    }
}

/// Candidate types still consistent with every value seen so far.
#[derive(Debug, Clone, Copy)]
struct TypeInference {
    seen_any: bool,
    boolean: bool,
    integer: bool,
    number: bool,
    date: bool,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self {
            seen_any: false,
            boolean: true,
            integer: true,
            number: true,
            date: true,
        }
    }
}

impl TypeInference {
    fn observe(&mut self, value: &str) {
        self.seen_any = true;
        if self.boolean {
            self.boolean = is_boolean(value);
        }
        if self.integer {
            self.integer = value.parse::<i64>().is_ok();
        }
        if self.number {
            self.number = value.parse::<f64>().is_ok_and(f64::is_finite);
        }
        if self.date {
            self.date = is_date(value);
        }
    }

    fn finish(self) -> ColumnType {
        if !self.seen_any {
            ColumnType::String
        } else if self.boolean {
            ColumnType::Boolean
        } else if self.integer {
            ColumnType::Integer
        } else if self.number {
            ColumnType::Number
        } else if self.date {
            ColumnType::Date
        } else {
            ColumnType::String
        }
    }
}

fn is_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

fn is_date(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
}
