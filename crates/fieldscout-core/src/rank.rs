//! # Field Classifier & Ranker
//!
//! Turns raw column statistics into the ordered field list consumed by the
//! recommender:
//!
//! 1. validate `distinct <= valid <= count` for every input (fail fast)
//! 2. classify each column as dimension or measure from the hint
//! 3. drop identifier-like columns (fully populated, fully unique)
//! 4. geo-tag from the column name
//! 5. sort: dimensions first, fewer missing first, dates first, higher
//!    cardinality first

use std::cmp::Ordering;

use crate::error::Result;
use crate::field::{DimensionHint, Field, RawColumnStat};

/// Classify, filter and order raw column statistics.
///
/// Returns an error without partial output if any stat is inconsistent.
/// Empty input yields an empty list.
pub fn classify_and_rank(stats: &[RawColumnStat], hint: &DimensionHint) -> Result<Vec<Field>> {
    for stat in stats {
        stat.validate()?;
    }

    let mut fields: Vec<Field> = Vec::with_capacity(stats.len());
    for stat in stats {
        let field = Field::from_stat(stat, hint.group_for(stat));
        if field.is_identifier_like() {
            tracing::debug!(
                column = %field.name,
                rows = field.count,
                "Dropping identifier-like column"
            );
            continue;
        }
        fields.push(field);
    }

    // Stable sort: full ties keep adapter order.
    fields.sort_by(compare_fields);

    tracing::debug!(
        input = stats.len(),
        kept = fields.len(),
        dimensions = fields.iter().filter(|f| f.is_dimension()).count(),
        "Ranked fields"
    );

    Ok(fields)
}

/// Total order used to rank fields.
pub fn compare_fields(a: &Field, b: &Field) -> Ordering {
    a.group
        .cmp(&b.group)
        .then_with(|| a.missing.cmp(&b.missing))
        .then_with(|| b.column_type.is_date().cmp(&a.column_type.is_date()))
        .then_with(|| b.distinct.cmp(&a.distinct))
}
