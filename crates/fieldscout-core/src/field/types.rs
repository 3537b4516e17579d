use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FieldScoutError, Result};
use crate::field::geo::is_geo_name;

/// Canonical column type tag, shared by every acquisition adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    /// Numeric with at least one non-integral value
    Number,
    Integer,
    Date,
    Boolean,
    /// Store-native type with no canonical mapping, kept verbatim
    Other(String),
}

impl ColumnType {
    /// Parse a type tag. Unknown tags are preserved as `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => ColumnType::String,
            "number" => ColumnType::Number,
            "integer" => ColumnType::Integer,
            "date" => ColumnType::Date,
            "boolean" => ColumnType::Boolean,
            other => ColumnType::Other(other.to_string()),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, ColumnType::Date)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Integer)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Number => write!(f, "number"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<String> for ColumnType {
    fn from(tag: String) -> Self {
        ColumnType::from_tag(&tag)
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.to_string()
    }
}

/// Per-column statistics as reported by an acquisition adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumnStat {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Rows considered
    pub count: u64,
    /// Non-null rows
    pub valid: u64,
    /// Distinct non-null values
    pub distinct: u64,
    /// Column participates in a foreign-key constraint (relational sources only).
    #[serde(default)]
    pub foreign_key: bool,
}

impl RawColumnStat {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            count: 0,
            valid: 0,
            distinct: 0,
            foreign_key: false,
        }
    }

    pub fn with_counts(mut self, count: u64, valid: u64, distinct: u64) -> Self {
        self.count = count;
        self.valid = valid;
        self.distinct = distinct;
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: bool) -> Self {
        self.foreign_key = foreign_key;
        self
    }

    /// Check `distinct <= valid <= count`.
    ///
    /// Adapters are expected to uphold this, but the ranker does not trust them.
    pub fn validate(&self) -> Result<()> {
        if self.valid > self.count {
            return Err(FieldScoutError::DataShape {
                column: self.name.clone(),
                message: format!(
                    "valid ({}) exceeds count ({})",
                    self.valid, self.count
                ),
            });
        }
        if self.distinct > self.valid {
            return Err(FieldScoutError::DataShape {
                column: self.name.clone(),
                message: format!(
                    "distinct ({}) exceeds valid ({})",
                    self.distinct, self.valid
                ),
            });
        }
        Ok(())
    }
}

/// Analytical role of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    /// Categorical: grouped on, filtered by
    Dimension,
    /// Numeric: aggregated
    Measure,
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldGroup::Dimension => write!(f, "dimension"),
            FieldGroup::Measure => write!(f, "measure"),
        }
    }
}

/// Where the dimension signal comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionHint {
    /// Caller-supplied column names (file sources).
    Explicit(BTreeSet<String>),
    /// Foreign-key membership reported by the catalog (relational sources).
    ForeignKeys,
}

impl DimensionHint {
    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DimensionHint::Explicit(names.into_iter().map(Into::into).collect())
    }

    pub fn group_for(&self, stat: &RawColumnStat) -> FieldGroup {
        let is_dimension = match self {
            DimensionHint::Explicit(names) => names.contains(&stat.name),
            DimensionHint::ForeignKeys => stat.foreign_key,
        };
        if is_dimension {
            FieldGroup::Dimension
        } else {
            FieldGroup::Measure
        }
    }
}

/// A classified, geo-tagged column ready for ranking and recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub group: FieldGroup,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub count: u64,
    pub valid: u64,
    pub missing: u64,
    pub distinct: u64,
    pub is_geo: bool,
}

impl Field {
    /// Build a field from a validated raw stat.
    pub fn from_stat(stat: &RawColumnStat, group: FieldGroup) -> Self {
        Self {
            group,
            name: stat.name.clone(),
            column_type: stat.column_type.clone(),
            count: stat.count,
            valid: stat.valid,
            missing: stat.count.saturating_sub(stat.valid),
            distinct: stat.distinct,
            is_geo: is_geo_name(&stat.name),
        }
    }

    pub fn is_dimension(&self) -> bool {
        self.group == FieldGroup::Dimension
    }

    pub fn is_measure(&self) -> bool {
        self.group == FieldGroup::Measure
    }

    /// Fully populated and fully unique, like a surrogate key. Carries no
    /// analytical signal.
    pub fn is_identifier_like(&self) -> bool {
        self.count == self.valid && self.count == self.distinct && self.missing == 0
    }
}
