//! # Chart Recommender
//!
//! Deterministic rules from a ranked field list to chart suggestions: a stat
//! card per measure first, then per dimension an optional filter and a line
//! chart over every measure. Input order is preserved inside each phase.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Dimensions with this many distinct values or more get no filter.
pub const DEFAULT_FILTER_MAX_DISTINCT: u64 = 300;

/// Aggregation applied by a stat card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Sum => write!(f, "sum"),
        }
    }
}

/// A declarative visualization suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSuggestion {
    /// Single aggregated value of a measure.
    Stat {
        field: String,
        aggregation: Aggregation,
    },
    /// Discrete filter over a dimension's values.
    Filter { field: String },
    /// Dimension on the x axis, measures as series.
    Line {
        field: String,
        #[serde(rename = "valueFields")]
        value_fields: Vec<String>,
    },
}

impl ChartSuggestion {
    pub fn field(&self) -> &str {
        match self {
            ChartSuggestion::Stat { field, .. }
            | ChartSuggestion::Filter { field }
            | ChartSuggestion::Line { field, .. } => field.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChartSuggestion::Stat { .. } => "stat",
            ChartSuggestion::Filter { .. } => "filter",
            ChartSuggestion::Line { .. } => "line",
        }
    }

    /// Display label for the value axis: measure names joined by ", ".
    pub fn value_label(&self) -> Option<String> {
        match self {
            ChartSuggestion::Line { value_fields, .. } => Some(value_fields.join(", ")),
            ChartSuggestion::Stat { aggregation, .. } => Some(aggregation.to_string()),
            ChartSuggestion::Filter { .. } => None,
        }
    }
}

/// Tunables for [`recommend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendOptions {
    /// Exclusive upper bound on a dimension's distinct count for a filter.
    pub filter_max_distinct: u64,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            filter_max_distinct: DEFAULT_FILTER_MAX_DISTINCT,
        }
    }
}

/// Suggest charts for an already ranked field list.
pub fn recommend(fields: &[Field], options: &RecommendOptions) -> Vec<ChartSuggestion> {
    let measures: Vec<String> = fields
        .iter()
        .filter(|f| f.is_measure())
        .map(|f| f.name.clone())
        .collect();

    let mut charts: Vec<ChartSuggestion> = measures
        .iter()
        .map(|name| ChartSuggestion::Stat {
            field: name.clone(),
            aggregation: Aggregation::Sum,
        })
        .collect();

    for field in fields.iter().filter(|f| f.is_dimension()) {
        if field.distinct < options.filter_max_distinct {
            charts.push(ChartSuggestion::Filter {
                field: field.name.clone(),
            });
        }
        charts.push(ChartSuggestion::Line {
            field: field.name.clone(),
            value_fields: measures.clone(),
        });
    }

    tracing::debug!(
        fields = fields.len(),
        charts = charts.len(),
        "Generated chart suggestions"
    );

    charts
}

/// [`recommend`] with default options.
pub fn recommend_default(fields: &[Field]) -> Vec<ChartSuggestion> {
    recommend(fields, &RecommendOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ColumnType, FieldGroup, RawColumnStat};

    fn field(name: &str, group: FieldGroup, distinct: u64) -> Field {
        let stat = RawColumnStat::new(name, ColumnType::String).with_counts(1000, 990, distinct);
        Field::from_stat(&stat, group)
    }

    #[test]
    fn test_empty_fields_no_charts() {
        assert!(recommend_default(&[]).is_empty());
    }

    #[test]
    fn test_sales_by_region() {
        let fields = vec![
            field("region", FieldGroup::Dimension, 5),
            field("sales", FieldGroup::Measure, 400),
        ];
        let charts = recommend_default(&fields);
        assert_eq!(
            charts,
            vec![
                ChartSuggestion::Stat {
                    field: "sales".to_string(),
                    aggregation: Aggregation::Sum,
                },
                ChartSuggestion::Filter {
                    field: "region".to_string(),
                },
                ChartSuggestion::Line {
                    field: "region".to_string(),
                    value_fields: vec!["sales".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_high_cardinality_dimension_has_no_filter() {
        let fields = vec![field("store", FieldGroup::Dimension, 500)];
        let charts = recommend_default(&fields);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].kind(), "line");
    }

    #[test]
    fn test_filter_threshold_is_exclusive() {
        let at_limit = vec![field("store", FieldGroup::Dimension, 300)];
        assert!(recommend_default(&at_limit)
            .iter()
            .all(|c| c.kind() != "filter"));

        let below = vec![field("store", FieldGroup::Dimension, 299)];
        assert_eq!(recommend_default(&below)[0].kind(), "filter");
    }

    #[test]
    fn test_custom_filter_threshold() {
        let fields = vec![field("store", FieldGroup::Dimension, 40)];
        let options = RecommendOptions {
            filter_max_distinct: 20,
        };
        let charts = recommend(&fields, &options);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].field(), "store");
    }

    #[test]
    fn test_measures_first_in_input_order() {
        let fields = vec![
            field("country", FieldGroup::Dimension, 10),
            field("confirmed", FieldGroup::Measure, 500),
            field("deaths", FieldGroup::Measure, 300),
            field("updated", FieldGroup::Dimension, 90),
        ];
        let charts = recommend_default(&fields);
        let kinds: Vec<(&str, &str)> = charts.iter().map(|c| (c.kind(), c.field())).collect();
        assert_eq!(
            kinds,
            vec![
                ("stat", "confirmed"),
                ("stat", "deaths"),
                ("filter", "country"),
                ("line", "country"),
                ("filter", "updated"),
                ("line", "updated"),
            ]
        );
        assert_eq!(
            charts[3].value_label().as_deref(),
            Some("confirmed, deaths")
        );
    }

    #[test]
    fn test_line_without_measures() {
        let fields = vec![field("store", FieldGroup::Dimension, 3)];
        let charts = recommend_default(&fields);
        assert_eq!(
            charts[1],
            ChartSuggestion::Line {
                field: "store".to_string(),
                value_fields: vec![],
            }
        );
        assert_eq!(charts[1].value_label().as_deref(), Some(""));
    }

    #[test]
    fn test_suggestion_json_shape() {
        let stat = ChartSuggestion::Stat {
            field: "sales".to_string(),
            aggregation: Aggregation::Sum,
        };
        let json = serde_json::to_value(&stat).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "stat", "field": "sales", "aggregation": "sum"})
        );

        let line = ChartSuggestion::Line {
            field: "region".to_string(),
            value_fields: vec!["sales".to_string()],
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "line", "field": "region", "valueFields": ["sales"]})
        );
    }
}
