//! # Analysis Pipeline
//!
//! Wires acquisition, ranking, recommendation and (optionally) correlation
//! into one `Analysis` report.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::correlate::{correlate, Correlation};
use crate::error::Result;
use crate::field::{DimensionHint, Field, RawColumnStat};
use crate::rank::classify_and_rank;
use crate::recommend::{recommend, ChartSuggestion, RecommendOptions};
use crate::source::file::profile_file;
use crate::source::relational::ColumnProfiler;
use crate::source::summary::Summarizer;

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub recommend: RecommendOptions,
    /// Compute measure correlations when row data is available.
    pub correlate: bool,
}

/// Ranked fields and the charts suggested for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub fields: Vec<Field>,
    pub charts: Vec<ChartSuggestion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub correlations: Vec<Correlation>,
}

/// Rank raw stats and recommend charts.
pub fn analyze(
    stats: &[RawColumnStat],
    hint: &DimensionHint,
    options: &AnalyzeOptions,
) -> Result<Analysis> {
    let fields = classify_and_rank(stats, hint)?;
    let charts = recommend(&fields, &options.recommend);
    Ok(Analysis {
        fields,
        charts,
        correlations: Vec::new(),
    })
}

/// Profile a delimited file and analyze it with an explicit dimension list.
pub fn analyze_file<S: Summarizer + ?Sized>(
    path: &Path,
    dimensions: &[String],
    summarizer: &S,
    options: &AnalyzeOptions,
) -> Result<Analysis> {
    let profile = profile_file(path, summarizer)?;
    let hint = DimensionHint::explicit(dimensions.iter().cloned());

    for name in dimensions {
        if profile.dataset.column_index(name).is_none() {
            tracing::warn!(
                column = %name,
                path = %path.display(),
                "Dimension not present in file"
            );
        }
    }

    let mut analysis = analyze(&profile.columns, &hint, options)?;

    if options.correlate {
        let columns: IndexMap<String, Vec<Option<f64>>> = analysis
            .fields
            .iter()
            .filter(|f| f.is_measure() && f.column_type.is_numeric())
            .filter_map(|f| {
                profile
                    .dataset
                    .numeric_column(&f.name)
                    .map(|values| (f.name.clone(), values))
            })
            .collect();
        analysis.correlations = correlate(&analysis.fields, &columns);
    }

    Ok(analysis)
}

/// Profile a relational table; foreign-key columns become dimensions.
pub async fn analyze_table<P: ColumnProfiler>(
    profiler: &P,
    table: &str,
    options: &AnalyzeOptions,
) -> Result<Analysis> {
    let profile = profiler.profile_table(table).await?;
    analyze(&profile.columns, &DimensionHint::ForeignKeys, options)
}
