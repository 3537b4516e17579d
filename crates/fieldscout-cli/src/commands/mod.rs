pub mod file;
pub mod table;

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};
use indicatif::{ProgressBar, ProgressStyle};

use fieldscout_core::correlate::Correlation;
use fieldscout_core::error::FieldScoutError;
use fieldscout_core::recommend::RecommendOptions;
use fieldscout_core::Analysis;

use crate::args::{ReportArgs, ReportFormat};

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Config defaults overridden by `--filter-max-distinct`.
pub fn recommend_options(args: &ReportArgs, base: RecommendOptions) -> Result<RecommendOptions> {
    match args.filter_max_distinct {
        Some(0) => anyhow::bail!("--filter-max-distinct must be at least 1"),
        Some(limit) => Ok(RecommendOptions {
            filter_max_distinct: limit,
        }),
        None => Ok(base),
    }
}

/// Print or save the analysis in the requested format.
pub fn emit(analysis: &Analysis, args: &ReportArgs, heading: &str) -> Result<()> {
    let rendered = match args.format {
        ReportFormat::Json => serde_json::to_string_pretty(analysis)?,
        ReportFormat::Table => render_tables(analysis, heading),
    };

    match &args.output {
        Some(path) => {
            write_report(path, &rendered)?;
            eprintln!("Wrote report to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn write_report(path: &Path, rendered: &str) -> Result<(), FieldScoutError> {
    std::fs::write(path, format!("{}\n", rendered)).map_err(|e| FieldScoutError::Output {
        message: format!("Failed to write {}", path.display()),
        source: e,
    })
}

fn render_tables(analysis: &Analysis, heading: &str) -> String {
    let mut out = String::new();
    let dimensions = analysis.fields.iter().filter(|f| f.is_dimension()).count();
    out.push_str(&format!(
        "━━━ {} ━━━\nFields: {}  Dimensions: {}  Measures: {}  Charts: {}\n\n",
        heading,
        analysis.fields.len(),
        dimensions,
        analysis.fields.len() - dimensions,
        analysis.charts.len()
    ));

    if analysis.fields.is_empty() {
        out.push_str("No chartable fields (every column is empty or an identifier).\n");
        return out;
    }

    let mut fields = ComfyTable::new();
    fields.set_header(vec![
        "#", "Field", "Group", "Type", "Count", "Valid", "Missing", "Distinct", "Geo",
    ]);
    for (rank, field) in analysis.fields.iter().enumerate() {
        fields.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&field.name),
            Cell::new(field.group.to_string()),
            Cell::new(field.column_type.to_string()),
            Cell::new(field.count),
            Cell::new(field.valid),
            Cell::new(field.missing),
            Cell::new(field.distinct),
            Cell::new(if field.is_geo { "yes" } else { "" }),
        ]);
    }
    out.push_str(&format!("{}\n\n", fields));

    let mut charts = ComfyTable::new();
    charts.set_header(vec!["Chart", "Field", "Values"]);
    for chart in &analysis.charts {
        charts.add_row(vec![
            Cell::new(chart.kind()),
            Cell::new(chart.field()),
            Cell::new(chart.value_label().unwrap_or_default()),
        ]);
    }
    out.push_str(&format!("{}", charts));

    if !analysis.correlations.is_empty() {
        out.push_str(&format!("\n\n{}", render_correlations(&analysis.correlations)));
    }
    out
}

fn render_correlations(correlations: &[Correlation]) -> ComfyTable {
    let stat = |v: Option<f64>| v.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "-".to_string());

    let mut t = ComfyTable::new();
    t.set_header(vec!["Field 1", "Field 2", "Pairs", "Pearson", "Spearman", "Cohen's d"]);
    for c in correlations {
        t.add_row(vec![
            Cell::new(&c.field1),
            Cell::new(&c.field2),
            Cell::new(c.pairs),
            Cell::new(stat(c.pearson)),
            Cell::new(stat(c.spearman)),
            Cell::new(stat(c.cohens_d)),
        ]);
    }
    t
}
