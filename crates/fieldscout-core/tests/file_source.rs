use std::path::Path;

use fieldscout_core::field::{ColumnType, FieldGroup, RawColumnStat};
use fieldscout_core::pipeline::{analyze_file, AnalyzeOptions};
use fieldscout_core::recommend::ChartSuggestion;
use fieldscout_core::source::file::Dataset;
use fieldscout_core::source::summary::{InferringSummarizer, Summarizer};
use fieldscout_core::FieldScoutError;
use fieldscout_testutil::{vehicles_dimensions, VEHICLES_CSV};

fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_vehicles_file_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "vehicles.csv", VEHICLES_CSV);

    let analysis = analyze_file(
        &path,
        &vehicles_dimensions(),
        &InferringSummarizer,
        &AnalyzeOptions::default(),
    )
    .unwrap();

    let summary: Vec<(&str, FieldGroup, &ColumnType, u64, u64)> = analysis
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.group, &f.column_type, f.missing, f.distinct))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("pick_up_date", FieldGroup::Dimension, &ColumnType::Date, 0, 4),
            ("store", FieldGroup::Dimension, &ColumnType::String, 0, 3),
            ("vehicle_class", FieldGroup::Dimension, &ColumnType::String, 1, 3),
            ("price", FieldGroup::Measure, &ColumnType::Number, 0, 5),
            ("days", FieldGroup::Measure, &ColumnType::Integer, 0, 4),
        ]
    );

    assert_eq!(analysis.charts.len(), 8);
    assert_eq!(
        analysis.charts[2],
        ChartSuggestion::Filter {
            field: "pick_up_date".to_string()
        }
    );
    assert_eq!(
        analysis.charts[3],
        ChartSuggestion::Line {
            field: "pick_up_date".to_string(),
            value_fields: vec!["price".to_string(), "days".to_string()],
        }
    );
    assert!(analysis.correlations.is_empty());
}

#[test]
fn test_vehicles_file_with_correlation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "vehicles.csv", VEHICLES_CSV);
    let options = AnalyzeOptions {
        correlate: true,
        ..Default::default()
    };

    let analysis = analyze_file(&path, &vehicles_dimensions(), &InferringSummarizer, &options).unwrap();
    assert_eq!(analysis.correlations.len(), 1);

    let corr = &analysis.correlations[0];
    assert_eq!(corr.field1, "price");
    assert_eq!(corr.field2, "days");
    assert_eq!(corr.pairs, 6);
    // longer rentals cost more
    assert!(corr.pearson.unwrap() > 0.9);
    assert!(corr.spearman.unwrap() > 0.9);
}

#[test]
fn test_tab_separated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "cases.tsv",
        "Country_Region\tConfirmed\nItaly\t10\nItaly\t12\nSpain\t\n",
    );

    let analysis = analyze_file(
        &path,
        &["Country_Region".to_string()],
        &InferringSummarizer,
        &AnalyzeOptions::default(),
    )
    .unwrap();
    assert_eq!(analysis.fields.len(), 2);
    assert!(analysis.fields[0].is_geo);
    assert_eq!(analysis.fields[1].name, "Confirmed");
    assert_eq!(analysis.fields[1].missing, 1);
}

#[test]
fn test_missing_dimension_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "vehicles.csv", VEHICLES_CSV);

    let analysis = analyze_file(
        &path,
        &["store".to_string(), "warehouse".to_string()],
        &InferringSummarizer,
        &AnalyzeOptions::default(),
    )
    .unwrap();
    let dims: Vec<&str> = analysis
        .fields
        .iter()
        .filter(|f| f.is_dimension())
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(dims, vec!["store"]);
}

#[test]
fn test_missing_file() {
    let err = analyze_file(
        Path::new("/no/such/dir/vehicles.csv"),
        &vehicles_dimensions(),
        &InferringSummarizer,
        &AnalyzeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FieldScoutError::SourceUnavailable { .. }));
    assert!(err.to_string().contains("vehicles.csv"));
}

/// Reports a column with more distinct values than valid ones.
struct BrokenSummarizer;

impl Summarizer for BrokenSummarizer {
    fn summarize(&self, dataset: &Dataset) -> fieldscout_core::Result<Vec<RawColumnStat>> {
        Ok(dataset
            .headers
            .iter()
            .map(|h| RawColumnStat::new(h.clone(), ColumnType::String).with_counts(10, 5, 7))
            .collect())
    }
}

#[test]
fn test_inconsistent_summary_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "vehicles.csv", VEHICLES_CSV);

    let err = analyze_file(
        &path,
        &vehicles_dimensions(),
        &BrokenSummarizer,
        &AnalyzeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FieldScoutError::DataShape { .. }));
}

#[test]
fn test_numeric_spellings_do_not_look_like_identifiers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "amounts.csv", "price,qty\n1.0,01\n1,1\n1.00,+1\n2.5,2\n");

    let analysis = analyze_file(&path, &[], &InferringSummarizer, &AnalyzeOptions::default()).unwrap();
    let kept: Vec<(&str, u64)> = analysis
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.distinct))
        .collect();
    assert_eq!(kept, vec![("price", 2), ("qty", 2)]);
}

#[test]
fn test_latin1_file_is_analyzed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.csv");
    std::fs::write(&path, b"city,sales\nM\xfcnchen,10\nK\xf6ln,12\nM\xfcnchen,7\n").unwrap();

    let analysis = analyze_file(
        &path,
        &["city".to_string()],
        &InferringSummarizer,
        &AnalyzeOptions::default(),
    )
    .unwrap();
    assert_eq!(analysis.fields[0].name, "city");
    assert_eq!(analysis.fields[0].distinct, 2);
}
