//! # Correlation Analyzer
//!
//! Pairwise statistics across numeric measures: Pearson correlation, Spearman
//! rank correlation and Cohen's d effect size. Opt-in; needs row data in
//! addition to the field list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Statistics for one unordered pair of measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub field1: String,
    pub field2: String,
    /// Rows where both values are present
    pub pairs: usize,
    pub pearson: Option<f64>,
    pub spearman: Option<f64>,
    pub cohens_d: Option<f64>,
}

/// Correlate every pair of numeric measures, in field order.
///
/// `columns` maps column name to its values (`None` for nulls). Measures with
/// no entry in `columns` are skipped.
pub fn correlate(fields: &[Field], columns: &IndexMap<String, Vec<Option<f64>>>) -> Vec<Correlation> {
    let numeric: Vec<(&str, &[Option<f64>])> = fields
        .iter()
        .filter(|f| f.is_measure() && f.column_type.is_numeric())
        .filter_map(|f| {
            columns
                .get(&f.name)
                .map(|values| (f.name.as_str(), values.as_slice()))
        })
        .collect();

    let mut results = Vec::new();
    for (i, (name1, values1)) in numeric.iter().enumerate() {
        for (name2, values2) in &numeric[i + 1..] {
            let (xs, ys) = paired(values1, values2);
            results.push(Correlation {
                field1: name1.to_string(),
                field2: name2.to_string(),
                pairs: xs.len(),
                pearson: pearson(&xs, &ys),
                spearman: spearman(&xs, &ys),
                cohens_d: cohens_d(&present(values1), &present(values2)),
            });
        }
    }

    tracing::debug!(
        measures = numeric.len(),
        pairs = results.len(),
        "Computed measure correlations"
    );
    results
}

fn paired(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter_map(|(x, y)| x.zip(*y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .unzip()
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator).
fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Pearson product-moment correlation. `None` with fewer than two pairs or a
/// constant series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let mut cov = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        sx += dx * dx;
        sy += dy * dy;
    }
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    Some(cov / (sx.sqrt() * sy.sqrt()))
}

/// Spearman rank correlation: Pearson over average ranks.
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }
    pearson(&ranks(xs), &ranks(ys))
}

/// 1-based ranks; tied values share the mean of their positions.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end are 0-based; ranks are 1-based
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Cohen's d with pooled standard deviation.
pub fn cohens_d(a: &[f64], b: &[f64]) -> Option<f64> {
    let (na, nb) = (a.len(), b.len());
    if na < 2 || nb < 2 {
        return None;
    }
    let pooled = (((na - 1) as f64 * variance(a) + (nb - 1) as f64 * variance(b))
        / (na + nb - 2) as f64)
        .sqrt();
    if pooled == 0.0 {
        return None;
    }
    Some((mean(a) - mean(b)) / pooled)
}
