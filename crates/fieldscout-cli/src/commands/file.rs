use std::path::Path;

use anyhow::{Context, Result};

use fieldscout_core::config::read_config;
use fieldscout_core::pipeline::{analyze_file, AnalyzeOptions};
use fieldscout_core::source::summary::InferringSummarizer;

use crate::args::FileArgs;
use crate::commands::{emit, recommend_options, spinner};

pub async fn run(args: &FileArgs) -> Result<()> {
    let config = read_config(Path::new("."))?.unwrap_or_default();

    let dimensions = if args.dimensions.is_empty() {
        config.profile.dimensions.clone()
    } else {
        args.dimensions.clone()
    };
    if dimensions.is_empty() {
        tracing::warn!("No dimensions given; every column will be treated as a measure");
    }

    let options = AnalyzeOptions {
        recommend: recommend_options(&args.report, config.recommend_options())?,
        correlate: args.correlate || config.correlate.enabled,
    };

    let pb = spinner(&format!("Profiling {}...", args.path.display()));
    let analysis = analyze_file(&args.path, &dimensions, &InferringSummarizer, &options)
        .with_context(|| format!("Failed to analyze {}", args.path.display()));
    pb.finish_and_clear();
    let analysis = analysis?;

    emit(&analysis, &args.report, &args.path.display().to_string())
}
