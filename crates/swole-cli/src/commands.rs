//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use swole_core::FormLabel;
use swole_features::ChannelPairSummary;
use swole_service::{
    read_frames, EvaluationReport, EvaluationRequest, FormEvaluator, ServiceConfig,
};

use crate::{CorpusArgs, EvaluateArgs};

fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let config = match path {
        Some(path) => ServiceConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServiceConfig::from_env().context("loading configuration from environment")?,
    };
    Ok(config)
}

/// Execute the evaluate command
pub async fn execute_evaluate(args: EvaluateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let evaluator = FormEvaluator::new(config)?;

    let frames = read_frames(&args.keypoints)?;
    tracing::debug!(file = %args.keypoints.display(), frames = frames.len(), "read keypoints");

    let mut request = EvaluationRequest::new(args.exercise, frames);
    request.side = args.side;

    let report = evaluator
        .evaluate(request)
        .await
        .with_context(|| format!("evaluating {}", args.keypoints.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &EvaluationReport) {
    let (channel1, channel2) = report.exercise.channel_labels();
    let display = &report.result.display;

    println!("{} ({} arm)", report.exercise, report.side);
    println!("  {}", report.result.verdict);
    println!("  Score: {:.2}%", report.result.percentage);
    println!();
    println!("  {channel1}");
    println!(
        "    range: {:.2} (reference {:.2})",
        display.query.channel1_range, display.reference.channel1_range
    );
    println!("  {channel2}");
    println!(
        "    minimum: {:.2} (reference {:.2})",
        display.query.channel2_min, display.reference.channel2_min
    );
}

/// Execute the corpus command
pub async fn execute_corpus(args: CorpusArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let dir = config.corpus.dir_for(args.exercise);
    let evaluator = FormEvaluator::new(config)?;

    let corpus = evaluator
        .corpus(args.exercise)
        .await
        .with_context(|| format!("building corpus from {}", dir.display()))?;

    println!("{} corpus at {}", args.exercise, dir.display());
    println!("  entries: {}", corpus.len());
    println!("  good:    {}", corpus.count(FormLabel::Good));
    println!("  bad:     {}", corpus.count(FormLabel::Bad));

    if let Some(exemplar) = corpus.first_good() {
        let (channel1, channel2) = args.exercise.channel_labels();
        let summary = ChannelPairSummary::from_pair(&exemplar.channels)?;
        println!();
        println!("  Good exemplar: {}", exemplar.name);
        println!(
            "    {channel1}: {:.2} .. {:.2} over {} frames",
            summary.channel1.min, summary.channel1.max, summary.channel1.len
        );
        println!(
            "    {channel2}: {:.2} .. {:.2}",
            summary.channel2.min, summary.channel2.max
        );
    }

    Ok(())
}
