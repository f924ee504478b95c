//! Swolemate CLI
//!
//! Judges a recorded exercise repetition against a labeled reference corpus.
//!
//! # Usage
//!
//! ```bash
//! # Score a curl, detecting the visible arm
//! swole evaluate rep.json --exercise bicep
//!
//! # Force the right arm and print the full JSON report
//! swole evaluate rep.json --exercise "Shoulder Press" --side right --json
//!
//! # Inspect the reference corpus for one exercise
//! swole corpus --exercise frontraise --config swolemate.toml
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use swole_core::{ExerciseKind, Side};

pub mod commands;

/// Swolemate Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "swole")]
#[command(author, version, about = "Exercise form evaluation from pose keypoints")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one repetition against the reference corpus
    Evaluate(EvaluateArgs),

    /// Build a reference corpus and summarize it
    Corpus(CorpusArgs),

    /// Display version information
    Version,
}

/// Arguments for the evaluate command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// JSON keypoint file, one entry per frame
    pub keypoints: PathBuf,

    /// Exercise name or code (bicep, frontraise, shoulderpress, 1-3)
    #[arg(short, long)]
    pub exercise: ExerciseKind,

    /// Arm to measure (detected when omitted)
    #[arg(short, long)]
    pub side: Option<Side>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the corpus command
#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// Exercise name or code
    #[arg(short, long)]
    pub exercise: ExerciseKind,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "swole",
            "evaluate",
            "rep.json",
            "--exercise",
            "Shoulder Press",
            "--side",
            "right",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.keypoints, PathBuf::from("rep.json"));
                assert_eq!(args.exercise, ExerciseKind::ShoulderPress);
                assert_eq!(args.side, Some(Side::Right));
                assert!(args.json);
                assert!(args.config.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_exercise_codes() {
        let cli = Cli::try_parse_from(["swole", "corpus", "-e", "2"]).unwrap();
        match cli.command {
            Commands::Corpus(args) => assert_eq!(args.exercise, ExerciseKind::FrontRaise),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_exercise_rejected() {
        assert!(Cli::try_parse_from(["swole", "corpus", "--exercise", "squat"]).is_err());
        assert!(Cli::try_parse_from(["swole", "evaluate", "--exercise", "bicep"]).is_err());
    }
}
