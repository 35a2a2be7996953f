//! Command line argument parsing for the Triage trainer using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Triage - train a multi-label disaster message classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "triage")]
#[command(about = "Train a multi-label classifier for disaster response messages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    after_help = "Example:\n  triage data/DisasterResponse.db models/classifier.bin\n\n\
The database must hold a 'disaster_data' table: identifier/metadata columns\n\
(including 'message') followed by one binary column per category."
)]
pub struct TriageArgs {
    /// Path to the SQLite database holding the disaster message table
    #[arg(value_name = "DATABASE_PATH")]
    pub database_path: PathBuf,

    /// Path the trained model is written to
    #[arg(value_name = "MODEL_PATH")]
    pub model_path: PathBuf,

    /// Verbosity level (0=quiet, 1=normal, 2=verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format for the evaluation report
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Seed for the train/test split and forest training (default: OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of messages held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_fraction: f64,

    /// Cross-validation folds for the hyperparameter search
    #[arg(long, default_value = "3")]
    pub folds: usize,

    /// Trees per category forest
    #[arg(long, default_value = "100")]
    pub trees: usize,

    /// Maximum decision tree depth
    #[arg(long, default_value = "12")]
    pub max_depth: usize,

    /// Worker threads for training (default: all cores)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Lexicon file extending the lemmatizer's irregular-form table
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<PathBuf>,

    /// Custom regex token pattern (default: Unicode word boundaries)
    #[arg(long, value_name = "REGEX")]
    pub token_pattern: Option<String>,

    /// Skip the TF-IDF grid search and train with the default weighting
    #[arg(long)]
    pub no_grid_search: bool,
}

impl TriageArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Worker thread count, defaulting to the available cores.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get)
    }
}

/// Output formats for the evaluation report
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable classification reports
    Human,
    /// JSON summary
    Json,
}
