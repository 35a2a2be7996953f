//! # Triage
//!
//! A multi-label classifier trainer for disaster response messages.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Flexible text analysis pipeline (tokenization, lemmatization, filtering)
//! - TF-IDF feature extraction with tunable term weighting
//! - Random-forest classification, one forest per category
//! - Grid-searched TF-IDF hyperparameters with cross-validation
//! - Per-category evaluation reports

pub mod analysis;
pub mod cli;
pub mod corpus;
pub mod error;
pub mod ml;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
