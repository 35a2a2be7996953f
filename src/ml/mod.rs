//! Machine learning components for message classification.
//!
//! This module wires the feature pipeline (TF-IDF vectorization), the
//! per-category random forests, the hyperparameter grid search, and the
//! evaluation metrics into a single trainable multi-output classifier.

pub mod classifier;
pub mod forest;
pub mod grid_search;
pub mod metrics;
pub mod vectorizer;

pub use classifier::{AnalyzerSpec, MessageClassifier, ModelMetadata, TrainingOptions};
pub use forest::{ForestConfig, RandomForest};
pub use grid_search::{GridSearch, GridSearchOutcome};
pub use metrics::{CategoryReport, ConfusionCounts, EvaluationSummary, evaluate};
pub use vectorizer::{SparseVector, TfIdfConfig, TfIdfVectorizer};
