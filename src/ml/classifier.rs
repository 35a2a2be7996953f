//! Multi-output message classifier.
//!
//! Composes the analyzer, the TF-IDF vectorizer, and one random forest per
//! category into a single fitted model that predicts a full label vector for
//! a message. The fitted model is the sole persisted artifact; it owns the
//! learned vocabulary, the per-category forests, the selected hyperparameter
//! configuration, and a metadata block.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::message::MessageAnalyzer;
use crate::analysis::token_filter::lemma::Lemmatizer;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::corpus::MessageCorpus;
use crate::error::{Result, TriageError};
use crate::ml::forest::{ForestConfig, RandomForest};
use crate::ml::vectorizer::{SparseVector, TfIdfConfig, TfIdfVectorizer};

/// How to rebuild the analyzer a model was trained with.
///
/// The analyzer itself is a trait object and is not serialized; this spec
/// travels with the model so loading reconstructs an identical pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerSpec {
    /// Custom regex token pattern; Unicode word boundaries when absent.
    pub token_pattern: Option<String>,
    /// Lexicon file extending the lemmatizer's irregular-form table.
    pub lexicon_path: Option<PathBuf>,
}

impl AnalyzerSpec {
    /// Build the analyzer this spec describes.
    pub fn build(&self) -> Result<Arc<dyn Analyzer>> {
        let tokenizer: Arc<dyn Tokenizer> = match &self.token_pattern {
            Some(pattern) => Arc::new(RegexTokenizer::with_pattern(pattern)?),
            None => Arc::new(UnicodeWordTokenizer::new()),
        };
        let lemmatizer = match &self.lexicon_path {
            Some(path) => Arc::new(Lemmatizer::from_file(path)?),
            None => Arc::new(Lemmatizer::builtin()),
        };
        Ok(Arc::new(MessageAnalyzer::with_parts(tokenizer, lemmatizer)?))
    }
}

/// Model metadata for tracking model information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier.
    pub name: String,
    /// Crate version that produced the model.
    pub version: String,
    /// Training timestamp.
    pub trained_at: chrono::DateTime<chrono::Utc>,
    /// Number of training examples used.
    pub training_examples: usize,
    /// Model hyperparameters.
    pub hyperparameters: HashMap<String, f64>,
    /// Metrics recorded during training (cross-validation score, etc.).
    pub validation_metrics: HashMap<String, f64>,
}

/// Options controlling a training run.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// TF-IDF weighting toggles (typically the grid-search winner).
    pub tfidf: TfIdfConfig,
    /// Per-category forest hyperparameters.
    pub forest: ForestConfig,
    /// Seed for bootstrap and feature sampling.
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            tfidf: TfIdfConfig::default(),
            forest: ForestConfig::default(),
            seed: 0,
        }
    }
}

/// A fitted multi-label message classifier.
///
/// Immutable once training completes.
#[derive(Serialize, Deserialize)]
pub struct MessageClassifier {
    analyzer_spec: AnalyzerSpec,
    #[serde(skip, default = "default_analyzer")]
    analyzer: Arc<dyn Analyzer>,
    vectorizer: TfIdfVectorizer,
    forests: Vec<RandomForest>,
    categories: Vec<String>,
    metadata: ModelMetadata,
}

fn default_analyzer() -> Arc<dyn Analyzer> {
    Arc::new(MessageAnalyzer::default())
}

impl std::fmt::Debug for MessageClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageClassifier")
            .field("categories", &self.categories.len())
            .field("vocabulary_size", &self.vectorizer.vocabulary_size())
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl MessageClassifier {
    /// Train a classifier on the given corpus.
    ///
    /// Vectorizes the corpus once, then fits one forest per category over
    /// the shared feature matrix. Category fits run in parallel.
    pub fn fit(
        corpus: &MessageCorpus,
        analyzer_spec: AnalyzerSpec,
        options: &TrainingOptions,
    ) -> Result<Self> {
        if corpus.is_empty() {
            return Err(TriageError::model("Cannot train on an empty corpus"));
        }
        if corpus.categories.is_empty() {
            return Err(TriageError::model("Corpus has no label categories"));
        }

        let analyzer = analyzer_spec.build()?;

        let mut vectorizer = TfIdfVectorizer::new(options.tfidf);
        vectorizer.fit(analyzer.as_ref(), &corpus.messages)?;
        let rows = vectorizer.transform_batch(analyzer.as_ref(), &corpus.messages)?;
        let n_features = vectorizer.vocabulary_size();

        let forests: Vec<RandomForest> = (0..corpus.category_count())
            .into_par_iter()
            .map(|category_idx| {
                let labels = corpus.label_column(category_idx);
                let seed = options
                    .seed
                    .wrapping_add((category_idx as u64).wrapping_mul(0x517C_C1B7_2722_0A95));
                RandomForest::fit(&rows, &labels, n_features, &options.forest, seed)
            })
            .collect::<Result<_>>()?;

        let mut hyperparameters = HashMap::new();
        hyperparameters.insert("n_trees".to_string(), options.forest.n_trees as f64);
        hyperparameters.insert("max_depth".to_string(), options.forest.max_depth as f64);
        hyperparameters.insert(
            "min_samples_split".to_string(),
            options.forest.min_samples_split as f64,
        );
        hyperparameters.insert(
            "use_idf".to_string(),
            f64::from(u8::from(options.tfidf.use_idf)),
        );
        hyperparameters.insert(
            "smooth_idf".to_string(),
            f64::from(u8::from(options.tfidf.smooth_idf)),
        );
        hyperparameters.insert(
            "sublinear_tf".to_string(),
            f64::from(u8::from(options.tfidf.sublinear_tf)),
        );

        Ok(MessageClassifier {
            analyzer_spec,
            analyzer,
            vectorizer,
            forests,
            categories: corpus.categories.clone(),
            metadata: ModelMetadata {
                name: "triage-message-classifier".to_string(),
                version: crate::VERSION.to_string(),
                trained_at: chrono::Utc::now(),
                training_examples: corpus.len(),
                hyperparameters,
                validation_metrics: HashMap::new(),
            },
        })
    }

    /// Record a validation metric in the model metadata.
    pub fn record_validation_metric<S: Into<String>>(&mut self, name: S, value: f64) {
        self.metadata.validation_metrics.insert(name.into(), value);
    }

    /// Predict label vectors for a batch of messages.
    ///
    /// Rows follow the input order; columns follow [`categories`](Self::categories).
    pub fn predict(&self, messages: &[String]) -> Result<Vec<Vec<u8>>> {
        let rows = self
            .vectorizer
            .transform_batch(self.analyzer.as_ref(), messages)?;
        Ok(rows.iter().map(|row| self.predict_row(row)).collect())
    }

    fn predict_row(&self, row: &SparseVector) -> Vec<u8> {
        self.forests.iter().map(|forest| forest.predict(row)).collect()
    }

    /// The ordered category names this model predicts.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The model metadata block.
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// The TF-IDF configuration the model was trained with.
    pub fn tfidf_config(&self) -> TfIdfConfig {
        self.vectorizer.config()
    }

    /// Serialize the model to the given path, overwriting any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| TriageError::serialization(format!("Cannot encode model: {e}")))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a model previously written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mut model: MessageClassifier = bincode::deserialize(&bytes).map_err(|e| {
            TriageError::serialization(format!("Cannot decode model {}: {e}", path.display()))
        })?;
        model.analyzer = model.analyzer_spec.build()?;
        Ok(model)
    }
}
