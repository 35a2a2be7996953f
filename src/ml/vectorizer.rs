//! TF-IDF vectorizer for text feature extraction.
//!
//! Turns normalized token sequences into sparse numeric feature vectors: a
//! bag-of-words count step followed by inverse-document-frequency
//! re-weighting. The vocabulary is learned once from training data and frozen
//! afterwards; terms unseen during training are ignored at transform time.

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::error::{Result, TriageError};

/// Sparse feature vector: `(vocabulary index, weight)` pairs sorted by index.
pub type SparseVector = Vec<(u32, f64)>;

/// Term-weighting toggles for the TF-IDF step.
///
/// These three booleans span the hyperparameter grid searched during
/// training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfIdfConfig {
    /// Re-weight counts by inverse document frequency.
    pub use_idf: bool,
    /// Smooth document frequencies by adding one virtual document.
    pub smooth_idf: bool,
    /// Replace raw term frequency with `1 + ln(tf)`.
    pub sublinear_tf: bool,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        TfIdfConfig {
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

impl TfIdfConfig {
    /// All combinations of the weighting toggles, in a stable order.
    pub fn grid() -> Vec<TfIdfConfig> {
        let mut combos = Vec::with_capacity(8);
        for use_idf in [true, false] {
            for smooth_idf in [true, false] {
                for sublinear_tf in [true, false] {
                    combos.push(TfIdfConfig {
                        use_idf,
                        smooth_idf,
                        sublinear_tf,
                    });
                }
            }
        }
        combos
    }
}

impl std::fmt::Display for TfIdfConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "use_idf={} smooth_idf={} sublinear_tf={}",
            self.use_idf, self.smooth_idf, self.sublinear_tf
        )
    }
}

/// TF-IDF vectorizer for text feature extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> index mapping, in first-seen order.
    vocabulary: AHashMap<String, u32>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Total number of documents seen during training.
    n_documents: usize,
    /// Weighting configuration.
    config: TfIdfConfig,
}

impl TfIdfVectorizer {
    /// Create a new, unfitted vectorizer with the given weighting config.
    pub fn new(config: TfIdfConfig) -> Self {
        TfIdfVectorizer {
            vocabulary: AHashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            config,
        }
    }

    /// Fit the vectorizer on training documents.
    ///
    /// Learns the vocabulary and per-term document frequencies, then derives
    /// the IDF table according to the configured toggles.
    pub fn fit(&mut self, analyzer: &dyn Analyzer, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(TriageError::model("Cannot fit vectorizer on an empty corpus"));
        }

        self.n_documents = documents.len();
        let mut vocabulary: AHashMap<String, u32> = AHashMap::new();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();

        // Build vocabulary in token stream order so the term -> index mapping
        // is identical across runs, and count document frequencies once per
        // document.
        for doc in documents {
            let mut seen: AHashSet<String> = AHashSet::new();
            for token in analyzer.analyze(doc)? {
                let term = token.text;
                if seen.insert(term.clone()) {
                    *document_frequency.entry(term.clone()).or_insert(0) += 1;
                }
                if !vocabulary.contains_key(&term) {
                    let idx = vocabulary.len() as u32;
                    vocabulary.insert(term, idx);
                }
            }
        }

        let mut idf = vec![1.0; vocabulary.len()];
        if self.config.use_idf {
            let n = self.n_documents as f64;
            for (term, &idx) in &vocabulary {
                let df = *document_frequency.get(term).unwrap_or(&0) as f64;
                idf[idx as usize] = if self.config.smooth_idf {
                    ((n + 1.0) / (df + 1.0)).ln() + 1.0
                } else {
                    (n / df).ln() + 1.0
                };
            }
        }

        if vocabulary.is_empty() {
            return Err(TriageError::model(
                "Empty vocabulary: no document yielded any token",
            ));
        }

        self.vocabulary = vocabulary;
        self.idf = idf;

        Ok(())
    }

    /// Transform one document into a sparse TF-IDF feature vector.
    ///
    /// Terms outside the learned vocabulary are ignored. The resulting
    /// vector is L2-normalized.
    pub fn transform(&self, analyzer: &dyn Analyzer, document: &str) -> Result<SparseVector> {
        if self.vocabulary.is_empty() {
            return Err(TriageError::model("Vectorizer is not fitted"));
        }

        let mut counts: AHashMap<u32, f64> = AHashMap::new();
        for token in analyzer.analyze(document)? {
            if let Some(&idx) = self.vocabulary.get(&token.text) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut features: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.config.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx as usize])
            })
            .collect();
        features.sort_unstable_by_key(|&(idx, _)| idx);

        // L2 normalization
        let norm: f64 = features.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut features {
                *w /= norm;
            }
        }

        Ok(features)
    }

    /// Transform a batch of documents in parallel.
    pub fn transform_batch(
        &self,
        analyzer: &dyn Analyzer,
        documents: &[String],
    ) -> Result<Vec<SparseVector>> {
        documents
            .par_iter()
            .map(|doc| self.transform(analyzer, doc))
            .collect()
    }

    /// Get the size of the learned vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Get the weighting configuration.
    pub fn config(&self) -> TfIdfConfig {
        self.config
    }
}
