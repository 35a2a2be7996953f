//! Exhaustive hyperparameter search over TF-IDF weighting toggles.
//!
//! Every combination of the three boolean toggles is scored with k-fold
//! cross-validation on the training split; the score is the mean per-category
//! label accuracy across folds. The winner is refit on the full training
//! split by the caller. A failure in any fold aborts the whole search.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::analysis::analyzer::Analyzer;
use crate::corpus::MessageCorpus;
use crate::error::{Result, TriageError};
use crate::ml::forest::{ForestConfig, RandomForest};
use crate::ml::metrics::ConfusionCounts;
use crate::ml::vectorizer::{TfIdfConfig, TfIdfVectorizer};

/// Cross-validated score for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConfigScore {
    pub config: TfIdfConfig,
    pub score: f64,
}

/// Result of a grid search.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    /// The winning configuration and its score.
    pub best: ConfigScore,
    /// Every configuration's score, in grid order.
    pub scores: Vec<ConfigScore>,
}

/// Exhaustive search over [`TfIdfConfig::grid`] with k-fold cross-validation.
#[derive(Debug, Clone, Copy)]
pub struct GridSearch {
    folds: usize,
}

impl GridSearch {
    /// Create a grid search with the given fold count (at least 2).
    pub fn new(folds: usize) -> Result<Self> {
        if folds < 2 {
            return Err(TriageError::invalid_argument(format!(
                "cross-validation needs at least 2 folds, got {folds}"
            )));
        }
        Ok(GridSearch { folds })
    }

    /// Score every configuration and return the winner.
    pub fn search(
        &self,
        corpus: &MessageCorpus,
        analyzer: &dyn Analyzer,
        forest: &ForestConfig,
        seed: u64,
    ) -> Result<GridSearchOutcome> {
        if corpus.len() < self.folds {
            return Err(TriageError::model(format!(
                "Cannot run {}-fold cross-validation on {} messages",
                self.folds,
                corpus.len()
            )));
        }

        let fold_assignments = k_fold_validation_sets(corpus.len(), self.folds, seed);

        let scores: Vec<ConfigScore> = TfIdfConfig::grid()
            .par_iter()
            .map(|&config| -> Result<ConfigScore> {
                let mut fold_scores = Vec::with_capacity(fold_assignments.len());
                for validation in &fold_assignments {
                    fold_scores.push(fit_and_score(
                        corpus, analyzer, config, forest, validation, seed,
                    )?);
                }
                let score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
                Ok(ConfigScore { config, score })
            })
            .collect::<Result<_>>()?;

        // Ties resolve to the later grid entry, so the search is deterministic.
        let best = *scores
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap())
            .ok_or_else(|| TriageError::model("Empty hyperparameter grid"))?;

        Ok(GridSearchOutcome { best, scores })
    }
}

/// Shuffled k-fold validation index sets.
fn k_fold_validation_sets(n: usize, k: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let base = n / k;
    let remainder = n % k;
    let mut sets = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let len = base + usize::from(fold < remainder);
        sets.push(indices[start..start + len].to_vec());
        start += len;
    }
    sets
}

/// Train on everything outside `validation`, score label accuracy on it.
fn fit_and_score(
    corpus: &MessageCorpus,
    analyzer: &dyn Analyzer,
    config: TfIdfConfig,
    forest: &ForestConfig,
    validation: &[usize],
    seed: u64,
) -> Result<f64> {
    let in_validation: Vec<bool> = {
        let mut mask = vec![false; corpus.len()];
        for &i in validation {
            mask[i] = true;
        }
        mask
    };

    let train_indices: Vec<usize> = (0..corpus.len()).filter(|&i| !in_validation[i]).collect();
    if train_indices.is_empty() || validation.is_empty() {
        return Err(TriageError::model("Cross-validation fold is empty"));
    }

    let train_texts: Vec<String> = train_indices
        .iter()
        .map(|&i| corpus.messages[i].clone())
        .collect();

    let mut vectorizer = TfIdfVectorizer::new(config);
    vectorizer.fit(analyzer, &train_texts)?;
    let train_rows = vectorizer.transform_batch(analyzer, &train_texts)?;

    let validation_texts: Vec<String> = validation
        .iter()
        .map(|&i| corpus.messages[i].clone())
        .collect();
    let validation_rows = vectorizer.transform_batch(analyzer, &validation_texts)?;

    let mut counts = ConfusionCounts::default();
    for category_idx in 0..corpus.category_count() {
        let train_labels: Vec<u8> = train_indices
            .iter()
            .map(|&i| corpus.labels[i][category_idx])
            .collect();
        let model = RandomForest::fit(
            &train_rows,
            &train_labels,
            vectorizer.vocabulary_size(),
            forest,
            seed.wrapping_add((category_idx as u64).wrapping_mul(0x517C_C1B7_2722_0A95)),
        )?;

        for (&i, row) in validation.iter().zip(validation_rows.iter()) {
            counts.record(corpus.labels[i][category_idx], model.predict(row));
        }
    }

    Ok(counts.accuracy())
}
