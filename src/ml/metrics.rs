//! Evaluation metrics for binary multi-label predictions.
//!
//! Confusion counts are accumulated once per category; accuracy, per-class
//! precision/recall/F1/support, and weighted F1 are all derived from the same
//! counts. Any ratio with a zero denominator is reported as 0.0, so a
//! category with a single class in the held-out split yields well-defined
//! numbers rather than an error.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Binary confusion counts for one category.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

/// 0.0 when the denominator is zero.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl ConfusionCounts {
    /// Accumulate counts from parallel truth/prediction label slices.
    pub fn from_pairs(truth: &[u8], predicted: &[u8]) -> Result<Self> {
        if truth.len() != predicted.len() {
            return Err(TriageError::model(format!(
                "{} truth labels but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }

        let mut counts = ConfusionCounts::default();
        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            counts.record(t, p);
        }
        Ok(counts)
    }

    /// Record a single truth/prediction pair.
    pub fn record(&mut self, truth: u8, predicted: u8) {
        match (truth != 0, predicted != 0) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (true, false) => self.false_negatives += 1,
            (false, false) => self.true_negatives += 1,
        }
    }

    /// Total number of recorded pairs.
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }

    /// Fraction of correct predictions.
    pub fn accuracy(&self) -> f64 {
        ratio(
            (self.true_positives + self.true_negatives) as f64,
            self.total() as f64,
        )
    }

    /// Metrics for one of the two classes.
    pub fn class_metrics(&self, positive: bool) -> ClassMetrics {
        let (tp, fp, fn_) = if positive {
            (self.true_positives, self.false_positives, self.false_negatives)
        } else {
            (self.true_negatives, self.false_negatives, self.false_positives)
        };

        let precision = ratio(tp as f64, (tp + fp) as f64);
        let recall = ratio(tp as f64, (tp + fn_) as f64);
        let f1 = ratio(2.0 * precision * recall, precision + recall);

        ClassMetrics {
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }

    /// Support-weighted mean of the two per-class F1 scores.
    pub fn weighted_f1(&self) -> f64 {
        let negative = self.class_metrics(false);
        let positive = self.class_metrics(true);
        ratio(
            negative.support as f64 * negative.f1 + positive.support as f64 * positive.f1,
            self.total() as f64,
        )
    }
}

/// Precision/recall/F1/support for one class of one category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Full evaluation of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    pub accuracy: f64,
    pub weighted_f1: f64,
    pub negative: ClassMetrics,
    pub positive: ClassMetrics,
}

/// Evaluation results across all categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub categories: Vec<CategoryReport>,
    pub mean_accuracy: f64,
    pub mean_weighted_f1: f64,
}

/// Evaluate predictions against ground truth, category by category.
///
/// `truth` and `predicted` are row-major label matrices whose column order
/// must match `categories` — the same order established at load time.
pub fn evaluate(
    truth: &[Vec<u8>],
    predicted: &[Vec<u8>],
    categories: &[String],
) -> Result<EvaluationSummary> {
    if truth.len() != predicted.len() {
        return Err(TriageError::model(format!(
            "{} truth rows but {} prediction rows",
            truth.len(),
            predicted.len()
        )));
    }
    if truth.is_empty() || categories.is_empty() {
        return Err(TriageError::model("Nothing to evaluate"));
    }
    for (i, (t, p)) in truth.iter().zip(predicted.iter()).enumerate() {
        if t.len() != categories.len() || p.len() != categories.len() {
            return Err(TriageError::model(format!(
                "Row {} does not match the {} categories",
                i,
                categories.len()
            )));
        }
    }

    // One pass over the rows accumulates every category's confusion counts.
    let mut counts = vec![ConfusionCounts::default(); categories.len()];
    for (truth_row, predicted_row) in truth.iter().zip(predicted.iter()) {
        for (j, cell) in counts.iter_mut().enumerate() {
            cell.record(truth_row[j], predicted_row[j]);
        }
    }

    let reports: Vec<CategoryReport> = categories
        .iter()
        .zip(counts.iter())
        .map(|(category, cell)| CategoryReport {
            category: category.clone(),
            accuracy: cell.accuracy(),
            weighted_f1: cell.weighted_f1(),
            negative: cell.class_metrics(false),
            positive: cell.class_metrics(true),
        })
        .collect();

    let n = reports.len() as f64;
    let mean_accuracy = reports.iter().map(|r| r.accuracy).sum::<f64>() / n;
    let mean_weighted_f1 = reports.iter().map(|r| r.weighted_f1).sum::<f64>() / n;

    Ok(EvaluationSummary {
        categories: reports,
        mean_accuracy,
        mean_weighted_f1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_confusion_counts() {
        let truth = vec![1, 1, 0, 0, 1];
        let predicted = vec![1, 0, 0, 1, 1];
        let counts = ConfusionCounts::from_pairs(&truth, &predicted).unwrap();

        assert_eq!(counts.true_positives, 2);
        assert_eq!(counts.false_negatives, 1);
        assert_eq!(counts.false_positives, 1);
        assert_eq!(counts.true_negatives, 1);
        assert_eq!(counts.total(), 5);
        assert!((counts.accuracy() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_class_metrics_hand_computed() {
        // tp=2 fp=1 fn=1 tn=1
        let counts = ConfusionCounts {
            true_positives: 2,
            false_positives: 1,
            false_negatives: 1,
            true_negatives: 1,
        };

        let positive = counts.class_metrics(true);
        assert!((positive.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((positive.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((positive.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(positive.support, 3);

        let negative = counts.class_metrics(false);
        assert!((negative.precision - 0.5).abs() < 1e-12);
        assert!((negative.recall - 0.5).abs() < 1e-12);
        assert_eq!(negative.support, 2);
    }

    #[test]
    fn test_perfect_prediction() {
        let truth = vec![vec![1, 0], vec![0, 1], vec![1, 1]];
        let summary = evaluate(&truth, &truth, &cats(&["a", "b"])).unwrap();

        assert_eq!(summary.mean_accuracy, 1.0);
        assert_eq!(summary.mean_weighted_f1, 1.0);
        for report in &summary.categories {
            assert_eq!(report.accuracy, 1.0);
            assert_eq!(report.weighted_f1, 1.0);
        }
    }

    #[test]
    fn test_degenerate_single_class_columns() {
        // Category "a" is always 1 in the held-out split, "b" always 0;
        // the predictor is constant per column and thus always right.
        let truth = vec![vec![1, 0], vec![1, 0], vec![1, 0]];
        let predicted = vec![vec![1, 0], vec![1, 0], vec![1, 0]];
        let summary = evaluate(&truth, &predicted, &cats(&["a", "b"])).unwrap();

        let a = &summary.categories[0];
        assert_eq!(a.accuracy, 1.0);
        assert_eq!(a.positive.f1, 1.0);
        // No negative examples: the negative-class F1 is undefined -> 0.0
        assert_eq!(a.negative.f1, 0.0);
        assert_eq!(a.negative.support, 0);
        assert_eq!(a.weighted_f1, 1.0);

        let b = &summary.categories[1];
        assert_eq!(b.accuracy, 1.0);
        // No positive examples: the positive-class F1 is undefined -> 0.0
        assert_eq!(b.positive.f1, 0.0);
        assert_eq!(b.positive.support, 0);
        assert_eq!(b.weighted_f1, 1.0);
    }

    #[test]
    fn test_zero_denominator_convention() {
        // All-negative truth, all-negative prediction
        let counts = ConfusionCounts::from_pairs(&[0, 0, 0], &[0, 0, 0]).unwrap();
        let positive = counts.class_metrics(true);
        assert_eq!(positive.precision, 0.0);
        assert_eq!(positive.recall, 0.0);
        assert_eq!(positive.f1, 0.0);
        assert_eq!(counts.accuracy(), 1.0);
        assert_eq!(counts.weighted_f1(), 1.0);
    }

    #[test]
    fn test_mismatched_shapes_rejected() {
        assert!(ConfusionCounts::from_pairs(&[1], &[1, 0]).is_err());

        let truth = vec![vec![1, 0]];
        let predicted = vec![vec![1]];
        assert!(evaluate(&truth, &predicted, &cats(&["a", "b"])).is_err());

        let predicted = vec![vec![1, 0], vec![0, 0]];
        assert!(evaluate(&truth, &predicted, &cats(&["a", "b"])).is_err());
    }

    #[test]
    fn test_evaluation_order_matches_category_order() {
        let truth = vec![vec![1, 0, 0], vec![1, 0, 1]];
        let predicted = vec![vec![1, 1, 0], vec![1, 0, 1]];
        let summary = evaluate(&truth, &predicted, &cats(&["x", "y", "z"])).unwrap();

        let names: Vec<&str> = summary
            .categories
            .iter()
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert_eq!(summary.categories[0].accuracy, 1.0);
        assert_eq!(summary.categories[1].accuracy, 0.5);
        assert_eq!(summary.categories[2].accuracy, 1.0);
    }
}
