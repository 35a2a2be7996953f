//! Message corpus loading and splitting.
//!
//! A corpus is an ordered collection of (message text, label vector) pairs
//! plus the ordered category-name list. The category set and order are fixed
//! at load time and stay identical through training, prediction, and
//! evaluation.

pub mod loader;
pub mod split;

pub use loader::load_corpus;
pub use split::train_test_split;

use crate::error::{Result, TriageError};

/// An in-memory corpus of labeled disaster messages.
#[derive(Debug, Clone)]
pub struct MessageCorpus {
    /// Raw message texts.
    pub messages: Vec<String>,
    /// Binary label rows; `labels[i][j]` is category `j` for message `i`.
    pub labels: Vec<Vec<u8>>,
    /// Ordered category names, one per label column.
    pub categories: Vec<String>,
}

impl MessageCorpus {
    /// Create a corpus, checking that every label row matches the category list.
    pub fn new(messages: Vec<String>, labels: Vec<Vec<u8>>, categories: Vec<String>) -> Result<Self> {
        if messages.len() != labels.len() {
            return Err(TriageError::corpus(format!(
                "{} messages but {} label rows",
                messages.len(),
                labels.len()
            )));
        }
        for (i, row) in labels.iter().enumerate() {
            if row.len() != categories.len() {
                return Err(TriageError::corpus(format!(
                    "Label row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    categories.len()
                )));
            }
        }

        Ok(MessageCorpus {
            messages,
            labels,
            categories,
        })
    }

    /// Number of messages in the corpus.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of label categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Extract the label column for one category index.
    pub fn label_column(&self, category_idx: usize) -> Vec<u8> {
        self.labels.iter().map(|row| row[category_idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_construction() {
        let corpus = MessageCorpus::new(
            vec!["need water".to_string(), "fire downtown".to_string()],
            vec![vec![1, 0], vec![0, 1]],
            vec!["water".to_string(), "fire".to_string()],
        )
        .unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.category_count(), 2);
        assert_eq!(corpus.label_column(0), vec![1, 0]);
        assert_eq!(corpus.label_column(1), vec![0, 1]);
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        let result = MessageCorpus::new(
            vec!["one".to_string()],
            vec![vec![1], vec![0]],
            vec!["a".to_string()],
        );
        assert!(result.is_err());

        let result = MessageCorpus::new(
            vec!["one".to_string()],
            vec![vec![1, 0]],
            vec!["a".to_string()],
        );
        assert!(result.is_err());
    }
}
