//! Seeded train/test corpus splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::corpus::MessageCorpus;
use crate::error::{Result, TriageError};

/// Split a corpus into random train and test partitions.
///
/// The split is deterministic for a given seed. Partition sizes sum to the
/// corpus size and both partitions are non-empty; the test partition gets
/// `test_fraction` of the rows, rounded.
pub fn train_test_split(
    corpus: &MessageCorpus,
    test_fraction: f64,
    seed: u64,
) -> Result<(MessageCorpus, MessageCorpus)> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(TriageError::invalid_argument(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n = corpus.len();
    if n < 2 {
        return Err(TriageError::corpus(format!(
            "Cannot split a corpus of {n} messages"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_len = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);
    let (test_indices, train_indices) = indices.split_at(test_len);

    Ok((
        select(corpus, train_indices)?,
        select(corpus, test_indices)?,
    ))
}

/// Build a sub-corpus from the given row indices.
fn select(corpus: &MessageCorpus, indices: &[usize]) -> Result<MessageCorpus> {
    let messages = indices.iter().map(|&i| corpus.messages[i].clone()).collect();
    let labels = indices.iter().map(|&i| corpus.labels[i].clone()).collect();
    MessageCorpus::new(messages, labels, corpus.categories.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_corpus(n: usize) -> MessageCorpus {
        let messages: Vec<String> = (0..n).map(|i| format!("message {i}")).collect();
        let labels: Vec<Vec<u8>> = (0..n).map(|i| vec![(i % 2) as u8]).collect();
        MessageCorpus::new(messages, labels, vec!["aid".to_string()]).unwrap()
    }

    #[test]
    fn test_split_sizes_sum_to_n() {
        let corpus = numbered_corpus(10);
        let (train, test) = train_test_split(&corpus, 0.2, 7).unwrap();

        assert_eq!(train.len() + test.len(), 10);
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_partitions_are_disjoint() {
        let corpus = numbered_corpus(25);
        let (train, test) = train_test_split(&corpus, 0.2, 7).unwrap();

        for message in &test.messages {
            assert!(!train.messages.contains(message));
        }
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let corpus = numbered_corpus(40);

        let (train_a, test_a) = train_test_split(&corpus, 0.25, 99).unwrap();
        let (train_b, test_b) = train_test_split(&corpus, 0.25, 99).unwrap();

        assert_eq!(train_a.messages, train_b.messages);
        assert_eq!(test_a.messages, test_b.messages);
        assert_eq!(train_a.labels, train_b.labels);
    }

    #[test]
    fn test_labels_travel_with_messages() {
        let corpus = numbered_corpus(20);
        let (train, test) = train_test_split(&corpus, 0.3, 3).unwrap();

        for part in [&train, &test] {
            for (message, labels) in part.messages.iter().zip(part.labels.iter()) {
                let original_idx: usize = message
                    .strip_prefix("message ")
                    .unwrap()
                    .parse()
                    .unwrap();
                assert_eq!(labels[0], (original_idx % 2) as u8);
            }
        }
    }

    #[test]
    fn test_small_corpus_always_gets_both_partitions() {
        let corpus = numbered_corpus(2);
        let (train, test) = train_test_split(&corpus, 0.2, 1).unwrap();
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let corpus = numbered_corpus(10);
        assert!(train_test_split(&corpus, 0.0, 1).is_err());
        assert!(train_test_split(&corpus, 1.0, 1).is_err());
        assert!(train_test_split(&corpus, 1.5, 1).is_err());
    }

    #[test]
    fn test_single_message_rejected() {
        let corpus = numbered_corpus(1);
        assert!(train_test_split(&corpus, 0.2, 1).is_err());
    }
}
