//! # Rank-Ordered Vocabulary Reduction

use crate::vocab::canonical_vocab::Vocabulary;
use serde::{Deserialize, Serialize};

/// Order in which one rank's words are inserted during the merge.
///
/// Ranks are always visited in ascending order; this only orders words
/// within a rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeOrder {
    /// The rank's first-seen order.
    #[default]
    FirstSeen,

    /// Byte-wise lexicographic order.
    Lexicographic,
}

/// Merge per-rank word lists into the canonical [`Vocabulary`].
///
/// Rank 0's words are inserted first, then rank 1's, and so on; the first
/// insertion of a word takes the next id, repeats are no-ops. The result is a
/// pure function of the inputs and `order`.
///
/// # Arguments
/// * `ranks` - each rank's distinct words, indexed by rank.
/// * `order` - the within-rank insertion order.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(ranks)))]
pub fn merge_rank_ordered<R, W>(
    ranks: R,
    order: MergeOrder,
) -> Vocabulary
where
    R: IntoIterator<Item = W>,
    W: AsRef<[Vec<u8>]>,
{
    let mut vocab = Vocabulary::new();
    for (rank, words) in ranks.into_iter().enumerate() {
        let words = words.as_ref();
        let before = vocab.len();
        match order {
            MergeOrder::FirstSeen => {
                for word in words {
                    vocab.insert(word);
                }
            }
            MergeOrder::Lexicographic => {
                let mut sorted: Vec<&Vec<u8>> = words.iter().collect();
                sorted.sort_unstable();
                for word in sorted {
                    vocab.insert(word);
                }
            }
        }
        log::debug!(
            "merged rank {rank}: {} words, {} new",
            words.len(),
            vocab.len() - before
        );
    }
    vocab
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::local_vocab::LocalVocab;

    fn local(words: &[&str]) -> LocalVocab {
        words.iter().map(|w| w.as_bytes()).collect()
    }

    #[test]
    fn test_rank_order_first_seen() {
        let ranks = vec![local(&["foo", "bar"]), local(&["baz", "foo", "qux"])];

        let vocab = merge_rank_ordered(&ranks, MergeOrder::FirstSeen);

        assert_eq!(vocab.lookup_token(b"foo"), Some(1));
        assert_eq!(vocab.lookup_token(b"bar"), Some(2));
        assert_eq!(vocab.lookup_token(b"baz"), Some(3));
        assert_eq!(vocab.lookup_token(b"qux"), Some(4));
        assert_eq!(vocab.len(), 4);
    }

    #[test]
    fn test_rank_order_lexicographic() {
        let ranks = vec![local(&["pear", "apple"]), local(&["fig", "apple", "banana"])];

        let vocab = merge_rank_ordered(&ranks, MergeOrder::Lexicographic);

        let words: Vec<&[u8]> = vocab.iter().map(|(_, w)| w).collect();
        assert_eq!(
            words,
            vec![&b"apple"[..], b"pear", b"banana", b"fig"]
        );
    }

    #[test]
    fn test_deterministic_and_empty_ranks() {
        let ranks = vec![
            local(&[]),
            local(&["x", "y"]),
            local(&[]),
            local(&["y", "z"]),
        ];

        let a = merge_rank_ordered(&ranks, MergeOrder::FirstSeen);
        let b = merge_rank_ordered(ranks.clone(), MergeOrder::FirstSeen);
        assert_eq!(a, b);
        assert_eq!(a.lookup_token(b"x"), Some(1));
        assert_eq!(a.lookup_token(b"z"), Some(3));

        let none: Vec<LocalVocab> = Vec::new();
        assert!(merge_rank_ordered(none, MergeOrder::FirstSeen).is_empty());
    }
}
