//! # Shared Locked Vocabulary Builder

use crate::types::TokenId;
use crate::vocab::canonical_vocab::Vocabulary;
use std::sync::Mutex;

/// One [`Vocabulary`] shared by every worker behind a mutex.
///
/// The critical section covers a single lookup-or-insert. Ids follow the
/// order in which workers win the lock, so two runs over the same input may
/// number words differently; use the reduction path
/// ([`crate::vocab::merge_rank_ordered`]) for reproducible ids.
#[derive(Debug, Default)]
pub struct LockedVocabBuilder {
    inner: Mutex<Vocabulary>,
}

impl LockedVocabBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `word`, inserting it first if absent.
    pub fn lookup_or_insert(
        &self,
        word: &[u8],
    ) -> TokenId {
        let mut vocab = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        vocab.insert(word)
    }

    /// The number of words inserted so far.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if no word was inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the vocabulary.
    pub fn into_vocab(self) -> Vocabulary {
        self.inner.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{check_is_send, check_is_sync};

    #[test]
    fn test_concurrent_insertion_is_a_bijection() {
        let builder = LockedVocabBuilder::new();
        check_is_send(&builder);
        check_is_sync(&builder);

        let words: Vec<String> = (0..200).map(|i| format!("w{}", i % 37)).collect();

        let ids: Vec<Vec<(String, TokenId)>> = std::thread::scope(|s| {
            let handles: Vec<_> = words
                .chunks(50)
                .map(|chunk| {
                    let builder = &builder;
                    s.spawn(move || {
                        chunk
                            .iter()
                            .map(|w| (w.clone(), builder.lookup_or_insert(w.as_bytes())))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builder.len(), 37);
        let vocab = builder.into_vocab();
        for (word, id) in ids.into_iter().flatten() {
            assert_eq!(vocab.lookup_token(word.as_bytes()), Some(id));
        }
        let mut all: Vec<_> = vocab.iter().map(|(id, _)| id).collect();
        all.sort();
        assert_eq!(all, (1..=37).collect::<Vec<TokenId>>());
    }
}
