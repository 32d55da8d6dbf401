//! # Worker-Local Vocabulary

use crate::types::{FIRST_TOKEN, TokenId, WordToTokenMap};

/// A worker's private `{ word -> local id }` map.
///
/// Local ids are provisional: they record first-seen order within one worker
/// and are discarded once the canonical vocabulary is merged.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LocalVocab {
    /// Distinct words, in first-seen order.
    words: Vec<Vec<u8>>,

    /// Map of ``{ word -> local id }``.
    index: WordToTokenMap,
}

impl LocalVocab {
    /// Create an empty local vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if no word was observed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Observe a word; the first occurrence wins.
    ///
    /// # Returns
    /// The word's local id.
    pub fn observe(
        &mut self,
        word: &[u8],
    ) -> TokenId {
        if let Some(&id) = self.index.get(word) {
            return id;
        }
        let id = FIRST_TOKEN + self.words.len() as TokenId;
        self.words.push(word.to_vec());
        self.index.insert(word.to_vec(), id);
        id
    }

    /// Observe every word of an iterator.
    pub fn observe_all<'a, I>(
        &mut self,
        words: I,
    ) where
        I: IntoIterator<Item = &'a [u8]>,
    {
        for word in words {
            self.observe(word);
        }
    }

    /// Build from an iterator of words.
    pub fn from_words<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut vocab = Self::new();
        vocab.observe_all(words);
        vocab
    }

    /// Returns true if the word was observed.
    pub fn contains(
        &self,
        word: &[u8],
    ) -> bool {
        self.index.contains_key(word)
    }

    /// Iterate over words in first-seen order.
    pub fn words(&self) -> impl Iterator<Item = &[u8]> {
        self.words.iter().map(Vec::as_slice)
    }

    /// The words, in first-seen order.
    pub fn as_words(&self) -> &[Vec<u8>] {
        &self.words
    }

    /// Release the words, in first-seen order.
    pub fn into_words(self) -> Vec<Vec<u8>> {
        self.words
    }
}

impl AsRef<[Vec<u8>]> for LocalVocab {
    fn as_ref(&self) -> &[Vec<u8>] {
        self.as_words()
    }
}

impl<'a> FromIterator<&'a [u8]> for LocalVocab {
    fn from_iter<I: IntoIterator<Item = &'a [u8]>>(iter: I) -> Self {
        Self::from_words(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let mut vocab = LocalVocab::new();
        assert!(vocab.is_empty());

        assert_eq!(vocab.observe(b"foo"), 1);
        assert_eq!(vocab.observe(b"bar"), 2);
        assert_eq!(vocab.observe(b"foo"), 1);
        assert_eq!(vocab.observe(b"baz"), 3);

        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains(b"bar"));
        assert!(!vocab.contains(b"qux"));
        assert_eq!(
            vocab.words().collect::<Vec<_>>(),
            vec![&b"foo"[..], b"bar", b"baz"]
        );
    }

    #[test]
    fn test_collect() {
        let vocab: LocalVocab = [&b"b"[..], b"a", b"b", b"c", b"a"].into_iter().collect();
        assert_eq!(
            vocab.into_words(),
            vec![b"b".to_vec(), b"a".to_vec(), b"c".to_vec()]
        );
    }
}
