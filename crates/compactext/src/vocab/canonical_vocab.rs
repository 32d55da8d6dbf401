//! # Canonical ``{ word <-> id }`` Vocabulary

use crate::errors::{CompactError, Result};
use crate::types::{FIRST_TOKEN, TokenId, WordToTokenMap};
use crate::vocab::token_table::TokenTable;

/// The canonical vocabulary: a bijection between distinct words and the dense
/// ids `1..=len`.
///
/// Ids are handed out sequentially on first insertion and never reused.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Vocabulary {
    /// Words by id; `words[id - 1]`.
    words: Vec<Vec<u8>>,

    /// Map of ``{ word -> id }``.
    ids: WordToTokenMap,
}

impl Vocabulary {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of words, V.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the vocabulary contains no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Insert a word if absent.
    ///
    /// # Returns
    /// The word's id; the next sequential id when the word is new.
    pub fn insert(
        &mut self,
        word: &[u8],
    ) -> TokenId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = FIRST_TOKEN + self.words.len() as TokenId;
        self.words.push(word.to_vec());
        self.ids.insert(word.to_vec(), id);
        id
    }

    /// Return the id of a word, if any.
    pub fn lookup_token(
        &self,
        word: &[u8],
    ) -> Option<TokenId> {
        self.ids.get(word).copied()
    }

    /// Return the id of a word, or [`CompactError::UnknownToken`].
    pub fn try_lookup_token(
        &self,
        word: &[u8],
    ) -> Result<TokenId> {
        self.lookup_token(word)
            .ok_or_else(|| CompactError::unknown_token(word))
    }

    /// Return the word of an id, if any.
    pub fn lookup_word(
        &self,
        id: TokenId,
    ) -> Option<&[u8]> {
        if id < FIRST_TOKEN {
            return None;
        }
        self.words
            .get((id - FIRST_TOKEN) as usize)
            .map(Vec::as_slice)
    }

    /// Iterate `(id, word)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &[u8])> {
        self.words
            .iter()
            .enumerate()
            .map(|(idx, w)| (FIRST_TOKEN + idx as TokenId, w.as_slice()))
    }

    /// Build the decode-side [`TokenTable`].
    pub fn to_token_table(&self) -> TokenTable {
        TokenTable::from_ordered_words(self.words.clone())
    }
}

impl TryFrom<TokenTable> for Vocabulary {
    type Error = CompactError;

    /// Rebuild the bijection from a loaded table.
    ///
    /// Fails with [`CompactError::Corrupt`] if two ids share a word.
    fn try_from(table: TokenTable) -> Result<Self> {
        let mut vocab = Vocabulary::default();
        for word in table.into_ordered_words() {
            let expected = FIRST_TOKEN + vocab.len() as TokenId;
            let id = vocab.insert(&word);
            if id != expected {
                return Err(CompactError::Corrupt(format!(
                    "token {:?} listed under ids {id} and {expected}",
                    String::from_utf8_lossy(&word)
                )));
            }
        }
        Ok(vocab)
    }
}
